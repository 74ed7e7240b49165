//! Core item types.
//!
//! An `ItemRecord` is the parsed form of one serialized item document. Only
//! the handful of attributes needed to validate references are kept: the
//! item's identity, where it lives in the tree, what template it is built
//! from, and, for template items, which templates it inherits from.

use serde::ser::SerializeStruct;
use serde::{Serialize, Serializer};

use crate::constants::{TEMPLATE_FIELD_ID, TEMPLATE_TEMPLATE_ID};
use crate::id::ItemId;

/// One parsed item document.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ItemRecord {
    /// Item id, `ItemId::NIL` when the document could not be parsed.
    pub id: ItemId,
    pub parent_id: Option<ItemId>,
    pub template_id: Option<ItemId>,
    pub path: Option<String>,
    /// Direct base templates. `Some` only for template items, and then
    /// possibly empty.
    pub base_templates: Option<Vec<ItemId>>,
}

impl ItemRecord {
    /// Record returned for documents that yield nothing usable.
    pub fn unparsed() -> Self {
        Self::default()
    }

    /// Whether the document produced no id.
    pub fn is_unparsed(&self) -> bool {
        self.id.is_nil()
    }

    /// Whether this item defines a template.
    pub fn is_template(&self) -> bool {
        self.template_id == Some(TEMPLATE_TEMPLATE_ID)
    }

    /// Whether this item defines a template field.
    pub fn is_field(&self) -> bool {
        self.template_id == Some(TEMPLATE_FIELD_ID)
    }

    /// Item name, taken from the last segment of the path.
    ///
    /// A path without any separator (ignoring trailing slashes) is its own
    /// name. Returns `None` when the path is absent or blank.
    pub fn item_name(&self) -> Option<&str> {
        let path = self.path.as_deref()?;
        if path.trim().is_empty() {
            return None;
        }
        let trimmed = path.trim_end_matches('/');
        match trimmed.rfind('/') {
            None => Some(path),
            Some(idx) => Some(&trimmed[idx + 1..]),
        }
    }

    /// Whether `other` names this item's path, ignoring case and trailing
    /// slashes on both sides.
    pub fn path_matches(&self, other: &str) -> bool {
        match self.path.as_deref() {
            Some(path) => {
                eq_ignore_case(path.trim_end_matches('/'), other.trim_end_matches('/'))
            }
            None => false,
        }
    }

    /// Whether `base` is one of this template's direct base templates.
    pub fn derives_directly_from(&self, base: &ItemId) -> bool {
        self.base_templates
            .as_ref()
            .is_some_and(|bases| bases.contains(base))
    }
}

/// Case-insensitive comparison that folds non-ASCII letters too, so
/// `Über uns` matches `über uns`.
pub(crate) fn eq_ignore_case(a: &str, b: &str) -> bool {
    a.chars()
        .flat_map(char::to_lowercase)
        .eq(b.chars().flat_map(char::to_lowercase))
}

impl Serialize for ItemRecord {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut state = serializer.serialize_struct("ItemRecord", 6)?;
        state.serialize_field("id", &self.id)?;
        state.serialize_field("parent_id", &self.parent_id)?;
        state.serialize_field("template_id", &self.template_id)?;
        state.serialize_field("path", &self.path)?;
        state.serialize_field("item_name", &self.item_name())?;
        state.serialize_field("base_templates", &self.base_templates)?;
        state.end()
    }
}
