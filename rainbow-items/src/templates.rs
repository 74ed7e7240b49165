//! Template inheritance resolution.
//!
//! A field item lives somewhere below the template that owns it. The field
//! is valid on that template and on every template that inherits from it,
//! directly or through any number of intermediate base templates.
//!
//! Inheritance edges only point from a template to its direct bases, so
//! finding the templates that inherit from a given one means walking those
//! edges backwards. Nothing is precomputed: each query works on the current
//! set of records. The walk is breadth first with a visited set, and it
//! stops expanding past a configurable depth so that malformed or cyclic
//! base template data always terminates.

use std::collections::{HashSet, VecDeque};
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::constants::DEFAULT_MAX_DERIVATION_DEPTH;
use crate::document::ItemDocument;
use crate::id::ItemId;
use crate::repository::ItemRepository;
use crate::types::ItemRecord;

/// Settings for template resolution
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ResolverConfig {
    /// Maximum number of inheritance levels followed below a field's template
    pub max_depth: usize,
}

impl Default for ResolverConfig {
    fn default() -> Self {
        Self {
            max_depth: DEFAULT_MAX_DERIVATION_DEPTH,
        }
    }
}

/// Templates found below a base template.
#[derive(Debug, Clone, Default)]
pub struct Derivation {
    /// Derived templates in breadth-first discovery order, each listed once
    pub templates: Vec<Arc<ItemRecord>>,
    /// Whether the depth limit cut off part of the hierarchy
    pub truncated: bool,
}

/// Find the template that owns `field_id`.
///
/// Walks up the parent chain from the field item until a template item is
/// reached. Returns `None` when the field is unknown, the chain leaves the
/// known records, or the chain loops.
pub fn owning_template(records: &[Arc<ItemRecord>], field_id: ItemId) -> Option<Arc<ItemRecord>> {
    if field_id.is_nil() {
        return None;
    }
    let mut current = find_by_id(records, field_id)?;
    let mut visited = HashSet::from([field_id]);

    while !current.is_template() {
        let parent = current.parent_id?;
        if !visited.insert(parent) {
            debug!(%field_id, %parent, "parent chain loops, no owning template");
            return None;
        }
        current = find_by_id(records, parent)?;
    }
    Some(current)
}

/// Find every template inheriting from `template_id`, up to `max_depth`
/// levels down.
pub fn derived_templates(
    records: &[Arc<ItemRecord>],
    template_id: ItemId,
    max_depth: usize,
) -> Derivation {
    let templates: Vec<&Arc<ItemRecord>> = records
        .iter()
        .filter(|record| record.is_template())
        .collect();

    let mut derivation = Derivation::default();
    let mut visited = HashSet::from([template_id]);
    let mut queue = VecDeque::from([(template_id, 0usize)]);

    while let Some((base, depth)) = queue.pop_front() {
        let mut children = templates
            .iter()
            .filter(|candidate| candidate.derives_directly_from(&base))
            .filter(|candidate| !visited.contains(&candidate.id))
            .peekable();

        if depth >= max_depth {
            if children.peek().is_some() {
                derivation.truncated = true;
            }
            continue;
        }

        let discovered: Vec<Arc<ItemRecord>> = children.map(|child| Arc::clone(child)).collect();
        for child in discovered {
            if visited.insert(child.id) {
                queue.push_back((child.id, depth + 1));
                derivation.templates.push(child);
            }
        }
    }

    derivation
}

/// Resolves which templates a field may be used on.
#[derive(Debug, Clone, Default)]
pub struct TemplateResolver {
    config: ResolverConfig,
}

impl TemplateResolver {
    pub fn new(config: ResolverConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &ResolverConfig {
        &self.config
    }

    /// Templates on which the field `field_id` is present: its owning
    /// template first, then every template inheriting from it.
    ///
    /// Empty when the field has no owning template among `docs`.
    pub fn templates_permitting_field<D: ItemDocument>(
        &self,
        repo: &ItemRepository,
        docs: &[D],
        field_id: ItemId,
    ) -> Vec<Arc<ItemRecord>> {
        let records = repo.records(docs);
        self.permitting_in(&records, field_id)
    }

    /// Same as `templates_permitting_field`, over already resolved records.
    pub fn permitting_in(
        &self,
        records: &[Arc<ItemRecord>],
        field_id: ItemId,
    ) -> Vec<Arc<ItemRecord>> {
        let Some(owner) = owning_template(records, field_id) else {
            debug!(%field_id, "no owning template for field");
            return Vec::new();
        };

        let derivation = derived_templates(records, owner.id, self.config.max_depth);
        if derivation.truncated {
            warn!(
                %field_id,
                template = %owner.id,
                max_depth = self.config.max_depth,
                "template inheritance deeper than limit, result is incomplete"
            );
        }

        let mut result = Vec::with_capacity(derivation.templates.len() + 1);
        result.push(owner);
        result.extend(derivation.templates);
        result
    }
}

fn find_by_id(records: &[Arc<ItemRecord>], id: ItemId) -> Option<Arc<ItemRecord>> {
    records.iter().find(|record| record.id == id).cloned()
}
