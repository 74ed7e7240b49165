//! Line-oriented reader for serialized item documents.
//!
//! Serialized items are YAML, but only a few top-level scalars and one
//! shared field are needed, so the reader scans lines by prefix instead of
//! building a full YAML tree. This keeps it tolerant of documents that a
//! strict YAML parser would reject, e.g. unquoted braced guids.
//!
//! ```text
//! ID: "f5cfa142-fd92-4cdc-a6d5-c20020398418"
//! Parent: 3c1715fe-6a13-4fcf-845f-de308ba9741d
//! Template: ab86861a-6030-46c5-b394-e8f99e8b87db
//! Path: /sitecore/templates/Animal template
//! SharedFields:
//! - ID: "12c33f3f-86c5-43a5-aeb4-5598cec45116"
//!   Hint: __Base template
//!   Value: |
//!     {15CFA142-FD92-4CDC-A6D5-C20020398418}
//!     {1930BBEB-7805-471A-A3BE-4858AC7CF696}
//! ```

use tracing::trace;

use crate::constants::{
    BASE_TEMPLATE_FIELD_ID, ID_KEY, LIST_ITEM_ID_KEY, PARENT_KEY, PATH_KEY, TEMPLATE_KEY,
    TEMPLATE_TEMPLATE_ID, VALUE_KEY,
};
use crate::id::ItemId;
use crate::types::ItemRecord;

/// Parse one serialized item document.
///
/// Never fails. Empty or unrecognizable text yields `ItemRecord::unparsed()`,
/// and individual values that do not parse are left unset.
pub fn parse_item(text: &str) -> ItemRecord {
    let lines: Vec<&str> = text
        .split(['\r', '\n'])
        .filter(|line| !line.is_empty())
        .collect();
    if lines.is_empty() {
        return ItemRecord::unparsed();
    }

    let mut record = ItemRecord {
        id: scalar(&lines, ID_KEY).and_then(ItemId::parse).unwrap_or_default(),
        parent_id: scalar(&lines, PARENT_KEY).and_then(ItemId::parse),
        template_id: scalar(&lines, TEMPLATE_KEY).and_then(ItemId::parse),
        path: scalar(&lines, PATH_KEY).map(str::to_string),
        base_templates: None,
    };

    if record.template_id == Some(TEMPLATE_TEMPLATE_ID) {
        record.base_templates = Some(base_templates(&lines));
    }

    trace!(
        id = %record.id,
        path = record.path.as_deref().unwrap_or(""),
        "parsed item"
    );
    record
}

/// Value of the first line starting with `key`, whitespace trimmed.
fn scalar<'a>(lines: &[&'a str], key: &str) -> Option<&'a str> {
    lines
        .iter()
        .find_map(|line| line.strip_prefix(key))
        .map(str::trim)
}

/// Collect the ids listed in the base template shared field.
///
/// The field is a list entry introduced by `- ID: <base template field id>`.
/// Everything nested deeper than that entry belongs to it. Ids are taken
/// from its `Value:` line onwards, one per line or pipe separated.
fn base_templates(lines: &[&str]) -> Vec<ItemId> {
    let mut result = Vec::new();

    let Some(intro) = lines.iter().position(|line| is_base_template_intro(line)) else {
        return result;
    };
    let intro_indent = indentation(lines[intro]);

    let block = lines[intro + 1..]
        .iter()
        .take_while(|line| indentation(line) > intro_indent);

    let mut in_value = false;
    for line in block {
        let mut content = line.trim();
        if let Some(rest) = content.strip_prefix(VALUE_KEY.trim_end()) {
            in_value = true;
            content = rest;
        }
        if !in_value {
            continue;
        }
        result.extend(content.split('|').filter_map(ItemId::parse));
    }

    result
}

fn is_base_template_intro(line: &str) -> bool {
    line.trim()
        .strip_prefix(LIST_ITEM_ID_KEY)
        .and_then(ItemId::parse)
        .is_some_and(|id| id == BASE_TEMPLATE_FIELD_ID)
}

fn indentation(line: &str) -> usize {
    line.len() - line.trim_start().len()
}
