//! Command handlers
//!
//! Each handler runs one query against the loaded documents and returns a
//! JSON report plus whether the check passed.

use anyhow::{Context, Result};
use rainbow_items::{
    Finding, InMemoryDocument, ItemId, ItemRecord, ItemReference, ItemValidator,
    TemplateConstraint,
};
use serde_json::{json, Map, Value};
use tracing::debug;

use crate::cli::Commands;

/// Result of one command.
#[derive(Debug, Clone, PartialEq)]
pub struct Outcome {
    /// False when the check reported a finding
    pub passed: bool,
    pub report: Value,
}

impl Outcome {
    fn passed(report: Value) -> Self {
        Self {
            passed: true,
            report,
        }
    }

    fn from_finding(finding: &Finding, mut extra: Map<String, Value>) -> Result<Self> {
        let mut report = match serde_json::to_value(finding)? {
            Value::Object(map) => map,
            other => anyhow::bail!("unexpected finding encoding: {other}"),
        };
        report.insert("code".into(), json!(finding.code()));
        report.append(&mut extra);
        Ok(Self {
            passed: finding.is_valid(),
            report: Value::Object(report),
        })
    }
}

/// Run `command` against `docs`.
pub fn run(
    command: &Commands,
    validator: &ItemValidator,
    docs: &[InMemoryDocument],
) -> Result<Outcome> {
    debug!(?command, documents = docs.len(), "running command");
    match command {
        Commands::Id { id } => lookup_id(validator, docs, id),
        Commands::Path { path } => lookup_path(validator, docs, path),
        Commands::Field { name_or_id } => check_field(validator, docs, name_or_id, None),
        Commands::Permits { field, template } => {
            let constraint = match ItemId::parse(template) {
                Some(id) => TemplateConstraint::Id(id),
                None => TemplateConstraint::Path(template.clone()),
            };
            check_field(validator, docs, field, Some(&constraint))
        }
        Commands::Templates { field_id } => list_templates(validator, docs, field_id),
        Commands::Stats => Ok(stats(validator, docs)),
    }
}

fn parse_id(text: &str) -> Result<ItemId> {
    text.parse::<ItemId>()
        .with_context(|| format!("expected an item id, got {text:?}"))
}

fn record_value(record: Option<&ItemRecord>) -> Value {
    record.map_or(Value::Null, |record| json!(record))
}

fn lookup_id(validator: &ItemValidator, docs: &[InMemoryDocument], id: &str) -> Result<Outcome> {
    let id = parse_id(id)?;
    let finding = validator.check_reference(docs, &ItemReference::Id(id), false, None);
    let item = validator.item_by_id(docs, id);

    let mut extra = Map::new();
    extra.insert("id".into(), json!(id));
    extra.insert("item".into(), record_value(item.as_deref()));
    Outcome::from_finding(&finding, extra)
}

fn lookup_path(
    validator: &ItemValidator,
    docs: &[InMemoryDocument],
    path: &str,
) -> Result<Outcome> {
    let reference = ItemReference::Path(path.to_string());
    let finding = validator.check_reference(docs, &reference, false, None);
    let item = validator.item_by_path(docs, path);

    let mut extra = Map::new();
    extra.insert("path".into(), json!(path));
    extra.insert("item".into(), record_value(item.as_deref()));
    Outcome::from_finding(&finding, extra)
}

/// A literal that parses as an id is checked as a field id, anything else
/// as a field name.
fn check_field(
    validator: &ItemValidator,
    docs: &[InMemoryDocument],
    name_or_id: &str,
    constraint: Option<&TemplateConstraint>,
) -> Result<Outcome> {
    let (reference, field) = match ItemId::parse(name_or_id) {
        Some(id) => (ItemReference::Id(id), validator.item_by_id(docs, id)),
        None => (
            ItemReference::FieldName(name_or_id.to_string()),
            validator.is_field_named(docs, name_or_id),
        ),
    };
    let finding = validator.check_reference(docs, &reference, true, constraint);

    let mut extra = Map::new();
    extra.insert("field".into(), json!(name_or_id));
    extra.insert("item".into(), record_value(field.as_deref()));
    if constraint.is_some() {
        let allowed = field
            .filter(|record| record.is_field())
            .map(|record| validator.allowed_templates(docs, record.id))
            .unwrap_or_default();
        extra.insert("allowed_templates".into(), json!(allowed));
    }
    Outcome::from_finding(&finding, extra)
}

fn list_templates(
    validator: &ItemValidator,
    docs: &[InMemoryDocument],
    field_id: &str,
) -> Result<Outcome> {
    let field_id = parse_id(field_id)?;
    let templates = validator.resolver().templates_permitting_field(
        validator.repository(),
        docs,
        field_id,
    );

    let report = json!({
        "field": field_id,
        "templates": templates
            .iter()
            .map(|record| json!({ "id": record.id, "path": record.path }))
            .collect::<Vec<_>>(),
    });
    Ok(Outcome {
        passed: !templates.is_empty(),
        report,
    })
}

fn stats(validator: &ItemValidator, docs: &[InMemoryDocument]) -> Outcome {
    let records = validator.repository().records(docs);
    let count = |predicate: fn(&ItemRecord) -> bool| {
        records.iter().filter(|record| predicate(record)).count()
    };

    Outcome::passed(json!({
        "documents": docs.len(),
        "unparsed": count(ItemRecord::is_unparsed),
        "templates": count(ItemRecord::is_template),
        "fields": count(ItemRecord::is_field),
        "parses": validator.repository().parse_count(),
        "max_depth": validator.resolver().config().max_depth,
    }))
}
