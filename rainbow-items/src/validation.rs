//! Validation queries over a set of item documents.
//!
//! `ItemValidator` answers the questions a code analyzer asks for each
//! candidate literal it finds: does this id or path exist, is it a field,
//! and may that field be used on a given template. The analyzer decides
//! which literals to ask about; this module only answers.

use std::sync::Arc;

use serde::Serialize;
use tracing::debug;

use crate::document::ItemDocument;
use crate::id::ItemId;
use crate::repository::ItemRepository;
use crate::templates::{ResolverConfig, TemplateResolver};
use crate::types::{eq_ignore_case, ItemRecord};

/// A reference found in source code, already classified by the caller.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ItemReference {
    Id(ItemId),
    Path(String),
    /// A bare field name, without any path separator
    FieldName(String),
}

/// A template constraint in scope for a field reference.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TemplateConstraint {
    Id(ItemId),
    Path(String),
}

/// Outcome of checking one reference.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "finding", rename_all = "kebab-case")]
pub enum Finding {
    Valid,
    UnknownId,
    UnknownPath,
    NotAField,
    UnknownFieldName,
    /// A field referenced by id is not present on the constrained template.
    FieldIdNotOnTemplate { template: ItemId },
    /// A field referenced by name is not present on the constrained template.
    FieldNameNotOnTemplate { template: ItemId },
}

impl Finding {
    /// Stable rule identifier, as used by the code analyzer.
    pub fn code(&self) -> Option<&'static str> {
        match self {
            Finding::Valid => None,
            Finding::UnknownId => Some("RainbowDataAnalyzerIds"),
            Finding::UnknownPath => Some("RainbowDataAnalyzerPaths"),
            Finding::NotAField => Some("RainbowDataAnalyzerFieldIds"),
            Finding::UnknownFieldName => Some("RainbowDataAnalyzerFieldPaths"),
            Finding::FieldIdNotOnTemplate { .. } => Some("RainbowDataAnalyzerTemplateFieldIds"),
            Finding::FieldNameNotOnTemplate { .. } => Some("RainbowDataAnalyzerTemplateFieldPaths"),
        }
    }

    pub fn is_valid(&self) -> bool {
        matches!(self, Finding::Valid)
    }
}

/// Query surface combining the item index and template resolution.
///
/// Construct one per validation session and share it; the repository inside
/// is safe to use from several threads at once.
#[derive(Debug, Clone)]
pub struct ItemValidator {
    repository: Arc<ItemRepository>,
    resolver: TemplateResolver,
}

impl ItemValidator {
    pub fn new(repository: Arc<ItemRepository>, resolver: TemplateResolver) -> Self {
        Self {
            repository,
            resolver,
        }
    }

    /// Validator over a fresh repository.
    pub fn with_config(config: ResolverConfig) -> Self {
        Self::new(Arc::new(ItemRepository::new()), TemplateResolver::new(config))
    }

    pub fn repository(&self) -> &Arc<ItemRepository> {
        &self.repository
    }

    pub fn resolver(&self) -> &TemplateResolver {
        &self.resolver
    }

    // --- Lookups ---

    /// The item with id `id`, if any document defines it.
    pub fn item_by_id<D: ItemDocument>(&self, docs: &[D], id: ItemId) -> Option<Arc<ItemRecord>> {
        if id.is_nil() {
            return None;
        }
        self.repository.find_first(docs, |record| record.id == id)
    }

    /// The item at `path`, compared without case or trailing slash.
    pub fn item_by_path<D: ItemDocument>(&self, docs: &[D], path: &str) -> Option<Arc<ItemRecord>> {
        self.repository.find_first(docs, |record| record.path_matches(path))
    }

    // --- Existence ---

    pub fn exists_by_id<D: ItemDocument>(&self, docs: &[D], id: ItemId) -> bool {
        self.item_by_id(docs, id).is_some()
    }

    pub fn exists_by_path<D: ItemDocument>(&self, docs: &[D], path: &str) -> bool {
        self.item_by_path(docs, path).is_some()
    }

    // --- Fields ---

    /// Whether the item with id `id` is a template field.
    pub fn is_field<D: ItemDocument>(&self, docs: &[D], id: ItemId) -> bool {
        self.item_by_id(docs, id).is_some_and(|record| record.is_field())
    }

    /// First template field, in document order, whose name is `name`.
    pub fn is_field_named<D: ItemDocument>(
        &self,
        docs: &[D],
        name: &str,
    ) -> Option<Arc<ItemRecord>> {
        self.repository.find_first(docs, |record| {
            record.is_field()
                && record
                    .item_name()
                    .is_some_and(|item_name| eq_ignore_case(item_name, name))
        })
    }

    // --- Template compatibility ---

    /// Ids of the templates on which `field_id` may be used.
    pub fn allowed_templates<D: ItemDocument>(&self, docs: &[D], field_id: ItemId) -> Vec<ItemId> {
        self.resolver
            .templates_permitting_field(&self.repository, docs, field_id)
            .iter()
            .map(|record| record.id)
            .collect()
    }

    /// Whether `field_id` is present on template `template_id`, directly or
    /// through inheritance.
    pub fn field_permitted_on<D: ItemDocument>(
        &self,
        docs: &[D],
        field_id: ItemId,
        template_id: ItemId,
    ) -> bool {
        self.allowed_templates(docs, field_id).contains(&template_id)
    }

    /// Like `field_permitted_on`, with the template given by path.
    ///
    /// An unknown template path is not held against the field; the path
    /// itself is reported separately by `exists_by_path`.
    pub fn field_permitted_on_path<D: ItemDocument>(
        &self,
        docs: &[D],
        field_id: ItemId,
        template_path: &str,
    ) -> bool {
        match self.item_by_path(docs, template_path) {
            Some(template) => self.field_permitted_on(docs, field_id, template.id),
            None => {
                debug!(%field_id, template_path, "constraint template not found");
                true
            }
        }
    }

    // --- Combined check ---

    /// Check one reference the way an analyzer chains the queries above.
    ///
    /// `as_field` says whether the literal is used where a field is expected;
    /// `constraint` is a template the surrounding code narrows the item to.
    pub fn check_reference<D: ItemDocument>(
        &self,
        docs: &[D],
        reference: &ItemReference,
        as_field: bool,
        constraint: Option<&TemplateConstraint>,
    ) -> Finding {
        match reference {
            ItemReference::Id(id) => {
                let Some(record) = self.item_by_id(docs, *id) else {
                    return Finding::UnknownId;
                };
                if !as_field {
                    return Finding::Valid;
                }
                if !record.is_field() {
                    return Finding::NotAField;
                }
                match self.check_constraint(docs, record.id, constraint) {
                    Some(template) => Finding::FieldIdNotOnTemplate { template },
                    None => Finding::Valid,
                }
            }
            ItemReference::Path(path) => {
                if self.exists_by_path(docs, path) {
                    Finding::Valid
                } else {
                    Finding::UnknownPath
                }
            }
            ItemReference::FieldName(name) => {
                if !as_field {
                    return Finding::Valid;
                }
                let Some(record) = self.is_field_named(docs, name) else {
                    return Finding::UnknownFieldName;
                };
                match self.check_constraint(docs, record.id, constraint) {
                    Some(template) => Finding::FieldNameNotOnTemplate { template },
                    None => Finding::Valid,
                }
            }
        }
    }

    /// The constraint template `field_id` is missing from, if any.
    fn check_constraint<D: ItemDocument>(
        &self,
        docs: &[D],
        field_id: ItemId,
        constraint: Option<&TemplateConstraint>,
    ) -> Option<ItemId> {
        let template = match constraint? {
            TemplateConstraint::Id(id) => *id,
            TemplateConstraint::Path(path) => self.item_by_path(docs, path)?.id,
        };
        (!self.field_permitted_on(docs, field_id, template)).then_some(template)
    }
}

impl Default for ItemValidator {
    fn default() -> Self {
        Self::with_config(ResolverConfig::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::document::InMemoryDocument;

    const HOME_ID: &str = "c715d20b-2e73-4046-9b87-749a11c27c5c";
    const TEMPLATE_ID: &str = "f5cfa142-fd92-4cdc-a6d5-c20020398418";
    const SECTION_ID: &str = "38aa2f2c-7959-4bf6-9d26-42324904d9c8";
    const FIELD_ID: &str = "1ec9e41a-0d47-47ec-a0ac-2819edb60311";

    fn id(text: &str) -> ItemId {
        ItemId::parse(text).unwrap()
    }

    fn docs() -> Vec<InMemoryDocument> {
        vec![
            InMemoryDocument::new(
                "home.yml",
                format!("---\nID: \"{HOME_ID}\"\nPath: /sitecore/content/Home"),
            ),
            InMemoryDocument::new(
                "animal.yml",
                format!(
                    "---\nID: \"{TEMPLATE_ID}\"\nPath: /sitecore/templates/Animal template\nTemplate: ab86861a-6030-46c5-b394-e8f99e8b87db"
                ),
            ),
            InMemoryDocument::new(
                "section.yml",
                format!("---\nID: \"{SECTION_ID}\"\nParent: {TEMPLATE_ID}"),
            ),
            InMemoryDocument::new(
                "food.yml",
                format!(
                    "---\nID: \"{FIELD_ID}\"\nParent: {SECTION_ID}\nTemplate: 455a3e98-a627-4b40-8035-e683a0331ac7\nPath: /sitecore/templates/Animal template/Some section/Food that it likes"
                ),
            ),
        ]
    }

    #[test]
    fn exists_by_id_matches_only_known_ids() {
        let validator = ItemValidator::default();
        let docs = docs();
        assert!(validator.exists_by_id(&docs, id(HOME_ID)));
        assert!(validator.exists_by_id(&docs, id("{C715D20B-2E73-4046-9B87-749A11C27C5C}")));
        assert!(!validator.exists_by_id(&docs, id("8a4a4747-3278-437b-a12d-15d9ce6e1abf")));
        assert!(!validator.exists_by_id(&docs, ItemId::NIL));
    }

    #[test]
    fn nil_id_never_matches_unparsed_documents() {
        let validator = ItemValidator::default();
        let docs = vec![InMemoryDocument::new("broken.yml", "not an item")];
        assert!(!validator.exists_by_id(&docs, ItemId::NIL));
    }

    #[test]
    fn exists_by_path_ignores_case_and_trailing_slash() {
        let validator = ItemValidator::default();
        let docs = docs();
        assert!(validator.exists_by_path(&docs, "/sitecore/content/Home"));
        assert!(validator.exists_by_path(&docs, "/SITECORE/CONTENT/HOME/"));
        assert!(!validator.exists_by_path(&docs, "/sitecore/content/Away"));
    }

    #[test]
    fn item_by_id_returns_path() {
        let validator = ItemValidator::default();
        let record = validator.item_by_id(&docs(), id(HOME_ID)).unwrap();
        assert_eq!(record.path.as_deref(), Some("/sitecore/content/Home"));
        assert_eq!(record.item_name(), Some("Home"));
    }

    #[test]
    fn is_field_checks_template() {
        let validator = ItemValidator::default();
        let docs = docs();
        assert!(validator.is_field(&docs, id(FIELD_ID)));
        assert!(!validator.is_field(&docs, id(HOME_ID)));
        assert!(!validator.is_field(&docs, id("8a4a4747-3278-437b-a12d-15d9ce6e1abf")));
    }

    #[test]
    fn is_field_named_ignores_case() {
        let validator = ItemValidator::default();
        let docs = docs();
        let field = validator.is_field_named(&docs, "food THAT it likes").unwrap();
        assert_eq!(field.id, id(FIELD_ID));
        assert!(validator.is_field_named(&docs, "Home").is_none());
    }

    #[test]
    fn field_permitted_on_owner() {
        let validator = ItemValidator::default();
        let docs = docs();
        assert!(validator.field_permitted_on(&docs, id(FIELD_ID), id(TEMPLATE_ID)));
        assert!(!validator.field_permitted_on(&docs, id(FIELD_ID), id(HOME_ID)));
        assert_eq!(validator.allowed_templates(&docs, id(FIELD_ID)), vec![id(TEMPLATE_ID)]);
    }

    #[test]
    fn field_permitted_on_path_resolves_template() {
        let validator = ItemValidator::default();
        let docs = docs();
        assert!(validator.field_permitted_on_path(
            &docs,
            id(FIELD_ID),
            "/sitecore/templates/animal template"
        ));
        assert!(!validator.field_permitted_on_path(&docs, id(FIELD_ID), "/sitecore/content/Home"));
        assert!(validator.field_permitted_on_path(
            &docs,
            id(FIELD_ID),
            "/sitecore/templates/Unknown"
        ));
    }

    #[test]
    fn check_reference_reports_each_finding() {
        let validator = ItemValidator::default();
        let docs = docs();

        let unknown = ItemReference::Id(id("8a4a4747-3278-437b-a12d-15d9ce6e1abf"));
        assert_eq!(validator.check_reference(&docs, &unknown, false, None), Finding::UnknownId);

        let home = ItemReference::Id(id(HOME_ID));
        assert_eq!(validator.check_reference(&docs, &home, false, None), Finding::Valid);
        assert_eq!(validator.check_reference(&docs, &home, true, None), Finding::NotAField);

        let path = ItemReference::Path("/sitecore/content/Nowhere".into());
        assert_eq!(validator.check_reference(&docs, &path, false, None), Finding::UnknownPath);

        let name = ItemReference::FieldName("Color".into());
        assert_eq!(validator.check_reference(&docs, &name, true, None), Finding::UnknownFieldName);
        assert_eq!(validator.check_reference(&docs, &name, false, None), Finding::Valid);
    }

    #[test]
    fn check_reference_applies_template_constraint() {
        let validator = ItemValidator::default();
        let docs = docs();
        let field = ItemReference::FieldName("Food that it likes".into());

        let on_owner = TemplateConstraint::Id(id(TEMPLATE_ID));
        assert_eq!(validator.check_reference(&docs, &field, true, Some(&on_owner)), Finding::Valid);

        let elsewhere = TemplateConstraint::Path("/sitecore/content/Home".into());
        assert_eq!(
            validator.check_reference(&docs, &field, true, Some(&elsewhere)),
            Finding::FieldNameNotOnTemplate { template: id(HOME_ID) }
        );
    }

    #[test]
    fn check_reference_reports_field_id_on_wrong_template() {
        let validator = ItemValidator::default();
        let docs = docs();
        let field = ItemReference::Id(id(FIELD_ID));
        let home = TemplateConstraint::Id(id(HOME_ID));

        let finding = validator.check_reference(&docs, &field, true, Some(&home));
        assert_eq!(finding, Finding::FieldIdNotOnTemplate { template: id(HOME_ID) });
        assert_eq!(finding.code(), Some("RainbowDataAnalyzerTemplateFieldIds"));
    }

    #[test]
    fn lookups_fold_non_ascii_case() {
        let validator = ItemValidator::default();
        let docs = vec![
            InMemoryDocument::new(
                "about.yml",
                format!("---\nID: \"{HOME_ID}\"\nPath: /sitecore/content/Über uns"),
            ),
            InMemoryDocument::new(
                "size.yml",
                format!(
                    "---\nID: \"{FIELD_ID}\"\nTemplate: 455a3e98-a627-4b40-8035-e683a0331ac7\nPath: /sitecore/templates/T/Größe"
                ),
            ),
        ];

        assert!(validator.exists_by_path(&docs, "/sitecore/content/über uns"));
        let field = validator.is_field_named(&docs, "gRÖße").unwrap();
        assert_eq!(field.id, id(FIELD_ID));
    }

    #[test]
    fn finding_codes() {
        assert_eq!(Finding::Valid.code(), None);
        assert_eq!(Finding::UnknownId.code(), Some("RainbowDataAnalyzerIds"));
        assert_eq!(Finding::UnknownPath.code(), Some("RainbowDataAnalyzerPaths"));
        assert_eq!(Finding::NotAField.code(), Some("RainbowDataAnalyzerFieldIds"));
        assert_eq!(Finding::UnknownFieldName.code(), Some("RainbowDataAnalyzerFieldPaths"));
        let template = id(TEMPLATE_ID);
        assert_eq!(
            Finding::FieldIdNotOnTemplate { template }.code(),
            Some("RainbowDataAnalyzerTemplateFieldIds")
        );
        assert_eq!(
            Finding::FieldNameNotOnTemplate { template }.code(),
            Some("RainbowDataAnalyzerTemplateFieldPaths")
        );
        assert!(Finding::Valid.is_valid());
        assert!(!Finding::NotAField.is_valid());
        let json = serde_json::to_value(Finding::UnknownPath).unwrap();
        assert_eq!(json["finding"], "unknown-path");
    }
}
