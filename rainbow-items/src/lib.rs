//! Serialized item index and template resolution
//!
//! `rainbow-items` checks references to content items against a set of
//! serialized item documents (Rainbow `.yml` files). It answers three
//! questions for a code analyzer: does an id or path exist, is it a template
//! field, and is that field present on a given template, directly or through
//! template inheritance.
//!
//! # Architecture
//!
//! - **Line parser**: `parser::parse_item` reads the few attributes that
//!   matter from one document and never fails
//! - **Fingerprinted cache**: `ItemRepository` parses each document once per
//!   distinct text and is shared between concurrent queries
//! - **On-demand inheritance**: `TemplateResolver` walks base template edges
//!   backwards with a depth limit, recomputed for every query
//! - **Host-owned documents**: callers supply `ItemDocument`s; nothing here
//!   walks the file system or keeps global state

pub mod constants;
pub mod document;
pub mod error;
pub mod id;
pub mod parser;
pub mod repository;
pub mod templates;
pub mod types;
pub mod validation;

pub use constants::{
    BASE_TEMPLATE_FIELD_ID, DEFAULT_MAX_DERIVATION_DEPTH, TEMPLATE_FIELD_ID, TEMPLATE_TEMPLATE_ID,
};
pub use document::{Fingerprint, InMemoryDocument, ItemDocument};
pub use error::{ItemsError, Result};
pub use id::ItemId;
pub use parser::parse_item;
pub use repository::ItemRepository;
pub use templates::{Derivation, ResolverConfig, TemplateResolver};
pub use types::ItemRecord;
pub use validation::{Finding, ItemReference, ItemValidator, TemplateConstraint};
