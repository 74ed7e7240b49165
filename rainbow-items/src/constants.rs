//! Well-known identifiers and serialization keys

use crate::id::ItemId;

/// Template of every template field item
pub const TEMPLATE_FIELD_ID: ItemId = ItemId::from_u128(0x455A3E98_A627_4B40_8035_E683A0331AC7);

/// Template of every template item
pub const TEMPLATE_TEMPLATE_ID: ItemId = ItemId::from_u128(0xAB86861A_6030_46C5_B394_E8F99E8B87DB);

/// Shared field that holds a template's base templates
pub const BASE_TEMPLATE_FIELD_ID: ItemId =
    ItemId::from_u128(0x12C33F3F_86C5_43A5_AEB4_5598CEC45116);

/// Default ceiling on inheritance levels followed when resolving templates
pub const DEFAULT_MAX_DERIVATION_DEPTH: usize = 200;

pub(crate) const ID_KEY: &str = "ID: ";
pub(crate) const PARENT_KEY: &str = "Parent: ";
pub(crate) const TEMPLATE_KEY: &str = "Template: ";
pub(crate) const PATH_KEY: &str = "Path: ";
pub(crate) const VALUE_KEY: &str = "Value: ";
pub(crate) const LIST_ITEM_ID_KEY: &str = "- ID: ";
