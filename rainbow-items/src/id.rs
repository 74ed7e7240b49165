//! Item identifiers
//!
//! Serialized items spell the same identifier in several ways: lower or
//! upper case hex, with or without braces, sometimes quoted. `ItemId`
//! normalizes all of them into one comparable value.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use uuid::Uuid;

use crate::error::ItemsError;

/// A 128-bit item identifier. `ItemId::NIL` marks "not set".
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default)]
pub struct ItemId(Uuid);

impl ItemId {
    /// The unset identifier
    pub const NIL: ItemId = ItemId(Uuid::nil());

    /// Build an identifier from a compile-time constant.
    pub const fn from_u128(value: u128) -> Self {
        ItemId(Uuid::from_u128(value))
    }

    /// Parse an identifier as it appears in a serialized item.
    ///
    /// Surrounding whitespace, double quotes and pipes are ignored, and the
    /// braced, hyphenated, simple and urn forms are all accepted.
    pub fn parse(text: &str) -> Option<Self> {
        let trimmed = text.trim_matches(|c: char| c.is_whitespace() || c == '"' || c == '|');
        Uuid::parse_str(trimmed).ok().map(ItemId)
    }

    /// Whether this is the unset identifier
    pub fn is_nil(&self) -> bool {
        self.0.is_nil()
    }

    /// The underlying uuid
    pub fn as_uuid(&self) -> &Uuid {
        &self.0
    }
}

impl From<Uuid> for ItemId {
    fn from(value: Uuid) -> Self {
        ItemId(value)
    }
}

impl fmt::Display for ItemId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0.hyphenated())
    }
}

impl FromStr for ItemId {
    type Err = ItemsError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        ItemId::parse(s).ok_or_else(|| ItemsError::invalid_id(s))
    }
}

impl Serialize for ItemId {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for ItemId {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let text = String::deserialize(deserializer)?;
        ItemId::parse(&text)
            .ok_or_else(|| serde::de::Error::custom(format!("invalid item id: {text}")))
    }
}
