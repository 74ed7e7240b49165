//! Error types for the item index
//!
//! The query surface itself never fails: malformed serialized items degrade
//! to absent values. Errors only arise at the edges, when reading documents
//! from disk, parsing identifiers handed in by a caller, or loading settings.

use std::path::PathBuf;
use thiserror::Error;

/// Result type for item index operations
pub type Result<T> = std::result::Result<T, ItemsError>;

/// Errors that can occur at the boundaries of the item index
#[derive(Debug, Error)]
pub enum ItemsError {
    /// A caller-supplied identifier did not parse
    #[error("invalid item id: {value}")]
    InvalidId { value: String },

    /// An item document could not be read
    #[error("failed to read item document {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Settings were present but unusable
    #[error("invalid configuration: {message}")]
    Config { message: String },
}

impl ItemsError {
    /// Create an invalid id error
    pub fn invalid_id(value: impl Into<String>) -> Self {
        ItemsError::InvalidId {
            value: value.into(),
        }
    }

    /// Create a configuration error
    pub fn config(message: impl Into<String>) -> Self {
        ItemsError::Config {
            message: message.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = ItemsError::invalid_id("not-a-guid");
        assert_eq!(err.to_string(), "invalid item id: not-a-guid");
    }

    #[test]
    fn test_read_error_names_path() {
        let err = ItemsError::Read {
            path: PathBuf::from("/items/home.yml"),
            source: std::io::Error::new(std::io::ErrorKind::NotFound, "gone"),
        };
        assert!(err.to_string().contains("/items/home.yml"));
        assert!(err.to_string().contains("gone"));
    }

    #[test]
    fn test_config_error() {
        let err = ItemsError::config("max_depth must be positive");
        assert!(err.to_string().contains("max_depth must be positive"));
    }
}
