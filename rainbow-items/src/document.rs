//! Item documents as handed in by the host.
//!
//! The index never reads files itself. A host (an analyzer, an editor, the
//! CLI) supplies documents that expose a stable identity, their current text
//! and a fingerprint of that text.

use std::borrow::Cow;
use std::fmt;
use std::path::Path;
use std::sync::Arc;

use crate::error::{ItemsError, Result};

/// Content hash used to decide whether a cached parse is stale.
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct Fingerprint([u8; 16]);

impl Fingerprint {
    /// Fingerprint of a document text.
    pub fn of(text: &str) -> Self {
        Fingerprint(md5::compute(text.as_bytes()).into())
    }

    /// Raw digest bytes
    pub fn as_bytes(&self) -> &[u8; 16] {
        &self.0
    }
}

impl fmt::Debug for Fingerprint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Fingerprint(")?;
        for byte in &self.0 {
            write!(f, "{byte:02x}")?;
        }
        write!(f, ")")
    }
}

/// A serialized item document supplied by the host.
pub trait ItemDocument: Send + Sync {
    /// Stable handle for the document, typically its file path.
    fn identity(&self) -> &str;

    /// Current text of the document.
    fn text(&self) -> Cow<'_, str>;

    /// Current text together with its fingerprint, read in one go so the
    /// two always describe the same content.
    ///
    /// Hosts that already track a content hash can override this to avoid
    /// hashing the text on every lookup.
    fn snapshot(&self) -> (Cow<'_, str>, Fingerprint) {
        let text = self.text();
        let fingerprint = Fingerprint::of(&text);
        (text, fingerprint)
    }

    /// Fingerprint of the current text.
    fn fingerprint(&self) -> Fingerprint {
        self.snapshot().1
    }
}

impl<T: ItemDocument + ?Sized> ItemDocument for Box<T> {
    fn identity(&self) -> &str {
        (**self).identity()
    }

    fn text(&self) -> Cow<'_, str> {
        (**self).text()
    }

    fn snapshot(&self) -> (Cow<'_, str>, Fingerprint) {
        (**self).snapshot()
    }
}

impl<T: ItemDocument + ?Sized> ItemDocument for Arc<T> {
    fn identity(&self) -> &str {
        (**self).identity()
    }

    fn text(&self) -> Cow<'_, str> {
        (**self).text()
    }

    fn snapshot(&self) -> (Cow<'_, str>, Fingerprint) {
        (**self).snapshot()
    }
}

/// An owned document held entirely in memory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InMemoryDocument {
    identity: String,
    text: String,
}

impl InMemoryDocument {
    pub fn new(identity: impl Into<String>, text: impl Into<String>) -> Self {
        Self {
            identity: identity.into(),
            text: text.into(),
        }
    }

    /// Read a document from disk, keyed by its path.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|source| ItemsError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Ok(Self::new(path.to_string_lossy(), text))
    }

    /// Replace the text, as an editor would on change.
    pub fn set_text(&mut self, text: impl Into<String>) {
        self.text = text.into();
    }
}

impl ItemDocument for InMemoryDocument {
    fn identity(&self) -> &str {
        &self.identity
    }

    fn text(&self) -> Cow<'_, str> {
        Cow::Borrowed(&self.text)
    }
}
