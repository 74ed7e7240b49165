//! Loading item documents from a directory tree.

use std::path::Path;

use anyhow::{Context, Result};
use rainbow_items::InMemoryDocument;
use tracing::{debug, trace};
use walkdir::WalkDir;

use crate::config::CliConfig;

/// Read every item document below `root`, sorted by path.
///
/// Sorting keeps "first match wins" lookups stable across runs and
/// platforms. Unreadable directories are skipped; unreadable files are an
/// error.
pub fn load_documents(root: &Path, config: &CliConfig) -> Result<Vec<InMemoryDocument>> {
    if !root.is_dir() {
        anyhow::bail!("item directory not found: {}", root.display());
    }

    let mut paths: Vec<_> = WalkDir::new(root)
        .follow_links(true)
        .into_iter()
        .filter_map(|entry| match entry {
            Ok(entry) => Some(entry),
            Err(e) => {
                debug!(error = %e, "skipping unreadable entry");
                None
            }
        })
        .filter(|entry| entry.file_type().is_file())
        .map(|entry| entry.into_path())
        .filter(|path| {
            path.extension()
                .and_then(|ext| ext.to_str())
                .is_some_and(|ext| config.accepts_extension(ext))
        })
        .collect();
    paths.sort();

    let documents = paths
        .iter()
        .map(|path| {
            trace!(path = %path.display(), "reading item document");
            InMemoryDocument::from_file(path)
                .with_context(|| format!("loading {}", path.display()))
        })
        .collect::<Result<Vec<_>>>()?;

    debug!(root = %root.display(), count = documents.len(), "loaded item documents");
    Ok(documents)
}
