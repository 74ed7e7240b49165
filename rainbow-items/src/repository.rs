//! ItemRepository: the in-memory index of parsed item documents.
//!
//! Documents are parsed lazily, the first time a query touches them, and
//! cached by identity together with the fingerprint of the text they were
//! parsed from. A later lookup with an unchanged fingerprint reuses the
//! cached record; a changed fingerprint triggers a re-parse.
//!
//! One repository is meant to live for one validation session. It is shared
//! between concurrent queries behind an `Arc`, and every fingerprint check
//! plus store happens under a single lock so a reader never sees a record
//! paired with the wrong fingerprint.

use std::collections::BTreeMap;
use std::fmt;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use tracing::{debug, trace};

use crate::document::{Fingerprint, ItemDocument};
use crate::parser::parse_item;
use crate::types::ItemRecord;

/// Function used to turn document text into a record.
pub type ParseFn = Arc<dyn Fn(&str) -> ItemRecord + Send + Sync>;

/// A cached parse, replaced as a unit so the pair never tears.
#[derive(Clone)]
struct CacheEntry {
    fingerprint: Fingerprint,
    record: Arc<ItemRecord>,
}

/// Memoizing index from document identity to parsed record.
pub struct ItemRepository {
    parser: ParseFn,
    entries: Mutex<BTreeMap<String, CacheEntry>>,
    parse_count: AtomicUsize,
}

impl ItemRepository {
    /// Create an empty repository using the standard item parser.
    pub fn new() -> Self {
        Self::with_parser(parse_item)
    }

    /// Create an empty repository with a custom parse function.
    pub fn with_parser<F>(parser: F) -> Self
    where
        F: Fn(&str) -> ItemRecord + Send + Sync + 'static,
    {
        Self {
            parser: Arc::new(parser),
            entries: Mutex::new(BTreeMap::new()),
            parse_count: AtomicUsize::new(0),
        }
    }

    /// Resolve one document to its record, parsing only when its text changed.
    pub fn resolve<D: ItemDocument + ?Sized>(&self, doc: &D) -> Arc<ItemRecord> {
        let identity = doc.identity();
        let (text, fingerprint) = doc.snapshot();

        let mut entries = self.entries();
        if let Some(entry) = entries.get(identity) {
            if entry.fingerprint == fingerprint {
                trace!(%identity, "item cache hit");
                return entry.record.clone();
            }
            debug!(%identity, "item changed, re-parsing");
        } else {
            debug!(%identity, "parsing new item");
        }

        let record = Arc::new((self.parser)(&*text));
        self.parse_count.fetch_add(1, Ordering::Relaxed);
        entries.insert(
            identity.to_string(),
            CacheEntry {
                fingerprint,
                record: record.clone(),
            },
        );
        record
    }

    /// Make sure every document is parsed and current.
    pub fn warm_all<D: ItemDocument>(&self, docs: &[D]) {
        for doc in docs {
            self.resolve(doc);
        }
    }

    /// Resolve every document and return the records in document order.
    pub fn records<D: ItemDocument>(&self, docs: &[D]) -> Vec<Arc<ItemRecord>> {
        docs.iter().map(|doc| self.resolve(doc)).collect()
    }

    /// First record, in document order, accepted by `predicate`.
    ///
    /// Stops resolving as soon as a match is found.
    pub fn find_first<D, P>(&self, docs: &[D], mut predicate: P) -> Option<Arc<ItemRecord>>
    where
        D: ItemDocument,
        P: FnMut(&ItemRecord) -> bool,
    {
        docs.iter()
            .map(|doc| self.resolve(doc))
            .find(|record| predicate(record))
    }

    /// Combined form of `warm_all` and `find_first`: without a predicate
    /// every document is resolved and nothing is returned.
    pub fn evaluate<D, P>(&self, docs: &[D], predicate: Option<P>) -> Option<Arc<ItemRecord>>
    where
        D: ItemDocument,
        P: FnMut(&ItemRecord) -> bool,
    {
        match predicate {
            Some(predicate) => self.find_first(docs, predicate),
            None => {
                self.warm_all(docs);
                None
            }
        }
    }

    /// All cached records, ordered by document identity.
    pub fn snapshot(&self) -> Vec<Arc<ItemRecord>> {
        self.entries()
            .values()
            .map(|entry| entry.record.clone())
            .collect()
    }

    /// Whether a document identity has been cached.
    pub fn contains(&self, identity: &str) -> bool {
        self.entries().contains_key(identity)
    }

    /// Drop a document from the cache. Returns whether it was present.
    pub fn forget(&self, identity: &str) -> bool {
        self.entries().remove(identity).is_some()
    }

    /// Number of cached documents
    pub fn len(&self) -> usize {
        self.entries().len()
    }

    /// Whether nothing has been cached yet
    pub fn is_empty(&self) -> bool {
        self.entries().is_empty()
    }

    /// Total number of parses performed by this repository.
    pub fn parse_count(&self) -> usize {
        self.parse_count.load(Ordering::Relaxed)
    }

    // A panic while holding the lock cannot leave a half-written entry,
    // because entries are inserted whole, so a poisoned lock is still usable.
    fn entries(&self) -> MutexGuard<'_, BTreeMap<String, CacheEntry>> {
        self.entries.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl Default for ItemRepository {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for ItemRepository {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ItemRepository")
            .field("documents", &self.len())
            .field("parse_count", &self.parse_count())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::document::InMemoryDocument;
    use crate::id::ItemId;
    use std::borrow::Cow;

    fn doc(identity: &str, id: &str) -> InMemoryDocument {
        InMemoryDocument::new(identity, format!("---\nID: {id}\nPath: /sitecore/{identity}"))
    }

    fn counting_repository() -> (ItemRepository, Arc<AtomicUsize>) {
        let calls = Arc::new(AtomicUsize::new(0));
        let counter = calls.clone();
        let repo = ItemRepository::with_parser(move |text| {
            counter.fetch_add(1, Ordering::SeqCst);
            parse_item(text)
        });
        (repo, calls)
    }

    #[test]
    fn resolve_parses_once_while_unchanged() {
        let (repo, calls) = counting_repository();
        let home = doc("home", "c715d20b-2e73-4046-9b87-749a11c27c5c");

        let first = repo.resolve(&home);
        let second = repo.resolve(&home);

        assert_eq!(calls.load(Ordering::SeqCst), 1);
        assert_eq!(repo.parse_count(), 1);
        assert!(Arc::ptr_eq(&first, &second));
    }

    #[test]
    fn resolve_reparses_changed_text() {
        let (repo, calls) = counting_repository();
        let mut home = doc("home", "c715d20b-2e73-4046-9b87-749a11c27c5c");
        repo.resolve(&home);

        home.set_text("ID: 8a4a4747-3278-437b-a12d-15d9ce6e1abf");
        let updated = repo.resolve(&home);

        assert_eq!(calls.load(Ordering::SeqCst), 2);
        assert_eq!(updated.id, ItemId::parse("8a4a4747-3278-437b-a12d-15d9ce6e1abf").unwrap());
        assert_eq!(repo.len(), 1);
    }

    #[test]
    fn find_first_short_circuits() {
        let (repo, calls) = counting_repository();
        let docs = vec![
            doc("a", "c715d20b-2e73-4046-9b87-749a11c27c5c"),
            doc("b", "8a4a4747-3278-437b-a12d-15d9ce6e1abf"),
            doc("c", "29fe9b4e-bda0-420f-97ca-ce1421cd9cc8"),
        ];
        let wanted = ItemId::parse("8a4a4747-3278-437b-a12d-15d9ce6e1abf").unwrap();

        let found = repo.find_first(&docs, |record| record.id == wanted).unwrap();

        assert_eq!(found.path.as_deref(), Some("/sitecore/b"));
        assert_eq!(calls.load(Ordering::SeqCst), 2);
        assert!(!repo.contains("c"));
    }

    #[test]
    fn find_first_prefers_document_order() {
        let repo = ItemRepository::new();
        let docs = vec![
            InMemoryDocument::new("z", "ID: c715d20b-2e73-4046-9b87-749a11c27c5c\nPath: /first"),
            InMemoryDocument::new("a", "ID: c715d20b-2e73-4046-9b87-749a11c27c5c\nPath: /second"),
        ];
        let found = repo.find_first(&docs, |record| !record.is_unparsed()).unwrap();
        assert_eq!(found.path.as_deref(), Some("/first"));
    }

    #[test]
    fn evaluate_without_predicate_warms_everything() {
        let repo = ItemRepository::new();
        let docs = vec![
            doc("a", "c715d20b-2e73-4046-9b87-749a11c27c5c"),
            doc("b", "8a4a4747-3278-437b-a12d-15d9ce6e1abf"),
        ];

        let found = repo.evaluate(&docs, None::<fn(&ItemRecord) -> bool>);

        assert!(found.is_none());
        assert_eq!(repo.len(), 2);
        assert_eq!(repo.snapshot().len(), 2);
    }

    #[test]
    fn evaluate_with_predicate_finds_match() {
        let repo = ItemRepository::new();
        let docs = vec![doc("a", "c715d20b-2e73-4046-9b87-749a11c27c5c")];
        let found = repo.evaluate(
            &docs,
            Some(|record: &ItemRecord| record.path_matches("/sitecore/a")),
        );
        assert!(found.is_some());
    }

    #[test]
    fn snapshot_is_ordered_by_identity() {
        let repo = ItemRepository::new();
        let docs = vec![
            doc("b", "8a4a4747-3278-437b-a12d-15d9ce6e1abf"),
            doc("a", "c715d20b-2e73-4046-9b87-749a11c27c5c"),
        ];
        repo.warm_all(&docs);

        let paths: Vec<_> = repo
            .snapshot()
            .iter()
            .map(|record| record.path.clone().unwrap())
            .collect();
        assert_eq!(paths, vec!["/sitecore/a", "/sitecore/b"]);
    }

    #[test]
    fn records_follow_document_order() {
        let repo = ItemRepository::new();
        let docs = vec![
            doc("b", "8a4a4747-3278-437b-a12d-15d9ce6e1abf"),
            doc("a", "c715d20b-2e73-4046-9b87-749a11c27c5c"),
        ];
        let records = repo.records(&docs);
        assert_eq!(records[0].path.as_deref(), Some("/sitecore/b"));
        assert_eq!(records[1].path.as_deref(), Some("/sitecore/a"));
    }

    #[test]
    fn forget_drops_entry() {
        let repo = ItemRepository::new();
        let home = doc("home", "c715d20b-2e73-4046-9b87-749a11c27c5c");
        repo.resolve(&home);

        assert!(repo.forget("home"));
        assert!(!repo.forget("home"));
        assert!(repo.is_empty());

        repo.resolve(&home);
        assert_eq!(repo.parse_count(), 2);
    }

    /// Document whose text changes on every read, like a buffer being typed into.
    struct ChangingDocument {
        reads: AtomicUsize,
    }

    impl ItemDocument for ChangingDocument {
        fn identity(&self) -> &str {
            "live"
        }

        fn text(&self) -> Cow<'_, str> {
            let n = self.reads.fetch_add(1, Ordering::SeqCst) + 1;
            Cow::Owned(format!("ID: 00000000-0000-0000-0000-{n:012}"))
        }
    }

    #[test]
    fn cached_fingerprint_belongs_to_parsed_text() {
        let repo = ItemRepository::new();
        let live = ChangingDocument {
            reads: AtomicUsize::new(0),
        };

        let record = repo.resolve(&live);
        assert_eq!(live.reads.load(Ordering::SeqCst), 1);
        assert_eq!(record.id, ItemId::from_u128(1));

        // Same identity, same text as the first read: must be a cache hit.
        let settled = InMemoryDocument::new("live", "ID: 00000000-0000-0000-0000-000000000001");
        let again = repo.resolve(&settled);
        assert_eq!(repo.parse_count(), 1);
        assert!(Arc::ptr_eq(&record, &again));
    }

    #[test]
    fn boxed_documents_resolve() {
        let repo = ItemRepository::new();
        let docs: Vec<Box<dyn ItemDocument>> = vec![Box::new(doc(
            "home",
            "c715d20b-2e73-4046-9b87-749a11c27c5c",
        ))];
        repo.warm_all(&docs);
        assert!(repo.contains("home"));
    }
}
