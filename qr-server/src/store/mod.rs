//! Keyed store interface
//!
//! The backing store is a collection-oriented key-value service with
//! secondary indexes, paged reads and additive counter updates. There are no
//! multi-item transactions: every call is a single remote operation, and a
//! sequence of calls carries no atomicity whatsoever. Repositories are built
//! on this seam; the in-memory engine ([`MemoryStore`]) implements it for the
//! default binary and for tests.

pub mod cursor;
pub mod memory;

pub use memory::MemoryStore;

use async_trait::async_trait;
use serde_json::{Map, Value};
use thiserror::Error;

/// A stored item as the store sees it: a flat JSON object map.
pub type Document = Map<String, Value>;

/// Store-native "resume from here" marker returned by a paged read.
///
/// Opaque to everything above the cursor codec.
pub type ContinuationKey = Value;

/// Hard cap on items per physical batch-put call, imposed by the store.
pub const MAX_BATCH_ITEMS: usize = 25;

/// Store error types
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("unknown collection: {0}")]
    UnknownCollection(String),

    #[error("unknown index {index} on collection {collection}")]
    UnknownIndex { collection: String, index: String },

    #[error("no document with key {pk} in {collection}")]
    NoSuchDocument { collection: String, pk: String },

    #[error("batch of {0} items exceeds the {MAX_BATCH_ITEMS}-item batch limit")]
    BatchTooLarge(usize),

    #[error("document in {collection} is missing attribute {attribute}")]
    MissingAttribute {
        collection: String,
        attribute: String,
    },

    #[error("malformed continuation key")]
    BadContinuation,

    #[error("storage backend error: {0}")]
    Backend(String),
}

/// Result type for store operations
pub type StoreResult<T> = Result<T, StoreError>;

/// Secondary index declaration: a named projection over one or more string
/// attributes of a collection's documents.
#[derive(Debug, Clone, Copy)]
pub struct IndexDef {
    pub name: &'static str,
    pub attributes: &'static [&'static str],
}

/// Collection declaration: primary-key attribute plus secondary indexes.
#[derive(Debug, Clone, Copy)]
pub struct CollectionSchema {
    pub name: &'static str,
    pub key_attribute: &'static str,
    pub indexes: &'static [IndexDef],
}

/// Options accepted by every paged read.
#[derive(Debug, Clone, Default)]
pub struct QueryOptions {
    /// Resume position issued by a previous page, passed back verbatim.
    pub start_key: Option<ContinuationKey>,
    /// Page size. The engine returns everything remaining when absent.
    pub limit: Option<usize>,
}

/// One page of results. `last_key` is absent when the read is exhausted.
#[derive(Debug, Default)]
pub struct Page {
    pub items: Vec<Document>,
    pub count: usize,
    pub last_key: Option<ContinuationKey>,
}

/// Predicate applied by the store during a scan.
///
/// Only the few "ALL"-status listings scan, and only to keep sentinel or
/// placeholder rows out of the result set.
#[derive(Debug, Clone)]
pub enum ScanFilter {
    /// Keep documents whose attribute differs from the given value
    /// (documents missing the attribute pass).
    NotEq(&'static str, Value),
}

impl ScanFilter {
    fn matches(&self, doc: &Document) -> bool {
        match self {
            ScanFilter::NotEq(attribute, value) => doc.get(*attribute) != Some(value),
        }
    }
}

/// The store interface consumed by every repository.
#[async_trait]
pub trait KeyStore: Send + Sync {
    /// Point read by primary key.
    async fn get(&self, collection: &str, pk: &str) -> StoreResult<Option<Document>>;

    /// Paged read of every document whose index key equals `key` (one value
    /// per index attribute, in declaration order).
    async fn query_index(
        &self,
        collection: &str,
        index: &str,
        key: &[&str],
        opts: QueryOptions,
    ) -> StoreResult<Page>;

    /// Paged read over the whole collection, optionally filtered.
    async fn scan(
        &self,
        collection: &str,
        filter: Option<ScanFilter>,
        opts: QueryOptions,
    ) -> StoreResult<Page>;

    /// Insert or fully replace one document.
    async fn put(&self, collection: &str, doc: Document) -> StoreResult<()>;

    /// Delete by primary key. Deleting a missing document is a no-op.
    async fn delete(&self, collection: &str, pk: &str) -> StoreResult<()>;

    /// Additive update of one numeric attribute on one existing document.
    ///
    /// Commutative under concurrent application; the document must exist.
    async fn add(&self, collection: &str, pk: &str, attribute: &str, delta: i64)
    -> StoreResult<()>;

    /// Insert or replace up to [`MAX_BATCH_ITEMS`] documents in one physical
    /// call. Carries no atomicity: the caller chunks larger batches and a
    /// failure partway through a chunk sequence leaves earlier chunks in
    /// place.
    async fn batch_put(&self, collection: &str, docs: Vec<Document>) -> StoreResult<()>;
}
