//! In-memory store engine
//!
//! BTreeMap-backed collections with maintained secondary indexes. Documents
//! are kept in primary-key order, index postings in key order, which makes
//! continuation keys a plain `{"pk": ...}` marker: a page resumes strictly
//! after the last primary key it handed out.

use std::collections::{BTreeMap, BTreeSet, HashMap};

use async_trait::async_trait;
use parking_lot::RwLock;
use serde_json::{Value, json};

use super::{
    CollectionSchema, ContinuationKey, Document, KeyStore, MAX_BATCH_ITEMS, Page, QueryOptions,
    ScanFilter, StoreError, StoreResult,
};

struct Collection {
    schema: CollectionSchema,
    rows: BTreeMap<String, Document>,
    /// index name -> index key tuple -> primary keys
    postings: HashMap<&'static str, BTreeMap<Vec<String>, BTreeSet<String>>>,
}

impl Collection {
    fn new(schema: CollectionSchema) -> Self {
        let postings = schema
            .indexes
            .iter()
            .map(|idx| (idx.name, BTreeMap::new()))
            .collect();
        Self {
            schema,
            rows: BTreeMap::new(),
            postings,
        }
    }

    fn primary_key(&self, doc: &Document) -> StoreResult<String> {
        doc.get(self.schema.key_attribute)
            .and_then(Value::as_str)
            .map(str::to_owned)
            .ok_or_else(|| StoreError::MissingAttribute {
                collection: self.schema.name.to_string(),
                attribute: self.schema.key_attribute.to_string(),
            })
    }

    /// Index key tuple for a document, or None when any indexed attribute is
    /// absent (sparse index: such documents simply do not appear in it).
    fn index_key(attributes: &[&str], doc: &Document) -> Option<Vec<String>> {
        attributes
            .iter()
            .map(|attr| doc.get(*attr).and_then(Value::as_str).map(str::to_owned))
            .collect()
    }

    fn index_insert(&mut self, pk: &str, doc: &Document) {
        for idx in self.schema.indexes {
            if let Some(key) = Self::index_key(idx.attributes, doc)
                && let Some(entries) = self.postings.get_mut(idx.name)
            {
                entries.entry(key).or_default().insert(pk.to_owned());
            }
        }
    }

    fn index_remove(&mut self, pk: &str, doc: &Document) {
        for idx in self.schema.indexes {
            let Some(key) = Self::index_key(idx.attributes, doc) else {
                continue;
            };
            if let Some(entries) = self.postings.get_mut(idx.name)
                && let Some(pks) = entries.get_mut(&key)
            {
                pks.remove(pk);
                if pks.is_empty() {
                    entries.remove(&key);
                }
            }
        }
    }

    fn insert(&mut self, doc: Document) -> StoreResult<()> {
        let pk = self.primary_key(&doc)?;
        if let Some(previous) = self.rows.remove(&pk) {
            self.index_remove(&pk, &previous);
        }
        self.index_insert(&pk, &doc);
        self.rows.insert(pk, doc);
        Ok(())
    }
}

pub struct MemoryStore {
    collections: RwLock<HashMap<&'static str, Collection>>,
}

impl MemoryStore {
    /// Build an engine with the given collections registered.
    pub fn new(schemas: &[CollectionSchema]) -> Self {
        let collections = schemas
            .iter()
            .map(|schema| (schema.name, Collection::new(*schema)))
            .collect();
        Self {
            collections: RwLock::new(collections),
        }
    }

    fn resume_pk(start_key: &Option<ContinuationKey>) -> StoreResult<Option<String>> {
        match start_key {
            None => Ok(None),
            Some(key) => key
                .get("pk")
                .and_then(Value::as_str)
                .map(|pk| Some(pk.to_owned()))
                .ok_or(StoreError::BadContinuation),
        }
    }

    /// Walk `pks` in order, resuming after `start`, stopping at `limit`
    /// matched rows. The continuation key is emitted only when rows remain
    /// past the stop position.
    fn page_over<'a, I>(
        rows: &BTreeMap<String, Document>,
        pks: I,
        start: Option<&str>,
        limit: Option<usize>,
        filter: Option<&ScanFilter>,
    ) -> Page
    where
        I: Iterator<Item = &'a String>,
    {
        let mut items = Vec::new();
        let mut last_visited: Option<&str> = None;
        let mut exhausted = true;

        for pk in pks {
            if let Some(start) = start
                && pk.as_str() <= start
            {
                continue;
            }
            if let Some(limit) = limit
                && items.len() >= limit
            {
                exhausted = false;
                break;
            }
            last_visited = Some(pk);
            let Some(doc) = rows.get(pk) else { continue };
            if filter.is_none_or(|f| f.matches(doc)) {
                items.push(doc.clone());
            }
        }

        let last_key = match (exhausted, last_visited) {
            (false, Some(pk)) => Some(json!({ "pk": pk })),
            _ => None,
        };
        Page {
            count: items.len(),
            items,
            last_key,
        }
    }
}

#[async_trait]
impl KeyStore for MemoryStore {
    async fn get(&self, collection: &str, pk: &str) -> StoreResult<Option<Document>> {
        let collections = self.collections.read();
        let col = collections
            .get(collection)
            .ok_or_else(|| StoreError::UnknownCollection(collection.to_string()))?;
        Ok(col.rows.get(pk).cloned())
    }

    async fn query_index(
        &self,
        collection: &str,
        index: &str,
        key: &[&str],
        opts: QueryOptions,
    ) -> StoreResult<Page> {
        let collections = self.collections.read();
        let col = collections
            .get(collection)
            .ok_or_else(|| StoreError::UnknownCollection(collection.to_string()))?;
        let entries = col
            .postings
            .get(index)
            .ok_or_else(|| StoreError::UnknownIndex {
                collection: collection.to_string(),
                index: index.to_string(),
            })?;

        let start = Self::resume_pk(&opts.start_key)?;
        let tuple: Vec<String> = key.iter().map(|k| (*k).to_owned()).collect();
        let Some(pks) = entries.get(&tuple) else {
            return Ok(Page::default());
        };
        Ok(Self::page_over(
            &col.rows,
            pks.iter(),
            start.as_deref(),
            opts.limit,
            None,
        ))
    }

    async fn scan(
        &self,
        collection: &str,
        filter: Option<ScanFilter>,
        opts: QueryOptions,
    ) -> StoreResult<Page> {
        let collections = self.collections.read();
        let col = collections
            .get(collection)
            .ok_or_else(|| StoreError::UnknownCollection(collection.to_string()))?;
        let start = Self::resume_pk(&opts.start_key)?;
        Ok(Self::page_over(
            &col.rows,
            col.rows.keys(),
            start.as_deref(),
            opts.limit,
            filter.as_ref(),
        ))
    }

    async fn put(&self, collection: &str, doc: Document) -> StoreResult<()> {
        let mut collections = self.collections.write();
        let col = collections
            .get_mut(collection)
            .ok_or_else(|| StoreError::UnknownCollection(collection.to_string()))?;
        col.insert(doc)
    }

    async fn delete(&self, collection: &str, pk: &str) -> StoreResult<()> {
        let mut collections = self.collections.write();
        let col = collections
            .get_mut(collection)
            .ok_or_else(|| StoreError::UnknownCollection(collection.to_string()))?;
        if let Some(doc) = col.rows.remove(pk) {
            col.index_remove(pk, &doc);
        }
        Ok(())
    }

    async fn add(
        &self,
        collection: &str,
        pk: &str,
        attribute: &str,
        delta: i64,
    ) -> StoreResult<()> {
        let mut collections = self.collections.write();
        let col = collections
            .get_mut(collection)
            .ok_or_else(|| StoreError::UnknownCollection(collection.to_string()))?;
        let Some(doc) = col.rows.get(pk) else {
            return Err(StoreError::NoSuchDocument {
                collection: collection.to_string(),
                pk: pk.to_string(),
            });
        };
        let current = doc.get(attribute).and_then(Value::as_i64).unwrap_or(0);
        let mut updated = doc.clone();
        updated.insert(attribute.to_owned(), json!(current + delta));
        col.insert(updated)
    }

    async fn batch_put(&self, collection: &str, docs: Vec<Document>) -> StoreResult<()> {
        if docs.len() > MAX_BATCH_ITEMS {
            return Err(StoreError::BatchTooLarge(docs.len()));
        }
        let mut collections = self.collections.write();
        let col = collections
            .get_mut(collection)
            .ok_or_else(|| StoreError::UnknownCollection(collection.to_string()))?;
        for doc in docs {
            col.insert(doc)?;
        }
        Ok(())
    }
}
