//! Repository Module
//!
//! The shared read/write path over the keyed store: point lookups through
//! unique secondary indexes, status-partitioned paged queries, filtered
//! scans, and the chunked batch insert. One repository per collection;
//! sorting is applied by the callers, never here.

pub mod account;
pub mod category;
pub mod consumer;
pub mod qr;

// Re-exports
pub use account::AccountRepository;
pub use category::CategoryRepository;
pub use consumer::ConsumerRepository;
pub use qr::QrRepository;

use anyhow::anyhow;
use serde::Serialize;
use serde::de::DeserializeOwned;

use crate::core::{AppError, AppResult};
use crate::store::{ContinuationKey, Document, Page};

/// One typed page of a listing. `last_key` is absent once exhausted.
#[derive(Debug)]
pub struct Paged<T> {
    pub items: Vec<T>,
    pub count: usize,
    pub last_key: Option<ContinuationKey>,
}

pub(crate) fn to_document<T: Serialize>(value: &T) -> AppResult<Document> {
    match serde_json::to_value(value) {
        Ok(serde_json::Value::Object(doc)) => Ok(doc),
        Ok(_) => Err(AppError::Internal(anyhow!("model did not serialize to an object"))),
        Err(err) => Err(AppError::Internal(anyhow!(err))),
    }
}

pub(crate) fn from_document<T: DeserializeOwned>(doc: Document) -> AppResult<T> {
    serde_json::from_value(serde_json::Value::Object(doc))
        .map_err(|err| AppError::Internal(anyhow!(err)))
}

pub(crate) fn typed_page<T: DeserializeOwned>(page: Page) -> AppResult<Paged<T>> {
    let items = page
        .items
        .into_iter()
        .map(from_document)
        .collect::<AppResult<Vec<T>>>()?;
    Ok(Paged {
        count: items.len(),
        items,
        last_key: page.last_key,
    })
}
