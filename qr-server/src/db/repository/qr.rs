//! QR Repository
//!
//! Also owns the default-price sentinel, which shares the QR collection
//! under its reserved identity.

use std::sync::Arc;

use serde_json::json;

use super::{Paged, from_document, to_document, typed_page};
use crate::core::AppResult;
use crate::db::models::qr::{DEFAULT_PRICE_ID, DEFAULT_PRICE_STATUS, STATUS_PURCHASED};
use crate::db::models::{DefaultPrice, QrCode};
use crate::db::{QR_CODE_INDEX, QR_PURCHASED_BY_STATUS_INDEX, QR_STATUS_INDEX, QRS};
use crate::store::{KeyStore, MAX_BATCH_ITEMS, QueryOptions, ScanFilter};

#[derive(Clone)]
pub struct QrRepository {
    store: Arc<dyn KeyStore>,
}

impl QrRepository {
    pub fn new(store: Arc<dyn KeyStore>) -> Self {
        Self { store }
    }

    pub async fn find_by_id(&self, id: &str) -> AppResult<Option<QrCode>> {
        // the sentinel is not a QR
        if id == DEFAULT_PRICE_ID {
            return Ok(None);
        }
        let doc = self.store.get(QRS, id).await?;
        doc.map(from_document).transpose()
    }

    /// Whether any record already carries this short code.
    pub async fn code_in_use(&self, code: &str) -> AppResult<bool> {
        let page = self
            .store
            .query_index(QRS, QR_CODE_INDEX, &[code], QueryOptions::default())
            .await?;
        Ok(page.count > 0)
    }

    /// Full record rewrite. State transitions rely on this replacing the
    /// whole document: fields absent from the new state are gone afterwards.
    pub async fn save(&self, qr: &QrCode) -> AppResult<()> {
        self.store.put(QRS, to_document(qr)?).await?;
        Ok(())
    }

    /// Persist a creation batch, chunked to the store's physical batch
    /// limit. Chunking is a transport constraint, not a consistency
    /// boundary: a failed chunk is logged and the remaining chunks are still
    /// attempted, so the batch can land short with earlier chunks in place.
    pub async fn insert_batch(&self, qrs: &[QrCode]) -> AppResult<()> {
        for chunk in qrs.chunks(MAX_BATCH_ITEMS) {
            let docs = chunk.iter().map(to_document).collect::<AppResult<Vec<_>>>()?;
            if let Err(err) = self.store.batch_put(QRS, docs).await {
                tracing::error!(
                    chunk_len = chunk.len(),
                    error = %err,
                    "QR batch chunk failed, continuing with remaining chunks"
                );
            }
        }
        Ok(())
    }

    /// One page of QRs in the given status partition.
    pub async fn list_by_status(&self, status: &str, opts: QueryOptions) -> AppResult<Paged<QrCode>> {
        let page = self
            .store
            .query_index(QRS, QR_STATUS_INDEX, &[status], opts)
            .await?;
        typed_page(page)
    }

    /// One page over every QR regardless of status; the sentinel is kept out
    /// by a status filter.
    pub async fn list_all(&self, opts: QueryOptions) -> AppResult<Paged<QrCode>> {
        let page = self
            .store
            .scan(
                QRS,
                Some(ScanFilter::NotEq("status", json!(DEFAULT_PRICE_STATUS))),
                opts,
            )
            .await?;
        typed_page(page)
    }

    /// Purchased QRs of one consumer.
    pub async fn list_purchased_by(
        &self,
        email: &str,
        opts: QueryOptions,
    ) -> AppResult<Paged<QrCode>> {
        let page = self
            .store
            .query_index(
                QRS,
                QR_PURCHASED_BY_STATUS_INDEX,
                &[email, STATUS_PURCHASED],
                opts,
            )
            .await?;
        typed_page(page)
    }

    // ── default-price sentinel ──────────────────────────────────────

    pub async fn default_price(&self) -> AppResult<Option<DefaultPrice>> {
        let doc = self.store.get(QRS, DEFAULT_PRICE_ID).await?;
        doc.map(from_document).transpose()
    }

    pub async fn put_default_price(&self, price: &DefaultPrice) -> AppResult<()> {
        self.store.put(QRS, to_document(price)?).await?;
        Ok(())
    }
}
