//! Category Repository

use std::sync::Arc;

use serde_json::json;

use super::{Paged, from_document, to_document, typed_page};
use crate::core::{AppError, AppResult};
use crate::db::models::{Category, CategoryStatus};
use crate::db::{CATEGORIES, CATEGORY_NAME_INDEX, CATEGORY_STATUS_INDEX};
use crate::store::{KeyStore, QueryOptions, ScanFilter};

/// Placeholder name excluded from the "ALL" listing (a filter artifact the
/// console depends on).
pub const ALL_PLACEHOLDER_NAME: &str = "ALL";

#[derive(Clone)]
pub struct CategoryRepository {
    store: Arc<dyn KeyStore>,
}

impl CategoryRepository {
    pub fn new(store: Arc<dyn KeyStore>) -> Self {
        Self { store }
    }

    pub async fn find_by_id(&self, id: &str) -> AppResult<Option<Category>> {
        let doc = self.store.get(CATEGORIES, id).await?;
        doc.map(from_document).transpose()
    }

    /// Find a category by id, narrowed to `ACTIVE`.
    pub async fn find_active_by_id(&self, id: &str) -> AppResult<Option<Category>> {
        Ok(self
            .find_by_id(id)
            .await?
            .filter(|category| category.status == CategoryStatus::Active))
    }

    pub async fn find_by_name(&self, name: &str) -> AppResult<Option<Category>> {
        let page = self
            .store
            .query_index(CATEGORIES, CATEGORY_NAME_INDEX, &[name], QueryOptions::default())
            .await?;
        page.items.into_iter().next().map(from_document).transpose()
    }

    /// Create a new category; the name is the natural key.
    pub async fn create(&self, category: &Category) -> AppResult<()> {
        if self.find_by_name(&category.name).await?.is_some() {
            return Err(AppError::Conflict(format!(
                "category {} already exists",
                category.name
            )));
        }
        self.store.put(CATEGORIES, to_document(category)?).await?;
        Ok(())
    }

    /// Full record rewrite (status toggles, counter snapshots in tests).
    pub async fn save(&self, category: &Category) -> AppResult<()> {
        self.store.put(CATEGORIES, to_document(category)?).await?;
        Ok(())
    }

    pub async fn delete(&self, id: &str) -> AppResult<()> {
        self.store.delete(CATEGORIES, id).await?;
        Ok(())
    }

    /// One page of categories in the given status partition.
    pub async fn list_by_status(
        &self,
        status: &str,
        opts: QueryOptions,
    ) -> AppResult<Paged<Category>> {
        let page = self
            .store
            .query_index(CATEGORIES, CATEGORY_STATUS_INDEX, &[status], opts)
            .await?;
        typed_page(page)
    }

    /// One page over every category regardless of status, excluding the
    /// `"ALL"` placeholder row.
    pub async fn list_all(&self, opts: QueryOptions) -> AppResult<Paged<Category>> {
        let page = self
            .store
            .scan(
                CATEGORIES,
                Some(ScanFilter::NotEq("name", json!(ALL_PLACEHOLDER_NAME))),
                opts,
            )
            .await?;
        typed_page(page)
    }
}
