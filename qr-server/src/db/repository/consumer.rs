//! Consumer Account Repository (read-only)

use std::sync::Arc;

use super::{Paged, from_document, typed_page};
use crate::core::AppResult;
use crate::db::models::ConsumerAccount;
use crate::db::models::account::STATUS_ACTIVE;
use crate::db::{CONSUMER_EMAIL_STATUS_INDEX, CONSUMERS};
use crate::store::{KeyStore, QueryOptions};

#[derive(Clone)]
pub struct ConsumerRepository {
    store: Arc<dyn KeyStore>,
}

impl ConsumerRepository {
    pub fn new(store: Arc<dyn KeyStore>) -> Self {
        Self { store }
    }

    pub async fn find_active_by_email(&self, email: &str) -> AppResult<Option<ConsumerAccount>> {
        let page = self
            .store
            .query_index(
                CONSUMERS,
                CONSUMER_EMAIL_STATUS_INDEX,
                &[email, STATUS_ACTIVE],
                QueryOptions::default(),
            )
            .await?;
        page.items.into_iter().next().map(from_document).transpose()
    }

    /// One page over every consumer account, any status.
    pub async fn list_all(&self, opts: QueryOptions) -> AppResult<Paged<ConsumerAccount>> {
        let page = self.store.scan(CONSUMERS, None, opts).await?;
        typed_page(page)
    }
}
