//! Account Repository

use std::sync::Arc;

use super::{Paged, from_document, to_document, typed_page};
use crate::core::{AppError, AppResult};
use crate::db::models::Account;
use crate::db::models::account::STATUS_ACTIVE;
use crate::db::{ACCOUNT_EMAIL_INDEX, ACCOUNT_EMAIL_STATUS_INDEX, ACCOUNT_STATUS_INDEX, ACCOUNTS};
use crate::store::{KeyStore, QueryOptions};

#[derive(Clone)]
pub struct AccountRepository {
    store: Arc<dyn KeyStore>,
}

impl AccountRepository {
    pub fn new(store: Arc<dyn KeyStore>) -> Self {
        Self { store }
    }

    /// Find an account by email regardless of status.
    pub async fn find_by_email(&self, email: &str) -> AppResult<Option<Account>> {
        let page = self
            .store
            .query_index(ACCOUNTS, ACCOUNT_EMAIL_INDEX, &[email], QueryOptions::default())
            .await?;
        page.items.into_iter().next().map(from_document).transpose()
    }

    /// Resolve the acting account: must exist and be `ACTIVE`.
    pub async fn find_active_by_email(&self, email: &str) -> AppResult<Option<Account>> {
        let page = self
            .store
            .query_index(
                ACCOUNTS,
                ACCOUNT_EMAIL_STATUS_INDEX,
                &[email, STATUS_ACTIVE],
                QueryOptions::default(),
            )
            .await?;
        page.items.into_iter().next().map(from_document).transpose()
    }

    /// Create a new account; the email is the natural key.
    pub async fn create(&self, account: &Account) -> AppResult<()> {
        if self.find_by_email(&account.email).await?.is_some() {
            return Err(AppError::Conflict(format!(
                "account with email {} already exists",
                account.email
            )));
        }
        self.store.put(ACCOUNTS, to_document(account)?).await?;
        Ok(())
    }

    pub async fn delete(&self, account_id: &str) -> AppResult<()> {
        self.store.delete(ACCOUNTS, account_id).await?;
        Ok(())
    }

    /// One page of accounts in the given status partition.
    pub async fn list_by_status(
        &self,
        status: &str,
        opts: QueryOptions,
    ) -> AppResult<Paged<Account>> {
        let page = self
            .store
            .query_index(ACCOUNTS, ACCOUNT_STATUS_INDEX, &[status], opts)
            .await?;
        typed_page(page)
    }
}
