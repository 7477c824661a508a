//! Shared application state
//!
//! `AppState` holds the configuration plus the two external collaborators —
//! the keyed store and the identity provider — behind `Arc`ed trait objects
//! so handlers and tests swap implementations freely.

use std::sync::Arc;

use crate::core::{AppResult, Config};
use crate::db;
use crate::db::models::DefaultPrice;
use crate::db::repository::QrRepository;
use crate::services::identity::{HttpIdentityProvider, IdentityProvider, NoopIdentityProvider};
use crate::store::KeyStore;

#[derive(Clone)]
pub struct AppState {
    pub config: Arc<Config>,
    pub store: Arc<dyn KeyStore>,
    pub identity: Arc<dyn IdentityProvider>,
}

impl AppState {
    pub fn new(config: Config, store: Arc<dyn KeyStore>, identity: Arc<dyn IdentityProvider>) -> Self {
        Self {
            config: Arc::new(config),
            store,
            identity,
        }
    }

    /// Wire up the default engine and identity provider from configuration
    /// and seed the default-price sentinel when configured and missing.
    pub async fn initialize(config: Config) -> AppResult<Self> {
        let store: Arc<dyn KeyStore> = Arc::new(db::open_memory_store());
        let identity: Arc<dyn IdentityProvider> = match &config.identity_service_url {
            Some(url) => Arc::new(HttpIdentityProvider::new(url.clone())),
            None => Arc::new(NoopIdentityProvider),
        };
        let state = Self::new(config, store, identity);

        if let Some(cost) = state.config.default_qr_cost {
            let qrs = QrRepository::new(state.store.clone());
            if qrs.default_price().await?.is_none() {
                qrs.put_default_price(&DefaultPrice::new(cost)).await?;
                tracing::info!(cost, "seeded default QR cost");
            }
        }

        Ok(state)
    }
}
