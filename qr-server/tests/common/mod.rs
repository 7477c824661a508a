//! Shared fixtures for the integration tests.
#![allow(dead_code)]

use std::sync::Arc;

use qr_server::core::{AppState, Config};
use qr_server::db;
use qr_server::db::models::{Account, Category, DefaultPrice};
use qr_server::db::repository::{AccountRepository, CategoryRepository, QrRepository};
use qr_server::services::identity::NoopIdentityProvider;
use qr_server::store::KeyStore;

/// Config with the settle delay zeroed so cost-update tests do not sleep.
pub fn test_config() -> Config {
    Config {
        cost_settle_ms: 0,
        ..Config::default()
    }
}

pub fn state() -> AppState {
    state_with_store(Arc::new(db::open_memory_store()))
}

pub fn state_with_store(store: Arc<dyn KeyStore>) -> AppState {
    AppState::new(test_config(), store, Arc::new(NoopIdentityProvider))
}

pub async fn seed_default_cost(state: &AppState, cost: f64) {
    QrRepository::new(state.store.clone())
        .put_default_price(&DefaultPrice::new(cost))
        .await
        .unwrap();
}

pub async fn seed_account(state: &AppState, email: &str) -> Account {
    let account = Account::new(email.to_string());
    AccountRepository::new(state.store.clone())
        .create(&account)
        .await
        .unwrap();
    account
}

pub async fn seed_category(state: &AppState, name: &str) -> Category {
    let category = Category::new(name.to_string(), "ops@qr.test".to_string(), None);
    CategoryRepository::new(state.store.clone())
        .create(&category)
        .await
        .unwrap();
    category
}

pub async fn fetch_account(state: &AppState, email: &str) -> Account {
    AccountRepository::new(state.store.clone())
        .find_by_email(email)
        .await
        .unwrap()
        .expect("account should exist")
}

pub async fn fetch_category(state: &AppState, id: &str) -> Category {
    CategoryRepository::new(state.store.clone())
        .find_by_id(id)
        .await
        .unwrap()
        .expect("category should exist")
}
