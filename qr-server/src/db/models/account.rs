//! Operator Account Model

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::utils::time::unix_now;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum AccountStatus {
    Active,
    Inactive,
}

pub const STATUS_ACTIVE: &str = "ACTIVE";

/// Operator account. `email` is the natural key (stored case-folded); the
/// two counters are adjusted by QR lifecycle events, never written directly.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Account {
    pub account_id: String,
    pub email: String,
    pub status: AccountStatus,
    pub created_on: i64,
    #[serde(default)]
    pub qrs_created: i64,
    #[serde(default)]
    pub qrs_tagged: i64,
}

impl Account {
    pub fn new(email: String) -> Self {
        Self {
            account_id: Uuid::new_v4().to_string(),
            email,
            status: AccountStatus::Active,
            created_on: unix_now(),
            qrs_created: 0,
            qrs_tagged: 0,
        }
    }
}
