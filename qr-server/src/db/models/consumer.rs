//! Consumer Account Model
//!
//! Purchasing-side accounts. This service only reads them; provisioning and
//! the purchase write path belong to the consumer portal.

use serde::{Deserialize, Serialize};

use super::account::AccountStatus;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConsumerAccount {
    pub account_id: String,
    pub email: String,
    pub status: AccountStatus,
    #[serde(default)]
    pub created_on: i64,
    #[serde(default)]
    pub qrs_purchased: i64,
}
