//! Category Model

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::utils::time::unix_now;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum CategoryStatus {
    Active,
    Inactive,
}

/// QR category. `name` is unique across the collection; `assigned_qrs`
/// counts the QRs currently tagged into the category and gates deactivation
/// and deletion (both require it to be <= 0).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Category {
    pub category_id: String,
    pub name: String,
    pub status: CategoryStatus,
    pub created_on: i64,
    pub created_by: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub image: Option<String>,
    #[serde(default)]
    pub assigned_qrs: i64,
}

impl Category {
    pub fn new(name: String, created_by: String, image: Option<String>) -> Self {
        Self {
            category_id: Uuid::new_v4().to_string(),
            name,
            status: CategoryStatus::Active,
            created_on: unix_now(),
            created_by,
            image,
            assigned_qrs: 0,
        }
    }
}
