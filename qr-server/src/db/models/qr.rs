//! QR Code Model
//!
//! Lifecycle state is an explicit tagged variant: fields that only exist
//! while a QR is tagged live inside the `TAGGED`/`PURCHASED` variants, so an
//! untag is a plain full rewrite of the record — there is no optional-field
//! bookkeeping to strip.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::utils::time::unix_now;

/// Reserved identity of the default-price sentinel within the QR collection.
pub const DEFAULT_PRICE_ID: &str = "DEFAULT";

/// Status attribute value the sentinel carries so status-partitioned reads
/// and filtered scans never surface it as a QR.
pub const DEFAULT_PRICE_STATUS: &str = "DEFAULT";

pub const CURRENCY: &str = "USD";
pub const CURRENCY_SYMBOL: &str = "$";

pub const STATUS_PURCHASED: &str = "PURCHASED";

/// A physical QR-code asset.
///
/// The fields here are the fixed baseline present in every state; everything
/// else rides on [`QrState`].
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QrCode {
    pub qr_id: String,
    /// Generated short code, globally unique across the collection.
    pub code: String,
    pub created_by: String,
    pub created_on: i64,
    /// Baseline redirect target (the bare domain until the QR is tagged).
    pub redirect_url: String,
    /// Base cost captured from the default-price sentinel at creation time.
    pub cost: f64,
    /// Generic "has a pending update" marker consumed by the print pipeline.
    pub pending_update: bool,
    #[serde(flatten)]
    pub state: QrState,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum QrState {
    Untagged,
    Tagged(TagDetails),
    Purchased(PurchaseDetails),
}

/// Fields that exist exactly while a QR is tagged (or later).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TagDetails {
    pub category_id: String,
    /// Category name denormalized at tag/update time.
    pub category_name: String,
    /// Discount percentage, accepted verbatim from the request.
    pub discount: f64,
    pub discounted_cost: f64,
    pub currency: String,
    pub currency_symbol: String,
    pub impressions: i64,
    pub tagged_by: String,
    pub tagged_by_id: String,
    pub tagged_on: i64,
    /// Public resolution URL: `{base_domain}/{code}`.
    pub public_url: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub artistic_image: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub updated_by: Option<String>,
}

/// Purchase fields stacked on top of the tag-era ones. The purchase write
/// path lives outside this service; read paths must still carry the state.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PurchaseDetails {
    #[serde(flatten)]
    pub tag: TagDetails,
    pub purchased_by: String,
    pub purchased_on: i64,
}

impl QrCode {
    /// A freshly created, untagged QR.
    pub fn new(code: String, created_by: String, redirect_url: String, cost: f64) -> Self {
        Self {
            qr_id: Uuid::new_v4().to_string(),
            code,
            created_by,
            created_on: unix_now(),
            redirect_url,
            cost,
            pending_update: true,
            state: QrState::Untagged,
        }
    }

    pub fn is_untagged(&self) -> bool {
        matches!(self.state, QrState::Untagged)
    }

    /// Tag-era details regardless of whether the QR has since been purchased.
    pub fn tag_details(&self) -> Option<&TagDetails> {
        match &self.state {
            QrState::Untagged => None,
            QrState::Tagged(tag) => Some(tag),
            QrState::Purchased(purchase) => Some(&purchase.tag),
        }
    }

    pub fn purchased_on(&self) -> Option<i64> {
        match &self.state {
            QrState::Purchased(purchase) => Some(purchase.purchased_on),
            _ => None,
        }
    }
}

/// The default-price sentinel: a singleton configuration row living in the
/// QR collection under a reserved identity.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DefaultPrice {
    pub qr_id: String,
    pub status: String,
    /// Base cost applied to newly created QRs; 0 when never configured.
    #[serde(default)]
    pub cost: f64,
}

impl DefaultPrice {
    pub fn new(cost: f64) -> Self {
        Self {
            qr_id: DEFAULT_PRICE_ID.to_string(),
            status: DEFAULT_PRICE_STATUS.to_string(),
            cost,
        }
    }
}
