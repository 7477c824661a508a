//! Server configuration
//!
//! All settings come from environment variables with sensible defaults:
//!
//! | variable | default | meaning |
//! |----------|---------|---------|
//! | HTTP_PORT | 3000 | HTTP API port |
//! | BASE_DOMAIN | https://qr.example.com | public URL prefix baked into tagged QRs |
//! | IDENTITY_SERVICE_URL | (unset) | identity-provisioning endpoint; unset disables provisioning |
//! | ROOT_ACCOUNT_EMAIL | admin@qr.example.com | account that can never be deleted |
//! | DEFAULT_QR_COST | (unset) | seeds the default-price sentinel on boot when it is missing |
//! | QR_COST_SETTLE_MS | 4000 | settle delay after a default-cost update |
//! | ASSET_BUCKET / ASSET_REGION | (unset) | binary-asset store handed to the console client |
//! | ENVIRONMENT | development | development \| staging \| production |
//! | LOG_LEVEL | info | tracing filter default |
//! | LOG_DIR | (unset) | directory for rolling file logs; unset = console only |

use serde::Serialize;

/// Binary-asset store coordinates returned to the console client.
///
/// The asset store itself is an external concern; credentials never leave
/// the process.
#[derive(Debug, Clone, Serialize)]
pub struct AssetConfig {
    pub bucket: String,
    pub region: String,
}

#[derive(Debug, Clone)]
pub struct Config {
    /// HTTP API port
    pub http_port: u16,
    /// Public URL prefix; tagged QRs resolve to `{base_domain}/{code}`
    pub base_domain: String,
    /// Identity-provisioning service endpoint; None disables provisioning
    pub identity_service_url: Option<String>,
    /// The one account delete requests must refuse
    pub root_account_email: String,
    /// Seed value for the default-price sentinel, applied once on boot
    pub default_qr_cost: Option<f64>,
    /// Settle delay after a default-cost update, in milliseconds.
    /// Accommodates cross-region index staleness, not a resource wait.
    pub cost_settle_ms: u64,
    /// Asset-store coordinates echoed in the current-user lookup
    pub assets: Option<AssetConfig>,
    /// Runtime environment: development | staging | production
    pub environment: String,
    /// Default tracing filter
    pub log_level: String,
    /// Directory for rolling file logs; None = console only
    pub log_dir: Option<String>,
}

impl Config {
    /// Load configuration from environment variables, falling back to the
    /// defaults documented above.
    pub fn from_env() -> Self {
        let assets = match (std::env::var("ASSET_BUCKET"), std::env::var("ASSET_REGION")) {
            (Ok(bucket), Ok(region)) => Some(AssetConfig { bucket, region }),
            _ => None,
        };

        Self {
            http_port: std::env::var("HTTP_PORT")
                .ok()
                .and_then(|p| p.parse().ok())
                .unwrap_or(3000),
            base_domain: std::env::var("BASE_DOMAIN")
                .unwrap_or_else(|_| "https://qr.example.com".into()),
            identity_service_url: std::env::var("IDENTITY_SERVICE_URL").ok(),
            root_account_email: std::env::var("ROOT_ACCOUNT_EMAIL")
                .unwrap_or_else(|_| "admin@qr.example.com".into()),
            default_qr_cost: std::env::var("DEFAULT_QR_COST")
                .ok()
                .and_then(|v| v.parse().ok()),
            cost_settle_ms: std::env::var("QR_COST_SETTLE_MS")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(4000),
            assets,
            environment: std::env::var("ENVIRONMENT").unwrap_or_else(|_| "development".into()),
            log_level: std::env::var("LOG_LEVEL").unwrap_or_else(|_| "info".into()),
            log_dir: std::env::var("LOG_DIR").ok(),
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            http_port: 3000,
            base_domain: "https://qr.example.com".into(),
            identity_service_url: None,
            root_account_email: "admin@qr.example.com".into(),
            default_qr_cost: None,
            cost_settle_ms: 4000,
            assets: None,
            environment: "development".into(),
            log_level: "info".into(),
            log_dir: None,
        }
    }
}
