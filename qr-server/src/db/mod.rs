//! Database Module
//!
//! Collection declarations for the keyed store, plus the models and
//! repositories built over them. Four collections: operator accounts, the
//! category taxonomy, the QR codes themselves (which also house the
//! default-price sentinel), and the read-only consumer accounts.

pub mod models;
pub mod repository;

use crate::store::{CollectionSchema, IndexDef, MemoryStore};

pub const ACCOUNTS: &str = "accounts";
pub const CATEGORIES: &str = "categories";
pub const QRS: &str = "qrs";
pub const CONSUMERS: &str = "consumers";

// Index names, shared between schema declarations and repositories.
pub const ACCOUNT_EMAIL_INDEX: &str = "email-index";
pub const ACCOUNT_STATUS_INDEX: &str = "status-index";
pub const ACCOUNT_EMAIL_STATUS_INDEX: &str = "email-status-index";
pub const CATEGORY_NAME_INDEX: &str = "name-index";
pub const CATEGORY_STATUS_INDEX: &str = "status-index";
pub const QR_CODE_INDEX: &str = "code-index";
pub const QR_STATUS_INDEX: &str = "status-index";
pub const QR_PURCHASED_BY_STATUS_INDEX: &str = "purchased-by-status-index";
pub const CONSUMER_EMAIL_STATUS_INDEX: &str = "email-status-index";

const SCHEMAS: &[CollectionSchema] = &[
    CollectionSchema {
        name: ACCOUNTS,
        key_attribute: "account_id",
        indexes: &[
            IndexDef {
                name: ACCOUNT_EMAIL_INDEX,
                attributes: &["email"],
            },
            IndexDef {
                name: ACCOUNT_STATUS_INDEX,
                attributes: &["status"],
            },
            IndexDef {
                name: ACCOUNT_EMAIL_STATUS_INDEX,
                attributes: &["email", "status"],
            },
        ],
    },
    CollectionSchema {
        name: CATEGORIES,
        key_attribute: "category_id",
        indexes: &[
            IndexDef {
                name: CATEGORY_NAME_INDEX,
                attributes: &["name"],
            },
            IndexDef {
                name: CATEGORY_STATUS_INDEX,
                attributes: &["status"],
            },
        ],
    },
    CollectionSchema {
        name: QRS,
        key_attribute: "qr_id",
        indexes: &[
            IndexDef {
                name: QR_CODE_INDEX,
                attributes: &["code"],
            },
            IndexDef {
                name: QR_STATUS_INDEX,
                attributes: &["status"],
            },
            IndexDef {
                name: QR_PURCHASED_BY_STATUS_INDEX,
                attributes: &["purchased_by", "status"],
            },
        ],
    },
    CollectionSchema {
        name: CONSUMERS,
        key_attribute: "account_id",
        indexes: &[IndexDef {
            name: CONSUMER_EMAIL_STATUS_INDEX,
            attributes: &["email", "status"],
        }],
    },
];

/// Every collection the service uses.
pub fn collections() -> &'static [CollectionSchema] {
    SCHEMAS
}

/// Build an in-memory engine with every collection registered.
pub fn open_memory_store() -> MemoryStore {
    MemoryStore::new(SCHEMAS)
}
