//! QR Server — lifecycle management for physical QR-code assets
//!
//! Three record collections — operator accounts, the category taxonomy, and
//! the QR codes themselves — over a keyed store with secondary indexes and
//! no cross-record transactions. The interesting parts:
//!
//! - **state machine** (`api::qrs`): create / tag / untag / update-while-tagged,
//!   each keeping the derived counters on accounts and categories moving
//!   without any transactional safety net
//! - **code generation** (`services::code_generator`): collision-checked
//!   short codes with a bounded retry loop
//! - **cursors** (`store::cursor`): opaque resumable pagination tokens
//!
//! # Module structure
//!
//! ```text
//! qr-server/src/
//! ├── core/      # config, shared state, error kinds
//! ├── store/     # keyed-store seam + in-memory engine + cursor codec
//! ├── db/        # collection schemas, models, repositories
//! ├── services/  # code generator, counter adjuster, identity seam
//! ├── api/       # command dispatch and handlers
//! └── utils/     # validation, time, logging
//! ```

pub mod api;
pub mod core;
pub mod db;
pub mod services;
pub mod store;
pub mod utils;

// Re-export common types
pub use crate::core::{AppError, AppResult, AppState, Config};
pub use crate::utils::{init_logger, init_logger_with_file};
