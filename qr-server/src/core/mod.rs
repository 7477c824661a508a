//! Core infrastructure: configuration, shared state, error handling.

pub mod config;
pub mod error;
pub mod state;

pub use config::{AssetConfig, Config};
pub use error::{AppError, AppResult};
pub use state::AppState;
