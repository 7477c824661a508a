//! Service layer
//!
//! - [`CodeGenerator`] — collision-checked short-code draws
//! - [`CounterAdjuster`] — best-effort cross-entity counter deltas
//! - [`identity`] — external identity-provisioning seam

pub mod code_generator;
pub mod counter;
pub mod identity;

pub use code_generator::CodeGenerator;
pub use counter::{Counter, CounterAdjuster};
pub use identity::IdentityProvider;
