//! es-core: stable foundation for the ESPET quicksolver driver.
//!
//! Contains:
//! - domain (the fixed categorical domains the remote form accepts)
//! - config (the validated seven-field selection)
//! - error (shared error types)

pub mod config;
pub mod domain;
pub mod error;

// Re-exports: nice ergonomics for downstream crates
pub use config::{AvailableOptions, ChoiceInput, Configuration};
pub use domain::*;
pub use error::{CoreError, CoreResult};
