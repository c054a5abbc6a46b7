//! Shared application service layer for the ESPET quicksolver driver.
//!
//! This crate drives the quicksolver form through any `Browser`: it fills
//! the form from a validated configuration and cached field snapshots,
//! runs the remote solver and collects the downloaded results.

pub mod error;
pub mod form_driver;
pub mod progress;
pub mod query;
pub mod retrieve;
pub mod run_service;
pub mod settings;

// Re-export key types for convenience
pub use error::{AppError, AppResult};
pub use form_driver::{DEFAULT_MAX_UNLOCK_CYCLES, FillReport, FormDriver, ScrapedForm};
pub use progress::{RunProgressEvent, RunStage};
pub use query::{ColumnRange, TableSummary, column_values, summarize_table};
pub use retrieve::{CollectOptions, collect, run, wait_for_file};
pub use run_service::{
    Credentials, FieldSelection, RunOptions, RunResponse, RunTimingSummary, SimulationRequest,
    UploadMode, execute, execute_with_progress, save_fields, select_props, upload_data,
};
pub use settings::{
    MAX_DOWNLOAD_TIMEOUT_S, Settings, download_timeout, load_settings, save_settings,
};
