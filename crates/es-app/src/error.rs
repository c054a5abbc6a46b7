//! Error types for the es-app service layer.

use std::path::PathBuf;
use std::time::Duration;

use es_browser::BrowserError;

/// Application error type that wraps errors from the backend crates
/// and provides a unified error interface for the CLI.
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error("Invalid configuration: {0}")]
    InvalidConfig(#[from] es_core::CoreError),

    /// The page structure no longer matches; usually the site changed.
    #[error("Element not found on the quicksolver page: {locator}")]
    ElementNotFound { locator: String },

    #[error("Element {locator} rejected the action: {what}")]
    ElementRejected { locator: String, what: String },

    #[error("Authentication failed: {0}")]
    AuthenticationFailed(String),

    #[error("Field '{field}' stayed read-only after {attempts} independent-variable changes")]
    FieldLocked { field: String, attempts: usize },

    #[error("Download not found after {waited:?}: {path}")]
    DownloadNotFound { path: PathBuf, waited: Duration },

    #[error("Transport error: {0}")]
    Transport(String),

    #[error("Browser session error: {0}")]
    Session(String),

    #[error("Field cache error: {0}")]
    Cache(String),

    #[error("Results error: {0}")]
    Results(String),

    #[error("Failed to read settings file: {path}")]
    SettingsFileRead {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Failed to write settings file: {path}")]
    SettingsFileWrite {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Settings error: {0}")]
    Settings(String),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl AppError {
    /// Whether repeating the whole operation may succeed.
    pub fn is_retriable(&self) -> bool {
        matches!(
            self,
            AppError::DownloadNotFound { .. } | AppError::Transport(_)
        )
    }
}

/// Result type for es-app operations.
pub type AppResult<T> = Result<T, AppError>;

// Conversions from backend error types
impl From<BrowserError> for AppError {
    fn from(err: BrowserError) -> Self {
        match err {
            BrowserError::NotFound { locator } => AppError::ElementNotFound {
                locator: locator.to_string(),
            },
            BrowserError::AuthenticationFailed { reason } => AppError::AuthenticationFailed(reason),
            BrowserError::InvalidElement { locator, what } => AppError::ElementRejected {
                locator: locator.to_string(),
                what: what.to_string(),
            },
            BrowserError::Transport { message } => AppError::Transport(message),
            BrowserError::Session { message } => AppError::Session(message),
            BrowserError::Io(e) => AppError::Io(e),
        }
    }
}

impl From<es_cache::CacheError> for AppError {
    fn from(err: es_cache::CacheError) -> Self {
        AppError::Cache(err.to_string())
    }
}

impl From<es_results::ResultsError> for AppError {
    fn from(err: es_results::ResultsError) -> Self {
        AppError::Results(err.to_string())
    }
}
