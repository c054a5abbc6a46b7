use thiserror::Error;

use crate::locator::Locator;

pub type BrowserResult<T> = Result<T, BrowserError>;

#[derive(Error, Debug)]
pub enum BrowserError {
    /// The page has no element matching the locator. Usually means the
    /// remote form changed.
    #[error("Locator not found: {locator}")]
    NotFound { locator: Locator },

    #[error("Authentication failed: {reason}")]
    AuthenticationFailed { reason: String },

    /// The element exists but cannot take the requested action.
    #[error("Invalid element {locator}: {what}")]
    InvalidElement {
        locator: Locator,
        what: &'static str,
    },

    /// WebDriver or network failure.
    #[error("Transport error: {message}")]
    Transport { message: String },

    #[error("Session error: {message}")]
    Session { message: String },

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl BrowserError {
    pub fn is_not_found(&self) -> bool {
        matches!(self, BrowserError::NotFound { .. })
    }

    pub(crate) fn transport(err: impl std::fmt::Display) -> Self {
        BrowserError::Transport {
            message: err.to_string(),
        }
    }
}
