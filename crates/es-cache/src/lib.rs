//! es-cache: snapshots of the quicksolver's free-text form fields.
//!
//! The form exposes a different set of numeric inputs for every
//! emitter/feed/independent-variable combination. Scraping them is slow, so
//! the last scrape for each combination is kept on disk and replayed on the
//! next run.
//!
//! Entries are overwritten wholesale and never expire. If the remote form
//! changes its field set the cached snapshot goes stale and must be removed
//! by hand (`es-cli cache clear`). The file store takes no locks: two
//! processes sharing one cache directory race, and the last writer wins.

pub mod key;
pub mod store;
pub mod types;

pub use key::CacheKey;
pub use store::{FieldStore, FileFieldStore, MemoryFieldStore};
pub use types::*;

pub type CacheResult<T> = Result<T, CacheError>;

#[derive(thiserror::Error, Debug)]
pub enum CacheError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Corrupt cache entry {stem}: {message}")]
    Corrupt { stem: String, message: String },
}
