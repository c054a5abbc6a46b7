//! Cache key composition.

use std::fmt;

use es_core::{Configuration, Emitter, Feed, IndependentVariable};
use serde::{Deserialize, Serialize};

/// The three selections that decide which free-text fields the form shows.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CacheKey {
    pub emitter: Emitter,
    pub feed: Feed,
    pub independent_variable: IndependentVariable,
}

impl CacheKey {
    pub fn new(emitter: Emitter, feed: Feed, independent_variable: IndependentVariable) -> Self {
        Self {
            emitter,
            feed,
            independent_variable,
        }
    }

    pub fn for_config(config: &Configuration) -> Self {
        Self::new(
            config.emitter(),
            config.feed(),
            config.independent_variable(),
        )
    }

    /// Stable identifier, also used as the cache file stem.
    pub fn stem(&self) -> String {
        format!(
            "{}_and_{}_with_{}",
            self.emitter, self.feed, self.independent_variable
        )
    }

    /// Inverse of [`CacheKey::stem`].
    pub fn from_stem(stem: &str) -> Option<Self> {
        let (emitter, rest) = stem.split_once("_and_")?;
        let (feed, independent_variable) = rest.rsplit_once("_with_")?;
        Some(Self::new(
            emitter.parse().ok()?,
            feed.parse().ok()?,
            independent_variable.parse().ok()?,
        ))
    }
}

impl fmt::Display for CacheKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.stem())
    }
}
