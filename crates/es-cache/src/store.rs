//! Field snapshot storage API.

use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};

use tracing::{debug, warn};

use crate::key::CacheKey;
use crate::types::{CacheEntry, FieldMap};
use crate::{CacheError, CacheResult};

/// Key-value store for field snapshots.
///
/// `load` returns `Ok(None)` on a miss; callers scrape the live form in
/// that case. `save` replaces any previous entry for the key.
pub trait FieldStore {
    fn load(&self, key: &CacheKey) -> CacheResult<Option<FieldMap>>;

    fn save(&mut self, key: &CacheKey, fields: &FieldMap) -> CacheResult<()>;

    /// Drop the entry for `key`. Removing a missing entry is not an error.
    fn remove(&mut self, key: &CacheKey) -> CacheResult<()>;

    /// Keys with a stored entry, sorted by stem.
    fn keys(&self) -> CacheResult<Vec<CacheKey>>;

    fn contains(&self, key: &CacheKey) -> CacheResult<bool> {
        Ok(self.load(key)?.is_some())
    }
}

/// One pretty-printed JSON file per key under a cache directory.
#[derive(Clone, Debug)]
pub struct FileFieldStore {
    root_dir: PathBuf,
}

impl FileFieldStore {
    pub fn new(root_dir: impl Into<PathBuf>) -> CacheResult<Self> {
        let root_dir = root_dir.into();
        if !root_dir.exists() {
            fs::create_dir_all(&root_dir)?;
        }
        Ok(Self { root_dir })
    }

    pub fn root_dir(&self) -> &Path {
        &self.root_dir
    }

    pub fn entry_path(&self, key: &CacheKey) -> PathBuf {
        self.root_dir.join(format!("{}.json", key.stem()))
    }

    /// Load the full entry, including its save time.
    pub fn load_entry(&self, key: &CacheKey) -> CacheResult<Option<CacheEntry>> {
        let path = self.entry_path(key);
        if !path.exists() {
            debug!(key = %key, "field cache miss");
            return Ok(None);
        }

        let content = fs::read_to_string(&path)?;
        let entry: CacheEntry = serde_json::from_str(&content).map_err(|e| {
            warn!(path = %path.display(), error = %e, "unreadable field cache entry");
            CacheError::Corrupt {
                stem: key.stem(),
                message: e.to_string(),
            }
        })?;

        if entry.key != *key {
            return Err(CacheError::Corrupt {
                stem: key.stem(),
                message: format!("entry is for {}", entry.key),
            });
        }

        debug!(key = %key, fields = entry.fields.len(), "field cache hit");
        Ok(Some(entry))
    }
}

impl FieldStore for FileFieldStore {
    fn load(&self, key: &CacheKey) -> CacheResult<Option<FieldMap>> {
        Ok(self.load_entry(key)?.map(|entry| entry.fields))
    }

    fn save(&mut self, key: &CacheKey, fields: &FieldMap) -> CacheResult<()> {
        fs::create_dir_all(&self.root_dir)?;

        let entry = CacheEntry {
            key: *key,
            saved_at: chrono::Utc::now().to_rfc3339(),
            fields: fields.clone(),
        };
        let json = serde_json::to_string_pretty(&entry)?;
        fs::write(self.entry_path(key), json)?;

        debug!(key = %key, fields = fields.len(), "field cache saved");
        Ok(())
    }

    fn remove(&mut self, key: &CacheKey) -> CacheResult<()> {
        let path = self.entry_path(key);
        if path.exists() {
            fs::remove_file(path)?;
        }
        Ok(())
    }

    fn keys(&self) -> CacheResult<Vec<CacheKey>> {
        let mut keys = Vec::new();

        if !self.root_dir.exists() {
            return Ok(keys);
        }

        for entry in fs::read_dir(&self.root_dir)? {
            let path = entry?.path();
            if path.extension().and_then(|ext| ext.to_str()) != Some("json") {
                continue;
            }
            if let Some(key) = path
                .file_stem()
                .and_then(|stem| stem.to_str())
                .and_then(CacheKey::from_stem)
            {
                keys.push(key);
            }
        }

        keys.sort_by_key(|key| key.stem());
        Ok(keys)
    }
}

/// In-process store for tests and dry runs.
#[derive(Clone, Debug, Default)]
pub struct MemoryFieldStore {
    entries: HashMap<CacheKey, FieldMap>,
}

impl MemoryFieldStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl FieldStore for MemoryFieldStore {
    fn load(&self, key: &CacheKey) -> CacheResult<Option<FieldMap>> {
        Ok(self.entries.get(key).cloned())
    }

    fn save(&mut self, key: &CacheKey, fields: &FieldMap) -> CacheResult<()> {
        self.entries.insert(*key, fields.clone());
        Ok(())
    }

    fn remove(&mut self, key: &CacheKey) -> CacheResult<()> {
        self.entries.remove(key);
        Ok(())
    }

    fn keys(&self) -> CacheResult<Vec<CacheKey>> {
        let mut keys: Vec<CacheKey> = self.entries.keys().copied().collect();
        keys.sort_by_key(|key| key.stem());
        Ok(keys)
    }
}
