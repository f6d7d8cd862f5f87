//! Local durable key/value cache.
//!
//! Holds the last known trips (for offline start and the one-time
//! migration into the remote store) and the dark-mode preference.

use std::collections::HashMap;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use crate::io::atomic_write;
use crate::model::trip::Trip;

/// Key holding the serialized [`PersistedState`]
pub const DATA_KEY: &str = "tripsync_data";
/// Present once local trips have been pushed to the remote store
pub const MIGRATED_KEY: &str = "tripsync_migrated";

/// Error type for cache operations
#[derive(Debug, thiserror::Error)]
pub enum CacheError {
    #[error("IO error: {0}")]
    Io(#[from] io::Error),
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("invalid cache key: {0}")]
    InvalidKey(String),
}

pub trait LocalCache {
    fn get(&self, key: &str) -> Result<Option<String>, CacheError>;
    fn set(&mut self, key: &str, value: &str) -> Result<(), CacheError>;
}

/// What the engine keeps under [`DATA_KEY`]
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct PersistedState {
    pub trips: IndexMap<String, Trip>,
    pub active_trip_id: Option<String>,
    pub dark_mode: bool,
}

impl PersistedState {
    pub fn load(cache: &dyn LocalCache) -> Result<Option<PersistedState>, CacheError> {
        match cache.get(DATA_KEY)? {
            Some(raw) => Ok(Some(serde_json::from_str(&raw)?)),
            None => Ok(None),
        }
    }

    pub fn save(&self, cache: &mut dyn LocalCache) -> Result<(), CacheError> {
        let raw = serde_json::to_string(self)?;
        cache.set(DATA_KEY, &raw)
    }
}

// ---------------------------------------------------------------------------
// In-memory
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Default)]
pub struct MemoryCache {
    entries: HashMap<String, String>,
}

impl MemoryCache {
    pub fn new() -> Self {
        Self::default()
    }
}

impl LocalCache for MemoryCache {
    fn get(&self, key: &str) -> Result<Option<String>, CacheError> {
        Ok(self.entries.get(key).cloned())
    }

    fn set(&mut self, key: &str, value: &str) -> Result<(), CacheError> {
        self.entries.insert(key.to_string(), value.to_string());
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// File-backed: one file per key
// ---------------------------------------------------------------------------

#[derive(Debug, Clone)]
pub struct FileCache {
    dir: PathBuf,
}

impl FileCache {
    /// Open (creating if needed) a cache directory
    pub fn open(dir: &Path) -> Result<Self, CacheError> {
        fs::create_dir_all(dir)?;
        Ok(FileCache {
            dir: dir.to_path_buf(),
        })
    }

    fn path_for(&self, key: &str) -> Result<PathBuf, CacheError> {
        let valid = !key.is_empty()
            && key
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-');
        if !valid {
            return Err(CacheError::InvalidKey(key.to_string()));
        }
        Ok(self.dir.join(key))
    }
}

impl LocalCache for FileCache {
    fn get(&self, key: &str) -> Result<Option<String>, CacheError> {
        match fs::read_to_string(self.path_for(key)?) {
            Ok(s) => Ok(Some(s)),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    fn set(&mut self, key: &str, value: &str) -> Result<(), CacheError> {
        atomic_write(&self.path_for(key)?, value.as_bytes())?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn file_cache_round_trips_values() {
        let tmp = TempDir::new().unwrap();
        let mut cache = FileCache::open(&tmp.path().join("cache")).unwrap();
        assert_eq!(cache.get(MIGRATED_KEY).unwrap(), None);
        cache.set(MIGRATED_KEY, "true").unwrap();
        assert_eq!(cache.get(MIGRATED_KEY).unwrap().as_deref(), Some("true"));

        // A second handle on the same directory sees the value
        let again = FileCache::open(&tmp.path().join("cache")).unwrap();
        assert_eq!(again.get(MIGRATED_KEY).unwrap().as_deref(), Some("true"));
    }

    #[test]
    fn file_cache_rejects_path_like_keys() {
        let tmp = TempDir::new().unwrap();
        let mut cache = FileCache::open(tmp.path()).unwrap();
        assert!(matches!(
            cache.set("../escape", "x"),
            Err(CacheError::InvalidKey(_))
        ));
    }

    #[test]
    fn persisted_state_uses_camel_case_layout() {
        let mut cache = MemoryCache::new();
        let mut state = PersistedState {
            active_trip_id: Some("t1".into()),
            dark_mode: true,
            ..Default::default()
        };
        state.trips.insert("t1".into(), Trip::new("t1", "Japan"));
        state.save(&mut cache).unwrap();

        let raw = cache.get(DATA_KEY).unwrap().unwrap();
        let value: serde_json::Value = serde_json::from_str(&raw).unwrap();
        assert_eq!(value["activeTripId"], "t1");
        assert_eq!(value["darkMode"], true);
        assert_eq!(value["trips"]["t1"]["name"], "Japan");

        assert_eq!(PersistedState::load(&cache).unwrap(), Some(state));
    }

    #[test]
    fn garbage_in_cache_is_an_error_not_a_panic() {
        let mut cache = MemoryCache::new();
        cache.set(DATA_KEY, "{not json").unwrap();
        assert!(matches!(
            PersistedState::load(&cache),
            Err(CacheError::Json(_))
        ));
    }
}
