//! Component B: the Cache Store.
//!
//! Persists `umakeCache.json`, a root-relative-path-keyed map of
//! [`DirectDependencyRecord`]s. A cache that fails to parse is treated
//! as absent rather than fatal: we log a warning and start fresh,
//! since every record can always be recomputed by rescanning.

use crate::ordered::OrderedMap;
use crate::record::DirectDependencyRecord;
use std::path::Path;

pub const CACHE_FILE_NAME: &str = "umakeCache.json";

#[derive(Debug, Default)]
pub struct Cache {
    records: OrderedMap<DirectDependencyRecord>,
}

impl Cache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Loads the cache at `path`. A missing file yields an empty
    /// cache. A malformed file logs a warning and also yields an empty
    /// cache, matching the rest of the pipeline's "never fatal on
    /// stale cache" stance.
    pub fn load(path: &Path) -> Self {
        let content = match std::fs::read_to_string(path) {
            Ok(content) => content,
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => return Self::new(),
            Err(err) => {
                log::warn!("could not read {}: {err}; starting with an empty cache", path.display());
                return Self::new();
            }
        };
        match serde_json::from_str::<OrderedMap<DirectDependencyRecord>>(&content) {
            Ok(records) => Self { records },
            Err(err) => {
                log::warn!(
                    "{} is not valid cache JSON ({err}); discarding it",
                    path.display()
                );
                Self::new()
            }
        }
    }

    pub fn save(&self, path: &Path) -> crate::error::Result<()> {
        let json = serde_json::to_string_pretty(&self.records)?;
        std::fs::write(path, json)?;
        Ok(())
    }

    /// Deletes the cache file outright, used when a fatal error leaves
    /// its contents unreliable.
    pub fn delete(path: &Path) {
        if let Err(err) = std::fs::remove_file(path) {
            if err.kind() != std::io::ErrorKind::NotFound {
                log::warn!("could not remove {}: {err}", path.display());
            }
        }
    }

    pub fn get(&self, rel_path: &str) -> Option<&DirectDependencyRecord> {
        self.records.get(rel_path)
    }

    pub fn insert(&mut self, rel_path: impl Into<String>, record: DirectDependencyRecord) {
        self.records.insert(rel_path, record);
    }

    pub fn is_fresh(&self, rel_path: &str, mtime_secs: f64) -> bool {
        self.get(rel_path)
            .map(|record| record.time > mtime_secs)
            .unwrap_or(false)
    }
}

impl From<OrderedMap<DirectDependencyRecord>> for Cache {
    fn from(records: OrderedMap<DirectDependencyRecord>) -> Self {
        Self { records }
    }
}

impl serde::Serialize for Cache {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.records.serialize(serializer)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn missing_cache_file_yields_empty_cache() {
        let dir = tempdir().unwrap();
        let cache = Cache::load(&dir.path().join(CACHE_FILE_NAME));
        assert!(cache.get("a.cpp").is_none());
    }

    #[test]
    fn malformed_cache_file_is_discarded_not_fatal() {
        let dir = tempdir().unwrap();
        let path = dir.path().join(CACHE_FILE_NAME);
        std::fs::write(&path, "{ not json").unwrap();
        let cache = Cache::load(&path);
        assert!(cache.get("a.cpp").is_none());
    }

    #[test]
    fn round_trips_through_save_and_load() {
        let dir = tempdir().unwrap();
        let path = dir.path().join(CACHE_FILE_NAME);
        let mut cache = Cache::new();
        cache.insert("a.cpp", DirectDependencyRecord::new(5.0));
        cache.save(&path).unwrap();

        let reloaded = Cache::load(&path);
        assert!(reloaded.is_fresh("a.cpp", 4.0));
        assert!(!reloaded.is_fresh("a.cpp", 6.0));
    }
}
