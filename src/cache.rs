use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::SystemTime;

use tracing::{debug, info};

use crate::error::LoadError;
use crate::io::load;
use crate::models::{LoadConfig, NormalizedTable};

struct CacheEntry {
    modified: SystemTime,
    config: LoadConfig,
    table: Arc<NormalizedTable>,
}

/// Caller-owned cache of loaded tables
///
/// Meant for long-running callers that reload the same file repeatedly;
/// the one-shot CLI loads directly.
///
/// Entries are keyed by canonical path and stay valid while the file's
/// modification time and the load configuration are unchanged.
#[derive(Default)]
pub struct TableCache {
    entries: HashMap<PathBuf, CacheEntry>,
    loads: usize,
}

impl TableCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Return the cached table for `path`, reloading if the file changed
    pub fn get_or_load(
        &mut self,
        path: &Path,
        config: &LoadConfig,
    ) -> Result<Arc<NormalizedTable>, LoadError> {
        let metadata = std::fs::metadata(path).map_err(|e| LoadError::from_io(path, e))?;
        let modified = metadata.modified()?;
        let key = path.canonicalize().map_err(|e| LoadError::from_io(path, e))?;

        if let Some(entry) = self.entries.get(&key) {
            if entry.modified == modified && entry.config == *config {
                debug!("Cache hit for {:?}", key);
                return Ok(Arc::clone(&entry.table));
            }
            info!("{:?} changed since last load, reloading", key);
        }

        let table = Arc::new(load(path, config)?);
        self.loads += 1;
        self.entries.insert(
            key,
            CacheEntry {
                modified,
                config: config.clone(),
                table: Arc::clone(&table),
            },
        );
        Ok(table)
    }

    /// Drop the entry for `path`, returning whether one existed
    pub fn invalidate(&mut self, path: &Path) -> bool {
        let key = path.canonicalize().unwrap_or_else(|_| path.to_path_buf());
        self.entries.remove(&key).is_some()
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Number of times a file was actually parsed
    pub fn loads(&self) -> usize {
        self.loads
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs::File;
    use std::io::Write;
    use std::time::Duration;

    const CSV: &str = "자치구별(2),소계\n자치구별(2),소계\n종로구,3\n";

    fn write_csv(path: &Path, data: &str, mtime_secs: u64) {
        let mut file = File::create(path).unwrap();
        file.write_all(data.as_bytes()).unwrap();
        file.set_modified(SystemTime::UNIX_EPOCH + Duration::from_secs(mtime_secs))
            .unwrap();
    }

    #[test]
    fn test_cache_hit() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("data.csv");
        write_csv(&path, CSV, 1_000_000);

        let mut cache = TableCache::new();
        let config = LoadConfig::default();
        let first = cache.get_or_load(&path, &config).unwrap();
        let second = cache.get_or_load(&path, &config).unwrap();

        assert!(Arc::ptr_eq(&first, &second));
        assert_eq!(cache.loads(), 1);
        assert_eq!(cache.len(), 1);
    }

    #[test]
    fn test_reload_when_file_changes() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("data.csv");
        write_csv(&path, CSV, 1_000_000);

        let mut cache = TableCache::new();
        let config = LoadConfig::default();
        let first = cache.get_or_load(&path, &config).unwrap();

        write_csv(&path, "자치구별(2),소계\n자치구별(2),소계\n종로구,9\n", 2_000_000);
        let second = cache.get_or_load(&path, &config).unwrap();

        assert_eq!(first.column_sum("소계"), Some(3));
        assert_eq!(second.column_sum("소계"), Some(9));
        assert_eq!(cache.loads(), 2);
    }

    #[test]
    fn test_reload_when_config_changes() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("data.csv");
        write_csv(&path, CSV, 1_000_000);

        let mut cache = TableCache::new();
        cache.get_or_load(&path, &LoadConfig::default()).unwrap();
        let config = LoadConfig {
            subtotal_markers: vec!["종로구".to_string()],
            ..Default::default()
        };
        let table = cache.get_or_load(&path, &config).unwrap();

        assert!(table.is_empty());
        assert_eq!(cache.loads(), 2);
    }

    #[test]
    fn test_invalidate_and_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("data.csv");
        write_csv(&path, CSV, 1_000_000);

        let mut cache = TableCache::new();
        cache.get_or_load(&path, &LoadConfig::default()).unwrap();
        assert!(cache.invalidate(&path));
        assert!(cache.is_empty());
        assert!(!cache.invalidate(&path));

        cache.get_or_load(&path, &LoadConfig::default()).unwrap();
        cache.clear();
        assert!(cache.is_empty());

        let err = cache
            .get_or_load(&dir.path().join("absent.csv"), &LoadConfig::default())
            .unwrap_err();
        assert!(err.is_not_found());
    }
}
