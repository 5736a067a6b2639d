use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use super::error::LoadResult;
use super::loader::load_file;
use super::model::Dataset;

/// Memoizes loaded datasets so filter changes never re-read the source.
///
/// Entries are keyed by the canonical path of the source. The cache is owned
/// by whoever needs it and passed explicitly; failed loads are not cached.
#[derive(Debug, Default)]
pub struct DatasetCache {
    entries: HashMap<PathBuf, Arc<Dataset>>,
}

impl DatasetCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Return the cached dataset for `path`, loading it on first use.
    pub fn get_or_load(&mut self, path: &Path) -> LoadResult<Arc<Dataset>> {
        let key = source_key(path);
        if let Some(dataset) = self.entries.get(&key) {
            log::debug!("Dataset cache hit for {}", key.display());
            return Ok(Arc::clone(dataset));
        }

        log::debug!("Dataset cache miss for {}", key.display());
        let dataset = Arc::new(load_file(path)?);
        self.entries.insert(key, Arc::clone(&dataset));
        Ok(dataset)
    }

    /// Forget the dataset for `path` so the next access reloads it.
    pub fn invalidate(&mut self, path: &Path) -> bool {
        self.entries.remove(&source_key(path)).is_some()
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }

    pub fn contains(&self, path: &Path) -> bool {
        self.entries.contains_key(&source_key(path))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Identity of a source: its canonical path, or the path as given when it
/// cannot be resolved.
fn source_key(path: &Path) -> PathBuf {
    std::fs::canonicalize(path).unwrap_or_else(|_| path.to_path_buf())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::error::LoadError;

    const CSV: &str = "\
Date,Price,Quantity,Country,ProductName
1/1/2023,10,2,US,Widget
";

    #[test]
    fn second_access_returns_the_same_dataset() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("sales.csv");
        std::fs::write(&path, CSV).unwrap();

        let mut cache = DatasetCache::new();
        let first = cache.get_or_load(&path).unwrap();

        // Changes on disk are not seen until the entry is invalidated.
        std::fs::write(&path, format!("{CSV}2/1/2023,5,4,UK,Gadget\n")).unwrap();
        let second = cache.get_or_load(&path).unwrap();
        assert!(Arc::ptr_eq(&first, &second));
        assert_eq!(second.len(), 1);

        assert!(cache.invalidate(&path));
        let third = cache.get_or_load(&path).unwrap();
        assert_eq!(third.len(), 2);
    }

    #[test]
    fn equivalent_paths_share_an_entry() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("sales.csv");
        std::fs::write(&path, CSV).unwrap();
        let indirect = dir.path().join(".").join("sales.csv");

        let mut cache = DatasetCache::new();
        let a = cache.get_or_load(&path).unwrap();
        let b = cache.get_or_load(&indirect).unwrap();
        assert!(Arc::ptr_eq(&a, &b));
        assert_eq!(cache.len(), 1);
    }

    #[test]
    fn clear_forgets_everything() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("sales.csv");
        std::fs::write(&path, CSV).unwrap();

        let mut cache = DatasetCache::new();
        cache.get_or_load(&path).unwrap();
        assert!(cache.contains(&path));
        cache.clear();
        assert!(cache.is_empty());
        assert!(!cache.invalidate(&path));
    }

    #[test]
    fn failed_loads_are_not_cached() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("missing.csv");

        let mut cache = DatasetCache::new();
        let err = cache.get_or_load(&path).unwrap_err();
        assert!(matches!(err, LoadError::SourceNotFound { .. }));
        assert!(cache.is_empty());
        assert!(!cache.contains(&path));
    }
}
