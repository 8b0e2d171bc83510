// SPDX-License-Identifier: MIT OR Apache-2.0
//! Snapshot persistence: an opaque string key/value store
//!
//! The tree is persisted only as whole snapshots, one `get`/`set` round
//! trip per save or load. Nothing here knows the record format.

use anyhow::{Context, Result};
use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};

/// A string key/value store holding whole-tree snapshots
pub trait SnapshotStore {
    /// Fetch the value stored under `key`, if any
    fn get(&self, key: &str) -> Option<String>;

    /// Store `value` under `key`
    ///
    /// # Errors
    /// Fails if the backing medium rejects the write; callers' in-memory
    /// state is unaffected either way.
    fn set(&mut self, key: &str, value: &str) -> Result<()>;
}

/// In-memory store, for tests and embedding
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    entries: HashMap<String, String>,
}

impl MemoryStore {
    /// Create an empty store
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

impl SnapshotStore for MemoryStore {
    fn get(&self, key: &str) -> Option<String> {
        self.entries.get(key).cloned()
    }

    fn set(&mut self, key: &str, value: &str) -> Result<()> {
        self.entries.insert(key.to_string(), value.to_string());
        Ok(())
    }
}

/// Directory-backed store: one `<key>.json` file per key
#[derive(Debug, Clone)]
pub struct DirStore {
    dir: PathBuf,
}

impl DirStore {
    /// Create a store rooted at `dir`; the directory is created on first
    /// write, not here
    #[must_use]
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    fn path_for(&self, key: &str) -> PathBuf {
        self.dir.join(format!("{key}.json"))
    }

    /// Directory this store writes into
    #[must_use]
    pub fn dir(&self) -> &Path {
        &self.dir
    }
}

impl SnapshotStore for DirStore {
    fn get(&self, key: &str) -> Option<String> {
        fs::read_to_string(self.path_for(key)).ok()
    }

    fn set(&mut self, key: &str, value: &str) -> Result<()> {
        fs::create_dir_all(&self.dir)
            .with_context(|| format!("failed to create {}", self.dir.display()))?;
        let path = self.path_for(key);
        fs::write(&path, value).with_context(|| format!("failed to write {}", path.display()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_memory_store_round_trip() {
        let mut store = MemoryStore::new();
        assert_eq!(store.get("book"), None);
        store.set("book", "{}").unwrap();
        assert_eq!(store.get("book").as_deref(), Some("{}"));
    }

    #[test]
    fn test_dir_store_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let mut store = DirStore::new(dir.path().join("data"));
        assert_eq!(store.get("book"), None);
        store.set("book", "{\"nodes\":[]}").unwrap();
        assert_eq!(store.get("book").as_deref(), Some("{\"nodes\":[]}"));
        assert!(dir.path().join("data").join("book.json").exists());
    }
}
