//! Output store abstraction.
//!
//! The compiler writes documents through the [`AssetStore`] trait; hosts back
//! it with their real asset database, tests with [`MemoryStore`]. Paths are
//! `/`-separated; directories come into existence with their first asset and
//! are pruned explicitly (a rollback must leave no empty directories behind).

use hashbrown::{HashMap, HashSet};
use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::error::{CompileError, Result};

pub trait AssetStore {
    fn read(&self, path: &str) -> Result<Option<Vec<u8>>>;
    fn write(&mut self, path: &str, bytes: Vec<u8>) -> Result<()>;
    /// Delete an asset; deleting a missing asset is an error.
    fn delete(&mut self, path: &str) -> Result<()>;
    fn exists(&self, path: &str) -> bool;
    fn dir_exists(&self, dir: &str) -> bool;
    /// Remove a directory if it holds no assets; a populated or missing
    /// directory is left alone.
    fn remove_dir_if_empty(&mut self, dir: &str) -> Result<()>;
}

/// Ancestor directories of a path, shallowest first.
pub fn ancestor_dirs(path: &str) -> Vec<String> {
    let mut dirs = Vec::new();
    for (i, c) in path.char_indices() {
        if c == '/' && i > 0 {
            dirs.push(path[..i].to_string());
        }
    }
    dirs
}

pub fn get_json<T: DeserializeOwned>(store: &dyn AssetStore, path: &str) -> Result<Option<T>> {
    match store.read(path)? {
        None => Ok(None),
        Some(bytes) => serde_json::from_slice(&bytes)
            .map(Some)
            .map_err(|e| CompileError::asset_conflict(path, format!("malformed document: {e}"))),
    }
}

pub fn to_json_bytes<T: Serialize>(path: &str, value: &T) -> Result<Vec<u8>> {
    serde_json::to_vec_pretty(value)
        .map_err(|e| CompileError::asset_conflict(path, e.to_string()))
}

/// In-memory reference store. Byte-for-byte comparable via `PartialEq`, which
/// is what the rollback tests lean on.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct MemoryStore {
    files: HashMap<String, Vec<u8>>,
    dirs: HashSet<String>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Sorted asset paths, for deterministic assertions.
    pub fn paths(&self) -> Vec<String> {
        let mut paths: Vec<String> = self.files.keys().cloned().collect();
        paths.sort();
        paths
    }

    fn dir_is_empty(&self, dir: &str) -> bool {
        let prefix = format!("{dir}/");
        !self.files.keys().any(|p| p.starts_with(&prefix))
            && !self.dirs.iter().any(|d| d.starts_with(&prefix))
    }
}

impl AssetStore for MemoryStore {
    fn read(&self, path: &str) -> Result<Option<Vec<u8>>> {
        Ok(self.files.get(path).cloned())
    }

    fn write(&mut self, path: &str, bytes: Vec<u8>) -> Result<()> {
        for dir in ancestor_dirs(path) {
            self.dirs.insert(dir);
        }
        self.files.insert(path.to_string(), bytes);
        Ok(())
    }

    fn delete(&mut self, path: &str) -> Result<()> {
        match self.files.remove(path) {
            Some(_) => Ok(()),
            None => Err(CompileError::asset_conflict(path, "no such asset")),
        }
    }

    fn exists(&self, path: &str) -> bool {
        self.files.contains_key(path)
    }

    fn dir_exists(&self, dir: &str) -> bool {
        self.dirs.contains(dir)
    }

    fn remove_dir_if_empty(&mut self, dir: &str) -> Result<()> {
        if self.dirs.contains(dir) && self.dir_is_empty(dir) {
            self.dirs.remove(dir);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn writes_create_ancestor_directories() {
        let mut store = MemoryStore::new();
        store.write("menus/demo_Main.menu.json", b"{}".to_vec()).unwrap();
        assert!(store.dir_exists("menus"));
        assert!(store.exists("menus/demo_Main.menu.json"));
        assert!(!store.dir_exists("clips"));
    }

    #[test]
    fn empty_directories_are_prunable() {
        let mut store = MemoryStore::new();
        store.write("clips/Hat_On.clip.json", b"{}".to_vec()).unwrap();
        store.remove_dir_if_empty("clips").unwrap();
        assert!(store.dir_exists("clips"));

        store.delete("clips/Hat_On.clip.json").unwrap();
        store.remove_dir_if_empty("clips").unwrap();
        assert!(!store.dir_exists("clips"));
    }

    #[test]
    fn deleting_a_missing_asset_is_a_conflict() {
        let mut store = MemoryStore::new();
        assert!(matches!(
            store.delete("nope.json"),
            Err(CompileError::AssetConflict { .. })
        ));
    }

    #[test]
    fn nested_ancestors() {
        assert_eq!(
            ancestor_dirs("a/b/c.json"),
            vec!["a".to_string(), "a/b".to_string()]
        );
        assert!(ancestor_dirs("c.json").is_empty());
    }
}
