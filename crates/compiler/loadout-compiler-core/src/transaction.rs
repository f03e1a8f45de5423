//! Rollback journal over the output store.
//!
//! Every mutation during a compilation goes through a [`Transaction`], which
//! captures pre-existing bytes *before* the first touch of each path. On
//! failure the journal is replayed in reverse: created assets are deleted,
//! overwritten and deleted assets restored, and directories created along the
//! way pruned if they ended up empty, leaving the store byte-for-byte as it
//! was.

use log::{debug, error};
use uuid::Uuid;

use crate::error::Result;
use crate::store::{ancestor_dirs, AssetStore};

#[derive(Debug)]
enum JournalEntry {
    Created { path: String },
    Overwritten { path: String, original: Vec<u8> },
    Deleted { path: String, original: Vec<u8> },
    DirCreated { dir: String },
}

#[derive(Debug)]
pub struct Transaction {
    id: Uuid,
    journal: Vec<JournalEntry>,
    touched: hashbrown::HashSet<String>,
}

impl Transaction {
    pub fn new() -> Self {
        let id = Uuid::new_v4();
        debug!("transaction {id} started");
        Self {
            id,
            journal: Vec::new(),
            touched: hashbrown::HashSet::new(),
        }
    }

    pub fn write(&mut self, store: &mut dyn AssetStore, path: &str, bytes: Vec<u8>) -> Result<()> {
        if !self.touched.contains(path) {
            for dir in ancestor_dirs(path) {
                if !store.dir_exists(&dir) {
                    self.journal.push(JournalEntry::DirCreated { dir });
                }
            }
            match store.read(path)? {
                Some(original) => self.journal.push(JournalEntry::Overwritten {
                    path: path.to_string(),
                    original,
                }),
                None => self.journal.push(JournalEntry::Created {
                    path: path.to_string(),
                }),
            }
            self.touched.insert(path.to_string());
        }
        store.write(path, bytes)
    }

    pub fn delete(&mut self, store: &mut dyn AssetStore, path: &str) -> Result<()> {
        if !self.touched.contains(path) {
            if let Some(original) = store.read(path)? {
                self.journal.push(JournalEntry::Deleted {
                    path: path.to_string(),
                    original,
                });
            }
            self.touched.insert(path.to_string());
        }
        store.delete(path)
    }

    pub fn commit(self) {
        debug!(
            "transaction {} committed ({} entries)",
            self.id,
            self.journal.len()
        );
    }

    /// Best-effort restore; failures are logged rather than propagated so a
    /// broken store cannot mask the error that triggered the rollback.
    pub fn rollback(self, store: &mut dyn AssetStore) {
        debug!(
            "transaction {} rolling back {} entries",
            self.id,
            self.journal.len()
        );
        for entry in self.journal.into_iter().rev() {
            let outcome = match entry {
                JournalEntry::Created { path } => store.delete(&path),
                JournalEntry::Overwritten { path, original }
                | JournalEntry::Deleted { path, original } => store.write(&path, original),
                JournalEntry::DirCreated { dir } => store.remove_dir_if_empty(&dir),
            };
            if let Err(err) = outcome {
                error!("rollback step failed: {err}");
            }
        }
    }
}

impl Default for Transaction {
    fn default() -> Self {
        Self::new()
    }
}
