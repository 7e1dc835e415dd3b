//! Glotmap storage layer
//!
//! The runtime treats its backing store purely as an ordered-list / set /
//! string store; this crate provides that interface ([`Store`]), an
//! in-process implementation with optional snapshot persistence
//! ([`KvStore`]), the key schema, and typed accessors over it
//! ([`Languages`], [`TagSets`], [`Entities`]).
//!
//! ## Persisted schema
//!
//! | key                  | value                                   |
//! |----------------------|-----------------------------------------|
//! | `locales`            | ordered list of locale codes            |
//! | `locale:{code}`      | display label                           |
//! | `{eid}:{locale}`     | source URI                              |
//! | `{eid}:{locale}:tags`| ordered list of raw tags                |
//! | `tags:{locale}`      | set of raw tags (locale vocabulary)     |
//! | `ingest:phase:{name}`| ingestion phase checkpoint              |
//! | `xref:{external}`    | corpus external key -> entity id        |

pub mod accessors;
pub mod keys;


use std::collections::{BTreeMap, BTreeSet};
use std::fs;
use std::path::{Path, PathBuf};

use parking_lot::RwLock;
use serde::{Deserialize, Serialize};

use glotmap_core::{Error, Result};

pub use accessors::{Entities, Language, Languages, LocalizedEntity, TagSets};

// ============================================================================
// Store interface
// ============================================================================

/// Ordered-list / set / string store, the only storage surface the rest
/// of the system is allowed to touch.
///
/// Lists preserve append order; set members come back sorted so every
/// read of a vocabulary is deterministic.
pub trait Store: Send + Sync {
    fn get(&self, key: &str) -> Option<String>;
    fn set(&self, key: &str, value: &str);
    /// Append to the list at `key`, creating it if absent.
    fn push(&self, key: &str, value: &str);
    fn list(&self, key: &str) -> Vec<String>;
    /// Add a member to the set at `key`, creating it if absent.
    fn add(&self, key: &str, member: &str);
    fn members(&self, key: &str) -> Vec<String>;
    fn exists(&self, key: &str) -> bool;
    /// Make prior writes durable. No-op for purely in-memory stores.
    fn flush(&self) -> Result<()> {
        Ok(())
    }
}

// ============================================================================
// In-process implementation
// ============================================================================

#[derive(Debug, Clone, Serialize, Deserialize)]
enum Value {
    Str(String),
    List(Vec<String>),
    Set(BTreeSet<String>),
}

/// In-process store backed by a `BTreeMap`, optionally snapshotted to a
/// bincode file. Writes mutate memory only; [`KvStore::flush`] persists.
///
/// A type mismatch (pushing to a key holding a string, ...) overwrites
/// the old value; keys are namespaced by the schema so this only happens
/// on corrupted input.
pub struct KvStore {
    map: RwLock<BTreeMap<String, Value>>,
    path: Option<PathBuf>,
}

impl KvStore {
    /// Fresh in-memory store with no backing file.
    pub fn in_memory() -> Self {
        Self {
            map: RwLock::new(BTreeMap::new()),
            path: None,
        }
    }

    /// Open a file-backed store, loading the snapshot when present.
    pub fn open(path: impl Into<PathBuf>) -> Result<Self> {
        let path = path.into();
        let map = if path.exists() {
            let bytes = fs::read(&path)?;
            bincode::deserialize(&bytes)
                .map_err(|e| Error::Store(format!("corrupt snapshot {}: {e}", path.display())))?
        } else {
            BTreeMap::new()
        };
        Ok(Self {
            map: RwLock::new(map),
            path: Some(path),
        })
    }

    pub fn len(&self) -> usize {
        self.map.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.map.read().is_empty()
    }
}

fn tmp_path(path: &Path) -> PathBuf {
    let mut name = path.as_os_str().to_os_string();
    name.push(".tmp");
    PathBuf::from(name)
}

impl Store for KvStore {
    fn get(&self, key: &str) -> Option<String> {
        match self.map.read().get(key) {
            Some(Value::Str(s)) => Some(s.clone()),
            _ => None,
        }
    }

    fn set(&self, key: &str, value: &str) {
        self.map
            .write()
            .insert(key.to_string(), Value::Str(value.to_string()));
    }

    fn push(&self, key: &str, value: &str) {
        let mut map = self.map.write();
        match map.get_mut(key) {
            Some(Value::List(items)) => items.push(value.to_string()),
            _ => {
                map.insert(key.to_string(), Value::List(vec![value.to_string()]));
            }
        }
    }

    fn list(&self, key: &str) -> Vec<String> {
        match self.map.read().get(key) {
            Some(Value::List(items)) => items.clone(),
            _ => Vec::new(),
        }
    }

    fn add(&self, key: &str, member: &str) {
        let mut map = self.map.write();
        match map.get_mut(key) {
            Some(Value::Set(members)) => {
                members.insert(member.to_string());
            }
            _ => {
                map.insert(
                    key.to_string(),
                    Value::Set(BTreeSet::from([member.to_string()])),
                );
            }
        }
    }

    fn members(&self, key: &str) -> Vec<String> {
        match self.map.read().get(key) {
            Some(Value::Set(members)) => members.iter().cloned().collect(),
            _ => Vec::new(),
        }
    }

    fn exists(&self, key: &str) -> bool {
        self.map.read().contains_key(key)
    }

    /// Snapshot the current contents to the backing file, if any.
    fn flush(&self) -> Result<()> {
        let Some(path) = &self.path else {
            return Ok(());
        };
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)?;
            }
        }
        let map = self.map.read();
        let bytes = bincode::serialize(&*map)
            .map_err(|e| Error::Store(format!("snapshot encode failed: {e}")))?;
        // Write-then-rename so a crash mid-flush never truncates the
        // previous snapshot.
        let tmp = tmp_path(path);
        fs::write(&tmp, bytes)?;
        fs::rename(&tmp, path)?;
        Ok(())
    }
}
