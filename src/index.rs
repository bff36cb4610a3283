//! The staging index: a path → blob mapping that `commit` turns into a tree.
//!
//! Persisted as JSON under the metadata directory, written atomically.
//! Each entry records enough filesystem metadata (`mtime`, `size`, `mode`)
//! for a future `status` implementation to skip rehashing unchanged files,
//! though this engine always rehashes on `add` for correctness first.

use std::collections::BTreeMap;
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::time::SystemTime;

use serde::{Deserialize, Serialize};
use tempfile::NamedTempFile;

use crate::errors::{Error, Result};
use crate::hash::ObjectId;
use crate::object::tree::TreeMode;

const INDEX_FILE: &str = "index";

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct IndexEntry {
    pub object_id: ObjectId,
    pub mtime_secs: i64,
    pub size: u64,
    #[serde(with = "mode_serde")]
    pub mode: TreeMode,
}

mod mode_serde {
    use super::TreeMode;
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(mode: &TreeMode, s: S) -> Result<S::Ok, S::Error> {
        s.serialize_str(std::str::from_utf8(mode.as_bytes()).unwrap())
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(d: D) -> Result<TreeMode, D::Error> {
        let s = String::deserialize(d)?;
        TreeMode::from_bytes(s.as_bytes()).map_err(serde::de::Error::custom)
    }
}

#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct Index {
    /// Path relative to the repository root, using `/` separators.
    entries: BTreeMap<String, IndexEntry>,
}

impl Index {
    pub fn load(root: &Path) -> Result<Index> {
        let path = root.join(INDEX_FILE);
        match fs::read(&path) {
            Ok(bytes) => {
                serde_json::from_slice(&bytes).map_err(|e| Error::IndexMalformed(e.to_string()))
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(Index::default()),
            Err(e) => Err(Error::Io(e)),
        }
    }

    pub fn save(&self, root: &Path) -> Result<()> {
        let path = root.join(INDEX_FILE);
        let bytes =
            serde_json::to_vec_pretty(self).map_err(|e| Error::IndexMalformed(e.to_string()))?;
        let mut tmp = NamedTempFile::new_in(root)?;
        tmp.write_all(&bytes)?;
        tmp.as_file().sync_all()?;
        tmp.persist(&path).map_err(|e| Error::Io(e.error))?;
        Ok(())
    }

    /// Stage or re-stage a path. Idempotent: adding the same content twice
    /// leaves the index unchanged.
    pub fn add(&mut self, path: impl Into<String>, entry: IndexEntry) {
        self.entries.insert(path.into(), entry);
    }

    pub fn remove(&mut self, path: &str) -> Option<IndexEntry> {
        self.entries.remove(path)
    }

    pub fn get(&self, path: &str) -> Option<&IndexEntry> {
        self.entries.get(path)
    }

    pub fn paths(&self) -> impl Iterator<Item = &str> {
        self.entries.keys().map(|s| s.as_str())
    }

    pub fn entries(&self) -> impl Iterator<Item = (&str, &IndexEntry)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v))
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }
}

pub fn mtime_secs(path: &PathBuf) -> Result<i64> {
    let meta = fs::metadata(path)?;
    let modified = meta.modified()?;
    Ok(modified
        .duration_since(SystemTime::UNIX_EPOCH)
        .map(|d| d.as_secs() as i64)
        .unwrap_or(0))
}
