//! Tracking ledger: path → blob id snapshot of the currently checked-out tree.
//!
//! `status` needs to tell "staged" apart from "unstaged" changes, which
//! requires knowing what the working tree looked like at last checkout —
//! not just what's in the index (which reflects `add`, not `checkout`).
//! This ledger is rebuilt whenever `checkout` completes and is otherwise
//! read-only from the rest of the engine's point of view.

use std::collections::BTreeMap;
use std::fs;
use std::io::Write;
use std::path::Path;

use serde::{Deserialize, Serialize};
use tempfile::NamedTempFile;

use crate::errors::{Error, Result};
use crate::hash::ObjectId;
use crate::object::{Object, ObjectKind, Tree};
use crate::store::ObjectStore;

const TRACKING_FILE: &str = "tracking";

#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct TrackingLedger {
    entries: BTreeMap<String, ObjectId>,
}

impl TrackingLedger {
    pub fn load(root: &Path) -> Result<TrackingLedger> {
        let path = root.join(TRACKING_FILE);
        match fs::read(&path) {
            Ok(bytes) => {
                serde_json::from_slice(&bytes).map_err(|e| Error::IndexMalformed(e.to_string()))
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(TrackingLedger::default()),
            Err(e) => Err(Error::Io(e)),
        }
    }

    pub fn save(&self, root: &Path) -> Result<()> {
        let path = root.join(TRACKING_FILE);
        let bytes =
            serde_json::to_vec_pretty(self).map_err(|e| Error::IndexMalformed(e.to_string()))?;
        let mut tmp = NamedTempFile::new_in(root)?;
        tmp.write_all(&bytes)?;
        tmp.as_file().sync_all()?;
        tmp.persist(&path).map_err(|e| Error::Io(e.error))?;
        Ok(())
    }

    pub fn get(&self, path: &str) -> Option<ObjectId> {
        self.entries.get(path).copied()
    }

    pub fn paths(&self) -> impl Iterator<Item = &str> {
        self.entries.keys().map(|s| s.as_str())
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Walk a tree object recursively, flattening it into path → blob id.
    pub fn from_tree(store: &ObjectStore, tree_id: ObjectId) -> Result<TrackingLedger> {
        let mut entries = BTreeMap::new();
        walk(store, tree_id, String::new(), &mut entries)?;
        Ok(TrackingLedger { entries })
    }
}

fn walk(
    store: &ObjectStore,
    tree_id: ObjectId,
    prefix: String,
    out: &mut BTreeMap<String, ObjectId>,
) -> Result<()> {
    let object = store.get(tree_id)?;
    let tree: &Tree = object
        .as_tree()
        .ok_or_else(|| Error::Corrupt(tree_id.to_string()))?;
    for entry in &tree.entries {
        let path = if prefix.is_empty() {
            entry.name.clone()
        } else {
            format!("{prefix}/{}", entry.name)
        };
        if entry.mode.is_directory() {
            walk(store, entry.id, path, out)?;
        } else {
            out.insert(path, entry.id);
        }
    }
    Ok(())
}
