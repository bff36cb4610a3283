//! Tree objects: a sorted list of `(mode, name, id)` entries.
//!
//! Entry format is `<mode-octal> <name>\0<20-byte-id>`, entries packed back
//! to back with no separator between them. Entries are kept sorted by name
//! so two trees with the same content always serialize identically.

use bstr::ByteSlice;

use crate::errors::{Error, Result};
use crate::hash::{HASH_SIZE, ObjectId};

#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum TreeMode {
    /// Regular, non-executable file (`100644`).
    Regular,
    /// Executable file (`100755`).
    Executable,
    /// Subdirectory (`40000`).
    Directory,
}

impl TreeMode {
    pub const fn as_bytes(&self) -> &'static [u8] {
        match self {
            TreeMode::Regular => b"100644",
            TreeMode::Executable => b"100755",
            TreeMode::Directory => b"40000",
        }
    }

    pub fn from_bytes(mode: &[u8]) -> Result<TreeMode> {
        match mode {
            b"100644" => Ok(TreeMode::Regular),
            b"100755" => Ok(TreeMode::Executable),
            b"40000" => Ok(TreeMode::Directory),
            other => Err(Error::InvalidObject(format!(
                "unsupported tree entry mode: {}",
                String::from_utf8_lossy(other)
            ))),
        }
    }

    pub fn is_directory(&self) -> bool {
        matches!(self, TreeMode::Directory)
    }
}

#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct TreeEntry {
    pub mode: TreeMode,
    pub name: String,
    pub id: ObjectId,
}

impl TreeEntry {
    pub fn new(mode: TreeMode, name: impl Into<String>, id: ObjectId) -> Self {
        TreeEntry {
            mode,
            name: name.into(),
            id,
        }
    }

    fn to_bytes(&self) -> Vec<u8> {
        let mut out = Vec::new();
        out.extend_from_slice(self.mode.as_bytes());
        out.push(b' ');
        out.extend_from_slice(self.name.as_bytes());
        out.push(0);
        out.extend_from_slice(self.id.as_ref());
        out
    }
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Tree {
    pub entries: Vec<TreeEntry>,
}

impl Tree {
    /// Build a tree from an arbitrary entry set, sorting by name and
    /// rejecting duplicate names (§4 invariant: a tree has at most one
    /// entry per name).
    pub fn new(mut entries: Vec<TreeEntry>) -> Result<Tree> {
        entries.sort_by(|a, b| a.name.cmp(&b.name));
        for pair in entries.windows(2) {
            if pair[0].name == pair[1].name {
                return Err(Error::InvalidObject(format!(
                    "duplicate tree entry name: {}",
                    pair[0].name
                )));
            }
        }
        Ok(Tree { entries })
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn get(&self, name: &str) -> Option<&TreeEntry> {
        self.entries.iter().find(|e| e.name == name)
    }

    pub fn to_payload(&self) -> Vec<u8> {
        let mut out = Vec::new();
        for entry in &self.entries {
            out.extend(entry.to_bytes());
        }
        out
    }

    pub fn from_payload(data: &[u8]) -> Result<Tree> {
        let mut entries = Vec::new();
        let mut i = 0;
        while i < data.len() {
            let space = data[i..]
                .find_byte(b' ')
                .ok_or_else(|| Error::InvalidObject("tree entry missing mode separator".into()))?;
            let mode = TreeMode::from_bytes(&data[i..i + space])?;
            let name_start = i + space + 1;
            let nul = data[name_start..]
                .find_byte(0)
                .ok_or_else(|| Error::InvalidObject("tree entry missing name terminator".into()))?;
            let name = String::from_utf8(data[name_start..name_start + nul].to_vec())
                .map_err(|_| Error::InvalidObject("tree entry name is not valid utf-8".into()))?;
            let id_start = name_start + nul + 1;
            let id_end = id_start + HASH_SIZE;
            if id_end > data.len() {
                return Err(Error::InvalidObject("tree entry id truncated".into()));
            }
            let id = ObjectId::from_bytes(&data[id_start..id_end])
                .map_err(Error::InvalidObject)?;
            entries.push(TreeEntry { mode, name, id });
            i = id_end;
        }
        Tree::new(entries)
    }
}
