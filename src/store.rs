//! Loose object storage: `objects/<xx>/<rest-of-hex>`, written atomically.
//!
//! Objects are stored uncompressed. Packfiles, delta encoding, and zlib
//! framing are out of scope for this engine; every object lives as one file.

use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

use tempfile::NamedTempFile;
use tracing::debug;

use crate::errors::{Error, Result};
use crate::hash::ObjectId;
use crate::object::Object;

pub struct ObjectStore {
    root: PathBuf,
}

impl ObjectStore {
    /// `root` is the repository metadata directory; objects live under `root/objects`.
    pub fn new(root: impl Into<PathBuf>) -> Self {
        ObjectStore { root: root.into() }
    }

    pub fn init(&self) -> Result<()> {
        fs::create_dir_all(self.objects_dir())?;
        Ok(())
    }

    fn objects_dir(&self) -> PathBuf {
        self.root.join("objects")
    }

    fn path_for(&self, id: ObjectId) -> PathBuf {
        let (dir, rest) = id.split_path();
        self.objects_dir().join(dir).join(rest)
    }

    pub fn exists(&self, id: ObjectId) -> bool {
        self.path_for(id).is_file()
    }

    /// Write an object if absent; idempotent if already present. Returns its id.
    pub fn put(&self, object: &Object) -> Result<ObjectId> {
        let id = object.id();
        if self.exists(id) {
            debug!(%id, kind = %object.kind(), "object already present");
            return Ok(id);
        }
        let path = self.path_for(id);
        let dir = path
            .parent()
            .expect("object path always has a parent directory");
        fs::create_dir_all(dir)?;

        let mut tmp = NamedTempFile::new_in(dir)?;
        tmp.write_all(&object.to_framed())?;
        tmp.as_file().sync_all()?;
        tmp.persist(&path).map_err(|e| Error::Io(e.error))?;
        debug!(%id, kind = %object.kind(), bytes = object.payload().len(), "object written");
        Ok(id)
    }

    pub fn get(&self, id: ObjectId) -> Result<Object> {
        let path = self.path_for(id);
        let data = fs::read(&path).map_err(|e| {
            if e.kind() == std::io::ErrorKind::NotFound {
                Error::ObjectMissing(id.to_string())
            } else {
                Error::Io(e)
            }
        })?;
        let object = Object::from_framed(&data)?;
        if object.id() != id {
            return Err(Error::Corrupt(id.to_string()));
        }
        Ok(object)
    }

    /// Iterate every object id present in the store. Order is filesystem order,
    /// not insertion order.
    pub fn iter_ids(&self) -> Result<Vec<ObjectId>> {
        let mut ids = Vec::new();
        let objects_dir = self.objects_dir();
        if !objects_dir.is_dir() {
            return Ok(ids);
        }
        for prefix_entry in fs::read_dir(&objects_dir)? {
            let prefix_entry = prefix_entry?;
            if !prefix_entry.file_type()?.is_dir() {
                continue;
            }
            let prefix = prefix_entry.file_name().to_string_lossy().to_string();
            for rest_entry in fs::read_dir(prefix_entry.path())? {
                let rest_entry = rest_entry?;
                let rest = rest_entry.file_name().to_string_lossy().to_string();
                let hex = format!("{prefix}{rest}");
                if let Ok(id) = hex.parse() {
                    ids.push(id);
                }
            }
        }
        Ok(ids)
    }

    pub fn root(&self) -> &Path {
        &self.root
    }
}
