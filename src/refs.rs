//! The reference model: named branches and a `HEAD` that is either symbolic
//! (pointing at a branch) or detached (pointing straight at a commit).
//!
//! Branch files live under `refs/heads/<name>` and hold a single hex commit
//! id plus trailing newline. `HEAD` holds either `ref: refs/heads/<name>\n`
//! or a bare hex id for a detached checkout. All writes go through a
//! temp-file-plus-rename so a reader never observes a half-written ref.

use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

use tempfile::NamedTempFile;

use crate::errors::{Error, Result};
use crate::hash::ObjectId;

const HEADS_DIR: &str = "refs/heads";
const HEAD_FILE: &str = "HEAD";

pub enum Head {
    Symbolic(String),
    Detached(ObjectId),
    /// No commits yet and `HEAD` has never been written.
    Unborn,
}

pub struct RefStore {
    root: PathBuf,
}

impl RefStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        RefStore { root: root.into() }
    }

    pub fn init(&self, default_branch: &str) -> Result<()> {
        fs::create_dir_all(self.root.join(HEADS_DIR))?;
        self.set_head_symbolic(default_branch)
    }

    fn heads_dir(&self) -> PathBuf {
        self.root.join(HEADS_DIR)
    }

    fn branch_path(&self, name: &str) -> PathBuf {
        self.heads_dir().join(name)
    }

    fn head_path(&self) -> PathBuf {
        self.root.join(HEAD_FILE)
    }

    fn write_atomic(&self, path: &Path, contents: &str) -> Result<()> {
        let dir = path
            .parent()
            .expect("ref path always has a parent directory");
        fs::create_dir_all(dir)?;
        let mut tmp = NamedTempFile::new_in(dir)?;
        tmp.write_all(contents.as_bytes())?;
        tmp.as_file().sync_all()?;
        tmp.persist(path).map_err(|e| Error::Io(e.error))?;
        Ok(())
    }

    pub fn branch_exists(&self, name: &str) -> bool {
        self.branch_path(name).is_file()
    }

    pub fn read_branch(&self, name: &str) -> Result<Option<ObjectId>> {
        let path = self.branch_path(name);
        match fs::read_to_string(&path) {
            Ok(contents) => {
                let hex = contents.trim();
                if hex.is_empty() {
                    Ok(None)
                } else {
                    Ok(Some(hex.parse().map_err(Error::RefNotFound)?))
                }
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                Err(Error::RefNotFound(name.to_string()))
            }
            Err(e) => Err(Error::Io(e)),
        }
    }

    pub fn write_branch(&self, name: &str, id: ObjectId) -> Result<()> {
        self.write_atomic(&self.branch_path(name), &format!("{id}\n"))
    }

    /// Create an unborn branch file (empty, meaning "no commits yet").
    pub fn create_unborn_branch(&self, name: &str) -> Result<()> {
        if self.branch_exists(name) {
            return Ok(());
        }
        self.write_atomic(&self.branch_path(name), "")
    }

    pub fn list_branches(&self) -> Result<Vec<String>> {
        let dir = self.heads_dir();
        if !dir.is_dir() {
            return Ok(Vec::new());
        }
        let mut names: Vec<String> = fs::read_dir(&dir)?
            .filter_map(|e| e.ok())
            .filter(|e| e.file_type().map(|t| t.is_file()).unwrap_or(false))
            .map(|e| e.file_name().to_string_lossy().to_string())
            .collect();
        names.sort();
        Ok(names)
    }

    pub fn read_head(&self) -> Result<Head> {
        let contents = match fs::read_to_string(self.head_path()) {
            Ok(c) => c,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Head::Unborn),
            Err(e) => return Err(Error::Io(e)),
        };
        let trimmed = contents.trim();
        if let Some(branch) = trimmed.strip_prefix("ref: refs/heads/") {
            Ok(Head::Symbolic(branch.to_string()))
        } else if trimmed.is_empty() {
            Ok(Head::Unborn)
        } else {
            Ok(Head::Detached(trimmed.parse().map_err(Error::RefNotFound)?))
        }
    }

    pub fn set_head_symbolic(&self, branch: &str) -> Result<()> {
        self.write_atomic(&self.head_path(), &format!("ref: refs/heads/{branch}\n"))
    }

    pub fn set_head_detached(&self, id: ObjectId) -> Result<()> {
        self.write_atomic(&self.head_path(), &format!("{id}\n"))
    }

    /// Resolve `HEAD` to a commit id, if any commit has been made yet.
    pub fn head_target(&self) -> Result<Option<ObjectId>> {
        match self.read_head()? {
            Head::Symbolic(branch) => self.read_branch(&branch),
            Head::Detached(id) => Ok(Some(id)),
            Head::Unborn => Ok(None),
        }
    }

    pub fn current_branch(&self) -> Result<Option<String>> {
        match self.read_head()? {
            Head::Symbolic(branch) => Ok(Some(branch)),
            _ => Ok(None),
        }
    }
}
