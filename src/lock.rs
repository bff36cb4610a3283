//! Advisory single-writer lock for the repository, held for the duration of
//! any mutating command (`add`, `commit`, `checkout`, `pull`, the push-receiving
//! server). Implemented as an exclusively-created marker file rather than
//! `flock`, so it also works across the synchronous wire protocol's single
//! connection without depending on platform-specific locking primitives.

use std::fs;
use std::path::{Path, PathBuf};

use crate::errors::{Error, Result};

const LOCK_FILE: &str = "lock";

pub struct RepoLock {
    path: PathBuf,
}

impl RepoLock {
    pub fn acquire(root: &Path) -> Result<RepoLock> {
        let path = root.join(LOCK_FILE);
        match fs::OpenOptions::new().write(true).create_new(true).open(&path) {
            Ok(_) => Ok(RepoLock { path }),
            Err(e) if e.kind() == std::io::ErrorKind::AlreadyExists => Err(Error::RepoLocked),
            Err(e) => Err(Error::Io(e)),
        }
    }
}

impl Drop for RepoLock {
    fn drop(&mut self) {
        let _ = fs::remove_file(&self.path);
    }
}
