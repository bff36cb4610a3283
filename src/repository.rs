//! The repository handle: one value threaded explicitly through every
//! operation instead of relying on process-global state or `cwd`.
//!
//! Mutable state (the index, the tracking ledger, the remotes table) is
//! loaded and saved explicitly by each operation rather than cached on the
//! handle, so two operations in sequence never observe a stale in-memory
//! copy of something another operation just wrote to disk.

use std::path::{Path, PathBuf};

use crate::errors::{Error, Result};
use crate::ignore::IgnoreMatcher;
use crate::index::Index;
use crate::lock::RepoLock;
use crate::refs::RefStore;
use crate::remote::RemoteTable;
use crate::store::ObjectStore;
use crate::tracking::TrackingLedger;

pub const METADATA_DIR: &str = ".pygit";
pub const DEFAULT_BRANCH: &str = "main";

pub struct Repository {
    /// Working tree root (the directory containing the metadata directory).
    root: PathBuf,
    meta_dir: PathBuf,
    store: ObjectStore,
    refs: RefStore,
}

impl Repository {
    /// Initialize a new repository at `root`, which must not already contain one.
    pub fn init(root: &Path) -> Result<Repository> {
        let meta_dir = root.join(METADATA_DIR);
        if meta_dir.is_dir() {
            return Err(Error::RemoteError(format!(
                "{} is already a pygit repository",
                root.display()
            )));
        }
        std::fs::create_dir_all(&meta_dir)?;
        let store = ObjectStore::new(&meta_dir);
        store.init()?;
        let refs = RefStore::new(&meta_dir);
        refs.init(DEFAULT_BRANCH)?;
        refs.create_unborn_branch(DEFAULT_BRANCH)?;

        Ok(Repository {
            root: root.to_path_buf(),
            meta_dir,
            store,
            refs,
        })
    }

    /// Discover an existing repository starting at `start` and walking up
    /// through parent directories, as real VCS tooling does.
    pub fn discover(start: &Path) -> Result<Repository> {
        let mut dir = start.to_path_buf();
        loop {
            let candidate = dir.join(METADATA_DIR);
            if candidate.is_dir() {
                let meta_dir = candidate;
                let store = ObjectStore::new(&meta_dir);
                let refs = RefStore::new(&meta_dir);
                return Ok(Repository {
                    root: dir,
                    meta_dir,
                    store,
                    refs,
                });
            }
            if !dir.pop() {
                return Err(Error::NotARepo);
            }
        }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn meta_dir(&self) -> &Path {
        &self.meta_dir
    }

    pub fn store(&self) -> &ObjectStore {
        &self.store
    }

    pub fn refs(&self) -> &RefStore {
        &self.refs
    }

    pub fn lock(&self) -> Result<RepoLock> {
        RepoLock::acquire(&self.meta_dir)
    }

    pub fn load_index(&self) -> Result<Index> {
        Index::load(&self.meta_dir)
    }

    pub fn save_index(&self, index: &Index) -> Result<()> {
        index.save(&self.meta_dir)
    }

    pub fn load_tracking(&self) -> Result<TrackingLedger> {
        TrackingLedger::load(&self.meta_dir)
    }

    pub fn save_tracking(&self, ledger: &TrackingLedger) -> Result<()> {
        ledger.save(&self.meta_dir)
    }

    pub fn load_remotes(&self) -> Result<RemoteTable> {
        RemoteTable::load(&self.meta_dir)
    }

    pub fn save_remotes(&self, remotes: &RemoteTable) -> Result<()> {
        remotes.save(&self.meta_dir)
    }

    pub fn ignore_matcher(&self) -> IgnoreMatcher {
        IgnoreMatcher::load(&self.root, METADATA_DIR)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_init_then_discover_from_nested_dir() {
        let dir = tempdir().unwrap();
        Repository::init(dir.path()).unwrap();

        let nested = dir.path().join("a/b/c");
        std::fs::create_dir_all(&nested).unwrap();
        let repo = Repository::discover(&nested).unwrap();
        assert_eq!(repo.root(), dir.path());
    }

    #[test]
    fn test_discover_fails_outside_any_repo() {
        let dir = tempdir().unwrap();
        assert!(matches!(Repository::discover(dir.path()), Err(Error::NotARepo)));
    }

    #[test]
    fn test_init_twice_fails() {
        let dir = tempdir().unwrap();
        Repository::init(dir.path()).unwrap();
        assert!(Repository::init(dir.path()).is_err());
    }

    #[test]
    fn test_fresh_repo_has_unborn_head() {
        let dir = tempdir().unwrap();
        let repo = Repository::init(dir.path()).unwrap();
        assert_eq!(repo.refs().head_target().unwrap(), None);
        assert_eq!(
            repo.refs().current_branch().unwrap(),
            Some(DEFAULT_BRANCH.to_string())
        );
    }
}
