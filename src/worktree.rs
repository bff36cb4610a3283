//! Working-tree reconciliation: `status`, `add`, and `checkout`.

use std::fs;
use std::os::unix::fs::PermissionsExt;
use std::path::{Path, PathBuf};

use walkdir::WalkDir;

use crate::errors::{Error, Result};
use crate::hash::ObjectId;
use crate::index::{Index, IndexEntry, mtime_secs};
use crate::object::tree::TreeMode;
use crate::object::{Blob, Object, Tree};
use crate::repository::Repository;
use crate::store::ObjectStore;
use crate::tracking::TrackingLedger;

#[derive(Debug, Default, Clone)]
pub struct Status {
    pub staged_new: Vec<String>,
    pub staged_modified: Vec<String>,
    pub unstaged_modified: Vec<String>,
    pub deleted: Vec<String>,
    pub untracked: Vec<String>,
}

fn relative_path(root: &Path, path: &Path) -> String {
    path.strip_prefix(root)
        .unwrap_or(path)
        .to_string_lossy()
        .replace('\\', "/")
}

fn mode_of(path: &Path) -> Result<TreeMode> {
    let meta = fs::metadata(path)?;
    let executable = meta.permissions().mode() & 0o111 != 0;
    Ok(if executable {
        TreeMode::Executable
    } else {
        TreeMode::Regular
    })
}

fn hash_file(path: &Path) -> Result<(ObjectId, Blob)> {
    let data = fs::read(path)?;
    let blob = Blob::new(data);
    let id = ObjectId::frame(crate::object::ObjectKind::Blob, &blob.to_payload());
    Ok((id, blob))
}

/// Enumerate every non-ignored file under the repository root, relative to it.
fn walk_working_tree(repo: &Repository) -> Vec<PathBuf> {
    let matcher = repo.ignore_matcher();
    WalkDir::new(repo.root())
        .into_iter()
        .filter_map(|e| e.ok())
        .filter(|e| e.file_type().is_file())
        .map(|e| e.path().to_path_buf())
        .filter(|p| {
            let rel = Path::new(&relative_path(repo.root(), p));
            !matcher.is_ignored(rel)
        })
        .collect()
}

/// Stage `paths` (repository-root-relative; `"."` means the whole tree).
/// A pathspec that no longer exists on disk but is present in the index is
/// treated as staging a deletion.
pub fn add(repo: &Repository, pathspecs: &[String]) -> Result<()> {
    let mut index = repo.load_index()?;
    let whole_tree = pathspecs.iter().any(|p| p == ".");

    let candidates: Vec<PathBuf> = if whole_tree {
        walk_working_tree(repo)
    } else {
        pathspecs.iter().map(|p| repo.root().join(p)).collect()
    };

    for path in &candidates {
        let rel = relative_path(repo.root(), path);
        if !path.exists() {
            index.remove(&rel);
            continue;
        }
        if path.is_dir() {
            continue;
        }
        let (id, blob) = hash_file(path)?;
        repo.store().put(&Object::Blob(blob))?;
        let entry = IndexEntry {
            object_id: id,
            mtime_secs: mtime_secs(path)?,
            size: fs::metadata(path)?.len(),
            mode: mode_of(path)?,
        };
        index.add(rel, entry);
    }

    repo.save_index(&index)
}

/// Compare the index against the last-checked-out tree (staged changes) and
/// against the working tree (unstaged changes/deletions/untracked files).
///
/// A path that is both re-staged and then edited again on disk shows up as
/// both `staged-modified` and `unstaged-modified`: the working-tree
/// comparison baseline is the index entry when one exists, falling back to
/// the tracking ledger otherwise.
pub fn status(repo: &Repository) -> Result<Status> {
    let index = repo.load_index()?;
    let tracking = repo.load_tracking()?;
    let mut out = Status::default();

    let mut paths: Vec<String> = index.paths().map(str::to_string).collect();
    paths.extend(tracking.paths().map(str::to_string));
    paths.sort();
    paths.dedup();

    for path in &paths {
        let index_entry = index.get(path);
        let tracked_id = tracking.get(path);

        match (index_entry, tracked_id) {
            (Some(_), None) => out.staged_new.push(path.clone()),
            (Some(entry), Some(tid)) if entry.object_id != tid => {
                out.staged_modified.push(path.clone())
            }
            _ => {}
        }

        let full_path = repo.root().join(path);
        if tracked_id.is_some() && !full_path.is_file() {
            out.deleted.push(path.clone());
            continue;
        }
        if let Some(baseline) = index_entry.map(|e| e.object_id).or(tracked_id) {
            if full_path.is_file() {
                let (disk_id, _) = hash_file(&full_path)?;
                if disk_id != baseline {
                    out.unstaged_modified.push(path.clone());
                }
            }
        }
    }

    for path in walk_working_tree(repo) {
        let rel = relative_path(repo.root(), &path);
        if index.get(&rel).is_none() && tracking.get(&rel).is_none() {
            out.untracked.push(rel);
        }
    }

    out.staged_new.sort();
    out.staged_modified.sort();
    out.unstaged_modified.sort();
    out.deleted.sort();
    out.untracked.sort();
    Ok(out)
}

/// Paths with any kind of uncommitted change, used to guard `checkout`.
fn dirty_paths(status: &Status) -> Vec<String> {
    let mut all = Vec::new();
    all.extend(status.staged_new.iter().cloned());
    all.extend(status.staged_modified.iter().cloned());
    all.extend(status.unstaged_modified.iter().cloned());
    all.extend(status.deleted.iter().cloned());
    all.sort();
    all.dedup();
    all
}

/// Switch to `branch`, optionally creating it first from the current HEAD.
/// Refuses when the working tree has uncommitted changes.
pub fn checkout(repo: &Repository, branch: &str, create: bool) -> Result<()> {
    let current_status = status(repo)?;
    let dirty = dirty_paths(&current_status);
    if !dirty.is_empty() {
        return Err(Error::DirtyWorkingTree(dirty.join(", ")));
    }

    if create {
        if repo.refs().branch_exists(branch) {
            return Err(Error::RemoteError(format!("branch already exists: {branch}")));
        }
        let head = repo.refs().head_target()?;
        match head {
            Some(id) => repo.refs().write_branch(branch, id)?,
            None => repo.refs().create_unborn_branch(branch)?,
        }
    } else if !repo.refs().branch_exists(branch) {
        return Err(Error::RefNotFound(branch.to_string()));
    }

    repo.refs().set_head_symbolic(branch)?;

    let target = repo.refs().read_branch(branch)?;
    let mut index = Index::default();
    let ledger = match target {
        Some(commit_id) => {
            let commit = repo
                .store()
                .get(commit_id)?
                .as_commit()
                .cloned()
                .ok_or_else(|| Error::Corrupt(commit_id.to_string()))?;
            materialize_tree(repo.store(), repo.root(), commit.tree, String::new())?;
            TrackingLedger::from_tree(repo.store(), commit.tree)?
        }
        None => TrackingLedger::default(),
    };

    for path in ledger.paths() {
        if let Some(id) = ledger.get(path) {
            let full = repo.root().join(path);
            let mode = if full.exists() {
                mode_of(&full)?
            } else {
                TreeMode::Regular
            };
            index.add(
                path.to_string(),
                IndexEntry {
                    object_id: id,
                    mtime_secs: mtime_secs(&full).unwrap_or(0),
                    size: fs::metadata(&full).map(|m| m.len()).unwrap_or(0),
                    mode,
                },
            );
        }
    }

    repo.save_index(&index)?;
    repo.save_tracking(&ledger)
}

fn materialize_tree(
    store: &ObjectStore,
    root: &Path,
    tree_id: ObjectId,
    prefix: String,
) -> Result<()> {
    let object = store.get(tree_id)?;
    let tree: &Tree = object
        .as_tree()
        .ok_or_else(|| Error::Corrupt(tree_id.to_string()))?;
    for entry in &tree.entries {
        let rel = if prefix.is_empty() {
            entry.name.clone()
        } else {
            format!("{prefix}/{}", entry.name)
        };
        let full = root.join(&rel);
        if entry.mode.is_directory() {
            fs::create_dir_all(&full)?;
            materialize_tree(store, root, entry.id, rel)?;
        } else {
            if let Some(parent) = full.parent() {
                fs::create_dir_all(parent)?;
            }
            let blob_obj = store.get(entry.id)?;
            let blob = blob_obj
                .as_blob()
                .ok_or_else(|| Error::Corrupt(entry.id.to_string()))?;
            fs::write(&full, &blob.data)?;
            if entry.mode == TreeMode::Executable {
                let mut perms = fs::metadata(&full)?.permissions();
                perms.set_mode(perms.mode() | 0o111);
                fs::set_permissions(&full, perms)?;
            }
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_add_single_file_then_untracked_excludes_it() {
        let dir = tempdir().unwrap();
        let repo = Repository::init(dir.path()).unwrap();
        fs::write(dir.path().join("a.txt"), "hello").unwrap();

        add(&repo, &["a.txt".to_string()]).unwrap();
        let status = status(&repo).unwrap();
        assert_eq!(status.staged_new, vec!["a.txt"]);
        assert!(status.untracked.is_empty());
    }

    #[test]
    fn test_untracked_files_are_reported() {
        let dir = tempdir().unwrap();
        let repo = Repository::init(dir.path()).unwrap();
        fs::write(dir.path().join("b.txt"), "hi").unwrap();
        let status = status(&repo).unwrap();
        assert_eq!(status.untracked, vec!["b.txt"]);
    }

    #[test]
    fn test_add_is_idempotent_for_identical_content() {
        let dir = tempdir().unwrap();
        let repo = Repository::init(dir.path()).unwrap();
        fs::write(dir.path().join("a.txt"), "hello").unwrap();
        add(&repo, &["a.txt".to_string()]).unwrap();
        add(&repo, &["a.txt".to_string()]).unwrap();
        let index = repo.load_index().unwrap();
        assert_eq!(index.len(), 1);
    }

    #[test]
    fn test_add_missing_path_stages_deletion() {
        let dir = tempdir().unwrap();
        let repo = Repository::init(dir.path()).unwrap();
        fs::write(dir.path().join("a.txt"), "hello").unwrap();
        add(&repo, &["a.txt".to_string()]).unwrap();
        fs::remove_file(dir.path().join("a.txt")).unwrap();
        add(&repo, &["a.txt".to_string()]).unwrap();
        let index = repo.load_index().unwrap();
        assert!(index.get("a.txt").is_none());
    }

    #[test]
    fn test_status_reports_staged_and_unstaged_modification_together() {
        use crate::commit_engine;
        use crate::config::Identity;

        let dir = tempdir().unwrap();
        let repo = Repository::init(dir.path()).unwrap();
        let identity = Identity {
            name: "Ada Lovelace".to_string(),
            email: "ada@example.com".to_string(),
        };

        fs::write(dir.path().join("a.txt"), "hello\n").unwrap();
        add(&repo, &["a.txt".to_string()]).unwrap();
        commit_engine::commit(&repo, &identity, "init\n").unwrap();

        fs::write(dir.path().join("b.txt"), "new\n").unwrap();
        fs::write(dir.path().join("a.txt"), "first edit\n").unwrap();
        add(&repo, &["a.txt".to_string()]).unwrap();
        fs::write(dir.path().join("a.txt"), "second edit\n").unwrap();

        let status = status(&repo).unwrap();
        assert_eq!(status.staged_modified, vec!["a.txt"]);
        assert_eq!(status.unstaged_modified, vec!["a.txt"]);
        assert_eq!(status.untracked, vec!["b.txt"]);
    }

    #[test]
    fn test_checkout_new_branch_without_changes_succeeds() {
        let dir = tempdir().unwrap();
        let repo = Repository::init(dir.path()).unwrap();
        checkout(&repo, "feature", true).unwrap();
        assert_eq!(
            repo.refs().current_branch().unwrap(),
            Some("feature".to_string())
        );
    }

    #[test]
    fn test_checkout_refuses_dirty_working_tree() {
        let dir = tempdir().unwrap();
        let repo = Repository::init(dir.path()).unwrap();
        fs::write(dir.path().join("a.txt"), "hello").unwrap();
        add(&repo, &["a.txt".to_string()]).unwrap();
        let err = checkout(&repo, "feature", true).unwrap_err();
        assert!(matches!(err, Error::DirtyWorkingTree(_)));
    }
}
