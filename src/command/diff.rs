use std::fs;

use crate::diff::{FileDiff, diff_file};
use crate::errors::Result;
use crate::hash::ObjectId;
use crate::object::{Blob, ObjectKind};
use crate::repository::Repository;

fn blob_bytes(repo: &Repository, id: ObjectId) -> Result<Vec<u8>> {
    Ok(repo.store().get(id)?.as_blob().cloned().map(|b| b.data).unwrap_or_default())
}

/// Diffs for every modified or new path: staged files are compared against
/// the index blob, unstaged ones against the working-tree content
/// (spec.md §4.6).
pub fn collect(repo: &Repository) -> Result<Vec<FileDiff>> {
    let index = repo.load_index()?;
    let tracking = repo.load_tracking()?;
    let status = crate::worktree::status(repo)?;
    let mut diffs = Vec::new();

    for path in status.staged_new.iter().chain(&status.staged_modified) {
        let old_id = tracking.get(path);
        let old_bytes = match old_id {
            Some(id) => blob_bytes(repo, id)?,
            None => Vec::new(),
        };
        let new_id = index.get(path).map(|e| e.object_id);
        let new_bytes = match new_id {
            Some(id) => blob_bytes(repo, id)?,
            None => Vec::new(),
        };
        diffs.push(diff_file(path, old_id, new_id, &old_bytes, &new_bytes));
    }

    for path in &status.unstaged_modified {
        let old_id = index
            .get(path)
            .map(|e| e.object_id)
            .or_else(|| tracking.get(path));
        let old_bytes = match old_id {
            Some(id) => blob_bytes(repo, id)?,
            None => Vec::new(),
        };

        let full = repo.root().join(path);
        let new_bytes = fs::read(&full)?;
        let new_id = Some(ObjectId::frame(ObjectKind::Blob, &Blob::new(new_bytes.clone()).to_payload()));

        diffs.push(diff_file(path, old_id, new_id, &old_bytes, &new_bytes));
    }
    Ok(diffs)
}

pub fn execute() -> Result<()> {
    let repo = super::current_repo()?;
    for diff in collect(&repo)? {
        print!("{}", diff.text);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Identity;
    use crate::{commit_engine, worktree};
    use tempfile::tempdir;

    fn identity() -> Identity {
        Identity {
            name: "Ada Lovelace".to_string(),
            email: "ada@example.com".to_string(),
        }
    }

    #[test]
    fn test_staged_new_file_diffs_against_empty_baseline() {
        let dir = tempdir().unwrap();
        let repo = Repository::init(dir.path()).unwrap();
        fs::write(dir.path().join("a.txt"), "hello\n").unwrap();
        worktree::add(&repo, &["a.txt".to_string()]).unwrap();

        let diffs = collect(&repo).unwrap();
        assert_eq!(diffs.len(), 1);
        assert_eq!(diffs[0].path, "a.txt");
        assert!(diffs[0].text.contains("+hello"));
    }

    #[test]
    fn test_staged_modified_file_diffs_against_index_blob() {
        let dir = tempdir().unwrap();
        let repo = Repository::init(dir.path()).unwrap();
        fs::write(dir.path().join("a.txt"), "one\n").unwrap();
        worktree::add(&repo, &["a.txt".to_string()]).unwrap();
        commit_engine::commit(&repo, &identity(), "init\n").unwrap();

        fs::write(dir.path().join("a.txt"), "two\n").unwrap();
        worktree::add(&repo, &["a.txt".to_string()]).unwrap();

        let diffs = collect(&repo).unwrap();
        assert_eq!(diffs.len(), 1);
        assert!(diffs[0].text.contains("-one"));
        assert!(diffs[0].text.contains("+two"));
    }

    #[test]
    fn test_unstaged_modification_diffs_against_ledger() {
        let dir = tempdir().unwrap();
        let repo = Repository::init(dir.path()).unwrap();
        fs::write(dir.path().join("a.txt"), "one\n").unwrap();
        worktree::add(&repo, &["a.txt".to_string()]).unwrap();
        commit_engine::commit(&repo, &identity(), "init\n").unwrap();

        fs::write(dir.path().join("a.txt"), "two\n").unwrap();

        let diffs = collect(&repo).unwrap();
        assert_eq!(diffs.len(), 1);
        assert!(diffs[0].text.contains("-one"));
        assert!(diffs[0].text.contains("+two"));
    }
}
