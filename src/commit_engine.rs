//! Turns the staging index into a commit: build trees bottom-up from the
//! index, attach the current branch tip as parent, advance the branch, and
//! refresh the tracking ledger so `status` sees a clean tree afterward.

use std::collections::BTreeMap;

use crate::config::Identity;
use crate::errors::{Error, Result};
use crate::hash::ObjectId;
use crate::index::{Index, IndexEntry};
use crate::object::{Commit, Object, Signature, Tree, TreeEntry, TreeMode};
use crate::repository::Repository;
use crate::store::ObjectStore;
use crate::tracking::TrackingLedger;

enum Node {
    File(IndexEntry),
    Dir(BTreeMap<String, Node>),
}

fn insert(root: &mut BTreeMap<String, Node>, path: &str, entry: IndexEntry) {
    let mut parts = path.split('/').peekable();
    let mut cursor = root;
    while let Some(part) = parts.next() {
        if parts.peek().is_none() {
            cursor.insert(part.to_string(), Node::File(entry));
            return;
        }
        let next = cursor
            .entry(part.to_string())
            .or_insert_with(|| Node::Dir(BTreeMap::new()));
        match next {
            Node::Dir(map) => cursor = map,
            Node::File(_) => unreachable!("path component collides with a staged file"),
        }
    }
}

fn write_tree(store: &ObjectStore, dir: &BTreeMap<String, Node>) -> Result<ObjectId> {
    let mut entries = Vec::with_capacity(dir.len());
    for (name, node) in dir {
        let (mode, id) = match node {
            Node::File(entry) => (entry.mode, entry.object_id),
            Node::Dir(sub) => (TreeMode::Directory, write_tree(store, sub)?),
        };
        entries.push(TreeEntry::new(mode, name.clone(), id));
    }
    let tree = Tree::new(entries)?;
    store.put(&Object::Tree(tree))
}

/// Build the tree object graph for the current staging index.
fn build_tree(store: &ObjectStore, index: &Index) -> Result<ObjectId> {
    let mut root: BTreeMap<String, Node> = BTreeMap::new();
    for (path, entry) in index.entries() {
        insert(&mut root, path, entry.clone());
    }
    write_tree(store, &root)
}

/// Create a commit from the current index, advance `HEAD`'s branch (or
/// `HEAD` itself if detached), and refresh the tracking ledger to match.
pub fn commit(repo: &Repository, identity: &Identity, message: &str) -> Result<ObjectId> {
    let index = repo.load_index()?;
    if index.is_empty() {
        return Err(Error::EmptyCommit);
    }

    let tree_id = build_tree(repo.store(), &index)?;
    let parent = repo.refs().head_target()?;

    let signature = Signature::now(identity.name.clone(), identity.email.clone());
    let commit = Commit::new(tree_id, parent, signature.clone(), signature, message);
    let commit_id = repo.store().put(&Object::Commit(commit))?;

    match repo.refs().current_branch()? {
        Some(branch) => repo.refs().write_branch(&branch, commit_id)?,
        None => repo.refs().set_head_detached(commit_id)?,
    }

    let ledger = TrackingLedger::from_tree(repo.store(), tree_id)?;
    repo.save_tracking(&ledger)?;

    Ok(commit_id)
}

/// Walk first-parent history starting at `head`, most recent first.
pub fn log(repo: &Repository, head: ObjectId, limit: Option<usize>) -> Result<Vec<(ObjectId, Commit)>> {
    let mut out = Vec::new();
    let mut cursor = Some(head);
    while let Some(id) = cursor {
        if let Some(limit) = limit {
            if out.len() >= limit {
                break;
            }
        }
        let object = repo.store().get(id)?;
        let commit = object
            .as_commit()
            .cloned()
            .ok_or_else(|| Error::Corrupt(id.to_string()))?;
        cursor = commit.parent;
        out.push((id, commit));
    }
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::worktree;
    use tempfile::tempdir;

    fn identity() -> Identity {
        Identity {
            name: "Ada Lovelace".to_string(),
            email: "ada@example.com".to_string(),
        }
    }

    #[test]
    fn test_commit_with_empty_index_errors() {
        let dir = tempdir().unwrap();
        let repo = Repository::init(dir.path()).unwrap();
        assert!(matches!(
            commit(&repo, &identity(), "first"),
            Err(Error::EmptyCommit)
        ));
    }

    #[test]
    fn test_first_commit_has_no_parent() {
        let dir = tempdir().unwrap();
        let repo = Repository::init(dir.path()).unwrap();
        std::fs::write(dir.path().join("a.txt"), "hello").unwrap();
        worktree::add(&repo, &["a.txt".to_string()]).unwrap();

        let commit_id = commit(&repo, &identity(), "first\n").unwrap();
        let object = repo.store().get(commit_id).unwrap();
        assert_eq!(object.as_commit().unwrap().parent, None);
    }

    #[test]
    fn test_second_commit_chains_to_first() {
        let dir = tempdir().unwrap();
        let repo = Repository::init(dir.path()).unwrap();
        std::fs::write(dir.path().join("a.txt"), "hello").unwrap();
        worktree::add(&repo, &["a.txt".to_string()]).unwrap();
        let first = commit(&repo, &identity(), "first\n").unwrap();

        std::fs::write(dir.path().join("a.txt"), "world").unwrap();
        worktree::add(&repo, &["a.txt".to_string()]).unwrap();
        let second = commit(&repo, &identity(), "second\n").unwrap();

        let object = repo.store().get(second).unwrap();
        assert_eq!(object.as_commit().unwrap().parent, Some(first));
    }

    #[test]
    fn test_nested_paths_build_subtrees() {
        let dir = tempdir().unwrap();
        let repo = Repository::init(dir.path()).unwrap();
        std::fs::create_dir_all(dir.path().join("sub")).unwrap();
        std::fs::write(dir.path().join("sub/b.txt"), "nested").unwrap();
        worktree::add(&repo, &["sub/b.txt".to_string()]).unwrap();

        let commit_id = commit(&repo, &identity(), "nested\n").unwrap();
        let object = repo.store().get(commit_id).unwrap();
        let tree_id = object.as_commit().unwrap().tree;
        let ledger = TrackingLedger::from_tree(repo.store(), tree_id).unwrap();
        assert!(ledger.get("sub/b.txt").is_some());
    }

    #[test]
    fn test_log_walks_first_parent_chain() {
        let dir = tempdir().unwrap();
        let repo = Repository::init(dir.path()).unwrap();
        std::fs::write(dir.path().join("a.txt"), "1").unwrap();
        worktree::add(&repo, &["a.txt".to_string()]).unwrap();
        let first = commit(&repo, &identity(), "first\n").unwrap();
        std::fs::write(dir.path().join("a.txt"), "2").unwrap();
        worktree::add(&repo, &["a.txt".to_string()]).unwrap();
        let second = commit(&repo, &identity(), "second\n").unwrap();

        let history = log(&repo, second, None).unwrap();
        let ids: Vec<ObjectId> = history.iter().map(|(id, _)| *id).collect();
        assert_eq!(ids, vec![second, first]);
    }
}
