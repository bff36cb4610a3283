//! Object-exchange wire protocol: `HAVE`/`PUSH`/`PULL`/`CLONE` over a plain
//! synchronous TCP connection, one connection handled at a time (§5: no
//! concurrency requirement, so no async runtime). Default port matches
//! [`crate::remote::DEFAULT_PORT`].

pub mod client;
pub mod server;
pub mod wire;

use std::collections::HashSet;
use std::time::Duration;

use crate::errors::Result;
use crate::hash::ObjectId;
use crate::store::ObjectStore;

/// Default per-request wall-clock timeout (§5).
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// The transitive closure of objects reachable from `root` (a commit id):
/// the commit itself, its tree (recursively), and every blob it references,
/// walked back through first-parent history to the repository's root commit.
pub fn closure(store: &ObjectStore, root: ObjectId) -> Result<HashSet<ObjectId>> {
    let mut seen = HashSet::new();
    let mut cursor = Some(root);
    while let Some(commit_id) = cursor {
        if !seen.insert(commit_id) {
            break;
        }
        let object = store.get(commit_id)?;
        let commit = object
            .as_commit()
            .cloned()
            .ok_or_else(|| crate::errors::Error::Corrupt(commit_id.to_string()))?;
        walk_tree(store, commit.tree, &mut seen)?;
        cursor = commit.parent;
    }
    Ok(seen)
}

/// Like [`closure`] but stops at (and excludes) `boundary`, the set of
/// objects `push` can assume the peer already has because it is an ancestor
/// of `root`.
pub fn closure_excluding(
    store: &ObjectStore,
    root: ObjectId,
    boundary: Option<ObjectId>,
) -> Result<HashSet<ObjectId>> {
    let mut seen = HashSet::new();
    let mut cursor = Some(root);
    while let Some(commit_id) = cursor {
        if Some(commit_id) == boundary || !seen.insert(commit_id) {
            break;
        }
        let object = store.get(commit_id)?;
        let commit = object
            .as_commit()
            .cloned()
            .ok_or_else(|| crate::errors::Error::Corrupt(commit_id.to_string()))?;
        walk_tree(store, commit.tree, &mut seen)?;
        cursor = commit.parent;
    }
    Ok(seen)
}

fn walk_tree(store: &ObjectStore, tree_id: ObjectId, seen: &mut HashSet<ObjectId>) -> Result<()> {
    if !seen.insert(tree_id) {
        return Ok(());
    }
    let object = store.get(tree_id)?;
    let tree = object
        .as_tree()
        .ok_or_else(|| crate::errors::Error::Corrupt(tree_id.to_string()))?;
    for entry in &tree.entries {
        if entry.mode.is_directory() {
            walk_tree(store, entry.id, seen)?;
        } else {
            seen.insert(entry.id);
        }
    }
    Ok(())
}

/// Is `ancestor` reachable by walking `tip`'s first-parent chain (inclusive)?
pub fn is_ancestor(store: &ObjectStore, tip: ObjectId, ancestor: ObjectId) -> Result<bool> {
    let mut cursor = Some(tip);
    while let Some(id) = cursor {
        if id == ancestor {
            return Ok(true);
        }
        let object = store.get(id)?;
        let commit = object
            .as_commit()
            .ok_or_else(|| crate::errors::Error::Corrupt(id.to_string()))?;
        cursor = commit.parent;
    }
    Ok(false)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::object::{Blob, Commit, Object, Signature, Tree, TreeEntry, TreeMode};
    use tempfile::tempdir;

    fn store() -> (tempfile::TempDir, ObjectStore) {
        let dir = tempdir().unwrap();
        let store = ObjectStore::new(dir.path());
        store.init().unwrap();
        (dir, store)
    }

    fn commit_with_tree(store: &ObjectStore, parent: Option<ObjectId>, content: &[u8]) -> ObjectId {
        let blob_id = store.put(&Object::Blob(Blob::new(content.to_vec()))).unwrap();
        let tree = Tree::new(vec![TreeEntry::new(TreeMode::Regular, "a.txt", blob_id)]).unwrap();
        let tree_id = store.put(&Object::Tree(tree)).unwrap();
        let sig = Signature::new("A", "a@b.com", 1, 0);
        let commit = Commit::new(tree_id, parent, sig.clone(), sig, "msg\n");
        store.put(&Object::Commit(commit)).unwrap()
    }

    #[test]
    fn test_closure_includes_commit_tree_and_blob() {
        let (_dir, store) = store();
        let commit_id = commit_with_tree(&store, None, b"hello");
        let ids = closure(&store, commit_id).unwrap();
        assert!(ids.contains(&commit_id));
        assert_eq!(ids.len(), 3);
    }

    #[test]
    fn test_closure_excluding_stops_at_boundary() {
        let (_dir, store) = store();
        let first = commit_with_tree(&store, None, b"one");
        let second = commit_with_tree(&store, Some(first), b"two");
        let missing = closure_excluding(&store, second, Some(first)).unwrap();
        assert!(!missing.contains(&first));
    }

    #[test]
    fn test_is_ancestor_true_for_self_and_parent() {
        let (_dir, store) = store();
        let first = commit_with_tree(&store, None, b"one");
        let second = commit_with_tree(&store, Some(first), b"two");
        assert!(is_ancestor(&store, second, first).unwrap());
        assert!(is_ancestor(&store, second, second).unwrap());
        assert!(!is_ancestor(&store, first, second).unwrap());
    }
}
