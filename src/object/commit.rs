//! Commit objects: a tree snapshot, an optional parent, two signatures, and a message.
//!
//! Payload is line-oriented UTF-8:
//! ```text
//! tree <hex>\n
//! parent <hex>\n      (omitted for the first commit on a branch)
//! author <signature>\n
//! committer <signature>\n
//! \n
//! <message, verbatim>
//! ```

use bstr::ByteSlice;

use crate::errors::{Error, Result};
use crate::hash::ObjectId;
use crate::object::Signature;

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Commit {
    pub tree: ObjectId,
    pub parent: Option<ObjectId>,
    pub author: Signature,
    pub committer: Signature,
    pub message: String,
}

impl Commit {
    pub fn new(
        tree: ObjectId,
        parent: Option<ObjectId>,
        author: Signature,
        committer: Signature,
        message: impl Into<String>,
    ) -> Self {
        Commit {
            tree,
            parent,
            author,
            committer,
            message: message.into(),
        }
    }

    pub fn to_payload(&self) -> Vec<u8> {
        let mut out = Vec::new();
        out.extend_from_slice(b"tree ");
        out.extend_from_slice(self.tree.to_string().as_bytes());
        out.push(b'\n');
        if let Some(parent) = self.parent {
            out.extend_from_slice(b"parent ");
            out.extend_from_slice(parent.to_string().as_bytes());
            out.push(b'\n');
        }
        out.extend_from_slice(b"author ");
        out.extend_from_slice(&self.author.to_data().unwrap_or_default());
        out.push(b'\n');
        out.extend_from_slice(b"committer ");
        out.extend_from_slice(&self.committer.to_data().unwrap_or_default());
        out.push(b'\n');
        out.push(b'\n');
        out.extend_from_slice(self.message.as_bytes());
        out
    }

    pub fn from_payload(data: &[u8]) -> Result<Commit> {
        let mut rest = data;

        let tree_line_end = rest
            .find_byte(b'\n')
            .ok_or_else(|| Error::InvalidObject("commit missing tree line".into()))?;
        let tree_line = &rest[..tree_line_end];
        let tree_hex = tree_line
            .strip_prefix(b"tree ")
            .ok_or_else(|| Error::InvalidObject("commit missing 'tree ' prefix".into()))?;
        let tree: ObjectId = std::str::from_utf8(tree_hex)
            .map_err(|_| Error::InvalidObject("commit tree id is not utf-8".into()))?
            .parse()
            .map_err(Error::InvalidObject)?;
        rest = &rest[tree_line_end + 1..];

        let mut parent = None;
        if rest.starts_with(b"parent ") {
            let line_end = rest
                .find_byte(b'\n')
                .ok_or_else(|| Error::InvalidObject("commit parent line unterminated".into()))?;
            let hex = &rest[b"parent ".len()..line_end];
            parent = Some(
                std::str::from_utf8(hex)
                    .map_err(|_| Error::InvalidObject("commit parent id is not utf-8".into()))?
                    .parse()
                    .map_err(Error::InvalidObject)?,
            );
            rest = &rest[line_end + 1..];
        }

        let author_line_end = rest
            .find_byte(b'\n')
            .ok_or_else(|| Error::InvalidObject("commit missing author line".into()))?;
        let author_line = rest[..author_line_end]
            .strip_prefix(b"author ")
            .ok_or_else(|| Error::InvalidObject("commit missing 'author ' prefix".into()))?;
        let author = Signature::from_data(author_line.to_vec())?;
        rest = &rest[author_line_end + 1..];

        let committer_line_end = rest
            .find_byte(b'\n')
            .ok_or_else(|| Error::InvalidObject("commit missing committer line".into()))?;
        let committer_line = rest[..committer_line_end]
            .strip_prefix(b"committer ")
            .ok_or_else(|| Error::InvalidObject("commit missing 'committer ' prefix".into()))?;
        let committer = Signature::from_data(committer_line.to_vec())?;
        rest = &rest[committer_line_end + 1..];

        let blank = rest
            .find_byte(b'\n')
            .ok_or_else(|| Error::InvalidObject("commit missing blank line before message".into()))?;
        if blank != 0 {
            return Err(Error::InvalidObject(
                "commit header not terminated by blank line".into(),
            ));
        }
        let message = String::from_utf8(rest[1..].to_vec())
            .map_err(|_| Error::InvalidObject("commit message is not valid utf-8".into()))?;

        Ok(Commit {
            tree,
            parent,
            author,
            committer,
            message,
        })
    }
}

impl std::fmt::Display for Commit {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "tree {}", self.tree)?;
        if let Some(parent) = self.parent {
            writeln!(f, "parent {parent}")?;
        }
        writeln!(f, "author {}", self.author)?;
        writeln!(f, "committer {}", self.committer)?;
        write!(f, "{}", self.message)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::object::ObjectKind;

    fn sig() -> Signature {
        Signature::new("Ada Lovelace", "ada@example.com", 1_700_000_000, 0)
    }

    #[test]
    fn test_round_trip_without_parent() {
        let tree = ObjectId::frame(ObjectKind::Tree, b"dummy");
        let commit = Commit::new(tree, None, sig(), sig(), "initial commit\n");
        let payload = commit.to_payload();
        let parsed = Commit::from_payload(&payload).unwrap();
        assert_eq!(parsed, commit);
    }

    #[test]
    fn test_round_trip_with_parent() {
        let tree = ObjectId::frame(ObjectKind::Tree, b"dummy-2");
        let parent = ObjectId::frame(ObjectKind::Commit, b"parent-commit");
        let commit = Commit::new(tree, Some(parent), sig(), sig(), "second commit\n");
        let payload = commit.to_payload();
        let parsed = Commit::from_payload(&payload).unwrap();
        assert_eq!(parsed.parent, Some(parent));
    }

    #[test]
    fn test_message_preserved_verbatim_including_blank_lines() {
        let tree = ObjectId::frame(ObjectKind::Tree, b"dummy-3");
        let message = "subject\n\nbody line one\nbody line two\n";
        let commit = Commit::new(tree, None, sig(), sig(), message);
        let parsed = Commit::from_payload(&commit.to_payload()).unwrap();
        assert_eq!(parsed.message, message);
    }

    #[test]
    fn test_rejects_missing_tree_prefix() {
        assert!(Commit::from_payload(b"bogus\n").is_err());
    }
}
