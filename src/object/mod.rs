//! The object model: blobs, trees, and commits, framed and hashed uniformly.
//!
//! Every object is serialized to a payload specific to its kind, then framed
//! as `<type> <len>\0<payload>` before hashing (see [`crate::hash::frame_bytes`]).
//! Rather than dispatch over a shared trait object, the three kinds are held
//! in one tagged enum so the store can serialize/hash/parse them through a
//! single pair of functions keyed on the tag.

pub mod blob;
pub mod commit;
pub mod signature;
pub mod tree;

use crate::errors::{Error, Result};
use crate::hash::{ObjectId, frame_bytes};

pub use blob::Blob;
pub use commit::Commit;
pub use signature::Signature;
pub use tree::{Tree, TreeEntry, TreeMode};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ObjectKind {
    Blob,
    Tree,
    Commit,
}

impl ObjectKind {
    pub const fn as_str(&self) -> &'static str {
        match self {
            ObjectKind::Blob => "blob",
            ObjectKind::Tree => "tree",
            ObjectKind::Commit => "commit",
        }
    }
}

impl std::fmt::Display for ObjectKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for ObjectKind {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "blob" => Ok(ObjectKind::Blob),
            "tree" => Ok(ObjectKind::Tree),
            "commit" => Ok(ObjectKind::Commit),
            other => Err(Error::InvalidObject(format!("unknown object kind: {other}"))),
        }
    }
}

/// A single in-memory object, tagged by kind. The store only ever deals with
/// `Object` values; the kind-specific modules know their own payload shape.
#[derive(Clone, Debug)]
pub enum Object {
    Blob(Blob),
    Tree(Tree),
    Commit(Commit),
}

impl Object {
    pub fn kind(&self) -> ObjectKind {
        match self {
            Object::Blob(_) => ObjectKind::Blob,
            Object::Tree(_) => ObjectKind::Tree,
            Object::Commit(_) => ObjectKind::Commit,
        }
    }

    /// Serialize the kind-specific payload (no framing).
    pub fn payload(&self) -> Vec<u8> {
        match self {
            Object::Blob(b) => b.to_payload(),
            Object::Tree(t) => t.to_payload(),
            Object::Commit(c) => c.to_payload(),
        }
    }

    /// Compute the id this object would have once framed and hashed.
    pub fn id(&self) -> ObjectId {
        ObjectId::frame(self.kind(), &self.payload())
    }

    /// Full framed bytes as stored on disk: `<type> <len>\0<payload>`.
    pub fn to_framed(&self) -> Vec<u8> {
        frame_bytes(self.kind(), &self.payload())
    }

    /// Parse a framed byte buffer (as read back from the store) into an `Object`.
    pub fn from_framed(data: &[u8]) -> Result<Object> {
        let space = data
            .iter()
            .position(|&b| b == b' ')
            .ok_or_else(|| Error::InvalidObject("missing type/length separator".into()))?;
        let nul = data
            .iter()
            .position(|&b| b == 0)
            .ok_or_else(|| Error::InvalidObject("missing NUL after length".into()))?;
        let kind: ObjectKind = std::str::from_utf8(&data[..space])
            .map_err(|_| Error::InvalidObject("non-utf8 type tag".into()))?
            .parse()?;
        let len_str = std::str::from_utf8(&data[space + 1..nul])
            .map_err(|_| Error::InvalidObject("non-utf8 length field".into()))?;
        let len: usize = len_str
            .parse()
            .map_err(|_| Error::InvalidObject(format!("bad length field: {len_str}")))?;
        let payload = &data[nul + 1..];
        if payload.len() != len {
            return Err(Error::InvalidObject(format!(
                "length mismatch: framed {len}, actual {}",
                payload.len()
            )));
        }
        Self::from_payload(kind, payload)
    }

    pub fn from_payload(kind: ObjectKind, payload: &[u8]) -> Result<Object> {
        match kind {
            ObjectKind::Blob => Ok(Object::Blob(Blob::from_payload(payload))),
            ObjectKind::Tree => Ok(Object::Tree(Tree::from_payload(payload)?)),
            ObjectKind::Commit => Ok(Object::Commit(Commit::from_payload(payload)?)),
        }
    }

    pub fn as_blob(&self) -> Option<&Blob> {
        match self {
            Object::Blob(b) => Some(b),
            _ => None,
        }
    }

    pub fn as_tree(&self) -> Option<&Tree> {
        match self {
            Object::Tree(t) => Some(t),
            _ => None,
        }
    }

    pub fn as_commit(&self) -> Option<&Commit> {
        match self {
            Object::Commit(c) => Some(c),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_blob_round_trip_through_framing() {
        let blob = Blob::new(b"hello\n".to_vec());
        let obj = Object::Blob(blob.clone());
        let framed = obj.to_framed();
        let parsed = Object::from_framed(&framed).unwrap();
        assert_eq!(parsed.as_blob().unwrap().data, blob.data);
        assert_eq!(parsed.id(), obj.id());
    }

    #[test]
    fn test_from_framed_rejects_truncated_length() {
        let mut framed = Object::Blob(Blob::new(b"abc".to_vec())).to_framed();
        framed.pop();
        assert!(Object::from_framed(&framed).is_err());
    }

    #[test]
    fn test_from_framed_rejects_unknown_kind() {
        let bogus = b"widget 3\0abc".to_vec();
        assert!(Object::from_framed(&bogus).is_err());
    }
}
