//! The object identifier: a fixed-width SHA-1 digest of an object's framed bytes.
//!
//! Unlike a library that lets a caller pick between SHA-1 and SHA-256 per
//! repository, this core hashes everything with SHA-1 and fixes the digest
//! to 40 hex characters / 160 bits.

use std::{fmt::Display, io, str::FromStr};

use colored::Colorize;
use serde::{Deserialize, Serialize};
use sha1::Digest;

use crate::object::ObjectKind;

pub const HASH_SIZE: usize = 20;
pub const HASH_HEX_LEN: usize = 40;

#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Deserialize, Serialize)]
/// Content-addressed object identifier: SHA-1 of the object's framed bytes.
pub struct ObjectId([u8; HASH_SIZE]);

impl std::fmt::Debug for ObjectId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "ObjectId({self})")
    }
}

impl Default for ObjectId {
    fn default() -> Self {
        ObjectId([0u8; HASH_SIZE])
    }
}

impl Display for ObjectId {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        write!(f, "{}", hex::encode(self.0))
    }
}

impl AsRef<[u8]> for ObjectId {
    fn as_ref(&self) -> &[u8] {
        &self.0
    }
}

impl FromStr for ObjectId {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.len() != HASH_HEX_LEN {
            return Err(format!(
                "invalid object id length: got {}, expected {HASH_HEX_LEN}",
                s.len()
            ));
        }
        let bytes = hex::decode(s).map_err(|e| e.to_string())?;
        let mut h = [0u8; HASH_SIZE];
        h.copy_from_slice(&bytes);
        Ok(ObjectId(h))
    }
}

impl ObjectId {
    pub fn zero() -> ObjectId {
        ObjectId::default()
    }

    pub fn is_zero(&self) -> bool {
        self.0 == [0u8; HASH_SIZE]
    }

    /// Hash raw bytes directly. Used internally by [`ObjectId::frame`]; callers
    /// that need an object id should go through that instead.
    fn of(data: &[u8]) -> ObjectId {
        let digest = sha1::Sha1::digest(data);
        let mut bytes = [0u8; HASH_SIZE];
        bytes.copy_from_slice(digest.as_ref());
        ObjectId(bytes)
    }

    /// Hash the framed form `<type> <len>\0<payload>` of an object. The digest
    /// covers the whole frame, not the bare payload.
    pub fn frame(kind: ObjectKind, payload: &[u8]) -> ObjectId {
        Self::of(&frame_bytes(kind, payload))
    }

    pub fn from_bytes(bytes: &[u8]) -> Result<ObjectId, String> {
        if bytes.len() != HASH_SIZE {
            return Err(format!(
                "invalid object id byte length: got {}, expected {HASH_SIZE}",
                bytes.len()
            ));
        }
        let mut h = [0u8; HASH_SIZE];
        h.copy_from_slice(bytes);
        Ok(ObjectId(h))
    }

    pub fn from_stream(data: &mut impl io::Read) -> io::Result<ObjectId> {
        let mut h = [0u8; HASH_SIZE];
        data.read_exact(&mut h)?;
        Ok(ObjectId(h))
    }

    pub fn to_data(self) -> Vec<u8> {
        self.0.to_vec()
    }

    /// Two-char/rest split used for the loose object path: `objects/<xx>/<xxxxxxxx...>`.
    pub fn split_path(&self) -> (String, String) {
        let hex = self.to_string();
        (hex[..2].to_string(), hex[2..].to_string())
    }

    pub fn to_color_str(self) -> String {
        self.to_string().yellow().to_string()
    }
}

/// Build the framed byte form `<type> <len>\0<payload>`.
pub fn frame_bytes(kind: ObjectKind, payload: &[u8]) -> Vec<u8> {
    let mut out = Vec::with_capacity(payload.len() + 16);
    out.extend_from_slice(kind.as_str().as_bytes());
    out.push(b' ');
    out.extend_from_slice(payload.len().to_string().as_bytes());
    out.push(0);
    out.extend_from_slice(payload);
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Hashing the framed form of a blob containing "Hello, world!" should
    /// match a known SHA-1 git blob id.
    #[test]
    fn test_blob_frame_matches_known_hash() {
        let id = ObjectId::frame(ObjectKind::Blob, b"Hello, world!");
        assert_eq!(id.to_string(), "b45ef6fec89518d314f546fd6c3025367b721684");
    }

    #[test]
    fn test_frame_is_deterministic() {
        let a = ObjectId::frame(ObjectKind::Blob, b"hello\n");
        let b = ObjectId::frame(ObjectKind::Blob, b"hello\n");
        assert_eq!(a, b);
    }

    #[test]
    fn test_different_kind_different_id() {
        let a = ObjectId::frame(ObjectKind::Blob, b"same bytes");
        let b = ObjectId::frame(ObjectKind::Tree, b"same bytes");
        assert_ne!(a, b);
    }

    #[test]
    fn test_from_str_round_trip() {
        let id = ObjectId::frame(ObjectKind::Blob, b"round trip");
        let s = id.to_string();
        assert_eq!(s.len(), HASH_HEX_LEN);
        assert_eq!(ObjectId::from_str(&s).unwrap(), id);
    }

    #[test]
    fn test_rejects_short_hex() {
        assert!(ObjectId::from_str("abcd").is_err());
    }

    #[test]
    fn test_rejects_bad_byte_length() {
        assert!(ObjectId::from_bytes(&[0u8; 5]).is_err());
    }

    #[test]
    fn test_split_path() {
        let id = ObjectId::frame(ObjectKind::Blob, b"hello\n");
        let (dir, rest) = id.split_path();
        assert_eq!(dir.len(), 2);
        assert_eq!(rest.len(), HASH_HEX_LEN - 2);
        assert_eq!(format!("{dir}{rest}"), id.to_string());
    }

    #[test]
    fn test_from_stream_round_trip() {
        let id = ObjectId::frame(ObjectKind::Blob, b"stream me");
        let mut cursor = io::Cursor::new(id.to_data());
        let read_back = ObjectId::from_stream(&mut cursor).unwrap();
        assert_eq!(read_back, id);
    }
}
