//! Error types for the pygit crate.
//!
//! One unified enumeration is used across the object store, reference store,
//! index, working-tree reconciliation, commit engine, and wire protocol. It
//! integrates with `thiserror` to provide rich `Display` implementations and
//! error source chaining where applicable.
//!
//! Notes:
//! - Each variant carries contextual details via its message payload.
//! - `Corrupt` and protocol-violation variants are fatal for the current
//!   operation but never mutate on-disk state; `Network`/`Timeout` are
//!   transient and left to the caller to retry.

use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Error, Debug)]
/// Unified error enumeration for the pygit library and CLI.
pub enum Error {
    /// The current directory (or any ancestor) has no `.pygit` metadata directory.
    #[error("not a pygit repository (or any parent up to the root)")]
    NotARepo,

    /// Another writer holds the repository lock.
    #[error("repository is locked by another process")]
    RepoLocked,

    /// An object id was looked up but no file exists for it.
    #[error("object {0} not found in the store")]
    ObjectMissing(String),

    /// Stored object bytes rehash to a different id than the one requested.
    #[error("object {0} is corrupt: stored content does not match its id")]
    Corrupt(String),

    /// A branch or `HEAD` reference does not resolve.
    #[error("reference not found: {0}")]
    RefNotFound(String),

    /// A push or pull would not be a fast-forward.
    #[error("update rejected: not a fast-forward")]
    NonFastForward,

    /// The remote ref moved between our read of its tip and our write.
    #[error("ref update race lost: remote tip changed concurrently")]
    RefRaceLost,

    /// The staging index file could not be parsed.
    #[error("index is malformed: {0}")]
    IndexMalformed(String),

    /// A checkout would discard uncommitted changes.
    #[error("working tree has uncommitted changes in: {0}")]
    DirtyWorkingTree(String),

    /// `PYGIT_AUTHOR_NAME` / `PYGIT_AUTHOR_EMAIL` are not both set.
    #[error("author identity is not configured (set PYGIT_AUTHOR_NAME and PYGIT_AUTHOR_EMAIL)")]
    IdentityMissing,

    /// `commit` was invoked with nothing staged.
    #[error("nothing to commit: the index is empty")]
    EmptyCommit,

    /// `HEAD` has no commit yet and no `-b <branch>` was supplied.
    #[error("HEAD does not resolve to a commit; pass -b to create a branch")]
    NoHead,

    /// A malformed `.pygitignore` pattern; never fatal, only ever warned about.
    #[error("ignore pattern syntax error: {0}")]
    IgnoreSyntax(String),

    /// I/O failure from the underlying filesystem or stream.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Failure reading or writing the network peer.
    #[error("network error: {0}")]
    Network(String),

    /// The peer sent bytes that don't match the wire protocol grammar.
    #[error("protocol violation: {0}")]
    ProtocolViolation(String),

    /// A network operation exceeded its wall-clock budget.
    #[error("operation timed out")]
    Timeout,

    /// Malformed object content (bad tree entry, bad commit header, ...).
    #[error("malformed object: {0}")]
    InvalidObject(String),

    /// Remote name is unknown or its URL does not parse.
    #[error("remote error: {0}")]
    RemoteError(String),

    /// CLI argument parsing or usage error.
    #[error("usage error: {0}")]
    Usage(String),
}
