//! One module per CLI subcommand; each exposes a plain `execute(...)` that
//! `main.rs` calls after `clap` has parsed arguments.

pub mod add;
pub mod branch;
pub mod checkout;
pub mod clone;
pub mod commit;
pub mod diff;
pub mod init;
pub mod log;
pub mod pull;
pub mod push;
pub mod remote;
pub mod status;

use std::path::PathBuf;

use crate::errors::{Error, Result};
use crate::repository::Repository;

/// Discover the repository containing the current directory. Shared by
/// every subcommand except `init` and `clone`, which create one instead.
fn current_repo() -> Result<Repository> {
    let cwd = std::env::current_dir().map_err(Error::Io)?;
    Repository::discover(&cwd)
}

fn current_dir() -> Result<PathBuf> {
    std::env::current_dir().map_err(Error::Io)
}
