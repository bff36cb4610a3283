//! Command-line surface: one `clap` subcommand per operation in §6.7.

use std::path::PathBuf;

use clap::{Parser, Subcommand};

#[derive(Parser, Debug)]
#[command(name = "pygit", about = "A small content-addressed version control engine")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Create a new repository in the current directory.
    Init,

    /// Stage a path (or `.` for the whole working tree).
    Add { path: String },

    /// Record a commit from the current staging index.
    Commit {
        #[arg(short = 'm', long = "message")]
        message: String,
    },

    /// Show the working-tree status matrix.
    Status,

    /// Show commit history reachable from `HEAD`, most recent first.
    Log {
        /// Limit to the first N commits.
        limit: Option<usize>,
    },

    /// Create a branch, or list branches if no name is given.
    Branch { name: Option<String> },

    /// Switch `HEAD` to a branch, optionally creating it first.
    Checkout {
        #[arg(short = 'b', long = "create")]
        create: bool,
        name: String,
    },

    /// Manage the remote table.
    Remote {
        #[command(subcommand)]
        action: RemoteAction,
    },

    /// Push a local branch to a remote, fast-forward only.
    Push { remote: String, branch: String },

    /// Fast-forward a local branch from a remote.
    Pull { remote: String, branch: String },

    /// Clone a remote repository into a fresh directory.
    Clone { url: String, dir: PathBuf },

    /// Show a unified diff of unstaged working-tree changes.
    Diff,
}

#[derive(Subcommand, Debug)]
pub enum RemoteAction {
    /// Register a remote under `name`.
    Add { name: String, url: String },
    /// List configured remotes.
    List,
}
