use crate::errors::Result;
use crate::worktree;

pub fn execute(path: &str) -> Result<()> {
    tracing::debug!("add: {path}");
    let repo = super::current_repo()?;
    let _lock = repo.lock()?;
    worktree::add(&repo, &[path.to_string()])
}
