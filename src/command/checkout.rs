use crate::errors::Result;
use crate::worktree;

pub fn execute(name: &str, create: bool) -> Result<()> {
    tracing::debug!("checkout {name} (create={create})");
    let repo = super::current_repo()?;
    let _lock = repo.lock()?;
    worktree::checkout(&repo, name, create)?;
    println!("Switched to branch '{name}'");
    Ok(())
}
