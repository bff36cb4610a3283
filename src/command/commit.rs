use crate::commit_engine;
use crate::config::Identity;
use crate::errors::Result;

pub fn execute(message: &str) -> Result<()> {
    let repo = super::current_repo()?;
    let _lock = repo.lock()?;
    let identity = Identity::from_env()?;
    let id = commit_engine::commit(&repo, &identity, message)?;
    tracing::debug!("commit {id} by {} <{}>", identity.name, identity.email);
    let subject = message.lines().next().unwrap_or("");
    println!("[{}] {subject}", &id.to_string()[..12]);
    Ok(())
}
