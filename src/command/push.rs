use crate::errors::Result;
use crate::protocol::client;

pub fn execute(remote: &str, branch: &str) -> Result<()> {
    tracing::debug!("push {branch} -> {remote}");
    let repo = super::current_repo()?;
    let _lock = repo.lock()?;
    let remotes = repo.load_remotes()?;
    let url = remotes.get(remote)?;
    client::push(&repo, &url, branch)?;
    println!("Pushed {branch} to {remote}");
    Ok(())
}
