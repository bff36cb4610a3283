use crate::errors::Result;
use crate::protocol::client;

pub fn execute(remote: &str, branch: &str) -> Result<()> {
    tracing::debug!("pull {branch} <- {remote}");
    let repo = super::current_repo()?;
    let _lock = repo.lock()?;
    let remotes = repo.load_remotes()?;
    let url = remotes.get(remote)?;
    client::pull(&repo, &url, branch)?;
    println!("Pulled {branch} from {remote}");
    Ok(())
}
