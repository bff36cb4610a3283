use std::path::Path;

use crate::errors::Result;
use crate::protocol::client;
use crate::remote::RemoteUrl;

pub fn execute(url: &str, dir: &Path) -> Result<()> {
    tracing::debug!("clone {url} -> {}", dir.display());
    let remote = RemoteUrl::parse(url)?;
    let repo = client::clone(&remote, dir)?;
    let mut remotes = repo.load_remotes()?;
    remotes.add("origin", url);
    repo.save_remotes(&remotes)?;
    println!("Cloned into {}", dir.display());
    Ok(())
}
