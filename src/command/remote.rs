use crate::errors::Result;
use crate::remote::RemoteUrl;

pub fn add(name: &str, url: &str) -> Result<()> {
    RemoteUrl::parse(url)?;
    let repo = super::current_repo()?;
    let _lock = repo.lock()?;
    let mut remotes = repo.load_remotes()?;
    remotes.add(name, url);
    repo.save_remotes(&remotes)
}

pub fn list() -> Result<()> {
    let repo = super::current_repo()?;
    let remotes = repo.load_remotes()?;
    for (name, url) in remotes.list() {
        println!("{name}\t{url}");
    }
    Ok(())
}
