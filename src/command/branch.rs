use crate::errors::{Error, Result};

pub fn execute(name: Option<String>) -> Result<()> {
    match name {
        Some(name) => create(&name),
        None => list(),
    }
}

fn create(name: &str) -> Result<()> {
    let repo = super::current_repo()?;
    let _lock = repo.lock()?;
    if repo.refs().branch_exists(name) {
        tracing::warn!("branch already exists: {name}");
        return Err(Error::RemoteError(format!("branch already exists: {name}")));
    }
    match repo.refs().head_target()? {
        Some(id) => repo.refs().write_branch(name, id)?,
        None => repo.refs().create_unborn_branch(name)?,
    }
    println!("Created branch {name}");
    Ok(())
}

fn list() -> Result<()> {
    let repo = super::current_repo()?;
    let current = repo.refs().current_branch()?;
    for branch in repo.refs().list_branches()? {
        let marker = if current.as_deref() == Some(branch.as_str()) { "*" } else { " " };
        println!("{marker} {branch}");
    }
    Ok(())
}
