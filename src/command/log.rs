use colored::Colorize;

use crate::commit_engine;
use crate::errors::{Error, Result};

pub fn execute(limit: Option<usize>) -> Result<()> {
    let repo = super::current_repo()?;
    let head = repo.refs().head_target()?.ok_or(Error::NoHead)?;
    let history = commit_engine::log(&repo, head, limit)?;

    for (id, commit) in history {
        println!("{} {}", "commit".yellow(), id);
        println!("Author: {}", commit.author);
        println!();
        for line in commit.message.lines() {
            println!("    {line}");
        }
        println!();
    }
    Ok(())
}
