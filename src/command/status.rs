use colored::Colorize;

use crate::errors::Result;
use crate::worktree;

pub fn execute() -> Result<()> {
    let repo = super::current_repo()?;
    let status = worktree::status(&repo)?;

    let any_staged =
        !status.staged_new.is_empty() || !status.staged_modified.is_empty() || !status.deleted.is_empty();
    if any_staged {
        println!("Changes to be committed:");
        for path in &status.staged_new {
            println!("  {}", format!("new file:   {path}").green());
        }
        for path in &status.staged_modified {
            println!("  {}", format!("modified:   {path}").green());
        }
        for path in &status.deleted {
            println!("  {}", format!("deleted:    {path}").green());
        }
    }

    if !status.unstaged_modified.is_empty() {
        println!("Changes not staged for commit:");
        for path in &status.unstaged_modified {
            println!("  {}", format!("modified:   {path}").red());
        }
    }

    if !status.untracked.is_empty() {
        println!("Untracked files:");
        for path in &status.untracked {
            println!("  {}", path.red());
        }
    }

    if !any_staged && status.unstaged_modified.is_empty() && status.untracked.is_empty() {
        println!("nothing to commit, working tree clean");
    }

    Ok(())
}
