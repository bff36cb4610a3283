use crate::errors::Result;
use crate::repository::{METADATA_DIR, Repository};

pub fn execute() -> Result<()> {
    let root = super::current_dir()?;
    tracing::debug!("init: {}", root.display());
    Repository::init(&root)?;
    println!(
        "Initialized empty pygit repository in {}",
        root.join(METADATA_DIR).display()
    );
    Ok(())
}
