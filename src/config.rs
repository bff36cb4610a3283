//! Committer identity configuration.
//!
//! Read from `PYGIT_AUTHOR_NAME` / `PYGIT_AUTHOR_EMAIL`. No on-disk config
//! file is introduced: the index, remotes table, and `.pygitignore` already
//! cover everything this crate persists.

use crate::errors::{Error, Result};

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Identity {
    pub name: String,
    pub email: String,
}

impl Identity {
    /// Read the committer identity from the environment.
    pub fn from_env() -> Result<Identity> {
        let name = std::env::var("PYGIT_AUTHOR_NAME").map_err(|_| Error::IdentityMissing)?;
        let email = std::env::var("PYGIT_AUTHOR_EMAIL").map_err(|_| Error::IdentityMissing)?;
        if name.trim().is_empty() || email.trim().is_empty() {
            return Err(Error::IdentityMissing);
        }
        Ok(Identity { name, email })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    static ENV_LOCK: Mutex<()> = Mutex::new(());

    #[test]
    fn test_missing_env_is_identity_missing() {
        let _guard = ENV_LOCK.lock().unwrap();
        unsafe {
            std::env::remove_var("PYGIT_AUTHOR_NAME");
            std::env::remove_var("PYGIT_AUTHOR_EMAIL");
        }
        assert!(matches!(Identity::from_env(), Err(Error::IdentityMissing)));
    }

    #[test]
    fn test_present_env_round_trips() {
        let _guard = ENV_LOCK.lock().unwrap();
        unsafe {
            std::env::set_var("PYGIT_AUTHOR_NAME", "Ada Lovelace");
            std::env::set_var("PYGIT_AUTHOR_EMAIL", "ada@example.com");
        }
        let identity = Identity::from_env().unwrap();
        assert_eq!(identity.name, "Ada Lovelace");
        assert_eq!(identity.email, "ada@example.com");
        unsafe {
            std::env::remove_var("PYGIT_AUTHOR_NAME");
            std::env::remove_var("PYGIT_AUTHOR_EMAIL");
        }
    }
}
