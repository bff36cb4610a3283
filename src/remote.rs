//! Remote name → URL table, persisted as JSON under the metadata directory.
//!
//! URLs use the `pygit://host:port/repo` scheme described by the wire
//! protocol in [`crate::protocol`].

use std::collections::BTreeMap;
use std::fs;
use std::io::Write;
use std::path::Path;

use serde::{Deserialize, Serialize};
use tempfile::NamedTempFile;

use crate::errors::{Error, Result};

const REMOTES_FILE: &str = "remotes";
pub const DEFAULT_PORT: u16 = 8471;

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RemoteUrl {
    pub host: String,
    pub port: u16,
    pub repo: String,
}

impl RemoteUrl {
    pub fn parse(url: &str) -> Result<RemoteUrl> {
        let rest = url
            .strip_prefix("pygit://")
            .ok_or_else(|| Error::RemoteError(format!("not a pygit:// url: {url}")))?;
        let (authority, repo) = rest
            .split_once('/')
            .ok_or_else(|| Error::RemoteError(format!("url missing repo path: {url}")))?;
        let (host, port) = match authority.split_once(':') {
            Some((host, port)) => (
                host.to_string(),
                port.parse()
                    .map_err(|_| Error::RemoteError(format!("bad port in url: {url}")))?,
            ),
            None => (authority.to_string(), DEFAULT_PORT),
        };
        if host.is_empty() || repo.is_empty() {
            return Err(Error::RemoteError(format!("malformed pygit url: {url}")));
        }
        Ok(RemoteUrl {
            host,
            port,
            repo: repo.to_string(),
        })
    }
}

impl std::fmt::Display for RemoteUrl {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "pygit://{}:{}/{}", self.host, self.port, self.repo)
    }
}

#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct RemoteTable {
    remotes: BTreeMap<String, String>,
}

impl RemoteTable {
    pub fn load(root: &Path) -> Result<RemoteTable> {
        let path = root.join(REMOTES_FILE);
        match fs::read(&path) {
            Ok(bytes) => {
                serde_json::from_slice(&bytes).map_err(|e| Error::RemoteError(e.to_string()))
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(RemoteTable::default()),
            Err(e) => Err(Error::Io(e)),
        }
    }

    pub fn save(&self, root: &Path) -> Result<()> {
        let path = root.join(REMOTES_FILE);
        let bytes =
            serde_json::to_vec_pretty(self).map_err(|e| Error::RemoteError(e.to_string()))?;
        let mut tmp = NamedTempFile::new_in(root)?;
        tmp.write_all(&bytes)?;
        tmp.as_file().sync_all()?;
        tmp.persist(&path).map_err(|e| Error::Io(e.error))?;
        Ok(())
    }

    pub fn add(&mut self, name: impl Into<String>, url: impl Into<String>) {
        self.remotes.insert(name.into(), url.into());
    }

    pub fn remove(&mut self, name: &str) -> Option<String> {
        self.remotes.remove(name)
    }

    pub fn get(&self, name: &str) -> Result<RemoteUrl> {
        let url = self
            .remotes
            .get(name)
            .ok_or_else(|| Error::RemoteError(format!("no such remote: {name}")))?;
        RemoteUrl::parse(url)
    }

    pub fn list(&self) -> impl Iterator<Item = (&str, &str)> {
        self.remotes.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_parse_url_with_explicit_port() {
        let url = RemoteUrl::parse("pygit://example.com:9000/proj").unwrap();
        assert_eq!(url.host, "example.com");
        assert_eq!(url.port, 9000);
        assert_eq!(url.repo, "proj");
    }

    #[test]
    fn test_parse_url_defaults_port() {
        let url = RemoteUrl::parse("pygit://example.com/proj").unwrap();
        assert_eq!(url.port, DEFAULT_PORT);
    }

    #[test]
    fn test_parse_rejects_non_pygit_scheme() {
        assert!(RemoteUrl::parse("https://example.com/proj").is_err());
    }

    #[test]
    fn test_table_round_trip() {
        let dir = tempdir().unwrap();
        let mut table = RemoteTable::default();
        table.add("origin", "pygit://example.com/proj");
        table.save(dir.path()).unwrap();
        let loaded = RemoteTable::load(dir.path()).unwrap();
        assert_eq!(
            loaded.get("origin").unwrap(),
            RemoteUrl::parse("pygit://example.com/proj").unwrap()
        );
    }

    #[test]
    fn test_unknown_remote_errors() {
        let table = RemoteTable::default();
        assert!(table.get("origin").is_err());
    }
}
