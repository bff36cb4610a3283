//! The initiating side of the wire protocol: connects to a peer and drives
//! `push`, `pull`, or `clone`.

use std::collections::HashSet;
use std::io::BufReader;
use std::net::TcpStream;
use std::path::Path;

use tracing::info;

use crate::errors::{Error, Result};
use crate::hash::ObjectId;
use crate::remote::RemoteUrl;
use crate::repository::Repository;
use crate::worktree;

use super::wire::{self, parse_opt_id, write_line, write_opt_id};
use super::{closure_excluding, is_ancestor};

fn connect(remote: &RemoteUrl) -> Result<TcpStream> {
    let addr = format!("{}:{}", remote.host, remote.port);
    let socket_addr = std::net::ToSocketAddrs::to_socket_addrs(&addr)
        .map_err(|e| Error::Network(e.to_string()))?
        .next()
        .ok_or_else(|| Error::Network(format!("could not resolve {addr}")))?;
    let stream = TcpStream::connect_timeout(&socket_addr, super::DEFAULT_TIMEOUT)
        .map_err(|e| Error::Network(e.to_string()))?;
    stream
        .set_read_timeout(Some(super::DEFAULT_TIMEOUT))
        .map_err(Error::Io)?;
    stream
        .set_write_timeout(Some(super::DEFAULT_TIMEOUT))
        .map_err(Error::Io)?;
    Ok(stream)
}

/// Push `branch`'s local tip to `remote`, fast-forward only.
pub fn push(repo: &Repository, remote: &RemoteUrl, branch: &str) -> Result<()> {
    let local_tip = repo
        .refs()
        .read_branch(branch)?
        .ok_or(Error::NoHead)?;

    let stream = connect(remote)?;
    let mut writer = stream.try_clone().map_err(Error::Io)?;
    let mut reader = BufReader::new(stream);

    write_line(&mut writer, &format!("PUSH {} {branch}", remote.repo))?;

    let ready = wire::read_line(&mut reader)?;
    let mut parts = ready.split_whitespace();
    if parts.next() != Some("READY") {
        return Err(Error::ProtocolViolation(format!("expected READY, got: {ready}")));
    }
    let remote_tip = parse_opt_id(parts.next().unwrap_or(wire::NIL))?;

    if let Some(remote_id) = remote_tip {
        if !is_ancestor(repo.store(), local_tip, remote_id)? {
            return Err(Error::NonFastForward);
        }
    }

    let missing = closure_excluding(repo.store(), local_tip, remote_tip)?;
    for id in &missing {
        let object = repo.store().get(*id)?;
        wire::write_object_record(&mut writer, &object)?;
    }
    write_line(&mut writer, "DONE")?;
    write_line(
        &mut writer,
        &format!("UPDATE {} {local_tip}", write_opt_id(remote_tip)),
    )?;

    let response = wire::read_line(&mut reader)?;
    match response.as_str() {
        "OK" => {
            info!(%branch, %local_tip, "push succeeded");
            Ok(())
        }
        other if other.starts_with("ERR") => Err(Error::RemoteError(other.to_string())),
        other => Err(Error::ProtocolViolation(format!("unexpected push reply: {other}"))),
    }
}

/// Fast-forward `branch` from `remote`.
pub fn pull(repo: &Repository, remote: &RemoteUrl, branch: &str) -> Result<()> {
    let stream = connect(remote)?;
    let mut writer = stream.try_clone().map_err(Error::Io)?;
    let mut reader = BufReader::new(stream);

    write_line(&mut writer, &format!("PULL {} {branch}", remote.repo))?;

    let tip_line = wire::read_line(&mut reader)?;
    let mut parts = tip_line.split_whitespace();
    if parts.next() != Some("TIP") {
        return Err(Error::ProtocolViolation(format!("expected TIP, got: {tip_line}")));
    }
    let remote_tip = parse_opt_id(parts.next().unwrap_or(wire::NIL))?;

    let count_line = wire::read_line(&mut reader)?;
    let mut parts = count_line.split_whitespace();
    if parts.next() != Some("COUNT") {
        return Err(Error::ProtocolViolation(format!("expected COUNT, got: {count_line}")));
    }
    let count: usize = parts
        .next()
        .and_then(|s| s.parse().ok())
        .ok_or_else(|| Error::ProtocolViolation("COUNT missing number".into()))?;

    let mut reachable = HashSet::with_capacity(count);
    for _ in 0..count {
        let hex = wire::read_line(&mut reader)?;
        let id: ObjectId = hex
            .parse()
            .map_err(|e| Error::ProtocolViolation(format!("bad id in COUNT list: {e}")))?;
        reachable.insert(id);
    }

    let Some(remote_tip) = remote_tip else {
        wire::write_line(&mut writer, "NEED 0")?;
        let _ = wire::read_line(&mut reader)?; // DONE
        return Ok(());
    };

    let need: Vec<ObjectId> = reachable
        .into_iter()
        .filter(|id| !repo.store().exists(*id))
        .collect();
    write_line(&mut writer, &format!("NEED {}", need.len()))?;
    for id in &need {
        write_line(&mut writer, &id.to_string())?;
    }

    for _ in 0..need.len() {
        let object = wire::read_object_record(&mut reader)?;
        repo.store().put(&object)?;
    }
    let done = wire::read_line(&mut reader)?;
    if done != "DONE" {
        return Err(Error::ProtocolViolation(format!("expected DONE, got: {done}")));
    }

    let local_tip = repo.refs().read_branch(branch).unwrap_or(None);
    if let Some(local_id) = local_tip {
        if !is_ancestor(repo.store(), remote_tip, local_id)? {
            return Err(Error::NonFastForward);
        }
    }
    repo.refs().write_branch(branch, remote_tip)?;
    info!(%branch, %remote_tip, "pull fast-forwarded local branch");
    Ok(())
}

/// Create a fresh repository at `dest` populated from `remote`'s full ref
/// and object closure, checked out at the server's default `HEAD` branch.
pub fn clone(remote: &RemoteUrl, dest: &Path) -> Result<Repository> {
    let stream = connect(remote)?;
    let mut writer = stream.try_clone().map_err(Error::Io)?;
    let mut reader = BufReader::new(stream);

    write_line(&mut writer, &format!("CLONE {}", remote.repo))?;

    let mut refs = Vec::new();
    loop {
        let line = wire::read_line(&mut reader)?;
        if line == "REFS-END" {
            break;
        }
        let mut parts = line.split_whitespace();
        if parts.next() != Some("REF") {
            return Err(Error::ProtocolViolation(format!("expected REF, got: {line}")));
        }
        let name = parts
            .next()
            .ok_or_else(|| Error::ProtocolViolation("REF missing name".into()))?
            .to_string();
        let id: ObjectId = parts
            .next()
            .ok_or_else(|| Error::ProtocolViolation("REF missing id".into()))?
            .parse()
            .map_err(|e| Error::ProtocolViolation(format!("bad id in REF line: {e}")))?;
        refs.push((name, id));
    }

    let repo = Repository::init(dest)?;

    loop {
        let line = wire::read_line(&mut reader)?;
        if line == "DONE" {
            break;
        }
        let object = wire::read_object_body(&line, &mut reader)?;
        repo.store().put(&object)?;
    }

    for (name, id) in &refs {
        repo.refs().write_branch(name, *id)?;
    }

    let head_line = wire::read_line(&mut reader)?;
    let mut parts = head_line.split_whitespace();
    if parts.next() != Some("HEAD") {
        return Err(Error::ProtocolViolation(format!("expected HEAD, got: {head_line}")));
    }
    let head_branch = parts
        .next()
        .ok_or_else(|| Error::ProtocolViolation("HEAD missing branch name".into()))?;

    if repo.refs().branch_exists(head_branch) {
        worktree::checkout(&repo, head_branch, false)?;
    } else {
        repo.refs().set_head_symbolic(head_branch)?;
    }

    info!(branch = %head_branch, refs = refs.len(), "clone complete");
    Ok(repo)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::commit_engine;
    use crate::config::Identity;
    use std::net::TcpListener;
    use std::thread;
    use tempfile::tempdir;

    fn identity() -> Identity {
        Identity {
            name: "Ada Lovelace".to_string(),
            email: "ada@example.com".to_string(),
        }
    }

    fn bind_loopback() -> (RemoteUrl, TcpListener) {
        let listener = TcpListener::bind("127.0.0.1:0").unwrap();
        let port = listener.local_addr().unwrap().port();
        let remote = RemoteUrl {
            host: "127.0.0.1".to_string(),
            port,
            repo: "test".to_string(),
        };
        (remote, listener)
    }

    #[test]
    fn test_clone_replicates_commit_history() {
        let server_dir = tempdir().unwrap();
        let server_repo = Repository::init(server_dir.path()).unwrap();
        std::fs::write(server_dir.path().join("a.txt"), "hello").unwrap();
        worktree::add(&server_repo, &["a.txt".to_string()]).unwrap();
        let commit_id = commit_engine::commit(&server_repo, &identity(), "init\n").unwrap();

        let (remote, listener) = bind_loopback();
        let server_repo_for_thread = Repository::discover(server_dir.path()).unwrap();
        let handle = thread::spawn(move || {
            let (stream, _) = listener.accept().unwrap();
            super::super::server::serve_one(&server_repo_for_thread, stream).unwrap();
        });

        let client_dir = tempdir().unwrap();
        let cloned = clone(&remote, &client_dir.path().join("clone")).unwrap();
        handle.join().unwrap();

        assert_eq!(cloned.refs().head_target().unwrap(), Some(commit_id));
        assert_eq!(
            std::fs::read_to_string(client_dir.path().join("clone/a.txt")).unwrap(),
            "hello"
        );
    }
}
