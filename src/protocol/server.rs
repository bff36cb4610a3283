//! The receiving side of the wire protocol: accepts one connection at a
//! time and dispatches on its command header.

use std::io::{BufReader, Write};
use std::net::{TcpListener, TcpStream};

use tracing::{info, warn};

use crate::errors::{Error, Result};
use crate::repository::Repository;

use super::wire::{self, parse_opt_id, write_line, write_opt_id};
use super::{closure, is_ancestor};

/// Accept connections on `listener` forever, handling each to completion
/// before accepting the next (§5: single connection at a time).
pub fn serve(repo: &Repository, listener: &TcpListener) -> Result<()> {
    for incoming in listener.incoming() {
        let stream = incoming.map_err(|e| Error::Network(e.to_string()))?;
        if let Err(e) = serve_one(repo, stream) {
            warn!(error = %e, "protocol connection failed");
        }
    }
    Ok(())
}

/// Handle exactly one connection to completion. Exposed separately from
/// [`serve`] so callers (and tests) can drive a single request/response
/// cycle without binding a whole accept loop.
pub fn serve_one(repo: &Repository, stream: TcpStream) -> Result<()> {
    stream
        .set_read_timeout(Some(super::DEFAULT_TIMEOUT))
        .map_err(Error::Io)?;
    stream
        .set_write_timeout(Some(super::DEFAULT_TIMEOUT))
        .map_err(Error::Io)?;

    let mut writer = stream.try_clone().map_err(Error::Io)?;
    let mut reader = BufReader::new(stream);

    let header = wire::read_line(&mut reader)?;
    let mut parts = header.split_whitespace();
    let command = parts.next().unwrap_or_default();

    match command {
        "HAVE" => {
            let _repo_name = parts.next();
            handle_have(repo, &mut writer)
        }
        "PUSH" => {
            let _repo_name = parts.next();
            let branch = parts
                .next()
                .ok_or_else(|| Error::ProtocolViolation("PUSH missing branch".into()))?;
            handle_push(repo, branch, &mut reader, &mut writer)
        }
        "PULL" => {
            let _repo_name = parts.next();
            let branch = parts
                .next()
                .ok_or_else(|| Error::ProtocolViolation("PULL missing branch".into()))?;
            handle_pull(repo, branch, &mut reader, &mut writer)
        }
        "CLONE" => {
            let _repo_name = parts.next();
            handle_clone(repo, &mut writer)
        }
        other => Err(Error::ProtocolViolation(format!("unknown command: {other}"))),
    }
}

fn handle_have(repo: &Repository, w: &mut impl Write) -> Result<()> {
    let mut ids = std::collections::BTreeSet::new();
    for branch in repo.refs().list_branches()? {
        if let Some(tip) = repo.refs().read_branch(&branch)? {
            ids.extend(closure(repo.store(), tip)?);
        }
    }
    write_line(w, &ids.len().to_string())?;
    for id in &ids {
        write_line(w, &id.to_string())?;
    }
    write_line(w, "END")?;
    Ok(())
}

fn handle_push(
    repo: &Repository,
    branch: &str,
    r: &mut impl std::io::BufRead,
    w: &mut impl Write,
) -> Result<()> {
    let old = repo.refs().read_branch(branch).unwrap_or(None);
    write_line(w, &format!("READY {}", write_opt_id(old)))?;

    loop {
        let line = wire::read_line(r)?;
        if line == "DONE" {
            break;
        }
        if !line.starts_with("OBJ") {
            return Err(Error::ProtocolViolation(format!("expected OBJ or DONE, got: {line}")));
        }
        let object = wire::read_object_body(&line, r)?;
        repo.store().put(&object)?;
    }

    let update = wire::read_line(r)?;
    let mut parts = update.split_whitespace();
    if parts.next() != Some("UPDATE") {
        return Err(Error::ProtocolViolation("expected UPDATE line".into()));
    }
    let claimed_old = parse_opt_id(parts.next().unwrap_or(wire::NIL))?;
    let new_id = parse_opt_id(parts.next().unwrap_or(wire::NIL))?
        .ok_or_else(|| Error::ProtocolViolation("UPDATE missing new id".into()))?;

    let current = repo.refs().read_branch(branch).unwrap_or(None);
    if current != claimed_old {
        write_line(w, "ERR ref moved concurrently")?;
        return Err(Error::RefRaceLost);
    }
    if let Some(old_id) = current {
        if !is_ancestor(repo.store(), new_id, old_id)? {
            write_line(w, "ERR not a fast-forward")?;
            return Err(Error::NonFastForward);
        }
    }

    repo.refs().write_branch(branch, new_id)?;
    info!(%branch, %new_id, "branch fast-forwarded by push");
    write_line(w, "OK")?;
    Ok(())
}

fn handle_pull(
    repo: &Repository,
    branch: &str,
    r: &mut impl std::io::BufRead,
    w: &mut impl Write,
) -> Result<()> {
    let tip = repo.refs().read_branch(branch).unwrap_or(None);
    write_line(w, &format!("TIP {}", write_opt_id(tip)))?;

    let Some(tip) = tip else {
        write_line(w, "COUNT 0")?;
        write_line(w, "DONE")?;
        return Ok(());
    };

    let reachable = closure(repo.store(), tip)?;
    write_line(w, &format!("COUNT {}", reachable.len()))?;
    for id in &reachable {
        write_line(w, &id.to_string())?;
    }

    let need_line = wire::read_line(r)?;
    let mut parts = need_line.split_whitespace();
    if parts.next() != Some("NEED") {
        return Err(Error::ProtocolViolation("expected NEED line".into()));
    }
    let count: usize = parts
        .next()
        .and_then(|s| s.parse().ok())
        .ok_or_else(|| Error::ProtocolViolation("NEED missing count".into()))?;
    for _ in 0..count {
        let hex = wire::read_line(r)?;
        let id: crate::hash::ObjectId = hex
            .parse()
            .map_err(|e| Error::ProtocolViolation(format!("bad id in NEED list: {e}")))?;
        let object = repo.store().get(id)?;
        wire::write_object_record(w, &object)?;
    }
    write_line(w, "DONE")?;
    Ok(())
}

fn handle_clone(repo: &Repository, w: &mut impl Write) -> Result<()> {
    for branch in repo.refs().list_branches()? {
        if let Some(tip) = repo.refs().read_branch(&branch)? {
            write_line(w, &format!("REF {branch} {tip}"))?;
        }
    }
    write_line(w, "REFS-END")?;

    let mut all = std::collections::HashSet::new();
    for branch in repo.refs().list_branches()? {
        if let Some(tip) = repo.refs().read_branch(&branch)? {
            all.extend(closure(repo.store(), tip)?);
        }
    }
    for id in &all {
        let object = repo.store().get(*id)?;
        wire::write_object_record(w, &object)?;
    }
    write_line(w, "DONE")?;

    let head_branch = repo.refs().current_branch()?.unwrap_or_default();
    write_line(w, &format!("HEAD {head_branch}"))?;
    Ok(())
}
