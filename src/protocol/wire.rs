//! Line- and record-level framing shared by the client and server.
//!
//! A command header is one ASCII line terminated by `\n`. Object bodies are
//! framed as `OBJ <id> <length>\n<length raw bytes>\n` so either side can
//! stream without buffering a whole object ahead of time.

use std::io::{BufRead, Read, Write};

use crate::errors::{Error, Result};
use crate::hash::ObjectId;
use crate::object::Object;

pub const NIL: &str = "NIL";

pub fn write_line(w: &mut impl Write, line: &str) -> Result<()> {
    w.write_all(line.as_bytes())?;
    w.write_all(b"\n")?;
    Ok(())
}

pub fn read_line(r: &mut impl BufRead) -> Result<String> {
    let mut buf = String::new();
    let n = r
        .read_line(&mut buf)
        .map_err(|e| Error::Network(e.to_string()))?;
    if n == 0 {
        return Err(Error::ProtocolViolation("connection closed mid-message".into()));
    }
    Ok(buf.trim_end_matches(['\n', '\r']).to_string())
}

pub fn write_opt_id(id: Option<ObjectId>) -> String {
    id.map(|i| i.to_string()).unwrap_or_else(|| NIL.to_string())
}

pub fn parse_opt_id(s: &str) -> Result<Option<ObjectId>> {
    if s == NIL {
        Ok(None)
    } else {
        s.parse()
            .map(Some)
            .map_err(|e| Error::ProtocolViolation(format!("bad object id: {e}")))
    }
}

/// Write one `OBJ <id> <length>\n<bytes>\n` record.
pub fn write_object_record(w: &mut impl Write, object: &Object) -> Result<()> {
    let id = object.id();
    let framed = object.to_framed();
    write_line(w, &format!("OBJ {id} {}", framed.len()))?;
    w.write_all(&framed)?;
    w.write_all(b"\n")?;
    Ok(())
}

/// Read one `OBJ <id> <length>\n<bytes>\n` record, validating that the body
/// actually hashes to the announced id.
pub fn read_object_record(r: &mut impl BufRead) -> Result<Object> {
    let header = read_line(r)?;
    read_object_body(&header, r)
}

/// Read an object's body given an already-consumed `OBJ <id> <length>`
/// header line. Useful when a caller had to peek the header line first to
/// distinguish it from a sentinel line like `DONE`.
pub fn read_object_body(header: &str, r: &mut impl Read) -> Result<Object> {
    let mut parts = header.split_whitespace();
    if parts.next() != Some("OBJ") {
        return Err(Error::ProtocolViolation(format!(
            "expected OBJ record, got: {header}"
        )));
    }
    let claimed_id: ObjectId = parts
        .next()
        .ok_or_else(|| Error::ProtocolViolation("OBJ record missing id".into()))?
        .parse()
        .map_err(|e| Error::ProtocolViolation(format!("bad object id in OBJ record: {e}")))?;
    let len: usize = parts
        .next()
        .ok_or_else(|| Error::ProtocolViolation("OBJ record missing length".into()))?
        .parse()
        .map_err(|_| Error::ProtocolViolation("OBJ record length is not a number".into()))?;

    let mut body = vec![0u8; len];
    r.read_exact(&mut body)
        .map_err(|e| Error::Network(e.to_string()))?;
    let mut trailing = [0u8; 1];
    r.read_exact(&mut trailing)
        .map_err(|e| Error::Network(e.to_string()))?;

    let object = Object::from_framed(&body)?;
    if object.id() != claimed_id {
        return Err(Error::Corrupt(claimed_id.to_string()));
    }
    Ok(object)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::object::Blob;
    use std::io::{BufReader, Cursor};

    #[test]
    fn test_object_record_round_trips() {
        let object = Object::Blob(Blob::new(b"hello".to_vec()));
        let mut buf = Vec::new();
        write_object_record(&mut buf, &object).unwrap();

        let mut reader = BufReader::new(Cursor::new(buf));
        let read_back = read_object_record(&mut reader).unwrap();
        assert_eq!(read_back.id(), object.id());
    }

    #[test]
    fn test_opt_id_round_trips_nil_and_some() {
        assert_eq!(parse_opt_id(NIL).unwrap(), None);
        let id = ObjectId::frame(crate::object::ObjectKind::Blob, b"x");
        assert_eq!(parse_opt_id(&write_opt_id(Some(id))).unwrap(), Some(id));
    }

    #[test]
    fn test_read_object_record_detects_tampered_id() {
        let object = Object::Blob(Blob::new(b"hello".to_vec()));
        let mut buf = Vec::new();
        write_object_record(&mut buf, &object).unwrap();
        // Flip the announced id to something else entirely.
        let bogus = ObjectId::frame(crate::object::ObjectKind::Blob, b"different");
        let header_end = buf.iter().position(|&b| b == b'\n').unwrap();
        let rest = buf[header_end..].to_vec();
        let mut tampered = format!("OBJ {bogus} {}", object.to_framed().len()).into_bytes();
        tampered.extend(rest);

        let mut reader = BufReader::new(Cursor::new(tampered));
        assert!(matches!(read_object_record(&mut reader), Err(Error::Corrupt(_))));
    }
}
