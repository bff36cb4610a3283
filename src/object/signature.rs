//! Author/committer signatures: `<role> <name> <email> <seconds> <±HHMM>`.

use bstr::ByteSlice;

use crate::errors::{Error, Result};

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Signature {
    pub name: String,
    pub email: String,
    pub seconds: i64,
    /// Signed timezone offset in minutes east of UTC.
    pub tz_offset: i32,
}

impl Signature {
    pub fn new(name: impl Into<String>, email: impl Into<String>, seconds: i64, tz_offset: i32) -> Self {
        Signature {
            name: name.into(),
            email: email.into(),
            seconds,
            tz_offset,
        }
    }

    /// Build a signature for "now" from the given identity.
    pub fn now(name: impl Into<String>, email: impl Into<String>) -> Self {
        let now = chrono::Local::now();
        Signature::new(name, email, now.timestamp(), now.offset().local_minus_utc() / 60)
    }

    /// Parse a `"<name> <email> <seconds> <±HHMM>"` line, with an optional
    /// leading `"author "`/`"committer "` role tag already stripped by the caller.
    pub fn from_data(data: Vec<u8>) -> Result<Signature> {
        let s = data
            .to_str()
            .map_err(|_| Error::InvalidObject("signature is not valid utf-8".into()))?;
        let s = s
            .trim_start_matches("author ")
            .trim_start_matches("committer ");

        let email_start = s
            .find('<')
            .ok_or_else(|| Error::InvalidObject("signature missing '<'".into()))?;
        let email_end = s
            .find('>')
            .ok_or_else(|| Error::InvalidObject("signature missing '>'".into()))?;
        if email_end < email_start {
            return Err(Error::InvalidObject("signature has '>' before '<'".into()));
        }

        let name = s[..email_start].trim().to_string();
        let email = s[email_start + 1..email_end].to_string();
        let rest = s[email_end + 1..].trim();

        let mut parts = rest.split_whitespace();
        let seconds: i64 = parts
            .next()
            .ok_or_else(|| Error::InvalidObject("signature missing timestamp".into()))?
            .parse()
            .map_err(|_| Error::InvalidObject("signature timestamp is not an integer".into()))?;
        let tz_str = parts
            .next()
            .ok_or_else(|| Error::InvalidObject("signature missing timezone".into()))?;
        let tz_offset = parse_tz_offset(tz_str)?;

        Ok(Signature {
            name,
            email,
            seconds,
            tz_offset,
        })
    }

    pub fn to_data(&self) -> Result<Vec<u8>> {
        Ok(self.to_string().into_bytes())
    }
}

fn parse_tz_offset(tz: &str) -> Result<i32> {
    if tz.len() != 5 || (tz.as_bytes()[0] != b'+' && tz.as_bytes()[0] != b'-') {
        return Err(Error::InvalidObject(format!("malformed timezone: {tz}")));
    }
    let sign = if tz.as_bytes()[0] == b'-' { -1 } else { 1 };
    let hours: i32 = tz[1..3]
        .parse()
        .map_err(|_| Error::InvalidObject(format!("malformed timezone: {tz}")))?;
    let minutes: i32 = tz[3..5]
        .parse()
        .map_err(|_| Error::InvalidObject(format!("malformed timezone: {tz}")))?;
    Ok(sign * (hours * 60 + minutes))
}

impl std::fmt::Display for Signature {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let sign = if self.tz_offset < 0 { '-' } else { '+' };
        let abs = self.tz_offset.unsigned_abs();
        write!(
            f,
            "{} <{}> {} {}{:02}{:02}",
            self.name,
            self.email,
            self.seconds,
            sign,
            abs / 60,
            abs % 60
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_round_trips_through_display_and_parse() {
        let sig = Signature::new("Ada Lovelace", "ada@example.com", 1_700_000_000, -300);
        let rendered = format!("author {sig}");
        let parsed = Signature::from_data(rendered.into_bytes()).unwrap();
        assert_eq!(parsed, sig);
    }

    #[test]
    fn test_positive_offset() {
        let sig = Signature::new("A", "a@b.com", 1, 480);
        assert_eq!(sig.to_string(), "A <a@b.com> 1 +0800");
    }

    #[test]
    fn test_rejects_missing_angle_brackets() {
        assert!(Signature::from_data(b"Ada ada@example.com 1 +0000".to_vec()).is_err());
    }
}
