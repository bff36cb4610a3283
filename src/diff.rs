//! Unified diff generation between two blob byte buffers.
//!
//! Binary detection follows the common heuristic: a NUL byte anywhere in the
//! first 8 KiB means the file is treated as binary and only a
//! "Binary files differ" marker is emitted, never a line-level diff.

use std::collections::VecDeque;
use std::fmt::Write;

use similar::{Algorithm, ChangeTag, TextDiff};

use crate::hash::ObjectId;

const CONTEXT_LINES: usize = 3;
const BINARY_SNIFF_LEN: usize = 8192;
const SHORT_ID_LEN: usize = 7;

/// Result of diffing one file: its logical path and its unified diff text
/// (or a binary marker).
#[derive(Debug, Clone)]
pub struct FileDiff {
    pub path: String,
    pub text: String,
}

#[derive(Debug, Clone, Copy)]
enum EditLine<'a> {
    Context(Option<usize>, Option<usize>, &'a str),
    Delete(usize, &'a str),
    Insert(usize, &'a str),
}

fn looks_binary(bytes: &[u8]) -> bool {
    bytes[..bytes.len().min(BINARY_SNIFF_LEN)].contains(&0)
}

fn short_id(id: Option<ObjectId>) -> String {
    id.map(|i| i.to_string()[..SHORT_ID_LEN].to_string())
        .unwrap_or_else(|| "0".repeat(SHORT_ID_LEN))
}

/// Diff one file given its path, old/new object ids (`None` for absent), and
/// preloaded byte content.
pub fn diff_file(
    path: &str,
    old_id: Option<ObjectId>,
    new_id: Option<ObjectId>,
    old_bytes: &[u8],
    new_bytes: &[u8],
) -> FileDiff {
    let mut out = String::new();
    let _ = writeln!(out, "diff --pygit a/{path} b/{path}");

    if old_id.is_none() {
        let _ = writeln!(out, "new file");
    } else if new_id.is_none() {
        let _ = writeln!(out, "deleted file");
    }
    let _ = writeln!(out, "index {}..{}", short_id(old_id), short_id(new_id));

    if looks_binary(old_bytes) || looks_binary(new_bytes) {
        let _ = writeln!(out, "Binary files differ");
        return FileDiff { path: path.to_string(), text: out };
    }

    let old_text = String::from_utf8_lossy(old_bytes);
    let new_text = String::from_utf8_lossy(new_bytes);

    let (old_pref, new_pref) = if old_id.is_none() {
        ("/dev/null".to_string(), format!("b/{path}"))
    } else if new_id.is_none() {
        (format!("a/{path}"), "/dev/null".to_string())
    } else {
        (format!("a/{path}"), format!("b/{path}"))
    };
    let _ = writeln!(out, "--- {old_pref}");
    let _ = writeln!(out, "+++ {new_pref}");

    out.push_str(&compute_unified_diff(&old_text, &new_text, CONTEXT_LINES));

    FileDiff {
        path: path.to_string(),
        text: out,
    }
}

fn compute_unified_diff(old_text: &str, new_text: &str, context: usize) -> String {
    let diff = TextDiff::configure()
        .algorithm(Algorithm::Myers)
        .diff_lines(old_text, new_text);

    let mut out = String::with_capacity(((old_text.len() + new_text.len()) / 16).max(256));

    let mut prefix_ctx: VecDeque<EditLine> = VecDeque::with_capacity(context);
    let mut cur_hunk: Vec<EditLine> = Vec::new();
    let mut eq_run: Vec<EditLine> = Vec::new();
    let mut in_hunk = false;

    let mut last_old_seen = 0usize;
    let mut last_new_seen = 0usize;
    let mut old_line_no = 1usize;
    let mut new_line_no = 1usize;

    for change in diff.iter_all_changes() {
        let line = change.value().trim_end_matches(['\r', '\n']);
        match change.tag() {
            ChangeTag::Equal => {
                let entry = EditLine::Context(Some(old_line_no), Some(new_line_no), line);
                old_line_no += 1;
                new_line_no += 1;
                if in_hunk {
                    eq_run.push(entry);
                    if eq_run.len() > context * 2 {
                        flush_hunk(
                            &mut out,
                            &mut cur_hunk,
                            &mut eq_run,
                            &mut prefix_ctx,
                            context,
                            &mut last_old_seen,
                            &mut last_new_seen,
                        );
                        in_hunk = false;
                    }
                } else {
                    if prefix_ctx.len() == context {
                        prefix_ctx.pop_front();
                    }
                    prefix_ctx.push_back(entry);
                }
            }
            ChangeTag::Delete => {
                let entry = EditLine::Delete(old_line_no, line);
                old_line_no += 1;
                if !in_hunk {
                    cur_hunk.extend(prefix_ctx.iter().copied());
                    prefix_ctx.clear();
                    in_hunk = true;
                }
                if !eq_run.is_empty() {
                    cur_hunk.append(&mut eq_run);
                }
                cur_hunk.push(entry);
            }
            ChangeTag::Insert => {
                let entry = EditLine::Insert(new_line_no, line);
                new_line_no += 1;
                if !in_hunk {
                    cur_hunk.extend(prefix_ctx.iter().copied());
                    prefix_ctx.clear();
                    in_hunk = true;
                }
                if !eq_run.is_empty() {
                    cur_hunk.append(&mut eq_run);
                }
                cur_hunk.push(entry);
            }
        }
    }

    if in_hunk {
        flush_hunk(
            &mut out,
            &mut cur_hunk,
            &mut eq_run,
            &mut prefix_ctx,
            context,
            &mut last_old_seen,
            &mut last_new_seen,
        );
    }

    out
}

fn flush_hunk<'a>(
    out: &mut String,
    cur_hunk: &mut Vec<EditLine<'a>>,
    eq_run: &mut Vec<EditLine<'a>>,
    prefix_ctx: &mut VecDeque<EditLine<'a>>,
    context: usize,
    last_old_seen: &mut usize,
    last_new_seen: &mut usize,
) {
    let trail_to_take = eq_run.len().min(context);
    for entry in eq_run.iter().take(trail_to_take) {
        cur_hunk.push(*entry);
    }

    let mut old_first: Option<usize> = None;
    let mut old_count: usize = 0;
    let mut new_first: Option<usize> = None;
    let mut new_count: usize = 0;

    for e in cur_hunk.iter() {
        match *e {
            EditLine::Context(o, n, _) => {
                if let Some(o) = o {
                    old_first.get_or_insert(o);
                    old_count += 1;
                }
                if let Some(n) = n {
                    new_first.get_or_insert(n);
                    new_count += 1;
                }
            }
            EditLine::Delete(o, _) => {
                old_first.get_or_insert(o);
                old_count += 1;
            }
            EditLine::Insert(n, _) => {
                new_first.get_or_insert(n);
                new_count += 1;
            }
        }
    }

    if old_count == 0 && new_count == 0 {
        cur_hunk.clear();
        eq_run.clear();
        return;
    }

    let old_start = old_first.unwrap_or(*last_old_seen + 1);
    let new_start = new_first.unwrap_or(*last_new_seen + 1);
    let _ = writeln!(out, "@@ -{old_start},{old_count} +{new_start},{new_count} @@");

    for &e in cur_hunk.iter() {
        match e {
            EditLine::Context(o, n, txt) => {
                let _ = writeln!(out, " {txt}");
                if let Some(o) = o {
                    *last_old_seen = (*last_old_seen).max(o);
                }
                if let Some(n) = n {
                    *last_new_seen = (*last_new_seen).max(n);
                }
            }
            EditLine::Delete(o, txt) => {
                let _ = writeln!(out, "-{txt}");
                *last_old_seen = (*last_old_seen).max(o);
            }
            EditLine::Insert(n, txt) => {
                let _ = writeln!(out, "+{txt}");
                *last_new_seen = (*last_new_seen).max(n);
            }
        }
    }

    prefix_ctx.clear();
    if context > 0 {
        let keep_start = eq_run.len().saturating_sub(context);
        for entry in eq_run.iter().skip(keep_start) {
            prefix_ctx.push_back(*entry);
        }
    }

    cur_hunk.clear();
    eq_run.clear();
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::object::ObjectKind;

    #[test]
    fn test_basic_text_diff_has_expected_markers() {
        let old = b"a\nb\nc\n";
        let new = b"a\nB\nc\nd\n";
        let old_id = ObjectId::frame(ObjectKind::Blob, old);
        let new_id = ObjectId::frame(ObjectKind::Blob, new);
        let diff = diff_file("foo.txt", Some(old_id), Some(new_id), old, new);
        assert!(diff.text.contains("--- a/foo.txt"));
        assert!(diff.text.contains("+++ b/foo.txt"));
        assert!(diff.text.contains("-b"));
        assert!(diff.text.contains("+B"));
        assert!(diff.text.contains("+d"));
    }

    #[test]
    fn test_nul_byte_triggers_binary_marker() {
        let old = vec![0u8, 1, 2, 3];
        let new = vec![0u8, 1, 2, 4];
        let diff = diff_file("bin.dat", None, None, &old, &new);
        assert!(diff.text.contains("Binary files differ"));
    }

    #[test]
    fn test_new_file_has_dev_null_old_side() {
        let new = b"hello\n";
        let new_id = ObjectId::frame(ObjectKind::Blob, new);
        let diff = diff_file("new.txt", None, Some(new_id), b"", new);
        assert!(diff.text.contains("--- /dev/null"));
        assert!(diff.text.contains("new file"));
    }
}
