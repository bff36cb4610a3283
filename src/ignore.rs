//! `.pygitignore` compiler and matcher.
//!
//! Patterns are single path-component globs (`*`, `?`, `[...]`): no `**`,
//! no negation, and no leading-`/` anchoring. A pattern matches if any
//! component of the candidate path matches it. A trailing `/` restricts a
//! pattern to directory components (spec.md:104) — since `is_ignored` is
//! only ever called with file paths (callers walk files, not directories),
//! that means a directory-only pattern can match every component except the
//! last one. The metadata directory is always implicitly ignored, regardless
//! of `.pygitignore` contents.

use std::fs;
use std::path::{Path, PathBuf};

use glob::Pattern;
use tracing::warn;

pub const IGNORE_FILE: &str = ".pygitignore";

struct IgnorePattern {
    pattern: Pattern,
    directory_only: bool,
}

pub struct IgnoreMatcher {
    patterns: Vec<IgnorePattern>,
    metadata_dir_name: String,
}

impl IgnoreMatcher {
    /// Load `.pygitignore` from the repository root. Malformed lines are
    /// skipped with a warning rather than failing the whole load.
    pub fn load(repo_root: &Path, metadata_dir_name: &str) -> IgnoreMatcher {
        let path = repo_root.join(IGNORE_FILE);
        let mut patterns = Vec::new();
        if let Ok(contents) = fs::read_to_string(&path) {
            for line in contents.lines() {
                let line = line.trim();
                if line.is_empty() || line.starts_with('#') {
                    continue;
                }
                let directory_only = line.ends_with('/');
                let stripped = line.trim_end_matches('/');
                match Pattern::new(stripped) {
                    Ok(pattern) => patterns.push(IgnorePattern { pattern, directory_only }),
                    Err(e) => warn!(pattern = line, error = %e, "ignoring malformed .pygitignore line"),
                }
            }
        }
        IgnoreMatcher {
            patterns,
            metadata_dir_name: metadata_dir_name.to_string(),
        }
    }

    /// `path` is relative to the repository root and names a file, never a
    /// directory — so its last component can only match a non-directory-only
    /// pattern, while earlier components (always directories) can match either.
    pub fn is_ignored(&self, path: &Path) -> bool {
        if path
            .components()
            .next()
            .map(|c| c.as_os_str() == self.metadata_dir_name.as_str())
            .unwrap_or(false)
        {
            return true;
        }
        let components: Vec<_> = path.components().collect();
        components.iter().enumerate().any(|(i, component)| {
            let is_last = i == components.len() - 1;
            let name = component.as_os_str().to_string_lossy();
            self.patterns
                .iter()
                .any(|p| (!is_last || !p.directory_only) && p.pattern.matches(&name))
        })
    }

    pub fn filter(&self, paths: Vec<PathBuf>) -> Vec<PathBuf> {
        paths
            .into_iter()
            .filter(|p| !self.is_ignored(p))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_metadata_dir_always_ignored() {
        let dir = tempdir().unwrap();
        let matcher = IgnoreMatcher::load(dir.path(), ".pygit");
        assert!(matcher.is_ignored(Path::new(".pygit/objects/ab/cdef")));
    }

    #[test]
    fn test_simple_glob_pattern_matches_any_component() {
        let dir = tempdir().unwrap();
        fs::write(dir.path().join(IGNORE_FILE), "*.log\n").unwrap();
        let matcher = IgnoreMatcher::load(dir.path(), ".pygit");
        assert!(matcher.is_ignored(Path::new("debug.log")));
        assert!(matcher.is_ignored(Path::new("nested/dir/debug.log")));
        assert!(!matcher.is_ignored(Path::new("debug.txt")));
    }

    #[test]
    fn test_malformed_line_is_skipped_not_fatal() {
        let dir = tempdir().unwrap();
        fs::write(dir.path().join(IGNORE_FILE), "[\n*.tmp\n").unwrap();
        let matcher = IgnoreMatcher::load(dir.path(), ".pygit");
        assert!(matcher.is_ignored(Path::new("scratch.tmp")));
    }

    #[test]
    fn test_comments_and_blank_lines_ignored() {
        let dir = tempdir().unwrap();
        fs::write(dir.path().join(IGNORE_FILE), "# comment\n\n*.bak\n").unwrap();
        let matcher = IgnoreMatcher::load(dir.path(), ".pygit");
        assert!(matcher.is_ignored(Path::new("x.bak")));
        assert!(!matcher.is_ignored(Path::new("# comment")));
    }

    #[test]
    fn test_trailing_slash_restricts_to_directory_components() {
        let dir = tempdir().unwrap();
        fs::write(dir.path().join(IGNORE_FILE), "*.log\nbuild/\n").unwrap();
        let matcher = IgnoreMatcher::load(dir.path(), ".pygit");
        assert!(matcher.is_ignored(Path::new("build/out")));
        assert!(matcher.is_ignored(Path::new("build/nested/out.txt")));
        // "build" itself, as a bare file name, is the last component and
        // must not match a directory-only pattern.
        assert!(!matcher.is_ignored(Path::new("build")));
    }

    #[test]
    fn test_no_double_star_support() {
        let dir = tempdir().unwrap();
        fs::write(dir.path().join(IGNORE_FILE), "**/build\n").unwrap();
        let matcher = IgnoreMatcher::load(dir.path(), ".pygit");
        // "**/build" is not a valid single-component pattern under our glob
        // semantics, so it never matches a bare "build" component.
        assert!(!matcher.is_ignored(Path::new("build")));
    }
}
