//! Gitignore-backed ignore filter.
//!
//! Implements the ignore-predicate collaborator consulted by the source file
//! index before directory descent and file inclusion. Patterns come from
//! three layers: a built-in set of always-ignored names, the project's
//! `.gitignore`, and caller-supplied extra patterns. Each pattern is
//! compiled once into a [`regex::Regex`] and matched against root-relative
//! paths and every ancestor directory of the queried path.
//!
//! Negation patterns (`!pattern`) are not supported and are skipped.

use regex::Regex;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

/// Patterns that are always ignored regardless of .gitignore contents.
const DEFAULT_PATTERNS: &[&str] = &[
    "__pycache__/",
    "*.pyc",
    "*.pyo",
    "*.pyd",
    ".Python",
    "env/",
    "venv/",
    ".venv/",
    ".env",
    ".git/",
    ".pytest_cache/",
    ".mypy_cache/",
    ".tox/",
    "build/",
    "dist/",
    "*.egg-info/",
    "node_modules/",
];

/// Filter deciding whether a path under the project root is ignored.
#[derive(Debug)]
pub struct GitignoreFilter {
    root: PathBuf,
    patterns: Vec<Regex>,
}

impl GitignoreFilter {
    /// Builds a filter for `root` from the default patterns and the
    /// project's `.gitignore`, if present.
    pub fn new(root: &Path) -> Self {
        Self::with_extra_patterns::<&str>(root, &[])
    }

    /// Builds a filter with additional caller-supplied patterns
    /// (gitignore syntax) layered on top of defaults and `.gitignore`.
    pub fn with_extra_patterns<S: AsRef<str>>(root: &Path, extra: &[S]) -> Self {
        let mut filter = Self {
            root: root.to_path_buf(),
            patterns: Vec::with_capacity(DEFAULT_PATTERNS.len() + extra.len()),
        };

        for pattern in DEFAULT_PATTERNS {
            filter.add_pattern(pattern);
        }
        filter.load_gitignore();
        for pattern in extra {
            filter.add_pattern(pattern.as_ref());
        }

        filter
    }

    /// Checks if a path (file or directory) should be ignored.
    ///
    /// Paths outside the project root are never ignored here; the resolver
    /// and index apply their own inside-root constraint.
    pub fn is_ignored(&self, path: &Path) -> bool {
        let Ok(relative) = path.strip_prefix(&self.root) else {
            return false;
        };

        // The path itself, then every ancestor directory: a pattern like
        // `build/` must also exclude `build/lib/pkg.py`.
        let mut current = Some(relative);
        while let Some(rel) = current {
            if rel.as_os_str().is_empty() {
                break;
            }
            let rel_str = to_slash_string(rel);
            if self.patterns.iter().any(|p| p.is_match(&rel_str)) {
                return true;
            }
            current = rel.parent();
        }

        false
    }

    /// Compiles and stores one gitignore pattern; invalid patterns are
    /// logged and skipped.
    fn add_pattern(&mut self, pattern: &str) {
        match gitignore_to_regex(pattern) {
            Ok(re) => {
                debug!(pattern = %pattern, regex = %re.as_str(), "ignore pattern added");
                self.patterns.push(re);
            }
            Err(e) => warn!(pattern = %pattern, error = %e, "skipping unusable ignore pattern"),
        }
    }

    /// Loads patterns from the project's `.gitignore`, skipping blank
    /// lines, comments and negation patterns.
    fn load_gitignore(&mut self) {
        let path = self.root.join(".gitignore");
        if !path.exists() {
            return;
        }

        let content = match fs::read_to_string(&path) {
            Ok(c) => c,
            Err(e) => {
                warn!(path = %path.display(), error = %e, "could not read .gitignore");
                return;
            }
        };

        for line in content.lines() {
            let line = line.trim();
            if line.is_empty() || line.starts_with('#') || line.starts_with('!') {
                continue;
            }
            self.add_pattern(line);
        }
    }
}

/// Converts a gitignore-style pattern into an anchored regex over
/// root-relative, slash-separated paths.
///
/// `**` matches across directory separators, `*` within one component,
/// `?` a single character. A trailing `/` marks a directory pattern that
/// also matches everything beneath it; a leading `/` anchors the pattern
/// to the project root.
fn gitignore_to_regex(pattern: &str) -> Result<Regex, regex::Error> {
    let is_directory = pattern.ends_with('/');
    let pattern = pattern.trim_end_matches('/');
    let anchored = pattern.starts_with('/');
    let body = pattern.trim_start_matches('/');

    let mut escaped = String::with_capacity(body.len() + 8);
    let mut chars = body.chars().peekable();
    while let Some(c) = chars.next() {
        match c {
            '*' => {
                if chars.peek() == Some(&'*') {
                    chars.next();
                    escaped.push_str(".*");
                } else {
                    escaped.push_str("[^/]*");
                }
            }
            '?' => escaped.push('.'),
            c if r"\.+()[]{}^$|".contains(c) => {
                escaped.push('\\');
                escaped.push(c);
            }
            c => escaped.push(c),
        }
    }

    let suffix = if is_directory { "(/.*)?$" } else { "$" };
    let full = if anchored {
        format!("^{escaped}{suffix}")
    } else {
        format!("(^|.*/){escaped}{suffix}")
    };

    Regex::new(&full)
}

/// Renders a relative path with forward slashes for pattern matching,
/// regardless of the host platform's separator.
fn to_slash_string(path: &Path) -> String {
    path.to_string_lossy().replace('\\', "/")
}
