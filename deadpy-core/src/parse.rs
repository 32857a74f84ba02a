//! Import statement extraction from Python source text.
//!
//! Fully deterministic, error-resilient scanning of the import grammar.
//! The scanner works on logical lines: triple-quoted string blocks are
//! skipped (docstrings often quote import statements), trailing comments
//! are stripped, and statements continued with backslashes or open
//! parentheses are joined before parsing.
//!
//! Extraction is reference-level only:
//! - `import a.b.c` yields the full dotted reference `a.b.c`
//! - `from a.b import c, d` yields the parent reference `a.b`
//! - `from ..pkg import mod` yields the parent `pkg` at level 2 *and* a
//!   probe reference `pkg.mod` per member
//! - `from . import foo, bar` yields one probe reference per member
//!
//! Member names of relative imports are probed as candidate submodules
//! downstream; a member that is really a symbol resolves to no file and
//! drops out, while a sibling file that merely shares the name becomes an
//! edge. The resolver makes no symbol/submodule distinction.

use anyhow::{bail, Result};
use std::fs;
use std::path::{Path, PathBuf};

/// Maximum file size to scan (10 MB).
/// Files larger than this are skipped to prevent memory issues.
const MAX_FILE_SIZE: usize = 10_000_000;

/// A single symbolic module reference extracted from one import statement.
///
/// Transient: produced here, consumed by the resolver within the same
/// traversal step.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ImportRef {
    /// Dotted module path. May be empty only for relative references
    /// (e.g. the parent side of `from . import x` before member joining).
    pub module: String,
    /// Number of leading dots for relative imports; 0 for absolute.
    pub level: usize,
}

impl ImportRef {
    /// An absolute reference (`import a.b`, `from a.b import c`).
    pub fn absolute(module: impl Into<String>) -> Self {
        Self {
            module: module.into(),
            level: 0,
        }
    }

    /// A relative reference with `level` leading dots.
    pub fn relative(level: usize, module: impl Into<String>) -> Self {
        Self {
            module: module.into(),
            level,
        }
    }

    /// Whether this reference is relative to the originating file's package.
    pub fn is_relative(&self) -> bool {
        self.level > 0
    }
}

/// Result of extracting one file - soft-failure unit for the traversal.
#[derive(Debug)]
pub enum Extraction {
    /// References successfully extracted
    Parsed(Vec<ImportRef>),
    /// File skipped (I/O failure, oversized, or malformed import grammar)
    Skipped(PathBuf, String),
}

/// Extracts import references from one file, failing soft.
///
/// A file that cannot be read or parsed contributes zero references and a
/// reason; the caller records the warning and continues.
pub fn extract_file(path: &Path) -> Extraction {
    let content = match fs::read_to_string(path) {
        Ok(c) => c,
        Err(e) => return Extraction::Skipped(path.to_path_buf(), format!("I/O error: {e}")),
    };

    if content.len() > MAX_FILE_SIZE {
        return Extraction::Skipped(
            path.to_path_buf(),
            format!("File too large ({} bytes, max {})", content.len(), MAX_FILE_SIZE),
        );
    }

    match extract_imports(&content) {
        Ok(refs) => Extraction::Parsed(refs),
        Err(e) => Extraction::Skipped(path.to_path_buf(), format!("import syntax error: {e}")),
    }
}

/// Extracts all import references from source text.
///
/// Only `import` and `from` statements are inspected; anything else is
/// passed over without judgement. A malformed import statement fails the
/// whole file (mirroring an AST parser's behavior), so the caller can fall
/// back to treating it as a leaf.
pub fn extract_imports(content: &str) -> Result<Vec<ImportRef>> {
    let mut refs = Vec::new();

    for line in logical_lines(content) {
        let line = line.trim();
        if let Some(rest) = keyword_rest(line, "import") {
            parse_plain_import(rest, &mut refs)?;
        } else if let Some(rest) = keyword_rest(line, "from") {
            parse_from_import(rest, &mut refs)?;
        }
    }

    Ok(refs)
}

/// Returns the remainder after a leading keyword, or None if the line does
/// not start with that keyword followed by whitespace.
fn keyword_rest<'a>(line: &'a str, keyword: &str) -> Option<&'a str> {
    let rest = line.strip_prefix(keyword)?;
    if rest.starts_with(char::is_whitespace) {
        Some(rest.trim_start())
    } else {
        None
    }
}

/// Parses `import a.b.c, d.e as x` - one absolute reference per item.
fn parse_plain_import(rest: &str, refs: &mut Vec<ImportRef>) -> Result<()> {
    for item in rest.split(',') {
        let name = strip_alias(item);
        if name.is_empty() {
            bail!("empty import target");
        }
        if !is_dotted_identifier(name) {
            bail!("invalid module path: {name}");
        }
        refs.push(ImportRef::absolute(name));
    }
    Ok(())
}

/// Parses `from <dots><path> import <members>`.
fn parse_from_import(rest: &str, refs: &mut Vec<ImportRef>) -> Result<()> {
    let Some((source, members)) = split_once_word(rest, "import") else {
        bail!("from-import without import clause");
    };

    let source = source.trim();
    let level = source.chars().take_while(|&c| c == '.').count();
    let suffix = &source[level..];

    if level == 0 && suffix.is_empty() {
        bail!("from-import without module");
    }
    if !suffix.is_empty() && !is_dotted_identifier(suffix) {
        bail!("invalid module path: {suffix}");
    }

    if level == 0 {
        // Absolute from-import: the parent module reference is sufficient;
        // members resolve as symbols of it, never as separate files.
        refs.push(ImportRef::absolute(suffix));
        return Ok(());
    }

    // Relative from-import: the parent package (when named) plus one probe
    // reference per member, each a candidate sibling/child module.
    if !suffix.is_empty() {
        refs.push(ImportRef::relative(level, suffix));
    }
    for member in members.replace(['(', ')'], " ").split(',') {
        let name = strip_alias(member);
        if name.is_empty() || name == "*" {
            continue;
        }
        if !is_identifier(name) {
            bail!("invalid imported name: {name}");
        }
        let probe = if suffix.is_empty() {
            name.to_string()
        } else {
            format!("{suffix}.{name}")
        };
        refs.push(ImportRef::relative(level, probe));
    }

    Ok(())
}

/// Strips an `as alias` clause and surrounding whitespace from one
/// import item.
fn strip_alias(item: &str) -> &str {
    let item = item.trim();
    match split_once_word(item, "as") {
        Some((name, _)) => name.trim(),
        None => item,
    }
}

/// Splits on a whitespace-delimited keyword occurrence.
///
/// Unlike `str::split_once`, the keyword must stand alone: `frontend` does
/// not contain the word `end`.
fn split_once_word<'a>(text: &'a str, word: &str) -> Option<(&'a str, &'a str)> {
    let mut start = 0;
    while let Some(pos) = text[start..].find(word) {
        let at = start + pos;
        let before_ok = at == 0
            || text[..at]
                .chars()
                .next_back()
                .is_some_and(char::is_whitespace);
        let after = at + word.len();
        let after_ok = after == text.len()
            || text[after..].chars().next().is_some_and(char::is_whitespace);
        if before_ok && after_ok {
            return Some((&text[..at], text[after..].trim_start()));
        }
        start = after;
    }
    None
}

fn is_identifier(s: &str) -> bool {
    let mut chars = s.chars();
    match chars.next() {
        Some(c) if c.is_alphabetic() || c == '_' => {}
        _ => return false,
    }
    chars.all(|c| c.is_alphanumeric() || c == '_')
}

fn is_dotted_identifier(s: &str) -> bool {
    !s.is_empty() && s.split('.').all(is_identifier)
}

/// Joins physical lines into logical statements.
///
/// Handles three Python line-structure rules that matter for imports:
/// triple-quoted blocks (skipped entirely), `#` comments (stripped when not
/// inside a string literal), and continuation via trailing backslash or an
/// unbalanced open parenthesis.
fn logical_lines(content: &str) -> Vec<String> {
    let mut out = Vec::new();
    let mut pending = String::new();
    let mut open_parens: i32 = 0;
    let mut in_triple: Option<&'static str> = None;

    for raw in content.lines() {
        if let Some(delim) = in_triple {
            if count_occurrences(raw, delim) % 2 == 1 {
                in_triple = None;
            }
            continue;
        }

        let line = strip_comment(raw);

        // A line that opens (and does not close) a triple-quoted string
        // starts a block we skip wholesale.
        for delim in ["\"\"\"", "'''"] {
            if count_occurrences(line, delim) % 2 == 1 {
                in_triple = Some(delim);
                break;
            }
        }
        if in_triple.is_some() {
            pending.clear();
            open_parens = 0;
            continue;
        }

        let trimmed = line.trim();

        if pending.is_empty()
            && keyword_rest(trimmed, "import").is_none()
            && keyword_rest(trimmed, "from").is_none()
        {
            continue;
        }

        open_parens += paren_balance(line);
        let continued = line.trim_end().ends_with('\\');
        let fragment = line.trim_end().trim_end_matches('\\');

        if !pending.is_empty() {
            pending.push(' ');
        }
        pending.push_str(fragment.trim());

        if continued || open_parens > 0 {
            continue;
        }

        out.push(std::mem::take(&mut pending));
        open_parens = 0;
    }

    if !pending.is_empty() {
        out.push(pending);
    }

    out
}

fn count_occurrences(line: &str, pattern: &str) -> usize {
    line.matches(pattern).count()
}

/// Removes a trailing `#` comment, ignoring `#` inside quoted strings.
fn strip_comment(line: &str) -> &str {
    let mut quote: Option<char> = None;
    for (i, c) in line.char_indices() {
        match quote {
            Some(q) => {
                if c == q {
                    quote = None;
                }
            }
            None => match c {
                '\'' | '"' => quote = Some(c),
                '#' => return &line[..i],
                _ => {}
            },
        }
    }
    line
}

/// Net parenthesis balance of a line, ignoring parens inside strings.
fn paren_balance(line: &str) -> i32 {
    let mut balance = 0;
    let mut quote: Option<char> = None;
    for c in line.chars() {
        match quote {
            Some(q) => {
                if c == q {
                    quote = None;
                }
            }
            None => match c {
                '\'' | '"' => quote = Some(c),
                '(' => balance += 1,
                ')' => balance -= 1,
                _ => {}
            },
        }
    }
    balance
}
