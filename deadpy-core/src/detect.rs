//! Unused file detection logic.

use std::collections::BTreeSet;
use std::path::{Path, PathBuf};

/// Files present in the universe but reached by no entry point.
///
/// `used` is the union of the per-entry reachable sets; the result keeps
/// the universe's sorted order.
pub fn find_unused<'a>(
    universe: &'a BTreeSet<PathBuf>,
    used: &BTreeSet<PathBuf>,
) -> Vec<&'a Path> {
    universe
        .iter()
        .filter(|file| !used.contains(*file))
        .map(PathBuf::as_path)
        .collect()
}
