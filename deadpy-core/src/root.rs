//! Default entry-point discovery.
//!
//! When the caller names no entry points, traces start from files matching
//! the conventional application roots of Python projects:
//!
//! - `*/visualization/app.py`
//! - `*/main.py` (any `main.py` below the project root)
//! - `*cli.py` (any file whose name ends in `cli.py`)

use crate::scan::SourceFileIndex;
use std::path::{Path, PathBuf};

/// Finds default entry points in the built index.
///
/// Returns matches in the index's sorted order; an empty result means the
/// project has no recognizable application root and the caller must name
/// entry points explicitly.
pub fn find_default_entry_points(index: &SourceFileIndex) -> Vec<PathBuf> {
    index
        .files()
        .iter()
        .filter(|path| is_default_entry_point(path))
        .cloned()
        .collect()
}

fn is_default_entry_point(path: &Path) -> bool {
    let Some(name) = path.file_name().and_then(|n| n.to_str()) else {
        return false;
    };

    if name == "app.py" {
        return path
            .parent()
            .and_then(|p| p.file_name())
            .is_some_and(|dir| dir == "visualization");
    }

    name == "main.py" || name.ends_with("cli.py")
}
