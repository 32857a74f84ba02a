//! Source file discovery with efficient directory pruning.
//!
//! Builds the universe of candidate Python files once per run. The ignore
//! predicate is consulted *before* descending into a subdirectory, so an
//! ignored directory's contents are never visited (`WalkDir::filter_entry`
//! gives O(1) subtree skipping), and again for each remaining file.

use anyhow::{Context, Result};
use std::collections::BTreeSet;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::debug;
use walkdir::WalkDir;

/// File extension that marks a file as Python source.
pub const PY_EXTENSION: &str = "py";

/// The set of all candidate source files under a project root.
///
/// Paths are canonicalized, so two spellings of the same file collapse to
/// one identity; this is the basis for traversal deduplication. The index
/// is immutable once built and shared read-only by every trace.
#[derive(Debug, Clone)]
pub struct SourceFileIndex {
    root: PathBuf,
    files: BTreeSet<PathBuf>,
}

impl SourceFileIndex {
    /// Walks the tree rooted at `root` and collects every non-ignored
    /// Python file.
    ///
    /// `is_ignored` is the collaborator contract from the filter layer:
    /// a plain `(path) -> bool` consulted for directories (pruning the
    /// whole subtree on `true`) and for individual files.
    pub fn build<F>(root: &Path, is_ignored: F) -> Result<Self>
    where
        F: Fn(&Path) -> bool,
    {
        let mut files = BTreeSet::new();

        let walker = WalkDir::new(root).into_iter().filter_entry(|e| {
            // Never prune the root itself; prune any ignored directory
            // before its contents are generated.
            e.depth() == 0 || !(e.file_type().is_dir() && is_ignored(e.path()))
        });

        for entry in walker {
            let entry =
                entry.with_context(|| format!("Failed to walk {}", root.display()))?;
            let path = entry.path();
            if !entry.file_type().is_file() {
                continue;
            }
            if !path.extension().is_some_and(|ext| ext == PY_EXTENSION) {
                continue;
            }
            if is_ignored(path) {
                continue;
            }
            let canonical = fs::canonicalize(path)
                .with_context(|| format!("Failed to canonicalize {}", path.display()))?;
            files.insert(canonical);
        }

        debug!(root = %root.display(), files = files.len(), "source index built");

        Ok(Self {
            root: root.to_path_buf(),
            files,
        })
    }

    /// The project root this index was built for.
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Whether a (canonical) path belongs to the universe.
    pub fn contains(&self, path: &Path) -> bool {
        self.files.contains(path)
    }

    /// All files in the universe, in sorted order.
    pub fn files(&self) -> &BTreeSet<PathBuf> {
        &self.files
    }

    /// Number of files in the universe.
    pub fn len(&self) -> usize {
        self.files.len()
    }

    /// True when no source files were found.
    pub fn is_empty(&self) -> bool {
        self.files.is_empty()
    }
}
