//! Builder API for a deadpy analysis run.
//!
//! One `Deadpy` value carries the whole run configuration - project root,
//! entry points, depth bound, ignore patterns - and hands explicit values
//! to every component; there is no process-wide configuration state.
//!
//! ```rust,ignore
//! use deadpy_core::prelude::*;
//!
//! let result = Deadpy::new("/path/to/project")
//!     .entry_point("src/main.py")
//!     .with_max_depth(25)
//!     .analyze()?;
//!
//! for file in &result.unused {
//!     println!("unused: {}", file.display());
//! }
//! ```

use std::collections::BTreeSet;
use std::fs;
use std::path::{Path, PathBuf};

use rayon::prelude::*;
use tracing::{info, warn};

use crate::detect::find_unused;
use crate::error::{DeadpyError, DeadpyResult};
use crate::graph::{trace_dependencies, Trace, TraceOptions, DEFAULT_MAX_DEPTH, DEFAULT_NODE_CEILING};
use crate::ignore::GitignoreFilter;
use crate::resolve::ModuleResolver;
use crate::root::find_default_entry_points;
use crate::scan::SourceFileIndex;

/// Builder for configuring an import trace run.
#[derive(Debug, Clone)]
pub struct Deadpy {
    /// Project root to analyze
    root: PathBuf,

    /// Entry point files, absolute or root-relative
    entry_points: Vec<PathBuf>,

    /// Traversal depth bound
    max_depth: usize,

    /// Per-trace expanded-node ceiling
    node_ceiling: usize,

    /// Extra ignore patterns layered over defaults and .gitignore
    ignore_patterns: Vec<String>,

    /// Fall back to conventional entry points when none are given
    use_default_entry_points: bool,
}

impl Deadpy {
    /// Create a new analysis builder for the given project root.
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            entry_points: Vec::new(),
            max_depth: DEFAULT_MAX_DEPTH,
            node_ceiling: DEFAULT_NODE_CEILING,
            ignore_patterns: Vec::new(),
            use_default_entry_points: true,
        }
    }

    /// Add one entry point (absolute or root-relative).
    pub fn entry_point(mut self, entry: impl Into<PathBuf>) -> Self {
        self.entry_points.push(entry.into());
        self
    }

    /// Add several entry points.
    pub fn entry_points(mut self, entries: impl IntoIterator<Item = impl Into<PathBuf>>) -> Self {
        self.entry_points.extend(entries.into_iter().map(Into::into));
        self
    }

    /// Set the traversal depth bound (`1` = entry points only).
    pub fn with_max_depth(mut self, max_depth: usize) -> Self {
        self.max_depth = max_depth;
        self
    }

    /// Set the per-trace expanded-node ceiling.
    pub fn with_node_ceiling(mut self, ceiling: usize) -> Self {
        self.node_ceiling = ceiling;
        self
    }

    /// Add ignore patterns (gitignore syntax).
    pub fn ignore_patterns(
        mut self,
        patterns: impl IntoIterator<Item = impl Into<String>>,
    ) -> Self {
        self.ignore_patterns.extend(patterns.into_iter().map(Into::into));
        self
    }

    /// Enable or disable the conventional entry-point fallback.
    pub fn use_default_entry_points(mut self, enabled: bool) -> Self {
        self.use_default_entry_points = enabled;
        self
    }

    /// Run the analysis and return results.
    pub fn analyze(&self) -> DeadpyResult<AnalysisResult> {
        // 1. Pin down the root; everything else is relative to it
        let root = fs::canonicalize(&self.root).map_err(|e| DeadpyError::io(&self.root, e))?;

        // 2. Build the ignore filter and the source universe
        let filter = GitignoreFilter::with_extra_patterns(&root, &self.ignore_patterns);
        let index = SourceFileIndex::build(&root, |p| filter.is_ignored(p))
            .map_err(|e| DeadpyError::io(&root, std::io::Error::other(e.to_string())))?;

        if index.is_empty() {
            return Err(DeadpyError::nothing_to_analyze(
                &root,
                "no Python files found (after ignore filtering)",
            ));
        }

        // 3. Settle the entry point list
        let requested: Vec<PathBuf> = if self.entry_points.is_empty() {
            if self.use_default_entry_points {
                find_default_entry_points(&index)
            } else {
                Vec::new()
            }
        } else {
            self.entry_points
                .iter()
                .map(|e| if e.is_absolute() { e.clone() } else { root.join(e) })
                .collect()
        };

        let mut entries: Vec<PathBuf> = Vec::with_capacity(requested.len());
        let mut missing_entries: Vec<PathBuf> = Vec::new();
        for entry in requested {
            match fs::canonicalize(&entry) {
                Ok(p) if p.is_file() => entries.push(p),
                _ => {
                    warn!(entry = %entry.display(), "entry point does not exist, skipping");
                    missing_entries.push(entry);
                }
            }
        }
        entries.sort();
        entries.dedup();

        if entries.is_empty() {
            return Err(DeadpyError::nothing_to_analyze(
                &root,
                "no valid entry points",
            ));
        }

        info!(
            root = %root.display(),
            files = index.len(),
            entries = entries.len(),
            max_depth = self.max_depth,
            "starting analysis"
        );

        // 4. Trace each entry point; traces are independent (fresh queue and
        //    visited set each) and share only the read-only index
        let resolver = ModuleResolver::new(&root, &index);
        let options = TraceOptions {
            max_depth: self.max_depth,
            node_ceiling: self.node_ceiling,
        };
        let traces: Vec<Trace> = entries
            .par_iter()
            .map(|entry| trace_dependencies(entry, &index, &resolver, &options))
            .collect::<DeadpyResult<Vec<_>>>()?;

        // 5. Unused = universe minus the union of all reachable sets
        let mut used: BTreeSet<PathBuf> = BTreeSet::new();
        for trace in &traces {
            used.extend(trace.reachable.iter().cloned());
        }
        let unused: Vec<PathBuf> = find_unused(index.files(), &used)
            .into_iter()
            .map(Path::to_path_buf)
            .collect();

        Ok(AnalysisResult {
            root,
            universe: index.files().clone(),
            traces,
            unused,
            missing_entries,
        })
    }
}

/// Result of one analysis run.
#[derive(Debug, Clone)]
pub struct AnalysisResult {
    /// Canonical project root that was analyzed
    pub root: PathBuf,

    /// The full source universe the run saw
    pub universe: BTreeSet<PathBuf>,

    /// One trace per valid entry point
    pub traces: Vec<Trace>,

    /// Files no entry point reaches, sorted
    pub unused: Vec<PathBuf>,

    /// Requested entry points that did not exist
    pub missing_entries: Vec<PathBuf>,
}

impl AnalysisResult {
    /// Union of the per-entry reachable sets.
    pub fn used_files(&self) -> BTreeSet<&Path> {
        self.traces
            .iter()
            .flat_map(|t| t.reachable.iter().map(PathBuf::as_path))
            .collect()
    }

    /// Whether any unused files were found.
    pub fn has_unused(&self) -> bool {
        !self.unused.is_empty()
    }

    /// Share of the universe reached by at least one entry point.
    pub fn usage_rate(&self) -> f64 {
        if self.universe.is_empty() {
            0.0
        } else {
            let used = self.universe.len() - self.unused.len();
            used as f64 / self.universe.len() as f64 * 100.0
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicU64, Ordering};

    static TEST_COUNTER: AtomicU64 = AtomicU64::new(0);

    fn create_temp_project(name: &str) -> PathBuf {
        let id = TEST_COUNTER.fetch_add(1, Ordering::SeqCst);
        let dir = std::env::temp_dir()
            .join("deadpy_builder_test")
            .join(format!("{}_{}_{}", name, std::process::id(), id));
        if dir.exists() {
            fs::remove_dir_all(&dir).ok();
        }
        fs::create_dir_all(&dir).unwrap();
        dir
    }

    fn write_file(path: &Path, content: &str) {
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(path, content).unwrap();
    }

    #[test]
    fn test_builder_basic() {
        let dir = create_temp_project("basic");
        write_file(&dir.join("main.py"), "import used\n");
        write_file(&dir.join("used.py"), "x = 1\n");
        write_file(&dir.join("dead.py"), "y = 2\n");

        let result = Deadpy::new(&dir).entry_point("main.py").analyze().unwrap();

        assert_eq!(result.traces.len(), 1);
        assert_eq!(result.unused.len(), 1);
        assert!(result.unused[0].ends_with("dead.py"));
        assert!(result.has_unused());

        fs::remove_dir_all(&dir).ok();
    }

    #[test]
    fn test_missing_entry_does_not_abort_others() {
        let dir = create_temp_project("missing_entry");
        write_file(&dir.join("main.py"), "x = 1\n");

        let result = Deadpy::new(&dir)
            .entry_points(["main.py", "ghost.py"])
            .analyze()
            .unwrap();

        assert_eq!(result.traces.len(), 1);
        assert_eq!(result.missing_entries.len(), 1);
        assert!(result.missing_entries[0].ends_with("ghost.py"));

        fs::remove_dir_all(&dir).ok();
    }

    #[test]
    fn test_empty_universe_is_fatal() {
        let dir = create_temp_project("empty_universe");
        write_file(&dir.join("README.md"), "no python here");

        let err = Deadpy::new(&dir).analyze().unwrap_err();
        assert!(matches!(err, DeadpyError::NothingToAnalyze { .. }));

        fs::remove_dir_all(&dir).ok();
    }

    #[test]
    fn test_all_entries_invalid_is_fatal() {
        let dir = create_temp_project("no_valid_entries");
        write_file(&dir.join("module.py"), "x = 1\n");

        let err = Deadpy::new(&dir)
            .entry_point("ghost.py")
            .analyze()
            .unwrap_err();
        assert!(matches!(err, DeadpyError::NothingToAnalyze { .. }));

        fs::remove_dir_all(&dir).ok();
    }

    #[test]
    fn test_default_entry_points_used() {
        let dir = create_temp_project("default_entries");
        write_file(&dir.join("app/main.py"), "import app.helper\n");
        write_file(&dir.join("app/helper.py"), "x = 1\n");

        let result = Deadpy::new(&dir).analyze().unwrap();
        assert_eq!(result.traces.len(), 1);
        assert!(result.traces[0].entry.ends_with("app/main.py"));
        assert!(!result.has_unused());

        fs::remove_dir_all(&dir).ok();
    }

    #[test]
    fn test_ignore_patterns_shrink_universe() {
        let dir = create_temp_project("ignores");
        write_file(&dir.join("main.py"), "x = 1\n");
        write_file(&dir.join("scratch/tmp.py"), "y = 2\n");

        let result = Deadpy::new(&dir)
            .entry_point("main.py")
            .ignore_patterns(["scratch/"])
            .analyze()
            .unwrap();

        assert_eq!(result.universe.len(), 1);
        assert!(!result.has_unused());

        fs::remove_dir_all(&dir).ok();
    }

    #[test]
    fn test_multiple_entry_union() {
        let dir = create_temp_project("multi_entry");
        write_file(&dir.join("one.py"), "import shared_a\n");
        write_file(&dir.join("two.py"), "import shared_b\n");
        write_file(&dir.join("shared_a.py"), "x = 1\n");
        write_file(&dir.join("shared_b.py"), "y = 2\n");
        write_file(&dir.join("orphan.py"), "z = 3\n");

        let result = Deadpy::new(&dir)
            .entry_points(["one.py", "two.py"])
            .analyze()
            .unwrap();

        assert_eq!(result.traces.len(), 2);
        assert_eq!(result.unused.len(), 1);
        assert!(result.unused[0].ends_with("orphan.py"));
        assert!((result.usage_rate() - 80.0).abs() < 0.01);

        fs::remove_dir_all(&dir).ok();
    }
}
