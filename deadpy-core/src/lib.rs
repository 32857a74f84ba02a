//! deadpy-core: import dependency tracing and unused-file detection for
//! Python projects.
//!
//! Starting from one or more entry point files, deadpy discovers every
//! project file reachable through module imports, builds a depth-bounded
//! dependency graph, and derives the complement set of files no entry
//! point ever reaches.
//!
//! # Quick Start
//!
//! Use the [`prelude`] module for convenient imports:
//!
//! ```rust,ignore
//! use deadpy_core::prelude::*;
//!
//! let result = Deadpy::new("/path/to/project")
//!     .entry_point("src/main.py")
//!     .analyze()?;
//!
//! for file in &result.unused {
//!     println!("unused: {}", file.display());
//! }
//! ```
//!
//! # Module Organization
//!
//! - [`scan`]: source file discovery with directory pruning
//! - [`ignore`]: gitignore-backed ignore filter
//! - [`parse`]: import statement extraction
//! - [`resolve`]: symbolic reference to file resolution
//! - [`graph`]: dependency graph construction via depth-bounded BFS
//! - [`detect`]: unused file detection
//! - [`report`]: tree/text/JSON report rendering
//! - [`visualize`]: Graphviz DOT output
//! - [`root`]: default entry-point discovery
//! - [`builder`]: fluent run configuration API
//! - [`config`]: deadpy.toml loading
//! - [`error`]: typed error handling
//! - [`logging`]: tracing subscriber setup

pub mod builder;
pub mod config;
pub mod detect;
pub mod error;
pub mod graph;
pub mod ignore;
pub mod logging;
pub mod parse;
pub mod prelude;
pub mod report;
pub mod resolve;
pub mod root;
pub mod scan;
pub mod visualize;

// ============================================================================
// Explicit Re-exports (avoiding glob imports for clear API surface)
// ============================================================================

// Error types
pub use error::{DeadpyError, DeadpyResult, IoResultExt};

// Builder API
pub use builder::{AnalysisResult, Deadpy};

// Configuration
pub use config::{load_config, DeadpyConfig, OutputConfig, OutputFormat};

// Unused detection
pub use detect::find_unused;

// Graph building
pub use graph::{
    trace_dependencies, DependencyGraph, Trace, TraceOptions, TraceWarning,
    DEFAULT_MAX_DEPTH, DEFAULT_NODE_CEILING,
};

// Ignore filtering
pub use ignore::GitignoreFilter;

// Logging
pub use logging::init_logging;

// Parsing
pub use parse::{extract_file, extract_imports, Extraction, ImportRef};

// Reporting
pub use report::{
    graph_to_export, relative_display, render_dependency_report, render_tree,
    render_unused_list, render_unused_report, GraphEdge, GraphExport, GraphNode,
};

// Resolution
pub use resolve::{ModuleResolver, PACKAGE_MARKER};

// Entry point discovery
pub use root::find_default_entry_points;

// File scanning
pub use scan::{SourceFileIndex, PY_EXTENSION};

// Visualization
pub use visualize::generate_dot;
