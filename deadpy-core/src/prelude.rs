//! Prelude module for convenient imports.
//!
//! Import commonly used types with a single line:
//!
//! ```rust,ignore
//! use deadpy_core::prelude::*;
//! ```

// Core analysis types
pub use crate::error::{DeadpyError, DeadpyResult};
pub use crate::parse::{Extraction, ImportRef};

// Universe and resolution
pub use crate::resolve::ModuleResolver;
pub use crate::scan::SourceFileIndex;

// Graph building and traversal
pub use crate::graph::{trace_dependencies, DependencyGraph, Trace, TraceOptions};

// Unused file detection
pub use crate::detect::find_unused;

// Ignore filtering
pub use crate::ignore::GitignoreFilter;

// Entry point discovery
pub use crate::root::find_default_entry_points;

// Configuration
pub use crate::config::{load_config, DeadpyConfig, OutputFormat};

// Builder API
pub use crate::builder::{AnalysisResult, Deadpy};
