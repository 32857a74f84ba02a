//! Configuration loading from deadpy.toml.

use anyhow::{Context, Result};
use serde::Deserialize;
use std::{fmt, fs, path::Path, str::FromStr};

/// Main configuration structure for deadpy.toml.
#[derive(Debug, Deserialize, Default)]
pub struct DeadpyConfig {
    /// Extra ignore patterns (gitignore syntax), applied on top of the
    /// defaults and the project's .gitignore.
    pub ignore: Option<Vec<String>>,
    /// Entry point files (root-relative) used when none are given on the
    /// command line.
    pub entry_points: Option<Vec<String>>,
    /// Maximum traversal depth.
    pub max_depth: Option<usize>,
    /// Ceiling on the number of files expanded per trace.
    pub node_ceiling: Option<usize>,
    /// Output configuration.
    pub output: Option<OutputConfig>,
}

/// Output format configuration.
#[derive(Debug, Deserialize, Default)]
pub struct OutputConfig {
    /// Output format: "plain", "json" or "dot".
    pub format: Option<OutputFormat>,
}

/// The closed set of output formats a run can produce.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    /// Human-readable text report
    #[default]
    Plain,
    /// Machine-readable JSON document
    Json,
    /// Graphviz DOT graph description
    Dot,
}

impl OutputFormat {
    /// All variants, in display order.
    pub const fn variants() -> &'static [OutputFormat] {
        &[Self::Plain, Self::Json, Self::Dot]
    }

    /// The canonical lowercase name of this variant.
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Plain => "plain",
            Self::Json => "json",
            Self::Dot => "dot",
        }
    }
}

impl fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for OutputFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        OutputFormat::variants()
            .iter()
            .copied()
            .find(|v| v.as_str() == s)
            .ok_or_else(|| format!("unknown output format: {s}"))
    }
}

/// Loads configuration from deadpy.toml if it exists.
pub fn load_config(root: &Path) -> Result<Option<DeadpyConfig>> {
    let path = root.join("deadpy.toml");
    if !path.exists() {
        return Ok(None);
    }

    let content = fs::read_to_string(&path)?;
    let cfg = toml::from_str(&content).context("Invalid deadpy.toml")?;
    Ok(Some(cfg))
}
