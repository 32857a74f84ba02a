//! deadpy CLI - import dependency tracer and unused-file finder for
//! Python projects.
//!
//! Two modes:
//! - default: trace one entry point and print its dependency tree
//! - `--unused`: trace every entry point and report the files none reaches
//!
//! Output is plain text, `--json` (visualizer document in trace mode,
//! summary in unused mode) or `--dot` (Graphviz).

use anyhow::{anyhow, Context, Result};
use clap::Parser;
use std::fs;
use std::path::{Path, PathBuf};

use deadpy_core::{
    generate_dot, graph_to_export, init_logging, load_config, relative_display,
    render_dependency_report, render_unused_list, render_unused_report, AnalysisResult, Deadpy,
    OutputFormat, DEFAULT_MAX_DEPTH,
};

#[derive(Parser, Debug)]
#[command(
    author,
    version,
    about = "Trace Python imports and find unused files"
)]
pub struct Cli {
    /// Path to the project root
    #[arg(default_value = ".")]
    path: String,

    /// Entry point files (absolute or root-relative); conventional entry
    /// points are discovered when omitted
    #[arg(short, long, num_args = 1..)]
    entry: Vec<String>,

    /// Find unused files across all entry points instead of printing one
    /// dependency tree
    #[arg(long)]
    unused: bool,

    /// Maximum traversal depth (1 = entry points only)
    #[arg(long, default_value_t = DEFAULT_MAX_DEPTH)]
    max_depth: usize,

    /// Extra ignore patterns (gitignore syntax)
    #[arg(long, num_args = 1..)]
    ignore: Vec<String>,

    /// Output results in JSON format
    #[arg(long)]
    json: bool,

    /// Output the dependency graph in Graphviz DOT format
    #[arg(long)]
    dot: bool,

    /// Write DOT output to a file instead of stdout
    #[arg(long)]
    dot_file: Option<String>,

    /// Write the unused-file list to a file
    #[arg(long)]
    list_file: Option<String>,
}

/// Validates output file paths before writing.
///
/// Rejects absolute paths, parent-directory traversal and NUL bytes, so a
/// generated report can only land below the current directory.
fn validate_output_path(path: &str) -> Result<PathBuf> {
    if path.contains('\0') {
        return Err(anyhow!("Output path contains NUL bytes"));
    }

    let p = PathBuf::from(path);

    if p.is_absolute() {
        return Err(anyhow!(
            "Output path must be relative, not absolute: {}",
            path
        ));
    }

    if p.components()
        .any(|c| matches!(c, std::path::Component::ParentDir))
    {
        return Err(anyhow!(
            "Path traversal (..) not allowed in output paths: {}",
            path
        ));
    }

    Ok(p)
}

/// Resolves the effective output format from flags and config.
fn output_format(cli: &Cli, configured: Option<OutputFormat>) -> OutputFormat {
    if cli.json {
        OutputFormat::Json
    } else if cli.dot || cli.dot_file.is_some() {
        OutputFormat::Dot
    } else {
        configured.unwrap_or(OutputFormat::Plain)
    }
}

fn write_dot(cli: &Cli, dot: &str) -> Result<()> {
    if let Some(ref file) = cli.dot_file {
        let safe_path =
            validate_output_path(file).with_context(|| format!("Invalid output path: {file}"))?;
        fs::write(&safe_path, dot)
            .with_context(|| format!("Failed to write DOT graph to {}", safe_path.display()))?;
        eprintln!("DOT graph saved to: {}", safe_path.display());
    } else {
        println!("{dot}");
    }
    Ok(())
}

fn run_trace_mode(cli: &Cli, result: &AnalysisResult, format: OutputFormat) -> Result<()> {
    let trace = result
        .traces
        .first()
        .ok_or_else(|| anyhow!("no trace produced"))?;

    match format {
        OutputFormat::Json => {
            let export = graph_to_export(trace, &result.root);
            println!("{}", serde_json::to_string_pretty(&export)?);
        }
        OutputFormat::Dot => {
            write_dot(cli, &generate_dot(trace, &result.root))?;
        }
        OutputFormat::Plain => {
            print!("{}", render_dependency_report(trace, &result.root));
        }
    }
    Ok(())
}

fn run_unused_mode(cli: &Cli, result: &AnalysisResult, format: OutputFormat) -> Result<()> {
    let unused: Vec<&Path> = result.unused.iter().map(PathBuf::as_path).collect();

    match format {
        OutputFormat::Json => {
            let json = serde_json::json!({
                "root": result.root.display().to_string(),
                "totalFiles": result.universe.len(),
                "entryPoints": result
                    .traces
                    .iter()
                    .map(|t| relative_display(&t.entry, &result.root))
                    .collect::<Vec<_>>(),
                "usedFiles": result.universe.len() - result.unused.len(),
                "unusedFiles": unused
                    .iter()
                    .map(|p| relative_display(p, &result.root))
                    .collect::<Vec<_>>(),
            });
            println!("{}", serde_json::to_string_pretty(&json)?);
        }
        OutputFormat::Dot => {
            // No single graph covers the unused analysis; emit one DOT
            // document per entry point. --dot-file is ignored here.
            for trace in &result.traces {
                println!(
                    "// === entry point: {} ===",
                    relative_display(&trace.entry, &result.root)
                );
                println!("{}", generate_dot(trace, &result.root));
            }
        }
        OutputFormat::Plain => {
            print!(
                "{}",
                render_unused_report(&result.root, &result.universe, &result.traces, &unused)
            );
        }
    }

    if let Some(ref file) = cli.list_file {
        let safe_path =
            validate_output_path(file).with_context(|| format!("Invalid output path: {file}"))?;
        fs::write(&safe_path, render_unused_list(&result.root, &unused))
            .with_context(|| format!("Failed to write unused list to {}", safe_path.display()))?;
        eprintln!("Unused file list saved to: {}", safe_path.display());
    }

    Ok(())
}

fn main() -> Result<()> {
    // Structured logging to stderr, honors RUST_LOG
    init_logging();

    let cli = Cli::parse();

    let root = Path::new(&cli.path)
        .canonicalize()
        .with_context(|| format!("Failed to canonicalize path: {}", cli.path))?;

    // Fold file config under the command line (flags win)
    let mut ignore = cli.ignore.clone();
    let mut entries = cli.entry.clone();
    let mut max_depth = cli.max_depth;
    let mut configured_format = None;
    match load_config(&root) {
        Ok(Some(cfg)) => {
            if let Some(list) = cfg.ignore {
                ignore.extend(list);
            }
            if entries.is_empty() {
                if let Some(list) = cfg.entry_points {
                    entries = list;
                }
            }
            if cli.max_depth == DEFAULT_MAX_DEPTH {
                if let Some(depth) = cfg.max_depth {
                    max_depth = depth;
                }
            }
            configured_format = cfg.output.and_then(|o| o.format);
        }
        Ok(None) => {}
        Err(e) => {
            eprintln!("[WARN] config load failed: {e}");
        }
    }

    if max_depth == 0 {
        return Err(anyhow!("--max-depth must be at least 1"));
    }

    if !cli.unused && entries.len() > 1 {
        return Err(anyhow!(
            "dependency mode traces a single entry point; pass --unused for multi-entry analysis"
        ));
    }

    let result = Deadpy::new(&root)
        .entry_points(entries)
        .with_max_depth(max_depth)
        .ignore_patterns(ignore)
        .analyze()?;

    for missing in &result.missing_entries {
        eprintln!("[WARN] entry point not found: {}", missing.display());
    }

    let format = output_format(&cli, configured_format);

    if cli.unused {
        run_unused_mode(&cli, &result, format)?;
        // CI-friendly: unused files fail the run
        std::process::exit(if result.has_unused() { 1 } else { 0 });
    }

    run_trace_mode(&cli, &result, format)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_output_path_relative_ok() {
        assert!(validate_output_path("graph.dot").is_ok());
        assert!(validate_output_path("out/graph.dot").is_ok());
    }

    #[test]
    fn test_validate_output_path_rejects_absolute() {
        assert!(validate_output_path("/etc/passwd").is_err());
    }

    #[test]
    fn test_validate_output_path_rejects_traversal() {
        assert!(validate_output_path("../escape.dot").is_err());
        assert!(validate_output_path("out/../../escape.dot").is_err());
    }

    #[test]
    fn test_validate_output_path_rejects_nul() {
        assert!(validate_output_path("bad\0name.dot").is_err());
    }

    #[test]
    fn test_output_format_precedence() {
        let cli = Cli::parse_from(["deadpy", ".", "--json", "--dot"]);
        assert_eq!(output_format(&cli, None), OutputFormat::Json);

        let cli = Cli::parse_from(["deadpy", ".", "--dot"]);
        assert_eq!(output_format(&cli, Some(OutputFormat::Json)), OutputFormat::Dot);

        let cli = Cli::parse_from(["deadpy", "."]);
        assert_eq!(output_format(&cli, Some(OutputFormat::Json)), OutputFormat::Json);
        assert_eq!(output_format(&cli, None), OutputFormat::Plain);
    }

    #[test]
    fn test_cli_parses_entries_and_depth() {
        let cli = Cli::parse_from([
            "deadpy",
            "proj",
            "--entry",
            "main.py",
            "app.py",
            "--unused",
            "--max-depth",
            "5",
        ]);
        assert_eq!(cli.path, "proj");
        assert_eq!(cli.entry, vec!["main.py", "app.py"]);
        assert!(cli.unused);
        assert_eq!(cli.max_depth, 5);
    }
}
