//! Report rendering - dependency trees, unused-file summaries, and the
//! machine-readable JSON document.
//!
//! The tree walk is iterative with an explicit frame stack; the ancestor
//! set travels with each frame, so cycle detection is sensitive to the
//! *current path* only. A file reached along two non-cyclic branches is
//! rendered fully both times; only a file that is its own ancestor gets the
//! circular-dependency marker instead of another expansion.

use crate::graph::Trace;
use serde::Serialize;
use std::collections::{BTreeMap, BTreeSet};
use std::fmt::Write as _;
use std::path::{Path, PathBuf};

/// Renders a path relative to the project root with forward slashes,
/// falling back to the full path for out-of-root files.
pub fn relative_display(path: &Path, root: &Path) -> String {
    let shown = path.strip_prefix(root).unwrap_or(path);
    shown.to_string_lossy().replace('\\', "/")
}

/// One frame of the iterative tree walk.
struct TreeFrame {
    file: PathBuf,
    prefix: String,
    is_last: bool,
    ancestors: Vec<PathBuf>,
}

/// Renders the dependency tree of a trace as indented ASCII lines.
///
/// Pre-order walk from the entry point; children are sorted by their
/// root-relative display path for stable output.
pub fn render_tree(trace: &Trace, root: &Path) -> Vec<String> {
    let mut lines = vec![relative_display(&trace.entry, root)];
    let mut stack: Vec<TreeFrame> = Vec::new();

    push_children(
        &mut stack,
        trace,
        root,
        &trace.entry,
        "",
        &[trace.entry.clone()],
    );

    while let Some(frame) = stack.pop() {
        let connector = if frame.is_last { "└── " } else { "├── " };
        lines.push(format!(
            "{}{}{}",
            frame.prefix,
            connector,
            relative_display(&frame.file, root)
        ));

        let child_prefix = format!(
            "{}{}",
            frame.prefix,
            if frame.is_last { "    " } else { "│   " }
        );

        if frame.ancestors.contains(&frame.file) {
            lines.push(format!("{child_prefix}└─ ... (circular dependency)"));
            continue;
        }

        let mut ancestors = frame.ancestors.clone();
        ancestors.push(frame.file.clone());
        push_children(&mut stack, trace, root, &frame.file, &child_prefix, &ancestors);
    }

    lines
}

/// Pushes a file's direct dependencies as frames, reversed so the stack
/// pops them in sorted order.
fn push_children(
    stack: &mut Vec<TreeFrame>,
    trace: &Trace,
    root: &Path,
    file: &Path,
    prefix: &str,
    ancestors: &[PathBuf],
) {
    let Some(deps) = trace.graph.dependencies_of(file) else {
        return;
    };

    let mut sorted: Vec<&PathBuf> = deps.iter().collect();
    sorted.sort_by_key(|p| relative_display(p, root));

    let count = sorted.len();
    for (i, dep) in sorted.into_iter().enumerate().rev() {
        stack.push(TreeFrame {
            file: dep.clone(),
            prefix: prefix.to_string(),
            is_last: i == count - 1,
            ancestors: ancestors.to_vec(),
        });
    }
}

/// Full human-readable dependency report for a single entry point.
pub fn render_dependency_report(trace: &Trace, root: &Path) -> String {
    let mut out = String::new();
    let bar = "=".repeat(80);

    let _ = writeln!(out, "{bar}");
    let _ = writeln!(out, "DEPENDENCY ANALYSIS REPORT");
    let _ = writeln!(out, "{bar}");
    let _ = writeln!(out);
    let _ = writeln!(out, "Project root: {}", root.display());
    let _ = writeln!(out, "Entry point:  {}", relative_display(&trace.entry, root));
    let _ = writeln!(
        out,
        "Files in dependency chain (entry included): {}",
        trace.reachable.len()
    );

    let cycles = trace.graph.cycles();
    if !cycles.is_empty() {
        let _ = writeln!(out, "Circular dependency groups: {}", cycles.len());
    }

    if !trace.warnings.is_empty() {
        let _ = writeln!(out, "Files skipped with warnings: {}", trace.warnings.len());
        for w in &trace.warnings {
            let _ = writeln!(out, "  ! {} ({})", relative_display(&w.path, root), w.message);
        }
    }

    let _ = writeln!(out);
    let _ = writeln!(out, "DEPENDENCY TREE");
    let _ = writeln!(out, "{}", "-".repeat(80));
    for line in render_tree(trace, root) {
        let _ = writeln!(out, "{line}");
    }

    out
}

/// Human-readable unused-file report across all traces of a run.
///
/// Unused files are grouped by directory, the way reviewers delete them.
pub fn render_unused_report(
    root: &Path,
    universe: &BTreeSet<PathBuf>,
    traces: &[Trace],
    unused: &[&Path],
) -> String {
    let mut out = String::new();
    let bar = "=".repeat(80);

    let _ = writeln!(out, "{bar}");
    let _ = writeln!(out, "UNUSED FILE ANALYSIS REPORT");
    let _ = writeln!(out, "{bar}");
    let _ = writeln!(out);
    let _ = writeln!(out, "Project root: {}", root.display());
    let _ = writeln!(out, "Python files found: {}", universe.len());
    let _ = writeln!(out);

    for trace in traces {
        let _ = writeln!(
            out,
            "Entry point {} reaches {} file(s)",
            relative_display(&trace.entry, root),
            trace.reachable.len()
        );
    }

    let used: usize = universe.len().saturating_sub(unused.len());

    let _ = writeln!(out);
    let _ = writeln!(out, "UNUSED FILES (reached by no entry point): {}", unused.len());
    let _ = writeln!(out, "{}", "-".repeat(80));

    if unused.is_empty() {
        let _ = writeln!(out, "No unused files found.");
    } else {
        let mut by_directory: BTreeMap<String, Vec<String>> = BTreeMap::new();
        for file in unused {
            let dir = file
                .parent()
                .map(|p| relative_display(p, root))
                .unwrap_or_default();
            let name = file
                .file_name()
                .map(|n| n.to_string_lossy().to_string())
                .unwrap_or_default();
            by_directory.entry(dir).or_default().push(name);
        }
        for (dir, names) in &by_directory {
            let shown = if dir.is_empty() { "." } else { dir.as_str() };
            let _ = writeln!(out, "{shown}/");
            for name in names {
                let _ = writeln!(out, "  x {name}");
            }
        }
    }

    let _ = writeln!(out);
    let _ = writeln!(out, "SUMMARY");
    let _ = writeln!(out, "{}", "-".repeat(80));
    let _ = writeln!(out, "Total files:  {}", universe.len());
    let _ = writeln!(out, "Used files:   {used}");
    let _ = writeln!(out, "Unused files: {}", unused.len());
    if !universe.is_empty() {
        let rate = used as f64 / universe.len() as f64 * 100.0;
        let _ = writeln!(out, "Usage rate:   {rate:.1}%");
    }

    out
}

/// Body of a persistable unused-file list.
pub fn render_unused_list(root: &Path, unused: &[&Path]) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "Unused Python files");
    let _ = writeln!(out, "{}", "=".repeat(50));
    let _ = writeln!(out, "Generated from: {}", root.display());
    let _ = writeln!(
        out,
        "Generated at:   {}",
        chrono::Local::now().format("%Y-%m-%d %H:%M:%S")
    );
    let _ = writeln!(out, "Total unused files: {}", unused.len());
    let _ = writeln!(out);
    for file in unused {
        let _ = writeln!(out, "{}", relative_display(file, root));
    }
    out
}

/// Node of the machine-readable graph document.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GraphNode {
    /// Root-relative path
    pub id: String,
    /// File name only
    pub label: String,
    /// Absolute path on disk
    pub full_path: String,
    /// Source language tag
    #[serde(rename = "type")]
    pub node_type: String,
}

/// Edge of the machine-readable graph document.
#[derive(Debug, Serialize)]
pub struct GraphEdge {
    /// Root-relative source path
    pub source: String,
    /// Root-relative target path
    pub target: String,
}

/// Machine-readable export of one trace, consumed by visualizer frontends.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GraphExport {
    pub nodes: Vec<GraphNode>,
    pub edges: Vec<GraphEdge>,
    /// Root-relative entry point path
    pub entry_point: String,
    /// Depth bound the trace ran with
    pub max_depth: usize,
}

/// Builds the JSON-serializable document for one trace.
///
/// Nodes and edges are sorted for reproducible output.
pub fn graph_to_export(trace: &Trace, root: &Path) -> GraphExport {
    let nodes = trace
        .reachable
        .iter()
        .map(|file| GraphNode {
            id: relative_display(file, root),
            label: file
                .file_name()
                .map(|n| n.to_string_lossy().to_string())
                .unwrap_or_default(),
            full_path: file.to_string_lossy().to_string(),
            node_type: "python".to_string(),
        })
        .collect();

    let mut edges: Vec<GraphEdge> = trace
        .graph
        .iter()
        .flat_map(|(source, targets)| {
            targets.iter().map(move |target| GraphEdge {
                source: relative_display(source, root),
                target: relative_display(target, root),
            })
        })
        .collect();
    edges.sort_by(|a, b| (&a.source, &a.target).cmp(&(&b.source, &b.target)));

    GraphExport {
        nodes,
        edges,
        entry_point: relative_display(&trace.entry, root),
        max_depth: trace.max_depth,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::DependencyGraph;
    use std::collections::HashMap;

    fn trace_with(
        entry: &str,
        edges: &[(&str, &str)],
        reachable: &[&str],
    ) -> Trace {
        let mut graph = DependencyGraph::new();
        for (from, to) in edges {
            graph.add_edge(Path::new(from), Path::new(to));
        }
        Trace {
            entry: PathBuf::from(entry),
            reachable: reachable.iter().map(PathBuf::from).collect(),
            graph,
            depths: HashMap::new(),
            max_depth: 10,
            warnings: Vec::new(),
        }
    }

    #[test]
    fn test_relative_display() {
        let root = Path::new("/proj");
        assert_eq!(relative_display(Path::new("/proj/a/b.py"), root), "a/b.py");
        assert_eq!(relative_display(Path::new("/other/b.py"), root), "/other/b.py");
    }

    #[test]
    fn test_tree_linear() {
        let trace = trace_with(
            "/p/main.py",
            &[("/p/main.py", "/p/util.py")],
            &["/p/main.py", "/p/util.py"],
        );
        let lines = render_tree(&trace, Path::new("/p"));
        assert_eq!(lines, vec!["main.py".to_string(), "└── util.py".to_string()]);
    }

    #[test]
    fn test_tree_two_children_connectors() {
        let trace = trace_with(
            "/p/main.py",
            &[("/p/main.py", "/p/a.py"), ("/p/main.py", "/p/b.py")],
            &["/p/main.py", "/p/a.py", "/p/b.py"],
        );
        let lines = render_tree(&trace, Path::new("/p"));
        assert_eq!(
            lines,
            vec![
                "main.py".to_string(),
                "├── a.py".to_string(),
                "└── b.py".to_string(),
            ]
        );
    }

    #[test]
    fn test_tree_cycle_marker() {
        let trace = trace_with(
            "/p/a.py",
            &[("/p/a.py", "/p/b.py"), ("/p/b.py", "/p/a.py")],
            &["/p/a.py", "/p/b.py"],
        );
        let lines = render_tree(&trace, Path::new("/p"));
        assert_eq!(
            lines,
            vec![
                "a.py".to_string(),
                "└── b.py".to_string(),
                "    └── a.py".to_string(),
                "        └─ ... (circular dependency)".to_string(),
            ]
        );
    }

    #[test]
    fn test_tree_shared_dependency_rendered_twice() {
        // a -> shared, b -> shared: both branches expand shared fully
        let trace = trace_with(
            "/p/main.py",
            &[
                ("/p/main.py", "/p/a.py"),
                ("/p/main.py", "/p/b.py"),
                ("/p/a.py", "/p/shared.py"),
                ("/p/b.py", "/p/shared.py"),
            ],
            &["/p/main.py", "/p/a.py", "/p/b.py", "/p/shared.py"],
        );
        let lines = render_tree(&trace, Path::new("/p"));
        let shared_count = lines.iter().filter(|l| l.contains("shared.py")).count();
        assert_eq!(shared_count, 2);
        // no cycle markers: sharing is not circularity
        assert!(!lines.iter().any(|l| l.contains("circular")));
    }

    #[test]
    fn test_tree_nested_prefixes() {
        let trace = trace_with(
            "/p/main.py",
            &[
                ("/p/main.py", "/p/a.py"),
                ("/p/main.py", "/p/z.py"),
                ("/p/a.py", "/p/deep.py"),
            ],
            &["/p/main.py", "/p/a.py", "/p/z.py", "/p/deep.py"],
        );
        let lines = render_tree(&trace, Path::new("/p"));
        assert_eq!(
            lines,
            vec![
                "main.py".to_string(),
                "├── a.py".to_string(),
                "│   └── deep.py".to_string(),
                "└── z.py".to_string(),
            ]
        );
    }

    #[test]
    fn test_unused_report_grouping() {
        let universe: BTreeSet<PathBuf> = ["/p/main.py", "/p/x/a.py", "/p/x/b.py"]
            .iter()
            .map(PathBuf::from)
            .collect();
        let trace = trace_with("/p/main.py", &[], &["/p/main.py"]);
        let unused = vec![Path::new("/p/x/a.py"), Path::new("/p/x/b.py")];

        let report = render_unused_report(Path::new("/p"), &universe, &[trace], &unused);
        assert!(report.contains("UNUSED FILES (reached by no entry point): 2"));
        assert!(report.contains("x/"));
        assert!(report.contains("  x a.py"));
        assert!(report.contains("Usage rate:   33.3%"));
    }

    #[test]
    fn test_unused_report_clean_project() {
        let universe: BTreeSet<PathBuf> = [PathBuf::from("/p/main.py")].into_iter().collect();
        let trace = trace_with("/p/main.py", &[], &["/p/main.py"]);
        let report = render_unused_report(Path::new("/p"), &universe, &[trace], &[]);
        assert!(report.contains("No unused files found."));
        assert!(report.contains("Usage rate:   100.0%"));
    }

    #[test]
    fn test_graph_export_shape() {
        let trace = trace_with(
            "/p/main.py",
            &[("/p/main.py", "/p/util.py")],
            &["/p/main.py", "/p/util.py"],
        );
        let export = graph_to_export(&trace, Path::new("/p"));

        assert_eq!(export.entry_point, "main.py");
        assert_eq!(export.max_depth, 10);
        assert_eq!(export.nodes.len(), 2);
        assert_eq!(export.edges.len(), 1);
        assert_eq!(export.edges[0].source, "main.py");
        assert_eq!(export.edges[0].target, "util.py");

        let json = serde_json::to_value(&export).unwrap();
        assert!(json["nodes"][0]["fullPath"].is_string());
        assert_eq!(json["nodes"][0]["type"], "python");
        assert_eq!(json["entryPoint"], "main.py");
        assert_eq!(json["maxDepth"], 10);
    }

    #[test]
    fn test_unused_list_contains_paths() {
        let unused = vec![Path::new("/p/a.py"), Path::new("/p/sub/b.py")];
        let body = render_unused_list(Path::new("/p"), &unused);
        assert!(body.contains("Total unused files: 2"));
        assert!(body.contains("a.py"));
        assert!(body.contains("sub/b.py"));
    }
}
