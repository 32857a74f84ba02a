//! Graphviz DOT output for traced dependency graphs.
//!
//! Node identifiers are root-relative paths with every non-alphanumeric
//! character replaced by `_` so Graphviz accepts them unquoted; labels keep
//! the readable relative path. The entry point gets a filled highlight.
//! Output is sorted throughout for reproducible files.

use crate::graph::Trace;
use crate::report::relative_display;
use std::fmt::Write;
use std::path::Path;
use tracing::error;

/// Generate a Graphviz DOT representation of one trace.
pub fn generate_dot(trace: &Trace, root: &Path) -> String {
    // Estimate capacity: ~80 bytes/node + ~40 bytes/edge + header/footer
    let node_count = trace.reachable.len();
    let edge_count = trace.graph.edge_count();
    let mut dot = String::with_capacity(node_count * 80 + edge_count * 40 + 120);

    if let Err(e) = write_dot_content(&mut dot, trace, root) {
        error!(error = %e, "failed to build DOT output");
        return "digraph dependencies {\n}\n".to_string();
    }

    dot
}

fn write_dot_content(dot: &mut String, trace: &Trace, root: &Path) -> std::fmt::Result {
    writeln!(dot, "digraph dependencies {{")?;
    writeln!(dot, "  rankdir=LR;")?;
    writeln!(dot, "  node [shape=box, fontname=\"monospace\"];")?;
    writeln!(dot)?;

    // Nodes, entry point highlighted
    for file in &trace.reachable {
        let id = dot_id(&relative_display(file, root));
        let label = relative_display(file, root);
        if *file == trace.entry {
            writeln!(
                dot,
                "  {id} [label=\"{label}\", style=filled, fillcolor=lightblue];"
            )?;
        } else {
            writeln!(dot, "  {id} [label=\"{label}\"];")?;
        }
    }

    writeln!(dot)?;

    // Edges, sorted by construction of the adjacency map
    for (source, targets) in trace.graph.iter() {
        let source_id = dot_id(&relative_display(source, root));
        for target in targets {
            let target_id = dot_id(&relative_display(target, root));
            writeln!(dot, "  {source_id} -> {target_id};")?;
        }
    }

    writeln!(dot, "}}")?;
    Ok(())
}

/// Sanitizes a display path into a DOT-safe identifier.
fn dot_id(display: &str) -> String {
    let mut id: String = display
        .chars()
        .map(|c| if c.is_ascii_alphanumeric() { c } else { '_' })
        .collect();
    // Identifiers must not start with a digit
    if id.chars().next().is_some_and(|c| c.is_ascii_digit()) {
        id.insert(0, '_');
    }
    id
}
