//! Dependency graph construction via depth-bounded BFS.
//!
//! Performance characteristics:
//! - each file is expanded at most once (visited-for-expansion set), so
//!   traversal terminates on cyclic graphs in O(|V| + |E|)
//! - a file's depth is fixed at first discovery; BFS processes the queue in
//!   non-decreasing depth order, so that is the shortest hop distance
//!
//! The adjacency map is append-only during a trace and holds direct
//! dependencies only. Cycles A→B→A can appear in it; detecting them is the
//! renderer's job, not the graph's.

use crate::error::{DeadpyError, DeadpyResult};
use crate::parse::{extract_file, Extraction};
use crate::resolve::ModuleResolver;
use crate::scan::SourceFileIndex;
use petgraph::algo::{is_cyclic_directed, tarjan_scc};
use petgraph::graphmap::DiGraphMap;
use std::collections::{BTreeMap, BTreeSet, HashMap, HashSet, VecDeque};
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

/// Default traversal depth bound: generous for realistic projects, finite
/// so termination never depends on graph shape alone.
pub const DEFAULT_MAX_DEPTH: usize = 100;

/// Default ceiling on expanded files per trace.
pub const DEFAULT_NODE_CEILING: usize = 50_000;

/// Per-trace bounds.
#[derive(Debug, Clone, Copy)]
pub struct TraceOptions {
    /// Depth bound: `1` reaches only the entry point itself, `2` adds its
    /// direct dependencies, and so on.
    pub max_depth: usize,
    /// Hard limit on the number of files expanded in one trace, guarding
    /// against pathological project sizes.
    pub node_ceiling: usize,
}

impl Default for TraceOptions {
    fn default() -> Self {
        Self {
            max_depth: DEFAULT_MAX_DEPTH,
            node_ceiling: DEFAULT_NODE_CEILING,
        }
    }
}

/// Adjacency-list dependency graph over canonical source files.
///
/// Keys are files with at least one outgoing edge; values are their direct
/// dependencies. Sorted containers keep iteration deterministic for the
/// renderers.
#[derive(Debug, Clone, Default)]
pub struct DependencyGraph {
    edges: BTreeMap<PathBuf, BTreeSet<PathBuf>>,
}

impl DependencyGraph {
    /// Creates an empty graph.
    pub fn new() -> Self {
        Self::default()
    }

    /// Records a direct-dependency edge. Returns false if it was already
    /// present.
    pub fn add_edge(&mut self, from: &Path, to: &Path) -> bool {
        self.edges
            .entry(from.to_path_buf())
            .or_default()
            .insert(to.to_path_buf())
    }

    /// Direct dependencies of a file, if it has any recorded.
    pub fn dependencies_of(&self, file: &Path) -> Option<&BTreeSet<PathBuf>> {
        self.edges.get(file)
    }

    /// Iterates (source, dependencies) pairs in sorted order.
    pub fn iter(&self) -> impl Iterator<Item = (&PathBuf, &BTreeSet<PathBuf>)> {
        self.edges.iter()
    }

    /// Number of recorded edges.
    pub fn edge_count(&self) -> usize {
        self.edges.values().map(BTreeSet::len).sum()
    }

    /// True when no edges have been recorded.
    pub fn is_empty(&self) -> bool {
        self.edges.is_empty()
    }

    /// Borrowing petgraph view of the adjacency map.
    pub fn as_graph_map(&self) -> DiGraphMap<&Path, ()> {
        let mut g = DiGraphMap::new();
        for (from, deps) in &self.edges {
            g.add_node(from.as_path());
            for to in deps {
                g.add_edge(from.as_path(), to.as_path(), ());
            }
        }
        g
    }

    /// Whether any import cycle exists among the recorded edges.
    pub fn has_cycles(&self) -> bool {
        is_cyclic_directed(&self.as_graph_map())
    }

    /// All import cycles, as strongly connected components of two or more
    /// files. Self-loops cannot occur by construction.
    pub fn cycles(&self) -> Vec<Vec<PathBuf>> {
        tarjan_scc(&self.as_graph_map())
            .into_iter()
            .filter(|scc| scc.len() > 1)
            .map(|scc| scc.into_iter().map(Path::to_path_buf).collect())
            .collect()
    }
}

/// Everything one entry-point trace produced.
#[derive(Debug, Clone)]
pub struct Trace {
    /// Canonical entry point the trace started from
    pub entry: PathBuf,
    /// All files reached within the depth bound, entry included
    pub reachable: BTreeSet<PathBuf>,
    /// Direct-dependency edges discovered during expansion
    pub graph: DependencyGraph,
    /// Hop distance from the entry, fixed at first discovery
    pub depths: HashMap<PathBuf, usize>,
    /// Depth bound the trace ran with
    pub max_depth: usize,
    /// Files that yielded no references because they could not be parsed
    pub warnings: Vec<TraceWarning>,
}

/// A file skipped during traversal, with the reason.
#[derive(Debug, Clone)]
pub struct TraceWarning {
    pub path: PathBuf,
    pub message: String,
}

/// Traces every project file reachable from `entry` through imports.
///
/// Breadth-first, depth-bounded: a dequeued file at depth `d` is expanded
/// only while `d + 1 < max_depth`, so `max_depth = 1` returns the entry
/// point alone with no recorded edges. Dependencies are admitted only when
/// they belong to the index universe; unresolvable references vanish
/// without a trace. Unparsable files become leaves and are reported in the
/// result's warnings.
pub fn trace_dependencies(
    entry: &Path,
    index: &SourceFileIndex,
    resolver: &ModuleResolver<'_>,
    options: &TraceOptions,
) -> DeadpyResult<Trace> {
    if !entry.is_file() {
        return Err(DeadpyError::entry_point(entry));
    }
    let entry = std::fs::canonicalize(entry).map_err(|e| DeadpyError::io(entry, e))?;

    let mut reachable: BTreeSet<PathBuf> = BTreeSet::new();
    let mut graph = DependencyGraph::new();
    let mut depths: HashMap<PathBuf, usize> = HashMap::new();
    let mut warnings: Vec<TraceWarning> = Vec::new();

    let mut queue: VecDeque<(PathBuf, usize)> = VecDeque::new();
    let mut expanded: HashSet<PathBuf> = HashSet::new();

    reachable.insert(entry.clone());
    depths.insert(entry.clone(), 0);
    queue.push_back((entry.clone(), 0));

    while let Some((file, depth)) = queue.pop_front() {
        // Idempotent dequeue: a file enqueued twice before processing is
        // expanded once.
        if !expanded.insert(file.clone()) {
            continue;
        }

        if depth + 1 >= options.max_depth {
            continue;
        }

        if expanded.len() > options.node_ceiling {
            warn!(
                entry = %entry.display(),
                ceiling = options.node_ceiling,
                "node-visit ceiling reached, truncating trace"
            );
            break;
        }

        let references = match extract_file(&file) {
            Extraction::Parsed(refs) => refs,
            Extraction::Skipped(path, reason) => {
                warn!(file = %path.display(), reason = %reason, "skipping unparsable file");
                warnings.push(TraceWarning {
                    path,
                    message: reason,
                });
                continue;
            }
        };

        for reference in &references {
            for resolved in resolver.resolve(reference, &file) {
                if resolved == file {
                    continue;
                }
                if !index.contains(&resolved) {
                    continue;
                }
                graph.add_edge(&file, &resolved);
                if reachable.insert(resolved.clone()) {
                    depths.insert(resolved.clone(), depth + 1);
                    queue.push_back((resolved, depth + 1));
                }
            }
        }
    }

    debug!(
        entry = %entry.display(),
        reachable = reachable.len(),
        edges = graph.edge_count(),
        "trace complete"
    );

    Ok(Trace {
        entry,
        reachable,
        graph,
        depths,
        max_depth: options.max_depth,
        warnings,
    })
}
