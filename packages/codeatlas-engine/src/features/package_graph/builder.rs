//! Package graph derivation
//!
//! Derives a package-level dependency graph from the frozen symbol graph
//! and a supplied module root: every known file contributes the package
//! `module/dir(file)`, and every IMPORTS edge contributes a directed
//! package edge. Packages are flagged `internal` (path contains
//! `/internal/`) and `stdlib` (known first-segment prefix, no dot in the
//! first segment).
//!
//! Storage is a petgraph `DiGraph` plus a path → node-index map, the same
//! shape the cycle and topo passes consume.

use std::collections::BTreeSet;

use ahash::AHashMap;
use petgraph::graph::{DiGraph, NodeIndex};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::features::symbol_graph::CodeGraph;
use crate::shared::models::{EdgeKind, Result, SymbolKind};

/// Standard-library first segments (short names, no dot)
const STDLIB_PREFIXES: &[&str] = &[
    "archive", "bufio", "bytes", "compress", "container", "context", "crypto", "database",
    "debug", "embed", "encoding", "errors", "expvar", "flag", "fmt", "hash", "html", "image",
    "io", "log", "maps", "math", "mime", "net", "os", "path", "plugin", "reflect", "regexp",
    "runtime", "slices", "sort", "strconv", "strings", "sync", "syscall", "testing", "text",
    "time", "unicode", "unsafe",
];

/// One package and its neighborhood
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PackageNode {
    pub path: String,
    pub files: Vec<String>,

    /// Packages this one imports
    pub imports: BTreeSet<String>,

    /// Packages importing this one
    pub imported_by: BTreeSet<String>,

    /// Path contains an `/internal/` segment
    pub internal: bool,

    /// Standard-library package
    pub stdlib: bool,
}

impl PackageNode {
    fn new(path: String) -> Self {
        let internal = path.contains("/internal/") || path.ends_with("/internal");
        let stdlib = is_stdlib_path(&path);
        Self {
            path,
            files: Vec::new(),
            imports: BTreeSet::new(),
            imported_by: BTreeSet::new(),
            internal,
            stdlib,
        }
    }
}

/// Package-level dependency graph derived from a frozen symbol graph
#[derive(Debug)]
pub struct PackageGraph {
    nodes: AHashMap<String, PackageNode>,

    graph: DiGraph<String, ()>,
    indices: AHashMap<String, NodeIndex>,
}

impl PackageGraph {
    /// Derive the package graph. The symbol graph must be frozen.
    pub fn build(code_graph: &CodeGraph, module_root: &str) -> Result<Self> {
        code_graph.ensure_frozen()?;

        let mut nodes: AHashMap<String, PackageNode> = AHashMap::new();

        // Every known file contributes module/dir(file).
        let mut files: Vec<&String> = code_graph.index().files().collect();
        files.sort();
        for file in files {
            let package = package_path(module_root, file);
            let node = nodes.entry(package.clone()).or_insert_with(|| PackageNode::new(package));
            node.files.push(file.clone());
        }

        // IMPORTS edges become package edges.
        let mut edge_pairs: BTreeSet<(String, String)> = BTreeSet::new();
        for edge in code_graph.edges().filter(|e| e.kind == EdgeKind::Imports) {
            let Some(from_symbol) = code_graph.get(&edge.from) else { continue };
            let Some(to_symbol) = code_graph.get(&edge.to) else { continue };

            let from_pkg = package_path(module_root, &from_symbol.file_path);
            // An import symbol's name is the imported path; anything else
            // resolves through its file location.
            let to_pkg = if to_symbol.kind == SymbolKind::Import {
                to_symbol.name.clone()
            } else {
                package_path(module_root, &to_symbol.file_path)
            };
            if from_pkg == to_pkg {
                continue;
            }
            edge_pairs.insert((from_pkg, to_pkg));
        }

        for (from, to) in &edge_pairs {
            nodes
                .entry(from.clone())
                .or_insert_with(|| PackageNode::new(from.clone()))
                .imports
                .insert(to.clone());
            nodes
                .entry(to.clone())
                .or_insert_with(|| PackageNode::new(to.clone()))
                .imported_by
                .insert(from.clone());
        }

        // petgraph storage, nodes inserted in sorted order for determinism.
        let mut graph = DiGraph::new();
        let mut indices = AHashMap::new();
        let mut paths: Vec<&String> = nodes.keys().collect();
        paths.sort();
        for path in paths {
            let idx = graph.add_node(path.clone());
            indices.insert(path.clone(), idx);
        }
        for (from, to) in &edge_pairs {
            graph.add_edge(indices[from], indices[to], ());
        }

        debug!(
            packages = nodes.len(),
            edges = edge_pairs.len(),
            module_root,
            "package graph derived"
        );

        Ok(Self {
            nodes,
            graph,
            indices,
        })
    }

    pub fn get(&self, path: &str) -> Option<&PackageNode> {
        self.nodes.get(path)
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Package paths in sorted order
    pub fn package_paths(&self) -> Vec<&String> {
        let mut paths: Vec<&String> = self.nodes.keys().collect();
        paths.sort();
        paths
    }

    /// Non-stdlib import targets of a package, sorted
    pub fn app_successors(&self, path: &str) -> Vec<&String> {
        match self.nodes.get(path) {
            Some(node) => node
                .imports
                .iter()
                .filter(|target| {
                    self.nodes
                        .get(target.as_str())
                        .map(|n| !n.stdlib)
                        .unwrap_or(true)
                })
                .collect(),
            None => Vec::new(),
        }
    }

    pub(crate) fn petgraph(&self) -> &DiGraph<String, ()> {
        &self.graph
    }

    pub(crate) fn node_index(&self, path: &str) -> Option<NodeIndex> {
        self.indices.get(path).copied()
    }
}

/// `module/dir(file)`; files at the repository root map to the module
/// itself.
pub fn package_path(module_root: &str, file_path: &str) -> String {
    match file_path.rsplit_once('/') {
        Some((dir, _)) => {
            if module_root.is_empty() {
                dir.to_string()
            } else {
                format!("{}/{}", module_root, dir)
            }
        }
        None => module_root.to_string(),
    }
}

/// Known first-segment prefix and no dot in the first segment.
pub fn is_stdlib_path(path: &str) -> bool {
    let first = path.split('/').next().unwrap_or(path);
    !first.contains('.') && STDLIB_PREFIXES.contains(&first)
}

// ============================================================================
// Tests
// ============================================================================
