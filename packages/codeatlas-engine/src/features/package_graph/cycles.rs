//! Circular dependency detection
//!
//! Tarjan's strongly-connected components (1972) over the package graph,
//! excluding stdlib successors (stdlib packages cannot participate in an
//! application import cycle). Every SCC of size ≥ 2 is a cycle. For a single
//! package, a BFS variant returns the shortest cycle through it (the first
//! return to the start is shortest by BFS level).

use std::collections::VecDeque;

use ahash::{AHashMap, AHashSet};
use petgraph::algo::tarjan_scc;
use petgraph::graph::DiGraph;
use serde::{Deserialize, Serialize};
use tracing::debug;

use super::builder::PackageGraph;
use crate::shared::cancel::CancellationToken;
use crate::shared::models::Result;

/// One strongly-connected component of size ≥ 2
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct CircularDep {
    /// Member package paths, sorted
    pub packages: Vec<String>,
    pub size: usize,
}

/// All import cycles among application packages, deterministic for a given
/// graph (components sorted by their first member).
pub fn find_cycles(package_graph: &PackageGraph, token: &CancellationToken) -> Result<Vec<CircularDep>> {
    let filtered = app_only_graph(package_graph, token)?;

    token.check("find_cycles")?;
    let components = tarjan_scc(&filtered);

    let mut cycles: Vec<CircularDep> = components
        .into_iter()
        .filter(|component| component.len() >= 2)
        .map(|component| {
            let mut packages: Vec<String> = component
                .into_iter()
                .map(|idx| filtered[idx].clone())
                .collect();
            packages.sort();
            CircularDep {
                size: packages.len(),
                packages,
            }
        })
        .collect();
    cycles.sort_by(|a, b| a.packages.cmp(&b.packages));

    debug!(cycles = cycles.len(), "cycle detection complete");
    Ok(cycles)
}

/// Shortest import cycle containing `start`, as a closed path
/// `[start, ..., start]`. `None` when the package is on no cycle.
pub fn find_shortest_cycle(
    package_graph: &PackageGraph,
    start: &str,
    token: &CancellationToken,
) -> Result<Option<Vec<String>>> {
    if package_graph.get(start).is_none() {
        return Ok(None);
    }

    let mut parents: AHashMap<&str, &str> = AHashMap::new();
    let mut visited: AHashSet<&str> = AHashSet::new();
    let mut queue: VecDeque<&str> = VecDeque::new();
    queue.push_back(start);
    visited.insert(start);

    let mut processed = 0usize;
    while let Some(current) = queue.pop_front() {
        token.check_every(processed, "find_shortest_cycle")?;
        processed += 1;

        for next in package_graph.app_successors(current) {
            let next = next.as_str();
            if next == start {
                // First return to the start is the shortest cycle.
                let mut path = vec![start.to_string()];
                let mut hops = Vec::new();
                let mut cursor = current;
                while cursor != start {
                    hops.push(cursor.to_string());
                    cursor = parents[cursor];
                }
                hops.reverse();
                path.extend(hops);
                path.push(start.to_string());
                return Ok(Some(path));
            }
            if visited.insert(next) {
                parents.insert(next, current);
                queue.push_back(next);
            }
        }
    }

    Ok(None)
}

/// Copy of the package graph restricted to application packages.
fn app_only_graph(
    package_graph: &PackageGraph,
    token: &CancellationToken,
) -> Result<DiGraph<String, ()>> {
    let mut graph = DiGraph::new();
    let mut indices = AHashMap::new();

    for (i, path) in package_graph.package_paths().into_iter().enumerate() {
        token.check_every(i, "find_cycles")?;
        let node = package_graph.get(path).expect("path from own key set");
        if node.stdlib {
            continue;
        }
        let idx = graph.add_node(path.clone());
        indices.insert(path.clone(), idx);
    }

    for (path, &from_idx) in indices.iter() {
        for target in package_graph.app_successors(path) {
            if let Some(&to_idx) = indices.get(target) {
                graph.add_edge(from_idx, to_idx, ());
            }
        }
    }
    Ok(graph)
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::features::symbol_graph::CodeGraph;
    use crate::shared::models::{Edge, EdgeKind, Symbol, SymbolKind};

    /// a → b → c → a, plus d importing a (no cycle through d)
    pub(crate) fn cyclic_package_graph() -> PackageGraph {
        let mut g = CodeGraph::new();
        for (file, import, line) in [
            ("a/a.go", "m/b", 2),
            ("b/b.go", "m/c", 2),
            ("c/c.go", "m/a", 2),
            ("d/d.go", "m/a", 2),
        ] {
            g.add_symbol(Symbol::new(file, SymbolKind::File, "go", file, 1, 1)).unwrap();
            g.add_symbol(Symbol::new(import, SymbolKind::Import, "go", file, line, line))
                .unwrap();
            g.add_edge(Edge::new(
                format!("{}:1:{}", file, file),
                format!("{}:{}:{}", file, line, import),
                EdgeKind::Imports,
                file,
                line,
            ))
            .unwrap();
        }
        g.freeze();
        PackageGraph::build(&g, "m").unwrap()
    }

    #[test]
    fn test_single_scc_of_three() {
        let pg = cyclic_package_graph();
        let cycles = find_cycles(&pg, &CancellationToken::new()).unwrap();

        assert_eq!(cycles.len(), 1);
        assert_eq!(cycles[0].size, 3);
        assert_eq!(cycles[0].packages, vec!["m/a", "m/b", "m/c"]);
    }

    #[test]
    fn test_shortest_cycle_closed_path() {
        let pg = cyclic_package_graph();
        let cycle = find_shortest_cycle(&pg, "m/a", &CancellationToken::new())
            .unwrap()
            .unwrap();
        assert_eq!(cycle, vec!["m/a", "m/b", "m/c", "m/a"]);
    }

    #[test]
    fn test_no_cycle_through_leaf() {
        let pg = cyclic_package_graph();
        let cycle = find_shortest_cycle(&pg, "m/d", &CancellationToken::new()).unwrap();
        assert!(cycle.is_none());
    }

    #[test]
    fn test_acyclic_graph_has_no_cycles() {
        let mut g = CodeGraph::new();
        g.add_symbol(Symbol::new("a/a.go", SymbolKind::File, "go", "a/a.go", 1, 1)).unwrap();
        g.add_symbol(Symbol::new("m/b", SymbolKind::Import, "go", "a/a.go", 2, 2)).unwrap();
        g.add_edge(Edge::new("a/a.go:1:a/a.go", "a/a.go:2:m/b", EdgeKind::Imports, "a/a.go", 2))
            .unwrap();
        g.freeze();
        let pg = PackageGraph::build(&g, "m").unwrap();

        assert!(find_cycles(&pg, &CancellationToken::new()).unwrap().is_empty());
    }

    #[test]
    fn test_stdlib_excluded_from_cycles() {
        // a imports net/http; net/http is never considered a successor.
        let mut g = CodeGraph::new();
        g.add_symbol(Symbol::new("a/a.go", SymbolKind::File, "go", "a/a.go", 1, 1)).unwrap();
        g.add_symbol(Symbol::new("net/http", SymbolKind::Import, "go", "a/a.go", 2, 2)).unwrap();
        g.add_edge(Edge::new("a/a.go:1:a/a.go", "a/a.go:2:net/http", EdgeKind::Imports, "a/a.go", 2))
            .unwrap();
        g.freeze();
        let pg = PackageGraph::build(&g, "m").unwrap();

        let cycles = find_cycles(&pg, &CancellationToken::new()).unwrap();
        assert!(cycles.is_empty());
    }
}
