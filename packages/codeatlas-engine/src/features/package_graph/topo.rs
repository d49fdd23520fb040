//! Topological ordering
//!
//! Kahn's algorithm with a FIFO queue over the package graph. Edges whose
//! target is a stdlib package are excluded from in-degree computation, so
//! the ordering concerns application structure only. Returns `None` when
//! the produced order is shorter than the package count, the signal that a
//! cycle exists.

use std::collections::VecDeque;

use ahash::AHashMap;
use tracing::debug;

use super::builder::PackageGraph;

/// Kahn topological sort. For every retained edge `from → to`, `from`
/// precedes `to` in the output. `None` signals a cycle.
pub fn topo_sort(package_graph: &PackageGraph) -> Option<Vec<String>> {
    let paths = package_graph.package_paths();
    let total = paths.len();

    let mut in_degree: AHashMap<&str, usize> = paths.iter().map(|p| (p.as_str(), 0)).collect();
    for path in &paths {
        for target in package_graph.app_successors(path) {
            if let Some(degree) = in_degree.get_mut(target.as_str()) {
                *degree += 1;
            }
        }
    }

    // FIFO seeded in sorted order for a deterministic result.
    let mut queue: VecDeque<&str> = paths
        .iter()
        .filter(|p| in_degree[p.as_str()] == 0)
        .map(|p| p.as_str())
        .collect();

    let mut order: Vec<String> = Vec::with_capacity(total);
    while let Some(current) = queue.pop_front() {
        order.push(current.to_string());
        for target in package_graph.app_successors(current) {
            let degree = in_degree
                .get_mut(target.as_str())
                .expect("successor tracked in in-degree map");
            *degree -= 1;
            if *degree == 0 {
                queue.push_back(target.as_str());
            }
        }
    }

    if order.len() != total {
        debug!(
            ordered = order.len(),
            total, "topological sort aborted: cycle present"
        );
        return None;
    }
    Some(order)
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::super::cycles::tests::cyclic_package_graph;
    use super::*;
    use crate::features::symbol_graph::CodeGraph;
    use crate::shared::models::{Edge, EdgeKind, Symbol, SymbolKind};

    fn dag_package_graph() -> PackageGraph {
        // a → b → c, a → c
        let mut g = CodeGraph::new();
        for (file, imports) in [
            ("a/a.go", vec!["m/b", "m/c"]),
            ("b/b.go", vec!["m/c"]),
            ("c/c.go", vec![]),
        ] {
            g.add_symbol(Symbol::new(file, SymbolKind::File, "go", file, 1, 1)).unwrap();
            for (i, import) in imports.iter().enumerate() {
                let line = (i + 2) as u32;
                g.add_symbol(Symbol::new(*import, SymbolKind::Import, "go", file, line, line))
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
        }
        g.freeze();
        PackageGraph::build(&g, "m").unwrap()
    }

    #[test]
    fn test_dag_orders_sources_before_targets() {
        let pg = dag_package_graph();
        let order = topo_sort(&pg).unwrap();

        let pos = |p: &str| order.iter().position(|x| x == p).unwrap();
        assert!(pos("m/a") < pos("m/b"));
        assert!(pos("m/b") < pos("m/c"));
        assert!(pos("m/a") < pos("m/c"));
        assert_eq!(order.len(), pg.len());
    }

    #[test]
    fn test_cycle_yields_none() {
        let pg = cyclic_package_graph();
        assert!(topo_sort(&pg).is_none());
    }

    #[test]
    fn test_determinism() {
        let pg = dag_package_graph();
        assert_eq!(topo_sort(&pg), topo_sort(&pg));
    }
}
