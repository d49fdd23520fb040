//! Package graph, cycle detection and topological ordering
//!
//! Derived once from the frozen symbol graph and a module root; read-only
//! afterwards.
//!
//! ```ignore
//! let packages = PackageGraph::build(&graph, "example.com/app")?;
//! let cycles = find_cycles(&packages, &token)?;
//! let order = topo_sort(&packages); // None ⇔ at least one cycle
//! ```

pub mod builder;
pub mod cycles;
pub mod topo;

pub use builder::{is_stdlib_path, package_path, PackageGraph, PackageNode};
pub use cycles::{find_cycles, find_shortest_cycle, CircularDep};
pub use topo::topo_sort;
