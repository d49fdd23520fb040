//! Symbol graph & index
//!
//! The substrate every query runs on: symbols + typed edges with a one-shot
//! freeze transition from mutable build to lock-free concurrent reads.
//!
//! ```ignore
//! let mut graph = CodeGraph::new();
//! graph.add_symbol(symbol)?;
//! graph.add_edge(edge)?;
//! graph.freeze();
//!
//! let callers = graph.incoming_of_kind(&id, EdgeKind::Calls);
//! ```

mod graph;
mod index;

pub use graph::{CodeGraph, GraphStats};
pub use index::SymbolIndex;
