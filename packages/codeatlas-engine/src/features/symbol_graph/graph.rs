//! Symbol graph with a build/freeze lifecycle
//!
//! Two lifecycles:
//! - **Mutable build**: the loader adds symbols and edges. Duplicate IDs and
//!   dangling edges are rejected at add time, so the frozen graph never needs
//!   to re-validate.
//! - **Frozen query**: `freeze()` is a one-shot, idempotent transition. After
//!   it, every mutation fails with `graph_not_ready` semantics inverted
//!   (`invalid_input`), adjacency lists are complete, and readers share the
//!   graph with no locking.
//!
//! Edges are value records stored in both endpoints' adjacency lists and
//! refer to nodes by stable symbol ID rather than by pointer, which keeps
//! the bidirectional lists free of ownership cycles (A calls B, B calls A is
//! just four vector entries).

use ahash::AHashMap;
use tracing::info;

use super::index::SymbolIndex;
use crate::shared::models::{Edge, EdgeKind, EngineError, Result, Symbol, SymbolId};

/// Set of symbols + edges with a freeze transition
#[derive(Debug, Default)]
pub struct CodeGraph {
    symbols: AHashMap<SymbolId, Symbol>,

    /// Edges leaving each symbol
    outgoing: AHashMap<SymbolId, Vec<Edge>>,

    /// Edges arriving at each symbol
    incoming: AHashMap<SymbolId, Vec<Edge>>,

    edge_count: usize,

    index: SymbolIndex,

    /// Checked by every mutating operation
    frozen: bool,
}

impl CodeGraph {
    pub fn new() -> Self {
        Self::default()
    }

    // ── Mutable build ────────────────────────────────────────────────────

    /// Add a symbol. Fails on a duplicate ID or after freeze.
    pub fn add_symbol(&mut self, symbol: Symbol) -> Result<()> {
        self.ensure_mutable("add_symbol")?;

        if self.symbols.contains_key(&symbol.id) {
            return Err(EngineError::invalid_input(format!(
                "duplicate symbol id: {}",
                symbol.id
            )));
        }

        self.index.add(&symbol);
        self.symbols.insert(symbol.id.clone(), symbol);
        Ok(())
    }

    /// Add an edge. Both endpoints must already exist.
    pub fn add_edge(&mut self, edge: Edge) -> Result<()> {
        self.ensure_mutable("add_edge")?;

        if !self.symbols.contains_key(&edge.from) {
            return Err(EngineError::invalid_input(format!(
                "edge references unknown source symbol: {}",
                edge.from
            )));
        }
        if !self.symbols.contains_key(&edge.to) {
            return Err(EngineError::invalid_input(format!(
                "edge references unknown target symbol: {}",
                edge.to
            )));
        }

        self.outgoing
            .entry(edge.from.clone())
            .or_insert_with(Vec::new)
            .push(edge.clone());
        self.incoming
            .entry(edge.to.clone())
            .or_insert_with(Vec::new)
            .push(edge);
        self.edge_count += 1;
        Ok(())
    }

    /// One-shot transition to read-only query mode. Idempotent.
    pub fn freeze(&mut self) {
        if !self.frozen {
            self.frozen = true;
            info!(
                symbols = self.symbols.len(),
                edges = self.edge_count,
                "symbol graph frozen"
            );
        }
    }

    // ── Frozen query ─────────────────────────────────────────────────────

    pub fn is_frozen(&self) -> bool {
        self.frozen
    }

    /// Fail with `graph_not_ready` unless the graph has been frozen.
    ///
    /// Engines call this once at construction so individual queries stay
    /// lock- and check-free.
    pub fn ensure_frozen(&self) -> Result<()> {
        if self.frozen {
            Ok(())
        } else {
            Err(EngineError::graph_not_ready(
                "graph must be frozen before queries run",
            ))
        }
    }

    pub fn get(&self, id: &str) -> Option<&Symbol> {
        self.symbols.get(id)
    }

    /// Resolve a symbol or produce a `symbol_not_found` error.
    pub fn require(&self, id: &str) -> Result<&Symbol> {
        self.get(id).ok_or_else(|| EngineError::symbol_not_found(id))
    }

    pub fn outgoing(&self, id: &str) -> &[Edge] {
        self.outgoing.get(id).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn incoming(&self, id: &str) -> &[Edge] {
        self.incoming.get(id).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Outgoing edges of a single kind
    pub fn outgoing_of_kind(&self, id: &str, kind: EdgeKind) -> impl Iterator<Item = &Edge> {
        self.outgoing(id).iter().filter(move |e| e.kind == kind)
    }

    /// Incoming edges of a single kind
    pub fn incoming_of_kind(&self, id: &str, kind: EdgeKind) -> impl Iterator<Item = &Edge> {
        self.incoming(id).iter().filter(move |e| e.kind == kind)
    }

    pub fn symbols(&self) -> impl Iterator<Item = &Symbol> {
        self.symbols.values()
    }

    pub fn edges(&self) -> impl Iterator<Item = &Edge> {
        self.outgoing.values().flatten()
    }

    pub fn symbol_count(&self) -> usize {
        self.symbols.len()
    }

    pub fn edge_count(&self) -> usize {
        self.edge_count
    }

    pub fn index(&self) -> &SymbolIndex {
        &self.index
    }

    /// Aggregate counts for observability logging
    pub fn stats(&self) -> GraphStats {
        GraphStats {
            symbols: self.symbols.len(),
            edges: self.edge_count,
            files: self.index.file_count(),
            packages: self.index.package_count(),
        }
    }

    fn ensure_mutable(&self, operation: &str) -> Result<()> {
        if self.frozen {
            Err(EngineError::invalid_input(format!(
                "{} rejected: graph is frozen",
                operation
            )))
        } else {
            Ok(())
        }
    }
}

/// Aggregate graph counts
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GraphStats {
    pub symbols: usize,
    pub edges: usize,
    pub files: usize,
    pub packages: usize,
}
