//! Edge model
//!
//! A directed, typed relationship between two symbols. Edges are plain value
//! records that refer to their endpoints by stable symbol ID; the graph
//! stores each edge in both endpoints' adjacency lists so traversal is O(1)
//! in either direction without back-pointers.

use serde::{Deserialize, Serialize};

use super::symbol::SymbolId;

/// Edge kind classification
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum EdgeKind {
    /// Caller → callee
    Calls,
    /// Importing file → imported package/symbol
    Imports,
    /// Concrete type → interface
    Implements,
    /// Parent scope → nested symbol
    Contains,
    /// Any other use of a symbol
    References,
}

impl EdgeKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            EdgeKind::Calls => "CALLS",
            EdgeKind::Imports => "IMPORTS",
            EdgeKind::Implements => "IMPLEMENTS",
            EdgeKind::Contains => "CONTAINS",
            EdgeKind::References => "REFERENCES",
        }
    }
}

/// A directed, typed relationship between two symbols
///
/// Carries the source location where the relationship occurs (the call site,
/// the import statement), not the location of either endpoint.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Edge {
    pub from: SymbolId,
    pub to: SymbolId,
    pub kind: EdgeKind,

    /// File where the relationship occurs
    pub file_path: String,

    /// Line where the relationship occurs
    pub line: u32,
}

impl Edge {
    pub fn new(
        from: impl Into<SymbolId>,
        to: impl Into<SymbolId>,
        kind: EdgeKind,
        file_path: impl Into<String>,
        line: u32,
    ) -> Self {
        Self {
            from: from.into(),
            to: to.into(),
            kind,
            file_path: file_path.into(),
            line,
        }
    }
}
