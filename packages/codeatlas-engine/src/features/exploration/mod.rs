//! Exploration engine
//!
//! Entry-point discovery, file/package summaries, data-flow traversal and
//! similarity queries over a frozen symbol graph.
//!
//! # Architecture
//!
//! ```text
//! Explorer (facade, read-only)
//! ├── entry_points.rs   # registry-driven discovery
//! ├── summaries.rs      # file / package classification
//! ├── data_flow.rs      # bounded BFS over CALLS edges
//! └── singleflight.rs   # per-key computation collapsing (used by the cache)
//! ```
//!
//! The `Explorer` is cheap to clone-and-share behind an `Arc`; it holds the
//! graph, the static pattern registry and the similarity engine, and every
//! operation takes a cancellation token.

pub mod data_flow;
pub mod entry_points;
pub mod results;
pub mod singleflight;
pub mod summaries;

use std::sync::Arc;

use tracing::debug;

pub use data_flow::{FlowDirection, TraversalBounds};
pub use results::{
    ApiMember, DataFlow, DataPoint, EntryPoint, EntryPointQuery, EntryPointResult, FileSummary,
    FunctionSummary, PackageApi, SimilarCode, SimilarCodeMatch, TypeSummary,
};
pub use singleflight::Singleflight;

use crate::features::pattern_registry::PatternRegistry;
use crate::features::similarity::{SimilarityCriteria, SimilarityEngine};
use crate::features::symbol_graph::CodeGraph;
use crate::shared::cancel::CancellationToken;
use crate::shared::models::Result;

/// Read-only query facade over a frozen graph
#[derive(Debug)]
pub struct Explorer {
    graph: Arc<CodeGraph>,
    registry: &'static PatternRegistry,
    similarity: Arc<SimilarityEngine>,
}

impl Explorer {
    /// Build an explorer over a frozen graph with a default-configured
    /// similarity engine. Fails with `graph_not_ready` on an unfrozen graph.
    pub fn new(graph: Arc<CodeGraph>) -> Result<Self> {
        graph.ensure_frozen()?;
        Ok(Self {
            graph,
            registry: PatternRegistry::global(),
            similarity: Arc::new(SimilarityEngine::with_defaults()),
        })
    }

    /// Explorer sharing an externally configured similarity engine.
    pub fn with_similarity(graph: Arc<CodeGraph>, similarity: Arc<SimilarityEngine>) -> Result<Self> {
        graph.ensure_frozen()?;
        Ok(Self {
            graph,
            registry: PatternRegistry::global(),
            similarity,
        })
    }

    pub fn graph(&self) -> &CodeGraph {
        &self.graph
    }

    pub fn similarity(&self) -> &SimilarityEngine {
        &self.similarity
    }

    // ── Entry points ─────────────────────────────────────────────────────

    pub fn entry_points(
        &self,
        query: &EntryPointQuery,
        token: &CancellationToken,
    ) -> Result<EntryPointResult> {
        entry_points::find_entry_points(&self.graph, self.registry, query, token)
    }

    // ── Summaries ────────────────────────────────────────────────────────

    pub fn file_summary(&self, file_path: &str) -> Result<FileSummary> {
        summaries::file_summary(&self.graph, file_path)
    }

    pub fn package_api(&self, package: &str) -> Result<PackageApi> {
        summaries::package_api(&self.graph, package)
    }

    // ── Data flow ────────────────────────────────────────────────────────

    pub fn trace_data_flow(
        &self,
        start_id: &str,
        bounds: TraversalBounds,
        token: &CancellationToken,
    ) -> Result<DataFlow> {
        data_flow::trace_data_flow(&self.graph, self.registry, start_id, bounds, token)
    }

    pub fn trace_data_flow_reverse(
        &self,
        start_id: &str,
        bounds: TraversalBounds,
        token: &CancellationToken,
    ) -> Result<DataFlow> {
        data_flow::trace_data_flow_reverse(&self.graph, self.registry, start_id, bounds, token)
    }

    pub fn trace_to_dangerous_sinks(
        &self,
        start_id: &str,
        bounds: TraversalBounds,
        token: &CancellationToken,
    ) -> Result<DataFlow> {
        data_flow::trace_to_dangerous_sinks(&self.graph, self.registry, start_id, bounds, token)
    }

    // ── Similarity ───────────────────────────────────────────────────────

    /// Fingerprint the corpus and populate the LSH index. Concurrent and
    /// repeated callers share one build.
    pub fn build_similarity(&self) -> Result<()> {
        self.similarity.build(&self.graph)
    }

    pub fn find_similar_code(
        &self,
        symbol_id: &str,
        limit: usize,
        token: &CancellationToken,
    ) -> Result<SimilarCode> {
        let matches = self.similarity.find_similar(&self.graph, symbol_id, limit, token)?;
        debug!(symbol_id, results = matches.len(), "similar-code query");

        let results = matches
            .into_iter()
            .map(|m| {
                let code = self.graph.get(&m.symbol_id).and_then(|s| s.body.clone());
                SimilarCodeMatch {
                    symbol_id: m.symbol_id,
                    similarity: m.similarity,
                    file_path: m.file_path,
                    matched_traits: m.matched_traits,
                    why: m.why,
                    code,
                }
            })
            .collect();

        Ok(SimilarCode {
            query: symbol_id.to_string(),
            results,
            method: "minhash_lsh".to_string(),
        })
    }

    pub fn find_similar_by_criteria(
        &self,
        criteria: &SimilarityCriteria,
        limit: usize,
    ) -> Result<SimilarCode> {
        let matches = self.similarity.find_by_criteria(criteria, limit)?;
        let results = matches
            .into_iter()
            .map(|m| SimilarCodeMatch {
                symbol_id: m.symbol_id,
                similarity: m.similarity,
                file_path: m.file_path,
                matched_traits: m.matched_traits,
                why: m.why,
                code: None,
            })
            .collect();

        Ok(SimilarCode {
            query: String::new(),
            results,
            method: "criteria".to_string(),
        })
    }
}
