//! Similarity engine
//!
//! Owns the fingerprint map and the LSH index. `build()` runs once against
//! the frozen graph, fingerprinting every function and method in parallel,
//! and is wrapped in a once-primitive so concurrent first-callers share a
//! single computation. Queries refuse to run until the build has completed.

use ahash::AHashMap;
use once_cell::sync::OnceCell;
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::features::similarity::domain::config::SimilarityConfig;
use crate::features::similarity::domain::fingerprint::AstFingerprint;
use crate::features::similarity::domain::scoring::overall_similarity;
use crate::features::similarity::infrastructure::lsh::{LshIndex, LshStats};
use crate::features::symbol_graph::CodeGraph;
use crate::shared::cancel::CancellationToken;
use crate::shared::models::{EdgeKind, EngineError, Result, Symbol, SymbolId, SymbolKind};

/// One similar-code match
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SimilarResult {
    pub symbol_id: SymbolId,
    pub similarity: f64,
    pub file_path: String,
    pub matched_traits: Vec<String>,
    pub why: String,
}

/// Structural search criteria
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SimilarityCriteria {
    pub min_params: Option<usize>,
    pub max_params: Option<usize>,
    pub min_returns: Option<usize>,
    pub max_returns: Option<usize>,
    pub min_complexity: Option<u32>,
    pub max_complexity: Option<u32>,
    pub has_error_return: Option<bool>,
    pub has_context_param: Option<bool>,
}

impl SimilarityCriteria {
    fn matches(&self, fp: &AstFingerprint) -> bool {
        let in_bounds = |v: usize, min: Option<usize>, max: Option<usize>| {
            min.map_or(true, |m| v >= m) && max.map_or(true, |m| v <= m)
        };

        in_bounds(fp.param_count, self.min_params, self.max_params)
            && in_bounds(fp.return_count, self.min_returns, self.max_returns)
            && self.min_complexity.map_or(true, |m| fp.complexity >= m)
            && self.max_complexity.map_or(true, |m| fp.complexity <= m)
            && self.has_error_return.map_or(true, |v| fp.has_error_return == v)
            && self.has_context_param.map_or(true, |v| fp.has_context_param == v)
    }
}

/// Engine statistics
#[derive(Debug, Clone, Copy)]
pub struct SimilarityStats {
    pub fingerprints: usize,
    pub lsh: LshStats,
}

#[derive(Debug)]
struct BuiltIndex {
    fingerprints: AHashMap<SymbolId, AstFingerprint>,
    lsh: LshIndex,
}

/// Fingerprint + LSH query engine over a frozen graph
#[derive(Debug)]
pub struct SimilarityEngine {
    config: SimilarityConfig,
    built: OnceCell<BuiltIndex>,
}

impl SimilarityEngine {
    pub fn new(config: SimilarityConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            config,
            built: OnceCell::new(),
        })
    }

    pub fn with_defaults() -> Self {
        Self {
            config: SimilarityConfig::default(),
            built: OnceCell::new(),
        }
    }

    pub fn config(&self) -> &SimilarityConfig {
        &self.config
    }

    /// Fingerprint every function and method and populate the LSH index.
    ///
    /// Idempotent: concurrent and repeated callers share the first build.
    pub fn build(&self, graph: &CodeGraph) -> Result<()> {
        graph.ensure_frozen()?;

        self.built.get_or_try_init(|| {
            let start = std::time::Instant::now();

            let mut targets: Vec<&Symbol> = graph
                .index()
                .by_kind(SymbolKind::Function)
                .iter()
                .chain(graph.index().by_kind(SymbolKind::Method).iter())
                .filter_map(|id| graph.get(id))
                .collect();
            // Deterministic LSH construction order
            targets.sort_by(|a, b| a.id.cmp(&b.id));

            let fingerprints: Vec<AstFingerprint> = targets
                .par_iter()
                .map(|symbol| self.fingerprint_symbol(graph, symbol))
                .collect();

            let mut lsh = LshIndex::new(self.config.num_bands, self.config.band_size);
            let mut map = AHashMap::with_capacity(fingerprints.len());
            for fp in fingerprints {
                lsh.insert(&fp.symbol_id, &fp.signature);
                map.insert(fp.symbol_id.clone(), fp);
            }

            info!(
                fingerprints = map.len(),
                elapsed_ms = start.elapsed().as_millis() as u64,
                "similarity index built"
            );

            Ok::<_, EngineError>(BuiltIndex {
                fingerprints: map,
                lsh,
            })
        })?;
        Ok(())
    }

    pub fn is_built(&self) -> bool {
        self.built.get().is_some()
    }

    /// Fingerprint for a symbol, from the built index or computed on the fly.
    pub fn fingerprint_of(&self, graph: &CodeGraph, symbol_id: &str) -> Result<AstFingerprint> {
        let index = self.index()?;
        if let Some(fp) = index.fingerprints.get(symbol_id) {
            return Ok(fp.clone());
        }
        let symbol = graph.require(symbol_id)?;
        Ok(self.fingerprint_symbol(graph, symbol))
    }

    /// Rank the corpus against `symbol_id` and return the top `limit`
    /// matches at or above the configured similarity threshold.
    pub fn find_similar(
        &self,
        graph: &CodeGraph,
        symbol_id: &str,
        limit: usize,
        token: &CancellationToken,
    ) -> Result<Vec<SimilarResult>> {
        if symbol_id.is_empty() {
            return Err(EngineError::invalid_input("symbol_id must not be empty"));
        }
        let index = self.index()?;
        let query = self.fingerprint_of(graph, symbol_id)?;

        // Over-fetch from the LSH: exact scoring below thins the set.
        let candidates = index.lsh.query(&query.symbol_id, &query.signature, limit * 3);
        debug!(
            target_id = symbol_id,
            candidates = candidates.len(),
            "LSH candidate lookup"
        );

        let mut results = self.score_candidates(&query, candidates.iter(), index, token)?;

        // Small corpus + under-filled candidates: brute force the rest.
        if results.len() < limit && index.fingerprints.len() < self.config.brute_force_limit {
            results = self.score_candidates(&query, index.fingerprints.keys(), index, token)?;
        }

        results.sort_by(|a, b| {
            b.similarity
                .partial_cmp(&a.similarity)
                .unwrap_or(std::cmp::Ordering::Equal)
                .then_with(|| a.symbol_id.cmp(&b.symbol_id))
        });
        results.truncate(limit);
        Ok(results)
    }

    /// Enumerate fingerprints matching structural criteria, ordered by ID.
    pub fn find_by_criteria(
        &self,
        criteria: &SimilarityCriteria,
        limit: usize,
    ) -> Result<Vec<SimilarResult>> {
        let index = self.index()?;

        let mut results: Vec<SimilarResult> = index
            .fingerprints
            .values()
            .filter(|fp| criteria.matches(fp))
            .map(|fp| SimilarResult {
                symbol_id: fp.symbol_id.clone(),
                similarity: 1.0,
                file_path: fp.file_path.clone(),
                matched_traits: vec!["criteria_match".to_string()],
                why: "matches structural criteria".to_string(),
            })
            .collect();

        results.sort_by(|a, b| a.symbol_id.cmp(&b.symbol_id));
        results.truncate(limit);
        Ok(results)
    }

    pub fn stats(&self) -> Result<SimilarityStats> {
        let index = self.index()?;
        Ok(SimilarityStats {
            fingerprints: index.fingerprints.len(),
            lsh: index.lsh.stats(),
        })
    }

    fn index(&self) -> Result<&BuiltIndex> {
        self.built
            .get()
            .ok_or_else(|| EngineError::graph_not_ready("similarity engine requires build() first"))
    }

    fn fingerprint_symbol(&self, graph: &CodeGraph, symbol: &Symbol) -> AstFingerprint {
        let callees: Vec<&Symbol> = graph
            .outgoing_of_kind(&symbol.id, EdgeKind::Calls)
            .filter_map(|edge| graph.get(&edge.to))
            .collect();
        AstFingerprint::from_symbol(symbol, &callees, &self.config)
    }

    fn score_candidates<'a>(
        &self,
        query: &AstFingerprint,
        candidates: impl Iterator<Item = &'a SymbolId>,
        index: &BuiltIndex,
        token: &CancellationToken,
    ) -> Result<Vec<SimilarResult>> {
        let mut results = Vec::new();
        for (i, id) in candidates.enumerate() {
            token.check_every(i, "find_similar")?;
            if id == &query.symbol_id {
                continue;
            }
            let Some(fp) = index.fingerprints.get(id) else {
                continue;
            };

            let scored = overall_similarity(query, fp);
            if scored.score >= self.config.min_similarity_threshold {
                results.push(SimilarResult {
                    symbol_id: fp.symbol_id.clone(),
                    similarity: scored.score,
                    file_path: fp.file_path.clone(),
                    why: scored.why(),
                    matched_traits: scored.matched_traits,
                });
            }
        }
        Ok(results)
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::shared::models::ErrorKind;

    fn graph_with_handlers() -> CodeGraph {
        let mut graph = CodeGraph::new();
        let a = Symbol::new("HandleCreate", SymbolKind::Function, "go", "svc/create.go", 10, 34)
            .with_signature("func HandleCreate(ctx context.Context, req *Req) (*Resp, error)")
            .with_package("svc");
        let b = Symbol::new("HandleUpdate", SymbolKind::Function, "go", "svc/update.go", 10, 34)
            .with_signature("func HandleUpdate(ctx context.Context, req *Req) (*Resp, error)")
            .with_package("svc");
        let c = Symbol::new("identity", SymbolKind::Function, "go", "util/id.go", 1, 1)
            .with_signature("func(s string) string")
            .with_package("util");
        graph.add_symbol(a).unwrap();
        graph.add_symbol(b).unwrap();
        graph.add_symbol(c).unwrap();
        graph.freeze();
        graph
    }

    #[test]
    fn test_query_before_build_fails() {
        let engine = SimilarityEngine::with_defaults();
        let graph = graph_with_handlers();
        let token = CancellationToken::new();

        let err = engine
            .find_similar(&graph, "svc/create.go:10:HandleCreate", 5, &token)
            .unwrap_err();
        assert_eq!(err.kind, ErrorKind::GraphNotReady);
    }

    #[test]
    fn test_build_requires_frozen_graph() {
        let engine = SimilarityEngine::with_defaults();
        let graph = CodeGraph::new();
        assert_eq!(
            engine.build(&graph).unwrap_err().kind,
            ErrorKind::GraphNotReady
        );
    }

    #[test]
    fn test_similar_handlers_rank_above_threshold() {
        let engine = SimilarityEngine::with_defaults();
        let graph = graph_with_handlers();
        let token = CancellationToken::new();
        engine.build(&graph).unwrap();

        let results = engine
            .find_similar(&graph, "svc/create.go:10:HandleCreate", 5, &token)
            .unwrap();

        assert!(!results.is_empty());
        assert_eq!(results[0].symbol_id, "svc/update.go:10:HandleUpdate");
        assert!(results[0].similarity >= 0.7);
        assert!(results[0]
            .matched_traits
            .contains(&"same_param_count".to_string()));
        // The unrelated identity function scores below 0.7 at best.
        for r in &results[1..] {
            assert!(r.similarity < results[0].similarity);
        }
    }

    #[test]
    fn test_build_is_idempotent() {
        let engine = SimilarityEngine::with_defaults();
        let graph = graph_with_handlers();
        engine.build(&graph).unwrap();
        engine.build(&graph).unwrap();
        assert_eq!(engine.stats().unwrap().fingerprints, 3);
    }

    #[test]
    fn test_criteria_search() {
        let engine = SimilarityEngine::with_defaults();
        let graph = graph_with_handlers();
        engine.build(&graph).unwrap();

        let criteria = SimilarityCriteria {
            has_error_return: Some(true),
            has_context_param: Some(true),
            ..Default::default()
        };
        let results = engine.find_by_criteria(&criteria, 10).unwrap();
        assert_eq!(results.len(), 2);
        // Deterministic ID order
        assert!(results[0].symbol_id < results[1].symbol_id);
    }

    #[test]
    fn test_cancellation_interrupts_query() {
        let engine = SimilarityEngine::with_defaults();
        let graph = graph_with_handlers();
        engine.build(&graph).unwrap();

        let token = CancellationToken::new();
        token.cancel();
        let err = engine
            .find_similar(&graph, "svc/create.go:10:HandleCreate", 5, &token)
            .unwrap_err();
        assert_eq!(err.kind, ErrorKind::ContextCanceled);
    }
}
