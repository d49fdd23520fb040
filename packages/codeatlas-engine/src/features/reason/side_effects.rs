//! Side-effect detection
//!
//! Classifies a target's callees against the per-language side-effect
//! catalog. Direct effects come from level-1 callees; transitive effects
//! come from a bounded-depth sweep over the call graph with a visited set
//! and the call chain recorded for each hit. A function is pure exactly
//! when no effect of any kind is found.
//!
//! Confidence is calibrated multiplicatively from a 0.8 base: in-test-file
//! ×0.9, many transitive effects ×0.9, found-effects ×1.05, and a standing
//! ×0.95 because this is static analysis only; clamped to [0, 1].

use std::collections::VecDeque;

use ahash::AHashSet;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::features::pattern_registry::PatternRegistry;
use crate::features::symbol_graph::CodeGraph;
use crate::shared::cancel::CancellationToken;
use crate::shared::models::{EdgeKind, Result, Symbol, SymbolId};

const BASE_CONFIDENCE: f64 = 0.8;
const ADJUST_IN_TEST_FILE: f64 = 0.9;
const ADJUST_MANY_TRANSITIVE: f64 = 0.9;
const ADJUST_FOUND_EFFECTS: f64 = 1.05;
const ADJUST_STATIC_ONLY: f64 = 0.95;

/// Transitive counts above this are discounted
const MANY_TRANSITIVE: usize = 10;

/// Default transitive sweep depth
pub const DEFAULT_EFFECT_DEPTH: usize = 5;

/// One classified effect
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SideEffect {
    /// Registry category (`file_io`, `network`, ...)
    pub category: String,

    pub callee_id: SymbolId,
    pub callee_name: String,
    pub package: String,
    pub description: String,
    pub reversible: bool,
    pub idempotent: bool,

    /// Call-site line in the caller
    pub line: u32,
}

/// An effect reached through intermediate calls
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TransitiveSideEffect {
    pub effect: SideEffect,

    /// Target → ... → effecting callee
    pub call_chain: Vec<SymbolId>,
}

/// Side-effect analysis result
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SideEffectAnalysis {
    pub symbol_id: SymbolId,
    pub direct: Vec<SideEffect>,
    pub transitive: Vec<TransitiveSideEffect>,

    /// No effects of any kind found
    pub is_pure: bool,

    pub confidence: f64,
}

/// Analyze the side effects of a target symbol.
pub fn analyze_side_effects(
    graph: &CodeGraph,
    registry: &PatternRegistry,
    symbol_id: &str,
    max_depth: usize,
    token: &CancellationToken,
) -> Result<SideEffectAnalysis> {
    graph.ensure_frozen()?;
    let target = graph.require(symbol_id)?;

    // Level 1: direct effects.
    let mut direct = Vec::new();
    for edge in graph.outgoing_of_kind(symbol_id, EdgeKind::Calls) {
        let Some(callee) = graph.get(&edge.to) else { continue };
        if let Some(effect) = classify(registry, &target.language, callee, edge.line) {
            direct.push(effect);
        }
    }
    direct.sort_by(|a, b| a.line.cmp(&b.line).then_with(|| a.callee_id.cmp(&b.callee_id)));

    // Deeper levels: transitive effects with their call chains.
    let transitive = sweep_transitive(graph, registry, target, max_depth, token)?;

    let is_pure = direct.is_empty() && transitive.is_empty();
    let confidence = calibrate(target, direct.len(), transitive.len());

    debug!(
        symbol_id,
        direct = direct.len(),
        transitive = transitive.len(),
        is_pure,
        "side-effect analysis complete"
    );

    Ok(SideEffectAnalysis {
        symbol_id: symbol_id.to_string(),
        direct,
        transitive,
        is_pure,
        confidence,
    })
}

fn classify(
    registry: &PatternRegistry,
    language: &str,
    callee: &Symbol,
    line: u32,
) -> Option<SideEffect> {
    let package = if callee.package.is_empty() {
        // Fall back to the directory when the loader left the package blank.
        callee.file_path.rsplit_once('/').map(|(dir, _)| dir).unwrap_or("")
    } else {
        callee.package.as_str()
    };

    let pattern = registry.classify_side_effect(language, package, &callee.name)?;
    Some(SideEffect {
        category: pattern.category.as_str().to_string(),
        callee_id: callee.id.clone(),
        callee_name: callee.name.clone(),
        package: package.to_string(),
        description: pattern.description.to_string(),
        reversible: pattern.reversible,
        idempotent: pattern.idempotent,
        line,
    })
}

fn sweep_transitive(
    graph: &CodeGraph,
    registry: &PatternRegistry,
    target: &Symbol,
    max_depth: usize,
    token: &CancellationToken,
) -> Result<Vec<TransitiveSideEffect>> {
    let mut effects = Vec::new();
    let mut visited: AHashSet<&str> = AHashSet::new();
    // (symbol id, depth, chain from target)
    let mut queue: VecDeque<(&str, usize, Vec<SymbolId>)> = VecDeque::new();
    queue.push_back((target.id.as_str(), 0, vec![target.id.clone()]));
    visited.insert(target.id.as_str());

    let mut processed = 0usize;
    while let Some((id, depth, chain)) = queue.pop_front() {
        token.check_every(processed, "analyze_side_effects")?;
        processed += 1;

        if depth >= max_depth {
            continue;
        }
        for edge in graph.outgoing_of_kind(id, EdgeKind::Calls) {
            let Some(callee) = graph.get(&edge.to) else { continue };

            let mut next_chain = chain.clone();
            next_chain.push(callee.id.clone());

            // Level 1 is reported as direct, not transitive.
            if depth >= 1 {
                if let Some(effect) = classify(registry, &target.language, callee, edge.line) {
                    effects.push(TransitiveSideEffect {
                        effect,
                        call_chain: next_chain.clone(),
                    });
                }
            }
            if visited.insert(edge.to.as_str()) {
                queue.push_back((edge.to.as_str(), depth + 1, next_chain));
            }
        }
    }

    effects.sort_by(|a, b| {
        a.call_chain
            .len()
            .cmp(&b.call_chain.len())
            .then_with(|| a.effect.callee_id.cmp(&b.effect.callee_id))
    });
    Ok(effects)
}

fn calibrate(target: &Symbol, direct: usize, transitive: usize) -> f64 {
    let mut confidence = BASE_CONFIDENCE;
    if target.in_test_file() {
        confidence *= ADJUST_IN_TEST_FILE;
    }
    if transitive > MANY_TRANSITIVE {
        confidence *= ADJUST_MANY_TRANSITIVE;
    }
    if direct + transitive > 0 {
        confidence *= ADJUST_FOUND_EFFECTS;
    }
    confidence *= ADJUST_STATIC_ONLY;
    confidence.clamp(0.0, 1.0)
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::shared::models::{Edge, SymbolKind};

    /// process → save → os.WriteFile; process → log.Printf
    fn scenario_graph() -> CodeGraph {
        let mut g = CodeGraph::new();
        g.add_symbol(
            Symbol::new("process", SymbolKind::Function, "go", "svc/process.go", 10, 40)
                .with_package("svc"),
        )
        .unwrap();
        g.add_symbol(
            Symbol::new("save", SymbolKind::Function, "go", "svc/save.go", 5, 25)
                .with_package("svc"),
        )
        .unwrap();
        g.add_symbol(
            Symbol::new("WriteFile", SymbolKind::Function, "go", "os/file.go", 100, 120)
                .with_package("os"),
        )
        .unwrap();
        g.add_symbol(
            Symbol::new("Printf", SymbolKind::Function, "go", "log/log.go", 50, 60)
                .with_package("log"),
        )
        .unwrap();
        g.add_symbol(
            Symbol::new("format", SymbolKind::Function, "go", "svc/format.go", 1, 10)
                .with_package("svc"),
        )
        .unwrap();
        g.add_edge(Edge::new("svc/process.go:10:process", "svc/save.go:5:save", EdgeKind::Calls, "svc/process.go", 15))
            .unwrap();
        g.add_edge(Edge::new("svc/process.go:10:process", "log/log.go:50:Printf", EdgeKind::Calls, "svc/process.go", 20))
            .unwrap();
        g.add_edge(Edge::new("svc/save.go:5:save", "os/file.go:100:WriteFile", EdgeKind::Calls, "svc/save.go", 12))
            .unwrap();
        g.add_edge(Edge::new("svc/process.go:10:process", "svc/format.go:1:format", EdgeKind::Calls, "svc/process.go", 25))
            .unwrap();
        g.freeze();
        g
    }

    #[test]
    fn test_direct_and_transitive_effects() {
        let g = scenario_graph();
        let analysis = analyze_side_effects(
            &g,
            PatternRegistry::global(),
            "svc/process.go:10:process",
            DEFAULT_EFFECT_DEPTH,
            &CancellationToken::new(),
        )
        .unwrap();

        // Printf is a direct logging effect.
        assert_eq!(analysis.direct.len(), 1);
        assert_eq!(analysis.direct[0].category, "logging");

        // WriteFile is reached through save.
        assert_eq!(analysis.transitive.len(), 1);
        let transitive = &analysis.transitive[0];
        assert_eq!(transitive.effect.category, "file_io");
        assert_eq!(
            transitive.call_chain,
            vec![
                "svc/process.go:10:process",
                "svc/save.go:5:save",
                "os/file.go:100:WriteFile"
            ]
        );

        assert!(!analysis.is_pure);
        // 0.8 × 1.05 × 0.95
        assert!((analysis.confidence - 0.8 * 1.05 * 0.95).abs() < 1e-9);
    }

    #[test]
    fn test_pure_function() {
        let g = scenario_graph();
        let analysis = analyze_side_effects(
            &g,
            PatternRegistry::global(),
            "svc/format.go:1:format",
            DEFAULT_EFFECT_DEPTH,
            &CancellationToken::new(),
        )
        .unwrap();

        assert!(analysis.is_pure);
        assert!(analysis.direct.is_empty());
        assert!(analysis.transitive.is_empty());
        // 0.8 × 0.95, no found-effects lift
        assert!((analysis.confidence - 0.8 * 0.95).abs() < 1e-9);
    }

    #[test]
    fn test_depth_bound_stops_sweep() {
        let g = scenario_graph();
        let analysis = analyze_side_effects(
            &g,
            PatternRegistry::global(),
            "svc/process.go:10:process",
            1,
            &CancellationToken::new(),
        )
        .unwrap();

        // Direct level still reported; the WriteFile hop is beyond depth 1.
        assert_eq!(analysis.direct.len(), 1);
        assert!(analysis.transitive.is_empty());
    }

    #[test]
    fn test_unknown_symbol() {
        let g = scenario_graph();
        assert!(analyze_side_effects(
            &g,
            PatternRegistry::global(),
            "nope.go:1:missing",
            DEFAULT_EFFECT_DEPTH,
            &CancellationToken::new(),
        )
        .is_err());
    }
}
