//! Detector family
//!
//! Pattern detectors form a polymorphic set sharing one capability:
//! `scan(graph, scope) → [DetectedPattern]`. Registration is a pure map
//! from pattern tag to detector, so callers can run one detector or the
//! whole registry.
//!
//! # Confidence model
//!
//! Three tiers: structural (the shape is present), heuristic (the shape
//! plus naming agrees) and idiomatic (the canonical form for the
//! language), with multiplicative adjustments: ×1.2 when a pattern has multiple
//! examples, ×0.8 for a single example, ×0.7 for a partial match. Scores
//! clamp to [0, 1].

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::features::symbol_graph::CodeGraph;
use crate::shared::cancel::CancellationToken;
use crate::shared::models::{Result, Symbol, SymbolId};

pub const CONFIDENCE_STRUCTURAL: f64 = 0.5;
pub const CONFIDENCE_HEURISTIC: f64 = 0.7;
pub const CONFIDENCE_IDIOMATIC: f64 = 0.9;

pub const ADJUST_MULTIPLE_EXAMPLES: f64 = 1.2;
pub const ADJUST_SINGLE_EXAMPLE: f64 = 0.8;
pub const ADJUST_PARTIAL: f64 = 0.7;

/// Apply the example-count and partial-match adjustments to a base tier.
pub fn adjust_confidence(base: f64, examples: usize, partial: bool) -> f64 {
    let mut confidence = base;
    confidence *= if examples > 1 {
        ADJUST_MULTIPLE_EXAMPLES
    } else {
        ADJUST_SINGLE_EXAMPLE
    };
    if partial {
        confidence *= ADJUST_PARTIAL;
    }
    confidence.clamp(0.0, 1.0)
}

/// One detected design-pattern instance
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DetectedPattern {
    /// Pattern tag (`singleton`, `factory`, ...)
    pub pattern: String,

    /// Participating symbols
    pub symbol_ids: Vec<SymbolId>,

    pub file_path: String,
    pub line: u32,

    pub confidence: f64,

    /// Implementation matches the language's canonical form
    pub idiomatic: bool,

    pub warnings: Vec<String>,

    pub metadata: BTreeMap<String, String>,
}

/// Scope restriction for a scan
#[derive(Debug, Clone, Default)]
pub struct DetectionScope {
    pub package: Option<String>,
    pub file: Option<String>,
    pub include_tests: bool,
}

impl DetectionScope {
    pub fn contains(&self, symbol: &Symbol) -> bool {
        if let Some(ref package) = self.package {
            if &symbol.package != package {
                return false;
            }
        }
        if let Some(ref file) = self.file {
            if &symbol.file_path != file {
                return false;
            }
        }
        if !self.include_tests && symbol.in_test_file() {
            return false;
        }
        true
    }
}

/// Symbols visible to a scan, in deterministic (file, line) order.
pub fn symbols_in_scope<'a>(graph: &'a CodeGraph, scope: &DetectionScope) -> Vec<&'a Symbol> {
    let mut symbols: Vec<&Symbol> = graph.symbols().filter(|s| scope.contains(s)).collect();
    symbols.sort_by(|a, b| {
        a.file_path
            .cmp(&b.file_path)
            .then_with(|| a.start_line.cmp(&b.start_line))
            .then_with(|| a.id.cmp(&b.id))
    });
    symbols
}

/// A single pattern detector
pub trait PatternDetector: Send + Sync {
    /// Pattern tag this detector reports
    fn name(&self) -> &'static str;

    fn scan(&self, graph: &CodeGraph, scope: &DetectionScope) -> Vec<DetectedPattern>;
}

/// Pattern tag → detector map
pub struct DetectorRegistry {
    detectors: BTreeMap<&'static str, Box<dyn PatternDetector>>,
}

impl DetectorRegistry {
    pub fn new() -> Self {
        Self {
            detectors: BTreeMap::new(),
        }
    }

    /// Registry with every built-in detector.
    pub fn with_defaults() -> Self {
        use super::design_patterns::*;

        let mut registry = Self::new();
        registry.register(Box::new(SingletonDetector));
        registry.register(Box::new(FactoryDetector));
        registry.register(Box::new(BuilderDetector));
        registry.register(Box::new(OptionsDetector));
        registry.register(Box::new(MiddlewareDetector));
        registry.register(Box::new(StrategyDetector));
        registry.register(Box::new(ObserverDetector));
        registry.register(Box::new(RepositoryDetector));
        registry
    }

    pub fn register(&mut self, detector: Box<dyn PatternDetector>) {
        self.detectors.insert(detector.name(), detector);
    }

    pub fn get(&self, pattern: &str) -> Option<&dyn PatternDetector> {
        self.detectors.get(pattern).map(Box::as_ref)
    }

    pub fn pattern_names(&self) -> Vec<&'static str> {
        self.detectors.keys().copied().collect()
    }

    /// Run every registered detector; results ordered by
    /// (pattern, file, line).
    pub fn detect_all(
        &self,
        graph: &CodeGraph,
        scope: &DetectionScope,
        token: &CancellationToken,
    ) -> Result<Vec<DetectedPattern>> {
        graph.ensure_frozen()?;

        let mut results = Vec::new();
        for (i, detector) in self.detectors.values().enumerate() {
            token.check_every(i, "detect_patterns")?;
            results.extend(detector.scan(graph, scope));
        }
        results.sort_by(|a, b| {
            a.pattern
                .cmp(&b.pattern)
                .then_with(|| a.file_path.cmp(&b.file_path))
                .then_with(|| a.line.cmp(&b.line))
        });

        debug!(patterns = results.len(), "pattern detection complete");
        Ok(results)
    }
}

impl Default for DetectorRegistry {
    fn default() -> Self {
        Self::with_defaults()
    }
}
