/*
 * codeatlas-engine - Static Code-Intelligence Engine
 *
 * Answers structural and semantic questions about a source repository:
 * who calls what, what is similar to what, where data flows begin and
 * end, which patterns recur, and how a proposed change would ripple.
 *
 * Feature-First Architecture:
 * - shared/     : Common models (Symbol, Edge, errors, cancellation)
 * - features/   : Vertical slices (graph → similarity → exploration →
 *                 cache → package graph → detection → reason → routing)
 *
 * Lifecycle: an external loader populates the symbol graph, the graph
 * freezes, derived structures (similarity index, package graph) build
 * once against the frozen graph, and every query thereafter is a
 * lock-free concurrent read.
 */

#![allow(clippy::too_many_arguments)] // Analysis entry points carry explicit bounds
#![allow(clippy::type_complexity)] // Index map types are spelled out on purpose
#![allow(clippy::or_fun_call)] // or_insert_with style preference
#![allow(clippy::len_without_is_empty)]
#![allow(clippy::new_without_default)]

// ═══════════════════════════════════════════════════════════════════════════
// Module Exports - Feature-First Architecture
// ═══════════════════════════════════════════════════════════════════════════

/// Shared models and primitives
pub mod shared;

/// Feature modules
pub mod features;

// ═══════════════════════════════════════════════════════════════════════════
// Re-exports for Public API
// ═══════════════════════════════════════════════════════════════════════════

pub use shared::cancel::CancellationToken;
pub use shared::models::{Edge, EdgeKind, EngineError, ErrorKind, Result, Symbol, SymbolId, SymbolKind};

pub use features::symbol_graph::{CodeGraph, GraphStats, SymbolIndex};

pub use features::similarity::{
    AstFingerprint, SimilarResult, SimilarityConfig, SimilarityCriteria, SimilarityEngine,
};

pub use features::pattern_registry::{PatternRegistry, SideEffectCategory};

pub use features::exploration::{
    DataFlow, DataPoint, EntryPoint, EntryPointQuery, EntryPointResult, Explorer, FileSummary,
    PackageApi, SimilarCode, TraversalBounds,
};

pub use features::cache::{CacheConfig, CacheStats, CachedExplorer, ExplorationCache};

pub use features::package_graph::{
    find_cycles, find_shortest_cycle, topo_sort, CircularDep, PackageGraph, PackageNode,
};

pub use features::pattern_detection::{
    detect_duplication, detect_smells, extract_conventions, CodeSmell, Convention,
    ConventionOptions, DetectedPattern, DetectionScope, DetectorRegistry, Duplication,
    DuplicationConfig, Severity, SmellThresholds,
};

pub use features::reason::{
    analyze_breaking_change, analyze_side_effects, parse_signature, simulate_change,
    BreakingAnalysis, ChangeSeverity, ChangeSimulation, ParsedSignature, SideEffectAnalysis,
};

pub use features::tool_routing::{ToolEntry, ToolMatch, ToolRegistry};
