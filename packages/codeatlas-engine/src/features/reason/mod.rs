//! Reason layer
//!
//! "What happens if I change this?": breaking-change analysis, change
//! simulation and side-effect detection over the frozen graph.
//!
//! ```ignore
//! let analysis = analyze_breaking_change(&graph, &id, current, proposed, "go")?;
//! let simulation = simulate_change(&graph, &id, current, proposed, "go", &token)?;
//! let effects = analyze_side_effects(&graph, registry, &id, 5, &token)?;
//! ```

pub mod breaking;
pub mod side_effects;
pub mod signature;
pub mod simulate;

pub use breaking::{
    analyze_breaking_change, BreakingAnalysis, BreakingChange, CallerRef, ChangeSeverity,
};
pub use side_effects::{
    analyze_side_effects, SideEffect, SideEffectAnalysis, TransitiveSideEffect,
    DEFAULT_EFFECT_DEPTH,
};
pub use signature::{parse_signature, Param, ParsedSignature};
pub use simulate::{simulate_change, CallerUpdate, ChangeSimulation, TypeMismatch};
