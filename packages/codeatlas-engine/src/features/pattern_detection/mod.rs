//! Pattern, smell, duplication and convention detection
//!
//! # Architecture
//!
//! ```text
//! detector.rs         # detector trait + registry + confidence model
//! design_patterns.rs  # singleton / factory / builder / options /
//!                     # middleware / strategy / observer / repository
//! smells.rs           # threshold-driven smell checks
//! duplication.rs      # token MinHash + LSH near-duplicate pairs
//! conventions.rs      # recurring-practice extraction
//! ```
//!
//! All scans are read-only over the frozen graph, take a cancellation
//! token, and return deterministically ordered results.

pub mod conventions;
pub mod design_patterns;
pub mod detector;
pub mod duplication;
pub mod smells;

pub use conventions::{extract_conventions, Convention, ConventionOptions};
pub use detector::{
    adjust_confidence, DetectedPattern, DetectionScope, DetectorRegistry, PatternDetector,
    CONFIDENCE_HEURISTIC, CONFIDENCE_IDIOMATIC, CONFIDENCE_STRUCTURAL,
};
pub use duplication::{detect_duplication, Duplication, DuplicationConfig};
pub use smells::{detect_smells, CodeSmell, Severity, SmellThresholds};
