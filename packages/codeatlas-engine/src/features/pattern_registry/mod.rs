//! Source / sink / entry-point / side-effect pattern registry
//!
//! A static catalog keyed by language. A symbol matches a pattern when all
//! of the pattern's non-empty fields match (name/receiver/package globs,
//! signature substring). The registry is built once and immutable; the
//! exploration and reason layers consult it on every classification.

pub mod catalog;
pub mod patterns;
pub mod registry;

pub use patterns::{
    EntryPointPattern, FlowPattern, FlowRole, Glob, SideEffectCategory, SideEffectPattern,
};
pub use registry::PatternRegistry;
