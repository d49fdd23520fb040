//! Pattern registry
//!
//! Central, immutable catalog of source / sink / entry-point / side-effect
//! patterns keyed by language. Built once behind a `Lazy`; all lookups are
//! read-only afterwards, so concurrent queries need no locking.

use ahash::AHashMap;
use once_cell::sync::Lazy;

use super::catalog;
use super::patterns::{EntryPointPattern, FlowPattern, FlowRole, SideEffectPattern};
use crate::shared::models::Symbol;

#[derive(Debug)]
struct LanguagePatterns {
    sources: Vec<FlowPattern>,
    sinks: Vec<FlowPattern>,
    entry_points: Vec<EntryPointPattern>,
    side_effects: Vec<SideEffectPattern>,
}

/// Immutable pattern catalog keyed by language
#[derive(Debug)]
pub struct PatternRegistry {
    languages: AHashMap<&'static str, LanguagePatterns>,
}

static GLOBAL: Lazy<PatternRegistry> = Lazy::new(PatternRegistry::build);

impl PatternRegistry {
    /// Shared process-wide registry. Globs compile exactly once.
    pub fn global() -> &'static PatternRegistry {
        &GLOBAL
    }

    fn build() -> Self {
        let mut languages = AHashMap::new();
        languages.insert(
            "go",
            LanguagePatterns {
                sources: catalog::go::sources(),
                sinks: catalog::go::sinks(),
                entry_points: catalog::go::entry_points(),
                side_effects: catalog::go::side_effects(),
            },
        );
        languages.insert(
            "python",
            LanguagePatterns {
                sources: catalog::python::sources(),
                sinks: catalog::python::sinks(),
                entry_points: catalog::python::entry_points(),
                side_effects: catalog::python::side_effects(),
            },
        );
        let js = || LanguagePatterns {
            sources: catalog::javascript::sources(),
            sinks: catalog::javascript::sinks(),
            entry_points: catalog::javascript::entry_points(),
            side_effects: catalog::javascript::side_effects(),
        };
        languages.insert("javascript", js());
        languages.insert("typescript", js());

        Self { languages }
    }

    pub fn supports_language(&self, language: &str) -> bool {
        self.languages.contains_key(language)
    }

    /// First source pattern matching the symbol, if any.
    pub fn classify_source(&self, symbol: &Symbol) -> Option<&FlowPattern> {
        self.flow_patterns(symbol, FlowRole::Source)
    }

    /// First sink pattern matching the symbol, if any.
    pub fn classify_sink(&self, symbol: &Symbol) -> Option<&FlowPattern> {
        self.flow_patterns(symbol, FlowRole::Sink)
    }

    /// First entry-point pattern matching the symbol, if any.
    pub fn match_entry_point(&self, symbol: &Symbol) -> Option<&EntryPointPattern> {
        self.languages
            .get(symbol.language.as_str())?
            .entry_points
            .iter()
            .find(|p| p.matches(symbol))
    }

    /// Side-effect classification of a callee by (package, name).
    pub fn classify_side_effect(
        &self,
        language: &str,
        package: &str,
        name: &str,
    ) -> Option<&SideEffectPattern> {
        self.languages
            .get(language)?
            .side_effects
            .iter()
            .find(|p| p.matches(package, name))
    }

    fn flow_patterns(&self, symbol: &Symbol, role: FlowRole) -> Option<&FlowPattern> {
        let lang = self.languages.get(symbol.language.as_str())?;
        let patterns = match role {
            FlowRole::Source => &lang.sources,
            FlowRole::Sink => &lang.sinks,
        };
        patterns.iter().find(|p| p.matches(symbol))
    }
}

// ============================================================================
// Tests
// ============================================================================
