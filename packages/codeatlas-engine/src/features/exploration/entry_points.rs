//! Entry-point discovery
//!
//! Scans callable and type symbols against the per-language entry-point
//! catalog, applies query filters, and returns hits ordered by
//! (file path, line). Enumeration is bounded by the query limit and reports
//! `truncated` instead of failing.

use tracing::debug;

use super::results::{EntryPoint, EntryPointQuery, EntryPointResult};
use crate::features::pattern_registry::PatternRegistry;
use crate::features::symbol_graph::CodeGraph;
use crate::shared::cancel::CancellationToken;
use crate::shared::models::{EngineError, Result, Symbol, SymbolKind};

/// Kinds scanned for entry points
const SCANNED_KINDS: [SymbolKind; 4] = [
    SymbolKind::Function,
    SymbolKind::Method,
    SymbolKind::Class,
    SymbolKind::Struct,
];

/// Discover entry points matching the query.
pub fn find_entry_points(
    graph: &CodeGraph,
    registry: &PatternRegistry,
    query: &EntryPointQuery,
    token: &CancellationToken,
) -> Result<EntryPointResult> {
    graph.ensure_frozen()?;
    if query.limit == 0 {
        return Err(EngineError::invalid_input("limit must be positive"));
    }
    if let Some(ref language) = query.language {
        if !registry.supports_language(language) {
            return Err(EngineError::unsupported_language(language.clone()));
        }
    }
    if let Some(ref package) = query.package {
        if !graph.index().has_package(package) {
            return Err(EngineError::package_not_found(package.clone()));
        }
    }

    let mut hits: Vec<EntryPoint> = Vec::new();
    let mut scanned = 0usize;

    for kind in SCANNED_KINDS {
        for id in graph.index().by_kind(kind) {
            token.check_every(scanned, "find_entry_points")?;
            scanned += 1;

            let Some(symbol) = graph.get(id) else { continue };
            if !passes_filters(symbol, query) {
                continue;
            }

            let Some(pattern) = registry.match_entry_point(symbol) else {
                continue;
            };
            if !query.include_tests && pattern.entry_type == "test" {
                continue;
            }
            if let Some(wanted) = query.type_filter() {
                if pattern.entry_type != wanted {
                    continue;
                }
            }

            hits.push(EntryPoint {
                symbol_id: symbol.id.clone(),
                name: symbol.name.clone(),
                file_path: symbol.file_path.clone(),
                line: symbol.start_line,
                entry_type: pattern.entry_type.to_string(),
                framework: pattern.framework.map(String::from),
            });
        }
    }

    hits.sort_by(|a, b| {
        a.file_path
            .cmp(&b.file_path)
            .then_with(|| a.line.cmp(&b.line))
    });

    let total_found = hits.len();
    let truncated = total_found > query.limit;
    hits.truncate(query.limit);

    debug!(
        total_found,
        truncated,
        scanned,
        "entry-point discovery complete"
    );

    Ok(EntryPointResult {
        entry_points: hits,
        total_found,
        truncated,
    })
}

fn passes_filters(symbol: &Symbol, query: &EntryPointQuery) -> bool {
    if let Some(ref package) = query.package {
        if &symbol.package != package {
            return false;
        }
    }
    if let Some(ref language) = query.language {
        if &symbol.language != language {
            return false;
        }
    }
    if !query.include_tests && symbol.in_test_file() {
        return false;
    }
    true
}

// ============================================================================
// Tests
// ============================================================================
