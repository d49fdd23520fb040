//! Change simulation
//!
//! Turns a signature diff into concrete editing guidance: the new call
//! expression each caller needs, imports pulled in by newly referenced
//! package-qualified types, type-mismatch conversion hints, and the set of
//! tests reachable from the change through reverse CALLS edges.

use std::collections::VecDeque;

use ahash::AHashSet;
use serde::{Deserialize, Serialize};
use tracing::debug;

use super::signature::{parse_signature, ParsedSignature};
use crate::features::symbol_graph::CodeGraph;
use crate::shared::cancel::CancellationToken;
use crate::shared::models::{EdgeKind, EngineError, Result, Symbol, SymbolId};

/// Depth of the reverse-CALLS sweep that collects affected tests
const TEST_SWEEP_DEPTH: usize = 3;

/// One caller that must be edited
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CallerUpdate {
    pub caller_id: SymbolId,
    pub file_path: String,
    pub line: u32,

    /// `add_arguments`, `remove_arguments`, `change_types`
    pub update_type: String,

    /// Suggested new call expression
    pub needed_call: String,
}

/// One parameter whose type changes
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TypeMismatch {
    pub position: usize,
    pub current_type: String,
    pub proposed_type: String,
    pub suggestion: String,
}

/// Change simulation result
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChangeSimulation {
    pub symbol_id: SymbolId,
    pub callers_to_update: Vec<CallerUpdate>,
    pub imports_required: Vec<String>,
    pub type_mismatches: Vec<TypeMismatch>,
    pub affected_tests: Vec<SymbolId>,
}

/// Simulate applying a signature change.
pub fn simulate_change(
    graph: &CodeGraph,
    symbol_id: &str,
    current: &str,
    proposed: &str,
    language: &str,
    token: &CancellationToken,
) -> Result<ChangeSimulation> {
    graph.ensure_frozen()?;
    let symbol = graph.require(symbol_id)?;
    if proposed.trim().is_empty() {
        return Err(EngineError::invalid_input(
            "simulation requires a proposed signature; removal has no call form",
        ));
    }

    let current_sig = parse_signature(current, language)?;
    let proposed_sig = parse_signature(proposed, language)?;

    let needed_call = build_call_expression(&symbol.name, &proposed_sig);
    let update_type = classify_update(&current_sig, &proposed_sig);

    let mut callers_to_update: Vec<CallerUpdate> = graph
        .incoming_of_kind(symbol_id, EdgeKind::Calls)
        .map(|edge| CallerUpdate {
            caller_id: edge.from.clone(),
            file_path: edge.file_path.clone(),
            line: edge.line,
            update_type: update_type.clone(),
            needed_call: needed_call.clone(),
        })
        .collect();
    callers_to_update.sort_by(|a, b| {
        a.file_path
            .cmp(&b.file_path)
            .then_with(|| a.line.cmp(&b.line))
    });

    let imports_required = required_imports(&current_sig, &proposed_sig);
    let type_mismatches = type_mismatches(&current_sig, &proposed_sig);
    let affected_tests = collect_affected_tests(graph, symbol_id, token)?;

    debug!(
        symbol_id,
        callers = callers_to_update.len(),
        tests = affected_tests.len(),
        "change simulation complete"
    );

    Ok(ChangeSimulation {
        symbol_id: symbol_id.to_string(),
        callers_to_update,
        imports_required,
        type_mismatches,
        affected_tests,
    })
}

/// Builds `Handle(ctx, r, opts)` from parameter names, with `argN`
/// fallbacks for unnamed parameters.
fn build_call_expression(name: &str, proposed: &ParsedSignature) -> String {
    let args: Vec<String> = proposed
        .params
        .iter()
        .enumerate()
        .map(|(i, param)| {
            if param.name.is_empty() {
                format!("arg{}", i)
            } else {
                param.name.clone()
            }
        })
        .collect();
    format!("{}({})", name, args.join(", "))
}

fn classify_update(current: &ParsedSignature, proposed: &ParsedSignature) -> String {
    if proposed.params.len() > current.params.len() {
        "add_arguments".to_string()
    } else if proposed.params.len() < current.params.len() {
        "remove_arguments".to_string()
    } else {
        "change_types".to_string()
    }
}

/// Packages referenced by newly appearing package-qualified types.
fn required_imports(current: &ParsedSignature, proposed: &ParsedSignature) -> Vec<String> {
    let existing: AHashSet<String> = current
        .params
        .iter()
        .map(|p| p.type_name.clone())
        .chain(current.returns.iter().cloned())
        .collect();

    let mut imports: Vec<String> = proposed
        .params
        .iter()
        .map(|p| p.type_name.as_str())
        .chain(proposed.returns.iter().map(String::as_str))
        .filter(|t| !existing.contains(*t))
        .filter_map(package_of_type)
        .collect();
    imports.sort();
    imports.dedup();
    imports
}

/// `*context.Context` → `context`; local and builtin types yield nothing.
fn package_of_type(type_name: &str) -> Option<String> {
    let bare = type_name
        .trim_start_matches("...")
        .trim_start_matches('*')
        .trim_start_matches("[]")
        .trim_start_matches('&');
    let (package, _) = bare.rsplit_once('.')?;
    if package.is_empty() || package.contains(' ') {
        return None;
    }
    Some(package.to_string())
}

fn type_mismatches(current: &ParsedSignature, proposed: &ParsedSignature) -> Vec<TypeMismatch> {
    current
        .params
        .iter()
        .zip(&proposed.params)
        .enumerate()
        .filter(|(_, (old, new))| old.type_name != new.type_name)
        .map(|(position, (old, new))| TypeMismatch {
            position,
            current_type: old.type_name.clone(),
            proposed_type: new.type_name.clone(),
            suggestion: format!(
                "convert the argument from {} to {} at the call site",
                old.type_name, new.type_name
            ),
        })
        .collect()
}

/// Bounded reverse-CALLS BFS collecting test-named callers.
fn collect_affected_tests(
    graph: &CodeGraph,
    symbol_id: &str,
    token: &CancellationToken,
) -> Result<Vec<SymbolId>> {
    let mut tests: Vec<SymbolId> = Vec::new();
    let mut visited: AHashSet<&str> = AHashSet::new();
    let mut queue: VecDeque<(&str, usize)> = VecDeque::new();
    queue.push_back((symbol_id, 0));
    visited.insert(symbol_id);

    let mut processed = 0usize;
    while let Some((id, depth)) = queue.pop_front() {
        token.check_every(processed, "simulate_change")?;
        processed += 1;

        if let Some(symbol) = graph.get(id) {
            if id != symbol_id && is_test_symbol(symbol) {
                tests.push(symbol.id.clone());
            }
        }
        if depth >= TEST_SWEEP_DEPTH {
            continue;
        }
        for edge in graph.incoming_of_kind(id, EdgeKind::Calls) {
            if visited.insert(edge.from.as_str()) {
                queue.push_back((edge.from.as_str(), depth + 1));
            }
        }
    }

    tests.sort();
    Ok(tests)
}

fn is_test_symbol(symbol: &Symbol) -> bool {
    symbol.name.starts_with("Test")
        || symbol.name.starts_with("test_")
        || symbol.in_test_file()
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::shared::models::Edge;
    use crate::shared::models::SymbolKind;

    fn scenario_graph() -> CodeGraph {
        let mut g = CodeGraph::new();
        g.add_symbol(
            Symbol::new("Handle", SymbolKind::Function, "go", "svc/handle.go", 10, 30)
                .with_package("svc")
                .with_signature("func Handle(r *Request) error")
                .exported(),
        )
        .unwrap();
        g.add_symbol(
            Symbol::new("dispatch", SymbolKind::Function, "go", "svc/dispatch.go", 5, 20)
                .with_package("svc"),
        )
        .unwrap();
        g.add_symbol(
            Symbol::new("serve", SymbolKind::Function, "go", "api/serve.go", 5, 20)
                .with_package("api"),
        )
        .unwrap();
        g.add_symbol(
            Symbol::new("TestDispatch", SymbolKind::Function, "go", "svc/dispatch_test.go", 5, 25)
                .with_package("svc"),
        )
        .unwrap();
        g.add_edge(Edge::new("svc/dispatch.go:5:dispatch", "svc/handle.go:10:Handle", EdgeKind::Calls, "svc/dispatch.go", 12))
            .unwrap();
        g.add_edge(Edge::new("api/serve.go:5:serve", "svc/handle.go:10:Handle", EdgeKind::Calls, "api/serve.go", 9))
            .unwrap();
        g.add_edge(Edge::new("svc/dispatch_test.go:5:TestDispatch", "svc/dispatch.go:5:dispatch", EdgeKind::Calls, "svc/dispatch_test.go", 10))
            .unwrap();
        g.freeze();
        g
    }

    #[test]
    fn test_add_arguments_call_expression() {
        let g = scenario_graph();
        let simulation = simulate_change(
            &g,
            "svc/handle.go:10:Handle",
            "func Handle(r *Request) error",
            "func Handle(ctx context.Context, r *Request, opts Options) error",
            "go",
            &CancellationToken::new(),
        )
        .unwrap();

        assert_eq!(simulation.callers_to_update.len(), 2);
        for update in &simulation.callers_to_update {
            assert_eq!(update.update_type, "add_arguments");
            assert_eq!(update.needed_call, "Handle(ctx, r, opts)");
        }
    }

    #[test]
    fn test_imports_for_new_qualified_types() {
        let g = scenario_graph();
        let simulation = simulate_change(
            &g,
            "svc/handle.go:10:Handle",
            "func Handle(r *Request) error",
            "func Handle(ctx context.Context, r *Request, t time.Time) error",
            "go",
            &CancellationToken::new(),
        )
        .unwrap();

        assert_eq!(simulation.imports_required, vec!["context", "time"]);
    }

    #[test]
    fn test_type_mismatch_suggestions() {
        let g = scenario_graph();
        let simulation = simulate_change(
            &g,
            "svc/handle.go:10:Handle",
            "func Handle(r *Request) error",
            "func Handle(r *http.Request) error",
            "go",
            &CancellationToken::new(),
        )
        .unwrap();

        assert_eq!(simulation.type_mismatches.len(), 1);
        let mismatch = &simulation.type_mismatches[0];
        assert_eq!(mismatch.current_type, "*Request");
        assert_eq!(mismatch.proposed_type, "*http.Request");
        assert!(mismatch.suggestion.contains("*http.Request"));
        assert_eq!(simulation.callers_to_update[0].update_type, "change_types");
    }

    #[test]
    fn test_affected_tests_found_transitively() {
        let g = scenario_graph();
        let simulation = simulate_change(
            &g,
            "svc/handle.go:10:Handle",
            "func Handle(r *Request) error",
            "func Handle() error",
            "go",
            &CancellationToken::new(),
        )
        .unwrap();

        // TestDispatch reaches Handle through dispatch.
        assert_eq!(simulation.affected_tests, vec!["svc/dispatch_test.go:5:TestDispatch"]);
        assert_eq!(simulation.callers_to_update[0].update_type, "remove_arguments");
    }

    #[test]
    fn test_unnamed_params_get_synthetic_names() {
        let g = scenario_graph();
        let simulation = simulate_change(
            &g,
            "svc/handle.go:10:Handle",
            "func Handle(r *Request) error",
            "func Handle(*Request, Options) error",
            "go",
            &CancellationToken::new(),
        )
        .unwrap();

        assert_eq!(simulation.callers_to_update[0].needed_call, "Handle(arg0, arg1)");
    }

    #[test]
    fn test_removal_is_rejected() {
        let g = scenario_graph();
        assert!(simulate_change(
            &g,
            "svc/handle.go:10:Handle",
            "func Handle(r *Request) error",
            "",
            "go",
            &CancellationToken::new(),
        )
        .is_err());
    }
}
