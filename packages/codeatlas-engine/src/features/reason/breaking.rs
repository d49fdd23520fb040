//! Breaking-change analysis
//!
//! Diffs a current and a proposed signature into categorized breaking
//! changes, enumerates the callers that would break (incoming CALLS
//! edges), and rates severity:
//!
//! | Change                  | Severity                                    |
//! |-------------------------|---------------------------------------------|
//! | added required param    | HIGH                                        |
//! | removed param           | MEDIUM                                      |
//! | param type change       | HIGH                                        |
//! | return shape change     | HIGH                                        |
//! | visibility drop         | CRITICAL with callers outside the package   |
//! | removal                 | CRITICAL with external callers, else HIGH   |

use serde::{Deserialize, Serialize};
use tracing::debug;

use super::signature::{parse_signature, ParsedSignature};
use crate::features::symbol_graph::CodeGraph;
use crate::shared::models::{EdgeKind, EngineError, Result, SymbolId};

/// Breaking-change severity
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ChangeSeverity {
    Low,
    Medium,
    High,
    Critical,
}

/// One categorized breaking change
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BreakingChange {
    /// `param_added`, `param_removed`, `param_type_changed`,
    /// `return_shape_changed`, `return_type_changed`,
    /// `visibility_reduced`, `symbol_removed`
    pub category: String,

    pub severity: ChangeSeverity,
    pub description: String,
}

/// A call site that would break
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CallerRef {
    pub symbol_id: SymbolId,
    pub file_path: String,
    pub line: u32,

    /// Caller lives outside the changed symbol's package
    pub external: bool,
}

/// Breaking-change analysis result
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BreakingAnalysis {
    pub symbol_id: SymbolId,
    pub current: String,
    pub proposed: String,
    pub changes: Vec<BreakingChange>,
    pub callers: Vec<CallerRef>,

    /// At least one breaking change present
    pub breaking: bool,
}

/// Analyze a proposed signature change against the graph.
///
/// An empty `proposed` signature means the symbol is being removed.
pub fn analyze_breaking_change(
    graph: &CodeGraph,
    symbol_id: &str,
    current: &str,
    proposed: &str,
    language: &str,
) -> Result<BreakingAnalysis> {
    graph.ensure_frozen()?;
    let symbol = graph.require(symbol_id)?;
    if current.trim().is_empty() {
        return Err(EngineError::invalid_input("current signature must not be empty"));
    }

    let callers = collect_callers(graph, symbol_id, &symbol.package);
    let has_external_caller = callers.iter().any(|c| c.external);

    let mut changes = Vec::new();

    if proposed.trim().is_empty() {
        changes.push(BreakingChange {
            category: "symbol_removed".to_string(),
            severity: if has_external_caller {
                ChangeSeverity::Critical
            } else {
                ChangeSeverity::High
            },
            description: format!("{} is removed entirely", symbol.name),
        });
    } else {
        let current_sig = parse_signature(current, language)?;
        let proposed_sig = parse_signature(proposed, language)?;
        diff_params(&current_sig, &proposed_sig, &mut changes);
        diff_returns(&current_sig, &proposed_sig, &mut changes);
        diff_visibility(&current_sig, &proposed_sig, has_external_caller, &mut changes);
    }

    let breaking = !changes.is_empty();
    debug!(symbol_id, changes = changes.len(), callers = callers.len(), "breaking-change analysis");

    Ok(BreakingAnalysis {
        symbol_id: symbol_id.to_string(),
        current: current.to_string(),
        proposed: proposed.to_string(),
        changes,
        callers,
        breaking,
    })
}

fn collect_callers(graph: &CodeGraph, symbol_id: &str, owning_package: &str) -> Vec<CallerRef> {
    let mut callers: Vec<CallerRef> = graph
        .incoming_of_kind(symbol_id, EdgeKind::Calls)
        .map(|edge| {
            let external = graph
                .get(&edge.from)
                .map(|caller| caller.package != owning_package)
                .unwrap_or(true);
            CallerRef {
                symbol_id: edge.from.clone(),
                file_path: edge.file_path.clone(),
                line: edge.line,
                external,
            }
        })
        .collect();
    callers.sort_by(|a, b| {
        a.file_path
            .cmp(&b.file_path)
            .then_with(|| a.line.cmp(&b.line))
    });
    callers
}

fn diff_params(current: &ParsedSignature, proposed: &ParsedSignature, out: &mut Vec<BreakingChange>) {
    let current_types = current.param_types();
    let proposed_types = proposed.param_types();
    let shared = current_types.len().min(proposed_types.len());

    for i in 0..shared {
        if current_types[i] != proposed_types[i] {
            out.push(BreakingChange {
                category: "param_type_changed".to_string(),
                severity: ChangeSeverity::High,
                description: format!(
                    "parameter {} changes type from {} to {}",
                    i, current_types[i], proposed_types[i]
                ),
            });
        }
    }
    for added in &proposed_types[shared..] {
        out.push(BreakingChange {
            category: "param_added".to_string(),
            severity: ChangeSeverity::High,
            description: format!("required parameter of type {} is added", added),
        });
    }
    for removed in &current_types[shared..] {
        out.push(BreakingChange {
            category: "param_removed".to_string(),
            severity: ChangeSeverity::Medium,
            description: format!("parameter of type {} is removed", removed),
        });
    }
}

fn diff_returns(current: &ParsedSignature, proposed: &ParsedSignature, out: &mut Vec<BreakingChange>) {
    if current.returns.len() != proposed.returns.len() {
        out.push(BreakingChange {
            category: "return_shape_changed".to_string(),
            severity: ChangeSeverity::High,
            description: format!(
                "return count changes from {} to {}",
                current.returns.len(),
                proposed.returns.len()
            ),
        });
        return;
    }
    for (i, (old, new)) in current.returns.iter().zip(&proposed.returns).enumerate() {
        if old != new {
            out.push(BreakingChange {
                category: "return_type_changed".to_string(),
                severity: ChangeSeverity::High,
                description: format!("return {} changes type from {} to {}", i, old, new),
            });
        }
    }
}

fn diff_visibility(
    current: &ParsedSignature,
    proposed: &ParsedSignature,
    has_external_caller: bool,
    out: &mut Vec<BreakingChange>,
) {
    if current.exported() && !proposed.exported() && !proposed.name.is_empty() {
        out.push(BreakingChange {
            category: "visibility_reduced".to_string(),
            severity: if has_external_caller {
                ChangeSeverity::Critical
            } else {
                ChangeSeverity::High
            },
            description: format!("{} becomes unexported", current.name),
        });
    }
}

// ============================================================================
// Tests
// ============================================================================
