//! Code-smell detection
//!
//! Threshold-driven checks over symbols and (where the loader attached
//! them) function bodies. Regexes are compiled once; bodies are scanned in
//! a single pass each. Symbols without a body are skipped by body-driven
//! checks rather than guessed at.

use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use tracing::debug;

use super::detector::{symbols_in_scope, DetectionScope};
use crate::features::symbol_graph::CodeGraph;
use crate::shared::cancel::CancellationToken;
use crate::shared::models::{Result, Symbol, SymbolId, SymbolKind};
use crate::shared::signatures::param_list;

/// Detection thresholds
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct SmellThresholds {
    pub max_function_lines: u32,
    pub max_parameters: usize,
    pub max_method_count: usize,
    pub max_nesting_depth: u32,
}

impl Default for SmellThresholds {
    fn default() -> Self {
        Self {
            max_function_lines: 50,
            max_parameters: 5,
            max_method_count: 20,
            max_nesting_depth: 4,
        }
    }
}

/// Severity scale
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Severity {
    Low,
    Medium,
    High,
}

/// One detected smell
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CodeSmell {
    /// Smell tag (`long_function`, `god_object`, ...)
    pub smell: String,

    pub symbol_id: SymbolId,
    pub file_path: String,
    pub line: u32,
    pub severity: Severity,
    pub message: String,
}

/// Empty `if err != nil {}` block
static ERR_SWALLOW_BLOCK: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"if\s+err\s*!=\s*nil\s*\{\s*\}").expect("static regex"));

/// `_ = call(...)` discard
static ERR_DISCARD: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?m)^\s*_\s*=\s*\w+").expect("static regex"));

/// Integer literals of three or more digits
static MAGIC_NUMBER: Lazy<Regex> = Lazy::new(|| Regex::new(r"\b\d{3,}\b").expect("static regex"));

/// Literals that are conventional, not magic
const MAGIC_ALLOWLIST: &[&str] = &["100", "200", "404", "500", "1000", "1024", "8080"];

/// Scan the scope for smells, ordered by (file, line, smell).
pub fn detect_smells(
    graph: &CodeGraph,
    scope: &DetectionScope,
    thresholds: &SmellThresholds,
    token: &CancellationToken,
) -> Result<Vec<CodeSmell>> {
    graph.ensure_frozen()?;

    let symbols = symbols_in_scope(graph, scope);
    let mut smells = Vec::new();

    for (i, symbol) in symbols.iter().enumerate() {
        token.check_every(i, "detect_smells")?;
        if !symbol.kind.is_callable() {
            continue;
        }

        check_long_function(symbol, thresholds, &mut smells);
        check_long_parameter_list(symbol, thresholds, &mut smells);
        check_empty_interface_params(symbol, &mut smells);

        if let Some(body) = symbol.body.as_deref() {
            check_error_swallowing(symbol, body, &mut smells);
            check_magic_numbers(symbol, body, &mut smells);
            check_deep_nesting(symbol, body, thresholds, &mut smells);
        }
    }

    check_god_objects(&symbols, thresholds, &mut smells);

    smells.sort_by(|a, b| {
        a.file_path
            .cmp(&b.file_path)
            .then_with(|| a.line.cmp(&b.line))
            .then_with(|| a.smell.cmp(&b.smell))
    });

    debug!(smells = smells.len(), "smell detection complete");
    Ok(smells)
}

fn smell(symbol: &Symbol, tag: &str, severity: Severity, message: String) -> CodeSmell {
    CodeSmell {
        smell: tag.to_string(),
        symbol_id: symbol.id.clone(),
        file_path: symbol.file_path.clone(),
        line: symbol.start_line,
        severity,
        message,
    }
}

fn check_long_function(symbol: &Symbol, thresholds: &SmellThresholds, out: &mut Vec<CodeSmell>) {
    let span = symbol.line_span();
    if span <= thresholds.max_function_lines {
        return;
    }
    // Doubling the threshold escalates severity.
    let severity = if span > thresholds.max_function_lines * 2 {
        Severity::High
    } else {
        Severity::Medium
    };
    out.push(smell(
        symbol,
        "long_function",
        severity,
        format!(
            "{} spans {} lines (limit {})",
            symbol.name, span, thresholds.max_function_lines
        ),
    ));
}

fn check_long_parameter_list(
    symbol: &Symbol,
    thresholds: &SmellThresholds,
    out: &mut Vec<CodeSmell>,
) {
    let Some(sig) = symbol.signature.as_deref() else { return };
    let count = param_list(sig).len();
    if count > thresholds.max_parameters {
        out.push(smell(
            symbol,
            "long_parameter_list",
            Severity::Medium,
            format!(
                "{} takes {} parameters (limit {})",
                symbol.name, count, thresholds.max_parameters
            ),
        ));
    }
}

fn check_empty_interface_params(symbol: &Symbol, out: &mut Vec<CodeSmell>) {
    let Some(sig) = symbol.signature.as_deref() else { return };
    let has_empty_interface = param_list(sig)
        .iter()
        .any(|p| p.contains("interface{}") || p.ends_with(" any") || p == "any");
    if has_empty_interface {
        out.push(smell(
            symbol,
            "empty_interface_param",
            Severity::Low,
            format!("{} accepts an unconstrained interface parameter", symbol.name),
        ));
    }
}

fn check_error_swallowing(symbol: &Symbol, body: &str, out: &mut Vec<CodeSmell>) {
    if ERR_SWALLOW_BLOCK.is_match(body) || ERR_DISCARD.is_match(body) {
        out.push(smell(
            symbol,
            "error_swallowing",
            Severity::High,
            format!("{} discards an error result", symbol.name),
        ));
    }
}

fn check_magic_numbers(symbol: &Symbol, body: &str, out: &mut Vec<CodeSmell>) {
    let magic: Vec<&str> = MAGIC_NUMBER
        .find_iter(body)
        .map(|m| m.as_str())
        .filter(|literal| !MAGIC_ALLOWLIST.contains(literal))
        .collect();
    if !magic.is_empty() {
        out.push(smell(
            symbol,
            "magic_number",
            Severity::Low,
            format!("{} contains magic literals: {}", symbol.name, magic.join(", ")),
        ));
    }
}

fn check_deep_nesting(
    symbol: &Symbol,
    body: &str,
    thresholds: &SmellThresholds,
    out: &mut Vec<CodeSmell>,
) {
    let mut depth: i32 = 0;
    let mut max_depth: i32 = 0;
    for ch in body.chars() {
        match ch {
            '{' => {
                depth += 1;
                max_depth = max_depth.max(depth);
            }
            '}' => depth -= 1,
            _ => {}
        }
    }
    // The function's own braces contribute one level.
    let nesting = (max_depth - 1).max(0) as u32;
    if nesting > thresholds.max_nesting_depth {
        out.push(smell(
            symbol,
            "deep_nesting",
            Severity::Medium,
            format!(
                "{} nests {} levels deep (limit {})",
                symbol.name, nesting, thresholds.max_nesting_depth
            ),
        ));
    }
}

fn check_god_objects(symbols: &[&Symbol], thresholds: &SmellThresholds, out: &mut Vec<CodeSmell>) {
    use ahash::AHashMap;

    let mut methods_per_receiver: AHashMap<&str, (usize, &Symbol)> = AHashMap::new();
    for symbol in symbols.iter().filter(|s| s.kind == SymbolKind::Method) {
        if let Some(receiver) = symbol.receiver.as_deref() {
            let receiver = receiver.trim_start_matches('*');
            let entry = methods_per_receiver.entry(receiver).or_insert((0, symbol));
            entry.0 += 1;
        }
    }

    let mut offenders: Vec<(&str, usize, &Symbol)> = methods_per_receiver
        .into_iter()
        .filter(|(_, (count, _))| *count > thresholds.max_method_count)
        .map(|(receiver, (count, first))| (receiver, count, first))
        .collect();
    offenders.sort_by_key(|(receiver, _, _)| *receiver);

    for (receiver, count, first_method) in offenders {
        out.push(CodeSmell {
            smell: "god_object".to_string(),
            symbol_id: first_method.id.clone(),
            file_path: first_method.file_path.clone(),
            line: first_method.start_line,
            severity: Severity::High,
            message: format!(
                "{} exposes {} methods (limit {})",
                receiver, count, thresholds.max_method_count
            ),
        });
    }
}

// ============================================================================
// Tests
// ============================================================================
