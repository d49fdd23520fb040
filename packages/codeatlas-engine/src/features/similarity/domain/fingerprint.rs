//! AST-derived structural fingerprints
//!
//! A fingerprint abstracts a function into the features that survive
//! renaming: parameter/return shape, an estimated cyclomatic complexity,
//! abstracted node-type and call-pattern tags, a control-flow pattern
//! string, and a MinHash signature over all of it. Two fingerprints can be
//! compared in O(signature length) without touching source text.
//!
//! Fingerprints are immutable once constructed; the engine builds them in
//! one pass against the frozen graph.

use super::config::SimilarityConfig;
use crate::features::similarity::infrastructure::minhash::MinHashSignature;
use crate::shared::models::{Symbol, SymbolId, SymbolKind};
use crate::shared::signatures::{param_list, return_list};

/// Complexity estimates are capped here; beyond this the number carries no
/// additional signal for matching.
const MAX_COMPLEXITY: u32 = 50;

/// Immutable structural fingerprint of a single function or method
#[derive(Debug, Clone)]
pub struct AstFingerprint {
    pub symbol_id: SymbolId,
    pub name: String,
    pub file_path: String,

    pub param_count: usize,
    pub return_count: usize,

    /// Estimated cyclomatic complexity: `1 + line_span/5`, +1 for error
    /// handling, capped at 50
    pub complexity: u32,

    /// Ordered abstraction tags: kind, receiver presence, error return,
    /// context param, variadic, language
    pub node_types: Vec<String>,

    /// Deduplicated, sorted callee abstractions
    /// (`kind[_Nparams][_multi_return][_error]`)
    pub call_patterns: Vec<String>,

    /// Comma-joined control-flow tags (`error_handling`, `context_aware`,
    /// name-derived role)
    pub control_flow: String,

    pub has_error_return: bool,
    pub has_context_param: bool,

    /// MinHash over the joined feature set
    pub signature: MinHashSignature,
}

impl AstFingerprint {
    /// Build a fingerprint from a symbol and its resolved outgoing callees.
    pub fn from_symbol(symbol: &Symbol, callees: &[&Symbol], config: &SimilarityConfig) -> Self {
        let sig = symbol.signature.as_deref().unwrap_or("");

        let param_count = param_list(sig).len();
        let returns = return_list(sig);
        let return_count = returns.len();

        let has_error_return = signature_mentions_error(sig);
        let has_context_param = sig.contains("context") || sig.contains("Context");
        let variadic = sig.contains("...") || sig.contains("*args");

        let control_flow = control_flow_pattern(symbol, has_error_return, has_context_param);
        let node_types = node_type_tags(
            symbol,
            has_error_return,
            has_context_param,
            variadic,
        );
        let call_patterns = call_pattern_tags(callees);

        let complexity = estimate_complexity(symbol.line_span(), has_error_return);

        let mut features = node_types.clone();
        if config.include_call_pattern {
            features.extend(call_patterns.iter().cloned());
        }
        if !control_flow.is_empty() {
            features.push(control_flow.clone());
        }
        let signature =
            MinHashSignature::from_features(&features, config.shingle_size, config.num_hashes);

        Self {
            symbol_id: symbol.id.clone(),
            name: symbol.name.clone(),
            file_path: symbol.file_path.clone(),
            param_count,
            return_count,
            complexity,
            node_types,
            call_patterns,
            control_flow,
            has_error_return,
            has_context_param,
            signature,
        }
    }

    /// Control-flow tags as individual tokens
    pub fn control_flow_tokens(&self) -> Vec<&str> {
        if self.control_flow.is_empty() {
            Vec::new()
        } else {
            self.control_flow.split(',').collect()
        }
    }
}

fn signature_mentions_error(signature: &str) -> bool {
    signature.contains("error") || signature.contains("Error") || signature.contains("Exception")
}

/// `1 + line_span/5`, +1 for error handling, capped
fn estimate_complexity(line_span: u32, has_error_handling: bool) -> u32 {
    let mut complexity = 1 + line_span / 5;
    if has_error_handling {
        complexity += 1;
    }
    complexity.min(MAX_COMPLEXITY)
}

fn control_flow_pattern(symbol: &Symbol, has_error: bool, has_context: bool) -> String {
    let mut tags: Vec<&str> = Vec::new();
    if has_error {
        tags.push("error_handling");
    }
    if has_context {
        tags.push("context_aware");
    }
    if let Some(role) = name_role(&symbol.name) {
        tags.push(role);
    }
    tags.join(",")
}

/// Role tag derived from a conventional name prefix
fn name_role(name: &str) -> Option<&'static str> {
    let lower = name.to_lowercase();
    if lower.starts_with("get") {
        Some("accessor")
    } else if lower.starts_with("set") {
        Some("mutator")
    } else if lower.starts_with("is") || lower.starts_with("has") {
        Some("predicate")
    } else if lower.starts_with("new") {
        Some("constructor")
    } else if lower.starts_with("handle") {
        Some("handler")
    } else if lower.starts_with("validate") {
        Some("validator")
    } else {
        None
    }
}

fn node_type_tags(
    symbol: &Symbol,
    has_error: bool,
    has_context: bool,
    variadic: bool,
) -> Vec<String> {
    let mut tags = vec![symbol.kind.as_str().to_string()];
    if symbol.receiver.is_some() || symbol.kind == SymbolKind::Method {
        tags.push("has_receiver".to_string());
    }
    if has_error {
        tags.push("returns_error".to_string());
    }
    if has_context {
        tags.push("takes_context".to_string());
    }
    if variadic {
        tags.push("variadic".to_string());
    }
    tags.push(symbol.language.clone());
    tags
}

/// Abstract each callee to `kind[_Nparams][_multi_return][_error]`,
/// dedupe and sort.
fn call_pattern_tags(callees: &[&Symbol]) -> Vec<String> {
    let mut patterns: Vec<String> = callees
        .iter()
        .map(|callee| {
            let sig = callee.signature.as_deref().unwrap_or("");
            let params = param_list(sig).len();
            let returns = return_list(sig).len();

            let mut pattern = callee.kind.as_str().to_string();
            if params > 0 {
                pattern.push_str(&format!("_{}params", params));
            }
            if returns > 1 {
                pattern.push_str("_multi_return");
            }
            if signature_mentions_error(sig) {
                pattern.push_str("_error");
            }
            pattern
        })
        .collect();

    patterns.sort();
    patterns.dedup();
    patterns
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn handler_symbol() -> Symbol {
        Symbol::new("HandleCreate", SymbolKind::Function, "go", "handlers/api.go", 20, 44)
            .with_signature("func HandleCreate(ctx context.Context, req *Request) (*Response, error)")
    }

    #[test]
    fn test_counts_and_flags() {
        let fp = AstFingerprint::from_symbol(&handler_symbol(), &[], &SimilarityConfig::default());

        assert_eq!(fp.param_count, 2);
        assert_eq!(fp.return_count, 2);
        assert!(fp.has_error_return);
        assert!(fp.has_context_param);
    }

    #[test]
    fn test_complexity_estimate() {
        // 25 lines → 1 + 25/5 = 6, +1 for error handling
        let fp = AstFingerprint::from_symbol(&handler_symbol(), &[], &SimilarityConfig::default());
        assert_eq!(fp.complexity, 7);

        // Cap at 50
        let huge = Symbol::new("f", SymbolKind::Function, "go", "a.go", 1, 1000)
            .with_signature("func f() error");
        let fp = AstFingerprint::from_symbol(&huge, &[], &SimilarityConfig::default());
        assert_eq!(fp.complexity, 50);
    }

    #[test]
    fn test_control_flow_tags() {
        let fp = AstFingerprint::from_symbol(&handler_symbol(), &[], &SimilarityConfig::default());
        assert_eq!(fp.control_flow, "error_handling,context_aware,handler");

        let plain = Symbol::new("transform", SymbolKind::Function, "go", "a.go", 1, 3)
            .with_signature("func transform(s string) string");
        let fp = AstFingerprint::from_symbol(&plain, &[], &SimilarityConfig::default());
        assert!(fp.control_flow.is_empty());
    }

    #[test]
    fn test_node_type_tags_order() {
        let method = Symbol::new("Get", SymbolKind::Method, "go", "a.go", 1, 10)
            .with_signature("func (s *Store) Get(id string) (*User, error)")
            .with_receiver("*Store");
        let fp = AstFingerprint::from_symbol(&method, &[], &SimilarityConfig::default());

        assert_eq!(
            fp.node_types,
            vec!["method", "has_receiver", "returns_error", "go"]
        );
    }

    #[test]
    fn test_call_patterns_deduped_and_sorted() {
        let callee_a = Symbol::new("save", SymbolKind::Function, "go", "db.go", 1, 5)
            .with_signature("func save(u *User) error");
        let callee_b = Symbol::new("store", SymbolKind::Function, "go", "db.go", 10, 15)
            .with_signature("func store(u *User) error");
        let callee_c = Symbol::new("load", SymbolKind::Function, "go", "db.go", 20, 30)
            .with_signature("func load(id string, opts Options) (*User, error)");

        let fp = AstFingerprint::from_symbol(
            &handler_symbol(),
            &[&callee_a, &callee_b, &callee_c],
            &SimilarityConfig::default(),
        );

        // a and b abstract identically and collapse to one pattern.
        assert_eq!(
            fp.call_patterns,
            vec!["function_1params_error", "function_2params_multi_return_error"]
        );
    }

    #[test]
    fn test_identical_symbols_identical_signatures() {
        let config = SimilarityConfig::default();
        let a = AstFingerprint::from_symbol(&handler_symbol(), &[], &config);
        let b = AstFingerprint::from_symbol(&handler_symbol(), &[], &config);
        assert_eq!(a.signature.jaccard_estimate(&b.signature), 1.0);
    }
}
