//! Duplicate-code detection
//!
//! Token-level fingerprinting tuned for the ≥0.8 similarity band:
//!
//! 1. Normalize the token stream (identifiers/numbers/strings become
//!    placeholders, punctuation-only stop tokens drop out)
//! 2. k-grams (k=5) over the normalized stream, FNV-hashed
//! 3. MinHash signature of length 100
//! 4. Banded LSH with 20 bands × 5 rows (candidate threshold ≈ 0.8)
//!
//! Pairs are reported once under a canonical key and classified exact /
//! structural / near, each with its own confidence multiplier and a
//! refactoring suggestion.

use ahash::{AHashMap, AHashSet};
use serde::{Deserialize, Serialize};
use tracing::debug;

use super::detector::{symbols_in_scope, DetectionScope};
use crate::features::similarity::infrastructure::lsh::LshIndex;
use crate::features::similarity::infrastructure::minhash::{fnv1a, MinHashSignature};
use crate::features::symbol_graph::CodeGraph;
use crate::shared::cancel::CancellationToken;
use crate::shared::models::{Result, Symbol, SymbolId};

const SIGNATURE_LEN: usize = 100;
const NUM_BANDS: usize = 20;
const BAND_SIZE: usize = 5;
const KGRAM: usize = 5;

/// Duplication detector options
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DuplicationConfig {
    /// Minimum body span (lines) for a symbol to participate
    pub min_lines: u32,

    /// Pairs below this estimated similarity are dropped
    pub similarity_threshold: f64,

    pub include_tests: bool,

    /// 0 = unbounded
    pub max_results: usize,

    /// Confidence multipliers per classification; heuristic and therefore
    /// surfaced as configuration rather than buried as constants
    pub exact_confidence: f64,
    pub near_confidence: f64,
    pub structural_confidence: f64,
}

impl Default for DuplicationConfig {
    fn default() -> Self {
        Self {
            min_lines: 5,
            similarity_threshold: 0.8,
            include_tests: false,
            max_results: 0,
            exact_confidence: 1.0,
            near_confidence: 0.9,
            structural_confidence: 0.8,
        }
    }
}

/// One duplicated pair
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Duplication {
    /// Canonical `first|second` key with `first < second`
    pub pair_key: String,

    pub first: SymbolId,
    pub second: SymbolId,

    pub similarity: f64,

    /// `exact` (≥0.95), `structural` (same control shape, ≥0.6), else `near`
    pub kind: String,

    pub confidence: f64,

    pub suggestion: String,
}

struct TokenFingerprint<'a> {
    symbol: &'a Symbol,
    structure_tag: String,
    signature: MinHashSignature,
}

/// Detect duplicated function bodies in scope, ordered by descending
/// similarity then pair key.
pub fn detect_duplication(
    graph: &CodeGraph,
    scope: &DetectionScope,
    config: &DuplicationConfig,
    token: &CancellationToken,
) -> Result<Vec<Duplication>> {
    graph.ensure_frozen()?;

    let fingerprints = fingerprint_scope(graph, scope, config, token)?;
    let mut lsh = LshIndex::new(NUM_BANDS, BAND_SIZE);
    for fp in &fingerprints {
        lsh.insert(&fp.symbol.id, &fp.signature);
    }
    let by_id: AHashMap<&str, &TokenFingerprint> = fingerprints
        .iter()
        .map(|fp| (fp.symbol.id.as_str(), fp))
        .collect();

    let mut seen: AHashSet<String> = AHashSet::new();
    let mut pairs = Vec::new();

    for (i, fp) in fingerprints.iter().enumerate() {
        token.check_every(i, "detect_duplication")?;

        for candidate_id in lsh.query(&fp.symbol.id, &fp.signature, usize::MAX) {
            let Some(other) = by_id.get(candidate_id.as_str()) else { continue };

            let (first, second) = if fp.symbol.id < other.symbol.id {
                (fp, *other)
            } else {
                (*other, fp)
            };
            let pair_key = format!("{}|{}", first.symbol.id, second.symbol.id);
            if !seen.insert(pair_key.clone()) {
                continue;
            }

            let similarity = first.signature.jaccard_estimate(&second.signature);
            if similarity < config.similarity_threshold {
                continue;
            }

            let (kind, confidence) = classify(first, second, similarity, config);
            pairs.push(Duplication {
                pair_key,
                first: first.symbol.id.clone(),
                second: second.symbol.id.clone(),
                similarity,
                suggestion: suggestion_for(&kind).to_string(),
                kind,
                confidence,
            });
        }
    }

    pairs.sort_by(|a, b| {
        b.similarity
            .partial_cmp(&a.similarity)
            .unwrap_or(std::cmp::Ordering::Equal)
            .then_with(|| a.pair_key.cmp(&b.pair_key))
    });
    if config.max_results > 0 {
        pairs.truncate(config.max_results);
    }

    debug!(pairs = pairs.len(), corpus = fingerprints.len(), "duplication scan complete");
    Ok(pairs)
}

fn fingerprint_scope<'a>(
    graph: &'a CodeGraph,
    scope: &DetectionScope,
    config: &DuplicationConfig,
    token: &CancellationToken,
) -> Result<Vec<TokenFingerprint<'a>>> {
    let mut fingerprints = Vec::new();

    for (i, symbol) in symbols_in_scope(graph, scope).into_iter().enumerate() {
        token.check_every(i, "detect_duplication")?;

        if !symbol.kind.is_callable() || symbol.line_span() < config.min_lines {
            continue;
        }
        if !config.include_tests && symbol.in_test_file() {
            continue;
        }
        let Some(body) = symbol.body.as_deref() else { continue };

        let tokens = normalize_tokens(body);
        if tokens.len() < KGRAM {
            continue;
        }
        let grams: Vec<u64> = tokens
            .windows(KGRAM)
            .map(|window| fnv1a(window.join(" ").as_bytes()))
            .collect();

        fingerprints.push(TokenFingerprint {
            symbol,
            structure_tag: structure_tag(body),
            signature: MinHashSignature::from_hashed_features(&grams, SIGNATURE_LEN),
        });
    }
    Ok(fingerprints)
}

/// Identifiers, numbers and strings collapse to placeholders; punctuation
/// stop tokens drop out; keywords survive as themselves.
fn normalize_tokens(body: &str) -> Vec<String> {
    const KEYWORDS: &[&str] = &[
        "if", "else", "for", "while", "switch", "case", "return", "break", "continue", "func",
        "fn", "def", "var", "let", "const", "range", "match", "defer", "go", "try", "except",
        "catch", "finally", "nil", "null", "None", "true", "false",
    ];

    let mut tokens = Vec::new();
    let mut chars = body.chars().peekable();

    while let Some(&ch) = chars.peek() {
        if ch.is_alphabetic() || ch == '_' {
            let mut word = String::new();
            while let Some(&c) = chars.peek() {
                if c.is_alphanumeric() || c == '_' {
                    word.push(c);
                    chars.next();
                } else {
                    break;
                }
            }
            if KEYWORDS.contains(&word.as_str()) {
                tokens.push(word);
            } else {
                tokens.push("id".to_string());
            }
        } else if ch.is_ascii_digit() {
            while chars.peek().map(|c| c.is_ascii_digit() || *c == '.').unwrap_or(false) {
                chars.next();
            }
            tokens.push("num".to_string());
        } else if ch == '"' || ch == '\'' || ch == '`' {
            let quote = ch;
            chars.next();
            while let Some(c) = chars.next() {
                if c == quote {
                    break;
                }
                if c == '\\' {
                    chars.next();
                }
            }
            tokens.push("str".to_string());
        } else if "+-*/%<>=!&|".contains(ch) {
            let mut op = String::new();
            while chars.peek().map(|c| "+-*/%<>=!&|".contains(*c)).unwrap_or(false) {
                op.push(chars.next().unwrap());
            }
            tokens.push(op);
        } else {
            // Punctuation and whitespace are stop tokens.
            chars.next();
        }
    }
    tokens
}

/// Coarse control shape: the sequence of control keywords.
fn structure_tag(body: &str) -> String {
    normalize_tokens(body)
        .into_iter()
        .filter(|t| {
            matches!(
                t.as_str(),
                "if" | "else" | "for" | "while" | "switch" | "match" | "return" | "defer" | "try"
            )
        })
        .collect::<Vec<_>>()
        .join(",")
}

fn classify(
    first: &TokenFingerprint,
    second: &TokenFingerprint,
    similarity: f64,
    config: &DuplicationConfig,
) -> (String, f64) {
    if similarity >= 0.95 {
        ("exact".to_string(), config.exact_confidence)
    } else if first.structure_tag == second.structure_tag && similarity >= 0.6 {
        ("structural".to_string(), config.structural_confidence)
    } else {
        ("near".to_string(), config.near_confidence)
    }
}

fn suggestion_for(kind: &str) -> &'static str {
    match kind {
        "exact" => "extract the duplicated body into a shared function and call it from both sites",
        "structural" => "extract a helper parameterized over the differing identifiers and literals",
        _ => "review both implementations and consolidate where behavior is intended to match",
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::shared::models::SymbolKind;

    const BODY_A: &str = r#"
func process(items []Item) error {
    for _, item := range items {
        if item.Value > 10 {
            total += item.Value
        } else {
            skipped++
        }
    }
    if total > 500 {
        return errors.New("too large")
    }
    return nil
}
"#;

    // Identical shape, renamed identifiers and different literals.
    const BODY_B: &str = r#"
func tally(records []Record) error {
    for _, rec := range records {
        if rec.Amount > 25 {
            sum += rec.Amount
        } else {
            ignored++
        }
    }
    if sum > 900 {
        return errors.New("overflow")
    }
    return nil
}
"#;

    const BODY_C: &str = r#"
func renderTemplate(w io.Writer, name string) {
    tmpl := lookup(name)
    data := defaults()
    tmpl.Execute(w, data)
    metrics.Record(name)
    cleanup(tmpl)
    audit(name)
}
"#;

    fn graph() -> CodeGraph {
        let mut g = CodeGraph::new();
        g.add_symbol(
            Symbol::new("process", SymbolKind::Function, "go", "a/process.go", 1, 15)
                .with_body(BODY_A),
        )
        .unwrap();
        g.add_symbol(
            Symbol::new("tally", SymbolKind::Function, "go", "b/tally.go", 1, 15)
                .with_body(BODY_B),
        )
        .unwrap();
        g.add_symbol(
            Symbol::new("renderTemplate", SymbolKind::Function, "go", "c/render.go", 1, 10)
                .with_body(BODY_C),
        )
        .unwrap();
        g.freeze();
        g
    }

    fn detect(g: &CodeGraph, config: &DuplicationConfig) -> Vec<Duplication> {
        detect_duplication(g, &DetectionScope::default(), config, &CancellationToken::new())
            .unwrap()
    }

    #[test]
    fn test_renamed_clone_detected() {
        let g = graph();
        let pairs = detect(&g, &DuplicationConfig::default());

        assert_eq!(pairs.len(), 1, "only the renamed pair should survive");
        let pair = &pairs[0];
        assert!(pair.first.contains("process"));
        assert!(pair.second.contains("tally"));
        assert!(pair.similarity >= 0.8);
        assert_eq!(pair.pair_key, format!("{}|{}", pair.first, pair.second));
    }

    #[test]
    fn test_identical_bodies_are_exact() {
        let mut g = CodeGraph::new();
        g.add_symbol(
            Symbol::new("one", SymbolKind::Function, "go", "x/one.go", 1, 15).with_body(BODY_A),
        )
        .unwrap();
        g.add_symbol(
            Symbol::new("two", SymbolKind::Function, "go", "y/two.go", 1, 15).with_body(BODY_A),
        )
        .unwrap();
        g.freeze();

        let pairs = detect(&g, &DuplicationConfig::default());
        assert_eq!(pairs.len(), 1);
        assert_eq!(pairs[0].kind, "exact");
        assert!((pairs[0].similarity - 1.0).abs() < 1e-9);
        assert!((pairs[0].confidence - 1.0).abs() < 1e-9);
        assert!(pairs[0].suggestion.contains("extract"));
    }

    #[test]
    fn test_min_lines_excludes_short_bodies() {
        let mut g = CodeGraph::new();
        g.add_symbol(
            Symbol::new("one", SymbolKind::Function, "go", "x/one.go", 1, 2).with_body(BODY_A),
        )
        .unwrap();
        g.add_symbol(
            Symbol::new("two", SymbolKind::Function, "go", "y/two.go", 1, 2).with_body(BODY_A),
        )
        .unwrap();
        g.freeze();

        assert!(detect(&g, &DuplicationConfig::default()).is_empty());
    }

    #[test]
    fn test_tests_excluded_by_default() {
        let mut g = CodeGraph::new();
        g.add_symbol(
            Symbol::new("TestOne", SymbolKind::Function, "go", "x/one_test.go", 1, 15)
                .with_body(BODY_A),
        )
        .unwrap();
        g.add_symbol(
            Symbol::new("TestTwo", SymbolKind::Function, "go", "y/two_test.go", 1, 15)
                .with_body(BODY_A),
        )
        .unwrap();
        g.freeze();

        assert!(detect(&g, &DuplicationConfig::default()).is_empty());

        let include = DuplicationConfig {
            include_tests: true,
            ..Default::default()
        };
        assert_eq!(detect(&g, &include).len(), 1);
    }

    #[test]
    fn test_max_results_caps_output() {
        let mut g = CodeGraph::new();
        for (name, file) in [("a", "p/a.go"), ("b", "q/b.go"), ("c", "r/c.go")] {
            g.add_symbol(
                Symbol::new(name, SymbolKind::Function, "go", file, 1, 15).with_body(BODY_A),
            )
            .unwrap();
        }
        g.freeze();

        let capped = DuplicationConfig {
            max_results: 1,
            ..Default::default()
        };
        assert_eq!(detect(&g, &capped).len(), 1);
    }

    #[test]
    fn test_normalize_tokens_collapses_identifiers() {
        let tokens = normalize_tokens("if count > 10 { total += count }");
        assert_eq!(tokens, vec!["if", "id", ">", "num", "id", "+=", "id"]);
    }

    #[test]
    fn test_structure_tag() {
        assert_eq!(structure_tag("if a { return b } return c"), "if,return,return");
    }
}
