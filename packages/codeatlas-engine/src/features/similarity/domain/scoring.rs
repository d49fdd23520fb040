//! Weighted structural similarity
//!
//! Combines the MinHash Jaccard estimate with signature-shape agreement
//! into one calibrated score, collecting human-readable trait labels as
//! justification:
//!
//! | Weight | Component        | Credit                                   |
//! |--------|------------------|------------------------------------------|
//! | 0.40   | MinHash Jaccard  | raw estimate                             |
//! | 0.15   | parameter count  | full on match, half when off by one      |
//! | 0.15   | return count     | full on match, half when off by one      |
//! | 0.15   | complexity       | linear falloff within ±2, zero beyond    |
//! | 0.15   | control flow     | exact pattern or ≥50% token overlap      |
//!
//! The sum is normalized by the weights actually applied and clamped to
//! [0, 1].

use ahash::AHashSet;

use super::fingerprint::AstFingerprint;

const WEIGHT_MINHASH: f64 = 0.40;
const WEIGHT_PARAMS: f64 = 0.15;
const WEIGHT_RETURNS: f64 = 0.15;
const WEIGHT_COMPLEXITY: f64 = 0.15;
const WEIGHT_CONTROL_FLOW: f64 = 0.15;

/// Jaccard estimate at or above which the pair is structurally overlapping
const STRUCTURAL_OVERLAP_THRESHOLD: f64 = 0.5;

/// Similarity score with its justification
#[derive(Debug, Clone)]
pub struct SimilarityScore {
    /// Normalized weighted similarity in [0, 1]
    pub score: f64,

    /// Trait labels explaining which components matched
    pub matched_traits: Vec<String>,
}

impl SimilarityScore {
    /// Human-readable one-line justification built from the traits.
    pub fn why(&self) -> String {
        let mut phrases: Vec<&str> = Vec::new();
        for t in &self.matched_traits {
            match t.as_str() {
                "structural_overlap" => phrases.push("similar code structure"),
                "same_complexity" => phrases.push("same complexity level"),
                "similar_complexity" => phrases.push("comparable complexity"),
                "same_param_count" => phrases.push("matching parameter shape"),
                "same_return_count" => phrases.push("matching return shape"),
                "same_control_flow" => phrases.push("matching control flow"),
                _ => {}
            }
        }
        if phrases.is_empty() {
            "weak structural resemblance".to_string()
        } else {
            phrases.join(" and ")
        }
    }
}

/// Compute the weighted overall similarity of two fingerprints.
pub fn overall_similarity(a: &AstFingerprint, b: &AstFingerprint) -> SimilarityScore {
    let mut total = 0.0;
    let mut applied = 0.0;
    let mut traits = Vec::new();

    // MinHash structural estimate
    let jaccard = a.signature.jaccard_estimate(&b.signature);
    total += WEIGHT_MINHASH * jaccard;
    applied += WEIGHT_MINHASH;
    if jaccard >= STRUCTURAL_OVERLAP_THRESHOLD {
        traits.push("structural_overlap".to_string());
    }

    // Parameter count
    let param_score = count_match(a.param_count, b.param_count);
    total += WEIGHT_PARAMS * param_score;
    applied += WEIGHT_PARAMS;
    if param_score == 1.0 {
        traits.push("same_param_count".to_string());
    }

    // Return count
    let return_score = count_match(a.return_count, b.return_count);
    total += WEIGHT_RETURNS * return_score;
    applied += WEIGHT_RETURNS;
    if return_score == 1.0 {
        traits.push("same_return_count".to_string());
    }

    // Complexity: linear falloff within ±2
    let diff = a.complexity.abs_diff(b.complexity);
    let complexity_score = if diff <= 2 { 1.0 - diff as f64 / 2.0 } else { 0.0 };
    total += WEIGHT_COMPLEXITY * complexity_score;
    applied += WEIGHT_COMPLEXITY;
    if diff == 0 {
        traits.push("same_complexity".to_string());
    } else if complexity_score > 0.0 {
        traits.push("similar_complexity".to_string());
    }

    // Control flow: exact or majority token overlap
    let control_score = control_flow_match(a, b);
    total += WEIGHT_CONTROL_FLOW * control_score;
    applied += WEIGHT_CONTROL_FLOW;
    if control_score == 1.0 && !a.control_flow.is_empty() {
        traits.push("same_control_flow".to_string());
    }

    let score = (total / applied).clamp(0.0, 1.0);
    SimilarityScore {
        score,
        matched_traits: traits,
    }
}

fn count_match(a: usize, b: usize) -> f64 {
    if a == b {
        1.0
    } else if a.abs_diff(b) == 1 {
        0.5
    } else {
        0.0
    }
}

fn control_flow_match(a: &AstFingerprint, b: &AstFingerprint) -> f64 {
    if a.control_flow == b.control_flow {
        return 1.0;
    }

    let tokens_a: AHashSet<&str> = a.control_flow_tokens().into_iter().collect();
    let tokens_b: AHashSet<&str> = b.control_flow_tokens().into_iter().collect();
    if tokens_a.is_empty() || tokens_b.is_empty() {
        return 0.0;
    }

    let shared = tokens_a.intersection(&tokens_b).count();
    let larger = tokens_a.len().max(tokens_b.len());
    if shared * 2 >= larger {
        1.0
    } else {
        0.0
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::features::similarity::domain::config::SimilarityConfig;
    use crate::shared::models::{Symbol, SymbolKind};

    fn fingerprint(name: &str, signature: &str, lines: u32) -> AstFingerprint {
        let symbol = Symbol::new(name, SymbolKind::Function, "go", "svc/a.go", 10, 10 + lines)
            .with_signature(signature);
        AstFingerprint::from_symbol(&symbol, &[], &SimilarityConfig::default())
    }

    #[test]
    fn test_identical_shape_scores_one() {
        let a = fingerprint("HandleA", "func HandleA(ctx context.Context, req *T) (*R, error)", 20);
        let b = fingerprint("HandleB", "func HandleB(ctx context.Context, req *T) (*R, error)", 20);

        let result = overall_similarity(&a, &b);
        assert!(result.score > 0.99, "score was {}", result.score);
        assert!(result.matched_traits.contains(&"same_param_count".to_string()));
        assert!(result.matched_traits.contains(&"same_return_count".to_string()));
        assert!(result.matched_traits.contains(&"structural_overlap".to_string()));
        assert!(result.matched_traits.contains(&"same_complexity".to_string()));
    }

    #[test]
    fn test_unrelated_shape_scores_low() {
        let a = fingerprint("HandleA", "func HandleA(ctx context.Context, req *T) (*R, error)", 20);
        let c = fingerprint("id", "func(s string) string", 1);

        let result = overall_similarity(&a, &c);
        assert!(result.score <= 0.4, "score was {}", result.score);
    }

    #[test]
    fn test_off_by_one_counts_get_half_credit() {
        assert_eq!(count_match(2, 2), 1.0);
        assert_eq!(count_match(2, 3), 0.5);
        assert_eq!(count_match(2, 5), 0.0);
    }

    #[test]
    fn test_complexity_falloff() {
        let a = fingerprint("a", "func a(x int) int", 10); // complexity 3
        let b = fingerprint("b", "func b(x int) int", 20); // complexity 5

        let result = overall_similarity(&a, &b);
        // diff == 2 → complexity component contributes zero but still applies
        assert!(!result.matched_traits.contains(&"same_complexity".to_string()));
        assert!(!result.matched_traits.contains(&"similar_complexity".to_string()));
    }

    #[test]
    fn test_why_mentions_structure_and_complexity() {
        let a = fingerprint("HandleA", "func HandleA(ctx context.Context, r *T) (*R, error)", 20);
        let b = fingerprint("HandleB", "func HandleB(ctx context.Context, r *T) (*R, error)", 20);

        let why = overall_similarity(&a, &b).why();
        assert!(why.contains("similar code structure"), "why: {}", why);
        assert!(why.contains("same complexity level"), "why: {}", why);
    }

    #[test]
    fn test_score_symmetry() {
        let a = fingerprint("a", "func a(x int, y int) error", 12);
        let b = fingerprint("b", "func b(x string) (int, error)", 30);

        let ab = overall_similarity(&a, &b).score;
        let ba = overall_similarity(&b, &a).score;
        assert!((ab - ba).abs() < f64::EPSILON);
    }
}
