//! Exploration result vocabulary
//!
//! Stable, JSON-shaped value types returned by the exploration engine.
//! These are the language-independent contract with callers; fields are
//! never repurposed, only added.

use serde::{Deserialize, Serialize};

use crate::shared::models::SymbolId;

/// One discovered entry point
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EntryPoint {
    pub symbol_id: SymbolId,
    pub name: String,
    pub file_path: String,
    pub line: u32,

    /// `main`, `handler`, `command`, `test`, `lambda`, `grpc`
    pub entry_type: String,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub framework: Option<String>,
}

/// Entry-point discovery result
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EntryPointResult {
    pub entry_points: Vec<EntryPoint>,
    pub total_found: usize,
    pub truncated: bool,
}

/// Entry-point discovery options
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EntryPointQuery {
    /// Restrict to one entry type; `None` (or "all") matches every type
    #[serde(skip_serializing_if = "Option::is_none")]
    pub entry_type: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub package: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub language: Option<String>,

    pub limit: usize,
    pub include_tests: bool,
}

impl Default for EntryPointQuery {
    fn default() -> Self {
        Self {
            entry_type: None,
            package: None,
            language: None,
            limit: 100,
            include_tests: false,
        }
    }
}

impl EntryPointQuery {
    /// Effective type filter: "all" and empty behave like no filter.
    pub fn type_filter(&self) -> Option<&str> {
        match self.entry_type.as_deref() {
            None | Some("") | Some("all") => None,
            Some(t) => Some(t),
        }
    }
}

/// Type declared in a file, with shape counts
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TypeSummary {
    pub name: String,
    pub kind: String,
    pub field_count: usize,
    pub method_count: usize,
    pub exported: bool,
}

/// Function declared in a file
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FunctionSummary {
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub signature: Option<String>,
    pub exported: bool,
    pub line: u32,
}

/// One-file structural summary
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FileSummary {
    pub file_path: String,

    /// One-line inferred purpose; empty when nothing could be inferred
    pub purpose: String,

    pub imports: Vec<String>,
    pub types: Vec<TypeSummary>,
    pub functions: Vec<FunctionSummary>,
    pub symbol_count: usize,
}

/// Exported member of a package
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiMember {
    pub name: String,
    pub kind: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub signature: Option<String>,
    pub file_path: String,
    pub line: u32,
}

/// Public API of a package (exported members only)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PackageApi {
    pub package: String,
    pub files: Vec<String>,
    pub types: Vec<ApiMember>,
    pub functions: Vec<ApiMember>,
    pub constants: Vec<ApiMember>,
}

/// Classification of one node visited during a data-flow trace
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DataPoint {
    pub symbol_id: SymbolId,
    pub name: String,

    /// `source`, `sink` or `transform`
    #[serde(rename = "type")]
    pub point_type: String,

    /// Registry category (`http_input`, `network`, ...); `transform` points
    /// carry an empty category
    pub category: String,

    pub file_path: String,
    pub line: u32,

    /// Meaningful for sinks only
    pub dangerous: bool,
}

/// Data-flow trace result
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DataFlow {
    pub start: SymbolId,

    /// `forward` or `reverse`
    pub direction: String,

    pub sources: Vec<DataPoint>,
    pub transforms: Vec<DataPoint>,
    pub sinks: Vec<DataPoint>,

    /// Symbol IDs in visit order
    pub path: Vec<SymbolId>,

    pub truncated: bool,

    /// Analysis precision; always `function` for this engine
    pub precision: String,

    /// Static-analysis caveats attached to every trace
    pub limitations: Vec<String>,
}

/// One similar-code match, optionally carrying the matched source text
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SimilarCodeMatch {
    pub symbol_id: SymbolId,
    pub similarity: f64,
    pub file_path: String,
    pub matched_traits: Vec<String>,
    pub why: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub code: Option<String>,
}

/// Similar-code query result
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SimilarCode {
    pub query: SymbolId,
    pub results: Vec<SimilarCodeMatch>,

    /// `lsh` when the candidate set came from banded lookup,
    /// `brute_force` when the small-corpus fallback ran
    pub method: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_type_filter_normalization() {
        let mut query = EntryPointQuery::default();
        assert_eq!(query.type_filter(), None);

        query.entry_type = Some("all".to_string());
        assert_eq!(query.type_filter(), None);

        query.entry_type = Some("handler".to_string());
        assert_eq!(query.type_filter(), Some("handler"));
    }

    #[test]
    fn test_data_point_serializes_type_field() {
        let point = DataPoint {
            symbol_id: "a.go:1:f".to_string(),
            name: "f".to_string(),
            point_type: "sink".to_string(),
            category: "network".to_string(),
            file_path: "a.go".to_string(),
            line: 1,
            dangerous: true,
        };
        let json = serde_json::to_value(&point).unwrap();
        assert_eq!(json["type"], "sink");
        assert_eq!(json["category"], "network");
    }

    #[test]
    fn test_default_query_shape() {
        let query = EntryPointQuery::default();
        assert_eq!(query.limit, 100);
        assert!(!query.include_tests);
    }
}
