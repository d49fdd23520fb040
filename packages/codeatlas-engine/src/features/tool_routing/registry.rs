//! Tool-routing registry
//!
//! Routes a free-text user intent to the right analysis tool. Two maps:
//! tool name → entry, and lowercased keyword → tool names. Single-word
//! keywords match query tokens exactly; multi-word keywords are stored
//! with their spaces and substring-matched against the whole query. The
//! process-wide instance initializes once under double-checked locking;
//! read paths take no lock after that. Reset exists only as a test hook.

use std::sync::Arc;

use ahash::AHashMap;
use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use tracing::debug;

use super::loader;
use crate::shared::models::{EngineError, Result};

/// Hard caps on registry size
pub const MAX_TOOLS: usize = 200;
pub const MAX_KEYWORDS_PER_TOOL: usize = 50;

/// One routable tool
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ToolEntry {
    pub name: String,
    pub description: String,
    #[serde(default)]
    pub keywords: Vec<String>,
    #[serde(default)]
    pub category: Option<String>,
}

/// YAML document shape
#[derive(Debug, Deserialize)]
pub(crate) struct RegistryFile {
    pub tools: Vec<ToolEntry>,
}

/// One ranked routing match
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ToolMatch {
    pub name: String,
    pub description: String,

    /// Number of keyword matches against the query
    pub score: usize,
}

/// Immutable keyword-routing registry
#[derive(Debug)]
pub struct ToolRegistry {
    tools: AHashMap<String, ToolEntry>,

    /// Lowercased single-word keyword → tool names
    keywords: AHashMap<String, Vec<String>>,

    /// Lowercased multi-word keyword (spaces preserved) → tool names
    multi_word: Vec<(String, Vec<String>)>,
}

impl ToolRegistry {
    /// Build from parsed entries, enforcing the size caps.
    pub(crate) fn from_entries(entries: Vec<ToolEntry>) -> Result<Self> {
        if entries.len() > MAX_TOOLS {
            return Err(EngineError::config(format!(
                "registry declares {} tools (cap {})",
                entries.len(),
                MAX_TOOLS
            )));
        }

        let mut tools = AHashMap::new();
        let mut keywords: AHashMap<String, Vec<String>> = AHashMap::new();
        let mut multi_word: AHashMap<String, Vec<String>> = AHashMap::new();

        for entry in entries {
            if entry.name.is_empty() {
                return Err(EngineError::config("tool with empty name"));
            }
            if entry.keywords.len() > MAX_KEYWORDS_PER_TOOL {
                return Err(EngineError::config(format!(
                    "tool {} declares {} keywords (cap {})",
                    entry.name,
                    entry.keywords.len(),
                    MAX_KEYWORDS_PER_TOOL
                )));
            }
            if tools.contains_key(&entry.name) {
                return Err(EngineError::config(format!("duplicate tool name: {}", entry.name)));
            }

            for keyword in &entry.keywords {
                let keyword = keyword.trim().to_lowercase();
                if keyword.is_empty() {
                    continue;
                }
                let bucket = if keyword.contains(' ') {
                    multi_word.entry(keyword).or_insert_with(Vec::new)
                } else {
                    keywords.entry(keyword).or_insert_with(Vec::new)
                };
                bucket.push(entry.name.clone());
            }
            tools.insert(entry.name.clone(), entry);
        }

        let mut multi_word: Vec<(String, Vec<String>)> = multi_word.into_iter().collect();
        multi_word.sort_by(|a, b| a.0.cmp(&b.0));

        Ok(Self {
            tools,
            keywords,
            multi_word,
        })
    }

    pub fn get(&self, name: &str) -> Option<&ToolEntry> {
        self.tools.get(name)
    }

    pub fn len(&self) -> usize {
        self.tools.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tools.is_empty()
    }

    /// Rank tools against a free-text query.
    pub fn lookup(&self, query: &str) -> Vec<ToolMatch> {
        let lowered = query.to_lowercase();
        let mut scores: AHashMap<&str, usize> = AHashMap::new();

        for token in lowered.split_whitespace() {
            if let Some(names) = self.keywords.get(token) {
                for name in names {
                    *scores.entry(name).or_insert(0) += 1;
                }
            }
        }
        for (keyword, names) in &self.multi_word {
            if lowered.contains(keyword.as_str()) {
                for name in names {
                    *scores.entry(name).or_insert(0) += 1;
                }
            }
        }

        let mut matches: Vec<ToolMatch> = scores
            .into_iter()
            .filter_map(|(name, score)| {
                self.tools.get(name).map(|entry| ToolMatch {
                    name: entry.name.clone(),
                    description: entry.description.clone(),
                    score,
                })
            })
            .collect();
        matches.sort_by(|a, b| b.score.cmp(&a.score).then_with(|| a.name.cmp(&b.name)));

        debug!(query, matches = matches.len(), "tool routing lookup");
        matches
    }
}

// ── Process-wide instance ────────────────────────────────────────────────

static GLOBAL: RwLock<Option<Arc<ToolRegistry>>> = RwLock::new(None);

/// Shared registry, initialized once with double-checked locking.
pub fn global() -> Result<Arc<ToolRegistry>> {
    if let Some(registry) = GLOBAL.read().as_ref() {
        return Ok(Arc::clone(registry));
    }

    let mut guard = GLOBAL.write();
    // Double check: another writer may have initialized while we waited.
    if let Some(registry) = guard.as_ref() {
        return Ok(Arc::clone(registry));
    }
    let registry = Arc::new(loader::load()?);
    *guard = Some(Arc::clone(&registry));
    Ok(registry)
}

/// Test-only reset hook. Production code has no way to swap the registry.
#[cfg(test)]
pub(crate) fn reset_for_tests() {
    *GLOBAL.write() = None;
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn entry(name: &str, keywords: &[&str]) -> ToolEntry {
        ToolEntry {
            name: name.to_string(),
            description: format!("{} tool", name),
            keywords: keywords.iter().map(|k| k.to_string()).collect(),
            category: None,
        }
    }

    #[test]
    fn test_lookup_ranks_by_match_count() {
        let registry = ToolRegistry::from_entries(vec![
            entry("find_similar_code", &["similar", "duplicate", "clone"]),
            entry("trace_data_flow", &["flow", "taint", "source", "sink"]),
        ])
        .unwrap();

        let matches = registry.lookup("where does this source flow to a sink");
        assert_eq!(matches[0].name, "trace_data_flow");
        assert_eq!(matches[0].score, 3);
    }

    #[test]
    fn test_multi_word_keywords_substring_match() {
        let registry = ToolRegistry::from_entries(vec![entry(
            "analyze_breaking_change",
            &["breaking change", "impact"],
        )])
        .unwrap();

        let matches = registry.lookup("would this be a breaking change?");
        assert_eq!(matches.len(), 1);
        assert_eq!(matches[0].name, "analyze_breaking_change");

        // The individual words alone do not match a multi-word keyword.
        assert!(registry.lookup("change the port").is_empty());
    }

    #[test]
    fn test_tie_break_is_name_order() {
        let registry = ToolRegistry::from_entries(vec![
            entry("b_tool", &["shared"]),
            entry("a_tool", &["shared"]),
        ])
        .unwrap();

        let matches = registry.lookup("shared");
        assert_eq!(matches[0].name, "a_tool");
        assert_eq!(matches[1].name, "b_tool");
    }

    #[test]
    fn test_tool_cap() {
        let entries: Vec<ToolEntry> = (0..=MAX_TOOLS).map(|i| entry(&format!("t{}", i), &[])).collect();
        assert!(ToolRegistry::from_entries(entries).is_err());
    }

    #[test]
    fn test_keyword_cap() {
        let keywords: Vec<String> = (0..=MAX_KEYWORDS_PER_TOOL).map(|i| format!("k{}", i)).collect();
        let oversized = ToolEntry {
            name: "big".to_string(),
            description: String::new(),
            keywords,
            category: None,
        };
        assert!(ToolRegistry::from_entries(vec![oversized]).is_err());
    }

    #[test]
    fn test_duplicate_tool_rejected() {
        let entries = vec![entry("same", &[]), entry("same", &[])];
        assert!(ToolRegistry::from_entries(entries).is_err());
    }

    #[test]
    fn test_global_initializes_once_and_resets_for_tests() {
        reset_for_tests();
        let first = global().unwrap();
        let second = global().unwrap();
        assert!(Arc::ptr_eq(&first, &second));
        assert!(!first.is_empty());

        reset_for_tests();
        let third = global().unwrap();
        assert!(!Arc::ptr_eq(&first, &third));
    }
}
