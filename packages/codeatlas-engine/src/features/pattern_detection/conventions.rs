//! Convention extraction
//!
//! Samples the symbol population and reports recurring practices (naming
//! styles, type-name suffixes, error wrapping, context propagation, test
//! structure, documentation coverage, import ordering), each with a
//! frequency and a handful of examples. Conventions below the configured
//! minimum frequency are dropped: a practice half the codebase ignores is
//! not a convention.

use ahash::AHashMap;
use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use tracing::debug;

use super::detector::{symbols_in_scope, DetectionScope};
use crate::features::symbol_graph::CodeGraph;
use crate::shared::cancel::CancellationToken;
use crate::shared::models::{Result, Symbol, SymbolKind};
use crate::shared::signatures::param_list;

/// Extraction options
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct ConventionOptions {
    /// Conventions observed less often than this fraction are dropped
    pub min_frequency: f64,

    /// Example cap per convention
    pub max_examples: usize,
}

impl Default for ConventionOptions {
    fn default() -> Self {
        Self {
            min_frequency: 0.3,
            max_examples: 5,
        }
    }
}

/// One observed convention
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Convention {
    pub name: String,
    pub description: String,

    /// Fraction of the sampled population following the convention
    pub frequency: f64,

    pub occurrences: usize,

    pub examples: Vec<String>,
}

static ERROR_WRAP: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"fmt\.Errorf\([^)]*%w|errors\.Wrap").expect("static regex"));

static TABLE_TEST: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\[\]struct\s*\{|testCases|tests\s*:=").expect("static regex"));

const TYPE_SUFFIXES: &[&str] = &[
    "Service", "Handler", "Repository", "Manager", "Controller", "Client", "Provider", "Worker",
];

/// Extract conventions from the scope, ordered by descending frequency.
pub fn extract_conventions(
    graph: &CodeGraph,
    scope: &DetectionScope,
    options: &ConventionOptions,
    token: &CancellationToken,
) -> Result<Vec<Convention>> {
    graph.ensure_frozen()?;

    let symbols = symbols_in_scope(graph, scope);
    token.check("extract_conventions")?;

    let mut conventions = Vec::new();
    conventions.extend(naming_conventions(&symbols, options));
    conventions.extend(suffix_conventions(&symbols, options));
    conventions.extend(error_wrapping(&symbols, options));
    conventions.extend(context_propagation(&symbols, options));
    conventions.extend(test_structure(&symbols, options));
    conventions.extend(doc_coverage(&symbols, options));
    conventions.extend(import_ordering(graph, &symbols, options));

    conventions.retain(|c| c.frequency >= options.min_frequency);
    conventions.sort_by(|a, b| {
        b.frequency
            .partial_cmp(&a.frequency)
            .unwrap_or(std::cmp::Ordering::Equal)
            .then_with(|| a.name.cmp(&b.name))
    });

    debug!(conventions = conventions.len(), "convention extraction complete");
    Ok(conventions)
}

fn is_pascal_case(name: &str) -> bool {
    name.chars().next().map(char::is_uppercase).unwrap_or(false) && !name.contains('_')
}

fn is_camel_case(name: &str) -> bool {
    name.chars().next().map(char::is_lowercase).unwrap_or(false)
        && !name.contains('_')
        && name.chars().any(char::is_uppercase)
}

fn is_snake_case(name: &str) -> bool {
    name.contains('_') && name.chars().all(|c| !c.is_uppercase())
}

fn convention(
    name: &str,
    description: &str,
    matching: Vec<&Symbol>,
    population: usize,
    options: &ConventionOptions,
) -> Option<Convention> {
    if population == 0 || matching.is_empty() {
        return None;
    }
    let occurrences = matching.len();
    Some(Convention {
        name: name.to_string(),
        description: description.to_string(),
        frequency: occurrences as f64 / population as f64,
        occurrences,
        examples: matching
            .iter()
            .take(options.max_examples)
            .map(|s| s.name.clone())
            .collect(),
    })
}

fn naming_conventions(symbols: &[&Symbol], options: &ConventionOptions) -> Vec<Convention> {
    let named: Vec<&&Symbol> = symbols
        .iter()
        .filter(|s| s.kind.is_callable() || s.kind.is_type_like())
        .collect();
    let population = named.len();

    let mut out = Vec::new();
    for (name, description, predicate) in [
        (
            "pascal_case_names",
            "PascalCase naming for functions and types",
            is_pascal_case as fn(&str) -> bool,
        ),
        (
            "camel_case_names",
            "camelCase naming for functions and types",
            is_camel_case as fn(&str) -> bool,
        ),
        (
            "snake_case_names",
            "snake_case naming for functions and types",
            is_snake_case as fn(&str) -> bool,
        ),
    ] {
        let matching: Vec<&Symbol> = named
            .iter()
            .filter(|s| predicate(&s.name))
            .map(|s| **s)
            .collect();
        out.extend(convention(name, description, matching, population, options));
    }
    out
}

fn suffix_conventions(symbols: &[&Symbol], options: &ConventionOptions) -> Vec<Convention> {
    let types: Vec<&&Symbol> = symbols.iter().filter(|s| s.kind.is_type_like()).collect();
    let population = types.len();

    let mut out = Vec::new();
    for suffix in TYPE_SUFFIXES {
        let matching: Vec<&Symbol> = types
            .iter()
            .filter(|s| s.name.ends_with(suffix) && s.name.len() > suffix.len())
            .map(|s| **s)
            .collect();
        if matching.len() < 2 {
            continue; // a single occurrence is a name, not a convention
        }
        out.extend(convention(
            &format!("{}_suffix", suffix.to_lowercase()),
            &format!("role types named with the {} suffix", suffix),
            matching,
            population,
            options,
        ));
    }
    out
}

fn error_wrapping(symbols: &[&Symbol], options: &ConventionOptions) -> Vec<Convention> {
    let with_errors: Vec<&&Symbol> = symbols
        .iter()
        .filter(|s| s.kind.is_callable())
        .filter(|s| s.body.as_deref().map(|b| b.contains("err")).unwrap_or(false))
        .collect();
    let matching: Vec<&Symbol> = with_errors
        .iter()
        .filter(|s| s.body.as_deref().map(|b| ERROR_WRAP.is_match(b)).unwrap_or(false))
        .map(|s| **s)
        .collect();

    convention(
        "error_wrapping",
        "errors wrapped with context before propagation",
        matching,
        with_errors.len(),
        options,
    )
    .into_iter()
    .collect()
}

fn context_propagation(symbols: &[&Symbol], options: &ConventionOptions) -> Vec<Convention> {
    let callables: Vec<&&Symbol> = symbols
        .iter()
        .filter(|s| s.kind.is_callable() && s.signature.is_some())
        .collect();
    let matching: Vec<&Symbol> = callables
        .iter()
        .filter(|s| {
            s.signature
                .as_deref()
                .map(|sig| {
                    param_list(sig)
                        .first()
                        .map(|p| p.contains("context.Context") || p.starts_with("ctx"))
                        .unwrap_or(false)
                })
                .unwrap_or(false)
        })
        .map(|s| **s)
        .collect();

    convention(
        "context_first_param",
        "context passed as the first parameter",
        matching,
        callables.len(),
        options,
    )
    .into_iter()
    .collect()
}

fn test_structure(symbols: &[&Symbol], options: &ConventionOptions) -> Vec<Convention> {
    let tests: Vec<&&Symbol> = symbols
        .iter()
        .filter(|s| s.kind.is_callable())
        .filter(|s| s.name.starts_with("Test") || s.name.starts_with("test_"))
        .collect();
    let population = tests.len();

    let mut out = Vec::new();
    let body_matches = |s: &&&Symbol, f: &dyn Fn(&str) -> bool| {
        s.body.as_deref().map(f).unwrap_or(false)
    };

    let table_driven: Vec<&Symbol> = tests
        .iter()
        .filter(|s| body_matches(s, &|b| TABLE_TEST.is_match(b)))
        .map(|s| **s)
        .collect();
    out.extend(convention(
        "table_driven_tests",
        "table-driven test bodies",
        table_driven,
        population,
        options,
    ));

    let subtests: Vec<&Symbol> = tests
        .iter()
        .filter(|s| body_matches(s, &|b| b.contains("t.Run(")))
        .map(|s| **s)
        .collect();
    out.extend(convention(
        "subtests",
        "subtests via t.Run",
        subtests,
        population,
        options,
    ));

    let parallel: Vec<&Symbol> = tests
        .iter()
        .filter(|s| body_matches(s, &|b| b.contains("t.Parallel()")))
        .map(|s| **s)
        .collect();
    out.extend(convention(
        "parallel_tests",
        "tests opting into parallel execution",
        parallel,
        population,
        options,
    ));
    out
}

fn doc_coverage(symbols: &[&Symbol], options: &ConventionOptions) -> Vec<Convention> {
    let exported: Vec<&&Symbol> = symbols
        .iter()
        .filter(|s| s.exported && (s.kind.is_callable() || s.kind.is_type_like()))
        .collect();
    let matching: Vec<&Symbol> = exported
        .iter()
        .filter(|s| s.doc_comment.as_deref().map(|d| !d.is_empty()).unwrap_or(false))
        .map(|s| **s)
        .collect();

    convention(
        "documented_exports",
        "exported symbols carry doc comments",
        matching,
        exported.len(),
        options,
    )
    .into_iter()
    .collect()
}

fn import_ordering(
    graph: &CodeGraph,
    symbols: &[&Symbol],
    options: &ConventionOptions,
) -> Vec<Convention> {
    let mut imports_by_file: AHashMap<&str, Vec<&Symbol>> = AHashMap::new();
    for symbol in symbols.iter().filter(|s| s.kind == SymbolKind::Import) {
        imports_by_file
            .entry(symbol.file_path.as_str())
            .or_insert_with(Vec::new)
            .push(symbol);
    }

    let mut population = 0usize;
    let mut sorted_files: Vec<&Symbol> = Vec::new();
    for (file, mut imports) in imports_by_file {
        if imports.len() < 2 {
            continue;
        }
        population += 1;
        imports.sort_by_key(|s| s.start_line);
        let names: Vec<&str> = imports.iter().map(|s| s.name.as_str()).collect();
        let mut ordered = names.clone();
        ordered.sort();
        if names == ordered {
            // Represent the file through its first import symbol.
            if let Some(first) = graph.index().by_file(file).first().and_then(|id| graph.get(id)) {
                sorted_files.push(first);
            }
        }
    }

    convention(
        "sorted_imports",
        "import blocks kept in lexical order",
        sorted_files,
        population,
        options,
    )
    .into_iter()
    .collect()
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn extract(g: &CodeGraph) -> Vec<Convention> {
        extract_conventions(
            g,
            &DetectionScope::default(),
            &ConventionOptions::default(),
            &CancellationToken::new(),
        )
        .unwrap()
    }

    fn find<'a>(conventions: &'a [Convention], name: &str) -> Option<&'a Convention> {
        conventions.iter().find(|c| c.name == name)
    }

    #[test]
    fn test_suffix_convention_needs_recurrence() {
        let mut g = CodeGraph::new();
        g.add_symbol(Symbol::new("UserService", SymbolKind::Struct, "go", "a.go", 1, 5)).unwrap();
        g.add_symbol(Symbol::new("OrderService", SymbolKind::Struct, "go", "b.go", 1, 5)).unwrap();
        g.add_symbol(Symbol::new("OneOffHandler", SymbolKind::Struct, "go", "c.go", 1, 5)).unwrap();
        g.freeze();

        let conventions = extract(&g);
        let service = find(&conventions, "service_suffix").unwrap();
        assert_eq!(service.occurrences, 2);
        assert!(service.examples.contains(&"UserService".to_string()));
        // A single *Handler is a name, not a convention.
        assert!(find(&conventions, "handler_suffix").is_none());
    }

    #[test]
    fn test_context_propagation_frequency() {
        let mut g = CodeGraph::new();
        for (name, sig, file) in [
            ("Get", "func Get(ctx context.Context, id string) (*User, error)", "a.go"),
            ("List", "func List(ctx context.Context) ([]User, error)", "b.go"),
            ("Render", "func Render(w io.Writer) error", "c.go"),
        ] {
            g.add_symbol(
                Symbol::new(name, SymbolKind::Function, "go", file, 1, 9).with_signature(sig),
            )
            .unwrap();
        }
        g.freeze();

        let conventions = extract(&g);
        let ctx = find(&conventions, "context_first_param").unwrap();
        assert_eq!(ctx.occurrences, 2);
        assert!((ctx.frequency - 2.0 / 3.0).abs() < 1e-9);
    }

    #[test]
    fn test_min_frequency_filters() {
        let mut g = CodeGraph::new();
        // One of ten functions wraps errors: below the 0.3 default.
        for i in 0..10 {
            let body = if i == 0 {
                "return fmt.Errorf(\"load: %w\", err)"
            } else {
                "return err"
            };
            g.add_symbol(
                Symbol::new(format!("f{}", i), SymbolKind::Function, "go", format!("f{}.go", i), 1, 9)
                    .with_body(body),
            )
            .unwrap();
        }
        g.freeze();

        assert!(find(&extract(&g), "error_wrapping").is_none());
    }

    #[test]
    fn test_doc_coverage() {
        let mut g = CodeGraph::new();
        g.add_symbol(
            Symbol::new("Documented", SymbolKind::Function, "go", "a.go", 1, 5)
                .exported()
                .with_doc("Documented does the thing."),
        )
        .unwrap();
        g.add_symbol(Symbol::new("Bare", SymbolKind::Function, "go", "b.go", 1, 5).exported())
            .unwrap();
        g.freeze();

        let extracted = extract(&g);
        let doc = find(&extracted, "documented_exports").unwrap();
        assert_eq!(doc.occurrences, 1);
        assert!((doc.frequency - 0.5).abs() < 1e-9);
    }

    #[test]
    fn test_table_driven_tests() {
        let mut g = CodeGraph::new();
        g.add_symbol(
            Symbol::new("TestParse", SymbolKind::Function, "go", "parse_test.go", 1, 30)
                .with_body("tests := []struct{ in string }{}\nfor _, tt := range tests { t.Run(tt.in, nil) }"),
        )
        .unwrap();
        g.freeze();

        let scope = DetectionScope {
            include_tests: true,
            ..Default::default()
        };
        let conventions = extract_conventions(
            &g,
            &scope,
            &ConventionOptions::default(),
            &CancellationToken::new(),
        )
        .unwrap();

        assert!(find(&conventions, "table_driven_tests").is_some());
        assert!(find(&conventions, "subtests").is_some());
    }
}
