//! File and package summaries
//!
//! Groups the symbol index by file or package, classifies members into
//! imports / types / functions, counts struct fields and receiver-matched
//! methods, and infers a one-line purpose: first from filename heuristics,
//! then from content shape. Package APIs list exported members only.

use tracing::debug;

use super::results::{ApiMember, FileSummary, FunctionSummary, PackageApi, TypeSummary};
use crate::features::symbol_graph::CodeGraph;
use crate::shared::models::{EngineError, Result, Symbol, SymbolKind};

/// Build a structural summary of one file.
pub fn file_summary(graph: &CodeGraph, file_path: &str) -> Result<FileSummary> {
    graph.ensure_frozen()?;
    if file_path.is_empty() {
        return Err(EngineError::invalid_input("file_path must not be empty"));
    }

    let ids = graph.index().by_file(file_path);
    if ids.is_empty() {
        return Err(EngineError::file_not_found(file_path));
    }

    let mut symbols: Vec<&Symbol> = ids.iter().filter_map(|id| graph.get(id)).collect();
    symbols.sort_by_key(|s| s.start_line);

    let mut imports = Vec::new();
    let mut types = Vec::new();
    let mut functions = Vec::new();

    for symbol in &symbols {
        match symbol.kind {
            SymbolKind::Import => imports.push(symbol.name.clone()),
            kind if kind.is_type_like() => {
                types.push(TypeSummary {
                    name: symbol.name.clone(),
                    kind: kind.as_str().to_string(),
                    field_count: count_fields(graph, symbol),
                    method_count: count_methods(&symbols, &symbol.name),
                    exported: symbol.exported,
                });
            }
            SymbolKind::Function => {
                functions.push(FunctionSummary {
                    name: symbol.name.clone(),
                    signature: symbol.signature.clone(),
                    exported: symbol.exported,
                    line: symbol.start_line,
                });
            }
            _ => {}
        }
    }

    let purpose = infer_purpose(file_path, &types, &functions, &symbols);

    debug!(file_path, symbols = symbols.len(), "file summary built");

    Ok(FileSummary {
        file_path: file_path.to_string(),
        purpose,
        imports,
        types,
        functions,
        symbol_count: symbols.len(),
    })
}

/// Exported API of one package.
pub fn package_api(graph: &CodeGraph, package: &str) -> Result<PackageApi> {
    graph.ensure_frozen()?;
    if package.is_empty() {
        return Err(EngineError::invalid_input("package must not be empty"));
    }

    let ids = graph.index().by_package(package);
    if ids.is_empty() {
        return Err(EngineError::package_not_found(package));
    }

    let mut files: Vec<String> = Vec::new();
    let mut types = Vec::new();
    let mut functions = Vec::new();
    let mut constants = Vec::new();

    let mut symbols: Vec<&Symbol> = ids.iter().filter_map(|id| graph.get(id)).collect();
    symbols.sort_by(|a, b| {
        a.file_path
            .cmp(&b.file_path)
            .then_with(|| a.start_line.cmp(&b.start_line))
    });

    for symbol in symbols {
        if !files.contains(&symbol.file_path) {
            files.push(symbol.file_path.clone());
        }
        if !symbol.exported {
            continue;
        }

        let member = ApiMember {
            name: symbol.name.clone(),
            kind: symbol.kind.as_str().to_string(),
            signature: symbol.signature.clone(),
            file_path: symbol.file_path.clone(),
            line: symbol.start_line,
        };
        match symbol.kind {
            kind if kind.is_type_like() => types.push(member),
            SymbolKind::Function | SymbolKind::Method => functions.push(member),
            SymbolKind::Constant => constants.push(member),
            _ => {}
        }
    }

    Ok(PackageApi {
        package: package.to_string(),
        files,
        types,
        functions,
        constants,
    })
}

/// Fields are CONTAINS-children of kind `field`.
fn count_fields(graph: &CodeGraph, symbol: &Symbol) -> usize {
    symbol
        .children
        .iter()
        .filter_map(|id| graph.get(id))
        .filter(|child| child.kind == SymbolKind::Field)
        .count()
}

/// Methods whose receiver names the type (modulo `*` indirection).
fn count_methods(file_symbols: &[&Symbol], type_name: &str) -> usize {
    file_symbols
        .iter()
        .filter(|s| s.kind == SymbolKind::Method)
        .filter(|s| {
            s.receiver
                .as_deref()
                .map(|r| r.trim_start_matches('*').trim_start_matches('&') == type_name
                    || r.trim_start_matches('*').ends_with(&format!(".{}", type_name)))
                .unwrap_or(false)
        })
        .count()
}

/// Filename heuristics first, content shape second.
fn infer_purpose(
    file_path: &str,
    types: &[TypeSummary],
    functions: &[FunctionSummary],
    symbols: &[&Symbol],
) -> String {
    let file_name = file_path.rsplit('/').next().unwrap_or(file_path);
    let stem = file_name
        .rsplit_once('.')
        .map(|(stem, _)| stem)
        .unwrap_or(file_name)
        .to_lowercase();

    // Ordered: the most specific names win.
    let by_name: &[(&str, &str)] = &[
        ("_test", "Test suite"),
        ("main", "Application entry point"),
        ("types", "Type definitions"),
        ("errors", "Error types and handling"),
        ("middleware", "Request middleware"),
        ("handler", "Request handlers"),
        ("service", "Business logic services"),
        ("repository", "Data access layer"),
        ("routes", "Route registration"),
        ("auth", "Authentication and authorization"),
        ("api", "API surface"),
        ("server", "Server setup and lifecycle"),
        ("client", "Client implementation"),
        ("config", "Configuration"),
        ("models", "Data models"),
    ];
    for (needle, purpose) in by_name {
        if stem.contains(needle) {
            return purpose.to_string();
        }
    }

    // Content fallback
    let has_types = !types.is_empty();
    let has_functions = !functions.is_empty();
    let only_interfaces = has_types && types.iter().all(|t| t.kind == "interface");

    if has_types && !has_functions {
        if only_interfaces {
            return "Interface definitions".to_string();
        }
        return "Type definitions".to_string();
    }
    if has_functions && !has_types {
        return "Function implementations".to_string();
    }
    if symbols.is_empty() {
        return String::new();
    }
    String::new()
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::shared::models::{Edge, EdgeKind, ErrorKind};

    fn graph() -> CodeGraph {
        let mut g = CodeGraph::new();

        g.add_symbol(
            Symbol::new("net/http", SymbolKind::Import, "go", "svc/user_service.go", 3, 3)
                .with_package("svc"),
        )
        .unwrap();

        let user = Symbol::new("User", SymbolKind::Struct, "go", "svc/user_service.go", 10, 15)
            .with_package("svc")
            .exported();
        let mut user = user;
        user.children = vec![
            "svc/user_service.go:11:ID".to_string(),
            "svc/user_service.go:12:Name".to_string(),
        ];
        g.add_symbol(user).unwrap();
        g.add_symbol(
            Symbol::new("ID", SymbolKind::Field, "go", "svc/user_service.go", 11, 11)
                .with_package("svc"),
        )
        .unwrap();
        g.add_symbol(
            Symbol::new("Name", SymbolKind::Field, "go", "svc/user_service.go", 12, 12)
                .with_package("svc"),
        )
        .unwrap();
        g.add_symbol(
            Symbol::new("Save", SymbolKind::Method, "go", "svc/user_service.go", 20, 30)
                .with_package("svc")
                .with_receiver("*User")
                .with_signature("func (u *User) Save(ctx context.Context) error")
                .exported(),
        )
        .unwrap();
        g.add_symbol(
            Symbol::new("helper", SymbolKind::Function, "go", "svc/user_service.go", 35, 40)
                .with_package("svc")
                .with_signature("func helper() int"),
        )
        .unwrap();
        g.add_symbol(
            Symbol::new("MaxUsers", SymbolKind::Constant, "go", "svc/user_service.go", 5, 5)
                .with_package("svc")
                .exported(),
        )
        .unwrap();

        g.add_edge(Edge::new(
            "svc/user_service.go:10:User",
            "svc/user_service.go:11:ID",
            EdgeKind::Contains,
            "svc/user_service.go",
            10,
        ))
        .unwrap();

        g.freeze();
        g
    }

    #[test]
    fn test_file_summary_classification() {
        let g = graph();
        let summary = file_summary(&g, "svc/user_service.go").unwrap();

        assert_eq!(summary.imports, vec!["net/http"]);
        assert_eq!(summary.types.len(), 1);
        assert_eq!(summary.types[0].field_count, 2);
        assert_eq!(summary.types[0].method_count, 1);
        assert_eq!(summary.functions.len(), 1);
        assert_eq!(summary.functions[0].name, "helper");
        assert_eq!(summary.symbol_count, 7);
    }

    #[test]
    fn test_purpose_from_filename() {
        let g = graph();
        let summary = file_summary(&g, "svc/user_service.go").unwrap();
        assert_eq!(summary.purpose, "Business logic services");
    }

    #[test]
    fn test_purpose_content_fallback() {
        let mut g = CodeGraph::new();
        g.add_symbol(
            Symbol::new("Reader", SymbolKind::Interface, "go", "pkg/io_defs.go", 1, 4)
                .with_package("pkg"),
        )
        .unwrap();
        g.add_symbol(
            Symbol::new("Writer", SymbolKind::Interface, "go", "pkg/io_defs.go", 6, 9)
                .with_package("pkg"),
        )
        .unwrap();
        g.freeze();

        let summary = file_summary(&g, "pkg/io_defs.go").unwrap();
        assert_eq!(summary.purpose, "Interface definitions");
    }

    #[test]
    fn test_missing_file() {
        let g = graph();
        let err = file_summary(&g, "missing.go").unwrap_err();
        assert_eq!(err.kind, ErrorKind::FileNotFound);
    }

    #[test]
    fn test_package_api_exported_only() {
        let g = graph();
        let api = package_api(&g, "svc").unwrap();

        assert_eq!(api.files, vec!["svc/user_service.go"]);
        assert_eq!(api.types.len(), 1);
        assert_eq!(api.types[0].name, "User");
        // helper is unexported and absent; Save is exported and present
        assert_eq!(api.functions.len(), 1);
        assert_eq!(api.functions[0].name, "Save");
        assert_eq!(api.constants.len(), 1);
        assert_eq!(api.constants[0].name, "MaxUsers");
    }

    #[test]
    fn test_missing_package() {
        let g = graph();
        let err = package_api(&g, "nope").unwrap_err();
        assert_eq!(err.kind, ErrorKind::PackageNotFound);
    }
}
