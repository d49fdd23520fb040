//! Design-pattern detectors
//!
//! Each detector is a structural check producing candidates plus an
//! idiomaticity predicate that sets the confidence tier. The rules are
//! deliberately shallow (names, signatures, receivers and edges) because
//! that is what survives across languages without a type checker.

use std::collections::BTreeMap;

use ahash::AHashMap;

use super::detector::{
    adjust_confidence, symbols_in_scope, DetectedPattern, DetectionScope, PatternDetector,
    CONFIDENCE_HEURISTIC, CONFIDENCE_IDIOMATIC, CONFIDENCE_STRUCTURAL,
};
use crate::features::symbol_graph::CodeGraph;
use crate::shared::models::{EdgeKind, Symbol, SymbolKind};
use crate::shared::signatures::{param_list, return_list};

fn pattern_at(
    pattern: &str,
    anchor: &Symbol,
    symbol_ids: Vec<String>,
    confidence: f64,
    idiomatic: bool,
) -> DetectedPattern {
    DetectedPattern {
        pattern: pattern.to_string(),
        symbol_ids,
        file_path: anchor.file_path.clone(),
        line: anchor.start_line,
        confidence,
        idiomatic,
        warnings: Vec::new(),
        metadata: BTreeMap::new(),
    }
}

/// Strip a constructor prefix: `NewServer` → `Server`.
fn constructed_type(name: &str) -> Option<&str> {
    for prefix in ["New", "Make", "Create"] {
        if let Some(rest) = name.strip_prefix(prefix) {
            if !rest.is_empty() {
                return Some(rest);
            }
        }
    }
    None
}

// ── Singleton ────────────────────────────────────────────────────────────

/// A module-scope variable plus a `Get*` accessor in the same file.
/// Idiomatic when the accessor is guarded by a once-primitive.
pub struct SingletonDetector;

impl PatternDetector for SingletonDetector {
    fn name(&self) -> &'static str {
        "singleton"
    }

    fn scan(&self, graph: &CodeGraph, scope: &DetectionScope) -> Vec<DetectedPattern> {
        let symbols = symbols_in_scope(graph, scope);
        let mut results = Vec::new();

        let variables: Vec<&&Symbol> = symbols
            .iter()
            .filter(|s| s.kind == SymbolKind::Variable)
            .collect();

        for variable in variables {
            let accessors: Vec<&&Symbol> = symbols
                .iter()
                .filter(|s| s.kind.is_callable() && s.file_path == variable.file_path)
                .filter(|s| {
                    let lower = s.name.to_lowercase();
                    (lower.starts_with("get") || lower == "instance")
                        && lower.contains(&variable.name.to_lowercase())
                })
                .collect();

            let Some(accessor) = accessors.first() else { continue };

            let once_guarded = accessor
                .body
                .as_deref()
                .map(|body| body.contains("Once") || body.contains("once"))
                .unwrap_or(false);

            let base = if once_guarded {
                CONFIDENCE_IDIOMATIC
            } else {
                CONFIDENCE_STRUCTURAL
            };
            let mut detected = pattern_at(
                "singleton",
                variable,
                vec![variable.id.clone(), accessor.id.clone()],
                adjust_confidence(base, 1, false),
                once_guarded,
            );
            if !once_guarded {
                detected
                    .warnings
                    .push("accessor is not guarded by a once-primitive".to_string());
            }
            results.push(detected);
        }
        results
    }
}

// ── Factory ──────────────────────────────────────────────────────────────

/// Constructor-named function returning its own primary type.
/// Idiomatic when the return pair includes an error.
pub struct FactoryDetector;

impl PatternDetector for FactoryDetector {
    fn name(&self) -> &'static str {
        "factory"
    }

    fn scan(&self, graph: &CodeGraph, scope: &DetectionScope) -> Vec<DetectedPattern> {
        let symbols = symbols_in_scope(graph, scope);
        let mut results = Vec::new();

        for symbol in symbols.iter().filter(|s| s.kind.is_callable()) {
            let Some(type_name) = constructed_type(&symbol.name) else { continue };
            let Some(sig) = symbol.signature.as_deref() else { continue };

            let returns = return_list(sig);
            let returns_own_type = returns.iter().any(|r| r.contains(type_name));
            if !returns_own_type {
                continue;
            }

            let with_error = returns.iter().any(|r| r == "error" || r.contains("Error"));
            let base = if with_error {
                CONFIDENCE_IDIOMATIC
            } else {
                CONFIDENCE_HEURISTIC
            };

            let mut detected = pattern_at(
                "factory",
                symbol,
                vec![symbol.id.clone()],
                adjust_confidence(base, 1, false),
                with_error,
            );
            detected
                .metadata
                .insert("constructs".to_string(), type_name.to_string());
            results.push(detected);
        }
        results
    }
}

// ── Builder ──────────────────────────────────────────────────────────────

/// A type whose methods are dominated by chainable `With*` setters
/// returning the receiver type, plus a terminal `Build()`.
pub struct BuilderDetector;

impl PatternDetector for BuilderDetector {
    fn name(&self) -> &'static str {
        "builder"
    }

    fn scan(&self, graph: &CodeGraph, scope: &DetectionScope) -> Vec<DetectedPattern> {
        let symbols = symbols_in_scope(graph, scope);
        let mut by_receiver: AHashMap<String, Vec<&&Symbol>> = AHashMap::new();

        for symbol in symbols.iter().filter(|s| s.kind == SymbolKind::Method) {
            if let Some(receiver) = symbol.receiver.as_deref() {
                let receiver = receiver.trim_start_matches('*').to_string();
                by_receiver.entry(receiver).or_insert_with(Vec::new).push(symbol);
            }
        }

        let mut receivers: Vec<(&String, &Vec<&&Symbol>)> = by_receiver.iter().collect();
        receivers.sort_by_key(|(name, _)| name.as_str());

        let mut results = Vec::new();
        for (receiver, methods) in receivers {
            let chainable: Vec<&&&Symbol> = methods
                .iter()
                .filter(|m| m.name.starts_with("With") || m.name.starts_with("Set"))
                .filter(|m| {
                    m.signature
                        .as_deref()
                        .map(|sig| return_list(sig).iter().any(|r| r.contains(receiver.as_str())))
                        .unwrap_or(false)
                })
                .collect();
            let terminal = methods.iter().find(|m| m.name == "Build");

            if chainable.len() < 2 {
                continue;
            }
            let Some(terminal) = terminal else { continue };

            let dominated = chainable.len() * 2 >= methods.len();
            let base = if dominated {
                CONFIDENCE_IDIOMATIC
            } else {
                CONFIDENCE_HEURISTIC
            };

            let mut ids: Vec<String> = chainable.iter().map(|m| m.id.clone()).collect();
            ids.push(terminal.id.clone());

            let anchor = chainable[0];
            let mut detected = pattern_at(
                "builder",
                anchor,
                ids,
                adjust_confidence(base, chainable.len(), false),
                dominated,
            );
            detected.metadata.insert("receiver".to_string(), receiver.clone());
            results.push(detected);
        }
        results
    }
}

// ── Functional options ───────────────────────────────────────────────────

/// A function-typed alias (`Option`-suffixed) plus multiple `With*`
/// factories returning it.
pub struct OptionsDetector;

impl PatternDetector for OptionsDetector {
    fn name(&self) -> &'static str {
        "options"
    }

    fn scan(&self, graph: &CodeGraph, scope: &DetectionScope) -> Vec<DetectedPattern> {
        let symbols = symbols_in_scope(graph, scope);
        let mut results = Vec::new();

        let aliases: Vec<&&Symbol> = symbols
            .iter()
            .filter(|s| s.kind == SymbolKind::Type && s.name.ends_with("Option"))
            .filter(|s| {
                s.signature
                    .as_deref()
                    .map(|sig| sig.contains("func("))
                    .unwrap_or(false)
            })
            .collect();

        for alias in aliases {
            let factories: Vec<&&Symbol> = symbols
                .iter()
                .filter(|s| s.kind.is_callable() && s.name.starts_with("With"))
                .filter(|s| {
                    s.signature
                        .as_deref()
                        .map(|sig| return_list(sig).iter().any(|r| r.contains(&alias.name)))
                        .unwrap_or(false)
                })
                .collect();
            if factories.len() < 2 {
                continue;
            }

            let mut ids = vec![alias.id.clone()];
            ids.extend(factories.iter().map(|f| f.id.clone()));

            let mut detected = pattern_at(
                "options",
                alias,
                ids,
                adjust_confidence(CONFIDENCE_IDIOMATIC, factories.len(), false),
                true,
            );
            detected
                .metadata
                .insert("option_type".to_string(), alias.name.clone());
            results.push(detected);
        }
        results
    }
}

// ── Middleware ───────────────────────────────────────────────────────────

/// A function whose single parameter type equals its single return type.
pub struct MiddlewareDetector;

impl PatternDetector for MiddlewareDetector {
    fn name(&self) -> &'static str {
        "middleware"
    }

    fn scan(&self, graph: &CodeGraph, scope: &DetectionScope) -> Vec<DetectedPattern> {
        let symbols = symbols_in_scope(graph, scope);
        let mut results = Vec::new();

        for symbol in symbols.iter().filter(|s| s.kind.is_callable()) {
            let Some(sig) = symbol.signature.as_deref() else { continue };
            let params = param_list(sig);
            let returns = return_list(sig);
            if params.len() != 1 || returns.len() != 1 {
                continue;
            }

            // Parameter entries may be `name Type`; compare the type part.
            let param_type = params[0].rsplit(' ').next().unwrap_or(&params[0]);
            if param_type != returns[0] {
                continue;
            }

            let handler_shaped =
                param_type.contains("Handler") || param_type.to_lowercase().contains("handler");
            let base = if handler_shaped {
                CONFIDENCE_IDIOMATIC
            } else {
                CONFIDENCE_HEURISTIC
            };

            let mut detected = pattern_at(
                "middleware",
                symbol,
                vec![symbol.id.clone()],
                adjust_confidence(base, 1, false),
                handler_shaped,
            );
            detected
                .metadata
                .insert("wrapped_type".to_string(), param_type.to_string());
            results.push(detected);
        }
        results
    }
}

// ── Strategy ─────────────────────────────────────────────────────────────

/// A small interface with at least two concrete implementations.
pub struct StrategyDetector;

impl PatternDetector for StrategyDetector {
    fn name(&self) -> &'static str {
        "strategy"
    }

    fn scan(&self, graph: &CodeGraph, scope: &DetectionScope) -> Vec<DetectedPattern> {
        let symbols = symbols_in_scope(graph, scope);
        let mut results = Vec::new();

        for interface in symbols.iter().filter(|s| s.kind == SymbolKind::Interface) {
            let implementations: Vec<String> = graph
                .incoming_of_kind(&interface.id, EdgeKind::Implements)
                .map(|e| e.from.clone())
                .collect();
            if implementations.len() < 2 {
                continue;
            }

            let mut ids = vec![interface.id.clone()];
            ids.extend(implementations.iter().cloned());

            let mut detected = pattern_at(
                "strategy",
                interface,
                ids,
                adjust_confidence(CONFIDENCE_HEURISTIC, implementations.len(), false),
                implementations.len() >= 2,
            );
            detected.metadata.insert(
                "implementations".to_string(),
                implementations.len().to_string(),
            );
            results.push(detected);
        }
        results
    }
}

// ── Observer ─────────────────────────────────────────────────────────────

/// A receiver exposing subscription plus notification methods.
pub struct ObserverDetector;

impl PatternDetector for ObserverDetector {
    fn name(&self) -> &'static str {
        "observer"
    }

    fn scan(&self, graph: &CodeGraph, scope: &DetectionScope) -> Vec<DetectedPattern> {
        let symbols = symbols_in_scope(graph, scope);
        let mut by_receiver: AHashMap<String, Vec<&&Symbol>> = AHashMap::new();

        for symbol in symbols.iter().filter(|s| s.kind == SymbolKind::Method) {
            if let Some(receiver) = symbol.receiver.as_deref() {
                by_receiver
                    .entry(receiver.trim_start_matches('*').to_string())
                    .or_insert_with(Vec::new)
                    .push(symbol);
            }
        }

        let mut receivers: Vec<(&String, &Vec<&&Symbol>)> = by_receiver.iter().collect();
        receivers.sort_by_key(|(name, _)| name.as_str());

        let mut results = Vec::new();
        for (receiver, methods) in receivers {
            let subscribes: Vec<&&&Symbol> = methods
                .iter()
                .filter(|m| {
                    m.name.starts_with("Subscribe")
                        || m.name.starts_with("Register")
                        || m.name.starts_with("AddListener")
                })
                .collect();
            let notifies: Vec<&&&Symbol> = methods
                .iter()
                .filter(|m| m.name.starts_with("Notify") || m.name.starts_with("Publish") || m.name.starts_with("Emit"))
                .collect();

            if subscribes.is_empty() || notifies.is_empty() {
                continue;
            }

            let mut ids: Vec<String> = subscribes.iter().map(|m| m.id.clone()).collect();
            ids.extend(notifies.iter().map(|m| m.id.clone()));

            let anchor = subscribes[0];
            let mut detected = pattern_at(
                "observer",
                anchor,
                ids,
                adjust_confidence(CONFIDENCE_HEURISTIC, subscribes.len() + notifies.len(), false),
                true,
            );
            detected.metadata.insert("subject".to_string(), receiver.clone());
            results.push(detected);
        }
        results
    }
}

// ── Repository ───────────────────────────────────────────────────────────

/// A `*Repository`/`*Store` type exposing CRUD-shaped methods.
pub struct RepositoryDetector;

const CRUD_PREFIXES: &[&str] = &["Get", "Find", "List", "Save", "Create", "Update", "Delete"];

impl PatternDetector for RepositoryDetector {
    fn name(&self) -> &'static str {
        "repository"
    }

    fn scan(&self, graph: &CodeGraph, scope: &DetectionScope) -> Vec<DetectedPattern> {
        let symbols = symbols_in_scope(graph, scope);
        let mut results = Vec::new();

        for type_symbol in symbols.iter().filter(|s| s.kind.is_type_like()) {
            let named_like_repo = type_symbol.name.ends_with("Repository")
                || type_symbol.name.ends_with("Repo")
                || type_symbol.name.ends_with("Store");
            if !named_like_repo {
                continue;
            }

            let crud_methods: Vec<&&Symbol> = symbols
                .iter()
                .filter(|s| s.kind == SymbolKind::Method)
                .filter(|s| {
                    s.receiver
                        .as_deref()
                        .map(|r| r.trim_start_matches('*') == type_symbol.name)
                        .unwrap_or(false)
                })
                .filter(|s| CRUD_PREFIXES.iter().any(|p| s.name.starts_with(p)))
                .collect();

            if crud_methods.len() < 2 {
                continue;
            }

            let mut ids = vec![type_symbol.id.clone()];
            ids.extend(crud_methods.iter().map(|m| m.id.clone()));

            let mut detected = pattern_at(
                "repository",
                type_symbol,
                ids,
                adjust_confidence(CONFIDENCE_HEURISTIC, crud_methods.len(), false),
                crud_methods.len() >= 3,
            );
            detected
                .metadata
                .insert("crud_methods".to_string(), crud_methods.len().to_string());
            results.push(detected);
        }
        results
    }
}

// ============================================================================
// Tests
// ============================================================================
