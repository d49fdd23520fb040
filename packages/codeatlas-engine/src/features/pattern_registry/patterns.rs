//! Pattern types for the static source/sink/entry-point/side-effect catalog
//!
//! A pattern matches a symbol when *all* of its non-empty fields match:
//! name and receiver/package by glob (compiled to an anchored regex with
//! `*` → `.*`), signature by substring. Globs are compiled once when the
//! registry is built; nothing compiles inside query loops.

use regex::Regex;

use crate::shared::models::Symbol;

/// Anchored glob, compiled once
#[derive(Debug, Clone)]
pub struct Glob {
    raw: &'static str,
    regex: Regex,
}

impl Glob {
    pub fn new(pattern: &'static str) -> Self {
        let mut escaped = String::with_capacity(pattern.len() + 8);
        escaped.push('^');
        for ch in pattern.chars() {
            match ch {
                '*' => escaped.push_str(".*"),
                c if "\\.+?()[]{}|^$".contains(c) => {
                    escaped.push('\\');
                    escaped.push(c);
                }
                c => escaped.push(c),
            }
        }
        escaped.push('$');

        Self {
            raw: pattern,
            // Static catalog patterns; invalid ones are a programming error.
            regex: Regex::new(&escaped).expect("static glob pattern must compile"),
        }
    }

    pub fn matches(&self, input: &str) -> bool {
        self.regex.is_match(input)
    }

    pub fn as_str(&self) -> &'static str {
        self.raw
    }
}

/// Data-flow pattern kind
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FlowRole {
    Source,
    Sink,
}

/// Source or sink pattern
///
/// Sources introduce untrusted data; sinks act on data with an external
/// effect. `dangerous` is meaningful for sinks only.
#[derive(Debug, Clone)]
pub struct FlowPattern {
    pub role: FlowRole,

    /// Category label exposed in results (`http_input`, `network`, `sql`, ...)
    pub category: &'static str,

    pub name_glob: Glob,
    pub receiver_glob: Option<Glob>,
    pub package_glob: Option<Glob>,
    pub signature_contains: Option<&'static str>,

    pub description: &'static str,
    pub confidence: f64,

    /// Sink writes attacker-reachable state (SQL, command execution, ...)
    pub dangerous: bool,
}

impl FlowPattern {
    pub fn source(category: &'static str, name_glob: &'static str, description: &'static str) -> Self {
        Self {
            role: FlowRole::Source,
            category,
            name_glob: Glob::new(name_glob),
            receiver_glob: None,
            package_glob: None,
            signature_contains: None,
            description,
            confidence: 0.8,
            dangerous: false,
        }
    }

    pub fn sink(category: &'static str, name_glob: &'static str, description: &'static str) -> Self {
        Self {
            role: FlowRole::Sink,
            category,
            name_glob: Glob::new(name_glob),
            receiver_glob: None,
            package_glob: None,
            signature_contains: None,
            description,
            confidence: 0.8,
            dangerous: false,
        }
    }

    pub fn in_package(mut self, package_glob: &'static str) -> Self {
        self.package_glob = Some(Glob::new(package_glob));
        self
    }

    pub fn on_receiver(mut self, receiver_glob: &'static str) -> Self {
        self.receiver_glob = Some(Glob::new(receiver_glob));
        self
    }

    pub fn with_signature(mut self, substring: &'static str) -> Self {
        self.signature_contains = Some(substring);
        self
    }

    pub fn with_confidence(mut self, confidence: f64) -> Self {
        self.confidence = confidence;
        self
    }

    pub fn dangerous(mut self) -> Self {
        self.dangerous = true;
        self
    }

    pub fn matches(&self, symbol: &Symbol) -> bool {
        if !self.name_glob.matches(&symbol.name) {
            return false;
        }
        if let Some(ref glob) = self.receiver_glob {
            match symbol.receiver.as_deref() {
                Some(receiver) if glob.matches(receiver) => {}
                _ => return false,
            }
        }
        if let Some(ref glob) = self.package_glob {
            if !glob.matches(&symbol.package) {
                return false;
            }
        }
        if let Some(substring) = self.signature_contains {
            match symbol.signature.as_deref() {
                Some(sig) if sig.contains(substring) => {}
                _ => return false,
            }
        }
        true
    }
}

/// Entry-point pattern: a function whose caller is the runtime or an
/// external consumer.
#[derive(Debug, Clone)]
pub struct EntryPointPattern {
    /// `main`, `handler`, `command`, `test`, `lambda`, `grpc`
    pub entry_type: &'static str,

    /// Framework attribution (`gin`, `net/http`, `cobra`, ...)
    pub framework: Option<&'static str>,

    pub name_glob: Glob,
    pub package_glob: Option<Glob>,
    pub signature_contains: Option<&'static str>,

    pub description: &'static str,
    pub confidence: f64,
}

impl EntryPointPattern {
    pub fn new(entry_type: &'static str, name_glob: &'static str, description: &'static str) -> Self {
        Self {
            entry_type,
            framework: None,
            name_glob: Glob::new(name_glob),
            package_glob: None,
            signature_contains: None,
            description,
            confidence: 0.9,
        }
    }

    pub fn framework(mut self, framework: &'static str) -> Self {
        self.framework = Some(framework);
        self
    }

    pub fn in_package(mut self, package_glob: &'static str) -> Self {
        self.package_glob = Some(Glob::new(package_glob));
        self
    }

    pub fn with_signature(mut self, substring: &'static str) -> Self {
        self.signature_contains = Some(substring);
        self
    }

    pub fn matches(&self, symbol: &Symbol) -> bool {
        if !self.name_glob.matches(&symbol.name) {
            return false;
        }
        if let Some(ref glob) = self.package_glob {
            if !glob.matches(&symbol.package) {
                return false;
            }
        }
        if let Some(substring) = self.signature_contains {
            match symbol.signature.as_deref() {
                Some(sig) if sig.contains(substring) => {}
                _ => return false,
            }
        }
        true
    }
}

/// Side-effect category
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SideEffectCategory {
    FileIo,
    Network,
    Database,
    Logging,
    GlobalState,
    Process,
    Environment,
}

impl SideEffectCategory {
    pub fn as_str(&self) -> &'static str {
        match self {
            SideEffectCategory::FileIo => "file_io",
            SideEffectCategory::Network => "network",
            SideEffectCategory::Database => "database",
            SideEffectCategory::Logging => "logging",
            SideEffectCategory::GlobalState => "global_state",
            SideEffectCategory::Process => "process",
            SideEffectCategory::Environment => "environment",
        }
    }
}

/// Known side-effecting function signature
#[derive(Debug, Clone)]
pub struct SideEffectPattern {
    pub category: SideEffectCategory,

    /// Package/module the function lives in (`os`, `net/http`, `requests`)
    pub package: &'static str,

    pub name_glob: Glob,

    pub description: &'static str,

    /// Effect can be undone by the program (e.g. Setenv)
    pub reversible: bool,

    /// Repeating the call converges to the same state
    pub idempotent: bool,

    pub confidence: f64,
}

impl SideEffectPattern {
    pub fn new(
        category: SideEffectCategory,
        package: &'static str,
        name_glob: &'static str,
        description: &'static str,
    ) -> Self {
        Self {
            category,
            package,
            name_glob: Glob::new(name_glob),
            description,
            reversible: false,
            idempotent: false,
            confidence: 0.85,
        }
    }

    pub fn reversible(mut self) -> Self {
        self.reversible = true;
        self
    }

    pub fn idempotent(mut self) -> Self {
        self.idempotent = true;
        self
    }

    /// Match a callee by package + name. A partial package suffix is
    /// accepted for multi-segment packages (`sql` matches `database/sql`).
    pub fn matches(&self, package: &str, name: &str) -> bool {
        if !self.name_glob.matches(name) {
            return false;
        }
        package_matches(self.package, package)
    }
}

/// Exact match, or segment-boundary suffix match in either direction.
pub(crate) fn package_matches(pattern: &str, package: &str) -> bool {
    if pattern == package {
        return true;
    }
    if pattern.contains('/') || package.contains('/') {
        return package.ends_with(&format!("/{}", pattern))
            || pattern.ends_with(&format!("/{}", package));
    }
    false
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::shared::models::SymbolKind;

    #[test]
    fn test_glob_compilation() {
        let glob = Glob::new("New*");
        assert!(glob.matches("NewServer"));
        assert!(!glob.matches("MakeServer"));
        assert!(!glob.matches("xNewServer"));

        // Regex metacharacters in the pattern are literals.
        let dotted = Glob::new("net/http.*");
        assert!(dotted.matches("net/http.Get"));
        assert!(!dotted.matches("net/httpxGet"));
    }

    #[test]
    fn test_flow_pattern_all_fields_must_match() {
        let pattern = FlowPattern::sink("network", "Get", "outbound HTTP")
            .in_package("net/http")
            .dangerous();

        let hit = Symbol::new("Get", SymbolKind::Function, "go", "net/http/client.go", 1, 9)
            .with_package("net/http");
        let wrong_pkg = Symbol::new("Get", SymbolKind::Function, "go", "cache/cache.go", 1, 9)
            .with_package("cache");

        assert!(pattern.matches(&hit));
        assert!(!pattern.matches(&wrong_pkg));
        assert!(pattern.dangerous);
    }

    #[test]
    fn test_signature_substring_match() {
        let pattern = EntryPointPattern::new("handler", "*", "gin handler")
            .with_signature("gin.Context")
            .framework("gin");

        let handler = Symbol::new("GetUsers", SymbolKind::Function, "go", "handlers/api.go", 20, 30)
            .with_signature("func(c *gin.Context)");
        let plain = Symbol::new("GetUsers", SymbolKind::Function, "go", "handlers/api.go", 40, 50)
            .with_signature("func() error");

        assert!(pattern.matches(&handler));
        assert!(!pattern.matches(&plain));
    }

    #[test]
    fn test_side_effect_package_suffix() {
        let pattern = SideEffectPattern::new(
            SideEffectCategory::Database,
            "sql",
            "Exec*",
            "SQL statement execution",
        );

        assert!(pattern.matches("sql", "Exec"));
        assert!(pattern.matches("database/sql", "ExecContext"));
        assert!(!pattern.matches("sqlparser", "Exec"));
    }

    #[test]
    fn test_receiver_glob_requires_receiver() {
        let pattern = FlowPattern::source("http_input", "Query", "query parameter")
            .on_receiver("*Context");

        let with_receiver = Symbol::new("Query", SymbolKind::Method, "go", "gin/context.go", 1, 3)
            .with_receiver("*gin.Context");
        let without = Symbol::new("Query", SymbolKind::Function, "go", "db/db.go", 1, 3);

        assert!(pattern.matches(&with_receiver));
        assert!(!pattern.matches(&without));
    }
}
