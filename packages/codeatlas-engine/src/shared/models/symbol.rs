//! Symbol model
//!
//! A symbol is a named, located construct in source code: a file, an import,
//! a function, a type, a field. Symbols are produced by an external loader
//! (already tagged with language, kind, line range, signature and exported
//! flag) and are immutable once the owning graph freezes.
//!
//! Identity is the stable triple `path:line:name`, which survives re-loads
//! of the same snapshot and lets every downstream structure refer to symbols
//! by ID instead of by pointer.

use serde::{Deserialize, Serialize};

/// Stable symbol identifier (`path:line:name`)
pub type SymbolId = String;

/// Symbol kind classification
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SymbolKind {
    File,
    Import,
    Function,
    Method,
    Class,
    Struct,
    Interface,
    Type,
    Field,
    Variable,
    Constant,
}

impl SymbolKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            SymbolKind::File => "file",
            SymbolKind::Import => "import",
            SymbolKind::Function => "function",
            SymbolKind::Method => "method",
            SymbolKind::Class => "class",
            SymbolKind::Struct => "struct",
            SymbolKind::Interface => "interface",
            SymbolKind::Type => "type",
            SymbolKind::Field => "field",
            SymbolKind::Variable => "variable",
            SymbolKind::Constant => "constant",
        }
    }

    /// Kinds that can carry executable behavior
    pub fn is_callable(&self) -> bool {
        matches!(self, SymbolKind::Function | SymbolKind::Method)
    }

    /// Kinds that declare a nominal type
    pub fn is_type_like(&self) -> bool {
        matches!(
            self,
            SymbolKind::Class | SymbolKind::Struct | SymbolKind::Interface | SymbolKind::Type
        )
    }
}

/// A named construct in the source
///
/// Created by the loader, immutable after the graph freezes. Optional fields
/// are populated when the loader can extract them; detectors that require a
/// missing field (e.g. `body`) skip the symbol rather than guessing.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Symbol {
    /// Stable identifier: `path:line:name`
    pub id: SymbolId,

    /// Human-readable name
    pub name: String,

    pub kind: SymbolKind,

    /// Language tag (e.g. "go", "python", "javascript")
    pub language: String,

    /// File the symbol is declared in
    pub file_path: String,

    /// Package / module the symbol belongs to (empty for file symbols of
    /// unknown provenance)
    #[serde(default)]
    pub package: String,

    pub start_line: u32,
    pub end_line: u32,

    /// Raw declaration signature, when the loader extracted one
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub signature: Option<String>,

    /// Method receiver type name (methods only)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub receiver: Option<String>,

    /// Leading documentation comment
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub doc_comment: Option<String>,

    /// Source text of the symbol body, when the loader attached it.
    /// Body-driven detectors (smells, duplication, conventions) require it.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub body: Option<String>,

    /// Visible outside its package
    pub exported: bool,

    /// IDs of nested symbols (fields of a struct, methods of a class, ...)
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub children: Vec<SymbolId>,
}

impl Symbol {
    /// Create a symbol with the minimal required fields.
    ///
    /// The ID is derived as `path:line:name`.
    pub fn new(
        name: impl Into<String>,
        kind: SymbolKind,
        language: impl Into<String>,
        file_path: impl Into<String>,
        start_line: u32,
        end_line: u32,
    ) -> Self {
        let name = name.into();
        let file_path = file_path.into();
        Self {
            id: format!("{}:{}:{}", file_path, start_line, name),
            name,
            kind,
            language: language.into(),
            file_path,
            package: String::new(),
            start_line,
            end_line,
            signature: None,
            receiver: None,
            doc_comment: None,
            body: None,
            exported: false,
            children: Vec::new(),
        }
    }

    pub fn with_package(mut self, package: impl Into<String>) -> Self {
        self.package = package.into();
        self
    }

    pub fn with_signature(mut self, signature: impl Into<String>) -> Self {
        self.signature = Some(signature.into());
        self
    }

    pub fn with_receiver(mut self, receiver: impl Into<String>) -> Self {
        self.receiver = Some(receiver.into());
        self
    }

    pub fn with_doc(mut self, doc: impl Into<String>) -> Self {
        self.doc_comment = Some(doc.into());
        self
    }

    pub fn with_body(mut self, body: impl Into<String>) -> Self {
        self.body = Some(body.into());
        self
    }

    pub fn exported(mut self) -> Self {
        self.exported = true;
        self
    }

    /// Number of source lines the symbol spans (inclusive)
    pub fn line_span(&self) -> u32 {
        self.end_line.saturating_sub(self.start_line) + 1
    }

    /// Whether the symbol lives in a test file (`*_test.go`, `test_*.py`,
    /// `*.test.js`, `*.spec.ts`, ...)
    pub fn in_test_file(&self) -> bool {
        let path = self.file_path.as_str();
        let file_name = path.rsplit('/').next().unwrap_or(path);
        file_name.contains("_test.")
            || file_name.starts_with("test_")
            || file_name.contains(".test.")
            || file_name.contains(".spec.")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_id_derivation() {
        let sym = Symbol::new("GetUsers", SymbolKind::Function, "go", "handlers/api.go", 20, 35);
        assert_eq!(sym.id, "handlers/api.go:20:GetUsers");
    }

    #[test]
    fn test_line_span_inclusive() {
        let sym = Symbol::new("f", SymbolKind::Function, "go", "a.go", 10, 14);
        assert_eq!(sym.line_span(), 5);

        let one_liner = Symbol::new("g", SymbolKind::Function, "go", "a.go", 3, 3);
        assert_eq!(one_liner.line_span(), 1);
    }

    #[test]
    fn test_test_file_detection() {
        let go_test = Symbol::new("TestX", SymbolKind::Function, "go", "pkg/user_test.go", 5, 9);
        assert!(go_test.in_test_file());

        let py_test = Symbol::new("test_x", SymbolKind::Function, "python", "tests/test_user.py", 1, 4);
        assert!(py_test.in_test_file());

        let js_test = Symbol::new("x", SymbolKind::Function, "javascript", "src/user.test.js", 1, 4);
        assert!(js_test.in_test_file());

        let plain = Symbol::new("X", SymbolKind::Function, "go", "pkg/user.go", 5, 9);
        assert!(!plain.in_test_file());

        // "testdata/latest.go" must not be misclassified
        let tricky = Symbol::new("X", SymbolKind::Function, "go", "testdata/latest.go", 5, 9);
        assert!(!tricky.in_test_file());
    }

    #[test]
    fn test_kind_predicates() {
        assert!(SymbolKind::Function.is_callable());
        assert!(SymbolKind::Method.is_callable());
        assert!(!SymbolKind::Struct.is_callable());

        assert!(SymbolKind::Interface.is_type_like());
        assert!(!SymbolKind::Variable.is_type_like());
    }
}
