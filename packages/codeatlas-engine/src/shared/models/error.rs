//! Error types for the engine
//!
//! Unified error handling across all features:
//! - Machine-readable error kinds exposed to callers
//! - Optional symbol / file / line context
//! - Source error chaining
//!
//! Errors are return values from public operations; they are never used for
//! normal control flow. Partial results are signaled with `truncated` flags
//! on enumeration results, not with errors.

use std::fmt;

/// Error kind categorization
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// Nil/empty required input, unknown scope
    InvalidInput,
    /// Query ran before freeze or before build
    GraphNotReady,
    SymbolNotFound,
    FileNotFound,
    PackageNotFound,
    /// Bound hit mid-query on a single-answer operation
    TraversalLimitReached,
    /// Cooperative cancellation observed
    ContextCanceled,
    /// Registry has no patterns for the symbol's language
    UnsupportedLanguage,
    /// External input malformed (signature, YAML, ...)
    ParseError,
    ConfigError,
}

impl ErrorKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorKind::InvalidInput => "invalid_input",
            ErrorKind::GraphNotReady => "graph_not_ready",
            ErrorKind::SymbolNotFound => "symbol_not_found",
            ErrorKind::FileNotFound => "file_not_found",
            ErrorKind::PackageNotFound => "package_not_found",
            ErrorKind::TraversalLimitReached => "traversal_limit_reached",
            ErrorKind::ContextCanceled => "context_canceled",
            ErrorKind::UnsupportedLanguage => "unsupported_language",
            ErrorKind::ParseError => "parse_error",
            ErrorKind::ConfigError => "config_error",
        }
    }
}

/// Unified error type
#[derive(Debug)]
pub struct EngineError {
    pub kind: ErrorKind,
    pub message: String,
    pub symbol_id: Option<String>,
    pub file_path: Option<String>,
    pub line: Option<u32>,
    pub source: Option<Box<dyn std::error::Error + Send + Sync>>,
}

impl EngineError {
    pub fn new(kind: ErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
            symbol_id: None,
            file_path: None,
            line: None,
            source: None,
        }
    }

    pub fn with_symbol(mut self, symbol_id: impl Into<String>) -> Self {
        self.symbol_id = Some(symbol_id.into());
        self
    }

    pub fn with_file(mut self, file_path: impl Into<String>) -> Self {
        self.file_path = Some(file_path.into());
        self
    }

    pub fn with_line(mut self, line: u32) -> Self {
        self.line = Some(line);
        self
    }

    pub fn with_source(mut self, source: impl std::error::Error + Send + Sync + 'static) -> Self {
        self.source = Some(Box::new(source));
        self
    }

    // Convenience constructors
    pub fn invalid_input(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::InvalidInput, message)
    }

    pub fn graph_not_ready(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::GraphNotReady, message)
    }

    pub fn symbol_not_found(symbol_id: impl Into<String>) -> Self {
        let id = symbol_id.into();
        Self::new(ErrorKind::SymbolNotFound, format!("symbol not found: {}", id)).with_symbol(id)
    }

    pub fn file_not_found(path: impl Into<String>) -> Self {
        let path = path.into();
        Self::new(ErrorKind::FileNotFound, format!("file not found: {}", path)).with_file(path)
    }

    pub fn package_not_found(package: impl Into<String>) -> Self {
        Self::new(
            ErrorKind::PackageNotFound,
            format!("package not found: {}", package.into()),
        )
    }

    pub fn traversal_limit(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::TraversalLimitReached, message)
    }

    pub fn canceled(operation: &str) -> Self {
        Self::new(
            ErrorKind::ContextCanceled,
            format!("{} canceled by caller", operation),
        )
    }

    pub fn unsupported_language(language: impl Into<String>) -> Self {
        Self::new(
            ErrorKind::UnsupportedLanguage,
            format!("no patterns registered for language: {}", language.into()),
        )
    }

    pub fn parse(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::ParseError, message)
    }

    pub fn config(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::ConfigError, message)
    }
}

impl fmt::Display for EngineError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}] {}", self.kind.as_str(), self.message)?;
        if let Some(ref file) = self.file_path {
            write!(f, " in {}", file)?;
            if let Some(line) = self.line {
                write!(f, ":{}", line)?;
            }
        }
        Ok(())
    }
}

impl std::error::Error for EngineError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        self.source
            .as_ref()
            .map(|e| e.as_ref() as &(dyn std::error::Error + 'static))
    }
}

impl From<serde_yaml::Error> for EngineError {
    fn from(err: serde_yaml::Error) -> Self {
        EngineError::config(format!("YAML error: {}", err)).with_source(err)
    }
}

impl From<serde_json::Error> for EngineError {
    fn from(err: serde_json::Error) -> Self {
        EngineError::parse(format!("JSON error: {}", err)).with_source(err)
    }
}

impl From<regex::Error> for EngineError {
    fn from(err: regex::Error) -> Self {
        EngineError::config(format!("invalid pattern: {}", err)).with_source(err)
    }
}

/// Result type alias
pub type Result<T> = std::result::Result<T, EngineError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = EngineError::parse("unexpected token")
            .with_file("handlers/api.go")
            .with_line(42);

        let msg = format!("{}", err);
        assert!(msg.contains("parse_error"));
        assert!(msg.contains("unexpected token"));
        assert!(msg.contains("handlers/api.go"));
        assert!(msg.contains("42"));
    }

    #[test]
    fn test_kind_strings_are_stable() {
        // Part of the public vocabulary; callers dispatch on these.
        assert_eq!(ErrorKind::GraphNotReady.as_str(), "graph_not_ready");
        assert_eq!(ErrorKind::ContextCanceled.as_str(), "context_canceled");
        assert_eq!(ErrorKind::TraversalLimitReached.as_str(), "traversal_limit_reached");
    }

    #[test]
    fn test_symbol_not_found_context() {
        let err = EngineError::symbol_not_found("a.go:1:f");
        assert_eq!(err.kind, ErrorKind::SymbolNotFound);
        assert_eq!(err.symbol_id.as_deref(), Some("a.go:1:f"));
    }
}
