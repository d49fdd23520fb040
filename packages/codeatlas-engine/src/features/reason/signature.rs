//! Structured signature parsing
//!
//! Parses a raw declaration signature into name, receiver, ordered typed
//! parameters, ordered returns, type parameters and a variadic flag. The
//! grammar is Go-leaning (`func (r *Recv) Name[T any](a A, b B) (R, error)`)
//! with enough slack for Python/TS-style `name(params) -> R` forms, because
//! that is what the loader emits for those languages.

use serde::{Deserialize, Serialize};

use crate::shared::models::{EngineError, Result};
use crate::shared::signatures::{param_list, return_list};

/// One typed parameter; `name` is empty for unnamed parameters
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Param {
    pub name: String,
    pub type_name: String,
}

/// Structured view of a declaration signature
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ParsedSignature {
    pub name: String,
    pub receiver: Option<Param>,
    pub params: Vec<Param>,
    pub returns: Vec<String>,
    pub type_params: Vec<String>,
    pub variadic: bool,
    pub language: String,
}

impl ParsedSignature {
    /// Go-style visibility: exported iff the name starts uppercase.
    pub fn exported(&self) -> bool {
        self.name.chars().next().map(char::is_uppercase).unwrap_or(false)
    }

    pub fn param_types(&self) -> Vec<&str> {
        self.params.iter().map(|p| p.type_name.as_str()).collect()
    }
}

/// Parse a raw signature string.
pub fn parse_signature(signature: &str, language: &str) -> Result<ParsedSignature> {
    let trimmed = signature.trim();
    if trimmed.is_empty() {
        return Err(EngineError::parse("signature must not be empty"));
    }

    let mut rest = trimmed;
    for keyword in ["func ", "func(", "fn ", "def "] {
        if let Some(stripped) = rest.strip_prefix(keyword) {
            if keyword.ends_with('(') {
                // Anonymous `func(...)`: restore the paren.
                rest = &trimmed[keyword.len() - 1..];
            } else {
                rest = stripped;
            }
            break;
        }
    }
    let rest = rest.trim_start();

    // Optional receiver group before the name.
    let (receiver, rest) = if rest.starts_with('(') {
        match close_paren(rest) {
            // In `(s *Server) Handle(...)` the group is a receiver iff a name follows.
            Some(end) if rest[end..].trim_start().starts_with(|c: char| c.is_alphabetic() || c == '_') => {
                let receiver = parse_param(rest[1..end - 1].trim());
                (Some(receiver), rest[end..].trim_start())
            }
            _ => (None, rest),
        }
    } else {
        (None, rest)
    };

    // Name runs up to '(' or '[' (type parameters).
    let name_end = rest.find(['(', '[']).unwrap_or(rest.len());
    let name = rest[..name_end].trim().to_string();

    // Optional `[T any, U comparable]` block.
    let mut type_params = Vec::new();
    let after_name = &rest[name_end..];
    if after_name.starts_with('[') {
        if let Some(close) = after_name.find(']') {
            type_params = crate::shared::signatures::split_top_level(&after_name[1..close], ',');
        }
    }

    let params: Vec<Param> = param_list(signature).iter().map(|p| parse_param(p)).collect();
    let variadic = params
        .iter()
        .any(|p| p.type_name.starts_with("...") || p.name.starts_with('*'));
    let returns = return_list(signature);

    Ok(ParsedSignature {
        name,
        receiver,
        params,
        returns,
        type_params,
        variadic,
        language: language.to_string(),
    })
}

/// Byte offset just past the closing paren of a group starting at 0.
fn close_paren(input: &str) -> Option<usize> {
    let mut depth = 0i32;
    for (i, ch) in input.char_indices() {
        match ch {
            '(' => depth += 1,
            ')' => {
                depth -= 1;
                if depth == 0 {
                    return Some(i + 1);
                }
            }
            _ => {}
        }
    }
    None
}

/// Split one parameter into (name, type).
///
/// Go: `ctx context.Context` → name then type. Python/TS: `ctx: Context`.
/// A lone token is a type when it looks like one (`*T`, `pkg.T`, `[]T`,
/// `string`), otherwise a bare name.
fn parse_param(raw: &str) -> Param {
    let raw = raw.trim();

    if let Some((name, type_name)) = raw.split_once(':') {
        return Param {
            name: name.trim().to_string(),
            type_name: type_name.trim().to_string(),
        };
    }

    match raw.split_once(' ') {
        Some((first, rest)) if is_identifier(first) => Param {
            name: first.to_string(),
            type_name: rest.trim().to_string(),
        },
        _ => Param {
            name: String::new(),
            type_name: raw.to_string(),
        },
    }
}

fn is_identifier(token: &str) -> bool {
    !token.is_empty()
        && token.chars().all(|c| c.is_alphanumeric() || c == '_')
        && token.chars().next().map(|c| !c.is_ascii_digit()).unwrap_or(false)
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_plain_function() {
        let sig = parse_signature("func Handle(r *Request) error", "go").unwrap();
        assert_eq!(sig.name, "Handle");
        assert!(sig.receiver.is_none());
        assert_eq!(sig.params.len(), 1);
        assert_eq!(sig.params[0].name, "r");
        assert_eq!(sig.params[0].type_name, "*Request");
        assert_eq!(sig.returns, vec!["error"]);
        assert!(sig.exported());
    }

    #[test]
    fn test_method_with_receiver() {
        let sig =
            parse_signature("func (s *Server) Handle(ctx context.Context, r *Request) (*Response, error)", "go")
                .unwrap();
        assert_eq!(sig.name, "Handle");
        let receiver = sig.receiver.unwrap();
        assert_eq!(receiver.name, "s");
        assert_eq!(receiver.type_name, "*Server");
        assert_eq!(sig.params.len(), 2);
        assert_eq!(sig.params[0].name, "ctx");
        assert_eq!(sig.params[0].type_name, "context.Context");
        assert_eq!(sig.returns, vec!["*Response", "error"]);
    }

    #[test]
    fn test_type_params() {
        let sig = parse_signature("func Map[T any, U any](xs []T, f func(T) U) []U", "go").unwrap();
        assert_eq!(sig.name, "Map");
        assert_eq!(sig.type_params, vec!["T any", "U any"]);
        assert_eq!(sig.params.len(), 2);
    }

    #[test]
    fn test_variadic() {
        let sig = parse_signature("func Join(sep string, parts ...string) string", "go").unwrap();
        assert!(sig.variadic);
        assert_eq!(sig.params[1].type_name, "...string");
    }

    #[test]
    fn test_anonymous_handler() {
        let sig = parse_signature("func(c *gin.Context)", "go").unwrap();
        assert_eq!(sig.name, "");
        assert_eq!(sig.params.len(), 1);
        assert_eq!(sig.params[0].type_name, "*gin.Context");
        assert!(sig.returns.is_empty());
        assert!(!sig.exported());
    }

    #[test]
    fn test_python_style() {
        let sig = parse_signature("def load(path: str, strict: bool) -> Config", "python").unwrap();
        assert_eq!(sig.name, "load");
        assert_eq!(sig.params[0].name, "path");
        assert_eq!(sig.params[0].type_name, "str");
        assert_eq!(sig.returns, vec!["Config"]);
    }

    #[test]
    fn test_unnamed_param_is_type_only() {
        let sig = parse_signature("func Close(error) bool", "go").unwrap();
        assert_eq!(sig.params[0].name, "");
        assert_eq!(sig.params[0].type_name, "error");
    }

    #[test]
    fn test_empty_signature_is_parse_error() {
        assert!(parse_signature("   ", "go").is_err());
    }
}
