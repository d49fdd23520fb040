//! Brace-aware signature splitting
//!
//! Parameter and return lists are extracted from raw declaration signatures
//! with nesting-aware scanning over `(){}[]` and `<>`, so generic types,
//! function-typed parameters and tuple returns do not confuse the counts.
//! Shared by the fingerprint builder, the smell detectors and the reason
//! layer's structured signature parser.

/// Split `input` on `separator`, ignoring separators nested inside
/// `()`, `{}`, `[]` or `<>` pairs.
pub fn split_top_level(input: &str, separator: char) -> Vec<String> {
    let mut parts = Vec::new();
    let mut depth = 0i32;
    let mut current = String::new();

    for ch in input.chars() {
        match ch {
            '(' | '{' | '[' | '<' => {
                depth += 1;
                current.push(ch);
            }
            ')' | '}' | ']' | '>' => {
                // `>` also appears in `->`; never let depth go negative.
                depth = (depth - 1).max(0);
                current.push(ch);
            }
            c if c == separator && depth == 0 => {
                parts.push(current.trim().to_string());
                current.clear();
            }
            c => current.push(c),
        }
    }
    if !current.trim().is_empty() || !parts.is_empty() {
        parts.push(current.trim().to_string());
    }

    parts.into_iter().filter(|p| !p.is_empty()).collect()
}

/// Extract the parenthesized parameter group of a signature.
///
/// For methods the receiver group is skipped: in
/// `func (s *Server) Handle(w http.ResponseWriter)` the group returned is
/// `w http.ResponseWriter`. Returns the content between the parentheses
/// (may be empty) and the byte offset just past the closing parenthesis.
pub fn parameter_group(signature: &str) -> Option<(String, usize)> {
    let mut groups = top_level_paren_groups(signature);
    if groups.is_empty() {
        return None;
    }

    // In `func (recv) Name(params)` the receiver group ends before the
    // function name; the parameter group is the one attached to the name.
    if groups.len() >= 2 && is_receiver_group(signature, &groups[0]) {
        groups.remove(0);
    }

    let (content, end) = groups.into_iter().next()?;
    Some((content, end))
}

/// Parameter list of a signature, split on top-level commas.
pub fn param_list(signature: &str) -> Vec<String> {
    match parameter_group(signature) {
        Some((group, _)) => split_top_level(&group, ','),
        None => Vec::new(),
    }
}

/// Return list of a signature: the portion after the parameter group,
/// either a parenthesized tuple or a single bare type.
pub fn return_list(signature: &str) -> Vec<String> {
    let (_, end) = match parameter_group(signature) {
        Some(v) => v,
        None => return Vec::new(),
    };

    let rest = signature[end..].trim();
    // Arrow syntax (Rust / Python annotations / TS)
    let rest = rest
        .strip_prefix("->")
        .or_else(|| rest.strip_prefix(':'))
        .unwrap_or(rest)
        .trim();
    let rest = rest.trim_end_matches(|c| c == '{' || c == ';').trim();

    if rest.is_empty() {
        return Vec::new();
    }
    if rest.starts_with('(') && rest.ends_with(')') {
        return split_top_level(&rest[1..rest.len() - 1], ',');
    }
    vec![rest.to_string()]
}

/// All top-level `(...)` groups with their end offsets.
fn top_level_paren_groups(signature: &str) -> Vec<(String, usize)> {
    let mut groups = Vec::new();
    let mut depth = 0i32;
    let mut start = 0usize;

    for (i, ch) in signature.char_indices() {
        match ch {
            '(' => {
                if depth == 0 {
                    start = i + 1;
                }
                depth += 1;
            }
            ')' => {
                depth -= 1;
                if depth == 0 {
                    groups.push((signature[start..i].to_string(), i + 1));
                }
            }
            _ => {}
        }
    }
    groups
}

/// A group is the receiver when the function name follows it
/// (`func (s *Server) Handle(...)`).
fn is_receiver_group(signature: &str, group: &(String, usize)) -> bool {
    let after = signature[group.1..].trim_start();
    after
        .chars()
        .next()
        .map(|c| c.is_alphabetic() || c == '_')
        .unwrap_or(false)
}
