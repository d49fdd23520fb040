//! Cache key derivation
//!
//! Keys are stable blake3 digests of the query shape, truncated to a short
//! hex form. Equal query shapes always map to equal keys across processes;
//! unrelated shapes collide with negligible probability at 64 bits.

use crate::features::exploration::EntryPointQuery;

/// Hex length of a derived key (16 hex chars = 64 bits)
const KEY_LEN: usize = 16;

/// Digest an ordered sequence of query-shape parts.
pub fn digest(parts: &[&str]) -> String {
    let mut hasher = blake3::Hasher::new();
    for part in parts {
        hasher.update(part.as_bytes());
        hasher.update(b"|");
    }
    let mut hex = hasher.finalize().to_hex().to_string();
    hex.truncate(KEY_LEN);
    hex
}

/// Key for an entry-point query:
/// `type|package|language|limit|include_tests` hashed to a short digest.
pub fn entry_point_key(query: &EntryPointQuery) -> String {
    digest(&[
        query.entry_type.as_deref().unwrap_or(""),
        query.package.as_deref().unwrap_or(""),
        query.language.as_deref().unwrap_or(""),
        &query.limit.to_string(),
        &query.include_tests.to_string(),
    ])
}

pub fn file_summary_key(file_path: &str) -> String {
    digest(&["file_summary", file_path])
}

pub fn package_api_key(package: &str) -> String {
    digest(&["package_api", package])
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_digest_is_deterministic() {
        assert_eq!(digest(&["a", "b"]), digest(&["a", "b"]));
        assert_ne!(digest(&["a", "b"]), digest(&["b", "a"]));
        assert_eq!(digest(&["a"]).len(), KEY_LEN);
    }

    #[test]
    fn test_part_boundaries_matter() {
        // "ab" + "c" must not collide with "a" + "bc"
        assert_ne!(digest(&["ab", "c"]), digest(&["a", "bc"]));
    }

    #[test]
    fn test_entry_point_key_covers_query_shape() {
        let base = EntryPointQuery::default();
        let mut with_tests = EntryPointQuery::default();
        with_tests.include_tests = true;

        assert_eq!(entry_point_key(&base), entry_point_key(&EntryPointQuery::default()));
        assert_ne!(entry_point_key(&base), entry_point_key(&with_tests));
    }
}
