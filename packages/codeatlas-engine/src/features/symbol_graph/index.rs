//! Symbol index
//!
//! Associative lookups over the graph: by kind, by file path, by package,
//! by name. Populated alongside the graph during the build phase and frozen
//! with it; after freeze all lookups are read-only slices.

use ahash::AHashMap;

use crate::shared::models::{Symbol, SymbolId, SymbolKind};

/// Associative lookups over graph symbols
#[derive(Debug, Default)]
pub struct SymbolIndex {
    by_kind: AHashMap<SymbolKind, Vec<SymbolId>>,
    by_file: AHashMap<String, Vec<SymbolId>>,
    by_package: AHashMap<String, Vec<SymbolId>>,
    by_name: AHashMap<String, Vec<SymbolId>>,
}

impl SymbolIndex {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a symbol in every applicable index. Called by the graph on
    /// `add_symbol`; not part of the public query surface.
    pub(crate) fn add(&mut self, symbol: &Symbol) {
        self.by_kind
            .entry(symbol.kind)
            .or_insert_with(Vec::new)
            .push(symbol.id.clone());
        self.by_file
            .entry(symbol.file_path.clone())
            .or_insert_with(Vec::new)
            .push(symbol.id.clone());
        if !symbol.package.is_empty() {
            self.by_package
                .entry(symbol.package.clone())
                .or_insert_with(Vec::new)
                .push(symbol.id.clone());
        }
        self.by_name
            .entry(symbol.name.clone())
            .or_insert_with(Vec::new)
            .push(symbol.id.clone());
    }

    pub fn by_kind(&self, kind: SymbolKind) -> &[SymbolId] {
        self.by_kind.get(&kind).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn by_file(&self, file_path: &str) -> &[SymbolId] {
        self.by_file.get(file_path).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn by_package(&self, package: &str) -> &[SymbolId] {
        self.by_package
            .get(package)
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    pub fn by_name(&self, name: &str) -> &[SymbolId] {
        self.by_name.get(name).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn has_file(&self, file_path: &str) -> bool {
        self.by_file.contains_key(file_path)
    }

    pub fn has_package(&self, package: &str) -> bool {
        self.by_package.contains_key(package)
    }

    /// All indexed file paths (unordered)
    pub fn files(&self) -> impl Iterator<Item = &String> {
        self.by_file.keys()
    }

    /// All indexed package names (unordered)
    pub fn packages(&self) -> impl Iterator<Item = &String> {
        self.by_package.keys()
    }

    pub fn file_count(&self) -> usize {
        self.by_file.len()
    }

    pub fn package_count(&self) -> usize {
        self.by_package.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sym(name: &str, kind: SymbolKind, file: &str, pkg: &str, line: u32) -> Symbol {
        Symbol::new(name, kind, "go", file, line, line + 1).with_package(pkg)
    }

    fn build() -> SymbolIndex {
        let mut index = SymbolIndex::new();
        index.add(&sym("main", SymbolKind::Function, "cmd/main.go", "main", 1));
        index.add(&sym("GetUsers", SymbolKind::Function, "handlers/api.go", "handlers", 20));
        index.add(&sym("User", SymbolKind::Struct, "handlers/api.go", "handlers", 5));
        index
    }

    #[test]
    fn test_by_kind_returns_exact_set() {
        let index = build();
        assert_eq!(index.by_kind(SymbolKind::Function).len(), 2);
        assert_eq!(index.by_kind(SymbolKind::Struct).len(), 1);
        assert!(index.by_kind(SymbolKind::Interface).is_empty());
    }

    #[test]
    fn test_by_file_and_package() {
        let index = build();
        assert_eq!(index.by_file("handlers/api.go").len(), 2);
        assert_eq!(index.by_package("handlers").len(), 2);
        assert_eq!(index.by_package("main").len(), 1);
        assert!(index.by_file("missing.go").is_empty());
    }

    #[test]
    fn test_by_name_collects_homonyms() {
        let mut index = build();
        index.add(&sym("GetUsers", SymbolKind::Function, "v2/api.go", "v2", 8));
        assert_eq!(index.by_name("GetUsers").len(), 2);
    }

    #[test]
    fn test_counts() {
        let index = build();
        assert_eq!(index.file_count(), 2);
        assert_eq!(index.package_count(), 2);
    }
}
