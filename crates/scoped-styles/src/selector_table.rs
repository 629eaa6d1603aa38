//! The original to scoped selector mapping handed to code generators.

use crate::catalog::SelectorCatalog;
use crate::scope::scoped_name;
use serde::Serialize;
use std::collections::BTreeMap;

/// Maps `.class` and `#id` selectors to their scoped forms.
///
/// Keys iterate in lexicographic order so generated code is reproducible.
/// Without a prefix every entry maps to itself.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct SelectorTable {
    entries: BTreeMap<String, String>,
}

impl SelectorTable {
    /// Builds the table for a component's catalog.
    pub fn build(catalog: &SelectorCatalog, prefix: Option<&str>) -> Self {
        let mut entries = BTreeMap::new();
        for (sigil, names) in [('.', &catalog.classes), ('#', &catalog.ids)] {
            for name in names {
                let scoped = match prefix {
                    Some(prefix) => scoped_name(prefix, name),
                    None => name.to_string(),
                };
                entries.insert(format!("{sigil}{name}"), format!("{sigil}{scoped}"));
            }
        }
        Self { entries }
    }

    /// Looks up the scoped form of a selector such as `.main`.
    pub fn get(&self, selector: &str) -> Option<&str> {
        self.entries.get(selector).map(String::as_str)
    }

    /// Iterates entries in key order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    /// Returns the number of entries.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns true if the table is empty.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Serializes the table as a pretty-printed JSON object.
    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use style_parser::parse_stylesheet;

    fn catalog(source: &str) -> SelectorCatalog {
        SelectorCatalog::collect(&parse_stylesheet("c.css", source).stylesheet)
    }

    #[test]
    fn test_keys_are_sorted() {
        let catalog = catalog("#zeta, .main, .alpha { top: 0; } #header { top: 0; }");
        let table = SelectorTable::build(&catalog, Some("x-foo"));
        let entries: Vec<_> = table.iter().collect();
        assert_eq!(
            entries,
            [
                ("#header", "#x-foo_header"),
                ("#zeta", "#x-foo_zeta"),
                (".alpha", ".x-foo_alpha"),
                (".main", ".x-foo_main"),
            ]
        );
    }

    #[test]
    fn test_identity_without_prefix() {
        let table = SelectorTable::build(&catalog(".main, #top { top: 0; }"), None);
        assert_eq!(table.get(".main"), Some(".main"));
        assert_eq!(table.get("#top"), Some("#top"));
        assert_eq!(table.get("main"), None);
    }

    #[test]
    fn test_same_name_as_class_and_id() {
        let table = SelectorTable::build(&catalog(".nav, #nav { top: 0; }"), Some("p"));
        assert_eq!(table.len(), 2);
        assert_eq!(table.get("#nav"), Some("#p_nav"));
    }

    #[test]
    fn test_json() {
        let table = SelectorTable::build(&catalog(".b, .a { top: 0; }"), Some("x"));
        insta::assert_snapshot!(table.to_json().unwrap(), @r#"
        {
          ".a": ".x_a",
          ".b": ".x_b"
        }
        "#);
    }
}
