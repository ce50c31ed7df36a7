use std::collections::HashMap;

use serde::Serialize;

use crate::model::{CatalogEntry, NormalizedCode};

/// Catalog codes of exactly this length starting with `'0'` get a short alias.
pub const ALIAS_SOURCE_LEN: usize = 5;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct IndexEntry {
    pub code: NormalizedCode,
    pub brand: String,
    pub name: String,
    /// Set on synthetic 4-digit aliases: the real 5-digit catalog code.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub alias_of: Option<NormalizedCode>,
}

impl IndexEntry {
    pub fn is_alias(&self) -> bool {
        self.alias_of.is_some()
    }
}

/// Immutable code → (brand, name) lookup built from a catalog.
///
/// Rebuild a new index on catalog change instead of mutating one that runs
/// may be reading.
#[derive(Debug, Clone, Default)]
pub struct MatchIndex {
    entries: HashMap<NormalizedCode, IndexEntry>,
    real_count: usize,
}

impl MatchIndex {
    /// Build from catalog entries.
    ///
    /// Real entries go in first; on a duplicated code the last entry wins. A
    /// 5-digit code starting with `'0'` then adds its 4-digit suffix as an
    /// alias, unless a real entry already owns that key.
    pub fn build(catalog: &[CatalogEntry]) -> Self {
        let mut entries: HashMap<NormalizedCode, IndexEntry> = HashMap::with_capacity(catalog.len());

        for item in catalog.iter().filter(|c| !c.code.is_empty()) {
            entries.insert(
                item.code.clone(),
                IndexEntry {
                    code: item.code.clone(),
                    brand: item.brand.clone(),
                    name: item.name.clone(),
                    alias_of: None,
                },
            );
        }
        let real_count = entries.len();

        let mut aliases = Vec::new();
        for entry in entries.values() {
            if let Some(short) = alias_key(&entry.code) {
                if !entries.contains_key(&short) {
                    aliases.push(IndexEntry {
                        code: short,
                        brand: entry.brand.clone(),
                        name: entry.name.clone(),
                        alias_of: Some(entry.code.clone()),
                    });
                }
            }
        }
        for alias in aliases {
            entries.insert(alias.code.clone(), alias);
        }

        log::debug!(
            "match index built: {} real key(s), {} alias key(s)",
            real_count,
            entries.len() - real_count
        );

        Self { entries, real_count }
    }

    pub fn get(&self, code: &NormalizedCode) -> Option<&IndexEntry> {
        self.entries.get(code)
    }

    pub fn contains(&self, code: &NormalizedCode) -> bool {
        self.entries.contains_key(code)
    }

    /// Total keys, aliases included.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn real_len(&self) -> usize {
        self.real_count
    }

    pub fn alias_len(&self) -> usize {
        self.entries.len() - self.real_count
    }
}

/// `"01234"` → `Some("1234")`; every other shape → `None`.
fn alias_key(code: &NormalizedCode) -> Option<NormalizedCode> {
    let s = code.as_str();
    if s.len() == ALIAS_SOURCE_LEN && s.starts_with('0') {
        Some(NormalizedCode::from_digits(s[1..].to_string()))
    } else {
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::normalize::normalize_code;

    fn entry(code: &str, brand: &str) -> CatalogEntry {
        CatalogEntry {
            code: normalize_code(Some(code)),
            raw_code: code.into(),
            name: format!("product {code}"),
            brand: brand.into(),
        }
    }

    fn key(code: &str) -> NormalizedCode {
        normalize_code(Some(code))
    }

    #[test]
    fn five_digit_leading_zero_gets_alias() {
        let index = MatchIndex::build(&[entry("01234", "Eudora")]);
        assert_eq!(index.len(), 2);
        assert_eq!(index.real_len(), 1);
        let alias = index.get(&key("1234")).unwrap();
        assert!(alias.is_alias());
        assert_eq!(alias.alias_of, Some(key("01234")));
        assert_eq!(alias.brand, "Eudora");
    }

    #[test]
    fn real_short_code_beats_alias_in_any_order() {
        for catalog in [
            vec![entry("1234", "QDB"), entry("01234", "Eudora")],
            vec![entry("01234", "Eudora"), entry("1234", "QDB")],
        ] {
            let index = MatchIndex::build(&catalog);
            let hit = index.get(&key("1234")).unwrap();
            assert!(!hit.is_alias());
            assert_eq!(hit.brand, "QDB");
            assert_eq!(index.alias_len(), 0);
        }
    }

    #[test]
    fn other_lengths_get_no_alias() {
        let index = MatchIndex::build(&[entry("0123", "A"), entry("001234", "B"), entry("11234", "C")]);
        assert_eq!(index.alias_len(), 0);
        assert!(!index.contains(&key("123")));
        assert!(!index.contains(&key("01234")));
        assert!(!index.contains(&key("1234")));
    }

    #[test]
    fn duplicate_code_last_wins() {
        let index = MatchIndex::build(&[entry("01234", "First"), entry("01234", "Second")]);
        assert_eq!(index.get(&key("01234")).unwrap().brand, "Second");
        assert_eq!(index.get(&key("1234")).unwrap().brand, "Second");
    }

    #[test]
    fn empty_codes_are_skipped() {
        let index = MatchIndex::build(&[entry("", "A"), entry("--", "B")]);
        assert!(index.is_empty());
    }
}
