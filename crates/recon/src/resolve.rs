use crate::index::{IndexEntry, MatchIndex};
use crate::model::{MatchReason, NormalizedCode};

/// Sales codes of this length may have lost a leading zero.
pub const ZERO_PREFIX_LEN: usize = 4;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Resolution<'a> {
    pub reason: MatchReason,
    pub entry: Option<&'a IndexEntry>,
}

impl<'a> Resolution<'a> {
    fn not_found() -> Self {
        Self { reason: MatchReason::NotFound, entry: None }
    }

    pub fn is_match(&self) -> bool {
        self.entry.is_some()
    }
}

/// Look a normalized sales code up in the index.
///
/// Order: empty → not found; exact key; then, for 4-digit codes only, the code
/// with a `'0'` prepended. A 5-digit code is never shortened. An exact hit on
/// a synthetic alias counts as a zero-prefix match, since the catalog code it
/// stands for is the padded one.
pub fn resolve<'a>(index: &'a MatchIndex, code: &NormalizedCode) -> Resolution<'a> {
    if code.is_empty() {
        return Resolution::not_found();
    }

    if let Some(entry) = index.get(code) {
        let reason = if entry.is_alias() {
            MatchReason::MatchedWithZeroPrefix
        } else {
            MatchReason::ExactMatch
        };
        return Resolution { reason, entry: Some(entry) };
    }

    if code.len() == ZERO_PREFIX_LEN {
        let padded = NormalizedCode::from_digits(format!("0{code}"));
        if let Some(entry) = index.get(&padded) {
            return Resolution {
                reason: MatchReason::MatchedWithZeroPrefix,
                entry: Some(entry),
            };
        }
    }

    Resolution::not_found()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::CatalogEntry;
    use crate::normalize::normalize_code;

    fn entry(code: &str, brand: &str) -> CatalogEntry {
        CatalogEntry {
            code: normalize_code(Some(code)),
            raw_code: code.into(),
            name: format!("product {code}"),
            brand: brand.into(),
        }
    }

    fn code(raw: &str) -> NormalizedCode {
        normalize_code(Some(raw))
    }

    #[test]
    fn empty_code_is_not_found() {
        let index = MatchIndex::build(&[entry("01234", "Eudora")]);
        let r = resolve(&index, &code(""));
        assert_eq!(r.reason, MatchReason::NotFound);
        assert!(!r.is_match());
    }

    #[test]
    fn real_short_code_wins_over_padded_one() {
        let index = MatchIndex::build(&[entry("1234", "QDB"), entry("01234", "Eudora")]);
        let r = resolve(&index, &code("1234"));
        assert_eq!(r.reason, MatchReason::ExactMatch);
        assert_eq!(r.entry.unwrap().brand, "QDB");
    }

    #[test]
    fn four_digits_fall_back_to_zero_prefix() {
        let index = MatchIndex::build(&[entry("01234", "Eudora")]);
        let r = resolve(&index, &code("1234"));
        assert_eq!(r.reason, MatchReason::MatchedWithZeroPrefix);
        assert_eq!(r.entry.unwrap().brand, "Eudora");
    }

    #[test]
    fn zero_prefix_match_points_at_padded_code() {
        let index = MatchIndex::build(&[entry("05555", "AuAmigos")]);
        let r = resolve(&index, &code("5555"));
        assert_eq!(r.reason, MatchReason::MatchedWithZeroPrefix);
        assert_eq!(r.entry.unwrap().alias_of, Some(code("05555")));
    }

    #[test]
    fn five_digits_are_never_shortened() {
        let index = MatchIndex::build(&[entry("1234", "QDB")]);
        let r = resolve(&index, &code("11234"));
        assert_eq!(r.reason, MatchReason::NotFound);
        let r = resolve(&index, &code("01234"));
        assert_eq!(r.reason, MatchReason::NotFound);
    }

    #[test]
    fn exact_five_digit_match() {
        let index = MatchIndex::build(&[entry("01234", "Eudora")]);
        let r = resolve(&index, &code("01234"));
        assert_eq!(r.reason, MatchReason::ExactMatch);
    }
}
