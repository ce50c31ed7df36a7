use crate::config::BrandConfig;
use crate::model::NormalizedCode;

/// Canonicalize a raw product code: trim, then keep only ASCII digits.
///
/// The result stays a string, so leading zeros survive. `None` maps to the
/// empty (absent) code.
pub fn normalize_code(raw: Option<&str>) -> NormalizedCode {
    let digits: String = raw
        .unwrap_or("")
        .trim()
        .chars()
        .filter(|c| c.is_ascii_digit())
        .collect();
    NormalizedCode::from_digits(digits)
}

/// Map a brand spelling to its canonical name via the alias table.
/// Unaliased values are returned trimmed.
pub fn normalize_brand(raw: &str, brands: &BrandConfig) -> String {
    let trimmed = raw.trim();
    match brands.aliases.get(&trimmed.to_uppercase()) {
        Some(canonical) => canonical.clone(),
        None => trimmed.to_string(),
    }
}

/// Parse a decimal written either way: `1234.5`, `1234,5`, `1.234,56`, `1,234.56`.
///
/// When both separators occur the rightmost one is the decimal point. A lone
/// comma is a decimal comma; a lone dot is a decimal point. Exponents and
/// spelled-out values (`1e5`, `inf`) are rejected.
pub fn parse_decimal(raw: &str) -> Option<f64> {
    let s: String = raw.trim().chars().filter(|c| !c.is_whitespace()).collect();
    if s.is_empty() || !s.chars().all(|c| c.is_ascii_digit() || matches!(c, '.' | ',' | '+' | '-')) {
        return None;
    }

    let last_dot = s.rfind('.');
    let last_comma = s.rfind(',');
    let canonical = match (last_dot, last_comma) {
        (Some(d), Some(c)) if c > d => s.replace('.', "").replace(',', "."),
        (Some(_), Some(_)) => s.replace(',', ""),
        (None, Some(_)) => {
            if s.matches(',').count() > 1 {
                // 1,234,567: thousands only
                s.replace(',', "")
            } else {
                s.replace(',', ".")
            }
        }
        _ => s,
    };

    canonical.parse::<f64>().ok().filter(|v| v.is_finite())
}

/// Parse a money value into integer cents. Values that do not fit `i64`
/// cents are unparseable.
pub fn parse_cents(raw: &str) -> Option<i64> {
    parse_decimal(raw).and_then(|v| to_i64((v * 100.0).round()))
}

/// Parse an item count. Decimal renderings such as `3.0` are accepted and rounded.
pub fn parse_quantity(raw: &str) -> Option<i64> {
    parse_decimal(raw).and_then(|v| to_i64(v.round()))
}

/// `v` as `i64`, or `None` outside the range instead of clamping.
fn to_i64(v: f64) -> Option<i64> {
    // 2^63 is exact as f64; everything strictly inside converts losslessly
    const BOUND: f64 = 9_223_372_036_854_775_808.0;
    if v > -BOUND && v < BOUND {
        Some(v as i64)
    } else {
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn code(raw: &str) -> String {
        normalize_code(Some(raw)).as_str().to_string()
    }

    #[test]
    fn keeps_leading_zeros() {
        assert_eq!(code("00123"), "00123");
    }

    #[test]
    fn strips_non_digits_after_trimming() {
        assert_eq!(code(" AB-12 "), "12");
        assert_eq!(code("SKU 0-45.6"), "0456");
    }

    #[test]
    fn absent_is_empty() {
        assert!(normalize_code(None).is_empty());
        assert!(normalize_code(Some("   ")).is_empty());
        assert!(normalize_code(Some("abc")).is_empty());
    }

    #[test]
    fn brand_aliases_apply_case_insensitively() {
        let brands = BrandConfig::default();
        assert_eq!(normalize_brand(" qdb ", &brands), "Quem Disse Berenice");
        assert_eq!(normalize_brand("O Boticario", &brands), "oBoticário");
        assert_eq!(normalize_brand("  Natura ", &brands), "Natura");
    }

    #[test]
    fn decimals_in_both_notations() {
        assert_eq!(parse_decimal("100.50"), Some(100.5));
        assert_eq!(parse_decimal("100,50"), Some(100.5));
        assert_eq!(parse_decimal("1.234,56"), Some(1234.56));
        assert_eq!(parse_decimal("1,234.56"), Some(1234.56));
        assert_eq!(parse_decimal("1,234,567"), Some(1234567.0));
        assert_eq!(parse_decimal("-3"), Some(-3.0));
        assert_eq!(parse_decimal(""), None);
        assert_eq!(parse_decimal("abc"), None);
    }

    #[test]
    fn cents_and_quantities() {
        assert_eq!(parse_cents("30.00"), Some(3000));
        assert_eq!(parse_cents("0,1"), Some(10));
        assert_eq!(parse_quantity("2.0"), Some(2));
        assert_eq!(parse_quantity("x"), None);
    }

    #[test]
    fn out_of_range_and_exponents_are_unparseable() {
        assert_eq!(parse_decimal("1e300"), None);
        assert_eq!(parse_decimal("2E3"), None);
        assert_eq!(parse_decimal("inf"), None);
        assert_eq!(parse_decimal("NaN"), None);
        assert_eq!(parse_cents("1e300"), None);
        assert_eq!(parse_cents("100000000000000000000"), None);
        assert_eq!(parse_quantity("-10000000000000000000"), None);
        assert_eq!(parse_cents("90000000000000000"), Some(9_000_000_000_000_000_000));
    }
}
