//! Header and cell normalization for raw sheet extracts.
//!
//! Source sheets arrive with inconsistent header variants, currency-
//! formatted text, and merged-cell blanks. Everything is normalized here,
//! once, before any typed conversion: the rest of the pipeline only ever
//! sees the canonical column names from `types`.

use chrono::NaiveDate;
use rust_decimal::Decimal;

use crate::types::Money;

/// Alias table: original header string -> canonical field name.
/// Kept as one explicit table rather than ad hoc matching scattered
/// through the pipeline.
pub const HEADER_ALIASES: &[(&str, &str)] = &[
    ("ENG BASIN R1", "LBRT BASIN"),
    ("Chemical and Gel cost", "Chem Cost"),
    ("Mat and Containment Costs", "Mat Cost"),
    ("Other Pad Costs", "Other Pad Cost"),
    ("Allocation VM", "Alloc VM Cost"),
    ("PAD START", "Pad Start"),
    ("PAD END", "Pad End"),
];

/// Trim every header and apply the alias table.
pub fn canonicalize_headers(headers: &mut [String]) {
    for h in headers.iter_mut() {
        let trimmed = h.trim();
        let canonical = HEADER_ALIASES
            .iter()
            .find(|(alias, _)| alias.eq_ignore_ascii_case(trimmed))
            .map(|(_, c)| (*c).to_string())
            .unwrap_or_else(|| trimmed.to_string());
        *h = canonical;
    }
}

/// True for revenue-labeled columns ("Rev", "Prop Rev", "Revenue"),
/// which must never reach the cost pipeline. Matches whole words only:
/// headers like "Reversal" are cost columns and pass through.
pub fn is_revenue_column(header: &str) -> bool {
    header
        .split(|c: char| !c.is_ascii_alphanumeric())
        .any(|word| word.eq_ignore_ascii_case("rev") || word.eq_ignore_ascii_case("revenue"))
}

/// Parse a currency-formatted cell. Strips `$`, thousands separators and
/// whitespace; `(1,234.56)` is negative. Unparseable cells coerce to 0,
/// never to an error.
pub fn parse_money(cell: &str) -> Money {
    let mut s = cell.trim().to_string();
    if s.is_empty() {
        return Decimal::ZERO;
    }
    let negative = s.starts_with('(') && s.ends_with(')');
    if negative {
        s = s[1..s.len() - 1].to_string();
    }
    let cleaned: String = s.chars().filter(|c| !matches!(c, '$' | ',' | ' ')).collect();
    match cleaned.parse::<Decimal>() {
        Ok(v) => {
            if negative {
                -v
            } else {
                v
            }
        }
        Err(_) => Decimal::ZERO,
    }
}

/// Parse a date cell in any of the formats the extracts use.
/// Blank or unparseable cells yield `None`.
pub fn parse_date(cell: &str) -> Option<NaiveDate> {
    let s = cell.trim();
    if s.is_empty() {
        return None;
    }
    const FORMATS: &[&str] = &["%Y-%m-%d", "%m/%d/%Y", "%Y-%m-%d %H:%M:%S", "%m/%d/%y"];
    for fmt in FORMATS {
        if let Ok(d) = NaiveDate::parse_from_str(s, fmt) {
            return Some(d);
        }
        if let Ok(dt) = chrono::NaiveDateTime::parse_from_str(s, fmt) {
            return Some(dt.date());
        }
    }
    None
}

/// Parse a numeric identifier (pad number). Identifiers arrive as
/// integers, floats ("1042.0") or padded strings; they are coerced to a
/// common integer type so lookups join correctly.
pub fn parse_identifier(cell: &str) -> Option<i64> {
    let s = cell.trim();
    if s.is_empty() {
        return None;
    }
    if let Ok(v) = s.parse::<i64>() {
        return Some(v);
    }
    // float-typed identifiers ("1042.0")
    if let Ok(v) = s.parse::<f64>() {
        if v.fract() == 0.0 {
            return Some(v as i64);
        }
    }
    None
}

/// Group-carry pass over ordered keys: blank cells take the value of the
/// last non-blank key above them. This models the Excel merged-cell
/// convention where a blank basin means "same basin as the row above",
/// not missing data.
pub fn carry_forward<K: Clone>(keys: &[Option<K>]) -> Vec<Option<K>> {
    let mut out = Vec::with_capacity(keys.len());
    let mut last: Option<K> = None;
    for key in keys {
        if let Some(k) = key {
            last = Some(k.clone());
        }
        out.push(last.clone());
    }
    out
}

/// Normalize a basin cell: trim and upper-case, empty -> None. Basin is
/// the grouping key everywhere downstream, so case variants of one
/// basin must collapse to a single key.
pub fn clean_basin(cell: &str) -> Option<String> {
    let s = cell.trim();
    if s.is_empty() {
        None
    } else {
        Some(s.to_uppercase())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use rust_decimal_macros::dec;

    #[test]
    fn test_alias_rename() {
        let mut headers = vec![
            " ENG BASIN R1 ".to_string(),
            "Chemical and Gel cost".to_string(),
            "Prop Cost".to_string(),
        ];
        canonicalize_headers(&mut headers);
        assert_eq!(headers, vec!["LBRT BASIN", "Chem Cost", "Prop Cost"]);
    }

    #[test]
    fn test_parse_money_currency() {
        assert_eq!(parse_money("$1,234.56"), dec!(1234.56));
    }

    #[test]
    fn test_parse_money_paren_negative() {
        assert_eq!(parse_money("($2,500.00)"), dec!(-2500.00));
    }

    #[test]
    fn test_parse_money_garbage_is_zero() {
        assert_eq!(parse_money("n/a"), Decimal::ZERO);
        assert_eq!(parse_money(""), Decimal::ZERO);
    }

    #[test]
    fn test_parse_date_formats() {
        let expected = NaiveDate::from_ymd_opt(2024, 6, 15).unwrap();
        assert_eq!(parse_date("2024-06-15"), Some(expected));
        assert_eq!(parse_date("6/15/2024"), Some(expected));
        assert_eq!(parse_date("2024-06-15 00:00:00"), Some(expected));
        assert_eq!(parse_date("not a date"), None);
    }

    #[test]
    fn test_parse_identifier_float_typed() {
        assert_eq!(parse_identifier("1042"), Some(1042));
        assert_eq!(parse_identifier("1042.0"), Some(1042));
        assert_eq!(parse_identifier("1042.5"), None);
        assert_eq!(parse_identifier(""), None);
    }

    #[test]
    fn test_clean_basin_collapses_case_variants() {
        assert_eq!(clean_basin(" tx "), Some("TX".to_string()));
        assert_eq!(clean_basin("Ca"), Some("CA".to_string()));
        assert_eq!(clean_basin("  "), None);
    }

    #[test]
    fn test_carry_forward_fills_blanks() {
        let keys = vec![Some("TX"), None, None, Some("ND"), None];
        let filled = carry_forward(&keys);
        assert_eq!(
            filled,
            vec![Some("TX"), Some("TX"), Some("TX"), Some("ND"), Some("ND")]
        );
    }

    #[test]
    fn test_carry_forward_leading_blank_stays_blank() {
        let keys: Vec<Option<&str>> = vec![None, Some("TX")];
        assert_eq!(carry_forward(&keys), vec![None, Some("TX")]);
    }

    #[test]
    fn test_revenue_columns_detected() {
        assert!(is_revenue_column("Prop Rev"));
        assert!(is_revenue_column("Revenue"));
        assert!(is_revenue_column("rev"));
        assert!(!is_revenue_column("Prop Cost"));
    }

    #[test]
    fn test_rev_prefixed_cost_columns_kept() {
        assert!(!is_revenue_column("Reversal"));
        assert!(!is_revenue_column("Review Notes"));
    }
}
