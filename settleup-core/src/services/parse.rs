//! Cell-level parsing for amounts and dates

use std::str::FromStr;

use chrono::{DateTime, NaiveDate, NaiveDateTime};
use rust_decimal::Decimal;

/// Date-times with an offset; only the date part is kept
const OFFSET_FORMATS: &[&str] = &["%Y-%m-%d %H:%M:%S%:z", "%Y-%m-%dT%H:%M:%S%.f%z"];

const DATETIME_FORMATS: &[&str] = &[
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%d %H:%M",
    "%d/%m/%Y %H:%M:%S",
    "%d/%m/%Y %H:%M",
];

/// Tried in order; day-first wins when both readings are valid
const DATE_FORMATS: &[&str] = &[
    "%Y-%m-%d",
    "%Y/%m/%d",
    "%d/%m/%Y",
    "%m/%d/%Y",
    "%d-%m-%Y",
    "%m-%d-%Y",
    "%d.%m.%Y",
    "%d %b %Y",
    "%d %B %Y",
    "%b %d, %Y",
    "%B %d, %Y",
    "%d-%b-%Y",
];

/// Two-digit years, only after every four-digit form failed
const SHORT_YEAR_FORMATS: &[&str] = &["%d/%m/%y", "%m/%d/%y", "%d.%m.%y"];

fn plausible(date: NaiveDate) -> Option<NaiveDate> {
    use chrono::Datelike;
    (1000..=9999).contains(&date.year()).then_some(date)
}

/// Parse a statement date cell
pub fn parse_date(raw: &str) -> Option<NaiveDate> {
    let s = raw.trim();
    if s.is_empty() {
        return None;
    }

    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Some(dt.date_naive());
    }
    for fmt in OFFSET_FORMATS {
        if let Ok(dt) = DateTime::parse_from_str(s, fmt) {
            return Some(dt.date_naive());
        }
    }
    for fmt in DATETIME_FORMATS {
        if let Ok(dt) = NaiveDateTime::parse_from_str(s, fmt) {
            return plausible(dt.date());
        }
    }
    for fmt in DATE_FORMATS {
        if let Some(date) = NaiveDate::parse_from_str(s, fmt).ok().and_then(plausible) {
            return Some(date);
        }
    }
    SHORT_YEAR_FORMATS
        .iter()
        .find_map(|fmt| NaiveDate::parse_from_str(s, fmt).ok())
}

/// Parse a statement amount cell into an exact decimal
///
/// Accepts currency symbols or codes around the number, grouping spaces,
/// accounting parentheses and leading or trailing minus signs. The rightmost
/// `.` or `,` is the decimal mark unless exactly three digits follow it
/// (a thousands group) and the integer part is not a bare zero; every other
/// separator is grouping, so `"1,234"` and `"1.234"` are both 1234.
pub fn parse_amount(raw: &str) -> Option<Decimal> {
    let s = raw.trim();
    let (parenthesized, s) = match s.strip_prefix('(').and_then(|v| v.strip_suffix(')')) {
        Some(inner) => (true, inner.trim()),
        None => (false, s),
    };

    let first = s.find(|c: char| c.is_ascii_digit())?;
    let last = s.rfind(|c: char| c.is_ascii_digit())?;
    let (prefix, body, suffix) = (&s[..first], &s[first..=last], &s[last + 1..]);

    // "50k" or "abc12" are not amounts we can trust
    if prefix.ends_with(|c: char| c.is_ascii_alphabetic())
        || suffix.starts_with(|c: char| c.is_ascii_alphabetic())
    {
        return None;
    }
    if !body
        .chars()
        .all(|c| c.is_ascii_digit() || matches!(c, '.' | ',' | '\'') || c.is_whitespace())
    {
        return None;
    }

    let minus = prefix.contains('-') || suffix.contains('-');
    let body: String = body.chars().filter(|c| !c.is_whitespace() && *c != '\'').collect();

    let number = match body.rfind(['.', ',']) {
        None => body,
        Some(pos) => {
            let (int_part, frac) = (&body[..pos], &body[pos + 1..]);
            let int_digits: String = int_part.chars().filter(|c| c.is_ascii_digit()).collect();
            let bare_zero = int_part.chars().all(|c| c == '0');
            if !frac.is_empty() && (frac.len() != 3 || bare_zero) {
                let int_digits = if int_digits.is_empty() { "0".to_string() } else { int_digits };
                format!("{int_digits}.{frac}")
            } else {
                format!("{int_digits}{frac}")
            }
        }
    };

    let value = Decimal::from_str(&number).ok()?;
    if (parenthesized || minus) && !value.is_zero() {
        Some(-value)
    } else {
        Some(value)
    }
}

/// Canonical text for an amount, read back unchanged by [`parse_amount`]
///
/// Plain `Display` except for three fractional digits, which get a trailing
/// zero so they are not taken for a thousands group.
pub fn format_amount(value: Decimal) -> String {
    let text = value.to_string();
    if value.scale() == 3 {
        format!("{text}0")
    } else {
        text
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn d(y: i32, m: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, day).unwrap()
    }

    #[test]
    fn test_parse_amount_plain() {
        assert_eq!(parse_amount("500.00"), Some(Decimal::new(50000, 2)));
        assert_eq!(parse_amount("  -42.50  "), Some(Decimal::new(-4250, 2)));
        assert_eq!(parse_amount("0"), Some(Decimal::ZERO));
        assert_eq!(parse_amount("500000"), Some(Decimal::new(500000, 0)));
    }

    #[test]
    fn test_parse_amount_locales() {
        assert_eq!(parse_amount("1.234,56"), Some(Decimal::new(123456, 2)));
        assert_eq!(parse_amount("1,234.56"), Some(Decimal::new(123456, 2)));
        assert_eq!(parse_amount("1 234,56"), Some(Decimal::new(123456, 2)));
        assert_eq!(parse_amount("1\u{a0}234,5"), Some(Decimal::new(12345, 1)));
        assert_eq!(parse_amount("1.000.000"), Some(Decimal::new(1_000_000, 0)));
        assert_eq!(parse_amount("1'234.50"), Some(Decimal::new(123450, 2)));
    }

    #[test]
    fn test_parse_amount_three_digit_group_is_thousands() {
        assert_eq!(parse_amount("1,234"), Some(Decimal::new(1234, 0)));
        assert_eq!(parse_amount("1.234"), Some(Decimal::new(1234, 0)));
        assert_eq!(parse_amount("0,125"), Some(Decimal::new(125, 3)));
        assert_eq!(parse_amount("12.1250"), Some(Decimal::new(121250, 4)));
    }

    #[test]
    fn test_format_amount() {
        assert_eq!(format_amount(Decimal::new(-2000, 2)), "-20.00");
        assert_eq!(format_amount(Decimal::new(1375, 3)), "1.3750");
        assert_eq!(format_amount(Decimal::new(1234, 0)), "1234");
        assert_eq!(format_amount(Decimal::new(121250, 4)), "12.1250");
    }

    /// Every scale and sign survives both the minus and the parenthesized form
    #[test]
    fn test_sign_conventions_round_trip_across_scales() {
        for scale in 0..=4 {
            for mantissa in [0i64, 7, 125, 1234, 1_234_567, 987_654_321] {
                for sign in [1i64, -1] {
                    let amount = Decimal::new(sign * mantissa, scale);
                    let magnitude = format_amount(amount.abs());
                    let (minus, parens) = if amount.is_sign_negative() && !amount.is_zero() {
                        (format!("-{magnitude}"), format!("({magnitude})"))
                    } else {
                        (magnitude.clone(), magnitude.clone())
                    };
                    assert_eq!(parse_amount(&minus), Some(amount), "minus form {minus}");
                    assert_eq!(parse_amount(&parens), Some(amount), "parenthesized form {parens}");
                    assert_eq!(parse_amount(&format_amount(amount)), Some(amount));
                }
            }
        }
    }

    #[test]
    fn test_parse_amount_parenthesized_negatives() {
        assert_eq!(parse_amount("(1,234.56)"), Some(Decimal::new(-123456, 2)));
        assert_eq!(parse_amount("(500.00)"), Some(Decimal::new(-50000, 2)));
        assert_eq!(parse_amount("( 20 )"), Some(Decimal::new(-20, 0)));
    }

    #[test]
    fn test_parse_amount_currency_and_signs() {
        assert_eq!(parse_amount("$1,234.56"), Some(Decimal::new(123456, 2)));
        assert_eq!(parse_amount("-$50.00"), Some(Decimal::new(-5000, 2)));
        assert_eq!(parse_amount("50.00-"), Some(Decimal::new(-5000, 2)));
        assert_eq!(parse_amount("1.500.000 VND"), Some(Decimal::new(1_500_000, 0)));
        assert_eq!(parse_amount("€ 12,5"), Some(Decimal::new(125, 1)));
    }

    #[test]
    fn test_parse_amount_rejects_garbage() {
        assert_eq!(parse_amount(""), None);
        assert_eq!(parse_amount("not_a_number"), None);
        assert_eq!(parse_amount("2024-01-05"), None);
        assert_eq!(parse_amount("50k"), None);
        assert_eq!(parse_amount("12abc34"), None);
    }

    #[test]
    fn test_parse_amount_negative_zero_is_zero() {
        let zero = parse_amount("(0.00)").unwrap();
        assert!(zero.is_zero());
        assert!(!zero.is_sign_negative());
    }

    #[test]
    fn test_parse_date_formats() {
        assert_eq!(parse_date("2024-01-05"), Some(d(2024, 1, 5)));
        assert_eq!(parse_date("2024/01/05"), Some(d(2024, 1, 5)));
        assert_eq!(parse_date("05/01/2024"), Some(d(2024, 1, 5)));
        assert_eq!(parse_date("01/13/2024"), Some(d(2024, 1, 13)));
        assert_eq!(parse_date("05.01.2024"), Some(d(2024, 1, 5)));
        assert_eq!(parse_date("5 Jan 2024"), Some(d(2024, 1, 5)));
        assert_eq!(parse_date("January 5, 2024"), Some(d(2024, 1, 5)));
        assert_eq!(parse_date("05-Jan-2024"), Some(d(2024, 1, 5)));
    }

    #[test]
    fn test_parse_date_with_time() {
        assert_eq!(parse_date("2024-01-05T10:30:00+07:00"), Some(d(2024, 1, 5)));
        assert_eq!(parse_date("2024-01-05 10:30:00"), Some(d(2024, 1, 5)));
        assert_eq!(parse_date("2024-01-05 10:30:00+07:00"), Some(d(2024, 1, 5)));
        assert_eq!(parse_date("05/01/2024 08:15"), Some(d(2024, 1, 5)));
    }

    #[test]
    fn test_parse_date_short_year() {
        assert_eq!(parse_date("05/01/24"), Some(d(2024, 1, 5)));
    }

    #[test]
    fn test_parse_date_rejects_invalid() {
        assert_eq!(parse_date(""), None);
        assert_eq!(parse_date("invalid"), None);
        assert_eq!(parse_date("02/30/2025"), None);
        assert_eq!(parse_date("13/13/2025"), None);
    }
}
