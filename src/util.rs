//! Small shared helpers.

use chrono::{DateTime, NaiveDate};

/// Tolerant date extraction from a stored timestamp.
///
/// Store rows carry RFC 3339 strings, but rows imported from the hosted
/// backend occasionally hold a bare `YYYY-MM-DD`. Anything else is `None`;
/// callers treat an unparseable date as "outside every window" rather than
/// an error.
pub fn parse_date(value: &str) -> Option<NaiveDate> {
    if let Ok(dt) = DateTime::parse_from_rfc3339(value) {
        return Some(dt.date_naive());
    }
    NaiveDate::parse_from_str(value, "%Y-%m-%d").ok()
}

/// Format a rupee amount with Indian digit grouping and two decimals,
/// e.g. `1234567.5` → `₹12,34,567.50`. Matches how the product has always
/// rendered money.
pub fn format_inr(amount: f64) -> String {
    let negative = amount < 0.0;
    let cents = (amount.abs() * 100.0).round() as u64;
    let rupees = cents / 100;
    let paise = cents % 100;

    let digits = rupees.to_string();
    let grouped = if digits.len() <= 3 {
        digits
    } else {
        // Last three digits, then groups of two.
        let (head, tail) = digits.split_at(digits.len() - 3);
        let mut groups: Vec<String> = Vec::new();
        let head_bytes = head.as_bytes();
        let mut end = head_bytes.len();
        while end > 0 {
            let start = end.saturating_sub(2);
            groups.push(head[start..end].to_string());
            end = start;
        }
        groups.reverse();
        format!("{},{}", groups.join(","), tail)
    };

    let sign = if negative { "-" } else { "" };
    format!("{sign}\u{20b9}{grouped}.{paise:02}")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_rfc3339_and_bare_dates() {
        assert_eq!(
            parse_date("2026-08-29T10:30:00+05:30"),
            NaiveDate::from_ymd_opt(2026, 8, 29)
        );
        assert_eq!(
            parse_date("2026-08-29"),
            NaiveDate::from_ymd_opt(2026, 8, 29)
        );
        assert_eq!(parse_date("yesterday"), None);
        assert_eq!(parse_date(""), None);
    }

    #[test]
    fn inr_grouping() {
        assert_eq!(format_inr(0.0), "\u{20b9}0.00");
        assert_eq!(format_inr(999.0), "\u{20b9}999.00");
        assert_eq!(format_inr(1_000.0), "\u{20b9}1,000.00");
        assert_eq!(format_inr(123_456.0), "\u{20b9}1,23,456.00");
        assert_eq!(format_inr(1_234_567.5), "\u{20b9}12,34,567.50");
        assert_eq!(format_inr(10_000_000.0), "\u{20b9}1,00,00,000.00");
    }

    #[test]
    fn inr_negative_amounts() {
        assert_eq!(format_inr(-5_000.0), "-\u{20b9}5,000.00");
    }

    #[test]
    fn inr_rounds_paise() {
        assert_eq!(format_inr(10.006), "\u{20b9}10.01");
        assert_eq!(format_inr(10.004), "\u{20b9}10.00");
    }
}
