// Utility helpers for parsing and formatting.
//
// This module centralizes the "dirty" CSV/number/date handling so the
// rest of the code can assume clean, typed values.
use chrono::NaiveDate;
use num_format::{Locale, ToFormattedString};

/// Parse a string-like value into `f64` while being forgiving about
/// formatting issues that are common in feature-service exports.
///
/// - Accepts `Option<&str>` so callers can pass through optional fields.
/// - Trims whitespace.
/// - Rejects values that contain alphabetic characters.
/// - Strips thousands separators like `","` before parsing.
/// - Returns `None` for anything that cannot be safely parsed.
pub fn parse_f64_safe(s: Option<&str>) -> Option<f64> {
    let s = s?.trim();
    if s.is_empty() {
        return None;
    }
    if s.chars().any(|c| c.is_ascii_alphabetic()) {
        return None;
    }
    let s = s.replace(',', "");
    s.parse::<f64>().ok().filter(|v| v.is_finite())
}

/// Counts are exported as floats by some services (`1200.0`), so accept
/// any non-negative whole number.
pub fn parse_u64_safe(s: Option<&str>) -> Option<u64> {
    let v = parse_f64_safe(s)?;
    if v < 0.0 || v.fract() != 0.0 {
        return None;
    }
    Some(v as u64)
}

pub fn clean_text(s: Option<String>) -> String {
    s.map(|v| v.trim().to_string()).unwrap_or_default()
}

pub fn format_number(n: f64, decimals: usize) -> String {
    // Format a floating-point value with:
    // - a fixed number of decimal places, and
    // - thousands separators (e.g., `1,234,567.89`).
    // The integer digits are grouped as text so values past `u64::MAX`
    // keep every digit.
    if !n.is_finite() {
        return n.to_string();
    }
    let neg = n.is_sign_negative() && n != 0.0;
    let s = format!("{:.*}", decimals, n.abs());
    let (int_part, frac_part) = match s.split_once('.') {
        Some((i, f)) => (i, Some(f)),
        None => (s.as_str(), None),
    };
    let mut res = group_thousands(int_part);
    if let Some(frac) = frac_part {
        res.push('.');
        res.push_str(frac);
    }
    if neg {
        format!("-{}", res)
    } else {
        res
    }
}

fn group_thousands(digits: &str) -> String {
    let mut out = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, c) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(c);
    }
    out
}

pub fn format_int<T>(n: T) -> String
where
    T: ToFormattedString,
{
    // Thin wrapper around `num-format` for integer-like values such as
    // population and household counts (e.g., `9,855`).
    n.to_formatted_string(&Locale::en)
}

/// Long US-style date used on the print report, e.g. `October 18, 2026`.
pub fn format_report_date(date: NaiveDate) -> String {
    date.format("%B %-d, %Y").to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_forgiving_numbers() {
        assert_eq!(parse_f64_safe(Some(" 1,234.5 ")), Some(1234.5));
        assert_eq!(parse_f64_safe(Some("n/a")), None);
        assert_eq!(parse_f64_safe(Some("")), None);
        assert_eq!(parse_f64_safe(None), None);
    }

    #[test]
    fn parse_counts() {
        assert_eq!(parse_u64_safe(Some("1200.0")), Some(1200));
        assert_eq!(parse_u64_safe(Some("12,000")), Some(12000));
        assert_eq!(parse_u64_safe(Some("-3")), None);
        assert_eq!(parse_u64_safe(Some("2.5")), None);
    }

    #[test]
    fn number_formatting() {
        assert_eq!(format_number(1234567.891, 2), "1,234,567.89");
        assert_eq!(format_number(0.5, 2), "0.50");
        assert_eq!(format_number(-12.0, 1), "-12.0");
        assert_eq!(format_number(42.0, 0), "42");
        assert_eq!(format_int(9855u64), "9,855");
    }

    #[test]
    fn large_numbers_keep_their_digits() {
        assert_eq!(format_number(3.0e19, 2), "30,000,000,000,000,000,000.00");
        assert_eq!(format_number(-3.0e19, 0), "-30,000,000,000,000,000,000");
        let huge = format_number(1e300, 2);
        assert!(huge.starts_with("1,000,"));
        assert!(huge.ends_with(".00"));
        assert_eq!(format_number(f64::INFINITY, 2), "inf");
    }

    #[test]
    fn report_date() {
        let d = NaiveDate::from_ymd_opt(2026, 10, 8).unwrap();
        assert_eq!(format_report_date(d), "October 8, 2026");
    }
}
