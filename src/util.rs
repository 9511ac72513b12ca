// Utility helpers for parsing and number formatting.
//
// This module centralizes all the "dirty" spreadsheet cell handling so the
// rest of the code can assume clean, typed values.
use chrono::{NaiveDate, NaiveDateTime};
use num_format::{Locale, ToFormattedString};

/// Outcome of reading a numeric cell.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum NumericCell {
    /// A parsed number.
    Value(f64),
    /// Blank cell. Sums skip it, so it contributes 0.
    Blank,
    /// Text that is not a number.
    Invalid,
}

/// Parse a spreadsheet cell into `f64` while being forgiving about
/// formatting issues that are common in exports (commas, spaces).
///
/// - Trims whitespace.
/// - Treats an empty cell as [`NumericCell::Blank`].
/// - Strips thousands separators like `","` before parsing.
/// - Rejects anything with letters (including `NaN`/`inf` spellings).
pub fn parse_numeric(s: &str) -> NumericCell {
    let s = s.trim();
    if s.is_empty() {
        return NumericCell::Blank;
    }
    if s.chars().any(|c| c.is_ascii_alphabetic()) {
        return NumericCell::Invalid;
    }
    match s.replace(',', "").parse::<f64>() {
        Ok(v) if v.is_finite() => NumericCell::Value(v),
        _ => NumericCell::Invalid,
    }
}

const DATE_FORMATS: [&str; 3] = ["%Y-%m-%d", "%Y/%m/%d", "%m/%d/%Y"];
const DATETIME_FORMATS: [&str; 3] = [
    "%Y-%m-%d %H:%M:%S",
    "%Y-%m-%dT%H:%M:%S",
    "%Y-%m-%d %H:%M:%S%.f",
];

/// Parse a date cell. Timestamps are accepted but only their calendar date
/// is kept, so grouping never depends on time-of-day.
pub fn parse_date_safe(s: &str) -> Option<NaiveDate> {
    let s = s.trim();
    if s.is_empty() {
        return None;
    }
    DATE_FORMATS
        .iter()
        .find_map(|fmt| NaiveDate::parse_from_str(s, fmt).ok())
        .or_else(|| {
            DATETIME_FORMATS
                .iter()
                .find_map(|fmt| NaiveDateTime::parse_from_str(s, fmt).ok())
                .map(|dt| dt.date())
        })
}

pub fn days_between(start: NaiveDate, end: NaiveDate) -> i64 {
    // `NaiveDate` supports subtraction; the result is a `Duration` in days.
    (end - start).num_days()
}

pub fn format_number(n: f64, decimals: usize) -> String {
    // Format a floating-point value with:
    // - a fixed number of decimal places, and
    // - locale-aware thousands separators (e.g., `1,234,567.89`).
    let s = format!("{:.*}", decimals, n.abs());
    let mut parts = s.split('.');
    let int_part = parts.next().unwrap_or("0");
    let frac_part = parts.next();
    // Magnitudes beyond u128 keep their plain digits.
    let mut res = match int_part.parse::<u128>() {
        Ok(v) => v.to_formatted_string(&Locale::en),
        Err(_) => int_part.to_string(),
    };
    if let Some(frac) = frac_part {
        if decimals > 0 {
            res.push('.');
            res.push_str(frac);
        }
    }
    // Rounding can turn a tiny negative into "0"; don't print "-0".
    let all_zero = s.chars().all(|c| c == '0' || c == '.');
    if n.is_sign_negative() && !all_zero {
        format!("-{}", res)
    } else {
        res
    }
}

pub fn format_int<T>(n: T) -> String
where
    T: ToFormattedString,
{
    n.to_formatted_string(&Locale::en)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_numbers_with_thousands_separators() {
        assert_eq!(parse_numeric(" 1,250.50 "), NumericCell::Value(1250.5));
        assert_eq!(parse_numeric("-40"), NumericCell::Value(-40.0));
    }

    #[test]
    fn blank_and_text_cells_are_distinguished() {
        assert_eq!(parse_numeric("   "), NumericCell::Blank);
        assert_eq!(parse_numeric("n/a"), NumericCell::Invalid);
        assert_eq!(parse_numeric("NaN"), NumericCell::Invalid);
    }

    #[test]
    fn timestamps_keep_only_the_calendar_date() {
        let expected = NaiveDate::from_ymd_opt(2024, 1, 31).unwrap();
        assert_eq!(parse_date_safe("2024-01-31"), Some(expected));
        assert_eq!(parse_date_safe("2024-01-31 23:59:59"), Some(expected));
        assert_eq!(parse_date_safe("01/31/2024"), Some(expected));
        assert_eq!(parse_date_safe("31.01.2024"), None);
    }

    #[test]
    fn days_between_is_signed() {
        let today = NaiveDate::from_ymd_opt(2024, 1, 1).unwrap();
        let lapsed = NaiveDate::from_ymd_opt(2023, 12, 1).unwrap();
        assert_eq!(days_between(today, lapsed), -31);
    }

    #[test]
    fn formats_with_grouping_and_sign() {
        assert_eq!(format_number(1234567.891, 2), "1,234,567.89");
        assert_eq!(format_number(-2500.0, 0), "-2,500");
        assert_eq!(format_number(-0.001, 1), "0.0");
        assert_eq!(format_int(9855), "9,855");
    }

    #[test]
    fn formats_magnitudes_past_i64() {
        assert_eq!(format_number(1e19, 0), "10,000,000,000,000,000,000");
        assert_eq!(format_number(-1e19, 1), "-10,000,000,000,000,000,000.0");
        assert_eq!(format_number(1e300, 0).len(), 301);
    }
}
