//! Metric primitives
//!
//! Safe-division helpers and the string formats used across the dashboard
//! and its exports. Every function here is total: a zero denominator yields
//! 0, never NaN.

pub use num_format::Locale;
use num_format::ToFormattedString;

/// `numerator / denominator`, or 0 when the denominator is 0
pub fn ratio(numerator: f64, denominator: f64) -> f64 {
    if denominator == 0.0 {
        return 0.0;
    }
    numerator / denominator
}

/// `numerator / denominator * 100`, or 0 when the denominator is 0
pub fn calculate_percentage(numerator: f64, denominator: f64) -> f64 {
    ratio(numerator, denominator) * 100.0
}

/// Percentage string such as `"33.3%"`
pub fn percentage(numerator: f64, denominator: f64, decimals: usize) -> String {
    format_percentage(calculate_percentage(numerator, denominator), decimals)
}

/// Render an already-scaled percentage value with a `%` suffix
pub fn format_percentage(value: f64, decimals: usize) -> String {
    format!("{}%", fixed(value, decimals))
}

/// Fixed-point rendering with `decimals` places
pub fn fixed(value: f64, decimals: usize) -> String {
    let value = if value.is_finite() { value } else { 0.0 };
    format!("{:.*}", decimals, value)
}

/// Integer cents as US dollars, e.g. `123456` -> `"$1,234.56"`
pub fn currency(cents: u64) -> String {
    currency_in(cents, &Locale::en)
}

/// `currency` with the grouping and decimal marks of `locale`
pub fn currency_in(cents: u64, locale: &Locale) -> String {
    format!(
        "${}{}{:02}",
        (cents / 100).to_formatted_string(locale),
        locale.decimal(),
        cents % 100
    )
}

/// Integer with thousands separators, e.g. `1234567` -> `"1,234,567"`
pub fn count(n: u64) -> String {
    count_in(n, &Locale::en)
}

pub fn count_in(n: u64, locale: &Locale) -> String {
    n.to_formatted_string(locale)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ratio_zero_denominator() {
        assert_eq!(ratio(0.0, 0.0), 0.0);
        assert_eq!(ratio(42.0, 0.0), 0.0);
        assert_eq!(ratio(1.0, 4.0), 0.25);
    }

    #[test]
    fn test_ratio_can_exceed_one() {
        assert_eq!(ratio(150.0, 100.0), 1.5);
        assert_eq!(calculate_percentage(150.0, 100.0), 150.0);
    }

    #[test]
    fn test_percentage() {
        assert_eq!(percentage(10.0, 30.0, 1), "33.3%");
        assert_eq!(percentage(0.0, 0.0, 1), "0.0%");
        assert_eq!(percentage(1.0, 3.0, 2), "33.33%");
        assert_eq!(percentage(5.0, 0.0, 0), "0%");
    }

    #[test]
    fn test_fixed_non_finite() {
        assert_eq!(fixed(f64::NAN, 2), "0.00");
        assert_eq!(fixed(f64::INFINITY, 1), "0.0");
        assert_eq!(fixed(0.0234, 4), "0.0234");
    }

    #[test]
    fn test_currency() {
        assert_eq!(currency(0), "$0.00");
        assert_eq!(currency(5), "$0.05");
        assert_eq!(currency(500), "$5.00");
        assert_eq!(currency(123_456), "$1,234.56");
        assert_eq!(currency(100_000_000), "$1,000,000.00");
    }

    #[test]
    fn test_count() {
        assert_eq!(count(0), "0");
        assert_eq!(count(999), "999");
        assert_eq!(count(1000), "1,000");
        assert_eq!(count(1_234_567), "1,234,567");
        assert_eq!(count(u64::MAX), "18,446,744,073,709,551,615");
    }

    #[test]
    fn test_other_locale() {
        assert_eq!(count_in(1_234_567, &Locale::de), "1.234.567");
        assert_eq!(currency_in(123_456, &Locale::de), "$1.234,56");
        assert_eq!(currency_in(123_456, &Locale::en), currency(123_456));
    }
}
