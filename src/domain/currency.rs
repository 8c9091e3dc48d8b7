//! Conversion between whole-unit amounts and their display strings.

use serde::Deserialize;

pub const DEFAULT_SYMBOL: &str = "Rp";

/// Digit grouping conventions supported by the terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
pub enum Locale {
    /// `1.500.000`
    #[default]
    #[serde(rename = "id-ID")]
    IdId,
    /// `1,500,000`
    #[serde(rename = "en-US")]
    EnUs,
}

impl Locale {
    pub fn group_separator(self) -> char {
        match self {
            Locale::IdId => '.',
            Locale::EnUs => ',',
        }
    }
}

/// Extracts the amount typed into an input field.
///
/// Every non-digit character is dropped, so `"Rp 1.500"` and `"1,500"` both
/// yield `1500`. Empty or digit-free input yields 0; oversized input saturates.
pub fn parse_amount_input(raw: &str) -> u64 {
    raw.chars()
        .filter_map(|c| c.to_digit(10))
        .fold(0u64, |acc, digit| {
            acc.saturating_mul(10).saturating_add(u64::from(digit))
        })
}

/// Renders `amount` with thousands grouping and no currency symbol.
pub fn format_grouped(amount: u64, locale: Locale) -> String {
    let digits = amount.to_string();
    let separator = locale.group_separator();
    let mut out = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, c) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(separator);
        }
        out.push(c);
    }
    out
}

/// Renders `amount` as `"Rp 1.500.000"`.
pub fn format_amount(amount: u64, locale: Locale) -> String {
    format_with_symbol(amount, locale, DEFAULT_SYMBOL)
}

/// Like [`format_amount`] with a caller-chosen symbol. The symbol must not
/// contain digits or the result no longer parses back to `amount`.
pub fn format_with_symbol(amount: u64, locale: Locale, symbol: &str) -> String {
    format!("{symbol} {}", format_grouped(amount, locale))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_strips_non_digits() {
        assert_eq!(parse_amount_input("Rp 1.500.000"), 1_500_000);
        assert_eq!(parse_amount_input("12a3"), 123);
        assert_eq!(parse_amount_input(""), 0);
        assert_eq!(parse_amount_input("abc"), 0);
    }

    #[test]
    fn test_parse_saturates() {
        assert_eq!(parse_amount_input("99999999999999999999999"), u64::MAX);
    }

    #[test]
    fn test_grouping() {
        assert_eq!(format_grouped(0, Locale::IdId), "0");
        assert_eq!(format_grouped(999, Locale::IdId), "999");
        assert_eq!(format_grouped(1000, Locale::IdId), "1.000");
        assert_eq!(format_grouped(2_500_000, Locale::EnUs), "2,500,000");
        assert_eq!(format_grouped(100_000, Locale::IdId), "100.000");
    }

    #[test]
    fn test_format_amount() {
        assert_eq!(format_amount(150_000, Locale::IdId), "Rp 150.000");
        assert_eq!(format_with_symbol(1000, Locale::EnUs, "IDR"), "IDR 1,000");
    }

    #[test]
    fn test_round_trip_edges() {
        for n in [0, 1, 999, 1000, 1_000_000, u64::MAX] {
            assert_eq!(parse_amount_input(&format_amount(n, Locale::IdId)), n);
            assert_eq!(parse_amount_input(&format_amount(n, Locale::EnUs)), n);
        }
    }
}
