//! # Currency Rendering
//!
//! Whole-unit amounts grouped by thousands, e.g. `Rp 1.250.000`.

use crate::receipt::Amount;

/// How amounts are written on the receipt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CurrencyStyle {
    /// Printed before the number, including any space
    pub prefix: String,
    /// Thousands separator
    pub separator: char,
}

impl Default for CurrencyStyle {
    /// Indonesian rupiah: `Rp 50.000`
    fn default() -> Self {
        Self {
            prefix: "Rp ".to_string(),
            separator: '.',
        }
    }
}

impl CurrencyStyle {
    /// Render an amount, sign first: `-Rp 1.000`.
    pub fn format(&self, amount: Amount) -> String {
        let units = amount.units();
        let sign = if units < 0 { "-" } else { "" };
        format!(
            "{}{}{}",
            sign,
            self.prefix,
            group_thousands(units.unsigned_abs(), self.separator)
        )
    }
}

/// Group digits in threes from the right.
pub fn group_thousands(value: u64, separator: char) -> String {
    let digits = value.to_string();
    let mut out = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, digit) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(separator);
        }
        out.push(digit);
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_group_thousands() {
        assert_eq!(group_thousands(0, '.'), "0");
        assert_eq!(group_thousands(999, '.'), "999");
        assert_eq!(group_thousands(1_000, '.'), "1.000");
        assert_eq!(group_thousands(50_000, '.'), "50.000");
        assert_eq!(group_thousands(1_234_567, ','), "1,234,567");
    }

    #[test]
    fn test_group_thousands_u64_max() {
        assert_eq!(
            group_thousands(u64::MAX, '.'),
            "18.446.744.073.709.551.615"
        );
    }

    #[test]
    fn test_format_rupiah() {
        let style = CurrencyStyle::default();
        assert_eq!(style.format(Amount::new(50_000)), "Rp 50.000");
        assert_eq!(style.format(Amount::ZERO), "Rp 0");
    }

    #[test]
    fn test_format_negative() {
        let style = CurrencyStyle::default();
        assert_eq!(style.format(Amount::new(-1_500)), "-Rp 1.500");
        assert_eq!(
            style.format(Amount::new(i64::MIN)),
            "-Rp 9.223.372.036.854.775.808"
        );
    }

    #[test]
    fn test_custom_style() {
        let style = CurrencyStyle {
            prefix: "$".to_string(),
            separator: ',',
        };
        assert_eq!(style.format(Amount::new(1_000_000)), "$1,000,000");
    }
}
