//! # Fixed-Width Lines
//!
//! Builders for the three kinds of receipt line. All widths count characters,
//! and every builder returns exactly `width` characters: long input is
//! truncated, never wrapped.
//!
//! ```text
//! centered     |   PEMERINTAH DAERAH    |
//! label/value  |Nama      : Budi        |
//! amount       |Total     :    Rp 50.000|
//! divider      |------------------------|
//! ```

/// Delimiter between the label column and the value column.
pub const DELIMITER: &str = ": ";

/// Value alignment inside the value column.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Alignment {
    #[default]
    Left,
    Right,
}

/// Keep at most `width` characters of `s`.
pub fn truncate(s: &str, width: usize) -> &str {
    match s.char_indices().nth(width) {
        Some((end, _)) => &s[..end],
        None => s,
    }
}

/// Truncate or pad `s` to exactly `width` characters.
pub fn fit(s: &str, width: usize, align: Alignment) -> String {
    let s = truncate(s, width);
    match align {
        Alignment::Left => format!("{:<width$}", s, width = width),
        Alignment::Right => format!("{:>width$}", s, width = width),
    }
}

/// Center `s` in `width` characters. An odd leftover space goes on the right.
pub fn center(s: &str, width: usize) -> String {
    let s = truncate(s, width);
    let spare = width - s.chars().count();
    let left = spare / 2;
    let right = spare - left;
    format!("{}{}{}", " ".repeat(left), s, " ".repeat(right))
}

/// A full-width divider.
pub fn divider(width: usize) -> String {
    "-".repeat(width)
}

/// A `LABEL: value` row.
///
/// The label is padded or truncated to `label_width`, followed by
/// [`DELIMITER`], then the value fitted into whatever width is left.
pub fn label_row(
    label: &str,
    value: &str,
    label_width: usize,
    width: usize,
    align: Alignment,
) -> String {
    let label_width = label_width.min(width.saturating_sub(DELIMITER.len()));
    let value_width = width - label_width - DELIMITER.len().min(width);
    let row = format!(
        "{}{}{}",
        fit(label, label_width, Alignment::Left),
        DELIMITER,
        fit(value, value_width, align)
    );
    // widths below the delimiter length cut into the delimiter
    fit(&row, width, Alignment::Left)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn width_of(s: &str) -> usize {
        s.chars().count()
    }

    #[test]
    fn test_truncate() {
        assert_eq!(truncate("hello", 3), "hel");
        assert_eq!(truncate("hi", 3), "hi");
        assert_eq!(truncate("", 3), "");
        assert_eq!(truncate("héllo", 2), "hé");
    }

    #[test]
    fn test_center_even() {
        assert_eq!(center("ab", 6), "  ab  ");
    }

    #[test]
    fn test_center_odd_remainder_goes_right() {
        assert_eq!(center("abc", 6), " abc  ");
        assert_eq!(center("", 3), "   ");
    }

    #[test]
    fn test_center_truncates() {
        assert_eq!(center("abcdefgh", 4), "abcd");
    }

    #[test]
    fn test_divider() {
        assert_eq!(divider(5), "-----");
    }

    #[test]
    fn test_label_row_left() {
        assert_eq!(
            label_row("Nama", "Budi", 10, 20, Alignment::Left),
            "Nama      : Budi    "
        );
    }

    #[test]
    fn test_label_row_right() {
        assert_eq!(
            label_row("Total", "Rp 500", 10, 20, Alignment::Right),
            "Total     :   Rp 500"
        );
    }

    #[test]
    fn test_label_row_truncates_label_and_value() {
        let row = label_row(
            "Nomor Tagihan Panjang",
            "ABCDEFGHIJKLMNOPQRSTUVWXYZ",
            10,
            20,
            Alignment::Left,
        );
        assert_eq!(row, "Nomor Tagi: ABCDEFGH");
    }

    #[test]
    fn test_label_row_width_invariant() {
        let long = "x".repeat(100);
        let inputs = ["", "a", "Kios A1", long.as_str()];
        for label in inputs {
            for value in inputs {
                for align in [Alignment::Left, Alignment::Right] {
                    let row = label_row(label, value, 10, 32, align);
                    assert_eq!(width_of(&row), 32, "label={:?} value={:?}", label, value);
                }
            }
        }
    }

    #[test]
    fn test_label_row_degenerate_widths() {
        assert_eq!(width_of(&label_row("Nama", "Budi", 10, 1, Alignment::Left)), 1);
        assert_eq!(width_of(&label_row("Nama", "Budi", 40, 12, Alignment::Left)), 12);
    }
}
