//! # Printer Text Encoding
//!
//! ESC/POS printers start up in their default single-byte code page. Only the
//! ASCII range is reliable across vendors, so ASCII (U+0000–U+007F) passes
//! through unchanged and anything else becomes `?`. One character always
//! produces one byte, which keeps fixed-width lines fixed-width on paper.

use tracing::warn;

/// Encode text as printer bytes.
pub fn encode(s: &str) -> Vec<u8> {
    let (bytes, replaced) = encode_counting(s);
    if replaced > 0 {
        warn!(replaced, "unprintable characters replaced with '?'");
    }
    bytes
}

/// Encode and report how many characters were replaced.
fn encode_counting(s: &str) -> (Vec<u8>, usize) {
    let mut out = Vec::with_capacity(s.len());
    let mut replaced = 0;
    for ch in s.chars() {
        if ch.is_ascii() {
            out.push(ch as u8);
        } else {
            replaced += 1;
            out.push(b'?');
        }
    }
    (out, replaced)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ascii_passthrough() {
        assert_eq!(encode("Rp 50.000\n"), b"Rp 50.000\n".to_vec());
    }

    #[test]
    fn test_non_ascii_replaced_one_byte_per_char() {
        assert_eq!(encode("Désa"), b"D?sa".to_vec());
        assert_eq!(encode("日本"), b"??".to_vec());
    }

    #[test]
    fn test_replacements_counted() {
        let (bytes, replaced) = encode_counting("Ibu Siti 李小龙");
        assert_eq!(bytes, b"Ibu Siti ???".to_vec());
        assert_eq!(replaced, 3);
        assert_eq!(encode_counting("Budi").1, 0);
    }

    #[test]
    fn test_empty() {
        assert!(encode("").is_empty());
    }
}
