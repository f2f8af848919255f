//! # Printer Profiles
//!
//! Text receipts only need to know how many columns fit on a line, how big a
//! single GATT write may be, and how far to feed past the tear bar.
//!
//! | Profile | Paper | Columns | Chunk | Feed |
//! |---------|-------|---------|-------|------|
//! | `58mm` | 58mm | 32 | 20 bytes | 4 lines |
//! | `80mm` | 80mm | 48 | 20 bytes | 4 lines |
//!
//! ```
//! use struk::printer::PrinterConfig;
//!
//! let config = PrinterConfig::parse("80mm").unwrap();
//! assert_eq!(config.width_chars, 48);
//! ```

use crate::format::RECEIPT_WIDTH;
use crate::transport::MAX_CHUNK_BYTES;

/// A printer profile.
///
/// `max_chunk_bytes` of 20 fits the default ATT MTU of 23. Many stacks
/// negotiate more, so this is a floor, not a limit.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PrinterConfig {
    /// Profile name
    pub name: &'static str,

    /// Characters per line in the default ESC/POS font
    pub width_chars: usize,

    /// Largest single GATT write
    pub max_chunk_bytes: usize,

    /// Trailing blank lines fed after each receipt
    pub feed_lines: usize,
}

impl PrinterConfig {
    /// Pocket BLE printers on 58mm paper.
    pub const GENERIC_58MM: Self = Self {
        name: "Generic 58mm",
        width_chars: RECEIPT_WIDTH,
        max_chunk_bytes: MAX_CHUNK_BYTES,
        feed_lines: 4,
    };

    /// Desktop BLE receipt printers on 80mm paper.
    pub const GENERIC_80MM: Self = Self {
        name: "Generic 80mm",
        width_chars: 48,
        max_chunk_bytes: MAX_CHUNK_BYTES,
        feed_lines: 4,
    };

    /// Parse a profile name as given on the command line.
    ///
    /// Accepts `"58mm"`, `"80mm"` or a profile's display name.
    pub fn parse(s: &str) -> Result<Self, String> {
        if let Some(config) = Self::built_in().into_iter().find(|c| c.name == s) {
            return Ok(config);
        }

        match s.to_lowercase().as_str() {
            "58" | "58mm" => Ok(Self::GENERIC_58MM),
            "80" | "80mm" => Ok(Self::GENERIC_80MM),
            _ => Err(format!("Unknown printer '{}'. Use '58mm' or '80mm'", s)),
        }
    }

    pub fn built_in() -> Vec<Self> {
        vec![Self::GENERIC_58MM, Self::GENERIC_80MM]
    }
}

impl Default for PrinterConfig {
    fn default() -> Self {
        Self::GENERIC_58MM
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_58mm_matches_receipt_width() {
        assert_eq!(PrinterConfig::GENERIC_58MM.width_chars, RECEIPT_WIDTH);
    }

    #[test]
    fn test_chunk_fits_default_att_payload() {
        // default ATT MTU 23 minus 3 bytes of write header
        for config in PrinterConfig::built_in() {
            assert!(config.max_chunk_bytes <= 20);
            assert!(config.width_chars > 0);
        }
    }

    #[test]
    fn test_parse() {
        assert_eq!(PrinterConfig::parse("58mm"), Ok(PrinterConfig::GENERIC_58MM));
        assert_eq!(PrinterConfig::parse("80MM"), Ok(PrinterConfig::GENERIC_80MM));
        assert_eq!(
            PrinterConfig::parse("Generic 80mm"),
            Ok(PrinterConfig::GENERIC_80MM)
        );
        assert!(PrinterConfig::parse("a4").is_err());
    }

    #[test]
    fn test_default_is_58mm() {
        assert_eq!(PrinterConfig::default(), PrinterConfig::GENERIC_58MM);
    }
}
