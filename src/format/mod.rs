//! # Receipt Formatter
//!
//! Turns a [`ReceiptData`] into the plain-text bytes sent to the printer.
//! Pure and deterministic: the same receipt and layout always produce the
//! same bytes.
//!
//! ## Layout (32 columns, 58mm paper)
//!
//! ```text
//!        PEMERINTAH DAERAH
//!    BUKTI PEMBAYARAN RETRIBUSI
//! --------------------------------
//! No Tagihan: INV-001
//! Tanggal   : 01/01/2026
//! Nama      : Budi
//! Objek     : Kios A1
//! Periode   : Jan 2026
//! --------------------------------
//! Pokok     :            Rp 50.000
//! Denda     :                 Rp 0
//! --------------------------------
//! Total     :            Rp 50.000
//! --------------------------------
//!           Terima kasih
//!  Simpan struk sebagai bukti sah
//! (4 blank lines to clear the tear bar)
//! ```
//!
//! Every line is exactly `width` characters, padded with spaces.

pub mod currency;
pub mod encode;
pub mod line;

use crate::printer::PrinterConfig;
use crate::receipt::ReceiptData;

pub use currency::CurrencyStyle;
use line::{Alignment, center, divider, label_row};

/// Characters per line on 58mm paper in the default font.
pub const RECEIPT_WIDTH: usize = 32;

/// Width of the label column in label/value rows.
pub const LABEL_WIDTH: usize = 10;

/// Row labels.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Labels {
    pub bill_number: String,
    pub date: String,
    pub payer_name: String,
    pub object_name: String,
    pub period: String,
    pub base_amount: String,
    pub penalty: String,
    pub total: String,
}

impl Default for Labels {
    fn default() -> Self {
        Self {
            bill_number: "No Tagihan".to_string(),
            date: "Tanggal".to_string(),
            payer_name: "Nama".to_string(),
            object_name: "Objek".to_string(),
            period: "Periode".to_string(),
            base_amount: "Pokok".to_string(),
            penalty: "Denda".to_string(),
            total: "Total".to_string(),
        }
    }
}

/// Everything about a receipt's appearance that is not payment data.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReceiptLayout {
    /// Characters per line
    pub width: usize,
    pub label_width: usize,
    /// Issuing authority, centered at the top
    pub header: [String; 2],
    /// Centered at the bottom
    pub footer: [String; 2],
    pub labels: Labels,
    pub currency: CurrencyStyle,
    /// Blank lines after the footer so the receipt clears the cutter
    pub feed_lines: usize,
}

impl Default for ReceiptLayout {
    fn default() -> Self {
        Self {
            width: RECEIPT_WIDTH,
            label_width: LABEL_WIDTH,
            header: [
                "PEMERINTAH DAERAH".to_string(),
                "BUKTI PEMBAYARAN RETRIBUSI".to_string(),
            ],
            footer: [
                "Terima kasih".to_string(),
                "Simpan struk sebagai bukti sah".to_string(),
            ],
            labels: Labels::default(),
            currency: CurrencyStyle::default(),
            feed_lines: 4,
        }
    }
}

impl ReceiptLayout {
    /// Default layout sized for a printer profile.
    pub fn for_printer(config: &PrinterConfig) -> Self {
        Self {
            width: config.width_chars,
            feed_lines: config.feed_lines,
            ..Self::default()
        }
    }

    /// Replace the two header lines.
    pub fn with_header(mut self, top: impl Into<String>, bottom: impl Into<String>) -> Self {
        self.header = [top.into(), bottom.into()];
        self
    }

    /// Replace the two footer lines.
    pub fn with_footer(mut self, top: impl Into<String>, bottom: impl Into<String>) -> Self {
        self.footer = [top.into(), bottom.into()];
        self
    }

    /// The printed lines of a receipt, without line endings or paper feed.
    pub fn lines(&self, receipt: &ReceiptData) -> Vec<String> {
        let labels = &self.labels;
        let row = |label: &str, value: &str| {
            label_row(label, value, self.label_width, self.width, Alignment::Left)
        };
        let amount = |label: &str, value| {
            label_row(
                label,
                &self.currency.format(value),
                self.label_width,
                self.width,
                Alignment::Right,
            )
        };

        vec![
            // Header
            center(&self.header[0], self.width),
            center(&self.header[1], self.width),
            divider(self.width),
            // Body
            row(&labels.bill_number, &receipt.bill_number),
            row(&labels.date, &receipt.date),
            row(&labels.payer_name, &receipt.payer_name),
            row(&labels.object_name, &receipt.object_name),
            row(&labels.period, &receipt.period),
            divider(self.width),
            // Amounts
            amount(&labels.base_amount, receipt.base_amount),
            amount(&labels.penalty, receipt.penalty),
            divider(self.width),
            amount(&labels.total, receipt.total),
            divider(self.width),
            // Footer
            center(&self.footer[0], self.width),
            center(&self.footer[1], self.width),
        ]
    }
}

/// Format a receipt into printer bytes.
pub fn format_receipt(receipt: &ReceiptData, layout: &ReceiptLayout) -> Vec<u8> {
    let lines = layout.lines(receipt);
    let mut text = String::with_capacity((layout.width + 1) * (lines.len() + layout.feed_lines));
    for line in &lines {
        text.push_str(line);
        text.push('\n');
    }
    for _ in 0..layout.feed_lines {
        text.push('\n');
    }
    encode::encode(&text)
}

/// Format a receipt with the default 58mm layout.
pub fn format(receipt: &ReceiptData) -> Vec<u8> {
    format_receipt(receipt, &ReceiptLayout::default())
}
