//! # Struk - Retribution Receipt Printing over Bluetooth LE
//!
//! Struk formats payment receipts as fixed-width text and sends them to
//! portable thermal printers over Bluetooth Low Energy. It provides:
//!
//! - **Formatting**: 32-column text receipts with aligned label/value rows
//! - **Transport**: device selection, write-characteristic discovery and
//!   chunked GATT writes, with the binding reused across jobs
//! - **HTTP API**: a small axum server so other applications can print
//!
//! ## Quick Start
//!
//! ```no_run
//! use struk::{
//!     ReceiptData,
//!     transport::{BtleplugHost, PrinterConnection, ScanOptions},
//! };
//!
//! # #[tokio::main(flavor = "current_thread")]
//! # async fn main() -> Result<(), struk::StrukError> {
//! let host = BtleplugHost::new(ScanOptions::default()).await;
//! let mut printer = PrinterConnection::new(host);
//!
//! printer.print(&ReceiptData::sample()).await?;
//! # Ok(())
//! # }
//! ```
//!
//! ## Module Overview
//!
//! | Module | Description |
//! |--------|-------------|
//! | [`receipt`] | Receipt data and amounts |
//! | [`format`] | Receipt text layout and encoding |
//! | [`transport`] | BLE selection, discovery and transfer |
//! | [`printer`] | Printer configurations |
//! | [`server`] | HTTP print API |
//! | [`error`] | Error types |
//!
//! ## Supported Printers
//!
//! Generic 58mm and 80mm ESC/POS-class BLE printers that advertise the
//! `0x18F0` service or the common OEM print service. Others can be reached
//! through the accept-all fallback as long as they expose a writable
//! characteristic.

pub mod error;
pub mod format;
pub mod printer;
pub mod receipt;
pub mod server;
pub mod transport;

// Re-exports for convenience
pub use error::{PrintError, StrukError};
pub use format::{RECEIPT_WIDTH, ReceiptLayout, format_receipt};
pub use printer::PrinterConfig;
pub use receipt::{Amount, ReceiptData};
pub use transport::{MAX_CHUNK_BYTES, PrinterConnection};
