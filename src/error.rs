//! # Error Types
//!
//! This module defines the error types used throughout the struk library.
//!
//! ## Layers
//!
//! | Type | Raised by | Meaning |
//! |------|-----------|---------|
//! | [`BleError`] | BLE backends | A single platform operation failed |
//! | [`SelectionError`] | BLE backends | One device-selection strategy failed |
//! | [`PrintError`] | [`PrinterConnection`](crate::transport::PrinterConnection) | What the caller of `print()` sees |
//! | [`StrukError`] | CLI and HTTP server | Anything the application can fail with |

use thiserror::Error;

/// Errors returned by a print attempt.
///
/// Each kind has a different remedy, so callers should surface
/// [`PrintError::user_message`] rather than a generic "printing failed".
#[derive(Debug, Error)]
pub enum PrintError {
    /// The host has no usable Bluetooth LE support. Permanent.
    #[error("Bluetooth LE is not available on this host")]
    CapabilityUnavailable,

    /// The user dismissed the device picker.
    #[error("Printer selection was cancelled")]
    SelectionCancelled,

    /// Every selection strategy finished without finding a device.
    #[error("No printer was found nearby")]
    NoDeviceFound,

    /// The platform Bluetooth stack failed during every device search.
    #[error("Printer search failed: {0}")]
    SelectionFailed(String),

    /// GATT connect or service discovery failed after a device was chosen.
    #[error("Failed to connect to printer: {0}")]
    ConnectFailed(String),

    /// The device exposes nothing this library can write to.
    #[error("Printer exposes no writable characteristic")]
    NoWritableCharacteristic,

    /// A chunk write failed mid-stream. `chunk` is 1-based.
    #[error("Transfer failed at chunk {chunk} of {total}: {reason}")]
    TransferFailed {
        chunk: usize,
        total: usize,
        reason: String,
    },
}

impl PrintError {
    /// Short machine-readable kind, used in HTTP error bodies.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::CapabilityUnavailable => "capability_unavailable",
            Self::SelectionCancelled => "selection_cancelled",
            Self::NoDeviceFound => "no_device_found",
            Self::SelectionFailed(_) => "selection_failed",
            Self::ConnectFailed(_) => "connect_failed",
            Self::NoWritableCharacteristic => "no_writable_characteristic",
            Self::TransferFailed { .. } => "transfer_failed",
        }
    }

    /// Message to show the operator, with the remedy for this kind of failure.
    pub fn user_message(&self) -> &'static str {
        match self {
            Self::CapabilityUnavailable => {
                "Bluetooth LE is not available. Enable Bluetooth or use a device and browser with Bluetooth LE support."
            }
            Self::SelectionCancelled => "Printing was cancelled.",
            Self::NoDeviceFound => {
                "No printer was found. Make sure the printer is switched on and nearby, then try again."
            }
            Self::SelectionFailed(_) => {
                "The Bluetooth adapter could not search for printers. Check that Bluetooth is switched on and working, then try again."
            }
            Self::ConnectFailed(_) => {
                "Could not connect to the printer. Move closer to it and try again."
            }
            Self::NoWritableCharacteristic => {
                "This printer cannot receive print data. Choose a different printer."
            }
            Self::TransferFailed { .. } => {
                "The connection to the printer was lost while printing. Check the paper for a partial receipt before printing again."
            }
        }
    }

    /// True when the user aborted; callers should not show an error.
    pub fn is_cancellation(&self) -> bool {
        matches!(self, Self::SelectionCancelled)
    }

    /// True when a fresh `print()` call may succeed.
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            Self::NoDeviceFound
                | Self::SelectionFailed(_)
                | Self::ConnectFailed(_)
                | Self::TransferFailed { .. }
        )
    }
}

/// Failure of a single platform BLE operation.
#[derive(Debug, Error)]
pub enum BleError {
    /// No adapter, or the Bluetooth stack is not running
    #[error("Bluetooth adapter not available")]
    Unavailable,

    /// The platform stack did not answer in time
    #[error("Timed out during {0}")]
    Timeout(&'static str),

    /// The characteristic is no longer present on the peripheral
    #[error("Characteristic {0} not found on peripheral")]
    CharacteristicMissing(uuid::Uuid),

    /// Any other backend failure
    #[error("{0}")]
    Backend(String),
}

impl From<btleplug::Error> for BleError {
    fn from(e: btleplug::Error) -> Self {
        match e {
            btleplug::Error::TimedOut(_) => Self::Timeout("platform operation"),
            other => Self::Backend(other.to_string()),
        }
    }
}

/// Outcome of one device-selection strategy that produced no device.
#[derive(Debug, Error)]
pub enum SelectionError {
    /// The user dismissed the picker. Stops all remaining strategies.
    #[error("selection cancelled by user")]
    Cancelled,

    /// Nothing nearby matched this strategy's filter.
    #[error("no device matched")]
    NoMatch,

    /// The platform failed while running this strategy.
    #[error("selection failed: {0}")]
    Failed(#[from] BleError),
}

/// Main error type for the struk application.
#[derive(Debug, Error)]
pub enum StrukError {
    /// A print attempt failed
    #[error(transparent)]
    Print(#[from] PrintError),

    /// Invalid option or configuration value
    #[error("Configuration error: {0}")]
    Config(String),

    /// Receipt data could not be read or parsed
    #[error("Invalid receipt: {0}")]
    Receipt(String),

    /// HTTP server failure
    #[error("Server error: {0}")]
    Server(String),

    /// I/O error wrapper
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}
