//! # BLE Print Transport
//!
//! Gets formatted receipt bytes onto a Bluetooth LE thermal printer.
//!
//! ## Layers
//!
//! | Module | Role |
//! |--------|------|
//! | [`connection`] | [`PrinterConnection`] state machine, one job at a time |
//! | [`selection`] | Ordered device-selection strategies |
//! | [`discovery`] | Finding the writable characteristic |
//! | [`chunk`] | Splitting payloads into ATT-sized writes |
//! | [`gatt`] | Platform traits the connection is generic over |
//! | [`ble`] | `btleplug` implementation of those traits |
//! | [`mock`] | In-memory implementation for tests |

pub mod ble;
pub mod chunk;
pub mod connection;
pub mod discovery;
pub mod gatt;
pub mod mock;
pub mod selection;

pub use ble::{BtleplugHost, DeviceChooser, ScanOptions};
pub use chunk::MAX_CHUNK_BYTES;
pub use connection::{ConnectionState, PrinterConnection, TransportConfig};
pub use gatt::{BleDevice, BleHost, GattCharacteristic, GattService, GattSession};
pub use selection::SelectionStrategy;
