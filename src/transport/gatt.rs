//! # GATT Platform Interface
//!
//! The three handles a print job needs from the host Bluetooth stack, as
//! traits so the connection logic runs the same against real hardware
//! ([`ble`](super::ble)) and in tests ([`mock`](super::mock)).
//!
//! ```text
//! BleHost ──request_device──▶ BleDevice ──connect──▶ GattSession ──write──▶ printer
//! ```
//!
//! Ownership follows the arrows: a session only lives as long as the device
//! it was opened on, and a characteristic is only meaningful inside the
//! session it was discovered in.

use async_trait::async_trait;
use btleplug::api::{CharPropFlags, WriteType};
use uuid::Uuid;

use super::selection::SelectionStrategy;
use crate::error::{BleError, SelectionError};

/// A characteristic as reported by service discovery.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GattCharacteristic {
    pub uuid: Uuid,
    /// The service this characteristic belongs to
    pub service: Uuid,
    pub properties: CharPropFlags,
}

impl GattCharacteristic {
    /// True if the characteristic accepts writes of either kind.
    pub fn is_writable(&self) -> bool {
        self.properties
            .intersects(CharPropFlags::WRITE | CharPropFlags::WRITE_WITHOUT_RESPONSE)
    }

    /// Prefer acknowledged writes so each chunk is confirmed before the next.
    pub fn write_type(&self) -> WriteType {
        if self.properties.contains(CharPropFlags::WRITE) {
            WriteType::WithResponse
        } else {
            WriteType::WithoutResponse
        }
    }
}

/// A service and its characteristics.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GattService {
    pub uuid: Uuid,
    pub primary: bool,
    pub characteristics: Vec<GattCharacteristic>,
}

/// The host's Bluetooth LE stack.
#[async_trait]
pub trait BleHost: Send + Sync {
    type Device: BleDevice;

    /// Whether the host has usable BLE support at all.
    async fn is_available(&self) -> bool;

    /// Pick one nearby device according to `strategy`.
    async fn request_device(
        &self,
        strategy: &SelectionStrategy,
    ) -> Result<Self::Device, SelectionError>;
}

/// A chosen peripheral, not yet connected.
#[async_trait]
pub trait BleDevice: Send + Sync {
    type Session: GattSession;

    /// Name or address for logs
    fn label(&self) -> String;

    /// Open a GATT session with services resolved.
    async fn connect(&self) -> Result<Self::Session, BleError>;
}

/// An open GATT connection.
#[async_trait]
pub trait GattSession: Send + Sync {
    /// All services the peripheral exposes.
    async fn services(&self) -> Result<Vec<GattService>, BleError>;

    /// Write one payload, returning once the stack reports it done.
    async fn write(&self, characteristic: &GattCharacteristic, data: &[u8]) -> Result<(), BleError>;

    async fn disconnect(&self) -> Result<(), BleError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    fn characteristic(properties: CharPropFlags) -> GattCharacteristic {
        GattCharacteristic {
            uuid: Uuid::nil(),
            service: Uuid::nil(),
            properties,
        }
    }

    #[test]
    fn test_writable_properties() {
        assert!(characteristic(CharPropFlags::WRITE).is_writable());
        assert!(characteristic(CharPropFlags::WRITE_WITHOUT_RESPONSE).is_writable());
        assert!(!characteristic(CharPropFlags::READ | CharPropFlags::NOTIFY).is_writable());
        assert!(!characteristic(CharPropFlags::empty()).is_writable());
    }

    #[test]
    fn test_write_type_prefers_response() {
        let both = characteristic(CharPropFlags::WRITE | CharPropFlags::WRITE_WITHOUT_RESPONSE);
        assert_eq!(both.write_type(), WriteType::WithResponse);
        let unacked = characteristic(CharPropFlags::WRITE_WITHOUT_RESPONSE);
        assert_eq!(unacked.write_type(), WriteType::WithoutResponse);
    }
}
