//! # Writable Characteristic Discovery
//!
//! Printers do not agree on where their write channel lives. The service that
//! matched the selection filter may hold only status characteristics, so the
//! search covers every primary service in the order the device reports them.

use tracing::debug;

use super::gatt::{GattCharacteristic, GattService};

/// The first characteristic, across all primary services, that accepts
/// writes with or without response.
pub fn find_writable(services: &[GattService]) -> Option<GattCharacteristic> {
    for service in services.iter().filter(|s| s.primary) {
        debug!(
            service = %service.uuid,
            characteristics = service.characteristics.len(),
            "inspecting service"
        );
        if let Some(found) = service.characteristics.iter().find(|c| c.is_writable()) {
            return Some(found.clone());
        }
    }
    None
}
