//! # Device Selection Strategies
//!
//! There is no universal BLE service UUID for thermal printers. Selection is
//! therefore an ordered list of strategies tried until one yields a device:
//!
//! 1. [`SelectionStrategy::Filtered`] on the common ESC/POS vendor service
//! 2. [`SelectionStrategy::AcceptAll`] listing the services printers are
//!    known to use, for brands that advertise something else
//!
//! Adding a vendor means adding a `Filtered` entry ahead of the fallback.

use btleplug::api::bleuuid::uuid_from_u16;
use uuid::Uuid;

/// Service advertised by most ESC/POS-class BLE printers (0x18F0).
pub const VENDOR_PRINTER_SERVICE: Uuid = uuid_from_u16(0x18F0);

/// Vendor-specific print service used by many OEM BLE printers.
pub const OEM_PRINTER_SERVICE: Uuid = Uuid::from_u128(0xe7810a71_73ae_499d_8c15_faa9aef0c3f2);

/// Services requested when accepting any device.
pub const OPTIONAL_PRINTER_SERVICES: [Uuid; 2] = [VENDOR_PRINTER_SERVICE, OEM_PRINTER_SERVICE];

/// One way of asking the host for a device.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SelectionStrategy {
    /// Only devices advertising at least one of these services.
    Filtered { services: Vec<Uuid> },
    /// Any device. The listed services are the ones expected to be accessed
    /// afterwards, and rank candidates that advertise them first.
    AcceptAll { optional_services: Vec<Uuid> },
}

impl SelectionStrategy {
    /// Services to pass to the platform scan filter. Empty means unfiltered.
    pub fn scan_services(&self) -> &[Uuid] {
        match self {
            Self::Filtered { services } => services,
            Self::AcceptAll { .. } => &[],
        }
    }

    /// Services the strategy cares about, filtered or not.
    pub fn services(&self) -> &[Uuid] {
        match self {
            Self::Filtered { services } => services,
            Self::AcceptAll { optional_services } => optional_services,
        }
    }

    /// Whether a device advertising `advertised` passes this strategy.
    pub fn accepts(&self, advertised: &[Uuid]) -> bool {
        match self {
            Self::Filtered { services } => advertised.iter().any(|s| services.contains(s)),
            Self::AcceptAll { .. } => true,
        }
    }

    /// Whether the device advertises a service this strategy expects.
    pub fn prefers(&self, advertised: &[Uuid]) -> bool {
        advertised.iter().any(|s| self.services().contains(s))
    }

    /// Short name for logs
    pub fn name(&self) -> &'static str {
        match self {
            Self::Filtered { .. } => "vendor-filter",
            Self::AcceptAll { .. } => "accept-all",
        }
    }
}

/// Vendor filter first, then accept-all with the known printer services.
pub fn default_strategies() -> Vec<SelectionStrategy> {
    vec![
        SelectionStrategy::Filtered {
            services: vec![VENDOR_PRINTER_SERVICE],
        },
        SelectionStrategy::AcceptAll {
            optional_services: OPTIONAL_PRINTER_SERVICES.to_vec(),
        },
    ]
}
