//! # Mock BLE Host
//!
//! An in-memory [`BleHost`] with scripted printers, for tests and for
//! exercising the print path without hardware.
//!
//! Every device, session and the host itself share one [`MockProbe`], which
//! records what the connection did and can inject a write failure:
//!
//! ```
//! use struk::transport::mock::{MockHost, MockPrinter};
//!
//! let host = MockHost::new(vec![MockPrinter::vendor("RPP02N")]);
//! let probe = host.probe();
//! probe.fail_write(3); // the third write from now fails once
//! assert_eq!(probe.selection_requests(), 0);
//! ```

use std::sync::{Arc, Mutex, MutexGuard};

use async_trait::async_trait;
use btleplug::api::CharPropFlags;
use btleplug::api::bleuuid::uuid_from_u16;
use uuid::Uuid;

use super::gatt::{BleDevice, BleHost, GattCharacteristic, GattService, GattSession};
use super::selection::{OEM_PRINTER_SERVICE, SelectionStrategy, VENDOR_PRINTER_SERVICE};
use crate::error::{BleError, SelectionError};

/// Write characteristic on vendor-service printers.
pub const VENDOR_WRITE_CHARACTERISTIC: Uuid = uuid_from_u16(0x2AF1);

/// Write characteristic on OEM-service printers.
pub const OEM_WRITE_CHARACTERISTIC: Uuid = Uuid::from_u128(0xbef8d6c9_9c21_4c9e_b632_bd58c1009f9f);

#[derive(Debug, Default)]
struct ProbeLog {
    selection_requests: Vec<SelectionStrategy>,
    connects: usize,
    disconnects: usize,
    writes: Vec<Vec<u8>>,
    fail_write_in: Option<usize>,
}

/// Shared record of everything the mock was asked to do.
#[derive(Debug, Clone, Default)]
pub struct MockProbe(Arc<Mutex<ProbeLog>>);

impl MockProbe {
    fn log(&self) -> MutexGuard<'_, ProbeLog> {
        // a panicking test thread must not hide the log from the next assertion
        self.0.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// Make the `nth` write from now fail once (1-based).
    pub fn fail_write(&self, nth: usize) {
        self.log().fail_write_in = Some(nth.max(1));
    }

    /// Number of `request_device` calls.
    pub fn selection_requests(&self) -> usize {
        self.log().selection_requests.len()
    }

    /// Strategies passed to `request_device`, in order.
    pub fn strategies(&self) -> Vec<SelectionStrategy> {
        self.log().selection_requests.clone()
    }

    pub fn connects(&self) -> usize {
        self.log().connects
    }

    pub fn disconnects(&self) -> usize {
        self.log().disconnects
    }

    /// Successful writes, one entry per chunk.
    pub fn writes(&self) -> Vec<Vec<u8>> {
        self.log().writes.clone()
    }

    /// All successfully written bytes, concatenated.
    pub fn written(&self) -> Vec<u8> {
        self.log().writes.concat()
    }

    /// Forget recorded writes.
    pub fn clear_writes(&self) {
        self.log().writes.clear();
    }
}

/// A scripted peripheral.
#[derive(Debug, Clone)]
pub struct MockPrinter {
    pub name: String,
    /// Services in advertisements, matched against selection filters
    pub advertised: Vec<Uuid>,
    /// Services reported after connecting
    pub services: Vec<GattService>,
    pub fail_connect: bool,
}

impl MockPrinter {
    /// A printer advertising the standard vendor service with a write
    /// characteristic behind a notify-only one.
    pub fn vendor(name: &str) -> Self {
        Self {
            name: name.to_string(),
            advertised: vec![VENDOR_PRINTER_SERVICE],
            services: vec![service(
                VENDOR_PRINTER_SERVICE,
                &[
                    (uuid_from_u16(0x2AF0), CharPropFlags::NOTIFY),
                    (VENDOR_WRITE_CHARACTERISTIC, CharPropFlags::WRITE),
                ],
            )],
            fail_connect: false,
        }
    }

    /// A printer that advertises nothing useful and keeps its write
    /// characteristic in the OEM service, after a device information service.
    pub fn oem(name: &str) -> Self {
        Self {
            name: name.to_string(),
            advertised: Vec::new(),
            services: vec![
                service(uuid_from_u16(0x180A), &[(uuid_from_u16(0x2A29), CharPropFlags::READ)]),
                service(
                    OEM_PRINTER_SERVICE,
                    &[(
                        OEM_WRITE_CHARACTERISTIC,
                        CharPropFlags::WRITE | CharPropFlags::WRITE_WITHOUT_RESPONSE,
                    )],
                ),
            ],
            fail_connect: false,
        }
    }

    /// A device whose services only read and notify.
    pub fn read_only(name: &str) -> Self {
        Self {
            name: name.to_string(),
            advertised: vec![VENDOR_PRINTER_SERVICE],
            services: vec![service(
                VENDOR_PRINTER_SERVICE,
                &[
                    (uuid_from_u16(0x2AF0), CharPropFlags::READ | CharPropFlags::NOTIFY),
                    (uuid_from_u16(0x2A19), CharPropFlags::READ),
                ],
            )],
            fail_connect: false,
        }
    }

    pub fn failing_connect(mut self) -> Self {
        self.fail_connect = true;
        self
    }
}

/// Build a primary service from `(uuid, properties)` pairs.
pub fn service(uuid: Uuid, characteristics: &[(Uuid, CharPropFlags)]) -> GattService {
    GattService {
        uuid,
        primary: true,
        characteristics: characteristics
            .iter()
            .map(|(c, properties)| GattCharacteristic {
                uuid: *c,
                service: uuid,
                properties: *properties,
            })
            .collect(),
    }
}

/// In-memory BLE host.
#[derive(Debug, Clone)]
pub struct MockHost {
    available: bool,
    cancel: bool,
    selection_failure: Option<String>,
    printers: Vec<MockPrinter>,
    probe: MockProbe,
}

impl MockHost {
    pub fn new(printers: Vec<MockPrinter>) -> Self {
        Self {
            available: true,
            cancel: false,
            selection_failure: None,
            printers,
            probe: MockProbe::default(),
        }
    }

    /// A host without Bluetooth LE.
    pub fn unavailable() -> Self {
        Self {
            available: false,
            ..Self::new(Vec::new())
        }
    }

    /// Every selection prompt is dismissed by the user.
    pub fn cancelling(mut self) -> Self {
        self.cancel = true;
        self
    }

    /// Every selection request fails in the platform stack with `reason`.
    pub fn failing_selection(mut self, reason: &str) -> Self {
        self.selection_failure = Some(reason.to_string());
        self
    }

    pub fn probe(&self) -> MockProbe {
        self.probe.clone()
    }
}

#[async_trait]
impl BleHost for MockHost {
    type Device = MockDevice;

    async fn is_available(&self) -> bool {
        self.available
    }

    async fn request_device(
        &self,
        strategy: &SelectionStrategy,
    ) -> Result<MockDevice, SelectionError> {
        self.probe.log().selection_requests.push(strategy.clone());

        if !self.available {
            return Err(SelectionError::Failed(BleError::Unavailable));
        }
        if self.cancel {
            return Err(SelectionError::Cancelled);
        }
        if let Some(reason) = &self.selection_failure {
            return Err(SelectionError::Failed(BleError::Backend(reason.clone())));
        }

        self.printers
            .iter()
            .find(|p| strategy.accepts(&p.advertised))
            .map(|printer| MockDevice {
                printer: printer.clone(),
                probe: self.probe.clone(),
            })
            .ok_or(SelectionError::NoMatch)
    }
}

/// A selected mock printer.
#[derive(Debug)]
pub struct MockDevice {
    printer: MockPrinter,
    probe: MockProbe,
}

#[async_trait]
impl BleDevice for MockDevice {
    type Session = MockSession;

    fn label(&self) -> String {
        self.printer.name.clone()
    }

    async fn connect(&self) -> Result<MockSession, BleError> {
        if self.printer.fail_connect {
            return Err(BleError::Timeout("connect"));
        }
        self.probe.log().connects += 1;
        Ok(MockSession {
            services: self.printer.services.clone(),
            probe: self.probe.clone(),
        })
    }
}

/// An open mock GATT session.
#[derive(Debug)]
pub struct MockSession {
    services: Vec<GattService>,
    probe: MockProbe,
}

#[async_trait]
impl GattSession for MockSession {
    async fn services(&self) -> Result<Vec<GattService>, BleError> {
        Ok(self.services.clone())
    }

    async fn write(&self, characteristic: &GattCharacteristic, data: &[u8]) -> Result<(), BleError> {
        let mut log = self.probe.log();
        if let Some(n) = log.fail_write_in {
            if n <= 1 {
                log.fail_write_in = None;
                return Err(BleError::Backend("GATT write failed".to_string()));
            }
            log.fail_write_in = Some(n - 1);
        }
        if !characteristic.is_writable() {
            return Err(BleError::Backend("characteristic is not writable".to_string()));
        }
        log.writes.push(data.to_vec());
        Ok(())
    }

    async fn disconnect(&self) -> Result<(), BleError> {
        self.probe.log().disconnects += 1;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::transport::selection::default_strategies;

    #[tokio::test]
    async fn test_vendor_printer_matches_filter() {
        let host = MockHost::new(vec![MockPrinter::vendor("RPP02N")]);
        let device = host.request_device(&default_strategies()[0]).await.unwrap();
        assert_eq!(device.label(), "RPP02N");
    }

    #[tokio::test]
    async fn test_oem_printer_needs_accept_all() {
        let host = MockHost::new(vec![MockPrinter::oem("MTP-II")]);
        let strategies = default_strategies();
        assert!(matches!(
            host.request_device(&strategies[0]).await,
            Err(SelectionError::NoMatch)
        ));
        assert!(host.request_device(&strategies[1]).await.is_ok());
        assert_eq!(host.probe().selection_requests(), 2);
    }

    #[tokio::test]
    async fn test_fail_write_is_one_shot() {
        let host = MockHost::new(vec![MockPrinter::vendor("RPP02N")]);
        let probe = host.probe();
        let device = host.request_device(&default_strategies()[0]).await.unwrap();
        let session = device.connect().await.unwrap();
        let target = session.services().await.unwrap()[0].characteristics[1].clone();

        probe.fail_write(2);
        assert!(session.write(&target, b"a").await.is_ok());
        assert!(session.write(&target, b"b").await.is_err());
        assert!(session.write(&target, b"c").await.is_ok());
        assert_eq!(probe.written(), b"ac".to_vec());
    }
}
