//! # btleplug Backend
//!
//! [`BleHost`] on top of the platform Bluetooth stack (BlueZ, CoreBluetooth,
//! WinRT) via `btleplug`.
//!
//! ## Device Selection
//!
//! A selection request scans for [`ScanOptions::scan_duration`], keeps the
//! peripherals the strategy accepts, ranks them, and hands them to the
//! configured [`DeviceChooser`]:
//!
//! ```text
//! start_scan(filter) ─▶ wait ─▶ peripherals() ─▶ accept/rank ─▶ chooser ─▶ device
//! ```
//!
//! Candidates advertising one of the strategy's services come first, then by
//! signal strength. For accept-all scans, peripherals with neither a name nor
//! a printer service are skipped.
//!
//! ## Timeouts
//!
//! Connect, service discovery and each write are bounded. A timeout surfaces
//! as a [`BleError::Timeout`] like any other platform failure.

use std::cmp::Reverse;
use std::io::{self, Write};
use std::time::Duration;

use async_trait::async_trait;
use btleplug::api::{Central, Manager as _, Peripheral as _, ScanFilter};
use btleplug::platform::{Adapter, Manager, Peripheral};
use tokio::time::{sleep, timeout};
use tracing::{debug, info, warn};

use super::gatt::{BleDevice, BleHost, GattCharacteristic, GattService, GattSession};
use super::selection::SelectionStrategy;
use crate::error::{BleError, SelectionError};

/// Default time spent scanning per selection strategy.
pub const DEFAULT_SCAN_DURATION: Duration = Duration::from_secs(4);

/// Default bound on GATT connect and on service discovery.
pub const DEFAULT_CONNECT_TIMEOUT: Duration = Duration::from_secs(10);

/// Default bound on a single chunk write.
pub const DEFAULT_WRITE_TIMEOUT: Duration = Duration::from_secs(5);

/// How one device is picked from the scan results.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum DeviceChooser {
    /// Best-ranked candidate
    #[default]
    First,
    /// First candidate whose name contains, or whose address equals, this
    /// text (case-insensitive)
    Matching(String),
    /// Ask on the terminal. An empty answer cancels.
    Prompt,
}

/// Scan, connect and write settings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScanOptions {
    pub scan_duration: Duration,
    pub connect_timeout: Duration,
    pub write_timeout: Duration,
    pub chooser: DeviceChooser,
}

impl Default for ScanOptions {
    fn default() -> Self {
        Self {
            scan_duration: DEFAULT_SCAN_DURATION,
            connect_timeout: DEFAULT_CONNECT_TIMEOUT,
            write_timeout: DEFAULT_WRITE_TIMEOUT,
            chooser: DeviceChooser::First,
        }
    }
}

/// A peripheral that passed the strategy filter.
#[derive(Debug, Clone)]
struct Candidate {
    peripheral: Peripheral,
    name: Option<String>,
    address: String,
    rssi: Option<i16>,
    preferred: bool,
}

impl Candidate {
    fn label(&self) -> String {
        match &self.name {
            Some(name) => format!("{} ({})", name, self.address),
            None => self.address.clone(),
        }
    }

    fn matches(&self, needle: &str) -> bool {
        let needle = needle.to_lowercase();
        self.address.to_lowercase() == needle
            || self
                .name
                .as_deref()
                .is_some_and(|name| name.to_lowercase().contains(&needle))
    }
}

/// Best candidates first: advertises an expected service, then strongest signal.
fn rank(candidates: &mut [Candidate]) {
    candidates.sort_by_key(|c| (Reverse(c.preferred), Reverse(c.rssi.unwrap_or(i16::MIN))));
}

impl DeviceChooser {
    async fn choose(&self, candidates: Vec<Candidate>) -> Result<Candidate, SelectionError> {
        match self {
            Self::First => candidates.into_iter().next().ok_or(SelectionError::NoMatch),
            Self::Matching(needle) => candidates
                .into_iter()
                .find(|c| c.matches(needle))
                .ok_or(SelectionError::NoMatch),
            Self::Prompt => prompt(candidates).await,
        }
    }
}

/// List candidates on stderr and read a choice from stdin.
async fn prompt(mut candidates: Vec<Candidate>) -> Result<Candidate, SelectionError> {
    if candidates.is_empty() {
        return Err(SelectionError::NoMatch);
    }

    eprintln!("Printers found:");
    for (i, c) in candidates.iter().enumerate() {
        match c.rssi {
            Some(rssi) => eprintln!("  {}) {}  {} dBm", i + 1, c.label(), rssi),
            None => eprintln!("  {}) {}", i + 1, c.label()),
        }
    }
    eprint!("Select a printer [1-{}, empty to cancel]: ", candidates.len());
    let _ = io::stderr().flush();

    let answer = tokio::task::spawn_blocking(|| {
        let mut line = String::new();
        io::stdin().read_line(&mut line).map(|_| line)
    })
    .await
    .map_err(|e| SelectionError::Failed(BleError::Backend(format!("prompt task: {}", e))))?
    .map_err(|e| SelectionError::Failed(BleError::Backend(format!("reading choice: {}", e))))?;

    match answer.trim().parse::<usize>() {
        Ok(n) if (1..=candidates.len()).contains(&n) => Ok(candidates.swap_remove(n - 1)),
        _ => Err(SelectionError::Cancelled),
    }
}

/// The platform radio: the manager must outlive the adapter taken from it.
struct Radio {
    _manager: Manager,
    adapter: Adapter,
}

/// BLE host backed by the first local Bluetooth adapter.
pub struct BtleplugHost {
    radio: Option<Radio>,
    options: ScanOptions,
}

impl BtleplugHost {
    /// Open the platform Bluetooth stack.
    ///
    /// Never fails: with no stack or no adapter the host reports itself
    /// unavailable, which print attempts turn into a capability error.
    pub async fn new(options: ScanOptions) -> Self {
        let radio = match open_radio().await {
            Ok(Some(radio)) => Some(radio),
            Ok(None) => {
                warn!("no bluetooth adapter found");
                None
            }
            Err(e) => {
                warn!(error = %e, "bluetooth stack unavailable");
                None
            }
        };
        Self { radio, options }
    }

    pub fn options(&self) -> &ScanOptions {
        &self.options
    }

    async fn scan(
        &self,
        adapter: &Adapter,
        strategy: &SelectionStrategy,
    ) -> Result<Vec<Candidate>, BleError> {
        let filter = ScanFilter {
            services: strategy.scan_services().to_vec(),
        };
        adapter.start_scan(filter).await?;
        sleep(self.options.scan_duration).await;
        let peripherals = adapter.peripherals().await;
        if let Err(e) = adapter.stop_scan().await {
            debug!(error = %e, "failed to stop scan cleanly");
        }

        let mut candidates = Vec::new();
        for peripheral in peripherals? {
            let Some(properties) = peripheral.properties().await? else {
                continue;
            };
            if !strategy.accepts(&properties.services) {
                continue;
            }
            let preferred = strategy.prefers(&properties.services);
            if matches!(strategy, SelectionStrategy::AcceptAll { .. })
                && !preferred
                && properties.local_name.is_none()
            {
                continue;
            }
            candidates.push(Candidate {
                name: properties.local_name,
                address: properties.address.to_string(),
                rssi: properties.rssi,
                preferred,
                peripheral,
            });
        }

        rank(&mut candidates);
        debug!(
            strategy = strategy.name(),
            found = candidates.len(),
            "scan finished"
        );
        Ok(candidates)
    }
}

async fn open_radio() -> Result<Option<Radio>, btleplug::Error> {
    let manager = Manager::new().await?;
    let adapter = manager.adapters().await?.into_iter().next();
    Ok(adapter.map(|adapter| Radio {
        _manager: manager,
        adapter,
    }))
}

#[async_trait]
impl BleHost for BtleplugHost {
    type Device = BtlePrinter;

    async fn is_available(&self) -> bool {
        self.radio.is_some()
    }

    async fn request_device(
        &self,
        strategy: &SelectionStrategy,
    ) -> Result<BtlePrinter, SelectionError> {
        let radio = self.radio.as_ref().ok_or(BleError::Unavailable)?;
        let candidates = self.scan(&radio.adapter, strategy).await?;
        let chosen = self.options.chooser.choose(candidates).await?;

        Ok(BtlePrinter {
            label: chosen.label(),
            peripheral: chosen.peripheral,
            connect_timeout: self.options.connect_timeout,
            write_timeout: self.options.write_timeout,
        })
    }
}

/// A selected BLE printer.
pub struct BtlePrinter {
    peripheral: Peripheral,
    label: String,
    connect_timeout: Duration,
    write_timeout: Duration,
}

#[async_trait]
impl BleDevice for BtlePrinter {
    type Session = BtleSession;

    fn label(&self) -> String {
        self.label.clone()
    }

    async fn connect(&self) -> Result<BtleSession, BleError> {
        if !self.peripheral.is_connected().await? {
            timeout(self.connect_timeout, self.peripheral.connect())
                .await
                .map_err(|_| BleError::Timeout("connect"))??;
        }
        timeout(self.connect_timeout, self.peripheral.discover_services())
            .await
            .map_err(|_| BleError::Timeout("service discovery"))??;

        info!(device = %self.label, "connected");
        Ok(BtleSession {
            peripheral: self.peripheral.clone(),
            write_timeout: self.write_timeout,
        })
    }
}

/// A connected BLE printer with services discovered.
pub struct BtleSession {
    peripheral: Peripheral,
    write_timeout: Duration,
}

#[async_trait]
impl GattSession for BtleSession {
    async fn services(&self) -> Result<Vec<GattService>, BleError> {
        Ok(self
            .peripheral
            .services()
            .into_iter()
            .map(|service| GattService {
                uuid: service.uuid,
                primary: service.primary,
                characteristics: service
                    .characteristics
                    .into_iter()
                    .map(|c| GattCharacteristic {
                        uuid: c.uuid,
                        service: c.service_uuid,
                        properties: c.properties,
                    })
                    .collect(),
            })
            .collect())
    }

    async fn write(&self, characteristic: &GattCharacteristic, data: &[u8]) -> Result<(), BleError> {
        let target = self
            .peripheral
            .characteristics()
            .into_iter()
            .find(|c| c.uuid == characteristic.uuid && c.service_uuid == characteristic.service)
            .ok_or(BleError::CharacteristicMissing(characteristic.uuid))?;

        timeout(
            self.write_timeout,
            self.peripheral.write(&target, data, characteristic.write_type()),
        )
        .await
        .map_err(|_| BleError::Timeout("write"))??;
        Ok(())
    }

    async fn disconnect(&self) -> Result<(), BleError> {
        self.peripheral.disconnect().await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_options() {
        let options = ScanOptions::default();
        assert_eq!(options.scan_duration, Duration::from_secs(4));
        assert_eq!(options.chooser, DeviceChooser::First);
    }

    // Candidate ranking and matching need real Peripheral handles; they are
    // exercised manually against hardware.
}
