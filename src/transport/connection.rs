//! # Printer Connection
//!
//! Owns the link to one BLE printer across print jobs.
//!
//! ## States
//!
//! ```text
//!                 connect()
//! Disconnected ──────────────▶ Scanning ──device──▶ Connected ──writable found──▶ Bound
//!      ▲                          │                     │                        │  ▲
//!      │      cancel / no device  │   nothing writable  │               print()  │  │ all chunks
//!      ├──────────────────────────┘◀────────────────────┘                        ▼  │ written
//!      │                                                                       Printing
//!      └──────────────────────────── any chunk write fails ──────────────────────┘
//! ```
//!
//! Handles live inside the state that needs them, so a bound characteristic
//! cannot outlive its session: leaving `Bound` or `Printing` drops all three
//! handles in one step.
//!
//! ## No retry inside `print()`
//!
//! A failed transfer may already have fed paper. Re-sending the same job could
//! produce a duplicate or garbled receipt, so the connection only resets and
//! reports [`PrintError::TransferFailed`]. Whether to print again is the
//! caller's decision.
//!
//! ## Concurrency
//!
//! All methods take `&mut self`; at most one job is in flight per connection.
//! Callers sharing a connection wrap it in a mutex (see [`crate::server`]).

use std::time::Duration;

use tracing::{debug, info, warn};

use super::chunk::{self, MAX_ATT_VALUE_BYTES, MAX_CHUNK_BYTES};
use super::discovery;
use super::gatt::{BleDevice, BleHost, GattCharacteristic, GattSession};
use super::selection::{self, SelectionStrategy};
use crate::error::{PrintError, SelectionError, StrukError};
use crate::format::{self, ReceiptLayout};
use crate::printer::PrinterConfig;
use crate::receipt::ReceiptData;

type Session<H> = <<H as BleHost>::Device as BleDevice>::Session;

/// Transfer and discovery settings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransportConfig {
    /// Bytes per GATT write
    pub max_chunk_bytes: usize,
    /// Pause after each write. Zero sends the next chunk as soon as the
    /// previous one completes.
    pub chunk_delay: Duration,
    /// Tried in order until one yields a device
    pub strategies: Vec<SelectionStrategy>,
}

impl Default for TransportConfig {
    fn default() -> Self {
        Self {
            max_chunk_bytes: MAX_CHUNK_BYTES,
            chunk_delay: Duration::ZERO,
            strategies: selection::default_strategies(),
        }
    }
}

impl TransportConfig {
    /// Default settings with the chunk size of a printer profile.
    pub fn for_printer(config: &PrinterConfig) -> Self {
        Self {
            max_chunk_bytes: config.max_chunk_bytes,
            ..Self::default()
        }
    }

    pub fn validate(&self) -> Result<(), StrukError> {
        if self.max_chunk_bytes == 0 || self.max_chunk_bytes > MAX_ATT_VALUE_BYTES {
            return Err(StrukError::Config(format!(
                "chunk size must be between 1 and {} bytes, got {}",
                MAX_ATT_VALUE_BYTES, self.max_chunk_bytes
            )));
        }
        if self.strategies.is_empty() {
            return Err(StrukError::Config(
                "at least one device selection strategy is required".to_string(),
            ));
        }
        Ok(())
    }
}

/// Where the connection is in its lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConnectionState {
    Disconnected,
    Scanning,
    Connected,
    Bound,
    Printing,
}

impl ConnectionState {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Disconnected => "disconnected",
            Self::Scanning => "scanning",
            Self::Connected => "connected",
            Self::Bound => "bound",
            Self::Printing => "printing",
        }
    }
}

/// An open session without a write channel yet.
struct OpenSession<H: BleHost> {
    device: H::Device,
    session: Session<H>,
}

impl<H: BleHost> OpenSession<H> {
    fn bind(self, characteristic: GattCharacteristic) -> Binding<H> {
        Binding {
            device: self.device,
            session: self.session,
            characteristic,
        }
    }

    async fn close(self) {
        close_session(&self.device, &self.session).await;
    }
}

/// A session with the characteristic all writes go to.
struct Binding<H: BleHost> {
    device: H::Device,
    session: Session<H>,
    characteristic: GattCharacteristic,
}

impl<H: BleHost> Binding<H> {
    /// Write `payload` chunk by chunk, each write awaited before the next.
    async fn stream(
        &self,
        payload: &[u8],
        max_chunk_bytes: usize,
        delay: Duration,
    ) -> Result<(), PrintError> {
        let chunks = chunk::split(payload, max_chunk_bytes);
        let total = chunks.len();

        for (i, data) in chunks.iter().enumerate() {
            if let Err(e) = self.session.write(&self.characteristic, data).await {
                warn!(
                    device = %self.device.label(),
                    chunk = i + 1,
                    total,
                    error = %e,
                    "chunk write failed"
                );
                return Err(PrintError::TransferFailed {
                    chunk: i + 1,
                    total,
                    reason: e.to_string(),
                });
            }
            if !delay.is_zero() {
                tokio::time::sleep(delay).await;
            }
        }

        Ok(())
    }

    async fn close(self) {
        close_session(&self.device, &self.session).await;
    }
}

async fn close_session<D: BleDevice>(device: &D, session: &D::Session) {
    if let Err(e) = session.disconnect().await {
        debug!(device = %device.label(), error = %e, "disconnect failed");
    }
}

enum Link<H: BleHost> {
    Disconnected,
    Scanning,
    Connected(OpenSession<H>),
    Bound(Binding<H>),
    Printing(Binding<H>),
}

/// # Printer Connection
///
/// Prints receipts over BLE, keeping the discovered write channel between
/// jobs and rediscovering after any failure.
///
/// ## Example
///
/// ```
/// use struk::receipt::ReceiptData;
/// use struk::transport::PrinterConnection;
/// use struk::transport::mock::{MockHost, MockPrinter};
///
/// # #[tokio::main(flavor = "current_thread")]
/// # async fn main() {
/// let host = MockHost::new(vec![MockPrinter::vendor("RPP02N")]);
/// let mut printer = PrinterConnection::new(host);
///
/// printer.print(&ReceiptData::sample()).await.unwrap();
/// assert!(printer.bound_characteristic().is_some());
/// # }
/// ```
pub struct PrinterConnection<H: BleHost> {
    host: H,
    config: TransportConfig,
    layout: ReceiptLayout,
    link: Link<H>,
    discoveries: u32,
}

impl<H: BleHost> PrinterConnection<H> {
    /// Connection with default transport settings and the 58mm layout.
    pub fn new(host: H) -> Self {
        Self {
            host,
            config: TransportConfig::default(),
            layout: ReceiptLayout::default(),
            link: Link::Disconnected,
            discoveries: 0,
        }
    }

    /// Connection with custom settings. Fails if `config` does not validate.
    pub fn with_config(
        host: H,
        config: TransportConfig,
        layout: ReceiptLayout,
    ) -> Result<Self, StrukError> {
        config.validate()?;
        Ok(Self {
            config,
            layout,
            ..Self::new(host)
        })
    }

    pub fn host(&self) -> &H {
        &self.host
    }

    pub fn config(&self) -> &TransportConfig {
        &self.config
    }

    pub fn layout(&self) -> &ReceiptLayout {
        &self.layout
    }

    pub fn state(&self) -> ConnectionState {
        match self.link {
            Link::Disconnected => ConnectionState::Disconnected,
            Link::Scanning => ConnectionState::Scanning,
            Link::Connected(_) => ConnectionState::Connected,
            Link::Bound(_) => ConnectionState::Bound,
            Link::Printing(_) => ConnectionState::Printing,
        }
    }

    /// The characteristic print data goes to, once bound.
    pub fn bound_characteristic(&self) -> Option<&GattCharacteristic> {
        match &self.link {
            Link::Bound(binding) | Link::Printing(binding) => Some(&binding.characteristic),
            _ => None,
        }
    }

    /// How many times device discovery has started.
    pub fn discoveries(&self) -> u32 {
        self.discoveries
    }

    fn take_link(&mut self) -> Link<H> {
        std::mem::replace(&mut self.link, Link::Disconnected)
    }

    /// Select a device, open GATT and bind the first writable characteristic.
    ///
    /// Does nothing if a characteristic is already bound. Any other existing
    /// link is torn down first.
    pub async fn connect(&mut self) -> Result<(), PrintError> {
        if matches!(self.link, Link::Bound(_)) {
            return Ok(());
        }
        self.reset().await;

        if !self.host.is_available().await {
            warn!("bluetooth LE is not available on this host");
            return Err(PrintError::CapabilityUnavailable);
        }

        self.discoveries += 1;
        self.link = Link::Scanning;
        debug!(attempt = self.discoveries, "selecting printer");

        let device = match self.select_device().await {
            Ok(device) => device,
            Err(e) => {
                self.link = Link::Disconnected;
                return Err(e);
            }
        };

        let session = match device.connect().await {
            Ok(session) => session,
            Err(e) => {
                warn!(device = %device.label(), error = %e, "GATT connect failed");
                self.link = Link::Disconnected;
                return Err(PrintError::ConnectFailed(e.to_string()));
            }
        };
        debug!(device = %device.label(), "GATT session open");
        self.link = Link::Connected(OpenSession { device, session });

        self.bind_writable().await
    }

    /// Try each strategy in order.
    ///
    /// When no strategy reached a clean "nothing matched", the last platform
    /// error is returned instead of `NoDeviceFound`.
    async fn select_device(&self) -> Result<H::Device, PrintError> {
        let mut matched_nothing = false;
        let mut last_failure = None;

        for strategy in &self.config.strategies {
            match self.host.request_device(strategy).await {
                Ok(device) => {
                    info!(device = %device.label(), strategy = strategy.name(), "printer selected");
                    return Ok(device);
                }
                Err(SelectionError::Cancelled) => {
                    info!(strategy = strategy.name(), "printer selection cancelled");
                    return Err(PrintError::SelectionCancelled);
                }
                Err(SelectionError::NoMatch) => {
                    debug!(strategy = strategy.name(), "no device matched");
                    matched_nothing = true;
                }
                Err(SelectionError::Failed(e)) => {
                    warn!(strategy = strategy.name(), error = %e, "selection failed");
                    last_failure = Some(e);
                }
            }
        }

        match last_failure {
            Some(e) if !matched_nothing => Err(PrintError::SelectionFailed(e.to_string())),
            _ => Err(PrintError::NoDeviceFound),
        }
    }

    async fn bind_writable(&mut self) -> Result<(), PrintError> {
        let open = match self.take_link() {
            Link::Connected(open) => open,
            other => {
                self.link = other;
                return Err(PrintError::ConnectFailed("no open GATT session".to_string()));
            }
        };

        let services = match open.session.services().await {
            Ok(services) => services,
            Err(e) => {
                warn!(device = %open.device.label(), error = %e, "service discovery failed");
                open.close().await;
                return Err(PrintError::ConnectFailed(e.to_string()));
            }
        };

        match discovery::find_writable(&services) {
            Some(characteristic) => {
                info!(
                    device = %open.device.label(),
                    service = %characteristic.service,
                    characteristic = %characteristic.uuid,
                    "bound write characteristic"
                );
                self.link = Link::Bound(open.bind(characteristic));
                Ok(())
            }
            None => {
                warn!(
                    device = %open.device.label(),
                    services = services.len(),
                    "no writable characteristic"
                );
                open.close().await;
                Err(PrintError::NoWritableCharacteristic)
            }
        }
    }

    /// Format and print one receipt.
    pub async fn print(&mut self, receipt: &ReceiptData) -> Result<(), PrintError> {
        let payload = format::format_receipt(receipt, &self.layout);
        self.send(&payload).await
    }

    /// Send raw bytes to the printer in chunks, connecting first if needed.
    ///
    /// On a failed write the link is torn down before the error is returned,
    /// so the next call starts from discovery.
    pub async fn send(&mut self, payload: &[u8]) -> Result<(), PrintError> {
        if !matches!(self.link, Link::Bound(_)) {
            self.connect().await?;
        }

        let binding = match self.take_link() {
            Link::Bound(binding) => binding,
            other => {
                self.link = other;
                return Err(PrintError::ConnectFailed("printer is not bound".to_string()));
            }
        };
        self.link = Link::Printing(binding);

        let outcome = match &self.link {
            Link::Printing(binding) => {
                binding
                    .stream(payload, self.config.max_chunk_bytes, self.config.chunk_delay)
                    .await
            }
            _ => Err(PrintError::ConnectFailed("printer link lost".to_string())),
        };

        match outcome {
            Ok(()) => {
                if let Link::Printing(binding) = self.take_link() {
                    self.link = Link::Bound(binding);
                }
                info!(bytes = payload.len(), "print job sent");
                Ok(())
            }
            Err(e) => {
                self.reset().await;
                Err(e)
            }
        }
    }

    /// Disconnect and forget the device, session and characteristic.
    pub async fn reset(&mut self) {
        match self.take_link() {
            Link::Connected(open) => open.close().await,
            Link::Bound(binding) | Link::Printing(binding) => binding.close().await,
            Link::Disconnected | Link::Scanning => {}
        }
    }
}
