//! Server state and configuration.

use tokio::sync::Mutex;

use crate::transport::{BleHost, PrinterConnection};

/// Server configuration.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Address to listen on (e.g., "0.0.0.0:8080")
    pub listen_addr: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            listen_addr: "127.0.0.1:8080".to_string(),
        }
    }
}

/// Application state shared across handlers.
///
/// The single printer connection sits behind an async mutex: a print request
/// holds it for the whole job, so jobs never interleave on the wire.
pub struct AppState<H: BleHost> {
    pub printer: Mutex<PrinterConnection<H>>,
}

impl<H: BleHost> AppState<H> {
    pub fn new(printer: PrinterConnection<H>) -> Self {
        Self {
            printer: Mutex::new(printer),
        }
    }
}
