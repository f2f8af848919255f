//! # HTTP Server for Receipt Printing
//!
//! Lets the rest of the application print over HTTP.
//!
//! ## Usage
//!
//! ```bash
//! struk serve --listen 0.0.0.0:8080
//! ```
//!
//! ## Endpoints
//!
//! | Method | Path | Body |
//! |--------|------|------|
//! | `POST` | `/api/print` | receipt JSON |
//! | `GET` | `/api/printer` | |
//! | `POST` | `/api/printer/reset` | |

mod handlers;
mod state;

pub use handlers::print::status_for;
pub use state::{AppState, ServerConfig};

use axum::{
    Router,
    routing::{get, post},
};
use std::sync::Arc;
use tower::ServiceBuilder;
use tower_http::trace::TraceLayer;
use tracing::info;

use crate::error::StrukError;
use crate::transport::{BleHost, PrinterConnection};

/// Build the application router around one printer connection.
pub fn router<H: BleHost + 'static>(printer: PrinterConnection<H>) -> Router {
    let state = Arc::new(AppState::new(printer));

    Router::new()
        .route("/api/print", post(handlers::print::print::<H>))
        .route("/api/printer", get(handlers::printer::status::<H>))
        .route("/api/printer/reset", post(handlers::printer::reset::<H>))
        .layer(ServiceBuilder::new().layer(TraceLayer::new_for_http()))
        .with_state(state)
}

/// Start the HTTP server.
///
/// ## Example
///
/// ```no_run
/// use struk::server::{serve, ServerConfig};
/// use struk::transport::{BtleplugHost, PrinterConnection, ScanOptions};
///
/// # async fn example() -> Result<(), struk::error::StrukError> {
/// let host = BtleplugHost::new(ScanOptions::default()).await;
/// serve(ServerConfig::default(), PrinterConnection::new(host)).await?;
/// # Ok(())
/// # }
/// ```
pub async fn serve<H: BleHost + 'static>(
    config: ServerConfig,
    printer: PrinterConnection<H>,
) -> Result<(), StrukError> {
    let app = router(printer);

    let listener = tokio::net::TcpListener::bind(&config.listen_addr)
        .await
        .map_err(|e| StrukError::Server(format!("Failed to bind to {}: {}", config.listen_addr, e)))?;

    info!(addr = %config.listen_addr, "struk HTTP server listening");

    axum::serve(listener, app)
        .await
        .map_err(|e| StrukError::Server(format!("Server error: {}", e)))?;

    Ok(())
}
