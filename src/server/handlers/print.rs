//! Receipt printing handler.

use axum::{
    Json,
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde_json::json;
use std::sync::Arc;
use tracing::{info, warn};

use crate::error::PrintError;
use crate::receipt::ReceiptData;
use crate::transport::BleHost;

use super::super::state::AppState;

/// Handle POST /api/print - format and print one receipt.
///
/// Waits for any job already holding the printer.
pub async fn print<H: BleHost + 'static>(
    State(state): State<Arc<AppState<H>>>,
    Json(receipt): Json<ReceiptData>,
) -> Response {
    let mut printer = state.printer.lock().await;

    match printer.print(&receipt).await {
        Ok(()) => {
            info!(bill = %receipt.bill_number, "receipt printed");
            (StatusCode::OK, Json(json!({ "success": true }))).into_response()
        }
        Err(e) => error_response(&e),
    }
}

/// HTTP status for each kind of print failure.
pub fn status_for(error: &PrintError) -> StatusCode {
    match error {
        PrintError::CapabilityUnavailable => StatusCode::SERVICE_UNAVAILABLE,
        PrintError::SelectionCancelled => StatusCode::CONFLICT,
        PrintError::NoDeviceFound => StatusCode::NOT_FOUND,
        PrintError::SelectionFailed(_)
        | PrintError::ConnectFailed(_)
        | PrintError::TransferFailed { .. } => StatusCode::BAD_GATEWAY,
        PrintError::NoWritableCharacteristic => StatusCode::UNPROCESSABLE_ENTITY,
    }
}

/// Generate error response JSON.
fn error_response(error: &PrintError) -> Response {
    if error.is_cancellation() {
        info!("print request cancelled at printer selection");
    } else {
        warn!(error = %error, "print request failed");
    }

    (
        status_for(error),
        Json(json!({
            "success": false,
            "error": error.kind(),
            "message": error.user_message(),
            "retryable": error.is_retryable(),
        })),
    )
        .into_response()
}
