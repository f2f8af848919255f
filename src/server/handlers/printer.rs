//! Printer status handlers.

use axum::{Json, extract::State};
use serde_json::{Value, json};
use std::sync::Arc;

use crate::transport::BleHost;

use super::super::state::AppState;

/// Handle GET /api/printer - connection state and bound characteristic.
///
/// Reports `"busy"` instead of waiting while a job holds the connection.
pub async fn status<H: BleHost + 'static>(State(state): State<Arc<AppState<H>>>) -> Json<Value> {
    let Ok(printer) = state.printer.try_lock() else {
        return Json(json!({ "state": "busy", "characteristic": null }));
    };

    Json(json!({
        "state": printer.state().as_str(),
        "characteristic": printer.bound_characteristic().map(|c| c.uuid.to_string()),
    }))
}

/// Handle POST /api/printer/reset - drop the link so the next print rediscovers.
pub async fn reset<H: BleHost + 'static>(State(state): State<Arc<AppState<H>>>) -> Json<Value> {
    let mut printer = state.printer.lock().await;
    printer.reset().await;
    Json(json!({ "success": true, "state": printer.state().as_str() }))
}
