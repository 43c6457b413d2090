//! Health check endpoints for Kubernetes-style probes.
//!
//! - `/livez` - Basic liveness probe (immediate 200, no checks)
//! - `/readyz` - Readiness probe (the keyboards table is active)

use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};

use crate::state::AppState;

/// GET /livez - Basic liveness probe.
pub async fn livez() -> StatusCode {
    StatusCode::OK
}

/// GET /readyz - Readiness probe.
///
/// Returns 200 when the table exists and is active, 503 otherwise.
pub async fn readyz(State(state): State<AppState>) -> Response {
    let table = state.gateway.table_name().to_string();

    match state.gateway.exists().await {
        Ok(true) => (
            StatusCode::OK,
            Json(serde_json::json!({ "ready": true, "table": table })),
        )
            .into_response(),
        Ok(false) => (
            StatusCode::SERVICE_UNAVAILABLE,
            Json(serde_json::json!({ "ready": false, "table": table })),
        )
            .into_response(),
        Err(e) => (
            StatusCode::SERVICE_UNAVAILABLE,
            Json(serde_json::json!({
                "ready": false,
                "table": table,
                "error": e.to_string()
            })),
        )
            .into_response(),
    }
}
