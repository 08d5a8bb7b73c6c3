use axum::Json;
use axum::http::StatusCode;
use serde::Serialize;

use crate::AppState;

#[derive(Serialize, Debug, Clone, Copy, PartialEq)]
#[serde(rename_all = "snake_case")]
pub enum HealthStatus {
    Ok,
    ShuttingDown,
}

#[derive(Serialize)]
pub struct HealthResponse {
    pub status: HealthStatus,
}

/// Liveness only. Upstreams are per-request and are not probed.
pub async fn handler(state: AppState) -> (StatusCode, Json<HealthResponse>) {
    if state.shutdown.is_shutting_down() {
        return (
            StatusCode::SERVICE_UNAVAILABLE,
            Json(HealthResponse {
                status: HealthStatus::ShuttingDown,
            }),
        );
    }

    (
        StatusCode::OK,
        Json(HealthResponse {
            status: HealthStatus::Ok,
        }),
    )
}
