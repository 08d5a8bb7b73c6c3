use axum::Json;
use axum::extract::State;
use axum::http::StatusCode;
use fleet_query::FleetMetrics;

use crate::AppState;
use crate::fleet_api::api_error_v1::ApiV1Error;
use crate::fleet_api::error_recorder::ErrorRecorder;
use crate::shared::extractors::request_id::RequestId;
use crate::shared::extractors::validations::ValidatedPayload;

use super::super::errors::{self, HandlerResult};
use super::models::QueryRequest;

const HANDLER_NAME: &str = "fleet_query";

/// Query distance or fuel per device and bucket
///
/// Rows are sorted by bucket, device name and serial; points carry the
/// per-bucket total rounded to three decimals.
#[utoipa::path(
    post,
    path = "/query",
    request_body = QueryRequest,
    responses(
        (status = 200, description = "Per-device rows and per-bucket totals", body = FleetMetrics),
        (status = 400, description = "Invalid parameters, e.g. `to` before `from` or a group scope without `groupId`", body = ApiV1Error),
        (status = 502, description = "MyGeotab or the Data Connector failed", body = ApiV1Error),
    ),
    tag = "fleet",
)]
#[tracing::instrument(skip_all, name = "fleet_query")]
pub async fn handler(
    State(state): State<AppState>,
    RequestId(request_id): RequestId,
    ValidatedPayload(payload): ValidatedPayload<QueryRequest>,
) -> HandlerResult<(StatusCode, Json<FleetMetrics>)> {
    let metrics = run(&state, HANDLER_NAME, &request_id, &payload).await?;
    Ok((StatusCode::OK, Json(metrics)))
}

/// Shared by the JSON and CSV endpoints.
pub(crate) async fn run(
    state: &AppState,
    handler_name: &str,
    request_id: &uuid::Uuid,
    payload: &QueryRequest,
) -> HandlerResult<FleetMetrics> {
    tracing::info!(
        metric = %payload.metric,
        scope = %payload.scope,
        group_id = ?payload.group_id,
        granularity = %payload.granularity,
        from = %payload.from,
        to = %payload.to,
        request_id = %request_id,
        "Fleet query request",
    );

    state.telemetry.maybe_use_metrics(|m| {
        m.record_query(
            handler_name,
            &payload.metric.to_string(),
            &payload.scope.to_string(),
            &payload.granularity.to_string(),
        );
    });

    let recorder = ErrorRecorder::new(&state.telemetry, handler_name, request_id);

    state
        .fleet
        .query(&payload.to_params())
        .await
        .map_err(|e| recorder.record(errors::Error::from(e)))
}
