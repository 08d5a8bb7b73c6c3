use axum::Json;
use axum::extract::State;
use axum::http::StatusCode;

use crate::AppState;
use crate::fleet_api::api_error_v1::ApiV1Error;
use crate::fleet_api::error_recorder::ErrorRecorder;
use crate::shared::extractors::request_id::RequestId;
use crate::shared::extractors::validations::ValidatedPayload;

use super::super::errors::{self, HandlerResult};
use super::models::{ConnectRequest, ConnectResponse, GroupItem};

const HANDLER_NAME: &str = "fleet_connect";

/// Authenticate against MyGeotab and list the account's groups
///
/// Credentials are used for this request only.
#[utoipa::path(
    post,
    path = "/connect",
    request_body = ConnectRequest,
    responses(
        (status = 200, description = "Authenticated; groups sorted by name", body = ConnectResponse),
        (status = 400, description = "A required field is missing or blank", body = ApiV1Error),
        (status = 502, description = "MyGeotab rejected the credentials or could not be reached", body = ApiV1Error),
    ),
    tag = "fleet",
)]
#[tracing::instrument(skip_all, name = "fleet_connect")]
pub async fn handler(
    State(state): State<AppState>,
    RequestId(request_id): RequestId,
    ValidatedPayload(payload): ValidatedPayload<ConnectRequest>,
) -> HandlerResult<(StatusCode, Json<ConnectResponse>)> {
    tracing::info!(
        server = %payload.myg_server,
        database = %payload.myg_database,
        request_id = %request_id,
        "Fleet connect request",
    );

    let recorder =
        ErrorRecorder::new(&state.telemetry, HANDLER_NAME, &request_id);

    let groups = state
        .fleet
        .connect(&payload.to_settings())
        .await
        .map_err(|e| recorder.record(errors::Error::from(e)))?;

    Ok((
        StatusCode::OK,
        Json(ConnectResponse {
            status: "ok".to_string(),
            groups: groups.into_iter().map(GroupItem::from).collect(),
        }),
    ))
}
