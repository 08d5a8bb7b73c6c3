use axum::extract::State;
use axum::http::{StatusCode, header};
use axum::response::IntoResponse;
use fleet_query::export::rows_to_csv;

use crate::AppState;
use crate::fleet_api::api_error_v1::ApiV1Error;
use crate::shared::extractors::request_id::RequestId;
use crate::shared::extractors::validations::ValidatedPayload;

use super::super::errors::HandlerResult;
use super::super::query::handler::run;
use super::super::query::models::QueryRequest;

const HANDLER_NAME: &str = "fleet_export_csv";

/// Export query rows as CSV
///
/// Same body as `/query`. Only the first 1000 rows are written.
#[utoipa::path(
    post,
    path = "/query/export.csv",
    request_body = QueryRequest,
    responses(
        (status = 200, description = "CSV with header `bucket,device_name,device_serial,value`", content_type = "text/csv", body = String),
        (status = 400, description = "Invalid parameters", body = ApiV1Error),
        (status = 502, description = "MyGeotab or the Data Connector failed", body = ApiV1Error),
    ),
    tag = "fleet",
)]
#[tracing::instrument(skip_all, name = "fleet_export_csv")]
pub async fn handler(
    State(state): State<AppState>,
    RequestId(request_id): RequestId,
    ValidatedPayload(payload): ValidatedPayload<QueryRequest>,
) -> HandlerResult<impl IntoResponse> {
    let metrics = run(&state, HANDLER_NAME, &request_id, &payload).await?;
    let filename = format!(
        "fleet_{}_{}_{}_{}.csv",
        payload.metric, payload.granularity, payload.from, payload.to
    );

    Ok((
        StatusCode::OK,
        [
            (header::CONTENT_TYPE, "text/csv; charset=utf-8".to_string()),
            (
                header::CONTENT_DISPOSITION,
                format!("attachment; filename=\"{filename}\""),
            ),
        ],
        rows_to_csv(&metrics.rows),
    ))
}
