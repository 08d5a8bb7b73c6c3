use axum::http::StatusCode;
use chrono::Utc;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// JSON error body returned by every `/api` endpoint.
#[derive(Serialize, Deserialize, Default, ToSchema)]
pub struct ApiV1Error {
    #[serde(skip)]
    pub(crate) status_code: StatusCode,
    #[schema(example = "Validation failed: `mygServer` must not be blank")]
    pub(crate) message: String,
    pub(crate) details: Vec<ApiV1Detail>,
    #[schema(example = "2024-01-01T00:00:00+00:00")]
    pub(crate) timestamp: String,
    pub(crate) request_id: String,
}

impl ApiV1Error {
    fn with_status(
        status_code: StatusCode,
        message: String,
        details: Vec<ApiV1Detail>,
        request_id: String,
    ) -> Self {
        Self {
            status_code,
            message,
            details,
            timestamp: Utc::now().to_rfc3339(),
            request_id,
        }
    }

    pub fn bad_request(
        message: String,
        details: Vec<ApiV1Detail>,
        request_id: String,
    ) -> Self {
        Self::with_status(StatusCode::BAD_REQUEST, message, details, request_id)
    }

    pub fn not_found(
        message: String,
        details: Vec<ApiV1Detail>,
        request_id: String,
    ) -> Self {
        Self::with_status(StatusCode::NOT_FOUND, message, details, request_id)
    }

    pub fn bad_gateway(
        message: String,
        details: Vec<ApiV1Detail>,
        request_id: String,
    ) -> Self {
        Self::with_status(StatusCode::BAD_GATEWAY, message, details, request_id)
    }
}

#[derive(Serialize, Deserialize, Debug, Default, ToSchema)]
pub struct ApiV1Detail {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub(crate) field: Option<String>,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub(crate) code: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub(crate) message: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub(crate) suggestion: String,
}

impl axum::response::IntoResponse for ApiV1Error {
    fn into_response(self) -> axum::response::Response {
        if self.status_code.is_server_error() {
            sentry::Hub::with_active(|hub| hub.capture_error(&self));
        }

        (self.status_code, axum::Json(self)).into_response()
    }
}

impl std::fmt::Display for ApiV1Error {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{} {}, {}, {}",
            self.status_code,
            self.message,
            self.request_id,
            self.details
                .iter()
                .map(|d| d.message.clone())
                .collect::<Vec<String>>()
                .join(", ")
        )
    }
}

impl std::fmt::Debug for ApiV1Error {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ApiV1Error")
            .field("status_code", &self.status_code)
            .field("message", &self.message)
            .field("details", &self.details)
            .field("timestamp", &self.timestamp)
            .field("request_id", &self.request_id)
            .finish()
    }
}

impl std::error::Error for ApiV1Error {}
