use std::sync::Arc;

use telemetry::metrics::Telemetry;
use uuid::Uuid;

use crate::fleet_api::api_error_v1::ApiV1Error;
use crate::metrics::ServerMetrics;

/// Handler error types that can be rendered as an [`ApiV1Error`].
pub trait IntoApiV1Error {
    /// Label for the `request_errors` counter.
    fn code(&self) -> &'static str;

    fn into_api_v1_error(self, request_id: &Uuid) -> ApiV1Error;
}

/// Counts a handler error and converts it into its response body.
pub struct ErrorRecorder<'a> {
    telemetry: &'a Arc<Telemetry<ServerMetrics>>,
    handler_name: &'a str,
    request_id: &'a Uuid,
}

impl<'a> ErrorRecorder<'a> {
    pub fn new(
        telemetry: &'a Arc<Telemetry<ServerMetrics>>,
        handler_name: &'a str,
        request_id: &'a Uuid,
    ) -> Self {
        Self {
            telemetry,
            handler_name,
            request_id,
        }
    }

    pub fn record<E: IntoApiV1Error>(&self, e: E) -> ApiV1Error {
        let code = e.code();
        self.telemetry.maybe_use_metrics(|m| {
            m.record_error(self.handler_name, code);
        });
        e.into_api_v1_error(self.request_id)
    }
}
