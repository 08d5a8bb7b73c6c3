use axum::extract::Request;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::get;
use tower_http::{
    catch_panic::CatchPanicLayer, compression::CompressionLayer,
    cors::CorsLayer, services::ServeDir, trace::TraceLayer,
};

use crate::AppState;
use crate::fleet_api::api_error_v1::{ApiV1Detail, ApiV1Error};
use crate::shared::extractors::request_id::RequestId;

pub const VERSION: Option<&'static str> = option_env!("VERSION");

async fn fallback_handler(request: Request) -> Response {
    let RequestId(request_id) = RequestId::from_headers(request.headers());
    let path = request.uri().path().to_string();

    ApiV1Error::not_found(
        "The requested endpoint does not exist".to_string(),
        vec![ApiV1Detail {
            field: None,
            code: "not_found".to_string(),
            message: format!("No route for {} {path}", request.method()),
            suggestion: "Check the path against /swagger-ui".to_string(),
        }],
        request_id.to_string(),
    )
    .into_response()
}

/// Full application router: observability endpoints, the `/api` routes,
/// the optional add-in mount and OpenAPI docs.
pub fn app(state: AppState) -> axum::Router {
    let mut router = axum::Router::new()
        .route("/health", {
            let state = state.clone();
            get(move || {
                let state = state.clone();
                async move { crate::health::handler(state).await }
            })
        })
        .route("/version", get(|| async { VERSION.unwrap_or("unknown") }))
        .route("/metrics", {
            let telemetry = state.telemetry.clone();
            get(move || {
                let telemetry = telemetry.clone();
                async move {
                    (
                        StatusCode::OK,
                        [(
                            axum::http::header::CONTENT_TYPE,
                            "text/plain; charset=utf-8",
                        )],
                        telemetry.get_metrics(),
                    )
                }
            })
        })
        .nest("/api", crate::get_fleet_api_v1_routes(state.clone()));

    if let Some(dir) = &state.config.addin_dir {
        tracing::info!(%dir, "Serving add-in files at /addin");
        router = router.nest_service("/addin", ServeDir::new(dir));
    }

    router
        .fallback(fallback_handler)
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
        .layer(CompressionLayer::new())
        .layer(CatchPanicLayer::new())
        .merge(crate::get_openapi_routes())
}
