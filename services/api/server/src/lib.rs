//! # Fleet API Server
//!
//! HTTP layer for the fleet metrics add-in: `/api/connect`, `/api/query`
//! and the CSV export, plus health, metrics and OpenAPI documentation.
use crate::metrics::ServerMetrics;
use crate::shutdown::ShutdownCoordinator;
use fleet_query::FleetQueryService;
use std::sync::Arc;
use std::time::Duration;
use telemetry::metrics::Telemetry;
// Private API modules - internal implementation details
mod fleet_api;
pub mod shutdown;

// OpenAPI documentation module
pub mod openapi;

pub mod health;
pub mod metrics;
pub mod routes;
pub mod shared;

// Only route registration is public; handlers and error types stay internal.
pub use fleet_api::core::v1::get_routes as get_fleet_api_v1_routes;

/// Returns the OpenAPI documentation routes
/// Includes Swagger UI and OpenAPI JSON spec with OpenAPI 3.0 compatibility fixes
pub fn get_openapi_routes() -> axum::Router {
    use axum::Json;
    use axum::routing::get;
    use utoipa_swagger_ui::SwaggerUi;

    // Converts type: ["array", "null"] -> type: "array", nullable: true
    async fn openapi_3_0_handler() -> Json<serde_json::Value> {
        Json(openapi::FleetApiDoc::openapi_json())
    }

    axum::Router::new()
        .route("/api-docs/openapi.json", get(openapi_3_0_handler))
        // SwaggerUI serves the native OpenAPI 3.1 document
        .merge(SwaggerUi::new("/swagger-ui").url(
            "/api-docs/openapi-3.1.json",
            openapi::FleetApiDoc::openapi(),
        ))
}

#[derive(Clone)]
pub struct AppState {
    pub telemetry: Arc<Telemetry<ServerMetrics>>,
    pub fleet: FleetQueryService,
    pub config: Arc<Config>,
    pub shutdown: Arc<ShutdownCoordinator>,
}

fn default_rust_log() -> String {
    "info".to_string()
}

fn default_mygeotab_timeout_secs() -> u64 {
    40
}

fn default_data_connector_timeout_secs() -> u64 {
    90
}

#[derive(Debug, Clone, serde::Deserialize)]
pub struct Config {
    // Service port
    pub api_service_port: String,

    // Loggers
    #[serde(default = "default_rust_log")]
    pub rust_log: String,
    #[serde(default)]
    pub log_format: String,

    // Upstream timeouts
    #[serde(default = "default_mygeotab_timeout_secs")]
    pub mygeotab_timeout_secs: u64,
    #[serde(default = "default_data_connector_timeout_secs")]
    pub data_connector_timeout_secs: u64,

    // Add-in static files, served at /addin when set
    #[serde(default)]
    pub addin_dir: Option<String>,
}

impl Config {
    pub fn load() -> Result<Self, envy::Error> {
        // Load .env file if present (useful when running outside docker-compose)
        match dotenv::dotenv() {
            Ok(path) => eprintln!("Loaded .env from: {}", path.display()),
            Err(e) => eprintln!("dotenv warning: {e}"),
        }

        envy::from_env::<Config>()
    }

    pub fn mygeotab_timeout(&self) -> Duration {
        Duration::from_secs(self.mygeotab_timeout_secs)
    }

    pub fn data_connector_timeout(&self) -> Duration {
        Duration::from_secs(self.data_connector_timeout_secs)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn config_defaults_apply_to_missing_variables() {
        let config: Config = envy::from_iter([(
            "API_SERVICE_PORT".to_string(),
            "8080".to_string(),
        )])
        .unwrap();

        assert_eq!(config.api_service_port, "8080");
        assert_eq!(config.rust_log, "info");
        assert_eq!(config.log_format, "");
        assert_eq!(config.mygeotab_timeout(), Duration::from_secs(40));
        assert_eq!(config.data_connector_timeout(), Duration::from_secs(90));
        assert_eq!(config.addin_dir, None);
    }

    #[test]
    fn config_reads_overrides() {
        let config: Config = envy::from_iter([
            ("API_SERVICE_PORT".to_string(), "9000".to_string()),
            ("LOG_FORMAT".to_string(), "pretty".to_string()),
            ("MYGEOTAB_TIMEOUT_SECS".to_string(), "5".to_string()),
            ("ADDIN_DIR".to_string(), "./addin".to_string()),
        ])
        .unwrap();

        assert_eq!(config.log_format, "pretty");
        assert_eq!(config.mygeotab_timeout_secs, 5);
        assert_eq!(config.addin_dir.as_deref(), Some("./addin"));
    }
}
