// The OpenApi derive macro generates code using Iterator::for_each,
// which is disallowed by our clippy config. Allow it at module level.
#![allow(clippy::disallowed_methods)]

use utoipa::OpenApi;

/// OpenAPI documentation for the `/api` routes
#[derive(OpenApi)]
#[openapi(
    paths(
        crate::fleet_api::core::v1::fleet::connect::handler::handler,
        crate::fleet_api::core::v1::fleet::query::handler::handler,
        crate::fleet_api::core::v1::fleet::export::handler::handler,
    ),
    components(schemas(
        crate::fleet_api::api_error_v1::ApiV1Error,
        crate::fleet_api::api_error_v1::ApiV1Detail,
    )),
    info(
        title = "Fleet Metrics API",
        version = "1.0.0",
        description = "Distance and fuel per vehicle from MyGeotab and the Data Connector, bucketed by day or month",
        license(name = "MIT")
    ),
    servers(
        (url = "/api", description = "API")
    ),
    tags(
        (name = "fleet", description = "Connect to MyGeotab, query and export fleet metrics")
    )
)]
pub struct FleetApiDoc;

impl FleetApiDoc {
    pub fn openapi() -> utoipa::openapi::OpenApi {
        <FleetApiDoc as utoipa::OpenApi>::openapi()
    }

    /// Get OpenAPI spec as fixed JSON for OpenAPI 3.0 compatibility
    /// Converts type: ["array", "null"] to type: "array", nullable: true
    pub fn openapi_json() -> serde_json::Value {
        let mut json_value = match serde_json::to_value(Self::openapi()) {
            Ok(value) => value,
            Err(e) => {
                tracing::error!("Failed to serialize OpenAPI spec: {e}");
                return serde_json::Value::Null;
            }
        };

        let fixed_count = Self::fix_nullable_types_recursive(&mut json_value);
        if fixed_count > 0 {
            tracing::debug!(
                "Fixed {} nullable type definitions in OpenAPI spec",
                fixed_count
            );
        }

        json_value
    }

    /// Rewrites `type: [T, "null"]` into `type: T, nullable: true`.
    fn fix_nullable_types_recursive(value: &mut serde_json::Value) -> usize {
        let mut fixed_count = 0;

        match value {
            serde_json::Value::Object(map) => {
                if let Some(serde_json::Value::Array(types)) = map.get("type")
                    && types.len() == 2
                    && types.iter().any(|v| v == "null")
                    && let Some(concrete) =
                        types.iter().find(|v| *v != "null").cloned()
                {
                    map.insert("type".to_string(), concrete);
                    map.insert(
                        "nullable".to_string(),
                        serde_json::Value::Bool(true),
                    );
                    fixed_count += 1;
                }

                for val in map.values_mut() {
                    fixed_count += Self::fix_nullable_types_recursive(val);
                }
            }
            serde_json::Value::Array(arr) => {
                for item in arr.iter_mut() {
                    fixed_count += Self::fix_nullable_types_recursive(item);
                }
            }
            _ => {}
        }

        fixed_count
    }
}
