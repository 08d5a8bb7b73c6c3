use prometheus::{IntCounterVec, Opts, Registry};
use telemetry::metrics::TelemetryMetrics;

#[derive(Clone, Debug)]
pub struct ServerMetrics {
    pub registry: Registry,

    pub request_errors: IntCounterVec,
    pub fleet_queries: IntCounterVec,
}

impl TelemetryMetrics for ServerMetrics {
    fn registry(&self) -> &Registry {
        &self.registry
    }

    fn metrics(&self) -> Option<Self> {
        Some(self.clone())
    }
}

impl ServerMetrics {
    pub fn new(prefix: Option<String>) -> anyhow::Result<Self> {
        let request_errors = IntCounterVec::new(
            Opts::new(
                "request_errors",
                "A metric counting request errors by handler and error code",
            ),
            &["handler", "error_code"],
        )?;

        let fleet_queries = IntCounterVec::new(
            Opts::new(
                "fleet_queries",
                "A metric counting fleet queries by endpoint, metric, scope and granularity",
            ),
            &["handler", "metric", "scope", "granularity"],
        )?;

        let registry = Registry::new_custom(prefix, None)?;
        registry.register(Box::new(request_errors.clone()))?;
        registry.register(Box::new(fleet_queries.clone()))?;

        Ok(Self {
            registry,
            request_errors,
            fleet_queries,
        })
    }

    pub fn record_error(&self, handler: &str, error_code: &str) {
        self.request_errors
            .with_label_values(&[handler, error_code])
            .inc();
    }

    pub fn record_query(
        &self,
        handler: &str,
        metric: &str,
        scope: &str,
        granularity: &str,
    ) {
        self.fleet_queries
            .with_label_values(&[handler, metric, scope, granularity])
            .inc();
    }
}
