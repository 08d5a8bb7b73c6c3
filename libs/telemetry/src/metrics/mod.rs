mod traits;

use std::sync::Arc;

pub use traits::TelemetryMetrics;

#[derive(Clone)]
pub struct Telemetry<M: TelemetryMetrics> {
    metrics: Option<Arc<M>>,
}

impl<M: TelemetryMetrics> Telemetry<M> {
    pub fn new(metrics: Option<M>) -> Arc<Self> {
        Arc::new(Self {
            metrics: metrics.map(Arc::new),
        })
    }

    pub fn base_metrics(&self) -> Option<M> {
        self.metrics.clone().and_then(|m| m.metrics())
    }

    pub fn maybe_use_metrics<F>(&self, f: F)
    where
        F: Fn(&M),
    {
        if let Some(metrics) = &self.metrics {
            f(metrics);
        }
    }

    /// Service registry followed by the process-wide default registry, in
    /// Prometheus text format.
    pub fn get_metrics(&self) -> String {
        use prometheus::Encoder;

        let Some(metrics) = &self.metrics else {
            return "# EOF\n".to_string();
        };

        let mut result = metrics.gather_metrics();

        let mut buffer = Vec::new();
        let encoder = prometheus::TextEncoder::new();
        if let Err(e) = encoder.encode(&prometheus::gather(), &mut buffer) {
            tracing::error!("could not encode prometheus metrics: {}", e);
        }

        match String::from_utf8(buffer) {
            Ok(v) => result.push_str(&v),
            Err(e) => tracing::error!(
                "prometheus metrics could not be from_utf8'd: {}",
                e
            ),
        }

        result.push_str("# EOF\n");
        result
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use prometheus::{IntCounter, Registry};

    #[derive(Clone)]
    struct TestMetrics {
        registry: Registry,
        hits: IntCounter,
    }

    impl TelemetryMetrics for TestMetrics {
        fn registry(&self) -> &Registry {
            &self.registry
        }

        fn metrics(&self) -> Option<Self> {
            Some(self.clone())
        }
    }

    fn test_metrics() -> TestMetrics {
        let registry = Registry::new();
        let hits = IntCounter::new("hits", "test counter").unwrap();
        registry.register(Box::new(hits.clone())).unwrap();
        TestMetrics { registry, hits }
    }

    #[test]
    fn renders_service_metrics() {
        let telemetry = Telemetry::new(Some(test_metrics()));
        telemetry.maybe_use_metrics(|m| m.hits.inc_by(3));

        let text = telemetry.get_metrics();
        assert!(text.contains("hits 3"));
        assert!(text.ends_with("# EOF\n"));
    }

    #[test]
    fn without_metrics_renders_only_eof() {
        let telemetry = Telemetry::<TestMetrics>::new(None);
        assert_eq!(telemetry.get_metrics(), "# EOF\n");
        assert!(telemetry.base_metrics().is_none());
    }
}
