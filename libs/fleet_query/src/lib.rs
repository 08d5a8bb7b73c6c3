//! Fleet metric queries: authenticate against MyGeotab, pull vehicle KPI
//! rows from the Data Connector, join them by device serial and bucket
//! them by day or month.

pub mod aggregate;
pub mod error;
pub mod export;
pub mod models;
pub mod service;
pub mod upstream;


pub use error::{FleetQueryResult, QueryError};
pub use models::{
    ConnectionSettings, FleetMetrics, Granularity, Metric, MetricRow,
    QueryParams, Scope, TimeSeriesPoint,
};
pub use mygeotab_client::Group;
pub use service::FleetQueryService;
pub use upstream::{Directory, MetricsSource};
