use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::error::{FleetQueryResult, QueryError};

#[derive(Debug, Clone, Copy, Deserialize, Serialize, ToSchema, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum Metric {
    Distance,
    Fuel,
}

impl Metric {
    /// KPI column holding this metric in the Data Connector tables.
    pub fn column(&self) -> &'static str {
        match self {
            Metric::Distance => "Distance_Km",
            Metric::Fuel => "FuelUsed_Litres",
        }
    }
}

impl std::fmt::Display for Metric {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Metric::Distance => write!(f, "distance"),
            Metric::Fuel => write!(f, "fuel"),
        }
    }
}

#[derive(
    Debug, Clone, Copy, Default, Deserialize, Serialize, ToSchema, PartialEq, Eq,
)]
#[serde(rename_all = "snake_case")]
pub enum Scope {
    #[default]
    Fleet,
    Group,
}

impl std::fmt::Display for Scope {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Scope::Fleet => write!(f, "fleet"),
            Scope::Group => write!(f, "group"),
        }
    }
}

#[derive(
    Debug, Clone, Copy, Default, Deserialize, Serialize, ToSchema, PartialEq, Eq,
)]
#[serde(rename_all = "snake_case")]
pub enum Granularity {
    #[default]
    Daily,
    Monthly,
}

impl Granularity {
    pub fn table(&self) -> &'static str {
        match self {
            Granularity::Daily => "VehicleKpi_Daily",
            Granularity::Monthly => "VehicleKpi_Monthly",
        }
    }

    /// Length of the ISO-8601 timestamp prefix that forms a bucket.
    pub fn bucket_len(&self) -> usize {
        match self {
            Granularity::Daily => 10,
            Granularity::Monthly => 7,
        }
    }
}

impl std::fmt::Display for Granularity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Granularity::Daily => write!(f, "daily"),
            Granularity::Monthly => write!(f, "monthly"),
        }
    }
}

/// Per-request access to both upstream systems. Never stored.
#[derive(Clone, PartialEq, Eq)]
pub struct ConnectionSettings {
    pub server: String,
    pub database: String,
    pub user: String,
    pub password: String,
    pub dc_base_url: String,
}

impl ConnectionSettings {
    pub fn check(&self) -> FleetQueryResult<()> {
        let required = [
            (&self.server, "MyGeotab server"),
            (&self.database, "MyGeotab database"),
            (&self.user, "MyGeotab user"),
            (&self.password, "MyGeotab password"),
            (&self.dc_base_url, "Data Connector base URL"),
        ];

        for (value, label) in required {
            if value.trim().is_empty() {
                return Err(QueryError::InvalidInput(format!(
                    "{label} is required"
                )));
            }
        }

        Ok(())
    }
}

impl std::fmt::Debug for ConnectionSettings {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ConnectionSettings")
            .field("server", &self.server)
            .field("database", &self.database)
            .field("user", &self.user)
            .field("password", &"<redacted>")
            .field("dc_base_url", &self.dc_base_url)
            .finish()
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QueryParams {
    pub connection: ConnectionSettings,
    pub metric: Metric,
    pub scope: Scope,
    pub group_id: Option<String>,
    pub granularity: Granularity,
    pub from: NaiveDate,
    pub to: NaiveDate,
}

impl QueryParams {
    /// Rejects inconsistent parameters and returns the group to restrict
    /// to, if any.
    pub fn check(&self) -> FleetQueryResult<Option<&str>> {
        self.connection.check()?;

        if self.to < self.from {
            return Err(QueryError::InvalidInput(format!(
                "'to' ({}) must not be before 'from' ({})",
                self.to, self.from
            )));
        }

        match self.scope {
            Scope::Fleet => Ok(None),
            Scope::Group => match self.group_id.as_deref().map(str::trim) {
                Some(id) if !id.is_empty() => Ok(Some(id)),
                _ => Err(QueryError::InvalidInput(
                    "groupId is required when scope is 'group'".to_string(),
                )),
            },
        }
    }

    /// Inclusive UTC day range as an OData `$filter` expression.
    pub fn date_filter(&self) -> String {
        format!(
            "DateTime ge {}T00:00:00Z and DateTime le {}T23:59:59Z",
            self.from, self.to
        )
    }
}

/// A single device's metric value in one bucket.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema, PartialEq)]
pub struct MetricRow {
    #[schema(example = "2024-01-01")]
    pub bucket: String,
    #[schema(example = "Truck 12")]
    pub device_name: String,
    #[schema(example = "G9ABC1234567")]
    pub device_serial: String,
    #[schema(example = 15.0)]
    pub value: f64,
}

/// Sum of all row values sharing a bucket.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema, PartialEq)]
pub struct TimeSeriesPoint {
    #[schema(example = "2024-01-01")]
    pub bucket: String,
    #[schema(example = 15.0)]
    pub value: f64,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, ToSchema, PartialEq)]
pub struct FleetMetrics {
    pub rows: Vec<MetricRow>,
    pub points: Vec<TimeSeriesPoint>,
}
