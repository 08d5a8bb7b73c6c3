use chrono::NaiveDate;
use fleet_query::{Granularity, Metric, QueryParams, Scope};
use serde::Deserialize;
use utoipa::ToSchema;
use validator::Validate;

use super::super::connect::models::ConnectRequest;

/// Connection fields plus the query to run.
#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct QueryRequest {
    #[serde(flatten)]
    #[validate(nested)]
    pub connection: ConnectRequest,

    #[schema(example = "distance")]
    pub metric: Metric,

    #[serde(default)]
    #[schema(example = "fleet")]
    pub scope: Scope,

    /// Required when `scope` is `group`
    #[schema(example = "b27A5")]
    pub group_id: Option<String>,

    #[serde(default)]
    #[schema(example = "daily")]
    pub granularity: Granularity,

    /// First day, inclusive
    #[schema(value_type = String, format = Date, example = "2024-01-01")]
    pub from: NaiveDate,

    /// Last day, inclusive
    #[schema(value_type = String, format = Date, example = "2024-01-31")]
    pub to: NaiveDate,
}

impl QueryRequest {
    pub fn to_params(&self) -> QueryParams {
        QueryParams {
            connection: self.connection.to_settings(),
            metric: self.metric,
            scope: self.scope,
            group_id: self.group_id.clone(),
            granularity: self.granularity,
            from: self.from,
            to: self.to,
        }
    }
}
