use std::collections::{BTreeMap, BTreeSet};
use std::sync::Arc;

use data_connector_client::{ODataQuery, basic_auth_header};
use mygeotab_client::Group;
use utils::serials::serial_set;

use crate::aggregate::{
    DATE_TIME_COLUMN, SERIAL_COLUMN, aggregate_points, project_rows, row_serial,
};
use crate::error::FleetQueryResult;
use crate::models::{ConnectionSettings, FleetMetrics, QueryParams};
use crate::upstream::{Directory, MetricsSource};

/// Answers connect and query requests. Holds no per-request state; every
/// call authenticates and fetches from scratch.
#[derive(Clone)]
pub struct FleetQueryService {
    directory: Arc<dyn Directory>,
    metrics: Arc<dyn MetricsSource>,
}

impl FleetQueryService {
    pub fn new(
        directory: Arc<dyn Directory>,
        metrics: Arc<dyn MetricsSource>,
    ) -> Self {
        Self { directory, metrics }
    }

    /// Authenticates and lists the account's groups.
    #[tracing::instrument(skip_all, fields(server = %connection.server, database = %connection.database))]
    pub async fn connect(
        &self,
        connection: &ConnectionSettings,
    ) -> FleetQueryResult<Vec<Group>> {
        connection.check()?;

        let credentials = self.directory.authenticate(connection).await?;
        let groups = self
            .directory
            .list_groups(&connection.server, &credentials)
            .await?;

        tracing::info!(groups = groups.len(), "Connected to MyGeotab");
        Ok(groups)
    }

    /// Fetches KPI rows for the date range, restricts them to the requested
    /// scope, names the devices and aggregates per bucket.
    #[tracing::instrument(
        skip_all,
        fields(
            metric = %params.metric,
            scope = %params.scope,
            granularity = %params.granularity,
            from = %params.from,
            to = %params.to,
        )
    )]
    pub async fn query(
        &self,
        params: &QueryParams,
    ) -> FleetQueryResult<FleetMetrics> {
        let group_id = params.check()?;
        let connection = &params.connection;

        let credentials = self.directory.authenticate(connection).await?;
        let auth_header = basic_auth_header(
            &connection.database,
            &connection.user,
            &connection.password,
        );

        let allowed: Option<BTreeSet<String>> = match group_id {
            Some(group_id) => {
                let serials = self
                    .directory
                    .device_serials_by_group(
                        &connection.server,
                        &credentials,
                        group_id,
                    )
                    .await;
                if serials.is_empty() {
                    tracing::info!(group_id, "Group has no devices");
                    return Ok(FleetMetrics::default());
                }
                Some(serial_set(serials))
            }
            None => None,
        };

        let odata = ODataQuery::new(
            params.granularity.table(),
            [DATE_TIME_COLUMN, SERIAL_COLUMN, params.metric.column()],
        )
        .with_filter(params.date_filter());

        let mut raw = self
            .metrics
            .fetch(&connection.dc_base_url, &auth_header, &odata)
            .await?;
        let fetched = raw.len();

        if let Some(allowed) = &allowed {
            raw.retain(|row| row_serial(row).is_some_and(|s| allowed.contains(s)));
        }

        let present = serial_set(raw.iter().filter_map(row_serial));
        let names = if present.is_empty() {
            BTreeMap::new()
        } else {
            self.directory
                .device_name_map(&connection.server, &credentials, &present)
                .await?
        };

        let rows =
            project_rows(&raw, params.metric, params.granularity, &names);
        let points = aggregate_points(&rows);

        tracing::info!(
            fetched,
            in_scope = raw.len(),
            devices = present.len(),
            rows = rows.len(),
            points = points.len(),
            "Fleet query complete",
        );

        Ok(FleetMetrics { rows, points })
    }
}
