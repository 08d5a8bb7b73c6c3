//! Seams to the two upstream systems.

use std::collections::{BTreeMap, BTreeSet};

use async_trait::async_trait;
use data_connector_client::{
    DataConnectorClient, DataConnectorClientResult, ODataQuery, ODataRow,
};
use mygeotab_client::{Credentials, Group, MyGeotabClient, MyGeotabClientResult};

use crate::models::ConnectionSettings;

/// Account directory: authentication, groups and devices (MyGeotab).
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait Directory: Send + Sync {
    async fn authenticate(
        &self,
        connection: &ConnectionSettings,
    ) -> MyGeotabClientResult<Credentials>;

    async fn list_groups(
        &self,
        server: &str,
        credentials: &Credentials,
    ) -> MyGeotabClientResult<Vec<Group>>;

    async fn device_serials_by_group(
        &self,
        server: &str,
        credentials: &Credentials,
        group_id: &str,
    ) -> Vec<String>;

    async fn device_name_map(
        &self,
        server: &str,
        credentials: &Credentials,
        wanted: &BTreeSet<String>,
    ) -> MyGeotabClientResult<BTreeMap<String, String>>;
}

/// Historical KPI tables (Data Connector).
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait MetricsSource: Send + Sync {
    async fn fetch(
        &self,
        base_url: &str,
        auth_header: &str,
        query: &ODataQuery,
    ) -> DataConnectorClientResult<Vec<ODataRow>>;
}

#[async_trait]
impl Directory for MyGeotabClient {
    async fn authenticate(
        &self,
        connection: &ConnectionSettings,
    ) -> MyGeotabClientResult<Credentials> {
        MyGeotabClient::authenticate(
            self,
            &connection.server,
            &connection.database,
            &connection.user,
            &connection.password,
        )
        .await
    }

    async fn list_groups(
        &self,
        server: &str,
        credentials: &Credentials,
    ) -> MyGeotabClientResult<Vec<Group>> {
        MyGeotabClient::list_groups(self, server, credentials).await
    }

    async fn device_serials_by_group(
        &self,
        server: &str,
        credentials: &Credentials,
        group_id: &str,
    ) -> Vec<String> {
        MyGeotabClient::device_serials_by_group(self, server, credentials, group_id)
            .await
    }

    async fn device_name_map(
        &self,
        server: &str,
        credentials: &Credentials,
        wanted: &BTreeSet<String>,
    ) -> MyGeotabClientResult<BTreeMap<String, String>> {
        MyGeotabClient::device_name_map(self, server, credentials, wanted).await
    }
}

#[async_trait]
impl MetricsSource for DataConnectorClient {
    async fn fetch(
        &self,
        base_url: &str,
        auth_header: &str,
        query: &ODataQuery,
    ) -> DataConnectorClientResult<Vec<ODataRow>> {
        self.query_with_fallback(base_url, auth_header, query).await
    }
}
