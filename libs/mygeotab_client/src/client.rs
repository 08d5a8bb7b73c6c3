use std::collections::{BTreeMap, BTreeSet};
use std::time::Duration;

use serde::de::DeserializeOwned;
use serde_json::{Value, json};
use utils::serials::{normalize_serial, normalize_serials, serial_set};

use crate::{
    error::{MyGeotabClientResult, MyGeotabError},
    models::*,
};

const MAX_ERROR_BODY_CHARS: usize = 300;

pub struct MyGeotabClient {
    http: reqwest::Client,
    scheme: String,
}

impl MyGeotabClient {
    pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(40);

    pub fn new(timeout: Duration) -> MyGeotabClientResult<Self> {
        let http = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(MyGeotabError::Build)?;

        Ok(Self {
            http,
            scheme: "https".to_string(),
        })
    }

    /// Overrides the URL scheme used to reach `{server}/apiv1`.
    pub fn with_scheme(mut self, scheme: impl Into<String>) -> Self {
        self.scheme = scheme.into();
        self
    }

    pub fn endpoint(&self, server: &str) -> String {
        format!(
            "{}://{}/apiv1",
            self.scheme,
            server.trim().trim_end_matches('/')
        )
    }

    /// Sends a single `{method, params}` call and returns its `result`.
    pub async fn call(
        &self,
        server: &str,
        method: &str,
        params: Value,
    ) -> MyGeotabClientResult<Value> {
        let url = self.endpoint(server);
        tracing::debug!(%url, method, "MyGeotab call");

        let response = self
            .http
            .post(&url)
            .json(&RpcRequest { method, params })
            .send()
            .await
            .map_err(|source| MyGeotabError::Request {
                method: method.to_string(),
                source,
            })?;

        let status = response.status();
        let text =
            response
                .text()
                .await
                .map_err(|source| MyGeotabError::Request {
                    method: method.to_string(),
                    source,
                })?;

        if !status.is_success() {
            return Err(MyGeotabError::Status {
                method: method.to_string(),
                status: status.as_u16(),
                body: text.chars().take(MAX_ERROR_BODY_CHARS).collect(),
            });
        }

        let envelope =
            serde_json::from_str::<RpcResponse>(&text).map_err(|source| {
                MyGeotabError::Payload {
                    method: method.to_string(),
                    source,
                }
            })?;

        if let Some(error) = envelope.error {
            return Err(MyGeotabError::Rpc {
                method: method.to_string(),
                message: rpc_error_message(&error),
            });
        }

        Ok(envelope.result.unwrap_or(Value::Null))
    }

    pub async fn authenticate(
        &self,
        server: &str,
        database: &str,
        user: &str,
        password: &str,
    ) -> MyGeotabClientResult<Credentials> {
        let result = self
            .call(
                server,
                "Authenticate",
                json!({
                    "database": database,
                    "userName": user,
                    "password": password,
                }),
            )
            .await?;

        let auth = serde_json::from_value::<AuthenticateResult>(result)
            .map_err(|source| MyGeotabError::Payload {
                method: "Authenticate".to_string(),
                source,
            })?;

        match auth.credentials {
            Some(credentials) if credentials.is_present() => Ok(credentials),
            _ => Err(MyGeotabError::MissingCredentials),
        }
    }

    pub async fn get<T: DeserializeOwned>(
        &self,
        server: &str,
        credentials: &Credentials,
        type_name: &str,
        search: Option<Value>,
    ) -> MyGeotabClientResult<Vec<T>> {
        let mut params = json!({
            "typeName": type_name,
            "credentials": credentials,
        });
        if let Some(search) = search {
            params["search"] = search;
        }

        let result = self.call(server, "Get", params).await?;
        if result.is_null() {
            return Ok(Vec::new());
        }

        serde_json::from_value(result).map_err(|source| MyGeotabError::Payload {
            method: "Get".to_string(),
            source,
        })
    }

    /// Groups with both an id and a name, ordered by lowercase name.
    pub async fn list_groups(
        &self,
        server: &str,
        credentials: &Credentials,
    ) -> MyGeotabClientResult<Vec<Group>> {
        let raw: Vec<RawGroup> =
            self.get(server, credentials, "Group", None).await?;

        let mut groups: Vec<Group> = raw
            .into_iter()
            .filter_map(|g| match (g.id, g.name) {
                (Some(id), Some(name)) if !id.is_empty() && !name.is_empty() => {
                    Some(Group { id, name })
                }
                _ => None,
            })
            .collect();

        groups.sort_by_cached_key(|g| g.name.to_lowercase());
        Ok(groups)
    }

    /// Serials of the devices in a group.
    ///
    /// MyGeotab accepts the group reference in several shapes depending on
    /// the server version, so each is tried in turn until one yields devices.
    /// Failures of individual shapes are not fatal; exhausting all of them
    /// yields an empty list.
    pub async fn device_serials_by_group(
        &self,
        server: &str,
        credentials: &Credentials,
        group_id: &str,
    ) -> Vec<String> {
        for search in group_search_shapes(group_id) {
            match self
                .get::<Device>(server, credentials, "Device", Some(search.clone()))
                .await
            {
                Ok(devices) => {
                    let serials = normalize_serials(
                        devices.iter().filter_map(|d| d.serial_number.as_deref()),
                    );
                    if !serials.is_empty() {
                        return serials;
                    }
                    tracing::debug!(group_id, %search, "Group search shape matched no devices");
                }
                Err(e) => {
                    tracing::warn!(group_id, %search, "Group search shape failed: {e}");
                }
            }
        }

        Vec::new()
    }

    /// Display names for the wanted serials, keyed by serial.
    ///
    /// Fetches the whole device list and filters locally. A blank device
    /// name falls back to the serial itself.
    pub async fn device_name_map(
        &self,
        server: &str,
        credentials: &Credentials,
        wanted_serials: &BTreeSet<String>,
    ) -> MyGeotabClientResult<BTreeMap<String, String>> {
        let wanted = serial_set(wanted_serials);
        if wanted.is_empty() {
            return Ok(BTreeMap::new());
        }

        let devices: Vec<Device> =
            self.get(server, credentials, "Device", None).await?;

        Ok(name_map(devices, &wanted))
    }
}

pub(crate) fn group_search_shapes(group_id: &str) -> [Value; 3] {
    [
        json!({ "groups": [{ "id": group_id }] }),
        json!({ "groups": [group_id] }),
        json!({ "groups": [{ "Id": group_id }] }),
    ]
}

pub(crate) fn name_map(
    devices: Vec<Device>,
    wanted: &BTreeSet<String>,
) -> BTreeMap<String, String> {
    let mut names = BTreeMap::new();
    for device in devices {
        let Some(serial) =
            device.serial_number.as_deref().and_then(normalize_serial)
        else {
            continue;
        };
        if !wanted.contains(&serial) {
            continue;
        }

        let name = device
            .name
            .as_deref()
            .map(str::trim)
            .filter(|n| !n.is_empty())
            .map(str::to_string)
            .unwrap_or_else(|| serial.clone());

        names.entry(serial).or_insert(name);
    }
    names
}

fn rpc_error_message(error: &Value) -> String {
    error
        .get("message")
        .and_then(Value::as_str)
        .map(str::to_string)
        .or_else(|| error.as_str().map(str::to_string))
        .unwrap_or_else(|| error.to_string())
}
