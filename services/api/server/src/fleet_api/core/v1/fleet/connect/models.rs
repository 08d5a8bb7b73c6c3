use fleet_query::{ConnectionSettings, Group};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use validator::Validate;

use super::super::validators::not_blank;

/// MyGeotab and Data Connector access for one request. Never stored.
#[derive(Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ConnectRequest {
    /// MyGeotab server host
    #[schema(example = "my.geotab.com")]
    #[validate(custom(function = "not_blank"))]
    pub myg_server: String,

    #[schema(example = "demo_fleet")]
    #[validate(custom(function = "not_blank"))]
    pub myg_database: String,

    #[schema(example = "fleet.manager@example.com")]
    #[validate(custom(function = "not_blank"))]
    pub myg_user: String,

    #[validate(custom(function = "not_blank"))]
    pub myg_password: String,

    /// Data Connector OData base URL
    #[schema(example = "https://odata-connector-1.geotab.com/odata/v4/svc")]
    #[validate(custom(function = "not_blank"))]
    pub dc_base_url: String,
}

impl ConnectRequest {
    pub fn to_settings(&self) -> ConnectionSettings {
        ConnectionSettings {
            server: self.myg_server.trim().to_string(),
            database: self.myg_database.trim().to_string(),
            user: self.myg_user.trim().to_string(),
            password: self.myg_password.clone(),
            dc_base_url: self.dc_base_url.trim().to_string(),
        }
    }
}

impl std::fmt::Debug for ConnectRequest {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ConnectRequest")
            .field("myg_server", &self.myg_server)
            .field("myg_database", &self.myg_database)
            .field("myg_user", &self.myg_user)
            .field("myg_password", &"<redacted>")
            .field("dc_base_url", &self.dc_base_url)
            .finish()
    }
}

#[derive(Debug, Serialize, Deserialize, ToSchema, PartialEq)]
pub struct GroupItem {
    #[schema(example = "b27A5")]
    pub id: String,
    #[schema(example = "North Depot")]
    pub name: String,
}

impl From<Group> for GroupItem {
    fn from(group: Group) -> Self {
        Self {
            id: group.id,
            name: group.name,
        }
    }
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct ConnectResponse {
    #[schema(example = "ok")]
    pub status: String,
    pub groups: Vec<GroupItem>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn request() -> ConnectRequest {
        ConnectRequest {
            myg_server: " my.geotab.com ".into(),
            myg_database: "demo".into(),
            myg_user: "user".into(),
            myg_password: " secret ".into(),
            dc_base_url: "https://data-connector.geotab.com/odata/v4/svc/"
                .into(),
        }
    }

    #[test]
    fn settings_trim_everything_but_the_password() {
        let settings = request().to_settings();
        assert_eq!(settings.server, "my.geotab.com");
        assert_eq!(settings.password, " secret ");
    }

    #[test]
    fn blank_fields_fail_validation() {
        let mut req = request();
        req.myg_user = "  ".into();
        let errors = req.validate().unwrap_err();
        assert_eq!(errors.field_errors().len(), 1);
    }

    #[test]
    fn debug_output_hides_password() {
        assert!(!format!("{:?}", request()).contains("secret"));
    }
}
