use base64::{Engine, engine::general_purpose::STANDARD as BASE64};

/// `Authorization` header value for the Data Connector.
///
/// The Data Connector uses HTTP Basic with `{database}/{user}` as the user
/// part, independently of any MyGeotab session.
pub fn basic_auth_header(database: &str, user: &str, password: &str) -> String {
    let raw = format!("{database}/{user}:{password}");
    format!("Basic {}", BASE64.encode(raw))
}
