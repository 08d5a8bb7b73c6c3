use url::Url;

use crate::error::{DataConnectorClientResult, DataConnectorError};

/// The two public Data Connector hostnames serve the same data; an account
/// may only be authorised on one of them.
pub const SIBLING_HOSTS: [(&str, &str); 2] = [
    ("odata-connector-1.geotab.com", "data-connector.geotab.com"),
    ("data-connector.geotab.com", "odata-connector-1.geotab.com"),
];

/// Base URLs to try, in order: the configured one, then its sibling host
/// (same scheme and path) when the configured host is a known public one.
pub fn candidate_base_urls(
    base_url: &str,
) -> DataConnectorClientResult<Vec<String>> {
    let base = base_url.trim().trim_end_matches('/');
    if base.is_empty() {
        return Err(DataConnectorError::EmptyBaseUrl);
    }

    let parsed =
        Url::parse(base).map_err(|source| DataConnectorError::InvalidBaseUrl {
            url: base.to_string(),
            source,
        })?;

    let mut candidates = vec![base.to_string()];

    // `Url` lowercases hosts; only the exact spelling is a known host.
    let sibling = raw_host(base).and_then(|host| {
        SIBLING_HOSTS
            .iter()
            .find(|(known, _)| *known == host)
            .map(|(_, other)| *other)
    });

    if let Some(sibling) = sibling {
        let mut alternate = parsed.clone();
        if alternate.set_host(Some(sibling)).is_ok() {
            candidates
                .push(alternate.as_str().trim_end_matches('/').to_string());
        }
    }

    Ok(candidates)
}

/// Host exactly as written in `base`, without userinfo or port.
fn raw_host(base: &str) -> Option<&str> {
    let (_, rest) = base.split_once("://")?;
    let authority = rest.split(['/', '?', '#']).next()?;
    let host_port = authority.rsplit('@').next()?;
    host_port.split(':').next()
}

/// Host part of a base URL for error messages; falls back to the raw input.
pub fn host_of(base_url: &str) -> String {
    Url::parse(base_url)
        .ok()
        .and_then(|u| u.host_str().map(str::to_string))
        .unwrap_or_else(|| base_url.to_string())
}
