use pretty_assertions::assert_eq;

use crate::auth::basic_auth_header;
use crate::error::DataConnectorError;
use crate::hosts::{candidate_base_urls, host_of};

#[test]
fn primary_host_gets_secondary_as_fallback() {
    let candidates =
        candidate_base_urls("https://odata-connector-1.geotab.com/odata/v4/svc/")
            .unwrap();
    assert_eq!(
        candidates,
        vec![
            "https://odata-connector-1.geotab.com/odata/v4/svc".to_string(),
            "https://data-connector.geotab.com/odata/v4/svc".to_string(),
        ]
    );
}

#[test]
fn secondary_host_gets_primary_as_fallback() {
    let candidates =
        candidate_base_urls("https://data-connector.geotab.com/odata/v4/svc")
            .unwrap();
    assert_eq!(
        candidates,
        vec![
            "https://data-connector.geotab.com/odata/v4/svc".to_string(),
            "https://odata-connector-1.geotab.com/odata/v4/svc".to_string(),
        ]
    );
}

#[test]
fn host_match_is_case_sensitive() {
    let candidates =
        candidate_base_urls("https://DATA-CONNECTOR.geotab.com/odata/v4/svc")
            .unwrap();
    assert_eq!(
        candidates,
        vec!["https://DATA-CONNECTOR.geotab.com/odata/v4/svc".to_string()]
    );
}

#[test]
fn known_host_with_port_keeps_fallback() {
    let candidates =
        candidate_base_urls("https://data-connector.geotab.com:443/odata")
            .unwrap();
    assert_eq!(candidates.len(), 2);
    assert_eq!(candidates[1], "https://odata-connector-1.geotab.com/odata");
}

#[test]
fn unknown_host_has_no_fallback() {
    let candidates =
        candidate_base_urls("http://localhost:8081/odata").unwrap();
    assert_eq!(candidates, vec!["http://localhost:8081/odata".to_string()]);
}

#[test]
fn lookalike_host_has_no_fallback() {
    let candidates =
        candidate_base_urls("https://eu.data-connector.geotab.com/odata")
            .unwrap();
    assert_eq!(candidates.len(), 1);
}

#[test]
fn empty_base_url_is_invalid_input() {
    let err = candidate_base_urls("   ").unwrap_err();
    assert!(matches!(err, DataConnectorError::EmptyBaseUrl));
    assert!(err.is_invalid_input());
}

#[test]
fn unparseable_base_url_is_invalid_input() {
    let err = candidate_base_urls("not a url").unwrap_err();
    assert!(matches!(err, DataConnectorError::InvalidBaseUrl { .. }));
    assert!(err.is_invalid_input());
}

#[test]
fn host_of_extracts_hostname() {
    assert_eq!(host_of("https://data-connector.geotab.com/odata"), "data-connector.geotab.com");
    assert_eq!(host_of("garbage"), "garbage");
}

#[test]
fn basic_header_joins_database_and_user() {
    // base64("db/user:pw")
    assert_eq!(basic_auth_header("db", "user", "pw"), "Basic ZGIvdXNlcjpwdw==");
}
