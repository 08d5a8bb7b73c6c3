use std::collections::HashMap;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use axum::extract::Query;
use axum::http::{HeaderMap, StatusCode};
use axum::response::IntoResponse;
use axum::routing::get;
use axum::{Json, Router};
use pretty_assertions::assert_eq;
use serde_json::json;

use crate::client::DataConnectorClient;
use crate::error::DataConnectorError;
use crate::models::ODataQuery;

const AUTH: &str = "Basic ZGIvdXNlcjpwdw==";

async fn spawn<F>(build: F) -> String
where
    F: FnOnce(String) -> Router,
{
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let base = format!("http://{}", listener.local_addr().unwrap());
    let router = build(base.clone());
    tokio::spawn(async move {
        axum::serve(listener, router).await.unwrap();
    });
    base
}

fn client() -> DataConnectorClient {
    DataConnectorClient::new(Duration::from_secs(5)).unwrap()
}

fn kpi_query() -> ODataQuery {
    ODataQuery::new("VehicleKpi_Daily", ["DateTime", "SerialNo", "Distance_Km"])
        .with_filter("DateTime ge 2024-01-01T00:00:00Z")
}

#[tokio::test]
async fn follows_next_links_and_sends_query_options_once() {
    let base = spawn(|base| {
        Router::new().route(
            "/VehicleKpi_Daily",
            get(
                move |Query(params): Query<HashMap<String, String>>,
                      headers: HeaderMap| {
                    let base = base.clone();
                    async move {
                        assert_eq!(headers["authorization"], AUTH);
                        if params.get("page").map(String::as_str) == Some("2") {
                            assert!(!params.contains_key("$select"));
                            return Json(json!({
                                "value": [{ "SerialNo": "S3", "Distance_Km": 3.0 }]
                            }));
                        }
                        assert_eq!(params["$select"], "DateTime,SerialNo,Distance_Km");
                        assert_eq!(params["$top"], "1000");
                        assert_eq!(params["$filter"], "DateTime ge 2024-01-01T00:00:00Z");
                        Json(json!({
                            "value": [
                                { "SerialNo": "S1", "Distance_Km": 1.0 },
                                { "SerialNo": "S2", "Distance_Km": 2.0 },
                            ],
                            "@odata.nextLink": format!("{base}/VehicleKpi_Daily?page=2"),
                        }))
                    }
                },
            ),
        )
    })
    .await;

    let rows = client().query(&base, AUTH, &kpi_query()).await.unwrap();

    let serials: Vec<_> = rows.iter().map(|r| r["SerialNo"].clone()).collect();
    assert_eq!(serials, vec![json!("S1"), json!("S2"), json!("S3")]);
}

#[tokio::test]
async fn pagination_stops_at_row_cap() {
    let calls = Arc::new(AtomicUsize::new(0));
    let counter = calls.clone();
    let base = spawn(move |base| {
        Router::new().route(
            "/VehicleKpi_Daily",
            get(move || {
                let base = base.clone();
                let counter = counter.clone();
                async move {
                    counter.fetch_add(1, Ordering::SeqCst);
                    Json(json!({
                        "value": [{ "SerialNo": "S1" }, { "SerialNo": "S2" }],
                        "@odata.nextLink": format!("{base}/VehicleKpi_Daily?more=1"),
                    }))
                }
            }),
        )
    })
    .await;

    let rows = client()
        .with_limits(2, 5)
        .query(&base, AUTH, &kpi_query())
        .await
        .unwrap();

    assert_eq!(rows.len(), 5);
    assert_eq!(calls.load(Ordering::SeqCst), 3);
}

#[tokio::test]
async fn non_success_status_reports_status_table_host_and_truncated_body() {
    let base = spawn(|_| {
        Router::new().route(
            "/VehicleKpi_Daily",
            get(|| async { (StatusCode::INTERNAL_SERVER_ERROR, "x".repeat(1000)) }),
        )
    })
    .await;

    let err = client().query(&base, AUTH, &kpi_query()).await.unwrap_err();

    match err {
        DataConnectorError::Status {
            status,
            body,
            table,
            host,
        } => {
            assert_eq!(status, 500);
            assert_eq!(body.len(), 300);
            assert_eq!(table, "VehicleKpi_Daily");
            assert_eq!(host, "127.0.0.1");
        }
        other => panic!("unexpected error: {other:?}"),
    }
}

#[tokio::test]
async fn empty_base_url_is_rejected_before_any_request() {
    let err = client()
        .query_with_fallback("", AUTH, &kpi_query())
        .await
        .unwrap_err();
    assert!(matches!(err, DataConnectorError::EmptyBaseUrl));
}

fn forbidden_router(_: String) -> Router {
    Router::new().route(
        "/VehicleKpi_Daily",
        get(|| async { (StatusCode::FORBIDDEN, "not authorised on this host").into_response() }),
    )
}

#[tokio::test]
async fn forbidden_on_first_host_falls_back_to_the_next() {
    let primary = spawn(forbidden_router).await;
    let fallback = spawn(|_| {
        Router::new().route(
            "/VehicleKpi_Daily",
            get(|| async {
                Json(json!({ "value": [{ "SerialNo": "FALLBACK", "Distance_Km": 7.5 }] }))
            }),
        )
    })
    .await;

    let rows = client()
        .query_candidates(&[primary, fallback], AUTH, &kpi_query())
        .await
        .unwrap();

    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0]["SerialNo"], "FALLBACK");
}

#[tokio::test]
async fn forbidden_on_last_host_is_surfaced() {
    let first = spawn(forbidden_router).await;
    let second = spawn(forbidden_router).await;

    let err = client()
        .query_candidates(&[first, second], AUTH, &kpi_query())
        .await
        .unwrap_err();

    assert!(err.is_forbidden());
}

#[tokio::test]
async fn other_failures_do_not_fall_back() {
    let fallback_calls = Arc::new(AtomicUsize::new(0));
    let counter = fallback_calls.clone();

    let primary = spawn(|_| {
        Router::new().route(
            "/VehicleKpi_Daily",
            get(|| async { (StatusCode::UNAUTHORIZED, "bad credentials") }),
        )
    })
    .await;
    let fallback = spawn(move |_| {
        Router::new().route(
            "/VehicleKpi_Daily",
            get(move || {
                let counter = counter.clone();
                async move {
                    counter.fetch_add(1, Ordering::SeqCst);
                    Json(json!({ "value": [] }))
                }
            }),
        )
    })
    .await;

    let err = client()
        .query_candidates(&[primary, fallback], AUTH, &kpi_query())
        .await
        .unwrap_err();

    assert!(matches!(err, DataConnectorError::Status { status: 401, .. }));
    assert_eq!(fallback_calls.load(Ordering::SeqCst), 0);
}
