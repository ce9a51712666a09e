//! End-to-end tests against a live axum server.
//!
//! # Design
//! Each test starts a server on a random port, then exercises the core over
//! real HTTP through `ReqwestTransport`. The seeded mock backend covers the
//! fleet endpoints; a small ad hoc router covers the pipeline edge cases
//! (204, plain text, HTML error pages, slow responses).

use std::net::SocketAddr;
use std::time::Duration;

use axum::{http::StatusCode, routing::get, Router};
use fleet_core::{
    BusListing, ClientConfig, Completion, ErrorKind, ErrorPayload, FleetApi, FleetDirectory,
    HttpMethod, LoadPhase, PaginationControl, Pipeline, ReqwestTransport, RequestError,
    ResponseBody, WindowEntry,
};
use mock_server::{app, app_with, seed_fleet, ListingStyle};
use serde_json::json;

/// Serve `router` on a random local port.
async fn spawn(router: Router) -> SocketAddr {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(mock_server::run_with(listener, router));
    addr
}

fn config(addr: SocketAddr) -> ClientConfig {
    ClientConfig::with_base_url(&format!("http://{addr}"))
}

fn edge_cases() -> Router {
    Router::new()
        .route("/empty", get(|| async { StatusCode::NO_CONTENT }))
        .route("/text", get(|| async { "pong" }))
        .route(
            "/boom",
            get(|| async { (StatusCode::INTERNAL_SERVER_ERROR, "<html>oops</html>") }),
        )
        .route("/bare-error", get(|| async { StatusCode::SERVICE_UNAVAILABLE }))
        .route(
            "/slow",
            get(|| async {
                tokio::time::sleep(Duration::from_secs(5)).await;
                "late"
            }),
        )
}

#[tokio::test]
async fn paginated_walk_through_the_fleet() {
    let addr = spawn(app()).await;
    let api = FleetApi::connect(&config(addr));

    let first = api.list_page(0, 5).await.unwrap();
    assert_eq!(first.records.len(), 5);
    assert_eq!(first.records[0].id, 1);
    assert_eq!(first.metadata.total_elements, 23);
    assert_eq!(first.metadata.total_pages, 5);
    assert!(first.metadata.is_first);

    let control = PaginationControl::for_page(&first.metadata).unwrap();
    assert_eq!(control.window, (0..5).map(WindowEntry::Page).collect::<Vec<_>>());
    assert_eq!(control.range.to_string(), "Showing 1–5 of 23");

    let second = api.list_page(1, 5).await.unwrap();
    let range = PaginationControl::for_page(&second.metadata).unwrap().range;
    assert_eq!((range.start, range.end), (6, 10));

    let last = api.list_page(4, 5).await.unwrap();
    assert_eq!(last.records.len(), 3);
    assert!(last.metadata.is_last);
}

#[tokio::test]
async fn small_pages_collapse_the_window() {
    let addr = spawn(app()).await;
    let api = FleetApi::connect(&config(addr));

    let page = api.list_page(11, 2).await.unwrap();
    assert_eq!(page.metadata.total_pages, 12);
    let control = PaginationControl::for_page(&page.metadata).unwrap();
    assert_eq!(control.window.len(), 7);
    assert!(!control.has_next);
}

#[tokio::test]
async fn page_past_the_end_is_rejected() {
    let addr = spawn(app()).await;
    let api = FleetApi::connect(&config(addr));

    let err = api.list_page(10, 5).await.unwrap_err();
    assert!(matches!(err, RequestError::UnexpectedShape { status: 200, .. }));
}

#[tokio::test]
async fn get_bus_and_not_found() {
    let addr = spawn(app()).await;
    let api = FleetApi::connect(&config(addr));

    let bus = api.get_bus(8).await.unwrap();
    assert_eq!(bus.bus_number, 108);
    assert!(!bus.is_active);

    let err = api.get_bus(999).await.unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Application);
    assert_eq!(err.status(), Some(404));
    assert_eq!(err.payload(), Some(ErrorPayload::Json(json!({"error": "not found"}))));
}

#[tokio::test]
async fn listing_in_both_shapes() {
    let bare = spawn(app()).await;
    let listing = FleetApi::connect(&config(bare)).list_buses().await.unwrap();
    assert!(matches!(listing, BusListing::Bare(_)));
    assert_eq!(listing.buses().len(), 23);

    let wrapped = spawn(app_with(seed_fleet(), ListingStyle::Wrapped)).await;
    let listing = FleetApi::connect(&config(wrapped)).list_buses().await.unwrap();
    assert!(matches!(listing, BusListing::Wrapped { total: 23, .. }));
}

#[tokio::test]
async fn no_content_resolves_empty() {
    let addr = spawn(edge_cases()).await;
    let pipeline = Pipeline::new(&config(addr), ReqwestTransport::new());

    let body = pipeline.execute("/empty", HttpMethod::Get, None).await.unwrap();
    assert_eq!(body, ResponseBody::Empty);
}

#[tokio::test]
async fn plain_text_success_is_returned_raw() {
    let addr = spawn(edge_cases()).await;
    let pipeline = Pipeline::new(&config(addr), ReqwestTransport::new());

    let body = pipeline.execute("/text", HttpMethod::Get, None).await.unwrap();
    assert_eq!(body, ResponseBody::Text("pong".to_string()));
}

#[tokio::test]
async fn html_error_keeps_raw_text_payload() {
    let addr = spawn(edge_cases()).await;
    let pipeline = Pipeline::new(&config(addr), ReqwestTransport::new());

    let err = pipeline.execute("/boom", HttpMethod::Get, None).await.unwrap_err();
    assert_eq!(err.status(), Some(500));
    assert_eq!(err.message(), "<html>oops</html>");
    assert_eq!(err.payload(), Some(ErrorPayload::Text("<html>oops</html>".to_string())));
}

#[tokio::test]
async fn empty_error_body_uses_status_text() {
    let addr = spawn(edge_cases()).await;
    let pipeline = Pipeline::new(&config(addr), ReqwestTransport::new());

    let err = pipeline.execute("/bare-error", HttpMethod::Get, None).await.unwrap_err();
    assert_eq!(err.status(), Some(503));
    assert_eq!(err.message(), "Service Unavailable");
}

#[tokio::test]
async fn slow_response_times_out() {
    let addr = spawn(edge_cases()).await;
    let pipeline = Pipeline::new(&config(addr), ReqwestTransport::new());

    let started = std::time::Instant::now();
    let err = pipeline
        .execute_with_timeout("/slow", HttpMethod::Get, None, Duration::from_millis(100))
        .await
        .unwrap_err();
    assert!(matches!(err, RequestError::Timeout { timeout_ms: 100 }));
    assert_eq!(err.kind(), ErrorKind::Transport);
    assert!(started.elapsed() < Duration::from_secs(2));
}

#[tokio::test]
async fn refused_connection_is_a_transport_error() {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);

    let err = FleetApi::connect(&config(addr)).get_bus(1).await.unwrap_err();
    assert!(matches!(err, RequestError::Transport { .. }));
    assert_eq!(err.status(), None);
}

#[tokio::test]
async fn directory_against_live_backend() {
    let addr = spawn(app()).await;
    let directory = FleetDirectory::new(FleetApi::connect(&config(addr)), 5);

    assert_eq!(directory.go_to_page(2).await, Completion::Applied);
    let snapshot = directory.snapshot();
    assert_eq!(snapshot.phase(), LoadPhase::Idle);
    let view = snapshot.view().unwrap();
    assert_eq!(view.records[0].id, 11);
    assert_eq!(view.control.as_ref().unwrap().current_page, 2);

    let stats = directory.fleet_stats().await.unwrap();
    assert_eq!((stats.total, stats.active, stats.inactive), (23, 18, 5));
}
