use axum::http::{Request, StatusCode};
use http_body_util::BodyExt;
use mock_server::{app, app_with, seed_fleet, Bus, ListingStyle, PageEnvelope};
use serde_json::Value;
use tower::ServiceExt;

async fn body_json<T: serde::de::DeserializeOwned>(response: axum::response::Response) -> T {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&bytes).unwrap()
}

fn get(uri: &str) -> Request<String> {
    Request::builder().uri(uri).body(String::new()).unwrap()
}

// --- unpaginated listing ---

#[tokio::test]
async fn list_buses_bare_array() {
    let resp = app().oneshot(get("/api/v1/buses")).await.unwrap();

    assert_eq!(resp.status(), StatusCode::OK);
    let buses: Vec<Bus> = body_json(resp).await;
    assert_eq!(buses.len(), 23);
}

#[tokio::test]
async fn list_buses_wrapped_object() {
    let resp = app_with(seed_fleet(), ListingStyle::Wrapped)
        .oneshot(get("/api/v1/buses"))
        .await
        .unwrap();

    assert_eq!(resp.status(), StatusCode::OK);
    let body: Value = body_json(resp).await;
    assert_eq!(body["total"], 23);
    assert_eq!(body["buses"].as_array().unwrap().len(), 23);
}

#[tokio::test]
async fn list_buses_json_content_type() {
    let resp = app().oneshot(get("/api/v1/buses")).await.unwrap();
    let content_type = resp.headers()["content-type"].to_str().unwrap();
    assert_eq!(content_type, "application/json");
}

// --- paginated listing ---

#[tokio::test]
async fn paginated_first_page() {
    let resp = app()
        .oneshot(get("/api/v1/buses?paginated=true&page=0&size=5"))
        .await
        .unwrap();

    assert_eq!(resp.status(), StatusCode::OK);
    let page: PageEnvelope = body_json(resp).await;
    assert_eq!(page.content.len(), 5);
    assert_eq!(page.total_elements, 23);
    assert_eq!(page.total_pages, 5);
    assert_eq!(page.number, 0);
    assert!(page.first);
    assert!(!page.last);
}

#[tokio::test]
async fn paginated_envelope_uses_camel_case() {
    let resp = app()
        .oneshot(get("/api/v1/buses?paginated=true&page=4&size=5"))
        .await
        .unwrap();

    let body: Value = body_json(resp).await;
    assert_eq!(body["totalElements"], 23);
    assert_eq!(body["totalPages"], 5);
    assert_eq!(body["numberOfElements"], 3);
    assert_eq!(body["last"], true);
}

#[tokio::test]
async fn paginated_zero_size_returns_400() {
    let resp = app()
        .oneshot(get("/api/v1/buses?paginated=true&page=0&size=0"))
        .await
        .unwrap();

    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn paginated_bad_page_returns_400() {
    let resp = app()
        .oneshot(get("/api/v1/buses?paginated=true&page=minus-one&size=5"))
        .await
        .unwrap();

    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
}

// --- single bus ---

#[tokio::test]
async fn get_bus_found() {
    let resp = app().oneshot(get("/api/v1/buses/4")).await.unwrap();

    assert_eq!(resp.status(), StatusCode::OK);
    let bus: Bus = body_json(resp).await;
    assert_eq!(bus.id, 4);
    assert!(!bus.is_active);
}

#[tokio::test]
async fn get_bus_not_found_has_error_body() {
    let resp = app().oneshot(get("/api/v1/buses/999")).await.unwrap();

    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
    let body: Value = body_json(resp).await;
    assert_eq!(body, serde_json::json!({"error": "not found"}));
}

#[tokio::test]
async fn get_bus_bad_id_returns_400() {
    let resp = app().oneshot(get("/api/v1/buses/not-a-number")).await.unwrap();

    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
}
