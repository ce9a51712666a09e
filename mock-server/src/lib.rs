use std::sync::Arc;

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::get,
    Json, Router,
};
use serde::{Deserialize, Serialize};
use serde_json::json;
use tokio::net::TcpListener;

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Bus {
    pub id: i64,
    pub bus_number: i64,
    pub license_plate: String,
    pub brand: String,
    pub characteristics: String,
    pub is_active: bool,
    pub created_at: String,
}

/// Shape of the unpaginated listing.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ListingStyle {
    /// A raw JSON array.
    Bare,
    /// `{ "buses": [...], "total": n }`.
    Wrapped,
}

#[derive(Debug, Deserialize)]
pub struct ListQuery {
    #[serde(default)]
    pub paginated: bool,
    #[serde(default)]
    pub page: u32,
    #[serde(default = "default_size")]
    pub size: u32,
}

fn default_size() -> u32 {
    10
}

/// Spring-style page envelope.
#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PageEnvelope {
    pub content: Vec<Bus>,
    pub total_elements: u64,
    pub total_pages: u32,
    pub number: u32,
    pub size: u32,
    pub first: bool,
    pub last: bool,
    pub number_of_elements: u32,
    pub empty: bool,
}

impl PageEnvelope {
    pub fn slice(buses: &[Bus], page: u32, size: u32) -> Self {
        let total = buses.len() as u64;
        let total_pages = total.div_ceil(u64::from(size)) as u32;
        let start = (page as usize).saturating_mul(size as usize).min(buses.len());
        let end = start.saturating_add(size as usize).min(buses.len());
        let content = buses[start..end].to_vec();
        Self {
            number_of_elements: content.len() as u32,
            empty: content.is_empty(),
            content,
            total_elements: total,
            total_pages,
            number: page,
            size,
            first: page == 0,
            last: page.saturating_add(1) >= total_pages,
        }
    }
}

pub struct Fleet {
    pub buses: Vec<Bus>,
    pub style: ListingStyle,
}

pub type Db = Arc<Fleet>;

/// Router over the seeded fleet with bare-array listings.
pub fn app() -> Router {
    app_with(seed_fleet(), ListingStyle::Bare)
}

pub fn app_with(buses: Vec<Bus>, style: ListingStyle) -> Router {
    let db: Db = Arc::new(Fleet { buses, style });
    Router::new()
        .route("/api/v1/buses", get(list_buses))
        .route("/api/v1/buses/{id}", get(get_bus))
        .with_state(db)
}

pub async fn run(listener: TcpListener) -> Result<(), std::io::Error> {
    axum::serve(listener, app()).await
}

pub async fn run_with(listener: TcpListener, router: Router) -> Result<(), std::io::Error> {
    axum::serve(listener, router).await
}

/// Twenty-three buses; every fourth one is out of service.
pub fn seed_fleet() -> Vec<Bus> {
    const BRANDS: [&str; 4] = ["Mercedes-Benz", "Volvo", "Scania", "MAN"];
    const TRAITS: [&str; 3] = [
        "Low floor, air conditioning",
        "Articulated, 150 passengers",
        "Electric, USB charging",
    ];
    (1..=23)
        .map(|id: i64| Bus {
            id,
            bus_number: 100 + id,
            license_plate: format!("BUS-{:03}", id * 7),
            brand: BRANDS[(id as usize) % BRANDS.len()].to_string(),
            characteristics: TRAITS[(id as usize) % TRAITS.len()].to_string(),
            is_active: id % 4 != 0,
            created_at: format!("2024-01-{:02}T08:30:00", id),
        })
        .collect()
}

async fn list_buses(State(db): State<Db>, Query(query): Query<ListQuery>) -> Response {
    if query.paginated {
        if query.size == 0 {
            return (
                StatusCode::BAD_REQUEST,
                Json(json!({"error": "size must be greater than zero"})),
            )
                .into_response();
        }
        tracing::debug!(page = query.page, size = query.size, "Serving page");
        return Json(PageEnvelope::slice(&db.buses, query.page, query.size)).into_response();
    }
    match db.style {
        ListingStyle::Bare => Json(db.buses.clone()).into_response(),
        ListingStyle::Wrapped => Json(json!({
            "buses": db.buses,
            "total": db.buses.len(),
        }))
        .into_response(),
    }
}

async fn get_bus(State(db): State<Db>, Path(id): Path<i64>) -> Response {
    match db.buses.iter().find(|bus| bus.id == id) {
        Some(bus) => Json(bus.clone()).into_response(),
        None => (StatusCode::NOT_FOUND, Json(json!({"error": "not found"}))).into_response(),
    }
}
