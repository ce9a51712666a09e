//! Domain DTOs for the fleet API.
//!
//! # Design
//! These types mirror the backend's wire schema (camelCase JSON) but are
//! defined independently from the mock-server crate; integration tests catch
//! any drift between the two. Records are immutable once fetched and are
//! replaced wholesale on every refetch.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// A single bus as returned by the API.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct BusRecord {
    pub id: i64,
    pub bus_number: i64,
    pub license_plate: String,
    pub brand: String,
    #[serde(default)]
    pub characteristics: String,
    pub is_active: bool,
    /// ISO-8601 creation timestamp, kept exactly as the server sent it.
    pub created_at: String,
}

/// Pagination metadata for one fetched page. Page indices are zero-based.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageMetadata {
    pub page: u32,
    pub total_pages: u32,
    pub total_elements: u64,
    pub page_size: u32,
    pub is_first: bool,
    pub is_last: bool,
}

impl PageMetadata {
    /// Check the relations between the fields. An empty result set is exempt
    /// from the page-index checks because servers disagree on how to flag it.
    pub fn validate(&self) -> Result<(), String> {
        if self.page_size == 0 {
            return Err("page size must be positive".to_string());
        }
        if self.total_elements == 0 {
            return Ok(());
        }
        let expected_pages = self.total_elements.div_ceil(u64::from(self.page_size));
        if u64::from(self.total_pages) != expected_pages {
            return Err(format!(
                "totalPages is {} but {} elements at size {} need {}",
                self.total_pages, self.total_elements, self.page_size, expected_pages
            ));
        }
        if self.page >= self.total_pages {
            return Err(format!(
                "page {} is out of range for {} pages",
                self.page, self.total_pages
            ));
        }
        if self.is_first != (self.page == 0) {
            return Err(format!("first flag {} disagrees with page {}", self.is_first, self.page));
        }
        if self.is_last != (self.page + 1 == self.total_pages) {
            return Err(format!(
                "last flag {} disagrees with page {} of {}",
                self.is_last, self.page, self.total_pages
            ));
        }
        Ok(())
    }

    pub fn has_previous(&self) -> bool {
        !self.is_first && self.total_elements > 0
    }

    pub fn has_next(&self) -> bool {
        !self.is_last && self.total_elements > 0
    }
}

/// Spring-style page envelope. Unknown fields (`numberOfElements`,
/// `pageable`, `sort`, ...) are ignored.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct PageEnvelope {
    pub content: Vec<BusRecord>,
    pub total_elements: u64,
    pub total_pages: u32,
    pub number: u32,
    pub size: u32,
    pub first: bool,
    pub last: bool,
}

impl PageEnvelope {
    pub fn metadata(&self) -> PageMetadata {
        PageMetadata {
            page: self.number,
            total_pages: self.total_pages,
            total_elements: self.total_elements,
            page_size: self.size,
            is_first: self.first,
            is_last: self.last,
        }
    }
}

/// One page of buses with its metadata.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BusPage {
    pub records: Vec<BusRecord>,
    pub metadata: PageMetadata,
}

impl TryFrom<PageEnvelope> for BusPage {
    type Error = String;

    fn try_from(envelope: PageEnvelope) -> Result<Self, Self::Error> {
        let metadata = envelope.metadata();
        metadata.validate()?;
        Ok(BusPage {
            records: envelope.content,
            metadata,
        })
    }
}

/// The unpaginated listing, which the backend sends in one of two shapes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BusListing {
    /// A raw JSON array of buses.
    Bare(Vec<BusRecord>),
    /// `{ "buses": [...], "total": n }`.
    Wrapped { buses: Vec<BusRecord>, total: u64 },
}

impl BusListing {
    /// Decode a listing from JSON, rejecting anything that is neither an
    /// array nor an object with a `buses` array.
    pub fn from_value(value: Value) -> Result<Self, String> {
        match value {
            Value::Array(_) => serde_json::from_value(value)
                .map(BusListing::Bare)
                .map_err(|e| format!("invalid bus in array: {e}")),
            Value::Object(mut map) => {
                let buses = match map.remove("buses") {
                    Some(buses @ Value::Array(_)) => serde_json::from_value::<Vec<BusRecord>>(buses)
                        .map_err(|e| format!("invalid bus in `buses`: {e}"))?,
                    Some(_) => return Err("`buses` is not an array".to_string()),
                    None => return Err("object has no `buses` field".to_string()),
                };
                let total = match map.get("total") {
                    Some(total) => total
                        .as_u64()
                        .ok_or_else(|| "`total` is not a non-negative integer".to_string())?,
                    None => buses.len() as u64,
                };
                Ok(BusListing::Wrapped { buses, total })
            }
            other => Err(format!("expected array or object, got {}", json_type_name(&other))),
        }
    }

    pub fn buses(&self) -> &[BusRecord] {
        match self {
            BusListing::Bare(buses) | BusListing::Wrapped { buses, .. } => buses,
        }
    }

    /// Total reported by the server, or the array length for bare listings.
    pub fn total(&self) -> u64 {
        match self {
            BusListing::Bare(buses) => buses.len() as u64,
            BusListing::Wrapped { total, .. } => *total,
        }
    }

    pub fn into_buses(self) -> Vec<BusRecord> {
        match self {
            BusListing::Bare(buses) | BusListing::Wrapped { buses, .. } => buses,
        }
    }
}

fn json_type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

/// Successful outcome of a pipeline call.
#[derive(Debug, Clone, PartialEq)]
pub enum ResponseBody {
    /// 204 or a zero-length body.
    Empty,
    Json(Value),
    Text(String),
}

/// Active/inactive/total counts over a set of records.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FleetStats {
    pub total: usize,
    pub active: usize,
    pub inactive: usize,
}

impl FleetStats {
    pub fn from_records(records: &[BusRecord]) -> Self {
        let active = records.iter().filter(|bus| bus.is_active).count();
        FleetStats {
            total: records.len(),
            active,
            inactive: records.len() - active,
        }
    }
}

/// Client-side filter on the active flag.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum BusFilter {
    #[default]
    All,
    Active,
    Inactive,
}

impl BusFilter {
    pub fn matches(&self, bus: &BusRecord) -> bool {
        match self {
            BusFilter::All => true,
            BusFilter::Active => bus.is_active,
            BusFilter::Inactive => !bus.is_active,
        }
    }

    pub fn apply<'a>(&self, records: &'a [BusRecord]) -> Vec<&'a BusRecord> {
        records.iter().filter(|bus| self.matches(bus)).collect()
    }
}

impl FromStr for BusFilter {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "all" => Ok(BusFilter::All),
            "active" => Ok(BusFilter::Active),
            "inactive" => Ok(BusFilter::Inactive),
            other => Err(format!("unknown filter `{other}` (expected all, active or inactive)")),
        }
    }
}

impl fmt::Display for BusFilter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            BusFilter::All => "all",
            BusFilter::Active => "active",
            BusFilter::Inactive => "inactive",
        })
    }
}
