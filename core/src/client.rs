//! Stateless HTTP request builder and response parser for the fleet API.
//!
//! # Design
//! `BusClient` holds only a `base_url` and carries no mutable state between
//! calls. Each endpoint is split into a `build_*` method that produces an
//! `HttpRequest` and a `parse_*` method that consumes an `HttpResponse`.
//! Whoever executes the round-trip in between (normally `FleetApi` through
//! the pipeline) keeps this type free of I/O.

use serde::de::DeserializeOwned;
use serde_json::Value;

use crate::error::RequestError;
use crate::http::{HttpMethod, HttpRequest, HttpResponse};
use crate::pipeline::{interpret_response, join_url};
use crate::types::{BusListing, BusPage, BusRecord, PageEnvelope, ResponseBody};

pub const BUSES_ENDPOINT: &str = "/api/v1/buses";

#[derive(Debug, Clone)]
pub struct BusClient {
    base_url: String,
}

impl BusClient {
    pub fn new(base_url: &str) -> Self {
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn build_list_buses(&self) -> HttpRequest {
        self.get(BUSES_ENDPOINT.to_string())
    }

    /// `page` is zero-based, as on the wire.
    pub fn build_list_page(&self, page: u32, size: u32) -> HttpRequest {
        self.get(format!("{BUSES_ENDPOINT}?paginated=true&page={page}&size={size}"))
    }

    pub fn build_get_bus(&self, id: i64) -> HttpRequest {
        self.get(format!("{BUSES_ENDPOINT}/{id}"))
    }

    pub fn parse_list_buses(&self, response: HttpResponse) -> Result<BusListing, RequestError> {
        let (status, value) = expect_json(response)?;
        BusListing::from_value(value.clone()).map_err(|message| RequestError::UnexpectedShape {
            message,
            status,
            payload: value,
        })
    }

    pub fn parse_list_page(&self, response: HttpResponse) -> Result<BusPage, RequestError> {
        let (status, value) = expect_json(response)?;
        let envelope: PageEnvelope = decode_shape(status, value.clone())?;
        BusPage::try_from(envelope).map_err(|message| RequestError::UnexpectedShape {
            message: format!("inconsistent page metadata: {message}"),
            status,
            payload: value,
        })
    }

    pub fn parse_get_bus(&self, response: HttpResponse) -> Result<BusRecord, RequestError> {
        let (status, value) = expect_json(response)?;
        decode_shape(status, value)
    }

    fn get(&self, endpoint: String) -> HttpRequest {
        HttpRequest {
            method: HttpMethod::Get,
            url: join_url(&self.base_url, &endpoint),
            headers: vec![("accept".to_string(), "application/json".to_string())],
            body: None,
        }
    }
}

/// Run the shared interpretation and insist on a JSON body.
fn expect_json(response: HttpResponse) -> Result<(u16, Value), RequestError> {
    let status = response.status;
    match interpret_response(response)? {
        ResponseBody::Json(value) => Ok((status, value)),
        ResponseBody::Empty => Err(RequestError::Decode {
            message: "expected a JSON body, got an empty response".to_string(),
            status,
        }),
        ResponseBody::Text(_) => Err(RequestError::Decode {
            message: "expected a JSON body, got a non-JSON content type".to_string(),
            status,
        }),
    }
}

fn decode_shape<T: DeserializeOwned>(status: u16, value: Value) -> Result<T, RequestError> {
    serde_json::from_value(value.clone()).map_err(|e| RequestError::UnexpectedShape {
        message: e.to_string(),
        status,
        payload: value,
    })
}
