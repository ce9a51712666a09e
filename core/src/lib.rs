//! API client core for the bus fleet service.
//!
//! # Overview
//! Two independent pieces and the glue between them:
//! - the request pipeline (`pipeline`, `client`, `transport`): builds
//!   requests, runs them under a timeout, and normalizes every failure into
//!   one `RequestError`;
//! - the pagination calculator (`pagination`): pure window and range math;
//! - `directory`, which loads pages through the pipeline and feeds their
//!   metadata to the calculator, applying only the latest request's result.
//!
//! # Design
//! - `BusClient` is stateless and does no I/O: `build_*` produces an
//!   `HttpRequest`, `parse_*` consumes an `HttpResponse`.
//! - The network sits behind the `Transport` trait; `ReqwestTransport` is
//!   the production implementation, tests substitute their own.
//! - Configuration is an explicit `ClientConfig` value injected at
//!   construction.
//! - DTOs are defined independently from the mock-server crate; integration
//!   tests catch schema drift.

pub mod api;
pub mod client;
pub mod config;
pub mod directory;
pub mod error;
pub mod http;
pub mod pagination;
pub mod pipeline;
pub mod transport;
pub mod types;

pub use api::FleetApi;
pub use client::BusClient;
pub use config::{ClientConfig, ConfigError};
pub use directory::{Completion, DirectoryState, FleetDirectory, LoadPhase, PageQuery, PageView};
pub use error::{ErrorKind, ErrorPayload, RequestError};
pub use http::{HttpMethod, HttpRequest, HttpResponse};
pub use pagination::{compute_window, page_range, EllipsisSlot, PageRange, PaginationControl, WindowEntry};
pub use pipeline::{interpret_response, Pipeline};
pub use transport::{ReqwestTransport, Transport, TransportFailure};
pub use types::{BusFilter, BusListing, BusPage, BusRecord, FleetStats, PageEnvelope, PageMetadata, ResponseBody};
