//! Typed async access to the fleet endpoints.
//!
//! `FleetApi` pairs the pure `BusClient` with a `Pipeline`: build the
//! request, dispatch it under the timeout, parse the response.

use crate::client::BusClient;
use crate::config::ClientConfig;
use crate::error::RequestError;
use crate::pipeline::Pipeline;
use crate::transport::{ReqwestTransport, Transport};
use crate::types::{BusListing, BusPage, BusRecord};

#[derive(Debug, Clone)]
pub struct FleetApi<T> {
    client: BusClient,
    pipeline: Pipeline<T>,
}

impl FleetApi<ReqwestTransport> {
    /// API over a fresh reqwest client.
    pub fn connect(config: &ClientConfig) -> Self {
        Self::new(config, ReqwestTransport::new())
    }
}

impl<T: Transport> FleetApi<T> {
    pub fn new(config: &ClientConfig, transport: T) -> Self {
        Self {
            client: BusClient::new(&config.base_url),
            pipeline: Pipeline::new(config, transport),
        }
    }

    pub fn pipeline(&self) -> &Pipeline<T> {
        &self.pipeline
    }

    pub async fn list_buses(&self) -> Result<BusListing, RequestError> {
        let response = self.pipeline.dispatch(self.client.build_list_buses()).await?;
        self.client.parse_list_buses(response)
    }

    pub async fn list_page(&self, page: u32, size: u32) -> Result<BusPage, RequestError> {
        let response = self
            .pipeline
            .dispatch(self.client.build_list_page(page, size))
            .await?;
        self.client.parse_list_page(response)
    }

    pub async fn get_bus(&self, id: i64) -> Result<BusRecord, RequestError> {
        let response = self.pipeline.dispatch(self.client.build_get_bus(id)).await?;
        self.client.parse_get_bus(response)
    }
}
