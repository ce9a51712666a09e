//! The request pipeline: endpoint → `HttpRequest` → transport under a
//! timeout → `ResponseBody` or `RequestError`.
//!
//! # Design
//! `Pipeline` owns the injected configuration (base URL, timeout) and a
//! `Transport`. Each call races the transport against a tokio timer. When
//! the timer wins, the in-flight transport future is dropped, which aborts
//! the call; when the call wins, the timer is dropped with it. Either way
//! nothing outlives the call. Response interpretation is a pure function,
//! `interpret_response`, so it can be tested without a network.
//!
//! There is no retry at this layer. A failed call is terminal and the
//! caller decides whether to re-issue it.

use std::time::{Duration, Instant};

use serde::Serialize;
use serde_json::Value;
use uuid::Uuid;

use crate::config::ClientConfig;
use crate::error::{ErrorPayload, RequestError};
use crate::http::{HttpMethod, HttpRequest, HttpResponse};
use crate::transport::Transport;
use crate::types::ResponseBody;

pub const REQUEST_ID_HEADER: &str = "x-request-id";

#[derive(Debug, Clone)]
pub struct Pipeline<T> {
    base_url: String,
    timeout: Duration,
    transport: T,
}

impl<T: Transport> Pipeline<T> {
    pub fn new(config: &ClientConfig, transport: T) -> Self {
        Self {
            base_url: config.base_url.trim_end_matches('/').to_string(),
            timeout: config.timeout(),
            transport,
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    /// Join a relative endpoint onto the base URL.
    pub fn url_for(&self, endpoint: &str) -> String {
        join_url(&self.base_url, endpoint)
    }

    /// Run a call with the configured timeout.
    pub async fn execute(
        &self,
        endpoint: &str,
        method: HttpMethod,
        body: Option<&Value>,
    ) -> Result<ResponseBody, RequestError> {
        self.execute_with_timeout(endpoint, method, body, self.timeout)
            .await
    }

    pub async fn execute_with_timeout(
        &self,
        endpoint: &str,
        method: HttpMethod,
        body: Option<&Value>,
        timeout: Duration,
    ) -> Result<ResponseBody, RequestError> {
        let request = build_request(&self.base_url, endpoint, method, body)?;
        let response = self.dispatch_with_timeout(request, timeout).await?;
        interpret_response(response)
    }

    /// Send a pre-built request and return the raw response. Non-2xx
    /// statuses are returned as data; only transport failures and timeouts
    /// are errors here.
    pub async fn dispatch(&self, request: HttpRequest) -> Result<HttpResponse, RequestError> {
        self.dispatch_with_timeout(request, self.timeout).await
    }

    pub async fn dispatch_with_timeout(
        &self,
        mut request: HttpRequest,
        timeout: Duration,
    ) -> Result<HttpResponse, RequestError> {
        let request_id = match request.header(REQUEST_ID_HEADER) {
            Some(id) => id.to_string(),
            None => {
                let id = Uuid::new_v4().to_string();
                request
                    .headers
                    .push((REQUEST_ID_HEADER.to_string(), id.clone()));
                id
            }
        };
        let method = request.method;
        let url = request.url.clone();
        let timeout_ms = timeout.as_millis() as u64;

        tracing::debug!(request_id = %request_id, method = %method, url = %url, timeout_ms, "Dispatching request");
        let started = Instant::now();

        let outcome = tokio::time::timeout(timeout, self.transport.send(request)).await;
        let elapsed_ms = started.elapsed().as_millis() as u64;

        match outcome {
            Ok(Ok(response)) => {
                tracing::debug!(
                    request_id = %request_id,
                    status = response.status,
                    elapsed_ms,
                    "Response received"
                );
                Ok(response)
            }
            Ok(Err(failure)) => {
                tracing::warn!(request_id = %request_id, url = %url, error = %failure, elapsed_ms, "Transport failure");
                Err(RequestError::Transport { message: failure.0 })
            }
            Err(_) => {
                tracing::warn!(request_id = %request_id, url = %url, timeout_ms, "Request timed out; aborted");
                Err(RequestError::Timeout { timeout_ms })
            }
        }
    }
}

pub(crate) fn join_url(base_url: &str, endpoint: &str) -> String {
    let base = base_url.trim_end_matches('/');
    if endpoint.is_empty() {
        base.to_string()
    } else if endpoint.starts_with('/') {
        format!("{base}{endpoint}")
    } else {
        format!("{base}/{endpoint}")
    }
}

/// Serialize any body type into JSON for `execute`.
pub fn json_body<B: Serialize>(body: &B) -> Result<Value, RequestError> {
    serde_json::to_value(body).map_err(|e| RequestError::Serialization(e.to_string()))
}

/// Build a request for `endpoint` relative to `base_url`. Every request
/// asks for JSON; a body is sent as JSON.
pub fn build_request(
    base_url: &str,
    endpoint: &str,
    method: HttpMethod,
    body: Option<&Value>,
) -> Result<HttpRequest, RequestError> {
    let mut headers = vec![("accept".to_string(), "application/json".to_string())];
    let body = match body {
        Some(value) => {
            let encoded = serde_json::to_string(value)
                .map_err(|e| RequestError::Serialization(e.to_string()))?;
            headers.push(("content-type".to_string(), "application/json".to_string()));
            Some(encoded)
        }
        None => None,
    };
    Ok(HttpRequest {
        method,
        url: join_url(base_url, endpoint),
        headers,
        body,
    })
}

/// Turn a raw response into the pipeline's result.
///
/// - non-2xx: `Application` error; message is the body text, or the status
///   text when the body is empty; payload is parsed JSON or the raw text.
/// - 204 or empty body: `Empty`, no parsing attempted.
/// - JSON content type: parsed `Json`.
/// - anything else: raw `Text`.
pub fn interpret_response(response: HttpResponse) -> Result<ResponseBody, RequestError> {
    if !response.is_success() {
        let payload = ErrorPayload::from_body(&response.body);
        let message = if response.body.trim().is_empty() {
            response.status_text()
        } else {
            response.body.clone()
        };
        return Err(RequestError::Application {
            message,
            status: response.status,
            payload,
        });
    }

    if response.status == 204 || response.body.is_empty() {
        return Ok(ResponseBody::Empty);
    }

    if response.has_json_content_type() {
        return serde_json::from_str(&response.body)
            .map(ResponseBody::Json)
            .map_err(|e| RequestError::Decode {
                message: e.to_string(),
                status: response.status,
            });
    }

    Ok(ResponseBody::Text(response.body))
}
