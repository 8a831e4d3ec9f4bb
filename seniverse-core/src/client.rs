//! HTTP client for the daily forecast endpoint.

use std::{error::Error as StdError, fmt::Debug, time::Duration};

use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use thiserror::Error;
use tracing::{debug, instrument};

use crate::{
    model::{ProviderErrorBody, ProviderResponse},
    signer::SignedRequest,
};

/// Provider status code for locations outside the account's plan.
pub const PAID_AREA_CODE: &str = "AP010006";

#[derive(Debug, Error)]
pub enum ClientError {
    /// 403: wrong key, paid-only location, or another provider refusal.
    #[error("request rejected with 403 (provider code {code:?})")]
    AuthOrQuota { paid_area: bool, code: Option<String> },

    /// 404: the configured base URL does not lead to the endpoint.
    #[error("endpoint not found (404), check base_url")]
    EndpointConfig,

    /// Anything else. The detail is for logs only.
    #[error("weather request failed: {0}")]
    Unknown(String),
}

#[async_trait]
pub trait WeatherClient: Send + Sync + Debug {
    /// Send one request. No retries.
    async fn fetch(&self, request: &SignedRequest) -> Result<ProviderResponse, ClientError>;
}

#[derive(Debug, Clone)]
pub struct SeniverseClient {
    http: Client,
}

impl SeniverseClient {
    pub fn new(timeout: Duration) -> Result<Self, ClientError> {
        let http = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| {
                ClientError::Unknown(format!("failed to build HTTP client: {}", describe(e)))
            })?;
        Ok(Self { http })
    }
}

#[async_trait]
impl WeatherClient for SeniverseClient {
    #[instrument(skip_all, fields(path = %request.endpoint().path()))]
    async fn fetch(&self, request: &SignedRequest) -> Result<ProviderResponse, ClientError> {
        let builder = match request {
            SignedRequest::Signed(url) => self.http.get(url.clone()),
            SignedRequest::Keyed { endpoint, params } => {
                self.http.get(endpoint.clone()).query(params)
            }
        };

        let res = builder
            .send()
            .await
            .map_err(|e| ClientError::Unknown(format!("failed to send request: {}", describe(e))))?;

        let status = res.status();
        let body = res
            .text()
            .await
            .map_err(|e| {
                ClientError::Unknown(format!("failed to read response body: {}", describe(e)))
            })?;
        debug!(%status, bytes = body.len(), "weather response received");

        classify(status, &body)
    }
}

/// Map a status and body onto a decoded payload or a typed failure.
pub fn classify(status: StatusCode, body: &str) -> Result<ProviderResponse, ClientError> {
    match status {
        StatusCode::FORBIDDEN => {
            let code = serde_json::from_str::<ProviderErrorBody>(body)
                .ok()
                .map(|b| b.status_code)
                .filter(|c| !c.is_empty());
            Err(ClientError::AuthOrQuota {
                paid_area: code.as_deref() == Some(PAID_AREA_CODE),
                code,
            })
        }
        StatusCode::NOT_FOUND => Err(ClientError::EndpointConfig),
        s if !s.is_success() => Err(ClientError::Unknown(format!(
            "unexpected status {s}: {}",
            truncate_body(body)
        ))),
        _ => serde_json::from_str(body).map_err(|e| {
            ClientError::Unknown(format!(
                "failed to decode forecast JSON: {e}: {}",
                truncate_body(body)
            ))
        }),
    }
}

/// Transport error text without the request URL, which carries `key` or
/// `sig` in its query.
fn describe(err: reqwest::Error) -> String {
    error_chain(&err.without_url())
}

/// `err` followed by each of its sources, joined with `: `.
fn error_chain(err: &dyn StdError) -> String {
    let mut detail = err.to_string();
    let mut source = err.source();
    while let Some(cause) = source {
        detail.push_str(": ");
        detail.push_str(&cause.to_string());
        source = cause.source();
    }
    detail
}

fn truncate_body(body: &str) -> String {
    const MAX: usize = 200;
    match body.char_indices().nth(MAX) {
        Some((idx, _)) => format!("{}...", &body[..idx]),
        None => body.to_string(),
    }
}
