//! HTTP fetcher over reqwest.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderValue, USER_AGENT};
use tracing::debug;

use crate::error::{CacheError, CacheResult};
use crate::types::{AssetRequest, AssetResponse, CacheConfig, KEPT_HEADERS};

use super::Fetcher;

const USER_AGENT_VALUE: &str = concat!("pairview-cache/", env!("CARGO_PKG_VERSION"));

/// Live network access for the worker. No retries: a failed request is
/// reported once and left to the caller.
#[derive(Debug, Clone)]
pub struct HttpFetcher {
    client: reqwest::Client,
}

impl HttpFetcher {
    pub fn new(config: &CacheConfig) -> CacheResult<Self> {
        let mut default_headers = HeaderMap::new();
        default_headers.insert(USER_AGENT, HeaderValue::from_static(USER_AGENT_VALUE));

        let mut builder = reqwest::Client::builder().default_headers(default_headers);
        if let Some(secs) = config.timeout_secs {
            builder = builder.timeout(Duration::from_secs(secs));
        }

        let client = builder.build().map_err(|e| CacheError::Config {
            message: format!("failed to create HTTP client: {}", e),
        })?;

        Ok(Self { client })
    }
}

#[async_trait]
impl Fetcher for HttpFetcher {
    async fn fetch(&self, request: &AssetRequest) -> CacheResult<AssetResponse> {
        let method =
            reqwest::Method::from_bytes(request.method.as_bytes()).map_err(|e| {
                CacheError::Fetch {
                    url: request.url.clone(),
                    message: format!("invalid method {}: {}", request.method, e),
                }
            })?;

        debug!(method = %method, url = %request.url, "network fetch");

        let response = self
            .client
            .request(method, &request.url)
            .send()
            .await
            .map_err(|e| CacheError::Fetch {
                url: request.url.clone(),
                message: e.to_string(),
            })?;

        let status = response.status().as_u16();
        let mut snapshot = AssetResponse::new(response.url().as_str(), status, Vec::new());
        for name in KEPT_HEADERS {
            if let Some(value) = response.headers().get(*name).and_then(|v| v.to_str().ok()) {
                snapshot = snapshot.with_header(name, value);
            }
        }

        let body = response.bytes().await.map_err(|e| CacheError::Fetch {
            url: request.url.clone(),
            message: format!("failed to read response body: {}", e),
        })?;
        snapshot.body = body.to_vec();

        debug!(url = %request.url, status, size = snapshot.body.len(), "network response");
        Ok(snapshot)
    }
}
