//! Network seam.
//!
//! The worker never talks to the network directly; it goes through a
//! [`Fetcher`], so tests can swap in a scripted one.

use async_trait::async_trait;

use crate::error::CacheResult;
use crate::types::{AssetRequest, AssetResponse};

mod http;

pub use http::HttpFetcher;

/// Performs live network requests.
///
/// A completed HTTP exchange is `Ok` whatever its status. Only failures to
/// get a response at all are `Err`.
#[async_trait]
pub trait Fetcher: Send + Sync + 'static {
    async fn fetch(&self, request: &AssetRequest) -> CacheResult<AssetResponse>;
}
