//! Versioned stale-while-revalidate cache for the viewer's static assets.
//!
//! This crate provides:
//!
//! - Named buckets on disk, one per deployed asset version
//! - Install: pre-cache a fixed manifest, all or nothing
//! - Activate: remove the buckets of every other version
//! - Fetch interception: serve cached responses at once and refresh them
//!   in the background
//!
//! # Quick Start
//!
//! ```no_run
//! use pairview_cache::{AssetCacheManager, AssetRequest, CacheConfig};
//!
//! # async fn example() -> pairview_cache::CacheResult<()> {
//! let config = CacheConfig::from_env().with_version("v5");
//! let mut worker = AssetCacheManager::from_config(config)?;
//!
//! worker.install().await?;
//! worker.activate().await?;
//!
//! let url = worker.config().resolve("./index.html")?;
//! let outcome = worker.handle_fetch(AssetRequest::get(url)).await?;
//! println!("{} bytes from {:?}", outcome.response.body.len(), outcome.source);
//! # Ok(())
//! # }
//! ```
//!
//! # Configuration
//!
//! | Environment Variable | Description |
//! |---------------------|-------------|
//! | `PAIRVIEW_ORIGIN` | Base URL of the viewer (default: `http://localhost:8080/`) |
//! | `PAIRVIEW_CACHE_VERSION` | Asset version tag (default: `v4`) |
//! | `PAIRVIEW_CACHE_PREFIX` | Bucket name prefix (default: `section-keywords-cache`) |
//! | `PAIRVIEW_CACHE_DIR` | Bucket directory (default: user cache dir) |
//! | `PAIRVIEW_MANIFEST` | Comma-separated resources to pre-cache |
//! | `PAIRVIEW_FETCH_TIMEOUT` | Network timeout in seconds (default: none) |

pub mod error;
pub mod fetch;
pub mod storage;
pub mod types;
pub mod worker;

pub use error::{CacheError, CacheResult};
pub use fetch::{Fetcher, HttpFetcher};
pub use storage::{Bucket, CacheStorage, EntryInfo};
pub use types::{AssetRequest, AssetResponse, CacheConfig};
pub use worker::{
    ActivateReport, AssetCacheManager, FetchOutcome, InstallReport, ResponseSource, Revalidation,
    WorkerState,
};
