//! Worker lifecycle: install, activate, and fetch interception.
//!
//! A worker owns one version of the viewer's static assets. Installing it
//! pre-caches the manifest into the version's bucket; activating it removes
//! every other version's bucket; once active it answers requests
//! stale-while-revalidate from that bucket.

use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use futures::future::try_join_all;
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use crate::error::{CacheError, CacheResult};
use crate::fetch::{Fetcher, HttpFetcher};
use crate::storage::{Bucket, CacheStorage};
use crate::types::{AssetRequest, AssetResponse, CacheConfig};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WorkerState {
    /// Created, nothing done yet.
    Parsed,
    Installing,
    /// Bucket populated, waiting to take over.
    Installed,
    Activating,
    /// Serving requests.
    Activated,
    /// Install failed; this worker will never serve.
    Redundant,
}

impl fmt::Display for WorkerState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Parsed => "parsed",
            Self::Installing => "installing",
            Self::Installed => "installed",
            Self::Activating => "activating",
            Self::Activated => "activated",
            Self::Redundant => "redundant",
        };
        f.write_str(name)
    }
}

/// Where a served response came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResponseSource {
    Cache,
    Network,
}

/// Background refresh of a cache entry that was just served.
///
/// Dropping it detaches the task; it still runs to completion.
#[derive(Debug)]
pub struct Revalidation {
    handle: JoinHandle<bool>,
}

impl Revalidation {
    fn spawn<F: Fetcher>(bucket: Bucket, request: AssetRequest, fetcher: Arc<F>) -> Self {
        let handle = tokio::spawn(async move {
            let fresh = match fetcher.fetch(&request).await {
                Ok(fresh) => fresh,
                Err(e) => {
                    debug!(url = %request.url, error = %e, "revalidation fetch failed");
                    return false;
                }
            };

            match bucket.put(&request, &fresh).await {
                Ok(()) => {
                    debug!(url = %request.url, status = fresh.status, "revalidated");
                    true
                }
                Err(e) => {
                    debug!(url = %request.url, error = %e, "revalidation write dropped");
                    false
                }
            }
        });
        Self { handle }
    }

    /// Wait for the refresh. Returns whether the bucket was updated.
    pub async fn finished(self) -> bool {
        self.handle.await.unwrap_or(false)
    }

    /// Wait at most `limit` for the refresh.
    ///
    /// Returns `None` if it is still running; it then keeps running in the
    /// background, detached from the caller.
    pub async fn finished_within(self, limit: Duration) -> Option<bool> {
        match tokio::time::timeout(limit, self.handle).await {
            Ok(joined) => Some(joined.unwrap_or(false)),
            Err(_) => None,
        }
    }

    pub fn is_finished(&self) -> bool {
        self.handle.is_finished()
    }
}

/// Result of an intercepted request.
#[derive(Debug)]
pub struct FetchOutcome {
    pub response: AssetResponse,
    pub source: ResponseSource,
    /// Present on cache hits.
    pub revalidation: Option<Revalidation>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InstallReport {
    pub bucket: String,
    /// URLs stored, in manifest order.
    pub cached: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ActivateReport {
    pub bucket: String,
    /// Buckets of other versions that were removed.
    pub deleted: Vec<String>,
}

/// Asset cache worker for one version.
#[derive(Debug)]
pub struct AssetCacheManager<F: Fetcher> {
    config: CacheConfig,
    storage: CacheStorage,
    fetcher: Arc<F>,
    state: WorkerState,
}

impl AssetCacheManager<HttpFetcher> {
    /// Worker backed by the network and the configured cache directory.
    pub fn from_config(config: CacheConfig) -> CacheResult<Self> {
        let fetcher = HttpFetcher::new(&config)?;
        let storage = CacheStorage::new(&config)?;
        Ok(Self::new(config, storage, fetcher))
    }
}

impl<F: Fetcher> AssetCacheManager<F> {
    pub fn new(config: CacheConfig, storage: CacheStorage, fetcher: F) -> Self {
        Self {
            config,
            storage,
            fetcher: Arc::new(fetcher),
            state: WorkerState::Parsed,
        }
    }

    pub fn state(&self) -> WorkerState {
        self.state
    }

    pub fn config(&self) -> &CacheConfig {
        &self.config
    }

    pub fn storage(&self) -> &CacheStorage {
        &self.storage
    }

    pub fn bucket_name(&self) -> String {
        self.config.bucket_name()
    }

    /// Pre-cache every manifest resource into this version's bucket.
    ///
    /// All resources are fetched before anything is written, and the bucket
    /// only appears under its name once every entry is stored. If any fetch
    /// fails, answers with a non-2xx status, or cannot be stored, nothing
    /// is kept (a previous bucket of this version stays as it was) and the
    /// worker becomes redundant.
    pub async fn install(&mut self) -> CacheResult<InstallReport> {
        self.expect_state("install", WorkerState::Parsed)?;
        self.state = WorkerState::Installing;

        match self.populate().await {
            Ok(report) => {
                self.state = WorkerState::Installed;
                info!(
                    bucket = %report.bucket,
                    resources = report.cached.len(),
                    "installed"
                );
                Ok(report)
            }
            Err(e) => {
                self.state = WorkerState::Redundant;
                warn!(bucket = %self.bucket_name(), error = %e, "install failed");
                Err(e)
            }
        }
    }

    async fn populate(&self) -> CacheResult<InstallReport> {
        let requests = self.config.manifest_requests()?;
        let bucket_name = self.bucket_name();
        let staged = self.storage.stage(&bucket_name).await?;

        let result = match self.fill(&staged, &requests).await {
            Ok(()) => self.storage.commit(&staged, requests.len()).await.map(|_| ()),
            Err(e) => Err(e),
        };
        if let Err(e) = result {
            if let Err(cleanup) = self.storage.discard(&staged).await {
                warn!(bucket = %bucket_name, error = %cleanup, "failed to remove staged install");
            }
            return Err(e);
        }

        Ok(InstallReport {
            bucket: bucket_name,
            cached: requests.into_iter().map(|r| r.url).collect(),
        })
    }

    /// Fetch every manifest resource, then write them all into `staged`.
    async fn fill(&self, staged: &Bucket, requests: &[AssetRequest]) -> CacheResult<()> {
        let responses = try_join_all(requests.iter().map(|r| self.fetcher.fetch(r))).await?;

        if let Some((request, response)) = requests
            .iter()
            .zip(&responses)
            .find(|(_, response)| !response.is_success())
        {
            return Err(CacheError::Install {
                url: request.url.clone(),
                status: response.status,
            });
        }

        for (request, response) in requests.iter().zip(&responses) {
            staged.put(request, response).await?;
        }
        Ok(())
    }

    /// Take over from previous versions: delete every bucket but this one.
    pub async fn activate(&mut self) -> CacheResult<ActivateReport> {
        self.expect_state("activate", WorkerState::Installed)?;
        self.state = WorkerState::Activating;

        match self.purge_stale().await {
            Ok(report) => {
                self.state = WorkerState::Activated;
                info!(
                    bucket = %report.bucket,
                    deleted = ?report.deleted,
                    "activated"
                );
                Ok(report)
            }
            Err(e) => {
                self.state = WorkerState::Installed;
                warn!(error = %e, "activation failed");
                Err(e)
            }
        }
    }

    async fn purge_stale(&self) -> CacheResult<ActivateReport> {
        let current = self.bucket_name();
        let mut deleted = Vec::new();

        match self.storage.remove_leftovers().await {
            Ok(0) => {}
            Ok(removed) => debug!(removed, "removed leftovers of interrupted installs"),
            Err(e) => warn!(error = %e, "failed to remove leftovers of interrupted installs"),
        }

        for name in self.storage.keys().await? {
            if name != current {
                self.storage.delete(&name).await?;
                deleted.push(name);
            }
        }

        Ok(ActivateReport {
            bucket: current,
            deleted,
        })
    }

    /// Pick up an already activated version in a new process.
    pub async fn resume(&mut self) -> CacheResult<()> {
        self.adopt_bucket("resume").await?;
        self.state = WorkerState::Activated;
        Ok(())
    }

    /// Pick up a version installed by an earlier process, ready to activate.
    pub async fn resume_installed(&mut self) -> CacheResult<()> {
        self.adopt_bucket("resume installed").await?;
        self.state = WorkerState::Installed;
        Ok(())
    }

    async fn adopt_bucket(&self, action: &'static str) -> CacheResult<()> {
        self.expect_state(action, WorkerState::Parsed)?;

        let name = self.bucket_name();
        if !self.storage.is_installed(&name).await {
            let message = if self.storage.has(&name).await {
                format!("bucket {} is not installed: its install did not complete", name)
            } else {
                format!("bucket {} is not installed", name)
            };
            return Err(CacheError::Cache { message });
        }

        debug!(bucket = %name, action, "adopted existing bucket");
        Ok(())
    }

    /// Answer an intercepted request.
    ///
    /// A cached response is returned at once while a background task
    /// refreshes the entry. A miss goes to the network and is not stored.
    pub async fn handle_fetch(&self, request: AssetRequest) -> CacheResult<FetchOutcome> {
        self.expect_state("handle fetch", WorkerState::Activated)?;

        if !request.is_get() {
            return self.from_network(&request).await;
        }

        let bucket = self.storage.bucket(&self.bucket_name())?;
        let cached = match bucket.match_request(&request).await {
            Ok(cached) => cached,
            Err(e) => {
                warn!(url = %request.url, error = %e, "unreadable cache entry, using network");
                None
            }
        };

        match cached {
            Some(response) => {
                let revalidation = Revalidation::spawn(bucket, request, Arc::clone(&self.fetcher));
                Ok(FetchOutcome {
                    response,
                    source: ResponseSource::Cache,
                    revalidation: Some(revalidation),
                })
            }
            None => self.from_network(&request).await,
        }
    }

    async fn from_network(&self, request: &AssetRequest) -> CacheResult<FetchOutcome> {
        let response = self.fetcher.fetch(request).await?;
        Ok(FetchOutcome {
            response,
            source: ResponseSource::Network,
            revalidation: None,
        })
    }

    fn expect_state(&self, action: &'static str, expected: WorkerState) -> CacheResult<()> {
        if self.state == expected {
            Ok(())
        } else {
            Err(CacheError::Lifecycle {
                action,
                state: self.state,
            })
        }
    }
}
