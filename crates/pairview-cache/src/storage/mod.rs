//! Named bucket storage.
//!
//! # Layout
//!
//! ```text
//! {cache_dir}/
//!   section-keywords-cache-v4/     # one directory per bucket
//!     .installed                   # install completion record
//!     {sha256(METHOD url)}.json    # one self-contained document per entry
//!   section-keywords-cache-v3/
//!   .staging-{name}-{pid}-{seq}/   # install in progress
//! ```
//!
//! An entry is written to a private temp file and renamed into place, so a
//! reader sees either the previous entry or the new one, never a mix.
//! Installs fill a staging directory and rename it over the bucket only
//! once every entry and the `.installed` record are written.

use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tokio::fs;
use tracing::{debug, warn};

use crate::error::{CacheError, CacheResult};
use crate::types::CacheConfig;

mod bucket;
mod io;
mod keys;

pub use bucket::{Bucket, EntryInfo};

/// Contents of the `.installed` record.
#[derive(Debug, Serialize, Deserialize)]
struct InstallRecord {
    bucket: String,
    resources: usize,
    installed_at: DateTime<Utc>,
}

/// The set of buckets under one cache directory.
#[derive(Debug, Clone)]
pub struct CacheStorage {
    root: PathBuf,
}

impl CacheStorage {
    /// Storage at the configured directory, or the user cache dir.
    pub fn new(config: &CacheConfig) -> CacheResult<Self> {
        let root = match &config.cache_dir {
            Some(dir) => dir.clone(),
            None => io::default_cache_dir()?,
        };
        Ok(Self { root })
    }

    pub fn with_dir(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Open a bucket, creating it if needed.
    pub async fn open(&self, name: &str) -> CacheResult<Bucket> {
        let bucket = self.bucket(name)?;
        fs::create_dir_all(bucket.dir())
            .await
            .map_err(|e| CacheError::cache(format!("failed to create bucket {}: {}", name, e)))?;
        Ok(bucket)
    }

    /// Handle to a bucket without creating it.
    pub fn bucket(&self, name: &str) -> CacheResult<Bucket> {
        keys::validate_bucket_name(name)?;
        Ok(Bucket::new(name, self.root.join(name)))
    }

    pub async fn has(&self, name: &str) -> bool {
        match self.bucket(name) {
            Ok(bucket) => fs::metadata(bucket.dir())
                .await
                .map(|m| m.is_dir())
                .unwrap_or(false),
            Err(_) => false,
        }
    }

    /// Whether `name` exists and was written by an install that completed.
    pub async fn is_installed(&self, name: &str) -> bool {
        let Ok(bucket) = self.bucket(name) else {
            return false;
        };
        fs::metadata(bucket.dir().join(keys::INSTALLED_MARKER))
            .await
            .map(|m| m.is_file())
            .unwrap_or(false)
    }

    /// Create a hidden staging directory for an install of `name`.
    ///
    /// The returned bucket carries the final name but writes into the
    /// staging directory until [`commit`](Self::commit) moves it into place.
    pub async fn stage(&self, name: &str) -> CacheResult<Bucket> {
        keys::validate_bucket_name(name)?;
        let dir = self.root.join(format!(
            "{}{}-{}",
            keys::STAGING_PREFIX,
            name,
            io::unique_suffix()
        ));
        fs::create_dir_all(&dir)
            .await
            .map_err(|e| CacheError::cache(format!("failed to stage bucket {}: {}", name, e)))?;

        debug!(bucket = name, dir = %dir.display(), "staging install");
        Ok(Bucket::new(name, dir))
    }

    /// Mark a staged bucket complete and move it over the bucket of the same
    /// name. A previous bucket is kept until the new one is in place.
    pub async fn commit(&self, staged: &Bucket, resources: usize) -> CacheResult<Bucket> {
        let name = staged.name();
        let record = InstallRecord {
            bucket: name.to_string(),
            resources,
            installed_at: Utc::now(),
        };
        let json = serde_json::to_vec(&record)
            .map_err(|e| CacheError::cache(format!("failed to serialize install record: {}", e)))?;
        io::write_atomic(&staged.dir().join(keys::INSTALLED_MARKER), &json).await?;

        let target = self.bucket(name)?;
        let retired = match fs::metadata(target.dir()).await {
            Ok(_) => {
                let path = self.root.join(format!(
                    "{}{}-{}",
                    keys::RETIRED_PREFIX,
                    name,
                    io::unique_suffix()
                ));
                fs::rename(target.dir(), &path).await.map_err(|e| {
                    CacheError::cache(format!("failed to move aside bucket {}: {}", name, e))
                })?;
                Some(path)
            }
            Err(_) => None,
        };

        if let Err(e) = fs::rename(staged.dir(), target.dir()).await {
            if let Some(path) = &retired {
                if let Err(restore) = fs::rename(path, target.dir()).await {
                    warn!(bucket = name, error = %restore, "failed to restore previous bucket");
                }
            }
            return Err(CacheError::cache(format!(
                "failed to commit bucket {}: {}",
                name, e
            )));
        }

        if let Some(path) = retired {
            if let Err(e) = fs::remove_dir_all(&path).await {
                warn!(bucket = name, path = %path.display(), error = %e, "failed to remove replaced bucket");
            }
        }

        debug!(bucket = name, resources, "committed bucket");
        Ok(target)
    }

    /// Remove a staged bucket that will not be committed.
    pub async fn discard(&self, staged: &Bucket) -> CacheResult<()> {
        match fs::remove_dir_all(staged.dir()).await {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(CacheError::cache(format!(
                "failed to discard staged bucket {}: {}",
                staged.name(),
                e
            ))),
        }
    }

    /// Remove staging and replaced-bucket directories left behind by
    /// interrupted installs. Returns how many were removed.
    pub async fn remove_leftovers(&self) -> CacheResult<usize> {
        let mut entries = match fs::read_dir(&self.root).await {
            Ok(entries) => entries,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(0),
            Err(e) => {
                return Err(CacheError::cache(format!(
                    "failed to read cache directory: {}",
                    e
                )))
            }
        };

        let mut removed = 0;
        while let Some(entry) = entries
            .next_entry()
            .await
            .map_err(|e| CacheError::cache(format!("failed to read directory entry: {}", e)))?
        {
            let name = entry.file_name().to_string_lossy().to_string();
            let is_dir = entry.file_type().await.map(|t| t.is_dir()).unwrap_or(false);
            if !is_dir || !keys::is_leftover_dir(&name) {
                continue;
            }
            match fs::remove_dir_all(entry.path()).await {
                Ok(()) => {
                    debug!(dir = %name, "removed leftover install directory");
                    removed += 1;
                }
                Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
                Err(e) => {
                    return Err(CacheError::cache(format!(
                        "failed to remove {}: {}",
                        name, e
                    )))
                }
            }
        }
        Ok(removed)
    }

    /// Names of all existing buckets, sorted.
    pub async fn keys(&self) -> CacheResult<Vec<String>> {
        let mut names = Vec::new();

        let mut entries = match fs::read_dir(&self.root).await {
            Ok(entries) => entries,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(names),
            Err(e) => {
                return Err(CacheError::cache(format!(
                    "failed to read cache directory: {}",
                    e
                )))
            }
        };

        while let Some(entry) = entries
            .next_entry()
            .await
            .map_err(|e| CacheError::cache(format!("failed to read directory entry: {}", e)))?
        {
            let is_dir = entry.file_type().await.map(|t| t.is_dir()).unwrap_or(false);
            let name = entry.file_name().to_string_lossy().to_string();
            if is_dir && keys::validate_bucket_name(&name).is_ok() {
                names.push(name);
            }
        }

        names.sort();
        Ok(names)
    }

    /// Delete a bucket and everything in it. Returns whether it existed.
    pub async fn delete(&self, name: &str) -> CacheResult<bool> {
        let bucket = self.bucket(name)?;
        match fs::remove_dir_all(bucket.dir()).await {
            Ok(()) => {
                debug!(bucket = name, "deleted bucket");
                Ok(true)
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(false),
            Err(e) => Err(CacheError::cache(format!(
                "failed to delete bucket {}: {}",
                name, e
            ))),
        }
    }
}
