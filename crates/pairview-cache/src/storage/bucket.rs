//! A single bucket: request-keyed response snapshots.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use base64::{engine::general_purpose::STANDARD as BASE64, Engine};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tokio::fs;
use tracing::{debug, warn};

use crate::error::{CacheError, CacheResult};
use crate::types::{AssetRequest, AssetResponse};

use super::{io, keys};

/// On-disk form of one entry.
#[derive(Debug, Serialize, Deserialize)]
struct StoredEntry {
    method: String,
    request_url: String,
    response_url: String,
    status: u16,
    #[serde(default)]
    headers: BTreeMap<String, String>,
    /// Base64 body.
    body: String,
    stored_at: DateTime<Utc>,
}

impl StoredEntry {
    fn into_response(self) -> CacheResult<AssetResponse> {
        let body = BASE64
            .decode(&self.body)
            .map_err(|e| CacheError::cache(format!("invalid stored body: {}", e)))?;
        Ok(AssetResponse {
            url: self.response_url,
            status: self.status,
            headers: self.headers,
            body,
        })
    }
}

/// Summary of a stored entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EntryInfo {
    pub method: String,
    pub url: String,
    pub status: u16,
    pub size: usize,
    pub stored_at: DateTime<Utc>,
}

/// Handle to one named bucket.
#[derive(Debug, Clone)]
pub struct Bucket {
    name: String,
    dir: PathBuf,
}

impl Bucket {
    pub(super) fn new(name: &str, dir: PathBuf) -> Self {
        Self {
            name: name.to_string(),
            dir,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Stored response for `request`, if any.
    ///
    /// Returns `Err` if the entry exists but cannot be decoded.
    pub async fn match_request(&self, request: &AssetRequest) -> CacheResult<Option<AssetResponse>> {
        let path = keys::entry_path(&self.dir, request);

        let content = match fs::read(&path).await {
            Ok(content) => content,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                debug!(bucket = %self.name, url = %request.url, "cache miss");
                return Ok(None);
            }
            Err(e) => {
                return Err(CacheError::cache(format!(
                    "failed to read cache entry: {}",
                    e
                )))
            }
        };

        let entry: StoredEntry = serde_json::from_slice(&content)
            .map_err(|e| CacheError::cache(format!("failed to parse cache entry: {}", e)))?;

        debug!(bucket = %self.name, url = %request.url, "cache hit");
        entry.into_response().map(Some)
    }

    /// Store `response` under `request`, replacing any previous entry.
    ///
    /// The bucket must exist; a bucket deleted by a newer version is not
    /// brought back by a late write.
    pub async fn put(&self, request: &AssetRequest, response: &AssetResponse) -> CacheResult<()> {
        if !fs::metadata(&self.dir)
            .await
            .map(|m| m.is_dir())
            .unwrap_or(false)
        {
            return Err(CacheError::cache(format!(
                "bucket {} does not exist",
                self.name
            )));
        }

        let entry = StoredEntry {
            method: request.method.clone(),
            request_url: request.url.clone(),
            response_url: response.url.clone(),
            status: response.status,
            headers: response.headers.clone(),
            body: BASE64.encode(&response.body),
            stored_at: Utc::now(),
        };
        let json = serde_json::to_vec(&entry)
            .map_err(|e| CacheError::cache(format!("failed to serialize entry: {}", e)))?;

        io::write_atomic(&keys::entry_path(&self.dir, request), &json).await?;

        debug!(
            bucket = %self.name,
            url = %request.url,
            status = response.status,
            size = response.body.len(),
            "cached response"
        );
        Ok(())
    }

    /// Remove the entry for `request`. Returns whether it existed.
    pub async fn delete(&self, request: &AssetRequest) -> CacheResult<bool> {
        match fs::remove_file(keys::entry_path(&self.dir, request)).await {
            Ok(()) => Ok(true),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(false),
            Err(e) => Err(CacheError::cache(format!(
                "failed to delete cache entry: {}",
                e
            ))),
        }
    }

    /// Summaries of all readable entries, sorted by URL.
    pub async fn entries(&self) -> CacheResult<Vec<EntryInfo>> {
        let mut result = Vec::new();

        let mut dir = match fs::read_dir(&self.dir).await {
            Ok(dir) => dir,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(result),
            Err(e) => {
                return Err(CacheError::cache(format!(
                    "failed to read bucket directory: {}",
                    e
                )))
            }
        };

        while let Some(file) = dir
            .next_entry()
            .await
            .map_err(|e| CacheError::cache(format!("failed to read directory entry: {}", e)))?
        {
            let name = file.file_name().to_string_lossy().to_string();
            if io::is_temp_file(&name) || !name.ends_with(keys::ENTRY_EXTENSION) {
                continue;
            }

            let Ok(content) = fs::read(file.path()).await else {
                continue;
            };
            match serde_json::from_slice::<StoredEntry>(&content) {
                Ok(entry) => {
                    let size = BASE64.decode(&entry.body).map(|b| b.len()).unwrap_or(0);
                    result.push(EntryInfo {
                        method: entry.method,
                        url: entry.request_url,
                        status: entry.status,
                        size,
                        stored_at: entry.stored_at,
                    });
                }
                Err(e) => {
                    warn!(bucket = %self.name, file = %name, error = %e, "skipping unreadable entry");
                }
            }
        }

        result.sort_by(|a, b| a.url.cmp(&b.url).then_with(|| a.method.cmp(&b.method)));
        Ok(result)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::CacheStorage;
    use tempfile::TempDir;

    async fn create_test_bucket() -> (Bucket, TempDir) {
        let temp_dir = TempDir::new().unwrap();
        let storage = CacheStorage::with_dir(temp_dir.path().join("buckets"));
        let bucket = storage.open("test-cache-v1").await.unwrap();
        (bucket, temp_dir)
    }

    fn html(url: &str, body: &str) -> AssetResponse {
        AssetResponse::new(url, 200, body).with_header("Content-Type", "text/html")
    }

    #[tokio::test]
    async fn test_put_then_match() {
        let (bucket, _temp_dir) = create_test_bucket().await;
        let request = AssetRequest::get("https://example.com/index.html");

        bucket
            .put(&request, &html(&request.url, "<h1>hi</h1>"))
            .await
            .unwrap();

        let response = bucket.match_request(&request).await.unwrap().unwrap();
        assert_eq!(response.body, b"<h1>hi</h1>");
        assert_eq!(response.status, 200);
        assert_eq!(response.content_type(), Some("text/html"));
    }

    #[tokio::test]
    async fn test_miss() {
        let (bucket, _temp_dir) = create_test_bucket().await;
        let request = AssetRequest::get("https://example.com/absent");
        assert!(bucket.match_request(&request).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_put_overwrites() {
        let (bucket, _temp_dir) = create_test_bucket().await;
        let request = AssetRequest::get("https://example.com/data.json");

        bucket.put(&request, &html(&request.url, "old")).await.unwrap();
        bucket.put(&request, &html(&request.url, "new")).await.unwrap();

        let response = bucket.match_request(&request).await.unwrap().unwrap();
        assert_eq!(response.body, b"new");
        assert_eq!(bucket.entries().await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_put_into_deleted_bucket_fails() {
        let (bucket, _temp_dir) = create_test_bucket().await;
        fs::remove_dir_all(bucket.dir()).await.unwrap();

        let request = AssetRequest::get("https://example.com/");
        let err = bucket
            .put(&request, &html(&request.url, "late"))
            .await
            .unwrap_err();
        assert!(matches!(err, CacheError::Cache { .. }));
        assert!(!bucket.dir().exists());
    }

    #[tokio::test]
    async fn test_corrupt_entry_is_error() {
        let (bucket, _temp_dir) = create_test_bucket().await;
        let request = AssetRequest::get("https://example.com/index.html");
        bucket.put(&request, &html(&request.url, "ok")).await.unwrap();

        fs::write(keys::entry_path(bucket.dir(), &request), "not json{{")
            .await
            .unwrap();

        let result = bucket.match_request(&request).await;
        assert!(matches!(result, Err(CacheError::Cache { .. })));
        assert!(bucket.entries().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_no_temp_files_remain() {
        let (bucket, _temp_dir) = create_test_bucket().await;
        let request = AssetRequest::get("https://example.com/index.html");
        bucket.put(&request, &html(&request.url, "ok")).await.unwrap();

        let mut dir = fs::read_dir(bucket.dir()).await.unwrap();
        while let Some(entry) = dir.next_entry().await.unwrap() {
            let name = entry.file_name().to_string_lossy().to_string();
            assert!(!name.ends_with(".tmp"), "temp file left behind: {}", name);
        }
    }

    #[tokio::test]
    async fn test_concurrent_puts_leave_one_whole_entry() {
        let (bucket, _temp_dir) = create_test_bucket().await;
        let request = AssetRequest::get("https://example.com/big.json");
        let bodies: Vec<String> = (0..8).map(|i| i.to_string().repeat(64 * 1024)).collect();

        let writes = bodies.iter().map(|body| {
            let bucket = bucket.clone();
            let request = request.clone();
            let response = html(&request.url, body);
            async move { bucket.put(&request, &response).await }
        });
        for result in futures::future::join_all(writes).await {
            result.unwrap();
        }

        let stored = bucket.match_request(&request).await.unwrap().unwrap();
        assert!(bodies.iter().any(|b| b.as_bytes() == stored.body.as_slice()));
    }

    #[tokio::test]
    async fn test_entries_and_delete() {
        let (bucket, _temp_dir) = create_test_bucket().await;
        let a = AssetRequest::get("https://example.com/a");
        let b = AssetRequest::get("https://example.com/b");
        bucket.put(&b, &html(&b.url, "bb")).await.unwrap();
        bucket.put(&a, &html(&a.url, "a")).await.unwrap();

        let entries = bucket.entries().await.unwrap();
        assert_eq!(entries.len(), 2);
        assert_eq!(entries[0].url, a.url);
        assert_eq!(entries[1].size, 2);

        assert!(bucket.delete(&a).await.unwrap());
        assert!(!bucket.delete(&a).await.unwrap());
        assert_eq!(bucket.entries().await.unwrap().len(), 1);
    }
}
