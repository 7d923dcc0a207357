//! Requests, responses and cache configuration.

use std::collections::BTreeMap;
use std::path::PathBuf;

use serde::{Deserialize, Serialize};
use url::Url;

use crate::error::{CacheError, CacheResult};

/// Headers kept on stored responses.
pub const KEPT_HEADERS: &[&str] = &["content-type", "etag", "cache-control", "last-modified"];

/// A request as seen by the cache: method plus absolute URL.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct AssetRequest {
    pub method: String,
    pub url: String,
}

impl AssetRequest {
    pub fn get(url: impl Into<String>) -> Self {
        Self {
            method: "GET".to_string(),
            url: url.into(),
        }
    }

    pub fn new(method: impl AsRef<str>, url: impl Into<String>) -> Self {
        Self {
            method: method.as_ref().to_ascii_uppercase(),
            url: url.into(),
        }
    }

    pub fn is_get(&self) -> bool {
        self.method == "GET"
    }

    /// Identity string the bucket key is derived from.
    pub fn identity(&self) -> String {
        format!("{} {}", self.method, self.url)
    }
}

/// A response snapshot.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AssetResponse {
    pub url: String,
    pub status: u16,
    pub headers: BTreeMap<String, String>,
    pub body: Vec<u8>,
}

impl AssetResponse {
    pub fn new(url: impl Into<String>, status: u16, body: impl Into<Vec<u8>>) -> Self {
        Self {
            url: url.into(),
            status,
            headers: BTreeMap::new(),
            body: body.into(),
        }
    }

    pub fn with_header(mut self, name: &str, value: impl Into<String>) -> Self {
        self.headers.insert(name.to_ascii_lowercase(), value.into());
        self
    }

    /// 2xx status.
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }

    pub fn content_type(&self) -> Option<&str> {
        self.headers.get("content-type").map(String::as_str)
    }
}

/// Asset cache configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CacheConfig {
    /// Bucket name prefix; the version tag is appended.
    #[serde(default = "default_cache_prefix")]
    pub cache_prefix: String,

    /// Version tag of the deployed assets. Bump it whenever a manifest
    /// resource changes.
    #[serde(default = "default_version")]
    pub version: String,

    /// Base URL manifest paths resolve against.
    #[serde(default = "default_origin")]
    pub origin: String,

    /// Resources pre-cached at install time.
    #[serde(default = "default_manifest")]
    pub manifest: Vec<String>,

    /// Directory holding the buckets. `None` means the user cache dir.
    #[serde(default)]
    pub cache_dir: Option<PathBuf>,

    /// Network timeout in seconds. `None` means no timeout.
    #[serde(default)]
    pub timeout_secs: Option<u64>,
}

fn default_cache_prefix() -> String {
    "section-keywords-cache".to_string()
}

fn default_version() -> String {
    "v4".to_string()
}

fn default_origin() -> String {
    "http://localhost:8080/".to_string()
}

fn default_manifest() -> Vec<String> {
    [
        "./",
        "./index.html",
        "./manifest.json",
        "./new_sample.json",
        "./test_data.json",
    ]
    .iter()
    .map(|s| s.to_string())
    .collect()
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            cache_prefix: default_cache_prefix(),
            version: default_version(),
            origin: default_origin(),
            manifest: default_manifest(),
            cache_dir: None,
            timeout_secs: None,
        }
    }
}

impl CacheConfig {
    /// Create config from environment variables.
    ///
    /// | Variable | Description |
    /// |----------|-------------|
    /// | `PAIRVIEW_ORIGIN` | Base URL of the viewer |
    /// | `PAIRVIEW_CACHE_VERSION` | Version tag of the deployed assets |
    /// | `PAIRVIEW_CACHE_PREFIX` | Bucket name prefix |
    /// | `PAIRVIEW_CACHE_DIR` | Bucket directory |
    /// | `PAIRVIEW_MANIFEST` | Comma-separated resource paths |
    /// | `PAIRVIEW_FETCH_TIMEOUT` | Network timeout in seconds |
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            cache_prefix: std::env::var("PAIRVIEW_CACHE_PREFIX")
                .unwrap_or(defaults.cache_prefix),
            version: std::env::var("PAIRVIEW_CACHE_VERSION").unwrap_or(defaults.version),
            origin: std::env::var("PAIRVIEW_ORIGIN").unwrap_or(defaults.origin),
            manifest: std::env::var("PAIRVIEW_MANIFEST")
                .ok()
                .map(|v| parse_manifest_list(&v))
                .filter(|m| !m.is_empty())
                .unwrap_or(defaults.manifest),
            cache_dir: std::env::var_os("PAIRVIEW_CACHE_DIR").map(PathBuf::from),
            timeout_secs: std::env::var("PAIRVIEW_FETCH_TIMEOUT")
                .ok()
                .and_then(|v| v.parse().ok()),
        }
    }

    /// Name of the bucket owned by this version.
    pub fn bucket_name(&self) -> String {
        format!("{}-{}", self.cache_prefix, self.version)
    }

    /// Manifest paths resolved against the origin, in manifest order.
    pub fn manifest_requests(&self) -> CacheResult<Vec<AssetRequest>> {
        let base = self.origin_url()?;
        self.manifest
            .iter()
            .map(|path| {
                base.join(path)
                    .map(|url| AssetRequest::get(url.to_string()))
                    .map_err(|e| CacheError::Config {
                        message: format!("invalid manifest entry {:?}: {}", path, e),
                    })
            })
            .collect()
    }

    /// Resolve a path (or absolute URL) against the origin.
    pub fn resolve(&self, path: &str) -> CacheResult<String> {
        let base = self.origin_url()?;
        base.join(path)
            .map(|url| url.to_string())
            .map_err(|e| CacheError::Config {
                message: format!("invalid path {:?}: {}", path, e),
            })
    }

    fn origin_url(&self) -> CacheResult<Url> {
        let mut origin = self.origin.clone();
        if !origin.ends_with('/') {
            origin.push('/');
        }
        Url::parse(&origin).map_err(|e| CacheError::Config {
            message: format!("invalid origin {:?}: {}", self.origin, e),
        })
    }

    pub fn with_origin(mut self, origin: impl Into<String>) -> Self {
        self.origin = origin.into();
        self
    }

    pub fn with_version(mut self, version: impl Into<String>) -> Self {
        self.version = version.into();
        self
    }

    pub fn with_cache_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.cache_dir = Some(dir.into());
        self
    }

    pub fn with_manifest<I, S>(mut self, manifest: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.manifest = manifest.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_timeout_secs(mut self, secs: u64) -> Self {
        self.timeout_secs = Some(secs);
        self
    }
}

fn parse_manifest_list(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(String::from)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bucket_name() {
        let config = CacheConfig::default();
        assert_eq!(config.bucket_name(), "section-keywords-cache-v4");
        assert_eq!(
            config.with_version("v5").bucket_name(),
            "section-keywords-cache-v5"
        );
    }

    #[test]
    fn test_manifest_resolves_against_origin() {
        let config = CacheConfig::default()
            .with_origin("https://example.com/viewer")
            .with_manifest(["./", "./index.html", "data/test.json"]);

        let urls: Vec<String> = config
            .manifest_requests()
            .unwrap()
            .into_iter()
            .map(|r| r.url)
            .collect();
        assert_eq!(
            urls,
            vec![
                "https://example.com/viewer/",
                "https://example.com/viewer/index.html",
                "https://example.com/viewer/data/test.json",
            ]
        );
    }

    #[test]
    fn test_invalid_origin() {
        let config = CacheConfig::default().with_origin("not a url");
        assert!(matches!(
            config.manifest_requests(),
            Err(CacheError::Config { .. })
        ));
    }

    #[test]
    fn test_parse_manifest_list() {
        assert_eq!(
            parse_manifest_list(" ./ , ./index.html,,"),
            vec!["./", "./index.html"]
        );
    }

    #[test]
    fn test_request_identity() {
        let req = AssetRequest::new("get", "https://example.com/a");
        assert!(req.is_get());
        assert_eq!(req.identity(), "GET https://example.com/a");
    }

    #[test]
    fn test_config_deserialize_defaults() {
        let config: CacheConfig = serde_json::from_str(r#"{"version": "v9"}"#).unwrap();
        assert_eq!(config.bucket_name(), "section-keywords-cache-v9");
        assert_eq!(config.manifest.len(), 5);
        assert!(config.timeout_secs.is_none());
    }
}
