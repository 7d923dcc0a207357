//! Filesystem helpers for bucket storage.

use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, Ordering};

use tokio::fs;

use crate::error::{CacheError, CacheResult};

static TEMP_COUNTER: AtomicU64 = AtomicU64::new(0);

pub(crate) fn default_cache_dir() -> CacheResult<PathBuf> {
    let base = dirs::cache_dir()
        .or_else(dirs::home_dir)
        .ok_or_else(|| CacheError::cache("could not determine cache directory"))?;

    Ok(base.join("pairview").join("buckets"))
}

/// Suffix unique within this machine: process id plus a per-process counter.
pub(crate) fn unique_suffix() -> String {
    let seq = TEMP_COUNTER.fetch_add(1, Ordering::Relaxed);
    format!("{}-{}", std::process::id(), seq)
}

/// Write `content` to a temp file next to `path`, then rename it into place.
///
/// Every call uses its own temp file, so concurrent writers of one path
/// never mix their bytes; the last rename wins.
pub(crate) async fn write_atomic(path: &Path, content: &[u8]) -> CacheResult<()> {
    let file_name = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();
    let temp_path = path.with_file_name(format!(".{}.{}.tmp", file_name, unique_suffix()));

    fs::write(&temp_path, content)
        .await
        .map_err(|e| CacheError::cache(format!("failed to write temp file: {}", e)))?;

    if let Err(e) = fs::rename(&temp_path, path).await {
        let _ = fs::remove_file(&temp_path).await;
        return Err(CacheError::cache(format!("failed to rename temp file: {}", e)));
    }

    Ok(())
}

pub(crate) fn is_temp_file(name: &str) -> bool {
    name.starts_with('.') && name.ends_with(".tmp")
}
