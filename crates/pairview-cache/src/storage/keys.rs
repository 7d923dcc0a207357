//! Entry key and bucket name derivation.

use std::path::{Path, PathBuf};

use sha2::{Digest, Sha256};

use crate::error::{CacheError, CacheResult};
use crate::types::AssetRequest;

pub(crate) const ENTRY_EXTENSION: &str = "json";

/// Written into a bucket as the last step of a successful install.
pub(crate) const INSTALLED_MARKER: &str = ".installed";

/// Hidden directories an install writes before the bucket is moved into place.
pub(crate) const STAGING_PREFIX: &str = ".staging-";
pub(crate) const RETIRED_PREFIX: &str = ".retired-";

pub(crate) fn is_leftover_dir(name: &str) -> bool {
    name.starts_with(STAGING_PREFIX) || name.starts_with(RETIRED_PREFIX)
}

/// Lowercase hex SHA-256 of the request identity.
pub(crate) fn entry_key(request: &AssetRequest) -> String {
    format!("{:x}", Sha256::digest(request.identity().as_bytes()))
}

pub(crate) fn entry_path(bucket_dir: &Path, request: &AssetRequest) -> PathBuf {
    bucket_dir.join(format!("{}.{}", entry_key(request), ENTRY_EXTENSION))
}

/// Bucket names become directory names, so they must be a single plain
/// path component.
pub(crate) fn validate_bucket_name(name: &str) -> CacheResult<()> {
    let valid = !name.is_empty()
        && name != "."
        && name != ".."
        && !name.starts_with('.')
        && !name.contains(['/', '\\']);
    if valid {
        Ok(())
    } else {
        Err(CacheError::Config {
            message: format!("invalid bucket name: {:?}", name),
        })
    }
}
