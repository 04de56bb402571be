use std::sync::Arc;

use tracing::debug;

use super::{AssetResolver, ResolvedAsset};
use crate::error::{AssetError, Result};
use crate::manifest::ManifestTable;

/// Resolves against a manifest snapshot.
///
/// Manifest entries are exactly the precompiled set, so no policy check happens here; a
/// missing key is reported as [`AssetError::NotFound`].
#[derive(Debug, Clone)]
pub struct ManifestResolver {
  manifest: Arc<ManifestTable>,
}

impl ManifestResolver {
  /// Wrap a loaded manifest.
  pub fn new(manifest: Arc<ManifestTable>) -> Self {
    Self { manifest }
  }
}

impl AssetResolver for ManifestResolver {
  fn resolve(&self, logical_path: &str) -> Result<ResolvedAsset> {
    let entry = self
      .manifest
      .get(logical_path)
      .ok_or_else(|| AssetError::not_found(logical_path))?;
    debug!(logical_path, served_path = %entry.path, "resolved asset from manifest");
    Ok(ResolvedAsset {
      served_path: entry.path.clone(),
      integrity: entry.integrity.clone(),
    })
  }

  fn integrity_for(&self, logical_path: &str) -> Result<Option<String>> {
    Ok(
      self
        .manifest
        .get(logical_path)
        .and_then(|entry| entry.integrity.clone()),
    )
  }
}
