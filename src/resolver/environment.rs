use std::sync::Arc;

use tracing::{debug, warn};

use super::{AssetResolver, ResolvedAsset};
use crate::error::{AssetError, EnvironmentError, Result};
use crate::policy::PrecompilePolicy;

/// An asset located (and compiled, if needed) by the build environment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompiledAsset {
  /// Source path relative to the asset load path; checked against the precompile policy.
  pub source_path: String,
  /// Exported served path, relative to the assets prefix.
  pub exported_path: String,
  /// Subresource Integrity digest of the exported output.
  pub integrity: Option<String>,
}

/// Live build environment able to locate assets by logical path.
///
/// Implementations own any caching and locking needed to serve concurrent lookups.
pub trait BuildEnvironment: Send + Sync {
  /// Locate the asset, compiling it synchronously when required.
  ///
  /// Returns `Ok(None)` when no such asset exists.
  fn find(&self, logical_path: &str) -> std::result::Result<Option<CompiledAsset>, EnvironmentError>;
}

/// Resolves through a build environment, gated by the precompile policy.
#[derive(Clone)]
pub struct EnvironmentResolver {
  environment: Arc<dyn BuildEnvironment>,
  policy: Arc<PrecompilePolicy>,
}

impl EnvironmentResolver {
  /// Combine a build environment with the policy it must respect.
  pub fn new(environment: Arc<dyn BuildEnvironment>, policy: Arc<PrecompilePolicy>) -> Self {
    Self {
      environment,
      policy,
    }
  }

  fn find(&self, logical_path: &str) -> Result<Option<CompiledAsset>> {
    self
      .environment
      .find(logical_path)
      .map_err(|source| AssetError::Environment {
        path: logical_path.to_string(),
        source,
      })
  }
}

impl AssetResolver for EnvironmentResolver {
  fn resolve(&self, logical_path: &str) -> Result<ResolvedAsset> {
    let asset = self
      .find(logical_path)?
      .ok_or_else(|| AssetError::not_found(logical_path))?;

    if !self.policy.allows(&asset.source_path) {
      warn!(
        logical_path,
        source_path = %asset.source_path,
        "asset exists but is not declared for precompilation"
      );
      return Err(AssetError::not_precompiled(asset.source_path));
    }

    debug!(
      logical_path,
      served_path = %asset.exported_path,
      "resolved asset from build environment"
    );
    Ok(ResolvedAsset {
      served_path: asset.exported_path,
      integrity: asset.integrity,
    })
  }

  fn integrity_for(&self, logical_path: &str) -> Result<Option<String>> {
    Ok(self.find(logical_path)?.and_then(|asset| asset.integrity))
  }
}
