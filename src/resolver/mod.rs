//! Turning logical asset paths into served paths and integrity digests.
//!
//! Two strategies exist. [`ManifestResolver`] consults a manifest written by a prior build and
//! treats it as the only source of truth. [`EnvironmentResolver`] asks a live build
//! environment to locate (and compile) the asset, then refuses to serve anything the
//! precompile policy does not list. The strategy is picked once, when the [`Resolver`] is
//! constructed from a [`ResolverMode`].

mod environment;
mod manifest;

use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

use serde::Deserialize;

use crate::error::{AssetError, Result};
use crate::manifest::ManifestTable;
use crate::policy::PrecompilePolicy;

pub use environment::{BuildEnvironment, CompiledAsset, EnvironmentResolver};
pub use manifest::ManifestResolver;

/// Successful resolution of a logical path.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedAsset {
  /// Served path of the build output, relative to the assets prefix.
  pub served_path: String,
  /// Subresource Integrity digest, when the build recorded one.
  pub integrity: Option<String>,
}

/// Capability shared by every resolution strategy.
pub trait AssetResolver {
  /// Resolve a logical path (with extension, without query or fragment).
  fn resolve(&self, logical_path: &str) -> Result<ResolvedAsset>;

  /// Integrity digest for a logical path, if one is known.
  fn integrity_for(&self, logical_path: &str) -> Result<Option<String>>;
}

/// Which resolution strategy to use.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(try_from = "String")]
pub enum ResolverMode {
  /// Resolve against the persisted manifest.
  Manifest,
  /// Resolve against the live build environment.
  Environment,
}

impl ResolverMode {
  /// Configuration spelling of the mode.
  pub fn as_str(self) -> &'static str {
    match self {
      Self::Manifest => "manifest",
      Self::Environment => "environment",
    }
  }
}

impl FromStr for ResolverMode {
  type Err = AssetError;

  fn from_str(value: &str) -> Result<Self> {
    match value.trim().trim_start_matches(':') {
      "manifest" => Ok(Self::Manifest),
      "environment" => Ok(Self::Environment),
      _ => Err(AssetError::UnknownResolverMode(value.to_string())),
    }
  }
}

impl TryFrom<String> for ResolverMode {
  type Error = AssetError;

  fn try_from(value: String) -> Result<Self> {
    value.parse()
  }
}

impl fmt::Display for ResolverMode {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.write_str(self.as_str())
  }
}

/// Resolver chosen once at configuration time.
#[derive(Clone)]
pub enum Resolver {
  /// Manifest-backed resolution.
  Manifest(ManifestResolver),
  /// Build-environment-backed resolution.
  Environment(EnvironmentResolver),
}

impl Resolver {
  /// Construct the resolver for `mode`, failing when its collaborator is absent.
  pub fn for_mode(
    mode: ResolverMode,
    manifest: Option<Arc<ManifestTable>>,
    environment: Option<Arc<dyn BuildEnvironment>>,
    policy: Arc<PrecompilePolicy>,
  ) -> Result<Self> {
    match mode {
      ResolverMode::Manifest => {
        let manifest = manifest.ok_or(AssetError::MissingCollaborator {
          mode: mode.as_str(),
          collaborator: "asset manifest",
        })?;
        Ok(Self::Manifest(ManifestResolver::new(manifest)))
      }
      ResolverMode::Environment => {
        let environment = environment.ok_or(AssetError::MissingCollaborator {
          mode: mode.as_str(),
          collaborator: "build environment",
        })?;
        Ok(Self::Environment(EnvironmentResolver::new(
          environment,
          policy,
        )))
      }
    }
  }

  /// Mode this resolver was built for.
  pub fn mode(&self) -> ResolverMode {
    match self {
      Self::Manifest(_) => ResolverMode::Manifest,
      Self::Environment(_) => ResolverMode::Environment,
    }
  }
}

impl AssetResolver for Resolver {
  fn resolve(&self, logical_path: &str) -> Result<ResolvedAsset> {
    match self {
      Self::Manifest(resolver) => resolver.resolve(logical_path),
      Self::Environment(resolver) => resolver.resolve(logical_path),
    }
  }

  fn integrity_for(&self, logical_path: &str) -> Result<Option<String>> {
    match self {
      Self::Manifest(resolver) => resolver.integrity_for(logical_path),
      Self::Environment(resolver) => resolver.integrity_for(logical_path),
    }
  }
}

impl fmt::Debug for Resolver {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.debug_tuple("Resolver").field(&self.mode()).finish()
  }
}

#[cfg(test)]
pub(crate) mod testing {
  //! In-memory build environment shared by resolver and tag tests.

  use std::collections::BTreeMap;
  use std::sync::Mutex;

  use super::{BuildEnvironment, CompiledAsset};
  use crate::error::EnvironmentError;

  #[derive(Default)]
  pub struct FakeEnvironment {
    assets: BTreeMap<String, CompiledAsset>,
    failing: BTreeMap<String, String>,
    pub lookups: Mutex<Vec<String>>,
  }

  impl FakeEnvironment {
    pub fn with_asset(mut self, logical: &str, exported: &str, integrity: Option<&str>) -> Self {
      self.assets.insert(logical.to_string(), CompiledAsset {
        source_path: logical.to_string(),
        exported_path: exported.to_string(),
        integrity: integrity.map(str::to_string),
      });
      self
    }

    pub fn with_failure(mut self, logical: &str, message: &str) -> Self {
      self
        .failing
        .insert(logical.to_string(), message.to_string());
      self
    }
  }

  impl BuildEnvironment for FakeEnvironment {
    fn find(&self, logical_path: &str) -> Result<Option<CompiledAsset>, EnvironmentError> {
      self
        .lookups
        .lock()
        .expect("lookup log poisoned")
        .push(logical_path.to_string());
      if let Some(message) = self.failing.get(logical_path) {
        return Err(message.clone().into());
      }
      Ok(self.assets.get(logical_path).cloned())
    }
  }
}
