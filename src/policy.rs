//! Precompile policy deciding which logical paths may be served.

use tracing::trace;

use crate::error::AssetError;
use crate::glob::{CompiledGlob, compile_glob};

/// Globs servable when no precompile list is configured.
pub const DEFAULT_PRECOMPILE: &[&str] = &[
  "application.css",
  "application.js",
  "**/*.jpg",
  "**/*.png",
  "**/*.gif",
];

/// Ordered, immutable set of compiled globs.
///
/// Built once from configuration and only read afterwards.
#[derive(Debug, Clone, Default)]
pub struct PrecompilePolicy {
  matchers: Vec<CompiledGlob>,
}

impl PrecompilePolicy {
  /// Compile every glob in order. The first invalid glob aborts construction.
  pub fn from_globs<I, S>(globs: I) -> Result<Self, AssetError>
  where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
  {
    let matchers = globs
      .into_iter()
      .map(|glob| compile_glob(glob.as_ref()))
      .collect::<Result<Vec<_>, _>>()?;
    Ok(Self { matchers })
  }

  /// Returns `true` when any glob matches the path.
  pub fn allows(&self, path: &str) -> bool {
    let matched = self.matchers.iter().find(|matcher| matcher.test(path));
    if let Some(matcher) = matched {
      trace!(path, glob = matcher.pattern(), "precompile glob matched");
    }
    matched.is_some()
  }

  /// The glob sources, in configuration order.
  pub fn patterns(&self) -> impl Iterator<Item = &str> {
    self.matchers.iter().map(CompiledGlob::pattern)
  }

  /// Number of globs in the policy.
  pub fn len(&self) -> usize {
    self.matchers.len()
  }

  /// Returns `true` when the policy contains no globs and therefore allows nothing.
  pub fn is_empty(&self) -> bool {
    self.matchers.is_empty()
  }
}
