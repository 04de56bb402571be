//! Error types for asset resolution and tag rendering.

use thiserror::Error;

/// Error surfaced by the build environment collaborator.
pub type EnvironmentError = Box<dyn std::error::Error + Send + Sync>;

/// The main error type for asset resolution.
#[derive(Debug, Error)]
pub enum AssetError {
  /// The logical path has no build output under the active resolver.
  #[error("The asset {path:?} is not present in the asset pipeline.")]
  NotFound {
    /// Logical path that was requested.
    path: String,
  },

  /// The asset exists but was never declared as servable in production.
  #[error(
    "Asset was not declared to be precompiled in production. Add {path:?} to the \
     `precompile` list of your assets configuration and restart your server."
  )]
  NotPrecompiled {
    /// Source path of the asset that failed the precompile check.
    path: String,
  },

  /// The configured resolver mode is not one of `manifest` or `environment`.
  #[error("Unrecognized asset resolver: {0:?}. Expected \"manifest\" or \"environment\"")]
  UnknownResolverMode(String),

  /// The selected resolver mode needs a collaborator that was not supplied.
  #[error("assets resolve with {mode}, but no {collaborator} is available")]
  MissingCollaborator {
    /// Resolver mode that was selected.
    mode: &'static str,
    /// Name of the missing collaborator.
    collaborator: &'static str,
  },

  /// A precompile glob could not be compiled.
  #[error("invalid precompile glob {pattern:?}: {source}")]
  InvalidGlob {
    /// Glob source text.
    pattern: String,
    /// Underlying regex compilation error.
    source: regex::Error,
  },

  /// An integrity value is not a well-formed Subresource Integrity digest.
  #[error("invalid integrity digest {value:?}: {reason}")]
  InvalidIntegrity {
    /// Offending value.
    value: String,
    /// Why the value was rejected.
    reason: String,
  },

  /// The build environment failed while locating or compiling the asset.
  #[error("failed to build asset {path:?}: {source}")]
  Environment {
    /// Logical path that was being resolved.
    path: String,
    /// Error reported by the build environment.
    source: EnvironmentError,
  },
}

impl AssetError {
  /// Build a [`AssetError::NotFound`] for the given path.
  pub fn not_found(path: impl Into<String>) -> Self {
    Self::NotFound { path: path.into() }
  }

  /// Build a [`AssetError::NotPrecompiled`] for the given path.
  pub fn not_precompiled(path: impl Into<String>) -> Self {
    Self::NotPrecompiled { path: path.into() }
  }
}

/// Result type alias for asset operations.
pub type Result<T> = std::result::Result<T, AssetError>;
