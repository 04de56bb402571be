//! Assets configuration and the immutable context built from it at boot.

use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{Context, Result};
use serde::Deserialize;
use tracing::{info, warn};

use crate::error::AssetError;
use crate::manifest::ManifestTable;
use crate::policy::{DEFAULT_PRECOMPILE, PrecompilePolicy};
use crate::request::RenderContext;
use crate::resolver::{BuildEnvironment, Resolver, ResolverMode};
use crate::tags::{PreloadTransport, TagBuilder, TagOptions, ViewConfig};

/// File name looked up by [`AssetsConfig::discover`].
pub const DEFAULT_CONFIG_FILE: &str = "assets.config.json";

/// Discoverable assets configuration.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct AssetsConfig {
    /// Globs naming the logical paths that may be served.
    pub precompile: Vec<String>,
    /// URL prefix under which built assets are served.
    pub prefix: String,
    /// Manifest location, relative to the project root.
    pub manifest: String,
    /// Whether a live build environment is available.
    pub compile: bool,
    /// Explicit resolver mode; derived from `compile` when absent.
    pub resolve_with: Option<String>,
    /// Asset host prepended to generated URLs.
    pub host: Option<String>,
    /// Protocol for the asset host: `relative`, `request`, or a scheme.
    pub protocol: Option<String>,
    /// Emit preload hints for rendered tags.
    pub preload_links_header: bool,
    /// Append `nopush` to preload hints.
    pub nopush: bool,
    /// Transport used to deliver preload hints.
    pub preload_transport: PreloadTransport,
}

impl Default for AssetsConfig {
    fn default() -> Self {
        Self {
            precompile: DEFAULT_PRECOMPILE.iter().map(|glob| glob.to_string()).collect(),
            prefix: "/assets".into(),
            manifest: "config/manifest.json".into(),
            compile: true,
            resolve_with: None,
            host: None,
            protocol: None,
            preload_links_header: true,
            nopush: true,
            preload_transport: PreloadTransport::Link,
        }
    }
}

impl AssetsConfig {
    /// Attempt to load configuration from the provided directory.
    ///
    /// A missing file yields the defaults. A file that fails to parse is logged and also
    /// falls back to the defaults.
    pub fn discover(project_dir: &Path) -> Self {
        let candidate = project_dir.join(DEFAULT_CONFIG_FILE);
        if !candidate.exists() {
            return Self::default();
        }
        Self::from_path(&candidate).unwrap_or_else(|err| {
            warn!(
                config = %candidate.display(),
                error = ?err,
                "ignoring unreadable assets configuration"
            );
            Self::default()
        })
    }

    /// Read configuration from a specific JSON file.
    pub fn from_path(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)
            .with_context(|| format!("failed to read assets configuration {}", path.display()))?;
        serde_json::from_str(&content)
            .with_context(|| format!("failed to parse assets configuration {}", path.display()))
    }

    /// Resolver mode named by `resolve_with`, or derived from `compile`.
    pub fn resolver_mode(&self) -> Result<ResolverMode, AssetError> {
        match &self.resolve_with {
            Some(mode) => mode.parse(),
            None if self.compile => Ok(ResolverMode::Environment),
            None => Ok(ResolverMode::Manifest),
        }
    }

    /// Compile the precompile globs.
    pub fn precompile_policy(&self) -> Result<PrecompilePolicy, AssetError> {
        PrecompilePolicy::from_globs(&self.precompile)
    }

    /// Absolute manifest location for a project rooted at `root`.
    pub fn manifest_path(&self, root: &Path) -> PathBuf {
        root.join(&self.manifest)
    }

    /// View settings shared by every render.
    pub fn view_config(&self) -> ViewConfig {
        ViewConfig {
            prefix: self.prefix.clone(),
            host: self.host.clone(),
            protocol: self.protocol.clone(),
            preload_transport: self.preload_transport,
        }
    }

    /// Default per-call tag options.
    pub fn tag_options(&self) -> TagOptions {
        TagOptions {
            preload_header: self.preload_links_header,
            nopush: self.nopush,
            ..TagOptions::default()
        }
    }
}

/// Everything tag rendering needs, built once and read-only afterwards.
#[derive(Debug, Clone)]
pub struct AssetContext {
    resolver: Resolver,
    policy: Arc<PrecompilePolicy>,
    manifest: Option<Arc<ManifestTable>>,
    view: ViewConfig,
    tag_options: TagOptions,
}

impl AssetContext {
    /// Validate `config` and wire the resolver for its mode.
    ///
    /// The manifest is read from `root` only in manifest mode; environment mode requires
    /// `environment`.
    pub fn new(
        config: &AssetsConfig,
        root: &Path,
        environment: Option<Arc<dyn BuildEnvironment>>,
    ) -> Result<Self> {
        let mode = config.resolver_mode()?;
        let policy = Arc::new(config.precompile_policy()?);

        let manifest = match mode {
            ResolverMode::Manifest => {
                Some(Arc::new(ManifestTable::load(&config.manifest_path(root))?))
            }
            ResolverMode::Environment => None,
        };

        let resolver = Resolver::for_mode(mode, manifest.clone(), environment, policy.clone())?;
        info!(
            mode = %mode,
            precompile = policy.len(),
            prefix = %config.prefix,
            "asset context ready"
        );

        Ok(Self {
            resolver,
            policy,
            manifest,
            view: config.view_config(),
            tag_options: config.tag_options(),
        })
    }

    /// Resolver selected for the configured mode.
    pub fn resolver(&self) -> &Resolver {
        &self.resolver
    }

    /// Compiled precompile policy.
    pub fn policy(&self) -> &PrecompilePolicy {
        &self.policy
    }

    /// Loaded manifest, in manifest mode.
    pub fn manifest(&self) -> Option<&ManifestTable> {
        self.manifest.as_deref()
    }

    /// View settings shared by every render.
    pub fn view(&self) -> &ViewConfig {
        &self.view
    }

    /// Configured default tag options.
    pub fn tag_options(&self) -> TagOptions {
        self.tag_options.clone()
    }

    /// Manifest entries that would misbehave in production: malformed integrity digests and
    /// logical paths outside the precompile list. Empty when no manifest is loaded.
    pub fn check_manifest(&self) -> Vec<(String, String)> {
        let Some(manifest) = self.manifest() else {
            return Vec::new();
        };

        let mut problems: Vec<(String, String)> = manifest
            .validate_integrity()
            .into_iter()
            .map(|(logical_path, err)| (logical_path.to_string(), err.to_string()))
            .collect();
        problems.extend(
            manifest
                .iter()
                .filter(|(logical_path, _)| !self.policy.allows(logical_path))
                .map(|(logical_path, _)| {
                    (
                        logical_path.to_string(),
                        "not covered by the precompile list".to_string(),
                    )
                }),
        );
        problems
    }

    /// Tag builder for one render.
    pub fn tag_builder<'a>(&'a self, render: &'a RenderContext) -> TagBuilder<'a> {
        TagBuilder::new(&self.resolver, &self.view, render)
    }
}
