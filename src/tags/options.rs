//! Caller-facing options for tag rendering.

use std::collections::BTreeMap;

use super::html::AttrValue;
use crate::url::Extname;

/// Whether and how to emit an `integrity` attribute.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum IntegrityOption {
  /// Ask the resolver for the asset's digest.
  Compute,
  /// Use this digest verbatim.
  Value(String),
  /// Never emit the attribute.
  Omit,
}

/// Value for the `nonce` attribute.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NonceOption {
  /// Use the response's Content-Security-Policy nonce.
  Auto,
  /// Use this nonce verbatim.
  Value(String),
}

/// Options for one `script_tags`/`stylesheet_tags` call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TagOptions {
  /// Protocol for the asset host: `relative`, `request`, or a scheme.
  pub protocol: Option<String>,
  /// Asset host overriding the configured one.
  pub host: Option<String>,
  /// Extension handling for logical references.
  pub extname: Extname,
  /// Serve from the public directory instead of the pipeline.
  pub skip_pipeline: bool,
  /// Integrity attribute behaviour; `None` emits nothing.
  pub integrity: Option<IntegrityOption>,
  /// `crossorigin` attribute.
  pub crossorigin: Option<String>,
  /// `nonce` attribute.
  pub nonce: Option<NonceOption>,
  /// Accumulate preload hints for the response header.
  pub preload_header: bool,
  /// Append `nopush` to preload hints.
  pub nopush: bool,
  /// `media` attribute; stylesheets default to `screen`.
  pub media: Option<String>,
  /// Mark scripts `defer`; deferred scripts are not preloaded.
  pub defer: bool,
  /// Mark scripts `async`.
  pub async_load: bool,
  /// `type` attribute; `module` switches hints to `modulepreload`.
  pub r#type: Option<String>,
  /// Further attributes layered over the computed ones; the caller wins on conflict.
  pub attributes: BTreeMap<String, AttrValue>,
}

impl Default for TagOptions {
  fn default() -> Self {
    Self {
      protocol: None,
      host: None,
      extname: Extname::Inferred,
      skip_pipeline: false,
      integrity: None,
      crossorigin: None,
      nonce: None,
      preload_header: true,
      nopush: true,
      media: None,
      defer: false,
      async_load: false,
      r#type: None,
      attributes: BTreeMap::new(),
    }
  }
}

impl TagOptions {
  /// Request an integrity attribute computed by the resolver.
  pub fn with_integrity(mut self) -> Self {
    self.integrity = Some(IntegrityOption::Compute);
    self
  }

  /// Layer an extra attribute over the computed ones.
  pub fn with_attribute(mut self, name: &str, value: impl Into<AttrValue>) -> Self {
    self.attributes.insert(name.to_string(), value.into());
    self
  }
}
