//! Rendering `<script>` and `<link>` tags for logical asset references.
//!
//! A [`TagBuilder`] lives for one render. Each call resolves its sources in order, decides on
//! integrity attributes from the request's security, layers the caller's attributes over the
//! computed defaults, and gathers preload hints. Hints are written to the header sink once,
//! after every source rendered, and only when at least one was produced.

mod html;
mod options;
mod preload;

use std::collections::BTreeSet;

use tracing::debug;

use crate::error::Result;
use crate::request::{HeaderSink, RenderContext};
use crate::resolver::AssetResolver;
use crate::url::{
  AssetKind, HostUrlComposer, UrlComposer, UrlOptions, is_data_uri, is_external, join_prefix,
  split_query_fragment, with_extname,
};

use html::{Attributes, content_tag, void_tag};

pub use html::AttrValue;
pub use options::{IntegrityOption, NonceOption, TagOptions};
pub use preload::{PRELOAD_HEADER, PreloadTransport};

/// View-level settings shared by every render, derived from configuration at boot.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ViewConfig {
  /// URL prefix served paths are joined onto.
  pub prefix: String,
  /// Default asset host.
  pub host: Option<String>,
  /// Default asset host protocol.
  pub protocol: Option<String>,
  /// How preload hints reach the response.
  pub preload_transport: PreloadTransport,
}

impl Default for ViewConfig {
  fn default() -> Self {
    Self {
      prefix: "/assets".into(),
      host: None,
      protocol: None,
      preload_transport: PreloadTransport::Link,
    }
  }
}

/// Markup and preload hints produced by one tag-building call.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TagOutput {
  /// Tags joined by newlines.
  pub markup: String,
  /// Preload hints, in source order.
  pub preload_links: Vec<String>,
}

struct Located {
  url: String,
  logical_path: Option<String>,
  external: bool,
}

/// Per-render tag builder.
pub struct TagBuilder<'a> {
  resolver: &'a dyn AssetResolver,
  view: &'a ViewConfig,
  context: &'a RenderContext,
  composer: &'a dyn UrlComposer,
  headers: Option<&'a mut dyn HeaderSink>,
}

impl<'a> TagBuilder<'a> {
  /// Builder resolving through `resolver` for the request described by `context`.
  pub fn new(
    resolver: &'a dyn AssetResolver,
    view: &'a ViewConfig,
    context: &'a RenderContext,
  ) -> Self {
    Self {
      resolver,
      view,
      context,
      composer: &HostUrlComposer,
      headers: None,
    }
  }

  /// Replace the URL composer.
  pub fn with_composer(mut self, composer: &'a dyn UrlComposer) -> Self {
    self.composer = composer;
    self
  }

  /// Write preload hints to `headers`.
  pub fn with_header_sink(mut self, headers: &'a mut dyn HeaderSink) -> Self {
    self.headers = Some(headers);
    self
  }

  /// URL for a reference of the given kind, without rendering a tag.
  pub fn asset_path(&self, source: &str, kind: AssetKind, options: &TagOptions) -> Result<String> {
    self.locate(source, kind, options).map(|located| located.url)
  }

  /// URL for a script reference.
  pub fn javascript_path(&self, source: &str, options: &TagOptions) -> Result<String> {
    self.asset_path(source, AssetKind::Script, options)
  }

  /// URL for a stylesheet reference.
  pub fn stylesheet_path(&self, source: &str, options: &TagOptions) -> Result<String> {
    self.asset_path(source, AssetKind::Stylesheet, options)
  }

  /// Render one `<script>` per distinct source.
  pub fn script_tags<S: AsRef<str>>(
    &mut self,
    sources: &[S],
    options: &TagOptions,
  ) -> Result<TagOutput> {
    self.build_tags(sources, AssetKind::Script, options)
  }

  /// Render one `<link rel="stylesheet">` per distinct source.
  pub fn stylesheet_tags<S: AsRef<str>>(
    &mut self,
    sources: &[S],
    options: &TagOptions,
  ) -> Result<TagOutput> {
    self.build_tags(sources, AssetKind::Stylesheet, options)
  }

  fn build_tags<S: AsRef<str>>(
    &mut self,
    sources: &[S],
    kind: AssetKind,
    options: &TagOptions,
  ) -> Result<TagOutput> {
    let mut seen = BTreeSet::new();
    let mut tags = Vec::new();
    let mut preload_links = Vec::new();

    for source in sources.iter().map(AsRef::as_ref) {
      if !seen.insert(source) {
        continue;
      }

      let located = self.locate(source, kind, options)?;
      let attributes = self.tag_attributes(&located, kind, options)?;

      if options.preload_header
        && !located.external
        && !located.url.is_empty()
        && !is_data_uri(&located.url)
        && !(kind == AssetKind::Script && attributes.is_present("defer"))
      {
        preload_links.extend(preload::preload_fragment(
          &located.url,
          kind,
          &attributes,
          options.nopush,
        ));
      }

      tags.push(match kind {
        AssetKind::Script => content_tag("script", &attributes),
        AssetKind::Stylesheet | AssetKind::Other => void_tag("link", &attributes),
      });
    }

    self.send_preload_header(&preload_links);

    Ok(TagOutput {
      markup: tags.join("\n"),
      preload_links,
    })
  }

  fn locate(&self, source: &str, kind: AssetKind, options: &TagOptions) -> Result<Located> {
    if source.is_empty() || is_external(source) {
      return Ok(Located {
        url: source.to_string(),
        logical_path: None,
        external: !source.is_empty(),
      });
    }

    let (base, tail) = split_query_fragment(source);
    let path = with_extname(base, kind, &options.extname);

    let (root_relative, logical_path) = if path.starts_with('/') {
      (path, None)
    } else if options.skip_pipeline {
      let public = match kind.public_dir() {
        Some(dir) => format!("/{dir}/{path}"),
        None => format!("/{path}"),
      };
      (public, None)
    } else {
      let resolved = self.resolver.resolve(&path)?;
      (join_prefix(&self.view.prefix, &resolved.served_path), Some(path))
    };

    let url_options = UrlOptions {
      host: options.host.as_deref().or(self.view.host.as_deref()),
      protocol: options.protocol.as_deref().or(self.view.protocol.as_deref()),
      request: self.context.request.as_ref(),
    };
    let url = self.composer.to_asset_url(&root_relative, &url_options);

    Ok(Located {
      url: format!("{url}{tail}"),
      logical_path,
      external: false,
    })
  }

  fn tag_attributes(
    &self,
    located: &Located,
    kind: AssetKind,
    options: &TagOptions,
  ) -> Result<Attributes> {
    let mut attributes = Attributes::default();
    match kind {
      AssetKind::Script => attributes.set("src", located.url.as_str()),
      AssetKind::Stylesheet | AssetKind::Other => {
        attributes.set("rel", "stylesheet");
        attributes.set("href", located.url.as_str());
        attributes.set("media", "screen");
      }
    }

    if let Some(r#type) = &options.r#type {
      attributes.set("type", r#type.as_str());
    }
    if let Some(media) = &options.media {
      attributes.set("media", media.as_str());
    }
    if let Some(crossorigin) = &options.crossorigin {
      attributes.set("crossorigin", crossorigin.as_str());
    }
    if options.defer {
      attributes.set("defer", true);
    }
    if options.async_load {
      attributes.set("async", true);
    }
    match &options.nonce {
      Some(NonceOption::Auto) => attributes.set("nonce", true),
      Some(NonceOption::Value(nonce)) => attributes.set("nonce", nonce.as_str()),
      None => {}
    }
    for (name, value) in &options.attributes {
      attributes.set(name, value.clone());
    }

    if attributes.get("nonce") == Some(&AttrValue::Flag(true)) {
      match &self.context.csp_nonce {
        Some(nonce) => attributes.set("nonce", nonce.as_str()),
        None => attributes.remove("nonce"),
      }
    }
    if attributes.get("crossorigin") == Some(&AttrValue::Flag(true)) {
      attributes.set("crossorigin", "anonymous");
    }

    match self.integrity(located, options)? {
      Some(integrity) => attributes.set("integrity", integrity),
      None => attributes.remove("integrity"),
    }

    Ok(attributes)
  }

  fn integrity(&self, located: &Located, options: &TagOptions) -> Result<Option<String>> {
    if !self.context.is_secure() {
      return Ok(None);
    }

    match &options.integrity {
      Some(IntegrityOption::Compute) => match &located.logical_path {
        Some(logical_path) => self.resolver.integrity_for(logical_path),
        None => Ok(None),
      },
      Some(IntegrityOption::Value(value)) => Ok(Some(value.clone())),
      Some(IntegrityOption::Omit) | None => Ok(None),
    }
  }

  fn send_preload_header(&mut self, preload_links: &[String]) {
    if preload_links.is_empty() {
      return;
    }
    let Some(headers) = self.headers.as_deref_mut() else {
      return;
    };

    let value = preload_links.join(self.view.preload_transport.separator());
    debug!(hints = preload_links.len(), "sending preload header");
    headers.send_header(PRELOAD_HEADER, &value);
  }
}
