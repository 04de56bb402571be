//! Preload hints accumulated while rendering tags.

use serde::Deserialize;

use super::html::Attributes;
use crate::url::AssetKind;

/// Response header carrying preload hints.
pub const PRELOAD_HEADER: &str = "Link";

/// How accumulated hints are written to the response.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PreloadTransport {
  /// A regular `Link` header with comma-separated hints.
  #[default]
  Link,
  /// 103 Early Hints with newline-separated hints.
  EarlyHints,
}

impl PreloadTransport {
  /// Separator placed between hints.
  pub fn separator(self) -> &'static str {
    match self {
      Self::Link => ", ",
      Self::EarlyHints => "\n",
    }
  }
}

/// Build the hint for one rendered tag.
pub(crate) fn preload_fragment(
  href: &str,
  kind: AssetKind,
  attributes: &Attributes,
  nopush: bool,
) -> Option<String> {
  let as_type = kind.preload_as()?;
  let rel = if kind == AssetKind::Script && attributes.text("type") == Some("module") {
    "modulepreload"
  } else {
    "preload"
  };

  let mut fragment = format!("<{href}>; rel={rel}; as={as_type}");
  if let Some(crossorigin) = attributes.text("crossorigin") {
    fragment.push_str("; crossorigin=");
    fragment.push_str(crossorigin);
  }
  if let Some(integrity) = attributes.text("integrity") {
    fragment.push_str("; integrity=");
    fragment.push_str(integrity);
  }
  if nopush {
    fragment.push_str("; nopush");
  }
  Some(fragment)
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn plain_script_hint() {
    let fragment =
      preload_fragment("/assets/app-1.js", AssetKind::Script, &Attributes::default(), false);
    assert_eq!(fragment.as_deref(), Some("</assets/app-1.js>; rel=preload; as=script"));
  }

  #[test]
  fn module_scripts_use_modulepreload() {
    let mut attributes = Attributes::default();
    attributes.set("type", "module");
    let fragment = preload_fragment("/a.js", AssetKind::Script, &attributes, true);
    assert_eq!(
      fragment.as_deref(),
      Some("</a.js>; rel=modulepreload; as=script; nopush")
    );
  }

  #[test]
  fn style_hint_carries_crossorigin_and_integrity() {
    let mut attributes = Attributes::default();
    attributes.set("crossorigin", "anonymous");
    attributes.set("integrity", "sha256-abc");
    let fragment = preload_fragment("/a.css", AssetKind::Stylesheet, &attributes, true);
    assert_eq!(
      fragment.as_deref(),
      Some("</a.css>; rel=preload; as=style; crossorigin=anonymous; integrity=sha256-abc; nopush")
    );
  }

  #[test]
  fn other_assets_have_no_hint() {
    assert!(preload_fragment("/a.png", AssetKind::Other, &Attributes::default(), true).is_none());
  }

  #[test]
  fn transports_join_differently() {
    assert_eq!(PreloadTransport::Link.separator(), ", ");
    assert_eq!(PreloadTransport::EarlyHints.separator(), "\n");
  }
}
