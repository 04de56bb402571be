//! Parsing asset references and composing the final URL around a served path.

use std::sync::OnceLock;

use regex::Regex;

use crate::request::RequestInfo;

fn external_reference() -> &'static Regex {
  static PATTERN: OnceLock<Regex> = OnceLock::new();
  PATTERN.get_or_init(|| {
    Regex::new(r"(?i)^(?:[-a-z]+://|(?:cid|data):|//)").expect("invalid external reference regex")
  })
}

/// Kind of asset a reference points at; decides extension and public directory.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AssetKind {
  /// JavaScript, rendered with `<script>`.
  Script,
  /// CSS, rendered with `<link rel="stylesheet">`.
  Stylesheet,
  /// Any other asset; no extension is inferred.
  Other,
}

impl AssetKind {
  /// Extension appended to references that lack it.
  pub fn default_extname(self) -> Option<&'static str> {
    match self {
      Self::Script => Some(".js"),
      Self::Stylesheet => Some(".css"),
      Self::Other => None,
    }
  }

  /// Public directory used when the pipeline is skipped.
  pub fn public_dir(self) -> Option<&'static str> {
    match self {
      Self::Script => Some("javascripts"),
      Self::Stylesheet => Some("stylesheets"),
      Self::Other => None,
    }
  }

  /// Value of the `as=` parameter in preload hints.
  pub fn preload_as(self) -> Option<&'static str> {
    match self {
      Self::Script => Some("script"),
      Self::Stylesheet => Some("style"),
      Self::Other => None,
    }
  }
}

/// How to treat the extension of a reference.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum Extname {
  /// Append the kind's default extension when missing.
  #[default]
  Inferred,
  /// Append this extension when missing.
  Custom(String),
  /// Never append an extension.
  Disabled,
}

/// Returns `true` for scheme-qualified, protocol-relative, `data:` and `cid:` references.
pub fn is_external(source: &str) -> bool {
  external_reference().is_match(source)
}

/// Returns `true` for `data:` URIs.
pub fn is_data_uri(href: &str) -> bool {
  href
    .get(..5)
    .is_some_and(|scheme| scheme.eq_ignore_ascii_case("data:"))
}

/// Split a reference at the first `?` or `#`, keeping the delimiter on the tail.
pub fn split_query_fragment(source: &str) -> (&str, &str) {
  match source.find(['?', '#']) {
    Some(index) => source.split_at(index),
    None => (source, ""),
  }
}

/// Append the extension chosen by `extname` unless the path already carries it.
pub fn with_extname(path: &str, kind: AssetKind, extname: &Extname) -> String {
  let ext = match extname {
    Extname::Inferred => kind.default_extname(),
    Extname::Custom(ext) => Some(ext.as_str()),
    Extname::Disabled => None,
  };

  match ext {
    Some(ext) if !ext.is_empty() && !path.ends_with(ext) => format!("{path}{ext}"),
    _ => path.to_string(),
  }
}

/// Join a served path onto the assets prefix with exactly one separator.
pub fn join_prefix(prefix: &str, path: &str) -> String {
  format!(
    "{}/{}",
    prefix.trim_end_matches('/'),
    path.trim_start_matches('/')
  )
}

/// Host and protocol inputs for URL composition.
#[derive(Debug, Clone, Copy, Default)]
pub struct UrlOptions<'a> {
  /// Asset host, with or without a scheme.
  pub host: Option<&'a str>,
  /// `relative`, `request`, or a scheme name.
  pub protocol: Option<&'a str>,
  /// Active request, consulted for the `request` protocol.
  pub request: Option<&'a RequestInfo>,
}

/// Turns a root-relative asset path into the URL emitted in markup.
pub trait UrlComposer {
  /// Compose the final URL for `path`.
  fn to_asset_url(&self, path: &str, options: &UrlOptions<'_>) -> String;
}

/// Prefixes the asset host, if any, choosing the protocol like a browser-facing view would.
#[derive(Debug, Clone, Copy, Default)]
pub struct HostUrlComposer;

impl UrlComposer for HostUrlComposer {
  fn to_asset_url(&self, path: &str, options: &UrlOptions<'_>) -> String {
    let Some(host) = options.host.map(str::trim).filter(|host| !host.is_empty()) else {
      return path.to_string();
    };
    let host = host.trim_end_matches('/');

    if host.contains("://") || host.starts_with("//") {
      return format!("{host}{path}");
    }

    let protocol = options.protocol.unwrap_or(if options.request.is_some() {
      "request"
    } else {
      "relative"
    });

    match (protocol, options.request) {
      ("request", Some(request)) => format!("{}{host}{path}", request.protocol()),
      ("request", None) | ("relative", _) => format!("//{host}{path}"),
      (scheme, _) => format!("{}://{host}{path}", scheme.trim_end_matches("://")),
    }
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn detects_external_references() {
    assert!(is_external("http://example.com/script"));
    assert!(is_external("HTTPS://example.com/app.js"));
    assert!(is_external("//example.com/script.js"));
    assert!(is_external("data:text/css,body{}"));
    assert!(is_external("cid:part1"));
    assert!(!is_external("application"));
    assert!(!is_external("/application.js"));
    assert!(!is_external("sub/app.js"));
  }

  #[test]
  fn detects_data_uris() {
    assert!(is_data_uri("data:text/javascript,alert(1)"));
    assert!(is_data_uri("DATA:text/css,"));
    assert!(!is_data_uri("/assets/data.js"));
    assert!(!is_data_uri("dat"));
  }

  #[test]
  fn splits_query_and_fragment() {
    assert_eq!(split_query_fragment("app.js?v=1#x"), ("app.js", "?v=1#x"));
    assert_eq!(split_query_fragment("app#hash"), ("app", "#hash"));
    assert_eq!(split_query_fragment("app"), ("app", ""));
  }

  #[test]
  fn appends_inferred_extension_once() {
    assert_eq!(with_extname("application", AssetKind::Script, &Extname::Inferred), "application.js");
    assert_eq!(with_extname("application.js", AssetKind::Script, &Extname::Inferred), "application.js");
    assert_eq!(with_extname("jquery.min", AssetKind::Script, &Extname::Inferred), "jquery.min.js");
    assert_eq!(with_extname("bank", AssetKind::Stylesheet, &Extname::Inferred), "bank.css");
    assert_eq!(with_extname("logo.png", AssetKind::Other, &Extname::Inferred), "logo.png");
  }

  #[test]
  fn respects_custom_and_disabled_extensions() {
    assert_eq!(
      with_extname("app", AssetKind::Script, &Extname::Custom(".mjs".into())),
      "app.mjs"
    );
    assert_eq!(with_extname("app", AssetKind::Script, &Extname::Disabled), "app");
  }

  #[test]
  fn joins_prefix_with_single_separator() {
    assert_eq!(join_prefix("/assets", "app-1.js"), "/assets/app-1.js");
    assert_eq!(join_prefix("/assets/", "/app-1.js"), "/assets/app-1.js");
    assert_eq!(join_prefix("", "app-1.js"), "/app-1.js");
    assert_eq!(join_prefix("/", "app-1.js"), "/app-1.js");
  }

  #[test]
  fn leaves_paths_alone_without_host() {
    let url = HostUrlComposer.to_asset_url("/assets/app.js", &UrlOptions::default());
    assert_eq!(url, "/assets/app.js");
  }

  #[test]
  fn host_with_scheme_is_used_verbatim() {
    let options = UrlOptions {
      host: Some("https://cdn.example.com/"),
      ..UrlOptions::default()
    };
    assert_eq!(
      HostUrlComposer.to_asset_url("/assets/app.js", &options),
      "https://cdn.example.com/assets/app.js"
    );
  }

  #[test]
  fn request_protocol_follows_active_request() {
    let request = RequestInfo::https();
    let options = UrlOptions {
      host: Some("assets.example.com"),
      protocol: None,
      request: Some(&request),
    };
    assert_eq!(
      HostUrlComposer.to_asset_url("/assets/app.js", &options),
      "https://assets.example.com/assets/app.js"
    );
  }

  #[test]
  fn relative_protocol_without_request() {
    let options = UrlOptions {
      host: Some("assets.example.com"),
      ..UrlOptions::default()
    };
    assert_eq!(
      HostUrlComposer.to_asset_url("/assets/app.js", &options),
      "//assets.example.com/assets/app.js"
    );
  }

  #[test]
  fn explicit_scheme_protocol() {
    let request = RequestInfo::https();
    let options = UrlOptions {
      host: Some("assets.example.com"),
      protocol: Some("http"),
      request: Some(&request),
    };
    assert_eq!(
      HostUrlComposer.to_asset_url("/a.css", &options),
      "http://assets.example.com/a.css"
    );
  }
}
