//! Per-render view of the current request and the response headers it may receive.

use std::net::IpAddr;

/// The parts of an incoming request that affect tag rendering.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RequestInfo {
  /// Whether the request arrived over TLS.
  pub ssl: bool,
  /// Address of the connecting client.
  pub remote_addr: Option<IpAddr>,
}

impl RequestInfo {
  /// A plain-HTTP request.
  pub fn http() -> Self {
    Self {
      ssl: false,
      remote_addr: None,
    }
  }

  /// A TLS request.
  pub fn https() -> Self {
    Self {
      ssl: true,
      remote_addr: None,
    }
  }

  /// Attach the client address.
  pub fn with_remote_addr(mut self, addr: IpAddr) -> Self {
    self.remote_addr = Some(addr);
    self
  }

  /// Scheme prefix including the separator, e.g. `https://`.
  pub fn protocol(&self) -> &'static str {
    if self.ssl { "https://" } else { "http://" }
  }

  /// Returns `true` when the client connected over loopback.
  pub fn is_local(&self) -> bool {
    self.remote_addr.is_some_and(|addr| match addr {
      IpAddr::V4(v4) => v4.is_loopback(),
      IpAddr::V6(v6) => v6.is_loopback() || v6.to_ipv4_mapped().is_some_and(|v4| v4.is_loopback()),
    })
  }
}

/// Request-scoped inputs to tag rendering.
#[derive(Debug, Clone, Default)]
pub struct RenderContext {
  /// Active request, if rendering happens inside one.
  pub request: Option<RequestInfo>,
  /// Content-Security-Policy nonce issued for this response.
  pub csp_nonce: Option<String>,
}

impl RenderContext {
  /// Context for rendering inside the given request.
  pub fn for_request(request: RequestInfo) -> Self {
    Self {
      request: Some(request),
      csp_nonce: None,
    }
  }

  /// Attach the response's CSP nonce.
  pub fn with_nonce(mut self, nonce: impl Into<String>) -> Self {
    self.csp_nonce = Some(nonce.into());
    self
  }

  /// Whether integrity metadata may be emitted.
  ///
  /// Non-secure contexts remain non-secure: integrity is only served when there is no
  /// request at all, or the request is local or encrypted.
  pub fn is_secure(&self) -> bool {
    match &self.request {
      None => true,
      Some(request) => request.is_local() || request.ssl,
    }
  }
}

/// Destination for outgoing response headers.
pub trait HeaderSink {
  /// Send one header.
  fn send_header(&mut self, name: &str, value: &str);
}

/// Header sink that records what it was given.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RecordedHeaders {
  /// Headers in the order they were sent.
  pub headers: Vec<(String, String)>,
}

impl HeaderSink for RecordedHeaders {
  fn send_header(&mut self, name: &str, value: &str) {
    self.headers.push((name.to_string(), value.to_string()));
  }
}

#[cfg(test)]
mod tests {
  use std::net::{Ipv4Addr, Ipv6Addr};

  use super::*;

  #[test]
  fn no_request_is_secure() {
    assert!(RenderContext::default().is_secure());
  }

  #[test]
  fn tls_requests_are_secure() {
    assert!(RenderContext::for_request(RequestInfo::https()).is_secure());
  }

  #[test]
  fn plain_remote_requests_are_not_secure() {
    let request = RequestInfo::http().with_remote_addr(IpAddr::V4(Ipv4Addr::new(203, 0, 113, 9)));
    assert!(!RenderContext::for_request(request).is_secure());
    assert!(!RenderContext::for_request(RequestInfo::http()).is_secure());
  }

  #[test]
  fn loopback_requests_are_secure() {
    let v4 = RequestInfo::http().with_remote_addr(IpAddr::V4(Ipv4Addr::LOCALHOST));
    let v6 = RequestInfo::http().with_remote_addr(IpAddr::V6(Ipv6Addr::LOCALHOST));
    let mapped = RequestInfo::http()
      .with_remote_addr(IpAddr::V6(Ipv4Addr::LOCALHOST.to_ipv6_mapped()));
    assert!(RenderContext::for_request(v4).is_secure());
    assert!(RenderContext::for_request(v6).is_secure());
    assert!(RenderContext::for_request(mapped).is_secure());
  }

  #[test]
  fn protocol_follows_tls() {
    assert_eq!(RequestInfo::https().protocol(), "https://");
    assert_eq!(RequestInfo::http().protocol(), "http://");
  }

  #[test]
  fn recorded_headers_keep_order() {
    let mut sink = RecordedHeaders::default();
    sink.send_header("Link", "</a.js>; rel=preload; as=script");
    sink.send_header("X-Other", "1");
    assert_eq!(sink.headers[0].0, "Link");
    assert_eq!(sink.headers.len(), 2);
  }
}
