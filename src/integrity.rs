//! Subresource Integrity digest validation.

use std::fmt;
use std::str::FromStr;

use base64::{Engine as _, engine::general_purpose};

use crate::error::AssetError;

/// Hash algorithm named by an integrity digest prefix.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IntegrityAlgorithm {
  /// `sha256-`
  Sha256,
  /// `sha384-`
  Sha384,
  /// `sha512-`
  Sha512,
}

impl IntegrityAlgorithm {
  fn prefix(self) -> &'static str {
    match self {
      Self::Sha256 => "sha256",
      Self::Sha384 => "sha384",
      Self::Sha512 => "sha512",
    }
  }

  fn digest_len(self) -> usize {
    match self {
      Self::Sha256 => 32,
      Self::Sha384 => 48,
      Self::Sha512 => 64,
    }
  }
}

/// A parsed `<algorithm>-<base64 digest>` integrity value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IntegrityDigest {
  algorithm: IntegrityAlgorithm,
  encoded: String,
}

impl IntegrityDigest {
  /// Algorithm named by the digest.
  pub fn algorithm(&self) -> IntegrityAlgorithm {
    self.algorithm
  }
}

impl FromStr for IntegrityDigest {
  type Err = AssetError;

  fn from_str(value: &str) -> Result<Self, Self::Err> {
    let invalid = |reason: &str| AssetError::InvalidIntegrity {
      value: value.to_string(),
      reason: reason.to_string(),
    };

    let (prefix, encoded) = value
      .split_once('-')
      .ok_or_else(|| invalid("missing algorithm prefix"))?;
    let algorithm = match prefix {
      "sha256" => IntegrityAlgorithm::Sha256,
      "sha384" => IntegrityAlgorithm::Sha384,
      "sha512" => IntegrityAlgorithm::Sha512,
      _ => return Err(invalid("unsupported hash algorithm")),
    };

    let bytes = general_purpose::STANDARD
      .decode(encoded)
      .map_err(|err| invalid(&err.to_string()))?;
    if bytes.len() != algorithm.digest_len() {
      return Err(invalid(&format!(
        "expected {} digest bytes, found {}",
        algorithm.digest_len(),
        bytes.len()
      )));
    }

    Ok(Self {
      algorithm,
      encoded: encoded.to_string(),
    })
  }
}

impl fmt::Display for IntegrityDigest {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    write!(f, "{}-{}", self.algorithm.prefix(), self.encoded)
  }
}
