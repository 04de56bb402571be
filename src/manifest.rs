//! Loading the persisted asset manifest produced by a prior build.

use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::error::AssetError;
use crate::integrity::IntegrityDigest;

/// One compiled asset recorded in the manifest.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct ManifestEntry {
  /// Served path of the built artifact, relative to the assets prefix.
  pub path: String,
  /// Subresource Integrity digest, e.g. `sha256-<base64>`.
  #[serde(default)]
  pub integrity: Option<String>,
  /// Hex content hash embedded in the served path.
  #[serde(default)]
  pub digest: Option<String>,
  /// Size of the built artifact in bytes.
  #[serde(default)]
  pub size: Option<u64>,
}

/// Immutable mapping from logical path (with extension) to its build output.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(transparent)]
pub struct ManifestTable {
  entries: BTreeMap<String, ManifestEntry>,
}

impl ManifestTable {
  /// Load a manifest from disk.
  pub fn load(path: &Path) -> Result<Self> {
    let content = fs::read_to_string(path)
      .with_context(|| format!("manifest not found at {}", path.display()))?;
    let table = Self::from_json_str(&content)
      .with_context(|| format!("failed to parse asset manifest {}", path.display()))?;
    info!(
      manifest = %path.display(),
      entries = table.len(),
      "loaded asset manifest"
    );
    Ok(table)
  }

  /// Parse a manifest document.
  ///
  /// Entries with malformed integrity values are kept as-is and logged; use
  /// [`ManifestTable::validate_integrity`] for a strict check.
  pub fn from_json_str(content: &str) -> Result<Self> {
    let table: ManifestTable =
      serde_json::from_str(content).context("failed to parse asset manifest JSON")?;
    for (logical_path, err) in table.validate_integrity() {
      warn!(logical_path, error = %err, "manifest entry carries a malformed integrity digest");
    }
    Ok(table)
  }

  /// Look up the entry for a logical path.
  pub fn get(&self, logical_path: &str) -> Option<&ManifestEntry> {
    self.entries.get(logical_path)
  }

  /// Number of recorded assets.
  pub fn len(&self) -> usize {
    self.entries.len()
  }

  /// Returns `true` when the manifest records no assets.
  pub fn is_empty(&self) -> bool {
    self.entries.is_empty()
  }

  /// Iterate over logical paths and their entries in sorted order.
  pub fn iter(&self) -> impl Iterator<Item = (&str, &ManifestEntry)> {
    self
      .entries
      .iter()
      .map(|(logical, entry)| (logical.as_str(), entry))
  }

  /// Every entry whose integrity value is present but not a valid digest.
  pub fn validate_integrity(&self) -> Vec<(&str, AssetError)> {
    self
      .iter()
      .filter_map(|(logical, entry)| {
        let integrity = entry.integrity.as_deref()?;
        integrity
          .parse::<IntegrityDigest>()
          .err()
          .map(|err| (logical, err))
      })
      .collect()
  }
}

impl FromIterator<(String, ManifestEntry)> for ManifestTable {
  fn from_iter<T: IntoIterator<Item = (String, ManifestEntry)>>(iter: T) -> Self {
    Self {
      entries: iter.into_iter().collect(),
    }
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use tempfile::tempdir;

  const SHA: &str = "sha256-gVCgjF7iMSc1EdFY7yxU0sDQ/l5YLLvP2JY0BSeO0p8=";

  fn document() -> String {
    format!(
      r#"{{
        "application.js": {{
          "path": "application-8150a08c.js",
          "integrity": "{SHA}",
          "digest": "8150a08c",
          "size": 29
        }},
        "logo.png": {{ "path": "logo-6105d6cc.png" }}
      }}"#
    )
  }

  #[test]
  fn parses_flat_manifest_schema() {
    let table = ManifestTable::from_json_str(&document()).unwrap();
    assert_eq!(table.len(), 2);

    let entry = table.get("application.js").unwrap();
    assert_eq!(entry.path, "application-8150a08c.js");
    assert_eq!(entry.integrity.as_deref(), Some(SHA));
    assert_eq!(entry.digest.as_deref(), Some("8150a08c"));
    assert_eq!(entry.size, Some(29));

    let image = table.get("logo.png").unwrap();
    assert_eq!(image.integrity, None);
    assert!(table.get("missing.js").is_none());
  }

  #[test]
  fn load_reads_manifest_from_disk() {
    let temp = tempdir().expect("failed to create temp dir");
    let path = temp.path().join("manifest.json");
    fs::write(&path, document()).expect("failed to write manifest");

    let table = ManifestTable::load(&path).unwrap();
    assert_eq!(
      table.iter().map(|(logical, _)| logical).collect::<Vec<_>>(),
      vec!["application.js", "logo.png"]
    );
  }

  #[test]
  fn load_reports_missing_file() {
    let temp = tempdir().expect("failed to create temp dir");
    let err = ManifestTable::load(&temp.path().join("nope.json")).unwrap_err();
    assert!(err.to_string().contains("manifest not found"));
  }

  #[test]
  fn rejects_entries_without_served_path() {
    assert!(ManifestTable::from_json_str(r#"{"app.js": {"integrity": "x"}}"#).is_err());
  }

  #[test]
  fn malformed_integrity_is_kept_but_reported() {
    let table =
      ManifestTable::from_json_str(r#"{"app.js": {"path": "app-1.js", "integrity": "sha256-XYZ"}}"#)
        .unwrap();
    assert_eq!(
      table.get("app.js").unwrap().integrity.as_deref(),
      Some("sha256-XYZ")
    );

    let problems = table.validate_integrity();
    assert_eq!(problems.len(), 1);
    assert_eq!(problems[0].0, "app.js");
  }

  #[test]
  fn collects_from_entries() {
    let table: ManifestTable = [(
      "a.css".to_string(),
      ManifestEntry {
        path: "a-1.css".into(),
        integrity: None,
        digest: None,
        size: None,
      },
    )]
    .into_iter()
    .collect();
    assert_eq!(table.get("a.css").unwrap().path, "a-1.css");
  }
}
