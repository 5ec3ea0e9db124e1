//! Credential file loading.

use std::path::Path;

use anyhow::{Context, Result};
use serde_json::Value;

/// Read a JSON or YAML document.
pub fn load_document(path: &Path) -> Result<Value> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read {}", path.display()))?;
    let is_yaml = matches!(
        path.extension().and_then(|e| e.to_str()),
        Some("yaml") | Some("yml")
    );
    if is_yaml {
        serde_yaml::from_str(&content).with_context(|| format!("invalid YAML in {}", path.display()))
    } else {
        serde_json::from_str(&content).with_context(|| format!("invalid JSON in {}", path.display()))
    }
}
