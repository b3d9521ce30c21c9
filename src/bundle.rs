//! Capture bundles: one JSON document holding everything the encoder needs
//! for a page

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;
use stylevec_encoder::{DesignTokens, StyleNode, StyleReport, Viewport};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CaptureBundle {
    pub viewport: Viewport,
    #[serde(default)]
    pub nodes: Vec<StyleNode>,
    #[serde(default)]
    pub tokens: DesignTokens,
    #[serde(default)]
    pub report: StyleReport,
}

impl CaptureBundle {
    pub fn from_json(json: &str) -> Result<Self> {
        serde_json::from_str(json).context("Failed to parse capture bundle")
    }

    pub fn from_path(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let json = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read capture bundle {}", path.display()))?;
        Self::from_json(&json).with_context(|| format!("Invalid capture bundle {}", path.display()))
    }
}
