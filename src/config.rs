use std::env;

use anyhow::anyhow;
use serde::Deserialize;

use crate::error::{LibError, Result};
use crate::models::{MarkerType, Position, Size};

pub const DEFAULT_NODE_TYPE: &str = "custom";
pub const DEFAULT_NODE_LABEL: &str = "New Node";
pub const DEFAULT_PASTE_OFFSET: Position = Position::new(20.0, 20.0);
pub const DEFAULT_MIN_NODE_SIZE: Size = Size::new(120.0, 40.0);

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct EditorConfig {
    pub node_type: String,
    pub default_label: String,
    pub paste_offset: Position,
    pub min_node_size: Size,
    pub edge_marker: MarkerType,
}

impl Default for EditorConfig {
    fn default() -> Self {
        Self {
            node_type: DEFAULT_NODE_TYPE.to_string(),
            default_label: DEFAULT_NODE_LABEL.to_string(),
            paste_offset: DEFAULT_PASTE_OFFSET,
            min_node_size: DEFAULT_MIN_NODE_SIZE,
            edge_marker: MarkerType::ArrowClosed,
        }
    }
}

impl EditorConfig {
    /// Defaults overridden by `DIAGRAM_*` environment variables.
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|name| env::var(name).ok())
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let mut config = Self::default();

        if let Some(node_type) = non_empty(lookup("DIAGRAM_NODE_TYPE")) {
            config.node_type = node_type;
        }
        if let Some(label) = lookup("DIAGRAM_DEFAULT_LABEL") {
            config.default_label = label;
        }
        if let Some(raw) = non_empty(lookup("DIAGRAM_PASTE_OFFSET")) {
            config.paste_offset = parse_pair(&raw)
                .map(|(x, y)| Position::new(x, y))
                .ok_or_else(|| {
                    LibError::invalid(
                        "DIAGRAM_PASTE_OFFSET must look like '20,20'",
                        anyhow!("invalid DIAGRAM_PASTE_OFFSET '{}'", raw),
                    )
                })?;
        }
        if let Some(raw) = non_empty(lookup("DIAGRAM_MIN_NODE_SIZE")) {
            config.min_node_size = parse_pair(&raw)
                .filter(|(width, height)| *width >= 0.0 && *height >= 0.0)
                .map(|(width, height)| Size::new(width, height))
                .ok_or_else(|| {
                    LibError::invalid(
                        "DIAGRAM_MIN_NODE_SIZE must look like '120,40'",
                        anyhow!("invalid DIAGRAM_MIN_NODE_SIZE '{}'", raw),
                    )
                })?;
        }
        if let Some(raw) = non_empty(lookup("DIAGRAM_EDGE_MARKER")) {
            config.edge_marker = raw.parse()?;
        }

        tracing::debug!(?config, "editor config resolved");
        Ok(config)
    }

    pub fn from_json(raw: &str) -> Result<Self> {
        Ok(serde_json::from_str(raw)?)
    }
}

fn non_empty(value: Option<String>) -> Option<String> {
    value
        .map(|value| value.trim().to_string())
        .filter(|value| !value.is_empty())
}

fn parse_pair(raw: &str) -> Option<(f64, f64)> {
    let (a, b) = raw.split_once(',')?;
    let a: f64 = a.trim().parse().ok()?;
    let b: f64 = b.trim().parse().ok()?;
    (a.is_finite() && b.is_finite()).then_some((a, b))
}
