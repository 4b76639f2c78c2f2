use std::fmt;
use std::str::FromStr;

use anyhow::anyhow;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::error::{LibError, Result};

#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct NodeId(pub String);

impl NodeId {
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Numeric value of the id, if it is one. Non-numeric ids are legal but
    /// never take part in allocation.
    pub fn as_number(&self) -> Option<u64> {
        self.0.parse().ok()
    }
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<&str> for NodeId {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

impl From<String> for NodeId {
    fn from(value: String) -> Self {
        Self(value)
    }
}

impl From<u64> for NodeId {
    fn from(value: u64) -> Self {
        Self(value.to_string())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct EdgeId(pub String);

impl EdgeId {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for EdgeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<&str> for EdgeId {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

impl From<String> for EdgeId {
    fn from(value: String) -> Self {
        Self(value)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Position {
    pub x: f64,
    pub y: f64,
}

impl Position {
    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    pub fn offset_by(self, delta: Position) -> Self {
        Self {
            x: self.x + delta.x,
            y: self.y + delta.y,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Size {
    pub width: f64,
    pub height: f64,
}

impl Size {
    pub const fn new(width: f64, height: f64) -> Self {
        Self { width, height }
    }

    pub fn clamp_min(self, min: Size) -> Self {
        Self {
            width: self.width.max(min.width),
            height: self.height.max(min.height),
        }
    }
}

/// Named anchor on a node's boundary. Every node exposes all four.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum HandlePosition {
    Top,
    Right,
    Bottom,
    Left,
}

impl HandlePosition {
    pub const ALL: [HandlePosition; 4] = [
        HandlePosition::Top,
        HandlePosition::Right,
        HandlePosition::Bottom,
        HandlePosition::Left,
    ];

    pub const fn as_str(self) -> &'static str {
        match self {
            HandlePosition::Top => "top",
            HandlePosition::Right => "right",
            HandlePosition::Bottom => "bottom",
            HandlePosition::Left => "left",
        }
    }

    pub fn from_name(value: &str) -> Option<Self> {
        match value {
            "top" => Some(HandlePosition::Top),
            "right" => Some(HandlePosition::Right),
            "bottom" => Some(HandlePosition::Bottom),
            "left" => Some(HandlePosition::Left),
            _ => None,
        }
    }

    pub const fn opposite(self) -> Self {
        match self {
            HandlePosition::Top => HandlePosition::Bottom,
            HandlePosition::Right => HandlePosition::Left,
            HandlePosition::Bottom => HandlePosition::Top,
            HandlePosition::Left => HandlePosition::Right,
        }
    }

    /// Resolves a wire handle id against the node that owns it.
    ///
    /// Accepts the bare name (`"right"`) and the node-namespaced form
    /// (`"1-right"`). A namespace naming a different node does not resolve.
    pub fn resolve(node_id: &NodeId, raw: &str) -> Option<Self> {
        if let Some(handle) = Self::from_name(raw) {
            return Some(handle);
        }
        let (namespace, name) = raw.rsplit_once('-')?;
        if namespace != node_id.as_str() {
            return None;
        }
        Self::from_name(name)
    }

    pub fn namespaced(self, node_id: &NodeId) -> String {
        format!("{}-{}", node_id, self.as_str())
    }
}

impl fmt::Display for HandlePosition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for HandlePosition {
    type Err = LibError;

    fn from_str(s: &str) -> Result<Self> {
        Self::from_name(s).ok_or_else(|| {
            LibError::invalid(
                "Unknown handle position",
                anyhow!("handle '{}' is not one of top/right/bottom/left", s),
            )
        })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum MarkerType {
    #[serde(rename = "arrow")]
    Arrow,
    #[default]
    #[serde(rename = "arrowclosed")]
    ArrowClosed,
}

impl MarkerType {
    pub const fn as_str(self) -> &'static str {
        match self {
            MarkerType::Arrow => "arrow",
            MarkerType::ArrowClosed => "arrowclosed",
        }
    }
}

impl FromStr for MarkerType {
    type Err = LibError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "arrow" => Ok(MarkerType::Arrow),
            "arrowclosed" => Ok(MarkerType::ArrowClosed),
            other => Err(LibError::invalid(
                "Unknown edge marker type",
                anyhow!("marker '{}' is not arrow or arrowclosed", other),
            )),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct Marker {
    #[serde(rename = "type")]
    pub marker_type: MarkerType,
}

impl From<MarkerType> for Marker {
    fn from(marker_type: MarkerType) -> Self {
        Self { marker_type }
    }
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct NodeData {
    pub label: String,
    /// Renderable payload carried through copy/paste untouched.
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl NodeData {
    pub fn with_label(label: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            extra: Map::new(),
        }
    }
}

fn is_false(value: &bool) -> bool {
    !*value
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Node {
    pub id: NodeId,
    #[serde(rename = "type")]
    pub node_type: String,
    pub position: Position,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub measured: Option<Size>,
    #[serde(default)]
    pub selected: bool,
    #[serde(default, skip_serializing_if = "is_false")]
    pub dragging: bool,
    #[serde(default)]
    pub data: NodeData,
}

impl Node {
    pub fn new(
        id: NodeId,
        node_type: impl Into<String>,
        position: Position,
        label: impl Into<String>,
    ) -> Self {
        Self {
            id,
            node_type: node_type.into(),
            position,
            measured: None,
            selected: false,
            dragging: false,
            data: NodeData::with_label(label),
        }
    }

    pub fn label(&self) -> &str {
        &self.data.label
    }

    pub fn exposes(&self, raw_handle: &str) -> Option<HandlePosition> {
        HandlePosition::resolve(&self.id, raw_handle)
    }

    pub fn relabeled(&self, label: impl Into<String>) -> Self {
        let mut node = self.clone();
        node.data.label = label.into();
        node
    }

    pub fn with_selected(&self, selected: bool) -> Self {
        Self {
            selected,
            ..self.clone()
        }
    }

    pub fn moved_to(&self, position: Position) -> Self {
        Self {
            position,
            ..self.clone()
        }
    }

    pub fn resized(&self, size: Size) -> Self {
        Self {
            measured: Some(size),
            ..self.clone()
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Edge {
    pub id: EdgeId,
    pub source: NodeId,
    pub source_handle: String,
    pub target: NodeId,
    pub target_handle: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub marker_end: Option<Marker>,
}

/// Parameters of a connection gesture: drag from one handle to another.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Connection {
    pub source: NodeId,
    pub source_handle: String,
    pub target: NodeId,
    pub target_handle: String,
}

impl Connection {
    pub fn new(
        source: impl Into<NodeId>,
        source_handle: HandlePosition,
        target: impl Into<NodeId>,
        target_handle: HandlePosition,
    ) -> Self {
        Self {
            source: source.into(),
            source_handle: source_handle.as_str().to_string(),
            target: target.into(),
            target_handle: target_handle.as_str().to_string(),
        }
    }
}

/// The persisted/transported diagram shape.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Document {
    #[serde(default)]
    pub nodes: Vec<Node>,
    #[serde(default)]
    pub edges: Vec<Edge>,
}

impl Document {
    pub fn from_json(raw: &str) -> Result<Self> {
        Ok(serde_json::from_str(raw)?)
    }

    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string(self)?)
    }

    pub fn to_json_pretty(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}
