//! Session-local copy/paste of a selection-scoped subgraph.
//!
//! Nothing here touches the system clipboard; content lives as long as the
//! [`Clipboard`] value does.

use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::algorithms::{induced_subgraph, remap_edge_endpoints, selected_node_ids};
use crate::ids::{self, EdgeIdReservation};
use crate::models::{Edge, EdgeId, Node, NodeId};
use crate::store::{GraphSnapshot, GraphStore};

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ClipboardContent {
    pub nodes: Vec<Node>,
    pub edges: Vec<Edge>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PasteReport {
    pub node_ids: Vec<NodeId>,
    pub edge_ids: Vec<EdgeId>,
    pub id_map: BTreeMap<NodeId, NodeId>,
}

#[derive(Debug, Clone, Default)]
pub struct Clipboard {
    content: Option<ClipboardContent>,
}

impl Clipboard {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn has_content(&self) -> bool {
        self.content.is_some()
    }

    pub fn content(&self) -> Option<&ClipboardContent> {
        self.content.as_ref()
    }

    /// Captures the selected nodes and the edges running between them.
    ///
    /// With nothing selected the previous content is kept and `false` is
    /// returned.
    pub fn copy(&mut self, snapshot: &GraphSnapshot) -> bool {
        let selected = selected_node_ids(snapshot.nodes());
        if selected.is_empty() {
            tracing::debug!("copy ignored: empty selection");
            return false;
        }

        let (nodes, edges) = induced_subgraph(snapshot.nodes(), snapshot.edges(), &selected);
        let content = ClipboardContent {
            nodes: nodes.iter().map(|node| Node::clone(node)).collect(),
            edges: edges.iter().map(|edge| Edge::clone(edge)).collect(),
        };
        tracing::info!(
            nodes = content.nodes.len(),
            edges = content.edges.len(),
            "selection copied"
        );
        self.content = Some(content);
        true
    }

    /// Replays the copied subgraph into `store` under fresh ids.
    ///
    /// Ids are allocated from the store's current state, so repeated pastes
    /// and pastes after other edits never collide. Pre-existing nodes are
    /// deselected and the pasted nodes selected in the same commit.
    pub fn paste(&self, store: &mut GraphStore) -> Option<PasteReport> {
        let content = self.content.as_ref().filter(|content| !content.nodes.is_empty());
        let Some(content) = content else {
            tracing::debug!("paste ignored: clipboard is empty");
            return None;
        };

        let snapshot = store.snapshot();
        let offset = store.config().paste_offset;
        let fresh_ids = ids::reserve_node_ids(snapshot.nodes(), content.nodes.len());
        let id_map: HashMap<NodeId, NodeId> = content
            .nodes
            .iter()
            .map(|node| node.id.clone())
            .zip(fresh_ids.iter().cloned())
            .collect();

        let nodes: Vec<Node> = content
            .nodes
            .iter()
            .zip(&fresh_ids)
            .map(|(original, id)| Node {
                id: id.clone(),
                position: original.position.offset_by(offset),
                selected: true,
                dragging: false,
                ..original.clone()
            })
            .collect();

        let copied_edges: Vec<Arc<Edge>> = content.edges.iter().cloned().map(Arc::new).collect();
        let mut reservation = EdgeIdReservation::new(snapshot.edges());
        let edges: Vec<Edge> = remap_edge_endpoints(&copied_edges, &id_map)
            .map(|edge| Edge {
                id: reservation.next(&edge.source, &edge.target),
                ..edge
            })
            .collect();

        let report = PasteReport {
            node_ids: fresh_ids,
            edge_ids: edges.iter().map(|edge| edge.id.clone()).collect(),
            id_map: id_map.into_iter().collect(),
        };
        store.append_replacing_selection(nodes, edges);
        tracing::info!(
            nodes = report.node_ids.len(),
            edges = report.edge_ids.len(),
            "clipboard pasted"
        );
        Some(report)
    }
}
