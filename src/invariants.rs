use std::collections::{HashMap, HashSet};

use anyhow::anyhow;
use serde::{Deserialize, Serialize};

use crate::error::{LibError, Result};
use crate::models::{Edge, EdgeId, Node, NodeId};

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum DocumentInvariantViolation {
    DuplicateNodeId {
        node_id: NodeId,
    },
    DuplicateEdgeId {
        edge_id: EdgeId,
    },
    UnknownNodeReference {
        edge_id: EdgeId,
        missing_node_id: NodeId,
    },
    UnknownHandle {
        edge_id: EdgeId,
        node_id: NodeId,
        handle: String,
    },
}

impl DocumentInvariantViolation {
    pub const fn error_code(&self) -> &'static str {
        match self {
            DocumentInvariantViolation::DuplicateNodeId { .. } => "diagram_duplicate_node_id",
            DocumentInvariantViolation::DuplicateEdgeId { .. } => "diagram_duplicate_edge_id",
            DocumentInvariantViolation::UnknownNodeReference { .. } => {
                "diagram_unknown_node_reference"
            }
            DocumentInvariantViolation::UnknownHandle { .. } => "diagram_unknown_handle",
        }
    }

    pub const fn public_message(&self) -> &'static str {
        match self {
            DocumentInvariantViolation::DuplicateNodeId { .. } => "Node IDs must be unique",
            DocumentInvariantViolation::DuplicateEdgeId { .. } => "Edge IDs must be unique",
            DocumentInvariantViolation::UnknownNodeReference { .. } => {
                "Edge references a node that does not exist"
            }
            DocumentInvariantViolation::UnknownHandle { .. } => {
                "Edge references a handle its node does not expose"
            }
        }
    }
}

/// Accepts anything that dereferences to a node or edge, so both plain
/// document vectors and store snapshots can be checked.
pub fn document_invariant_violations<N, E>(nodes: &[N], edges: &[E]) -> Vec<DocumentInvariantViolation>
where
    N: AsRef<Node>,
    E: AsRef<Edge>,
{
    let mut violations = Vec::new();
    let mut by_id: HashMap<&NodeId, &Node> = HashMap::with_capacity(nodes.len());
    for node in nodes {
        let node = node.as_ref();
        if by_id.insert(&node.id, node).is_some() {
            violations.push(DocumentInvariantViolation::DuplicateNodeId {
                node_id: node.id.clone(),
            });
        }
    }

    let mut seen_edges: HashSet<&EdgeId> = HashSet::with_capacity(edges.len());
    for edge in edges {
        let edge = edge.as_ref();
        if !seen_edges.insert(&edge.id) {
            violations.push(DocumentInvariantViolation::DuplicateEdgeId {
                edge_id: edge.id.clone(),
            });
        }

        for (node_id, handle) in [
            (&edge.source, &edge.source_handle),
            (&edge.target, &edge.target_handle),
        ] {
            match by_id.get(node_id) {
                None => violations.push(DocumentInvariantViolation::UnknownNodeReference {
                    edge_id: edge.id.clone(),
                    missing_node_id: node_id.clone(),
                }),
                Some(node) if node.exposes(handle).is_none() => {
                    violations.push(DocumentInvariantViolation::UnknownHandle {
                        edge_id: edge.id.clone(),
                        node_id: node_id.clone(),
                        handle: handle.clone(),
                    });
                }
                Some(_) => {}
            }
        }
    }

    violations
}

pub fn ensure_document_invariants<N, E>(nodes: &[N], edges: &[E]) -> Result<()>
where
    N: AsRef<Node>,
    E: AsRef<Edge>,
{
    let violations = document_invariant_violations(nodes, edges);
    if let Some(first) = violations.first() {
        return Err(LibError::invalid_with_code(
            first.error_code(),
            first.public_message(),
            anyhow!("diagram invariant validation failed: {:?}", violations),
        ));
    }

    Ok(())
}

impl AsRef<Node> for Node {
    fn as_ref(&self) -> &Node {
        self
    }
}

impl AsRef<Edge> for Edge {
    fn as_ref(&self) -> &Edge {
        self
    }
}
