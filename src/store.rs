//! Canonical node/edge state and its mutation entry points.
//!
//! The store holds an immutable [`GraphSnapshot`] behind an `Arc`. Every
//! mutation builds the next snapshot from the current one and swaps it in with
//! a single assignment, so anyone holding an earlier snapshot keeps a
//! consistent pre-mutation view and listeners only ever see complete
//! post-mutation states. Nodes and edges are themselves shared `Arc`s; a
//! mutation replaces the entities it touches and shares the rest.

use std::collections::HashSet;
use std::fmt;
use std::sync::Arc;

use crate::config::EditorConfig;
use crate::ids;
use crate::invariants::document_invariant_violations;
use crate::models::{Connection, Document, Edge, EdgeId, Node, NodeId, Position, Size};
use crate::validator::{AcceptAll, ConnectionValidator, ProposedEdge};

#[derive(Debug, Clone, Default, PartialEq)]
pub struct GraphSnapshot {
    revision: u64,
    nodes: Vec<Arc<Node>>,
    edges: Vec<Arc<Edge>>,
}

impl GraphSnapshot {
    pub fn revision(&self) -> u64 {
        self.revision
    }

    pub fn nodes(&self) -> &[Arc<Node>] {
        &self.nodes
    }

    pub fn edges(&self) -> &[Arc<Edge>] {
        &self.edges
    }

    pub fn node(&self, node_id: &NodeId) -> Option<&Arc<Node>> {
        self.nodes.iter().find(|node| &node.id == node_id)
    }

    pub fn edge(&self, edge_id: &EdgeId) -> Option<&Arc<Edge>> {
        self.edges.iter().find(|edge| &edge.id == edge_id)
    }

    pub fn selected_ids(&self) -> Vec<NodeId> {
        self.nodes
            .iter()
            .filter(|node| node.selected)
            .map(|node| node.id.clone())
            .collect()
    }

    pub fn to_document(&self) -> Document {
        Document {
            nodes: self.nodes.iter().map(|node| Node::clone(node)).collect(),
            edges: self.edges.iter().map(|edge| Edge::clone(edge)).collect(),
        }
    }

    fn position_of(&self, node_id: &NodeId) -> Option<usize> {
        self.nodes.iter().position(|node| &node.id == node_id)
    }
}

pub type ListenerId = u64;

type Listener = Box<dyn FnMut(&GraphSnapshot)>;

pub struct GraphStore {
    current: Arc<GraphSnapshot>,
    config: EditorConfig,
    validator: Box<dyn ConnectionValidator>,
    listeners: Vec<(ListenerId, Listener)>,
    next_listener_id: ListenerId,
}

impl fmt::Debug for GraphStore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("GraphStore")
            .field("revision", &self.current.revision)
            .field("nodes", &self.current.nodes.len())
            .field("edges", &self.current.edges.len())
            .field("validator", &self.validator.name())
            .field("listeners", &self.listeners.len())
            .finish()
    }
}

impl Default for GraphStore {
    fn default() -> Self {
        Self::new(EditorConfig::default())
    }
}

impl GraphStore {
    pub fn new(config: EditorConfig) -> Self {
        Self {
            current: Arc::new(GraphSnapshot::default()),
            config,
            validator: Box::new(AcceptAll),
            listeners: Vec::new(),
            next_listener_id: 1,
        }
    }

    /// Seeds the store with a loaded document. Inconsistencies in the
    /// document are reported, not repaired; rendering decides what to do with
    /// them.
    pub fn from_document(document: Document, config: EditorConfig) -> Self {
        let violations = document_invariant_violations(&document.nodes, &document.edges);
        if !violations.is_empty() {
            tracing::warn!(?violations, "loaded document violates diagram invariants");
        }

        let mut store = Self::new(config);
        store.current = Arc::new(GraphSnapshot {
            revision: 0,
            nodes: document.nodes.into_iter().map(Arc::new).collect(),
            edges: document.edges.into_iter().map(Arc::new).collect(),
        });
        tracing::debug!(
            nodes = store.current.nodes.len(),
            edges = store.current.edges.len(),
            "graph store loaded"
        );
        store
    }

    pub fn with_validator(mut self, validator: impl ConnectionValidator + 'static) -> Self {
        self.validator = Box::new(validator);
        self
    }

    pub fn set_validator(&mut self, validator: Box<dyn ConnectionValidator>) {
        tracing::debug!(validator = validator.name(), "connection validator replaced");
        self.validator = validator;
    }

    pub fn config(&self) -> &EditorConfig {
        &self.config
    }

    pub fn snapshot(&self) -> Arc<GraphSnapshot> {
        Arc::clone(&self.current)
    }

    pub fn node(&self, node_id: &NodeId) -> Option<Arc<Node>> {
        self.current.node(node_id).cloned()
    }

    pub fn selected_ids(&self) -> Vec<NodeId> {
        self.current.selected_ids()
    }

    pub fn to_document(&self) -> Document {
        self.current.to_document()
    }

    /// Called once per commit with the complete post-mutation snapshot.
    pub fn subscribe(&mut self, listener: impl FnMut(&GraphSnapshot) + 'static) -> ListenerId {
        let id = self.next_listener_id;
        self.next_listener_id += 1;
        self.listeners.push((id, Box::new(listener)));
        id
    }

    pub fn unsubscribe(&mut self, listener_id: ListenerId) -> bool {
        let before = self.listeners.len();
        self.listeners.retain(|(id, _)| *id != listener_id);
        self.listeners.len() != before
    }

    pub fn add_node(&mut self, position: Position, label: impl Into<String>) -> NodeId {
        let id = ids::next_node_id(&self.current.nodes);
        let node = Node::new(id.clone(), self.config.node_type.clone(), position, label);

        let mut next = self.draft();
        next.nodes.push(Arc::new(node));
        self.commit(next);
        tracing::debug!(node_id = %id, x = position.x, y = position.y, "node added");
        id
    }

    /// Replaces the label of one node. Unknown ids are ignored.
    pub fn update_label(&mut self, node_id: &NodeId, text: impl Into<String>) -> bool {
        let text = text.into();
        self.replace_node(node_id, |node| {
            (node.data.label != text).then(|| node.relabeled(text.clone()))
        })
    }

    pub fn move_node(&mut self, node_id: &NodeId, position: Position) -> bool {
        self.replace_node(node_id, |node| {
            (node.position != position).then(|| node.moved_to(position))
        })
    }

    /// Resizes a node, never below the configured minimum size.
    pub fn resize_node(&mut self, node_id: &NodeId, size: Size) -> bool {
        let size = size.clamp_min(self.config.min_node_size);
        self.replace_node(node_id, |node| {
            (node.measured != Some(size)).then(|| node.resized(size))
        })
    }

    /// Creates an edge if both endpoints and handles exist and the validator
    /// accepts it. Returns the new edge id, or `None` with the graph unchanged.
    pub fn connect(&mut self, connection: &Connection) -> Option<EdgeId> {
        let snapshot = &self.current;
        let (Some(source), Some(target)) = (
            snapshot.node(&connection.source),
            snapshot.node(&connection.target),
        ) else {
            tracing::debug!(
                source = %connection.source,
                target = %connection.target,
                "connection ignored: endpoint node missing"
            );
            return None;
        };
        let (Some(source_handle), Some(target_handle)) = (
            source.exposes(&connection.source_handle),
            target.exposes(&connection.target_handle),
        ) else {
            tracing::debug!(
                source_handle = %connection.source_handle,
                target_handle = %connection.target_handle,
                "connection ignored: handle not exposed by node"
            );
            return None;
        };

        let proposed = ProposedEdge {
            source,
            source_handle,
            target,
            target_handle,
            existing_edges: &snapshot.edges,
        };
        if !self.validator.allows(&proposed) {
            tracing::debug!(
                validator = self.validator.name(),
                source = %connection.source,
                target = %connection.target,
                "connection rejected"
            );
            return None;
        }

        let edge_id = ids::next_edge_id(&snapshot.edges, &connection.source, &connection.target);
        let edge = Edge {
            id: edge_id.clone(),
            source: connection.source.clone(),
            source_handle: connection.source_handle.clone(),
            target: connection.target.clone(),
            target_handle: connection.target_handle.clone(),
            marker_end: Some(self.config.edge_marker.into()),
        };

        let mut next = self.draft();
        next.edges.push(Arc::new(edge));
        self.commit(next);
        tracing::debug!(edge_id = %edge_id, "edge created");
        Some(edge_id)
    }

    /// Marks the given nodes selected. Other nodes keep their flags.
    pub fn select(&mut self, node_ids: &[NodeId]) -> usize {
        let wanted: HashSet<&NodeId> = node_ids.iter().collect();
        self.update_selection(|node| node.selected || wanted.contains(&node.id))
    }

    pub fn deselect_all(&mut self) -> usize {
        self.update_selection(|_| false)
    }

    /// Exactly the given nodes end up selected, in a single commit.
    pub fn set_selection(&mut self, node_ids: &[NodeId]) -> usize {
        let wanted: HashSet<&NodeId> = node_ids.iter().collect();
        self.update_selection(|node| wanted.contains(&node.id))
    }

    /// Deselects every existing node and appends `nodes` and `edges` as one
    /// transition. The appended nodes keep their own selection flags.
    ///
    /// Edges whose endpoints are not present afterwards are dropped.
    pub fn append_replacing_selection(&mut self, nodes: Vec<Node>, edges: Vec<Edge>) {
        let mut next = self.draft();
        for node in next.nodes.iter_mut().filter(|node| node.selected) {
            *node = Arc::new(node.with_selected(false));
        }
        next.nodes.extend(nodes.into_iter().map(Arc::new));

        let present: HashSet<NodeId> = next.nodes.iter().map(|node| node.id.clone()).collect();
        for edge in edges {
            if present.contains(&edge.source) && present.contains(&edge.target) {
                next.edges.push(Arc::new(edge));
            } else {
                tracing::warn!(edge_id = %edge.id, "dropping edge with missing endpoint");
            }
        }
        self.commit(next);
    }

    fn update_selection(&mut self, selected: impl Fn(&Node) -> bool) -> usize {
        let mut next = self.draft();
        let mut changed = 0;
        for node in next.nodes.iter_mut() {
            let flag = selected(&**node);
            if node.selected != flag {
                *node = Arc::new(node.with_selected(flag));
                changed += 1;
            }
        }
        if changed > 0 {
            self.commit(next);
        }
        changed
    }

    fn replace_node(&mut self, node_id: &NodeId, update: impl FnOnce(&Node) -> Option<Node>) -> bool {
        let Some(index) = self.current.position_of(node_id) else {
            tracing::debug!(node_id = %node_id, "node not found, mutation ignored");
            return false;
        };
        let Some(replacement) = update(&self.current.nodes[index]) else {
            return false;
        };

        let mut next = self.draft();
        next.nodes[index] = Arc::new(replacement);
        self.commit(next);
        true
    }

    fn draft(&self) -> GraphSnapshot {
        GraphSnapshot::clone(&self.current)
    }

    fn commit(&mut self, mut next: GraphSnapshot) {
        next.revision = self.current.revision + 1;
        self.current = Arc::new(next);
        for (_, listener) in &mut self.listeners {
            listener(&*self.current);
        }
    }
}
