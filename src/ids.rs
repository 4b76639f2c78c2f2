//! Identifier allocation derived from the live graph.
//!
//! Nothing here keeps a counter between calls: every id is computed from the
//! ids currently present, so documents loaded from elsewhere and ids that were
//! skipped never cause a collision.

use std::collections::HashSet;
use std::sync::Arc;

use crate::models::{Edge, EdgeId, Node, NodeId};

fn numeric_ids(nodes: &[Arc<Node>]) -> HashSet<u64> {
    nodes.iter().filter_map(|node| node.id.as_number()).collect()
}

/// `count` numbers absent from `taken`, counting up from its maximum. Once
/// that run reaches `u64::MAX` the lowest free numbers from 1 are used instead.
fn allocate_numbers(taken: &HashSet<u64>, count: usize) -> Vec<u64> {
    let mut next = taken.iter().copied().max().unwrap_or(0).checked_add(1);
    let mut lowest = 1u64;
    let mut allocated = Vec::with_capacity(count);
    while allocated.len() < count {
        let id = match next {
            Some(id) => {
                next = id.checked_add(1);
                id
            }
            None => {
                while taken.contains(&lowest) || allocated.contains(&lowest) {
                    lowest += 1;
                }
                lowest
            }
        };
        allocated.push(id);
    }
    allocated
}

pub fn next_node_id(nodes: &[Arc<Node>]) -> NodeId {
    let taken = numeric_ids(nodes);
    NodeId::from(allocate_numbers(&taken, 1).first().copied().unwrap_or(1))
}

/// Reserves `count` ids from a single scan. The ids are disjoint from each
/// other and from every id in `nodes`, and consecutive unless the numeric
/// range is exhausted.
pub fn reserve_node_ids(nodes: &[Arc<Node>], count: usize) -> Vec<NodeId> {
    allocate_numbers(&numeric_ids(nodes), count)
        .into_iter()
        .map(NodeId::from)
        .collect()
}

fn edge_base(source: &NodeId, target: &NodeId) -> String {
    format!("e{}-{}", source, target)
}

/// Suffix carried by `id` relative to `base`: `Some(0)` for the bare base,
/// `Some(k)` for `base-k`, `None` when unrelated.
fn edge_suffix(id: &str, base: &str) -> Option<u64> {
    let rest = id.strip_prefix(base)?;
    if rest.is_empty() {
        return Some(0);
    }
    rest.strip_prefix('-')?.parse().ok()
}

/// Edge ids handed out while building one batch.
///
/// Ids are `e{source}-{target}` when that is free, else
/// `e{source}-{target}-{k}` with `k` one past the largest suffix already in
/// use for that endpoint pair (or the lowest free one past `u64::MAX`).
#[derive(Debug, Default)]
pub struct EdgeIdReservation {
    taken: HashSet<String>,
}

impl EdgeIdReservation {
    pub fn new(edges: &[Arc<Edge>]) -> Self {
        Self {
            taken: edges.iter().map(|edge| edge.id.0.clone()).collect(),
        }
    }

    pub fn next(&mut self, source: &NodeId, target: &NodeId) -> EdgeId {
        let base = edge_base(source, target);
        let suffixes: HashSet<u64> = self
            .taken
            .iter()
            .filter_map(|taken| edge_suffix(taken, &base))
            .collect();
        let id = if suffixes.is_empty() {
            base
        } else {
            let suffix = allocate_numbers(&suffixes, 1).first().copied().unwrap_or(1);
            format!("{}-{}", base, suffix)
        };
        self.taken.insert(id.clone());
        EdgeId(id)
    }
}

pub fn next_edge_id(edges: &[Arc<Edge>], source: &NodeId, target: &NodeId) -> EdgeId {
    EdgeIdReservation::new(edges).next(source, target)
}
