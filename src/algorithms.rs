use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use crate::models::{Edge, HandlePosition, Node, NodeId};

pub fn selected_node_ids(nodes: &[Arc<Node>]) -> HashSet<NodeId> {
    nodes
        .iter()
        .filter(|node| node.selected)
        .map(|node| node.id.clone())
        .collect()
}

/// Nodes in `keep`, plus the edges whose endpoints are both in `keep`.
///
/// Edges with a single endpoint inside are dropped entirely.
pub fn induced_subgraph(
    nodes: &[Arc<Node>],
    edges: &[Arc<Edge>],
    keep: &HashSet<NodeId>,
) -> (Vec<Arc<Node>>, Vec<Arc<Edge>>) {
    let kept_nodes = nodes
        .iter()
        .filter(|node| keep.contains(&node.id))
        .cloned()
        .collect();
    let internal_edges = edges
        .iter()
        .filter(|edge| keep.contains(&edge.source) && keep.contains(&edge.target))
        .cloned()
        .collect();
    (kept_nodes, internal_edges)
}

/// Rewrites a node-namespaced handle id (`"3-right"`) to its new owner.
/// Bare handle names pass through unchanged.
pub fn remap_handle(raw: &str, old_owner: &NodeId, new_owner: &NodeId) -> String {
    match raw
        .strip_prefix(old_owner.as_str())
        .and_then(|rest| rest.strip_prefix('-'))
        .and_then(HandlePosition::from_name)
    {
        Some(handle) => handle.namespaced(new_owner),
        None => raw.to_string(),
    }
}

/// Copies `edges` onto the nodes named by `id_map`. Edges with an endpoint
/// missing from the map are skipped.
pub fn remap_edge_endpoints<'a>(
    edges: &'a [Arc<Edge>],
    id_map: &'a HashMap<NodeId, NodeId>,
) -> impl Iterator<Item = Edge> + 'a {
    edges.iter().filter_map(move |edge| {
        let source = id_map.get(&edge.source)?;
        let target = id_map.get(&edge.target)?;
        Some(Edge {
            id: edge.id.clone(),
            source: source.clone(),
            source_handle: remap_handle(&edge.source_handle, &edge.source, source),
            target: target.clone(),
            target_handle: remap_handle(&edge.target_handle, &edge.target, target),
            marker_end: edge.marker_end,
        })
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{EdgeId, Position};

    fn node(id: &str, selected: bool) -> Arc<Node> {
        let mut node = Node::new(NodeId::from(id), "custom", Position::default(), id);
        node.selected = selected;
        Arc::new(node)
    }

    fn edge(source: &str, target: &str) -> Arc<Edge> {
        Arc::new(Edge {
            id: EdgeId(format!("e{}-{}", source, target)),
            source: NodeId::from(source),
            source_handle: format!("{}-right", source),
            target: NodeId::from(target),
            target_handle: "left".to_string(),
            marker_end: None,
        })
    }

    #[test]
    fn induced_subgraph_keeps_only_internal_edges() {
        let nodes = vec![node("a", true), node("b", true), node("c", false)];
        let edges = vec![edge("a", "b"), edge("a", "c"), edge("c", "b")];
        let keep = selected_node_ids(&nodes);

        let (kept_nodes, kept_edges) = induced_subgraph(&nodes, &edges, &keep);
        assert_eq!(kept_nodes.len(), 2);
        assert_eq!(kept_edges.len(), 1);
        assert_eq!(kept_edges[0].id, EdgeId::from("ea-b"));
    }

    #[test]
    fn remap_handle_rewrites_namespace_only() {
        let old = NodeId::from("3");
        let new = NodeId::from("12");
        assert_eq!(remap_handle("3-right", &old, &new), "12-right");
        assert_eq!(remap_handle("right", &old, &new), "right");
        assert_eq!(remap_handle("33-right", &old, &new), "33-right");
    }

    #[test]
    fn remap_edge_endpoints_skips_unmapped() {
        let edges = vec![edge("a", "b"), edge("a", "c")];
        let id_map = HashMap::from([
            (NodeId::from("a"), NodeId::from("1")),
            (NodeId::from("b"), NodeId::from("2")),
        ]);
        let remapped: Vec<Edge> = remap_edge_endpoints(&edges, &id_map).collect();
        assert_eq!(remapped.len(), 1);
        assert_eq!(remapped[0].source, NodeId::from("1"));
        assert_eq!(remapped[0].source_handle, "1-right");
        assert_eq!(remapped[0].target, NodeId::from("2"));
    }
}
