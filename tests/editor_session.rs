use std::cell::RefCell;
use std::collections::HashSet;
use std::rc::Rc;

use serde_json::json;
use subseq_diagram::prelude::*;

const FIXTURE: &str = include_str!("../fixtures/graph_data.json");

fn loaded_editor() -> DiagramEditor {
    let document = Document::from_json(FIXTURE).expect("fixture should parse");
    DiagramEditor::from_document(document, EditorConfig::default())
}

fn command(value: serde_json::Value) -> EditorCommand {
    serde_json::from_value(value).expect("command should parse")
}

#[test]
fn loaded_fixture_continues_numbering() {
    let mut editor = loaded_editor();
    let snapshot = editor.snapshot();
    assert_eq!(snapshot.nodes().len(), 2);
    assert_eq!(snapshot.edges().len(), 3);
    assert!(ensure_document_invariants(snapshot.nodes(), snapshot.edges()).is_ok());

    let outcome = editor.execute(command(json!({
        "operation": "add_node",
        "position": { "x": 10.0, "y": 20.0 },
        "label": null
    })));
    assert_eq!(
        outcome,
        CommandOutcome::NodeAdded {
            node_id: NodeId::from("3")
        }
    );
}

#[test]
fn connect_then_copy_paste_round_trip() {
    let mut editor = loaded_editor();

    let outcome = editor.execute(command(json!({
        "operation": "connect",
        "connection": {
            "source": "2",
            "sourceHandle": "right",
            "target": "1",
            "targetHandle": "left"
        }
    })));
    assert_eq!(
        outcome,
        CommandOutcome::EdgeCreated {
            edge_id: EdgeId::from("e2-1")
        }
    );

    editor.execute(EditorCommand::SetSelection {
        node_ids: vec![NodeId::from("1"), NodeId::from("2")],
    });
    let CommandOutcome::Copied {
        node_count,
        edge_count,
    } = editor.execute(EditorCommand::Copy)
    else {
        panic!("copy should capture the selection");
    };
    assert_eq!((node_count, edge_count), (2, 4));

    let CommandOutcome::Pasted { report } = editor.execute(EditorCommand::Paste) else {
        panic!("paste should add the copied subgraph");
    };
    assert_eq!(report.node_ids, vec![NodeId::from("3"), NodeId::from("4")]);
    assert_eq!(report.edge_ids.len(), 4);

    let snapshot = editor.snapshot();
    assert_eq!(snapshot.nodes().len(), 4);
    assert_eq!(snapshot.edges().len(), 8);
    assert!(document_invariant_violations(snapshot.nodes(), snapshot.edges()).is_empty());

    let pasted: HashSet<NodeId> = report.node_ids.iter().cloned().collect();
    for edge_id in &report.edge_ids {
        let edge = snapshot.edge(edge_id).expect("pasted edge should exist");
        assert!(pasted.contains(&edge.source));
        assert!(pasted.contains(&edge.target));
        assert_eq!(edge.marker_end, Some(Marker::from(MarkerType::ArrowClosed)));
    }

    let original = snapshot.node(&NodeId::from("1")).expect("original node");
    let copy = snapshot.node(&NodeId::from("3")).expect("pasted node");
    assert_eq!(copy.position, original.position.offset_by(Position::new(20.0, 20.0)));
    assert_eq!(copy.label(), "hi");
    assert!(!original.selected);
    assert!(copy.selected);
}

#[test]
fn paste_is_observed_as_a_single_transition() {
    let mut editor = loaded_editor();
    let seen: Rc<RefCell<Vec<(u64, usize, usize)>>> = Rc::default();
    let sink = Rc::clone(&seen);
    editor.store_mut().subscribe(move |snapshot| {
        let selected = snapshot.nodes().iter().filter(|node| node.selected).count();
        sink.borrow_mut()
            .push((snapshot.revision(), snapshot.nodes().len(), selected));
    });

    editor.execute(EditorCommand::Select {
        node_ids: vec![NodeId::from("1")],
    });
    editor.execute(EditorCommand::Copy);
    editor.execute(EditorCommand::Paste);

    let seen = seen.borrow();
    assert_eq!(seen.len(), 2);
    let (select_rev, _, _) = seen[0];
    let (paste_rev, node_count, selected) = seen[1];
    assert_eq!(paste_rev, select_rev + 1);
    assert_eq!(node_count, 3);
    assert_eq!(selected, 1);
}

#[test]
fn label_edit_commits_last_blur() {
    let mut editor = loaded_editor();
    let node_id = NodeId::from("2");

    editor.execute(EditorCommand::BeginLabelEdit {
        node_id: node_id.clone(),
    });
    assert_eq!(editor.label_draft(&node_id), Some("Hello"));
    editor.execute(EditorCommand::TypeLabelText {
        node_id: node_id.clone(),
        text: "Goodbye".to_string(),
    });
    editor.execute(EditorCommand::BlurLabel {
        node_id: node_id.clone(),
    });

    editor.execute(EditorCommand::BeginLabelEdit {
        node_id: node_id.clone(),
    });
    editor.execute(EditorCommand::TypeLabelText {
        node_id: node_id.clone(),
        text: "Final".to_string(),
    });
    editor.execute(EditorCommand::BlurLabel {
        node_id: node_id.clone(),
    });

    let label = editor
        .store()
        .node(&node_id)
        .map(|node| node.label().to_string());
    assert_eq!(label, Some("Final".to_string()));
    assert_eq!(editor.focused_label(), None);
}

#[test]
fn keyboard_shortcuts_follow_mount_lifecycle() {
    let mut editor = loaded_editor();
    editor.execute(EditorCommand::SetSelection {
        node_ids: vec![NodeId::from("2")],
    });
    editor.mount();

    let copy = editor.handle_key(&KeyEvent::cmd('c'));
    assert!(matches!(
        copy,
        CommandOutcome::KeyHandled {
            prevent_default: true,
            ..
        }
    ));
    editor.handle_key(&KeyEvent::ctrl('v'));
    assert_eq!(editor.snapshot().nodes().len(), 3);

    editor.unmount();
    let ignored = editor.handle_key(&KeyEvent::ctrl('v'));
    assert!(matches!(
        ignored,
        CommandOutcome::KeyHandled {
            prevent_default: false,
            ..
        }
    ));
    assert_eq!(editor.snapshot().nodes().len(), 3);
}

#[test]
fn validator_policies_gate_connections() {
    let mut editor = loaded_editor().with_validator(
        AllOf::default()
            .with(RejectSelfLoops)
            .with(RejectParallelEdges),
    );

    let parallel = Connection::new("1", HandlePosition::Right, "2", HandlePosition::Left);
    assert_eq!(
        editor.execute(EditorCommand::Connect {
            connection: parallel
        }),
        CommandOutcome::Unchanged
    );
    let self_loop = Connection::new("1", HandlePosition::Top, "1", HandlePosition::Bottom);
    assert_eq!(
        editor.execute(EditorCommand::Connect {
            connection: self_loop
        }),
        CommandOutcome::Unchanged
    );
    assert_eq!(editor.snapshot().edges().len(), 3);
}

#[test]
fn exported_document_reloads_identically() {
    let mut editor = DiagramEditor::default();
    editor.add_node_at_center(Size::new(1000.0, 800.0));
    editor.execute(EditorCommand::AddNode {
        position: Position::new(100.0, 40.5),
        label: Some("second".to_string()),
    });
    editor.execute(EditorCommand::Connect {
        connection: Connection::new("1", HandlePosition::Bottom, "2", HandlePosition::Top),
    });
    let exported = editor
        .store()
        .to_document()
        .to_json()
        .expect("document should serialize");

    let reloaded = Document::from_json(&exported).expect("export should parse");
    assert_eq!(reloaded, editor.store().to_document());
    assert_eq!(reloaded.nodes[0].position, Position::new(500.0, 400.0));
    assert_eq!(reloaded.edges[0].id, EdgeId::from("e1-2"));
}

#[test]
fn largest_numeric_id_does_not_block_allocation() {
    let document: Document = serde_json::from_value(json!({
        "nodes": [{
            "id": u64::MAX.to_string(),
            "type": "custom",
            "position": { "x": 0.0, "y": 0.0 },
            "data": { "label": "edge of the range" }
        }],
        "edges": []
    }))
    .expect("document should parse");
    let mut editor = DiagramEditor::from_document(document, EditorConfig::default());

    let outcome = editor.execute(EditorCommand::AddNode {
        position: Position::new(50.0, 50.0),
        label: None,
    });
    assert_eq!(
        outcome,
        CommandOutcome::NodeAdded {
            node_id: NodeId::from("1")
        }
    );

    editor.execute(EditorCommand::SetSelection {
        node_ids: vec![NodeId::from(u64::MAX.to_string()), NodeId::from("1")],
    });
    editor.execute(EditorCommand::Copy);
    let CommandOutcome::Pasted { report } = editor.execute(EditorCommand::Paste) else {
        panic!("paste should add the copied nodes");
    };
    assert_eq!(report.node_ids, vec![NodeId::from("2"), NodeId::from("3")]);

    let snapshot = editor.snapshot();
    assert_eq!(snapshot.nodes().len(), 4);
    assert!(document_invariant_violations(snapshot.nodes(), snapshot.edges()).is_empty());
}
