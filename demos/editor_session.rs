use std::env;
use std::fs;

use anyhow::Context;
use serde_json::json;
use subseq_diagram::prelude::*;
use tracing_subscriber::EnvFilter;

const DEFAULT_DOCUMENT: &str = "fixtures/graph_data.json";

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let path = env::var("DIAGRAM_DOCUMENT").unwrap_or_else(|_| DEFAULT_DOCUMENT.to_string());
    let raw = fs::read_to_string(&path).with_context(|| format!("failed to read '{}'", path))?;
    let document =
        Document::from_json(&raw).with_context(|| format!("invalid diagram document '{}'", path))?;
    let config = EditorConfig::from_env().context("invalid DIAGRAM_* configuration")?;

    let mut editor = DiagramEditor::from_document(document, config);
    editor.mount();

    let script = json!([
        { "operation": "add_node_at_center", "bounds": { "width": 1280.0, "height": 720.0 } },
        {
            "operation": "connect",
            "connection": { "source": "2", "sourceHandle": "right", "target": "3", "targetHandle": "left" }
        },
        { "operation": "set_selection", "node_ids": ["2", "3"] },
        { "operation": "key", "key": "c", "ctrl": true, "meta": false },
        { "operation": "key", "key": "v", "ctrl": true, "meta": false },
        { "operation": "begin_label_edit", "node_id": "4" },
        { "operation": "type_label_text", "node_id": "4", "text": "Pasted copy" },
        { "operation": "blur_label", "node_id": "4" }
    ]);
    let commands: Vec<EditorCommand> =
        serde_json::from_value(script).context("demo script does not parse")?;

    for command in commands {
        let outcome = editor.execute(command);
        println!("{}", serde_json::to_string(&outcome)?);
    }
    editor.unmount();

    let snapshot = editor.snapshot();
    ensure_document_invariants(snapshot.nodes(), snapshot.edges())?;
    println!("{}", snapshot.to_document().to_json_pretty()?);
    Ok(())
}
