use std::collections::HashMap;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::clipboard::{Clipboard, PasteReport};
use crate::config::EditorConfig;
use crate::keyboard::{KeyEvent, Modifiers, ShortcutAction, ShortcutRegistration, ShortcutRegistry};
use crate::label_editor::{FocusTracker, LabelCommit, LabelEditor};
use crate::models::{Connection, Document, EdgeId, NodeId, Position, Size};
use crate::store::{GraphSnapshot, GraphStore};
use crate::validator::ConnectionValidator;
use crate::viewport::Viewport;

/// One discrete user action against the editor.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "operation", rename_all = "snake_case")]
pub enum EditorCommand {
    AddNode {
        position: Position,
        label: Option<String>,
    },
    /// The "add node" affordance: place at the centre of the visible area.
    AddNodeAtCenter {
        bounds: Size,
    },
    UpdateLabel {
        node_id: NodeId,
        text: String,
    },
    Connect {
        connection: Connection,
    },
    Select {
        node_ids: Vec<NodeId>,
    },
    SetSelection {
        node_ids: Vec<NodeId>,
    },
    DeselectAll,
    MoveNode {
        node_id: NodeId,
        position: Position,
    },
    ResizeNode {
        node_id: NodeId,
        size: Size,
    },
    SetViewport {
        viewport: Viewport,
    },
    Copy,
    Paste,
    BeginLabelEdit {
        node_id: NodeId,
    },
    TypeLabelText {
        node_id: NodeId,
        text: String,
    },
    BlurLabel {
        node_id: NodeId,
    },
    Key {
        key: char,
        ctrl: bool,
        meta: bool,
        #[serde(default)]
        shift: bool,
        #[serde(default)]
        alt: bool,
    },
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "result", rename_all = "snake_case")]
pub enum CommandOutcome {
    NodeAdded { node_id: NodeId },
    EdgeCreated { edge_id: EdgeId },
    Pasted { report: PasteReport },
    Copied { node_count: usize, edge_count: usize },
    LabelCommitted { node_id: NodeId, text: String },
    Changed,
    Unchanged,
    /// Set for key events; `prevent_default` tells the host to suppress its
    /// own handling.
    KeyHandled {
        outcomes: Vec<CommandOutcome>,
        prevent_default: bool,
    },
}

impl CommandOutcome {
    fn changed(changed: bool) -> Self {
        if changed {
            CommandOutcome::Changed
        } else {
            CommandOutcome::Unchanged
        }
    }
}

/// Everything one editor view owns: the graph, the session clipboard, the
/// viewport, per-node label editors and the keyboard surface.
#[derive(Debug)]
pub struct DiagramEditor {
    store: GraphStore,
    clipboard: Clipboard,
    viewport: Viewport,
    focus: FocusTracker,
    label_editors: HashMap<NodeId, LabelEditor>,
    shortcuts: ShortcutRegistry,
    registrations: Vec<ShortcutRegistration>,
}

impl Default for DiagramEditor {
    fn default() -> Self {
        Self::new(EditorConfig::default())
    }
}

impl DiagramEditor {
    pub fn new(config: EditorConfig) -> Self {
        Self::from_store(GraphStore::new(config))
    }

    pub fn from_document(document: Document, config: EditorConfig) -> Self {
        Self::from_store(GraphStore::from_document(document, config))
    }

    pub fn from_store(store: GraphStore) -> Self {
        Self {
            store,
            clipboard: Clipboard::new(),
            viewport: Viewport::default(),
            focus: FocusTracker::new(),
            label_editors: HashMap::new(),
            shortcuts: ShortcutRegistry::new(),
            registrations: Vec::new(),
        }
    }

    pub fn with_validator(mut self, validator: impl ConnectionValidator + 'static) -> Self {
        self.store.set_validator(Box::new(validator));
        self
    }

    pub fn store(&self) -> &GraphStore {
        &self.store
    }

    pub fn store_mut(&mut self) -> &mut GraphStore {
        &mut self.store
    }

    pub fn snapshot(&self) -> Arc<GraphSnapshot> {
        self.store.snapshot()
    }

    pub fn clipboard(&self) -> &Clipboard {
        &self.clipboard
    }

    pub fn viewport(&self) -> Viewport {
        self.viewport
    }

    pub fn focused_label(&self) -> Option<NodeId> {
        self.focus.focused()
    }

    pub fn label_draft(&self, node_id: &NodeId) -> Option<&str> {
        self.label_editors.get(node_id).and_then(LabelEditor::draft)
    }

    pub fn is_mounted(&self) -> bool {
        !self.registrations.is_empty()
    }

    /// Registers the global clipboard shortcuts for this view. Mounting an
    /// already mounted view replaces its bindings instead of stacking them.
    pub fn mount(&mut self) {
        self.registrations.clear();
        self.registrations = self.shortcuts.register_clipboard_shortcuts();
        tracing::debug!(bindings = self.shortcuts.binding_count(), "editor view mounted");
    }

    pub fn unmount(&mut self) {
        self.registrations.clear();
        tracing::debug!(bindings = self.shortcuts.binding_count(), "editor view unmounted");
    }

    pub fn execute(&mut self, command: EditorCommand) -> CommandOutcome {
        match command {
            EditorCommand::AddNode { position, label } => {
                let label = label.unwrap_or_else(|| self.store.config().default_label.clone());
                let node_id = self.store.add_node(position, label);
                CommandOutcome::NodeAdded { node_id }
            }
            EditorCommand::AddNodeAtCenter { bounds } => {
                let node_id = self.add_node_at_center(bounds);
                CommandOutcome::NodeAdded { node_id }
            }
            EditorCommand::UpdateLabel { node_id, text } => {
                CommandOutcome::changed(self.store.update_label(&node_id, text))
            }
            EditorCommand::Connect { connection } => match self.store.connect(&connection) {
                Some(edge_id) => CommandOutcome::EdgeCreated { edge_id },
                None => CommandOutcome::Unchanged,
            },
            EditorCommand::Select { node_ids } => {
                CommandOutcome::changed(self.store.select(&node_ids) > 0)
            }
            EditorCommand::SetSelection { node_ids } => {
                CommandOutcome::changed(self.store.set_selection(&node_ids) > 0)
            }
            EditorCommand::DeselectAll => CommandOutcome::changed(self.store.deselect_all() > 0),
            EditorCommand::MoveNode { node_id, position } => {
                CommandOutcome::changed(self.store.move_node(&node_id, position))
            }
            EditorCommand::ResizeNode { node_id, size } => {
                CommandOutcome::changed(self.store.resize_node(&node_id, size))
            }
            EditorCommand::SetViewport { viewport } => {
                let viewport = Viewport::new(viewport.x, viewport.y, viewport.zoom);
                let changed = viewport != self.viewport;
                self.viewport = viewport;
                CommandOutcome::changed(changed)
            }
            EditorCommand::Copy => self.copy(),
            EditorCommand::Paste => self.paste(),
            EditorCommand::BeginLabelEdit { node_id } => {
                CommandOutcome::changed(self.begin_label_edit(&node_id))
            }
            EditorCommand::TypeLabelText { node_id, text } => CommandOutcome::changed(
                self.label_editors
                    .get_mut(&node_id)
                    .is_some_and(|editor| editor.type_text(&text)),
            ),
            EditorCommand::BlurLabel { node_id } => self.blur_label(&node_id),
            EditorCommand::Key {
                key,
                ctrl,
                meta,
                shift,
                alt,
            } => {
                let mut modifiers = Modifiers::empty();
                modifiers.set(Modifiers::CTRL, ctrl);
                modifiers.set(Modifiers::SUPER, meta);
                modifiers.set(Modifiers::SHIFT, shift);
                modifiers.set(Modifiers::ALT, alt);
                self.handle_key(&KeyEvent::new(key, modifiers))
            }
        }
    }

    pub fn add_node_at_center(&mut self, bounds: Size) -> NodeId {
        let position = self.viewport.visible_center(bounds);
        let label = self.store.config().default_label.clone();
        self.store.add_node(position, label)
    }

    pub fn copy(&mut self) -> CommandOutcome {
        if !self.clipboard.copy(&self.store.snapshot()) {
            return CommandOutcome::Unchanged;
        }
        let content = self.clipboard.content();
        CommandOutcome::Copied {
            node_count: content.map_or(0, |content| content.nodes.len()),
            edge_count: content.map_or(0, |content| content.edges.len()),
        }
    }

    pub fn paste(&mut self) -> CommandOutcome {
        match self.clipboard.paste(&mut self.store) {
            Some(report) => CommandOutcome::Pasted { report },
            None => CommandOutcome::Unchanged,
        }
    }

    /// Double activation on a node label. Any other label being edited loses
    /// focus first and commits.
    pub fn begin_label_edit(&mut self, node_id: &NodeId) -> bool {
        let Some(node) = self.store.node(node_id) else {
            tracing::debug!(node_id = %node_id, "label edit ignored: node missing");
            return false;
        };

        if let Some(focused) = self.focus.focused().filter(|focused| focused != node_id) {
            self.blur_label(&focused);
        }

        self.label_editors
            .entry(node_id.clone())
            .or_insert_with(|| LabelEditor::new(node_id.clone()))
            .activate(node.label(), &self.focus);
        true
    }

    pub fn blur_label(&mut self, node_id: &NodeId) -> CommandOutcome {
        let Some(commit) = self
            .label_editors
            .get_mut(node_id)
            .and_then(LabelEditor::blur)
        else {
            return CommandOutcome::Unchanged;
        };
        self.label_editors.remove(node_id);
        self.apply_label_commit(commit)
    }

    pub fn apply_label_commit(&mut self, commit: LabelCommit) -> CommandOutcome {
        // Unknown or unchanged labels are still reported back as the
        // committed text; the store decides whether anything moved.
        self.store.update_label(&commit.node_id, commit.text.clone());
        CommandOutcome::LabelCommitted {
            node_id: commit.node_id,
            text: commit.text,
        }
    }

    pub fn handle_key(&mut self, event: &KeyEvent) -> CommandOutcome {
        let dispatch = self.shortcuts.dispatch(event);
        let outcomes = dispatch
            .actions
            .iter()
            .map(|action| match action {
                ShortcutAction::Copy => self.copy(),
                ShortcutAction::Paste => self.paste(),
            })
            .collect();
        CommandOutcome::KeyHandled {
            outcomes,
            prevent_default: dispatch.prevent_default,
        }
    }
}
