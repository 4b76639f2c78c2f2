pub mod algorithms;
pub mod clipboard;
pub mod config;
pub mod error;
pub mod ids;
pub mod invariants;
pub mod keyboard;
pub mod label_editor;
pub mod models;
pub mod operations;
pub mod store;
pub mod validator;
pub mod viewport;

pub mod prelude {
    pub use crate::algorithms::{induced_subgraph, remap_edge_endpoints, selected_node_ids};
    pub use crate::clipboard::{Clipboard, ClipboardContent, PasteReport};
    pub use crate::config::EditorConfig;
    pub use crate::error::{ErrorKind, LibError, Result};
    pub use crate::ids::{EdgeIdReservation, next_edge_id, next_node_id, reserve_node_ids};
    pub use crate::invariants::{
        DocumentInvariantViolation, document_invariant_violations, ensure_document_invariants,
    };
    pub use crate::keyboard::{KeyEvent, Modifiers, ShortcutAction, ShortcutRegistry};
    pub use crate::label_editor::{FocusTracker, LabelCommit, LabelEditState, LabelEditor};
    pub use crate::models::{
        Connection, Document, Edge, EdgeId, HandlePosition, Marker, MarkerType, Node, NodeData,
        NodeId, Position, Size,
    };
    pub use crate::operations::{CommandOutcome, DiagramEditor, EditorCommand};
    pub use crate::store::{GraphSnapshot, GraphStore, ListenerId};
    pub use crate::validator::{
        AcceptAll, AllOf, ConnectionValidator, ProposedEdge, RejectParallelEdges,
        RejectSelfLoops, RequireOpposingHandles, validator_fn,
    };
    pub use crate::viewport::Viewport;
}
