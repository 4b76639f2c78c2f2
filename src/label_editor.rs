//! Inline label editing for a single node.
//!
//! `Viewing` --activate--> `Editing` --blur--> `Viewing`. Only the text present
//! at the moment of blur is committed, and the commit is handed back as a
//! [`LabelCommit`] for the store to apply rather than written directly.

use std::cell::RefCell;
use std::ops::Range;
use std::rc::Rc;

use serde::{Deserialize, Serialize};

use crate::models::NodeId;

/// Tracks which node's label currently owns input focus.
#[derive(Debug, Clone, Default)]
pub struct FocusTracker {
    owner: Rc<RefCell<Option<NodeId>>>,
}

impl FocusTracker {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn focused(&self) -> Option<NodeId> {
        self.owner.borrow().clone()
    }

    pub fn acquire(&self, node_id: &NodeId) -> FocusGuard {
        *self.owner.borrow_mut() = Some(node_id.clone());
        FocusGuard {
            node_id: node_id.clone(),
            owner: Rc::clone(&self.owner),
        }
    }
}

/// Focus held for one editing session; released on drop unless another node
/// has taken focus in the meantime.
#[derive(Debug)]
pub struct FocusGuard {
    node_id: NodeId,
    owner: Rc<RefCell<Option<NodeId>>>,
}

impl Drop for FocusGuard {
    fn drop(&mut self) {
        let mut owner = self.owner.borrow_mut();
        if owner.as_ref() == Some(&self.node_id) {
            *owner = None;
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LabelCommit {
    pub node_id: NodeId,
    pub text: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum LabelEditState {
    #[default]
    Viewing,
    Editing {
        draft: String,
        /// Byte range of `draft` that typing will replace. `None` means the
        /// caret sits at the end.
        selection: Option<Range<usize>>,
    },
}

#[derive(Debug)]
pub struct LabelEditor {
    node_id: NodeId,
    state: LabelEditState,
    focus: Option<FocusGuard>,
}

impl LabelEditor {
    pub fn new(node_id: NodeId) -> Self {
        Self {
            node_id,
            state: LabelEditState::Viewing,
            focus: None,
        }
    }

    pub fn node_id(&self) -> &NodeId {
        &self.node_id
    }

    pub fn state(&self) -> &LabelEditState {
        &self.state
    }

    pub fn is_editing(&self) -> bool {
        matches!(self.state, LabelEditState::Editing { .. })
    }

    pub fn draft(&self) -> Option<&str> {
        match &self.state {
            LabelEditState::Editing { draft, .. } => Some(draft),
            LabelEditState::Viewing => None,
        }
    }

    /// Enters editing with `current_label` fully selected. Activating again
    /// before a blur throws the uncommitted draft away.
    pub fn activate(&mut self, current_label: &str, focus: &FocusTracker) {
        if self.is_editing() {
            tracing::debug!(node_id = %self.node_id, "label edit restarted, draft discarded");
        }
        // The old guard must go first: it releases focus for this same node.
        drop(self.focus.take());
        self.focus = Some(focus.acquire(&self.node_id));
        self.state = LabelEditState::Editing {
            draft: current_label.to_string(),
            selection: Some(0..current_label.len()),
        };
    }

    /// Types `text` over the current selection. Ignored while viewing.
    pub fn type_text(&mut self, text: &str) -> bool {
        let LabelEditState::Editing { draft, selection } = &mut self.state else {
            return false;
        };
        match selection.take() {
            Some(range) => draft.replace_range(range, text),
            None => draft.push_str(text),
        }
        true
    }

    pub fn set_text(&mut self, text: &str) -> bool {
        let LabelEditState::Editing { draft, selection } = &mut self.state else {
            return false;
        };
        *draft = text.to_string();
        *selection = None;
        true
    }

    /// Leaves editing and returns the text to commit.
    pub fn blur(&mut self) -> Option<LabelCommit> {
        let LabelEditState::Editing { draft, .. } = std::mem::take(&mut self.state) else {
            return None;
        };
        self.focus = None;
        Some(LabelCommit {
            node_id: self.node_id.clone(),
            text: draft,
        })
    }
}
