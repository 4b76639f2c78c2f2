//! Global keyboard shortcuts for the editor view.
//!
//! Bindings are held by [`ShortcutRegistration`] guards: dropping the guard
//! (view teardown) removes the binding, so remounting a view never leaves a
//! second live copy of the same shortcut behind.

use std::cell::RefCell;
use std::collections::BTreeMap;
use std::rc::Rc;

use bitflags::bitflags;
use serde::{Deserialize, Serialize};

bitflags! {
    /// Modifier keys held during a key event.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    pub struct Modifiers: u8 {
        const SHIFT = 0b0001;
        const ALT   = 0b0010;
        const CTRL  = 0b0100;
        /// Cmd on macOS, Meta elsewhere.
        const SUPER = 0b1000;
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct KeyEvent {
    pub key: char,
    pub modifiers: Modifiers,
}

impl KeyEvent {
    pub fn new(key: char, modifiers: Modifiers) -> Self {
        Self {
            key: key.to_ascii_lowercase(),
            modifiers,
        }
    }

    pub fn ctrl(key: char) -> Self {
        Self::new(key, Modifiers::CTRL)
    }

    pub fn cmd(key: char) -> Self {
        Self::new(key, Modifiers::SUPER)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ShortcutAction {
    Copy,
    Paste,
}

/// A key chord: the key plus the exact modifier set required.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Chord {
    pub key: char,
    pub modifiers: Modifiers,
}

impl Chord {
    pub fn matches(&self, event: &KeyEvent) -> bool {
        self.key == event.key && self.modifiers == event.modifiers
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Dispatch {
    pub actions: Vec<ShortcutAction>,
    /// Set when a binding matched; the platform's own clipboard handling
    /// must not run.
    pub prevent_default: bool,
}

type Bindings = BTreeMap<u64, (Chord, ShortcutAction)>;

#[derive(Debug, Default)]
struct RegistryInner {
    bindings: Bindings,
    next_key: u64,
}

#[derive(Debug, Clone, Default)]
pub struct ShortcutRegistry {
    inner: Rc<RefCell<RegistryInner>>,
}

impl ShortcutRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(&self, chord: Chord, action: ShortcutAction) -> ShortcutRegistration {
        let mut inner = self.inner.borrow_mut();
        let key = inner.next_key;
        inner.next_key += 1;
        inner.bindings.insert(key, (chord, action));
        ShortcutRegistration {
            key,
            registry: Rc::clone(&self.inner),
        }
    }

    /// Ctrl+C / Cmd+C copy and Ctrl+V / Cmd+V paste.
    pub fn register_clipboard_shortcuts(&self) -> Vec<ShortcutRegistration> {
        [
            ('c', Modifiers::CTRL, ShortcutAction::Copy),
            ('c', Modifiers::SUPER, ShortcutAction::Copy),
            ('v', Modifiers::CTRL, ShortcutAction::Paste),
            ('v', Modifiers::SUPER, ShortcutAction::Paste),
        ]
        .into_iter()
        .map(|(key, modifiers, action)| self.register(Chord { key, modifiers }, action))
        .collect()
    }

    pub fn binding_count(&self) -> usize {
        self.inner.borrow().bindings.len()
    }

    pub fn dispatch(&self, event: &KeyEvent) -> Dispatch {
        let actions: Vec<ShortcutAction> = self
            .inner
            .borrow()
            .bindings
            .values()
            .filter(|(chord, _)| chord.matches(event))
            .map(|(_, action)| *action)
            .collect();
        Dispatch {
            prevent_default: !actions.is_empty(),
            actions,
        }
    }
}

#[derive(Debug)]
pub struct ShortcutRegistration {
    key: u64,
    registry: Rc<RefCell<RegistryInner>>,
}

impl Drop for ShortcutRegistration {
    fn drop(&mut self) {
        self.registry.borrow_mut().bindings.remove(&self.key);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ctrl_and_cmd_both_trigger_clipboard_actions() {
        let registry = ShortcutRegistry::new();
        let _guards = registry.register_clipboard_shortcuts();

        for event in [KeyEvent::ctrl('c'), KeyEvent::cmd('C')] {
            let dispatch = registry.dispatch(&event);
            assert_eq!(dispatch.actions, vec![ShortcutAction::Copy]);
            assert!(dispatch.prevent_default);
        }
        assert_eq!(
            registry.dispatch(&KeyEvent::ctrl('v')).actions,
            vec![ShortcutAction::Paste]
        );
    }

    #[test]
    fn unbound_keys_keep_default_behaviour() {
        let registry = ShortcutRegistry::new();
        let _guards = registry.register_clipboard_shortcuts();

        let plain = registry.dispatch(&KeyEvent::new('c', Modifiers::empty()));
        assert!(plain.actions.is_empty());
        assert!(!plain.prevent_default);

        let shifted = registry.dispatch(&KeyEvent::new('c', Modifiers::CTRL | Modifiers::SHIFT));
        assert!(shifted.actions.is_empty());
    }

    #[test]
    fn dropping_guards_deregisters() {
        let registry = ShortcutRegistry::new();
        let guards = registry.register_clipboard_shortcuts();
        assert_eq!(registry.binding_count(), 4);

        drop(guards);
        assert_eq!(registry.binding_count(), 0);
        assert!(registry.dispatch(&KeyEvent::ctrl('c')).actions.is_empty());
    }

    #[test]
    fn remount_without_teardown_duplicates_handling() {
        let registry = ShortcutRegistry::new();
        let first = registry.register_clipboard_shortcuts();
        let _second = registry.register_clipboard_shortcuts();
        assert_eq!(registry.dispatch(&KeyEvent::ctrl('v')).actions.len(), 2);

        drop(first);
        assert_eq!(registry.dispatch(&KeyEvent::ctrl('v')).actions.len(), 1);
    }
}
