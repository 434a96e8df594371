//! Input Module
//!
//! Maps browser keyboard codes (`KeyboardEvent.code`, e.g. `"ArrowLeft"`,
//! `"Space"`) to demo actions and tracks which actions are held. Decoupled
//! from the DOM: the host forwards key strings and the demos read actions.
//!
//! # Example
//!
//! ```rust,ignore
//! use condor_marble_engine::input::{ControlAction, InputState};
//!
//! let mut input = InputState::new();
//! if let Some(change) = input.handle_key("Space", true) {
//!     assert_eq!(change.action, ControlAction::Charge);
//! }
//! ```

pub mod bindings;

pub use bindings::{ControlAction, KeyBindings};

use std::collections::HashSet;

/// A held/released transition of one action.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ActionChange {
    pub action: ControlAction,
    pub pressed: bool,
}

/// Bindings plus the set of actions currently held.
#[derive(Debug, Clone, Default)]
pub struct InputState {
    pub bindings: KeyBindings,
    held: HashSet<ControlAction>,
}

impl InputState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_bindings(bindings: KeyBindings) -> Self {
        Self {
            bindings,
            held: HashSet::new(),
        }
    }

    /// Feed one key event. Returns the action change, or `None` for unbound
    /// keys and auto-repeat of an action that is already held.
    pub fn handle_key(&mut self, code: &str, pressed: bool) -> Option<ActionChange> {
        let action = self.bindings.get_action(code)?;
        let changed = if pressed {
            self.held.insert(action)
        } else {
            self.held.remove(&action)
        };
        changed.then_some(ActionChange { action, pressed })
    }

    pub fn is_held(&self, action: ControlAction) -> bool {
        self.held.contains(&action)
    }

    /// -1, 0 or 1 from a pair of opposing actions.
    pub fn axis(&self, negative: ControlAction, positive: ControlAction) -> f32 {
        let mut value = 0.0;
        if self.is_held(negative) {
            value -= 1.0;
        }
        if self.is_held(positive) {
            value += 1.0;
        }
        value
    }

    /// Release everything, e.g. when the page loses focus.
    pub fn reset(&mut self) {
        self.held.clear();
    }
}
