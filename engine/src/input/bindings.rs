//! Input Bindings Module
//!
//! Maps DOM key codes to logical actions. Several keys may drive the same
//! action (arrows and WASD), each key drives at most one.

use std::collections::HashMap;

/// Logical inputs shared by both demos.
///
/// The marble launcher reads them literally. The condor maps left/right to
/// banking and height to climb/dive.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ControlAction {
    /// Move launcher left / bank left (default: ArrowLeft, KeyA)
    MoveLeft,
    /// Move launcher right / bank right (default: ArrowRight, KeyD)
    MoveRight,
    /// Raise launcher / climb (default: ArrowUp, KeyW)
    IncreaseHeight,
    /// Lower launcher / dive (default: ArrowDown, KeyS)
    DecreaseHeight,
    /// Hold to charge, release to throw (default: Space)
    Charge,
    /// Start over (default: KeyR)
    Reset,
}

/// Key code to action map with reverse lookup.
#[derive(Debug, Clone)]
pub struct KeyBindings {
    key_to_action: HashMap<String, ControlAction>,
}

impl Default for KeyBindings {
    fn default() -> Self {
        Self::new()
    }
}

impl KeyBindings {
    /// Arrows and WASD for movement, Space to charge, R to reset.
    pub fn new() -> Self {
        let mut bindings = Self::empty();
        for (key, action) in [
            ("ArrowLeft", ControlAction::MoveLeft),
            ("KeyA", ControlAction::MoveLeft),
            ("ArrowRight", ControlAction::MoveRight),
            ("KeyD", ControlAction::MoveRight),
            ("ArrowUp", ControlAction::IncreaseHeight),
            ("KeyW", ControlAction::IncreaseHeight),
            ("ArrowDown", ControlAction::DecreaseHeight),
            ("KeyS", ControlAction::DecreaseHeight),
            ("Space", ControlAction::Charge),
            ("KeyR", ControlAction::Reset),
        ] {
            bindings.bind(key, action);
        }
        bindings
    }

    pub fn empty() -> Self {
        Self {
            key_to_action: HashMap::new(),
        }
    }

    /// Bind a key, replacing whatever it was bound to before.
    pub fn bind(&mut self, key: &str, action: ControlAction) {
        self.key_to_action.insert(key.to_owned(), action);
    }

    pub fn unbind_key(&mut self, key: &str) {
        self.key_to_action.remove(key);
    }

    /// Remove every key bound to `action`.
    pub fn unbind_action(&mut self, action: ControlAction) {
        self.key_to_action.retain(|_, bound| *bound != action);
    }

    pub fn get_action(&self, key: &str) -> Option<ControlAction> {
        self.key_to_action.get(key).copied()
    }

    /// Keys bound to `action`, sorted for stable display.
    pub fn keys_for(&self, action: ControlAction) -> Vec<&str> {
        let mut keys: Vec<&str> = self
            .key_to_action
            .iter()
            .filter(|(_, bound)| **bound == action)
            .map(|(key, _)| key.as_str())
            .collect();
        keys.sort_unstable();
        keys
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_bindings() {
        let bindings = KeyBindings::new();
        assert_eq!(bindings.get_action("ArrowLeft"), Some(ControlAction::MoveLeft));
        assert_eq!(bindings.get_action("KeyD"), Some(ControlAction::MoveRight));
        assert_eq!(bindings.get_action("ArrowUp"), Some(ControlAction::IncreaseHeight));
        assert_eq!(bindings.get_action("KeyS"), Some(ControlAction::DecreaseHeight));
        assert_eq!(bindings.get_action("Space"), Some(ControlAction::Charge));
        assert_eq!(bindings.get_action("KeyR"), Some(ControlAction::Reset));
        assert_eq!(bindings.get_action("Escape"), None);
    }

    #[test]
    fn test_reverse_lookup() {
        let bindings = KeyBindings::new();
        assert_eq!(bindings.keys_for(ControlAction::MoveLeft), vec!["ArrowLeft", "KeyA"]);
        assert_eq!(bindings.keys_for(ControlAction::Charge), vec!["Space"]);
    }

    #[test]
    fn test_rebind_key() {
        let mut bindings = KeyBindings::new();
        bindings.bind("KeyA", ControlAction::Charge);
        assert_eq!(bindings.get_action("KeyA"), Some(ControlAction::Charge));
        assert_eq!(bindings.keys_for(ControlAction::MoveLeft), vec!["ArrowLeft"]);
    }

    #[test]
    fn test_unbind() {
        let mut bindings = KeyBindings::new();
        bindings.unbind_key("Space");
        assert_eq!(bindings.get_action("Space"), None);

        bindings.unbind_action(ControlAction::MoveRight);
        assert_eq!(bindings.get_action("ArrowRight"), None);
        assert_eq!(bindings.get_action("KeyD"), None);
        assert!(bindings.keys_for(ControlAction::MoveRight).is_empty());
    }
}
