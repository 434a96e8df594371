//! Demo Controls
//!
//! The surface the input layer drives. Both demos implement it; key events
//! reach it through [`apply_action`].

use crate::input::{ActionChange, ControlAction};

/// Commands exposed to buttons and keys.
pub trait DemoControls {
    fn move_left(&mut self);
    fn move_right(&mut self);
    fn increase_height(&mut self);
    fn decrease_height(&mut self);
    fn start_charging(&mut self);
    fn throw_marble(&mut self);
    /// Terrain elevation for overlays and debugging.
    fn height_at(&self, x: f32, z: f32) -> f32;
    fn reset(&mut self) {}
}

/// Route one held/released action to the demo. Movement fires on press;
/// charge starts on press and throws on release.
pub fn apply_action(controls: &mut dyn DemoControls, change: ActionChange) {
    match (change.action, change.pressed) {
        (ControlAction::MoveLeft, true) => controls.move_left(),
        (ControlAction::MoveRight, true) => controls.move_right(),
        (ControlAction::IncreaseHeight, true) => controls.increase_height(),
        (ControlAction::DecreaseHeight, true) => controls.decrease_height(),
        (ControlAction::Charge, true) => controls.start_charging(),
        (ControlAction::Charge, false) => controls.throw_marble(),
        (ControlAction::Reset, true) => controls.reset(),
        _ => {}
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Default)]
    struct Log(Vec<&'static str>);

    impl DemoControls for Log {
        fn move_left(&mut self) {
            self.0.push("left");
        }
        fn move_right(&mut self) {
            self.0.push("right");
        }
        fn increase_height(&mut self) {
            self.0.push("up");
        }
        fn decrease_height(&mut self) {
            self.0.push("down");
        }
        fn start_charging(&mut self) {
            self.0.push("charge");
        }
        fn throw_marble(&mut self) {
            self.0.push("throw");
        }
        fn height_at(&self, _x: f32, _z: f32) -> f32 {
            0.0
        }
    }

    #[test]
    fn test_charge_press_and_release() {
        let mut log = Log::default();
        let press = |action, pressed| ActionChange { action, pressed };
        apply_action(&mut log, press(ControlAction::Charge, true));
        apply_action(&mut log, press(ControlAction::MoveLeft, true));
        apply_action(&mut log, press(ControlAction::MoveLeft, false));
        apply_action(&mut log, press(ControlAction::Charge, false));
        apply_action(&mut log, press(ControlAction::Reset, true));
        assert_eq!(log.0, vec!["charge", "left", "throw"]);
    }
}
