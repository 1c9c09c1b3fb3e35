//! Keyboard mapping and latches

use super::{Action, ActionSet};

/// A key the game listens to, resolved from a DOM-style key code
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Key {
    Forward,
    Backward,
    Left,
    Right,
    Action(Action),
}

impl Key {
    /// Resolve a `KeyboardEvent.code` value; unknown keys are ignored.
    pub fn from_code(code: &str) -> Option<Self> {
        let key = match code {
            "KeyW" | "ArrowUp" => Self::Forward,
            "KeyS" | "ArrowDown" => Self::Backward,
            "KeyA" | "ArrowLeft" => Self::Left,
            "KeyD" | "ArrowRight" => Self::Right,
            "KeyV" => Self::Action(Action::ToggleView),
            "KeyE" => Self::Action(Action::EnterSafeZone),
            "KeyQ" => Self::Action(Action::UseEquipment),
            _ => return None,
        };
        Some(key)
    }
}

/// Held movement keys. Boolean latches, so a held key keeps moving the player.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MoveLatches {
    pub forward: bool,
    pub backward: bool,
    pub left: bool,
    pub right: bool,
}

impl MoveLatches {
    pub fn set(&mut self, key: Key, pressed: bool) {
        match key {
            Key::Forward => self.forward = pressed,
            Key::Backward => self.backward = pressed,
            Key::Left => self.left = pressed,
            Key::Right => self.right = pressed,
            Key::Action(_) => {}
        }
    }

    /// Strafe axis, right is positive
    pub fn strafe(&self) -> f32 {
        axis(self.left, self.right)
    }

    /// Depth axis in scene space, +z points back towards the camera
    pub fn depth(&self) -> f32 {
        axis(self.forward, self.backward)
    }

    pub fn clear(&mut self) {
        *self = Self::default();
    }
}

fn axis(negative: bool, positive: bool) -> f32 {
    match (negative, positive) {
        (true, false) => -1.0,
        (false, true) => 1.0,
        _ => 0.0,
    }
}

/// Edge detector for discrete actions.
///
/// `press` reports an action once per physical press; it re-arms on `release`.
#[derive(Debug, Clone, Copy, Default)]
pub struct ActionLatch {
    held: ActionSet,
}

impl ActionLatch {
    /// Returns true on the transition from released to pressed.
    pub fn press(&mut self, action: Action) -> bool {
        if self.held.contains(action) {
            return false;
        }
        self.held.insert(action);
        true
    }

    pub fn release(&mut self, action: Action) {
        self.held.remove(action);
    }

    pub fn clear(&mut self) {
        self.held = ActionSet::empty();
    }
}
