//! Input aggregation
//!
//! Platform event handlers feed [`InputEvent`]s into the [`InputAggregator`];
//! the simulation loop pulls one [`InputIntent`] per tick with
//! [`InputAggregator::sample_intent`].

pub mod joystick;
pub mod keyboard;

use serde::{Deserialize, Serialize};

pub use joystick::{JoystickState, Stick, VirtualJoystick};
pub use keyboard::{ActionLatch, Key, MoveLatches};

/// Radians of look per unit of right-stick deflection per tick
pub const LOOK_SENSITIVITY: f32 = 0.02;

/// Discrete player actions
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Action {
    ToggleView,
    EnterSafeZone,
    UseEquipment,
}

impl Action {
    pub const ALL: [Action; 3] = [
        Action::ToggleView,
        Action::EnterSafeZone,
        Action::UseEquipment,
    ];

    const fn bit(self) -> u8 {
        match self {
            Action::ToggleView => 1 << 0,
            Action::EnterSafeZone => 1 << 1,
            Action::UseEquipment => 1 << 2,
        }
    }
}

/// Small bit set of [`Action`]s
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ActionSet {
    bits: u8,
}

impl ActionSet {
    pub const fn empty() -> Self {
        Self { bits: 0 }
    }

    #[inline]
    pub const fn contains(&self, action: Action) -> bool {
        self.bits & action.bit() != 0
    }

    #[inline]
    pub fn insert(&mut self, action: Action) {
        self.bits |= action.bit();
    }

    #[inline]
    pub fn remove(&mut self, action: Action) {
        self.bits &= !action.bit();
    }

    pub const fn is_empty(&self) -> bool {
        self.bits == 0
    }

    pub fn iter(self) -> impl Iterator<Item = Action> {
        Action::ALL.into_iter().filter(move |a| self.contains(*a))
    }
}

/// Per-tick summary of desired movement, look and actions.
///
/// Movement uses scene axes: `move_x` strafes right, `move_z` points back
/// towards the camera, so walking forward is negative `move_z`.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct InputIntent {
    pub move_x: f32,
    pub move_z: f32,
    pub look_yaw_delta: f32,
    pub look_pitch_delta: f32,
    pub actions: ActionSet,
}

impl InputIntent {
    pub fn has_movement(&self) -> bool {
        self.move_x != 0.0 || self.move_z != 0.0
    }

    pub fn has_look(&self) -> bool {
        self.look_yaw_delta != 0.0 || self.look_pitch_delta != 0.0
    }
}

/// Raw events produced by keyboard, mouse and touch handlers
#[derive(Debug, Clone, PartialEq)]
pub enum InputEvent {
    KeyDown(String),
    KeyUp(String),
    /// On-screen action button pressed (mouse or touch)
    ButtonDown(Action),
    ButtonUp(Action),
    StickPress {
        stick: Stick,
        pointer_id: u64,
        dx: f32,
        dy: f32,
    },
    StickMove {
        stick: Stick,
        pointer_id: u64,
        dx: f32,
        dy: f32,
    },
    StickRelease {
        stick: Stick,
        pointer_id: u64,
    },
    /// Window lost focus: drop every held input
    Blur,
}

/// Fuses keyboard latches, action buttons and both sticks into one intent
#[derive(Debug, Clone)]
pub struct InputAggregator {
    keys: MoveLatches,
    key_actions: ActionLatch,
    button_actions: ActionLatch,
    left: VirtualJoystick,
    right: VirtualJoystick,
    pending: ActionSet,
}

impl InputAggregator {
    pub fn new(joystick_max_radius: f32) -> Self {
        Self {
            keys: MoveLatches::default(),
            key_actions: ActionLatch::default(),
            button_actions: ActionLatch::default(),
            left: VirtualJoystick::new(joystick_max_radius),
            right: VirtualJoystick::new(joystick_max_radius),
            pending: ActionSet::empty(),
        }
    }

    /// Apply one event immediately; the next sample observes the result.
    pub fn handle(&mut self, event: InputEvent) {
        match event {
            InputEvent::KeyDown(code) => match Key::from_code(&code) {
                Some(Key::Action(action)) => {
                    if self.key_actions.press(action) {
                        self.pending.insert(action);
                    }
                }
                Some(key) => self.keys.set(key, true),
                None => {}
            },
            InputEvent::KeyUp(code) => match Key::from_code(&code) {
                Some(Key::Action(action)) => self.key_actions.release(action),
                Some(key) => self.keys.set(key, false),
                None => {}
            },
            InputEvent::ButtonDown(action) => {
                if self.button_actions.press(action) {
                    self.pending.insert(action);
                }
            }
            InputEvent::ButtonUp(action) => self.button_actions.release(action),
            InputEvent::StickPress {
                stick,
                pointer_id,
                dx,
                dy,
            } => self.stick_mut(stick).press(pointer_id, dx, dy),
            InputEvent::StickMove {
                stick,
                pointer_id,
                dx,
                dy,
            } => self.stick_mut(stick).drag(pointer_id, dx, dy),
            InputEvent::StickRelease { stick, pointer_id } => {
                self.stick_mut(stick).release(pointer_id)
            }
            InputEvent::Blur => self.clear(),
        }
    }

    /// Build this tick's intent and consume pending actions. Never blocks.
    ///
    /// Keyboard and stick movement are summed without clamping, so both
    /// sources at once can reach a magnitude of 2 per axis.
    pub fn sample_intent(&mut self) -> InputIntent {
        let left = self.left.state();
        let right = self.right.state();

        let mut intent = InputIntent {
            move_x: self.keys.strafe(),
            move_z: self.keys.depth(),
            ..Default::default()
        };

        if left.active {
            intent.move_x += left.x;
            // Stick up is negative screen y and means walking away from the camera
            intent.move_z += left.y;
        }

        if right.active {
            intent.look_yaw_delta = right.x * LOOK_SENSITIVITY;
            intent.look_pitch_delta = right.y * LOOK_SENSITIVITY;
        }

        intent.actions = std::mem::take(&mut self.pending);
        intent
    }

    pub fn joystick(&self, stick: Stick) -> JoystickState {
        match stick {
            Stick::Left => self.left.state(),
            Stick::Right => self.right.state(),
        }
    }

    /// Forget queued actions but keep held keys and sticks
    pub fn discard_actions(&mut self) {
        self.pending = ActionSet::empty();
    }

    /// Drop all latches, sticks and queued actions
    pub fn clear(&mut self) {
        self.keys.clear();
        self.key_actions.clear();
        self.button_actions.clear();
        self.left.reset();
        self.right.reset();
        self.pending = ActionSet::empty();
    }

    fn stick_mut(&mut self, stick: Stick) -> &mut VirtualJoystick {
        match stick {
            Stick::Left => &mut self.left,
            Stick::Right => &mut self.right,
        }
    }
}
