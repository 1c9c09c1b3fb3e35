//! Virtual on-screen joysticks

use serde::{Deserialize, Serialize};

/// Which of the two on-screen sticks an event belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Stick {
    /// Planar movement
    Left,
    /// Look (yaw / pitch)
    Right,
}

/// Normalized stick deflection
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct JoystickState {
    /// Horizontal deflection, right is positive
    pub x: f32,
    /// Vertical deflection in screen space, down is positive
    pub y: f32,
    pub active: bool,
}

/// A single touch stick bound to at most one pointer at a time.
///
/// Raw deltas are measured from the stick centre in pixels and scaled into
/// the unit circle, so the deflection length never exceeds 1.
#[derive(Debug, Clone)]
pub struct VirtualJoystick {
    max_radius: f32,
    pointer_id: Option<u64>,
    state: JoystickState,
}

impl VirtualJoystick {
    pub fn new(max_radius: f32) -> Self {
        Self {
            max_radius: max_radius.max(f32::EPSILON),
            pointer_id: None,
            state: JoystickState::default(),
        }
    }

    pub fn state(&self) -> JoystickState {
        self.state
    }

    /// Pointer went down on the stick. A second pointer is ignored while one is held.
    pub fn press(&mut self, pointer_id: u64, dx: f32, dy: f32) {
        if self.pointer_id.is_some_and(|id| id != pointer_id) {
            return;
        }
        self.pointer_id = Some(pointer_id);
        self.update(dx, dy);
    }

    /// Pointer moved; only the pointer that owns the stick is tracked.
    pub fn drag(&mut self, pointer_id: u64, dx: f32, dy: f32) {
        if self.pointer_id == Some(pointer_id) {
            self.update(dx, dy);
        }
    }

    /// Pointer lifted: the stick snaps back to centre.
    pub fn release(&mut self, pointer_id: u64) {
        if self.pointer_id == Some(pointer_id) {
            self.reset();
        }
    }

    pub fn reset(&mut self) {
        self.pointer_id = None;
        self.state = JoystickState::default();
    }

    fn update(&mut self, dx: f32, dy: f32) {
        let (x, y) = normalize(dx, dy, self.max_radius);
        self.state = JoystickState { x, y, active: true };
    }
}

/// Scale a raw delta into the unit circle.
pub fn normalize(dx: f32, dy: f32, max_radius: f32) -> (f32, f32) {
    if !dx.is_finite() || !dy.is_finite() {
        return (0.0, 0.0);
    }

    let distance = (dx * dx + dy * dy).sqrt();
    let scale = if distance > max_radius {
        max_radius / distance
    } else {
        1.0
    };

    let x = (dx * scale / max_radius).clamp(-1.0, 1.0);
    let y = (dy * scale / max_radius).clamp(-1.0, 1.0);

    // Guard against float rounding nudging the length past 1
    let len = (x * x + y * y).sqrt();
    if len > 1.0 {
        (x / len, y / len)
    } else {
        (x, y)
    }
}
