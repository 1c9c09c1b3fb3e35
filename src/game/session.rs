//! Active game session state

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::room::Room;
use crate::util::time::format_countdown;

use super::scene::SceneLayout;

/// Camera modes exposed to the UI
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CameraMode {
    FirstPerson,
    ThirdPerson,
}

impl CameraMode {
    pub fn toggled(self) -> Self {
        match self {
            CameraMode::FirstPerson => CameraMode::ThirdPerson,
            CameraMode::ThirdPerson => CameraMode::FirstPerson,
        }
    }
}

impl Default for CameraMode {
    fn default() -> Self {
        Self::ThirdPerson
    }
}

/// Exists only while the room is playing
#[derive(Debug, Clone)]
pub struct GameSession {
    pub room: Room,
    /// Seconds left on the round clock
    pub time_left: u32,
    pub camera_mode: CameraMode,
    /// Local look pitch; yaw lives on the entity
    pub look_pitch: f32,
    pub scene: SceneLayout,
    pub started_at: DateTime<Utc>,
}

impl GameSession {
    pub fn new(room: Room, time_left: u32) -> Self {
        let scene = SceneLayout::generate(&room.id);
        Self {
            room,
            time_left,
            camera_mode: CameraMode::default(),
            look_pitch: 0.0,
            scene,
            started_at: Utc::now(),
        }
    }

    pub fn timer_label(&self) -> String {
        format_countdown(self.time_left)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn camera_toggle_round_trips() {
        let mode = CameraMode::default();
        assert_eq!(mode, CameraMode::ThirdPerson);
        assert_eq!(mode.toggled(), CameraMode::FirstPerson);
        assert_eq!(mode.toggled().toggled(), mode);
    }
}
