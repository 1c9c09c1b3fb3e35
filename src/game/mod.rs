//! Game session engine modules

pub mod camera;
pub mod client;
pub mod entity;
pub mod physics;
pub mod runner;
pub mod scene;
pub mod session;

pub use client::{GameClient, LocalProfile, Screen, SessionStatus};
pub use entity::Role;
pub use runner::{ClientCommand, SessionHandle, SessionRunner};
pub use session::{CameraMode, GameSession};

use serde::{Deserialize, Serialize};

/// Position in scene space: +x right, +y up, +z towards the default camera
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Vec3 {
    pub x: f32,
    pub y: f32,
    pub z: f32,
}

impl Vec3 {
    pub const ZERO: Vec3 = Vec3::new(0.0, 0.0, 0.0);

    pub const fn new(x: f32, y: f32, z: f32) -> Self {
        Self { x, y, z }
    }
}

impl std::ops::Add for Vec3 {
    type Output = Vec3;

    fn add(self, rhs: Vec3) -> Vec3 {
        Vec3::new(self.x + rhs.x, self.y + rhs.y, self.z + rhs.z)
    }
}

/// Position plus heading of an entity
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Pose {
    pub position: Vec3,
    /// Rotation about +y in radians
    pub rotation_yaw: f32,
}
