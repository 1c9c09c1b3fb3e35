//! Local pose integration and play-area constraints

use super::Vec3;

/// Half extent of the square play area on x and z
pub const PLAY_AREA_HALF_EXTENT: f32 = 90.0;

/// Pitch is kept short of straight up/down
pub const PITCH_LIMIT: f32 = 1.5;

/// Integration helpers for the local player
pub struct PhysicsSystem;

impl PhysicsSystem {
    /// Move by `(move_x, move_z) * speed` in the entity's local frame, then clamp.
    ///
    /// The local frame is rotated by `yaw` about +y. Out-of-bounds results are
    /// truncated at the boundary, never rejected.
    pub fn integrate_position(
        position: Vec3,
        yaw: f32,
        move_x: f32,
        move_z: f32,
        speed: f32,
    ) -> Vec3 {
        let (sin, cos) = yaw.sin_cos();
        let local_x = move_x * speed;
        let local_z = move_z * speed;

        let moved = Vec3 {
            x: position.x + local_x * cos + local_z * sin,
            y: position.y,
            z: position.z - local_x * sin + local_z * cos,
        };

        Self::clamp_to_play_area(moved)
    }

    /// Apply look deltas. Yaw wraps to 0..2π, pitch is clamped.
    pub fn integrate_look(yaw: f32, pitch: f32, yaw_delta: f32, pitch_delta: f32) -> (f32, f32) {
        let yaw = (yaw + yaw_delta).rem_euclid(std::f32::consts::TAU);
        let pitch = (pitch + pitch_delta).clamp(-PITCH_LIMIT, PITCH_LIMIT);
        (yaw, pitch)
    }

    pub fn clamp_to_play_area(position: Vec3) -> Vec3 {
        Vec3 {
            x: clamp_axis(position.x),
            y: position.y,
            z: clamp_axis(position.z),
        }
    }
}

fn clamp_axis(value: f32) -> f32 {
    if value.is_nan() {
        return 0.0;
    }
    value.clamp(-PLAY_AREA_HALF_EXTENT, PLAY_AREA_HALF_EXTENT)
}
