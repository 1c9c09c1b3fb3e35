//! Camera pose derived from the local player

use super::session::CameraMode;
use super::Vec3;

/// Eye height above the feet in first person
pub const EYE_HEIGHT: f32 = 1.6;

/// Third-person offset behind and above the player, before rotation
pub const THIRD_PERSON_OFFSET: Vec3 = Vec3::new(0.0, 8.0, 10.0);

/// Where the camera sits and where it points
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CameraPose {
    pub position: Vec3,
    pub yaw: f32,
    pub pitch: f32,
    /// Set in third person: the camera looks at this point instead of using yaw/pitch
    pub look_at: Option<Vec3>,
}

impl CameraPose {
    /// Derive the camera from the local player's pose. Never stored.
    pub fn derive(mode: CameraMode, player: Vec3, yaw: f32, pitch: f32) -> Self {
        match mode {
            CameraMode::FirstPerson => Self {
                position: Vec3::new(player.x, player.y + EYE_HEIGHT, player.z),
                yaw,
                pitch,
                look_at: None,
            },
            CameraMode::ThirdPerson => {
                let (sin, cos) = yaw.sin_cos();
                let offset = Vec3 {
                    x: THIRD_PERSON_OFFSET.x * cos + THIRD_PERSON_OFFSET.z * sin,
                    y: THIRD_PERSON_OFFSET.y,
                    z: -THIRD_PERSON_OFFSET.x * sin + THIRD_PERSON_OFFSET.z * cos,
                };
                Self {
                    position: player + offset,
                    yaw,
                    pitch: 0.0,
                    look_at: Some(player),
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn first_person_adds_eye_height_only() {
        let pose = CameraPose::derive(CameraMode::FirstPerson, Vec3::new(3.0, 0.0, -4.0), 0.5, 0.1);
        assert_eq!(pose.position, Vec3::new(3.0, 1.6, -4.0));
        assert_eq!(pose.look_at, None);
        assert_eq!(pose.pitch, 0.1);
    }

    #[test]
    fn third_person_orbits_with_yaw() {
        let player = Vec3::new(1.0, 0.0, 1.0);
        let behind = CameraPose::derive(CameraMode::ThirdPerson, player, 0.0, 0.0);
        assert_eq!(behind.position, Vec3::new(1.0, 8.0, 11.0));
        assert_eq!(behind.look_at, Some(player));

        let turned = CameraPose::derive(
            CameraMode::ThirdPerson,
            player,
            std::f32::consts::FRAC_PI_2,
            0.0,
        );
        assert!((turned.position.x - 11.0).abs() < 1e-4);
        assert!((turned.position.z - 1.0).abs() < 1e-4);
    }
}
