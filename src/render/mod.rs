//! Render adapter seam
//!
//! The session core only pushes poses and camera state through this trait;
//! drawing belongs to whatever sits behind it.

pub mod headless;

pub use headless::TracingRenderer;

use crate::game::camera::CameraPose;
use crate::game::entity::EntityVisual;
use crate::game::scene::SceneLayout;
use crate::game::{CameraMode, Vec3};

pub trait RenderAdapter: Send {
    /// Place the camera for this frame
    fn configure_camera(&mut self, mode: CameraMode, pose: &CameraPose);

    /// Create or move the mesh for an entity
    fn set_entity_pose(&mut self, id: &str, position: Vec3, rotation_yaw: f32, visual: EntityVisual);

    fn remove_entity(&mut self, id: &str);

    /// Build static obstacles and safe zones for a new session
    fn dress_scene(&mut self, layout: &SceneLayout);

    /// Drop everything, including entity meshes
    fn clear_scene(&mut self);

    fn render_frame(&mut self);
}
