//! Headless render adapter that tracks the scene graph and logs frames

use std::collections::HashMap;

use tracing::{debug, trace};

use crate::game::camera::CameraPose;
use crate::game::entity::EntityVisual;
use crate::game::scene::SceneLayout;
use crate::game::{CameraMode, Vec3};

use super::RenderAdapter;

/// Frames between periodic summary lines
const SUMMARY_INTERVAL: u64 = 600;

#[derive(Debug, Clone, Copy)]
struct Mesh {
    position: Vec3,
    rotation_yaw: f32,
    visual: EntityVisual,
}

/// Keeps a mesh per entity and the current camera without drawing anything
#[derive(Debug, Default)]
pub struct TracingRenderer {
    meshes: HashMap<String, Mesh>,
    camera: Option<(CameraMode, CameraPose)>,
    static_objects: usize,
    frames: u64,
}

impl TracingRenderer {
    pub fn new() -> Self {
        Self::default()
    }
}

impl RenderAdapter for TracingRenderer {
    fn configure_camera(&mut self, mode: CameraMode, pose: &CameraPose) {
        self.camera = Some((mode, *pose));
    }

    fn set_entity_pose(&mut self, id: &str, position: Vec3, rotation_yaw: f32, visual: EntityVisual) {
        let mesh = Mesh {
            position,
            rotation_yaw,
            visual,
        };
        if self.meshes.insert(id.to_string(), mesh).is_none() {
            debug!(player_id = %id, color = format!("{:06X}", visual.color), "Mesh created");
        }
    }

    fn remove_entity(&mut self, id: &str) {
        if self.meshes.remove(id).is_some() {
            debug!(player_id = %id, "Mesh removed");
        }
    }

    fn dress_scene(&mut self, layout: &SceneLayout) {
        self.static_objects = layout.obstacles.len() + layout.safe_zones.len();
        debug!(
            obstacles = layout.obstacles.len(),
            safe_zones = layout.safe_zones.len(),
            "Scene dressed"
        );
    }

    fn clear_scene(&mut self) {
        self.meshes.clear();
        self.static_objects = 0;
        self.camera = None;
        debug!("Scene cleared");
    }

    fn render_frame(&mut self) {
        self.frames += 1;
        if let Some((mode, pose)) = &self.camera {
            trace!(
                frame = self.frames,
                ?mode,
                x = pose.position.x,
                y = pose.position.y,
                z = pose.position.z,
                "Frame"
            );
        }
        if self.frames % SUMMARY_INTERVAL == 0 {
            let local = self.meshes.values().find(|m| m.visual.is_local);
            debug!(
                frame = self.frames,
                meshes = self.meshes.len(),
                static_objects = self.static_objects,
                local_x = local.map(|m| m.position.x),
                local_z = local.map(|m| m.position.z),
                local_yaw = local.map(|m| m.rotation_yaw),
                "Render summary"
            );
        }
    }
}


#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tracks_meshes_and_frames() {
        let mut renderer = TracingRenderer::new();
        let visual = EntityVisual {
            color: 0x0000FF,
            is_local: true,
        };
        renderer.set_entity_pose("a", Vec3::ZERO, 0.0, visual);
        renderer.set_entity_pose("a", Vec3::new(1.0, 0.0, 0.0), 0.0, visual);
        renderer.set_entity_pose("b", Vec3::ZERO, 0.0, visual);
        assert_eq!(renderer.meshes.len(), 2);

        renderer.remove_entity("b");
        renderer.remove_entity("missing");
        assert_eq!(renderer.meshes.len(), 1);

        renderer.render_frame();
        renderer.render_frame();
        assert_eq!(renderer.frames, 2);

        renderer.clear_scene();
        assert_eq!(renderer.meshes.len(), 0);
    }
}
