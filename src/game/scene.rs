//! Static scene dressing: obstacles and safe zones

use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;

use super::Vec3;

const OBSTACLE_COUNT: usize = 20;
const SAFE_ZONE_COUNT: usize = 3;
/// Obstacles are scattered within ±90 on x/z
const OBSTACLE_SPREAD: f32 = 180.0;
/// Safe zones stay a little further from the walls
const SAFE_ZONE_SPREAD: f32 = 160.0;
pub const SAFE_ZONE_RADIUS: f32 = 5.0;

/// Obstacle primitives
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ObstacleShape {
    /// 2 x 3 x 2 crate
    Crate,
    /// Radius 1, height 2
    Pillar,
    /// 4 x 1 x 1 low wall
    Wall,
}

impl ObstacleShape {
    const ALL: [ObstacleShape; 3] = [ObstacleShape::Crate, ObstacleShape::Pillar, ObstacleShape::Wall];

    pub fn height(self) -> f32 {
        match self {
            ObstacleShape::Crate => 3.0,
            ObstacleShape::Pillar => 2.0,
            ObstacleShape::Wall => 1.0,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Obstacle {
    pub shape: ObstacleShape,
    /// Centre of the primitive; it rests on the ground
    pub position: Vec3,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SafeZone {
    pub center: Vec3,
    pub radius: f32,
}

/// Layout shared by everyone in the room: the seed comes from the room id
#[derive(Debug, Clone, PartialEq)]
pub struct SceneLayout {
    pub obstacles: Vec<Obstacle>,
    pub safe_zones: Vec<SafeZone>,
}

impl SceneLayout {
    pub fn generate(room_id: &str) -> Self {
        let mut rng = ChaCha8Rng::seed_from_u64(seed_from_id(room_id));

        let obstacles = (0..OBSTACLE_COUNT)
            .map(|_| {
                let shape = ObstacleShape::ALL[rng.gen_range(0..ObstacleShape::ALL.len())];
                let x = (rng.gen::<f32>() - 0.5) * OBSTACLE_SPREAD;
                let z = (rng.gen::<f32>() - 0.5) * OBSTACLE_SPREAD;
                Obstacle {
                    shape,
                    position: Vec3::new(x, shape.height() / 2.0, z),
                }
            })
            .collect();

        let safe_zones = (0..SAFE_ZONE_COUNT)
            .map(|_| {
                let x = (rng.gen::<f32>() - 0.5) * SAFE_ZONE_SPREAD;
                let z = (rng.gen::<f32>() - 0.5) * SAFE_ZONE_SPREAD;
                SafeZone {
                    center: Vec3::new(x, 0.05, z),
                    radius: SAFE_ZONE_RADIUS,
                }
            })
            .collect();

        Self {
            obstacles,
            safe_zones,
        }
    }
}

/// FNV-1a over the id bytes; stable across builds and platforms
fn seed_from_id(id: &str) -> u64 {
    id.bytes().fold(0xcbf2_9ce4_8422_2325, |hash, byte| {
        (hash ^ byte as u64).wrapping_mul(0x0000_0100_0000_01b3)
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn same_room_same_layout() {
        assert_eq!(SceneLayout::generate("room-1"), SceneLayout::generate("room-1"));
        assert_ne!(SceneLayout::generate("room-1"), SceneLayout::generate("room-2"));
    }

    #[test]
    fn layout_stays_inside_play_area() {
        let layout = SceneLayout::generate("bounds");
        assert_eq!(layout.obstacles.len(), OBSTACLE_COUNT);
        assert_eq!(layout.safe_zones.len(), SAFE_ZONE_COUNT);

        for obstacle in &layout.obstacles {
            assert!(obstacle.position.x.abs() <= 90.0);
            assert!(obstacle.position.z.abs() <= 90.0);
            assert_eq!(obstacle.position.y, obstacle.shape.height() / 2.0);
        }
        for zone in &layout.safe_zones {
            assert!(zone.center.x.abs() <= 80.0);
            assert!(zone.center.z.abs() <= 80.0);
        }
    }
}
