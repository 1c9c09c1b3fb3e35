//! Entity registry: every known player in the current room

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::ws::protocol::PlayerSnapshot;

use super::{Pose, Vec3};

/// Roles handed out by the server at game start
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    /// Hunts everyone else
    Catcher,
    Runner,
    /// Can revive caught runners
    Medic,
    /// Must be kept safe by bodyguards
    Vip,
    Bodyguard,
}

impl Role {
    /// Body colour for the role (0xRRGGBB)
    pub fn color(self) -> u32 {
        match self {
            Role::Catcher => 0xFF0000,
            Role::Runner => 0x0000FF,
            Role::Medic => 0x00FF00,
            Role::Vip => 0xFFD700,
            Role::Bodyguard => 0x800080,
        }
    }

    /// Catchers are never allowed into safe zones
    pub fn may_use_safe_zone(self) -> bool {
        self != Role::Catcher
    }
}

/// Presentation hints the render adapter needs for an entity
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EntityVisual {
    pub color: u32,
    pub is_local: bool,
}

/// A player known to this client
#[derive(Debug, Clone, PartialEq)]
pub struct PlayerEntity {
    pub id: String,
    pub username: Option<String>,
    /// Unassigned until the game starts
    pub role: Option<Role>,
    pub position: Vec3,
    pub rotation_yaw: f32,
    pub lives: u32,
    pub safe_zone_uses: u32,
    pub ready: bool,
    pub is_local: bool,
}

impl PlayerEntity {
    fn from_snapshot(snapshot: PlayerSnapshot, is_local: bool) -> Self {
        Self {
            id: snapshot.id,
            username: snapshot.username,
            role: snapshot.role,
            position: snapshot.position,
            rotation_yaw: snapshot.rotation_yaw,
            lives: snapshot.lives,
            safe_zone_uses: snapshot.safe_zone_uses,
            ready: snapshot.ready,
            is_local,
        }
    }

    fn remote(id: &str) -> Self {
        Self {
            id: id.to_string(),
            username: None,
            role: None,
            position: Vec3::ZERO,
            rotation_yaw: 0.0,
            lives: 0,
            safe_zone_uses: 0,
            ready: false,
            is_local: false,
        }
    }

    pub fn pose(&self) -> Pose {
        Pose {
            position: self.position,
            rotation_yaw: self.rotation_yaw,
        }
    }

    pub fn visual(&self) -> EntityVisual {
        EntityVisual {
            color: self.role.map(Role::color).unwrap_or(0x000000),
            is_local: self.is_local,
        }
    }

    /// Name shown in the roster
    pub fn display_name(&self) -> String {
        match &self.username {
            Some(name) => name.clone(),
            None => format!("Player{}", self.id.chars().take(8).collect::<String>()),
        }
    }
}

/// Owns the set of player entities. Ids are unique; at most one entity is local.
///
/// Remote poses are last-writer-wins in arrival order. The local pose is only
/// written through [`EntityRegistry::local_mut`] by the simulation loop.
#[derive(Debug, Default)]
pub struct EntityRegistry {
    local_id: Option<String>,
    entities: HashMap<String, PlayerEntity>,
}

impl EntityRegistry {
    pub fn new(local_id: Option<String>) -> Self {
        Self {
            local_id,
            entities: HashMap::new(),
        }
    }

    pub fn local_id(&self) -> Option<&str> {
        self.local_id.as_deref()
    }

    fn is_local_id(&self, id: &str) -> bool {
        self.local_id.as_deref() == Some(id)
    }

    /// Replace the whole member set in one step.
    ///
    /// Returns the ids that were dropped so presentation can be cleaned up.
    pub fn apply_snapshot<I>(&mut self, players: I) -> Vec<String>
    where
        I: IntoIterator<Item = PlayerSnapshot>,
    {
        let mut next = HashMap::new();
        for snapshot in players {
            let is_local = self.is_local_id(&snapshot.id);
            next.insert(
                snapshot.id.clone(),
                PlayerEntity::from_snapshot(snapshot, is_local),
            );
        }

        let previous = std::mem::replace(&mut self.entities, next);
        previous
            .into_keys()
            .filter(|id| !self.entities.contains_key(id))
            .collect()
    }

    /// Add a single member announced by a join event. Existing entries are refreshed.
    pub fn insert_member(&mut self, snapshot: PlayerSnapshot) {
        let is_local = self.is_local_id(&snapshot.id);
        self.entities.insert(
            snapshot.id.clone(),
            PlayerEntity::from_snapshot(snapshot, is_local),
        );
    }

    /// Insert or overwrite a remote entity's pose. Never touches the local entity.
    pub fn upsert_remote(&mut self, id: &str, pose: Pose) -> bool {
        if self.is_local_id(id) {
            return false;
        }

        let entity = self
            .entities
            .entry(id.to_string())
            .or_insert_with(|| PlayerEntity::remote(id));
        entity.position = pose.position;
        entity.rotation_yaw = pose.rotation_yaw;
        true
    }

    pub fn remove(&mut self, id: &str) -> Option<PlayerEntity> {
        self.entities.remove(id)
    }

    pub fn set_ready(&mut self, id: &str, ready: bool) -> bool {
        match self.entities.get_mut(id) {
            Some(entity) => {
                entity.ready = ready;
                true
            }
            None => false,
        }
    }

    /// Flip a member's ready flag, returning the new value
    pub fn toggle_ready(&mut self, id: &str) -> Option<bool> {
        let entity = self.entities.get_mut(id)?;
        entity.ready = !entity.ready;
        Some(entity.ready)
    }

    pub fn update_status(&mut self, id: &str, lives: u32, safe_zone_uses: u32) -> bool {
        match self.entities.get_mut(id) {
            Some(entity) => {
                entity.lives = lives;
                entity.safe_zone_uses = safe_zone_uses;
                true
            }
            None => false,
        }
    }

    pub fn get(&self, id: &str) -> Option<&PlayerEntity> {
        self.entities.get(id)
    }

    pub fn local(&self) -> Option<&PlayerEntity> {
        self.local_id.as_deref().and_then(|id| self.entities.get(id))
    }

    /// Mutable access to the local entity, for the simulation loop only
    pub(crate) fn local_mut(&mut self) -> Option<&mut PlayerEntity> {
        let id = self.local_id.as_deref()?;
        self.entities.get_mut(id)
    }

    pub fn iter(&self) -> impl Iterator<Item = &PlayerEntity> {
        self.entities.values()
    }

    pub fn len(&self) -> usize {
        self.entities.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entities.is_empty()
    }

    /// Drop every entity, returning the ids that were present
    pub fn clear(&mut self) -> Vec<String> {
        self.entities.drain().map(|(id, _)| id).collect()
    }
}
