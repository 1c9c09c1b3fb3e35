//! WebSocket protocol message definitions
//! These are the wire types exchanged with the game server

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::game::{Role, Vec3};
use crate::input::Action;
use crate::room::{GameMode, Room, RoomStatus};

/// Messages sent from client to server
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ClientMsg {
    /// Create a room and join it as host
    CreateRoom {
        /// Correlates the server's ack
        request_id: Uuid,
        name: String,
        game_mode: GameMode,
        max_players: u8,
    },

    /// Join an existing room
    JoinRoom { request_id: Uuid, room_id: String },

    /// Flip the sender's ready flag
    SetReady { room_id: String },

    /// Host-only start with at least two members
    ForceStartGame { room_id: String },

    LeaveRoom { room_id: String },

    /// Local pose after a tick that moved or turned
    PlayerMove { position: Vec3, rotation_yaw: f32 },

    /// Discrete in-game action
    PlayerAction { action: Action },

    ChatMessage { room_id: String, message: String },
}

/// Messages sent from server to client
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ServerMsg {
    /// Reply to a create/join request
    Ack {
        request_id: Uuid,
        success: bool,
        #[serde(default)]
        room: Option<RoomSnapshot>,
        #[serde(default)]
        error: Option<String>,
    },

    /// Full room state
    RoomSnapshot { room: RoomSnapshot },

    MemberJoined { player: PlayerSnapshot },

    MemberLeft { player_id: String },

    ReadyChanged { player_id: String, ready: bool },

    /// Game has started; carries roles and spawn poses
    GameStarted { state: GameStartState },

    /// Remote player moved
    PoseUpdate {
        player_id: String,
        position: Vec3,
        rotation_yaw: f32,
    },

    GameEnded {
        result: String,
        #[serde(default)]
        winners: Vec<String>,
    },

    /// Round clock, in seconds
    TimeUpdate { time_left: u32 },

    PlayerStatus {
        player_id: String,
        lives: u32,
        safe_zone_uses: u32,
    },

    ChatMessage { username: String, message: String },

    /// Removed from the room by the server
    Kicked { reason: String },

    /// Error message
    Error { code: String, message: String },
}

/// Player state as sent by the server
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlayerSnapshot {
    pub id: String,
    #[serde(default)]
    pub username: Option<String>,
    #[serde(default)]
    pub role: Option<Role>,
    #[serde(default)]
    pub position: Vec3,
    #[serde(default)]
    pub rotation_yaw: f32,
    #[serde(default)]
    pub lives: u32,
    #[serde(default)]
    pub safe_zone_uses: u32,
    #[serde(default)]
    pub ready: bool,
}

/// Room state as sent by the server
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RoomSnapshot {
    pub id: String,
    pub name: String,
    pub host_id: String,
    #[serde(default)]
    pub mode: GameMode,
    pub max_players: u8,
    pub status: RoomStatus,
    #[serde(default)]
    pub players: Vec<PlayerSnapshot>,
}

impl RoomSnapshot {
    /// Split into the lifecycle's room and the registry's member details
    pub fn into_parts(self) -> (Room, Vec<PlayerSnapshot>) {
        let room = Room {
            id: self.id,
            name: self.name,
            host_id: self.host_id,
            mode: self.mode,
            max_players: self.max_players,
            status: self.status,
            players: self.players.iter().map(|p| p.id.clone()).collect(),
        };
        (room, self.players)
    }
}

/// Initial state delivered with `game_started`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GameStartState {
    pub time_left: u32,
    #[serde(default)]
    pub players: Vec<PlayerSnapshot>,
}
