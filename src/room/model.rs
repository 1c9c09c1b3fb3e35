//! Room data model

use serde::{Deserialize, Serialize};

/// Smallest room the server accepts
pub const MIN_ROOM_PLAYERS: u8 = 2;
/// Largest room the server accepts
pub const MAX_ROOM_PLAYERS: u8 = 10;
/// Longest room name accepted by the create form
pub const MAX_ROOM_NAME_CHARS: usize = 20;

/// Game modes offered when creating a room
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GameMode {
    /// One catcher hunts the runners
    Classic,
    /// Caught runners join the catchers
    Infection,
    /// Bodyguards escort a vip
    Bodyguard,
}

impl GameMode {
    pub fn parse(raw: &str) -> Option<Self> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "classic" => Some(Self::Classic),
            "infection" => Some(Self::Infection),
            "bodyguard" => Some(Self::Bodyguard),
            _ => None,
        }
    }
}

impl Default for GameMode {
    fn default() -> Self {
        Self::Classic
    }
}

/// Server-side room status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RoomStatus {
    Waiting,
    Playing,
    Finished,
}

/// A room as tracked by the lifecycle machine. Member details live in the
/// entity registry; the room only keeps the ordered roster.
#[derive(Debug, Clone, PartialEq)]
pub struct Room {
    pub id: String,
    pub name: String,
    pub host_id: String,
    pub mode: GameMode,
    pub max_players: u8,
    pub status: RoomStatus,
    pub players: Vec<String>,
}

impl Room {
    pub fn contains(&self, player_id: &str) -> bool {
        self.players.iter().any(|p| p == player_id)
    }

    pub fn is_full(&self) -> bool {
        self.players.len() >= self.max_players as usize
    }

    pub fn is_host(&self, player_id: &str) -> bool {
        self.host_id == player_id
    }

    /// Append a member unless already present or the room is full
    pub fn add_player(&mut self, player_id: &str) -> bool {
        if self.contains(player_id) || self.is_full() {
            return false;
        }
        self.players.push(player_id.to_string());
        true
    }

    pub fn remove_player(&mut self, player_id: &str) -> bool {
        let before = self.players.len();
        self.players.retain(|p| p != player_id);
        self.players.len() != before
    }
}

/// Row returned by `GET /api/rooms`
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RoomSummary {
    pub id: String,
    pub name: String,
    pub game_mode: GameMode,
    /// Current member count
    pub players: usize,
    pub max_players: u8,
    pub status: RoomStatus,
}

impl RoomSummary {
    /// Only waiting rooms with a free slot accept new members
    pub fn is_joinable(&self) -> bool {
        self.status == RoomStatus::Waiting && self.players < self.max_players as usize
    }
}

/// Validated create-room form
#[derive(Debug, Clone, PartialEq)]
pub struct CreateRoomRequest {
    pub name: String,
    pub mode: GameMode,
    pub max_players: u8,
}

/// Reasons a create-room form is rejected before it reaches the server
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RoomFormError {
    #[error("Room name is required")]
    EmptyName,

    #[error("Room name must be at most 20 characters")]
    NameTooLong,

    #[error("Max players must be between 2 and 10")]
    PlayerCount,
}

impl CreateRoomRequest {
    pub fn new(name: &str, mode: GameMode, max_players: u8) -> Result<Self, RoomFormError> {
        let name = name.trim();
        if name.is_empty() {
            return Err(RoomFormError::EmptyName);
        }
        if name.chars().count() > MAX_ROOM_NAME_CHARS {
            return Err(RoomFormError::NameTooLong);
        }
        if !(MIN_ROOM_PLAYERS..=MAX_ROOM_PLAYERS).contains(&max_players) {
            return Err(RoomFormError::PlayerCount);
        }

        Ok(Self {
            name: name.to_string(),
            mode,
            max_players,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn create_form_validation() {
        let ok = CreateRoomRequest::new("  Test ", GameMode::Classic, 4).unwrap();
        assert_eq!(ok.name, "Test");

        assert_eq!(
            CreateRoomRequest::new("   ", GameMode::Classic, 4),
            Err(RoomFormError::EmptyName)
        );
        assert_eq!(
            CreateRoomRequest::new(&"x".repeat(21), GameMode::Classic, 4),
            Err(RoomFormError::NameTooLong)
        );
        assert_eq!(
            CreateRoomRequest::new("Test", GameMode::Infection, 1),
            Err(RoomFormError::PlayerCount)
        );
        assert_eq!(
            CreateRoomRequest::new("Test", GameMode::Infection, 11),
            Err(RoomFormError::PlayerCount)
        );
    }

    #[test]
    fn roster_respects_capacity() {
        let mut room = Room {
            id: "r1".into(),
            name: "Test".into(),
            host_id: "a".into(),
            mode: GameMode::Classic,
            max_players: 2,
            status: RoomStatus::Waiting,
            players: vec!["a".into()],
        };
        assert!(room.add_player("b"));
        assert!(!room.add_player("b"));
        assert!(!room.add_player("c"));
        assert!(room.remove_player("a"));
        assert!(!room.remove_player("a"));
    }

    #[test]
    fn summary_joinability() {
        let summary: RoomSummary = serde_json::from_str(
            r#"{"id":"r","name":"n","gameMode":"bodyguard","players":3,"maxPlayers":4,"status":"waiting"}"#,
        )
        .unwrap();
        assert!(summary.is_joinable());

        let full = RoomSummary { players: 4, ..summary.clone() };
        assert!(!full.is_joinable());

        let playing = RoomSummary {
            status: RoomStatus::Playing,
            ..summary
        };
        assert!(!playing.is_joinable());
    }
}
