//! Room lifecycle state machine
//!
//! `Idle → Waiting → Playing → Finished`, with leave/removal returning to
//! `Idle` from anywhere. The client never decides to start a game itself;
//! `Waiting → Playing` only happens in reaction to the server.

use serde::Serialize;

use crate::game::GameSession;

use super::model::{Room, RoomStatus};

/// Minimum members before the host may force a start
pub const MIN_PLAYERS_TO_START: usize = 2;

/// Externally visible phase
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum LifecyclePhase {
    Idle,
    Waiting,
    Playing,
    Finished,
}

/// How a finished game turned out for this client
#[derive(Debug, Clone, PartialEq)]
pub struct GameOutcome {
    pub result: String,
    pub winners: Vec<String>,
    pub local_won: bool,
}

#[derive(Debug)]
enum State {
    Idle,
    Waiting(Room),
    Playing(GameSession),
    Finished { room: Room, outcome: GameOutcome },
}

#[derive(Debug)]
pub struct RoomLifecycle {
    state: State,
}

impl RoomLifecycle {
    pub fn new() -> Self {
        Self { state: State::Idle }
    }

    pub fn phase(&self) -> LifecyclePhase {
        match self.state {
            State::Idle => LifecyclePhase::Idle,
            State::Waiting(_) => LifecyclePhase::Waiting,
            State::Playing(_) => LifecyclePhase::Playing,
            State::Finished { .. } => LifecyclePhase::Finished,
        }
    }

    pub fn room(&self) -> Option<&Room> {
        match &self.state {
            State::Idle => None,
            State::Waiting(room) => Some(room),
            State::Playing(session) => Some(&session.room),
            State::Finished { room, .. } => Some(room),
        }
    }

    fn room_mut(&mut self) -> Option<&mut Room> {
        match &mut self.state {
            State::Idle => None,
            State::Waiting(room) => Some(room),
            State::Playing(session) => Some(&mut session.room),
            State::Finished { room, .. } => Some(room),
        }
    }

    pub fn session(&self) -> Option<&GameSession> {
        match &self.state {
            State::Playing(session) => Some(session),
            _ => None,
        }
    }

    pub fn session_mut(&mut self) -> Option<&mut GameSession> {
        match &mut self.state {
            State::Playing(session) => Some(session),
            _ => None,
        }
    }

    pub fn outcome(&self) -> Option<&GameOutcome> {
        match &self.state {
            State::Finished { outcome, .. } => Some(outcome),
            _ => None,
        }
    }

    /// `Idle → Waiting` after a successful create/join ack
    pub fn enter(&mut self, mut room: Room) -> bool {
        if !matches!(self.state, State::Idle) {
            return false;
        }
        room.status = RoomStatus::Waiting;
        self.state = State::Waiting(room);
        true
    }

    /// Replace roster details from a room snapshot for the same room.
    /// Status never changes here.
    pub fn refresh(&mut self, room: Room) -> bool {
        let Some(current) = self.room_mut() else {
            return false;
        };
        if current.id != room.id {
            return false;
        }
        let status = current.status;
        *current = Room { status, ..room };
        true
    }

    pub fn member_joined(&mut self, player_id: &str) -> bool {
        match &mut self.state {
            State::Waiting(room) => room.add_player(player_id),
            State::Playing(session) => session.room.add_player(player_id),
            _ => false,
        }
    }

    pub fn member_left(&mut self, player_id: &str) -> bool {
        match self.room_mut() {
            Some(room) => room.remove_player(player_id),
            None => false,
        }
    }

    /// Ready toggles are only meaningful for members of a waiting room
    pub fn can_ready(&self, player_id: &str) -> bool {
        matches!(&self.state, State::Waiting(room) if room.contains(player_id))
    }

    /// Host-only, with at least two members, and only before the game starts
    pub fn can_force_start(&self, caller_id: &str) -> bool {
        matches!(
            &self.state,
            State::Waiting(room)
                if room.is_host(caller_id) && room.players.len() >= MIN_PLAYERS_TO_START
        )
    }

    /// `Waiting → Playing` on the server's start event
    pub fn start(&mut self, time_left: u32) -> bool {
        let State::Waiting(_) = &self.state else {
            return false;
        };
        let State::Waiting(mut room) = std::mem::replace(&mut self.state, State::Idle) else {
            return false;
        };
        room.status = RoomStatus::Playing;
        self.state = State::Playing(GameSession::new(room, time_left));
        true
    }

    /// `Playing → Finished`; the session is dropped here
    pub fn finish(&mut self, outcome: GameOutcome) -> bool {
        let State::Playing(_) = &self.state else {
            return false;
        };
        let State::Playing(session) = std::mem::replace(&mut self.state, State::Idle) else {
            return false;
        };
        let mut room = session.room;
        room.status = RoomStatus::Finished;
        self.state = State::Finished { room, outcome };
        true
    }

    /// Back to `Idle` from anywhere. Returns false if already idle.
    pub fn leave(&mut self) -> bool {
        !matches!(std::mem::replace(&mut self.state, State::Idle), State::Idle)
    }
}

impl Default for RoomLifecycle {
    fn default() -> Self {
        Self::new()
    }
}
