//! Game client: owns every piece of session state and drives one tick at a time

use std::collections::VecDeque;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::input::{Action, InputAggregator, InputEvent, JoystickState, Stick};
use crate::render::RenderAdapter;
use crate::room::{
    CreateRoomRequest, GameMode, GameOutcome, LifecyclePhase, RoomFormError, RoomLifecycle,
};
use crate::util::rate_limit::ChatRateLimiter;
use crate::ws::{NetworkGateway, PendingAck, RoomAck, ServerMsg};

use super::camera::CameraPose;
use super::entity::{EntityRegistry, Role};
use super::physics::PhysicsSystem;
use super::session::CameraMode;
use super::{Pose, Vec3};

/// Coins credited when the local player is among the winners
pub const REWARD_COINS: u64 = 10;

/// Chat lines kept for the current room
pub const CHAT_LOG_CAPACITY: usize = 50;

/// Chat lines included in the published status
const STATUS_CHAT_LINES: usize = 5;

/// Item owned by the local player
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EquipmentItem {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub effect: String,
}

/// The signed-in user, as returned by the profile endpoint
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LocalProfile {
    pub id: String,
    pub username: String,
    #[serde(default)]
    pub coins: u64,
    #[serde(default)]
    pub equipment: Vec<EquipmentItem>,
}

/// Which screen the UI shows. The loop only ticks on [`Screen::Game`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Screen {
    Lobby,
    Room,
    Game,
}

/// Result of one [`GameClient::tick`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TickOutcome {
    /// No session or not on the game screen; the loop should stop scheduling
    Halted,
    /// Session is live but the local entity is unknown; nothing was integrated
    NoLocalEntity,
    /// Frame rendered; `synced` is true when a pose update went out
    Advanced { synced: bool },
}

/// Reasons a room request is refused locally
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RoomRequestError {
    #[error(transparent)]
    Form(#[from] RoomFormError),

    #[error("Already in a room")]
    AlreadyInRoom,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChatLine {
    pub username: String,
    pub message: String,
}

/// One roster row
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MemberStatus {
    pub id: String,
    pub name: String,
    pub role: Option<Role>,
    pub ready: bool,
    pub lives: u32,
    pub safe_zone_uses: u32,
    pub is_local: bool,
}

/// Read-only view published to diagnostics
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SessionStatus {
    pub phase: LifecyclePhase,
    pub screen: Screen,
    pub room_id: Option<String>,
    pub room_name: Option<String>,
    pub game_mode: Option<GameMode>,
    pub player_count: usize,
    pub camera_mode: Option<CameraMode>,
    /// Round clock as `m:ss`
    pub time_left: Option<String>,
    pub started_at: Option<DateTime<Utc>>,
    pub local_position: Option<Vec3>,
    pub members: Vec<MemberStatus>,
    pub left_stick: JoystickState,
    pub right_stick: JoystickState,
    /// Result of the last finished game in this room
    pub last_result: Option<String>,
    pub won: Option<bool>,
    pub recent_chat: Vec<ChatLine>,
    pub coins: u64,
    pub online: bool,
    pub ticks: u64,
}

/// Owns input, entities, lifecycle and both collaborators.
///
/// Everything runs on one logical thread: input events, inbound server
/// events and ticks are applied one at a time by the caller.
pub struct GameClient {
    profile: LocalProfile,
    input: InputAggregator,
    registry: EntityRegistry,
    lifecycle: RoomLifecycle,
    gateway: Arc<dyn NetworkGateway>,
    renderer: Box<dyn RenderAdapter>,
    screen: Screen,
    move_speed: f32,
    chat_log: VecDeque<ChatLine>,
    chat_limiter: ChatRateLimiter,
    online: bool,
    ticks: u64,
}

impl GameClient {
    pub fn new(
        profile: LocalProfile,
        gateway: Arc<dyn NetworkGateway>,
        renderer: Box<dyn RenderAdapter>,
        move_speed: f32,
        joystick_max_radius: f32,
    ) -> Self {
        let registry = EntityRegistry::new(Some(profile.id.clone()));
        Self {
            profile,
            input: InputAggregator::new(joystick_max_radius),
            registry,
            lifecycle: RoomLifecycle::new(),
            gateway,
            renderer,
            screen: Screen::Lobby,
            move_speed,
            chat_log: VecDeque::with_capacity(CHAT_LOG_CAPACITY),
            chat_limiter: ChatRateLimiter::new(),
            online: true,
            ticks: 0,
        }
    }

    pub fn profile(&self) -> &LocalProfile {
        &self.profile
    }

    pub fn lifecycle(&self) -> &RoomLifecycle {
        &self.lifecycle
    }

    pub fn registry(&self) -> &EntityRegistry {
        &self.registry
    }

    pub fn screen(&self) -> Screen {
        self.screen
    }

    pub fn chat_log(&self) -> impl Iterator<Item = &ChatLine> {
        self.chat_log.iter()
    }

    pub fn handle_input(&mut self, event: InputEvent) {
        self.input.handle(event);
    }

    /// Switch screens. Leaving the game screen stops the loop on its next check.
    pub fn set_screen(&mut self, screen: Screen) {
        if self.screen != screen {
            debug!(from = ?self.screen, to = ?screen, "Screen changed");
            self.screen = screen;
        }
    }

    /// True while the loop should keep scheduling ticks
    pub fn is_running(&self) -> bool {
        self.screen == Screen::Game && self.lifecycle.session().is_some()
    }

    // ---- Room requests ----

    /// Validate and send a create request. The returned ack must be fed to
    /// [`GameClient::apply_room_ack`].
    pub fn create_room(
        &mut self,
        name: &str,
        mode: GameMode,
        max_players: u8,
    ) -> Result<PendingAck, RoomRequestError> {
        if self.lifecycle.phase() != LifecyclePhase::Idle {
            return Err(RoomRequestError::AlreadyInRoom);
        }
        let request = CreateRoomRequest::new(name, mode, max_players)?;
        info!(name = %request.name, mode = ?request.mode, max_players, "Creating room");
        Ok(self.gateway.create_room(&request))
    }

    pub fn join_room(&mut self, room_id: &str) -> Result<PendingAck, RoomRequestError> {
        if self.lifecycle.phase() != LifecyclePhase::Idle {
            return Err(RoomRequestError::AlreadyInRoom);
        }
        info!(room_id = %room_id, "Joining room");
        Ok(self.gateway.join_room(room_id))
    }

    /// `Idle → Waiting` on success; a failed ack leaves the lifecycle idle.
    pub fn apply_room_ack(&mut self, ack: RoomAck) -> bool {
        if !ack.success {
            warn!(
                request_id = %ack.request_id,
                error = ack.error.as_deref().unwrap_or("unknown"),
                "Room request rejected"
            );
            return false;
        }
        let Some(snapshot) = ack.room else {
            warn!(request_id = %ack.request_id, "Successful ack without room");
            return false;
        };

        let (room, players) = snapshot.into_parts();
        let room_id = room.id.clone();
        if !self.lifecycle.enter(room) {
            debug!(room_id = %room_id, "Ack ignored, already in a room");
            return false;
        }

        self.registry.apply_snapshot(players);
        self.chat_log.clear();
        self.set_screen(Screen::Room);
        info!(room_id = %room_id, members = self.registry.len(), "Entered room");
        true
    }

    /// Flip a member's ready flag. No-op unless the id belongs to the waiting room.
    pub fn set_ready(&mut self, player_id: &str) {
        if !self.lifecycle.can_ready(player_id) {
            return;
        }
        let Some(ready) = self.registry.toggle_ready(player_id) else {
            return;
        };
        debug!(player_id = %player_id, ready, "Ready toggled");

        if self.registry.local_id() == Some(player_id) {
            if let Some(room) = self.lifecycle.room() {
                self.gateway.set_ready(&room.id);
            }
        }
    }

    pub fn toggle_ready(&mut self) {
        let id = self.profile.id.clone();
        self.set_ready(&id);
    }

    /// Ask the server to start. Silently ignored unless the local player
    /// hosts a waiting room with at least two members.
    pub fn force_start(&mut self) {
        if !self.lifecycle.can_force_start(&self.profile.id) {
            debug!("Force start ignored");
            return;
        }
        if let Some(room) = self.lifecycle.room() {
            info!(room_id = %room.id, "Requesting force start");
            self.gateway.force_start(&room.id);
        }
    }

    /// Leave the current room from any phase
    pub fn leave_room(&mut self) {
        let Some(room) = self.lifecycle.room() else {
            return;
        };
        let room_id = room.id.clone();
        self.gateway.leave_room(&room_id);
        info!(room_id = %room_id, "Left room");
        self.teardown();
    }

    /// Send a chat line. Empty or rate-limited messages are dropped.
    pub fn send_chat(&mut self, text: &str) -> bool {
        let message = text.trim();
        if message.is_empty() {
            return false;
        }
        let Some(room) = self.lifecycle.room() else {
            return false;
        };
        if !self.chat_limiter.check() {
            warn!("Chat rate limited");
            return false;
        }
        self.gateway.send_chat(&room.id, message);
        true
    }

    // ---- Inbound ----

    pub fn handle_server_event(&mut self, msg: ServerMsg) {
        match msg {
            ServerMsg::RoomSnapshot { room } => {
                let (room, players) = room.into_parts();
                if self.lifecycle.refresh(room) {
                    for id in self.registry.apply_snapshot(players) {
                        self.renderer.remove_entity(&id);
                    }
                    self.show_all_entities();
                }
            }

            ServerMsg::MemberJoined { player } => {
                if self.lifecycle.member_joined(&player.id) {
                    debug!(player_id = %player.id, "Member joined");
                    let player_id = player.id.clone();
                    self.registry.insert_member(player);
                    self.show_entity(&player_id);
                }
            }

            ServerMsg::MemberLeft { player_id } => {
                if self.registry.local_id() == Some(player_id.as_str()) {
                    info!("Removed from room");
                    self.teardown();
                } else if self.lifecycle.member_left(&player_id) {
                    debug!(player_id = %player_id, "Member left");
                    self.registry.remove(&player_id);
                    self.renderer.remove_entity(&player_id);
                }
            }

            ServerMsg::ReadyChanged { player_id, ready } => {
                if self.lifecycle.phase() == LifecyclePhase::Waiting {
                    self.registry.set_ready(&player_id, ready);
                }
            }

            ServerMsg::GameStarted { state } => {
                if !self.lifecycle.start(state.time_left) {
                    debug!("Start event ignored outside a waiting room");
                    return;
                }
                if !state.players.is_empty() {
                    for id in self.registry.apply_snapshot(state.players) {
                        self.renderer.remove_entity(&id);
                    }
                }
                // Keys held through the countdown keep moving the player
                self.input.discard_actions();
                if let Some(session) = self.lifecycle.session() {
                    self.renderer.dress_scene(&session.scene);
                    info!(
                        room_id = %session.room.id,
                        time_left = session.time_left,
                        role = ?self.registry.local().and_then(|p| p.role),
                        "Game started"
                    );
                }
                self.show_all_entities();
                self.set_screen(Screen::Game);
            }

            ServerMsg::PoseUpdate {
                player_id,
                position,
                rotation_yaw,
            } => {
                if self.lifecycle.room().is_none() {
                    return;
                }
                let pose = Pose {
                    position,
                    rotation_yaw,
                };
                if self.registry.upsert_remote(&player_id, pose) {
                    self.show_entity(&player_id);
                }
            }

            ServerMsg::GameEnded { result, winners } => self.finish_game(result, winners),

            ServerMsg::TimeUpdate { time_left } => {
                if let Some(session) = self.lifecycle.session_mut() {
                    session.time_left = time_left;
                }
            }

            ServerMsg::PlayerStatus {
                player_id,
                lives,
                safe_zone_uses,
            } => {
                self.registry.update_status(&player_id, lives, safe_zone_uses);
            }

            ServerMsg::ChatMessage { username, message } => {
                if self.lifecycle.room().is_none() {
                    return;
                }
                if self.chat_log.len() == CHAT_LOG_CAPACITY {
                    self.chat_log.pop_front();
                }
                self.chat_log.push_back(ChatLine { username, message });
            }

            ServerMsg::Kicked { reason } => {
                warn!(reason = %reason, "Kicked from room");
                self.teardown();
            }

            ServerMsg::Error { code, message } => {
                warn!(code = %code, message = %message, "Server error");
            }

            ServerMsg::Ack { request_id, .. } => {
                debug!(%request_id, "Unrouted ack");
            }
        }
    }

    /// Transport dropped. Local movement keeps running without rollback.
    pub fn handle_disconnect(&mut self) {
        if self.online {
            warn!("Game server connection lost");
        }
        self.online = false;
    }

    fn finish_game(&mut self, result: String, winners: Vec<String>) {
        if self.lifecycle.phase() != LifecyclePhase::Playing {
            debug!(result = %result, "End event ignored outside a game");
            return;
        }

        let local_won = winners.iter().any(|w| *w == self.profile.id);
        let outcome = GameOutcome {
            result,
            winners,
            local_won,
        };
        if !self.lifecycle.finish(outcome.clone()) {
            return;
        }

        if local_won {
            self.profile.coins += REWARD_COINS;
        }
        info!(
            result = %outcome.result,
            won = local_won,
            coins = self.profile.coins,
            "Game ended"
        );

        self.registry.clear();
        self.renderer.clear_scene();
        self.input.clear();
        self.set_screen(Screen::Room);
    }

    /// Push one entity's pose to the renderer while a game is live
    fn show_entity(&mut self, id: &str) {
        if self.lifecycle.session().is_none() {
            return;
        }
        if let Some(entity) = self.registry.get(id) {
            let pose = entity.pose();
            self.renderer
                .set_entity_pose(id, pose.position, pose.rotation_yaw, entity.visual());
        }
    }

    fn show_all_entities(&mut self) {
        if self.lifecycle.session().is_none() {
            return;
        }
        for entity in self.registry.iter() {
            let pose = entity.pose();
            self.renderer
                .set_entity_pose(&entity.id, pose.position, pose.rotation_yaw, entity.visual());
        }
    }

    fn teardown(&mut self) {
        self.lifecycle.leave();
        self.registry.clear();
        self.renderer.clear_scene();
        self.input.clear();
        self.chat_log.clear();
        self.set_screen(Screen::Lobby);
    }

    // ---- Simulation ----

    /// Run one tick. Every entry re-checks that the session is still live.
    pub fn tick(&mut self) -> TickOutcome {
        if self.screen != Screen::Game {
            return TickOutcome::Halted;
        }
        let Self {
            profile,
            input,
            registry,
            lifecycle,
            gateway,
            renderer,
            move_speed,
            ticks,
            ..
        } = self;
        let Some(session) = lifecycle.session_mut() else {
            return TickOutcome::Halted;
        };

        let intent = input.sample_intent();
        *ticks += 1;

        for action in intent.actions.iter() {
            match action {
                Action::ToggleView => {
                    session.camera_mode = session.camera_mode.toggled();
                    debug!(mode = ?session.camera_mode, "Camera toggled");
                }
                Action::EnterSafeZone => {
                    let allowed = registry.local().is_some_and(|p| {
                        p.role.map_or(true, Role::may_use_safe_zone) && p.safe_zone_uses > 0
                    });
                    if allowed {
                        gateway.send_action(action);
                    }
                }
                Action::UseEquipment => {
                    if !profile.equipment.is_empty() {
                        gateway.send_action(action);
                    }
                }
            }
        }

        let Some(local) = registry.local_mut() else {
            renderer.render_frame();
            return TickOutcome::NoLocalEntity;
        };

        let moved = intent.has_movement();
        if moved {
            local.position = PhysicsSystem::integrate_position(
                local.position,
                local.rotation_yaw,
                intent.move_x,
                intent.move_z,
                *move_speed,
            );
        }

        let turned = intent.has_look();
        if turned {
            let (yaw, pitch) = PhysicsSystem::integrate_look(
                local.rotation_yaw,
                session.look_pitch,
                intent.look_yaw_delta,
                intent.look_pitch_delta,
            );
            local.rotation_yaw = yaw;
            session.look_pitch = pitch;
        }

        let synced = moved || turned;
        if synced {
            gateway.send_pose(local.position, local.rotation_yaw);
        }

        let camera = CameraPose::derive(
            session.camera_mode,
            local.position,
            local.rotation_yaw,
            session.look_pitch,
        );
        renderer.configure_camera(session.camera_mode, &camera);
        renderer.set_entity_pose(&local.id, local.position, local.rotation_yaw, local.visual());
        renderer.render_frame();

        TickOutcome::Advanced { synced }
    }

    pub fn status(&self) -> SessionStatus {
        let room = self.lifecycle.room();
        let session = self.lifecycle.session();
        let outcome = self.lifecycle.outcome();

        let mut members: Vec<MemberStatus> = self
            .registry()
            .iter()
            .map(|p| MemberStatus {
                id: p.id.clone(),
                name: p.display_name(),
                role: p.role,
                ready: p.ready,
                lives: p.lives,
                safe_zone_uses: p.safe_zone_uses,
                is_local: p.is_local,
            })
            .collect();
        members.sort_by(|a, b| a.id.cmp(&b.id));

        let chat_skip = self.chat_log.len().saturating_sub(STATUS_CHAT_LINES);

        SessionStatus {
            phase: self.lifecycle.phase(),
            screen: self.screen(),
            room_id: room.map(|r| r.id.clone()),
            room_name: room.map(|r| r.name.clone()),
            game_mode: room.map(|r| r.mode),
            player_count: room.map_or(0, |r| r.players.len()),
            camera_mode: session.map(|s| s.camera_mode),
            time_left: session.map(|s| s.timer_label()),
            started_at: session.map(|s| s.started_at),
            local_position: self.registry.local().map(|p| p.position),
            members,
            left_stick: self.input.joystick(Stick::Left),
            right_stick: self.input.joystick(Stick::Right),
            last_result: outcome.map(|o| o.result.clone()),
            won: outcome.map(|o| o.local_won),
            recent_chat: self.chat_log().skip(chat_skip).cloned().collect(),
            coins: self.profile().coins,
            online: self.online,
            ticks: self.ticks,
        }
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::render::headless::recording::{RecordingRenderer, RenderCall};
    use crate::room::RoomStatus;
    use crate::ws::protocol::{GameStartState, PlayerSnapshot, RoomSnapshot};
    use parking_lot::Mutex;
    use tokio::sync::oneshot;
    use uuid::Uuid;

    /// Outbound calls observed by the recording gateway
    #[derive(Debug, Clone, PartialEq)]
    pub(crate) enum Sent {
        Pose(Vec3, f32),
        Action(Action),
        Create(String),
        Join(String),
        Ready(String),
        ForceStart(String),
        Leave(String),
        Chat(String),
    }

    /// Records sends; room requests get a never-answered ack
    #[derive(Default)]
    pub(crate) struct RecordingGateway {
        pub(crate) sent: Mutex<Vec<Sent>>,
        waiters: Mutex<Vec<oneshot::Sender<RoomAck>>>,
    }

    impl RecordingGateway {
        pub(crate) fn take(&self) -> Vec<Sent> {
            std::mem::take(&mut *self.sent.lock())
        }

        /// Answer the oldest outstanding room request
        pub(crate) fn resolve_next(&self, ack: RoomAck) -> bool {
            let mut waiters = self.waiters.lock();
            if waiters.is_empty() {
                return false;
            }
            waiters.remove(0).send(ack).is_ok()
        }

        fn pending(&self) -> PendingAck {
            let (tx, rx) = oneshot::channel();
            self.waiters.lock().push(tx);
            PendingAck::new(Uuid::new_v4(), rx)
        }
    }

    impl NetworkGateway for RecordingGateway {
        fn send_pose(&self, position: Vec3, rotation_yaw: f32) {
            self.sent.lock().push(Sent::Pose(position, rotation_yaw));
        }

        fn send_action(&self, action: Action) {
            self.sent.lock().push(Sent::Action(action));
        }

        fn create_room(&self, request: &CreateRoomRequest) -> PendingAck {
            self.sent.lock().push(Sent::Create(request.name.clone()));
            self.pending()
        }

        fn join_room(&self, room_id: &str) -> PendingAck {
            self.sent.lock().push(Sent::Join(room_id.to_string()));
            self.pending()
        }

        fn set_ready(&self, room_id: &str) {
            self.sent.lock().push(Sent::Ready(room_id.to_string()));
        }

        fn force_start(&self, room_id: &str) {
            self.sent.lock().push(Sent::ForceStart(room_id.to_string()));
        }

        fn leave_room(&self, room_id: &str) {
            self.sent.lock().push(Sent::Leave(room_id.to_string()));
        }

        fn send_chat(&self, _room_id: &str, message: &str) {
            self.sent.lock().push(Sent::Chat(message.to_string()));
        }
    }

    pub(crate) const LOCAL_ID: &str = "local-player";

    pub(crate) fn profile() -> LocalProfile {
        LocalProfile {
            id: LOCAL_ID.into(),
            username: "me".into(),
            coins: 100,
            equipment: vec![],
        }
    }

    pub(crate) fn player(id: &str) -> PlayerSnapshot {
        PlayerSnapshot {
            id: id.into(),
            username: None,
            role: None,
            position: Vec3::ZERO,
            rotation_yaw: 0.0,
            lives: 3,
            safe_zone_uses: 0,
            ready: false,
        }
    }

    pub(crate) fn room_snapshot(host: &str, members: &[&str]) -> RoomSnapshot {
        RoomSnapshot {
            id: "room-1".into(),
            name: "Test".into(),
            host_id: host.into(),
            mode: GameMode::Classic,
            max_players: 4,
            status: RoomStatus::Waiting,
            players: members.iter().map(|id| player(id)).collect(),
        }
    }

    pub(crate) fn ok_ack(room: RoomSnapshot) -> RoomAck {
        RoomAck {
            request_id: Uuid::new_v4(),
            success: true,
            room: Some(room),
            error: None,
        }
    }

    pub(crate) fn client() -> (GameClient, Arc<RecordingGateway>, RecordingRenderer) {
        let gateway = Arc::new(RecordingGateway::default());
        let renderer = RecordingRenderer::default();
        let client = GameClient::new(
            profile(),
            gateway.clone(),
            Box::new(renderer.clone()),
            0.5,
            40.0,
        );
        (client, gateway, renderer)
    }

    /// Client inside a two-member room hosted by the local player
    fn waiting_client() -> (GameClient, Arc<RecordingGateway>, RecordingRenderer) {
        let (mut client, gateway, renderer) = client();
        assert!(client.apply_room_ack(ok_ack(room_snapshot(LOCAL_ID, &[LOCAL_ID, "remote"]))));
        (client, gateway, renderer)
    }

    fn start(client: &mut GameClient, players: Vec<PlayerSnapshot>) {
        client.handle_server_event(ServerMsg::GameStarted {
            state: GameStartState {
                time_left: 300,
                players,
            },
        });
    }

    fn playing_client() -> (GameClient, Arc<RecordingGateway>, RecordingRenderer) {
        let (mut client, gateway, renderer) = waiting_client();
        start(&mut client, vec![]);
        gateway.take();
        renderer.take();
        (client, gateway, renderer)
    }

    #[test]
    fn rejected_create_ack_stays_idle() {
        let (mut client, gateway, _) = client();
        client.create_room("Test", GameMode::Classic, 4).unwrap();
        assert_eq!(gateway.take(), vec![Sent::Create("Test".into())]);

        let applied = client.apply_room_ack(RoomAck::failed(Uuid::new_v4(), "room full"));
        assert!(!applied);
        assert_eq!(client.lifecycle().phase(), LifecyclePhase::Idle);
        assert_eq!(client.screen(), Screen::Lobby);
    }

    #[test]
    fn invalid_create_form_never_reaches_gateway() {
        let (mut client, gateway, _) = client();
        let err = client.create_room("   ", GameMode::Classic, 4).unwrap_err();
        assert_eq!(err, RoomRequestError::Form(RoomFormError::EmptyName));
        let err = client.create_room("Test", GameMode::Classic, 11).unwrap_err();
        assert_eq!(err, RoomRequestError::Form(RoomFormError::PlayerCount));
        assert!(gateway.take().is_empty());
        assert_eq!(client.lifecycle().phase(), LifecyclePhase::Idle);
    }

    #[test]
    fn successful_ack_populates_room_and_registry() {
        let (client, _, _) = waiting_client();
        assert_eq!(client.lifecycle().phase(), LifecyclePhase::Waiting);
        assert_eq!(client.screen(), Screen::Room);
        assert_eq!(client.registry().len(), 2);
        assert!(client.registry().local().unwrap().is_local);
    }

    #[test]
    fn second_room_request_refused_while_in_room() {
        let (mut client, gateway, _) = waiting_client();
        assert_eq!(
            client.join_room("room-2").unwrap_err(),
            RoomRequestError::AlreadyInRoom
        );
        assert!(gateway.take().is_empty());
    }

    #[test]
    fn ready_toggle_flips_and_sends_for_local() {
        let (mut client, gateway, _) = waiting_client();
        client.toggle_ready();
        assert!(client.registry().local().unwrap().ready);
        client.toggle_ready();
        assert!(!client.registry().local().unwrap().ready);
        assert_eq!(
            gateway.take(),
            vec![Sent::Ready("room-1".into()), Sent::Ready("room-1".into())]
        );

        // Unknown ids are ignored
        client.set_ready("stranger");
        assert!(gateway.take().is_empty());
    }

    #[test]
    fn force_start_with_one_member_is_noop() {
        let (mut client, gateway, _) = client();
        client.apply_room_ack(ok_ack(room_snapshot(LOCAL_ID, &[LOCAL_ID])));
        client.force_start();
        assert!(gateway.take().is_empty());
        assert_eq!(client.lifecycle().room().unwrap().status, RoomStatus::Waiting);
    }

    #[test]
    fn force_start_by_non_host_is_noop() {
        let (mut client, gateway, _) = client();
        client.apply_room_ack(ok_ack(room_snapshot("remote", &["remote", LOCAL_ID])));
        client.force_start();
        assert!(gateway.take().is_empty());
    }

    #[test]
    fn force_start_only_requests_and_waits_for_server() {
        let (mut client, gateway, _) = waiting_client();
        client.force_start();
        assert_eq!(gateway.take(), vec![Sent::ForceStart("room-1".into())]);
        assert_eq!(client.lifecycle().phase(), LifecyclePhase::Waiting);

        start(&mut client, vec![]);
        assert_eq!(client.lifecycle().phase(), LifecyclePhase::Playing);
        assert_eq!(client.screen(), Screen::Game);
        assert!(client.is_running());
    }

    #[test]
    fn game_start_dresses_scene_and_assigns_roles() {
        let (mut client, _, renderer) = waiting_client();
        let mut me = player(LOCAL_ID);
        me.role = Some(Role::Runner);
        let mut other = player("remote");
        other.role = Some(Role::Catcher);
        start(&mut client, vec![me, other]);

        let calls = renderer.take();
        assert!(calls.contains(&RenderCall::Dress(23)));
        assert_eq!(client.registry().local().unwrap().role, Some(Role::Runner));
        assert_eq!(client.registry().get("remote").unwrap().visual().color, 0xFF0000);
    }

    #[test]
    fn corner_move_clamps_to_boundary() {
        let (mut client, gateway, _) = playing_client();
        client.move_speed = 5.0;
        client.registry.local_mut().unwrap().position = Vec3::new(89.0, 0.0, 89.0);

        // D + S: strafe right, step towards the camera
        client.handle_input(InputEvent::KeyDown("KeyD".into()));
        client.handle_input(InputEvent::KeyDown("KeyS".into()));
        assert_eq!(client.tick(), TickOutcome::Advanced { synced: true });

        let local = client.registry().local().unwrap();
        assert_eq!(local.position, Vec3::new(90.0, 0.0, 90.0));
        assert_eq!(gateway.take(), vec![Sent::Pose(Vec3::new(90.0, 0.0, 90.0), 0.0)]);
    }

    #[test]
    fn idle_tick_renders_without_sending() {
        let (mut client, gateway, renderer) = playing_client();
        assert_eq!(client.tick(), TickOutcome::Advanced { synced: false });
        assert!(gateway.take().is_empty());

        let calls = renderer.take();
        assert!(matches!(calls.first(), Some(RenderCall::Camera(CameraMode::ThirdPerson, _))));
        assert_eq!(calls.last(), Some(&RenderCall::Frame));
    }

    #[test]
    fn look_only_tick_sends_pose() {
        let (mut client, gateway, _) = playing_client();
        client.handle_input(InputEvent::StickPress {
            stick: crate::input::Stick::Right,
            pointer_id: 7,
            dx: 40.0,
            dy: 0.0,
        });
        assert_eq!(client.tick(), TickOutcome::Advanced { synced: true });
        let sent = gateway.take();
        assert_eq!(sent.len(), 1);
        let Sent::Pose(position, yaw) = &sent[0] else {
            panic!("expected pose");
        };
        assert_eq!(*position, Vec3::ZERO);
        assert!((yaw - 0.02).abs() < 1e-6);
    }

    #[test]
    fn toggle_view_switches_camera_locally() {
        let (mut client, gateway, renderer) = playing_client();
        client.handle_input(InputEvent::KeyDown("KeyV".into()));
        client.tick();
        assert_eq!(
            client.status().camera_mode,
            Some(CameraMode::FirstPerson)
        );
        assert!(gateway.take().is_empty());
        assert!(matches!(
            renderer.take().first(),
            Some(RenderCall::Camera(CameraMode::FirstPerson, _))
        ));

        // Held key does not toggle again
        client.tick();
        assert_eq!(client.status().camera_mode, Some(CameraMode::FirstPerson));
    }

    #[test]
    fn safe_zone_action_is_gated_by_role_and_uses() {
        let (mut client, gateway, _) = waiting_client();
        let mut me = player(LOCAL_ID);
        me.role = Some(Role::Catcher);
        me.safe_zone_uses = 3;
        start(&mut client, vec![me, player("remote")]);
        gateway.take();

        client.handle_input(InputEvent::ButtonDown(Action::EnterSafeZone));
        client.tick();
        assert!(gateway.take().is_empty());

        client.handle_server_event(ServerMsg::PlayerStatus {
            player_id: LOCAL_ID.into(),
            lives: 3,
            safe_zone_uses: 3,
        });
        client.registry.local_mut().unwrap().role = Some(Role::Runner);
        client.handle_input(InputEvent::ButtonUp(Action::EnterSafeZone));
        client.handle_input(InputEvent::ButtonDown(Action::EnterSafeZone));
        client.tick();
        assert_eq!(gateway.take(), vec![Sent::Action(Action::EnterSafeZone)]);

        client.handle_server_event(ServerMsg::PlayerStatus {
            player_id: LOCAL_ID.into(),
            lives: 3,
            safe_zone_uses: 0,
        });
        client.handle_input(InputEvent::ButtonUp(Action::EnterSafeZone));
        client.handle_input(InputEvent::ButtonDown(Action::EnterSafeZone));
        client.tick();
        assert!(gateway.take().is_empty());
    }

    #[test]
    fn equipment_action_needs_owned_item() {
        let (mut client, gateway, _) = playing_client();
        client.handle_input(InputEvent::KeyDown("KeyQ".into()));
        client.tick();
        assert!(gateway.take().is_empty());

        client.profile.equipment.push(EquipmentItem {
            id: "boots".into(),
            name: "Speed boots".into(),
            effect: String::new(),
        });
        client.handle_input(InputEvent::KeyUp("KeyQ".into()));
        client.handle_input(InputEvent::KeyDown("KeyQ".into()));
        client.tick();
        assert_eq!(gateway.take(), vec![Sent::Action(Action::UseEquipment)]);
    }

    #[test]
    fn remote_pose_never_moves_local_entity() {
        let (mut client, _, renderer) = playing_client();
        client.handle_server_event(ServerMsg::PoseUpdate {
            player_id: LOCAL_ID.into(),
            position: Vec3::new(50.0, 0.0, 50.0),
            rotation_yaw: 1.0,
        });
        assert_eq!(client.registry().local().unwrap().position, Vec3::ZERO);
        assert!(renderer.take().is_empty());

        client.handle_server_event(ServerMsg::PoseUpdate {
            player_id: "remote".into(),
            position: Vec3::new(5.0, 0.0, 5.0),
            rotation_yaw: 1.0,
        });
        assert_eq!(
            client.registry().get("remote").unwrap().position,
            Vec3::new(5.0, 0.0, 5.0)
        );
        assert!(matches!(
            renderer.take().as_slice(),
            [RenderCall::Pose(id, _, _, _)] if id == "remote"
        ));
    }

    #[test]
    fn game_end_credits_reward_once() {
        let (mut client, _, _) = playing_client();
        let ended = ServerMsg::GameEnded {
            result: "runners_win".into(),
            winners: vec![LOCAL_ID.into()],
        };
        client.handle_server_event(ended.clone());
        assert_eq!(client.profile().coins, 100 + REWARD_COINS);
        assert_eq!(client.lifecycle().phase(), LifecyclePhase::Finished);
        assert!(client.lifecycle().outcome().unwrap().local_won);

        client.handle_server_event(ended);
        assert_eq!(client.profile().coins, 100 + REWARD_COINS);
    }

    #[test]
    fn game_end_without_local_winner_pays_nothing() {
        let (mut client, _, _) = playing_client();
        client.handle_server_event(ServerMsg::GameEnded {
            result: "catcher_wins".into(),
            winners: vec!["remote".into()],
        });
        assert_eq!(client.profile().coins, 100);
        assert!(!client.is_running());
    }

    #[test]
    fn ticks_after_end_or_leave_are_guarded() {
        let (mut client, gateway, renderer) = playing_client();
        client.handle_server_event(ServerMsg::GameEnded {
            result: "draw".into(),
            winners: vec![],
        });
        renderer.take();
        assert_eq!(client.tick(), TickOutcome::Halted);
        // Forcing the game screen back must not resurrect the session
        client.set_screen(Screen::Game);
        assert_eq!(client.tick(), TickOutcome::Halted);
        assert_eq!(renderer.frames(), 0);

        client.leave_room();
        assert_eq!(gateway.take(), vec![Sent::Leave("room-1".into())]);
        assert_eq!(client.lifecycle().phase(), LifecyclePhase::Idle);
        assert_eq!(client.tick(), TickOutcome::Halted);
    }

    #[test]
    fn screen_switch_halts_loop() {
        let (mut client, _, renderer) = playing_client();
        client.set_screen(Screen::Lobby);
        assert!(!client.is_running());
        assert_eq!(client.tick(), TickOutcome::Halted);
        assert_eq!(renderer.frames(), 0);
    }

    #[test]
    fn missing_local_entity_skips_integration() {
        let (mut client, gateway, renderer) = waiting_client();
        start(&mut client, vec![player("remote")]);
        gateway.take();
        renderer.take();

        client.handle_input(InputEvent::KeyDown("KeyW".into()));
        assert_eq!(client.tick(), TickOutcome::NoLocalEntity);
        assert!(gateway.take().is_empty());
        assert_eq!(renderer.frames(), 1);
    }

    #[test]
    fn forced_removal_returns_to_idle() {
        let (mut client, _, renderer) = playing_client();
        client.handle_server_event(ServerMsg::MemberLeft {
            player_id: LOCAL_ID.into(),
        });
        assert_eq!(client.lifecycle().phase(), LifecyclePhase::Idle);
        assert_eq!(client.screen(), Screen::Lobby);
        assert!(client.registry().is_empty());
        assert!(renderer.take().contains(&RenderCall::Clear));
    }

    #[test]
    fn member_events_update_roster() {
        let (mut client, _, _) = waiting_client();
        client.handle_server_event(ServerMsg::MemberJoined {
            player: player("third"),
        });
        assert_eq!(client.status().player_count, 3);
        assert!(client.registry().get("third").is_some());

        client.handle_server_event(ServerMsg::ReadyChanged {
            player_id: "third".into(),
            ready: true,
        });
        assert!(client.registry().get("third").unwrap().ready);

        client.handle_server_event(ServerMsg::MemberLeft {
            player_id: "third".into(),
        });
        assert_eq!(client.status().player_count, 2);
        assert!(client.registry().get("third").is_none());
    }

    #[test]
    fn key_held_before_start_keeps_moving() {
        let (mut client, _, _) = waiting_client();
        client.handle_input(InputEvent::KeyDown("KeyW".into()));
        client.handle_input(InputEvent::KeyDown("KeyV".into()));
        start(&mut client, vec![]);

        assert_eq!(client.tick(), TickOutcome::Advanced { synced: true });
        assert_eq!(client.tick(), TickOutcome::Advanced { synced: true });
        assert_eq!(client.registry().local().unwrap().position.z, -1.0);
        // The view toggle pressed in the room is not replayed in game
        assert_eq!(
            client.lifecycle().session().unwrap().camera_mode,
            CameraMode::ThirdPerson
        );
    }

    #[test]
    fn late_joiner_is_drawn_during_game() {
        let (mut client, _, renderer) = playing_client();
        let mut late = player("late");
        late.position = Vec3::new(3.0, 0.0, -4.0);
        client.handle_server_event(ServerMsg::MemberJoined { player: late });
        assert!(matches!(
            renderer.take().as_slice(),
            [RenderCall::Pose(id, position, _, _)] if id == "late" && *position == Vec3::new(3.0, 0.0, -4.0)
        ));

        client.handle_server_event(ServerMsg::RoomSnapshot {
            room: room_snapshot(LOCAL_ID, &[LOCAL_ID, "remote", "late", "later"]),
        });
        let drawn: Vec<String> = renderer
            .take()
            .into_iter()
            .filter_map(|call| match call {
                RenderCall::Pose(id, ..) => Some(id),
                _ => None,
            })
            .collect();
        assert!(drawn.contains(&"later".to_string()));
        assert_eq!(drawn.len(), 4);
    }

    #[test]
    fn member_joining_waiting_room_is_not_drawn() {
        let (mut client, _, renderer) = waiting_client();
        renderer.take();
        client.handle_server_event(ServerMsg::MemberJoined {
            player: player("third"),
        });
        assert!(renderer.take().is_empty());
    }

    #[test]
    fn snapshot_while_idle_is_ignored() {
        let (mut client, _, _) = client();
        client.handle_server_event(ServerMsg::RoomSnapshot {
            room: room_snapshot("remote", &["remote"]),
        });
        assert_eq!(client.lifecycle().phase(), LifecyclePhase::Idle);
        assert!(client.registry().is_empty());
    }

    #[test]
    fn time_update_formats_countdown() {
        let (mut client, _, _) = playing_client();
        client.handle_server_event(ServerMsg::TimeUpdate { time_left: 65 });
        assert_eq!(client.status().time_left.as_deref(), Some("1:05"));
    }

    #[test]
    fn chat_is_trimmed_limited_and_logged() {
        let (mut client, gateway, _) = waiting_client();
        assert!(!client.send_chat("   "));
        assert!(client.send_chat("  hi  "));
        assert_eq!(gateway.take(), vec![Sent::Chat("hi".into())]);

        for i in 0..(CHAT_LOG_CAPACITY + 5) {
            client.handle_server_event(ServerMsg::ChatMessage {
                username: "remote".into(),
                message: format!("line {i}"),
            });
        }
        let log: Vec<_> = client.chat_log().collect();
        assert_eq!(log.len(), CHAT_LOG_CAPACITY);
        assert_eq!(log[0].message, "line 5");
    }

    #[test]
    fn disconnect_keeps_local_movement_running() {
        let (mut client, gateway, _) = playing_client();
        client.handle_disconnect();
        assert!(!client.status().online);

        client.handle_input(InputEvent::KeyDown("ArrowUp".into()));
        assert_eq!(client.tick(), TickOutcome::Advanced { synced: true });
        assert_eq!(client.registry().local().unwrap().position.z, -0.5);
        assert_eq!(gateway.take().len(), 1);
    }
}
