//! Async driver for the game client
//!
//! One task owns the [`GameClient`]. UI commands, server events, resolved
//! acks, input events and frame ticks are all applied from a single biased
//! `select!`, so nothing inside the client ever runs concurrently.

use std::sync::Arc;

use parking_lot::RwLock;
use tokio::sync::mpsc;
use tokio::time::{interval, MissedTickBehavior};
use tracing::{debug, info, warn};

use crate::input::InputEvent;
use crate::room::GameMode;
use crate::util::time::{frame_duration, Timer};
use crate::ws::{GatewayEvent, PendingAck, RoomAck};

use super::client::{GameClient, Screen, SessionStatus, TickOutcome};

/// Requests coming from the UI layer
#[derive(Debug, Clone, PartialEq)]
pub enum ClientCommand {
    CreateRoom {
        name: String,
        mode: GameMode,
        max_players: u8,
    },
    JoinRoom(String),
    ToggleReady,
    ForceStart,
    LeaveRoom,
    Chat(String),
    SetScreen(Screen),
    Shutdown,
}

/// Cloneable sender side of a running session
#[derive(Clone)]
pub struct SessionHandle {
    input_tx: mpsc::UnboundedSender<InputEvent>,
    command_tx: mpsc::UnboundedSender<ClientCommand>,
    status: Arc<RwLock<SessionStatus>>,
}

impl SessionHandle {
    pub fn input(&self, event: InputEvent) {
        let _ = self.input_tx.send(event);
    }

    pub fn command(&self, command: ClientCommand) -> bool {
        self.command_tx.send(command).is_ok()
    }

    /// Latest published status
    pub fn status(&self) -> SessionStatus {
        self.status.read().clone()
    }

    /// Resolves once the runner has stopped
    pub async fn closed(&self) {
        self.command_tx.closed().await
    }
}

pub struct SessionRunner {
    client: GameClient,
    frame_rate: u32,
    input_rx: mpsc::UnboundedReceiver<InputEvent>,
    command_rx: mpsc::UnboundedReceiver<ClientCommand>,
    events_rx: mpsc::UnboundedReceiver<GatewayEvent>,
    ack_tx: mpsc::UnboundedSender<RoomAck>,
    ack_rx: mpsc::UnboundedReceiver<RoomAck>,
    status: Arc<RwLock<SessionStatus>>,
}

impl SessionRunner {
    pub fn new(
        client: GameClient,
        events_rx: mpsc::UnboundedReceiver<GatewayEvent>,
        frame_rate: u32,
    ) -> (Self, SessionHandle) {
        let (input_tx, input_rx) = mpsc::unbounded_channel();
        let (command_tx, command_rx) = mpsc::unbounded_channel();
        let (ack_tx, ack_rx) = mpsc::unbounded_channel();
        let status = Arc::new(RwLock::new(client.status()));

        let handle = SessionHandle {
            input_tx,
            command_tx,
            status: status.clone(),
        };

        let runner = Self {
            client,
            frame_rate,
            input_rx,
            command_rx,
            events_rx,
            ack_tx,
            ack_rx,
            status,
        };

        (runner, handle)
    }

    /// Run until shutdown is requested or every handle is dropped
    pub async fn run(mut self) {
        info!(frame_rate = self.frame_rate, "Session runner started");

        let frame_budget = frame_duration(self.frame_rate);
        let mut frame_interval = interval(frame_budget);
        frame_interval.set_missed_tick_behavior(MissedTickBehavior::Skip);
        let mut gateway_open = true;

        loop {
            let running = self.client.is_running();

            // Server events drain before local input so a start or teardown
            // is applied ahead of keys queued behind it
            tokio::select! {
                biased;

                command = self.command_rx.recv() => {
                    match command {
                        Some(ClientCommand::Shutdown) | None => break,
                        Some(command) => self.apply_command(command),
                    }
                }

                event = self.events_rx.recv(), if gateway_open => {
                    match event {
                        Some(GatewayEvent::Server(msg)) => self.client.handle_server_event(msg),
                        Some(GatewayEvent::Disconnected) | None => {
                            gateway_open = false;
                            self.client.handle_disconnect();
                        }
                    }
                }

                Some(ack) = self.ack_rx.recv() => {
                    self.client.apply_room_ack(ack);
                }

                Some(event) = self.input_rx.recv() => {
                    self.client.handle_input(event);
                    continue;
                }

                _ = frame_interval.tick(), if running => {
                    let timer = Timer::new();
                    if self.client.tick() == TickOutcome::Halted {
                        debug!("Simulation loop halted");
                    }
                    let elapsed = timer.elapsed();
                    if elapsed > frame_budget {
                        debug!(elapsed_us = elapsed.as_micros() as u64, "Frame over budget");
                    }
                }
            }

            *self.status.write() = self.client.status();
        }

        if self.client.lifecycle().room().is_some() {
            self.client.leave_room();
        }
        *self.status.write() = self.client.status();
        info!("Session runner stopped");
    }

    fn apply_command(&mut self, command: ClientCommand) {
        match command {
            ClientCommand::CreateRoom {
                name,
                mode,
                max_players,
            } => match self.client.create_room(&name, mode, max_players) {
                Ok(pending) => self.await_ack(pending),
                Err(e) => warn!(error = %e, "Create room refused"),
            },
            ClientCommand::JoinRoom(room_id) => match self.client.join_room(&room_id) {
                Ok(pending) => self.await_ack(pending),
                Err(e) => warn!(error = %e, "Join room refused"),
            },
            ClientCommand::ToggleReady => self.client.toggle_ready(),
            ClientCommand::ForceStart => self.client.force_start(),
            ClientCommand::LeaveRoom => self.client.leave_room(),
            ClientCommand::Chat(text) => {
                self.client.send_chat(&text);
            }
            ClientCommand::SetScreen(screen) => self.client.set_screen(screen),
            ClientCommand::Shutdown => {}
        }
    }

    /// Acks resolve off-loop and re-enter through the ack channel
    fn await_ack(&self, pending: PendingAck) {
        let ack_tx = self.ack_tx.clone();
        debug!(request_id = %pending.request_id(), "Awaiting room ack");
        tokio::spawn(async move {
            let ack = pending.await;
            let _ = ack_tx.send(ack);
        });
    }
}
