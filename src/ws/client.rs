//! WebSocket gateway to the game server

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use dashmap::DashMap;
use futures::{SinkExt, StreamExt};
use tokio::sync::{mpsc, oneshot};
use tokio_tungstenite::{connect_async, tungstenite::Message};
use tracing::{debug, error, info, warn};
use uuid::Uuid;

use crate::game::Vec3;
use crate::input::Action;
use crate::room::CreateRoomRequest;

use super::gateway::{GatewayError, GatewayEvent, NetworkGateway, PendingAck, RoomAck};
use super::protocol::{ClientMsg, ServerMsg};

type PendingAcks = Arc<DashMap<Uuid, oneshot::Sender<RoomAck>>>;

/// Split-socket gateway: a writer task drains outbound messages, a reader
/// task routes acks to their waiters and forwards everything else.
pub struct WsGateway {
    outbound: mpsc::UnboundedSender<ClientMsg>,
    pending: PendingAcks,
    closed: Arc<AtomicBool>,
}

/// Mark the connection dead, then drop every waiter so their acks fail
fn close_pending(closed: &AtomicBool, pending: &PendingAcks) {
    closed.store(true, Ordering::SeqCst);
    pending.clear();
}

impl WsGateway {
    /// Connect and start the reader/writer tasks. Inbound events arrive on
    /// the returned receiver, ending with [`GatewayEvent::Disconnected`].
    pub async fn connect(
        server_url: &str,
        token: &str,
    ) -> Result<(Self, mpsc::UnboundedReceiver<GatewayEvent>), GatewayError> {
        let mut url = reqwest::Url::parse(server_url)
            .map_err(|e| GatewayError::Url(format!("{server_url}: {e}")))?;
        url.query_pairs_mut().append_pair("token", token);

        let (socket, _) = connect_async(url.as_str()).await?;
        info!(url = %server_url, "Connected to game server");

        let (mut ws_sink, mut ws_stream) = socket.split();
        let (outbound_tx, mut outbound_rx) = mpsc::unbounded_channel::<ClientMsg>();
        let (events_tx, events_rx) = mpsc::unbounded_channel();
        let pending: PendingAcks = Arc::new(DashMap::new());
        let closed = Arc::new(AtomicBool::new(false));

        // Writer task: outbound queue -> WebSocket
        let writer_pending = pending.clone();
        let writer_closed = closed.clone();
        tokio::spawn(async move {
            while let Some(msg) = outbound_rx.recv().await {
                let json = match serde_json::to_string(&msg) {
                    Ok(json) => json,
                    Err(e) => {
                        error!(error = %e, "Failed to serialize outbound message");
                        continue;
                    }
                };
                if let Err(e) = ws_sink.send(Message::Text(json)).await {
                    debug!(error = %e, "WebSocket send failed");
                    break;
                }
            }
            // Requests still queued behind a failed send never reach the server
            close_pending(&writer_closed, &writer_pending);
            let _ = ws_sink.close().await;
        });

        // Reader task: WebSocket -> acks / session events
        let reader_pending = pending.clone();
        let reader_closed = closed.clone();
        tokio::spawn(async move {
            while let Some(result) = ws_stream.next().await {
                match result {
                    Ok(Message::Text(text)) => match serde_json::from_str::<ServerMsg>(&text) {
                        Ok(ServerMsg::Ack {
                            request_id,
                            success,
                            room,
                            error,
                        }) => {
                            let ack = RoomAck {
                                request_id,
                                success,
                                room,
                                error,
                            };
                            match reader_pending.remove(&request_id) {
                                Some((_, waiter)) => {
                                    let _ = waiter.send(ack);
                                }
                                None => warn!(%request_id, "Ack for unknown request"),
                            }
                        }
                        Ok(msg) => {
                            if events_tx.send(GatewayEvent::Server(msg)).is_err() {
                                break;
                            }
                        }
                        Err(e) => warn!(error = %e, "Invalid server message"),
                    },
                    Ok(Message::Close(_)) => break,
                    Ok(_) => {}
                    Err(e) => {
                        debug!(error = %e, "WebSocket error");
                        break;
                    }
                }
            }

            close_pending(&reader_closed, &reader_pending);
            let _ = events_tx.send(GatewayEvent::Disconnected);
            info!("Game server connection closed");
        });

        Ok((
            Self {
                outbound: outbound_tx,
                pending,
                closed,
            },
            events_rx,
        ))
    }

    fn send(&self, msg: ClientMsg) {
        if self.outbound.send(msg).is_err() {
            debug!("Dropping outbound message, connection closed");
        }
    }

    /// Register a waiter and queue the request. A closed connection drops
    /// the waiter at once, so the ack resolves as failed.
    fn request(&self, request_id: Uuid, msg: ClientMsg) -> PendingAck {
        let (tx, rx) = oneshot::channel();
        self.pending.insert(request_id, tx);
        // Checked after the insert: a concurrent close either clears this
        // waiter or is observed here
        if self.closed.load(Ordering::SeqCst) || self.outbound.send(msg).is_err() {
            debug!(%request_id, "Request dropped, connection closed");
            self.pending.remove(&request_id);
        }
        PendingAck::new(request_id, rx)
    }
}

impl NetworkGateway for WsGateway {
    fn send_pose(&self, position: Vec3, rotation_yaw: f32) {
        self.send(ClientMsg::PlayerMove {
            position,
            rotation_yaw,
        });
    }

    fn send_action(&self, action: Action) {
        self.send(ClientMsg::PlayerAction { action });
    }

    fn create_room(&self, request: &CreateRoomRequest) -> PendingAck {
        let request_id = Uuid::new_v4();
        self.request(
            request_id,
            ClientMsg::CreateRoom {
                request_id,
                name: request.name.clone(),
                game_mode: request.mode,
                max_players: request.max_players,
            },
        )
    }

    fn join_room(&self, room_id: &str) -> PendingAck {
        let request_id = Uuid::new_v4();
        self.request(
            request_id,
            ClientMsg::JoinRoom {
                request_id,
                room_id: room_id.to_string(),
            },
        )
    }

    fn set_ready(&self, room_id: &str) {
        self.send(ClientMsg::SetReady {
            room_id: room_id.to_string(),
        });
    }

    fn force_start(&self, room_id: &str) {
        self.send(ClientMsg::ForceStartGame {
            room_id: room_id.to_string(),
        });
    }

    fn leave_room(&self, room_id: &str) {
        self.send(ClientMsg::LeaveRoom {
            room_id: room_id.to_string(),
        });
    }

    fn send_chat(&self, room_id: &str, message: &str) {
        self.send(ClientMsg::ChatMessage {
            room_id: room_id.to_string(),
            message: message.to_string(),
        });
    }
}
