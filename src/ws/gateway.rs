//! Network gateway seam between the session core and the transport

use std::future::Future;
use std::pin::Pin;
use std::task::{Context, Poll};

use tokio::sync::oneshot;
use uuid::Uuid;

use crate::game::Vec3;
use crate::input::Action;
use crate::room::CreateRoomRequest;

use super::protocol::{RoomSnapshot, ServerMsg};

/// Gateway errors
#[derive(Debug, thiserror::Error)]
pub enum GatewayError {
    #[error("WebSocket error: {0}")]
    Socket(#[from] tokio_tungstenite::tungstenite::Error),

    #[error("Invalid server URL: {0}")]
    Url(String),
}

/// Reply to a create/join request
#[derive(Debug, Clone, PartialEq)]
pub struct RoomAck {
    pub request_id: Uuid,
    pub success: bool,
    pub room: Option<RoomSnapshot>,
    pub error: Option<String>,
}

impl RoomAck {
    pub fn failed(request_id: Uuid, error: impl Into<String>) -> Self {
        Self {
            request_id,
            success: false,
            room: None,
            error: Some(error.into()),
        }
    }
}

/// Inbound traffic delivered to the session core
#[derive(Debug, Clone, PartialEq)]
pub enum GatewayEvent {
    Server(ServerMsg),
    /// Transport dropped; no more events follow
    Disconnected,
}

/// Resolves when the server acks a room request.
/// A dropped connection resolves to a failed ack instead of hanging.
#[derive(Debug)]
pub struct PendingAck {
    request_id: Uuid,
    rx: oneshot::Receiver<RoomAck>,
}

impl PendingAck {
    pub fn new(request_id: Uuid, rx: oneshot::Receiver<RoomAck>) -> Self {
        Self { request_id, rx }
    }

    pub fn request_id(&self) -> Uuid {
        self.request_id
    }
}

impl Future for PendingAck {
    type Output = RoomAck;

    fn poll(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Self::Output> {
        let request_id = self.request_id;
        match Pin::new(&mut self.rx).poll(cx) {
            Poll::Ready(Ok(ack)) => Poll::Ready(ack),
            Poll::Ready(Err(_)) => Poll::Ready(RoomAck::failed(request_id, "connection lost")),
            Poll::Pending => Poll::Pending,
        }
    }
}

/// Outbound operations. Pose and action sends are fire-and-forget;
/// room requests hand back a [`PendingAck`].
pub trait NetworkGateway: Send + Sync {
    fn send_pose(&self, position: Vec3, rotation_yaw: f32);

    fn send_action(&self, action: Action);

    fn create_room(&self, request: &CreateRoomRequest) -> PendingAck;

    fn join_room(&self, room_id: &str) -> PendingAck;

    fn set_ready(&self, room_id: &str);

    fn force_start(&self, room_id: &str);

    fn leave_room(&self, room_id: &str);

    fn send_chat(&self, room_id: &str, message: &str);
}
