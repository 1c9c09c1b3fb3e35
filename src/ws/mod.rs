//! Game server connection

pub mod client;
pub mod gateway;
pub mod protocol;

pub use client::WsGateway;
pub use gateway::{GatewayEvent, NetworkGateway, PendingAck, RoomAck};
pub use protocol::ServerMsg;
