//! Room membership and lifecycle

pub mod lifecycle;
pub mod model;

pub use lifecycle::{GameOutcome, LifecyclePhase, RoomLifecycle};
pub use model::{CreateRoomRequest, GameMode, Room, RoomFormError, RoomStatus, RoomSummary};
