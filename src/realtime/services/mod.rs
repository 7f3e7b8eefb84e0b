pub mod room_service;

pub use room_service::{RoomRegistry, CONNECTION_BUFFER};
