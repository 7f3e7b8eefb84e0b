//! # Realtime Module
//!
//! Per-date subscription rooms over WebSocket. Report writes fan out to
//! every connection subscribed to the affected date; there is no backlog or
//! replay, so clients fetch authoritative state before relying on pushes.

pub mod handlers;
pub mod models;
pub mod routes;
pub mod services;


pub use routes::realtime_routes;
