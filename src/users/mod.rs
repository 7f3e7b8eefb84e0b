//! # Users Module
//!
//! Read-only user endpoints: the current user's profile and the full user
//! list used by the front-end member picker.

pub mod handlers;
pub mod routes;

pub use routes::user_routes;
