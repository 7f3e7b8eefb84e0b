//! # Auth Module
//!
//! This module handles all authentication-related functionality including:
//! - The Keycloak sign-in redirect and authorization-code login flow
//! - Session token issuance via the jwt service
//! - AuthedUser extractor for protected routes

pub mod extractors;
pub mod handlers;
pub mod models;
pub mod routes;

#[cfg(test)]
mod tests;

pub use extractors::AuthedUser;
pub use models::User;
pub use routes::auth_routes;
