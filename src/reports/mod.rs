//! # Reports Module
//!
//! Daily report CRUD with a last-write-wins synchronization policy: every
//! successful write is followed by exactly one broadcast to the report's
//! date room.

pub mod handlers;
pub mod models;
pub mod routes;
pub mod services;

#[cfg(test)]
mod tests;

pub use routes::report_routes;
