//! User routes

use axum::{routing::get, Router};

use super::handlers;

pub fn user_routes() -> Router {
    Router::new()
        .route("/api/user/profile", get(handlers::get_profile))
        .route("/api/user/all", get(handlers::get_all_users))
}
