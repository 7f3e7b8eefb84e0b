use axum::{routing::get, Router};

use super::handlers;

pub fn realtime_routes() -> Router {
    Router::new().route("/ws/daily-report", get(handlers::websocket::websocket_handler))
}
