//! Daily report routes

use axum::{routing::get, Router};

use super::handlers;

pub fn report_routes() -> Router {
    Router::new().route(
        "/api/daily-report",
        get(handlers::get_daily_reports).post(handlers::update_daily_report),
    )
}
