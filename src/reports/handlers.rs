//! Daily report handlers

use axum::extract::{Extension, Json, Query};
use chrono::Local;
use std::sync::Arc;
use tokio::sync::RwLock;

use super::models::{DailyReportDto, DailyReportQuery, DailyReportsResponse, UpdateDailyReportRequest};
use super::services;
use crate::auth::extractors::AuthedUser;
use crate::common::{ApiError, AppState};

/// GET /api/daily-report?date=YYYY-MM-DD
/// Returns all reports for the date (defaulting to today) plus the full
/// project-group roster.
pub async fn get_daily_reports(
    Extension(state_lock): Extension<Arc<RwLock<AppState>>>,
    _authed: AuthedUser,
    Query(query): Query<DailyReportQuery>,
) -> Result<Json<DailyReportsResponse>, ApiError> {
    let state = state_lock.read().await.clone();

    let date = query
        .date
        .filter(|d| !d.is_empty())
        .unwrap_or_else(|| Local::now().format("%Y-%m-%d").to_string());

    let response = services::list_for_date(&state.db, &date).await?;
    Ok(Json(response))
}

/// POST /api/daily-report
/// Creates or replaces the report for (userId, date) and pushes the new
/// snapshot to everyone subscribed to that date.
pub async fn update_daily_report(
    Extension(state_lock): Extension<Arc<RwLock<AppState>>>,
    _authed: AuthedUser,
    Json(request): Json<UpdateDailyReportRequest>,
) -> Result<Json<DailyReportDto>, ApiError> {
    let state = state_lock.read().await.clone();

    let snapshot = services::upsert_report(&state.db, &state.rooms, &request).await?;
    Ok(Json(snapshot))
}
