//! Report storage and synchronization policy.
//!
//! Concurrency contract: last write wins by server-assigned commit timestamp.
//! No optimistic-concurrency token is checked; near-simultaneous edits to the
//! same (user, date) overwrite each other in commit order. Broadcast happens
//! only after the durable write succeeds.

use chrono::NaiveDate;
use sqlx::SqlitePool;
use tracing::{debug, info};

use super::models::{
    DailyReportDto, DailyReportsResponse, GroupMemberRow, ProjectGroupDto, ProjectGroupMemberDto,
    UpdateDailyReportRequest,
};
use crate::common::ApiError;
use crate::realtime::models::WsMessage;
use crate::realtime::services::RoomRegistry;
use crate::services::users;

/// Date keys are exact-match strings everywhere (rooms, queries), so reject
/// anything that is not a canonical YYYY-MM-DD.
pub fn validate_date_key(date: &str) -> Result<(), ApiError> {
    let parsed = NaiveDate::parse_from_str(date, "%Y-%m-%d")
        .map_err(|_| ApiError::BadRequest(format!("invalid date: {}", date)))?;

    if parsed.format("%Y-%m-%d").to_string() != date {
        return Err(ApiError::BadRequest(format!("invalid date: {}", date)));
    }

    Ok(())
}

/// Create or replace the report for (user, date), then broadcast the
/// resulting snapshot to the date's room.
///
/// The write is a single INSERT .. ON CONFLICT DO UPDATE, so a concurrent
/// creation race is resolved by the unique index rather than by
/// check-then-insert. The user-existence check only guards the creation
/// path; updates to an existing report do not re-validate the user.
pub async fn upsert_report(
    pool: &SqlitePool,
    rooms: &RoomRegistry,
    request: &UpdateDailyReportRequest,
) -> Result<DailyReportDto, ApiError> {
    validate_date_key(&request.date)?;

    let existing_id: Option<i64> =
        sqlx::query_scalar("SELECT id FROM daily_reports WHERE user_id = ? AND date = ?")
            .bind(&request.user_id)
            .bind(&request.date)
            .fetch_optional(pool)
            .await
            .map_err(ApiError::DatabaseError)?;

    if existing_id.is_none() {
        let user = users::get_by_id(pool, &request.user_id)
            .await
            .map_err(ApiError::DatabaseError)?;
        if user.is_none() {
            return Err(ApiError::NotFound(format!(
                "User {} not found",
                request.user_id
            )));
        }
    }

    sqlx::query(
        r#"
        INSERT INTO daily_reports (user_id, date, content, leave_status, created_at, updated_at)
        VALUES (?, ?, ?, ?, datetime('now'), datetime('now'))
        ON CONFLICT(user_id, date) DO UPDATE SET
            content = excluded.content,
            leave_status = excluded.leave_status,
            updated_at = datetime('now')
        "#,
    )
    .bind(&request.user_id)
    .bind(&request.date)
    .bind(&request.content)
    .bind(request.leave_status)
    .execute(pool)
    .await
    .map_err(ApiError::DatabaseError)?;

    let snapshot = fetch_snapshot(pool, &request.user_id, &request.date).await?;

    info!(
        user_id = %snapshot.user_id,
        date = %snapshot.date,
        "Daily report saved"
    );

    // Exactly one broadcast per successful write, after commit
    let delivered = rooms
        .broadcast(
            &request.date,
            &WsMessage::ReportUpdated {
                report: snapshot.clone(),
            },
        )
        .await;

    debug!(
        date = %request.date,
        delivered = delivered,
        "Report update broadcast to date room"
    );

    Ok(snapshot)
}

async fn fetch_snapshot(
    pool: &SqlitePool,
    user_id: &str,
    date: &str,
) -> Result<DailyReportDto, ApiError> {
    sqlx::query_as::<_, DailyReportDto>(
        r#"
        SELECT r.id, r.user_id, u.display_name AS user_display_name,
               r.date, r.content, r.leave_status, r.updated_at
        FROM daily_reports r
        JOIN users u ON u.id = r.user_id
        WHERE r.user_id = ? AND r.date = ?
        "#,
    )
    .bind(user_id)
    .bind(date)
    .fetch_one(pool)
    .await
    .map_err(ApiError::DatabaseError)
}

/// All reports for the exact date plus the full group roster.
///
/// Members without a report for the date still appear in the roster; "no
/// report" is a displayable state, not an error.
pub async fn list_for_date(
    pool: &SqlitePool,
    date: &str,
) -> Result<DailyReportsResponse, ApiError> {
    validate_date_key(date)?;

    let reports = sqlx::query_as::<_, DailyReportDto>(
        r#"
        SELECT r.id, r.user_id, u.display_name AS user_display_name,
               r.date, r.content, r.leave_status, r.updated_at
        FROM daily_reports r
        JOIN users u ON u.id = r.user_id
        WHERE r.date = ?
        ORDER BY r.user_id
        "#,
    )
    .bind(date)
    .fetch_all(pool)
    .await
    .map_err(ApiError::DatabaseError)?;

    let rows = sqlx::query_as::<_, GroupMemberRow>(
        r#"
        SELECT g.id AS group_id, g.name AS group_name,
               m.user_id, u.display_name, u.email
        FROM project_groups g
        LEFT JOIN project_group_members m ON m.project_group_id = g.id
        LEFT JOIN users u ON u.id = m.user_id
        ORDER BY g.id, u.display_name
        "#,
    )
    .fetch_all(pool)
    .await
    .map_err(ApiError::DatabaseError)?;

    let mut groups: Vec<ProjectGroupDto> = Vec::new();
    for row in rows {
        if groups.last().map(|g| g.id) != Some(row.group_id) {
            groups.push(ProjectGroupDto {
                id: row.group_id,
                name: row.group_name.clone(),
                members: Vec::new(),
            });
        }
        if let (Some(user_id), Some(display_name)) = (row.user_id, row.display_name) {
            if let Some(group) = groups.last_mut() {
                group.members.push(ProjectGroupMemberDto {
                    user_id,
                    display_name,
                    email: row.email.unwrap_or_default(),
                });
            }
        }
    }

    Ok(DailyReportsResponse {
        date: date.to_string(),
        reports,
        groups,
    })
}
