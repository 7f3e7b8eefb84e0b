//! Daily report data models

use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// Leave status for a day. Absent means a normal working day.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[serde(rename_all = "kebab-case")]
#[sqlx(rename_all = "kebab-case")]
pub enum LeaveStatus {
    FullDay,
    Morning,
    Afternoon,
}

/// Snapshot of a report as broadcast and returned to clients.
///
/// Also the row shape of the report-with-user join, so the column aliases in
/// queries match these field names.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct DailyReportDto {
    pub id: i64,
    pub user_id: String,
    pub user_display_name: String,
    pub date: String,
    pub content: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub leave_status: Option<LeaveStatus>,
    pub updated_at: String,
}

/// POST /api/daily-report request body
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateDailyReportRequest {
    pub user_id: String,
    pub date: String,
    pub content: String,
    #[serde(default)]
    pub leave_status: Option<LeaveStatus>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProjectGroupMemberDto {
    pub user_id: String,
    pub display_name: String,
    pub email: String,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProjectGroupDto {
    pub id: i64,
    pub name: String,
    pub members: Vec<ProjectGroupMemberDto>,
}

/// GET /api/daily-report response
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DailyReportsResponse {
    pub date: String,
    pub reports: Vec<DailyReportDto>,
    pub groups: Vec<ProjectGroupDto>,
}

/// Query parameters for GET /api/daily-report
#[derive(Debug, Deserialize)]
pub struct DailyReportQuery {
    pub date: Option<String>,
}

/// Row shape of the group/member roster join. Member columns are nullable
/// because a group may have no members.
#[derive(Debug, FromRow)]
pub struct GroupMemberRow {
    pub group_id: i64,
    pub group_name: String,
    pub user_id: Option<String>,
    pub display_name: Option<String>,
    pub email: Option<String>,
}
