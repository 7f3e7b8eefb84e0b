#[cfg(test)]
mod tests {
    use crate::common::migrations;
    use crate::common::ApiError;
    use crate::realtime::services::{RoomRegistry, CONNECTION_BUFFER};
    use crate::reports::models::{LeaveStatus, UpdateDailyReportRequest};
    use crate::reports::services::{list_for_date, upsert_report, validate_date_key};
    use axum::extract::ws::Message;
    use sqlx::sqlite::SqlitePoolOptions;
    use sqlx::SqlitePool;
    use tokio::sync::mpsc;

    async fn setup_test_db() -> SqlitePool {
        let pool = SqlitePoolOptions::new()
            .connect("sqlite::memory:")
            .await
            .unwrap();
        migrations::run_migrations(&pool).await.unwrap();

        sqlx::query(
            "INSERT INTO users (id, email, display_name) VALUES
             ('user-1', 'wei.li@example.com', 'LiWei'),
             ('user-2', 'mei.chen@example.com', 'ChenMei')",
        )
        .execute(&pool)
        .await
        .unwrap();

        sqlx::query("INSERT INTO project_groups (id, name) VALUES (1, 'Platform'), (2, 'Frontend')")
            .execute(&pool)
            .await
            .unwrap();
        sqlx::query(
            "INSERT INTO project_group_members (project_group_id, user_id) VALUES
             (1, 'user-1'), (1, 'user-2'), (2, 'user-2')",
        )
        .execute(&pool)
        .await
        .unwrap();

        pool
    }

    fn request(user_id: &str, date: &str, content: &str) -> UpdateDailyReportRequest {
        UpdateDailyReportRequest {
            user_id: user_id.to_string(),
            date: date.to_string(),
            content: content.to_string(),
            leave_status: None,
        }
    }

    #[test]
    fn date_key_validation() {
        assert!(validate_date_key("2024-01-01").is_ok());
        assert!(validate_date_key("2024-1-1").is_err());
        assert!(validate_date_key("01-01-2024").is_err());
        assert!(validate_date_key("2024-02-30").is_err());
        assert!(validate_date_key("not a date").is_err());
    }

    #[tokio::test]
    async fn upsert_creates_then_replaces_last_write_wins() {
        let pool = setup_test_db().await;
        let rooms = RoomRegistry::new();

        let first = upsert_report(&pool, &rooms, &request("user-1", "2024-01-01", "hi"))
            .await
            .unwrap();
        assert_eq!(first.content, "hi");
        assert_eq!(first.user_display_name, "LiWei");

        let second = upsert_report(&pool, &rooms, &request("user-1", "2024-01-01", "bye"))
            .await
            .unwrap();
        assert_eq!(second.content, "bye");

        // Exactly one stored row for the (user, date) key
        let count: i64 =
            sqlx::query_scalar("SELECT COUNT(*) FROM daily_reports WHERE user_id = 'user-1'")
                .fetch_one(&pool)
                .await
                .unwrap();
        assert_eq!(count, 1);

        let stored: String = sqlx::query_scalar(
            "SELECT content FROM daily_reports WHERE user_id = 'user-1' AND date = '2024-01-01'",
        )
        .fetch_one(&pool)
        .await
        .unwrap();
        assert_eq!(stored, "bye");
    }

    #[tokio::test]
    async fn each_successful_upsert_broadcasts_once() {
        let pool = setup_test_db().await;
        let rooms = RoomRegistry::new();

        let (tx, mut rx) = mpsc::channel(CONNECTION_BUFFER);
        rooms.register("conn".to_string(), tx).await;
        rooms.join("conn", "2024-01-01").await;

        upsert_report(&pool, &rooms, &request("user-1", "2024-01-01", "hi"))
            .await
            .unwrap();
        upsert_report(&pool, &rooms, &request("user-1", "2024-01-01", "bye"))
            .await
            .unwrap();

        let mut received = Vec::new();
        while let Ok(Message::Text(text)) = rx.try_recv() {
            received.push(text);
        }
        assert_eq!(received.len(), 2);
        assert!(received[0].contains("\"content\":\"hi\""));
        assert!(received[1].contains("\"content\":\"bye\""));
    }

    #[tokio::test]
    async fn failed_upsert_broadcasts_nothing() {
        let pool = setup_test_db().await;
        let rooms = RoomRegistry::new();

        let (tx, mut rx) = mpsc::channel(CONNECTION_BUFFER);
        rooms.register("conn".to_string(), tx).await;
        rooms.join("conn", "2024-01-01").await;

        let result = upsert_report(&pool, &rooms, &request("ghost", "2024-01-01", "hi")).await;
        assert!(matches!(result, Err(ApiError::NotFound(_))));
        assert!(rx.try_recv().is_err());
    }

    #[tokio::test]
    async fn unknown_user_is_only_checked_on_creation() {
        let pool = setup_test_db().await;
        let rooms = RoomRegistry::new();

        let result = upsert_report(&pool, &rooms, &request("ghost", "2024-01-01", "hi")).await;
        assert!(matches!(result, Err(ApiError::NotFound(_))));

        // No row was written
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM daily_reports")
            .fetch_one(&pool)
            .await
            .unwrap();
        assert_eq!(count, 0);
    }

    #[tokio::test]
    async fn leave_status_round_trips() {
        let pool = setup_test_db().await;
        let rooms = RoomRegistry::new();

        let mut req = request("user-1", "2024-01-01", "half day off");
        req.leave_status = Some(LeaveStatus::Morning);

        let saved = upsert_report(&pool, &rooms, &req).await.unwrap();
        assert_eq!(saved.leave_status, Some(LeaveStatus::Morning));

        let listed = list_for_date(&pool, "2024-01-01").await.unwrap();
        assert_eq!(listed.reports[0].leave_status, Some(LeaveStatus::Morning));

        let json = serde_json::to_string(&saved).unwrap();
        assert!(json.contains("\"leaveStatus\":\"morning\""));
    }

    #[tokio::test]
    async fn list_for_date_returns_roster_even_with_no_reports() {
        let pool = setup_test_db().await;

        let response = list_for_date(&pool, "2024-01-01").await.unwrap();

        assert_eq!(response.date, "2024-01-01");
        assert!(response.reports.is_empty());
        assert_eq!(response.groups.len(), 2);

        let platform = &response.groups[0];
        assert_eq!(platform.name, "Platform");
        assert_eq!(platform.members.len(), 2);

        let frontend = &response.groups[1];
        assert_eq!(frontend.members.len(), 1);
        assert_eq!(frontend.members[0].user_id, "user-2");
    }

    #[tokio::test]
    async fn list_for_date_only_returns_exact_date_matches() {
        let pool = setup_test_db().await;
        let rooms = RoomRegistry::new();

        upsert_report(&pool, &rooms, &request("user-1", "2024-01-01", "day one"))
            .await
            .unwrap();
        upsert_report(&pool, &rooms, &request("user-2", "2024-01-02", "day two"))
            .await
            .unwrap();

        let response = list_for_date(&pool, "2024-01-01").await.unwrap();
        assert_eq!(response.reports.len(), 1);
        assert_eq!(response.reports[0].content, "day one");
    }

    #[tokio::test]
    async fn empty_group_appears_with_no_members() {
        let pool = setup_test_db().await;
        sqlx::query("INSERT INTO project_groups (id, name) VALUES (3, 'Bench')")
            .execute(&pool)
            .await
            .unwrap();

        let response = list_for_date(&pool, "2024-01-01").await.unwrap();
        assert_eq!(response.groups.len(), 3);
        assert!(response.groups[2].members.is_empty());
    }
}
