// src/services/users.rs
//! User directory: resolves external identities into local user rows.

use sqlx::SqlitePool;
use tracing::{debug, info};

use crate::auth::models::{AccessTokenInfo, User};
use crate::common::safe_email_log;

/// Idempotently resolve an identity into a local user.
///
/// The subject id is the only matching key; email is never used for lookup
/// (providers may reuse or omit it). A new row is created on first sight;
/// afterwards only last_login_at is bumped - email and display name stay as
/// captured at first login.
pub async fn get_or_create(
    pool: &SqlitePool,
    identity: &AccessTokenInfo,
) -> Result<User, sqlx::Error> {
    let existing = get_by_id(pool, &identity.sub).await?;

    if let Some(user) = existing {
        sqlx::query("UPDATE users SET last_login_at = datetime('now') WHERE id = ?")
            .bind(&user.id)
            .execute(pool)
            .await?;

        debug!(user_id = %user.id, "Existing user logged in, bumped last_login_at");

        return sqlx::query_as::<_, User>("SELECT * FROM users WHERE id = ?")
            .bind(&user.id)
            .fetch_one(pool)
            .await;
    }

    let email = identity.email.clone().unwrap_or_default();
    let display_name = identity.display_name();

    sqlx::query(
        "INSERT INTO users (id, email, display_name, created_at, last_login_at)
         VALUES (?, ?, ?, datetime('now'), datetime('now'))",
    )
    .bind(&identity.sub)
    .bind(&email)
    .bind(&display_name)
    .execute(pool)
    .await?;

    info!(
        user_id = %identity.sub,
        email = %safe_email_log(&email),
        "Created new user on first login"
    );

    sqlx::query_as::<_, User>("SELECT * FROM users WHERE id = ?")
        .bind(&identity.sub)
        .fetch_one(pool)
        .await
}

pub async fn get_by_id(pool: &SqlitePool, user_id: &str) -> Result<Option<User>, sqlx::Error> {
    sqlx::query_as::<_, User>("SELECT * FROM users WHERE id = ?")
        .bind(user_id)
        .fetch_optional(pool)
        .await
}

pub async fn get_all(pool: &SqlitePool) -> Result<Vec<User>, sqlx::Error> {
    sqlx::query_as::<_, User>("SELECT * FROM users ORDER BY display_name")
        .fetch_all(pool)
        .await
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::common::migrations;
    use sqlx::sqlite::SqlitePoolOptions;

    async fn setup_test_db() -> SqlitePool {
        let pool = SqlitePoolOptions::new()
            .connect("sqlite::memory:")
            .await
            .unwrap();
        migrations::create_tables(&pool).await.unwrap();
        pool
    }

    fn identity(sub: &str) -> AccessTokenInfo {
        AccessTokenInfo {
            sub: sub.to_string(),
            given_name: Some("Wei".to_string()),
            family_name: Some("Li".to_string()),
            email: Some("wei.li@example.com".to_string()),
            preferred_username: None,
            name: None,
        }
    }

    #[tokio::test]
    async fn creates_user_on_first_login() {
        let pool = setup_test_db().await;

        let user = get_or_create(&pool, &identity("sub-1")).await.unwrap();

        assert_eq!(user.id, "sub-1");
        assert_eq!(user.email, "wei.li@example.com");
        assert_eq!(user.display_name, "LiWei");
    }

    #[tokio::test]
    async fn second_login_does_not_duplicate_or_refresh_fields() {
        let pool = setup_test_db().await;

        get_or_create(&pool, &identity("sub-1")).await.unwrap();

        // Same subject comes back with different claims
        let changed = AccessTokenInfo {
            sub: "sub-1".to_string(),
            given_name: None,
            family_name: None,
            email: Some("new.address@example.com".to_string()),
            preferred_username: Some("brand-new-name".to_string()),
            name: None,
        };
        let user = get_or_create(&pool, &changed).await.unwrap();

        // Only the timestamp moves; identity fields are first-login values
        assert_eq!(user.email, "wei.li@example.com");
        assert_eq!(user.display_name, "LiWei");

        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM users")
            .fetch_one(&pool)
            .await
            .unwrap();
        assert_eq!(count, 1);
    }

    #[tokio::test]
    async fn same_email_different_subject_creates_two_users() {
        let pool = setup_test_db().await;

        get_or_create(&pool, &identity("sub-1")).await.unwrap();
        get_or_create(&pool, &identity("sub-2")).await.unwrap();

        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM users")
            .fetch_one(&pool)
            .await
            .unwrap();
        assert_eq!(count, 2);
    }
}
