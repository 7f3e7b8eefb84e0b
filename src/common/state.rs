// Application state shared across all modules

use reqwest::Client;
use sqlx::SqlitePool;

use crate::realtime::services::RoomRegistry;
use crate::services::keycloak::KeycloakConfig;

/// Application state containing database pool, services, and configuration
#[derive(Clone)]
pub struct AppState {
    pub db: SqlitePool,
    pub http: Client,
    pub jwt_secret: String,
    /// Session token validity in hours
    pub jwt_valid_hours: i64,
    pub keycloak: KeycloakConfig,
    /// Fallback front-end origin when the request carries no Origin header
    pub fe_url: Option<String>,
    pub rooms: RoomRegistry,
}
