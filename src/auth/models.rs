//! Authentication data models

use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// Session token claims
#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct Claims {
    /// User id (the identity provider's subject id)
    pub sub: String,
    pub email: String,
    /// Display name
    pub name: String,
    /// Unique token id, for traceability
    pub jti: String,
    pub iss: String,
    pub aud: String,
    pub exp: usize,
}

/// User database model
#[derive(FromRow, Serialize, Deserialize, Debug, Clone)]
pub struct User {
    pub id: String,
    pub email: String,
    pub display_name: String,
    pub created_at: String,
    pub last_login_at: String,
}

/// Identity record decoded from the provider's identity token
#[derive(Debug, Clone, Deserialize)]
pub struct AccessTokenInfo {
    pub sub: String,
    #[serde(default)]
    pub given_name: Option<String>,
    #[serde(default)]
    pub family_name: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub preferred_username: Option<String>,
    #[serde(default)]
    pub name: Option<String>,
}

fn non_blank(value: &Option<String>) -> Option<&str> {
    value.as_deref().map(str::trim).filter(|s| !s.is_empty())
}

impl AccessTokenInfo {
    /// Derive the display name from the identity claims.
    ///
    /// Precedence, first non-empty wins:
    /// family+given name concatenation, preferred username, name claim,
    /// local part of email, subject id. Total: always returns something.
    pub fn display_name(&self) -> String {
        if let (Some(family), Some(given)) =
            (non_blank(&self.family_name), non_blank(&self.given_name))
        {
            return format!("{}{}", family, given);
        }

        if let Some(username) = non_blank(&self.preferred_username) {
            return username.to_string();
        }

        if let Some(name) = non_blank(&self.name) {
            return name.to_string();
        }

        if let Some(email) = non_blank(&self.email) {
            if let Some(local) = email.split('@').next() {
                if !local.is_empty() {
                    return local.to_string();
                }
            }
        }

        self.sub.clone()
    }
}

/// POST /api/auth/login request body
#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub provider: Option<String>,
    pub code: Option<String>,
    pub origin: Option<String>,
}

/// Public view of a user, returned by login and user endpoints
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UserInfo {
    pub id: String,
    pub email: String,
    pub display_name: String,
}

impl From<&User> for UserInfo {
    fn from(user: &User) -> Self {
        UserInfo {
            id: user.id.clone(),
            email: user.email.clone(),
            display_name: user.display_name.clone(),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct LoginResponse {
    pub token: String,
    pub user: UserInfo,
}

/// Query parameters for GET /api/auth/keycloak/signin
#[derive(Debug, Deserialize)]
pub struct SigninParams {
    pub origin: Option<String>,
}
