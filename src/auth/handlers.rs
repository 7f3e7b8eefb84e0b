//! Authentication handlers

use axum::{
    extract::{Extension, Json, Query},
    http::{header::ORIGIN, HeaderMap},
    response::Redirect,
};
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::{error, info, warn};

use super::extractors::AuthedUser;
use super::models::{LoginRequest, LoginResponse, SigninParams, UserInfo};
use crate::common::{safe_email_log, ApiError, AppState};
use crate::services::{jwt, users, KeycloakService};

/// Build the front-end callback URL for the SSO round trip.
///
/// The origin comes from the caller (query param), falling back to the
/// request's Origin header, then to the configured FE_URL. The same value is
/// derived again at exchange time and must match byte for byte, or the
/// provider rejects the exchange.
fn sso_redirect_url(
    explicit_origin: Option<&str>,
    headers: &HeaderMap,
    state: &AppState,
) -> Result<String, ApiError> {
    let origin = explicit_origin
        .map(str::to_string)
        .filter(|o| !o.is_empty())
        .or_else(|| {
            headers
                .get(ORIGIN)
                .and_then(|v| v.to_str().ok())
                .map(str::to_string)
        })
        .or_else(|| state.fe_url.clone())
        .ok_or_else(|| {
            ApiError::BadRequest("no origin supplied and FE_URL not configured".to_string())
        })?;

    Ok(format!("{}/authorizing?provider=Keycloak", origin))
}

/// GET /api/auth/keycloak/signin?origin=<url>
/// Redirects (302) to the identity provider's authorization endpoint.
pub async fn keycloak_signin(
    Extension(state_lock): Extension<Arc<RwLock<AppState>>>,
    Query(params): Query<SigninParams>,
    headers: HeaderMap,
) -> Result<Redirect, ApiError> {
    let state = state_lock.read().await.clone();

    let callback_url = sso_redirect_url(params.origin.as_deref(), &headers, &state)?;

    let keycloak = KeycloakService::new(state.http.clone(), state.keycloak.clone());
    let login_url = keycloak.generate_login_url(&callback_url).await?;

    info!("Redirecting to identity provider for sign-in");
    Ok(Redirect::to(&login_url))
}

/// POST /api/auth/login
/// Completes the authorization-code flow and issues a session token.
///
/// # Request Body
/// ```json
/// { "provider": "Keycloak", "code": "<authorization code>", "origin": "https://reports.example.com" }
/// ```
///
/// # Response
/// ```json
/// { "token": "<jwt>", "user": { "id": "...", "email": "...", "displayName": "..." } }
/// ```
pub async fn login(
    Extension(state_lock): Extension<Arc<RwLock<AppState>>>,
    headers: HeaderMap,
    Json(request): Json<LoginRequest>,
) -> Result<Json<LoginResponse>, ApiError> {
    let state = state_lock.read().await.clone();

    let provider_ok = request
        .provider
        .as_deref()
        .map(|p| p.eq_ignore_ascii_case("keycloak"))
        .unwrap_or(false);

    let code = request.code.as_deref().filter(|c| !c.is_empty());

    let (true, Some(code)) = (provider_ok, code) else {
        warn!(provider = ?request.provider, "Rejected login request with bad provider or code");
        return Err(ApiError::BadRequest("invalid login request".to_string()));
    };

    // Must be the exact callback URL used at authorization time
    let redirect_url = sso_redirect_url(request.origin.as_deref(), &headers, &state)?;

    let keycloak = KeycloakService::new(state.http.clone(), state.keycloak.clone());
    let identity = keycloak.get_user_info(code, &redirect_url).await?;

    let user = users::get_or_create(&state.db, &identity)
        .await
        .map_err(ApiError::DatabaseError)?;

    let token = jwt::issue(&user, &state.jwt_secret, state.jwt_valid_hours).map_err(|e| {
        error!(error = %e, user_id = %user.id, "JWT encoding error during login");
        ApiError::InternalServer("jwt error".to_string())
    })?;

    info!(
        user_id = %user.id,
        email = %safe_email_log(&user.email),
        "User login successful via Keycloak"
    );

    Ok(Json(LoginResponse {
        user: UserInfo::from(&user),
        token,
    }))
}

/// POST /api/auth/logout
/// Sessions are stateless JWTs, so logout is client-side token discard.
/// This endpoint only confirms the request; the token stays technically
/// valid until expiry.
pub async fn logout(authed: AuthedUser) -> Json<serde_json::Value> {
    info!(user_id = %authed.id, "User logout");
    Json(serde_json::json!({ "message": "Logout successful" }))
}
