// src/services/keycloak.rs
//! Keycloak OIDC client: discovery, authorization-code exchange and identity
//! token decoding.

use jsonwebtoken::{decode, Algorithm, DecodingKey, Validation};
use reqwest::Client;
use serde::Deserialize;
use thiserror::Error;
use tracing::{debug, error, warn};

use crate::auth::models::AccessTokenInfo;

#[derive(Debug, Error)]
pub enum KeycloakError {
    #[error("discovery failed: {0}")]
    DiscoveryFailed(String),

    #[error("token exchange failed: {0}")]
    TokenExchangeFailed(String),

    #[error("malformed identity token: {0}")]
    MalformedToken(String),

    #[error("HTTP request failed: {0}")]
    RequestFailed(String),
}

/// Static provider configuration, loaded once at startup
#[derive(Debug, Clone)]
pub struct KeycloakConfig {
    /// URL of the provider's .well-known/openid-configuration document
    pub well_known: String,
    pub client_id: String,
    pub client_secret: String,
}

/// The subset of the OIDC discovery document we need
#[derive(Debug, Deserialize)]
struct OidcWellKnown {
    authorization_endpoint: String,
    token_endpoint: String,
}

#[derive(Debug, Deserialize)]
struct SsoTokenResponse {
    access_token: String,
}

/// Identity provider client. Login is low-frequency, so the discovery
/// document is fetched per call rather than cached.
#[derive(Clone)]
pub struct KeycloakService {
    http: Client,
    config: KeycloakConfig,
}

impl KeycloakService {
    pub fn new(http: Client, config: KeycloakConfig) -> Self {
        Self { http, config }
    }

    /// Build the authorization redirect URL for the given callback URL.
    ///
    /// The provider rejects the later code exchange unless the redirect_uri
    /// matches this one byte for byte.
    pub async fn generate_login_url(&self, redirect_url: &str) -> Result<String, KeycloakError> {
        let wellknown = self.load_wellknown().await?;

        let url = format!(
            "{}?client_id={}&redirect_uri={}&response_type=code&scope=openid",
            wellknown.authorization_endpoint,
            self.config.client_id,
            urlencoding::encode(redirect_url),
        );

        debug!(redirect_url = %redirect_url, "Generated Keycloak authorization URL");
        Ok(url)
    }

    /// Exchange an authorization code for the user's identity.
    ///
    /// `redirect_url` must be the exact value used when building the
    /// authorization URL.
    pub async fn get_user_info(
        &self,
        code: &str,
        redirect_url: &str,
    ) -> Result<AccessTokenInfo, KeycloakError> {
        let wellknown = self.load_wellknown().await?;

        let params = [
            ("grant_type", "authorization_code"),
            ("client_id", &self.config.client_id),
            ("client_secret", &self.config.client_secret),
            ("code", code),
            ("redirect_uri", redirect_url),
        ];

        debug!("Exchanging authorization code for tokens");

        let response = self
            .http
            .post(&wellknown.token_endpoint)
            .form(&params)
            .send()
            .await
            .map_err(|e| KeycloakError::RequestFailed(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let error_text = response
                .text()
                .await
                .unwrap_or_else(|_| "unknown error".to_string());
            warn!(status = %status, error = %error_text, "Token exchange rejected");
            return Err(KeycloakError::TokenExchangeFailed(format!(
                "HTTP {}: {}",
                status, error_text
            )));
        }

        let token_response = response
            .json::<SsoTokenResponse>()
            .await
            .map_err(|e| KeycloakError::MalformedToken(e.to_string()))?;

        decode_access_token(&token_response.access_token)
    }

    async fn load_wellknown(&self) -> Result<OidcWellKnown, KeycloakError> {
        let response = self
            .http
            .get(&self.config.well_known)
            .send()
            .await
            .map_err(|e| KeycloakError::RequestFailed(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let error_text = response
                .text()
                .await
                .unwrap_or_else(|_| "unknown error".to_string());
            error!(status = %status, error = %error_text, "Failed to fetch well-known configuration");
            return Err(KeycloakError::DiscoveryFailed(format!(
                "HTTP {}: {}",
                status, error_text
            )));
        }

        response
            .json::<OidcWellKnown>()
            .await
            .map_err(|e| KeycloakError::DiscoveryFailed(e.to_string()))
    }
}

/// Decode the identity token's claims without checking its signature.
///
/// The token just arrived over a server-to-server TLS channel from the token
/// endpoint, so re-verifying it against the provider's keys is redundant.
/// A missing `sub` claim still fails the exchange.
pub fn decode_access_token(access_token: &str) -> Result<AccessTokenInfo, KeycloakError> {
    let mut validation = Validation::new(Algorithm::RS256);
    validation.insecure_disable_signature_validation();
    validation.validate_exp = false;
    validation.validate_aud = false;
    validation.required_spec_claims.clear();

    let data = decode::<AccessTokenInfo>(
        access_token,
        &DecodingKey::from_secret(&[]),
        &validation,
    )
    .map_err(|e| KeycloakError::MalformedToken(e.to_string()))?;

    if data.claims.sub.trim().is_empty() {
        return Err(KeycloakError::MalformedToken(
            "sub claim not found".to_string(),
        ));
    }

    Ok(data.claims)
}

#[cfg(test)]
mod tests {
    use super::*;
    use jsonwebtoken::{encode, EncodingKey, Header};
    use serde_json::json;

    fn make_identity_token(claims: serde_json::Value) -> String {
        // Self-signed HS256 token; decode_access_token ignores the signature
        encode(
            &Header::new(Algorithm::HS256),
            &claims,
            &EncodingKey::from_secret(b"test"),
        )
        .unwrap()
    }

    #[test]
    fn decodes_claims_without_signature_check() {
        let token = make_identity_token(json!({
            "sub": "abc-123",
            "email": "wei.li@example.com",
            "preferred_username": "wli",
        }));

        let info = decode_access_token(&token).unwrap();
        assert_eq!(info.sub, "abc-123");
        assert_eq!(info.email.as_deref(), Some("wei.li@example.com"));
        assert_eq!(info.preferred_username.as_deref(), Some("wli"));
        assert!(info.given_name.is_none());
    }

    #[test]
    fn rejects_token_without_sub() {
        let token = make_identity_token(json!({
            "email": "nobody@example.com",
        }));

        let result = decode_access_token(&token);
        assert!(matches!(result, Err(KeycloakError::MalformedToken(_))));
    }

    #[test]
    fn rejects_garbage_token() {
        let result = decode_access_token("not.a.jwt");
        assert!(matches!(result, Err(KeycloakError::MalformedToken(_))));
    }
}
