// src/services/jwt.rs
//! Session token issuance and validation.
//!
//! Tokens are self-contained HS256 JWTs; there is no server-side session
//! store and no revocation list, so logout is purely client-side discard.

use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use uuid::Uuid;

use crate::auth::models::{Claims, User};

/// Issuer and audience baked into every session token. Issuance and
/// validation must agree on these exactly.
pub const TOKEN_ISSUER: &str = "daily-report";
pub const TOKEN_AUDIENCE: &str = "daily-report";

/// Issue a session token for a user.
///
/// Only fails if the signing key is unusable, which a correctly configured
/// process never hits.
pub fn issue(user: &User, secret: &str, valid_hours: i64) -> Result<String, jsonwebtoken::errors::Error> {
    let exp = (Utc::now() + Duration::hours(valid_hours)).timestamp() as usize;

    let claims = Claims {
        sub: user.id.clone(),
        email: user.email.clone(),
        name: user.display_name.clone(),
        jti: Uuid::new_v4().to_string(),
        iss: TOKEN_ISSUER.to_string(),
        aud: TOKEN_AUDIENCE.to_string(),
        exp,
    };

    encode(
        &Header::new(Algorithm::HS256),
        &claims,
        &EncodingKey::from_secret(secret.as_bytes()),
    )
}

/// Validate a session token.
///
/// Returns None for any failure (expired, tampered, wrong issuer/audience,
/// malformed) - the caller treats that as unauthenticated, never as a server
/// error. Expiry is exact: no clock-skew leeway.
pub fn validate(token: &str, secret: &str) -> Option<Claims> {
    let mut validation = Validation::new(Algorithm::HS256);
    validation.leeway = 0;
    validation.set_issuer(&[TOKEN_ISSUER]);
    validation.set_audience(&[TOKEN_AUDIENCE]);

    decode::<Claims>(
        token,
        &DecodingKey::from_secret(secret.as_bytes()),
        &validation,
    )
    .map(|data| data.claims)
    .ok()
}
