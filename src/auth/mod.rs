use axum::http::{header, HeaderMap};
use axum_extra::extract::cookie::CookieJar;
use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::config::SecurityConfig;

/// Cookie carrying the session token for browser page requests
pub const SESSION_COOKIE: &str = "__session";

#[derive(Debug, Serialize, Deserialize)]
pub struct Claims {
    /// Caller identifier
    pub sub: String,
    pub exp: i64,
    pub iat: i64,
}

#[derive(Debug, Error)]
pub enum AuthError {
    #[error("JWT generation error: {0}")]
    TokenGeneration(String),

    #[error("Invalid JWT token: {0}")]
    InvalidToken(String),

    #[error("Invalid JWT secret")]
    InvalidSecret,
}

/// Resolves the caller identifier of a request from a signed session token
pub struct IdentityProvider {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    expiry_hours: u64,
}

impl IdentityProvider {
    pub fn from_config(security: &SecurityConfig) -> Result<Self, AuthError> {
        let secret = security.jwt_secret.as_bytes();
        if secret.is_empty() {
            return Err(AuthError::InvalidSecret);
        }

        Ok(Self {
            encoding_key: EncodingKey::from_secret(secret),
            decoding_key: DecodingKey::from_secret(secret),
            expiry_hours: security.jwt_expiry_hours,
        })
    }

    /// Sign a session token for `user_id`
    pub fn issue(&self, user_id: &str) -> Result<String, AuthError> {
        let now = Utc::now();
        let claims = Claims {
            sub: user_id.to_string(),
            exp: (now + Duration::hours(self.expiry_hours as i64)).timestamp(),
            iat: now.timestamp(),
        };

        encode(&Header::default(), &claims, &self.encoding_key)
            .map_err(|e| AuthError::TokenGeneration(e.to_string()))
    }

    /// Validate a token and extract its claims
    pub fn verify(&self, token: &str) -> Result<Claims, AuthError> {
        decode::<Claims>(token, &self.decoding_key, &Validation::default())
            .map(|data| data.claims)
            .map_err(|e| AuthError::InvalidToken(e.to_string()))
    }

    /// Caller identifier for these request headers, or `None` when no valid token is present.
    ///
    /// The `Authorization: Bearer` header wins over the session cookie.
    pub fn resolve(&self, headers: &HeaderMap) -> Option<String> {
        let token = bearer_token(headers).or_else(|| session_cookie(headers))?;

        match self.verify(&token) {
            Ok(claims) if !claims.sub.trim().is_empty() => Some(claims.sub),
            Ok(_) => None,
            Err(e) => {
                tracing::debug!("Ignoring session token: {}", e);
                None
            }
        }
    }
}

fn bearer_token(headers: &HeaderMap) -> Option<String> {
    let value = headers.get(header::AUTHORIZATION)?.to_str().ok()?;
    value
        .strip_prefix("Bearer ")
        .map(str::trim)
        .filter(|token| !token.is_empty())
        .map(str::to_string)
}

fn session_cookie(headers: &HeaderMap) -> Option<String> {
    CookieJar::from_headers(headers)
        .get(SESSION_COOKIE)
        .map(|cookie| cookie.value().to_string())
        .filter(|token| !token.is_empty())
}
