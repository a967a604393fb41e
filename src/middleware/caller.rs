use async_trait::async_trait;
use axum::{extract::FromRequestParts, http::request::Parts};
use std::convert::Infallible;

use crate::error::ApiError;
use crate::state::AppState;

/// Identity of the current request, resolved once and passed to the handler.
///
/// Extraction never fails: a missing or invalid token yields an anonymous
/// caller, and each handler decides whether that is acceptable.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Caller {
    user_id: Option<String>,
}

impl Caller {
    pub fn anonymous() -> Self {
        Self { user_id: None }
    }

    pub fn user(user_id: impl Into<String>) -> Self {
        Self { user_id: Some(user_id.into()) }
    }

    pub fn id(&self) -> Option<&str> {
        self.user_id.as_deref()
    }

    /// The caller identifier, or `401 Unauthenticated`
    pub fn require(&self) -> Result<&str, ApiError> {
        self.id().ok_or_else(ApiError::unauthenticated)
    }
}

#[async_trait]
impl FromRequestParts<AppState> for Caller {
    type Rejection = Infallible;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, Self::Rejection> {
        Ok(Self {
            user_id: state.identity.resolve(&parts.headers),
        })
    }
}
