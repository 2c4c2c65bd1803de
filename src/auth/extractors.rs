// src/auth/extractors.rs
//! Request extractor for bearer-authenticated endpoints.

use async_trait::async_trait;
use axum::{
    extract::FromRequestParts,
    http::{header::AUTHORIZATION, request::Parts},
    Extension,
};
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::debug;

use crate::common::{ApiError, AppState};

/// Identity extracted from a verified access token. Claims-only: no database
/// read happens here, so a deleted user keeps passing until the token
/// expires.
#[derive(Debug, Clone)]
pub struct AuthedUser {
    pub id: String,
    pub email: String,
}

#[async_trait]
impl<S> FromRequestParts<S> for AuthedUser
where
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let Extension(app_state): Extension<Arc<RwLock<AppState>>> =
            Extension::from_request_parts(parts, state)
                .await
                .map_err(|_| ApiError::InternalServer("missing application state".to_string()))?;

        let token = parts
            .headers
            .get(AUTHORIZATION)
            .and_then(|value| value.to_str().ok())
            .and_then(|value| value.strip_prefix("Bearer "))
            .ok_or(ApiError::Unauthorized(
                "missing or malformed authorization header".to_string(),
            ))?;

        let claims = {
            let state = app_state.read().await;
            state.session.verify_access(token).map_err(|e| {
                debug!(error = %e, "Access token rejected");
                ApiError::Unauthorized("invalid or expired access token".to_string())
            })?
        };

        Ok(AuthedUser {
            id: claims.sub,
            email: claims.email,
        })
    }
}
