// src/services/session.rs
//! Session issuance.
//!
//! Orchestrates the identity resolver, token codec, and refresh token store
//! over one authentication event: resolve the user, mint an access/refresh
//! token pair, persist the refresh token, and hand the pair back. Also
//! processes refresh and revocation requests. All operations are single-shot
//! against the store and resolver; nothing is retried here.

use std::sync::Arc;
use thiserror::Error;
use tracing::{debug, info, warn};

use crate::auth::models::{AuthProvider, ExternalProfile, User};
use crate::common::safe_token_log;
use crate::services::identity::{IdentityError, IdentityService};
use crate::services::refresh_store::RefreshTokenStore;
use crate::services::tokens::{Claims, TokenCodec, TokenError};

#[derive(Debug, Error)]
pub enum SessionError {
    #[error(transparent)]
    Identity(#[from] IdentityError),

    /// Codec verification of a presented refresh token failed.
    #[error("invalid refresh token")]
    InvalidRefreshToken,

    /// The refresh token verified but is absent from (or expired in) the
    /// store.
    #[error("refresh token expired or revoked")]
    RefreshTokenNotFound,

    #[error(transparent)]
    Token(#[from] TokenError),

    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),
}

/// Result of a successful authentication event. The raw refresh token is
/// handed to the cookie boundary and never returned in a JSON body.
#[derive(Debug)]
pub struct IssuedSession {
    pub user: User,
    pub access_token: String,
    pub refresh_token: String,
}

pub struct SessionService {
    identity: Arc<IdentityService>,
    store: Arc<RefreshTokenStore>,
    codec: TokenCodec,
}

impl SessionService {
    pub fn new(
        identity: Arc<IdentityService>,
        store: Arc<RefreshTokenStore>,
        codec: TokenCodec,
    ) -> Self {
        Self {
            identity,
            store,
            codec,
        }
    }

    pub async fn register(
        &self,
        email: &str,
        password: &str,
        name: Option<&str>,
    ) -> Result<IssuedSession, SessionError> {
        let user = self.identity.register_local(email, password, name).await?;
        self.issue(user).await
    }

    pub async fn login(&self, email: &str, password: &str) -> Result<IssuedSession, SessionError> {
        let user = self.identity.resolve_local(email, password).await?;
        self.issue(user).await
    }

    pub async fn login_external(
        &self,
        provider: AuthProvider,
        profile: &ExternalProfile,
    ) -> Result<IssuedSession, SessionError> {
        let user = self.identity.resolve_external(provider, profile).await?;
        self.issue(user).await
    }

    async fn issue(&self, user: User) -> Result<IssuedSession, SessionError> {
        let access_token = self.codec.sign_access(&user.id, &user.email)?;
        let refresh_token = self.codec.sign_refresh(&user.id, &user.email)?;
        self.store.save(&user.id, &refresh_token).await?;

        debug!(user_id = %user.id, "Issued session token pair");

        Ok(IssuedSession {
            user,
            access_token,
            refresh_token,
        })
    }

    /// Mint a new access token for a presented refresh token. The refresh
    /// token itself is not rotated; repeated use is allowed until it is
    /// explicitly revoked or naturally expires.
    pub async fn refresh(&self, refresh_token: &str) -> Result<String, SessionError> {
        let claims = self.codec.verify_refresh(refresh_token).map_err(|e| {
            warn!(
                error = %e,
                token = %safe_token_log(refresh_token),
                "Refresh token failed verification"
            );
            SessionError::InvalidRefreshToken
        })?;

        self.store
            .find(refresh_token)
            .await?
            .ok_or(SessionError::RefreshTokenNotFound)?;

        debug!(user_id = %claims.sub, "Minted fresh access token");
        Ok(self.codec.sign_access(&claims.sub, &claims.email)?)
    }

    /// Revoke one refresh token (single-device logout). Idempotent.
    pub async fn logout(&self, refresh_token: &str) -> Result<(), SessionError> {
        self.store.delete_by_token(refresh_token).await?;
        Ok(())
    }

    /// Revoke every refresh token owned by the user (all devices).
    pub async fn logout_all(&self, user_id: &str) -> Result<(), SessionError> {
        self.store.delete_all_for_user(user_id).await?;
        info!(user_id = %user_id, "Revoked all refresh tokens for user");
        Ok(())
    }

    pub fn verify_access(&self, token: &str) -> Result<Claims, TokenError> {
        self.codec.verify_access(token)
    }
}
