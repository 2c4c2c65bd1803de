// src/services/identity.rs
//! Identity resolution.
//!
//! Maps a local credential pair or an external-provider profile to a single
//! canonical user record. `email` is the join key across local and all
//! external identities: a user who registers locally and later signs in with
//! Google on the same address resolves to one record, not two.

use sqlx::SqlitePool;
use thiserror::Error;
use tracing::{debug, info, warn};

use crate::auth::models::{AuthProvider, ExternalProfile, User};
use crate::common::{generate_user_id, safe_email_log};
use crate::services::password::{self, PasswordError};

#[derive(Debug, Error)]
pub enum IdentityError {
    /// Unknown email, provider-only account, and wrong password all map
    /// here; callers must not be able to tell them apart.
    #[error("invalid email or password")]
    InvalidCredentials,

    #[error("an account with this email already exists")]
    DuplicateAccount,

    #[error("user not found")]
    UserNotFound,

    #[error("provider does not supply external identities")]
    NotExternal,

    #[error(transparent)]
    Password(#[from] PasswordError),

    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),
}

#[derive(Debug, Clone)]
pub struct IdentityService {
    db: SqlitePool,
}

impl IdentityService {
    pub fn new(db: SqlitePool) -> Self {
        Self { db }
    }

    pub async fn get_by_id(&self, id: &str) -> Result<Option<User>, IdentityError> {
        let user = sqlx::query_as::<_, User>("SELECT * FROM users WHERE id = ?")
            .bind(id)
            .fetch_optional(&self.db)
            .await?;
        Ok(user)
    }

    pub async fn get_by_email(&self, email: &str) -> Result<Option<User>, IdentityError> {
        let normalized = normalize_email(email);
        let user = sqlx::query_as::<_, User>("SELECT * FROM users WHERE email = ?")
            .bind(&normalized)
            .fetch_optional(&self.db)
            .await?;
        Ok(user)
    }

    /// Create a local account. Registrations are created verified; no email
    /// verification step exists.
    pub async fn register_local(
        &self,
        email: &str,
        password: &str,
        name: Option<&str>,
    ) -> Result<User, IdentityError> {
        let normalized = normalize_email(email);

        if self.get_by_email(&normalized).await?.is_some() {
            warn!(
                email = %safe_email_log(&normalized),
                "Registration rejected: email already registered"
            );
            return Err(IdentityError::DuplicateAccount);
        }

        let digest = password::hash_password(password)?;
        self.insert_local(&normalized, &digest, name).await
    }

    /// Insert a local account row. The pre-check in [`register_local`] races
    /// against concurrent registrations; the `users.email` UNIQUE constraint
    /// is the authority, and losing to it is a duplicate, not a storage
    /// failure.
    async fn insert_local(
        &self,
        email: &str,
        digest: &str,
        name: Option<&str>,
    ) -> Result<User, IdentityError> {
        let id = generate_user_id();

        let inserted = sqlx::query(
            "INSERT INTO users (id, email, name, provider, password_digest, is_verified) VALUES (?, ?, ?, 'local', ?, 1)",
        )
        .bind(&id)
        .bind(email)
        .bind(name)
        .bind(digest)
        .execute(&self.db)
        .await;

        if let Err(e) = inserted {
            if matches!(&e, sqlx::Error::Database(db) if db.is_unique_violation()) {
                warn!(
                    email = %safe_email_log(email),
                    "Registration lost a race: email already registered"
                );
                return Err(IdentityError::DuplicateAccount);
            }
            return Err(e.into());
        }

        info!(
            user_id = %id,
            email = %safe_email_log(email),
            "Created local account"
        );

        self.get_by_id(&id).await?.ok_or(IdentityError::UserNotFound)
    }

    /// Resolve a local credential pair to a user.
    pub async fn resolve_local(&self, email: &str, password: &str) -> Result<User, IdentityError> {
        let user = self
            .get_by_email(email)
            .await?
            .ok_or(IdentityError::InvalidCredentials)?;

        // Provider-only accounts have no digest and cannot log in locally.
        let digest = user
            .password_digest
            .as_deref()
            .ok_or(IdentityError::InvalidCredentials)?;

        if !password::verify_password(password, digest) {
            warn!(email = %safe_email_log(email), "Password check failed");
            return Err(IdentityError::InvalidCredentials);
        }

        debug!(user_id = %user.id, "Resolved local credentials");
        Ok(user)
    }

    /// Resolve an external-provider profile to a user, creating or updating
    /// the record as needed. Existing accounts get the provider-id and
    /// avatar backfilled when newly supplied; `provider`, `name`, and other
    /// providers' ids are never overwritten.
    pub async fn resolve_external(
        &self,
        provider: AuthProvider,
        profile: &ExternalProfile,
    ) -> Result<User, IdentityError> {
        let column = match provider {
            AuthProvider::Google => "google_id",
            AuthProvider::Github => "github_id",
            AuthProvider::Local => return Err(IdentityError::NotExternal),
        };
        let normalized = normalize_email(&profile.email);

        match self.get_by_email(&normalized).await? {
            Some(existing) => {
                let sql = format!(
                    "UPDATE users SET {col} = COALESCE({col}, ?), avatar = COALESCE(avatar, ?), updated_at = datetime('now') WHERE id = ?",
                    col = column
                );
                sqlx::query(&sql)
                    .bind(&profile.external_id)
                    .bind(profile.avatar.as_deref())
                    .bind(&existing.id)
                    .execute(&self.db)
                    .await?;

                debug!(
                    user_id = %existing.id,
                    provider = provider.as_str(),
                    "Linked external identity to existing account"
                );

                self.get_by_id(&existing.id)
                    .await?
                    .ok_or(IdentityError::UserNotFound)
            }
            None => {
                let id = generate_user_id();
                let sql = format!(
                    "INSERT INTO users (id, email, name, avatar, provider, {col}, is_verified) VALUES (?, ?, ?, ?, ?, ?, 1)",
                    col = column
                );
                sqlx::query(&sql)
                    .bind(&id)
                    .bind(&normalized)
                    .bind(profile.name.as_deref())
                    .bind(profile.avatar.as_deref())
                    .bind(provider.as_str())
                    .bind(&profile.external_id)
                    .execute(&self.db)
                    .await?;

                info!(
                    user_id = %id,
                    provider = provider.as_str(),
                    email = %safe_email_log(&normalized),
                    "Created account via external provider"
                );

                self.get_by_id(&id).await?.ok_or(IdentityError::UserNotFound)
            }
        }
    }
}

fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}
