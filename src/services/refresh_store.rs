// src/services/refresh_store.rs
//! Refresh token persistence.
//!
//! Tokens are keyed by their raw signed value. Expired rows read as absent
//! but are not proactively deleted; they stay in the table until explicitly
//! revoked.

use chrono::{Duration, Utc};
use sqlx::{FromRow, SqlitePool};
use tracing::debug;

use crate::common::{generate_token_id, safe_token_log};
use crate::services::tokens::REFRESH_TOKEN_TTL_DAYS;

/// A persisted refresh token record granting the bearer access-token
/// renewals until expiry or revocation.
#[derive(Debug, Clone, FromRow)]
pub struct StoredRefreshToken {
    pub id: String,
    pub user_id: String,
    pub token: String,
    pub created_at: i64,
    pub expires_at: i64,
}

#[derive(Debug, Clone)]
pub struct RefreshTokenStore {
    db: SqlitePool,
}

impl RefreshTokenStore {
    pub fn new(db: SqlitePool) -> Self {
        Self { db }
    }

    /// Persist a newly issued refresh token. Expiry is fixed at issuance
    /// time plus the refresh TTL.
    pub async fn save(
        &self,
        user_id: &str,
        token: &str,
    ) -> Result<StoredRefreshToken, sqlx::Error> {
        let now = Utc::now();
        let record = StoredRefreshToken {
            id: generate_token_id(),
            user_id: user_id.to_string(),
            token: token.to_string(),
            created_at: now.timestamp(),
            expires_at: (now + Duration::days(REFRESH_TOKEN_TTL_DAYS)).timestamp(),
        };

        sqlx::query(
            "INSERT INTO refresh_tokens (id, user_id, token, created_at, expires_at) VALUES (?, ?, ?, ?, ?)",
        )
        .bind(&record.id)
        .bind(&record.user_id)
        .bind(&record.token)
        .bind(record.created_at)
        .bind(record.expires_at)
        .execute(&self.db)
        .await?;

        debug!(
            record_id = %record.id,
            user_id = %user_id,
            token = %safe_token_log(token),
            "Stored refresh token"
        );

        Ok(record)
    }

    /// Look up a refresh token by its raw value. Returns `None` both when no
    /// record exists and when a record exists but has expired.
    pub async fn find(&self, token: &str) -> Result<Option<StoredRefreshToken>, sqlx::Error> {
        let row: Option<StoredRefreshToken> =
            sqlx::query_as("SELECT * FROM refresh_tokens WHERE token = ?")
                .bind(token)
                .fetch_optional(&self.db)
                .await?;

        Ok(row.filter(|r| r.expires_at > Utc::now().timestamp()))
    }

    /// Delete a single refresh token. Deleting an absent token is not an
    /// error.
    pub async fn delete_by_token(&self, token: &str) -> Result<(), sqlx::Error> {
        sqlx::query("DELETE FROM refresh_tokens WHERE token = ?")
            .bind(token)
            .execute(&self.db)
            .await?;
        debug!(token = %safe_token_log(token), "Deleted refresh token");
        Ok(())
    }

    /// Delete every refresh token owned by a user.
    pub async fn delete_all_for_user(&self, user_id: &str) -> Result<(), sqlx::Error> {
        let result = sqlx::query("DELETE FROM refresh_tokens WHERE user_id = ?")
            .bind(user_id)
            .execute(&self.db)
            .await?;
        debug!(
            user_id = %user_id,
            deleted = result.rows_affected(),
            "Deleted all refresh tokens for user"
        );
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::common::migrations::run_migrations;
    use sqlx::sqlite::SqlitePoolOptions;

    async fn setup_test_db() -> SqlitePool {
        let pool = SqlitePoolOptions::new()
            .connect("sqlite::memory:")
            .await
            .unwrap();
        run_migrations(&pool).await.unwrap();
        pool
    }

    #[tokio::test]
    async fn test_save_then_find() {
        let store = RefreshTokenStore::new(setup_test_db().await);

        let record = store.save("U_AAAAAA", "token-1").await.unwrap();
        assert!(record.id.starts_with("K_"));
        assert!(record.expires_at > record.created_at);

        let found = store.find("token-1").await.unwrap().unwrap();
        assert_eq!(found.user_id, "U_AAAAAA");
        assert_eq!(found.token, "token-1");
    }

    #[tokio::test]
    async fn test_find_unknown_token_is_none() {
        let store = RefreshTokenStore::new(setup_test_db().await);
        assert!(store.find("no-such-token").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_expired_token_reads_as_absent_but_row_remains() {
        let pool = setup_test_db().await;
        let store = RefreshTokenStore::new(pool.clone());

        let past = Utc::now().timestamp() - 60;
        sqlx::query(
            "INSERT INTO refresh_tokens (id, user_id, token, created_at, expires_at) VALUES (?, ?, ?, ?, ?)",
        )
        .bind("K_EXPIRD")
        .bind("U_AAAAAA")
        .bind("stale-token")
        .bind(past - 1000)
        .bind(past)
        .execute(&pool)
        .await
        .unwrap();

        assert!(store.find("stale-token").await.unwrap().is_none());

        // The stale row is not proactively deleted.
        let (count,): (i64,) =
            sqlx::query_as("SELECT COUNT(*) FROM refresh_tokens WHERE token = 'stale-token'")
                .fetch_one(&pool)
                .await
                .unwrap();
        assert_eq!(count, 1);
    }

    #[tokio::test]
    async fn test_delete_by_token_is_idempotent() {
        let store = RefreshTokenStore::new(setup_test_db().await);

        store.save("U_AAAAAA", "token-1").await.unwrap();
        store.delete_by_token("token-1").await.unwrap();
        assert!(store.find("token-1").await.unwrap().is_none());

        // Deleting again is not an error.
        store.delete_by_token("token-1").await.unwrap();
    }

    #[tokio::test]
    async fn test_delete_all_for_user_leaves_other_users_untouched() {
        let store = RefreshTokenStore::new(setup_test_db().await);

        store.save("U_AAAAAA", "a-1").await.unwrap();
        store.save("U_AAAAAA", "a-2").await.unwrap();
        store.save("U_BBBBBB", "b-1").await.unwrap();

        store.delete_all_for_user("U_AAAAAA").await.unwrap();

        assert!(store.find("a-1").await.unwrap().is_none());
        assert!(store.find("a-2").await.unwrap().is_none());
        assert!(store.find("b-1").await.unwrap().is_some());
    }

    #[tokio::test]
    async fn test_multiple_concurrent_tokens_per_user() {
        let store = RefreshTokenStore::new(setup_test_db().await);

        store.save("U_AAAAAA", "device-1").await.unwrap();
        store.save("U_AAAAAA", "device-2").await.unwrap();

        assert!(store.find("device-1").await.unwrap().is_some());
        assert!(store.find("device-2").await.unwrap().is_some());
    }
}
