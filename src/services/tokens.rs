// src/services/tokens.rs
//! Signed, expiring token codec.
//!
//! Access and refresh tokens are two independently-keyed instances of the
//! same HS256 codec: possession of one kind of signing material cannot be
//! used to forge the other. TTLs are fixed policy constants, not
//! configurable per call.

use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::common::generate_raw_id;

pub const TOKEN_ISSUER: &str = "secure-auth-app";
pub const TOKEN_AUDIENCE: &str = "secure-auth-client";

/// Access tokens live 15 minutes; their short lifetime is the only
/// mitigation against misuse after compromise.
pub const ACCESS_TOKEN_TTL_MINUTES: i64 = 15;
/// Refresh tokens live 7 days from issuance.
pub const REFRESH_TOKEN_TTL_DAYS: i64 = 7;

#[derive(Debug, Error)]
pub enum TokenError {
    #[error("token signing failed: {0}")]
    Signing(jsonwebtoken::errors::Error),
    #[error("invalid token: {0}")]
    Invalid(jsonwebtoken::errors::Error),
}

/// JWT claims carried by both token kinds. `jti` holds random entropy so
/// two tokens minted in the same second still differ.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    pub sub: String,
    pub email: String,
    pub iss: String,
    pub aud: String,
    pub iat: usize,
    pub exp: usize,
    pub jti: String,
}

/// Signing secret for access tokens. A distinct type from
/// [`RefreshTokenSecret`] so the two signing materials cannot be swapped at
/// a call site.
pub struct AccessTokenSecret(String);

impl AccessTokenSecret {
    pub fn new(secret: impl Into<String>) -> Self {
        Self(secret.into())
    }
}

/// Signing secret for refresh tokens.
pub struct RefreshTokenSecret(String);

impl RefreshTokenSecret {
    pub fn new(secret: impl Into<String>) -> Self {
        Self(secret.into())
    }
}

struct KeyedCodec {
    encoding: EncodingKey,
    decoding: DecodingKey,
    ttl: Duration,
}

impl KeyedCodec {
    fn new(secret: &[u8], ttl: Duration) -> Self {
        Self {
            encoding: EncodingKey::from_secret(secret),
            decoding: DecodingKey::from_secret(secret),
            ttl,
        }
    }

    fn sign(&self, user_id: &str, email: &str) -> Result<String, TokenError> {
        let now = Utc::now();
        let claims = Claims {
            sub: user_id.to_string(),
            email: email.to_string(),
            iss: TOKEN_ISSUER.to_string(),
            aud: TOKEN_AUDIENCE.to_string(),
            iat: now.timestamp() as usize,
            exp: (now + self.ttl).timestamp() as usize,
            jti: generate_raw_id(16),
        };
        encode(&Header::new(Algorithm::HS256), &claims, &self.encoding)
            .map_err(TokenError::Signing)
    }

    fn verify(&self, token: &str) -> Result<Claims, TokenError> {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.leeway = 0;
        validation.set_issuer(&[TOKEN_ISSUER]);
        validation.set_audience(&[TOKEN_AUDIENCE]);

        decode::<Claims>(token, &self.decoding, &validation)
            .map(|data| data.claims)
            .map_err(TokenError::Invalid)
    }
}

pub struct TokenCodec {
    access: KeyedCodec,
    refresh: KeyedCodec,
}

impl TokenCodec {
    pub fn new(access: &AccessTokenSecret, refresh: &RefreshTokenSecret) -> Self {
        Self {
            access: KeyedCodec::new(
                access.0.as_bytes(),
                Duration::minutes(ACCESS_TOKEN_TTL_MINUTES),
            ),
            refresh: KeyedCodec::new(
                refresh.0.as_bytes(),
                Duration::days(REFRESH_TOKEN_TTL_DAYS),
            ),
        }
    }

    pub fn sign_access(&self, user_id: &str, email: &str) -> Result<String, TokenError> {
        self.access.sign(user_id, email)
    }

    pub fn verify_access(&self, token: &str) -> Result<Claims, TokenError> {
        self.access.verify(token)
    }

    pub fn sign_refresh(&self, user_id: &str, email: &str) -> Result<String, TokenError> {
        self.refresh.sign(user_id, email)
    }

    pub fn verify_refresh(&self, token: &str) -> Result<Claims, TokenError> {
        self.refresh.verify(token)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_codec() -> TokenCodec {
        TokenCodec::new(
            &AccessTokenSecret::new("test_access_secret"),
            &RefreshTokenSecret::new("test_refresh_secret"),
        )
    }

    #[test]
    fn test_access_token_roundtrip() {
        let codec = test_codec();
        let token = codec.sign_access("U_ABC123", "test@example.com").unwrap();
        let claims = codec.verify_access(&token).unwrap();

        assert_eq!(claims.sub, "U_ABC123");
        assert_eq!(claims.email, "test@example.com");
        assert_eq!(claims.iss, TOKEN_ISSUER);
        assert_eq!(claims.aud, TOKEN_AUDIENCE);
        assert!(claims.exp > claims.iat);
    }

    #[test]
    fn test_access_and_refresh_keys_are_independent() {
        let codec = test_codec();

        let access = codec.sign_access("U_ABC123", "test@example.com").unwrap();
        assert!(codec.verify_refresh(&access).is_err());

        let refresh = codec.sign_refresh("U_ABC123", "test@example.com").unwrap();
        assert!(codec.verify_access(&refresh).is_err());
    }

    #[test]
    fn test_verification_fails_with_wrong_secret() {
        let codec = test_codec();
        let other = TokenCodec::new(
            &AccessTokenSecret::new("some_other_secret"),
            &RefreshTokenSecret::new("test_refresh_secret"),
        );

        let token = codec.sign_access("U_ABC123", "test@example.com").unwrap();
        assert!(other.verify_access(&token).is_err());
    }

    #[test]
    fn test_expired_token_is_rejected() {
        let codec = test_codec();

        // Build an already-expired token with the correct access secret.
        let now = Utc::now();
        let claims = Claims {
            sub: "U_ABC123".to_string(),
            email: "test@example.com".to_string(),
            iss: TOKEN_ISSUER.to_string(),
            aud: TOKEN_AUDIENCE.to_string(),
            iat: (now - Duration::minutes(30)).timestamp() as usize,
            exp: (now - Duration::minutes(1)).timestamp() as usize,
            jti: "0123456789ABCDEF".to_string(),
        };
        let token = encode(
            &Header::new(Algorithm::HS256),
            &claims,
            &EncodingKey::from_secret(b"test_access_secret"),
        )
        .unwrap();

        assert!(codec.verify_access(&token).is_err());
    }

    #[test]
    fn test_wrong_issuer_or_audience_is_rejected() {
        let codec = test_codec();
        let now = Utc::now();

        for (iss, aud) in [
            ("someone-else", TOKEN_AUDIENCE),
            (TOKEN_ISSUER, "someone-else"),
        ] {
            let claims = Claims {
                sub: "U_ABC123".to_string(),
                email: "test@example.com".to_string(),
                iss: iss.to_string(),
                aud: aud.to_string(),
                iat: now.timestamp() as usize,
                exp: (now + Duration::minutes(5)).timestamp() as usize,
                jti: "0123456789ABCDEF".to_string(),
            };
            let token = encode(
                &Header::new(Algorithm::HS256),
                &claims,
                &EncodingKey::from_secret(b"test_access_secret"),
            )
            .unwrap();

            assert!(codec.verify_access(&token).is_err());
        }
    }

    #[test]
    fn test_same_second_mints_differ() {
        let codec = test_codec();
        let a = codec.sign_access("U_ABC123", "test@example.com").unwrap();
        let b = codec.sign_access("U_ABC123", "test@example.com").unwrap();
        assert_ne!(a, b);
    }
}
