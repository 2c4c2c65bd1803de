// src/auth/cookies.rs
//! Cookie builders for the refresh token and the OAuth state nonce.

use axum_extra::extract::cookie::{Cookie, SameSite};
use time::Duration;

use crate::services::tokens::REFRESH_TOKEN_TTL_DAYS;

pub const REFRESH_COOKIE_NAME: &str = "refresh_token";
pub const OAUTH_STATE_COOKIE_NAME: &str = "__auth_oauth_state";

/// Build the HttpOnly refresh token cookie. Lifetime matches the stored
/// token's expiry so the browser drops it around the same time the store
/// stops honoring it.
pub fn refresh_cookie(token: &str, secure: bool) -> Cookie<'static> {
    Cookie::build((REFRESH_COOKIE_NAME, token.to_string()))
        .http_only(true)
        .secure(secure)
        .same_site(SameSite::Strict)
        .path("/")
        .max_age(Duration::days(REFRESH_TOKEN_TTL_DAYS))
        .build()
}

/// Expire the refresh token cookie immediately.
pub fn clear_refresh_cookie(secure: bool) -> Cookie<'static> {
    Cookie::build((REFRESH_COOKIE_NAME, ""))
        .http_only(true)
        .secure(secure)
        .same_site(SameSite::Strict)
        .path("/")
        .max_age(Duration::ZERO)
        .build()
}

/// Short-lived CSRF nonce for the OAuth redirect flow. Lax so the provider's
/// cross-site redirect back to the callback still carries it.
pub fn oauth_state_cookie(state: &str, secure: bool) -> Cookie<'static> {
    Cookie::build((OAUTH_STATE_COOKIE_NAME, state.to_string()))
        .http_only(true)
        .secure(secure)
        .same_site(SameSite::Lax)
        .path("/auth")
        .max_age(Duration::minutes(5))
        .build()
}

pub fn clear_oauth_state_cookie(secure: bool) -> Cookie<'static> {
    Cookie::build((OAUTH_STATE_COOKIE_NAME, ""))
        .http_only(true)
        .secure(secure)
        .same_site(SameSite::Lax)
        .path("/auth")
        .max_age(Duration::ZERO)
        .build()
}
