// src/auth/handlers.rs
//! HTTP handlers for registration, login, token refresh, logout, and the
//! OAuth redirect flow.

use axum::{
    extract::{Path, Query},
    http::StatusCode,
    response::Redirect,
    Extension, Json,
};
use axum_extra::extract::CookieJar;
use serde::Deserialize;
use serde_json::json;
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::{error, info, warn};

use crate::auth::cookies::{
    clear_oauth_state_cookie, clear_refresh_cookie, oauth_state_cookie, refresh_cookie,
    OAUTH_STATE_COOKIE_NAME, REFRESH_COOKIE_NAME,
};
use crate::auth::extractors::AuthedUser;
use crate::auth::models::{AuthProvider, LoginRequest, RegisterRequest, User};
use crate::auth::validators::{LoginValidator, RegisterValidator};
use crate::common::{generate_raw_id, safe_email_log, ApiError, AppState, Validator};
use crate::services::session::IssuedSession;

type SharedState = Arc<RwLock<AppState>>;

fn session_response(user: &User, access_token: &str, message: &str) -> Json<serde_json::Value> {
    Json(json!({
        "message": message,
        "user": user,
        "accessToken": access_token,
    }))
}

/// POST /api/auth/register
pub async fn register_handler(
    Extension(state): Extension<SharedState>,
    jar: CookieJar,
    Json(payload): Json<RegisterRequest>,
) -> Result<(StatusCode, CookieJar, Json<serde_json::Value>), ApiError> {
    let validation = RegisterValidator.validate(&payload);
    if !validation.is_valid() {
        return Err(validation.into());
    }

    let state = state.read().await;
    let issued = state
        .session
        .register(&payload.email, &payload.password, payload.name.as_deref())
        .await?;

    info!(
        user_id = %issued.user.id,
        email = %safe_email_log(&issued.user.email),
        "User registered"
    );

    let jar = jar.add(refresh_cookie(&issued.refresh_token, state.cookie_secure));
    Ok((
        StatusCode::CREATED,
        jar,
        session_response(&issued.user, &issued.access_token, "Registration successful"),
    ))
}

/// POST /api/auth/login
pub async fn login_handler(
    Extension(state): Extension<SharedState>,
    jar: CookieJar,
    Json(payload): Json<LoginRequest>,
) -> Result<(CookieJar, Json<serde_json::Value>), ApiError> {
    let validation = LoginValidator.validate(&payload);
    if !validation.is_valid() {
        return Err(validation.into());
    }

    let state = state.read().await;
    let issued = state
        .session
        .login(&payload.email, &payload.password)
        .await?;

    info!(user_id = %issued.user.id, "User logged in");

    let jar = jar.add(refresh_cookie(&issued.refresh_token, state.cookie_secure));
    Ok((
        jar,
        session_response(&issued.user, &issued.access_token, "Login successful"),
    ))
}

/// POST /api/auth/refresh
///
/// Reads the refresh cookie and returns a fresh access token. The refresh
/// token is not rotated; the cookie is left as-is.
pub async fn refresh_handler(
    Extension(state): Extension<SharedState>,
    jar: CookieJar,
) -> Result<Json<serde_json::Value>, ApiError> {
    let refresh_token = jar
        .get(REFRESH_COOKIE_NAME)
        .map(|c| c.value().to_string())
        .ok_or(ApiError::Unauthorized(
            "missing refresh token cookie".to_string(),
        ))?;

    let state = state.read().await;
    let access_token = state.session.refresh(&refresh_token).await?;

    Ok(Json(json!({ "accessToken": access_token })))
}

/// POST /api/auth/logout
///
/// Revokes the refresh token named by the cookie, if any, and clears the
/// cookie either way.
pub async fn logout_handler(
    Extension(state): Extension<SharedState>,
    jar: CookieJar,
) -> Result<(CookieJar, Json<serde_json::Value>), ApiError> {
    let state = state.read().await;

    if let Some(cookie) = jar.get(REFRESH_COOKIE_NAME) {
        state.session.logout(cookie.value()).await?;
    }

    let jar = jar.add(clear_refresh_cookie(state.cookie_secure));
    Ok((jar, Json(json!({ "message": "Logout successful" }))))
}

/// POST /api/auth/logout-all
///
/// Requires a valid access token; revokes every refresh token the user owns.
pub async fn logout_all_handler(
    Extension(state): Extension<SharedState>,
    user: AuthedUser,
    jar: CookieJar,
) -> Result<(CookieJar, Json<serde_json::Value>), ApiError> {
    let state = state.read().await;
    state.session.logout_all(&user.id).await?;

    let jar = jar.add(clear_refresh_cookie(state.cookie_secure));
    Ok((
        jar,
        Json(json!({ "message": "Logged out of all sessions" })),
    ))
}

/// GET /api/me
pub async fn me_handler(
    Extension(state): Extension<SharedState>,
    user: AuthedUser,
) -> Result<Json<serde_json::Value>, ApiError> {
    let state = state.read().await;
    let record = state
        .identity
        .get_by_id(&user.id)
        .await?
        .ok_or(ApiError::NotFound("user not found".to_string()))?;

    Ok(Json(json!({ "user": record })))
}

fn parse_external_provider(provider: &str) -> Result<AuthProvider, ApiError> {
    AuthProvider::parse(provider)
        .filter(AuthProvider::is_external)
        .ok_or(ApiError::NotFound(format!(
            "unknown provider: {}",
            provider
        )))
}

/// GET /auth/:provider
///
/// Starts the OAuth redirect flow: mints a state nonce, pins it in a
/// short-lived cookie, and redirects to the provider's consent page.
pub async fn oauth_start(
    Extension(state): Extension<SharedState>,
    Path(provider): Path<String>,
    jar: CookieJar,
) -> Result<(CookieJar, Redirect), ApiError> {
    let provider = parse_external_provider(&provider)?;

    let state = state.read().await;
    let nonce = generate_raw_id(24);
    let url = state
        .oauth
        .authorization_url(provider, &nonce)
        .map_err(|e| {
            warn!(error = %e, provider = provider.as_str(), "OAuth start failed");
            ApiError::NotFound(format!("{} login is not available", provider.as_str()))
        })?;

    let jar = jar.add(oauth_state_cookie(&nonce, state.cookie_secure));
    Ok((jar, Redirect::temporary(&url)))
}

#[derive(Debug, Deserialize)]
pub struct OAuthCallbackQuery {
    pub code: Option<String>,
    pub state: Option<String>,
    pub error: Option<String>,
}

/// GET /auth/:provider/callback
///
/// Completes the OAuth flow. Failures never surface as API errors here; the
/// browser is mid-redirect, so everything lands back on the frontend with an
/// error query parameter.
pub async fn oauth_callback(
    Extension(state): Extension<SharedState>,
    Path(provider): Path<String>,
    Query(query): Query<OAuthCallbackQuery>,
    jar: CookieJar,
) -> Result<(CookieJar, Redirect), ApiError> {
    let provider = parse_external_provider(&provider)?;

    let state = state.read().await;
    let failure = format!("{}?error=oauth_failed", state.frontend_url);
    let jar = {
        let expected_state = jar
            .get(OAUTH_STATE_COOKIE_NAME)
            .map(|c| c.value().to_string());
        let jar = jar.add(clear_oauth_state_cookie(state.cookie_secure));

        if let Some(provider_error) = query.error {
            warn!(
                provider = provider.as_str(),
                error = %provider_error,
                "Provider returned an error"
            );
            return Ok((jar, Redirect::temporary(&failure)));
        }

        // The state cookie must exist and match the returned parameter; a
        // missing cookie on both sides is still a mismatch.
        match (expected_state.as_deref(), query.state.as_deref()) {
            (Some(expected), Some(presented)) if expected == presented => {}
            _ => {
                warn!(provider = provider.as_str(), "OAuth state mismatch");
                return Ok((jar, Redirect::temporary(&failure)));
            }
        }

        jar
    };

    let code = match query.code {
        Some(code) => code,
        None => {
            warn!(provider = provider.as_str(), "Callback missing code");
            return Ok((jar, Redirect::temporary(&failure)));
        }
    };

    let issued = match authenticate_with_provider(&state, provider, &code).await {
        Ok(issued) => issued,
        Err(e) => {
            error!(
                error = %e,
                provider = provider.as_str(),
                "OAuth authentication failed"
            );
            return Ok((jar, Redirect::temporary(&failure)));
        }
    };

    info!(
        user_id = %issued.user.id,
        provider = provider.as_str(),
        "OAuth login completed"
    );

    let jar = jar.add(refresh_cookie(&issued.refresh_token, state.cookie_secure));
    let success = format!(
        "{}?token={}",
        state.frontend_url,
        urlencoding::encode(&issued.access_token)
    );
    Ok((jar, Redirect::temporary(&success)))
}

async fn authenticate_with_provider(
    state: &AppState,
    provider: AuthProvider,
    code: &str,
) -> anyhow::Result<IssuedSession> {
    let provider_token = state.oauth.exchange_code(provider, code).await?;
    let profile = state.oauth.fetch_profile(provider, &provider_token).await?;
    let issued = state.session.login_external(provider, &profile).await?;
    Ok(issued)
}
