// src/main.rs
use axum::{extract::Extension, Router};
use dotenv::dotenv;
use reqwest::Client;
use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};
use std::env;
use std::path::PathBuf;
use std::{net::SocketAddr, str::FromStr, sync::Arc};
use tokio::{net::TcpListener, sync::RwLock};
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

mod auth;
mod common;
mod services;

use common::AppState;
use services::oauth::ProviderConfig;
use services::tokens::{AccessTokenSecret, RefreshTokenSecret};
use services::{IdentityService, OAuthClient, RefreshTokenStore, SessionService, TokenCodec};

/// Read one provider's OAuth credentials from `{PREFIX}_CLIENT_ID` /
/// `{PREFIX}_CLIENT_SECRET`. The provider stays disabled when either is
/// absent.
fn provider_config_from_env(prefix: &str, base_url: &str, provider: &str) -> Option<ProviderConfig> {
    let client_id = env::var(format!("{}_CLIENT_ID", prefix)).ok()?;
    let client_secret = env::var(format!("{}_CLIENT_SECRET", prefix)).ok()?;
    let redirect_uri = env::var(format!("{}_REDIRECT_URI", prefix))
        .unwrap_or_else(|_| format!("{}/auth/{}/callback", base_url, provider));

    Some(ProviderConfig {
        client_id,
        client_secret,
        redirect_uri,
    })
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_target(false)
        .init();

    // ========================================================================
    // ENVIRONMENT CONFIGURATION
    // ========================================================================

    let database_url =
        env::var("DATABASE_URL").unwrap_or_else(|_| "sqlite://auth.db".to_string());
    let access_secret = AccessTokenSecret::new(
        env::var("ACCESS_TOKEN_SECRET")
            .unwrap_or_else(|_| "replace_with_strong_access_secret".to_string()),
    );
    let refresh_secret = RefreshTokenSecret::new(
        env::var("REFRESH_TOKEN_SECRET")
            .unwrap_or_else(|_| "replace_with_strong_refresh_secret".to_string()),
    );
    let frontend_url =
        env::var("FRONTEND_URL").unwrap_or_else(|_| "http://localhost:3000".to_string());
    let base_url = env::var("BASE_URL").unwrap_or_else(|_| "http://localhost:8080".to_string());
    let cookie_secure = env::var("APP_ENV").map(|v| v == "production").unwrap_or(false);

    // ========================================================================
    // DATABASE SETUP
    // ========================================================================

    if let Some(path_part) = database_url.strip_prefix("sqlite://") {
        let path_without_params = path_part.split('?').next().unwrap_or("");
        if !path_without_params.is_empty() && !path_without_params.starts_with(':') {
            let db_path = PathBuf::from(path_without_params);
            if let Some(parent) = db_path.parent() {
                if !parent.as_os_str().is_empty() {
                    tokio::fs::create_dir_all(parent).await?;
                }
            }
        }
    }

    let connect_options = SqliteConnectOptions::from_str(&database_url)?.create_if_missing(true);
    let pool = SqlitePoolOptions::new()
        .connect_with(connect_options)
        .await?;

    common::migrations::run_migrations(&pool).await?;

    // ========================================================================
    // SERVICE INITIALIZATION
    // ========================================================================

    let http_client = Client::builder().no_proxy().build()?;

    let identity = Arc::new(IdentityService::new(pool.clone()));
    info!("IdentityService initialized");

    let store = Arc::new(RefreshTokenStore::new(pool));
    info!("RefreshTokenStore initialized");

    let codec = TokenCodec::new(&access_secret, &refresh_secret);
    let session = Arc::new(SessionService::new(identity.clone(), store, codec));
    info!("SessionService initialized");

    let google = provider_config_from_env("GOOGLE", &base_url, "google");
    let github = provider_config_from_env("GITHUB", &base_url, "github");
    if google.is_none() {
        warn!("Google OAuth credentials not set; Google login disabled");
    }
    if github.is_none() {
        warn!("GitHub OAuth credentials not set; GitHub login disabled");
    }
    let oauth = Arc::new(OAuthClient::new(http_client, google, github));
    info!("OAuthClient initialized");

    // ========================================================================
    // APPLICATION STATE
    // ========================================================================

    let app_state = AppState {
        frontend_url,
        cookie_secure,
        identity,
        session,
        oauth,
    };

    let shared = Arc::new(RwLock::new(app_state));

    // ========================================================================
    // ROUTER COMPOSITION
    // ========================================================================

    let app = Router::new()
        .merge(auth::auth_routes())
        .layer(Extension(shared))
        .layer({
            let cors_origins = env::var("CORS_ORIGINS")
                .unwrap_or_else(|_| "http://localhost:3000,http://localhost:5173".to_string());

            let origins: Vec<axum::http::HeaderValue> = cors_origins
                .split(',')
                .filter_map(|origin| origin.trim().parse().ok())
                .collect();

            CorsLayer::new()
                .allow_origin(origins)
                .allow_methods([
                    axum::http::Method::GET,
                    axum::http::Method::POST,
                    axum::http::Method::OPTIONS,
                ])
                .allow_headers([
                    axum::http::header::CONTENT_TYPE,
                    axum::http::header::AUTHORIZATION,
                ])
                .allow_credentials(true)
        })
        .layer(TraceLayer::new_for_http());

    // ========================================================================
    // SERVER STARTUP
    // ========================================================================

    let port = env::var("PORT")
        .ok()
        .and_then(|p| p.parse::<u16>().ok())
        .unwrap_or(8080);

    let addr = SocketAddr::from(([0, 0, 0, 0], port));
    info!("Listening on {}", addr);
    let listener = TcpListener::bind(addr).await?;
    axum::serve(listener, app.into_make_service()).await?;

    Ok(())
}
