// src/auth/routes.rs
//! Route table for the authentication endpoints.

use axum::{
    routing::{get, post},
    Router,
};

use super::handlers::{
    login_handler, logout_all_handler, logout_handler, me_handler, oauth_callback, oauth_start,
    refresh_handler, register_handler,
};

pub fn auth_routes() -> Router {
    Router::new()
        .route("/api/auth/register", post(register_handler))
        .route("/api/auth/login", post(login_handler))
        .route("/api/auth/refresh", post(refresh_handler))
        .route("/api/auth/logout", post(logout_handler))
        .route("/api/auth/logout-all", post(logout_all_handler))
        .route("/api/me", get(me_handler))
        .route("/auth/:provider", get(oauth_start))
        .route("/auth/:provider/callback", get(oauth_callback))
}
