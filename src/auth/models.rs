//! Authentication data models

use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// Authentication origin for an account. Set at creation and kept for the
/// lifetime of the account; later logins through other providers only add
/// provider-id fields.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuthProvider {
    Local,
    Google,
    Github,
}

impl AuthProvider {
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "local" => Some(AuthProvider::Local),
            "google" => Some(AuthProvider::Google),
            "github" => Some(AuthProvider::Github),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            AuthProvider::Local => "local",
            AuthProvider::Google => "google",
            AuthProvider::Github => "github",
        }
    }

    pub fn is_external(&self) -> bool {
        !matches!(self, AuthProvider::Local)
    }
}

/// User database model. The password digest never leaves the server.
#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
pub struct User {
    pub id: String,
    pub email: String,
    pub name: Option<String>,
    pub avatar: Option<String>,
    pub provider: String,
    #[serde(skip_serializing, default)]
    pub password_digest: Option<String>,
    pub google_id: Option<String>,
    pub github_id: Option<String>,
    pub is_verified: i64,
    pub created_at: Option<String>,
    pub updated_at: Option<String>,
}

/// Profile supplied by an external identity provider after code exchange.
#[derive(Debug, Clone)]
pub struct ExternalProfile {
    pub external_id: String,
    pub email: String,
    pub name: Option<String>,
    pub avatar: Option<String>,
}

/// POST /api/auth/register body
#[derive(Debug, Deserialize)]
pub struct RegisterRequest {
    pub email: String,
    pub password: String,
    pub name: Option<String>,
}

/// POST /api/auth/login body
#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}
