// src/services/oauth.rs
//! External identity provider client (Google, GitHub).
//!
//! Builds authorization URLs, exchanges callback codes for provider access
//! tokens, and fetches the user profile those tokens grant.

use reqwest::Client;
use serde::Deserialize;
use thiserror::Error;
use tracing::{debug, error};

use crate::auth::models::{AuthProvider, ExternalProfile};

const GOOGLE_AUTHORIZE_URL: &str = "https://accounts.google.com/o/oauth2/v2/auth";
const GOOGLE_TOKEN_URL: &str = "https://oauth2.googleapis.com/token";
const GOOGLE_USERINFO_URL: &str = "https://www.googleapis.com/oauth2/v2/userinfo";
const GOOGLE_SCOPE: &str = "openid email profile";

const GITHUB_AUTHORIZE_URL: &str = "https://github.com/login/oauth/authorize";
const GITHUB_TOKEN_URL: &str = "https://github.com/login/oauth/access_token";
const GITHUB_USER_URL: &str = "https://api.github.com/user";
const GITHUB_EMAILS_URL: &str = "https://api.github.com/user/emails";
const GITHUB_SCOPE: &str = "read:user user:email";

// GitHub requires a User-Agent on API calls.
const USER_AGENT: &str = "secure-auth-api";

#[derive(Debug, Error)]
pub enum OAuthError {
    #[error("{0} OAuth is not configured")]
    NotConfigured(&'static str),

    #[error("OAuth flow failed: {0}")]
    ExchangeFailed(String),

    #[error("HTTP request failed: {0}")]
    RequestFailed(String),

    #[error("provider profile missing required fields")]
    ProfileIncomplete,
}

#[derive(Debug, Clone)]
pub struct ProviderConfig {
    pub client_id: String,
    pub client_secret: String,
    pub redirect_uri: String,
}

#[derive(Debug, Clone)]
pub struct OAuthClient {
    http: Client,
    google: Option<ProviderConfig>,
    github: Option<ProviderConfig>,
}

impl OAuthClient {
    pub fn new(
        http: Client,
        google: Option<ProviderConfig>,
        github: Option<ProviderConfig>,
    ) -> Self {
        Self {
            http,
            google,
            github,
        }
    }

    fn config(&self, provider: AuthProvider) -> Result<&ProviderConfig, OAuthError> {
        match provider {
            AuthProvider::Google => self
                .google
                .as_ref()
                .ok_or(OAuthError::NotConfigured("google")),
            AuthProvider::Github => self
                .github
                .as_ref()
                .ok_or(OAuthError::NotConfigured("github")),
            AuthProvider::Local => Err(OAuthError::NotConfigured("local")),
        }
    }

    /// Build the provider authorization URL for the redirect flow.
    pub fn authorization_url(
        &self,
        provider: AuthProvider,
        state: &str,
    ) -> Result<String, OAuthError> {
        let config = self.config(provider)?;
        let (authorize_url, scope) = match provider {
            AuthProvider::Google => (GOOGLE_AUTHORIZE_URL, GOOGLE_SCOPE),
            AuthProvider::Github => (GITHUB_AUTHORIZE_URL, GITHUB_SCOPE),
            AuthProvider::Local => return Err(OAuthError::NotConfigured("local")),
        };

        let url = format!(
            "{}?client_id={}&redirect_uri={}&response_type=code&scope={}&state={}",
            authorize_url,
            urlencoding::encode(&config.client_id),
            urlencoding::encode(&config.redirect_uri),
            urlencoding::encode(scope),
            urlencoding::encode(state)
        );

        debug!(provider = provider.as_str(), "Built authorization URL");
        Ok(url)
    }

    /// Exchange an authorization code for a provider access token.
    pub async fn exchange_code(
        &self,
        provider: AuthProvider,
        code: &str,
    ) -> Result<String, OAuthError> {
        let config = self.config(provider)?;
        let token_url = match provider {
            AuthProvider::Google => GOOGLE_TOKEN_URL,
            AuthProvider::Github => GITHUB_TOKEN_URL,
            AuthProvider::Local => return Err(OAuthError::NotConfigured("local")),
        };

        let params = [
            ("code", code),
            ("client_id", config.client_id.as_str()),
            ("client_secret", config.client_secret.as_str()),
            ("redirect_uri", config.redirect_uri.as_str()),
            ("grant_type", "authorization_code"),
        ];

        debug!(provider = provider.as_str(), "Exchanging authorization code");

        let response = self
            .http
            .post(token_url)
            .header(reqwest::header::ACCEPT, "application/json")
            .form(&params)
            .send()
            .await
            .map_err(|e| OAuthError::RequestFailed(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let error_text = response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown error".to_string());
            error!(
                status = %status,
                error = %error_text,
                provider = provider.as_str(),
                "Token exchange failed"
            );
            return Err(OAuthError::ExchangeFailed(format!(
                "HTTP {}: {}",
                status, error_text
            )));
        }

        #[derive(Deserialize)]
        struct TokenResponse {
            access_token: Option<String>,
        }

        // GitHub reports some failures with a 200 body and no access_token.
        let body: TokenResponse = response
            .json()
            .await
            .map_err(|e| OAuthError::RequestFailed(e.to_string()))?;

        body.access_token.ok_or_else(|| {
            OAuthError::ExchangeFailed("no access_token in provider response".to_string())
        })
    }

    /// Fetch the user profile granted by a provider access token.
    pub async fn fetch_profile(
        &self,
        provider: AuthProvider,
        access_token: &str,
    ) -> Result<ExternalProfile, OAuthError> {
        match provider {
            AuthProvider::Google => self.fetch_google_profile(access_token).await,
            AuthProvider::Github => self.fetch_github_profile(access_token).await,
            AuthProvider::Local => Err(OAuthError::NotConfigured("local")),
        }
    }

    async fn fetch_google_profile(&self, access_token: &str) -> Result<ExternalProfile, OAuthError> {
        #[derive(Deserialize)]
        struct GoogleUserInfo {
            id: String,
            email: Option<String>,
            name: Option<String>,
            picture: Option<String>,
        }

        let response = self
            .http
            .get(GOOGLE_USERINFO_URL)
            .bearer_auth(access_token)
            .send()
            .await
            .map_err(|e| OAuthError::RequestFailed(e.to_string()))?;

        if !response.status().is_success() {
            return Err(OAuthError::RequestFailed(
                "failed to get Google user info".to_string(),
            ));
        }

        let info: GoogleUserInfo = response
            .json()
            .await
            .map_err(|e| OAuthError::RequestFailed(e.to_string()))?;

        let email = info.email.ok_or(OAuthError::ProfileIncomplete)?;

        Ok(ExternalProfile {
            external_id: info.id,
            email,
            name: info.name,
            avatar: info.picture,
        })
    }

    async fn fetch_github_profile(&self, access_token: &str) -> Result<ExternalProfile, OAuthError> {
        #[derive(Deserialize)]
        struct GithubUser {
            id: i64,
            login: String,
            name: Option<String>,
            email: Option<String>,
            avatar_url: Option<String>,
        }

        let response = self
            .http
            .get(GITHUB_USER_URL)
            .bearer_auth(access_token)
            .header(reqwest::header::USER_AGENT, USER_AGENT)
            .send()
            .await
            .map_err(|e| OAuthError::RequestFailed(e.to_string()))?;

        if !response.status().is_success() {
            return Err(OAuthError::RequestFailed(
                "failed to get GitHub user info".to_string(),
            ));
        }

        let user: GithubUser = response
            .json()
            .await
            .map_err(|e| OAuthError::RequestFailed(e.to_string()))?;

        let email = match user.email {
            Some(email) => email,
            None => self.fetch_github_primary_email(access_token).await?,
        };

        Ok(ExternalProfile {
            external_id: user.id.to_string(),
            email,
            name: user.name.or(Some(user.login)),
            avatar: user.avatar_url,
        })
    }

    /// GitHub omits the email from /user when it is private; the primary
    /// verified address is still available from /user/emails.
    async fn fetch_github_primary_email(&self, access_token: &str) -> Result<String, OAuthError> {
        #[derive(Deserialize)]
        struct GithubEmail {
            email: String,
            primary: bool,
            verified: bool,
        }

        let response = self
            .http
            .get(GITHUB_EMAILS_URL)
            .bearer_auth(access_token)
            .header(reqwest::header::USER_AGENT, USER_AGENT)
            .send()
            .await
            .map_err(|e| OAuthError::RequestFailed(e.to_string()))?;

        if !response.status().is_success() {
            return Err(OAuthError::RequestFailed(
                "failed to get GitHub user emails".to_string(),
            ));
        }

        let emails: Vec<GithubEmail> = response
            .json()
            .await
            .map_err(|e| OAuthError::RequestFailed(e.to_string()))?;

        emails
            .into_iter()
            .find(|e| e.primary && e.verified)
            .map(|e| e.email)
            .ok_or(OAuthError::ProfileIncomplete)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_client() -> OAuthClient {
        OAuthClient::new(
            Client::new(),
            Some(ProviderConfig {
                client_id: "test_google_id".to_string(),
                client_secret: "test_google_secret".to_string(),
                redirect_uri: "http://localhost:8080/auth/google/callback".to_string(),
            }),
            None,
        )
    }

    #[test]
    fn test_google_authorization_url() {
        let oauth = test_client();
        let url = oauth
            .authorization_url(AuthProvider::Google, "state-123")
            .unwrap();

        assert!(url.starts_with("https://accounts.google.com/o/oauth2/v2/auth"));
        assert!(url.contains("client_id=test_google_id"));
        assert!(url.contains("redirect_uri=http"));
        assert!(url.contains("scope="));
        assert!(url.contains("state=state-123"));
    }

    #[test]
    fn test_unconfigured_provider_is_rejected() {
        let oauth = test_client();
        let err = oauth
            .authorization_url(AuthProvider::Github, "state-123")
            .unwrap_err();
        assert!(matches!(err, OAuthError::NotConfigured("github")));
    }

    #[test]
    fn test_local_is_never_a_remote_provider() {
        let oauth = test_client();
        let err = oauth
            .authorization_url(AuthProvider::Local, "state-123")
            .unwrap_err();
        assert!(matches!(err, OAuthError::NotConfigured("local")));
    }
}
