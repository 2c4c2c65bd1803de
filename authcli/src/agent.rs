// authcli/src/agent.rs
//! Client-side session agent.
//!
//! Holds the access token in memory and leans on the HTTP client's cookie
//! store for the refresh token. When a request comes back 401, the agent
//! refreshes the access token exactly once and replays the request; a second
//! 401 is returned to the caller as-is.

use reqwest::{Client, Method, Response, StatusCode};
use serde::Serialize;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum AgentError {
    #[error("transport error: {0}")]
    Transport(#[from] reqwest::Error),

    /// The refresh attempt was rejected; the caller must log in again.
    #[error("session expired, log in again")]
    ReauthenticationRequired,
}

pub struct SessionAgent {
    http: Client,
    base_url: String,
    access_token: Option<String>,
}

impl SessionAgent {
    pub fn new(base_url: impl Into<String>) -> Result<Self, AgentError> {
        let http = Client::builder().cookie_store(true).build()?;
        Ok(Self {
            http,
            base_url: base_url.into(),
            access_token: None,
        })
    }

    pub fn access_token(&self) -> Option<&str> {
        self.access_token.as_deref()
    }

    /// POST /api/auth/register, storing the returned access token. The
    /// refresh cookie lands in the cookie store automatically.
    pub async fn register(
        &mut self,
        email: &str,
        password: &str,
        name: Option<&str>,
    ) -> Result<serde_json::Value, AgentError> {
        self.authenticate(
            "/api/auth/register",
            &serde_json::json!({ "email": email, "password": password, "name": name }),
        )
        .await
    }

    /// POST /api/auth/login, storing the returned access token.
    pub async fn login(
        &mut self,
        email: &str,
        password: &str,
    ) -> Result<serde_json::Value, AgentError> {
        self.authenticate(
            "/api/auth/login",
            &serde_json::json!({ "email": email, "password": password }),
        )
        .await
    }

    async fn authenticate(
        &mut self,
        path: &str,
        body: &serde_json::Value,
    ) -> Result<serde_json::Value, AgentError> {
        let response = self
            .http
            .post(format!("{}{}", self.base_url, path))
            .json(body)
            .send()
            .await?
            .error_for_status()?;

        let body: serde_json::Value = response.json().await?;
        self.access_token = body
            .get("accessToken")
            .and_then(|v| v.as_str())
            .map(String::from);
        Ok(body)
    }

    pub async fn get(&mut self, path: &str) -> Result<Response, AgentError> {
        self.request::<()>(Method::GET, path, None).await
    }

    pub async fn post<T: Serialize>(
        &mut self,
        path: &str,
        body: &T,
    ) -> Result<Response, AgentError> {
        self.request(Method::POST, path, Some(body)).await
    }

    /// Send a request with the current access token; on 401, refresh once
    /// and replay once. The replay's response is returned even when it is
    /// another 401.
    async fn request<T: Serialize>(
        &mut self,
        method: Method,
        path: &str,
        body: Option<&T>,
    ) -> Result<Response, AgentError> {
        let response = self.send_once(method.clone(), path, body).await?;
        if response.status() != StatusCode::UNAUTHORIZED {
            return Ok(response);
        }

        if !self.try_refresh().await? {
            self.access_token = None;
            return Err(AgentError::ReauthenticationRequired);
        }

        self.send_once(method, path, body).await
    }

    async fn send_once<T: Serialize>(
        &self,
        method: Method,
        path: &str,
        body: Option<&T>,
    ) -> Result<Response, AgentError> {
        let mut builder = self.http.request(method, format!("{}{}", self.base_url, path));
        if let Some(token) = &self.access_token {
            builder = builder.bearer_auth(token);
        }
        if let Some(body) = body {
            builder = builder.json(body);
        }
        Ok(builder.send().await?)
    }

    /// POST /api/auth/refresh; the refresh cookie rides along from the
    /// cookie store. Returns whether a new access token was obtained. A
    /// rejected refresh is a normal outcome, not a transport error.
    async fn try_refresh(&mut self) -> Result<bool, AgentError> {
        let response = self
            .http
            .post(format!("{}/api/auth/refresh", self.base_url))
            .send()
            .await?;

        if !response.status().is_success() {
            return Ok(false);
        }

        let body: serde_json::Value = response.json().await?;
        match body.get("accessToken").and_then(|v| v.as_str()) {
            Some(token) => {
                self.access_token = Some(token.to_string());
                Ok(true)
            }
            None => Ok(false),
        }
    }
}
