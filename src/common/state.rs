// Application state shared across all modules

use std::sync::Arc;

use crate::services::{IdentityService, OAuthClient, SessionService};

/// Application state containing services and configuration
#[derive(Clone)]
pub struct AppState {
    pub frontend_url: String,
    pub cookie_secure: bool,
    pub identity: Arc<IdentityService>,
    pub session: Arc<SessionService>,
    pub oauth: Arc<OAuthClient>,
}
