// src/services/mod.rs
//
// Core authentication services: token codec, refresh token store, identity
// resolution, session issuance, and external provider clients.

pub mod identity;
pub mod oauth;
pub mod password;
pub mod refresh_store;
pub mod session;
pub mod tokens;

// Re-export commonly used types for convenience
pub use identity::IdentityService;
pub use oauth::OAuthClient;
pub use refresh_store::RefreshTokenStore;
pub use session::SessionService;
pub use tokens::TokenCodec;
