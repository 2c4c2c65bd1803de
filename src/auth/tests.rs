// Tests for the auth module's validators, models, and cookie builders

use super::cookies::{
    clear_refresh_cookie, oauth_state_cookie, refresh_cookie, OAUTH_STATE_COOKIE_NAME,
    REFRESH_COOKIE_NAME,
};
use super::models::{AuthProvider, LoginRequest, RegisterRequest, User};
use super::validators::{LoginValidator, RegisterValidator};
use crate::common::Validator;
use axum_extra::extract::cookie::SameSite;

fn register_request(email: &str, password: &str, name: Option<&str>) -> RegisterRequest {
    RegisterRequest {
        email: email.to_string(),
        password: password.to_string(),
        name: name.map(String::from),
    }
}

#[test]
fn test_register_validator_accepts_valid_request() {
    let result = RegisterValidator.validate(&register_request(
        "user@example.com",
        "Abc12345!",
        Some("User"),
    ));
    assert!(result.is_valid());
}

#[test]
fn test_register_validator_accepts_missing_name() {
    let result = RegisterValidator.validate(&register_request("user@example.com", "Abc12345!", None));
    assert!(result.is_valid());
}

#[test]
fn test_register_validator_rejects_bad_email() {
    for email in ["", "not-an-email", "a@b", "a b@example.com"] {
        let result = RegisterValidator.validate(&register_request(email, "Abc12345!", None));
        assert!(!result.is_valid(), "accepted bad email: {:?}", email);
        assert!(result.errors.iter().any(|e| e.field == "email"));
    }
}

#[test]
fn test_register_validator_rejects_short_password() {
    let result = RegisterValidator.validate(&register_request("user@example.com", "Ab1", None));
    assert!(!result.is_valid());
    assert!(result.errors.iter().any(|e| e.field == "password"));
}

#[test]
fn test_register_validator_requires_letter_and_digit() {
    for password in ["onlyletters", "12345678"] {
        let result = RegisterValidator.validate(&register_request("user@example.com", password, None));
        assert!(!result.is_valid(), "accepted weak password: {:?}", password);
    }
}

#[test]
fn test_register_validator_rejects_blank_name() {
    let result =
        RegisterValidator.validate(&register_request("user@example.com", "Abc12345!", Some("  ")));
    assert!(!result.is_valid());
    assert!(result.errors.iter().any(|e| e.field == "name"));
}

#[test]
fn test_register_validator_collects_multiple_errors() {
    let result = RegisterValidator.validate(&register_request("bad", "x", None));
    assert_eq!(result.errors.len(), 2);
}

#[test]
fn test_login_validator() {
    let valid = LoginValidator.validate(&LoginRequest {
        email: "user@example.com".to_string(),
        password: "anything".to_string(),
    });
    assert!(valid.is_valid());

    let empty_password = LoginValidator.validate(&LoginRequest {
        email: "user@example.com".to_string(),
        password: String::new(),
    });
    assert!(!empty_password.is_valid());
}

#[test]
fn test_auth_provider_parse_roundtrip() {
    for provider in [AuthProvider::Local, AuthProvider::Google, AuthProvider::Github] {
        assert_eq!(AuthProvider::parse(provider.as_str()), Some(provider));
    }
    assert_eq!(AuthProvider::parse("twitter"), None);
}

#[test]
fn test_auth_provider_external() {
    assert!(!AuthProvider::Local.is_external());
    assert!(AuthProvider::Google.is_external());
    assert!(AuthProvider::Github.is_external());
}

#[test]
fn test_user_serialization_hides_password_digest() {
    let user = User {
        id: "U_ABC123".to_string(),
        email: "user@example.com".to_string(),
        name: Some("User".to_string()),
        avatar: None,
        provider: "local".to_string(),
        password_digest: Some("$2b$12$secret".to_string()),
        google_id: None,
        github_id: None,
        is_verified: 1,
        created_at: None,
        updated_at: None,
    };

    let json = serde_json::to_string(&user).unwrap();
    assert!(!json.contains("password_digest"));
    assert!(!json.contains("secret"));
    assert!(json.contains("user@example.com"));
}

#[test]
fn test_refresh_cookie_attributes() {
    let cookie = refresh_cookie("token-value", true);

    assert_eq!(cookie.name(), REFRESH_COOKIE_NAME);
    assert_eq!(cookie.value(), "token-value");
    assert_eq!(cookie.http_only(), Some(true));
    assert_eq!(cookie.secure(), Some(true));
    assert_eq!(cookie.same_site(), Some(SameSite::Strict));
    assert_eq!(cookie.path(), Some("/"));
    assert_eq!(cookie.max_age(), Some(time::Duration::days(7)));
}

#[test]
fn test_clear_refresh_cookie_expires_immediately() {
    let cookie = clear_refresh_cookie(false);
    assert_eq!(cookie.name(), REFRESH_COOKIE_NAME);
    assert_eq!(cookie.value(), "");
    assert_eq!(cookie.max_age(), Some(time::Duration::ZERO));
}

#[test]
fn test_oauth_state_cookie_is_lax_and_short_lived() {
    let cookie = oauth_state_cookie("nonce", false);

    assert_eq!(cookie.name(), OAUTH_STATE_COOKIE_NAME);
    assert_eq!(cookie.same_site(), Some(SameSite::Lax));
    assert_eq!(cookie.path(), Some("/auth"));
    assert_eq!(cookie.max_age(), Some(time::Duration::minutes(5)));
}
