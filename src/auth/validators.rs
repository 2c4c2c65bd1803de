// src/auth/validators.rs
//! Request body validators for the credential endpoints.

use regex::Regex;
use std::sync::OnceLock;

use crate::auth::models::{LoginRequest, RegisterRequest};
use crate::common::{ValidationResult, Validator};

const PASSWORD_MIN_LENGTH: usize = 8;
const NAME_MAX_LENGTH: usize = 255;

fn email_regex() -> &'static Regex {
    static EMAIL_REGEX: OnceLock<Regex> = OnceLock::new();
    EMAIL_REGEX.get_or_init(|| {
        Regex::new(r"^[^@\s]+@[^@\s]+\.[^@\s]+$").expect("email regex is valid")
    })
}

fn validate_email(email: &str, result: &mut ValidationResult) {
    if email.trim().is_empty() {
        result.add_error("email", "Email is required");
    } else if !email_regex().is_match(email.trim()) {
        result.add_error("email", "Email format is invalid");
    }
}

pub struct RegisterValidator;

impl Validator<RegisterRequest> for RegisterValidator {
    fn validate(&self, data: &RegisterRequest) -> ValidationResult {
        let mut result = ValidationResult::new();

        validate_email(&data.email, &mut result);

        if data.password.len() < PASSWORD_MIN_LENGTH {
            result.add_error(
                "password",
                "Password must be at least 8 characters long",
            );
        } else {
            let has_letter = data.password.chars().any(|c| c.is_ascii_alphabetic());
            let has_digit = data.password.chars().any(|c| c.is_ascii_digit());
            if !has_letter || !has_digit {
                result.add_error(
                    "password",
                    "Password must contain at least one letter and one digit",
                );
            }
        }

        if let Some(name) = &data.name {
            if name.trim().is_empty() {
                result.add_error("name", "Name cannot be blank");
            } else if name.len() > NAME_MAX_LENGTH {
                result.add_error("name", "Name is too long");
            }
        }

        result
    }
}

pub struct LoginValidator;

impl Validator<LoginRequest> for LoginValidator {
    fn validate(&self, data: &LoginRequest) -> ValidationResult {
        let mut result = ValidationResult::new();

        validate_email(&data.email, &mut result);

        if data.password.is_empty() {
            result.add_error("password", "Password is required");
        }

        result
    }
}
