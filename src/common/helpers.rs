// Helper functions for safe logging

/// Masks email addresses for safe logging
/// Prevents sensitive data exposure while preserving debugging utility
///
/// # Example
/// ```
/// let masked = safe_email_log("user@example.com");
/// // Returns: "u***@example.com"
/// ```
pub fn safe_email_log(email: &str) -> String {
    if email.len() > 3 {
        let parts: Vec<&str> = email.split('@').collect();
        // First char, not first byte: the local part may start with a
        // multi-byte character.
        if let [local, domain] = parts.as_slice() {
            if let Some(first) = local.chars().next() {
                return format!("{}***@{}", first, domain);
            }
        }
        "***@***.***".to_string()
    } else {
        "***@***.***".to_string()
    }
}

/// Masks tokens for safe logging
/// Shows only first and last 4 characters
///
/// # Example
/// ```
/// let masked = safe_token_log("eyJhbGciOiJIUzI1NiIsInR5cCI6IkpXVCJ9");
/// // Returns: "eyJh...kpXVCJ9"
/// ```
pub fn safe_token_log(token: &str) -> String {
    if token.len() > 8 {
        format!("{}...{}", &token[..4], &token[token.len() - 4..])
    } else {
        "***".to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_safe_email_log_masks_local_part() {
        assert_eq!(safe_email_log("user@example.com"), "u***@example.com");
        assert_eq!(safe_email_log("ab"), "***@***.***");
        assert_eq!(safe_email_log("not-an-email"), "***@***.***");
    }

    #[test]
    fn test_safe_email_log_multibyte_local_part() {
        assert_eq!(safe_email_log("über@example.com"), "ü***@example.com");
        assert_eq!(safe_email_log("日本@example.com"), "日***@example.com");
    }

    #[test]
    fn test_safe_token_log_keeps_edges() {
        let masked = safe_token_log("eyJhbGciOiJIUzI1NiJ9");
        assert!(masked.starts_with("eyJh"));
        assert!(masked.ends_with("1NiJ9") || masked.ends_with("NiJ9"));
        assert_eq!(safe_token_log("short"), "***");
    }
}
