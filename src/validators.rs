use once_cell::sync::Lazy;
use regex::Regex;
use validator::ValidationError;

/// Input validation rules for registration and profile updates.

// Compiled once at first use; the patterns are hardcoded constants.
static EMAIL_REGEX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^[a-zA-Z0-9._%+-]+@[a-zA-Z0-9.-]+\.[a-zA-Z]{2,}$")
        .expect("hardcoded email regex is invalid - fix source code")
});

static USERNAME_REGEX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^[A-Za-z0-9_]{3,50}$")
        .expect("hardcoded username regex is invalid - fix source code")
});

/// Validate email format (simplified RFC 5322)
pub fn validate_email(email: &str) -> bool {
    !email.is_empty() && email.len() <= 254 && EMAIL_REGEX.is_match(email)
}

/// Validate username format (3-50 characters, alphanumeric and underscore)
pub fn validate_username(username: &str) -> bool {
    USERNAME_REGEX.is_match(username)
}

/// Validate password strength:
/// - minimum 8 characters
/// - at least one lowercase letter
/// - at least one uppercase letter
/// - at least one digit
pub fn validate_password(password: &str) -> bool {
    if password.len() < 8 {
        return false;
    }

    let has_lowercase = password.chars().any(|c| c.is_ascii_lowercase());
    let has_uppercase = password.chars().any(|c| c.is_ascii_uppercase());
    let has_digit = password.chars().any(|c| c.is_ascii_digit());

    has_lowercase && has_uppercase && has_digit
}

/// validator crate compatible wrapper for username shape
pub fn username_shape(username: &str) -> Result<(), ValidationError> {
    if validate_username(username) {
        Ok(())
    } else {
        Err(ValidationError::new("invalid_username"))
    }
}

/// validator crate compatible wrapper for password strength
pub fn password_strength(password: &str) -> Result<(), ValidationError> {
    if validate_password(password) {
        Ok(())
    } else {
        Err(ValidationError::new("weak_password"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_valid_email() {
        assert!(validate_email("user@example.com"));
        assert!(validate_email("test.user+tag@sub.example.co.uk"));
    }

    #[test]
    fn test_invalid_email() {
        assert!(!validate_email("invalid"));
        assert!(!validate_email("@example.com"));
        assert!(!validate_email("user@"));
        assert!(!validate_email("user@domain"));
        assert!(!validate_email(""));
    }

    #[test]
    fn test_valid_username() {
        assert!(validate_username("alice"));
        assert!(validate_username("john_doe"));
        assert!(validate_username("User_123"));
        assert!(validate_username("abc"));
        assert!(validate_username(&"a".repeat(50)));
    }

    #[test]
    fn test_invalid_username() {
        assert!(!validate_username("ab")); // too short
        assert!(!validate_username(&"a".repeat(51))); // too long
        assert!(!validate_username("user-name")); // dash not allowed
        assert!(!validate_username("user name")); // space not allowed
        assert!(!validate_username("user@name"));
    }

    #[test]
    fn test_valid_password() {
        assert!(validate_password("Passw0rd1"));
        assert!(validate_password("Aa345678"));
        // Special characters are allowed, just not required
        assert!(validate_password("MyP@ssw0rd!"));
    }

    #[test]
    fn test_invalid_password() {
        assert!(!validate_password("Sh0rt")); // too short
        assert!(!validate_password("alllowercase1")); // no uppercase
        assert!(!validate_password("ALLUPPERCASE1")); // no lowercase
        assert!(!validate_password("NoDigitsHere")); // no digit
    }
}
