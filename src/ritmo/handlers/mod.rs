pub mod health;
pub use self::health::health;

pub mod signup;
pub use self::signup::signup;

pub mod login;
pub use self::login::login;

pub mod habits;
pub use self::habits::habits;

// common functions for the handlers
use regex::Regex;

/// Passwords shorter than this are rejected at the HTTP boundary; the
/// hasher itself has no length policy.
pub const MIN_PASSWORD_LENGTH: usize = 8;

pub fn valid_email(email: &str) -> bool {
    Regex::new(r"^[^@\s]+@[^@\s]+\.[^@\s]+$").is_ok_and(|re| re.is_match(email))
}

pub fn valid_password(password: &str) -> bool {
    password.len() >= MIN_PASSWORD_LENGTH
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn valid_email_accepts_basic_format() {
        assert!(valid_email("a@example.com"));
        assert!(valid_email("name.surname@example.co"));
    }

    #[test]
    fn valid_email_rejects_missing_parts() {
        assert!(!valid_email("not-an-email"));
        assert!(!valid_email("missing-at.example.com"));
        assert!(!valid_email("missing-domain@"));
    }

    #[test]
    fn valid_password_enforces_minimum_length() {
        assert!(!valid_password(""));
        assert!(!valid_password("short"));
        assert!(valid_password("eight-ch"));
        assert!(valid_password("a-much-longer-password"));
    }
}
