use thiserror::Error;

/// Password hash failures. A wrong password is not an error, `verify`
/// reports it as `Ok(false)`.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum HashError {
    #[error("malformed password hash")]
    Malformed,
    #[error("password hashing failed")]
    Hash,
}

/// Token verification failures. Signature integrity is checked before any
/// claim, so a tampered token is always [`TokenError::InvalidSignature`]
/// even when its claims are expired or unreadable.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum TokenError {
    #[error("invalid signature")]
    InvalidSignature,
    #[error("token expired")]
    Expired,
    #[error("malformed token")]
    Malformed,
}

/// Signup/login failures surfaced by the auth service.
///
/// Login maps both "unknown identity" and "wrong password" to the single
/// [`AuthError::InvalidCredentials`] value so responses cannot be used to
/// enumerate accounts.
#[derive(Debug, Error)]
pub enum AuthError {
    #[error("identity already registered")]
    IdentityTaken,
    #[error("invalid credentials")]
    InvalidCredentials,
    #[error(transparent)]
    Internal(#[from] anyhow::Error),
}
