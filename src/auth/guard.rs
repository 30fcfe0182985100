//! Access guard: bearer token extraction, verification, and authorization.
//!
//! The guard only sees the token verifier's `verify` operation; no signing
//! state is shared. A verified subject is resolved to a [`Principal`] whose
//! role set drives the explicit [`authorize`] decision composed in front of
//! protected handlers.

use axum::http::{header::AUTHORIZATION, HeaderMap, StatusCode};
use sqlx::{PgPool, Row};
use tracing::{error, Instrument};
use uuid::Uuid;

use crate::auth::error::TokenError;
use crate::auth::store::parse_roles;
use crate::auth::token::TokenSigner;

/// Roles a user can hold. Stored as text in `users.roles`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Role {
    User,
    Admin,
}

impl Role {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::User => "user",
            Self::Admin => "admin",
        }
    }

    #[must_use]
    pub fn parse(raw: &str) -> Option<Self> {
        match raw {
            "user" => Some(Self::User),
            "admin" => Some(Self::Admin),
            _ => None,
        }
    }
}

/// Authenticated identity attached to a request after token verification.
///
/// Lives only for the request; never persisted.
#[derive(Debug, Clone)]
pub struct Principal {
    pub subject: Uuid,
    pub identity: String,
    pub roles: Vec<Role>,
}

impl Principal {
    #[must_use]
    pub fn has_role(&self, role: Role) -> bool {
        self.roles.contains(&role)
    }
}

/// Authorization decision for a principal against a required role.
#[derive(Debug, PartialEq, Eq)]
pub enum AccessDecision {
    Granted,
    Denied,
}

/// Decide whether `principal` may perform an operation requiring `role`.
#[must_use]
pub fn authorize(principal: &Principal, required: Role) -> AccessDecision {
    if principal.has_role(required) {
        AccessDecision::Granted
    } else {
        AccessDecision::Denied
    }
}

/// Extract the `Authorization: Bearer` token, if any.
///
/// The scheme is matched case-insensitively per RFC 7235.
#[must_use]
pub fn bearer_token(headers: &HeaderMap) -> Option<String> {
    let value = headers.get(AUTHORIZATION)?.to_str().ok()?.trim();
    let (scheme, rest) = value.split_once(' ')?;
    if !scheme.eq_ignore_ascii_case("Bearer") {
        return None;
    }
    let token = rest.trim();
    if token.is_empty() {
        None
    } else {
        Some(token.to_string())
    }
}

/// Resolve the request's bearer token into a [`Principal`].
///
/// # Errors
///
/// `401 Unauthorized` when the token is missing, forged, expired, malformed,
/// or its subject no longer exists; `500` only on storage failures.
pub async fn require_principal(
    headers: &HeaderMap,
    signer: &TokenSigner,
    pool: &PgPool,
) -> Result<Principal, StatusCode> {
    let Some(token) = bearer_token(headers) else {
        return Err(StatusCode::UNAUTHORIZED);
    };

    // Missing/invalid/expired all collapse to 401; the reason is logged, not
    // revealed to the caller.
    let subject = match signer.verify(&token) {
        Ok(subject) => subject,
        Err(err @ (TokenError::InvalidSignature | TokenError::Expired | TokenError::Malformed)) => {
            tracing::debug!("token rejected: {err}");
            return Err(StatusCode::UNAUTHORIZED);
        }
    };

    match lookup_principal(pool, subject).await {
        Ok(Some(principal)) => Ok(principal),
        Ok(None) => Err(StatusCode::UNAUTHORIZED),
        Err(err) => {
            error!("failed to resolve principal: {err}");
            Err(StatusCode::INTERNAL_SERVER_ERROR)
        }
    }
}

async fn lookup_principal(pool: &PgPool, subject: Uuid) -> anyhow::Result<Option<Principal>> {
    let query = "SELECT email, roles FROM users WHERE id = $1";
    let span = tracing::info_span!(
        "db.query",
        db.system = "postgresql",
        db.operation = "SELECT",
        db.statement = query
    );
    let row = sqlx::query(query)
        .bind(subject)
        .fetch_optional(pool)
        .instrument(span)
        .await?;

    Ok(row.map(|row| Principal {
        subject,
        identity: row.get("email"),
        roles: parse_roles(&row.get::<Vec<String>, _>("roles")),
    }))
}
