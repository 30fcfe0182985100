//! Credential issuance and verification.
//!
//! The core is deliberately small: a password hasher ([`password`]), a token
//! issuer/verifier ([`token`]), an orchestrating service ([`service`]) over a
//! pluggable credential store ([`store`]), and the access guard ([`guard`])
//! that turns a bearer token into a [`guard::Principal`] before protected
//! handlers run.

pub mod error;
pub mod guard;
pub mod password;
pub mod service;
pub mod store;
pub mod token;

pub use error::{AuthError, HashError, TokenError};
pub use guard::{authorize, require_principal, AccessDecision, Principal, Role};
pub use service::{AuthService, PgAuthService};
pub use store::{Credential, CredentialStore, MemoryCredentialStore, PgCredentialStore};
pub use token::TokenSigner;
