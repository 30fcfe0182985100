//! Signup and login orchestration over the credential store.

use anyhow::Context;
use std::sync::Arc;
use std::time::Duration;
use uuid::Uuid;

use crate::auth::error::AuthError;
use crate::auth::guard::Role;
use crate::auth::password;
use crate::auth::store::{Credential, CredentialStore, SaveOutcome};
use crate::auth::token::TokenSigner;

/// Orchestrates signup (hash + persist) and login (verify + issue token).
///
/// Collaborators are constructor-passed; the signer is shared with the
/// access guard through the same `Arc`.
pub struct AuthService<S> {
    store: S,
    signer: Arc<TokenSigner>,
    token_ttl: Duration,
    // Verified against when the identity is unknown so login timing does not
    // reveal which identities exist.
    decoy_hash: String,
}

impl<S: CredentialStore + Sync> AuthService<S> {
    /// # Errors
    ///
    /// Returns an error if the decoy hash cannot be computed.
    pub fn new(store: S, signer: Arc<TokenSigner>, token_ttl: Duration) -> anyhow::Result<Self> {
        let decoy_hash = password::hash("ritmo-decoy-password")
            .map_err(|err| anyhow::anyhow!("failed to compute decoy hash: {err}"))?;

        Ok(Self {
            store,
            signer,
            token_ttl,
            decoy_hash,
        })
    }

    /// Register a new identity.
    ///
    /// # Errors
    ///
    /// [`AuthError::IdentityTaken`] when the identity already exists; the
    /// store's uniqueness constraint makes the check-then-insert race safe.
    pub async fn signup(&self, identity: &str, plaintext: &str) -> Result<(), AuthError> {
        let password_hash = password::hash(plaintext)
            .map_err(|err| AuthError::Internal(anyhow::anyhow!("hashing failed: {err}")))?;

        let credential = Credential {
            subject: Uuid::new_v4(),
            identity: normalize_identity(identity),
            password_hash,
            roles: vec![Role::User],
        };

        match self
            .store
            .save(&credential)
            .await
            .context("failed to persist credential")?
        {
            SaveOutcome::Created => Ok(()),
            SaveOutcome::IdentityTaken => Err(AuthError::IdentityTaken),
        }
    }

    /// Authenticate and issue an access token.
    ///
    /// # Errors
    ///
    /// Unknown identity and wrong password both return the identical
    /// [`AuthError::InvalidCredentials`] value; a decoy verification runs on
    /// the unknown-identity path to keep timing uniform.
    pub async fn login(&self, identity: &str, plaintext: &str) -> Result<String, AuthError> {
        let identity = normalize_identity(identity);
        let credential = self
            .store
            .find_by_identity(&identity)
            .await
            .context("failed to lookup credential")?;

        let Some(credential) = credential else {
            let _ = password::verify(plaintext, &self.decoy_hash);
            return Err(AuthError::InvalidCredentials);
        };

        // Stored hashes are produced by this crate, so a parse failure is
        // corruption, not a caller mistake.
        let matches = password::verify(plaintext, &credential.password_hash)
            .map_err(|err| AuthError::Internal(anyhow::anyhow!("stored hash rejected: {err}")))?;

        if !matches {
            return Err(AuthError::InvalidCredentials);
        }

        let token = self
            .signer
            .issue(credential.subject, self.token_ttl)
            .context("failed to issue token")?;

        Ok(token)
    }
}

/// The production service wired to Postgres.
pub type PgAuthService = AuthService<crate::auth::store::PgCredentialStore>;

fn normalize_identity(identity: &str) -> String {
    identity.trim().to_lowercase()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::store::MemoryCredentialStore;

    fn service() -> AuthService<MemoryCredentialStore> {
        let signer = Arc::new(TokenSigner::from_seed(&[1u8; 32]).expect("signer"));
        AuthService::new(
            MemoryCredentialStore::new(),
            signer,
            Duration::from_secs(60),
        )
        .expect("service")
    }

    #[tokio::test]
    async fn signup_then_login_issues_verifiable_token() -> anyhow::Result<()> {
        let service = service();
        service.signup("a@x.com", "pw1").await?;

        let token = service.login("a@x.com", "pw1").await?;
        assert!(service.signer.verify(&token).is_ok());
        Ok(())
    }

    #[tokio::test]
    async fn signup_normalizes_identity() -> anyhow::Result<()> {
        let service = service();
        service.signup(" Alice@Example.COM ", "pw1").await?;

        assert!(service.login("alice@example.com", "pw1").await.is_ok());
        Ok(())
    }

    #[tokio::test]
    async fn duplicate_signup_is_identity_taken() -> anyhow::Result<()> {
        let service = service();
        service.signup("a@x.com", "pw1").await?;

        let result = service.signup("a@x.com", "pw2").await;
        assert!(matches!(result, Err(AuthError::IdentityTaken)));
        Ok(())
    }

    #[tokio::test]
    async fn unknown_identity_and_wrong_password_are_indistinguishable() -> anyhow::Result<()> {
        let service = service();
        service.signup("a@x.com", "pw1").await?;

        let unknown = service.login("ghost@x.com", "pw1").await;
        let wrong = service.login("a@x.com", "pw2").await;

        assert!(matches!(unknown, Err(AuthError::InvalidCredentials)));
        assert!(matches!(wrong, Err(AuthError::InvalidCredentials)));
        Ok(())
    }
}
