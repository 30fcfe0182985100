//! Credential persistence.
//!
//! The auth service talks to storage through [`CredentialStore`] so the
//! backing store is a constructor-passed collaborator. [`PgCredentialStore`]
//! is the production implementation; [`MemoryCredentialStore`] backs tests
//! that do not need a database.

use anyhow::{Context, Result};
use async_trait::async_trait;
use sqlx::{PgPool, Row};
use std::collections::HashMap;
use std::sync::Mutex;
use tracing::Instrument;
use uuid::Uuid;

use crate::auth::guard::Role;

/// A stored credential: unique identity plus its opaque password hash.
///
/// The hash is always a PHC string produced by [`crate::auth::password`];
/// the plaintext never reaches storage.
#[derive(Debug, Clone)]
pub struct Credential {
    pub subject: Uuid,
    pub identity: String,
    pub password_hash: String,
    pub roles: Vec<Role>,
}

/// Outcome of persisting a new credential.
#[derive(Debug, PartialEq, Eq)]
pub enum SaveOutcome {
    Created,
    IdentityTaken,
}

#[async_trait]
pub trait CredentialStore {
    async fn find_by_identity(&self, identity: &str) -> Result<Option<Credential>>;
    async fn save(&self, credential: &Credential) -> Result<SaveOutcome>;
}

/// Postgres-backed store. Identity uniqueness is enforced by the `users`
/// unique constraint, which makes check-then-insert races safe.
pub struct PgCredentialStore {
    pool: PgPool,
}

impl PgCredentialStore {
    #[must_use]
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl CredentialStore for PgCredentialStore {
    async fn find_by_identity(&self, identity: &str) -> Result<Option<Credential>> {
        let query = "SELECT id, email, password_hash, roles FROM users WHERE email = $1";
        let span = tracing::info_span!(
            "db.query",
            db.system = "postgresql",
            db.operation = "SELECT",
            db.statement = query
        );
        let row = sqlx::query(query)
            .bind(identity)
            .fetch_optional(&self.pool)
            .instrument(span)
            .await
            .context("failed to lookup credential")?;

        Ok(row.map(|row| Credential {
            subject: row.get("id"),
            identity: row.get("email"),
            password_hash: row.get("password_hash"),
            roles: parse_roles(&row.get::<Vec<String>, _>("roles")),
        }))
    }

    async fn save(&self, credential: &Credential) -> Result<SaveOutcome> {
        let roles: Vec<String> = credential
            .roles
            .iter()
            .map(|role| role.as_str().to_string())
            .collect();

        let query = "INSERT INTO users (id, email, password_hash, roles) VALUES ($1, $2, $3, $4)";
        let span = tracing::info_span!(
            "db.query",
            db.system = "postgresql",
            db.operation = "INSERT",
            db.statement = query
        );
        let result = sqlx::query(query)
            .bind(credential.subject)
            .bind(&credential.identity)
            .bind(&credential.password_hash)
            .bind(&roles)
            .execute(&self.pool)
            .instrument(span)
            .await;

        match result {
            Ok(_) => Ok(SaveOutcome::Created),
            Err(err) if is_unique_violation(&err) => Ok(SaveOutcome::IdentityTaken),
            Err(err) => Err(err).context("failed to insert credential"),
        }
    }
}

/// Unknown role strings are skipped rather than failing the lookup.
pub(crate) fn parse_roles(raw: &[String]) -> Vec<Role> {
    raw.iter().filter_map(|role| Role::parse(role)).collect()
}

fn is_unique_violation(err: &sqlx::Error) -> bool {
    match err {
        sqlx::Error::Database(db_err) => db_err.code().is_some_and(|code| code.as_ref() == "23505"),
        _ => false,
    }
}

/// In-memory store for tests and examples.
#[derive(Debug, Default)]
pub struct MemoryCredentialStore {
    credentials: Mutex<HashMap<String, Credential>>,
}

impl MemoryCredentialStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl CredentialStore for MemoryCredentialStore {
    async fn find_by_identity(&self, identity: &str) -> Result<Option<Credential>> {
        let credentials = self
            .credentials
            .lock()
            .map_err(|_| anyhow::anyhow!("credential store poisoned"))?;
        Ok(credentials.get(identity).cloned())
    }

    async fn save(&self, credential: &Credential) -> Result<SaveOutcome> {
        let mut credentials = self
            .credentials
            .lock()
            .map_err(|_| anyhow::anyhow!("credential store poisoned"))?;
        if credentials.contains_key(&credential.identity) {
            return Ok(SaveOutcome::IdentityTaken);
        }
        credentials.insert(credential.identity.clone(), credential.clone());
        Ok(SaveOutcome::Created)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn credential(identity: &str) -> Credential {
        Credential {
            subject: Uuid::new_v4(),
            identity: identity.to_string(),
            password_hash: "$argon2id$stub".to_string(),
            roles: vec![Role::User],
        }
    }

    #[tokio::test]
    async fn memory_store_round_trips() -> Result<()> {
        let store = MemoryCredentialStore::new();
        assert!(store.find_by_identity("a@x.com").await?.is_none());

        assert_eq!(
            store.save(&credential("a@x.com")).await?,
            SaveOutcome::Created
        );
        let found = store
            .find_by_identity("a@x.com")
            .await?
            .expect("credential saved");
        assert_eq!(found.identity, "a@x.com");
        Ok(())
    }

    #[tokio::test]
    async fn memory_store_rejects_duplicate_identity() -> Result<()> {
        let store = MemoryCredentialStore::new();
        store.save(&credential("a@x.com")).await?;
        assert_eq!(
            store.save(&credential("a@x.com")).await?,
            SaveOutcome::IdentityTaken
        );
        Ok(())
    }

    #[test]
    fn parse_roles_skips_unknown() {
        let roles = parse_roles(&[
            "user".to_string(),
            "astronaut".to_string(),
            "admin".to_string(),
        ]);
        assert_eq!(roles, vec![Role::User, Role::Admin]);
    }
}
