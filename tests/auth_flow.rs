//! End-to-end auth flow over the in-memory credential store: signup,
//! duplicate signup, login, token verification, and role-gated access.

use anyhow::Result;
use std::sync::Arc;
use std::time::Duration;
use uuid::Uuid;

use ritmo::auth::{
    authorize, AccessDecision, AuthError, AuthService, MemoryCredentialStore, Principal, Role,
    TokenError, TokenSigner,
};

const TTL: Duration = Duration::from_secs(600);

fn signer() -> Arc<TokenSigner> {
    Arc::new(TokenSigner::from_seed(&[42u8; 32]).expect("signer"))
}

fn service(signer: Arc<TokenSigner>) -> AuthService<MemoryCredentialStore> {
    AuthService::new(MemoryCredentialStore::new(), signer, TTL).expect("service")
}

#[tokio::test]
async fn signup_login_and_role_gated_access() -> Result<()> {
    let signer = signer();
    let service = service(signer.clone());

    // First signup succeeds, second on the same identity conflicts.
    service.signup("a@x.com", "password-one").await?;
    assert!(matches!(
        service.signup("a@x.com", "password-two").await,
        Err(AuthError::IdentityTaken)
    ));

    // Correct password logs in and the returned token verifies.
    let token = service.login("a@x.com", "password-one").await?;
    let subject = signer.verify(&token)?;

    // Wrong password and unknown identity fail with the identical value.
    assert!(matches!(
        service.login("a@x.com", "password-two").await,
        Err(AuthError::InvalidCredentials)
    ));
    assert!(matches!(
        service.login("nobody@x.com", "password-one").await,
        Err(AuthError::InvalidCredentials)
    ));

    // A principal holding the required role is granted, one without it is
    // denied (the guard maps Denied to 403).
    let member = Principal {
        subject,
        identity: "a@x.com".to_string(),
        roles: vec![Role::User],
    };
    let outsider = Principal {
        subject: Uuid::new_v4(),
        identity: "b@x.com".to_string(),
        roles: vec![],
    };
    assert_eq!(authorize(&member, Role::User), AccessDecision::Granted);
    assert_eq!(authorize(&outsider, Role::User), AccessDecision::Denied);

    Ok(())
}

#[tokio::test]
async fn token_from_login_round_trips_subject() -> Result<()> {
    let signer = signer();
    let service = service(signer.clone());

    service.signup("carol@x.com", "long-enough-password").await?;
    let first = service.login("carol@x.com", "long-enough-password").await?;
    let second = service.login("carol@x.com", "long-enough-password").await?;

    // Distinct tokens (fresh jti/iat), same subject.
    assert_ne!(first, second);
    assert_eq!(signer.verify(&first)?, signer.verify(&second)?);
    Ok(())
}

#[tokio::test]
async fn elapsed_ttl_expires_the_token() -> Result<()> {
    let signer = signer();
    let service =
        AuthService::new(MemoryCredentialStore::new(), signer.clone(), Duration::ZERO)
            .expect("service");

    service.signup("dave@x.com", "long-enough-password").await?;
    let token = service.login("dave@x.com", "long-enough-password").await?;

    assert_eq!(signer.verify(&token), Err(TokenError::Expired));
    Ok(())
}
