use crate::auth::token::TokenSigner;
use crate::cli::{actions::Action, globals::GlobalArgs};
use crate::ritmo::new;
use anyhow::{anyhow, Context, Result};
use base64ct::{Base64, Encoding};
use secrecy::ExposeSecret;
use std::time::Duration;
use url::Url;

/// Handle the server action
///
/// # Errors
///
/// Returns an error if the DSN is not a postgres URL, the signing key seed
/// cannot be decoded, or the server fails to start.
pub async fn handle(action: Action, globals: &GlobalArgs) -> Result<()> {
    match action {
        Action::Server {
            port,
            dsn,
            token_ttl_seconds,
        } => {
            let parsed = Url::parse(&dsn).context("invalid database DSN")?;
            if !matches!(parsed.scheme(), "postgres" | "postgresql") {
                return Err(anyhow!("DSN scheme must be postgres://"));
            }

            let signer = signer_from_key(globals)?;
            let token_ttl = Duration::from_secs(token_ttl_seconds);

            new(port, dsn, signer, token_ttl).await?;
        }
    }

    Ok(())
}

/// Decode the base64 signing key seed and build the process-wide signer.
fn signer_from_key(globals: &GlobalArgs) -> Result<TokenSigner> {
    let decoded = Base64::decode_vec(globals.signing_key.expose_secret().trim())
        .map_err(|_| anyhow!("signing key is not valid base64"))?;

    let seed: [u8; 32] = decoded
        .try_into()
        .map_err(|_| anyhow!("signing key seed must be exactly 32 bytes"))?;

    TokenSigner::from_seed(&seed)
}

#[cfg(test)]
mod tests {
    use super::*;
    use secrecy::SecretString;

    #[test]
    fn test_signer_from_key() -> Result<()> {
        let globals = GlobalArgs::new(SecretString::from(
            "AAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAA=",
        ));
        assert!(signer_from_key(&globals).is_ok());
        Ok(())
    }

    #[test]
    fn test_signer_from_key_rejects_bad_base64() {
        let globals = GlobalArgs::new(SecretString::from("not-base64!!!"));
        assert!(signer_from_key(&globals).is_err());
    }

    #[test]
    fn test_signer_from_key_rejects_short_seed() {
        // "c2VlZA==" decodes to 4 bytes
        let globals = GlobalArgs::new(SecretString::from("c2VlZA=="));
        assert!(signer_from_key(&globals).is_err());
    }
}
