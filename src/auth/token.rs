//! PASETO v4.public access token issuance and verification.
//!
//! Tokens are stateless: claims `{sub, iat, exp, jti}` signed with a
//! process-wide Ed25519 key loaded once at startup. Verification checks the
//! signature before reading any claim, so unauthenticated data never drives
//! a decision.

use base64ct::{Base64UrlUnpadded, Encoding};
use ed25519_dalek::{Signer, SigningKey};
use pasetors::errors::Error as PasetorsError;
use pasetors::keys::AsymmetricPublicKey;
use pasetors::token::UntrustedToken;
use pasetors::version4::V4;
use pasetors::Public;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use time::format_description::well_known::Rfc3339;
use time::OffsetDateTime;
use ulid::Ulid;
use uuid::Uuid;

use crate::auth::error::TokenError;

const HEADER: &str = "v4.public.";

#[derive(Debug, Clone, Serialize, Deserialize)]
struct AccessTokenClaims {
    sub: String,
    iat: String,
    exp: String,
    jti: String,
}

/// Process-wide token signer/verifier.
///
/// Immutable after construction; key rotation is out of scope.
pub struct TokenSigner {
    signing_key: SigningKey,
    public_key: AsymmetricPublicKey<V4>,
}

impl TokenSigner {
    /// Build a signer from a 32-byte Ed25519 seed.
    ///
    /// # Errors
    ///
    /// Returns an error if the derived public key is rejected by the
    /// PASETO implementation.
    pub fn from_seed(seed: &[u8; 32]) -> anyhow::Result<Self> {
        let signing_key = SigningKey::from_bytes(seed);
        let public_key = AsymmetricPublicKey::<V4>::from(&signing_key.verifying_key().to_bytes())
            .map_err(|err| anyhow::anyhow!("invalid verifying key: {err}"))?;

        Ok(Self {
            signing_key,
            public_key,
        })
    }

    /// Issue a token for `subject` valid for `ttl` from now.
    ///
    /// # Errors
    ///
    /// Returns an error if claim encoding fails.
    pub fn issue(&self, subject: Uuid, ttl: Duration) -> anyhow::Result<String> {
        let now = OffsetDateTime::now_utc();
        let claims = AccessTokenClaims {
            sub: subject.to_string(),
            iat: now.format(&Rfc3339)?,
            exp: (now + ttl).format(&Rfc3339)?,
            jti: Ulid::new().to_string(),
        };

        self.sign_claims(&claims)
    }

    /// Verify a token and return its subject.
    ///
    /// Order matters: signature integrity first, claim decoding second,
    /// expiry last.
    ///
    /// # Errors
    ///
    /// [`TokenError::InvalidSignature`] for forged or tampered tokens,
    /// [`TokenError::Expired`] once `exp` has passed, and
    /// [`TokenError::Malformed`] when the token or its claims cannot be
    /// decoded.
    pub fn verify(&self, token: &str) -> Result<Uuid, TokenError> {
        let untrusted =
            UntrustedToken::<Public, V4>::try_from(token).map_err(|err| map_paseto_error(&err))?;

        let trusted =
            pasetors::version4::PublicToken::verify(&self.public_key, &untrusted, None, None)
                .map_err(|err| map_paseto_error(&err))?;

        let claims: AccessTokenClaims =
            serde_json::from_str(trusted.payload()).map_err(|_| TokenError::Malformed)?;

        let exp =
            OffsetDateTime::parse(&claims.exp, &Rfc3339).map_err(|_| TokenError::Malformed)?;
        OffsetDateTime::parse(&claims.iat, &Rfc3339).map_err(|_| TokenError::Malformed)?;

        if exp <= OffsetDateTime::now_utc() {
            return Err(TokenError::Expired);
        }

        Uuid::parse_str(&claims.sub).map_err(|_| TokenError::Malformed)
    }

    fn sign_claims(&self, claims: &AccessTokenClaims) -> anyhow::Result<String> {
        let payload = serde_json::to_vec(claims)?;
        // Empty footer and implicit assertion
        let pre_auth = pae(&[HEADER.as_bytes(), payload.as_slice(), b"", b""]);
        let signature = self.signing_key.sign(pre_auth.as_slice());

        Ok(build_token(payload.as_slice(), &signature.to_bytes()))
    }
}

/// Assemble a v4.public token from payload and Ed25519 signature.
fn build_token(payload: &[u8], signature: &[u8; 64]) -> String {
    let mut message = Vec::with_capacity(payload.len() + signature.len());
    message.extend_from_slice(payload);
    message.extend_from_slice(signature);

    format!("{HEADER}{}", Base64UrlUnpadded::encode_string(&message))
}

// PASETO pre-authentication encoding
fn pae(pieces: &[&[u8]]) -> Vec<u8> {
    let mut out = Vec::new();
    out.extend_from_slice(&le64(pieces.len() as u64));
    for piece in pieces {
        out.extend_from_slice(&le64(piece.len() as u64));
        out.extend_from_slice(piece);
    }
    out
}

fn le64(mut value: u64) -> [u8; 8] {
    let mut out = [0u8; 8];
    for (i, byte) in out.iter_mut().enumerate() {
        if i == 7 {
            value &= 0x7f;
        }
        *byte = (value & 0xff) as u8;
        value >>= 8;
    }
    out
}

fn map_paseto_error(err: &PasetorsError) -> TokenError {
    match err {
        PasetorsError::TokenValidation => TokenError::InvalidSignature,
        _ => TokenError::Malformed,
    }
}
