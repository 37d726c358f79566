//! Bearer token verification.
//!
//! Signed tokens are `hex(claims_json).hex(hmac_sha256(hex(claims_json)))`.
//! Raw mode accepts any non-empty bearer string as the uid and exists for
//! local development only.

use std::fmt;
use std::sync::Arc;

use hmac::{Hmac, Mac};
use serde::{Deserialize, Serialize};
use sha2::Sha256;
use thiserror::Error;

use questline_utils::time::{is_expired, now_unix_secs};

type HmacSha256 = Hmac<Sha256>;

/// The authenticated learner behind a request.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Identity {
    pub uid: String,
    pub email: String,
}

#[derive(Debug, Serialize, Deserialize)]
struct Claims {
    uid: String,
    #[serde(default)]
    email: String,
    exp: u64,
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum AuthError {
    #[error("malformed token")]
    Malformed,
    #[error("invalid token signature")]
    BadSignature,
    #[error("token expired")]
    Expired,
}

#[derive(Clone)]
enum Mode {
    Signed { secret: Arc<[u8]> },
    Raw,
}

#[derive(Clone)]
pub struct TokenVerifier {
    mode: Mode,
}

impl fmt::Debug for TokenVerifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mode = match self.mode {
            Mode::Signed { .. } => "signed",
            Mode::Raw => "raw",
        };
        f.debug_struct("TokenVerifier").field("mode", &mode).finish()
    }
}

impl TokenVerifier {
    pub fn signed(secret: impl AsRef<[u8]>) -> Self {
        Self {
            mode: Mode::Signed {
                secret: Arc::from(secret.as_ref()),
            },
        }
    }

    /// Treat the bearer string itself as the uid. No verification happens.
    pub fn raw() -> Self {
        Self { mode: Mode::Raw }
    }

    pub fn is_raw(&self) -> bool {
        matches!(self.mode, Mode::Raw)
    }

    pub fn verify(&self, token: &str) -> Result<Identity, AuthError> {
        self.verify_at(token, now_unix_secs())
    }

    pub fn verify_at(&self, token: &str, now: u64) -> Result<Identity, AuthError> {
        let token = token.trim();
        if token.is_empty() {
            return Err(AuthError::Malformed);
        }

        let secret = match &self.mode {
            Mode::Raw => {
                return Ok(Identity {
                    uid: token.to_owned(),
                    email: String::new(),
                });
            }
            Mode::Signed { secret } => secret,
        };

        let (payload_hex, signature_hex) = token.split_once('.').ok_or(AuthError::Malformed)?;
        let signature = hex::decode(signature_hex).map_err(|_| AuthError::Malformed)?;

        let mut mac = HmacSha256::new_from_slice(secret).map_err(|_| AuthError::Malformed)?;
        mac.update(payload_hex.as_bytes());
        mac.verify_slice(&signature)
            .map_err(|_| AuthError::BadSignature)?;

        let payload = hex::decode(payload_hex).map_err(|_| AuthError::Malformed)?;
        let claims: Claims = serde_json::from_slice(&payload).map_err(|_| AuthError::Malformed)?;

        if claims.uid.trim().is_empty() {
            return Err(AuthError::Malformed);
        }
        if is_expired(claims.exp, now) {
            return Err(AuthError::Expired);
        }

        Ok(Identity {
            uid: claims.uid,
            email: claims.email,
        })
    }

    /// Mint a signed token. Raw verifiers return the uid unchanged.
    pub fn issue(&self, identity: &Identity, expires_at: u64) -> anyhow::Result<String> {
        let Mode::Signed { secret } = &self.mode else {
            return Ok(identity.uid.clone());
        };

        let claims = Claims {
            uid: identity.uid.clone(),
            email: identity.email.clone(),
            exp: expires_at,
        };
        let payload_hex = hex::encode(serde_json::to_vec(&claims)?);

        let mut mac = HmacSha256::new_from_slice(secret)
            .map_err(|e| anyhow::anyhow!("invalid hmac key: {e}"))?;
        mac.update(payload_hex.as_bytes());
        let signature_hex = hex::encode(mac.finalize().into_bytes());

        Ok(format!("{payload_hex}.{signature_hex}"))
    }
}

#[cfg(test)]
mod tests {
    use super::{AuthError, Identity, TokenVerifier};

    fn learner() -> Identity {
        Identity {
            uid: "learner-1".to_owned(),
            email: "learner@example.com".to_owned(),
        }
    }

    #[test]
    fn signed_round_trip() {
        let verifier = TokenVerifier::signed("s3cret");
        let token = verifier.issue(&learner(), 2_000).expect("issue");
        assert_eq!(verifier.verify_at(&token, 1_000), Ok(learner()));
    }

    #[test]
    fn rejects_other_secret() {
        let token = TokenVerifier::signed("a")
            .issue(&learner(), 2_000)
            .expect("issue");
        assert_eq!(
            TokenVerifier::signed("b").verify_at(&token, 1_000),
            Err(AuthError::BadSignature)
        );
    }

    #[test]
    fn rejects_tampered_payload() {
        let verifier = TokenVerifier::signed("s3cret");
        let token = verifier.issue(&learner(), 2_000).expect("issue");
        let (_, signature) = token.split_once('.').expect("two parts");
        let forged_payload = hex::encode(br#"{"uid":"admin","exp":9999999999}"#);
        assert_eq!(
            verifier.verify_at(&format!("{forged_payload}.{signature}"), 1_000),
            Err(AuthError::BadSignature)
        );
    }

    #[test]
    fn rejects_expired_and_malformed() {
        let verifier = TokenVerifier::signed("s3cret");
        let token = verifier.issue(&learner(), 1_000).expect("issue");
        assert_eq!(verifier.verify_at(&token, 1_000), Err(AuthError::Expired));
        assert_eq!(verifier.verify_at("no-dot", 0), Err(AuthError::Malformed));
        assert_eq!(verifier.verify_at("zz.zz", 0), Err(AuthError::Malformed));
        assert_eq!(verifier.verify_at("   ", 0), Err(AuthError::Malformed));
    }

    #[test]
    fn raw_mode_uses_token_as_uid() {
        let verifier = TokenVerifier::raw();
        let identity = verifier.verify("someone").expect("raw accepts");
        assert_eq!(identity.uid, "someone");
        assert!(identity.email.is_empty());
        assert!(format!("{verifier:?}").contains("raw"));
    }
}
