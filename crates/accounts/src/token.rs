//! Identity token service.
//!
//! Issues compact HS256 tokens carrying the account id. The source system
//! signed tokens without an expiry; here every token carries `iat`/`exp`
//! and verification enforces them.

use chrono::{Duration, Utc};
use jsonwebtoken::{DecodingKey, EncodingKey, Header, Validation, decode, encode};
use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use vitryna_core::AccountId;

/// Errors that can occur in token operations.
#[derive(Debug, Error)]
pub enum TokenError {
    /// Signing failed (key or serialization problem).
    #[error("token signing failed: {0}")]
    Sign(jsonwebtoken::errors::Error),

    /// The token is malformed, has a bad signature, or is expired. The
    /// caller gets no finer distinction than this.
    #[error("token invalid")]
    Invalid,
}

/// Claims carried by an identity token.
#[derive(Debug, Serialize, Deserialize)]
pub struct Claims {
    /// The account id, the token's only payload.
    pub sub: AccountId,
    /// Issued-at, seconds since the epoch.
    pub iat: i64,
    /// Expiry, seconds since the epoch.
    pub exp: i64,
}

/// Signs and verifies identity tokens.
pub struct TokenService {
    encoding: EncodingKey,
    decoding: DecodingKey,
    ttl: Duration,
}

impl TokenService {
    /// Create a token service from the shared signing secret.
    #[must_use]
    pub fn new(secret: &SecretString, ttl: Duration) -> Self {
        let bytes = secret.expose_secret().as_bytes();
        Self {
            encoding: EncodingKey::from_secret(bytes),
            decoding: DecodingKey::from_secret(bytes),
            ttl,
        }
    }

    /// Sign a token for `account_id`, valid for the configured TTL.
    ///
    /// # Errors
    ///
    /// Returns `TokenError::Sign` if encoding fails.
    pub fn sign(&self, account_id: AccountId) -> Result<String, TokenError> {
        let now = Utc::now();
        let claims = Claims {
            sub: account_id,
            iat: now.timestamp(),
            exp: (now + self.ttl).timestamp(),
        };

        encode(&Header::default(), &claims, &self.encoding).map_err(TokenError::Sign)
    }

    /// Verify a token and extract the account id.
    ///
    /// # Errors
    ///
    /// Returns `TokenError::Invalid` for anything that does not verify:
    /// malformed input, wrong signature, or an elapsed `exp`.
    pub fn verify(&self, token: &str) -> Result<AccountId, TokenError> {
        decode::<Claims>(token, &self.decoding, &Validation::default())
            .map(|data| data.claims.sub)
            .map_err(|_| TokenError::Invalid)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn service(secret: &str, ttl: Duration) -> TokenService {
        TokenService::new(&SecretString::from(secret.to_owned()), ttl)
    }

    #[test]
    fn test_sign_verify_roundtrip() {
        let tokens = service("0vR!pZ83kQm#eD41xT&u", Duration::hours(1));
        let id = AccountId::generate();

        let token = tokens.sign(id).unwrap();
        assert_eq!(tokens.verify(&token).unwrap(), id);
    }

    #[test]
    fn test_wrong_secret_rejected() {
        let signer = service("0vR!pZ83kQm#eD41xT&u", Duration::hours(1));
        let other = service("d9F$wL27cB%nH05sYj@k", Duration::hours(1));

        let token = signer.sign(AccountId::generate()).unwrap();
        assert!(matches!(other.verify(&token), Err(TokenError::Invalid)));
    }

    #[test]
    fn test_expired_token_rejected() {
        // jsonwebtoken's default validation keeps a 60s leeway
        let tokens = service("0vR!pZ83kQm#eD41xT&u", Duration::seconds(-120));
        let token = tokens.sign(AccountId::generate()).unwrap();
        assert!(matches!(tokens.verify(&token), Err(TokenError::Invalid)));
    }

    #[test]
    fn test_garbage_rejected() {
        let tokens = service("0vR!pZ83kQm#eD41xT&u", Duration::hours(1));
        assert!(matches!(
            tokens.verify("not.a.token"),
            Err(TokenError::Invalid)
        ));
        assert!(matches!(tokens.verify(""), Err(TokenError::Invalid)));
    }
}
