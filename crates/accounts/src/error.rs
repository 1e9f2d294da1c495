//! Engine-level error taxonomy.
//!
//! Everything in [`EngineError`] except `Store` and `Internal` is an
//! expected, recoverable outcome returned to the caller as data. Only store
//! failures and programming errors surface as internal errors.

use thiserror::Error;

use vitryna_core::Phone;

use crate::clients::GatewayError;
use crate::password::PasswordError;
use crate::store::StoreError;
use crate::token::TokenError;

/// Outcome taxonomy shared by all engine operations.
#[derive(Debug, Error)]
pub enum EngineError {
    /// Account, verification record, or bonus entry absent.
    #[error("not found")]
    NotFound,

    /// Duplicate email at registration or on profile change.
    #[error("account already exists")]
    AlreadyExists,

    /// Duplicate pending bonus entry.
    #[error("conflict")]
    Conflict,

    /// Password does not match the stored hash.
    #[error("password incorrect")]
    PasswordIncorrect,

    /// Submitted verification code does not match the stored one.
    #[error("code incorrect")]
    CodeIncorrect,

    /// Token malformed, unverifiable, expired, or pointing at a removed
    /// account.
    #[error("token incorrect")]
    TokenIncorrect,

    /// Credentials are valid but the phone was never verified. Carries the
    /// phone so a client can re-trigger verification.
    #[error("account not active")]
    AccountNotActive {
        /// Phone to resend the verification code to.
        phone: Phone,
    },

    /// A request field failed validation before reaching the store.
    #[error("invalid input: {0}")]
    InvalidInput(String),

    /// Downstream SMS or order service failure.
    #[error("gateway error: {0}")]
    Gateway(#[from] GatewayError),

    /// Unexpected store failure.
    #[error("store error: {0}")]
    Store(StoreError),

    /// Programming or environment error.
    #[error("internal error: {0}")]
    Internal(String),
}

impl EngineError {
    /// The HTTP-like code this outcome maps to in the API envelope.
    #[must_use]
    pub const fn code(&self) -> u16 {
        match self {
            Self::NotFound => 404,
            Self::AlreadyExists => 409,
            Self::Conflict | Self::AccountNotActive { .. } => 403,
            Self::PasswordIncorrect | Self::CodeIncorrect | Self::TokenIncorrect => 401,
            Self::InvalidInput(_) | Self::Gateway(_) => 400,
            Self::Store(_) | Self::Internal(_) => 500,
        }
    }
}

impl From<StoreError> for EngineError {
    fn from(err: StoreError) -> Self {
        // Services that expect a NotFound/Conflict outcome match on the
        // store error explicitly; reaching this conversion means the
        // failure was not part of the operation's contract.
        Self::Store(err)
    }
}

impl From<PasswordError> for EngineError {
    fn from(err: PasswordError) -> Self {
        match err {
            PasswordError::TooShort => Self::InvalidInput(err.to_string()),
            PasswordError::Hash => Self::Internal("password hashing failed".to_owned()),
        }
    }
}

impl From<TokenError> for EngineError {
    fn from(err: TokenError) -> Self {
        match err {
            TokenError::Invalid => Self::TokenIncorrect,
            TokenError::Sign(e) => Self::Internal(format!("token signing failed: {e}")),
        }
    }
}

/// Result type alias for engine operations.
pub type Result<T> = std::result::Result<T, EngineError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_envelope_codes() {
        assert_eq!(EngineError::NotFound.code(), 404);
        assert_eq!(EngineError::AlreadyExists.code(), 409);
        assert_eq!(EngineError::Conflict.code(), 403);
        assert_eq!(EngineError::PasswordIncorrect.code(), 401);
        assert_eq!(EngineError::CodeIncorrect.code(), 401);
        assert_eq!(EngineError::TokenIncorrect.code(), 401);
        assert_eq!(EngineError::InvalidInput("x".to_owned()).code(), 400);
        assert_eq!(EngineError::Internal("x".to_owned()).code(), 500);
    }

    #[test]
    fn test_token_error_conversion() {
        let err: EngineError = TokenError::Invalid.into();
        assert!(matches!(err, EngineError::TokenIncorrect));
    }

    #[test]
    fn test_password_error_conversion() {
        let err: EngineError = PasswordError::TooShort.into();
        assert!(matches!(err, EngineError::InvalidInput(_)));
    }
}
