//! Authentication engine: login and token verification.

use vitryna_core::{Email, Phone};

use crate::error::{EngineError, Result};
use crate::models::{Account, AccountProfile};
use crate::password::verify_password;
use crate::store::AccountStore;
use crate::token::TokenService;

/// Login and token verification over the store and the token service.
pub struct AuthService<'a> {
    store: &'a dyn AccountStore,
    tokens: &'a TokenService,
}

impl<'a> AuthService<'a> {
    /// Create the engine over its collaborators.
    #[must_use]
    pub const fn new(store: &'a dyn AccountStore, tokens: &'a TokenService) -> Self {
        Self { store, tokens }
    }

    /// Authenticate with an email-or-phone identifier and a password.
    ///
    /// The identifier is resolved email-first: a value that parses as an
    /// email and matches an account wins before any phone lookup happens.
    ///
    /// # Errors
    ///
    /// Returns `EngineError::NotFound` when no account matches,
    /// `EngineError::PasswordIncorrect` on hash mismatch, and
    /// `EngineError::AccountNotActive` (carrying the phone, so the client
    /// can re-trigger verification) when the phone was never verified.
    pub async fn login(&self, identifier: &str, password: &str) -> Result<String> {
        let account = self
            .resolve_identifier(identifier)
            .await?
            .ok_or(EngineError::NotFound)?;

        if !verify_password(password, &account.password_hash) {
            return Err(EngineError::PasswordIncorrect);
        }

        if !account.activated {
            return Err(EngineError::AccountNotActive {
                phone: account.phone,
            });
        }

        Ok(self.tokens.sign(account.id)?)
    }

    /// Verify a token and return the account snapshot it identifies.
    ///
    /// # Errors
    ///
    /// Returns `EngineError::TokenIncorrect` for malformed, unverifiable or
    /// expired tokens, and for tokens whose account no longer exists.
    pub async fn verify(&self, token: &str) -> Result<AccountProfile> {
        let account_id = self.tokens.verify(token)?;

        self.store
            .find_by_id(account_id)
            .await?
            .map(|account| account.profile())
            .ok_or(EngineError::TokenIncorrect)
    }

    /// Try the identifier as an email, then as a phone.
    async fn resolve_identifier(&self, identifier: &str) -> Result<Option<Account>> {
        if let Ok(email) = Email::parse(identifier)
            && let Some(account) = self.store.find_by_email(&email).await?
        {
            return Ok(Some(account));
        }

        if let Ok(phone) = Phone::parse(identifier) {
            return Ok(self.store.find_by_phone(&phone).await?);
        }

        Ok(None)
    }
}
