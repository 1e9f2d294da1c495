//! Phone verification workflow.
//!
//! Registration creates the account in the inactive state and issues a
//! 4-digit code over SMS; submitting the matching code flips the account
//! active, which is what gates login.

use chrono::Utc;
use rand::Rng;

use vitryna_core::{AccountId, Email, Phone};

use crate::clients::SmsGateway;
use crate::error::{EngineError, Result};
use crate::locks::AccountLocks;
use crate::models::{Account, AccountProfile, BonusAccount, DeliveryAddress, PhoneVerification};
use crate::password::hash_password;
use crate::store::{AccountStore, StoreError};

/// Registration candidate.
#[derive(Debug, Clone)]
pub struct RegisterRequest {
    pub first_name: String,
    pub last_name: String,
    pub email: Email,
    pub phone: Phone,
    /// Plaintext; hashed before the record is built.
    pub password: String,
    pub birthday: Option<chrono::NaiveDate>,
}

/// Phone verification workflow.
pub struct VerificationService<'a> {
    store: &'a dyn AccountStore,
    sms: &'a dyn SmsGateway,
    locks: &'a AccountLocks,
}

impl<'a> VerificationService<'a> {
    /// Create the workflow over its collaborators.
    #[must_use]
    pub const fn new(
        store: &'a dyn AccountStore,
        sms: &'a dyn SmsGateway,
        locks: &'a AccountLocks,
    ) -> Self {
        Self { store, sms, locks }
    }

    /// Register a new account and dispatch its verification code.
    ///
    /// The account is created inactive with an empty bonus state. A failed
    /// SMS dispatch does not fail the registration - the code is stored and
    /// can be resent.
    ///
    /// # Errors
    ///
    /// Returns `EngineError::AlreadyExists` if the email is taken and
    /// `EngineError::InvalidInput` if the password is too short.
    pub async fn register(&self, candidate: RegisterRequest) -> Result<AccountProfile> {
        if self.store.find_by_email(&candidate.email).await?.is_some() {
            return Err(EngineError::AlreadyExists);
        }

        let password_hash = hash_password(&candidate.password)?;
        let now = Utc::now();
        let account = Account {
            id: AccountId::generate(),
            first_name: candidate.first_name,
            last_name: candidate.last_name,
            email: candidate.email,
            phone: candidate.phone.clone(),
            password_hash,
            birthday: candidate.birthday,
            delivery: DeliveryAddress::default(),
            order_history: Vec::new(),
            activated: false,
            bonus: BonusAccount::default(),
            created_at: now,
            updated_at: now,
        };

        self.store.insert(&account).await.map_err(|e| match e {
            StoreError::Conflict(_) => EngineError::AlreadyExists,
            other => EngineError::Store(other),
        })?;

        let record = PhoneVerification {
            phone: candidate.phone,
            code: generate_code(),
            created_at: now,
        };
        self.store.insert_verification(&record).await?;

        if let Err(e) = self.sms.send_code(&record.phone, &record.code).await {
            tracing::warn!(
                phone = %record.phone,
                error = %e,
                "verification code dispatch failed; code stays resendable"
            );
        }

        Ok(account.profile())
    }

    /// Check a submitted code and activate the account on match.
    ///
    /// Comparison is exact string equality against the latest stored code
    /// for the phone. There is no attempt limit; a mismatch changes
    /// nothing. Activating an already-active account is a no-op.
    ///
    /// # Errors
    ///
    /// Returns `EngineError::NotFound` when no verification record or no
    /// account exists for the phone, and `EngineError::CodeIncorrect` on
    /// mismatch.
    pub async fn submit_code(&self, phone: &Phone, code: &str) -> Result<()> {
        let record = self
            .store
            .latest_verification(phone)
            .await?
            .ok_or(EngineError::NotFound)?;

        if record.code != code {
            return Err(EngineError::CodeIncorrect);
        }

        let account = self
            .store
            .find_by_phone(phone)
            .await?
            .ok_or(EngineError::NotFound)?;

        let _guard = self.locks.acquire(account.id).await;
        let mut account = self
            .store
            .find_by_id(account.id)
            .await?
            .ok_or(EngineError::NotFound)?;

        if !account.activated {
            account.activated = true;
            account.updated_at = Utc::now();
            self.store.update(&account).await?;
        }

        Ok(())
    }

    /// Re-dispatch the stored code for `phone`.
    ///
    /// The code is never regenerated here; the one issued at registration
    /// is sent again.
    ///
    /// # Errors
    ///
    /// Returns `EngineError::NotFound` when no record exists and
    /// `EngineError::Gateway` when the SMS gateway fails.
    pub async fn resend_code(&self, phone: &Phone) -> Result<()> {
        let record = self
            .store
            .latest_verification(phone)
            .await?
            .ok_or(EngineError::NotFound)?;

        self.sms.send_code(&record.phone, &record.code).await?;
        Ok(())
    }
}

/// Generate a 4-digit verification code, zero-padded.
#[must_use]
pub fn generate_code() -> String {
    let code: u32 = rand::rng().random_range(0..10_000);
    format!("{code:04}")
}
