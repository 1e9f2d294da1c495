//! Profile mutation engine.
//!
//! Both change operations replace their sub-record wholesale: a field the
//! caller omits is cleared, not merged. That matches what the storefront
//! clients already rely on.

use chrono::{NaiveDate, Utc};

use vitryna_core::{AccountId, Email, Phone};

use crate::error::{EngineError, Result};
use crate::locks::AccountLocks;
use crate::models::{Account, AccountProfile, DeliveryAddress};
use crate::password::{hash_password, verify_password};
use crate::store::{AccountStore, StoreError};

/// Replacement personal-data sub-record.
///
/// The order history is deliberately absent: it is append-only and not
/// caller-writable.
#[derive(Debug, Clone)]
pub struct ProfileData {
    pub first_name: String,
    pub last_name: String,
    pub email: Email,
    pub phone: Phone,
    pub birthday: Option<NaiveDate>,
}

/// Data, delivery and password change operations.
pub struct ProfileService<'a> {
    store: &'a dyn AccountStore,
    locks: &'a AccountLocks,
}

impl<'a> ProfileService<'a> {
    /// Create the engine over its collaborators.
    #[must_use]
    pub const fn new(store: &'a dyn AccountStore, locks: &'a AccountLocks) -> Self {
        Self { store, locks }
    }

    /// Replace the personal-data sub-record.
    ///
    /// # Errors
    ///
    /// Returns `EngineError::NotFound` when the account is absent and
    /// `EngineError::AlreadyExists` when the replacement email belongs to a
    /// different account.
    pub async fn change_data(&self, id: AccountId, data: ProfileData) -> Result<AccountProfile> {
        let _guard = self.locks.acquire(id).await;
        let mut account = self.fetch(id).await?;

        account.first_name = data.first_name;
        account.last_name = data.last_name;
        account.email = data.email;
        account.phone = data.phone;
        account.birthday = data.birthday;
        account.updated_at = Utc::now();

        self.put(&account).await?;
        Ok(account.profile())
    }

    /// Replace the delivery-address sub-record.
    ///
    /// # Errors
    ///
    /// Returns `EngineError::NotFound` when the account is absent.
    pub async fn change_delivery(
        &self,
        id: AccountId,
        delivery: DeliveryAddress,
    ) -> Result<AccountProfile> {
        let _guard = self.locks.acquire(id).await;
        let mut account = self.fetch(id).await?;

        account.delivery = delivery;
        account.updated_at = Utc::now();

        self.put(&account).await?;
        Ok(account.profile())
    }

    /// Verify the current password and store a hash of the new one.
    ///
    /// # Errors
    ///
    /// Returns `EngineError::NotFound` when the account is absent,
    /// `EngineError::PasswordIncorrect` (without mutation) when the current
    /// password does not match, and `EngineError::InvalidInput` when the
    /// new password is too short.
    pub async fn change_password(
        &self,
        id: AccountId,
        current_password: &str,
        new_password: &str,
    ) -> Result<()> {
        let _guard = self.locks.acquire(id).await;
        let mut account = self.fetch(id).await?;

        if !verify_password(current_password, &account.password_hash) {
            return Err(EngineError::PasswordIncorrect);
        }

        account.password_hash = hash_password(new_password)?;
        account.updated_at = Utc::now();

        self.put(&account).await?;
        Ok(())
    }

    async fn fetch(&self, id: AccountId) -> Result<Account> {
        self.store
            .find_by_id(id)
            .await?
            .ok_or(EngineError::NotFound)
    }

    async fn put(&self, account: &Account) -> Result<()> {
        self.store.update(account).await.map_err(|e| match e {
            StoreError::Conflict(_) => EngineError::AlreadyExists,
            StoreError::NotFound => EngineError::NotFound,
            other => EngineError::Store(other),
        })
    }
}
