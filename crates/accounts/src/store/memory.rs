//! In-memory account store for tests and development.

use std::collections::HashMap;
use std::sync::RwLock;

use async_trait::async_trait;

use vitryna_core::{AccountId, Email, Phone};

use super::{AccountStore, StoreError};
use crate::models::{Account, PhoneVerification};

/// In-memory store backed by a `HashMap`.
///
/// Useful for tests and local development. Not suitable for production as
/// data is lost on restart.
#[derive(Default)]
pub struct MemoryStore {
    accounts: RwLock<HashMap<AccountId, Account>>,
    verifications: RwLock<Vec<PhoneVerification>>,
}

impl MemoryStore {
    /// Create a new empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored accounts.
    ///
    /// # Panics
    ///
    /// Panics if the store lock is poisoned.
    #[must_use]
    pub fn account_count(&self) -> usize {
        self.accounts.read().expect("account store lock poisoned").len()
    }

    /// Drop an account record entirely.
    ///
    /// The engine never deletes accounts; this exists so tests can orphan a
    /// token.
    ///
    /// # Panics
    ///
    /// Panics if the store lock is poisoned.
    pub fn remove(&self, id: AccountId) {
        self.accounts
            .write()
            .expect("account store lock poisoned")
            .remove(&id);
    }
}

#[async_trait]
impl AccountStore for MemoryStore {
    async fn find_by_email(&self, email: &Email) -> Result<Option<Account>, StoreError> {
        Ok(self
            .accounts
            .read()
            .expect("account store lock poisoned")
            .values()
            .find(|a| &a.email == email)
            .cloned())
    }

    async fn find_by_phone(&self, phone: &Phone) -> Result<Option<Account>, StoreError> {
        Ok(self
            .accounts
            .read()
            .expect("account store lock poisoned")
            .values()
            .find(|a| &a.phone == phone)
            .cloned())
    }

    async fn find_by_id(&self, id: AccountId) -> Result<Option<Account>, StoreError> {
        Ok(self
            .accounts
            .read()
            .expect("account store lock poisoned")
            .get(&id)
            .cloned())
    }

    async fn insert(&self, account: &Account) -> Result<(), StoreError> {
        let mut accounts = self.accounts.write().expect("account store lock poisoned");
        if accounts.values().any(|a| a.email == account.email) {
            return Err(StoreError::Conflict("email already exists".to_owned()));
        }
        accounts.insert(account.id, account.clone());
        Ok(())
    }

    async fn update(&self, account: &Account) -> Result<(), StoreError> {
        let mut accounts = self.accounts.write().expect("account store lock poisoned");
        if !accounts.contains_key(&account.id) {
            return Err(StoreError::NotFound);
        }
        if accounts
            .values()
            .any(|a| a.id != account.id && a.email == account.email)
        {
            return Err(StoreError::Conflict("email already exists".to_owned()));
        }
        accounts.insert(account.id, account.clone());
        Ok(())
    }

    async fn list_all(&self) -> Result<Vec<Account>, StoreError> {
        Ok(self
            .accounts
            .read()
            .expect("account store lock poisoned")
            .values()
            .cloned()
            .collect())
    }

    async fn insert_verification(&self, record: &PhoneVerification) -> Result<(), StoreError> {
        self.verifications
            .write()
            .expect("verification lock poisoned")
            .push(record.clone());
        Ok(())
    }

    async fn latest_verification(
        &self,
        phone: &Phone,
    ) -> Result<Option<PhoneVerification>, StoreError> {
        Ok(self
            .verifications
            .read()
            .expect("verification lock poisoned")
            .iter()
            .filter(|v| &v.phone == phone)
            .max_by_key(|v| v.created_at)
            .cloned())
    }
}
