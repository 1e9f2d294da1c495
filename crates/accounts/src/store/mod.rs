//! Account store contract.
//!
//! The production document store lives outside this crate; the engine only
//! depends on the semantics below. Read-your-write consistency is expected
//! within one operation chain but not across concurrent operations - the
//! per-account locks in [`crate::locks`] provide that serialization.

mod memory;

pub use memory::MemoryStore;

use async_trait::async_trait;
use thiserror::Error;

use vitryna_core::{AccountId, Email, Phone};

use crate::models::{Account, PhoneVerification};

/// Errors that can occur in store operations.
#[derive(Debug, Error)]
pub enum StoreError {
    /// A uniqueness constraint was violated (duplicate account email).
    #[error("conflict: {0}")]
    Conflict(String),

    /// The addressed record does not exist.
    #[error("record not found")]
    NotFound,

    /// The backend failed (connection lost, malformed document, ...).
    #[error("store backend error: {0}")]
    Backend(String),
}

/// Persistence contract for accounts and phone verification records.
///
/// `insert` and `update` enforce email uniqueness; `update` replaces the
/// whole record addressed by `account.id`. Verification records accumulate -
/// registration never upserts - and `latest_verification` resolves which of
/// the coexisting records for a phone is authoritative.
#[async_trait]
pub trait AccountStore: Send + Sync {
    /// Find an account by its unique email.
    async fn find_by_email(&self, email: &Email) -> Result<Option<Account>, StoreError>;

    /// Find an account by phone. When adversarial data has given several
    /// accounts the same phone, which one is returned is unspecified.
    async fn find_by_phone(&self, phone: &Phone) -> Result<Option<Account>, StoreError>;

    /// Find an account by id.
    async fn find_by_id(&self, id: AccountId) -> Result<Option<Account>, StoreError>;

    /// Insert a new account.
    ///
    /// # Errors
    ///
    /// Returns `StoreError::Conflict` if the email is already taken.
    async fn insert(&self, account: &Account) -> Result<(), StoreError>;

    /// Replace the stored record with `account`, addressed by its id.
    ///
    /// # Errors
    ///
    /// Returns `StoreError::NotFound` if no record has this id, and
    /// `StoreError::Conflict` if the replacement email collides with a
    /// different account.
    async fn update(&self, account: &Account) -> Result<(), StoreError>;

    /// All accounts, for the expiration sweep.
    async fn list_all(&self) -> Result<Vec<Account>, StoreError>;

    /// Append a verification record. Existing records for the same phone
    /// are left in place.
    async fn insert_verification(&self, record: &PhoneVerification) -> Result<(), StoreError>;

    /// The most recently created verification record for `phone`, if any.
    async fn latest_verification(
        &self,
        phone: &Phone,
    ) -> Result<Option<PhoneVerification>, StoreError>;
}
