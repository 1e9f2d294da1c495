//! Per-account mutation serialization.
//!
//! Every engine mutation is a read-then-write against the store; without a
//! guard two concurrent mutations of the same account interleave and the
//! second write silently drops the first. Holding the account's lock across
//! the read-modify-write closes that window without serializing unrelated
//! accounts against each other.

use std::collections::HashMap;
use std::sync::{Arc, Mutex as StdMutex};

use tokio::sync::{Mutex, OwnedMutexGuard};

use vitryna_core::AccountId;

/// Registry of one async mutex per account id.
///
/// Lock entries are created on first use and kept for the process lifetime;
/// the map grows with the number of distinct accounts mutated, a few dozen
/// bytes each.
#[derive(Default)]
pub struct AccountLocks {
    inner: StdMutex<HashMap<AccountId, Arc<Mutex<()>>>>,
}

impl AccountLocks {
    /// Create an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Acquire the lock for `id`, waiting if another mutation holds it.
    ///
    /// # Panics
    ///
    /// Panics if the registry mutex is poisoned.
    pub async fn acquire(&self, id: AccountId) -> OwnedMutexGuard<()> {
        let entry = {
            let mut map = self.inner.lock().expect("lock registry poisoned");
            Arc::clone(map.entry(id).or_default())
        };
        entry.lock_owned().await
    }
}
