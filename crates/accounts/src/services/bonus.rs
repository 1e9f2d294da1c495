//! Bonus engine: pending entries, activation, and the expiration sweep.
//!
//! Points enter as pending entries when orders are placed, become score on
//! explicit activation, and the whole bonus state evaporates once the
//! 12-month earning window elapses. The window opens on the first
//! activation that moves the score away from zero.

use chrono::Utc;

use vitryna_core::{AccountId, BonusScore, OrderId};

use crate::error::{EngineError, Result};
use crate::locks::AccountLocks;
use crate::models::BonusEntry;
use crate::state::Engine;
use crate::store::AccountStore;

/// Days after which an open earning window expires.
pub const WINDOW_DAYS: i64 = 365;

/// Pending/activation/sweep operations.
pub struct BonusService<'a> {
    store: &'a dyn AccountStore,
    locks: &'a AccountLocks,
}

impl<'a> BonusService<'a> {
    /// Create the engine over its collaborators.
    #[must_use]
    pub const fn new(store: &'a dyn AccountStore, locks: &'a AccountLocks) -> Self {
        Self { store, locks }
    }

    /// Record a pending bonus entry for an account.
    ///
    /// Duplicate order ids are rejected idempotently: an id that is already
    /// pending - or was already activated - leaves the state unchanged.
    ///
    /// # Errors
    ///
    /// Returns `EngineError::NotFound` when the account is absent and
    /// `EngineError::Conflict` on a duplicate entry id.
    pub async fn record_pending(&self, account_id: AccountId, entry: BonusEntry) -> Result<()> {
        let _guard = self.locks.acquire(account_id).await;
        let mut account = self
            .store
            .find_by_id(account_id)
            .await?
            .ok_or(EngineError::NotFound)?;

        let duplicate = account.bonus.pending.contains_key(&entry.id)
            || account.bonus.history.iter().any(|e| e.id == entry.id);
        if duplicate {
            return Err(EngineError::Conflict);
        }

        account.bonus.pending.insert(entry.id.clone(), entry);
        account.updated_at = Utc::now();
        self.store.update(&account).await?;
        Ok(())
    }

    /// Move a pending entry into the history and add its worth to the score.
    ///
    /// The first activation that takes the score away from zero opens the
    /// 12-month earning window; this is the only transition that does.
    ///
    /// # Errors
    ///
    /// Returns `EngineError::NotFound` when the account is absent or the
    /// entry id is not pending (a second activation of the same id lands
    /// here, which is what makes activation idempotent in effect).
    pub async fn activate(&self, account_id: AccountId, entry_id: &OrderId) -> Result<BonusScore> {
        let _guard = self.locks.acquire(account_id).await;
        let mut account = self
            .store
            .find_by_id(account_id)
            .await?
            .ok_or(EngineError::NotFound)?;

        let Some(entry) = account.bonus.pending.remove(entry_id) else {
            return Err(EngineError::NotFound);
        };

        let was_zero = account.bonus.score.is_zero();
        account.bonus.score = account.bonus.score.plus(entry.worth);
        account.bonus.history.push(entry);
        if was_zero {
            account.bonus.started_at = Some(Utc::now().date_naive());
        }
        account.updated_at = Utc::now();

        self.store.update(&account).await?;
        Ok(account.bonus.score)
    }

    /// Expire every earning window older than [`WINDOW_DAYS`].
    ///
    /// Fans out one read-modify-write per account, re-reading each
    /// candidate under its lock so a concurrent activation is not clobbered
    /// with stale state. Returns the number of accounts whose bonus state
    /// was reset.
    ///
    /// # Errors
    ///
    /// Returns `EngineError::Store` when the store fails; individual
    /// accounts that disappear mid-sweep are skipped.
    pub async fn sweep_expirations(&self) -> Result<usize> {
        let today = Utc::now().date_naive();
        let mut expired = 0;

        for candidate in self.store.list_all().await? {
            let Some(started) = candidate.bonus.started_at else {
                continue;
            };
            if (today - started).num_days() < WINDOW_DAYS {
                continue;
            }

            let _guard = self.locks.acquire(candidate.id).await;
            let Some(mut account) = self.store.find_by_id(candidate.id).await? else {
                continue;
            };
            // Re-check under the lock; the window may have been reset by a
            // concurrent sweep or moved by an activation.
            let Some(started) = account.bonus.started_at else {
                continue;
            };
            if (today - started).num_days() < WINDOW_DAYS {
                continue;
            }

            account.bonus.reset();
            account.updated_at = Utc::now();
            self.store.update(&account).await?;
            expired += 1;
        }

        tracing::info!(expired, "bonus expiration sweep finished");
        Ok(expired)
    }
}

/// Run the expiration sweep on a fixed schedule, forever.
///
/// Intended to be spawned once at startup. Overlap with a still-running
/// sweep is prevented by the engine's single-flight gate; a skipped run is
/// logged and the next tick tries again.
pub async fn run_sweeper(engine: Engine, period: std::time::Duration) {
    let mut interval = tokio::time::interval(period);
    interval.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);

    loop {
        interval.tick().await;
        match engine.sweep_expirations().await {
            Ok(Some(expired)) => {
                tracing::debug!(expired, "scheduled sweep completed");
            }
            Ok(None) => {
                tracing::warn!("scheduled sweep skipped; previous run still in flight");
            }
            Err(e) => {
                tracing::error!(error = %e, "scheduled sweep failed");
            }
        }
    }
}
