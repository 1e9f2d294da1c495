//! Bonus pending/activation lifecycle and the expiration sweep.

#![allow(clippy::unwrap_used)]

mod common;

use chrono::{Duration, Utc};

use common::{activated_account, context};

use vitryna_accounts::error::EngineError;
use vitryna_accounts::models::BonusEntry;
use vitryna_accounts::store::AccountStore;
use vitryna_core::{AccountId, BonusScore, OrderId};

fn entry(id: &str, worth: u64) -> BonusEntry {
    BonusEntry {
        id: OrderId::from(id),
        worth,
    }
}

#[tokio::test]
async fn duplicate_pending_entry_is_a_conflict() {
    let ctx = context();
    let id = activated_account(&ctx, "a@x.com", "+380501234100").await;
    let bonus = ctx.engine.bonus();

    bonus.record_pending(id, entry("ORD-1", 120)).await.unwrap();
    let err = bonus
        .record_pending(id, entry("ORD-1", 120))
        .await
        .unwrap_err();
    assert!(matches!(err, EngineError::Conflict));

    let account = ctx.store.find_by_id(id).await.unwrap().unwrap();
    assert_eq!(account.bonus.pending.len(), 1);
}

#[tokio::test]
async fn record_pending_for_missing_account_is_not_found() {
    let ctx = context();
    let err = ctx
        .engine
        .bonus()
        .record_pending(AccountId::generate(), entry("ORD-1", 120))
        .await
        .unwrap_err();
    assert!(matches!(err, EngineError::NotFound));
}

#[tokio::test]
async fn activation_moves_entry_and_scores_exactly_once() {
    let ctx = context();
    let id = activated_account(&ctx, "a@x.com", "+380501234100").await;
    let bonus = ctx.engine.bonus();
    let order = OrderId::from("ORD-1");

    bonus.record_pending(id, entry("ORD-1", 120)).await.unwrap();

    let score = bonus.activate(id, &order).await.unwrap();
    assert_eq!(score, BonusScore::new(120));

    // Second activation of the same entry id: the entry is no longer
    // pending, so nothing is double-counted.
    let err = bonus.activate(id, &order).await.unwrap_err();
    assert!(matches!(err, EngineError::NotFound));

    let account = ctx.store.find_by_id(id).await.unwrap().unwrap();
    assert_eq!(account.bonus.score, BonusScore::new(120));
    assert_eq!(account.bonus.history.len(), 1);
    assert!(account.bonus.pending.is_empty());
}

#[tokio::test]
async fn activated_entry_id_cannot_be_recorded_again() {
    let ctx = context();
    let id = activated_account(&ctx, "a@x.com", "+380501234100").await;
    let bonus = ctx.engine.bonus();
    let order = OrderId::from("ORD-1");

    bonus.record_pending(id, entry("ORD-1", 120)).await.unwrap();
    bonus.activate(id, &order).await.unwrap();

    let err = bonus
        .record_pending(id, entry("ORD-1", 120))
        .await
        .unwrap_err();
    assert!(matches!(err, EngineError::Conflict));
}

#[tokio::test]
async fn first_nonzero_activation_opens_the_window_once() {
    let ctx = context();
    let id = activated_account(&ctx, "a@x.com", "+380501234100").await;
    let bonus = ctx.engine.bonus();

    bonus.record_pending(id, entry("ORD-1", 120)).await.unwrap();
    bonus.record_pending(id, entry("ORD-2", 80)).await.unwrap();

    bonus.activate(id, &OrderId::from("ORD-1")).await.unwrap();
    let account = ctx.store.find_by_id(id).await.unwrap().unwrap();
    let opened = account.bonus.started_at.expect("window opened");
    assert_eq!(opened, Utc::now().date_naive());

    // Pin the window to an earlier date; the second activation must not
    // move it.
    let mut account = account;
    let pinned = Utc::now().date_naive() - Duration::days(30);
    account.bonus.started_at = Some(pinned);
    ctx.store.update(&account).await.unwrap();

    bonus.activate(id, &OrderId::from("ORD-2")).await.unwrap();
    let account = ctx.store.find_by_id(id).await.unwrap().unwrap();
    assert_eq!(account.bonus.started_at, Some(pinned));
    assert_eq!(account.bonus.score, BonusScore::new(200));
}

#[tokio::test]
async fn sweep_expires_old_windows_and_spares_young_ones() {
    let ctx = context();
    let old = activated_account(&ctx, "old@x.com", "+380501234100").await;
    let young = activated_account(&ctx, "young@x.com", "+380501234200").await;
    let dormant = activated_account(&ctx, "dormant@x.com", "+380501234300").await;
    let bonus = ctx.engine.bonus();

    for (id, order) in [(old, "ORD-1"), (young, "ORD-2")] {
        bonus.record_pending(id, entry(order, 150)).await.unwrap();
        bonus.activate(id, &OrderId::from(order)).await.unwrap();
    }

    // Age the first window past a year, keep the second young.
    let mut account = ctx.store.find_by_id(old).await.unwrap().unwrap();
    account.bonus.started_at = Some(Utc::now().date_naive() - Duration::days(366));
    ctx.store.update(&account).await.unwrap();

    let mut account = ctx.store.find_by_id(young).await.unwrap().unwrap();
    account.bonus.started_at = Some(Utc::now().date_naive() - Duration::days(10));
    ctx.store.update(&account).await.unwrap();

    let expired = ctx.engine.sweep_expirations().await.unwrap();
    assert_eq!(expired, Some(1));

    let swept = ctx.store.find_by_id(old).await.unwrap().unwrap();
    assert!(swept.bonus.score.is_zero());
    assert!(swept.bonus.history.is_empty());
    assert!(swept.bonus.pending.is_empty());
    assert!(swept.bonus.started_at.is_none());

    let untouched = ctx.store.find_by_id(young).await.unwrap().unwrap();
    assert_eq!(untouched.bonus.score, BonusScore::new(150));
    assert_eq!(untouched.bonus.history.len(), 1);
    assert!(untouched.bonus.started_at.is_some());

    let never_opened = ctx.store.find_by_id(dormant).await.unwrap().unwrap();
    assert!(never_opened.bonus.started_at.is_none());

    // The gate is released between runs; a second sweep finds nothing.
    let expired = ctx.engine.sweep_expirations().await.unwrap();
    assert_eq!(expired, Some(0));
}

#[tokio::test]
async fn overlapping_sweep_is_skipped() {
    use std::sync::Arc;

    use async_trait::async_trait;
    use tokio::sync::Notify;

    use vitryna_accounts::models::{Account, PhoneVerification};
    use vitryna_accounts::state::Engine;
    use vitryna_accounts::store::{MemoryStore, StoreError};
    use vitryna_core::{Email, Phone};

    /// Store whose `list_all` blocks until released, so one sweep can be
    /// held mid-flight while another is attempted.
    #[derive(Default)]
    struct GatedStore {
        inner: MemoryStore,
        entered: Notify,
        release: Notify,
    }

    #[async_trait]
    impl AccountStore for GatedStore {
        async fn find_by_email(&self, email: &Email) -> Result<Option<Account>, StoreError> {
            self.inner.find_by_email(email).await
        }
        async fn find_by_phone(&self, phone: &Phone) -> Result<Option<Account>, StoreError> {
            self.inner.find_by_phone(phone).await
        }
        async fn find_by_id(&self, id: AccountId) -> Result<Option<Account>, StoreError> {
            self.inner.find_by_id(id).await
        }
        async fn insert(&self, account: &Account) -> Result<(), StoreError> {
            self.inner.insert(account).await
        }
        async fn update(&self, account: &Account) -> Result<(), StoreError> {
            self.inner.update(account).await
        }
        async fn list_all(&self) -> Result<Vec<Account>, StoreError> {
            self.entered.notify_one();
            self.release.notified().await;
            self.inner.list_all().await
        }
        async fn insert_verification(
            &self,
            record: &PhoneVerification,
        ) -> Result<(), StoreError> {
            self.inner.insert_verification(record).await
        }
        async fn latest_verification(
            &self,
            phone: &Phone,
        ) -> Result<Option<PhoneVerification>, StoreError> {
            self.inner.latest_verification(phone).await
        }
    }

    let store = Arc::new(GatedStore::default());
    let engine = Engine::new(
        &common::test_config(),
        store.clone(),
        Arc::new(vitryna_accounts::clients::mock::MockSmsGateway::new()),
        Arc::new(vitryna_accounts::clients::mock::MockOrderGateway::new()),
    );

    let held = {
        let engine = engine.clone();
        tokio::spawn(async move { engine.sweep_expirations().await })
    };
    store.entered.notified().await;

    // First sweep is parked inside list_all; a second attempt must be
    // skipped, not queued.
    assert_eq!(engine.sweep_expirations().await.unwrap(), None);

    store.release.notify_one();
    assert_eq!(held.await.unwrap().unwrap(), Some(0));
}

#[tokio::test]
async fn concurrent_activations_of_distinct_entries_lose_nothing() {
    let ctx = context();
    let id = activated_account(&ctx, "a@x.com", "+380501234100").await;
    let bonus = ctx.engine.bonus();

    for n in 0..8_u64 {
        bonus
            .record_pending(id, entry(&format!("ORD-{n}"), 10))
            .await
            .unwrap();
    }

    let mut handles = Vec::new();
    for n in 0..8_u64 {
        let engine = ctx.engine.clone();
        handles.push(tokio::spawn(async move {
            engine
                .bonus()
                .activate(id, &OrderId::from(format!("ORD-{n}")))
                .await
        }));
    }
    for handle in handles {
        handle.await.unwrap().unwrap();
    }

    let account = ctx.store.find_by_id(id).await.unwrap().unwrap();
    assert_eq!(account.bonus.score, BonusScore::new(80));
    assert_eq!(account.bonus.history.len(), 8);
    assert!(account.bonus.pending.is_empty());
}
