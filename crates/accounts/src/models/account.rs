//! Account record and its embedded bonus state.
//!
//! Field names serialize in camelCase to stay compatible with the documents
//! already in the store and with the storefront clients reading them.

use std::collections::BTreeMap;

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use vitryna_core::{AccountId, BonusScore, Email, OrderId, Phone};

/// A customer account.
///
/// Created once at registration, mutated by the profile and bonus engines,
/// never deleted by this engine. The password is stored only as an Argon2id
/// hash.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Account {
    /// Opaque stable identifier, assigned at creation.
    pub id: AccountId,
    pub first_name: String,
    pub last_name: String,
    /// Unique across all accounts.
    pub email: Email,
    pub phone: Phone,
    /// Argon2id hash; plaintext is never persisted or compared.
    pub password_hash: String,
    pub birthday: Option<NaiveDate>,
    /// Delivery address; every field is optional.
    #[serde(default)]
    pub delivery: DeliveryAddress,
    /// Ids of placed orders, append-only.
    #[serde(default)]
    pub order_history: Vec<OrderId>,
    /// False until the phone is verified; gates login.
    pub activated: bool,
    /// Embedded loyalty state, one per account.
    pub bonus: BonusAccount,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Account {
    /// The public view of this account: everything except the password hash.
    #[must_use]
    pub fn profile(&self) -> AccountProfile {
        AccountProfile {
            id: self.id,
            first_name: self.first_name.clone(),
            last_name: self.last_name.clone(),
            email: self.email.clone(),
            phone: self.phone.clone(),
            birthday: self.birthday,
            delivery: self.delivery.clone(),
            order_history: self.order_history.clone(),
            activated: self.activated,
            bonus: self.bonus.clone(),
        }
    }
}

/// Delivery address sub-record.
///
/// Replaced wholesale by `change_delivery`; a field the caller omits is
/// cleared, not kept.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DeliveryAddress {
    pub region: Option<String>,
    pub city: Option<String>,
    pub street: Option<String>,
    pub house: Option<String>,
    pub postal_index: Option<String>,
}

/// Loyalty state embedded in an account.
///
/// An entry id lives in at most one of `pending` and `history` at any time.
/// `started_at` is set the first time `score` leaves zero and cleared,
/// together with the rest of the state, when the 12-month window elapses.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BonusAccount {
    /// Accumulated points, string-encoded in the store.
    pub score: BonusScore,
    /// Activated entries, append-only.
    pub history: Vec<BonusEntry>,
    /// Entries awaiting activation, keyed by entry id.
    pub pending: BTreeMap<OrderId, BonusEntry>,
    /// Date the current 12-month earning window began.
    pub started_at: Option<NaiveDate>,
}

impl BonusAccount {
    /// Reset to the empty state (used by the expiration sweep).
    pub fn reset(&mut self) {
        self.score = BonusScore::ZERO;
        self.history.clear();
        self.pending.clear();
        self.started_at = None;
    }
}

/// A loyalty-point credit tied to an order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BonusEntry {
    /// The order this credit came from.
    pub id: OrderId,
    /// Points contributed to the score on activation.
    pub worth: u64,
}

/// Account snapshot returned to callers: the full record minus the hash.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AccountProfile {
    pub id: AccountId,
    pub first_name: String,
    pub last_name: String,
    pub email: Email,
    pub phone: Phone,
    pub birthday: Option<NaiveDate>,
    pub delivery: DeliveryAddress,
    pub order_history: Vec<OrderId>,
    pub activated: bool,
    pub bonus: BonusAccount,
}
