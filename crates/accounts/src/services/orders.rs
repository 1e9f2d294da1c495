//! Order forwarding.
//!
//! Orders are owned by the external order system; this engine translates
//! the status vocabulary, forwards the payload, and appends the order id to
//! the account's history. A downstream failure is not an error to the
//! caller - the order is simply reported as rejected.

use chrono::Utc;
use serde::Serialize;

use vitryna_core::OrderId;

use crate::clients::{OrderGateway, OrderPayload, STATUS_REJECTED, forward_status};
use crate::error::{EngineError, Result};
use crate::locks::AccountLocks;
use crate::store::AccountStore;

/// What happened to a submitted order.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderOutcome {
    pub order_id: OrderId,
    /// The status the order system saw: `"loading"` or `"rejected"`.
    pub status: String,
}

/// Order creation against the external order system.
pub struct OrderService<'a> {
    store: &'a dyn AccountStore,
    gateway: &'a dyn OrderGateway,
    locks: &'a AccountLocks,
}

impl<'a> OrderService<'a> {
    /// Create the service over its collaborators.
    #[must_use]
    pub const fn new(
        store: &'a dyn AccountStore,
        gateway: &'a dyn OrderGateway,
        locks: &'a AccountLocks,
    ) -> Self {
        Self { store, gateway, locks }
    }

    /// Forward an order and record it in the account's history.
    ///
    /// The draft's status is translated before forwarding. A gateway
    /// failure is caught here and reported as a rejected outcome; it never
    /// fails the request.
    ///
    /// # Errors
    ///
    /// Returns `EngineError::NotFound` when the ordering account is absent.
    pub async fn create_order(&self, draft: OrderPayload) -> Result<OrderOutcome> {
        let account_id = draft.id_user;
        self.store
            .find_by_id(account_id)
            .await?
            .ok_or(EngineError::NotFound)?;

        let mut payload = draft;
        payload.status = forward_status(&payload.status).to_owned();

        if let Err(e) = self.gateway.submit(&payload).await {
            tracing::warn!(
                order = %payload.id,
                error = %e,
                "order submission failed; reporting as rejected"
            );
            return Ok(OrderOutcome {
                order_id: payload.id,
                status: STATUS_REJECTED.to_owned(),
            });
        }

        let _guard = self.locks.acquire(account_id).await;
        let mut account = self
            .store
            .find_by_id(account_id)
            .await?
            .ok_or(EngineError::NotFound)?;
        account.order_history.push(payload.id.clone());
        account.updated_at = Utc::now();
        self.store.update(&account).await?;

        Ok(OrderOutcome {
            order_id: payload.id,
            status: payload.status,
        })
    }
}
