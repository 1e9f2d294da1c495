//! Engine state shared across operations.

use std::sync::Arc;

use tokio::sync::Mutex;

use crate::clients::{GatewayError, HttpOrderGateway, HttpSmsGateway, OrderGateway, SmsGateway};
use crate::config::EngineConfig;
use crate::error::Result;
use crate::locks::AccountLocks;
use crate::services::{AuthService, BonusService, OrderService, ProfileService, VerificationService};
use crate::store::AccountStore;
use crate::token::TokenService;

/// The identity and loyalty engine.
///
/// Cheaply cloneable via `Arc`; owns the collaborators and the per-account
/// lock registry, and hands out the per-operation services.
#[derive(Clone)]
pub struct Engine {
    inner: Arc<EngineInner>,
}

struct EngineInner {
    store: Arc<dyn AccountStore>,
    sms: Arc<dyn SmsGateway>,
    orders: Arc<dyn OrderGateway>,
    tokens: TokenService,
    locks: AccountLocks,
    /// Single-flight gate for the expiration sweep.
    sweep_gate: Mutex<()>,
}

impl Engine {
    /// Assemble an engine from explicit collaborators.
    #[must_use]
    pub fn new(
        config: &EngineConfig,
        store: Arc<dyn AccountStore>,
        sms: Arc<dyn SmsGateway>,
        orders: Arc<dyn OrderGateway>,
    ) -> Self {
        Self {
            inner: Arc::new(EngineInner {
                store,
                sms,
                orders,
                tokens: TokenService::new(&config.token_secret, config.token_ttl),
                locks: AccountLocks::new(),
                sweep_gate: Mutex::new(()),
            }),
        }
    }

    /// Assemble an engine with the real HTTP gateway clients.
    ///
    /// # Errors
    ///
    /// Returns `GatewayError` if an HTTP client fails to build.
    pub fn from_config(
        config: &EngineConfig,
        store: Arc<dyn AccountStore>,
    ) -> std::result::Result<Self, GatewayError> {
        let sms = Arc::new(HttpSmsGateway::new(&config.sms, config.http_timeout)?);
        let orders = Arc::new(HttpOrderGateway::new(&config.orders, config.http_timeout)?);
        Ok(Self::new(config, store, sms, orders))
    }

    /// The phone verification workflow.
    #[must_use]
    pub fn verification(&self) -> VerificationService<'_> {
        VerificationService::new(&*self.inner.store, &*self.inner.sms, &self.inner.locks)
    }

    /// The authentication engine.
    #[must_use]
    pub fn auth(&self) -> AuthService<'_> {
        AuthService::new(&*self.inner.store, &self.inner.tokens)
    }

    /// The profile mutation engine.
    #[must_use]
    pub fn profile(&self) -> ProfileService<'_> {
        ProfileService::new(&*self.inner.store, &self.inner.locks)
    }

    /// The bonus engine.
    #[must_use]
    pub fn bonus(&self) -> BonusService<'_> {
        BonusService::new(&*self.inner.store, &self.inner.locks)
    }

    /// The order forwarding service.
    #[must_use]
    pub fn orders(&self) -> OrderService<'_> {
        OrderService::new(&*self.inner.store, &*self.inner.orders, &self.inner.locks)
    }

    /// Run one expiration sweep, unless one is already in flight.
    ///
    /// Returns `Ok(None)` when a previous sweep still holds the gate (the
    /// overlapping run is skipped, not queued), otherwise the number of
    /// accounts whose bonus state expired.
    ///
    /// # Errors
    ///
    /// Propagates store failures from the sweep itself.
    pub async fn sweep_expirations(&self) -> Result<Option<usize>> {
        let Ok(_gate) = self.inner.sweep_gate.try_lock() else {
            return Ok(None);
        };
        let expired = self.bonus().sweep_expirations().await?;
        Ok(Some(expired))
    }
}
