//! Mock gateway implementations for tests and development.

use std::sync::Mutex;
use std::sync::atomic::{AtomicBool, Ordering};

use async_trait::async_trait;

use vitryna_core::Phone;

use super::{GatewayError, OrderGateway, OrderPayload, SmsGateway};

/// SMS gateway that records every dispatched code instead of sending it.
#[derive(Default)]
pub struct MockSmsGateway {
    sent: Mutex<Vec<(Phone, String)>>,
    failing: AtomicBool,
}

impl MockSmsGateway {
    /// Create a gateway that accepts every send.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Make subsequent sends fail (or succeed again).
    pub fn set_failing(&self, failing: bool) {
        self.failing.store(failing, Ordering::SeqCst);
    }

    /// The code most recently dispatched to `phone`.
    ///
    /// # Panics
    ///
    /// Panics if the internal record lock is poisoned.
    #[must_use]
    pub fn last_code_for(&self, phone: &Phone) -> Option<String> {
        self.sent
            .lock()
            .expect("mock sms lock poisoned")
            .iter()
            .rev()
            .find(|(p, _)| p == phone)
            .map(|(_, code)| code.clone())
    }

    /// Number of dispatches recorded.
    ///
    /// # Panics
    ///
    /// Panics if the internal record lock is poisoned.
    #[must_use]
    pub fn sent_count(&self) -> usize {
        self.sent.lock().expect("mock sms lock poisoned").len()
    }
}

#[async_trait]
impl SmsGateway for MockSmsGateway {
    async fn send_code(&self, to: &Phone, code: &str) -> Result<(), GatewayError> {
        if self.failing.load(Ordering::SeqCst) {
            return Err(GatewayError::Api {
                status: 503,
                message: "mock gateway down".to_owned(),
            });
        }
        self.sent
            .lock()
            .expect("mock sms lock poisoned")
            .push((to.clone(), code.to_owned()));
        Ok(())
    }
}

/// Order gateway that records submissions instead of forwarding them.
#[derive(Default)]
pub struct MockOrderGateway {
    submitted: Mutex<Vec<OrderPayload>>,
    failing: AtomicBool,
}

impl MockOrderGateway {
    /// Create a gateway that accepts every submission.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Make subsequent submissions fail (or succeed again).
    pub fn set_failing(&self, failing: bool) {
        self.failing.store(failing, Ordering::SeqCst);
    }

    /// Snapshot of the submitted payloads.
    ///
    /// # Panics
    ///
    /// Panics if the internal record lock is poisoned.
    #[must_use]
    pub fn submitted(&self) -> Vec<OrderPayload> {
        self.submitted
            .lock()
            .expect("mock orders lock poisoned")
            .clone()
    }
}

#[async_trait]
impl OrderGateway for MockOrderGateway {
    async fn submit(&self, order: &OrderPayload) -> Result<(), GatewayError> {
        if self.failing.load(Ordering::SeqCst) {
            return Err(GatewayError::Api {
                status: 502,
                message: "mock order service down".to_owned(),
            });
        }
        self.submitted
            .lock()
            .expect("mock orders lock poisoned")
            .push(order.clone());
        Ok(())
    }
}
