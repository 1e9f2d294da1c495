//! Outbound gateway clients.
//!
//! The SMS gateway and the order system are external services reached over
//! HTTP. The engine talks to them through the two traits here so tests can
//! substitute the [`mock`] implementations; the `Http*` types are the real
//! clients.

pub mod mock;
mod orders;
mod sms;

pub use orders::{
    HttpOrderGateway, OrderPayload, PROCESSING_STATUS, STATUS_LOADING, STATUS_REJECTED,
    forward_status,
};
pub use sms::HttpSmsGateway;

use async_trait::async_trait;
use thiserror::Error;

use vitryna_core::Phone;

/// Errors that can occur when talking to an external gateway.
#[derive(Debug, Error)]
pub enum GatewayError {
    /// HTTP request failed (connect error, timeout, ...).
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// Gateway returned an error response.
    #[error("API error: {status} - {message}")]
    Api {
        /// HTTP status of the response.
        status: u16,
        /// Response body, verbatim.
        message: String,
    },

    /// Failed to parse a gateway response.
    #[error("Parse error: {0}")]
    Parse(String),
}

/// Dispatches one-time verification codes to phones.
#[async_trait]
pub trait SmsGateway: Send + Sync {
    /// Send `code` to `to`.
    async fn send_code(&self, to: &Phone, code: &str) -> Result<(), GatewayError>;
}

/// Forwards placed orders to the external order system.
#[async_trait]
pub trait OrderGateway: Send + Sync {
    /// Submit an order payload.
    async fn submit(&self, order: &OrderPayload) -> Result<(), GatewayError>;
}
