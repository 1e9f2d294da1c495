//! Order service client.

use std::time::Duration;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use url::Url;

use vitryna_core::{AccountId, OrderId};

use super::{GatewayError, OrderGateway};
use crate::config::OrderServiceConfig;

/// Order status emitted by the storefront while an order is being prepared.
pub const PROCESSING_STATUS: &str = "В процесі оброблення";

/// Status forwarded to the order system for in-flight orders.
pub const STATUS_LOADING: &str = "loading";

/// Status forwarded for anything else.
pub const STATUS_REJECTED: &str = "rejected";

/// Translate a storefront order status into the order system's vocabulary.
#[must_use]
pub fn forward_status(status: &str) -> &'static str {
    if status == PROCESSING_STATUS {
        STATUS_LOADING
    } else {
        STATUS_REJECTED
    }
}

/// Order payload as the order system expects it.
///
/// `products` is carried through opaquely; the order system owns that
/// schema.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderPayload {
    pub id: OrderId,
    pub id_user: AccountId,
    /// Named `statusOrder` on the wire; the storefront clients already
    /// send it that way.
    #[serde(rename = "statusOrder")]
    pub status: String,
    pub city: String,
    pub delivery: String,
    pub address: String,
    pub payment_select: String,
    pub date_send: String,
    pub date_create: String,
    #[serde(default)]
    pub products: Vec<serde_json::Value>,
}

/// HTTP client for the external order system.
pub struct HttpOrderGateway {
    client: reqwest::Client,
    orders_url: Url,
}

impl HttpOrderGateway {
    /// Create an order service client with a bounded per-request timeout.
    ///
    /// # Errors
    ///
    /// Returns `GatewayError::Http` if the underlying HTTP client fails to
    /// build, or `GatewayError::Parse` if the configured base URL cannot
    /// address the orders endpoint.
    pub fn new(config: &OrderServiceConfig, timeout: Duration) -> Result<Self, GatewayError> {
        let client = reqwest::Client::builder().timeout(timeout).build()?;

        let mut base = config.base_url.as_str().trim_end_matches('/').to_owned();
        base.push_str("/api/orders");
        let orders_url =
            Url::parse(&base).map_err(|e| GatewayError::Parse(format!("orders URL: {e}")))?;

        Ok(Self { client, orders_url })
    }
}

#[async_trait]
impl OrderGateway for HttpOrderGateway {
    async fn submit(&self, order: &OrderPayload) -> Result<(), GatewayError> {
        let response = self
            .client
            .post(self.orders_url.clone())
            .json(order)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let message = response.text().await.unwrap_or_default();
            return Err(GatewayError::Api {
                status: status.as_u16(),
                message,
            });
        }

        Ok(())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_processing_status_forwards_as_loading() {
        assert_eq!(forward_status("В процесі оброблення"), STATUS_LOADING);
    }

    #[test]
    fn test_any_other_status_forwards_as_rejected() {
        assert_eq!(forward_status("Скасовано"), STATUS_REJECTED);
        assert_eq!(forward_status(""), STATUS_REJECTED);
        assert_eq!(forward_status("loading"), STATUS_REJECTED);
    }

    #[test]
    fn test_payload_serializes_camel_case() {
        let payload = OrderPayload {
            id: OrderId::from("ORD-1"),
            id_user: AccountId::generate(),
            status: STATUS_LOADING.to_owned(),
            city: "Київ".to_owned(),
            delivery: "courier".to_owned(),
            address: "вул. Хрещатик, 1".to_owned(),
            payment_select: "card".to_owned(),
            date_send: "2026-08-05".to_owned(),
            date_create: "2026-08-04".to_owned(),
            products: Vec::new(),
        };

        let json = serde_json::to_value(&payload).unwrap();
        assert!(json.get("idUser").is_some());
        assert!(json.get("statusOrder").is_some());
        assert!(json.get("paymentSelect").is_some());
        assert!(json.get("dateCreate").is_some());
    }
}
