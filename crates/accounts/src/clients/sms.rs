//! SMS gateway client.
//!
//! The gateway wants an OAuth2 client-credentials exchange before every
//! send: POST the credentials to its token endpoint, then POST the message
//! with the returned bearer token. Tokens are short-lived enough that the
//! client does not cache them across sends.

use std::time::Duration;

use async_trait::async_trait;
use secrecy::ExposeSecret;
use serde::Deserialize;
use url::Url;

use vitryna_core::Phone;

use super::{GatewayError, SmsGateway};
use crate::config::SmsGatewayConfig;

/// Response from the gateway's token endpoint.
#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: String,
}

/// HTTP client for the SMS gateway.
pub struct HttpSmsGateway {
    client: reqwest::Client,
    token_url: Url,
    send_url: Url,
    client_id: String,
    client_secret: String,
    sender: String,
}

impl HttpSmsGateway {
    /// Create a gateway client with a bounded per-request timeout.
    ///
    /// # Errors
    ///
    /// Returns `GatewayError::Http` if the underlying HTTP client fails to
    /// build.
    pub fn new(config: &SmsGatewayConfig, timeout: Duration) -> Result<Self, GatewayError> {
        let client = reqwest::Client::builder().timeout(timeout).build()?;

        Ok(Self {
            client,
            token_url: config.token_url.clone(),
            send_url: config.send_url.clone(),
            client_id: config.client_id.clone(),
            client_secret: config.client_secret.expose_secret().to_owned(),
            sender: config.sender.clone(),
        })
    }

    /// Exchange client credentials for a bearer token.
    async fn fetch_token(&self) -> Result<String, GatewayError> {
        let params = [
            ("grant_type", "client_credentials"),
            ("client_id", self.client_id.as_str()),
            ("client_secret", self.client_secret.as_str()),
        ];

        let response = self
            .client
            .post(self.token_url.clone())
            .form(&params)
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

        let token: TokenResponse = response
            .json()
            .await
            .map_err(|e| GatewayError::Parse(e.to_string()))?;

        Ok(token.access_token)
    }
}

#[async_trait]
impl SmsGateway for HttpSmsGateway {
    async fn send_code(&self, to: &Phone, code: &str) -> Result<(), GatewayError> {
        let token = self.fetch_token().await?;

        let body = serde_json::json!({
            "from": self.sender,
            "to": to.as_str(),
            "text": code_message(code),
        });

        let response = self
            .client
            .post(self.send_url.clone())
            .bearer_auth(token)
            .json(&body)
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

/// Message text wrapped around a verification code.
fn code_message(code: &str) -> String {
    format!("Ваш код підтвердження: {code}")
}
