//! Engine configuration loaded from environment variables.
//!
//! # Environment Variables
//!
//! ## Required
//! - `VITRYNA_TOKEN_SECRET` - Token signing secret (min 32 chars, not a placeholder)
//! - `SMS_GATEWAY_TOKEN_URL` - OAuth2 client-credentials token endpoint
//! - `SMS_GATEWAY_SEND_URL` - Message-send endpoint
//! - `SMS_GATEWAY_CLIENT_ID` - Gateway OAuth client ID
//! - `SMS_GATEWAY_CLIENT_SECRET` - Gateway OAuth client secret
//! - `SMS_GATEWAY_SENDER` - Sender name put in the `from` field
//! - `ORDER_SERVICE_URL` - Base URL of the external order system
//!
//! ## Optional
//! - `VITRYNA_TOKEN_TTL_SECS` - Token lifetime (default: 30 days)
//! - `VITRYNA_HTTP_TIMEOUT_SECS` - Outbound request timeout (default: 10)
//! - `VITRYNA_SWEEP_INTERVAL_SECS` - Bonus expiration sweep period (default: daily)

use std::time::Duration;

use secrecy::{ExposeSecret, SecretString};
use thiserror::Error;
use url::Url;

const MIN_TOKEN_SECRET_LENGTH: usize = 32;

/// Blocklist of common placeholder patterns (case-insensitive)
const PLACEHOLDER_PATTERNS: &[&str] = &[
    "your-",
    "changeme",
    "replace",
    "placeholder",
    "example",
    "secret",
    "password",
    "xxx",
    "todo",
    "fixme",
    "insert",
    "enter-",
];

/// Configuration errors that can occur during loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Missing environment variable: {0}")]
    MissingEnvVar(String),
    #[error("Invalid environment variable {0}: {1}")]
    InvalidEnvVar(String, String),
    #[error("Insecure secret in {0}: {1}")]
    InsecureSecret(String, String),
}

/// Engine configuration.
#[derive(Debug, Clone)]
pub struct EngineConfig {
    /// Token signing secret.
    pub token_secret: SecretString,
    /// Token lifetime.
    pub token_ttl: chrono::Duration,
    /// Timeout applied to every outbound gateway request.
    pub http_timeout: Duration,
    /// Period of the recurring bonus expiration sweep.
    pub sweep_interval: Duration,
    /// SMS gateway endpoints and credentials.
    pub sms: SmsGatewayConfig,
    /// Order service endpoint.
    pub orders: OrderServiceConfig,
}

/// SMS gateway configuration.
///
/// Implements `Debug` manually to redact the client secret.
#[derive(Clone)]
pub struct SmsGatewayConfig {
    /// OAuth2 client-credentials token endpoint.
    pub token_url: Url,
    /// Message-send endpoint.
    pub send_url: Url,
    /// OAuth client ID.
    pub client_id: String,
    /// OAuth client secret.
    pub client_secret: SecretString,
    /// Sender name for outbound messages.
    pub sender: String,
}

impl std::fmt::Debug for SmsGatewayConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SmsGatewayConfig")
            .field("token_url", &self.token_url.as_str())
            .field("send_url", &self.send_url.as_str())
            .field("client_id", &self.client_id)
            .field("client_secret", &"[REDACTED]")
            .field("sender", &self.sender)
            .finish()
    }
}

/// Order service configuration.
#[derive(Debug, Clone)]
pub struct OrderServiceConfig {
    /// Base URL; orders are POSTed to `{base_url}/api/orders`.
    pub base_url: Url,
}

impl EngineConfig {
    /// Load configuration from environment variables.
    ///
    /// Calls `dotenvy::dotenv()` to load from `.env` file if present.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if required variables are missing, invalid, or
    /// if the token secret fails validation.
    pub fn from_env() -> Result<Self, ConfigError> {
        // Load .env file if present (ignore errors if not found)
        let _ = dotenvy::dotenv();

        let token_secret = get_required_secret("VITRYNA_TOKEN_SECRET")?;
        validate_token_secret(&token_secret, "VITRYNA_TOKEN_SECRET")?;

        let token_ttl_secs = parse_env_or_default("VITRYNA_TOKEN_TTL_SECS", 60 * 60 * 24 * 30)?;
        let http_timeout_secs = parse_env_or_default("VITRYNA_HTTP_TIMEOUT_SECS", 10)?;
        let sweep_interval_secs =
            parse_env_or_default("VITRYNA_SWEEP_INTERVAL_SECS", 60 * 60 * 24)?;

        Ok(Self {
            token_secret,
            token_ttl: chrono::Duration::seconds(token_ttl_secs),
            http_timeout: Duration::from_secs(http_timeout_secs.unsigned_abs()),
            sweep_interval: Duration::from_secs(sweep_interval_secs.unsigned_abs()),
            sms: SmsGatewayConfig::from_env()?,
            orders: OrderServiceConfig::from_env()?,
        })
    }
}

impl SmsGatewayConfig {
    fn from_env() -> Result<Self, ConfigError> {
        Ok(Self {
            token_url: get_required_url("SMS_GATEWAY_TOKEN_URL")?,
            send_url: get_required_url("SMS_GATEWAY_SEND_URL")?,
            client_id: get_required_env("SMS_GATEWAY_CLIENT_ID")?,
            client_secret: get_required_secret("SMS_GATEWAY_CLIENT_SECRET")?,
            sender: get_required_env("SMS_GATEWAY_SENDER")?,
        })
    }
}

impl OrderServiceConfig {
    fn from_env() -> Result<Self, ConfigError> {
        Ok(Self {
            base_url: get_required_url("ORDER_SERVICE_URL")?,
        })
    }
}

// =============================================================================
// Helper Functions
// =============================================================================

/// Get a required environment variable.
fn get_required_env(key: &str) -> Result<String, ConfigError> {
    std::env::var(key).map_err(|_| ConfigError::MissingEnvVar(key.to_string()))
}

/// Get a required environment variable as a secret.
fn get_required_secret(key: &str) -> Result<SecretString, ConfigError> {
    let value = get_required_env(key)?;
    Ok(SecretString::from(value))
}

/// Get a required environment variable as a URL.
fn get_required_url(key: &str) -> Result<Url, ConfigError> {
    let value = get_required_env(key)?;
    Url::parse(&value).map_err(|e| ConfigError::InvalidEnvVar(key.to_string(), e.to_string()))
}

/// Parse an optional integer environment variable with a default.
fn parse_env_or_default(key: &str, default: i64) -> Result<i64, ConfigError> {
    match std::env::var(key) {
        Ok(value) => value
            .parse::<i64>()
            .map_err(|e| ConfigError::InvalidEnvVar(key.to_string(), e.to_string())),
        Err(_) => Ok(default),
    }
}

/// Validate that the token secret is long enough and not a placeholder.
fn validate_token_secret(secret: &SecretString, var_name: &str) -> Result<(), ConfigError> {
    let value = secret.expose_secret();

    if value.len() < MIN_TOKEN_SECRET_LENGTH {
        return Err(ConfigError::InsecureSecret(
            var_name.to_string(),
            format!(
                "must be at least {} characters (got {})",
                MIN_TOKEN_SECRET_LENGTH,
                value.len()
            ),
        ));
    }

    let lower = value.to_lowercase();
    for pattern in PLACEHOLDER_PATTERNS {
        if lower.contains(pattern) {
            return Err(ConfigError::InsecureSecret(
                var_name.to_string(),
                format!("appears to be a placeholder (contains '{pattern}')"),
            ));
        }
    }

    Ok(())
}
