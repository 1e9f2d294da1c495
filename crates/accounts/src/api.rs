//! The envelope surface exposed to the HTTP layer.
//!
//! Every operation returns an [`Envelope`] - `{code, status, ...payload}` -
//! and never an `Err`; the HTTP layer serializes it verbatim and mirrors
//! `code` as the response status. Identifier fields arrive as raw strings
//! and are validated here, so a malformed email or phone becomes a 400
//! envelope instead of a store miss.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use serde_json::json;

use vitryna_core::{AccountId, Email, OrderId, Phone};

use crate::clients::{OrderPayload, STATUS_REJECTED};
use crate::error::EngineError;
use crate::models::{AccountProfile, BonusEntry, DeliveryAddress};
use crate::services::{ProfileData, RegisterRequest};
use crate::state::Engine;

/// Response envelope shared by every operation.
#[derive(Debug, Serialize)]
pub struct Envelope {
    /// HTTP-like outcome code.
    pub code: u16,
    /// Short outcome label.
    pub status: String,
    /// Operation payload, flattened into the envelope.
    #[serde(flatten)]
    pub body: Option<serde_json::Value>,
}

impl Envelope {
    fn ok(code: u16, status: &str, body: Option<serde_json::Value>) -> Self {
        Self {
            code,
            status: status.to_owned(),
            body,
        }
    }

    fn from_error(err: &EngineError) -> Self {
        let status = match err {
            EngineError::Store(_) | EngineError::Internal(_) => "internal error".to_owned(),
            EngineError::Gateway(_) => "gateway error".to_owned(),
            other => other.to_string(),
        };
        let body = match err {
            EngineError::AccountNotActive { phone } => Some(json!({ "phone": phone })),
            _ => None,
        };
        Self {
            code: err.code(),
            status,
            body,
        }
    }
}

/// Registration request body.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RegisterInput {
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub phone: String,
    pub password: String,
    pub birthday: Option<NaiveDate>,
}

/// Phone-code submission body.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SubmitCodeInput {
    pub phone: String,
    pub code: String,
}

/// Login body; `login` is an email or a phone.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LoginInput {
    pub login: String,
    pub password: String,
}

/// Personal-data replacement body.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChangeDataInput {
    pub id: AccountId,
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub phone: String,
    pub birthday: Option<NaiveDate>,
}

/// Delivery replacement body.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChangeDeliveryInput {
    pub id: AccountId,
    #[serde(flatten)]
    pub delivery: DeliveryAddress,
}

/// Password change body.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChangePasswordInput {
    pub id: AccountId,
    pub current_password: String,
    pub new_password: String,
}

/// Pending bonus entry body.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RecordBonusInput {
    pub account_id: AccountId,
    pub order_id: OrderId,
    pub worth: u64,
}

/// Bonus activation body.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ActivateBonusInput {
    pub account_id: AccountId,
    pub order_id: OrderId,
}

/// The produced API surface.
#[derive(Clone)]
pub struct Api {
    engine: Engine,
}

impl Api {
    /// Wrap an engine.
    #[must_use]
    pub const fn new(engine: Engine) -> Self {
        Self { engine }
    }

    /// Register a new account; `201 created` with the account profile.
    pub async fn register(&self, input: RegisterInput) -> Envelope {
        match self.try_register(input).await {
            Ok(profile) => Envelope::ok(201, "created", profile_body(&profile)),
            Err(e) => Envelope::from_error(&e),
        }
    }

    /// Submit a phone verification code; `200 activated` on match.
    pub async fn submit_phone_code(&self, input: SubmitCodeInput) -> Envelope {
        let result = async {
            let phone = parse_phone(&input.phone)?;
            self.engine
                .verification()
                .submit_code(&phone, &input.code)
                .await
        }
        .await;

        match result {
            Ok(()) => Envelope::ok(200, "activated", None),
            Err(e) => Envelope::from_error(&e),
        }
    }

    /// Re-send the stored verification code; `200 sent`.
    pub async fn resend_phone_code(&self, phone: &str) -> Envelope {
        let result = async {
            let phone = parse_phone(phone)?;
            self.engine.verification().resend_code(&phone).await
        }
        .await;

        match result {
            Ok(()) => Envelope::ok(200, "sent", None),
            Err(e) => Envelope::from_error(&e),
        }
    }

    /// Authenticate; `200 ok` with the signed token.
    pub async fn login(&self, input: LoginInput) -> Envelope {
        match self.engine.auth().login(&input.login, &input.password).await {
            Ok(token) => Envelope::ok(200, "ok", Some(json!({ "token": token }))),
            Err(e) => Envelope::from_error(&e),
        }
    }

    /// Verify a token; `200 ok` with the account snapshot.
    pub async fn verify_token(&self, token: &str) -> Envelope {
        match self.engine.auth().verify(token).await {
            Ok(profile) => Envelope::ok(200, "ok", profile_body(&profile)),
            Err(e) => Envelope::from_error(&e),
        }
    }

    /// Replace the personal-data sub-record; `200 ok` with the new profile.
    pub async fn change_data(&self, input: ChangeDataInput) -> Envelope {
        let result = async {
            let data = ProfileData {
                first_name: input.first_name,
                last_name: input.last_name,
                email: parse_email(&input.email)?,
                phone: parse_phone(&input.phone)?,
                birthday: input.birthday,
            };
            self.engine.profile().change_data(input.id, data).await
        }
        .await;

        match result {
            Ok(profile) => Envelope::ok(200, "ok", profile_body(&profile)),
            Err(e) => Envelope::from_error(&e),
        }
    }

    /// Replace the delivery sub-record; `200 ok` with the new profile.
    pub async fn change_delivery(&self, input: ChangeDeliveryInput) -> Envelope {
        match self
            .engine
            .profile()
            .change_delivery(input.id, input.delivery)
            .await
        {
            Ok(profile) => Envelope::ok(200, "ok", profile_body(&profile)),
            Err(e) => Envelope::from_error(&e),
        }
    }

    /// Change the password; `200 ok`.
    pub async fn change_password(&self, input: ChangePasswordInput) -> Envelope {
        match self
            .engine
            .profile()
            .change_password(input.id, &input.current_password, &input.new_password)
            .await
        {
            Ok(()) => Envelope::ok(200, "ok", None),
            Err(e) => Envelope::from_error(&e),
        }
    }

    /// Forward an order; `201` with the forwarded status, or a `400
    /// rejected` envelope when the order system turned it away.
    pub async fn create_order(&self, draft: OrderPayload) -> Envelope {
        match self.engine.orders().create_order(draft).await {
            Ok(outcome) if outcome.status == STATUS_REJECTED => Envelope::ok(
                400,
                "rejected",
                Some(json!({ "orderId": outcome.order_id })),
            ),
            Ok(outcome) => Envelope::ok(
                201,
                &outcome.status,
                Some(json!({ "orderId": outcome.order_id })),
            ),
            Err(e) => Envelope::from_error(&e),
        }
    }

    /// Record a pending bonus entry; `201 created`.
    pub async fn record_pending_bonus(&self, input: RecordBonusInput) -> Envelope {
        let entry = BonusEntry {
            id: input.order_id,
            worth: input.worth,
        };
        match self
            .engine
            .bonus()
            .record_pending(input.account_id, entry)
            .await
        {
            Ok(()) => Envelope::ok(201, "created", None),
            Err(e) => Envelope::from_error(&e),
        }
    }

    /// Activate a pending bonus entry; `200 ok` with the new score.
    pub async fn activate_bonus(&self, input: ActivateBonusInput) -> Envelope {
        match self
            .engine
            .bonus()
            .activate(input.account_id, &input.order_id)
            .await
        {
            Ok(score) => Envelope::ok(200, "ok", Some(json!({ "bonusScore": score }))),
            Err(e) => Envelope::from_error(&e),
        }
    }

    async fn try_register(
        &self,
        input: RegisterInput,
    ) -> crate::error::Result<AccountProfile> {
        let request = RegisterRequest {
            first_name: input.first_name,
            last_name: input.last_name,
            email: parse_email(&input.email)?,
            phone: parse_phone(&input.phone)?,
            password: input.password,
            birthday: input.birthday,
        };
        self.engine.verification().register(request).await
    }
}

fn parse_email(raw: &str) -> crate::error::Result<Email> {
    Email::parse(raw).map_err(|e| EngineError::InvalidInput(e.to_string()))
}

fn parse_phone(raw: &str) -> crate::error::Result<Phone> {
    Phone::parse(raw).map_err(|e| EngineError::InvalidInput(e.to_string()))
}

fn profile_body(profile: &AccountProfile) -> Option<serde_json::Value> {
    serde_json::to_value(profile)
        .map(|account| json!({ "account": account }))
        .ok()
}
