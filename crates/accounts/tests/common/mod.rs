//! Shared harness for the engine integration tests: an engine wired to the
//! in-memory store and the recording mock gateways.

#![allow(dead_code)]

use std::sync::Arc;
use std::time::Duration;

use secrecy::SecretString;
use url::Url;

use vitryna_accounts::api::Api;
use vitryna_accounts::clients::mock::{MockOrderGateway, MockSmsGateway};
use vitryna_accounts::config::{EngineConfig, OrderServiceConfig, SmsGatewayConfig};
use vitryna_accounts::services::RegisterRequest;
use vitryna_accounts::state::Engine;
use vitryna_accounts::store::MemoryStore;
use vitryna_core::{Email, Phone};

pub struct TestContext {
    pub engine: Engine,
    pub api: Api,
    pub store: Arc<MemoryStore>,
    pub sms: Arc<MockSmsGateway>,
    pub orders: Arc<MockOrderGateway>,
}

/// Configuration pointing at nothing routable; the mocks never dial out.
pub fn test_config() -> EngineConfig {
    EngineConfig {
        token_secret: SecretString::from("k8Q!4vZr2#pL9^mD7&xB5*cF1@tG3(jH"),
        token_ttl: chrono::Duration::hours(1),
        http_timeout: Duration::from_secs(2),
        sweep_interval: Duration::from_secs(3600),
        sms: SmsGatewayConfig {
            token_url: Url::parse("http://127.0.0.1:9/oauth/token").expect("static url"),
            send_url: Url::parse("http://127.0.0.1:9/message/send").expect("static url"),
            client_id: "test-client".to_owned(),
            client_secret: SecretString::from("w3E$9rT7!yU1&iO5#pA8*sD2@fG6^hJ4"),
            sender: "Vitryna".to_owned(),
        },
        orders: OrderServiceConfig {
            base_url: Url::parse("http://127.0.0.1:9").expect("static url"),
        },
    }
}

pub fn context() -> TestContext {
    let store = Arc::new(MemoryStore::new());
    let sms = Arc::new(MockSmsGateway::new());
    let orders = Arc::new(MockOrderGateway::new());
    let engine = Engine::new(
        &test_config(),
        store.clone(),
        sms.clone(),
        orders.clone(),
    );
    TestContext {
        api: Api::new(engine.clone()),
        engine,
        store,
        sms,
        orders,
    }
}

/// Register and phone-verify an account, returning its id.
pub async fn activated_account(
    ctx: &TestContext,
    email: &str,
    phone: &str,
) -> vitryna_core::AccountId {
    let profile = ctx
        .engine
        .verification()
        .register(candidate(email, phone))
        .await
        .expect("registration");
    let phone = Phone::parse(phone).expect("test phone");
    let code = ctx.sms.last_code_for(&phone).expect("dispatched code");
    ctx.engine
        .verification()
        .submit_code(&phone, &code)
        .await
        .expect("activation");
    profile.id
}

/// A registration request for `email`/`phone` with password `secret1`.
pub fn candidate(email: &str, phone: &str) -> RegisterRequest {
    RegisterRequest {
        first_name: "Olena".to_owned(),
        last_name: "Shevchenko".to_owned(),
        email: Email::parse(email).expect("test email"),
        phone: Phone::parse(phone).expect("test phone"),
        password: "secret1".to_owned(),
        birthday: None,
    }
}
