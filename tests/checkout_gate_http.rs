//! End-to-end scenarios for the checkout age gate over HTTP.
//!
//! Drives the assembled axum router with in-memory stores, the mock
//! identity provider and the mock customer token validator:
//! 1. Fresh visitor is prompted, verifies, and is allowed to check out
//! 2. Durable records short-circuit verification in new sessions
//! 3. Provider and configuration failures surface as the right notices
//!
//! Start and callback are sent the way a browser navigates: with the
//! session cookie and never with a bearer token.

use std::sync::Arc;

use axum::body::Body;
use axum::Router;
use http::{header, Request, Response, StatusCode};
use serde_json::Value;
use tower::ServiceExt;

use age_gate::adapters::auth::MockSessionValidator;
use age_gate::adapters::http::middleware::{AuthState, SessionCookie};
use age_gate::adapters::http::verification::{
    CALLBACK_PATH, FINALIZE_PATH, START_PATH, VERIFICATION_PATH,
};
use age_gate::adapters::http::{app_router, VerificationAppState};
use age_gate::adapters::oidc::{MockIdentityProvider, StaticProviderFactory, MOCK_AUTHORIZE_URL};
use age_gate::adapters::profile_store::InMemoryProfileStore;
use age_gate::adapters::session_store::InMemorySessionStore;
use age_gate::application::StatusStore;
use age_gate::config::VerificationConfig;
use age_gate::domain::foundation::UserId;
use age_gate::domain::verification::{ConfigurationError, ProviderError};
use age_gate::ports::IdentityProviderFactory;

// =============================================================================
// Test Infrastructure
// =============================================================================

const CUSTOMER_TOKEN: &str = "customer-token";
const CUSTOMER_ID: &str = "customer-42";

struct Harness {
    app: Router,
    store: StatusStore,
    provider: Arc<MockIdentityProvider>,
}

impl Harness {
    fn new(provider: MockIdentityProvider) -> Self {
        let provider = Arc::new(provider);
        let factory = Arc::new(StaticProviderFactory::new(provider.clone()));
        Self::build(factory, provider)
    }

    fn misconfigured() -> Self {
        let factory = Arc::new(StaticProviderFactory::misconfigured(
            ConfigurationError::MissingClientSecret,
        ));
        Self::build(factory, Arc::new(MockIdentityProvider::affirming()))
    }

    fn build(factory: Arc<dyn IdentityProviderFactory>, provider: Arc<MockIdentityProvider>) -> Self {
        let store = StatusStore::new(
            Arc::new(InMemorySessionStore::new()),
            Arc::new(InMemoryProfileStore::new()),
        );
        let state =
            VerificationAppState::new(store.clone(), factory, &VerificationConfig::default())
                .unwrap();
        let validator: AuthState =
            Arc::new(MockSessionValidator::new().with_test_user(CUSTOMER_TOKEN, CUSTOMER_ID));
        let cookie = SessionCookie {
            name: "age_gate_sid".to_string(),
            max_age_secs: 3600,
            secure: false,
        };

        Self {
            app: app_router(state, cookie, Some(validator)),
            store,
            provider,
        }
    }

    async fn send(&self, request: Request<Body>) -> Response<Body> {
        self.app.clone().oneshot(request).await.unwrap()
    }

    /// Opens a session and returns its cookie pair.
    async fn new_session(&self) -> String {
        let response = self.send(get(VERIFICATION_PATH, None, None)).await;
        session_cookie(&response).expect("first response issues a session cookie")
    }

    /// Walks start and callback as a browser does: cookie only, no bearer.
    async fn verify(&self, cookie: &str, return_to: Option<&str>) -> Response<Body> {
        let start_uri = match return_to {
            Some(path) => format!("{}?return_to={}", START_PATH, encode(path)),
            None => START_PATH.to_string(),
        };
        let start = self.send(get(&start_uri, Some(cookie), None)).await;
        assert_eq!(start.status(), StatusCode::FOUND);
        let state = state_param(&location(&start));

        let callback = format!("{}?code=auth-code&state={}", CALLBACK_PATH, state);
        self.send(get(&callback, Some(cookie), None)).await
    }

    async fn status(&self, cookie: &str, bearer: Option<&str>) -> Value {
        let response = self.send(get(VERIFICATION_PATH, Some(cookie), bearer)).await;
        assert_eq!(response.status(), StatusCode::OK);
        body_json(response).await
    }

    async fn finalize(&self, cookie: &str, bearer: Option<&str>) -> Response<Body> {
        self.send(request("POST", FINALIZE_PATH, Some(cookie), bearer))
            .await
    }
}

fn request(method: &str, uri: &str, cookie: Option<&str>, bearer: Option<&str>) -> Request<Body> {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(cookie) = cookie {
        builder = builder.header(header::COOKIE, cookie);
    }
    if let Some(token) = bearer {
        builder = builder.header(header::AUTHORIZATION, format!("Bearer {}", token));
    }
    builder.body(Body::empty()).unwrap()
}

fn get(uri: &str, cookie: Option<&str>, bearer: Option<&str>) -> Request<Body> {
    request("GET", uri, cookie, bearer)
}

fn session_cookie(response: &Response<Body>) -> Option<String> {
    response
        .headers()
        .get(header::SET_COOKIE)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.split(';').next())
        .map(str::to_string)
}

fn location(response: &Response<Body>) -> String {
    response
        .headers()
        .get(header::LOCATION)
        .and_then(|v| v.to_str().ok())
        .unwrap()
        .to_string()
}

fn state_param(location: &str) -> String {
    url::Url::parse(location)
        .unwrap()
        .query_pairs()
        .find(|(k, _)| k == "state")
        .map(|(_, v)| v.into_owned())
        .unwrap()
}

fn encode(value: &str) -> String {
    url::form_urlencoded::byte_serialize(value.as_bytes()).collect()
}

async fn body_json(response: Response<Body>) -> Value {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    serde_json::from_slice(&bytes).unwrap()
}

fn customer() -> UserId {
    UserId::new(CUSTOMER_ID).unwrap()
}

// =============================================================================
// Happy path
// =============================================================================

#[tokio::test]
async fn fresh_visitor_is_prompted_then_verifies_and_checks_out() {
    let h = Harness::new(MockIdentityProvider::affirming());

    // First contact: a session is minted and the gate prompts
    let first = h.send(get(VERIFICATION_PATH, None, Some(CUSTOMER_TOKEN))).await;
    let cookie = session_cookie(&first).unwrap();
    let body = body_json(first).await;
    assert_eq!(body["status"], "unverified");
    assert_eq!(body["decision"], "block");
    assert_eq!(body["notice"]["kind"], "prompt");
    assert_eq!(body["notice"]["retry_link"], START_PATH);

    let blocked = h.finalize(&cookie, Some(CUSTOMER_TOKEN)).await;
    assert_eq!(blocked.status(), StatusCode::FORBIDDEN);

    // Start redirects to the provider
    let start = h
        .send(get(
            &format!("{}?return_to={}", START_PATH, encode("/checkout?step=payment")),
            Some(&cookie),
            None,
        ))
        .await;
    assert_eq!(start.status(), StatusCode::FOUND);
    let provider_url = location(&start);
    assert!(provider_url.starts_with(MOCK_AUTHORIZE_URL));

    // Callback returns the visitor to where they left off
    let callback = h
        .send(get(
            &format!(
                "{}?code=abc&state={}",
                CALLBACK_PATH,
                state_param(&provider_url)
            ),
            Some(&cookie),
            None,
        ))
        .await;
    assert_eq!(callback.status(), StatusCode::FOUND);
    assert_eq!(location(&callback), "/checkout?step=payment");
    assert_eq!(h.provider.exchanged_codes(), vec!["abc".to_string()]);

    // Checkout now goes through and the fact is durable
    let allowed = h.finalize(&cookie, Some(CUSTOMER_TOKEN)).await;
    assert_eq!(allowed.status(), StatusCode::NO_CONTENT);
    assert!(h.store.is_durably_verified(&customer()).await.unwrap());
}

#[tokio::test]
async fn anonymous_verification_lasts_for_the_session_only() {
    let h = Harness::new(MockIdentityProvider::affirming());
    let cookie = h.new_session().await;

    let callback = h.verify(&cookie, None).await;
    assert_eq!(location(&callback), "/checkout");
    assert_eq!(h.finalize(&cookie, None).await.status(), StatusCode::NO_CONTENT);

    let other_session = h.new_session().await;
    assert_eq!(
        h.finalize(&other_session, None).await.status(),
        StatusCode::FORBIDDEN
    );
}

#[tokio::test]
async fn durable_record_allows_checkout_in_a_new_session() {
    let h = Harness::new(MockIdentityProvider::affirming());
    h.store.persist_verified(&customer()).await.unwrap();
    let cookie = h.new_session().await;

    let response = h.finalize(&cookie, Some(CUSTOMER_TOKEN)).await;

    assert_eq!(response.status(), StatusCode::NO_CONTENT);
    assert_eq!(h.provider.exchange_calls(), 0);
    let body = h.status(&cookie, None).await;
    assert_eq!(body["status"], "verified", "session was back-filled");
}

// =============================================================================
// Negative outcomes
// =============================================================================

#[tokio::test]
async fn denied_claim_blocks_without_retry_and_is_not_persisted() {
    let h = Harness::new(MockIdentityProvider::denying());
    let cookie = h.new_session().await;

    h.status(&cookie, Some(CUSTOMER_TOKEN)).await;

    h.verify(&cookie, None).await;

    let body = h.status(&cookie, Some(CUSTOMER_TOKEN)).await;
    assert_eq!(body["status"], "denied");
    assert_eq!(body["notice"]["kind"], "denied");
    assert!(body["notice"].get("retry_link").is_none());

    let blocked = h.finalize(&cookie, Some(CUSTOMER_TOKEN)).await;
    assert_eq!(blocked.status(), StatusCode::FORBIDDEN);
    let blocked = body_json(blocked).await;
    assert_eq!(blocked["code"], "AGE_VERIFICATION_REQUIRED");
    assert!(!h.store.is_durably_verified(&customer()).await.unwrap());
}

#[tokio::test]
async fn provider_failure_offers_retry() {
    let h = Harness::new(MockIdentityProvider::failing_exchange(
        ProviderError::unreachable("connection reset"),
    ));
    let cookie = h.new_session().await;

    let callback = h.verify(&cookie, None).await;
    assert_eq!(callback.status(), StatusCode::FOUND);

    let body = h.status(&cookie, None).await;
    assert_eq!(body["status"], "error");
    assert_eq!(body["notice"]["kind"], "error");
    assert_eq!(body["notice"]["retry_link"], START_PATH);
}

#[tokio::test]
async fn forged_state_is_treated_as_failure() {
    let h = Harness::new(MockIdentityProvider::affirming());
    let cookie = h.new_session().await;
    h.send(get(START_PATH, Some(&cookie), None)).await;

    let callback = h
        .send(get(
            &format!("{}?code=abc&state=forged", CALLBACK_PATH),
            Some(&cookie),
            None,
        ))
        .await;

    assert_eq!(callback.status(), StatusCode::FOUND);
    assert_eq!(h.status(&cookie, None).await["status"], "error");
    assert_eq!(h.provider.exchange_calls(), 0);
}

#[tokio::test]
async fn cancelled_at_provider_is_treated_as_failure() {
    let h = Harness::new(MockIdentityProvider::affirming());
    let cookie = h.new_session().await;
    h.send(get(START_PATH, Some(&cookie), None)).await;

    h.send(get(
        &format!("{}?error=access_denied", CALLBACK_PATH),
        Some(&cookie),
        None,
    ))
    .await;

    assert_eq!(h.status(&cookie, None).await["status"], "error");
}

#[tokio::test]
async fn missing_configuration_is_a_hard_stop() {
    let h = Harness::misconfigured();
    let cookie = h.new_session().await;

    let response = h.send(get(START_PATH, Some(&cookie), None)).await;

    assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE);
    let body = body_json(response).await;
    assert_eq!(body["code"], "CONFIGURATION_ERROR");
    assert!(body["message"]
        .as_str()
        .unwrap()
        .contains("contact the site operator"));
}

// =============================================================================
// Redirect safety
// =============================================================================

#[tokio::test]
async fn offsite_return_to_falls_back_to_checkout() {
    let h = Harness::new(MockIdentityProvider::affirming());
    let cookie = h.new_session().await;

    let callback = h
        .verify(&cookie, Some("https://evil.example/phish"))
        .await;

    assert_eq!(location(&callback), "/checkout");
}

#[tokio::test]
async fn protocol_relative_return_to_falls_back_to_checkout() {
    let h = Harness::new(MockIdentityProvider::affirming());
    let cookie = h.new_session().await;

    let callback = h.verify(&cookie, Some("//evil.example")).await;

    assert_eq!(location(&callback), "/checkout");
}

// =============================================================================
// Revocation, identity and health
// =============================================================================

#[tokio::test]
async fn revoke_requires_a_customer() {
    let h = Harness::new(MockIdentityProvider::affirming());
    let cookie = h.new_session().await;

    let response = h
        .send(request("DELETE", VERIFICATION_PATH, Some(&cookie), None))
        .await;

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn revoke_clears_durable_and_session_state() {
    let h = Harness::new(MockIdentityProvider::affirming());
    let cookie = h.new_session().await;
    h.status(&cookie, Some(CUSTOMER_TOKEN)).await;
    h.verify(&cookie, None).await;
    assert_eq!(
        h.finalize(&cookie, Some(CUSTOMER_TOKEN)).await.status(),
        StatusCode::NO_CONTENT
    );

    let response = h
        .send(request(
            "DELETE",
            VERIFICATION_PATH,
            Some(&cookie),
            Some(CUSTOMER_TOKEN),
        ))
        .await;

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_json(response).await["revoked"], true);
    assert!(!h.store.is_durably_verified(&customer()).await.unwrap());
    assert_eq!(
        h.finalize(&cookie, Some(CUSTOMER_TOKEN)).await.status(),
        StatusCode::FORBIDDEN
    );
}

#[tokio::test]
async fn invalid_bearer_token_is_rejected() {
    let h = Harness::new(MockIdentityProvider::affirming());
    let cookie = h.new_session().await;

    let response = h.finalize(&cookie, Some("stolen-token")).await;

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn health_does_not_mint_sessions() {
    let h = Harness::new(MockIdentityProvider::affirming());

    let response = h.send(get("/health", None, None)).await;

    assert_eq!(response.status(), StatusCode::OK);
    assert!(response.headers().get(header::SET_COOKIE).is_none());
}

// =============================================================================
// Browser navigations carry no credentials
// =============================================================================

#[tokio::test]
async fn customer_verified_through_browser_flow_is_remembered_in_next_session() {
    let h = Harness::new(MockIdentityProvider::affirming());
    let cookie = h.new_session().await;

    // The storefront polls the gate with the customer's token...
    let before = h.status(&cookie, Some(CUSTOMER_TOKEN)).await;
    assert_eq!(before["decision"], "block");

    // ...while start and callback are plain navigations
    let callback = h.verify(&cookie, None).await;
    assert_eq!(callback.status(), StatusCode::FOUND);
    assert!(h.store.is_durably_verified(&customer()).await.unwrap());

    let next_session = h.new_session().await;
    let response = h.finalize(&next_session, Some(CUSTOMER_TOKEN)).await;

    assert_eq!(response.status(), StatusCode::NO_CONTENT);
    assert_eq!(h.provider.exchange_calls(), 1);
}

#[tokio::test]
async fn logging_out_before_callback_keeps_outcome_session_only() {
    let h = Harness::new(MockIdentityProvider::affirming());
    let cookie = h.new_session().await;
    h.status(&cookie, Some(CUSTOMER_TOKEN)).await;
    h.status(&cookie, None).await;

    h.verify(&cookie, None).await;

    assert!(!h.store.is_durably_verified(&customer()).await.unwrap());
    assert_eq!(h.finalize(&cookie, None).await.status(), StatusCode::NO_CONTENT);
}

#[tokio::test]
async fn stale_bearer_on_callback_still_redirects() {
    let h = Harness::new(MockIdentityProvider::affirming());
    let cookie = h.new_session().await;
    let start = h.send(get(START_PATH, Some(&cookie), Some("stolen-token"))).await;
    assert_eq!(start.status(), StatusCode::FOUND);
    let state = state_param(&location(&start));

    let callback = h
        .send(get(
            &format!("{}?code=abc&state={}", CALLBACK_PATH, state),
            Some(&cookie),
            Some("stolen-token"),
        ))
        .await;

    assert_eq!(callback.status(), StatusCode::FOUND);
    assert_eq!(h.status(&cookie, None).await["status"], "verified");
}

#[tokio::test]
async fn unreadable_callback_query_is_recorded_as_error_and_redirects() {
    let h = Harness::new(MockIdentityProvider::affirming());
    let cookie = h.new_session().await;
    h.send(get(START_PATH, Some(&cookie), None)).await;

    let callback = h
        .send(get(
            &format!("{}?code=a&code=b", CALLBACK_PATH),
            Some(&cookie),
            None,
        ))
        .await;

    assert_eq!(callback.status(), StatusCode::FOUND);
    assert_eq!(location(&callback), "/checkout");
    assert_eq!(h.status(&cookie, None).await["status"], "error");
    assert_eq!(h.provider.exchange_calls(), 0);
}
