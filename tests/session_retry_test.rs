//! Integration tests for checkout session initiation
//!
//! Tests cover:
//! - Record creation on first-attempt success
//! - Recovery within the retry budget
//! - Budget exhaustion without persisted records
//! - Transaction id stability across retries
//! - The decline reason carried out of an exhausted run

use std::sync::Arc;
use std::time::Duration;

use taka_link::config::CheckoutConfig;
use taka_link::gateway::{SimulatedBehavior, SimulatedGateway, DECLINE_REASONS};
use taka_link::services::{InitiationError, OrchestratorConfig, SessionOrchestrator};
use taka_link::store::{InMemoryPaymentStore, PaymentStatus, PaymentStore};

use rust_decimal_macros::dec;

fn checkout_config() -> CheckoutConfig {
    CheckoutConfig {
        currency: "BDT".to_string(),
        public_base_url: "https://shop.example.com".to_string(),
        customer_name: "Test Customer".to_string(),
        customer_email: "customer@example.com".to_string(),
        customer_phone: "01700000000".to_string(),
        customer_address: "Dhaka".to_string(),
        customer_city: "Dhaka".to_string(),
        customer_country: "Bangladesh".to_string(),
        product_name: "Order Payment".to_string(),
        product_category: "general".to_string(),
        product_profile: "general".to_string(),
    }
}

fn test_gateway(behavior: SimulatedBehavior) -> Arc<SimulatedGateway> {
    Arc::new(SimulatedGateway::with_session(
        behavior,
        "SK123",
        "https://gw/pay/SK123",
    ))
}

fn orchestrator(
    gateway: Arc<SimulatedGateway>,
    store: Arc<InMemoryPaymentStore>,
    max_attempts: u32,
) -> SessionOrchestrator {
    SessionOrchestrator::new(
        gateway,
        store,
        checkout_config(),
        OrchestratorConfig {
            max_attempts,
            retry_delay: Duration::ZERO,
        },
    )
}

#[tokio::test]
async fn test_first_attempt_success_creates_one_pending_record() {
    let gateway = test_gateway(SimulatedBehavior::Succeed);
    let store = Arc::new(InMemoryPaymentStore::new());
    let orchestrator = orchestrator(gateway.clone(), store.clone(), 7);

    let outcome = orchestrator
        .initiate(dec!(500.00))
        .await
        .expect("initiation should succeed");

    assert_eq!(outcome.attempts, 1);
    assert_eq!(outcome.session_key, "SK123");
    assert_eq!(outcome.redirect_url, "https://gw/pay/SK123");
    assert_eq!(gateway.attempts().await, 1);
    assert_eq!(store.count().await, 1);

    let record = store
        .find_by_transaction_id(&outcome.transaction_id)
        .await
        .expect("lookup should not error")
        .expect("record should exist");
    assert_eq!(record.id, outcome.payment_id);
    assert_eq!(record.status, PaymentStatus::Pending);
    assert_eq!(record.amount, dec!(500.00));
    assert_eq!(record.session_key.as_deref(), Some("SK123"));
}

#[tokio::test]
async fn test_transient_failures_recover_within_budget() {
    let gateway = test_gateway(SimulatedBehavior::FailTimes(6));
    let store = Arc::new(InMemoryPaymentStore::new());
    let orchestrator = orchestrator(gateway.clone(), store.clone(), 7);

    let outcome = orchestrator
        .initiate(dec!(250.50))
        .await
        .expect("seventh attempt should succeed");

    assert_eq!(outcome.attempts, 7);
    assert_eq!(gateway.attempts().await, 7);
    assert_eq!(store.count().await, 1);
}

#[tokio::test]
async fn test_exhausted_budget_leaves_no_record() {
    let gateway = test_gateway(SimulatedBehavior::AlwaysFail);
    let store = Arc::new(InMemoryPaymentStore::new());
    let orchestrator = orchestrator(gateway.clone(), store.clone(), 7);

    let err = orchestrator
        .initiate(dec!(500.00))
        .await
        .expect_err("initiation must fail once the budget is spent");

    match err {
        InitiationError::RetryExhausted { attempts, .. } => assert_eq!(attempts, 7),
        other => panic!("expected RetryExhausted, got {:?}", other),
    }
    assert_eq!(gateway.attempts().await, 7);
    assert_eq!(store.count().await, 0);
}

#[tokio::test]
async fn test_transaction_id_is_stable_across_retries() {
    let gateway = test_gateway(SimulatedBehavior::FailTimes(6));
    let store = Arc::new(InMemoryPaymentStore::new());
    let orchestrator = orchestrator(gateway.clone(), store.clone(), 7);

    let outcome = orchestrator
        .initiate(dec!(500.00))
        .await
        .expect("initiation should succeed");

    let ids = gateway.recorded_transaction_ids().await;
    assert_eq!(ids.len(), 7);
    assert!(ids.iter().all(|id| id == &outcome.transaction_id));
}

#[tokio::test]
async fn test_exhaustion_reports_the_final_decline() {
    let gateway = test_gateway(SimulatedBehavior::AlwaysFail);
    let store = Arc::new(InMemoryPaymentStore::new());
    let orchestrator = orchestrator(gateway.clone(), store.clone(), 7);

    let err = orchestrator
        .initiate(dec!(500.00))
        .await
        .expect_err("initiation must fail");

    // The simulated gateway rotates its decline catalogue per attempt, so
    // the seventh failure carries the seventh reason.
    match err {
        InitiationError::RetryExhausted { last_error, .. } => {
            assert_eq!(last_error.reason(), DECLINE_REASONS[6]);
        }
        other => panic!("expected RetryExhausted, got {:?}", other),
    }
}

#[tokio::test]
async fn test_attempt_budget_is_configurable() {
    let gateway = test_gateway(SimulatedBehavior::AlwaysFail);
    let store = Arc::new(InMemoryPaymentStore::new());
    let orchestrator = orchestrator(gateway.clone(), store.clone(), 3);

    let err = orchestrator
        .initiate(dec!(500.00))
        .await
        .expect_err("initiation must fail");

    match err {
        InitiationError::RetryExhausted { attempts, .. } => assert_eq!(attempts, 3),
        other => panic!("expected RetryExhausted, got {:?}", other),
    }
    assert_eq!(gateway.attempts().await, 3);
}
