//! Integration tests for gateway callback reconciliation
//!
//! Each test runs a real initiation first, so the settled records are the
//! ones the orchestrator actually wrote.

#[cfg(test)]
mod callback_reconciliation_tests {
    use std::sync::Arc;
    use std::time::Duration;

    use rust_decimal_macros::dec;

    use taka_link::config::CheckoutConfig;
    use taka_link::gateway::{SimulatedBehavior, SimulatedGateway};
    use taka_link::services::{
        CallbackError, CallbackProcessor, OrchestratorConfig, SessionOrchestrator,
    };
    use taka_link::store::{InMemoryPaymentStore, PaymentStatus, PaymentStore};

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

    /// Runs one successful initiation and returns the store, a processor
    /// bound to it, and the transaction id the gateway saw.
    async fn initiated_payment() -> (Arc<InMemoryPaymentStore>, CallbackProcessor, String) {
        let gateway = Arc::new(SimulatedGateway::with_session(
            SimulatedBehavior::Succeed,
            "SK123",
            "https://gw/pay/SK123",
        ));
        let store = Arc::new(InMemoryPaymentStore::new());
        let orchestrator = SessionOrchestrator::new(
            gateway,
            store.clone(),
            checkout_config(),
            OrchestratorConfig {
                max_attempts: 7,
                retry_delay: Duration::ZERO,
            },
        );

        let outcome = orchestrator
            .initiate(dec!(500.00))
            .await
            .expect("initiation should succeed");
        let processor = CallbackProcessor::new(store.clone());

        (store, processor, outcome.transaction_id)
    }

    #[tokio::test]
    async fn test_success_callback_completes_an_initiated_payment() {
        let (store, processor, tran_id) = initiated_payment().await;

        let record = processor
            .confirm_success(Some(&tran_id))
            .await
            .expect("settle should succeed");

        assert_eq!(record.status, PaymentStatus::Completed);
        assert_eq!(record.transaction_id, tran_id);

        let stored = store
            .find_by_transaction_id(&tran_id)
            .await
            .expect("lookup")
            .expect("record exists");
        assert_eq!(stored.status, PaymentStatus::Completed);
    }

    #[tokio::test]
    async fn test_failure_callback_fails_an_initiated_payment() {
        let (store, processor, tran_id) = initiated_payment().await;

        let record = processor
            .confirm_failure(Some(&tran_id))
            .await
            .expect("settle should succeed");

        assert_eq!(record.status, PaymentStatus::Failed);
        assert_eq!(store.count().await, 1);
    }

    #[tokio::test]
    async fn test_duplicate_success_callbacks_settle_once() {
        let (_store, processor, tran_id) = initiated_payment().await;

        let first = processor
            .confirm_success(Some(&tran_id))
            .await
            .expect("first delivery");
        let second = processor
            .confirm_success(Some(&tran_id))
            .await
            .expect("redelivery must be acknowledged");

        assert_eq!(first.status, PaymentStatus::Completed);
        assert_eq!(second.status, PaymentStatus::Completed);
        assert_eq!(second.id, first.id);
    }

    #[tokio::test]
    async fn test_late_failure_does_not_demote_a_completed_payment() {
        let (_store, processor, tran_id) = initiated_payment().await;

        processor
            .confirm_success(Some(&tran_id))
            .await
            .expect("complete first");
        let record = processor
            .confirm_failure(Some(&tran_id))
            .await
            .expect("late failure must still be acknowledged");

        assert_eq!(record.status, PaymentStatus::Completed);
    }

    #[tokio::test]
    async fn test_late_success_does_not_revive_a_failed_payment() {
        let (_store, processor, tran_id) = initiated_payment().await;

        processor
            .confirm_failure(Some(&tran_id))
            .await
            .expect("fail first");
        let record = processor
            .confirm_success(Some(&tran_id))
            .await
            .expect("late success must still be acknowledged");

        assert_eq!(record.status, PaymentStatus::Failed);
    }

    #[tokio::test]
    async fn test_unknown_transaction_leaves_the_store_untouched() {
        let (store, processor, tran_id) = initiated_payment().await;

        let err = processor
            .confirm_success(Some("ffffffffffff"))
            .await
            .expect_err("unknown id must be rejected");
        assert!(matches!(err, CallbackError::UnknownTransaction { .. }));

        let stored = store
            .find_by_transaction_id(&tran_id)
            .await
            .expect("lookup")
            .expect("record exists");
        assert_eq!(stored.status, PaymentStatus::Pending);
        assert_eq!(store.count().await, 1);
    }

    #[tokio::test]
    async fn test_cancel_keeps_the_payment_payable() {
        let (store, processor, tran_id) = initiated_payment().await;

        processor.acknowledge_cancel(Some(&tran_id));

        let stored = store
            .find_by_transaction_id(&tran_id)
            .await
            .expect("lookup")
            .expect("record exists");
        assert_eq!(stored.status, PaymentStatus::Pending);

        // The customer can come back and finish paying after a cancel.
        let record = processor
            .confirm_success(Some(&tran_id))
            .await
            .expect("settle should succeed");
        assert_eq!(record.status, PaymentStatus::Completed);
    }

    #[tokio::test]
    async fn test_blank_transaction_id_is_rejected_before_lookup() {
        let (store, processor, tran_id) = initiated_payment().await;

        let err = processor
            .confirm_success(None)
            .await
            .expect_err("missing id must be rejected");
        assert!(matches!(err, CallbackError::MissingTransactionId));

        let err = processor
            .confirm_failure(Some("   "))
            .await
            .expect_err("blank id must be rejected");
        assert!(matches!(err, CallbackError::MissingTransactionId));

        let stored = store
            .find_by_transaction_id(&tran_id)
            .await
            .expect("lookup")
            .expect("record exists");
        assert_eq!(stored.status, PaymentStatus::Pending);
    }
}
