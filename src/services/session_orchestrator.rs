//! Session initiation orchestration.
//!
//! Drives one checkout initiation end to end: validates the amount,
//! generates the transaction id, calls the gateway with a bounded retry
//! loop, and persists the payment record once the gateway accepts.

use crate::config::CheckoutConfig;
use crate::gateway::{
    CallbackUrls, CheckoutGateway, CheckoutSession, CustomerDetails, GatewayError,
    ProductDetails, SessionRequest,
};
use crate::store::{NewPayment, PaymentStore, StoreError};
use rust_decimal::Decimal;
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;
use tracing::{error, info, warn};
use uuid::Uuid;

/// Gateway transaction ids are capped at 30 characters; 12 hex characters
/// of a v4 UUID fit comfortably and stay readable in gateway dashboards.
const TRANSACTION_ID_LEN: usize = 12;

/// Configuration for the session orchestrator
#[derive(Debug, Clone)]
pub struct OrchestratorConfig {
    /// Total gateway attempts per initiation (first call included)
    pub max_attempts: u32,
    /// Constant wait between attempts
    pub retry_delay: Duration,
}

impl Default for OrchestratorConfig {
    fn default() -> Self {
        Self {
            max_attempts: 7,
            retry_delay: Duration::from_secs(2),
        }
    }
}

impl OrchestratorConfig {
    pub fn from_env() -> Self {
        Self {
            max_attempts: std::env::var("CHECKOUT_MAX_ATTEMPTS")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(7),
            retry_delay: Duration::from_secs(
                std::env::var("CHECKOUT_RETRY_DELAY_SECS")
                    .ok()
                    .and_then(|v| v.parse().ok())
                    .unwrap_or(2),
            ),
        }
    }
}

/// Successful initiation: the stored record's identifiers plus the redirect
/// target for the hosted checkout page. `attempts` counts every gateway
/// call made, so a first-try success reports 1.
#[derive(Debug, Clone)]
pub struct InitiationOutcome {
    pub payment_id: Uuid,
    pub transaction_id: String,
    pub session_key: String,
    pub redirect_url: String,
    pub attempts: u32,
}

pub type InitiationResult<T> = Result<T, InitiationError>;

#[derive(Debug, Clone, Error)]
pub enum InitiationError {
    #[error("invalid initiation request: {message}")]
    Validation { message: String },

    #[error("session creation failed after {attempts} attempts: {last_error}")]
    RetryExhausted {
        attempts: u32,
        last_error: GatewayError,
    },

    #[error("payment record could not be stored: {0}")]
    Store(#[from] StoreError),
}

/// Orchestrates checkout-session initiation against the gateway and the
/// payment store. Holds trait objects only, so production and simulated
/// gateways (and Postgres or in-memory stores) are interchangeable.
pub struct SessionOrchestrator {
    gateway: Arc<dyn CheckoutGateway>,
    store: Arc<dyn PaymentStore>,
    checkout: CheckoutConfig,
    config: OrchestratorConfig,
}

impl SessionOrchestrator {
    pub fn new(
        gateway: Arc<dyn CheckoutGateway>,
        store: Arc<dyn PaymentStore>,
        checkout: CheckoutConfig,
        config: OrchestratorConfig,
    ) -> Self {
        Self {
            gateway,
            store,
            checkout,
            config,
        }
    }

    /// Initiate a checkout session for `amount`.
    ///
    /// The transaction id is generated exactly once, before the first
    /// gateway call, and reused verbatim across every retry; the callback
    /// that eventually arrives correlates to exactly one record. A record
    /// is written only after the gateway accepted the session, so an
    /// exhausted retry budget leaves the store untouched.
    pub async fn initiate(&self, amount: Decimal) -> InitiationResult<InitiationOutcome> {
        validate_amount(amount)?;

        let transaction_id = generate_transaction_id();
        let request = self.build_session_request(amount, &transaction_id);

        info!(
            transaction_id = %transaction_id,
            amount = %amount,
            gateway = self.gateway.name(),
            "Initiating checkout session"
        );

        let (session, attempts) = self.create_session_with_retry(&request).await?;

        let record = self
            .store
            .insert_payment(NewPayment {
                amount,
                transaction_id: transaction_id.clone(),
                session_key: session.session_key.clone(),
            })
            .await?;

        info!(
            transaction_id = %record.transaction_id,
            payment_id = %record.id,
            session_key = %session.session_key,
            attempts = attempts,
            "Checkout session initiated"
        );

        Ok(InitiationOutcome {
            payment_id: record.id,
            transaction_id: record.transaction_id,
            session_key: session.session_key,
            redirect_url: session.redirect_url,
            attempts,
        })
    }

    fn build_session_request(&self, amount: Decimal, transaction_id: &str) -> SessionRequest {
        SessionRequest {
            amount,
            currency: self.checkout.currency.clone(),
            transaction_id: transaction_id.to_string(),
            urls: CallbackUrls::from_base(&self.checkout.public_base_url),
            customer: CustomerDetails {
                name: self.checkout.customer_name.clone(),
                email: self.checkout.customer_email.clone(),
                phone: self.checkout.customer_phone.clone(),
                address_line: self.checkout.customer_address.clone(),
                city: self.checkout.customer_city.clone(),
                country: self.checkout.customer_country.clone(),
            },
            product: ProductDetails {
                name: self.checkout.product_name.clone(),
                category: self.checkout.product_category.clone(),
                profile: self.checkout.product_profile.clone(),
            },
        }
    }

    /// Call the gateway until it accepts or the attempt budget runs out.
    ///
    /// Every failure consumes one attempt regardless of its variant; the
    /// response shape cannot reliably separate transient from permanent
    /// faults, so none are treated as fatal early exits.
    async fn create_session_with_retry(
        &self,
        request: &SessionRequest,
    ) -> InitiationResult<(CheckoutSession, u32)> {
        let mut attempt = 0;
        let mut last_error: Option<GatewayError> = None;

        while attempt < self.config.max_attempts {
            attempt += 1;

            match self.gateway.create_session(request).await {
                Ok(session) => {
                    info!(
                        transaction_id = %request.transaction_id,
                        attempt = attempt,
                        "Gateway accepted session request"
                    );
                    return Ok((session, attempt));
                }
                Err(e) => {
                    if attempt < self.config.max_attempts {
                        warn!(
                            transaction_id = %request.transaction_id,
                            attempt = attempt,
                            max_attempts = self.config.max_attempts,
                            delay_secs = self.config.retry_delay.as_secs(),
                            error = %e,
                            "Session creation failed, retrying"
                        );
                        last_error = Some(e);
                        tokio::time::sleep(self.config.retry_delay).await;
                    } else {
                        last_error = Some(e);
                    }
                }
            }
        }

        let last_error = last_error
            .unwrap_or_else(|| GatewayError::transport("no gateway attempts were permitted"));

        error!(
            transaction_id = %request.transaction_id,
            attempts = attempt,
            error = %last_error,
            "Session creation exhausted retry budget"
        );

        Err(InitiationError::RetryExhausted {
            attempts: attempt,
            last_error,
        })
    }
}

fn validate_amount(amount: Decimal) -> InitiationResult<()> {
    if amount <= Decimal::ZERO {
        return Err(InitiationError::Validation {
            message: "amount must be greater than zero".to_string(),
        });
    }
    if amount.normalize().scale() > 2 {
        return Err(InitiationError::Validation {
            message: "amount supports at most two decimal places".to_string(),
        });
    }
    Ok(())
}

fn generate_transaction_id() -> String {
    let mut id = Uuid::new_v4().simple().to_string();
    id.truncate(TRANSACTION_ID_LEN);
    id
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::gateway::{SimulatedBehavior, SimulatedGateway};
    use crate::store::InMemoryPaymentStore;
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

    fn fast_config() -> OrchestratorConfig {
        OrchestratorConfig {
            max_attempts: 7,
            retry_delay: Duration::ZERO,
        }
    }

    #[test]
    fn default_config_matches_retry_policy() {
        let config = OrchestratorConfig::default();
        assert_eq!(config.max_attempts, 7);
        assert_eq!(config.retry_delay, Duration::from_secs(2));
    }

    #[test]
    fn amount_must_be_positive() {
        assert!(validate_amount(dec!(500.00)).is_ok());
        assert!(validate_amount(Decimal::ZERO).is_err());
        assert!(validate_amount(dec!(-1)).is_err());
    }

    #[test]
    fn amount_precision_is_capped_at_two_places() {
        assert!(validate_amount(dec!(10.99)).is_ok());
        assert!(validate_amount(dec!(10.990)).is_ok());
        assert!(validate_amount(dec!(10.999)).is_err());
    }

    #[test]
    fn transaction_ids_are_short_hex_and_distinct() {
        let a = generate_transaction_id();
        let b = generate_transaction_id();
        assert_eq!(a.len(), TRANSACTION_ID_LEN);
        assert!(a.chars().all(|c| c.is_ascii_hexdigit()));
        assert_ne!(a, b);
    }

    #[tokio::test]
    async fn session_request_is_assembled_from_checkout_config() {
        let gateway = Arc::new(SimulatedGateway::new(SimulatedBehavior::Succeed));
        let store = Arc::new(InMemoryPaymentStore::new());
        let orchestrator = SessionOrchestrator::new(
            gateway,
            store,
            checkout_config(),
            fast_config(),
        );

        let request = orchestrator.build_session_request(dec!(500.00), "a1b2c3d4e5f6");
        assert_eq!(request.currency, "BDT");
        assert_eq!(request.transaction_id, "a1b2c3d4e5f6");
        assert_eq!(
            request.urls.success_url,
            "https://shop.example.com/api/checkout/callback/success"
        );
        assert_eq!(request.customer.country, "Bangladesh");
        assert_eq!(request.product.profile, "general");
    }

    #[tokio::test]
    async fn successful_initiation_persists_one_pending_record() {
        let gateway = Arc::new(SimulatedGateway::with_session(
            SimulatedBehavior::Succeed,
            "SK123",
            "https://gw/pay/SK123",
        ));
        let store = Arc::new(InMemoryPaymentStore::new());
        let orchestrator = SessionOrchestrator::new(
            gateway.clone(),
            store.clone(),
            checkout_config(),
            fast_config(),
        );

        let outcome = orchestrator
            .initiate(dec!(500.00))
            .await
            .expect("initiation should succeed");

        assert_eq!(outcome.session_key, "SK123");
        assert_eq!(outcome.redirect_url, "https://gw/pay/SK123");
        assert_eq!(outcome.attempts, 1);
        assert_eq!(store.count().await, 1);
    }

    #[tokio::test]
    async fn validation_failure_never_reaches_the_gateway() {
        let gateway = Arc::new(SimulatedGateway::new(SimulatedBehavior::Succeed));
        let store = Arc::new(InMemoryPaymentStore::new());
        let orchestrator = SessionOrchestrator::new(
            gateway.clone(),
            store.clone(),
            checkout_config(),
            fast_config(),
        );

        let err = orchestrator
            .initiate(dec!(0))
            .await
            .expect_err("zero amount must be rejected");
        assert!(matches!(err, InitiationError::Validation { .. }));
        assert_eq!(gateway.attempts().await, 0);
        assert_eq!(store.count().await, 0);
    }
}
