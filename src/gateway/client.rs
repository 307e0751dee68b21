use crate::gateway::error::GatewayResult;
use crate::gateway::types::{CheckoutSession, SessionRequest};
use async_trait::async_trait;

/// Boundary to the external payment gateway's session-creation call.
///
/// Implementations must be side-effect free beyond the network call itself:
/// invoking `create_session` twice with the same transaction id must be safe,
/// because the orchestration layer retries failed attempts against the same
/// request.
#[async_trait]
pub trait CheckoutGateway: Send + Sync {
    /// Requests a hosted checkout session. Returns `Ok` only when the
    /// gateway reported success and supplied both a session key and a
    /// redirect URL; every other outcome, including transport faults, is an
    /// `Err`.
    async fn create_session(&self, request: &SessionRequest) -> GatewayResult<CheckoutSession>;

    fn name(&self) -> &'static str;
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::gateway::types::{CallbackUrls, CustomerDetails, ProductDetails};
    use rust_decimal_macros::dec;

    struct StubGateway;

    #[async_trait]
    impl CheckoutGateway for StubGateway {
        async fn create_session(
            &self,
            request: &SessionRequest,
        ) -> GatewayResult<CheckoutSession> {
            Ok(CheckoutSession {
                session_key: format!("stub-{}", request.transaction_id),
                redirect_url: "https://example.com/pay".to_string(),
            })
        }

        fn name(&self) -> &'static str {
            "stub"
        }
    }

    #[tokio::test]
    async fn trait_can_be_used_as_object() {
        let gateway: Box<dyn CheckoutGateway> = Box::new(StubGateway);
        let request = SessionRequest {
            amount: dec!(100.00),
            currency: "BDT".to_string(),
            transaction_id: "txn1".to_string(),
            urls: CallbackUrls::from_base("https://example.com"),
            customer: CustomerDetails {
                name: "Test".to_string(),
                email: "test@example.com".to_string(),
                phone: "01700000000".to_string(),
                address_line: "Dhaka".to_string(),
                city: "Dhaka".to_string(),
                country: "Bangladesh".to_string(),
            },
            product: ProductDetails {
                name: "Order".to_string(),
                category: "general".to_string(),
                profile: "general".to_string(),
            },
        };

        let session = gateway
            .create_session(&request)
            .await
            .expect("stub session should succeed");
        assert_eq!(session.session_key, "stub-txn1");
        assert_eq!(gateway.name(), "stub");
    }
}
