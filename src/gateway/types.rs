use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Customer block the gateway requires on every session request.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct CustomerDetails {
    pub name: String,
    pub email: String,
    pub phone: String,
    pub address_line: String,
    pub city: String,
    pub country: String,
}

/// Product block the gateway requires on every session request.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ProductDetails {
    pub name: String,
    pub category: String,
    pub profile: String,
}

/// The three endpoints the gateway calls back after the hosted checkout.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct CallbackUrls {
    pub success_url: String,
    pub fail_url: String,
    pub cancel_url: String,
}

impl CallbackUrls {
    /// Derives the three callback routes from one public base URL.
    pub fn from_base(base_url: &str) -> Self {
        let base = base_url.trim_end_matches('/');
        Self {
            success_url: format!("{}/api/checkout/callback/success", base),
            fail_url: format!("{}/api/checkout/callback/fail", base),
            cancel_url: format!("{}/api/checkout/callback/cancel", base),
        }
    }
}

/// Everything a hosted-checkout session creation needs. All fields are
/// required; callers assemble this once per initiation and reuse it across
/// retries so the transaction id stays stable.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct SessionRequest {
    pub amount: Decimal,
    pub currency: String,
    pub transaction_id: String,
    pub urls: CallbackUrls,
    pub customer: CustomerDetails,
    pub product: ProductDetails,
}

/// A gateway-side session reservation: the opaque key plus the hosted page
/// the customer is redirected to.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct CheckoutSession {
    pub session_key: String,
    pub redirect_url: String,
}
