//! Gateway boundary: the session-creation contract plus its production and
//! simulated implementations.

pub mod client;
pub mod error;
pub mod simulated;
pub mod sslcommerz;
pub mod types;

pub use client::CheckoutGateway;
pub use error::{GatewayError, GatewayResult};
pub use simulated::{SimulatedBehavior, SimulatedGateway, DECLINE_REASONS};
pub use sslcommerz::{SslcommerzConfig, SslcommerzGateway};
pub use types::{
    CallbackUrls, CheckoutSession, CustomerDetails, ProductDetails, SessionRequest,
};
