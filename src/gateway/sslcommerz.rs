use crate::gateway::client::CheckoutGateway;
use crate::gateway::error::{GatewayError, GatewayResult};
use crate::gateway::types::{CheckoutSession, SessionRequest};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::info;

const SANDBOX_BASE_URL: &str = "https://sandbox.sslcommerz.com";
const LIVE_BASE_URL: &str = "https://securepay.sslcommerz.com";

#[derive(Debug, Clone)]
pub struct SslcommerzConfig {
    pub store_id: String,
    pub store_password: String,
    pub sandbox: bool,
    pub timeout_secs: u64,
}

impl Default for SslcommerzConfig {
    fn default() -> Self {
        Self {
            store_id: String::new(),
            store_password: String::new(),
            sandbox: true,
            timeout_secs: 30,
        }
    }
}

impl SslcommerzConfig {
    pub fn from_env() -> GatewayResult<Self> {
        let store_id = std::env::var("GATEWAY_STORE_ID").map_err(|_| {
            GatewayError::malformed("GATEWAY_STORE_ID environment variable is required")
        })?;
        let store_password = std::env::var("GATEWAY_STORE_PASSWORD").map_err(|_| {
            GatewayError::malformed("GATEWAY_STORE_PASSWORD environment variable is required")
        })?;

        Ok(Self {
            sandbox: std::env::var("GATEWAY_SANDBOX")
                .ok()
                .and_then(|v| v.parse::<bool>().ok())
                .unwrap_or(true),
            timeout_secs: std::env::var("GATEWAY_TIMEOUT_SECS")
                .ok()
                .and_then(|v| v.parse::<u64>().ok())
                .unwrap_or(30),
            store_id,
            store_password,
        })
    }

    fn base_url(&self) -> &'static str {
        if self.sandbox {
            SANDBOX_BASE_URL
        } else {
            LIVE_BASE_URL
        }
    }
}

/// Production adapter for the SSLCommerz hosted-checkout session endpoint.
/// Performs exactly one form POST per call; retry decisions belong to the
/// orchestration layer.
pub struct SslcommerzGateway {
    config: SslcommerzConfig,
    http: reqwest::Client,
}

impl SslcommerzGateway {
    pub fn new(config: SslcommerzConfig) -> GatewayResult<Self> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| GatewayError::transport(format!("failed to build http client: {}", e)))?;
        Ok(Self { config, http })
    }

    pub fn from_env() -> GatewayResult<Self> {
        Self::new(SslcommerzConfig::from_env()?)
    }

    pub fn is_sandbox(&self) -> bool {
        self.config.sandbox
    }

    fn endpoint(&self) -> String {
        format!("{}/gwprocess/v4/api.php", self.config.base_url())
    }

    fn session_form<'a>(&'a self, request: &'a SessionRequest) -> SessionForm<'a> {
        SessionForm {
            store_id: &self.config.store_id,
            store_passwd: &self.config.store_password,
            total_amount: format!("{:.2}", request.amount),
            currency: &request.currency,
            tran_id: &request.transaction_id,
            success_url: &request.urls.success_url,
            fail_url: &request.urls.fail_url,
            cancel_url: &request.urls.cancel_url,
            emi_option: 0,
            cus_name: &request.customer.name,
            cus_email: &request.customer.email,
            cus_phone: &request.customer.phone,
            cus_add1: &request.customer.address_line,
            cus_city: &request.customer.city,
            cus_country: &request.customer.country,
            shipping_method: "NO",
            product_name: &request.product.name,
            product_category: &request.product.category,
            product_profile: &request.product.profile,
        }
    }

    fn session_from_reply(reply: SessionReply) -> GatewayResult<CheckoutSession> {
        let status = reply.status.as_deref().unwrap_or_default();
        if status != "SUCCESS" {
            let reason = reply
                .failedreason
                .filter(|r| !r.trim().is_empty())
                .unwrap_or_else(|| format!("gateway status was {:?}", status));
            return Err(GatewayError::declined(reason));
        }

        match (reply.sessionkey, reply.gateway_page_url) {
            (Some(session_key), Some(redirect_url))
                if !session_key.is_empty() && !redirect_url.is_empty() =>
            {
                Ok(CheckoutSession {
                    session_key,
                    redirect_url,
                })
            }
            _ => Err(GatewayError::malformed(
                "SUCCESS response missing session key or redirect URL",
            )),
        }
    }
}

#[async_trait]
impl CheckoutGateway for SslcommerzGateway {
    async fn create_session(&self, request: &SessionRequest) -> GatewayResult<CheckoutSession> {
        let response = self
            .http
            .post(self.endpoint())
            .form(&self.session_form(request))
            .send()
            .await
            .map_err(|e| GatewayError::transport(format!("session request failed: {}", e)))?;

        let http_status = response.status();
        if !http_status.is_success() {
            return Err(GatewayError::transport(format!(
                "gateway returned HTTP {}",
                http_status
            )));
        }

        let reply: SessionReply = response
            .json()
            .await
            .map_err(|e| GatewayError::malformed(format!("undecodable session reply: {}", e)))?;

        let session = Self::session_from_reply(reply)?;
        info!(
            transaction_id = %request.transaction_id,
            session_key = %session.session_key,
            "checkout session created"
        );
        Ok(session)
    }

    fn name(&self) -> &'static str {
        "sslcommerz"
    }
}

#[derive(Debug, Serialize)]
struct SessionForm<'a> {
    store_id: &'a str,
    store_passwd: &'a str,
    total_amount: String,
    currency: &'a str,
    tran_id: &'a str,
    success_url: &'a str,
    fail_url: &'a str,
    cancel_url: &'a str,
    emi_option: u8,
    cus_name: &'a str,
    cus_email: &'a str,
    cus_phone: &'a str,
    cus_add1: &'a str,
    cus_city: &'a str,
    cus_country: &'a str,
    shipping_method: &'a str,
    product_name: &'a str,
    product_category: &'a str,
    product_profile: &'a str,
}

#[derive(Debug, Deserialize)]
struct SessionReply {
    #[serde(default)]
    status: Option<String>,
    #[serde(default)]
    sessionkey: Option<String>,
    #[serde(default, rename = "GatewayPageURL")]
    gateway_page_url: Option<String>,
    #[serde(default)]
    failedreason: Option<String>,
}
