use crate::gateway::client::CheckoutGateway;
use crate::gateway::error::{GatewayError, GatewayResult};
use crate::gateway::types::{CheckoutSession, SessionRequest};
use async_trait::async_trait;
use tokio::sync::Mutex;
use uuid::Uuid;

/// Decline reasons the simulated gateway rotates through. The set mirrors
/// what the real gateway produces in practice, credential problems and
/// transient faults alike, so exercised flows see realistic diagnostics.
pub const DECLINE_REASONS: &[&str] = &[
    "Invalid credentials provided",
    "Gateway timeout occurred",
    "Network failure detected",
    "Unknown error from gateway",
    "Currency mismatch error",
    "Invalid amount specified",
    "Duplicate transaction ID",
    "Store is not active",
    "Session already expired",
    "Invalid store ID",
    "Invalid card number",
];

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SimulatedBehavior {
    /// Every call succeeds.
    Succeed,
    /// The first `n` calls fail, later calls succeed.
    FailTimes(u32),
    /// Every call fails.
    AlwaysFail,
}

#[derive(Debug, Default)]
struct CallLog {
    attempts: u32,
    transaction_ids: Vec<String>,
}

/// Scripted stand-in for the real gateway. Selected by the composition root
/// (or a test harness); callers only ever see the [`CheckoutGateway`] trait.
/// Records every call so harnesses can assert attempt counts and
/// transaction-id stability.
pub struct SimulatedGateway {
    behavior: SimulatedBehavior,
    session_key: String,
    redirect_url: String,
    reasons: Vec<String>,
    log: Mutex<CallLog>,
}

impl SimulatedGateway {
    pub fn new(behavior: SimulatedBehavior) -> Self {
        let mut suffix = Uuid::new_v4().simple().to_string();
        suffix.truncate(10);
        let session_key = format!("SIM-{}", suffix);
        let redirect_url = format!("https://checkout.simulated.test/session/{}", session_key);
        Self::with_session(behavior, session_key, redirect_url)
    }

    /// Pins the session key and redirect URL returned on success.
    pub fn with_session(
        behavior: SimulatedBehavior,
        session_key: impl Into<String>,
        redirect_url: impl Into<String>,
    ) -> Self {
        Self {
            behavior,
            session_key: session_key.into(),
            redirect_url: redirect_url.into(),
            reasons: DECLINE_REASONS.iter().map(|r| r.to_string()).collect(),
            log: Mutex::new(CallLog::default()),
        }
    }

    /// Replaces the decline catalogue. Empty input keeps the default set so
    /// `decline_for` always has a reason to hand out.
    pub fn with_reasons(mut self, reasons: Vec<String>) -> Self {
        if !reasons.is_empty() {
            self.reasons = reasons;
        }
        self
    }

    /// Number of `create_session` calls observed so far.
    pub async fn attempts(&self) -> u32 {
        self.log.lock().await.attempts
    }

    /// Transaction ids in call order, one entry per call.
    pub async fn recorded_transaction_ids(&self) -> Vec<String> {
        self.log.lock().await.transaction_ids.clone()
    }

    fn decline_for(&self, attempt: u32) -> GatewayError {
        let index = (attempt.saturating_sub(1) as usize) % self.reasons.len();
        GatewayError::declined(self.reasons[index].clone())
    }
}

#[async_trait]
impl CheckoutGateway for SimulatedGateway {
    async fn create_session(&self, request: &SessionRequest) -> GatewayResult<CheckoutSession> {
        let attempt = {
            let mut log = self.log.lock().await;
            log.attempts += 1;
            log.transaction_ids.push(request.transaction_id.clone());
            log.attempts
        };

        let fail = match self.behavior {
            SimulatedBehavior::Succeed => false,
            SimulatedBehavior::AlwaysFail => true,
            SimulatedBehavior::FailTimes(n) => attempt <= n,
        };

        if fail {
            return Err(self.decline_for(attempt));
        }

        Ok(CheckoutSession {
            session_key: self.session_key.clone(),
            redirect_url: self.redirect_url.clone(),
        })
    }

    fn name(&self) -> &'static str {
        "simulated"
    }
}
