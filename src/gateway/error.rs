use thiserror::Error;

pub type GatewayResult<T> = Result<T, GatewayError>;

/// Failure of one session-creation call.
///
/// A gateway-declared decline and a transport fault arrive through the same
/// type so the caller's retry loop never has to tell them apart.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum GatewayError {
    #[error("gateway declined session: {reason}")]
    Declined { reason: String },

    #[error("gateway transport failure: {message}")]
    Transport { message: String },

    #[error("gateway returned malformed response: {message}")]
    MalformedResponse { message: String },
}

impl GatewayError {
    pub fn declined(reason: impl Into<String>) -> Self {
        GatewayError::Declined {
            reason: reason.into(),
        }
    }

    pub fn transport(message: impl Into<String>) -> Self {
        GatewayError::Transport {
            message: message.into(),
        }
    }

    pub fn malformed(message: impl Into<String>) -> Self {
        GatewayError::MalformedResponse {
            message: message.into(),
        }
    }

    /// The failure detail carried into diagnostics and exhaustion reports.
    pub fn reason(&self) -> &str {
        match self {
            GatewayError::Declined { reason } => reason,
            GatewayError::Transport { message } => message,
            GatewayError::MalformedResponse { message } => message,
        }
    }

    /// Every session-creation failure is retryable at this boundary. The
    /// response shape does not reliably distinguish transient from permanent
    /// failure, so no variant opts out.
    pub fn is_retryable(&self) -> bool {
        match self {
            GatewayError::Declined { .. } => true,
            GatewayError::Transport { .. } => true,
            GatewayError::MalformedResponse { .. } => true,
        }
    }
}
