//! Durable payment records and the storage contract the services run
//! against. `postgres` is the production implementation; `memory` backs
//! tests and database-less dev runs.

pub mod memory;
pub mod postgres;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

pub use memory::InMemoryPaymentStore;
pub use postgres::{health_check, init_pool, init_pool_from_config, PgPaymentStore, PoolConfig};

/// Lifecycle status of one payment attempt.
///
/// Transitions are monotonic: a record starts Pending and moves exactly once
/// to Completed or Failed. Terminal states never transition again.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PaymentStatus {
    Pending,
    Completed,
    Failed,
}

impl PaymentStatus {
    pub fn valid_transitions(&self) -> &'static [PaymentStatus] {
        match self {
            PaymentStatus::Pending => &[PaymentStatus::Completed, PaymentStatus::Failed],
            PaymentStatus::Completed => &[],
            PaymentStatus::Failed => &[],
        }
    }

    pub fn can_transition_to(&self, target: PaymentStatus) -> bool {
        self.valid_transitions().contains(&target)
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self, PaymentStatus::Completed | PaymentStatus::Failed)
    }

    pub fn as_db_status(&self) -> &'static str {
        match self {
            PaymentStatus::Pending => "pending",
            PaymentStatus::Completed => "completed",
            PaymentStatus::Failed => "failed",
        }
    }

    pub fn from_db_status(status: &str) -> Option<PaymentStatus> {
        match status {
            "pending" => Some(PaymentStatus::Pending),
            "completed" => Some(PaymentStatus::Completed),
            "failed" => Some(PaymentStatus::Failed),
            _ => None,
        }
    }
}

impl std::fmt::Display for PaymentStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_db_status())
    }
}

/// One payment attempt and its lifecycle state.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct PaymentRecord {
    pub id: Uuid,
    pub amount: Decimal,
    pub transaction_id: String,
    pub status: PaymentStatus,
    pub session_key: Option<String>,
    pub created_at: DateTime<Utc>,
}

/// Input for record creation. Records are only created once the gateway has
/// accepted the session, so the session key is always present and the status
/// is fixed at Pending by the store.
#[derive(Debug, Clone)]
pub struct NewPayment {
    pub amount: Decimal,
    pub transaction_id: String,
    pub session_key: String,
}

#[derive(Debug, Clone, Error)]
pub enum StoreError {
    #[error("duplicate transaction id: {message}")]
    DuplicateTransaction { message: String },

    #[error("store unavailable: {message}")]
    Unavailable { message: String },

    #[error("store query failed: {message}")]
    Query { message: String },
}

impl StoreError {
    pub fn query(message: impl Into<String>) -> Self {
        StoreError::Query {
            message: message.into(),
        }
    }

    pub fn from_sqlx(err: sqlx::Error) -> Self {
        match &err {
            sqlx::Error::Database(db) if db.is_unique_violation() => {
                StoreError::DuplicateTransaction {
                    message: db.message().to_string(),
                }
            }
            sqlx::Error::PoolTimedOut | sqlx::Error::Io(_) => StoreError::Unavailable {
                message: err.to_string(),
            },
            _ => StoreError::Query {
                message: err.to_string(),
            },
        }
    }
}

/// Storage contract for payment records. Writes are keyed by the
/// transaction id; `settle_pending` is the guarded update duplicate
/// callbacks race through.
#[async_trait]
pub trait PaymentStore: Send + Sync {
    /// Creates the record for a freshly accepted session, always in Pending.
    async fn insert_payment(&self, payment: NewPayment) -> Result<PaymentRecord, StoreError>;

    async fn find_by_transaction_id(
        &self,
        transaction_id: &str,
    ) -> Result<Option<PaymentRecord>, StoreError>;

    /// Moves a Pending record to `status` and returns the updated record.
    /// Returns `None` when no Pending record matched, either because the
    /// transaction id is unknown or because the record is already terminal;
    /// callers disambiguate by re-reading.
    async fn settle_pending(
        &self,
        transaction_id: &str,
        status: PaymentStatus,
    ) -> Result<Option<PaymentRecord>, StoreError>;
}
