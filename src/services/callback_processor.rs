//! Gateway callback reconciliation.
//!
//! The gateway redirects the customer back with a transaction id and we
//! settle the matching payment record. Callbacks arrive late, repeated,
//! and out of order, so every path here is idempotent: a record moves out
//! of pending at most once and terminal statuses are never overwritten.

use crate::store::{PaymentRecord, PaymentStatus, PaymentStore, StoreError};
use std::sync::Arc;
use thiserror::Error;
use tracing::info;

pub type CallbackResult<T> = Result<T, CallbackError>;

#[derive(Debug, Clone, Error)]
pub enum CallbackError {
    #[error("callback is missing the transaction id")]
    MissingTransactionId,

    #[error("no payment found for transaction id {transaction_id}")]
    UnknownTransaction { transaction_id: String },

    #[error("payment lookup failed: {0}")]
    Store(#[from] StoreError),
}

/// Applies gateway redirect callbacks to stored payment records.
pub struct CallbackProcessor {
    store: Arc<dyn PaymentStore>,
}

impl CallbackProcessor {
    pub fn new(store: Arc<dyn PaymentStore>) -> Self {
        Self { store }
    }

    /// Mark the payment for `tran_id` as completed.
    pub async fn confirm_success(&self, tran_id: Option<&str>) -> CallbackResult<PaymentRecord> {
        self.settle(tran_id, PaymentStatus::Completed).await
    }

    /// Mark the payment for `tran_id` as failed. A record that already
    /// completed stays completed; the gateway occasionally delivers both
    /// outcomes for one transaction and success wins.
    pub async fn confirm_failure(&self, tran_id: Option<&str>) -> CallbackResult<PaymentRecord> {
        self.settle(tran_id, PaymentStatus::Failed).await
    }

    /// Acknowledge a customer-initiated cancellation. The record stays
    /// pending; no state is read or written.
    pub fn acknowledge_cancel(&self, tran_id: Option<&str>) {
        match tran_id {
            Some(tid) if !tid.trim().is_empty() => {
                info!(transaction_id = %tid, "Checkout cancelled by customer");
            }
            _ => info!("Checkout cancelled by customer"),
        }
    }

    async fn settle(
        &self,
        tran_id: Option<&str>,
        target: PaymentStatus,
    ) -> CallbackResult<PaymentRecord> {
        let tran_id = tran_id
            .map(str::trim)
            .filter(|tid| !tid.is_empty())
            .ok_or(CallbackError::MissingTransactionId)?;

        let current = self.find_known(tran_id).await?;

        if current.status.is_terminal() {
            info!(
                transaction_id = %tran_id,
                status = %current.status,
                requested = %target,
                "Callback replay ignored, payment already settled"
            );
            return Ok(current);
        }

        match self.store.settle_pending(tran_id, target).await? {
            Some(updated) => {
                info!(
                    transaction_id = %tran_id,
                    payment_id = %updated.id,
                    status = %updated.status,
                    "Payment settled from gateway callback"
                );
                Ok(updated)
            }
            // Lost the settle race to a concurrent callback; report
            // whatever status won.
            None => self.find_known(tran_id).await,
        }
    }

    async fn find_known(&self, tran_id: &str) -> CallbackResult<PaymentRecord> {
        self.store
            .find_by_transaction_id(tran_id)
            .await?
            .ok_or_else(|| CallbackError::UnknownTransaction {
                transaction_id: tran_id.to_string(),
            })
    }
}
