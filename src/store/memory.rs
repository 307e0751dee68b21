use crate::store::{NewPayment, PaymentRecord, PaymentStatus, PaymentStore, StoreError};
use async_trait::async_trait;
use chrono::Utc;
use std::collections::HashMap;
use tokio::sync::RwLock;
use uuid::Uuid;

/// In-memory payment store, keyed by transaction id. Satisfies the same
/// contract as the Postgres store, including the duplicate-id rejection and
/// the pending-only settle guard.
#[derive(Debug, Default)]
pub struct InMemoryPaymentStore {
    records: RwLock<HashMap<String, PaymentRecord>>,
}

impl InMemoryPaymentStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn count(&self) -> usize {
        self.records.read().await.len()
    }
}

#[async_trait]
impl PaymentStore for InMemoryPaymentStore {
    async fn insert_payment(&self, payment: NewPayment) -> Result<PaymentRecord, StoreError> {
        let mut records = self.records.write().await;
        if records.contains_key(&payment.transaction_id) {
            return Err(StoreError::DuplicateTransaction {
                message: format!(
                    "payment with transaction id {} already exists",
                    payment.transaction_id
                ),
            });
        }

        let record = PaymentRecord {
            id: Uuid::new_v4(),
            amount: payment.amount,
            transaction_id: payment.transaction_id.clone(),
            status: PaymentStatus::Pending,
            session_key: Some(payment.session_key),
            created_at: Utc::now(),
        };
        records.insert(payment.transaction_id, record.clone());
        Ok(record)
    }

    async fn find_by_transaction_id(
        &self,
        transaction_id: &str,
    ) -> Result<Option<PaymentRecord>, StoreError> {
        Ok(self.records.read().await.get(transaction_id).cloned())
    }

    async fn settle_pending(
        &self,
        transaction_id: &str,
        status: PaymentStatus,
    ) -> Result<Option<PaymentRecord>, StoreError> {
        let mut records = self.records.write().await;
        match records.get_mut(transaction_id) {
            Some(record) if record.status == PaymentStatus::Pending => {
                record.status = status;
                Ok(Some(record.clone()))
            }
            _ => Ok(None),
        }
    }
}
