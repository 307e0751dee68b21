use axum::{extract::State, http::HeaderMap, Json};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::info;
use uuid::Uuid;

use crate::error::AppError;
use crate::middleware::error::get_request_id_from_headers;
use crate::services::SessionOrchestrator;

pub struct CheckoutState {
    pub orchestrator: Arc<SessionOrchestrator>,
}

#[derive(Debug, Deserialize)]
pub struct CheckoutRequest {
    pub amount: Decimal,
}

#[derive(Debug, Serialize)]
pub struct CheckoutResponse {
    pub payment_id: Uuid,
    pub transaction_id: String,
    pub redirect_url: String,
    pub attempts: u32,
}

/// POST /api/checkout
///
/// Creates a hosted checkout session and returns the gateway URL the
/// customer should be redirected to.
pub async fn initiate_checkout(
    State(state): State<Arc<CheckoutState>>,
    headers: HeaderMap,
    Json(payload): Json<CheckoutRequest>,
) -> Result<Json<CheckoutResponse>, AppError> {
    let request_id = get_request_id_from_headers(&headers);

    info!(amount = %payload.amount, "Checkout initiation requested");

    let outcome = state
        .orchestrator
        .initiate(payload.amount)
        .await
        .map_err(|e| {
            let err = AppError::from(e);
            match request_id {
                Some(rid) => err.with_request_id(rid),
                None => err,
            }
        })?;

    Ok(Json(CheckoutResponse {
        payment_id: outcome.payment_id,
        transaction_id: outcome.transaction_id,
        redirect_url: outcome.redirect_url,
        attempts: outcome.attempts,
    }))
}
