use axum::{extract::State, http::HeaderMap, response::IntoResponse, Form};
use serde::Deserialize;
use std::sync::Arc;
use tracing::info;

use crate::error::AppError;
use crate::middleware::error::{get_request_id_from_headers, success_response};
use crate::services::CallbackProcessor;

pub struct CallbackState {
    pub processor: Arc<CallbackProcessor>,
}

/// The gateway redirects the customer back either with a GET carrying a
/// query string or a POST carrying a urlencoded form; `Form` accepts both.
#[derive(Debug, Default, Deserialize)]
pub struct CallbackParams {
    pub tran_id: Option<String>,
}

/// GET|POST /api/checkout/callback/success
pub async fn success_callback(
    State(state): State<Arc<CallbackState>>,
    headers: HeaderMap,
    Form(params): Form<CallbackParams>,
) -> Result<impl IntoResponse, AppError> {
    let request_id = get_request_id_from_headers(&headers);

    info!(tran_id = ?params.tran_id, "Success callback received");

    let record = state
        .processor
        .confirm_success(params.tran_id.as_deref())
        .await
        .map_err(|e| {
            let err = AppError::from(e);
            match request_id {
                Some(rid) => err.with_request_id(rid),
                None => err,
            }
        })?;

    Ok(success_response(serde_json::json!({
        "payment_id": record.id,
        "transaction_id": record.transaction_id,
        "status": record.status,
    })))
}

/// GET|POST /api/checkout/callback/fail
pub async fn fail_callback(
    State(state): State<Arc<CallbackState>>,
    headers: HeaderMap,
    Form(params): Form<CallbackParams>,
) -> Result<impl IntoResponse, AppError> {
    let request_id = get_request_id_from_headers(&headers);

    info!(tran_id = ?params.tran_id, "Failure callback received");

    let record = state
        .processor
        .confirm_failure(params.tran_id.as_deref())
        .await
        .map_err(|e| {
            let err = AppError::from(e);
            match request_id {
                Some(rid) => err.with_request_id(rid),
                None => err,
            }
        })?;

    Ok(success_response(serde_json::json!({
        "payment_id": record.id,
        "transaction_id": record.transaction_id,
        "status": record.status,
    })))
}

/// GET|POST /api/checkout/callback/cancel
///
/// Always acknowledged with 200: the customer abandoned the hosted page
/// and there is nothing to reconcile.
pub async fn cancel_callback(
    State(state): State<Arc<CallbackState>>,
    Form(params): Form<CallbackParams>,
) -> impl IntoResponse {
    state.processor.acknowledge_cancel(params.tran_id.as_deref());

    success_response(serde_json::json!({
        "status": "cancelled",
    }))
}
