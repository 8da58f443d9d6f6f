//! Payment HTTP handlers.
//!
//! This module implements the processor-facing endpoints:
//! - POST /api/payment/process - Forward a payment to the game server
//! - POST /api/payment/verify - Check a payment without contacting the game server
//!
//! Any other method on these paths is answered with 405.

use crate::{
    codec,
    error::AppError,
    models::payment::{ProcessResponse, VerifyResponse},
    services::payment_service,
    state::AppState,
};
use axum::{Json, body::Bytes, extract::State};

/// Process a payment notification.
///
/// The body is read raw and parsed by the codec so that malformed JSON gets
/// the same `{"success": false, ...}` shape as every other failure.
///
/// # Request Body
///
/// ```json
/// {
///   "userId": "u1",
///   "amount": "5000",
///   "creditAmount": "100",
///   "paymentKey": "pk1",
///   "orderId": "o1"
/// }
/// ```
///
/// # Response (200)
///
/// ```json
/// {
///   "success": true,
///   "paymentKey": "pk1",
///   "orderId": "o1",
///   "amount": "5000",
///   "userId": "u1",
///   "creditAmount": "100",
///   "message": "Payment forwarded to the game server",
///   "gameServerResponse": { "success": true, "newCreditBalance": 1100 }
/// }
/// ```
pub async fn process_payment(
    State(state): State<AppState>,
    body: Bytes,
) -> Result<Json<ProcessResponse>, AppError> {
    tracing::debug!("Raw payment notification: {}", String::from_utf8_lossy(&body));

    let record = codec::parse(&body)?;
    let response = payment_service::process_payment(&state, record).await?;

    Ok(Json(response))
}

/// Verify a payment.
///
/// # Request Body
///
/// ```json
/// { "paymentId": "p1", "amount": 5000 }
/// ```
///
/// # Response (200)
///
/// ```json
/// { "success": true, "paymentId": "p1", "message": "Payment verified successfully" }
/// ```
pub async fn verify_payment(
    State(state): State<AppState>,
    body: Bytes,
) -> Result<Json<VerifyResponse>, AppError> {
    let record = codec::parse(&body)?;
    let response = payment_service::verify_payment(&state, &record)?;

    Ok(Json(response))
}

/// Fallback for non-POST methods on the payment routes.
pub async fn method_not_allowed() -> AppError {
    AppError::MethodNotAllowed
}
