//! Payment service - Core translation pipeline between the processor and the game server.
//!
//! This service handles:
//! - Route-specific validation of inbound notifications
//! - The small-amount auto-approval rule
//! - Enrichment and forwarding to the game server
//! - Mapping game server outcomes to the public response shape
//!
//! # Failure Policy
//!
//! Only caller mistakes (invalid JSON, missing fields) become errors. A game
//! server that cannot be reached or answers garbage produces a result record
//! instead, so the caller always gets a 200 with a `success` flag.

use chrono::Utc;
use uuid::Uuid;

use crate::{
    codec::{self, Record},
    error::AppError,
    models::{
        outbound::OutboundResult,
        payment::{EnrichedPaymentRecord, PaymentNotification, ProcessResponse, VerifyResponse},
    },
    state::AppState,
};

/// A key that must be present, possibly under an older alias.
#[derive(Debug, Clone, Copy)]
pub struct RequiredField {
    pub name: &'static str,
    pub aliases: &'static [&'static str],
}

impl RequiredField {
    pub const fn new(name: &'static str) -> Self {
        Self { name, aliases: &[] }
    }

    pub const fn with_aliases(name: &'static str, aliases: &'static [&'static str]) -> Self {
        Self { name, aliases }
    }

    fn is_satisfied_by(&self, record: &Record) -> bool {
        codec::is_present(record, self.name)
            || self.aliases.iter().any(|alias| codec::is_present(record, alias))
    }
}

/// Input requirements of one payment route.
#[derive(Debug, Clone, Copy)]
pub struct ValidationRules {
    pub required: &'static [RequiredField],
}

impl ValidationRules {
    /// Names of every required field the record lacks, in declaration order.
    pub fn missing_fields(&self, record: &Record) -> Vec<String> {
        self.required
            .iter()
            .filter(|field| !field.is_satisfied_by(record))
            .map(|field| field.name.to_string())
            .collect()
    }

    /// # Errors
    ///
    /// - `MissingField`: naming everything that is absent
    pub fn check(&self, record: &Record) -> Result<(), AppError> {
        let missing = self.missing_fields(record);
        if missing.is_empty() {
            Ok(())
        } else {
            Err(AppError::MissingField(missing))
        }
    }
}

/// `POST /api/payment/process`
pub const PROCESS_RULES: ValidationRules = ValidationRules {
    required: &[
        RequiredField::with_aliases("userId", &["uid"]),
        RequiredField::new("amount"),
        RequiredField::new("creditAmount"),
    ],
};

/// `POST /api/payment/verify`
pub const VERIFY_RULES: ValidationRules = ValidationRules {
    required: &[RequiredField::new("paymentId"), RequiredField::new("amount")],
};

/// Process a payment notification.
///
/// # Process
///
/// 1. Check required fields
/// 2. Parse the amount (unparsable amounts count as 0)
/// 3. Below the threshold: approve locally, skip the game server
/// 4. Otherwise: enrich the payload and forward it to the game server
/// 5. Shape the outcome into a [`ProcessResponse`]
///
/// # Errors
///
/// - `MissingField`: `userId`/`uid`, `amount` or `creditAmount` absent
/// - `Internal`: the enriched record could not be serialized
pub async fn process_payment(
    state: &AppState,
    record: Record,
) -> Result<ProcessResponse, AppError> {
    PROCESS_RULES.check(&record)?;

    let notification = PaymentNotification::new(record);
    let user_id = notification
        .user_id()
        .ok_or_else(|| AppError::MissingField(vec!["userId".to_string()]))?;
    let amount = lenient_amount(&notification);

    tracing::info!(
        payment_key = %notification.payment_key(),
        order_id = %notification.order_id(),
        amount = %notification.amount_text(),
        user_id = %user_id,
        credit_amount = %notification.credit_amount(),
        "Processing payment notification"
    );

    let transaction_id = Uuid::new_v4();
    let timestamp = Utc::now().timestamp_millis();
    let threshold = state.config.auto_approve_threshold;

    if amount < threshold {
        tracing::info!(
            "Auto-approving small payment of {} (threshold {}), transaction {}",
            amount,
            threshold,
            transaction_id
        );

        let result = OutboundResult::auto_approved(
            amount,
            &user_id,
            &notification.credit_amount(),
            transaction_id,
            timestamp,
        );
        let message = format!("Small payment approved automatically (below {})", threshold);

        return Ok(build_response(
            &notification,
            user_id,
            result,
            Some(message),
            Some(true),
        ));
    }

    let enriched = EnrichedPaymentRecord::new(&notification, user_id.clone(), transaction_id, timestamp);
    let body = enriched.to_record()?;
    let endpoint = state.config.game_server_endpoint();

    tracing::info!("Forwarding transaction {} to {}", transaction_id, endpoint);

    let result = match state.game_server.post_payment(&endpoint, &body).await {
        Ok(result) => result,
        Err(AppError::BackendUnreachable(e)) => {
            tracing::error!(
                "Game server unreachable for transaction {}: {}",
                transaction_id,
                e
            );
            OutboundResult::unreachable_fallback(&enriched.credit_amount)
        }
        Err(AppError::InvalidBackendResponse(detail)) => {
            tracing::error!(
                "Unusable game server response for transaction {}: {}",
                transaction_id,
                detail
            );
            OutboundResult::processing_error(&detail)
        }
        Err(other) => return Err(other),
    };

    tracing::info!(
        "Transaction {} finished with success={}",
        transaction_id,
        result.success()
    );

    Ok(build_response(&notification, user_id, result, None, None))
}

/// Verify a payment without contacting the game server.
///
/// A payment is valid when `paymentId` is not blank and `amount` is a
/// non-negative number.
///
/// # Errors
///
/// - `MissingField`: `paymentId` or `amount` absent
pub fn verify_payment(state: &AppState, record: &Record) -> Result<VerifyResponse, AppError> {
    VERIFY_RULES.check(record)?;

    let payment_id = codec::text_or(record, "paymentId", "");
    let amount = record.get("amount").and_then(codec::decimal);

    if let Some(amount) = amount {
        if amount < state.config.auto_approve_threshold as f64 {
            tracing::info!("Small payment {} auto-approved at verification", amount);
        }
    }

    let valid = !payment_id.trim().is_empty() && amount.is_some_and(|a| a >= 0.0);

    let message = if valid {
        tracing::info!("Payment verified: paymentId={}, amount={:?}", payment_id, amount);
        "Payment verified successfully"
    } else {
        tracing::warn!(
            "Payment verification failed: paymentId={}, amount={:?}",
            payment_id,
            amount
        );
        "Payment verification failed"
    };

    Ok(VerifyResponse {
        success: valid,
        payment_id,
        message: message.to_string(),
    })
}

fn lenient_amount(notification: &PaymentNotification) -> i64 {
    notification.amount().unwrap_or_else(|| {
        tracing::warn!(
            "Could not parse amount `{}`, treating it as 0",
            notification.amount_text()
        );
        0
    })
}

fn build_response(
    notification: &PaymentNotification,
    user_id: String,
    result: OutboundResult,
    message: Option<String>,
    auto_processed: Option<bool>,
) -> ProcessResponse {
    let message = message
        .or_else(|| result.message())
        .unwrap_or_else(|| "Payment forwarded to the game server".to_string());

    ProcessResponse {
        success: result.success(),
        payment_key: notification.payment_key(),
        order_id: notification.order_id(),
        amount: notification.amount_text(),
        user_id,
        credit_amount: notification.credit_amount(),
        message,
        auto_processed,
        game_server_response: result.into_payload(),
    }
}
