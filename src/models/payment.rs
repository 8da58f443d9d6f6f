//! Payment data models and API request/response types.
//!
//! This module defines:
//! - `PaymentNotification`: The inbound payload sent by the payment processor
//! - `EnrichedPaymentRecord`: What gets forwarded to the game server
//! - `ProcessResponse` / `VerifyResponse`: Response bodies returned to callers

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::codec::{self, Record};
use crate::error::AppError;

/// Payment method tag sent to the game server.
pub const PAYMENT_METHOD: &str = "toss";

/// Provenance tag identifying the processor that originated the payment.
pub const PAYMENT_PROCESSOR: &str = "TossPayments";

/// Product assumed when the notification does not name one.
pub const DEFAULT_PRODUCT_ID: &str = "credit";

/// Inbound payment notification.
///
/// Loosely typed on purpose: only a handful of keys are interpreted, every
/// other key is carried along and forwarded unchanged.
///
/// # JSON Example
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
#[derive(Debug, Clone)]
pub struct PaymentNotification {
    fields: Record,
}

impl PaymentNotification {
    pub fn new(fields: Record) -> Self {
        Self { fields }
    }

    pub fn fields(&self) -> &Record {
        &self.fields
    }

    /// `userId`, or the older `uid` spelling.
    pub fn user_id(&self) -> Option<String> {
        codec::text(&self.fields, "userId").or_else(|| codec::text(&self.fields, "uid"))
    }

    /// Amount exactly as the caller sent it, `"0"` when absent.
    pub fn amount_text(&self) -> String {
        codec::text_or(&self.fields, "amount", "0")
    }

    /// Amount in minor units, `None` when it does not parse.
    pub fn amount(&self) -> Option<i64> {
        self.fields.get("amount").and_then(codec::integer)
    }

    pub fn credit_amount(&self) -> String {
        codec::text_or(&self.fields, "creditAmount", "0")
    }

    pub fn payment_key(&self) -> String {
        codec::text_or(&self.fields, "paymentKey", "")
    }

    pub fn order_id(&self) -> String {
        codec::text_or(&self.fields, "orderId", "")
    }

    pub fn product_id(&self) -> String {
        codec::text_or(&self.fields, "productId", DEFAULT_PRODUCT_ID)
    }
}

/// Payment data sent to the game server.
///
/// The original notification fields come first, followed by the fields the
/// relay computes. Keys the relay owns are removed from `fields` so they
/// appear exactly once on the wire.
///
/// # JSON Example
///
/// ```json
/// {
///   "customField": "kept",
///   "userId": "u1",
///   "creditAmount": "100",
///   "paymentKey": "pk1",
///   "orderId": "o1",
///   "amount": "5000",
///   "productId": "credit",
///   "paymentMethod": "toss",
///   "paymentProcessor": "TossPayments",
///   "transactionId": "3f2b...",
///   "timestamp": 1760000000000
/// }
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EnrichedPaymentRecord {
    /// Pass-through fields from the notification
    #[serde(flatten)]
    pub fields: Record,

    pub user_id: String,
    pub credit_amount: String,
    pub payment_key: String,
    pub order_id: String,
    pub amount: String,
    pub product_id: String,
    pub payment_method: String,
    pub payment_processor: String,

    /// Generated per request, never reused
    pub transaction_id: Uuid,

    /// Capture time in epoch milliseconds
    pub timestamp: i64,
}

impl EnrichedPaymentRecord {
    const OWNED_KEYS: [&'static str; 10] = [
        "userId",
        "creditAmount",
        "paymentKey",
        "orderId",
        "amount",
        "productId",
        "paymentMethod",
        "paymentProcessor",
        "transactionId",
        "timestamp",
    ];

    pub fn new(
        notification: &PaymentNotification,
        user_id: String,
        transaction_id: Uuid,
        timestamp: i64,
    ) -> Self {
        let mut fields = notification.fields().clone();
        // `uid` is replaced by the canonical `userId`
        fields.shift_remove("uid");
        for key in Self::OWNED_KEYS {
            fields.shift_remove(key);
        }

        Self {
            fields,
            user_id,
            credit_amount: notification.credit_amount(),
            payment_key: notification.payment_key(),
            order_id: notification.order_id(),
            amount: notification.amount_text(),
            product_id: notification.product_id(),
            payment_method: PAYMENT_METHOD.to_string(),
            payment_processor: PAYMENT_PROCESSOR.to_string(),
            transaction_id,
            timestamp,
        }
    }

    pub fn to_record(&self) -> Result<Record, AppError> {
        match serde_json::to_value(self) {
            Ok(serde_json::Value::Object(record)) => Ok(record),
            Ok(_) => Err(AppError::Internal(
                "enriched payment record did not serialize to an object".to_string(),
            )),
            Err(e) => Err(AppError::Internal(format!(
                "failed to serialize enriched payment record: {}",
                e
            ))),
        }
    }

    pub fn from_record(record: Record) -> Result<Self, serde_json::Error> {
        serde_json::from_value(serde_json::Value::Object(record))
    }
}

/// Response returned by `POST /api/payment/process`.
///
/// # JSON Example
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
#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProcessResponse {
    pub success: bool,
    pub payment_key: String,
    pub order_id: String,
    pub amount: String,
    pub user_id: String,
    pub credit_amount: String,
    pub message: String,

    /// Only present when the small-amount rule skipped the game server
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub auto_processed: Option<bool>,

    /// Raw game server payload (or the locally synthesized one)
    pub game_server_response: Record,
}

/// Response returned by `POST /api/payment/verify`.
#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VerifyResponse {
    pub success: bool,
    pub payment_id: String,
    pub message: String,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn notification(value: serde_json::Value) -> PaymentNotification {
        match value {
            serde_json::Value::Object(fields) => PaymentNotification::new(fields),
            _ => panic!("test payload must be an object"),
        }
    }

    #[test]
    fn accessors_apply_defaults() {
        let n = notification(json!({ "userId": "u1" }));

        assert_eq!(n.credit_amount(), "0");
        assert_eq!(n.payment_key(), "");
        assert_eq!(n.order_id(), "");
        assert_eq!(n.product_id(), "credit");
        assert_eq!(n.amount_text(), "0");
        assert_eq!(n.amount(), None);
    }

    #[test]
    fn uid_is_accepted_for_user_id() {
        let n = notification(json!({ "uid": "legacy-user" }));
        assert_eq!(n.user_id().as_deref(), Some("legacy-user"));

        let both = notification(json!({ "uid": "old", "userId": "new" }));
        assert_eq!(both.user_id().as_deref(), Some("new"));
    }

    #[test]
    fn enriched_record_keeps_unknown_fields_and_overrides_owned_ones() {
        let n = notification(json!({
            "uid": "u1",
            "amount": 5000,
            "creditAmount": 100,
            "orderName": "100 credits",
            "timestamp": "caller-supplied",
        }));
        let id = Uuid::new_v4();

        let enriched = EnrichedPaymentRecord::new(&n, "u1".into(), id, 1_760_000_000_000);
        let record = enriched.to_record().unwrap();

        assert_eq!(record["orderName"], json!("100 credits"));
        assert_eq!(record["userId"], json!("u1"));
        assert_eq!(record["amount"], json!("5000"));
        assert_eq!(record["creditAmount"], json!("100"));
        assert_eq!(record["paymentMethod"], json!("toss"));
        assert_eq!(record["paymentProcessor"], json!("TossPayments"));
        assert_eq!(record["transactionId"], json!(id.to_string()));
        assert_eq!(record["timestamp"], json!(1_760_000_000_000_i64));
        assert!(!record.contains_key("uid"));

        // Original fields lead, computed ones follow
        assert_eq!(record.keys().next().map(String::as_str), Some("orderName"));
    }

    #[test]
    fn enriched_record_survives_serialize_then_parse() {
        let n = notification(json!({
            "userId": "u1",
            "amount": "5000",
            "creditAmount": "100",
            "paymentKey": "pk1",
            "orderId": "o1",
            "extra": { "nested": [1, 2, 3] },
        }));
        let enriched = EnrichedPaymentRecord::new(&n, "u1".into(), Uuid::new_v4(), 42);

        let text = codec::serialize(&enriched.to_record().unwrap());
        let parsed = EnrichedPaymentRecord::from_record(codec::parse(text.as_bytes()).unwrap())
            .unwrap();

        assert_eq!(parsed, enriched);
    }

    #[test]
    fn process_response_omits_auto_processed_when_unset() {
        let response = ProcessResponse {
            success: true,
            payment_key: "pk1".into(),
            order_id: "o1".into(),
            amount: "5000".into(),
            user_id: "u1".into(),
            credit_amount: "100".into(),
            message: "ok".into(),
            auto_processed: None,
            game_server_response: Record::new(),
        };

        let value = serde_json::to_value(&response).unwrap();
        assert!(value.get("autoProcessed").is_none());
        assert_eq!(value["gameServerResponse"], json!({}));
    }
}
