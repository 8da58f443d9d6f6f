//! Outcome of forwarding a payment to the game server.
//!
//! A result is either what the game server answered or a record synthesized
//! locally (small-amount approval, unreachable game server, unusable answer).
//! Either way it ends up verbatim under `gameServerResponse`.

use serde_json::{Value, json};
use uuid::Uuid;

use crate::codec::{self, Record};

/// Credit balance assumed by locally synthesized results.
pub const MOCK_BASE_CREDIT_BALANCE: i64 = 1000;

#[derive(Debug, Clone, PartialEq)]
pub struct OutboundResult {
    payload: Record,
}

impl OutboundResult {
    /// Wrap a game server answer.
    ///
    /// When the game server leaves out `success`, it is derived from the HTTP status.
    pub fn from_backend(status_is_success: bool, mut payload: Record) -> Self {
        if !payload.contains_key("success") {
            payload.insert("success".into(), Value::Bool(status_is_success));
        }
        Self { payload }
    }

    /// The game server answered with an empty body.
    pub fn empty_backend_response() -> Self {
        Self::failure("EMPTY_RESPONSE", "Game server returned an empty response")
    }

    /// The game server answered, but not with a JSON object.
    pub fn processing_error(detail: &str) -> Self {
        Self::failure(
            "PROCESSING_ERROR",
            &format!("Failed to process game server response: {}", detail),
        )
    }

    /// Approval granted locally for a payment below the threshold.
    pub fn auto_approved(
        amount: i64,
        user_id: &str,
        credit_amount: &str,
        transaction_id: Uuid,
        timestamp: i64,
    ) -> Self {
        Self::from_value(json!({
            "success": true,
            "message": "Small payment approved automatically",
            "autoProcessed": true,
            "reason": "SMALL_AMOUNT",
            "originalAmount": amount,
            "userId": user_id,
            "creditAmount": credit_amount,
            "transactionId": transaction_id.to_string(),
            "timestamp": timestamp,
        }))
    }

    /// Stand-in answer used when the game server cannot be reached.
    ///
    /// Marked with `isMock` so callers can tell it apart from a real credit.
    pub fn unreachable_fallback(credit_amount: &str) -> Self {
        let credit = codec::integer(&Value::String(credit_amount.to_string())).unwrap_or(0);

        Self::from_value(json!({
            "success": true,
            "message": "Game server unreachable, responding in test mode",
            "note": "This response was generated locally because the game server could not be reached",
            "creditAmount": credit_amount,
            "newCreditBalance": MOCK_BASE_CREDIT_BALANCE.saturating_add(credit),
            "isMock": true,
        }))
    }

    fn failure(error: &str, message: &str) -> Self {
        Self::from_value(json!({
            "success": false,
            "error": error,
            "message": message,
        }))
    }

    fn from_value(value: Value) -> Self {
        match value {
            Value::Object(payload) => Self { payload },
            _ => Self {
                payload: Record::new(),
            },
        }
    }

    /// `success` as reported in the payload.
    ///
    /// Accepts a boolean or the strings `"true"`/`"false"`; anything else is a failure.
    pub fn success(&self) -> bool {
        match self.payload.get("success") {
            Some(Value::Bool(b)) => *b,
            Some(Value::String(s)) => s.eq_ignore_ascii_case("true"),
            _ => false,
        }
    }

    pub fn message(&self) -> Option<String> {
        codec::text(&self.payload, "message")
    }

    pub fn into_payload(self) -> Record {
        self.payload
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(value: Value) -> Record {
        match value {
            Value::Object(map) => map,
            _ => unreachable!(),
        }
    }

    #[test]
    fn backend_payload_is_kept_verbatim() {
        let result =
            OutboundResult::from_backend(true, record(json!({ "success": false, "code": 7 })));

        assert!(!result.success());
        assert_eq!(result.payload["code"], json!(7));
    }

    #[test]
    fn missing_success_is_derived_from_status() {
        let ok = OutboundResult::from_backend(true, record(json!({ "newCreditBalance": 1100 })));
        let failed = OutboundResult::from_backend(false, record(json!({ "error": "bad" })));

        assert!(ok.success());
        assert!(!failed.success());
        assert_eq!(failed.payload["success"], json!(false));
    }

    #[test]
    fn fallback_is_marked_as_mock() {
        let result = OutboundResult::unreachable_fallback("100");

        assert!(result.success());
        assert_eq!(result.payload["isMock"], json!(true));
        assert_eq!(result.payload["newCreditBalance"], json!(1100));
        assert_eq!(result.payload["creditAmount"], json!("100"));
    }

    #[test]
    fn fallback_tolerates_unparsable_credit() {
        let result = OutboundResult::unreachable_fallback("lots");
        assert_eq!(result.payload["newCreditBalance"], json!(1000));
    }

    #[test]
    fn fallback_balance_saturates_on_huge_credit() {
        let result = OutboundResult::unreachable_fallback("9223372036854775000");

        assert!(result.success());
        assert_eq!(result.payload["newCreditBalance"], json!(i64::MAX));
    }

    #[test]
    fn string_success_flag_is_understood() {
        let result = OutboundResult::from_backend(true, record(json!({ "success": "true" })));
        assert!(result.success());
    }

    #[test]
    fn auto_approval_carries_reason_and_credit() {
        let id = Uuid::new_v4();
        let result = OutboundResult::auto_approved(250, "u1", "100", id, 1);

        assert!(result.success());
        assert_eq!(result.payload["reason"], json!("SMALL_AMOUNT"));
        assert_eq!(result.payload["creditAmount"], json!("100"));
        assert_eq!(result.payload["transactionId"], json!(id.to_string()));
    }
}
