use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::PaymentError;

/// Body of `POST /payments`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TransactionRequest {
    pub amount: f64,
    pub recipient: String,
    pub memo: String,
}

impl TransactionRequest {
    /// Build a request, rejecting amounts that are not strictly positive.
    pub fn new(
        amount: f64,
        recipient: impl Into<String>,
        memo: impl Into<String>,
    ) -> Result<Self, PaymentError> {
        if !amount.is_finite() || amount <= 0.0 {
            return Err(PaymentError::Precondition(format!(
                "amount must be a positive number, got {amount}"
            )));
        }
        Ok(Self {
            amount,
            recipient: recipient.into(),
            memo: memo.into(),
        })
    }
}

/// A payment the provider has created but not yet completed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PreparedTransaction {
    pub payment_id: String,
    /// Full provider response, `payment_id` included.
    pub raw: serde_json::Value,
}

impl PreparedTransaction {
    pub(crate) fn from_response(raw: serde_json::Value) -> Result<Self, PaymentError> {
        let payment_id = match raw.get("payment_id") {
            Some(serde_json::Value::String(s)) if !s.is_empty() => s.clone(),
            Some(serde_json::Value::Number(n)) => n.to_string(),
            _ => {
                return Err(PaymentError::InvalidResponse(format!(
                    "payment response has no payment_id: {raw}"
                )))
            }
        };
        Ok(Self { payment_id, raw })
    }
}

/// Terminal outcome of a completed payment.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TransactionResult {
    pub success: bool,
    pub raw: serde_json::Value,
    pub timestamp: DateTime<Utc>,
}

/// Memo attached to payments that were not given one explicitly.
pub fn default_memo(now: DateTime<Utc>) -> String {
    format!("{} - {}", crate::constants::MEMO_PREFIX, now.to_rfc3339())
}
