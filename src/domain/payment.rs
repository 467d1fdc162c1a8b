use crate::domain::money::Currency;
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PaymentRequest {
    pub amount: Decimal,
    pub currency: Currency,
    pub source_account: String,
    pub destination_account: String,
    pub metadata: HashMap<String, String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PaymentStatus {
    Pending,
    Processing,
    Completed,
    Failed,
    Cancelled,
    RequiresAction,
    PartiallyCompleted,
}

/// Gateway-level payment outcome. Value-equal across idempotent replays,
/// `processed_at` included.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PaymentResult {
    pub is_success: bool,
    pub gateway_transaction_id: Option<String>,
    pub status: PaymentStatus,
    pub error_code: Option<String>,
    pub error_message: Option<String>,
    pub processed_at: DateTime<Utc>,
    pub is_retryable: bool,
    pub actual_amount: Option<Decimal>,
    pub provider_reference: Option<String>,
}

impl PaymentResult {
    pub fn failure(code: &str, message: &str, retryable: bool) -> Self {
        Self {
            is_success: false,
            gateway_transaction_id: None,
            status: PaymentStatus::Failed,
            error_code: Some(code.to_string()),
            error_message: Some(message.to_string()),
            processed_at: Utc::now(),
            is_retryable: retryable,
            actual_amount: None,
            provider_reference: None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum RefundStatus {
    Pending,
    Processing,
    Completed,
    Failed,
    PartiallyRefunded,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RefundResult {
    pub is_success: bool,
    pub gateway_refund_id: Option<String>,
    pub status: RefundStatus,
    pub error_code: Option<String>,
    pub error_message: Option<String>,
    pub processed_at: DateTime<Utc>,
    pub refunded_amount: Option<Decimal>,
    pub original_transaction_id: String,
}

impl RefundResult {
    pub fn failure(code: &str, message: &str, original_transaction_id: &str) -> Self {
        Self {
            is_success: false,
            gateway_refund_id: None,
            status: RefundStatus::Failed,
            error_code: Some(code.to_string()),
            error_message: Some(message.to_string()),
            processed_at: Utc::now(),
            refunded_amount: None,
            original_transaction_id: original_transaction_id.to_string(),
        }
    }
}
