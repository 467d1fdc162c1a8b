use crate::domain::payment::PaymentRequest;
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TransactionStatus {
    Pending,
    Processed,
    Failed,
    Refunded,
}

impl TransactionStatus {
    /// Terminal states replay as pure reads; only the notification hook
    /// moves a transaction out of one.
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            TransactionStatus::Processed | TransactionStatus::Failed | TransactionStatus::Refunded
        )
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s.to_ascii_lowercase().as_str() {
            "pending" => Some(TransactionStatus::Pending),
            "processed" => Some(TransactionStatus::Processed),
            "failed" => Some(TransactionStatus::Failed),
            "refunded" => Some(TransactionStatus::Refunded),
            _ => None,
        }
    }
}

/// Processor-owned transaction record. The request field is a snapshot;
/// currency conversion rewrites the snapshot, never the caller's value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Transaction {
    pub id: String,
    pub request: PaymentRequest,
    pub status: TransactionStatus,
    pub timestamp: DateTime<Utc>,
    pub gateway_used: Option<String>,
    pub commission: Option<Decimal>,
    pub error_message: Option<String>,
    pub previous_status: Option<TransactionStatus>,
}

impl Transaction {
    pub fn pending(id: &str, request: PaymentRequest) -> Self {
        Self {
            id: id.to_string(),
            request,
            status: TransactionStatus::Pending,
            timestamp: Utc::now(),
            gateway_used: None,
            commission: None,
            error_message: None,
            previous_status: None,
        }
    }
}
