use crate::domain::money::Currency;
use crate::domain::payment::{PaymentRequest, PaymentResult, RefundResult};
use anyhow::Result;
use rust_decimal::Decimal;

pub mod adapter;
pub mod mock;
pub mod reference;

/// Legacy provider contract: boolean outcomes, no idempotency keys, no
/// status lookup. Kept for providers that have not yet exposed idempotent
/// APIs; the router and processor speak this shape.
#[async_trait::async_trait]
pub trait PaymentGateway: Send + Sync {
    fn name(&self) -> &str;

    async fn commission(&self, currency: Currency) -> Decimal;

    async fn is_available(&self) -> bool;

    fn supports_currency(&self, currency: Currency) -> bool;

    async fn process_payment(&self, request: &PaymentRequest) -> Result<bool>;

    async fn refund(&self, transaction_id: &str, amount: Decimal) -> Result<bool>;
}

impl std::fmt::Debug for dyn PaymentGateway {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PaymentGateway").field("name", &self.name()).finish()
    }
}

/// Modern provider contract. Every operation is idempotent on the
/// caller-supplied key: the first completed call fixes the result and all
/// replays return it value-identical, `processed_at` included.
#[async_trait::async_trait]
pub trait IdempotentGateway: Send + Sync {
    fn name(&self) -> &str;

    async fn commission(&self, currency: Currency) -> Decimal;

    async fn is_available(&self) -> bool;

    fn supports_currency(&self, currency: Currency) -> bool;

    async fn process_payment(&self, request: &PaymentRequest, transaction_id: &str)
        -> PaymentResult;

    async fn payment_status(&self, transaction_id: &str) -> PaymentResult;

    async fn refund(&self, transaction_id: &str, amount: Decimal, refund_id: &str)
        -> RefundResult;

    async fn refund_status(&self, refund_id: &str) -> RefundResult;

    async fn cancel_payment(&self, transaction_id: &str) -> PaymentResult;
}
