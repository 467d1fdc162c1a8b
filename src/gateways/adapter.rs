use crate::domain::money::{round_display, Currency};
use crate::domain::payment::{PaymentRequest, PaymentResult, PaymentStatus, RefundResult, RefundStatus};
use crate::gateways::{IdempotentGateway, PaymentGateway};
use anyhow::Result;
use chrono::Utc;
use rust_decimal::Decimal;
use std::sync::Arc;
use uuid::Uuid;

/// Presents a legacy gateway behind the modern contract. Boolean and abrupt
/// failures are normalized into result codes; operations the legacy shape
/// cannot express report NOT_SUPPORTED.
pub struct LegacyGatewayAdapter {
    inner: Arc<dyn PaymentGateway>,
}

impl LegacyGatewayAdapter {
    pub fn new(inner: Arc<dyn PaymentGateway>) -> Self {
        Self { inner }
    }
}

#[async_trait::async_trait]
impl IdempotentGateway for LegacyGatewayAdapter {
    fn name(&self) -> &str {
        self.inner.name()
    }

    async fn commission(&self, currency: Currency) -> Decimal {
        self.inner.commission(currency).await
    }

    async fn is_available(&self) -> bool {
        self.inner.is_available().await
    }

    fn supports_currency(&self, currency: Currency) -> bool {
        self.inner.supports_currency(currency)
    }

    async fn process_payment(
        &self,
        request: &PaymentRequest,
        transaction_id: &str,
    ) -> PaymentResult {
        match self.inner.process_payment(request).await {
            Ok(true) => PaymentResult {
                is_success: true,
                gateway_transaction_id: Some(format!("{}_{}", self.inner.name(), transaction_id)),
                status: PaymentStatus::Completed,
                error_code: None,
                error_message: None,
                processed_at: Utc::now(),
                is_retryable: false,
                actual_amount: None,
                provider_reference: None,
            },
            Ok(false) => PaymentResult::failure(
                "LEGACY_GATEWAY_ERROR",
                "legacy gateway declined the payment",
                true,
            ),
            Err(err) => PaymentResult::failure("LEGACY_GATEWAY_EXCEPTION", &err.to_string(), true),
        }
    }

    async fn payment_status(&self, _transaction_id: &str) -> PaymentResult {
        PaymentResult::failure("NOT_SUPPORTED", "legacy gateway has no status lookup", false)
    }

    async fn refund(
        &self,
        transaction_id: &str,
        amount: Decimal,
        refund_id: &str,
    ) -> RefundResult {
        match self.inner.refund(transaction_id, amount).await {
            Ok(true) => RefundResult {
                is_success: true,
                gateway_refund_id: Some(format!("{}_{}", self.inner.name(), refund_id)),
                status: RefundStatus::Completed,
                error_code: None,
                error_message: None,
                processed_at: Utc::now(),
                refunded_amount: Some(round_display(amount)),
                original_transaction_id: transaction_id.to_string(),
            },
            Ok(false) => RefundResult::failure(
                "LEGACY_GATEWAY_ERROR",
                "legacy gateway declined the refund",
                transaction_id,
            ),
            Err(err) => {
                RefundResult::failure("LEGACY_GATEWAY_EXCEPTION", &err.to_string(), transaction_id)
            }
        }
    }

    async fn refund_status(&self, refund_id: &str) -> RefundResult {
        RefundResult::failure("NOT_SUPPORTED", "legacy gateway has no refund lookup", refund_id)
    }

    async fn cancel_payment(&self, _transaction_id: &str) -> PaymentResult {
        PaymentResult::failure("NOT_SUPPORTED", "legacy gateway cannot cancel", false)
    }
}

/// Presents a modern gateway behind the legacy contract for callers that
/// predate idempotency keys. A fresh opaque id is synthesized per call, so
/// replays through this facade are distinct operations. This is the only
/// place ids are synthesized.
pub struct LegacyFacade {
    inner: Arc<dyn IdempotentGateway>,
}

impl LegacyFacade {
    pub fn new(inner: Arc<dyn IdempotentGateway>) -> Self {
        Self { inner }
    }
}

#[async_trait::async_trait]
impl PaymentGateway for LegacyFacade {
    fn name(&self) -> &str {
        self.inner.name()
    }

    async fn commission(&self, currency: Currency) -> Decimal {
        self.inner.commission(currency).await
    }

    async fn is_available(&self) -> bool {
        self.inner.is_available().await
    }

    fn supports_currency(&self, currency: Currency) -> bool {
        self.inner.supports_currency(currency)
    }

    async fn process_payment(&self, request: &PaymentRequest) -> Result<bool> {
        let transaction_id = Uuid::new_v4().to_string();
        let result = self.inner.process_payment(request, &transaction_id).await;
        Ok(result.is_success)
    }

    async fn refund(&self, transaction_id: &str, amount: Decimal) -> Result<bool> {
        let refund_id = Uuid::new_v4().to_string();
        let result = self.inner.refund(transaction_id, amount, &refund_id).await;
        Ok(result.is_success)
    }
}
