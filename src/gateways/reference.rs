use crate::domain::money::{round_display, Currency};
use crate::domain::payment::{PaymentRequest, PaymentResult, PaymentStatus, RefundResult, RefundStatus};
use crate::gateways::IdempotentGateway;
use crate::sync::LockMap;
use chrono::Utc;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use rust_decimal::Decimal;
use std::collections::{HashMap, HashSet};
use std::time::Duration;
use tokio::sync::RwLock;
use uuid::Uuid;

const DEFAULT_LATENCY: Duration = Duration::from_millis(25);
const DEFAULT_AVAILABILITY: f64 = 0.95;

/// In-memory idempotent gateway; the canonical implementation of the modern
/// contract. Outcomes are drawn from a seedable RNG: 85% completed, 10%
/// retryable TEMPORARY_ERROR, 5% INSUFFICIENT_FUNDS. Every API call sleeps
/// the configured latency to behave like a remote provider.
pub struct ReferenceGateway {
    name: String,
    commission_rate: Decimal,
    supported: HashSet<Currency>,
    latency: Duration,
    availability: f64,
    rng: std::sync::Mutex<StdRng>,
    processed_payments: RwLock<HashMap<String, PaymentResult>>,
    processed_refunds: RwLock<HashMap<String, RefundResult>>,
    payment_locks: LockMap,
    refund_locks: LockMap,
}

impl ReferenceGateway {
    pub fn new(
        name: &str,
        commission_rate: Decimal,
        supported: impl IntoIterator<Item = Currency>,
    ) -> Self {
        Self {
            name: name.to_string(),
            commission_rate,
            supported: supported.into_iter().collect(),
            latency: DEFAULT_LATENCY,
            availability: DEFAULT_AVAILABILITY,
            rng: std::sync::Mutex::new(StdRng::from_entropy()),
            processed_payments: RwLock::new(HashMap::new()),
            processed_refunds: RwLock::new(HashMap::new()),
            payment_locks: LockMap::new(),
            refund_locks: LockMap::new(),
        }
    }

    /// Pins the outcome stream so tests can replay it.
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.rng = std::sync::Mutex::new(StdRng::seed_from_u64(seed));
        self
    }

    pub fn with_latency(mut self, latency: Duration) -> Self {
        self.latency = latency;
        self
    }

    pub fn with_config(self, config: &crate::config::OrchestratorConfig) -> Self {
        self.with_latency(config.gateway_latency())
    }

    /// Probability that `is_available` reports true.
    pub fn with_availability(mut self, availability: f64) -> Self {
        self.availability = availability;
        self
    }

    fn sample(&self) -> f64 {
        self.rng.lock().unwrap_or_else(|e| e.into_inner()).gen::<f64>()
    }

    async fn simulate_latency(&self) {
        tokio::time::sleep(self.latency).await;
    }

    fn draw_payment_outcome(&self, request: &PaymentRequest) -> PaymentResult {
        // Unsupported currency short-circuits before a sample is consumed.
        if !self.supported.contains(&request.currency) {
            return PaymentResult::failure(
                "UNSUPPORTED_CURRENCY",
                &format!("{} does not support {}", self.name, request.currency),
                false,
            );
        }

        let roll = self.sample();
        if roll < 0.85 {
            let fee = request.amount * self.commission_rate;
            PaymentResult {
                is_success: true,
                gateway_transaction_id: Some(format!("{}_txn_{}", self.name, Uuid::new_v4())),
                status: PaymentStatus::Completed,
                error_code: None,
                error_message: None,
                processed_at: Utc::now(),
                is_retryable: false,
                actual_amount: Some(round_display(request.amount - fee)),
                provider_reference: Some(format!("ref_{}", Uuid::new_v4())),
            }
        } else if roll < 0.95 {
            PaymentResult::failure("TEMPORARY_ERROR", "temporary provider error", true)
        } else {
            PaymentResult::failure("INSUFFICIENT_FUNDS", "insufficient funds", false)
        }
    }
}

#[async_trait::async_trait]
impl IdempotentGateway for ReferenceGateway {
    fn name(&self) -> &str {
        &self.name
    }

    async fn commission(&self, _currency: Currency) -> Decimal {
        self.simulate_latency().await;
        self.commission_rate
    }

    async fn is_available(&self) -> bool {
        self.simulate_latency().await;
        self.sample() < self.availability
    }

    fn supports_currency(&self, currency: Currency) -> bool {
        self.supported.contains(&currency)
    }

    async fn process_payment(
        &self,
        request: &PaymentRequest,
        transaction_id: &str,
    ) -> PaymentResult {
        if let Some(hit) = self.processed_payments.read().await.get(transaction_id) {
            return hit.clone();
        }

        let lock = self.payment_locks.handle(transaction_id);
        let _guard = lock.lock().await;

        // Double-checked: a racing call may have fixed the result while we
        // waited for the lock.
        if let Some(hit) = self.processed_payments.read().await.get(transaction_id) {
            return hit.clone();
        }

        self.simulate_latency().await;
        let result = self.draw_payment_outcome(request);
        self.processed_payments
            .write()
            .await
            .insert(transaction_id.to_string(), result.clone());
        result
    }

    async fn payment_status(&self, transaction_id: &str) -> PaymentResult {
        self.simulate_latency().await;
        match self.processed_payments.read().await.get(transaction_id) {
            Some(result) => result.clone(),
            None => PaymentResult::failure(
                "TRANSACTION_NOT_FOUND",
                &format!("unknown transaction {}", transaction_id),
                false,
            ),
        }
    }

    async fn refund(
        &self,
        transaction_id: &str,
        amount: Decimal,
        refund_id: &str,
    ) -> RefundResult {
        if let Some(hit) = self.processed_refunds.read().await.get(refund_id) {
            return hit.clone();
        }

        let lock = self.refund_locks.handle(refund_id);
        let _guard = lock.lock().await;

        if let Some(hit) = self.processed_refunds.read().await.get(refund_id) {
            return hit.clone();
        }

        self.simulate_latency().await;
        let known = self.processed_payments.read().await.contains_key(transaction_id);
        let result = if known {
            RefundResult {
                is_success: true,
                gateway_refund_id: Some(format!("{}_ref_{}", self.name, Uuid::new_v4())),
                status: RefundStatus::Completed,
                error_code: None,
                error_message: None,
                processed_at: Utc::now(),
                refunded_amount: Some(round_display(amount)),
                original_transaction_id: transaction_id.to_string(),
            }
        } else {
            RefundResult::failure(
                "TRANSACTION_NOT_FOUND",
                &format!("unknown transaction {}", transaction_id),
                transaction_id,
            )
        };

        self.processed_refunds
            .write()
            .await
            .insert(refund_id.to_string(), result.clone());
        result
    }

    async fn refund_status(&self, refund_id: &str) -> RefundResult {
        self.simulate_latency().await;
        match self.processed_refunds.read().await.get(refund_id) {
            Some(result) => result.clone(),
            None => RefundResult::failure(
                "REFUND_NOT_FOUND",
                &format!("unknown refund {}", refund_id),
                "",
            ),
        }
    }

    async fn cancel_payment(&self, transaction_id: &str) -> PaymentResult {
        let lock = self.payment_locks.handle(transaction_id);
        let _guard = lock.lock().await;

        self.simulate_latency().await;
        let mut payments = self.processed_payments.write().await;
        match payments.get(transaction_id) {
            None => PaymentResult::failure(
                "TRANSACTION_NOT_FOUND",
                &format!("unknown transaction {}", transaction_id),
                false,
            ),
            Some(current)
                if matches!(current.status, PaymentStatus::Pending | PaymentStatus::Processing) =>
            {
                let cancelled = PaymentResult {
                    is_success: true,
                    gateway_transaction_id: current.gateway_transaction_id.clone(),
                    status: PaymentStatus::Cancelled,
                    error_code: None,
                    error_message: None,
                    processed_at: Utc::now(),
                    is_retryable: false,
                    actual_amount: None,
                    provider_reference: current.provider_reference.clone(),
                };
                payments.insert(transaction_id.to_string(), cancelled.clone());
                cancelled
            }
            Some(current) => PaymentResult {
                is_success: false,
                gateway_transaction_id: current.gateway_transaction_id.clone(),
                status: PaymentStatus::Cancelled,
                error_code: Some("CANNOT_CANCEL".to_string()),
                error_message: Some(format!(
                    "payment is {:?} and can no longer be cancelled",
                    current.status
                )),
                processed_at: Utc::now(),
                is_retryable: false,
                actual_amount: None,
                provider_reference: current.provider_reference.clone(),
            },
        }
    }
}
