use crate::domain::money::Currency;
use crate::domain::payment::PaymentRequest;
use crate::domain::transaction::{Transaction, TransactionStatus};
use crate::error::OrchestratorError;
use crate::retry::RetryPolicy;
use crate::router::commission::CommissionRouter;
use crate::service::rates::RateService;
use crate::service::validator::Validator;
use crate::sync::LockMap;
use rust_decimal::Decimal;
use std::collections::HashMap;
use std::sync::Arc;
use thiserror::Error;
use tokio::sync::RwLock;

/// Marker for a gateway that answered `false`: retried like any other
/// failure, but recorded without an error message.
#[derive(Debug, Error)]
#[error("gateway declined the payment")]
struct GatewayDeclined;

/// Owns the transaction lifecycle: at-most-once effective execution per
/// transaction id, retry-with-backoff around the gateway call, currency
/// conversion, refunds and out-of-band status notifications. State lives in
/// memory for the lifetime of the process.
pub struct PaymentProcessor {
    validator: Arc<dyn Validator>,
    router: Arc<CommissionRouter>,
    rates: Arc<dyn RateService>,
    retry: RetryPolicy,
    transactions: RwLock<HashMap<String, Transaction>>,
    locks: LockMap,
}

impl PaymentProcessor {
    pub fn new(
        validator: Arc<dyn Validator>,
        router: Arc<CommissionRouter>,
        rates: Arc<dyn RateService>,
    ) -> Self {
        Self {
            validator,
            router,
            rates,
            retry: RetryPolicy::default(),
            transactions: RwLock::new(HashMap::new()),
            locks: LockMap::new(),
        }
    }

    pub fn with_retry_policy(mut self, retry: RetryPolicy) -> Self {
        self.retry = retry;
        self
    }

    pub fn with_config(self, config: &crate::config::OrchestratorConfig) -> Self {
        self.with_retry_policy(RetryPolicy::new(config.max_retries))
    }

    pub async fn process(
        &self,
        request: &PaymentRequest,
        transaction_id: &str,
        target_currency: Option<Currency>,
    ) -> Result<Transaction, OrchestratorError> {
        let lock = self.locks.handle(transaction_id);
        let _guard = lock.lock().await;

        // Read-or-insert under the per-id lock. A terminal record replays
        // as a pure read: no validation, no conversion, no gateway work.
        let mut tx = {
            let mut log = self.transactions.write().await;
            match log.get(transaction_id) {
                Some(existing) if existing.status.is_terminal() => {
                    tracing::debug!("replaying terminal transaction {}", transaction_id);
                    return Ok(existing.clone());
                }
                Some(existing) => existing.clone(),
                None => {
                    let created = Transaction::pending(transaction_id, request.clone());
                    log.insert(transaction_id.to_string(), created.clone());
                    created
                }
            }
        };

        if !self.validator.validate(request) {
            tx.status = TransactionStatus::Failed;
            tx.error_message = Some("Validation failed".to_string());
            self.store(&tx).await;
            tracing::info!("transaction {} rejected by validator", transaction_id);
            return Ok(tx);
        }

        // Conversion rewrites the snapshot only; the caller's request is
        // never touched.
        let mut working = request.clone();
        if let Some(target) = target_currency {
            if target != working.currency {
                let rate = match self.rates.get_rate(working.currency, target).await {
                    Ok(rate) => rate,
                    Err(err) => {
                        tx.status = TransactionStatus::Failed;
                        tx.error_message = Some(err.to_string());
                        self.store(&tx).await;
                        return Err(err);
                    }
                };
                working.amount *= rate;
                working.currency = target;
                tx.request = working.clone();
                self.store(&tx).await;
            }
        }

        let gateway = match self.router.select_optimal(&working).await {
            Ok(gateway) => gateway,
            Err(err) => {
                tx.status = TransactionStatus::Failed;
                tx.error_message = Some(err.to_string());
                self.store(&tx).await;
                return Err(err);
            }
        };

        // Routing facts land before the status leaves Pending, so unlocked
        // readers never see a terminal record without them.
        tx.gateway_used = Some(gateway.name().to_string());
        tx.commission = Some(gateway.commission(working.currency).await);
        self.store(&tx).await;

        let outcome = self
            .retry
            .run(|| {
                let gateway = Arc::clone(&gateway);
                let request = working.clone();
                async move {
                    match gateway.process_payment(&request).await {
                        Ok(true) => Ok(()),
                        Ok(false) => Err(anyhow::Error::new(GatewayDeclined)),
                        Err(err) => Err(err),
                    }
                }
            })
            .await;

        match outcome {
            Ok(()) => {
                tx.status = TransactionStatus::Processed;
                tracing::info!(
                    "transaction {} processed via {}",
                    transaction_id,
                    tx.gateway_used.as_deref().unwrap_or_default()
                );
            }
            Err(err) if err.is::<GatewayDeclined>() => {
                tx.status = TransactionStatus::Failed;
                tracing::info!("transaction {} declined by gateway", transaction_id);
            }
            Err(err) => {
                tx.status = TransactionStatus::Failed;
                tx.error_message = Some(err.to_string());
                tracing::info!("transaction {} failed: {}", transaction_id, err);
            }
        }
        self.store(&tx).await;
        Ok(tx)
    }

    pub async fn refund(
        &self,
        transaction_id: &str,
        amount: Decimal,
    ) -> Result<Transaction, OrchestratorError> {
        let lock = self.locks.handle(transaction_id);
        let _guard = lock.lock().await;

        let mut tx = self
            .get_transaction(transaction_id)
            .await
            .ok_or_else(|| OrchestratorError::CannotRefund(transaction_id.to_string()))?;

        if tx.status != TransactionStatus::Processed {
            return Err(OrchestratorError::CannotRefund(transaction_id.to_string()));
        }

        let gateway_name = tx.gateway_used.clone().unwrap_or_default();
        let gateway = self
            .router
            .get_by_name(&gateway_name)
            .ok_or_else(|| OrchestratorError::GatewayNotFound(gateway_name.clone()))?;

        let refunded = gateway.refund(transaction_id, amount).await?;
        if refunded {
            tx.status = TransactionStatus::Refunded;
            self.store(&tx).await;
            tracing::info!("transaction {} refunded via {}", transaction_id, gateway_name);
        } else {
            tracing::info!("refund of {} declined by {}", transaction_id, gateway_name);
        }
        Ok(tx)
    }

    /// Out-of-band status override from the webhook transport. External
    /// truth is authoritative and may leave a terminal state; the prior
    /// status is kept for audit. Anything unparseable is only logged.
    pub async fn handle_notification(&self, transaction_id: &str, status: &str) {
        let Some(parsed) = TransactionStatus::parse(status) else {
            tracing::warn!(
                "ignoring notification for {}: unknown status {:?}",
                transaction_id,
                status
            );
            return;
        };

        let mut log = self.transactions.write().await;
        match log.get_mut(transaction_id) {
            Some(tx) => {
                let prior = tx.status;
                tx.previous_status = Some(prior);
                tx.status = parsed;
                tracing::info!(
                    "notification moved {} from {:?} to {:?}",
                    transaction_id,
                    prior,
                    parsed
                );
            }
            None => {
                tracing::warn!("ignoring notification for unknown transaction {}", transaction_id);
            }
        }
    }

    pub async fn get_transaction(&self, transaction_id: &str) -> Option<Transaction> {
        self.transactions.read().await.get(transaction_id).cloned()
    }

    /// Reclaims per-id locks of terminal transactions; records are kept.
    /// A lock still held (or awaited) by a concurrent call is left alone.
    /// Returns how many locks were dropped.
    pub async fn cleanup(&self) -> usize {
        let terminal: Vec<String> = {
            let log = self.transactions.read().await;
            log.iter()
                .filter(|(_, tx)| tx.status.is_terminal())
                .map(|(id, _)| id.clone())
                .collect()
        };

        terminal.iter().filter(|id| self.locks.release(id)).count()
    }

    pub fn lock_count(&self) -> usize {
        self.locks.len()
    }

    async fn store(&self, tx: &Transaction) {
        let mut log = self.transactions.write().await;
        log.insert(tx.id.clone(), tx.clone());
    }
}
