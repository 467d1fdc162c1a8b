use crate::domain::money::Currency;
use crate::domain::payment::PaymentRequest;
use crate::gateways::PaymentGateway;
use anyhow::{bail, Result};
use rust_decimal::Decimal;
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

#[derive(Debug, Clone)]
pub enum MockBehavior {
    AlwaysSucceed,
    AlwaysDecline,
    AlwaysError,
    /// Errors for the first n attempts, then succeeds.
    ErrorsThenSucceed(usize),
}

/// Scriptable legacy gateway. Counts invocations so tests can assert
/// exactly how much work the processor issued.
pub struct MockGateway {
    pub gateway_name: String,
    commissions: HashMap<Currency, Decimal>,
    behavior: MockBehavior,
    available: AtomicBool,
    refund_outcome: bool,
    payment_calls: AtomicUsize,
    refund_calls: AtomicUsize,
}

impl MockGateway {
    pub fn new(name: &str) -> Self {
        Self {
            gateway_name: name.to_string(),
            commissions: HashMap::new(),
            behavior: MockBehavior::AlwaysSucceed,
            available: AtomicBool::new(true),
            refund_outcome: true,
            payment_calls: AtomicUsize::new(0),
            refund_calls: AtomicUsize::new(0),
        }
    }

    pub fn with_commission(mut self, currency: Currency, rate: Decimal) -> Self {
        self.commissions.insert(currency, rate);
        self
    }

    pub fn with_behavior(mut self, behavior: MockBehavior) -> Self {
        self.behavior = behavior;
        self
    }

    pub fn with_refund_outcome(mut self, outcome: bool) -> Self {
        self.refund_outcome = outcome;
        self
    }

    pub fn set_available(&self, available: bool) {
        self.available.store(available, Ordering::SeqCst);
    }

    pub fn payment_calls(&self) -> usize {
        self.payment_calls.load(Ordering::SeqCst)
    }

    pub fn refund_calls(&self) -> usize {
        self.refund_calls.load(Ordering::SeqCst)
    }
}

#[async_trait::async_trait]
impl PaymentGateway for MockGateway {
    fn name(&self) -> &str {
        &self.gateway_name
    }

    async fn commission(&self, currency: Currency) -> Decimal {
        self.commissions.get(&currency).copied().unwrap_or(Decimal::ZERO)
    }

    async fn is_available(&self) -> bool {
        self.available.load(Ordering::SeqCst)
    }

    fn supports_currency(&self, currency: Currency) -> bool {
        self.commissions.contains_key(&currency)
    }

    async fn process_payment(&self, _request: &PaymentRequest) -> Result<bool> {
        let attempt = self.payment_calls.fetch_add(1, Ordering::SeqCst);
        match &self.behavior {
            MockBehavior::AlwaysSucceed => Ok(true),
            MockBehavior::AlwaysDecline => Ok(false),
            MockBehavior::AlwaysError => bail!("mock gateway unreachable"),
            MockBehavior::ErrorsThenSucceed(failures) => {
                if attempt < *failures {
                    bail!("mock gateway transient error on attempt {}", attempt + 1);
                }
                Ok(true)
            }
        }
    }

    async fn refund(&self, _transaction_id: &str, _amount: Decimal) -> Result<bool> {
        self.refund_calls.fetch_add(1, Ordering::SeqCst);
        Ok(self.refund_outcome)
    }
}
