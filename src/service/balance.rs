use crate::domain::money::Currency;
use rust_decimal::Decimal;
use std::collections::HashMap;
use std::sync::RwLock;

pub trait BalanceService: Send + Sync {
    fn has_sufficient_balance(&self, account: &str, amount: Decimal, currency: Currency) -> bool;
}

/// Per-account, per-currency balances for embedding hosts and tests.
/// Unknown accounts have no balance.
#[derive(Default)]
pub struct InMemoryBalances {
    balances: RwLock<HashMap<(String, Currency), Decimal>>,
}

impl InMemoryBalances {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_balance(self, account: &str, currency: Currency, amount: Decimal) -> Self {
        self.credit(account, currency, amount);
        self
    }

    pub fn credit(&self, account: &str, currency: Currency, amount: Decimal) {
        let mut balances = self.balances.write().unwrap_or_else(|e| e.into_inner());
        *balances.entry((account.to_string(), currency)).or_insert(Decimal::ZERO) += amount;
    }
}

impl BalanceService for InMemoryBalances {
    fn has_sufficient_balance(&self, account: &str, amount: Decimal, currency: Currency) -> bool {
        let balances = self.balances.read().unwrap_or_else(|e| e.into_inner());
        balances
            .get(&(account.to_string(), currency))
            .map(|balance| *balance >= amount)
            .unwrap_or(false)
    }
}
