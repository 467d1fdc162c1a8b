use crate::domain::money::Currency;
use crate::domain::payment::PaymentRequest;
use crate::service::balance::BalanceService;
use once_cell::sync::Lazy;
use regex::Regex;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use std::sync::Arc;

static USD_ACCOUNT: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[0-9]{10}$").expect("valid pattern"));
static EUR_ACCOUNT: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[A-Z]{2}[0-9]{2}[A-Z0-9]{11,32}$").expect("valid pattern"));
static RUB_ACCOUNT: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[0-9]{20}$").expect("valid pattern"));

pub trait Validator: Send + Sync {
    fn validate(&self, request: &PaymentRequest) -> bool;
}

fn account_pattern(currency: Currency) -> &'static Regex {
    match currency {
        Currency::Usd => &USD_ACCOUNT,
        Currency::Eur => &EUR_ACCOUNT,
        Currency::Rub => &RUB_ACCOUNT,
    }
}

fn max_amount(currency: Currency) -> Decimal {
    match currency {
        Currency::Usd => dec!(10_000),
        Currency::Eur => dec!(8_000),
        Currency::Rub => dec!(500_000),
    }
}

/// Default validator: per-currency account format, positive amount within
/// the per-currency maximum, and sufficient source balance.
pub struct AccountValidator {
    balances: Arc<dyn BalanceService>,
}

impl AccountValidator {
    pub fn new(balances: Arc<dyn BalanceService>) -> Self {
        Self { balances }
    }
}

impl Validator for AccountValidator {
    fn validate(&self, request: &PaymentRequest) -> bool {
        if request.amount <= Decimal::ZERO || request.amount > max_amount(request.currency) {
            return false;
        }

        let pattern = account_pattern(request.currency);
        if !pattern.is_match(&request.source_account)
            || !pattern.is_match(&request.destination_account)
        {
            return false;
        }

        self.balances
            .has_sufficient_balance(&request.source_account, request.amount, request.currency)
    }
}
