use crate::domain::money::Currency;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum OrchestratorError {
    #[error("no gateway available for currency {0}")]
    NoGatewayAvailable(Currency),

    #[error("transaction {0} cannot be refunded")]
    CannotRefund(String),

    #[error("gateway {0} is not registered")]
    GatewayNotFound(String),

    #[error("no exchange rate for {from} -> {to}")]
    UnsupportedConversion { from: Currency, to: Currency },

    #[error(transparent)]
    Gateway(#[from] anyhow::Error),
}
