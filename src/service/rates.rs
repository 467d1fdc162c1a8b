use crate::domain::money::Currency;
use crate::error::OrchestratorError;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use std::collections::HashMap;
use std::time::{Duration, Instant};
use tokio::sync::RwLock;

const DEFAULT_CACHE_TTL: Duration = Duration::from_secs(300);

#[async_trait::async_trait]
pub trait RateService: Send + Sync {
    async fn get_rate(&self, from: Currency, to: Currency) -> Result<Decimal, OrchestratorError>;
}

/// Static rate table with a TTL cache in front of it. Identity conversions
/// answer 1 without touching the table; unknown pairs fail.
pub struct CachedRateService {
    table: HashMap<(Currency, Currency), Decimal>,
    cache: RwLock<HashMap<(Currency, Currency), (Instant, Decimal)>>,
    ttl: Duration,
}

impl Default for CachedRateService {
    fn default() -> Self {
        Self::new()
    }
}

impl CachedRateService {
    pub fn new() -> Self {
        Self {
            table: Self::default_table(),
            cache: RwLock::new(HashMap::new()),
            ttl: DEFAULT_CACHE_TTL,
        }
    }

    pub fn from_config(config: &crate::config::OrchestratorConfig) -> Self {
        Self::new().with_ttl(config.rate_cache_ttl())
    }

    pub fn with_ttl(mut self, ttl: Duration) -> Self {
        self.ttl = ttl;
        self
    }

    pub fn with_rate(mut self, from: Currency, to: Currency, rate: Decimal) -> Self {
        self.table.insert((from, to), rate);
        self
    }

    fn default_table() -> HashMap<(Currency, Currency), Decimal> {
        HashMap::from([
            ((Currency::Usd, Currency::Eur), dec!(0.85)),
            ((Currency::Usd, Currency::Rub), dec!(90)),
            ((Currency::Eur, Currency::Usd), dec!(1.18)),
            ((Currency::Eur, Currency::Rub), dec!(100)),
            ((Currency::Rub, Currency::Usd), dec!(0.011)),
            ((Currency::Rub, Currency::Eur), dec!(0.01)),
        ])
    }
}

#[async_trait::async_trait]
impl RateService for CachedRateService {
    async fn get_rate(&self, from: Currency, to: Currency) -> Result<Decimal, OrchestratorError> {
        if from == to {
            return Ok(Decimal::ONE);
        }

        {
            let cache = self.cache.read().await;
            if let Some((fetched_at, rate)) = cache.get(&(from, to)) {
                if fetched_at.elapsed() <= self.ttl {
                    return Ok(*rate);
                }
            }
        }

        let rate = self
            .table
            .get(&(from, to))
            .copied()
            .ok_or(OrchestratorError::UnsupportedConversion { from, to })?;

        let mut cache = self.cache.write().await;
        cache.insert((from, to), (Instant::now(), rate));
        Ok(rate)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn identity_conversion_is_one() {
        let rates = CachedRateService::new();
        let rate = rates.get_rate(Currency::Usd, Currency::Usd).await.unwrap();
        assert_eq!(rate, Decimal::ONE);
    }

    #[tokio::test]
    async fn default_table_matches_published_rates() {
        let rates = CachedRateService::new();
        assert_eq!(rates.get_rate(Currency::Usd, Currency::Eur).await.unwrap(), dec!(0.85));
        assert_eq!(rates.get_rate(Currency::Eur, Currency::Rub).await.unwrap(), dec!(100));
        assert_eq!(rates.get_rate(Currency::Rub, Currency::Usd).await.unwrap(), dec!(0.011));
    }

    #[tokio::test]
    async fn repeated_lookups_hit_the_cache() {
        let rates = CachedRateService::new();
        let first = rates.get_rate(Currency::Usd, Currency::Rub).await.unwrap();
        let second = rates.get_rate(Currency::Usd, Currency::Rub).await.unwrap();
        assert_eq!(first, second);
        assert_eq!(rates.cache.read().await.len(), 1);
    }

    #[test]
    fn from_config_applies_the_cache_ttl() {
        let cfg = crate::config::OrchestratorConfig {
            rate_cache_ttl_secs: 60,
            ..Default::default()
        };
        let rates = CachedRateService::from_config(&cfg);
        assert_eq!(rates.ttl, Duration::from_secs(60));
    }

    #[tokio::test]
    async fn unknown_pairs_fail() {
        let rates = CachedRateService {
            table: HashMap::new(),
            cache: RwLock::new(HashMap::new()),
            ttl: DEFAULT_CACHE_TTL,
        };
        let err = rates.get_rate(Currency::Usd, Currency::Eur).await.unwrap_err();
        assert!(matches!(
            err,
            OrchestratorError::UnsupportedConversion { from: Currency::Usd, to: Currency::Eur }
        ));
    }
}
