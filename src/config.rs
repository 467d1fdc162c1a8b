#[derive(Debug, Clone)]
pub struct OrchestratorConfig {
    pub max_retries: u32,
    pub rate_cache_ttl_secs: u64,
    pub gateway_latency_ms: u64,
}

impl Default for OrchestratorConfig {
    fn default() -> Self {
        Self {
            max_retries: 3,
            rate_cache_ttl_secs: 300,
            gateway_latency_ms: 25,
        }
    }
}

impl OrchestratorConfig {
    pub fn rate_cache_ttl(&self) -> std::time::Duration {
        std::time::Duration::from_secs(self.rate_cache_ttl_secs)
    }

    pub fn gateway_latency(&self) -> std::time::Duration {
        std::time::Duration::from_millis(self.gateway_latency_ms)
    }

    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            max_retries: std::env::var("ORCHESTRATOR_MAX_RETRIES")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(defaults.max_retries),
            rate_cache_ttl_secs: std::env::var("ORCHESTRATOR_RATE_CACHE_TTL_SECS")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(defaults.rate_cache_ttl_secs),
            gateway_latency_ms: std::env::var("ORCHESTRATOR_GATEWAY_LATENCY_MS")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(defaults.gateway_latency_ms),
        }
    }
}
