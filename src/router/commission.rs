use crate::domain::payment::PaymentRequest;
use crate::error::OrchestratorError;
use crate::gateways::PaymentGateway;
use rust_decimal::Decimal;
use std::sync::Arc;

/// Selects the cheapest available gateway for a request. Candidates must
/// support the request currency and answer a fresh availability probe within
/// the selection call; ties keep registration order.
pub struct CommissionRouter {
    gateways: Vec<Arc<dyn PaymentGateway>>,
}

impl Default for CommissionRouter {
    fn default() -> Self {
        Self::new()
    }
}

impl CommissionRouter {
    pub fn new() -> Self {
        Self { gateways: Vec::new() }
    }

    pub fn with_gateways(gateways: Vec<Arc<dyn PaymentGateway>>) -> Self {
        Self { gateways }
    }

    pub fn register(&mut self, gateway: Arc<dyn PaymentGateway>) {
        self.gateways.push(gateway);
    }

    pub async fn select_optimal(
        &self,
        request: &PaymentRequest,
    ) -> Result<Arc<dyn PaymentGateway>, OrchestratorError> {
        let mut best: Option<(Decimal, Arc<dyn PaymentGateway>)> = None;

        for gateway in &self.gateways {
            if !gateway.supports_currency(request.currency) {
                continue;
            }
            if !gateway.is_available().await {
                continue;
            }

            let fee = gateway.commission(request.currency).await;
            // Strictly-less keeps the earliest registration on equal fees.
            let better = match &best {
                None => true,
                Some((current, _)) => fee < *current,
            };
            if better {
                best = Some((fee, Arc::clone(gateway)));
            }
        }

        best.map(|(_, gateway)| gateway)
            .ok_or(OrchestratorError::NoGatewayAvailable(request.currency))
    }

    pub fn get_by_name(&self, name: &str) -> Option<Arc<dyn PaymentGateway>> {
        self.gateways.iter().find(|g| g.name() == name).cloned()
    }
}
