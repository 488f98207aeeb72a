//! Card gateway facade.
//!
//! `PaymentGateway` is the capability set a commerce platform needs from a
//! payment method. `CardGateway` implements it by composing the payment
//! handlers around one explicit configuration value.

use std::sync::Arc;

use async_trait::async_trait;

use crate::config::GatewayConfig;
use crate::domain::payment::{
    CardFieldError, CardValidator, PaymentError, RawCardInput, RefundOutcome, ValidatedCard,
    WebhookError, WebhookVerifier,
};
use crate::ports::{GatewayClient, OrderStore};

use super::handlers::payment::{
    AuthorizePaymentCommand, AuthorizePaymentHandler, AuthorizePaymentResult,
    HandleGatewayWebhookCommand, HandleGatewayWebhookHandler, HandleGatewayWebhookResult,
    RefundPaymentCommand, RefundPaymentHandler,
};

/// Payment method capabilities exposed to the platform.
#[async_trait]
pub trait PaymentGateway: Send + Sync {
    /// Checks card fields at checkout, reporting every problem.
    fn validate(&self, card: &RawCardInput) -> Result<ValidatedCard, Vec<CardFieldError>>;

    /// Charges the card for a pending order.
    async fn authorize(
        &self,
        cmd: AuthorizePaymentCommand,
    ) -> Result<AuthorizePaymentResult, PaymentError>;

    /// Refunds all or part of a paid order.
    async fn refund(&self, cmd: RefundPaymentCommand) -> Result<RefundOutcome, PaymentError>;

    /// Verifies and applies a processor webhook.
    async fn handle_webhook(
        &self,
        cmd: HandleGatewayWebhookCommand,
    ) -> Result<HandleGatewayWebhookResult, WebhookError>;
}

/// Card payment method backed by the remote processor.
pub struct CardGateway {
    config: Arc<GatewayConfig>,
    authorize_handler: AuthorizePaymentHandler,
    refund_handler: RefundPaymentHandler,
    webhook_handler: HandleGatewayWebhookHandler,
}

impl CardGateway {
    pub fn new(
        config: Arc<GatewayConfig>,
        orders: Arc<dyn OrderStore>,
        client: Arc<dyn GatewayClient>,
    ) -> Self {
        let verifier = WebhookVerifier::new(config.active_secret().clone());

        Self {
            authorize_handler: AuthorizePaymentHandler::new(
                &config,
                orders.clone(),
                client.clone(),
            ),
            refund_handler: RefundPaymentHandler::new(&config, orders.clone(), client),
            webhook_handler: HandleGatewayWebhookHandler::new(orders, verifier),
            config,
        }
    }

    pub fn config(&self) -> &GatewayConfig {
        &self.config
    }

    /// Offered at checkout only when credentials for the active mode are set
    /// and the order currency is supported.
    pub fn is_available(&self, currency: &str) -> bool {
        self.config.is_configured() && self.config.supports_currency(currency)
    }
}

#[async_trait]
impl PaymentGateway for CardGateway {
    fn validate(&self, card: &RawCardInput) -> Result<ValidatedCard, Vec<CardFieldError>> {
        CardValidator::validate(card)
    }

    async fn authorize(
        &self,
        cmd: AuthorizePaymentCommand,
    ) -> Result<AuthorizePaymentResult, PaymentError> {
        self.authorize_handler.handle(cmd).await
    }

    async fn refund(&self, cmd: RefundPaymentCommand) -> Result<RefundOutcome, PaymentError> {
        self.refund_handler.handle(cmd).await
    }

    async fn handle_webhook(
        &self,
        cmd: HandleGatewayWebhookCommand,
    ) -> Result<HandleGatewayWebhookResult, WebhookError> {
        self.webhook_handler.handle(cmd).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::gateway::MockGatewayClient;
    use crate::adapters::memory::InMemoryOrderStore;
    use crate::config::GatewayCredentials;
    use crate::domain::payment::GatewayMode;

    fn gateway(config: GatewayConfig) -> CardGateway {
        CardGateway::new(
            Arc::new(config),
            Arc::new(InMemoryOrderStore::new()),
            Arc::new(MockGatewayClient::new()),
        )
    }

    #[test]
    fn payment_gateway_is_object_safe() {
        fn _accepts_dyn(_gateway: &dyn PaymentGateway) {}
    }

    #[test]
    fn available_only_when_configured_for_active_mode() {
        let unconfigured = gateway(GatewayConfig::default());
        assert!(!unconfigured.is_available("USD"));

        let configured = gateway(GatewayConfig {
            sandbox: GatewayCredentials::new("pk", "sk"),
            ..Default::default()
        });
        assert!(configured.is_available("USD"));
        assert!(!configured.is_available("CHF"));

        let live = gateway(GatewayConfig {
            mode: GatewayMode::Live,
            sandbox: GatewayCredentials::new("pk", "sk"),
            ..Default::default()
        });
        assert!(!live.is_available("USD"));
    }

    #[test]
    fn validate_reports_missing_fields() {
        let gateway = gateway(GatewayConfig::default());

        let errors = gateway.validate(&RawCardInput::default()).unwrap_err();

        assert_eq!(errors.len(), 3);
        assert!(errors.iter().all(|e| matches!(e, CardFieldError::Missing(_))));
    }
}
