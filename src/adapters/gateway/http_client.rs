//! reqwest-backed gateway client.
//!
//! Sends JSON to the processor's `/payments` and `/refunds` endpoints with a
//! bearer token and returns status and body untouched. Card data is exposed
//! only while the request body is serialized; logs carry `last4` at most.

use std::sync::Arc;

use async_trait::async_trait;
use reqwest::Client;
use secrecy::ExposeSecret;
use serde::Serialize;

use crate::config::GatewayConfig;
use crate::domain::payment::{GatewayMode, PaymentRequest};
use crate::ports::{GatewayClient, RawResponse, RefundRequest, TransportError};

/// Authorization body as the processor expects it.
#[derive(Serialize)]
struct AuthorizeBody<'a> {
    amount: i64,
    currency: &'a str,
    order_id: u64,
    customer_email: &'a str,
    customer_name: &'a str,
    card_number: &'a str,
    card_expiry: &'a str,
    card_cvc: &'a str,
    return_url: &'a str,
    cancel_url: &'a str,
    webhook_url: &'a str,
}

impl<'a> AuthorizeBody<'a> {
    fn from_request(request: &'a PaymentRequest) -> Self {
        let card = request.card();
        let callbacks = request.callbacks();
        Self {
            amount: request.amount_minor(),
            currency: request.currency(),
            order_id: request.order_id().value(),
            customer_email: request.customer_email(),
            customer_name: request.customer_name(),
            card_number: card.number(),
            card_expiry: card.expiry(),
            card_cvc: card.cvc(),
            return_url: &callbacks.return_url,
            cancel_url: &callbacks.cancel_url,
            webhook_url: &callbacks.webhook_url,
        }
    }
}

#[derive(Serialize)]
struct RefundBody<'a> {
    transaction_id: &'a str,
    amount: i64,
    reason: &'a str,
}

/// Gateway client speaking HTTP to the configured processor.
pub struct HttpGatewayClient {
    config: Arc<GatewayConfig>,
    client: Client,
}

impl HttpGatewayClient {
    /// Creates a client whose every call is bounded by the configured timeout.
    pub fn new(config: Arc<GatewayConfig>) -> Result<Self, TransportError> {
        let client = Client::builder()
            .timeout(config.request_timeout())
            .build()
            .map_err(|e| TransportError::Other(format!("Failed to create HTTP client: {}", e)))?;

        Ok(Self { config, client })
    }

    async fn post_json<B: Serialize + Sync>(
        &self,
        mode: GatewayMode,
        url: String,
        body: &B,
    ) -> Result<RawResponse, TransportError> {
        let secret = self.config.credentials(mode).secret_key.expose_secret();

        let response = self
            .client
            .post(&url)
            .bearer_auth(secret)
            .header("Content-Type", "application/json")
            .json(body)
            .send()
            .await
            .map_err(|e| classify(&url, e))?;

        let status = response.status().as_u16();
        let body = response
            .text()
            .await
            .map_err(|e| classify(&url, e))?;

        if (200..300).contains(&status) {
            tracing::debug!(endpoint = %url, status, "Gateway API response");
        } else {
            tracing::error!(endpoint = %url, status, "Gateway API error response");
        }

        Ok(RawResponse { status, body })
    }
}

fn classify(url: &str, error: reqwest::Error) -> TransportError {
    let transport = if error.is_timeout() {
        TransportError::Timeout
    } else if error.is_connect() {
        TransportError::Connect(error.to_string())
    } else {
        TransportError::Other(error.to_string())
    };
    tracing::error!(endpoint = %url, error = %transport, "Gateway API request failed");
    transport
}

#[async_trait]
impl GatewayClient for HttpGatewayClient {
    async fn authorize(&self, request: &PaymentRequest) -> Result<RawResponse, TransportError> {
        let url = self.config.payments_endpoint(request.mode());

        tracing::debug!(
            endpoint = %url,
            order_id = %request.order_id(),
            amount_minor = request.amount_minor(),
            currency = request.currency(),
            card_last4 = request.card().last4(),
            "Gateway API request"
        );

        self.post_json(request.mode(), url, &AuthorizeBody::from_request(request))
            .await
    }

    async fn refund(&self, request: &RefundRequest) -> Result<RawResponse, TransportError> {
        let url = self.config.refunds_endpoint(request.mode);

        tracing::debug!(
            endpoint = %url,
            order_id = %request.order_id,
            transaction_id = %request.transaction_id,
            amount_minor = request.amount_minor,
            "Gateway API refund request"
        );

        let body = RefundBody {
            transaction_id: &request.transaction_id,
            amount: request.amount_minor,
            reason: &request.reason,
        };
        self.post_json(request.mode, url, &body).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::GatewayCredentials;
    use crate::domain::foundation::OrderId;
    use crate::domain::payment::{
        AmountCodec, BillingContact, CardValidator, Order, OrderStatus, PaymentRequestBuilder,
        RawCardInput,
    };
    use mockito::Matcher;
    use rust_decimal_macros::dec;
    use serde_json::json;

    fn config_for(base_url: &str) -> Arc<GatewayConfig> {
        Arc::new(GatewayConfig {
            sandbox: GatewayCredentials::new("pk_test", "sk_test"),
            live: GatewayCredentials::new("pk_live", "sk_live"),
            sandbox_base_url: base_url.to_string(),
            webhook_url: "https://shop.example/webhooks/gateway".to_string(),
            request_timeout_secs: 1,
            ..Default::default()
        })
    }

    fn payment_request() -> PaymentRequest {
        let order = Order {
            id: OrderId::new(77).unwrap(),
            total: dec!(12.50),
            currency: "EUR".to_string(),
            billing: BillingContact {
                first_name: "Grace".to_string(),
                last_name: "Hopper".to_string(),
                email: "grace@example.com".to_string(),
                country: "US".to_string(),
            },
            status: OrderStatus::Pending,
            transaction_id: None,
            total_refunded: dec!(0),
            return_url: "https://shop.example/return/77".to_string(),
            cancel_url: "https://shop.example/cancel/77".to_string(),
        };
        let today = chrono::NaiveDate::from_ymd_opt(2026, 1, 1).unwrap();
        let card = CardValidator::validate_at(
            &RawCardInput::new("4242 4242 4242 4242", "08/29", "314"),
            today,
        )
        .unwrap();
        PaymentRequestBuilder::new(AmountCodec::default(), "https://shop.example/webhooks/gateway")
            .build(&order, card, GatewayMode::Sandbox)
            .unwrap()
    }

    // ══════════════════════════════════════════════════════════════
    // Authorize
    // ══════════════════════════════════════════════════════════════

    #[tokio::test]
    async fn authorize_posts_json_with_bearer_secret() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("POST", "/payments")
            .match_header("authorization", "Bearer sk_test")
            .match_header("content-type", "application/json")
            .match_body(Matcher::Json(json!({
                "amount": 1250,
                "currency": "EUR",
                "order_id": 77,
                "customer_email": "grace@example.com",
                "customer_name": "Grace Hopper",
                "card_number": "4242424242424242",
                "card_expiry": "08/29",
                "card_cvc": "314",
                "return_url": "https://shop.example/return/77",
                "cancel_url": "https://shop.example/cancel/77",
                "webhook_url": "https://shop.example/webhooks/gateway"
            })))
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(r#"{"success":true,"transaction_id":"tx_1"}"#)
            .expect(1)
            .create_async()
            .await;

        let client = HttpGatewayClient::new(config_for(&server.url())).unwrap();
        let response = client.authorize(&payment_request()).await.unwrap();

        mock.assert_async().await;
        assert_eq!(response.status, 200);
        assert_eq!(response.body, r#"{"success":true,"transaction_id":"tx_1"}"#);
    }

    #[tokio::test]
    async fn authorize_passes_error_status_through() {
        let mut server = mockito::Server::new_async().await;
        let _mock = server
            .mock("POST", "/payments")
            .with_status(502)
            .with_body("bad gateway")
            .create_async()
            .await;

        let client = HttpGatewayClient::new(config_for(&server.url())).unwrap();
        let response = client.authorize(&payment_request()).await.unwrap();

        assert_eq!(response, RawResponse::new(502, "bad gateway"));
    }

    #[tokio::test]
    async fn authorize_times_out_when_processor_hangs() {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let hold = tokio::spawn(async move {
            let (_socket, _) = listener.accept().await.unwrap();
            tokio::time::sleep(std::time::Duration::from_secs(5)).await;
        });

        let client = HttpGatewayClient::new(config_for(&format!("http://{}", addr))).unwrap();
        let result = client.authorize(&payment_request()).await;

        assert_eq!(result, Err(TransportError::Timeout));
        hold.abort();
    }

    #[tokio::test]
    async fn authorize_reports_connect_failure() {
        let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
        let addr = listener.local_addr().unwrap();
        drop(listener);

        let client = HttpGatewayClient::new(config_for(&format!("http://{}", addr))).unwrap();
        let result = client.authorize(&payment_request()).await;

        assert!(matches!(result, Err(TransportError::Connect(_))));
    }

    // ══════════════════════════════════════════════════════════════
    // Refund
    // ══════════════════════════════════════════════════════════════

    #[tokio::test]
    async fn refund_posts_to_refunds_endpoint() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("POST", "/refunds")
            .match_header("authorization", "Bearer sk_test")
            .match_body(Matcher::Json(json!({
                "transaction_id": "tx_9",
                "amount": 500,
                "reason": "damaged"
            })))
            .with_status(200)
            .with_body(r#"{"refund_id":"rf_1"}"#)
            .expect(1)
            .create_async()
            .await;

        let client = HttpGatewayClient::new(config_for(&server.url())).unwrap();
        let response = client
            .refund(&RefundRequest {
                mode: GatewayMode::Sandbox,
                order_id: OrderId::new(77).unwrap(),
                transaction_id: "tx_9".to_string(),
                amount_minor: 500,
                reason: "damaged".to_string(),
            })
            .await
            .unwrap();

        mock.assert_async().await;
        assert_eq!(response.status, 200);
    }
}
