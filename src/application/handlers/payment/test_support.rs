//! Fixtures shared by the payment handler tests.

use std::sync::Arc;

use rust_decimal_macros::dec;

use crate::adapters::gateway::MockGatewayClient;
use crate::adapters::memory::InMemoryOrderStore;
use crate::config::{GatewayConfig, GatewayCredentials};
use crate::domain::foundation::OrderId;
use crate::domain::payment::{BillingContact, Order, OrderStatus, RawCardInput};

pub(crate) const SECRET: &str = "sk_sandbox_test";

pub(crate) fn config() -> Arc<GatewayConfig> {
    Arc::new(GatewayConfig {
        sandbox: GatewayCredentials::new("pk_sandbox_test", SECRET),
        webhook_url: "https://shop.example/webhooks/gateway".to_string(),
        ..Default::default()
    })
}

pub(crate) fn order_id() -> OrderId {
    OrderId::new(1).unwrap()
}

pub(crate) fn pending_order() -> Order {
    Order {
        id: order_id(),
        total: dec!(49.90),
        currency: "USD".to_string(),
        billing: BillingContact {
            first_name: "Ada".to_string(),
            last_name: "Lovelace".to_string(),
            email: "ada@example.com".to_string(),
            country: "GB".to_string(),
        },
        status: OrderStatus::Pending,
        transaction_id: None,
        total_refunded: dec!(0),
        return_url: "https://shop.example/checkout/order-received/1".to_string(),
        cancel_url: "https://shop.example/cart".to_string(),
    }
}

pub(crate) fn valid_card() -> RawCardInput {
    RawCardInput::new("4111 1111 1111 1111", "12/40", "123")
}

pub(crate) async fn store_with(order: Order) -> Arc<InMemoryOrderStore> {
    let store = Arc::new(InMemoryOrderStore::new());
    store.insert(order).await;
    store
}

pub(crate) fn mock_client() -> Arc<MockGatewayClient> {
    Arc::new(MockGatewayClient::new())
}
