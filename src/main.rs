//! Payment gateway HTTP service.
//!
//! Serves the checkout payment, refund and webhook endpoints for one merchant
//! configuration loaded from the environment.
//!
//! Orders live in an in-memory store. Set `PAYMENT_GATEWAY__SERVER__ORDERS_FILE`
//! to a JSON array of orders (see `fixtures/orders.json`) to seed it at startup;
//! without it the store starts empty and every order lookup is a 404.

use std::sync::Arc;
use std::time::Duration;

use tower_http::timeout::TimeoutLayer;
use tower_http::trace::TraceLayer;
use tracing_subscriber::EnvFilter;

use payment_gateway::adapters::gateway::HttpGatewayClient;
use payment_gateway::adapters::http::payment::{payment_router, PaymentAppState};
use payment_gateway::adapters::memory::InMemoryOrderStore;
use payment_gateway::application::CardGateway;
use payment_gateway::config::AppConfig;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let config = AppConfig::load()?;
    init_tracing(&config);

    if let Err(e) = config.validate() {
        for problem in config.gateway.settings_errors() {
            tracing::error!(problem = %problem, "Gateway configuration error");
        }
        return Err(e.into());
    }

    let gateway_config = Arc::new(config.gateway.clone());
    if gateway_config.mode().is_sandbox() {
        tracing::warn!("Running in sandbox mode. No real payments will be processed.");
    }

    tracing::warn!("Using in-memory order store");
    let orders = Arc::new(InMemoryOrderStore::new());
    match &config.server.orders_file {
        Some(path) => {
            let json = tokio::fs::read_to_string(path).await?;
            let loaded = orders.load_json(&json).await?;
            tracing::info!(path = %path.display(), orders = loaded, "Seeded order store");
        }
        None => tracing::warn!("No orders file configured, order store is empty"),
    }
    let client = Arc::new(HttpGatewayClient::new(gateway_config.clone())?);
    let gateway = Arc::new(CardGateway::new(gateway_config.clone(), orders, client));

    if !config.server.has_admin_token() {
        tracing::warn!("No admin token configured, refund endpoint will reject every request");
    }
    let state = PaymentAppState::new(gateway, gateway_config.signature_header.clone())
        .with_admin_token(config.server.admin_token.clone());
    let app = payment_router()
        .with_state(state)
        .layer(TimeoutLayer::new(Duration::from_secs(
            config.server.request_timeout_secs,
        )))
        .layer(TraceLayer::new_for_http());

    let addr = config.server.socket_addr()?;
    let listener = tokio::net::TcpListener::bind(addr).await?;
    tracing::info!(
        address = %addr,
        mode = %gateway_config.mode(),
        webhook_url = %gateway_config.webhook_url,
        "Payment gateway listening"
    );

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    Ok(())
}

fn init_tracing(config: &AppConfig) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(&config.server.log_level));

    if config.is_production() {
        tracing_subscriber::fmt()
            .json()
            .with_env_filter(filter)
            .init();
    } else {
        tracing_subscriber::fmt().with_env_filter(filter).init();
    }
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "Failed to listen for shutdown signal");
    }
    tracing::info!("Shutting down");
}
