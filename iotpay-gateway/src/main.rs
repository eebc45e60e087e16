//! Entry point for the `iotpay-gateway` HTTP server.

use iotpay_core::{default_fleet, DeviceRegistry};
use iotpay_executor::DeviceHub;
use iotpay_gate::PaymentGate;
use iotpay_gateway::{
    config::GatewayConfig,
    routes::{create_router, AppState},
    DEFAULT_LOG_FILTER,
};
use rand::rngs::StdRng;
use rand::SeedableRng;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new(DEFAULT_LOG_FILTER)),
        )
        .init();

    let config = match GatewayConfig::from_env() {
        Ok(c) => c,
        Err(e) => {
            error!(error = %e, "invalid configuration");
            std::process::exit(1);
        }
    };

    let registry = match DeviceRegistry::new(default_fleet()) {
        Ok(r) => r,
        Err(e) => {
            error!(error = %e, "invalid device fleet");
            std::process::exit(1);
        }
    };

    let hub = DeviceHub::spawn(registry, Some(config.clock), StdRng::from_entropy());
    let gate = PaymentGate::new(config.chain.clone());
    let addr = config.listen_addr;
    info!(
        recipient = %config.chain.recipient,
        chain_id = config.chain.chain_id,
        "payment gate configured"
    );
    let app = create_router(AppState::new(hub, gate, config));

    let listener = match tokio::net::TcpListener::bind(addr).await {
        Ok(l) => l,
        Err(e) => {
            error!(addr = %addr, error = %e, "failed to bind");
            std::process::exit(1);
        }
    };

    info!(addr = %addr, "iotpay-gateway listening");

    if let Err(e) = axum::serve(listener, app).await {
        error!(error = %e, "server error");
        std::process::exit(1);
    }
}
