//! # PAYx402 Paywall
//!
//! Sells PAYX tokens for USDC over x402.
//!
//! ## Usage
//!
//! ```bash
//! # Set environment variables
//! export ADDRESS=0x...
//! export NETWORK=base-sepolia
//! export FACILITATOR_URL=https://x402.org/facilitator
//!
//! # Run the server
//! payx-paywall
//! ```

use payx_api::{
    routes,
    state::{load_manifest, load_tier_catalog, AppConfig, AppState},
};
use payx_core::{BoxedPaymentVerifier, PaywallError};
use payx_facilitator::FacilitatorClient;
use std::sync::Arc;
use tracing::{error, info, warn, Level};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize logging
    let filter = EnvFilter::builder()
        .with_default_directive(Level::INFO.into())
        .from_env_lossy();
    if std::env::var("LOG_FORMAT").as_deref() == Ok("json") {
        tracing_subscriber::registry()
            .with(fmt::layer().json())
            .with(filter)
            .init();
    } else {
        tracing_subscriber::registry()
            .with(fmt::layer())
            .with(filter)
            .init();
    }

    // Print banner
    print_banner();

    let config = AppConfig::from_env()?;
    let catalog = load_tier_catalog()?;
    let manifest = load_manifest(&config.base_url)?;
    let facilitator = FacilitatorClient::new(config.facilitator.clone())?;

    match facilitator.ensure_supported(config.network).await {
        Ok(()) => info!("Facilitator supports exact payments on {}", config.network),
        Err(e @ PaywallError::UnsupportedNetwork { .. }) => {
            error!("{}", e);
            anyhow::bail!(
                "NETWORK={} cannot be settled by {}; pick a network it supports or point FACILITATOR_URL elsewhere",
                config.network,
                config.facilitator.url
            );
        }
        Err(e) => warn!("Could not reach facilitator: {}", e),
    }

    let addr = config.socket_addr()?;
    let is_prod = config.is_production();

    info!("Environment: {}", config.environment);
    info!("Network: {}", config.network);
    info!("Pay to: {}", config.pay_to);
    info!("Facilitator: {}", config.facilitator.url);
    info!(
        "BASE_RPC_URL: {}",
        if config.base_rpc_url.is_some() { "set" } else { "not set" }
    );
    info!("Tiers loaded: {}", catalog.active_tiers().count());

    let verifier: BoxedPaymentVerifier = Arc::new(facilitator);
    let state = AppState::new(config, catalog, manifest, verifier);

    if !is_prod {
        for tier in state.catalog.active_tiers() {
            info!(
                "💳 {} → {}: GET http://{}{}",
                tier.amount_label(),
                tier.tokens_label(),
                addr,
                tier.route()
            );
        }
    }

    // Create router
    let app = routes::create_router(state);

    // Start server
    info!("🚀 PAYx402 paywall starting on http://{}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        warn!("Failed to listen for shutdown signal: {}", e);
        std::future::pending::<()>().await;
    }
    info!("Shutting down");
}

fn print_banner() {
    println!(
        r#"
  💵 PAYx402 💵
  ━━━━━━━━━━━━━━━━━━━━━━━
  PAYX tokens for USDC over x402
  Version: {}

"#,
        env!("CARGO_PKG_VERSION")
    );
}
