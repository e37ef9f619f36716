//! # Storefront
//!
//! Cart and checkout server for storefront embeds.
//!
//! ## Usage
//!
//! ```bash
//! # Either point at a shop registry...
//! export SHOPS_CONFIG=config/shops.toml
//!
//! # ...or serve a single shop
//! export SHOP_DOMAIN=acme.example.com
//! export SHOP_ID=...
//!
//! # Run the server
//! storefront
//! ```

use shop_api::{routes, state::AppState};
use tracing::{info, Level};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize logging
    tracing_subscriber::registry()
        .with(fmt::layer())
        .with(
            EnvFilter::builder()
                .with_default_directive(Level::INFO.into())
                .from_env_lossy(),
        )
        .init();

    let state = AppState::new()?;

    let addr = state.config.socket_addr()?;
    let is_prod = state.config.is_production();

    info!("Storefront v{}", env!("CARGO_PKG_VERSION"));
    info!("Environment: {}", state.config.environment);
    info!(
        "Shops: {:?}",
        state
            .shops
            .active_shops()
            .map(|s| s.domain.as_str())
            .collect::<Vec<_>>()
    );

    info!(
        "Idle carts are closed after {}s",
        state.config.cart_idle_timeout.as_secs()
    );
    state.spawn_cart_eviction();

    let app = routes::create_router(state);

    info!("Storefront starting on http://{}", addr);

    if !is_prod {
        info!("Health: http://{}/health", addr);
        info!("Open cart: POST http://{}/api/v1/{{shop}}/carts", addr);
    }

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
