//! # shop-client
//!
//! REST client for the storefront backends.
//!
//! One [`ShopClient`] serves a single shop and talks to three APIs:
//!
//! 1. **Stores** - public documents and the product catalog, scoped by
//!    shop domain (and storefront password, if the shop is protected)
//! 2. **Orders** - order creation and lookup, coupon validation, gateway
//!    details and balance top-ups
//! 3. **Customers** - the signed-in customer's dashboard, authenticated
//!    with a bearer token
//!
//! `ShopClient` implements [`shop_core::ShopBackend`], so it can drive a
//! [`shop_core::CheckoutSession`] directly.
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use shop_client::ShopClient;
//! use shop_core::CheckoutSession;
//! use std::sync::Arc;
//!
//! // Create client from environment
//! let client = ShopClient::from_env()?;
//!
//! // Open a checkout session over it
//! let mut session = CheckoutSession::open(Arc::new(client), "buyer@example.com").await?;
//! ```
//!
//! ## Customer Session
//!
//! ```rust,ignore
//! client.set_customer_token(token);
//! let balance = client.fetch_balance().await?;
//! let orders = client.fetch_orders(1).await?;
//!
//! // A 401 from any endpoint drops the token
//! assert!(client.is_authenticated());
//! ```

pub mod backend;
pub mod client;
pub mod config;
pub mod customer;
pub mod orders;
pub mod store;

// Re-exports
pub use client::{Backend, ShopClient, SYSTEM_EXCEPTION_ERROR};
pub use config::ClientConfig;
pub use customer::PAGINATION_TOTAL_HEADER;

#[cfg(test)]
pub(crate) mod testing {
    use crate::{ClientConfig, ShopClient};
    use shop_core::ShopContext;
    use wiremock::MockServer;

    pub fn config_for(server: &MockServer) -> ClientConfig {
        ClientConfig::for_shop(ShopContext::new("acme.example.com", "shop-1"))
            .with_base_url(server.uri())
    }

    pub fn client_for(server: &MockServer) -> ShopClient {
        ShopClient::new(config_for(server)).unwrap()
    }
}
