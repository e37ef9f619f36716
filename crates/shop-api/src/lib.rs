//! # shop-api
//!
//! HTTP API layer for storefront-rs.
//!
//! This crate provides:
//! - Axum-based HTTP server hosting cart sessions
//! - REST endpoints for the cart, gateway, coupon and checkout operations
//! - A shop registry loaded from TOML
//!
//! ## Endpoints
//!
//! | Method | Path | Description |
//! |--------|------|-------------|
//! | GET | `/health` | Health check |
//! | GET | `/api/v1/shops` | List shops |
//! | POST | `/api/v1/{shop}/carts` | Open cart |
//! | GET | `/api/v1/carts/{id}` | Cart with gateways and totals |
//! | DELETE | `/api/v1/carts/{id}` | Close cart |
//! | POST/PATCH | `/api/v1/carts/{id}/items` | Add item / change quantity |
//! | PUT | `/api/v1/carts/{id}/gateway` | Choose gateway |
//! | POST | `/api/v1/carts/{id}/coupon` | Apply coupon |
//! | POST | `/api/v1/carts/{id}/checkout` | Submit order |

pub mod handlers;
pub mod routes;
pub mod state;

pub use routes::create_router;
pub use state::{AppConfig, AppState};
