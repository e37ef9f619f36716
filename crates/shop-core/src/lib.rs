//! # shop-core
//!
//! Core types and checkout logic for the storefront-rs engine.
//!
//! This crate provides:
//! - `Catalog`, `Product` and `Variant` for the shop catalog
//! - `CartState` with validated line-item mutations
//! - `resolve_gateways` and `compute_totals`, the pure cart derivations
//! - `CheckoutSession`, which ties the cart to a `ShopBackend` and publishes
//!   snapshots to observers
//! - `ShopContext` and `ShopRegistry` for multi-tenant support
//! - `ApiError` and `CartError` for typed error handling
//!
//! ## Example
//!
//! ```rust,ignore
//! use shop_core::{CheckoutSession, PartOrder};
//!
//! // Open a session; this loads the shop's catalog
//! let mut session = CheckoutSession::open(backend, "buyer@example.com").await?;
//!
//! session.add_line_item(PartOrder::new(product_id, variant_id, 1))?;
//!
//! // Offer only the gateways every item accepts
//! let gateways = session.possible_gateways();
//! session.set_gateway(&gateways.available[0]).await?;
//!
//! session.apply_coupon("SAVE10").await?;
//! println!("Total: {:?}", session.totals());
//!
//! let order = session.submit().await?;
//! ```

pub mod backend;
pub mod cart;
pub mod catalog;
pub mod coupon;
pub mod dashboard;
pub mod error;
pub mod gateway;
pub mod order;
pub mod pricing;
pub mod session;
pub mod shop;

// Re-exports for convenience
pub use backend::{BoxedShopBackend, ShopBackend};
pub use cart::{validate_line_item, CartState};
pub use catalog::{
    Catalog, DiscordSettings, Gateway, Image, Price, Product, Quantity, Review, Stats, Variant,
};
pub use coupon::{Coupon, CouponTerms, Discount};
pub use dashboard::{
    parse, BalanceReport, BalanceTopUpSettings, Cashback, DashInfo, Envelope, GatewayDetail,
    MetadataParams, MetadataRequest, OrderReview, OrderStatus, OrderSummary, Page, PaymentMethod,
    Referral, ReferralCode, ReferralInfo, TopUpBonus, TopUpCharge, TopUpRequest, TopUpSettings,
    Transaction, TransactionStatus, PAGE_SIZE,
};
pub use error::{ApiError, ApiResult, CartError, CartResult};
pub use gateway::{resolve_gateways, ResolvedGateways, BALANCE_GATEWAY};
pub use order::{CouponRequest, CreatedOrder, OrderRequest, PartOrder};
pub use pricing::{compute_totals, Totals};
pub use session::{CheckoutSession, SessionSnapshot};
pub use shop::{ShopContext, ShopRegistry};
