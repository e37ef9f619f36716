//! # Shop Backend Trait
//!
//! The three backend calls the checkout session depends on, plus the
//! customer sign-in check used for `Balance` eligibility.
//!
//! ```text
//! ┌──────────────────────────────────────────────┐
//! │             ShopBackend (trait)              │
//! │  ├── fetch_products()                        │
//! │  ├── validate_coupon()                       │
//! │  ├── post_order()                            │
//! │  └── has_customer_token()                    │
//! └──────────────────────────────────────────────┘
//!                      ▲
//!          ┌───────────┴───────────┐
//!  ┌───────┴───────┐       ┌───────┴───────┐
//!  │  ShopClient   │       │  test doubles │
//!  │ (shop-client) │       │               │
//!  └───────────────┘       └───────────────┘
//! ```

use crate::catalog::Product;
use crate::coupon::CouponTerms;
use crate::error::ApiResult;
use crate::order::{CouponRequest, CreatedOrder, OrderRequest};
use async_trait::async_trait;
use std::sync::Arc;

/// Backend collaborator of a checkout session. Every call is made once;
/// failures are returned to the caller without retry.
#[async_trait]
pub trait ShopBackend: Send + Sync {
    /// Fetch the shop's products, optionally restricted to the given ids.
    async fn fetch_products(&self, ids: Option<&[String]>) -> ApiResult<Vec<Product>>;

    /// Ask the backend whether a coupon is valid for a gateway and cart.
    async fn validate_coupon(&self, request: &CouponRequest) -> ApiResult<CouponTerms>;

    /// Create an order.
    async fn post_order(&self, order: &OrderRequest) -> ApiResult<CreatedOrder>;

    /// Whether a customer bearer token is currently held.
    fn has_customer_token(&self) -> bool;
}

/// Type alias for a shared backend (dynamic dispatch)
pub type BoxedShopBackend = Arc<dyn ShopBackend>;
