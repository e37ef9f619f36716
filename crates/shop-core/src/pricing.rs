//! # Pricing
//!
//! Cart subtotal and coupon-adjusted total.

use crate::catalog::Catalog;
use crate::coupon::Coupon;
use crate::order::PartOrder;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Totals {
    pub total: f64,
    /// Present only while a coupon with a discount is applied
    #[serde(skip_serializing_if = "Option::is_none")]
    pub total_with_discount: Option<f64>,
}

impl Totals {
    /// The amount the customer will be charged
    pub fn payable(&self) -> f64 {
        self.total_with_discount.unwrap_or(self.total)
    }
}

/// Sum `price * quantity` over the cart. Items whose product or variant is
/// gone from the catalog contribute nothing.
pub fn compute_totals(items: &[PartOrder], catalog: &Catalog, coupon: Option<&Coupon>) -> Totals {
    let total = items
        .iter()
        .filter_map(|item| {
            catalog
                .find_variant(item.product_id, item.product_variant_id)
                .map(|variant| variant.price.amount * item.quantity as f64)
        })
        .fold(0.0, |acc, line| acc + line);

    let total_with_discount = coupon
        .and_then(Coupon::discount)
        .map(|discount| discount.apply(total));

    Totals {
        total,
        total_with_discount,
    }
}
