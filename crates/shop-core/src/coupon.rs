//! # Coupons
//!
//! Wire terms returned by coupon validation, and the typed coupon the cart
//! keeps once validation succeeded.

use serde::{Deserialize, Serialize};

/// Raw validation response (`data` of the coupon endpoint)
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CouponTerms {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub restrict_to_product_ids: Option<Vec<u64>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub is_fixed: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub discount: Option<f64>,
}

impl CouponTerms {
    /// True if the coupon may be used with every given product id.
    /// An absent or empty restriction list covers everything.
    pub fn covers(&self, product_ids: &[u64]) -> bool {
        match self.restrict_to_product_ids.as_deref() {
            None | Some([]) => true,
            Some(allowed) => product_ids.iter().all(|id| allowed.contains(id)),
        }
    }

    /// Typed discount, if the terms carry a non-zero one
    pub fn discount(&self) -> Option<Discount> {
        match self.discount {
            Some(amount) if amount != 0.0 => Some(if self.is_fixed.unwrap_or(false) {
                Discount::Fixed(amount)
            } else {
                Discount::Percent(amount)
            }),
            _ => None,
        }
    }
}

/// Discount carried by a coupon
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "value", rename_all = "lowercase")]
pub enum Discount {
    /// Amount subtracted from the total
    Fixed(f64),
    /// Percentage off the total (0-100)
    Percent(f64),
}

impl Discount {
    /// Apply to a total. Fixed discounts never go below zero.
    pub fn apply(&self, total: f64) -> f64 {
        match *self {
            Discount::Fixed(amount) => (total - amount).max(0.0),
            Discount::Percent(percent) => total * (1.0 - percent / 100.0),
        }
    }
}

/// A coupon accepted by the backend for the current gateway and cart
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Coupon {
    pub code: String,
    pub terms: CouponTerms,
}

impl Coupon {
    pub fn new(code: impl Into<String>, terms: CouponTerms) -> Self {
        Self {
            code: code.into(),
            terms,
        }
    }

    pub fn discount(&self) -> Option<Discount> {
        self.terms.discount()
    }
}
