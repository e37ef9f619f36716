//! # Order Types
//!
//! The order-creation payload and its pieces, in the backend's wire shape.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// A line item: one (product, variant) pair and the requested quantity
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PartOrder {
    pub product_id: u64,
    pub product_variant_id: u64,
    pub quantity: u64,
}

impl PartOrder {
    pub fn new(product_id: u64, product_variant_id: u64, quantity: u64) -> Self {
        Self {
            product_id,
            product_variant_id,
            quantity,
        }
    }

    /// True if this line item refers to the given (product, variant) pair
    pub fn is_for(&self, product_id: u64, variant_id: u64) -> bool {
        self.product_id == product_id && self.product_variant_id == variant_id
    }
}

/// Payload submitted to order creation
///
/// Built incrementally by the cart session. The backend enforces that the
/// gateway and recaptcha are set and that there is at least one part.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderRequest {
    pub customer_email: String,
    pub gateway: String,
    pub parts: Vec<PartOrder>,
    pub recaptcha: String,
    pub coupon: Option<String>,
    pub custom_fields: HashMap<String, String>,
    pub discord_social_connect_id: Option<String>,
}

impl OrderRequest {
    /// Default order shape for a customer
    pub fn new(customer_email: impl Into<String>) -> Self {
        Self {
            customer_email: customer_email.into(),
            gateway: String::new(),
            parts: Vec::new(),
            recaptcha: String::new(),
            coupon: None,
            custom_fields: HashMap::new(),
            discord_social_connect_id: None,
        }
    }

    pub fn has_gateway(&self) -> bool {
        !self.gateway.is_empty()
    }

    /// Product ids of every part, in cart order
    pub fn product_ids(&self) -> Vec<u64> {
        self.parts.iter().map(|p| p.product_id).collect()
    }

    pub fn find_part(&self, product_id: u64, variant_id: u64) -> Option<&PartOrder> {
        self.parts.iter().find(|p| p.is_for(product_id, variant_id))
    }

    pub fn is_empty(&self) -> bool {
        self.parts.is_empty()
    }
}

/// Order created by the backend
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreatedOrder {
    pub id: String,
    pub full_access_token: String,
}

/// Body of a coupon validation call
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CouponRequest {
    pub gateway: String,
    pub coupon_name: String,
    pub product_ids: Vec<u64>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_shape() {
        let order = OrderRequest::new("buyer@example.com");
        assert!(!order.has_gateway());
        assert!(order.is_empty());
        assert_eq!(order.coupon, None);

        let json = serde_json::to_value(&order).unwrap();
        assert_eq!(
            json,
            serde_json::json!({
                "customerEmail": "buyer@example.com",
                "gateway": "",
                "parts": [],
                "recaptcha": "",
                "coupon": null,
                "customFields": {},
                "discordSocialConnectId": null
            })
        );
    }

    #[test]
    fn test_lookup() {
        let mut order = OrderRequest::new("buyer@example.com");
        order.parts.push(PartOrder::new(1, 1, 2));
        order.parts.push(PartOrder::new(2, 5, 3));

        assert_eq!(order.product_ids(), vec![1, 2]);
        assert!(order.find_part(2, 5).is_some());
        assert!(order.find_part(2, 1).is_none());
    }

    #[test]
    fn test_part_wire_names() {
        let json = serde_json::to_value(PartOrder::new(3, 4, 1)).unwrap();
        assert_eq!(
            json,
            serde_json::json!({ "productId": 3, "productVariantId": 4, "quantity": 1 })
        );
    }
}
