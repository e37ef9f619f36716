//! # Cart State
//!
//! The customer's in-progress order and the coupon accepted for it.
//!
//! Every mutation validates against the catalog before touching the state,
//! so a failed call leaves the cart exactly as it was.

use crate::catalog::{Catalog, Variant};
use crate::coupon::Coupon;
use crate::error::{CartError, CartResult};
use crate::gateway::{resolve_gateways, ResolvedGateways};
use crate::order::{OrderRequest, PartOrder};
use crate::pricing::{compute_totals, Totals};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Check that the line item's product and variant exist and that enough
/// stock is available for the requested quantity.
pub fn validate_line_item<'a>(catalog: &'a Catalog, item: &PartOrder) -> CartResult<&'a Variant> {
    let variant = catalog.variant(item.product_id, item.product_variant_id)?;

    if variant.quantity.available < item.quantity {
        return Err(CartError::InsufficientStock {
            product_id: item.product_id,
            variant_id: item.product_variant_id,
            available: variant.quantity.available,
            requested: item.quantity,
        });
    }

    Ok(variant)
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CartState {
    pub order: OrderRequest,
    /// Coupon accepted for the current gateway
    pub coupon: Option<Coupon>,
}

impl CartState {
    /// Empty cart for a customer
    pub fn new(customer_email: impl Into<String>) -> Self {
        Self {
            order: OrderRequest::new(customer_email),
            coupon: None,
        }
    }

    pub fn parts(&self) -> &[PartOrder] {
        &self.order.parts
    }

    pub fn gateway(&self) -> Option<&str> {
        self.order.has_gateway().then_some(self.order.gateway.as_str())
    }

    /// Append a line item.
    ///
    /// Fails if the pair is unknown, understocked or already in the cart, or
    /// if the cart already has items and none of their gateways would be
    /// left in common.
    pub fn add_line_item(
        &mut self,
        catalog: &Catalog,
        item: PartOrder,
        authenticated: bool,
    ) -> CartResult<()> {
        validate_line_item(catalog, &item)?;

        if self
            .order
            .find_part(item.product_id, item.product_variant_id)
            .is_some()
        {
            return Err(CartError::DuplicateItem {
                product_id: item.product_id,
                variant_id: item.product_variant_id,
            });
        }

        if !self.order.parts.is_empty() {
            let mut candidate = self.order.parts.clone();
            candidate.push(item);
            if !resolve_gateways(&candidate, catalog, authenticated).has_common_gateway() {
                return Err(CartError::NoCommonGateway);
            }
        }

        self.order.parts.push(item);
        Ok(())
    }

    /// Remove the line item for the exact (product, variant) pair.
    /// Returns false if there was nothing to remove.
    pub fn remove_line_item(&mut self, product_id: u64, variant_id: u64) -> bool {
        let before = self.order.parts.len();
        self.order
            .parts
            .retain(|part| !part.is_for(product_id, variant_id));
        self.order.parts.len() != before
    }

    /// Change the quantity of an existing line item.
    /// Returns false if the pair is not in the cart.
    pub fn update_quantity(&mut self, catalog: &Catalog, item: PartOrder) -> CartResult<bool> {
        validate_line_item(catalog, &item)?;

        match self
            .order
            .parts
            .iter_mut()
            .find(|part| part.is_for(item.product_id, item.product_variant_id))
        {
            Some(part) => {
                part.quantity = item.quantity;
                Ok(true)
            }
            None => Ok(false),
        }
    }

    /// Choose the gateway. Any accepted coupon is dropped because it was
    /// validated for the previous gateway; the code is returned so the
    /// caller can re-validate it.
    pub fn set_gateway(&mut self, gateway: impl Into<String>) -> Option<String> {
        self.order.gateway = gateway.into();
        self.coupon = None;
        self.order.coupon.take()
    }

    /// Record a coupon the backend accepted
    pub fn accept_coupon(&mut self, coupon: Coupon) {
        self.order.coupon = Some(coupon.code.clone());
        self.coupon = Some(coupon);
    }

    pub fn set_custom_fields(&mut self, fields: HashMap<String, String>) {
        self.order.custom_fields = fields;
    }

    pub fn set_discord_link(&mut self, id: impl Into<String>) {
        self.order.discord_social_connect_id = Some(id.into());
    }

    pub fn set_recaptcha_token(&mut self, token: impl Into<String>) {
        self.order.recaptcha = token.into();
    }

    /// Drop every line item and the coupon, keeping the customer email
    pub fn reset(&mut self) {
        *self = Self::new(std::mem::take(&mut self.order.customer_email));
    }

    pub fn gateways(&self, catalog: &Catalog, authenticated: bool) -> ResolvedGateways {
        resolve_gateways(&self.order.parts, catalog, authenticated)
    }

    pub fn totals(&self, catalog: &Catalog) -> Totals {
        compute_totals(&self.order.parts, catalog, self.coupon.as_ref())
    }
}
