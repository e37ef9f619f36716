//! # Gateway Resolution
//!
//! Computes which payment gateways can pay for the whole cart.
//!
//! The candidate set is seeded from the first variant of the first catalog
//! product, then narrowed by every line item's variant. Line items that no
//! longer resolve in the catalog are skipped. `Balance` needs a signed-in
//! customer; for guests it is reported separately instead of being offered.

use crate::catalog::Catalog;
use crate::order::PartOrder;
use serde::{Deserialize, Serialize};

/// Gateway that pays from the customer's shop balance
pub const BALANCE_GATEWAY: &str = "Balance";

/// Result of gateway resolution
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResolvedGateways {
    /// Gateways every line item accepts, in the seed variant's order
    pub available: Vec<String>,
    /// Gateways common to the cart that need the customer to sign in
    pub requires_auth: Vec<String>,
}

impl ResolvedGateways {
    /// An empty `available` set with items in the cart means no gateway can
    /// pay for the whole order
    pub fn has_common_gateway(&self) -> bool {
        !self.available.is_empty()
    }

    pub fn contains(&self, gateway: &str) -> bool {
        self.available.iter().any(|g| g == gateway)
    }
}

/// Intersect the gateways of every line item's variant.
pub fn resolve_gateways(
    items: &[PartOrder],
    catalog: &Catalog,
    authenticated: bool,
) -> ResolvedGateways {
    let Some(seed) = catalog.first_variant() else {
        return ResolvedGateways::default();
    };

    let mut available: Vec<String> = Vec::with_capacity(seed.gateways.len());
    for name in seed.gateway_names() {
        if !available.iter().any(|g| g == name) {
            available.push(name.to_string());
        }
    }

    for item in items {
        let Some(variant) = catalog.find_variant(item.product_id, item.product_variant_id) else {
            continue;
        };
        available.retain(|gateway| variant.accepts(gateway));
    }

    let mut requires_auth = Vec::new();
    if !authenticated {
        if let Some(pos) = available.iter().position(|g| g == BALANCE_GATEWAY) {
            requires_auth.push(available.remove(pos));
        }
    }

    ResolvedGateways {
        available,
        requires_auth,
    }
}
