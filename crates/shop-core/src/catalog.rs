//! # Catalog Types
//!
//! Products as served by the storefront backend. A product carries an ordered
//! list of variants, and every variant declares its own price, stock and the
//! payment gateways it can be bought through.

use crate::error::{CartError, CartResult};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Price as sent by the backend (decimal amount plus ISO currency code)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Price {
    pub amount: f64,
    pub currency: String,
}

impl Price {
    pub fn new(amount: f64, currency: impl Into<String>) -> Self {
        Self {
            amount,
            currency: currency.into(),
        }
    }

    /// Format for display (e.g., "10.50 USD")
    pub fn display(&self) -> String {
        format!("{:.2} {}", self.amount, self.currency)
    }
}

/// A named payment method a variant may be purchased through
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Gateway {
    pub name: String,
}

impl Gateway {
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into() }
    }
}

/// Stock information for a variant
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Quantity {
    pub available: u64,
    #[serde(default)]
    pub restrictions: HashMap<String, serde_json::Value>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DiscordSettings {
    pub is_enabled: bool,
    pub is_required: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Image {
    pub id: u64,
    pub cf_id: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Review {
    pub id: u64,
    pub message: String,
    pub rating: u8,
    pub created_at_iso: String,
    pub purchased_iso: String,
}

/// Aggregate review stats
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Stats {
    pub average_rating: f64,
    pub total_reviews: u64,
    pub total_sold: u64,
}

/// A purchasable configuration of a product
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Variant {
    pub id: u64,
    pub name: String,
    pub price: Price,
    pub quantity: Quantity,
    /// Delivery time as reported by the backend
    pub delivery_time: u64,
    pub gateways: Vec<Gateway>,
    /// Field definitions are opaque to the checkout core
    #[serde(default)]
    pub custom_fields: Vec<serde_json::Value>,
    #[serde(default)]
    pub discord_settings: DiscordSettings,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub compare_at_price: Option<Price>,
}

impl Variant {
    /// Create a variant with the given stock and gateways
    pub fn new(id: u64, name: impl Into<String>, price: Price, available: u64) -> Self {
        Self {
            id,
            name: name.into(),
            price,
            quantity: Quantity {
                available,
                restrictions: HashMap::new(),
            },
            delivery_time: 0,
            gateways: Vec::new(),
            custom_fields: Vec::new(),
            discord_settings: DiscordSettings::default(),
            description: None,
            compare_at_price: None,
        }
    }

    /// Builder: add an eligible gateway
    pub fn with_gateway(mut self, name: impl Into<String>) -> Self {
        self.gateways.push(Gateway::new(name));
        self
    }

    /// Gateway names in declaration order
    pub fn gateway_names(&self) -> impl Iterator<Item = &str> {
        self.gateways.iter().map(|g| g.name.as_str())
    }

    pub fn accepts(&self, gateway: &str) -> bool {
        self.gateway_names().any(|name| name == gateway)
    }
}

/// A product in the shop catalog
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Product {
    pub id: u64,
    pub unique_path: String,
    pub name: String,
    #[serde(default)]
    pub short_description: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub images: Vec<Image>,
    pub variants: Vec<Variant>,
    #[serde(default)]
    pub stats: Stats,
    #[serde(default)]
    pub reviews: Vec<Review>,
}

impl Product {
    pub fn new(id: u64, name: impl Into<String>) -> Self {
        let name = name.into();
        Self {
            id,
            unique_path: name.to_lowercase().replace(' ', "-"),
            name,
            short_description: String::new(),
            description: String::new(),
            images: Vec::new(),
            variants: Vec::new(),
            stats: Stats::default(),
            reviews: Vec::new(),
        }
    }

    /// Builder: append a variant
    pub fn with_variant(mut self, variant: Variant) -> Self {
        self.variants.push(variant);
        self
    }

    pub fn variant(&self, variant_id: u64) -> Option<&Variant> {
        self.variants.iter().find(|v| v.id == variant_id)
    }
}

/// Products fetched for one cart session. Replaced wholesale on re-fetch.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Catalog {
    pub products: Vec<Product>,
}

impl Catalog {
    pub fn new(products: Vec<Product>) -> Self {
        Self { products }
    }

    pub fn is_empty(&self) -> bool {
        self.products.is_empty()
    }

    pub fn len(&self) -> usize {
        self.products.len()
    }

    /// Find a product by ID
    pub fn get(&self, product_id: u64) -> Option<&Product> {
        self.products.iter().find(|p| p.id == product_id)
    }

    /// Look up a variant without failing
    pub fn find_variant(&self, product_id: u64, variant_id: u64) -> Option<&Variant> {
        self.get(product_id).and_then(|p| p.variant(variant_id))
    }

    /// Look up a variant, reporting which half of the pair is missing
    pub fn variant(&self, product_id: u64, variant_id: u64) -> CartResult<&Variant> {
        let product = self
            .get(product_id)
            .ok_or(CartError::ProductNotFound { product_id })?;

        product.variant(variant_id).ok_or(CartError::VariantNotFound {
            product_id,
            variant_id,
        })
    }

    /// First variant of the first product; seeds gateway resolution
    pub fn first_variant(&self) -> Option<&Variant> {
        self.products.first().and_then(|p| p.variants.first())
    }
}
