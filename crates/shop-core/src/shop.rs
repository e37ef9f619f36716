//! # Shop Configuration
//!
//! Multi-tenant shop identity. Every backend call is scoped either by the
//! shop's domain or by its id, and password-protected storefronts also pass
//! their password to the store API.

use serde::{Deserialize, Serialize};

/// Identity of one tenant shop
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ShopContext {
    /// Storefront domain (e.g., "acme.example.com")
    pub domain: String,

    /// Backend shop id (UUID-like string)
    pub id: String,

    /// Storefront password, for shops that are not public yet
    #[serde(default, skip_serializing)]
    pub password: Option<String>,

    /// Display name
    #[serde(default)]
    pub name: Option<String>,

    /// Whether this shop is served
    #[serde(default = "default_true")]
    pub active: bool,
}

fn default_true() -> bool {
    true
}

impl ShopContext {
    pub fn new(domain: impl Into<String>, id: impl Into<String>) -> Self {
        Self {
            domain: domain.into(),
            id: id.into(),
            password: None,
            name: None,
            active: true,
        }
    }

    /// Builder: set storefront password
    pub fn with_password(mut self, password: impl Into<String>) -> Self {
        self.password = Some(password.into()).filter(|p: &String| !p.is_empty());
        self
    }

    /// Builder: set display name
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }
}

/// Registry of shops served by one deployment
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ShopRegistry {
    #[serde(default)]
    pub shops: Vec<ShopContext>,
}

impl ShopRegistry {
    pub fn new() -> Self {
        Self { shops: Vec::new() }
    }

    pub fn add(&mut self, shop: ShopContext) {
        self.shops.push(shop);
    }

    /// Add a shop with builder pattern
    pub fn with_shop(mut self, shop: ShopContext) -> Self {
        self.add(shop);
        self
    }

    /// Find an active shop by domain or id
    pub fn get(&self, key: &str) -> Option<&ShopContext> {
        self.shops
            .iter()
            .find(|s| s.active && (s.domain == key || s.id == key))
    }

    pub fn active_shops(&self) -> impl Iterator<Item = &ShopContext> {
        self.shops.iter().filter(|s| s.active)
    }

    pub fn len(&self) -> usize {
        self.shops.len()
    }

    pub fn is_empty(&self) -> bool {
        self.shops.is_empty()
    }

    /// Load registry from TOML string
    pub fn from_toml(toml_str: &str) -> Result<Self, toml::de::Error> {
        toml::from_str(toml_str)
    }
}
