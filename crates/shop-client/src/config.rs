//! # Client Configuration
//!
//! Which shop the client talks for, and where the three backends live.
//! Values are loaded from environment variables.

use shop_core::{ApiError, ShopContext};
use std::env;
use std::time::Duration;

pub const DEFAULT_CUSTOMERS_API_URL: &str = "https://customers-api.billgang.com";
pub const DEFAULT_ORDERS_API_URL: &str = "https://sl-api.billgang.com";
pub const DEFAULT_STORES_API_URL: &str = "https://stores-api.billgang.com";
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// Shop backend configuration
#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// Tenant the client acts for
    pub shop: ShopContext,

    /// Customer API (scoped by shop id, bearer authenticated)
    pub customers_api_url: String,

    /// Order, coupon, gateway and top-up API
    pub orders_api_url: String,

    /// Public store API (scoped by shop domain)
    pub stores_api_url: String,

    /// Transport timeout for a single request
    pub timeout: Duration,
}

impl ClientConfig {
    /// Load configuration from environment variables.
    ///
    /// Required env vars:
    /// - `SHOP_DOMAIN`
    /// - `SHOP_ID`
    ///
    /// Optional: `SHOP_PASSWORD`, `CUSTOMERS_API_URL`, `ORDERS_API_URL`,
    /// `STORES_API_URL`, `HTTP_TIMEOUT_SECS`.
    pub fn from_env() -> Result<Self, ApiError> {
        dotenvy::dotenv().ok(); // Load .env file if present

        let domain = env::var("SHOP_DOMAIN")
            .map_err(|_| ApiError::Configuration("SHOP_DOMAIN not set".to_string()))?;

        let id = env::var("SHOP_ID")
            .map_err(|_| ApiError::Configuration("SHOP_ID not set".to_string()))?;

        let mut shop = ShopContext::new(domain, id);
        if let Ok(password) = env::var("SHOP_PASSWORD") {
            shop = shop.with_password(password);
        }

        let timeout = match env::var("HTTP_TIMEOUT_SECS") {
            Ok(raw) => raw.parse().map_err(|_| {
                ApiError::Configuration(format!("HTTP_TIMEOUT_SECS is not a number: {}", raw))
            })?,
            Err(_) => DEFAULT_TIMEOUT_SECS,
        };

        let mut config = Self::for_shop(shop).with_timeout(Duration::from_secs(timeout));
        if let Ok(url) = env::var("CUSTOMERS_API_URL") {
            config.customers_api_url = url;
        }
        if let Ok(url) = env::var("ORDERS_API_URL") {
            config.orders_api_url = url;
        }
        if let Ok(url) = env::var("STORES_API_URL") {
            config.stores_api_url = url;
        }

        config.validate()?;
        Ok(config)
    }

    /// Default backends for a shop
    pub fn for_shop(shop: ShopContext) -> Self {
        Self {
            shop,
            customers_api_url: DEFAULT_CUSTOMERS_API_URL.to_string(),
            orders_api_url: DEFAULT_ORDERS_API_URL.to_string(),
            stores_api_url: DEFAULT_STORES_API_URL.to_string(),
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
        }
    }

    /// Builder: point every backend at one base URL (for testing)
    pub fn with_base_url(mut self, url: impl Into<String>) -> Self {
        let url = url.into();
        self.customers_api_url = url.clone();
        self.orders_api_url = url.clone();
        self.stores_api_url = url;
        self
    }

    /// Builder: set request timeout
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Check that shop identity and URLs are usable
    pub fn validate(&self) -> Result<(), ApiError> {
        if self.shop.domain.is_empty() || self.shop.id.is_empty() {
            return Err(ApiError::Configuration(
                "shop domain and id must not be empty".to_string(),
            ));
        }

        for url in [
            &self.customers_api_url,
            &self.orders_api_url,
            &self.stores_api_url,
        ] {
            if !url.starts_with("http://") && !url.starts_with("https://") {
                return Err(ApiError::Configuration(format!(
                    "API URL must start with http:// or https://: {}",
                    url
                )));
            }
        }

        Ok(())
    }

    /// `{customers}/{shopId}/{path}`
    pub fn customers_url(&self, path: &str) -> String {
        format!("{}/{}/{}", trim(&self.customers_api_url), self.shop.id, path)
    }

    /// `{orders}/{path}`
    pub fn orders_url(&self, path: &str) -> String {
        format!("{}/{}", trim(&self.orders_api_url), path)
    }

    /// `{stores}/shops/{domain}/{path}`
    pub fn stores_url(&self, path: &str) -> String {
        format!(
            "{}/shops/{}/{}",
            trim(&self.stores_api_url),
            self.shop.domain,
            path
        )
    }
}

fn trim(url: &str) -> &str {
    url.trim_end_matches('/')
}
