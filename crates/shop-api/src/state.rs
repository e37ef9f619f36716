//! # Application State
//!
//! Shared state for the Axum application.
//! Contains the shop registry, the open cart sessions and the factory that
//! connects a session to its shop's backend.

use parking_lot::RwLock;
use shop_client::{ClientConfig, ShopClient};
use shop_core::{ApiResult, BoxedShopBackend, CheckoutSession, ShopContext, ShopRegistry};
use std::collections::HashMap;
use std::net::{AddrParseError, SocketAddr};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Mutex;
use tokio::task::JoinHandle;
use tokio::time::Instant;
use tracing::info;
use uuid::Uuid;

/// Carts untouched for this long are dropped
pub const DEFAULT_CART_IDLE_SECS: u64 = 30 * 60;

/// Application configuration
#[derive(Debug, Clone)]
pub struct AppConfig {
    /// Host to bind to
    pub host: String,
    /// Port to listen on
    pub port: u16,
    /// Environment (development, staging, production)
    pub environment: String,
    /// Path of the shop registry TOML file
    pub shops_config: Option<String>,
    /// Backend overrides; `None` keeps the client defaults
    pub customers_api_url: Option<String>,
    pub orders_api_url: Option<String>,
    pub stores_api_url: Option<String>,
    /// Per-request timeout towards the shop backends
    pub http_timeout: Duration,
    /// How long an unused cart session is kept
    pub cart_idle_timeout: Duration,
}

impl AppConfig {
    /// Load from environment variables
    pub fn from_env() -> Self {
        dotenvy::dotenv().ok();

        Self {
            host: std::env::var("HOST").unwrap_or_else(|_| "127.0.0.1".to_string()),
            port: std::env::var("PORT")
                .ok()
                .and_then(|p| p.parse().ok())
                .unwrap_or(8080),
            environment: std::env::var("ENVIRONMENT").unwrap_or_else(|_| "development".to_string()),
            shops_config: std::env::var("SHOPS_CONFIG").ok(),
            customers_api_url: std::env::var("CUSTOMERS_API_URL").ok(),
            orders_api_url: std::env::var("ORDERS_API_URL").ok(),
            stores_api_url: std::env::var("STORES_API_URL").ok(),
            http_timeout: Duration::from_secs(
                std::env::var("HTTP_TIMEOUT_SECS")
                    .ok()
                    .and_then(|t| t.parse().ok())
                    .unwrap_or(shop_client::config::DEFAULT_TIMEOUT_SECS),
            ),
            cart_idle_timeout: Duration::from_secs(
                std::env::var("CART_IDLE_TIMEOUT_SECS")
                    .ok()
                    .and_then(|t| t.parse().ok())
                    .unwrap_or(DEFAULT_CART_IDLE_SECS),
            ),
        }
    }

    /// Get the socket address to bind to
    pub fn socket_addr(&self) -> Result<SocketAddr, AddrParseError> {
        format!("{}:{}", self.host, self.port).parse()
    }

    /// Check if running in production
    pub fn is_production(&self) -> bool {
        self.environment == "production"
    }

    /// Client configuration for one shop, with this deployment's overrides
    pub fn client_config(&self, shop: &ShopContext) -> ClientConfig {
        let mut config = ClientConfig::for_shop(shop.clone()).with_timeout(self.http_timeout);
        if let Some(url) = &self.customers_api_url {
            config.customers_api_url = url.clone();
        }
        if let Some(url) = &self.orders_api_url {
            config.orders_api_url = url.clone();
        }
        if let Some(url) = &self.stores_api_url {
            config.stores_api_url = url.clone();
        }
        config
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self::from_env()
    }
}

/// Builds the backend for a new cart: shop plus optional customer token
pub type BackendFactory =
    Arc<dyn Fn(&ShopContext, Option<String>) -> ApiResult<BoxedShopBackend> + Send + Sync>;

/// An open cart and the shop it belongs to
pub struct CartHandle {
    pub shop: String,
    pub session: Mutex<CheckoutSession>,
    last_used: parking_lot::Mutex<Instant>,
}

impl CartHandle {
    fn new(shop: &ShopContext, session: CheckoutSession) -> Self {
        Self {
            shop: shop.domain.clone(),
            session: Mutex::new(session),
            last_used: parking_lot::Mutex::new(Instant::now()),
        }
    }

    fn touch(&self) {
        *self.last_used.lock() = Instant::now();
    }

    fn idle_for(&self, now: Instant) -> Duration {
        now.saturating_duration_since(*self.last_used.lock())
    }
}

pub type SharedCart = Arc<CartHandle>;

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    /// Shops served by this deployment
    pub shops: Arc<ShopRegistry>,
    /// Open cart sessions by id
    pub carts: Arc<RwLock<HashMap<Uuid, SharedCart>>>,
    /// Connects new carts to their shop
    pub backends: BackendFactory,
    /// Application config
    pub config: AppConfig,
}

impl AppState {
    /// Create a new AppState backed by the live shop APIs
    pub fn new() -> anyhow::Result<Self> {
        let config = AppConfig::from_env();
        let shops = load_shop_registry(&config)?;

        let client_settings = config.clone();
        let backends: BackendFactory = Arc::new(move |shop, token| {
            let client = ShopClient::new(client_settings.client_config(shop))?;
            if let Some(token) = token {
                client.set_customer_token(token);
            }
            Ok(Arc::new(client) as BoxedShopBackend)
        });

        Ok(Self::with_backends(config, shops, backends))
    }

    /// Create state with a custom backend factory
    pub fn with_backends(config: AppConfig, shops: ShopRegistry, backends: BackendFactory) -> Self {
        Self {
            shops: Arc::new(shops),
            carts: Arc::new(RwLock::new(HashMap::new())),
            backends,
            config,
        }
    }

    /// Register an opened session and return its id
    pub fn insert_cart(&self, shop: &ShopContext, session: CheckoutSession) -> Uuid {
        let id = Uuid::new_v4();
        self.carts
            .write()
            .insert(id, Arc::new(CartHandle::new(shop, session)));
        id
    }

    /// Look up a cart and mark it as used
    pub fn cart(&self, id: &Uuid) -> Option<SharedCart> {
        let cart = self.carts.read().get(id).cloned()?;
        cart.touch();
        Some(cart)
    }

    pub fn remove_cart(&self, id: &Uuid) -> Option<SharedCart> {
        self.carts.write().remove(id)
    }

    /// Drop carts idle for longer than `max_idle`; returns how many went
    pub fn evict_idle(&self, max_idle: Duration) -> usize {
        let now = Instant::now();
        let mut carts = self.carts.write();
        let before = carts.len();
        carts.retain(|_, cart| cart.idle_for(now) <= max_idle);
        before - carts.len()
    }

    /// Evict idle carts periodically for the life of the server
    pub fn spawn_cart_eviction(&self) -> JoinHandle<()> {
        let state = self.clone();
        let max_idle = self.config.cart_idle_timeout;
        let period = max_idle.min(Duration::from_secs(60)).max(Duration::from_secs(1));

        tokio::spawn(async move {
            let mut ticker = tokio::time::interval(period);
            loop {
                ticker.tick().await;
                let evicted = state.evict_idle(max_idle);
                if evicted > 0 {
                    info!("Evicted {} idle carts, {} open", evicted, state.cart_count());
                }
            }
        })
    }

    pub fn cart_count(&self) -> usize {
        self.carts.read().len()
    }
}

/// Load the shop registry.
///
/// Order: `SHOPS_CONFIG`, then `config/shops.toml` relative to the working
/// directory, then a single shop from `SHOP_DOMAIN` / `SHOP_ID`.
fn load_shop_registry(config: &AppConfig) -> anyhow::Result<ShopRegistry> {
    let config_paths: Vec<&str> = match &config.shops_config {
        Some(path) => vec![path.as_str()],
        None => vec![
            "config/shops.toml",
            "../config/shops.toml",
            "../../config/shops.toml",
        ],
    };

    for path in config_paths {
        if let Ok(content) = std::fs::read_to_string(path) {
            let registry = ShopRegistry::from_toml(&content)
                .map_err(|e| anyhow::anyhow!("Failed to parse {}: {}", path, e))?;
            tracing::info!("Loaded {} shops from {}", registry.len(), path);
            return Ok(registry);
        }
    }

    if let Ok(client) = ClientConfig::from_env() {
        tracing::info!("Serving single shop from environment: {}", client.shop.domain);
        return Ok(ShopRegistry::new().with_shop(client.shop));
    }

    tracing::warn!("No shop registry found, serving no shops");
    Ok(ShopRegistry::new())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config() -> AppConfig {
        AppConfig {
            host: "0.0.0.0".to_string(),
            port: 3000,
            environment: "test".to_string(),
            shops_config: None,
            customers_api_url: None,
            orders_api_url: Some("http://127.0.0.1:9000".to_string()),
            stores_api_url: None,
            http_timeout: Duration::from_secs(5),
            cart_idle_timeout: Duration::from_secs(60),
        }
    }

    struct EmptyShop;

    #[async_trait::async_trait]
    impl shop_core::ShopBackend for EmptyShop {
        async fn fetch_products(
            &self,
            _ids: Option<&[String]>,
        ) -> ApiResult<Vec<shop_core::Product>> {
            Ok(Vec::new())
        }

        async fn validate_coupon(
            &self,
            _request: &shop_core::CouponRequest,
        ) -> ApiResult<shop_core::CouponTerms> {
            Err(shop_core::ApiError::Network("offline".into()))
        }

        async fn post_order(
            &self,
            _order: &shop_core::OrderRequest,
        ) -> ApiResult<shop_core::CreatedOrder> {
            Err(shop_core::ApiError::Network("offline".into()))
        }

        fn has_customer_token(&self) -> bool {
            false
        }
    }

    fn state() -> AppState {
        let backends: BackendFactory =
            Arc::new(|_, _| Ok(Arc::new(EmptyShop) as BoxedShopBackend));
        AppState::with_backends(config(), ShopRegistry::new(), backends)
    }

    fn open(state: &AppState) -> Uuid {
        let shop = ShopContext::new("acme.example.com", "shop-1");
        let session = CheckoutSession::new(Arc::new(EmptyShop), "buyer@example.com");
        state.insert_cart(&shop, session)
    }

    #[test]
    fn test_app_config_defaults() {
        // Clear env vars for test
        std::env::remove_var("HOST");
        std::env::remove_var("PORT");

        let config = AppConfig::from_env();
        assert_eq!(config.host, "127.0.0.1");
        assert_eq!(config.port, 8080);
    }

    #[test]
    fn test_socket_addr() {
        let addr = config().socket_addr().unwrap();
        assert_eq!(addr.to_string(), "0.0.0.0:3000");

        let bad = AppConfig {
            host: "not a host".to_string(),
            ..config()
        };
        assert!(bad.socket_addr().is_err());
    }

    #[test]
    fn test_client_config_overrides() {
        let shop = ShopContext::new("acme.example.com", "shop-1");
        let client = config().client_config(&shop);

        assert_eq!(client.orders_api_url, "http://127.0.0.1:9000");
        assert_eq!(
            client.stores_api_url,
            shop_client::config::DEFAULT_STORES_API_URL
        );
        assert_eq!(client.timeout, Duration::from_secs(5));
    }

    #[tokio::test(start_paused = true)]
    async fn test_idle_carts_evicted() {
        let state = state();
        let stale = open(&state);
        let active = open(&state);

        tokio::time::advance(Duration::from_secs(40)).await;
        assert!(state.cart(&active).is_some());

        tokio::time::advance(Duration::from_secs(40)).await;
        assert_eq!(state.evict_idle(Duration::from_secs(60)), 1);
        assert!(state.cart(&stale).is_none());
        assert!(state.cart(&active).is_some());
    }

    #[tokio::test(start_paused = true)]
    async fn test_eviction_task() {
        let state = state();
        open(&state);
        let task = state.spawn_cart_eviction();

        tokio::time::sleep(Duration::from_secs(125)).await;
        assert_eq!(state.cart_count(), 0);
        task.abort();
    }

    #[tokio::test]
    async fn test_remove_cart() {
        let state = state();
        let id = open(&state);

        assert!(state.remove_cart(&id).is_some());
        assert!(state.remove_cart(&id).is_none());
        assert_eq!(state.cart_count(), 0);
    }

    #[test]
    fn test_registry_from_explicit_path() {
        let dir = std::env::temp_dir().join(format!("shops-{}.toml", Uuid::new_v4()));
        std::fs::write(
            &dir,
            r#"
[[shops]]
domain = "acme.example.com"
id = "shop-1"
"#,
        )
        .unwrap();

        let config = AppConfig {
            shops_config: Some(dir.to_string_lossy().into_owned()),
            ..config()
        };
        let registry = load_shop_registry(&config).unwrap();
        assert!(registry.get("shop-1").is_some());

        std::fs::remove_file(dir).unwrap();
    }
}
