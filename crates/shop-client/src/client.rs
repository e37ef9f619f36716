//! # Shop Client
//!
//! One reqwest client shared by the customer, order and store endpoints.
//! Every call goes through [`ShopClient::execute`], which scopes the URL to
//! the shop, attaches the customer token where needed, and turns failed
//! responses into [`ApiError`]s.

use crate::config::ClientConfig;
use parking_lot::RwLock;
use reqwest::header::HeaderMap;
use reqwest::{Client, Method, StatusCode};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use shop_core::{ApiError, ApiResult};
use std::sync::Arc;
use tracing::{debug, error, instrument, warn};

/// Error the customer API returns for an expired or revoked session
pub const SYSTEM_EXCEPTION_ERROR: &str = "Exception of type 'System.Exception' was thrown.";

/// Which backend a request is addressed to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Backend {
    Customers,
    Orders,
    Stores,
}

/// Signed-in customer, dropped on logout
#[derive(Debug, Default)]
struct CustomerAuth {
    token: Option<String>,
    email: Option<String>,
}

/// Client for the shop backends
///
/// Cloning is cheap; clones share the customer session.
#[derive(Debug, Clone)]
pub struct ShopClient {
    config: Arc<ClientConfig>,
    client: Client,
    auth: Arc<RwLock<CustomerAuth>>,
}

impl ShopClient {
    /// Create a new client
    pub fn new(config: ClientConfig) -> ApiResult<Self> {
        config.validate()?;

        let client = Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(|e| ApiError::Configuration(format!("Failed to create HTTP client: {}", e)))?;

        Ok(Self {
            config: Arc::new(config),
            client,
            auth: Arc::new(RwLock::new(CustomerAuth::default())),
        })
    }

    /// Create from environment variables
    pub fn from_env() -> ApiResult<Self> {
        Self::new(ClientConfig::from_env()?)
    }

    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    /// Sign a customer in
    pub fn set_customer_token(&self, token: impl Into<String>) {
        self.auth.write().token = Some(token.into());
    }

    pub fn customer_token(&self) -> Option<String> {
        self.auth.read().token.clone()
    }

    /// Email from the last successful dash-info call
    pub fn customer_email(&self) -> Option<String> {
        self.auth.read().email.clone()
    }

    pub(crate) fn remember_email(&self, email: &str) {
        self.auth.write().email = Some(email.to_string());
    }

    pub fn is_authenticated(&self) -> bool {
        self.auth.read().token.is_some()
    }

    /// Drop the customer session
    pub fn logout(&self) {
        let mut auth = self.auth.write();
        auth.token = None;
        auth.email = None;
    }

    pub(crate) async fn get(
        &self,
        backend: Backend,
        path: &str,
        query: Vec<(String, String)>,
    ) -> ApiResult<Value> {
        let (_, body) = self.execute(Method::GET, backend, path, query, None).await?;
        Ok(body)
    }

    pub(crate) async fn get_with_headers(
        &self,
        backend: Backend,
        path: &str,
        query: Vec<(String, String)>,
    ) -> ApiResult<(HeaderMap, Value)> {
        self.execute(Method::GET, backend, path, query, None).await
    }

    pub(crate) async fn post<B: Serialize + ?Sized>(
        &self,
        backend: Backend,
        path: &str,
        body: &B,
    ) -> ApiResult<Value> {
        let body = serde_json::to_value(body).map_err(|e| ApiError::Schema(e.to_string()))?;
        let (_, body) = self
            .execute(Method::POST, backend, path, Vec::new(), Some(body))
            .await?;
        Ok(body)
    }

    /// Send one request and decode the JSON response
    #[instrument(skip(self, query, body))]
    async fn execute(
        &self,
        method: Method,
        backend: Backend,
        path: &str,
        mut query: Vec<(String, String)>,
        body: Option<Value>,
    ) -> ApiResult<(HeaderMap, Value)> {
        let url = match backend {
            Backend::Customers => self.config.customers_url(path),
            Backend::Orders => self.config.orders_url(path),
            Backend::Stores => {
                if let Some(password) = &self.config.shop.password {
                    query.push(("password".to_string(), password.clone()));
                }
                self.config.stores_url(path)
            }
        };

        debug!("{} {}", method, url);

        let mut request = self.client.request(method, &url).query(&query);

        if backend == Backend::Customers {
            if let Some(token) = self.customer_token() {
                request = request.bearer_auth(token);
            }
        }

        if let Some(body) = body {
            request = request.json(&body);
        }

        let response = request
            .send()
            .await
            .map_err(|e| ApiError::Network(e.to_string()))?;

        let status = response.status();
        let headers = response.headers().clone();
        let text = response
            .text()
            .await
            .map_err(|e| ApiError::Network(e.to_string()))?;

        if !status.is_success() {
            return Err(self.failure(status, path, &text));
        }

        if text.trim().is_empty() {
            return Ok((headers, Value::Null));
        }

        let body = serde_json::from_str(&text)
            .map_err(|e| ApiError::Schema(format!("Failed to parse response: {}", e)))?;

        Ok((headers, body))
    }

    fn failure(&self, status: StatusCode, path: &str, text: &str) -> ApiError {
        let body: ErrorBody = serde_json::from_str(text).unwrap_or_default();

        if status == StatusCode::UNAUTHORIZED {
            warn!("Unauthorized error, token might be invalid");
            self.logout();
            return ApiError::Unauthorized;
        }

        if body.is_system_exception() {
            warn!("Customer session rejected, logging out");
            self.logout();
        }

        if status == StatusCode::NOT_FOUND {
            error!("The server error, method not found: {}", path);
            return ApiError::NotFound {
                path: path.to_string(),
            };
        }

        let message = body
            .message()
            .unwrap_or_else(|| status.canonical_reason().unwrap_or("request failed").to_string());

        error!("Shop API error: status={}, message={}", status, message);

        ApiError::Http {
            status: status.as_u16(),
            message,
        }
    }
}

/// Repeated `key=value` pairs for an optional id list
pub(crate) fn ids_query(ids: Option<&[String]>) -> Vec<(String, String)> {
    ids.unwrap_or_default()
        .iter()
        .map(|id| ("ids".to_string(), id.clone()))
        .collect()
}

#[derive(Debug, Default, Deserialize)]
struct ErrorBody {
    #[serde(default)]
    errors: Option<Vec<String>>,
    #[serde(default)]
    message: Option<String>,
}

impl ErrorBody {
    fn message(&self) -> Option<String> {
        match (&self.errors, &self.message) {
            (Some(errors), _) if !errors.is_empty() => Some(errors.join("\n")),
            (_, Some(message)) if !message.is_empty() => Some(message.clone()),
            _ => None,
        }
    }

    fn is_system_exception(&self) -> bool {
        self.errors
            .as_ref()
            .and_then(|errors| errors.first())
            .is_some_and(|first| first == SYSTEM_EXCEPTION_ERROR)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::client_for;
    use serde_json::json;
    use wiremock::matchers::{header, method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    #[tokio::test]
    async fn test_bearer_only_for_customer_endpoints() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/shop-1/customers/rewards"))
            .and(header("Authorization", "Bearer tok"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "points": 3 })))
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/shops/acme.example.com/terms"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "text": "ok" })))
            .mount(&server)
            .await;

        let client = client_for(&server);
        client.set_customer_token("tok");

        let rewards = client
            .get(Backend::Customers, "customers/rewards", Vec::new())
            .await
            .unwrap();
        assert_eq!(rewards["points"], 3);

        client.get(Backend::Stores, "terms", Vec::new()).await.unwrap();

        let requests = server.received_requests().await.unwrap();
        let store_request = requests
            .iter()
            .find(|r| r.url.path().ends_with("/terms"))
            .unwrap();
        assert!(!store_request.headers.contains_key("authorization"));
    }

    #[tokio::test]
    async fn test_store_password_query() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/shops/acme.example.com/settings"))
            .and(query_param("password", "hunter2"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({})))
            .expect(1)
            .mount(&server)
            .await;

        let mut config = crate::testing::config_for(&server);
        config.shop = config.shop.with_password("hunter2");
        let client = ShopClient::new(config).unwrap();

        client.get(Backend::Stores, "settings", Vec::new()).await.unwrap();
    }

    #[tokio::test]
    async fn test_unauthorized_logs_out() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(401))
            .mount(&server)
            .await;

        let client = client_for(&server);
        client.set_customer_token("stale");

        let err = client
            .get(Backend::Customers, "customers/balance", Vec::new())
            .await
            .unwrap_err();
        assert_eq!(err, ApiError::Unauthorized);
        assert!(!client.is_authenticated());
    }

    #[tokio::test]
    async fn test_system_exception_logs_out() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(
                ResponseTemplate::new(400)
                    .set_body_json(json!({ "errors": [SYSTEM_EXCEPTION_ERROR, "second"] })),
            )
            .mount(&server)
            .await;

        let client = client_for(&server);
        client.set_customer_token("tok");

        let err = client
            .get(Backend::Customers, "customers/balance", Vec::new())
            .await
            .unwrap_err();
        assert_eq!(
            err,
            ApiError::Http {
                status: 400,
                message: format!("{}\nsecond", SYSTEM_EXCEPTION_ERROR),
            }
        );
        assert!(!client.is_authenticated());
    }

    #[tokio::test]
    async fn test_error_message_and_not_found() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/v1/orders/acme.example.com"))
            .respond_with(
                ResponseTemplate::new(422).set_body_json(json!({ "message": "Out of stock" })),
            )
            .mount(&server)
            .await;

        let client = client_for(&server);
        client.set_customer_token("tok");

        let err = client
            .post(Backend::Orders, "v1/orders/acme.example.com", &json!({}))
            .await
            .unwrap_err();
        assert_eq!(
            err,
            ApiError::Http {
                status: 422,
                message: "Out of stock".to_string()
            }
        );
        // Non-auth failures keep the session
        assert!(client.is_authenticated());

        let err = client
            .get(Backend::Orders, "v1/missing", Vec::new())
            .await
            .unwrap_err();
        assert_eq!(
            err,
            ApiError::NotFound {
                path: "v1/missing".to_string()
            }
        );
    }

    #[tokio::test]
    async fn test_network_failure() {
        let config = ClientConfig::for_shop(shop_core::ShopContext::new("a.example", "1"))
            .with_base_url("http://127.0.0.1:1");
        let client = ShopClient::new(config).unwrap();

        let err = client.get(Backend::Stores, "terms", Vec::new()).await.unwrap_err();
        assert!(matches!(err, ApiError::Network(_)));
    }

    #[test]
    fn test_ids_query_repeats_key() {
        let ids = vec!["1".to_string(), "2".to_string()];
        assert_eq!(
            ids_query(Some(&ids)),
            vec![
                ("ids".to_string(), "1".to_string()),
                ("ids".to_string(), "2".to_string())
            ]
        );
        assert!(ids_query(None).is_empty());
    }
}
