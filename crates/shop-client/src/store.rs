//! Public store documents, scoped by shop domain.
//!
//! These documents are rendered by the storefront as-is, so they are
//! returned as raw JSON.

use crate::client::{ids_query, Backend, ShopClient};
use serde_json::Value;
use shop_core::{ApiResult, MetadataParams, MetadataRequest};
use tracing::instrument;

impl ShopClient {
    pub async fn fetch_terms(&self) -> ApiResult<Value> {
        self.get(Backend::Stores, "terms", Vec::new()).await
    }

    pub async fn fetch_settings(&self) -> ApiResult<Value> {
        self.get(Backend::Stores, "settings", Vec::new()).await
    }

    pub async fn fetch_refund_policy(&self) -> ApiResult<Value> {
        self.get(Backend::Stores, "refund-policy", Vec::new()).await
    }

    pub async fn fetch_privacy_policy(&self) -> ApiResult<Value> {
        self.get(Backend::Stores, "privacy-policy", Vec::new()).await
    }

    /// Product listings, optionally restricted to the given ids
    pub async fn fetch_listings(&self, ids: Option<&[String]>) -> ApiResult<Value> {
        self.get(Backend::Stores, "entities/listings", ids_query(ids))
            .await
    }

    /// Announcement posts, optionally restricted to the given ids
    pub async fn fetch_announcements(&self, ids: Option<&[String]>) -> ApiResult<Value> {
        self.get(Backend::Stores, "entities/posts", ids_query(ids)).await
    }

    /// Page metadata (title, description, images) for a store route
    #[instrument(skip(self))]
    pub async fn fetch_metadata(&self, route_name: &str, product_path: &str) -> ApiResult<Value> {
        let request = MetadataRequest {
            route_name: route_name.to_string(),
            params: MetadataParams {
                product_path: product_path.to_string(),
            },
        };
        self.post(Backend::Stores, "get-metadata", &request).await
    }
}

#[cfg(test)]
mod tests {
    use crate::testing::client_for;
    use serde_json::json;
    use wiremock::matchers::{body_json, method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    #[tokio::test]
    async fn test_documents() {
        let server = MockServer::start().await;
        for (doc, text) in [
            ("terms", "Be nice"),
            ("refund-policy", "No refunds"),
            ("privacy-policy", "We keep nothing"),
        ] {
            Mock::given(method("GET"))
                .and(path(format!("/shops/acme.example.com/{}", doc)))
                .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "content": text })))
                .mount(&server)
                .await;
        }

        let client = client_for(&server);
        assert_eq!(client.fetch_terms().await.unwrap()["content"], "Be nice");
        assert_eq!(client.fetch_refund_policy().await.unwrap()["content"], "No refunds");
        assert_eq!(
            client.fetch_privacy_policy().await.unwrap()["content"],
            "We keep nothing"
        );
    }

    #[tokio::test]
    async fn test_posts_with_ids() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/shops/acme.example.com/entities/posts"))
            .and(query_param("ids", "7"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!([{ "id": 7 }])))
            .expect(1)
            .mount(&server)
            .await;

        let ids = vec!["7".to_string(), "8".to_string()];
        let posts = client_for(&server)
            .fetch_announcements(Some(&ids))
            .await
            .unwrap();
        assert_eq!(posts[0]["id"], 7);

        let requests = server.received_requests().await.unwrap();
        assert_eq!(requests[0].url.query(), Some("ids=7&ids=8"));
    }

    #[tokio::test]
    async fn test_metadata_body() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/shops/acme.example.com/get-metadata"))
            .and(body_json(json!({
                "routeName": "product",
                "params": { "productPath": "game-key" }
            })))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "title": "Game Key" })))
            .mount(&server)
            .await;

        let metadata = client_for(&server)
            .fetch_metadata("product", "game-key")
            .await
            .unwrap();
        assert_eq!(metadata["title"], "Game Key");
    }
}
