//! Order lookups, gateway details and balance top-ups.
//!
//! Order creation and coupon validation live on the [`shop_core::ShopBackend`]
//! impl, since the checkout session drives them.

use crate::client::{Backend, ShopClient};
use serde_json::Value;
use shop_core::{parse, ApiResult, Envelope, GatewayDetail, TopUpCharge, TopUpRequest};
use tracing::{info, instrument};

impl ShopClient {
    /// Public view of an order
    pub async fn fetch_order(&self, id: &str) -> ApiResult<Value> {
        let path = format!("v1/orders/{}/{}", self.config().shop.domain, id);
        self.get(Backend::Orders, &path, Vec::new()).await
    }

    /// Full view of an order, unlocked by its access token
    pub async fn fetch_order_with_token(&self, id: &str, token: &str) -> ApiResult<Value> {
        let path = format!("v1/orders/{}/{}/{}", self.config().shop.domain, id, token);
        self.get(Backend::Orders, &path, Vec::new()).await
    }

    /// Display details for the named gateways
    #[instrument(skip(self))]
    pub async fn fetch_gateways_detail(&self, names: &[String]) -> ApiResult<Vec<GatewayDetail>> {
        let mut query = vec![("shopId".to_string(), self.config().shop.id.clone())];
        query.extend(names.iter().map(|name| ("names".to_string(), name.clone())));

        parse(self.get(Backend::Orders, "v1/gateways", query).await?)
    }

    /// Start a balance top-up; the returned charge id identifies the payment
    #[instrument(skip(self, request), fields(gateway = %request.gateway))]
    pub async fn post_balance_top_up(&self, request: &TopUpRequest) -> ApiResult<TopUpCharge> {
        let path = format!("v1/balance/top-up/{}", self.config().shop.domain);
        let charge: Envelope<TopUpCharge> =
            parse(self.post(Backend::Orders, &path, request).await?)?;

        info!("Created top-up charge: {}", charge.data.charge_id);
        Ok(charge.data)
    }
}

#[cfg(test)]
mod tests {
    use crate::testing::client_for;
    use serde_json::json;
    use shop_core::{PaymentMethod, Price, TopUpRequest};
    use wiremock::matchers::{body_json, method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    #[tokio::test]
    async fn test_fetch_order_paths() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/v1/orders/acme.example.com/ord_1"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "id": "ord_1" })))
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/v1/orders/acme.example.com/ord_1/secret"))
            .respond_with(
                ResponseTemplate::new(200).set_body_json(json!({ "id": "ord_1", "goods": [] })),
            )
            .mount(&server)
            .await;

        let client = client_for(&server);
        assert_eq!(client.fetch_order("ord_1").await.unwrap()["id"], "ord_1");

        let full = client.fetch_order_with_token("ord_1", "secret").await.unwrap();
        assert!(full["goods"].is_array());
    }

    #[tokio::test]
    async fn test_gateways_detail_query() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/v1/gateways"))
            .and(query_param("shopId", "shop-1"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!([{
                "name": "Stripe",
                "displayName": "Card",
                "logoCfImageId": "logo",
                "paymentMethods": ["BANK_CARD"]
            }])))
            .mount(&server)
            .await;

        let names = vec!["Stripe".to_string(), "Crypto".to_string()];
        let details = client_for(&server)
            .fetch_gateways_detail(&names)
            .await
            .unwrap();
        assert_eq!(details[0].payment_methods, vec![PaymentMethod::BankCard]);

        let requests = server.received_requests().await.unwrap();
        assert_eq!(
            requests[0].url.query(),
            Some("shopId=shop-1&names=Stripe&names=Crypto")
        );
    }

    #[tokio::test]
    async fn test_balance_top_up() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/v1/balance/top-up/acme.example.com"))
            .and(body_json(json!({
                "customerEmail": "buyer@example.com",
                "price": { "amount": 25.0, "currency": "USD" },
                "gateway": "Stripe"
            })))
            .respond_with(
                ResponseTemplate::new(200).set_body_json(json!({ "data": { "chargeId": "ch_1" } })),
            )
            .mount(&server)
            .await;

        let request = TopUpRequest {
            customer_email: "buyer@example.com".to_string(),
            price: Price::new(25.0, "USD"),
            gateway: "Stripe".to_string(),
        };
        let charge = client_for(&server).post_balance_top_up(&request).await.unwrap();
        assert_eq!(charge.charge_id, "ch_1");
    }
}
