//! # Customer Dashboard
//!
//! Endpoints scoped by shop id and authenticated with the customer's
//! bearer token: profile, balance, top-ups, referrals and paginated
//! order/transaction history.

use crate::client::{Backend, ShopClient};
use serde::de::DeserializeOwned;
use serde_json::Value;
use shop_core::{
    parse, ApiResult, BalanceReport, BalanceTopUpSettings, DashInfo, Envelope, GatewayDetail,
    OrderSummary, Page, Price, Referral, ReferralCode, TopUpCharge, TopUpRequest, Transaction,
    PAGE_SIZE,
};
use tracing::{debug, instrument};

/// Response header carrying the total row count of a paginated list
pub const PAGINATION_TOTAL_HEADER: &str = "x-pagination-total";

impl ShopClient {
    /// Profile of the signed-in customer. The email is remembered for top-ups.
    #[instrument(skip(self))]
    pub async fn fetch_dash_info(&self) -> ApiResult<DashInfo> {
        let info: DashInfo =
            parse(self.get(Backend::Customers, "customers/dash/info", Vec::new()).await?)?;
        self.remember_email(&info.email);
        Ok(info)
    }

    pub async fn fetch_home(&self) -> ApiResult<Value> {
        self.get(Backend::Customers, "customers/dash/dashboard/home", Vec::new())
            .await
    }

    pub async fn fetch_rewards(&self) -> ApiResult<Value> {
        self.get(Backend::Customers, "customers/rewards", Vec::new())
            .await
    }

    /// Spendable balance (real plus manual)
    pub async fn fetch_balance(&self) -> ApiResult<Price> {
        let report: BalanceReport =
            parse(self.get(Backend::Customers, "customers/balance", Vec::new()).await?)?;
        Ok(report.total())
    }

    pub async fn fetch_balance_settings(&self) -> ApiResult<BalanceTopUpSettings> {
        parse(
            self.get(
                Backend::Customers,
                "customers/balance/top-up/settings",
                Vec::new(),
            )
            .await?,
        )
    }

    /// Top-up settings, plus gateway details when top-ups are enabled
    #[instrument(skip(self))]
    pub async fn fetch_top_up_options(
        &self,
    ) -> ApiResult<(BalanceTopUpSettings, Vec<GatewayDetail>)> {
        let settings = self.fetch_balance_settings().await?;

        let gateways = match &settings {
            BalanceTopUpSettings::Enabled(_) => {
                self.fetch_gateways_detail(settings.gateways()).await?
            }
            BalanceTopUpSettings::Disabled => Vec::new(),
        };

        Ok((settings, gateways))
    }

    /// Top up the signed-in customer's balance
    ///
    /// Uses the email from the last [`fetch_dash_info`](Self::fetch_dash_info)
    /// call; empty if none was made.
    pub async fn request_top_up(
        &self,
        price: Price,
        gateway: impl Into<String>,
    ) -> ApiResult<TopUpCharge> {
        let request = TopUpRequest {
            customer_email: self.customer_email().unwrap_or_default(),
            price,
            gateway: gateway.into(),
        };
        self.post_balance_top_up(&request).await
    }

    pub async fn fetch_referral(&self) -> ApiResult<Referral> {
        let referral: Envelope<Referral> = parse(
            self.get(Backend::Customers, "customers/referral-system", Vec::new())
                .await?,
        )?;
        Ok(referral.data)
    }

    #[instrument(skip(self))]
    pub async fn signup_referral(&self, referral_code: &str) -> ApiResult<Value> {
        let body = ReferralCode {
            referral_code: referral_code.to_string(),
        };
        self.post(Backend::Customers, "customers/referral-system/signup", &body)
            .await
    }

    /// One page (1-based) of the customer's orders
    pub async fn fetch_orders(&self, page_number: u32) -> ApiResult<Page<OrderSummary>> {
        self.fetch_page("customers/orders", page_number).await
    }

    /// One page (1-based) of the customer's balance transactions
    pub async fn fetch_transactions(&self, page_number: u32) -> ApiResult<Page<Transaction>> {
        self.fetch_page("customers/balance/transactions", page_number)
            .await
    }

    #[instrument(skip(self))]
    async fn fetch_page<T: DeserializeOwned>(
        &self,
        path: &str,
        page_number: u32,
    ) -> ApiResult<Page<T>> {
        let query = vec![
            ("PageNumber".to_string(), page_number.to_string()),
            ("PageSize".to_string(), PAGE_SIZE.to_string()),
        ];
        let (headers, body) = self
            .get_with_headers(Backend::Customers, path, query)
            .await?;

        // A missing or malformed header counts as an empty list
        let total_count = headers
            .get(PAGINATION_TOTAL_HEADER)
            .and_then(|value| value.to_str().ok())
            .and_then(|value| value.trim().parse().ok())
            .unwrap_or(0);

        let page = Page {
            list: parse::<Vec<T>>(body)?,
            total_count,
        };
        debug!(
            "Fetched page {}/{} of {}: {} rows",
            page_number,
            page.page_count(),
            path,
            page.list.len()
        );

        Ok(page)
    }
}

#[cfg(test)]
mod tests {
    use crate::testing::client_for;
    use serde_json::json;
    use shop_core::{ApiError, BalanceTopUpSettings, OrderStatus, Price, TransactionStatus};
    use wiremock::matchers::{body_json, header, method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    #[tokio::test]
    async fn test_balance_sums_real_and_manual() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/shop-1/customers/balance"))
            .and(header("Authorization", "Bearer tok"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "currency": "USD",
                "manualBalance": 5,
                "realBalance": 20
            })))
            .mount(&server)
            .await;

        let client = client_for(&server);
        client.set_customer_token("tok");

        assert_eq!(client.fetch_balance().await.unwrap(), Price::new(25.0, "USD"));
    }

    #[tokio::test]
    async fn test_orders_page() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/shop-1/customers/orders"))
            .and(query_param("PageNumber", "2"))
            .and(query_param("PageSize", "10"))
            .respond_with(
                ResponseTemplate::new(200)
                    .insert_header("x-pagination-total", "11")
                    .set_body_json(json!([{
                        "id": "ord_11",
                        "status": "COMPLETED",
                        "price": { "amount": 3, "currency": "USD" },
                        "gatewayName": "Stripe",
                        "time": "2024-05-01T10:00:00Z"
                    }])),
            )
            .mount(&server)
            .await;

        let page = client_for(&server).fetch_orders(2).await.unwrap();
        assert_eq!(page.total_count, 11);
        assert_eq!(page.page_count(), 2);
        assert_eq!(page.list[0].status, OrderStatus::Completed);
    }

    #[tokio::test]
    async fn test_transactions_without_total_header() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/shop-1/customers/balance/transactions"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!([{
                "id": "6f1c2a9e-5a0b-4c53-9a52-0d6a0e3f4b11",
                "price": { "amount": 5, "currency": "USD" },
                "createdAt": "2024-05-01T10:00:00Z",
                "description": "Top-up",
                "status": "REMOVED"
            }])))
            .mount(&server)
            .await;

        let page = client_for(&server).fetch_transactions(1).await.unwrap();
        assert_eq!(page.total_count, 0);
        assert_eq!(page.list[0].status, TransactionStatus::Removed);
    }

    #[tokio::test]
    async fn test_top_up_options_fetch_gateways_when_enabled() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/shop-1/customers/balance/top-up/settings"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "isEnabled": true,
                "topUpSettings": {
                    "gateways": ["Stripe"],
                    "currency": "USD",
                    "topUpBonusEnabled": false,
                    "cashbackEnabled": true,
                    "cashbackPercent": 2
                }
            })))
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/v1/gateways"))
            .and(query_param("names", "Stripe"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!([{
                "name": "Stripe",
                "displayName": "Card",
                "logoCfImageId": "logo",
                "paymentMethods": ["BANK_CARD"]
            }])))
            .expect(1)
            .mount(&server)
            .await;

        let (settings, gateways) = client_for(&server).fetch_top_up_options().await.unwrap();
        assert!(matches!(settings, BalanceTopUpSettings::Enabled(_)));
        assert_eq!(gateways[0].display_name, "Card");
    }

    #[tokio::test]
    async fn test_top_up_options_disabled_skips_gateways() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/shop-1/customers/balance/top-up/settings"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "isEnabled": false })))
            .mount(&server)
            .await;
        Mock::given(path("/v1/gateways"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
            .expect(0)
            .mount(&server)
            .await;

        let (settings, gateways) = client_for(&server).fetch_top_up_options().await.unwrap();
        assert_eq!(settings, BalanceTopUpSettings::Disabled);
        assert!(gateways.is_empty());
    }

    #[tokio::test]
    async fn test_top_up_uses_dash_email() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/shop-1/customers/dash/info"))
            .respond_with(
                ResponseTemplate::new(200).set_body_json(json!({ "email": "buyer@example.com" })),
            )
            .mount(&server)
            .await;
        Mock::given(method("POST"))
            .and(path("/v1/balance/top-up/acme.example.com"))
            .and(body_json(json!({
                "customerEmail": "buyer@example.com",
                "price": { "amount": 10.0, "currency": "USD" },
                "gateway": "Stripe"
            })))
            .respond_with(
                ResponseTemplate::new(200).set_body_json(json!({ "data": { "chargeId": "ch_9" } })),
            )
            .mount(&server)
            .await;

        let client = client_for(&server);
        client.set_customer_token("tok");
        client.fetch_dash_info().await.unwrap();

        let charge = client
            .request_top_up(Price::new(10.0, "USD"), "Stripe")
            .await
            .unwrap();
        assert_eq!(charge.charge_id, "ch_9");
    }

    #[tokio::test]
    async fn test_referral_signup_and_info() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/shop-1/customers/referral-system/signup"))
            .and(body_json(json!({ "referralCode": "NEO" })))
            .respond_with(ResponseTemplate::new(200))
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/shop-1/customers/referral-system"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "data": { "isAvailable": true, "isActivated": false }
            })))
            .mount(&server)
            .await;

        let client = client_for(&server);
        assert!(client.signup_referral("NEO").await.unwrap().is_null());

        let referral = client.fetch_referral().await.unwrap();
        assert!(referral.is_available);
        assert!(referral.info.is_none());
    }

    #[tokio::test]
    async fn test_bad_balance_shape_is_schema_error() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/shop-1/customers/balance"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "currency": "USD" })))
            .mount(&server)
            .await;

        let err = client_for(&server).fetch_balance().await.unwrap_err();
        assert!(matches!(err, ApiError::Schema(_)));
    }
}
