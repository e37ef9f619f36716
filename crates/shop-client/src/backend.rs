//! [`ShopBackend`] over the live REST APIs.

use crate::client::{ids_query, Backend, ShopClient};
use async_trait::async_trait;
use shop_core::{
    parse, ApiResult, CouponRequest, CouponTerms, CreatedOrder, Envelope, OrderRequest, Product,
    ShopBackend,
};
use tracing::{info, instrument};

#[async_trait]
impl ShopBackend for ShopClient {
    #[instrument(skip(self))]
    async fn fetch_products(&self, ids: Option<&[String]>) -> ApiResult<Vec<Product>> {
        let body = self
            .get(Backend::Stores, "entities/products", ids_query(ids))
            .await?;
        parse(body)
    }

    #[instrument(skip(self, request), fields(coupon = %request.coupon_name, gateway = %request.gateway))]
    async fn validate_coupon(&self, request: &CouponRequest) -> ApiResult<CouponTerms> {
        let path = format!("v1/coupons/{}/validate", self.config().shop.id);
        let body = self.post(Backend::Orders, &path, request).await?;
        let terms: Envelope<CouponTerms> = parse(body)?;
        Ok(terms.data)
    }

    #[instrument(skip(self, order), fields(gateway = %order.gateway, parts = order.parts.len()))]
    async fn post_order(&self, order: &OrderRequest) -> ApiResult<CreatedOrder> {
        let path = format!("v1/orders/{}", self.config().shop.domain);
        let body = self.post(Backend::Orders, &path, order).await?;
        let created: Envelope<CreatedOrder> = parse(body)?;

        info!("Created order: id={}", created.data.id);
        Ok(created.data)
    }

    fn has_customer_token(&self) -> bool {
        self.is_authenticated()
    }
}
