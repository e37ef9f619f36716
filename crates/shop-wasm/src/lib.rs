//! # shop-wasm
//!
//! WebAssembly bindings for storefront-rs.
//!
//! Lets a browser embed preview cart math without a server round trip:
//! - Which gateways can pay for the cart
//! - Subtotal and coupon-adjusted total
//! - Line item validation against the loaded catalog
//!
//! ## Usage (JavaScript)
//!
//! ```javascript
//! import init, { resolve_gateways, compute_totals } from 'storefront-wasm';
//!
//! await init();
//!
//! const items = [{ productId: 1, productVariantId: 10, quantity: 2 }];
//! const { available, requiresAuth } = resolve_gateways(items, products, false);
//! const { total, totalWithDiscount } = compute_totals(items, products, coupon);
//! ```
//!
//! ## Building
//!
//! ```bash
//! wasm-pack build --target web
//! ```

use serde::Deserialize;
use shop_core::{Catalog, CartResult, Coupon, PartOrder, Price, Product, ResolvedGateways, Totals};
use wasm_bindgen::prelude::*;

/// Coupon as a browser holds it: the code plus the backend's terms
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct CouponInput {
    code: String,
    #[serde(flatten)]
    terms: shop_core::CouponTerms,
}

fn from_js<T: for<'de> Deserialize<'de>>(value: JsValue, what: &str) -> Result<T, JsValue> {
    serde_wasm_bindgen::from_value(value)
        .map_err(|e| JsValue::from_str(&format!("Invalid {}: {}", what, e)))
}

fn to_js<T: serde::Serialize>(value: &T) -> Result<JsValue, JsValue> {
    value
        .serialize(&serde_wasm_bindgen::Serializer::json_compatible())
        .map_err(|e| JsValue::from_str(&e.to_string()))
}

fn resolve(items: &[PartOrder], products: Vec<Product>, authenticated: bool) -> ResolvedGateways {
    shop_core::resolve_gateways(items, &Catalog::new(products), authenticated)
}

fn totals(items: &[PartOrder], products: Vec<Product>, coupon: Option<CouponInput>) -> Totals {
    let coupon = coupon.map(|c| Coupon::new(c.code, c.terms));
    shop_core::compute_totals(items, &Catalog::new(products), coupon.as_ref())
}

fn check(item: &PartOrder, products: Vec<Product>) -> CartResult<()> {
    shop_core::validate_line_item(&Catalog::new(products), item).map(|_| ())
}

/// Gateways that can pay for every item (`{available, requiresAuth}`)
#[wasm_bindgen]
pub fn resolve_gateways(
    items: JsValue,
    products: JsValue,
    authenticated: bool,
) -> Result<JsValue, JsValue> {
    let items: Vec<PartOrder> = from_js(items, "cart items")?;
    let products: Vec<Product> = from_js(products, "products")?;
    to_js(&resolve(&items, products, authenticated))
}

/// Cart totals (`{total, totalWithDiscount?}`); `coupon` may be null
#[wasm_bindgen]
pub fn compute_totals(
    items: JsValue,
    products: JsValue,
    coupon: JsValue,
) -> Result<JsValue, JsValue> {
    let items: Vec<PartOrder> = from_js(items, "cart items")?;
    let products: Vec<Product> = from_js(products, "products")?;
    let coupon: Option<CouponInput> = if coupon.is_null() || coupon.is_undefined() {
        None
    } else {
        Some(from_js(coupon, "coupon")?)
    };
    to_js(&totals(&items, products, coupon))
}

/// Check one line item against the catalog; throws the cart error message
#[wasm_bindgen]
pub fn validate_line_item(item: JsValue, products: JsValue) -> Result<(), JsValue> {
    let item: PartOrder = from_js(item, "cart item")?;
    let products: Vec<Product> = from_js(products, "products")?;
    check(&item, products).map_err(|e| JsValue::from_str(&e.to_string()))
}

/// Format an amount for display (e.g., "10.50 USD")
#[wasm_bindgen]
pub fn format_price(amount: f64, currency: &str) -> String {
    Price::new(amount, currency).display()
}

/// Log to browser console
#[wasm_bindgen]
pub fn log(message: &str) {
    web_sys::console::log_1(&JsValue::from_str(message));
}

/// Get library version
#[wasm_bindgen]
pub fn version() -> String {
    env!("CARGO_PKG_VERSION").to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use shop_core::{CartError, Variant};

    fn products() -> Vec<Product> {
        vec![
            Product::new(1, "Game Key").with_variant(
                Variant::new(10, "Steam", Price::new(10.0, "USD"), 5)
                    .with_gateway("Stripe")
                    .with_gateway("Balance"),
            ),
            Product::new(2, "Gift Card").with_variant(
                Variant::new(20, "Digital", Price::new(2.5, "USD"), 1).with_gateway("Stripe"),
            ),
        ]
    }

    #[test]
    fn test_resolve_for_guest() {
        let items = vec![PartOrder::new(1, 10, 1), PartOrder::new(2, 20, 1)];
        let resolved = resolve(&items, products(), false);

        assert_eq!(resolved.available, vec!["Stripe"]);
        assert!(resolved.requires_auth.is_empty());
    }

    #[test]
    fn test_totals_with_coupon_json() {
        let coupon: CouponInput = serde_json::from_value(json!({
            "code": "FIVE",
            "isFixed": true,
            "discount": 5
        }))
        .unwrap();
        let items = vec![PartOrder::new(1, 10, 2), PartOrder::new(2, 20, 1)];

        let totals = totals(&items, products(), Some(coupon));
        assert_eq!(totals.total, 22.5);
        assert_eq!(totals.total_with_discount, Some(17.5));
    }

    #[test]
    fn test_check_reports_stock() {
        assert!(check(&PartOrder::new(2, 20, 1), products()).is_ok());
        assert_eq!(
            check(&PartOrder::new(2, 20, 3), products()),
            Err(CartError::InsufficientStock {
                product_id: 2,
                variant_id: 20,
                available: 1,
                requested: 3
            })
        );
    }

    #[test]
    fn test_format_price() {
        assert_eq!(format_price(19.99, "USD"), "19.99 USD");
        assert_eq!(format_price(1.0, "EUR"), "1.00 EUR");
    }
}
