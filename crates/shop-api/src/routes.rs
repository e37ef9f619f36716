//! # Routes
//!
//! Axum router configuration for the cart API.

use crate::handlers;
use crate::state::AppState;
use axum::{
    routing::{delete, get, post, put},
    Router,
};
use tower::ServiceBuilder;
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};

/// Create the main application router
///
/// Routes:
/// - Shops:
///   - GET  /api/v1/shops - List all shops
///   - GET  /api/v1/shops/{shop} - Get shop info
///   - POST /api/v1/{shop}/carts - Open a cart session
///
/// - Carts:
///   - GET    /api/v1/carts/{id} - Cart, gateways and totals
///   - DELETE /api/v1/carts/{id} - Close the session
///   - POST   /api/v1/carts/{id}/products - Reload catalog
///   - POST   /api/v1/carts/{id}/items - Add line item
///   - PATCH  /api/v1/carts/{id}/items - Change quantity
///   - DELETE /api/v1/carts/{id}/items/{product_id}/{variant_id} - Remove line item
///   - PUT    /api/v1/carts/{id}/gateway - Choose gateway
///   - POST   /api/v1/carts/{id}/coupon - Apply coupon
///   - PUT    /api/v1/carts/{id}/fields - Custom fields, discord, recaptcha
///   - POST   /api/v1/carts/{id}/reset - Empty the cart
///   - POST   /api/v1/carts/{id}/checkout - Submit the order
pub fn create_router(state: AppState) -> Router {
    // Storefronts embed the cart from their own domains
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    let shop_routes = Router::new()
        .route("/shops", get(handlers::list_shops))
        .route("/shops/{shop}", get(handlers::get_shop))
        .route("/{shop}/carts", post(handlers::open_cart));

    let cart_routes = Router::new()
        .route(
            "/{id}",
            get(handlers::get_cart).delete(handlers::delete_cart),
        )
        .route("/{id}/products", post(handlers::load_products))
        .route(
            "/{id}/items",
            post(handlers::add_line_item).patch(handlers::update_quantity),
        )
        .route(
            "/{id}/items/{product_id}/{variant_id}",
            delete(handlers::remove_line_item),
        )
        .route("/{id}/gateway", put(handlers::set_gateway))
        .route("/{id}/coupon", post(handlers::apply_coupon))
        .route("/{id}/fields", put(handlers::set_fields))
        .route("/{id}/reset", post(handlers::reset_cart))
        .route("/{id}/checkout", post(handlers::checkout));

    let api_routes = Router::new()
        .nest("/carts", cart_routes)
        .merge(shop_routes);

    Router::new()
        .route("/health", get(handlers::health))
        .route("/", get(handlers::health))
        .nest("/api/v1", api_routes)
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(cors),
        )
        .with_state(state)
}
