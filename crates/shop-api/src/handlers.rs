//! # Request Handlers
//!
//! Axum request handlers for the cart API.
//! Every cart route locks its session for the duration of the call, so
//! operations on one cart never overlap.

use crate::state::{AppState, SharedCart};
use axum::{
    body::Bytes,
    extract::{rejection::PathRejection, FromRequestParts, Path, State},
    http::{header::AUTHORIZATION, HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};
use shop_core::{
    ApiError, CartError, CheckoutSession, Coupon, CreatedOrder, OrderRequest, PartOrder,
    ResolvedGateways, Totals,
};
use std::collections::HashMap;
use thiserror::Error;
use tracing::{error, info, instrument};
use uuid::Uuid;

// =============================================================================
// Request/Response Types
// =============================================================================

/// Open cart request
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OpenCartRequest {
    pub customer_email: String,
}

/// Catalog reload request
#[derive(Debug, Default, Deserialize)]
pub struct LoadProductsRequest {
    /// Restrict the catalog to these product ids
    #[serde(default)]
    pub ids: Option<Vec<String>>,
}

#[derive(Debug, Deserialize)]
pub struct GatewayRequest {
    pub gateway: String,
}

#[derive(Debug, Deserialize)]
pub struct CouponRequest {
    pub code: String,
}

/// Checkout form fields; absent fields are left unchanged
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FieldsRequest {
    #[serde(default)]
    pub custom_fields: Option<HashMap<String, String>>,
    #[serde(default)]
    pub discord_social_connect_id: Option<String>,
    #[serde(default)]
    pub recaptcha: Option<String>,
}

/// Everything a client needs to render a cart
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CartView {
    pub id: Uuid,
    pub shop: String,
    pub order: OrderRequest,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub coupon: Option<Coupon>,
    pub pending: bool,
    pub gateways: ResolvedGateways,
    pub totals: Totals,
    /// Amount that checkout will charge
    pub payable: f64,
    pub product_count: usize,
}

impl CartView {
    fn of(id: Uuid, shop: &str, session: &CheckoutSession) -> Self {
        let snapshot = session.snapshot();
        let totals = session.totals();
        Self {
            id,
            shop: shop.to_string(),
            gateways: session.possible_gateways(),
            payable: totals.payable(),
            totals,
            product_count: snapshot.catalog.len(),
            order: snapshot.cart.order,
            coupon: snapshot.cart.coupon,
            pending: snapshot.pending,
        }
    }
}

/// Error response
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
    pub code: u16,
}

impl ErrorResponse {
    pub fn new(error: impl Into<String>, code: u16) -> Self {
        Self {
            error: error.into(),
            code,
        }
    }
}

/// Failures of the HTTP layer
#[derive(Debug, Error)]
pub enum AppError {
    #[error("Shop not found: {0}")]
    ShopNotFound(String),

    #[error("Cart not found: {0}")]
    CartNotFound(Uuid),

    #[error("Invalid request: {0}")]
    BadRequest(String),

    #[error("Line item not in cart: {product_id}/{variant_id}")]
    LineItemNotFound { product_id: u64, variant_id: u64 },

    #[error(transparent)]
    Cart(#[from] CartError),

    #[error(transparent)]
    Api(#[from] ApiError),
}

impl AppError {
    pub fn status_code(&self) -> u16 {
        match self {
            AppError::BadRequest(_) => 400,
            AppError::ShopNotFound(_)
            | AppError::CartNotFound(_)
            | AppError::LineItemNotFound { .. } => 404,
            AppError::Cart(err) => err.status_code(),
            AppError::Api(err) => CartError::Transport(err.clone()).status_code(),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let code = self.status_code();
        if code >= 500 {
            error!("Request failed: {}", self);
        }
        let status = StatusCode::from_u16(code).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
        (status, Json(ErrorResponse::new(self.to_string(), code))).into_response()
    }
}

impl From<PathRejection> for AppError {
    fn from(rejection: PathRejection) -> Self {
        AppError::BadRequest(rejection.body_text())
    }
}

/// `Path` that reports malformed segments as an [`ErrorResponse`]
#[derive(FromRequestParts)]
#[from_request(via(Path), rejection(AppError))]
pub struct ApiPath<T>(pub T);

type HandlerResult<T> = Result<Json<T>, AppError>;

fn find_cart(state: &AppState, id: Uuid) -> Result<SharedCart, AppError> {
    state.cart(&id).ok_or(AppError::CartNotFound(id))
}

fn bearer_token(headers: &HeaderMap) -> Option<String> {
    headers
        .get(AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.strip_prefix("Bearer "))
        .map(|token| token.trim().to_string())
        .filter(|token| !token.is_empty())
}

// =============================================================================
// Handlers
// =============================================================================

/// Health check endpoint
pub async fn health(State(state): State<AppState>) -> impl IntoResponse {
    Json(serde_json::json!({
        "status": "healthy",
        "service": "storefront",
        "version": env!("CARGO_PKG_VERSION"),
        "carts": state.cart_count(),
        "time": chrono::Utc::now().to_rfc3339(),
    }))
}

/// List all served shops
pub async fn list_shops(State(state): State<AppState>) -> impl IntoResponse {
    let shops: Vec<_> = state.shops.active_shops().collect();
    Json(serde_json::json!({
        "shops": shops,
        "count": shops.len()
    }))
}

/// Get single shop info
pub async fn get_shop(
    State(state): State<AppState>,
    ApiPath(shop): ApiPath<String>,
) -> Result<impl IntoResponse, AppError> {
    let shop = state
        .shops
        .get(&shop)
        .ok_or_else(|| AppError::ShopNotFound(shop.clone()))?;

    Ok(Json(shop.clone()))
}

/// Open a cart session for a shop and load its catalog
#[instrument(skip(state, headers, request))]
pub async fn open_cart(
    State(state): State<AppState>,
    ApiPath(shop): ApiPath<String>,
    headers: HeaderMap,
    Json(request): Json<OpenCartRequest>,
) -> Result<(StatusCode, Json<CartView>), AppError> {
    let shop = state
        .shops
        .get(&shop)
        .cloned()
        .ok_or(AppError::ShopNotFound(shop))?;

    let backend = (state.backends)(&shop, bearer_token(&headers))?;
    let session = CheckoutSession::open(backend, request.customer_email).await?;

    let id = state.insert_cart(&shop, session);
    info!("Opened cart {} for shop {}", id, shop.domain);

    let cart = find_cart(&state, id)?;
    let session = cart.session.lock().await;
    Ok((
        StatusCode::CREATED,
        Json(CartView::of(id, &cart.shop, &session)),
    ))
}

/// Current cart, with derived gateways and totals
pub async fn get_cart(
    State(state): State<AppState>,
    ApiPath(id): ApiPath<Uuid>,
) -> HandlerResult<CartView> {
    let cart = find_cart(&state, id)?;
    let session = cart.session.lock().await;
    Ok(Json(CartView::of(id, &cart.shop, &session)))
}

/// Close a cart session
#[instrument(skip(state))]
pub async fn delete_cart(
    State(state): State<AppState>,
    ApiPath(id): ApiPath<Uuid>,
) -> Result<StatusCode, AppError> {
    state.remove_cart(&id).ok_or(AppError::CartNotFound(id))?;
    info!("Closed cart {}", id);
    Ok(StatusCode::NO_CONTENT)
}

/// Re-fetch the catalog
#[instrument(skip(state, body))]
pub async fn load_products(
    State(state): State<AppState>,
    ApiPath(id): ApiPath<Uuid>,
    body: Bytes,
) -> HandlerResult<CartView> {
    // The body is optional; an empty one reloads every product
    let request: LoadProductsRequest = if body.is_empty() {
        LoadProductsRequest::default()
    } else {
        serde_json::from_slice(&body).map_err(|e| AppError::BadRequest(e.to_string()))?
    };
    let cart = find_cart(&state, id)?;
    let mut session = cart.session.lock().await;

    session.load_products(request.ids.as_deref()).await?;
    Ok(Json(CartView::of(id, &cart.shop, &session)))
}

#[instrument(skip(state))]
pub async fn add_line_item(
    State(state): State<AppState>,
    ApiPath(id): ApiPath<Uuid>,
    Json(item): Json<PartOrder>,
) -> HandlerResult<CartView> {
    let cart = find_cart(&state, id)?;
    let mut session = cart.session.lock().await;

    session.add_line_item(item)?;
    Ok(Json(CartView::of(id, &cart.shop, &session)))
}

#[instrument(skip(state))]
pub async fn update_quantity(
    State(state): State<AppState>,
    ApiPath(id): ApiPath<Uuid>,
    Json(item): Json<PartOrder>,
) -> HandlerResult<CartView> {
    let cart = find_cart(&state, id)?;
    let mut session = cart.session.lock().await;

    if !session.update_quantity(item)? {
        return Err(AppError::LineItemNotFound {
            product_id: item.product_id,
            variant_id: item.product_variant_id,
        });
    }
    Ok(Json(CartView::of(id, &cart.shop, &session)))
}

#[instrument(skip(state))]
pub async fn remove_line_item(
    State(state): State<AppState>,
    ApiPath((id, product_id, variant_id)): ApiPath<(Uuid, u64, u64)>,
) -> HandlerResult<CartView> {
    let cart = find_cart(&state, id)?;
    let mut session = cart.session.lock().await;

    if !session.remove_line_item(product_id, variant_id) {
        return Err(AppError::LineItemNotFound {
            product_id,
            variant_id,
        });
    }
    Ok(Json(CartView::of(id, &cart.shop, &session)))
}

#[instrument(skip(state, request), fields(gateway = %request.gateway))]
pub async fn set_gateway(
    State(state): State<AppState>,
    ApiPath(id): ApiPath<Uuid>,
    Json(request): Json<GatewayRequest>,
) -> HandlerResult<CartView> {
    let cart = find_cart(&state, id)?;
    let mut session = cart.session.lock().await;

    session.set_gateway(&request.gateway).await?;
    Ok(Json(CartView::of(id, &cart.shop, &session)))
}

#[instrument(skip(state, request), fields(code = %request.code))]
pub async fn apply_coupon(
    State(state): State<AppState>,
    ApiPath(id): ApiPath<Uuid>,
    Json(request): Json<CouponRequest>,
) -> HandlerResult<CartView> {
    let cart = find_cart(&state, id)?;
    let mut session = cart.session.lock().await;

    session.apply_coupon(&request.code).await?;
    Ok(Json(CartView::of(id, &cart.shop, &session)))
}

pub async fn set_fields(
    State(state): State<AppState>,
    ApiPath(id): ApiPath<Uuid>,
    Json(request): Json<FieldsRequest>,
) -> HandlerResult<CartView> {
    let cart = find_cart(&state, id)?;
    let mut session = cart.session.lock().await;

    if let Some(fields) = request.custom_fields {
        session.set_custom_fields(fields);
    }
    if let Some(discord) = &request.discord_social_connect_id {
        session.set_discord_link(discord);
    }
    if let Some(recaptcha) = &request.recaptcha {
        session.set_recaptcha_token(recaptcha);
    }
    Ok(Json(CartView::of(id, &cart.shop, &session)))
}

pub async fn reset_cart(
    State(state): State<AppState>,
    ApiPath(id): ApiPath<Uuid>,
) -> HandlerResult<CartView> {
    let cart = find_cart(&state, id)?;
    let mut session = cart.session.lock().await;

    session.reset();
    Ok(Json(CartView::of(id, &cart.shop, &session)))
}

/// Submit the order. The cart is kept so a failed payment can be retried.
#[instrument(skip(state))]
pub async fn checkout(
    State(state): State<AppState>,
    ApiPath(id): ApiPath<Uuid>,
) -> Result<(StatusCode, Json<CreatedOrder>), AppError> {
    let cart = find_cart(&state, id)?;
    let mut session = cart.session.lock().await;

    let order = session.submit().await.map_err(|e| {
        error!("Failed to submit cart {}: {}", id, e);
        e
    })?;

    info!("Cart {} submitted as order {}", id, order.id);
    Ok((StatusCode::CREATED, Json(order)))
}
