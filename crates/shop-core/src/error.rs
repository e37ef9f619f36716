//! # Storefront Error Types
//!
//! Typed error handling for the storefront checkout core.
//!
//! Two layers:
//! - `ApiError` is raised at the network boundary by the REST client.
//! - `CartError` is raised by cart mutations and checkout operations. Backend
//!   failures reach it unchanged through `CartError::Transport`.

use thiserror::Error;

/// Errors produced while talking to the shop backends
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ApiError {
    /// Missing or malformed client configuration
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// Request never produced an HTTP response
    #[error("Network error: {0}")]
    Network(String),

    /// The customer token was rejected
    #[error("Unauthorized error, token might be invalid")]
    Unauthorized,

    /// The backend does not know the requested method
    #[error("The server error, method not found: {path}")]
    NotFound { path: String },

    /// Any other non-success status, with the backend's message if it sent one
    #[error("HTTP {status}: {message}")]
    Http { status: u16, message: String },

    /// The response did not match the expected shape
    #[error("Schema error: {0}")]
    Schema(String),
}

impl ApiError {
    /// Returns the HTTP status code appropriate for this error
    pub fn status_code(&self) -> u16 {
        match self {
            ApiError::Configuration(_) => 500,
            ApiError::Network(_) => 502,
            ApiError::Unauthorized => 401,
            ApiError::NotFound { .. } => 404,
            ApiError::Http { status, .. } => *status,
            ApiError::Schema(_) => 502,
        }
    }
}

/// Result type alias for backend calls
pub type ApiResult<T> = Result<T, ApiError>;

/// Errors produced by cart mutations, coupon validation and checkout
#[derive(Debug, Clone, PartialEq, Error)]
pub enum CartError {
    /// Product missing from the catalog cache
    #[error("Product does not exist: {product_id}")]
    ProductNotFound { product_id: u64 },

    /// Variant missing from its product
    #[error("Variant does not exist: {product_id}/{variant_id}")]
    VariantNotFound { product_id: u64, variant_id: u64 },

    #[error("Not enough quantity available for {product_id}/{variant_id}: available {available}, requested {requested}")]
    InsufficientStock {
        product_id: u64,
        variant_id: u64,
        available: u64,
        requested: u64,
    },

    #[error("Product with same ID and VariantID already exists in the cart: {product_id}/{variant_id}")]
    DuplicateItem { product_id: u64, variant_id: u64 },

    #[error("No common payment gateways available")]
    NoCommonGateway,

    #[error("There should be a gateway for the coupon")]
    MissingGateway,

    #[error("Coupon {code} can't be applied to such products")]
    CouponNotApplicable { code: String },

    /// Backend failure, passed through as-is
    #[error(transparent)]
    Transport(#[from] ApiError),
}

impl CartError {
    /// True for the catalog lookup failures
    pub fn is_not_found(&self) -> bool {
        matches!(
            self,
            CartError::ProductNotFound { .. } | CartError::VariantNotFound { .. }
        )
    }

    /// Returns the HTTP status code appropriate for this error
    pub fn status_code(&self) -> u16 {
        match self {
            CartError::ProductNotFound { .. } | CartError::VariantNotFound { .. } => 404,
            CartError::InsufficientStock { .. } | CartError::DuplicateItem { .. } => 409,
            CartError::NoCommonGateway | CartError::CouponNotApplicable { .. } => 422,
            CartError::MissingGateway => 400,
            CartError::Transport(err) => match err.status_code() {
                status @ 400..=599 => status,
                _ => 502,
            },
        }
    }
}

/// Result type alias for cart operations
pub type CartResult<T> = Result<T, CartError>;
