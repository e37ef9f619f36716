//! # Checkout Session
//!
//! One customer's cart, the catalog it is validated against and the pending
//! flag, owned by a single writer and published to any number of readers.
//!
//! Each change replaces the published [`SessionSnapshot`] as a whole, so a
//! reader never observes a half-applied mutation. Async operations borrow the
//! session mutably, which keeps them from overlapping on one owner; hosts that
//! share a session between tasks put it behind an async mutex.

use crate::backend::BoxedShopBackend;
use crate::cart::CartState;
use crate::catalog::{Catalog, Product};
use crate::coupon::Coupon;
use crate::error::{CartError, CartResult};
use crate::gateway::ResolvedGateways;
use crate::order::{CouponRequest, CreatedOrder, PartOrder};
use crate::pricing::Totals;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::watch;
use tracing::{debug, info, instrument, warn};

/// Everything a UI needs to render the cart
#[derive(Debug, Clone, PartialEq)]
pub struct SessionSnapshot {
    pub cart: CartState,
    pub catalog: Arc<Catalog>,
    /// True while a backend call is in flight
    pub pending: bool,
}

impl SessionSnapshot {
    fn empty(customer_email: &str) -> Self {
        Self {
            cart: CartState::new(customer_email),
            catalog: Arc::new(Catalog::default()),
            pending: false,
        }
    }
}

pub struct CheckoutSession {
    backend: BoxedShopBackend,
    state: watch::Sender<SessionSnapshot>,
}

impl CheckoutSession {
    /// Create a session with an empty cart and catalog
    pub fn new(backend: BoxedShopBackend, customer_email: impl Into<String>) -> Self {
        let customer_email = customer_email.into();
        let (state, _) = watch::channel(SessionSnapshot::empty(&customer_email));
        Self { backend, state }
    }

    /// Create a session and load the catalog
    pub async fn open(
        backend: BoxedShopBackend,
        customer_email: impl Into<String>,
    ) -> CartResult<Self> {
        let mut session = Self::new(backend, customer_email);
        session.load_products(None).await?;
        Ok(session)
    }

    /// Receive every published snapshot
    pub fn subscribe(&self) -> watch::Receiver<SessionSnapshot> {
        self.state.subscribe()
    }

    pub fn snapshot(&self) -> SessionSnapshot {
        self.state.borrow().clone()
    }

    pub fn cart(&self) -> CartState {
        self.state.borrow().cart.clone()
    }

    pub fn catalog(&self) -> Arc<Catalog> {
        Arc::clone(&self.state.borrow().catalog)
    }

    pub fn coupon(&self) -> Option<Coupon> {
        self.state.borrow().cart.coupon.clone()
    }

    pub fn is_pending(&self) -> bool {
        self.state.borrow().pending
    }

    fn authenticated(&self) -> bool {
        self.backend.has_customer_token()
    }

    fn set_pending(&self, pending: bool) {
        self.state.send_if_modified(|snapshot| {
            let changed = snapshot.pending != pending;
            snapshot.pending = pending;
            changed
        });
    }

    /// Apply `change` to a copy of the cart and publish it only on success
    fn mutate<T>(
        &mut self,
        change: impl FnOnce(&mut CartState, &Catalog, bool) -> CartResult<T>,
    ) -> CartResult<T> {
        let authenticated = self.authenticated();
        let (mut next, catalog) = {
            let current = self.state.borrow();
            (current.cart.clone(), Arc::clone(&current.catalog))
        };

        let output = change(&mut next, &catalog, authenticated)?;
        self.state.send_modify(|snapshot| snapshot.cart = next);
        Ok(output)
    }

    /// Fetch products and replace the catalog wholesale
    #[instrument(skip(self))]
    pub async fn load_products(&mut self, ids: Option<&[String]>) -> CartResult<Vec<Product>> {
        self.set_pending(true);
        let result = self.backend.fetch_products(ids).await;

        match result {
            Ok(products) => {
                info!("Loaded {} products", products.len());
                let catalog = Arc::new(Catalog::new(products.clone()));
                self.state.send_modify(|snapshot| {
                    snapshot.catalog = catalog;
                    snapshot.pending = false;
                });
                Ok(products)
            }
            Err(err) => {
                warn!("Failed to load products: {}", err);
                self.set_pending(false);
                Err(err.into())
            }
        }
    }

    pub fn add_line_item(&mut self, item: PartOrder) -> CartResult<()> {
        debug!(
            "Adding {}/{} x{}",
            item.product_id, item.product_variant_id, item.quantity
        );
        self.mutate(|cart, catalog, authenticated| cart.add_line_item(catalog, item, authenticated))
    }

    /// Returns false if the pair was not in the cart
    pub fn remove_line_item(&mut self, product_id: u64, variant_id: u64) -> bool {
        self.mutate(|cart, _, _| Ok(cart.remove_line_item(product_id, variant_id)))
            .unwrap_or(false)
    }

    /// Returns false if the pair was not in the cart
    pub fn update_quantity(&mut self, item: PartOrder) -> CartResult<bool> {
        self.mutate(|cart, catalog, _| cart.update_quantity(catalog, item))
    }

    /// Choose a gateway. A previously applied coupon is validated again for
    /// the new gateway; if that fails the coupon stays removed and the error
    /// is returned.
    #[instrument(skip(self))]
    pub async fn set_gateway(&mut self, gateway: &str) -> CartResult<()> {
        let previous_coupon = self.mutate(|cart, _, _| Ok(cart.set_gateway(gateway)))?;

        if let Some(code) = previous_coupon {
            debug!("Re-validating coupon {} for gateway {}", code, gateway);
            self.apply_coupon(&code).await?;
        }

        Ok(())
    }

    /// Validate a coupon for the chosen gateway and the current cart.
    ///
    /// The code is written to the order only once the backend accepted it.
    #[instrument(skip(self))]
    pub async fn apply_coupon(&mut self, code: &str) -> CartResult<Coupon> {
        let cart = self.cart();
        let gateway = cart.gateway().ok_or(CartError::MissingGateway)?.to_string();
        let product_ids = cart.order.product_ids();

        let request = CouponRequest {
            gateway,
            coupon_name: code.to_string(),
            product_ids,
        };

        self.set_pending(true);
        let result = self.backend.validate_coupon(&request).await;
        self.set_pending(false);

        let terms = result?;
        if !terms.covers(&request.product_ids) {
            warn!("Coupon {} is restricted to other products", code);
            return Err(CartError::CouponNotApplicable {
                code: code.to_string(),
            });
        }

        let coupon = Coupon::new(code, terms);
        let accepted = coupon.clone();
        self.mutate(move |cart, _, _| {
            cart.accept_coupon(accepted);
            Ok(())
        })?;

        info!("Applied coupon {}", code);
        Ok(coupon)
    }

    pub fn set_custom_fields(&mut self, fields: HashMap<String, String>) {
        self.state.send_modify(|snapshot| snapshot.cart.set_custom_fields(fields));
    }

    pub fn set_discord_link(&mut self, id: &str) {
        self.state.send_modify(|snapshot| snapshot.cart.set_discord_link(id));
    }

    pub fn set_recaptcha_token(&mut self, token: &str) {
        self.state.send_modify(|snapshot| snapshot.cart.set_recaptcha_token(token));
    }

    /// Empty the cart and drop the coupon. The catalog is kept.
    pub fn reset(&mut self) {
        self.state.send_modify(|snapshot| snapshot.cart.reset());
    }

    pub fn possible_gateways(&self) -> ResolvedGateways {
        let snapshot = self.state.borrow();
        snapshot.cart.gateways(&snapshot.catalog, self.authenticated())
    }

    pub fn totals(&self) -> Totals {
        let snapshot = self.state.borrow();
        snapshot.cart.totals(&snapshot.catalog)
    }

    /// Send the current order. The cart is left as is; call [`reset`] after
    /// a successful submission if the cart should start over.
    ///
    /// [`reset`]: CheckoutSession::reset
    #[instrument(skip(self))]
    pub async fn submit(&mut self) -> CartResult<CreatedOrder> {
        let order = self.cart().order;

        self.set_pending(true);
        let result = self.backend.post_order(&order).await;
        self.set_pending(false);

        let created = result?;
        info!("Created order {}", created.id);
        Ok(created)
    }
}
