//! Cart state.
//!
//! The cart is local-first: every mutation updates the in-memory collection
//! and rewrites the `cart` snapshot before returning. The server only learns
//! about the cart through [`CartState::mirror_to_server`], which is optional
//! and best-effort.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use mirrorcraft_core::{Money, ProductId};
use tracing::instrument;

use crate::api::types::AddToCartRequest;
use crate::api::{ApiClient, Auth};
use crate::error::add_breadcrumb;
use crate::models::{CartItem, CartProduct};
use crate::storage::{self, SharedStore, keys};

/// The shopping cart of one session.
///
/// Cheap to clone; clones share the same collection.
#[derive(Clone)]
pub struct CartState {
    inner: Arc<CartInner>,
}

struct CartInner {
    items: Mutex<Vec<CartItem>>,
    store: SharedStore,
    api: ApiClient,
}

impl CartState {
    /// Restore the cart from the `cart` snapshot.
    ///
    /// Unreadable lines, zero-quantity lines and duplicate ids (first wins) in
    /// the snapshot are dropped.
    #[must_use]
    pub fn load(store: SharedStore, api: ApiClient) -> Self {
        let stored: Vec<CartItem> = storage::load_rows(store.as_ref(), keys::CART);
        let mut items: Vec<CartItem> = Vec::with_capacity(stored.len());
        for item in stored {
            if item.quantity > 0 && !items.iter().any(|i| i.id == item.id) {
                items.push(item);
            }
        }

        Self {
            inner: Arc::new(CartInner {
                items: Mutex::new(items),
                store,
                api,
            }),
        }
    }

    fn lock(&self) -> MutexGuard<'_, Vec<CartItem>> {
        self.inner.items.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn persist(&self, items: &[CartItem]) {
        storage::persist(self.inner.store.as_ref(), keys::CART, items);
    }

    /// Add `quantity` units of `product`. A quantity of 0 counts as 1.
    ///
    /// An existing line has its quantity increased; otherwise a new line is
    /// appended.
    pub fn add_to_cart(&self, product: CartProduct, quantity: u32) {
        let quantity = quantity.max(1);
        let mut items = self.lock();

        if let Some(existing) = items.iter_mut().find(|i| i.id == product.id) {
            existing.quantity = existing.quantity.saturating_add(quantity);
        } else {
            add_breadcrumb("cart", "Added to cart", Some(&[("product_id", product.id.as_str())]));
            items.push(CartItem::new(product, quantity));
        }
        self.persist(&items);
    }

    /// Remove the line for `id`. Returns whether a line was removed.
    pub fn remove_from_cart(&self, id: &ProductId) -> bool {
        let mut items = self.lock();
        let before = items.len();
        items.retain(|i| &i.id != id);
        let removed = items.len() != before;
        if removed {
            self.persist(&items);
        }
        removed
    }

    /// Set the quantity of an existing line. Anything below 1 removes it.
    ///
    /// Unknown ids are ignored.
    pub fn update_quantity(&self, id: &ProductId, quantity: u32) {
        if quantity < 1 {
            self.remove_from_cart(id);
            return;
        }

        let mut items = self.lock();
        if let Some(item) = items.iter_mut().find(|i| &i.id == id) {
            item.quantity = quantity;
            self.persist(&items);
        }
    }

    /// Total number of units across all lines.
    #[must_use]
    pub fn total_items(&self) -> u64 {
        self.lock().iter().map(|i| u64::from(i.quantity)).sum()
    }

    /// Sum of `price × quantity` over all lines.
    #[must_use]
    pub fn total_price(&self) -> Money {
        self.lock().iter().map(CartItem::line_total).sum()
    }

    /// Empty the cart.
    pub fn clear_cart(&self) {
        let mut items = self.lock();
        items.clear();
        self.persist(&items);
    }

    /// Snapshot of the lines, in insertion order.
    #[must_use]
    pub fn items(&self) -> Vec<CartItem> {
        self.lock().clone()
    }

    /// Whether `id` has a line.
    #[must_use]
    pub fn contains(&self, id: &ProductId) -> bool {
        self.lock().iter().any(|i| &i.id == id)
    }

    /// Quantity of `id`, zero when absent.
    #[must_use]
    pub fn quantity_of(&self, id: &ProductId) -> u32 {
        self.lock()
            .iter()
            .find(|i| &i.id == id)
            .map_or(0, |i| i.quantity)
    }

    /// Tell the server about a cart line with `POST /cart/add`.
    ///
    /// Skipped when logged out. Failures are logged and never touch the
    /// local cart. Returns whether the server accepted the call.
    #[instrument(skip(self), fields(product_id = %id))]
    pub async fn mirror_to_server(&self, id: &ProductId, quantity: u32) -> bool {
        if !self.inner.api.has_session() {
            tracing::debug!("Not logged in, skipping cart mirror");
            return false;
        }

        let body = AddToCartRequest {
            product_id: id,
            quantity: quantity.max(1),
        };
        match self
            .inner
            .api
            .post::<_, serde_json::Value>("cart/add", &body, Auth::Required)
            .await
        {
            Ok(_) => true,
            Err(e) => {
                tracing::warn!(error = %e, "Failed to mirror cart line to server");
                false
            }
        }
    }
}
