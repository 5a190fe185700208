//! Order history state.
//!
//! Unlike the cart and wishlist, orders are owned by the server. The local
//! collection is a cache that `fetch_orders` replaces wholesale, and the only
//! local edit is patching an order to `Cancelled` after the server confirmed
//! the cancel.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::{Duration, Instant};

use mirrorcraft_core::{OrderId, OrderStatus};
use tracing::instrument;

use crate::api::conversions::order_from_remote;
use crate::api::types::RemoteOrder;
use crate::api::{ApiClient, ApiError, Auth, Envelope};
use crate::error::add_breadcrumb;
use crate::models::{Order, TrackingInfo};
use crate::storage::{self, SharedStore, keys};

/// What a call to [`OrderState::fetch_orders`] did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FetchOutcome {
    /// The user hid their history; nothing was fetched.
    Suppressed,
    /// A fetch ran within the debounce window; nothing was fetched.
    Debounced,
    /// No session token; nothing was fetched.
    NotAuthenticated,
    /// The collection was replaced with this many orders.
    Fetched(usize),
    /// The request failed and the collection was emptied.
    Failed,
}

#[derive(Default)]
struct OrderBook {
    orders: Vec<Order>,
    last_fetch: Option<Instant>,
}

/// The order history of one session.
#[derive(Clone)]
pub struct OrderState {
    inner: Arc<OrderInner>,
}

struct OrderInner {
    book: Mutex<OrderBook>,
    store: SharedStore,
    api: ApiClient,
    debounce: Duration,
}

impl OrderState {
    /// Create an empty order cache. Orders are never restored from storage;
    /// only the "cleared" flag is.
    #[must_use]
    pub fn new(store: SharedStore, api: ApiClient, debounce: Duration) -> Self {
        Self {
            inner: Arc::new(OrderInner {
                book: Mutex::new(OrderBook::default()),
                store,
                api,
                debounce,
            }),
        }
    }

    fn lock(&self) -> MutexGuard<'_, OrderBook> {
        self.inner.book.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Whether the user hid their order history.
    #[must_use]
    pub fn is_cleared(&self) -> bool {
        storage::load_or_default(self.inner.store.as_ref(), keys::ORDERS_CLEARED)
    }

    /// Refresh the collection from `GET /user-orders`.
    ///
    /// Checked in order: the "cleared" flag (bypassed by `force`), the
    /// debounce window (bypassed by `force`), the session token. A successful
    /// fetch clears the flag; a failed one empties the collection.
    #[instrument(skip(self))]
    pub async fn fetch_orders(&self, force: bool) -> FetchOutcome {
        if !force && self.is_cleared() {
            tracing::debug!("Order history hidden, skipping fetch");
            return FetchOutcome::Suppressed;
        }

        let previous_fetch = {
            let mut book = self.lock();
            if !force
                && book
                    .last_fetch
                    .is_some_and(|at| at.elapsed() < self.inner.debounce)
            {
                tracing::debug!("Order fetch debounced");
                return FetchOutcome::Debounced;
            }
            if !self.inner.api.has_session() {
                return FetchOutcome::NotAuthenticated;
            }
            book.last_fetch.replace(Instant::now())
        };

        let result = self
            .inner
            .api
            .get::<Envelope<Vec<RemoteOrder>>>("user-orders", Auth::Required)
            .await;

        match result {
            Ok(body) => {
                let orders: Vec<Order> = body
                    .into_inner()
                    .into_iter()
                    .filter_map(order_from_remote)
                    .collect();
                let count = orders.len();
                self.lock().orders = orders;
                if let Err(e) = self.inner.store.remove(keys::ORDERS_CLEARED) {
                    tracing::warn!(error = %e, "Failed to reset orders-cleared flag");
                }
                tracing::debug!(count, "Orders fetched");
                FetchOutcome::Fetched(count)
            }
            Err(e) => {
                tracing::warn!(error = %e, "Failed to fetch orders");
                let mut book = self.lock();
                book.orders.clear();
                book.last_fetch = previous_fetch;
                FetchOutcome::Failed
            }
        }
    }

    /// Cancel `id` with `PUT /user-orders/:id/cancel`.
    ///
    /// The local order is patched to `Cancelled` only after the server
    /// confirms. Failures are logged, reported to Sentry and leave the
    /// collection untouched.
    #[instrument(skip(self), fields(order_id = %id))]
    pub async fn cancel_order(&self, id: &OrderId) -> bool {
        let result = self
            .inner
            .api
            .put::<_, serde_json::Value>(
                &format!("user-orders/{id}/cancel"),
                &serde_json::json!({}),
                Auth::Required,
            )
            .await;

        match result {
            Ok(_) => {
                add_breadcrumb("orders", "Cancelled order", Some(&[("order_id", id.as_str())]));
                let mut book = self.lock();
                if let Some(order) = book.orders.iter_mut().find(|o| &o.id == id) {
                    order.status = OrderStatus::Cancelled;
                }
                true
            }
            Err(e) => {
                let event_id = sentry::capture_error(&e);
                tracing::error!(
                    error = %e,
                    sentry_event_id = %event_id,
                    "Failed to cancel order"
                );
                false
            }
        }
    }

    /// Hide the order history locally and remember that across restarts.
    ///
    /// The server keeps the orders; a forced fetch brings them back.
    pub fn clear_orders(&self) {
        self.lock().orders.clear();
        storage::persist(self.inner.store.as_ref(), keys::ORDERS_CLEARED, &true);
    }

    /// Carrier status for `id` from `GET /user-orders/:id/track`.
    ///
    /// # Errors
    ///
    /// Returns `ApiError` if the call fails or no session token is stored.
    #[instrument(skip(self), fields(order_id = %id))]
    pub async fn track_order(&self, id: &OrderId) -> Result<TrackingInfo, ApiError> {
        let body: Envelope<TrackingInfo> = self
            .inner
            .api
            .get(&format!("user-orders/{id}/track"), Auth::Required)
            .await?;
        Ok(body.into_inner())
    }

    /// Snapshot of the cached orders.
    #[must_use]
    pub fn orders(&self) -> Vec<Order> {
        self.lock().orders.clone()
    }

    /// A cached order by id.
    #[must_use]
    pub fn order(&self, id: &OrderId) -> Option<Order> {
        self.lock().orders.iter().find(|o| &o.id == id).cloned()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use crate::config::ApiConfig;
    use crate::session::TokenStore;
    use crate::storage::{KeyValueStore, MemoryStore};

    fn orders_over(store: &Arc<MemoryStore>) -> OrderState {
        let shared: SharedStore = store.clone();
        let api = ApiClient::new(
            &ApiConfig::new("http://127.0.0.1:9/api").unwrap(),
            TokenStore::new(shared.clone()),
        )
        .unwrap();
        OrderState::new(shared, api, Duration::from_secs(30))
    }

    #[tokio::test]
    async fn test_clear_suppresses_unforced_fetch() {
        let store = Arc::new(MemoryStore::new());
        let orders = orders_over(&store);

        orders.clear_orders();
        assert!(orders.is_cleared());
        assert_eq!(store.read(keys::ORDERS_CLEARED).unwrap().as_deref(), Some("true"));
        assert_eq!(orders.fetch_orders(false).await, FetchOutcome::Suppressed);
    }

    #[tokio::test]
    async fn test_cleared_flag_survives_reload() {
        let store = Arc::new(MemoryStore::new());
        orders_over(&store).clear_orders();

        let reloaded = orders_over(&store);
        assert_eq!(reloaded.fetch_orders(false).await, FetchOutcome::Suppressed);
    }

    #[tokio::test]
    async fn test_fetch_without_session() {
        let store = Arc::new(MemoryStore::new());
        let orders = orders_over(&store);
        assert_eq!(orders.fetch_orders(true).await, FetchOutcome::NotAuthenticated);
        assert!(orders.orders().is_empty());
    }
}
