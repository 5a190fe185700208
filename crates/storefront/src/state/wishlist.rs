//! Wishlist state with two-phase optimistic sync.
//!
//! Phase 1 ([`add_local`](WishlistState::add_local),
//! [`remove_local`](WishlistState::remove_local)) mutates memory and the
//! `wishlist` snapshot synchronously. Phase 2 ([`push_add`](WishlistState::push_add),
//! [`push_remove`](WishlistState::push_remove)) tells the server. The
//! combined operations run phase 2 only for a logged-in user and only when
//! phase 1 changed something; a phase 2 failure is logged and the local
//! change stands.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use mirrorcraft_core::ProductId;
use tracing::instrument;

use crate::api::conversions::wishlist_item_from_remote;
use crate::api::types::{AddToWishlistRequest, RemoteWishlist};
use crate::api::{ApiClient, ApiError, Auth, Envelope};
use crate::error::add_breadcrumb;
use crate::models::WishlistItem;
use crate::storage::{self, SharedStore, keys};

/// Result of a local wishlist add.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AddOutcome {
    /// The product was not saved before and now is.
    Added,
    /// The product was already saved; nothing changed.
    AlreadyPresent,
}

/// The wishlist of one session.
#[derive(Clone)]
pub struct WishlistState {
    inner: Arc<WishlistInner>,
}

struct WishlistInner {
    items: Mutex<Vec<WishlistItem>>,
    store: SharedStore,
    api: ApiClient,
}

impl WishlistState {
    /// Restore from the `wishlist` snapshot.
    ///
    /// Rows without any product identifier are skipped individually and
    /// duplicate product ids are dropped.
    #[must_use]
    pub fn load(store: SharedStore, api: ApiClient) -> Self {
        let stored: Vec<WishlistItem> = storage::load_rows(store.as_ref(), keys::WISHLIST);
        Self {
            inner: Arc::new(WishlistInner {
                items: Mutex::new(dedup(stored)),
                store,
                api,
            }),
        }
    }

    fn lock(&self) -> MutexGuard<'_, Vec<WishlistItem>> {
        self.inner.items.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn persist(&self, items: &[WishlistItem]) {
        storage::persist(self.inner.store.as_ref(), keys::WISHLIST, items);
    }

    // =========================================================================
    // Phase 1: local
    // =========================================================================

    /// Save `item` locally unless its product is already saved.
    pub fn add_local(&self, item: WishlistItem) -> AddOutcome {
        let mut items = self.lock();
        if items.iter().any(|i| i.product_id == item.product_id) {
            return AddOutcome::AlreadyPresent;
        }
        items.push(item);
        self.persist(&items);
        AddOutcome::Added
    }

    /// Drop `id` locally. Returns whether an entry was removed.
    pub fn remove_local(&self, id: &ProductId) -> bool {
        let mut items = self.lock();
        let before = items.len();
        items.retain(|i| &i.product_id != id);
        let removed = items.len() != before;
        if removed {
            self.persist(&items);
        }
        removed
    }

    // =========================================================================
    // Phase 2: remote
    // =========================================================================

    /// `POST /wishlist/add` for `id`.
    ///
    /// # Errors
    ///
    /// Returns `ApiError` if the call fails or no session token is stored.
    pub async fn push_add(&self, id: &ProductId) -> Result<(), ApiError> {
        let body = AddToWishlistRequest { product_id: id };
        self.inner
            .api
            .post::<_, serde_json::Value>("wishlist/add", &body, Auth::Required)
            .await?;
        Ok(())
    }

    /// `DELETE /wishlist/:id`.
    ///
    /// # Errors
    ///
    /// Returns `ApiError` if the call fails or no session token is stored.
    pub async fn push_remove(&self, id: &ProductId) -> Result<(), ApiError> {
        self.inner
            .api
            .delete::<serde_json::Value>(&format!("wishlist/{id}"), Auth::Required)
            .await?;
        Ok(())
    }

    // =========================================================================
    // Combined
    // =========================================================================

    /// Save locally, then tell the server if logged in.
    #[instrument(skip(self, item), fields(product_id = %item.product_id))]
    pub async fn add_to_wishlist(&self, item: WishlistItem) -> AddOutcome {
        let id = item.product_id.clone();
        let outcome = self.add_local(item);
        if outcome == AddOutcome::Added {
            add_breadcrumb("wishlist", "Added to wishlist", Some(&[("product_id", id.as_str())]));
            if self.inner.api.has_session()
                && let Err(e) = self.push_add(&id).await
            {
                tracing::warn!(error = %e, "Failed to add wishlist item on server, keeping local copy");
            }
        }
        outcome
    }

    /// Remove locally, then tell the server if logged in.
    #[instrument(skip(self), fields(product_id = %id))]
    pub async fn remove_from_wishlist(&self, id: &ProductId) -> bool {
        let removed = self.remove_local(id);
        if removed
            && self.inner.api.has_session()
            && let Err(e) = self.push_remove(id).await
        {
            tracing::warn!(error = %e, "Failed to remove wishlist item on server, keeping local removal");
        }
        removed
    }

    // =========================================================================
    // Reads and reconciliation
    // =========================================================================

    /// Whether `id` is saved.
    #[must_use]
    pub fn is_in_wishlist(&self, id: &ProductId) -> bool {
        self.lock().iter().any(|i| &i.product_id == id)
    }

    /// Snapshot of the saved entries.
    #[must_use]
    pub fn items(&self) -> Vec<WishlistItem> {
        self.lock().clone()
    }

    /// Number of saved entries.
    #[must_use]
    pub fn len(&self) -> usize {
        self.lock().len()
    }

    /// Whether nothing is saved.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }

    /// Replace the local entries with the server's, via `GET /wishlist`.
    ///
    /// A failed request empties the collection (and its snapshot), like a
    /// failed order fetch. Without a session token nothing is sent and the
    /// local entries stay.
    ///
    /// # Errors
    ///
    /// Returns `ApiError` if the call fails or no session token is stored.
    #[instrument(skip(self))]
    pub async fn fetch_wishlist(&self) -> Result<usize, ApiError> {
        let remote = match self
            .inner
            .api
            .get::<Envelope<RemoteWishlist>>("wishlist", Auth::Required)
            .await
        {
            Ok(body) => body.into_inner(),
            Err(ApiError::NotAuthenticated) => return Err(ApiError::NotAuthenticated),
            Err(e) => {
                tracing::warn!(error = %e, "Failed to fetch wishlist");
                let mut items = self.lock();
                items.clear();
                self.persist(&items);
                return Err(e);
            }
        };

        let fetched = dedup(
            remote
                .into_entries()
                .into_iter()
                .filter_map(wishlist_item_from_remote)
                .collect(),
        );

        let mut items = self.lock();
        *items = fetched;
        self.persist(&items);
        tracing::debug!(count = items.len(), "Wishlist replaced from server");
        Ok(items.len())
    }

    /// Drop every entry locally.
    pub fn clear_wishlist(&self) {
        let mut items = self.lock();
        items.clear();
        self.persist(&items);
    }
}

/// Keep the first entry per product id.
fn dedup(entries: Vec<WishlistItem>) -> Vec<WishlistItem> {
    let mut kept: Vec<WishlistItem> = Vec::with_capacity(entries.len());
    for entry in entries {
        if !kept.iter().any(|k| k.product_id == entry.product_id) {
            kept.push(entry);
        }
    }
    kept
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::sync::Arc;

    use mirrorcraft_core::Money;

    use super::*;
    use crate::config::ApiConfig;
    use crate::session::TokenStore;
    use crate::storage::{KeyValueStore, MemoryStore};

    fn wishlist_over(store: &Arc<MemoryStore>) -> WishlistState {
        let shared: SharedStore = store.clone();
        let api = ApiClient::new(
            &ApiConfig::new("http://127.0.0.1:9/api").unwrap(),
            TokenStore::new(shared.clone()),
        )
        .unwrap();
        WishlistState::load(shared, api)
    }

    fn item(id: &str) -> WishlistItem {
        WishlistItem::new(ProductId::new(id), format!("Mirror {id}"), Money::from_major(100))
    }

    #[test]
    fn test_add_local_is_idempotent() {
        let store = Arc::new(MemoryStore::new());
        let wishlist = wishlist_over(&store);

        assert_eq!(wishlist.add_local(item("p1")), AddOutcome::Added);
        assert_eq!(wishlist.add_local(item("p1")), AddOutcome::AlreadyPresent);
        assert_eq!(wishlist.len(), 1);
    }

    #[test]
    fn test_remove_local() {
        let store = Arc::new(MemoryStore::new());
        let wishlist = wishlist_over(&store);
        let id = ProductId::new("p1");
        wishlist.add_local(item("p1"));

        assert!(wishlist.remove_local(&id));
        assert!(!wishlist.remove_local(&id));
        assert!(!wishlist.is_in_wishlist(&id));
    }

    #[test]
    fn test_restores_legacy_identifier_shapes() {
        let store = Arc::new(MemoryStore::new());
        store
            .write(
                keys::WISHLIST,
                r#"[{"_id":"p1","title":"A"},{"productId":"p2","title":"B"},{"id":"p1","title":"dup"}]"#,
            )
            .unwrap();

        let wishlist = wishlist_over(&store);
        assert_eq!(wishlist.len(), 2);
        assert!(wishlist.is_in_wishlist(&ProductId::new("p1")));
        assert!(wishlist.is_in_wishlist(&ProductId::new("p2")));
    }

    #[test]
    fn test_row_without_identifier_does_not_drop_the_rest() {
        let store = Arc::new(MemoryStore::new());
        store
            .write(
                keys::WISHLIST,
                r#"[{"productId":"p1","title":"A"},{"title":"no id"},{"_id":"p2","title":"B"}]"#,
            )
            .unwrap();

        let wishlist = wishlist_over(&store);
        assert_eq!(wishlist.len(), 2);
        assert!(wishlist.is_in_wishlist(&ProductId::new("p1")));
        assert!(wishlist.is_in_wishlist(&ProductId::new("p2")));
    }

    #[tokio::test]
    async fn test_logged_out_add_stays_local() {
        let store = Arc::new(MemoryStore::new());
        let wishlist = wishlist_over(&store);

        assert_eq!(wishlist.add_to_wishlist(item("p1")).await, AddOutcome::Added);
        assert!(wishlist.remove_from_wishlist(&ProductId::new("p1")).await);
        assert!(wishlist.is_empty());
        assert_eq!(store.read(keys::WISHLIST).unwrap().as_deref(), Some("[]"));
    }

    #[tokio::test]
    async fn test_fetch_without_session_keeps_local() {
        let store = Arc::new(MemoryStore::new());
        let wishlist = wishlist_over(&store);
        wishlist.add_local(item("p1"));

        let result = wishlist.fetch_wishlist().await;
        assert!(matches!(result, Err(ApiError::NotAuthenticated)));
        assert_eq!(wishlist.len(), 1);
    }
}
