//! Session state shared across the client.
//!
//! A [`Storefront`] owns one API client, one persisted store and every
//! state manager built over them. Nothing is global: two sessions over two
//! stores are fully independent.

mod cart;
mod orders;
mod theme;
mod wishlist;

pub use cart::CartState;
pub use orders::{FetchOutcome, OrderState};
pub use theme::ThemeState;
pub use wishlist::{AddOutcome, WishlistState};

use std::sync::Arc;

use tracing::instrument;

use crate::api::{ApiClient, ApiError};
use crate::config::StorefrontConfig;
use crate::services::{AuthService, CatalogService, ContentService};
use crate::session::TokenStore;
use crate::storage::SharedStore;

/// One client session.
///
/// This struct is cheaply cloneable via `Arc`; clones share every manager.
#[derive(Clone)]
pub struct Storefront {
    inner: Arc<StorefrontInner>,
}

struct StorefrontInner {
    config: StorefrontConfig,
    store: SharedStore,
    api: ApiClient,
    cart: CartState,
    wishlist: WishlistState,
    orders: OrderState,
    theme: ThemeState,
    auth: AuthService,
    catalog: CatalogService,
    content: ContentService,
}

/// What [`Storefront::start`] reconciled.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct StartReport {
    /// A live session token was found.
    pub logged_in: bool,
    /// The profile was refreshed from the server.
    pub profile_loaded: bool,
    /// Number of wishlist entries fetched, if the fetch succeeded.
    pub wishlist_entries: Option<usize>,
}

impl Storefront {
    /// Build every manager over `store`, restoring persisted snapshots.
    ///
    /// # Errors
    ///
    /// Returns `ApiError::Http` if the HTTP client fails to build.
    pub fn open(config: StorefrontConfig, store: SharedStore) -> Result<Self, ApiError> {
        let tokens = TokenStore::new(store.clone());
        let api = ApiClient::new(&config.api, tokens)?;

        let cart = CartState::load(store.clone(), api.clone());
        let wishlist = WishlistState::load(store.clone(), api.clone());
        let orders = OrderState::new(store.clone(), api.clone(), config.orders_debounce);
        let theme = ThemeState::load(store.clone());
        let auth = AuthService::new(api.clone());
        let catalog = CatalogService::new(api.clone(), config.catalog_cache_ttl);
        let content = ContentService::new(api.clone());

        Ok(Self {
            inner: Arc::new(StorefrontInner {
                config,
                store,
                api,
                cart,
                wishlist,
                orders,
                theme,
                auth,
                catalog,
                content,
            }),
        })
    }

    /// Session-start reconciliation.
    ///
    /// When a live token is stored, refresh the profile and replace the local
    /// wishlist with the server's. A failed profile refresh keeps the cached
    /// profile; a failed wishlist read leaves the wishlist empty.
    #[instrument(skip(self))]
    pub async fn start(&self) -> StartReport {
        if !self.inner.auth.is_logged_in() {
            return StartReport::default();
        }

        let profile_loaded = match self.inner.auth.fetch_profile().await {
            Ok(_) => true,
            Err(e) => {
                tracing::warn!(error = %e, "Failed to refresh profile at session start");
                false
            }
        };
        let wishlist_entries = self.inner.wishlist.fetch_wishlist().await.ok();

        StartReport {
            logged_in: true,
            profile_loaded,
            wishlist_entries,
        }
    }

    /// Get a reference to the client configuration.
    #[must_use]
    pub fn config(&self) -> &StorefrontConfig {
        &self.inner.config
    }

    /// Get a reference to the persisted store.
    #[must_use]
    pub fn store(&self) -> &SharedStore {
        &self.inner.store
    }

    /// Get a reference to the API client.
    #[must_use]
    pub fn api(&self) -> &ApiClient {
        &self.inner.api
    }

    #[must_use]
    pub fn cart(&self) -> &CartState {
        &self.inner.cart
    }

    #[must_use]
    pub fn wishlist(&self) -> &WishlistState {
        &self.inner.wishlist
    }

    #[must_use]
    pub fn orders(&self) -> &OrderState {
        &self.inner.orders
    }

    #[must_use]
    pub fn theme(&self) -> &ThemeState {
        &self.inner.theme
    }

    #[must_use]
    pub fn auth(&self) -> &AuthService {
        &self.inner.auth
    }

    #[must_use]
    pub fn catalog(&self) -> &CatalogService {
        &self.inner.catalog
    }

    #[must_use]
    pub fn content(&self) -> &ContentService {
        &self.inner.content
    }
}
