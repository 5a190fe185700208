//! Subcommand implementations.

pub mod account;
pub mod cart;
pub mod catalog;
pub mod orders;
pub mod theme;
pub mod wishlist;

pub use account::AccountAction;
pub use cart::CartAction;
pub use catalog::CatalogAction;
pub use orders::OrdersAction;
pub use theme::ThemeAction;
pub use wishlist::WishlistAction;

use std::sync::Arc;

use serde::Serialize;
use thiserror::Error;

use mirrorcraft_storefront::api::ApiError;
use mirrorcraft_storefront::services::{AuthError, ContentError};
use mirrorcraft_storefront::storage::{FileStore, StorageError};
use mirrorcraft_storefront::{Storefront, StorefrontConfig, StorefrontError};

/// Errors a command can end with.
#[derive(Debug, Error)]
pub enum CliError {
    #[error(transparent)]
    Storefront(#[from] StorefrontError),

    /// Input rejected before anything ran.
    #[error("{0}")]
    Usage(String),

    /// The command ran but did not succeed.
    #[error("{0}")]
    Failed(String),
}

impl From<ApiError> for CliError {
    fn from(e: ApiError) -> Self {
        Self::Storefront(e.into())
    }
}

impl From<AuthError> for CliError {
    fn from(e: AuthError) -> Self {
        Self::Storefront(e.into())
    }
}

impl From<ContentError> for CliError {
    fn from(e: ContentError) -> Self {
        Self::Storefront(e.into())
    }
}

impl From<StorageError> for CliError {
    fn from(e: StorageError) -> Self {
        Self::Storefront(e.into())
    }
}

impl CliError {
    /// Send storefront failures to Sentry.
    pub fn report(&self) {
        if let Self::Storefront(e) = self {
            e.capture();
        }
    }
}

/// Open a file-backed session in the configured state directory.
///
/// # Errors
///
/// Returns `CliError` if the directory cannot be created or the HTTP client
/// fails to build.
pub fn open_session(config: StorefrontConfig) -> Result<Storefront, CliError> {
    let store = FileStore::open(config.state_dir.clone())?;
    tracing::debug!(dir = %store.dir().display(), "Opened state directory");
    Ok(Storefront::open(config, Arc::new(store))?)
}

/// Where command results go: human text or JSON on stdout.
pub struct Output {
    json: bool,
}

impl Output {
    #[must_use]
    pub const fn new(json: bool) -> Self {
        Self { json }
    }

    /// Print `value` as JSON in JSON mode, or `text()` otherwise.
    pub fn emit<T: Serialize + ?Sized>(&self, value: &T, text: impl FnOnce() -> String) {
        if self.json {
            match serde_json::to_string_pretty(value) {
                Ok(json) => println!("{json}"),
                Err(e) => tracing::warn!(error = %e, "Failed to encode output"),
            }
        } else {
            println!("{}", text());
        }
    }

    /// Print a one-line status message.
    pub fn status(&self, message: &str) {
        self.emit(&serde_json::json!({ "message": message }), || message.to_string());
    }
}
