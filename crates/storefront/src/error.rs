//! Unified error handling with Sentry integration.
//!
//! Each layer has its own error enum; [`StorefrontError`] collects them for
//! callers that drive several layers at once (the CLI, session start-up).

use thiserror::Error;

use crate::api::ApiError;
use crate::config::ConfigError;
use crate::services::{AuthError, ContentError};
use crate::storage::StorageError;

/// Top-level error type for the storefront client.
#[derive(Debug, Error)]
pub enum StorefrontError {
    /// Configuration could not be loaded.
    #[error("Config error: {0}")]
    Config(#[from] ConfigError),

    /// The persisted store failed.
    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),

    /// A remote API call failed.
    #[error("API error: {0}")]
    Api(#[from] ApiError),

    /// Authentication operation failed.
    #[error("Auth error: {0}")]
    Auth(#[from] AuthError),

    /// Content operation failed.
    #[error("Content error: {0}")]
    Content(#[from] ContentError),

    /// Resource not found.
    #[error("Not found: {0}")]
    NotFound(String),
}

impl StorefrontError {
    /// Report to Sentry if this is worth an alert.
    ///
    /// Validation problems and "not found" are user errors and are skipped.
    pub fn capture(&self) {
        let reportable = match self {
            Self::Config(_) | Self::Storage(_) => true,
            Self::Api(e) => !matches!(e, ApiError::NotAuthenticated | ApiError::Unauthorized(_)),
            Self::Auth(AuthError::Api(_)) | Self::Content(ContentError::Api(_)) => true,
            Self::Auth(_) | Self::Content(_) | Self::NotFound(_) => false,
        };
        if reportable {
            let event_id = sentry::capture_error(self);
            tracing::error!(error = %self, sentry_event_id = %event_id, "Storefront error");
        }
    }
}

/// Set the Sentry user context from a user ID.
///
/// Call this after successful authentication to associate errors with users.
pub fn set_sentry_user(user_id: &impl ToString, email: Option<&str>) {
    sentry::configure_scope(|scope| {
        scope.set_user(Some(sentry::User {
            id: Some(user_id.to_string()),
            email: email.map(String::from),
            ..Default::default()
        }));
    });
}

/// Clear the Sentry user context.
pub fn clear_sentry_user() {
    sentry::configure_scope(|scope| {
        scope.set_user(None);
    });
}

/// Add a breadcrumb for a state change.
///
/// Breadcrumbs appear in Sentry reports to show the trail of cart, wishlist
/// and order actions leading up to an error.
///
/// ```rust,ignore
/// add_breadcrumb("cart", "Added to cart", Some(&[("product_id", "p-123")]));
/// ```
pub fn add_breadcrumb(category: &str, message: &str, data: Option<&[(&str, &str)]>) {
    let mut breadcrumb = sentry::Breadcrumb {
        category: Some(category.to_string()),
        message: Some(message.to_string()),
        level: sentry::Level::Info,
        ..Default::default()
    };

    if let Some(pairs) = data {
        for (key, value) in pairs {
            breadcrumb.data.insert(
                (*key).to_string(),
                serde_json::Value::String((*value).to_string()),
            );
        }
    }

    sentry::add_breadcrumb(breadcrumb);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_storefront_error_display() {
        let err = StorefrontError::NotFound("order o-9".to_string());
        assert_eq!(err.to_string(), "Not found: order o-9");

        let err = StorefrontError::from(ApiError::RateLimited(3));
        assert_eq!(err.to_string(), "API error: Rate limited, retry after 3 seconds");
    }

    #[test]
    fn test_capture_without_client_is_harmless() {
        StorefrontError::from(ApiError::NotAuthenticated).capture();
        StorefrontError::NotFound("x".to_string()).capture();
        StorefrontError::from(ConfigError::MissingEnvVar("X".to_string())).capture();
    }
}
