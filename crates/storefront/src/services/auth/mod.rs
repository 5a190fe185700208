//! Authentication service.
//!
//! Owns the session: the bearer token (through the shared [`TokenStore`])
//! and the cached profile of the signed-in user. There is no token refresh;
//! an expired or rejected token simply means logged out.
//!
//! [`TokenStore`]: crate::session::TokenStore

mod error;

pub use error::AuthError;

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use secrecy::ExposeSecret;
use serde::Serialize;
use tracing::instrument;

use mirrorcraft_core::Email;

use crate::api::conversions::profile_from_remote;
use crate::api::types::{LoginRequest, LoginResponse, RemoteUser};
use crate::api::{ApiClient, ApiError, Auth, Envelope};
use crate::error::{clear_sentry_user, set_sentry_user};
use crate::models::{ProfileUpdate, RegisterRequest, UserProfile};
use crate::session::BearerToken;

/// Authentication service.
///
/// Cheap to clone; clones share the cached profile.
#[derive(Clone)]
pub struct AuthService {
    api: ApiClient,
    profile: Arc<Mutex<Option<UserProfile>>>,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct RegisterBody<'a> {
    first_name: &'a str,
    last_name: &'a str,
    email: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    phone: Option<&'a str>,
    password: &'a str,
}

impl AuthService {
    /// Create a service over the shared API client.
    #[must_use]
    pub fn new(api: ApiClient) -> Self {
        Self {
            api,
            profile: Arc::new(Mutex::new(None)),
        }
    }

    fn cached(&self) -> MutexGuard<'_, Option<UserProfile>> {
        self.profile.lock().unwrap_or_else(PoisonError::into_inner)
    }

    // =========================================================================
    // Session
    // =========================================================================

    /// Log in with email and password.
    ///
    /// On success the token is persisted and the profile cached: fetched
    /// from `/users/profile`, or taken from the login response if that fetch
    /// fails.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::InvalidEmail` before any network call if the email
    /// is malformed, `AuthError::InvalidCredentials` if the server refuses
    /// the pair, and `AuthError::Api` for anything else.
    #[instrument(skip(self, password))]
    pub async fn login(&self, email: &str, password: &str) -> Result<(), AuthError> {
        let email = Email::parse(email)?;

        let body = LoginRequest {
            email: email.as_str(),
            password,
        };
        let response: LoginResponse = self
            .api
            .post::<_, Envelope<LoginResponse>>("users/login", &body, Auth::Anonymous)
            .await
            .map_err(|e| match e {
                ApiError::Api {
                    status: 400 | 401 | 403 | 404,
                    message,
                } => AuthError::InvalidCredentials(message),
                other => AuthError::Api(other),
            })?
            .into_inner();

        self.api.tokens().save(&BearerToken::new(response.token));

        let profile = match self.fetch_profile().await {
            Ok(profile) => Some(profile),
            Err(e) => {
                tracing::warn!(error = %e, "Profile fetch after login failed, using login response");
                let fallback = response.user.map(profile_from_remote);
                *self.cached() = fallback.clone();
                fallback
            }
        };

        if let Some(profile) = &profile {
            let user_id = profile
                .id
                .as_ref()
                .map_or_else(|| email.to_string(), ToString::to_string);
            set_sentry_user(&user_id, Some(email.as_str()));
        }
        tracing::info!("Logged in");
        Ok(())
    }

    /// Create an account with `POST /users/register`. Does not log in.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::Rejected` if the server refuses the registration
    /// (for example, the email is taken) and `AuthError::Api` otherwise.
    #[instrument(skip(self, request), fields(email = %request.email))]
    pub async fn register(&self, request: &RegisterRequest) -> Result<(), AuthError> {
        let body = RegisterBody {
            first_name: request.first_name.trim(),
            last_name: request.last_name.trim(),
            email: request.email.as_str(),
            phone: request.phone.as_deref().map(str::trim).filter(|p| !p.is_empty()),
            password: request.password.expose_secret(),
        };

        self.api
            .post::<_, serde_json::Value>("users/register", &body, Auth::Anonymous)
            .await
            .map_err(reject_client_errors)?;
        Ok(())
    }

    /// Forget the token and the cached profile. Local only.
    pub fn logout(&self) {
        self.api.tokens().purge();
        *self.cached() = None;
        clear_sentry_user();
        tracing::info!("Logged out");
    }

    /// Whether a live token is stored.
    ///
    /// An expired or undecodable token is purged as a side effect, and with
    /// it the cached profile.
    #[must_use]
    pub fn is_logged_in(&self) -> bool {
        let logged_in = self.api.has_session();
        if !logged_in {
            self.cached().take();
        }
        logged_in
    }

    // =========================================================================
    // Profile
    // =========================================================================

    /// The cached profile, if logged in.
    #[must_use]
    pub fn profile(&self) -> Option<UserProfile> {
        if self.is_logged_in() {
            self.cached().clone()
        } else {
            None
        }
    }

    /// Refresh the cached profile from `GET /users/profile`.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::Api` if the call fails or no token is stored.
    #[instrument(skip(self))]
    pub async fn fetch_profile(&self) -> Result<UserProfile, AuthError> {
        let body: Envelope<RemoteUser> = self.api.get("users/profile", Auth::Required).await?;
        let profile = profile_from_remote(body.into_inner());
        *self.cached() = Some(profile.clone());
        Ok(profile)
    }

    /// Change profile fields with `PUT /users/profile`.
    ///
    /// Only the fields in [`ProfileUpdate`] can be sent. The cached profile is
    /// replaced with the server's response.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::Rejected` if the server refuses the update and
    /// `AuthError::Api` otherwise.
    #[instrument(skip(self, update))]
    pub async fn update_profile(&self, update: &ProfileUpdate) -> Result<UserProfile, AuthError> {
        let body: Envelope<RemoteUser> = self
            .api
            .put("users/profile", update, Auth::Required)
            .await
            .map_err(reject_client_errors)?;
        let profile = profile_from_remote(body.into_inner());
        *self.cached() = Some(profile.clone());
        Ok(profile)
    }
}

/// Turn 400/409/422 responses into `AuthError::Rejected`.
fn reject_client_errors(e: ApiError) -> AuthError {
    match e {
        ApiError::Api {
            status: 400 | 409 | 422,
            message,
        } => AuthError::Rejected(message),
        other => AuthError::Api(other),
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::sync::Arc;

    use chrono::{Duration, Utc};

    use super::*;
    use crate::config::ApiConfig;
    use crate::session::TokenStore;
    use crate::session::tests::jwt_with_exp;
    use crate::storage::{KeyValueStore, MemoryStore, SharedStore, keys};

    fn service_over(store: &Arc<MemoryStore>) -> AuthService {
        let shared: SharedStore = store.clone();
        let api = ApiClient::new(
            &ApiConfig::new("http://127.0.0.1:9/api").unwrap(),
            TokenStore::new(shared),
        )
        .unwrap();
        AuthService::new(api)
    }

    #[tokio::test]
    async fn test_login_rejects_bad_email_without_network() {
        let store = Arc::new(MemoryStore::new());
        let auth = service_over(&store);
        let result = auth.login("not-an-email", "secret").await;
        assert!(matches!(result, Err(AuthError::InvalidEmail(_))));
        assert!(!auth.is_logged_in());
    }

    #[test]
    fn test_expired_token_is_purged_on_check() {
        let store = Arc::new(MemoryStore::new());
        let auth = service_over(&store);
        let past = (Utc::now() - Duration::minutes(5)).timestamp();
        auth.api
            .tokens()
            .save(&BearerToken::new(jwt_with_exp(Some(past))));

        assert!(!auth.is_logged_in());
        assert!(store.read(keys::AUTH_TOKEN).unwrap().is_none());
    }

    #[test]
    fn test_live_token_and_logout() {
        let store = Arc::new(MemoryStore::new());
        let auth = service_over(&store);
        let future = (Utc::now() + Duration::hours(1)).timestamp();
        auth.api
            .tokens()
            .save(&BearerToken::new(jwt_with_exp(Some(future))));

        assert!(auth.is_logged_in());
        auth.logout();
        assert!(!auth.is_logged_in());
        assert!(auth.profile().is_none());
    }

    #[test]
    fn test_user_messages() {
        assert_eq!(
            AuthError::InvalidCredentials("Wrong password".to_string()).user_message(),
            "Wrong password"
        );
        assert_eq!(
            AuthError::Api(ApiError::NotAuthenticated).user_message(),
            "Please log in again"
        );
    }
}
