//! Shared fixtures for the storefront client's end-to-end tests.
//!
//! Every test stands up its own `wiremock` server and points a fresh
//! [`Storefront`] at `<server>/api`, so no real network traffic is made.
//!
//! # Running Tests
//!
//! ```bash
//! cargo test -p mirrorcraft-integration-tests
//! ```

#![cfg_attr(not(test), forbid(unsafe_code))]

use std::sync::Arc;
use std::time::Duration;

use base64::Engine;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use chrono::Utc;
use wiremock::MockServer;

use mirrorcraft_storefront::session::BearerToken;
use mirrorcraft_storefront::storage::{MemoryStore, SharedStore};
use mirrorcraft_storefront::{Storefront, StorefrontConfig};

/// Path prefix the API is mounted under on the mock server.
pub const API_PREFIX: &str = "/api";

/// A mock API server and a session pointed at it.
pub struct TestSession {
    pub server: MockServer,
    pub store: Arc<MemoryStore>,
    pub storefront: Storefront,
}

impl TestSession {
    /// Start a mock server and open a logged-out session over an empty
    /// in-memory store.
    ///
    /// # Panics
    ///
    /// Panics if the session cannot be opened.
    pub async fn start() -> Self {
        let server = MockServer::start().await;
        let store = Arc::new(MemoryStore::new());
        let storefront = open_session(&server, store.clone());
        Self {
            server,
            store,
            storefront,
        }
    }

    /// Start a session that already holds a live token.
    pub async fn logged_in() -> Self {
        let session = Self::start().await;
        session.save_token(&live_token());
        session
    }

    /// Persist `token` as if a login had just succeeded.
    pub fn save_token(&self, token: &str) {
        self.storefront
            .api()
            .tokens()
            .save(&BearerToken::new(token.to_string()));
    }

    /// A second session over the same store and server, as after a restart.
    #[must_use]
    pub fn reopen(&self) -> Storefront {
        open_session(&self.server, self.store.clone())
    }
}

/// Open a session against `server` with a short orders debounce.
///
/// # Panics
///
/// Panics if the config or client cannot be built.
#[must_use]
pub fn open_session(server: &MockServer, store: SharedStore) -> Storefront {
    let mut config = StorefrontConfig::with_base_url(&format!("{}{API_PREFIX}", server.uri()))
        .expect("mock server URI is a valid base URL");
    config.api.timeout = Duration::from_secs(5);
    Storefront::open(config, store).expect("failed to open test session")
}

/// `/api`-prefixed path for matchers.
#[must_use]
pub fn api_path(path: &str) -> String {
    format!("{API_PREFIX}/{}", path.trim_start_matches('/'))
}

/// An unsigned JWT with the given `exp`, or none.
#[must_use]
pub fn jwt(exp: Option<i64>) -> String {
    let header = URL_SAFE_NO_PAD.encode(br#"{"alg":"HS256","typ":"JWT"}"#);
    let claims = match exp {
        Some(exp) => serde_json::json!({ "id": "u-1", "exp": exp }),
        None => serde_json::json!({ "id": "u-1" }),
    };
    let payload = URL_SAFE_NO_PAD.encode(claims.to_string());
    format!("{header}.{payload}.test-signature")
}

/// A token that expires in an hour.
#[must_use]
pub fn live_token() -> String {
    jwt(Some(Utc::now().timestamp() + 3600))
}

/// A token that expired a minute ago.
#[must_use]
pub fn expired_token() -> String {
    jwt(Some(Utc::now().timestamp() - 60))
}
