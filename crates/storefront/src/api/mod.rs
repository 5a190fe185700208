//! Client for the storefront REST API.
//!
//! # Architecture
//!
//! - One `reqwest::Client` per session, shared by every state manager
//! - Paths are joined onto a configured base URL (`/api/` by convention)
//! - Bearer token read from the [`TokenStore`] on every authenticated call
//! - A `401` on a call that carried a token purges the token, so the user is
//!   logged out on the next state check rather than mid-request
//!
//! Response bodies are accepted bare or wrapped (see [`types::Envelope`]).

pub mod conversions;
pub mod types;

use std::sync::Arc;

use reqwest::{Method, RequestBuilder, StatusCode};
use serde::Serialize;
use serde::de::DeserializeOwned;
use thiserror::Error;
use url::Url;

use crate::config::ApiConfig;
use crate::session::TokenStore;

pub use types::Envelope;

/// User agent sent with every request.
const USER_AGENT: &str = concat!("mirrorcraft-storefront/", env!("CARGO_PKG_VERSION"));

/// Errors that can occur when talking to the storefront API.
#[derive(Debug, Error)]
pub enum ApiError {
    /// HTTP request failed before a response arrived.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// The response body did not match the expected shape.
    #[error("JSON parse error: {0}")]
    Parse(#[from] serde_json::Error),

    /// An endpoint path could not be joined onto the base URL.
    #[error("Invalid URL: {0}")]
    InvalidUrl(#[from] url::ParseError),

    /// The call needs a session token and none is stored.
    #[error("Not authenticated")]
    NotAuthenticated,

    /// The server rejected the stored token. It has been purged.
    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    /// Rate limited by the API.
    #[error("Rate limited, retry after {0} seconds")]
    RateLimited(u64),

    /// Any other non-success status.
    #[error("API error: {status} - {message}")]
    Api { status: u16, message: String },
}

impl ApiError {
    /// HTTP status code, if the server answered.
    #[must_use]
    pub const fn status(&self) -> Option<u16> {
        match self {
            Self::Unauthorized(_) => Some(401),
            Self::RateLimited(_) => Some(429),
            Self::Api { status, .. } => Some(*status),
            _ => None,
        }
    }
}

/// Whether a request carries the session token.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Auth {
    /// Never attach a token.
    Anonymous,
    /// Attach the token if one is stored.
    Optional,
    /// Fail with [`ApiError::NotAuthenticated`] unless a token is stored.
    Required,
}

/// Client for the storefront REST API.
///
/// Cheap to clone; clones share the connection pool and token store.
#[derive(Clone)]
pub struct ApiClient {
    inner: Arc<ApiClientInner>,
}

struct ApiClientInner {
    client: reqwest::Client,
    base_url: Url,
    tokens: TokenStore,
}

impl ApiClient {
    /// Create a new API client.
    ///
    /// # Errors
    ///
    /// Returns `ApiError::Http` if the HTTP client fails to build.
    pub fn new(config: &ApiConfig, tokens: TokenStore) -> Result<Self, ApiError> {
        let client = reqwest::Client::builder()
            .timeout(config.timeout)
            .user_agent(USER_AGENT)
            .build()?;

        Ok(Self {
            inner: Arc::new(ApiClientInner {
                client,
                base_url: config.base_url.clone(),
                tokens,
            }),
        })
    }

    /// The token store this client reads from.
    #[must_use]
    pub fn tokens(&self) -> &TokenStore {
        &self.inner.tokens
    }

    /// Whether a live session token is stored.
    #[must_use]
    pub fn has_session(&self) -> bool {
        self.inner.tokens.current().is_some()
    }

    /// Resolve an endpoint path against the base URL.
    ///
    /// # Errors
    ///
    /// Returns `ApiError::InvalidUrl` if the path cannot be joined.
    pub fn endpoint(&self, path: &str) -> Result<Url, ApiError> {
        Ok(self.inner.base_url.join(path.trim_start_matches('/'))?)
    }

    /// `GET` a JSON resource.
    ///
    /// # Errors
    ///
    /// Returns an `ApiError` on transport failure, non-success status, or a
    /// body that does not decode as `T`.
    pub async fn get<T: DeserializeOwned>(&self, path: &str, auth: Auth) -> Result<T, ApiError> {
        let url = self.endpoint(path)?;
        self.execute(Method::GET, url, None::<&()>, auth).await
    }

    /// `GET` a JSON resource with query parameters. Empty values are skipped.
    ///
    /// # Errors
    ///
    /// See [`get`](Self::get).
    pub async fn get_with_query<T: DeserializeOwned>(
        &self,
        path: &str,
        query: &[(&str, String)],
        auth: Auth,
    ) -> Result<T, ApiError> {
        let mut url = self.endpoint(path)?;
        {
            let mut pairs = url.query_pairs_mut();
            for (key, value) in query.iter().filter(|(_, v)| !v.is_empty()) {
                pairs.append_pair(key, value);
            }
        }
        if url.query() == Some("") {
            url.set_query(None);
        }
        self.execute(Method::GET, url, None::<&()>, auth).await
    }

    /// `POST` a JSON body.
    ///
    /// # Errors
    ///
    /// See [`get`](Self::get).
    pub async fn post<B, T>(&self, path: &str, body: &B, auth: Auth) -> Result<T, ApiError>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        let url = self.endpoint(path)?;
        self.execute(Method::POST, url, Some(body), auth).await
    }

    /// `PUT` a JSON body.
    ///
    /// # Errors
    ///
    /// See [`get`](Self::get).
    pub async fn put<B, T>(&self, path: &str, body: &B, auth: Auth) -> Result<T, ApiError>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        let url = self.endpoint(path)?;
        self.execute(Method::PUT, url, Some(body), auth).await
    }

    /// `DELETE` a resource.
    ///
    /// # Errors
    ///
    /// See [`get`](Self::get).
    pub async fn delete<T: DeserializeOwned>(&self, path: &str, auth: Auth) -> Result<T, ApiError> {
        let url = self.endpoint(path)?;
        self.execute(Method::DELETE, url, None::<&()>, auth).await
    }

    /// Send a request and decode the response.
    async fn execute<B, T>(
        &self,
        method: Method,
        url: Url,
        body: Option<&B>,
        auth: Auth,
    ) -> Result<T, ApiError>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        tracing::debug!(%method, %url, "Storefront API request");

        let mut request: RequestBuilder = self.inner.client.request(method, url);
        if let Some(body) = body {
            request = request.json(body);
        }

        let (request, sent_token) = self.authorize(request, auth)?;
        let response = request.send().await?;
        let status = response.status();

        // Check for rate limiting
        if status == StatusCode::TOO_MANY_REQUESTS {
            let retry_after = response
                .headers()
                .get("Retry-After")
                .and_then(|v| v.to_str().ok())
                .and_then(|s| s.parse::<u64>().ok())
                .unwrap_or(1);
            return Err(ApiError::RateLimited(retry_after));
        }

        let response_text = response.text().await?;

        if !status.is_success() {
            let message = error_message(&response_text, status);

            if status == StatusCode::UNAUTHORIZED && sent_token {
                tracing::info!("Session token rejected by API, purging");
                self.inner.tokens.purge();
                return Err(ApiError::Unauthorized(message));
            }

            tracing::debug!(
                status = %status,
                body = %response_text.chars().take(500).collect::<String>(),
                "Storefront API returned non-success status"
            );
            return Err(ApiError::Api {
                status: status.as_u16(),
                message,
            });
        }

        // Empty bodies (204, bare 200) decode as JSON null.
        let body = if response_text.trim().is_empty() {
            "null"
        } else {
            response_text.as_str()
        };

        serde_json::from_str(body).map_err(|e| {
            tracing::warn!(
                error = %e,
                body = %response_text.chars().take(500).collect::<String>(),
                "Failed to parse storefront API response"
            );
            ApiError::Parse(e)
        })
    }

    /// Attach the bearer token according to `auth`. Returns whether one was sent.
    fn authorize(
        &self,
        request: RequestBuilder,
        auth: Auth,
    ) -> Result<(RequestBuilder, bool), ApiError> {
        match auth {
            Auth::Anonymous => Ok((request, false)),
            Auth::Optional => Ok(match self.inner.tokens.current() {
                Some(token) => (request.bearer_auth(token.expose()), true),
                None => (request, false),
            }),
            Auth::Required => {
                let token = self
                    .inner
                    .tokens
                    .current()
                    .ok_or(ApiError::NotAuthenticated)?;
                Ok((request.bearer_auth(token.expose()), true))
            }
        }
    }
}

/// Pull a human-readable message out of an error body.
fn error_message(body: &str, status: StatusCode) -> String {
    serde_json::from_str::<types::ErrorBody>(body)
        .ok()
        .and_then(types::ErrorBody::into_message)
        .unwrap_or_else(|| {
            let snippet: String = body.chars().take(200).collect();
            if snippet.trim().is_empty() {
                status
                    .canonical_reason()
                    .unwrap_or("request failed")
                    .to_string()
            } else {
                snippet
            }
        })
}
