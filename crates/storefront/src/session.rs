//! Bearer token persistence and expiry checks.
//!
//! The token issued by `/users/login` is a JWT. The client never verifies its
//! signature (that is the server's job) but it does read the `exp` claim so
//! an expired token is treated as absent. There is no refresh: expiry means
//! logged out.

use base64::Engine;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use chrono::{DateTime, Utc};
use secrecy::{ExposeSecret, SecretString};
use serde::Deserialize;
use thiserror::Error;

use crate::storage::{self, SharedStore, keys};

/// Why a token's claims could not be read.
#[derive(Debug, Error)]
pub enum TokenError {
    #[error("token is not a three-part JWT")]
    Malformed,
    #[error("token payload is not base64url: {0}")]
    Encoding(#[from] base64::DecodeError),
    #[error("token payload is not JSON: {0}")]
    Claims(#[from] serde_json::Error),
}

#[derive(Deserialize)]
struct Claims {
    exp: Option<f64>,
}

/// An opaque bearer credential.
///
/// `Debug` output is redacted.
#[derive(Debug, Clone)]
pub struct BearerToken(SecretString);

impl BearerToken {
    /// Wrap a raw token string.
    #[must_use]
    pub fn new(raw: impl Into<String>) -> Self {
        Self(SecretString::from(raw.into()))
    }

    /// The raw token, for the `Authorization` header.
    #[must_use]
    pub fn expose(&self) -> &str {
        self.0.expose_secret()
    }

    /// Decode the `exp` claim. `Ok(None)` means the token does not expire.
    ///
    /// # Errors
    ///
    /// Returns `TokenError` if the token is not a decodable JWT.
    pub fn expires_at(&self) -> Result<Option<DateTime<Utc>>, TokenError> {
        let mut parts = self.expose().split('.');
        let (Some(_header), Some(payload), Some(_signature), None) =
            (parts.next(), parts.next(), parts.next(), parts.next())
        else {
            return Err(TokenError::Malformed);
        };

        let bytes = URL_SAFE_NO_PAD.decode(payload.trim_end_matches('='))?;
        let claims: Claims = serde_json::from_slice(&bytes)?;

        #[allow(clippy::cast_possible_truncation)] // NumericDate seconds fit in i64
        let expires_at = claims
            .exp
            .and_then(|exp| DateTime::from_timestamp(exp.floor() as i64, 0));
        Ok(expires_at)
    }

    /// Whether the token should be treated as absent at `now`.
    ///
    /// Undecodable tokens count as expired.
    #[must_use]
    pub fn is_expired_at(&self, now: DateTime<Utc>) -> bool {
        match self.expires_at() {
            Ok(Some(exp)) => exp <= now,
            Ok(None) => false,
            Err(e) => {
                tracing::debug!(error = %e, "Treating undecodable token as expired");
                true
            }
        }
    }
}

/// Reads and writes the persisted bearer token.
///
/// Shared by the auth service (which saves it) and the API client (which
/// attaches it and purges it on `401`).
#[derive(Clone)]
pub struct TokenStore {
    store: SharedStore,
}

impl TokenStore {
    /// Wrap a shared store.
    #[must_use]
    pub fn new(store: SharedStore) -> Self {
        Self { store }
    }

    /// Persist a freshly issued token.
    pub fn save(&self, token: &BearerToken) {
        storage::persist(self.store.as_ref(), keys::AUTH_TOKEN, token.expose());
    }

    /// Forget the token.
    pub fn purge(&self) {
        if let Err(e) = self.store.remove(keys::AUTH_TOKEN) {
            tracing::warn!(error = %e, "Failed to purge auth token");
        }
    }

    /// The live token, if any.
    ///
    /// An expired token is removed from storage as a side effect.
    #[must_use]
    pub fn current(&self) -> Option<BearerToken> {
        self.current_at(Utc::now())
    }

    /// [`current`](Self::current) evaluated at a fixed instant.
    #[must_use]
    pub fn current_at(&self, now: DateTime<Utc>) -> Option<BearerToken> {
        let raw: String = storage::load_or_default(self.store.as_ref(), keys::AUTH_TOKEN);
        if raw.is_empty() {
            return None;
        }

        let token = BearerToken::new(raw);
        if token.is_expired_at(now) {
            tracing::info!("Stored auth token expired, logging out");
            self.purge();
            return None;
        }
        Some(token)
    }
}
