//! Authentication error types.

use thiserror::Error;

use crate::api::ApiError;

/// Errors that can occur during authentication operations.
#[derive(Debug, Error)]
pub enum AuthError {
    /// Invalid email format. Nothing was sent to the server.
    #[error("invalid email: {0}")]
    InvalidEmail(#[from] mirrorcraft_core::EmailError),

    /// The server refused the email/password pair.
    #[error("invalid credentials: {0}")]
    InvalidCredentials(String),

    /// The server refused a registration or profile update.
    #[error("rejected: {0}")]
    Rejected(String),

    /// Transport or unexpected API failure.
    #[error("API error: {0}")]
    Api(#[from] ApiError),
}

impl AuthError {
    /// Message suitable for showing to the user.
    #[must_use]
    pub fn user_message(&self) -> String {
        match self {
            Self::InvalidEmail(_) => "Invalid email address".to_string(),
            Self::InvalidCredentials(msg) | Self::Rejected(msg) => msg.clone(),
            Self::Api(ApiError::NotAuthenticated | ApiError::Unauthorized(_)) => {
                "Please log in again".to_string()
            }
            Self::Api(_) => "Something went wrong, please try again".to_string(),
        }
    }
}
