//! Blog and contact-form service.

use thiserror::Error;
use tracing::instrument;

use mirrorcraft_core::{BlogId, Email, EmailError};

use crate::api::conversions::blog_from_remote;
use crate::api::types::{LikeResponse, RemoteBlog};
use crate::api::{ApiClient, ApiError, Auth, Envelope};
use crate::models::{BlogPost, Enquiry};

/// Errors from content operations that report failure.
#[derive(Debug, Error)]
pub enum ContentError {
    /// The enquiry's email address is malformed. Nothing was sent.
    #[error("invalid email: {0}")]
    InvalidEmail(#[from] EmailError),

    /// The enquiry has no message.
    #[error("message cannot be empty")]
    EmptyMessage,

    /// The API call failed.
    #[error("API error: {0}")]
    Api(#[from] ApiError),
}

/// Content service.
#[derive(Clone)]
pub struct ContentService {
    api: ApiClient,
}

impl ContentService {
    #[must_use]
    pub fn new(api: ApiClient) -> Self {
        Self { api }
    }

    /// Every blog post from `GET /blogs`. Failures resolve to an empty list.
    #[instrument(skip(self))]
    pub async fn blogs(&self) -> Vec<BlogPost> {
        match self
            .api
            .get::<Envelope<Vec<RemoteBlog>>>("blogs", Auth::Optional)
            .await
        {
            Ok(body) => body
                .into_inner()
                .into_iter()
                .filter_map(blog_from_remote)
                .collect(),
            Err(e) => {
                tracing::warn!(error = %e, "Failed to load blogs");
                Vec::new()
            }
        }
    }

    /// One blog post from `GET /blogs/:id`.
    #[instrument(skip(self), fields(blog_id = %id))]
    pub async fn blog(&self, id: &BlogId) -> Option<BlogPost> {
        match self
            .api
            .get::<Envelope<RemoteBlog>>(&format!("blogs/{id}"), Auth::Optional)
            .await
        {
            Ok(body) => blog_from_remote(body.into_inner()),
            Err(e) => {
                tracing::warn!(error = %e, "Failed to load blog");
                None
            }
        }
    }

    /// Like a post with `POST /blogs/:id/like`. Returns the new like count
    /// when the server reports one.
    ///
    /// # Errors
    ///
    /// Returns `ContentError::Api` if the call fails.
    #[instrument(skip(self), fields(blog_id = %id))]
    pub async fn like_blog(&self, id: &BlogId) -> Result<Option<u64>, ContentError> {
        let response: Envelope<LikeResponse> = self
            .api
            .post(&format!("blogs/{id}/like"), &serde_json::json!({}), Auth::Optional)
            .await?;
        Ok(response.into_inner().likes.map(|likes| likes.count()))
    }

    /// Send a contact-form submission to `POST /enquiry`.
    ///
    /// The email is validated and normalised before anything is sent.
    ///
    /// # Errors
    ///
    /// Returns `ContentError::InvalidEmail` or `ContentError::EmptyMessage`
    /// without a network call, or `ContentError::Api` if the call fails.
    #[instrument(skip(self, enquiry))]
    pub async fn submit_enquiry(&self, enquiry: &Enquiry) -> Result<(), ContentError> {
        let email = Email::parse(&enquiry.email)?;
        if enquiry.message.trim().is_empty() {
            return Err(ContentError::EmptyMessage);
        }

        let body = Enquiry {
            email: email.as_str().to_string(),
            ..enquiry.clone()
        };
        self.api
            .post::<_, serde_json::Value>("enquiry", &body, Auth::Optional)
            .await?;
        Ok(())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use crate::config::ApiConfig;
    use crate::session::TokenStore;
    use crate::storage::MemoryStore;

    fn service() -> ContentService {
        let api = ApiClient::new(
            &ApiConfig::new("http://127.0.0.1:9/api").unwrap(),
            TokenStore::new(Arc::new(MemoryStore::new())),
        )
        .unwrap();
        ContentService::new(api)
    }

    fn enquiry(email: &str, message: &str) -> Enquiry {
        Enquiry {
            name: "Asha".to_string(),
            email: email.to_string(),
            phone: None,
            subject: None,
            message: message.to_string(),
        }
    }

    #[tokio::test]
    async fn test_enquiry_validated_before_sending() {
        let content = service();
        assert!(matches!(
            content.submit_enquiry(&enquiry("asha@", "Hello")).await,
            Err(ContentError::InvalidEmail(_))
        ));
        assert!(matches!(
            content.submit_enquiry(&enquiry("asha@example.in", "  ")).await,
            Err(ContentError::EmptyMessage)
        ));
    }
}
