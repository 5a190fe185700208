//! Blog and contact-form shapes.

use chrono::{DateTime, Utc};
use serde::Serialize;

use mirrorcraft_core::BlogId;

/// A blog post.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BlogPost {
    pub id: BlogId,
    pub title: String,
    pub excerpt: Option<String>,
    pub content: Option<String>,
    pub author: Option<String>,
    pub image: Option<String>,
    pub likes: u64,
    pub tags: Vec<String>,
    pub created_at: Option<DateTime<Utc>>,
}

/// A contact-form submission for `POST /enquiry`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Enquiry {
    pub name: String,
    pub email: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub subject: Option<String>,
    pub message: String,
}
