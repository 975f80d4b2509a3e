use serde::{Deserialize, Serialize};
use time::OffsetDateTime;
use uuid::Uuid;
use validator::Validate;

/// Shared link library; not scoped to an organization.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, sqlx::FromRow)]
pub struct Resource {
    pub id: Uuid,
    pub title: String,
    pub description: String,
    pub url: String,
    pub category: String,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
}

#[derive(Debug, Deserialize, Validate)]
pub struct CreateResourceRequest {
    #[validate(length(min = 1, max = 255, message = "Title must be 1-255 characters"))]
    pub title: String,
    #[serde(default)]
    pub description: String,
    #[validate(
        url(message = "URL must be a valid absolute URL"),
        length(max = 500, message = "URL must be at most 500 characters")
    )]
    pub url: String,
    #[validate(length(min = 1, max = 50, message = "Category must be 1-50 characters"))]
    pub category: String,
}

#[derive(Debug, Deserialize)]
pub struct ResourceListParams {
    pub category: Option<String>,
}
