use serde::{Deserialize, Serialize};
use time::OffsetDateTime;
use uuid::Uuid;
use validator::Validate;

/// Photo shown on the shared gallery page; global like `Resource`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, sqlx::FromRow)]
pub struct GalleryItem {
    pub id: Uuid,
    pub title: String,
    pub image_url: String,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
}

#[derive(Debug, Deserialize, Validate)]
pub struct CreateGalleryItemRequest {
    #[validate(length(min = 1, max = 255, message = "Title must be 1-255 characters"))]
    pub title: String,
    #[validate(
        url(message = "Image URL must be a valid absolute URL"),
        length(max = 500, message = "Image URL must be at most 500 characters")
    )]
    pub image_url: String,
}
