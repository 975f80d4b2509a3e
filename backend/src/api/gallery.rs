use axum::{
    extract::{Path, State},
    Json,
};
use time::OffsetDateTime;
use uuid::Uuid;
use validator::Validate;

use crate::{
    auth::AuthUser,
    error::{AppError, Result},
    extract::AppJson,
    models::gallery::{CreateGalleryItemRequest, GalleryItem},
    org_guard,
    store::DynStore,
};

pub async fn list(
    State(store): State<DynStore>,
    _auth: AuthUser,
) -> Result<Json<Vec<GalleryItem>>> {
    Ok(Json(store.list_gallery().await?))
}

pub async fn create(
    State(store): State<DynStore>,
    auth: AuthUser,
    AppJson(req): AppJson<CreateGalleryItemRequest>,
) -> Result<Json<GalleryItem>> {
    req.validate()?;
    org_guard::require_superadmin(&auth)?;

    let item = store
        .insert_gallery_item(GalleryItem {
            id: Uuid::new_v4(),
            title: req.title.trim().to_string(),
            image_url: req.image_url,
            created_at: OffsetDateTime::now_utc(),
        })
        .await?;

    tracing::info!(gallery_item_id = %item.id, "Gallery item added");
    Ok(Json(item))
}

pub async fn delete(
    State(store): State<DynStore>,
    auth: AuthUser,
    Path(id): Path<Uuid>,
) -> Result<Json<serde_json::Value>> {
    org_guard::require_superadmin(&auth)?;

    if !store.delete_gallery_item(id).await? {
        return Err(AppError::NotFound(format!("Gallery item {} not found", id)));
    }

    Ok(Json(serde_json::json!({ "ok": true })))
}
