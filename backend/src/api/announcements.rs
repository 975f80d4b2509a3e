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
    models::announcement::{Announcement, AnnouncementState, CreateAnnouncementRequest},
    org_guard,
    store::DynStore,
};

pub async fn list(
    State(store): State<DynStore>,
    auth: AuthUser,
    Path(org_id): Path<Uuid>,
) -> Result<Json<Vec<Announcement>>> {
    org_guard::require_member(&auth, org_id)?;
    org_guard::verify_organization(store.as_ref(), org_id).await?;

    Ok(Json(store.list_announcements(org_id, false).await?))
}

/// Soft-deleted announcements that can still be restored or purged.
pub async fn history(
    State(store): State<DynStore>,
    auth: AuthUser,
    Path(org_id): Path<Uuid>,
) -> Result<Json<Vec<Announcement>>> {
    org_guard::require_org_admin(&auth, org_id)?;
    org_guard::verify_organization(store.as_ref(), org_id).await?;

    Ok(Json(store.list_announcements(org_id, true).await?))
}

pub async fn create(
    State(store): State<DynStore>,
    auth: AuthUser,
    Path(org_id): Path<Uuid>,
    AppJson(req): AppJson<CreateAnnouncementRequest>,
) -> Result<Json<Announcement>> {
    req.validate()?;
    org_guard::require_org_admin(&auth, org_id)?;
    org_guard::verify_organization(store.as_ref(), org_id).await?;

    let announcement = store
        .insert_announcement(Announcement {
            id: Uuid::new_v4(),
            organization_id: org_id,
            title: req.title,
            content: req.content,
            author: auth.display_name().to_string(),
            author_email: auth.email.clone(),
            created_at: OffsetDateTime::now_utc(),
            state: AnnouncementState::Active,
        })
        .await?;

    Ok(Json(announcement))
}

pub async fn soft_delete(
    State(store): State<DynStore>,
    auth: AuthUser,
    Path((org_id, id)): Path<(Uuid, Uuid)>,
) -> Result<Json<Announcement>> {
    org_guard::require_org_admin(&auth, org_id)?;
    let current = org_guard::verify_announcement(store.as_ref(), id, org_id).await?;

    let state = current.soft_deleted(&auth.email, OffsetDateTime::now_utc())?;
    let announcement = store.set_announcement_state(id, state).await?;

    tracing::info!(announcement_id = %id, deleted_by = %auth.email, "Announcement soft-deleted");
    Ok(Json(announcement))
}

pub async fn restore(
    State(store): State<DynStore>,
    auth: AuthUser,
    Path((org_id, id)): Path<(Uuid, Uuid)>,
) -> Result<Json<Announcement>> {
    org_guard::require_org_admin(&auth, org_id)?;
    let current = org_guard::verify_announcement(store.as_ref(), id, org_id).await?;

    let state = current.restored()?;
    let announcement = store.set_announcement_state(id, state).await?;

    tracing::info!(announcement_id = %id, "Announcement restored");
    Ok(Json(announcement))
}

/// Permanent removal; only for announcements already in the history.
pub async fn purge(
    State(store): State<DynStore>,
    auth: AuthUser,
    Path((org_id, id)): Path<(Uuid, Uuid)>,
) -> Result<Json<serde_json::Value>> {
    org_guard::require_org_admin(&auth, org_id)?;
    let current = org_guard::verify_announcement(store.as_ref(), id, org_id).await?;

    if !current.is_deleted() {
        return Err(AppError::BadRequest(
            "Announcement must be deleted before it can be purged".into(),
        ));
    }

    if !store.delete_announcement(id).await? {
        return Err(AppError::NotFound("Announcement not found".into()));
    }

    tracing::info!(announcement_id = %id, "Announcement purged");
    Ok(Json(serde_json::json!({ "ok": true })))
}
