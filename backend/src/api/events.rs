use axum::{
    extract::{Path, State},
    Json,
};
use uuid::Uuid;
use validator::Validate;

use crate::{
    auth::AuthUser,
    error::{AppError, Result},
    extract::AppJson,
    models::event::{ClubEvent, CreateEventRequest},
    org_guard,
    store::DynStore,
};

pub async fn list(
    State(store): State<DynStore>,
    auth: AuthUser,
    Path(org_id): Path<Uuid>,
) -> Result<Json<Vec<ClubEvent>>> {
    org_guard::require_member(&auth, org_id)?;
    org_guard::verify_organization(store.as_ref(), org_id).await?;

    Ok(Json(store.list_events(org_id).await?))
}

pub async fn create(
    State(store): State<DynStore>,
    auth: AuthUser,
    Path(org_id): Path<Uuid>,
    AppJson(req): AppJson<CreateEventRequest>,
) -> Result<Json<ClubEvent>> {
    req.validate()?;
    org_guard::require_org_admin(&auth, org_id)?;
    org_guard::verify_organization(store.as_ref(), org_id).await?;

    let event = store
        .insert_event(ClubEvent {
            id: Uuid::new_v4(),
            organization_id: org_id,
            title: req.title,
            date: req.date,
            time: req.time,
            description: req.description,
        })
        .await?;

    Ok(Json(event))
}

pub async fn delete(
    State(store): State<DynStore>,
    auth: AuthUser,
    Path((org_id, id)): Path<(Uuid, Uuid)>,
) -> Result<Json<serde_json::Value>> {
    org_guard::require_org_admin(&auth, org_id)?;
    org_guard::verify_event(store.as_ref(), id, org_id).await?;

    if !store.delete_event(id).await? {
        return Err(AppError::NotFound("Event not found".into()));
    }

    Ok(Json(serde_json::json!({ "ok": true })))
}
