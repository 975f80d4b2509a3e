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
    models::task::{CreateTaskRequest, ProjectTask, TaskStatus, UpdateTaskStatusRequest},
    org_guard,
    store::DynStore,
};

pub async fn list(
    State(store): State<DynStore>,
    auth: AuthUser,
    Path(org_id): Path<Uuid>,
) -> Result<Json<Vec<ProjectTask>>> {
    org_guard::require_member(&auth, org_id)?;
    org_guard::verify_organization(store.as_ref(), org_id).await?;

    Ok(Json(store.list_tasks(org_id).await?))
}

pub async fn create(
    State(store): State<DynStore>,
    auth: AuthUser,
    Path(org_id): Path<Uuid>,
    AppJson(req): AppJson<CreateTaskRequest>,
) -> Result<Json<ProjectTask>> {
    req.validate()?;
    org_guard::require_org_admin(&auth, org_id)?;
    org_guard::verify_organization(store.as_ref(), org_id).await?;

    let task = store
        .insert_task(ProjectTask {
            id: Uuid::new_v4(),
            organization_id: org_id,
            title: req.title,
            description: req.description,
            status: req.status.unwrap_or(TaskStatus::ToDo),
            created_at: OffsetDateTime::now_utc(),
        })
        .await?;

    Ok(Json(task))
}

pub async fn update_status(
    State(store): State<DynStore>,
    auth: AuthUser,
    Path((org_id, id)): Path<(Uuid, Uuid)>,
    AppJson(req): AppJson<UpdateTaskStatusRequest>,
) -> Result<Json<ProjectTask>> {
    org_guard::require_org_admin(&auth, org_id)?;
    org_guard::verify_task(store.as_ref(), id, org_id).await?;

    Ok(Json(store.update_task_status(id, req.status).await?))
}

pub async fn delete(
    State(store): State<DynStore>,
    auth: AuthUser,
    Path((org_id, id)): Path<(Uuid, Uuid)>,
) -> Result<Json<serde_json::Value>> {
    org_guard::require_org_admin(&auth, org_id)?;
    org_guard::verify_task(store.as_ref(), id, org_id).await?;

    if !store.delete_task(id).await? {
        return Err(AppError::NotFound("Task not found".into()));
    }

    Ok(Json(serde_json::json!({ "ok": true })))
}
