use axum::{
    extract::{Path, State},
    Json,
};
use time::OffsetDateTime;
use uuid::Uuid;
use validator::Validate;

use crate::{
    auth::{AuthUser, Role},
    error::{AppError, Result},
    extract::AppJson,
    models::{
        organization::{CreateOrganizationRequest, Organization},
        user::{normalize_email, User},
    },
    org_guard,
    store::{DynStore, Store},
};

pub async fn list(
    State(store): State<DynStore>,
    auth: AuthUser,
) -> Result<Json<Vec<Organization>>> {
    if auth.role.is_superadmin() {
        return Ok(Json(store.list_organizations().await?));
    }

    let own: Vec<Organization> = match auth.org_id {
        Some(org_id) => store.find_organization(org_id).await?.into_iter().collect(),
        None => Vec::new(),
    };
    Ok(Json(own))
}

pub async fn create(
    State(store): State<DynStore>,
    auth: AuthUser,
    AppJson(req): AppJson<CreateOrganizationRequest>,
) -> Result<Json<Organization>> {
    req.validate()?;
    org_guard::require_superadmin(&auth)?;

    let name = req.name.trim().to_string();
    if name.is_empty() {
        return Err(AppError::BadRequest("Organization name is required".into()));
    }

    let org = store
        .insert_organization(Organization {
            id: Uuid::new_v4(),
            name,
            admin_email: normalize_email(&req.admin_email),
            created_at: OffsetDateTime::now_utc(),
        })
        .await?;

    tracing::info!(org_id = %org.id, name = %org.name, "Organization created");

    // Second, independent write: a failure here leaves the org in place
    match assign_org_admin(store.as_ref(), &org).await {
        Ok(admin) => {
            tracing::info!(org_id = %org.id, user_id = %admin.id, "Organization admin assigned")
        }
        Err(e) => tracing::warn!(
            org_id = %org.id,
            admin_email = %org.admin_email,
            "Organization created but admin assignment failed: {}",
            e
        ),
    }

    Ok(Json(org))
}

/// Makes the org's named admin an `Admin` member of it.
async fn assign_org_admin(store: &dyn Store, org: &Organization) -> Result<User> {
    let user = store
        .find_user_by_email(&org.admin_email)
        .await?
        .ok_or_else(|| AppError::NotFound("User not found".into()))?;

    if user.role.is_superadmin() {
        return Err(AppError::BadRequest(
            "A superadmin cannot belong to an organization".into(),
        ));
    }
    if matches!(user.organization_id, Some(existing) if existing != org.id) {
        return Err(AppError::Conflict("User is already in an organization".into()));
    }

    store.update_membership(user.id, Some(org.id), Role::Admin).await
}

pub async fn get(
    State(store): State<DynStore>,
    auth: AuthUser,
    Path(id): Path<Uuid>,
) -> Result<Json<Organization>> {
    org_guard::require_member(&auth, id)?;
    let org = org_guard::verify_organization(store.as_ref(), id).await?;
    Ok(Json(org))
}

pub async fn delete(
    State(store): State<DynStore>,
    auth: AuthUser,
    Path(id): Path<Uuid>,
) -> Result<Json<serde_json::Value>> {
    org_guard::require_superadmin(&auth)?;

    if !store.delete_organization(id).await? {
        return Err(AppError::NotFound(format!("Organization {} not found", id)));
    }

    tracing::info!(org_id = %id, "Organization deleted");
    Ok(Json(serde_json::json!({ "ok": true })))
}
