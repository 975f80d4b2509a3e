use axum::{
    extract::{Path, State},
    Json,
};
use uuid::Uuid;
use validator::Validate;

use crate::{
    auth::{AuthUser, Role},
    error::{AppError, Result},
    extract::AppJson,
    models::user::{normalize_email, MemberRequest, User, UserProfile},
    org_guard,
    store::{DynStore, Store},
};

async fn find_member(store: &dyn Store, org_id: Uuid, email: &str) -> Result<User> {
    store
        .find_user_by_email(&normalize_email(email))
        .await?
        .filter(|u| u.organization_id == Some(org_id))
        .ok_or_else(|| AppError::NotFound("User not found in this organization".into()))
}

pub async fn list(
    State(store): State<DynStore>,
    auth: AuthUser,
    Path(org_id): Path<Uuid>,
) -> Result<Json<Vec<UserProfile>>> {
    org_guard::require_member(&auth, org_id)?;
    org_guard::verify_organization(store.as_ref(), org_id).await?;

    let members = store
        .list_members(org_id)
        .await?
        .into_iter()
        .map(UserProfile::from)
        .collect();

    Ok(Json(members))
}

pub async fn assign(
    State(store): State<DynStore>,
    auth: AuthUser,
    Path(org_id): Path<Uuid>,
    AppJson(req): AppJson<MemberRequest>,
) -> Result<Json<UserProfile>> {
    req.validate()?;
    org_guard::require_org_admin(&auth, org_id)?;
    org_guard::verify_organization(store.as_ref(), org_id).await?;

    let user = store
        .find_user_by_email(&normalize_email(&req.email))
        .await?
        .ok_or_else(|| AppError::NotFound("User not found".into()))?;

    if user.role.is_superadmin() {
        return Err(AppError::BadRequest(
            "A superadmin cannot belong to an organization".into(),
        ));
    }
    // One organization per user; moving someone requires removing them first
    if user.organization_id.is_some() {
        return Err(AppError::Conflict("User is already in an organization".into()));
    }

    let user = store
        .update_membership(user.id, Some(org_id), Role::Student)
        .await?;

    tracing::info!(org_id = %org_id, user_id = %user.id, "Member added");
    Ok(Json(UserProfile::from(user)))
}

pub async fn remove(
    State(store): State<DynStore>,
    auth: AuthUser,
    Path((org_id, email)): Path<(Uuid, String)>,
) -> Result<Json<serde_json::Value>> {
    org_guard::require_org_admin(&auth, org_id)?;
    org_guard::verify_organization(store.as_ref(), org_id).await?;

    let user = find_member(store.as_ref(), org_id, &email).await?;

    if user.id == auth.id {
        return Err(AppError::BadRequest(
            "Cannot remove yourself from the organization. Another admin must do this.".into(),
        ));
    }

    // Admin rights are scoped to the org, so they go with the membership
    let role = match user.role {
        Role::Admin => Role::Student,
        other => other,
    };
    store.update_membership(user.id, None, role).await?;

    tracing::info!(org_id = %org_id, user_id = %user.id, demoted = (user.role != role), "Member removed");
    Ok(Json(serde_json::json!({ "ok": true })))
}

pub async fn promote(
    State(store): State<DynStore>,
    auth: AuthUser,
    Path(org_id): Path<Uuid>,
    AppJson(req): AppJson<MemberRequest>,
) -> Result<Json<UserProfile>> {
    req.validate()?;
    org_guard::require_org_admin(&auth, org_id)?;
    org_guard::verify_organization(store.as_ref(), org_id).await?;

    let user = find_member(store.as_ref(), org_id, &req.email).await?;
    if user.role == Role::Admin {
        return Ok(Json(UserProfile::from(user)));
    }

    let user = store
        .update_membership(user.id, Some(org_id), Role::Admin)
        .await?;

    tracing::info!(org_id = %org_id, user_id = %user.id, "Member promoted to admin");
    Ok(Json(UserProfile::from(user)))
}
