use std::collections::BTreeSet;

use axum::{
    extract::{Path, Query, State},
    Json,
};
use time::OffsetDateTime;
use uuid::Uuid;
use validator::Validate;

use crate::{
    auth::AuthUser,
    error::{AppError, Result},
    extract::AppJson,
    models::resource::{CreateResourceRequest, Resource, ResourceListParams},
    org_guard,
    store::DynStore,
};

pub async fn list(
    State(store): State<DynStore>,
    _auth: AuthUser,
    Query(params): Query<ResourceListParams>,
) -> Result<Json<Vec<Resource>>> {
    // "All" is the catch-all filter value the resource browser sends
    let category = params
        .category
        .as_deref()
        .map(str::trim)
        .filter(|c| !c.is_empty() && !c.eq_ignore_ascii_case("all"));

    Ok(Json(store.list_resources(category).await?))
}

pub async fn categories(
    State(store): State<DynStore>,
    _auth: AuthUser,
) -> Result<Json<Vec<String>>> {
    let categories: BTreeSet<String> = store
        .list_resources(None)
        .await?
        .into_iter()
        .map(|r| r.category)
        .collect();

    Ok(Json(categories.into_iter().collect()))
}

pub async fn create(
    State(store): State<DynStore>,
    auth: AuthUser,
    AppJson(req): AppJson<CreateResourceRequest>,
) -> Result<Json<Resource>> {
    req.validate()?;
    org_guard::require_superadmin(&auth)?;

    let resource = store
        .insert_resource(Resource {
            id: Uuid::new_v4(),
            title: req.title,
            description: req.description,
            url: req.url,
            category: req.category.trim().to_string(),
            created_at: OffsetDateTime::now_utc(),
        })
        .await?;

    Ok(Json(resource))
}

pub async fn delete(
    State(store): State<DynStore>,
    auth: AuthUser,
    Path(id): Path<Uuid>,
) -> Result<Json<serde_json::Value>> {
    org_guard::require_superadmin(&auth)?;

    if !store.delete_resource(id).await? {
        return Err(AppError::NotFound(format!("Resource {} not found", id)));
    }

    Ok(Json(serde_json::json!({ "ok": true })))
}
