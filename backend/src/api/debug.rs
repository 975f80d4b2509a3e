//! Raw table dumps for troubleshooting a deployment.
//!
//! Only mounted when `ENABLE_DEBUG_ROUTES` is set, and even then every
//! route is superadmin-only.

use axum::{extract::State, routing::get, Json, Router};

use crate::{
    auth::AuthUser,
    error::Result,
    models::{
        announcement::Announcement, event::ClubEvent, organization::Organization,
        user::UserProfile,
    },
    org_guard,
    store::{DynStore, StoreStats},
    AppState,
};

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/users", get(users))
        .route("/organizations", get(organizations))
        .route("/announcements", get(announcements))
        .route("/events", get(events))
        .route("/stats", get(stats))
}

async fn users(State(store): State<DynStore>, auth: AuthUser) -> Result<Json<Vec<UserProfile>>> {
    org_guard::require_superadmin(&auth)?;
    let users = store
        .list_users()
        .await?
        .into_iter()
        .map(UserProfile::from)
        .collect();
    Ok(Json(users))
}

async fn organizations(
    State(store): State<DynStore>,
    auth: AuthUser,
) -> Result<Json<Vec<Organization>>> {
    org_guard::require_superadmin(&auth)?;
    Ok(Json(store.list_organizations().await?))
}

/// Includes soft-deleted rows.
async fn announcements(
    State(store): State<DynStore>,
    auth: AuthUser,
) -> Result<Json<Vec<Announcement>>> {
    org_guard::require_superadmin(&auth)?;
    Ok(Json(store.list_all_announcements().await?))
}

async fn events(State(store): State<DynStore>, auth: AuthUser) -> Result<Json<Vec<ClubEvent>>> {
    org_guard::require_superadmin(&auth)?;
    Ok(Json(store.list_all_events().await?))
}

async fn stats(State(store): State<DynStore>, auth: AuthUser) -> Result<Json<StoreStats>> {
    org_guard::require_superadmin(&auth)?;
    Ok(Json(store.stats().await?))
}
