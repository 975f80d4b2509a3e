pub mod announcements;
pub mod auth;
pub mod debug;
pub mod events;
pub mod gallery;
pub mod health;
pub mod members;
pub mod organizations;
pub mod resources;
pub mod tasks;

use axum::{routing::{delete, get, patch, post}, Router};
use crate::AppState;

/// Everything except sign-up/sign-in, which live in [`auth_router`] so the
/// binary can put a rate limiter in front of them alone.
pub fn router(state: AppState) -> Router {
    let mut api = Router::new()
        .route("/health", get(health::health_check))
        // Auth
        .route("/api/auth/me", get(auth::me))
        // Organizations
        .route("/api/organizations", get(organizations::list).post(organizations::create))
        .route("/api/organizations/:id", get(organizations::get).delete(organizations::delete))
        // Members
        .route("/api/organizations/:id/members", get(members::list).post(members::assign))
        .route("/api/organizations/:id/members/:email", delete(members::remove))
        .route("/api/organizations/:id/admins", post(members::promote))
        // Announcements
        .route(
            "/api/organizations/:id/announcements",
            get(announcements::list).post(announcements::create),
        )
        .route("/api/organizations/:id/announcements/history", get(announcements::history))
        .route("/api/organizations/:id/announcements/:aid", delete(announcements::soft_delete))
        .route("/api/organizations/:id/announcements/:aid/restore", post(announcements::restore))
        .route("/api/organizations/:id/announcements/:aid/purge", delete(announcements::purge))
        // Events
        .route("/api/organizations/:id/events", get(events::list).post(events::create))
        .route("/api/organizations/:id/events/:eid", delete(events::delete))
        // Tasks
        .route("/api/organizations/:id/tasks", get(tasks::list).post(tasks::create))
        .route(
            "/api/organizations/:id/tasks/:tid",
            patch(tasks::update_status).delete(tasks::delete),
        )
        // Resources
        .route("/api/resources", get(resources::list).post(resources::create))
        .route("/api/resources/categories", get(resources::categories))
        .route("/api/resources/:id", delete(resources::delete))
        .route("/api/gallery", get(gallery::list).post(gallery::create))
        .route("/api/gallery/:id", delete(gallery::delete));

    if state.debug_routes {
        tracing::warn!("Debug routes enabled under /api/debug");
        api = api.nest("/api/debug", debug::router());
    }

    api.with_state(state)
}

pub fn auth_router(state: AppState) -> Router {
    Router::new()
        .route("/api/auth/signup", post(auth::signup))
        .route("/api/auth/signin", post(auth::signin))
        .with_state(state)
}
