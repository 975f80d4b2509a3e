pub mod api;
pub mod auth;
pub mod client;
pub mod config;
pub mod error;
pub mod extract;
pub mod models;
pub mod org_guard;
pub mod store;

use store::DynStore;

/// Shared application state available to all handlers via axum's State extractor.
#[derive(Clone)]
pub struct AppState {
    pub store: DynStore,
    pub jwt_secret: String,
    pub jwt_expiry_hours: u64,
    pub debug_routes: bool,
}

impl axum::extract::FromRef<AppState> for DynStore {
    fn from_ref(state: &AppState) -> Self {
        state.store.clone()
    }
}
