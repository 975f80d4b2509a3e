use axum::{extract::State, http::StatusCode, Json};
use time::OffsetDateTime;
use uuid::Uuid;
use validator::Validate;

use crate::{
    auth::{create_token, hash_password, verify_password, AuthUser, Role},
    error::{AppError, Result},
    extract::AppJson,
    models::user::{
        normalize_email, AuthResponse, MeResponse, SignInRequest, SignUpRequest, User,
        UserProfile,
    },
    store::{DynStore, DUPLICATE_EMAIL},
    AppState,
};

fn issue_session(state: &AppState, user: &User) -> Result<AuthResponse> {
    let (token, expires_at) = create_token(
        user.id,
        &user.email,
        user.organization_id,
        user.role,
        &state.jwt_secret,
        state.jwt_expiry_hours,
    )
    .map_err(AppError::Internal)?;

    Ok(AuthResponse {
        token,
        expires_at,
        user: UserProfile::from(user),
    })
}

pub async fn signup(
    State(state): State<AppState>,
    AppJson(req): AppJson<SignUpRequest>,
) -> Result<(StatusCode, Json<AuthResponse>)> {
    req.validate()?;

    let email = normalize_email(&req.email);
    if state.store.find_user_by_email(&email).await?.is_some() {
        return Err(AppError::Conflict(DUPLICATE_EMAIL.into()));
    }

    let password_hash = hash_password(&req.password)?;

    // First account bootstraps the installation
    let role = if state.store.count_users().await? == 0 {
        Role::Superadmin
    } else {
        Role::Student
    };

    let name = req
        .name
        .map(|n| n.trim().to_string())
        .filter(|n| !n.is_empty());

    let user = state
        .store
        .insert_user(User {
            id: Uuid::new_v4(),
            email,
            name,
            password_hash,
            role,
            organization_id: None,
            created_at: OffsetDateTime::now_utc(),
        })
        .await?;

    tracing::info!(user_id = %user.id, role = ?user.role, "User signed up");

    Ok((StatusCode::CREATED, Json(issue_session(&state, &user)?)))
}

pub async fn signin(
    State(state): State<AppState>,
    AppJson(req): AppJson<SignInRequest>,
) -> Result<Json<AuthResponse>> {
    req.validate()?;

    let user = state
        .store
        .find_user_by_email(&normalize_email(&req.email))
        .await?
        .ok_or(AppError::InvalidCredentials)?;

    if !verify_password(&req.password, &user.password_hash)? {
        tracing::warn!(user_id = %user.id, "Sign-in with wrong password");
        return Err(AppError::InvalidCredentials);
    }

    Ok(Json(issue_session(&state, &user)?))
}

pub async fn me(State(store): State<DynStore>, auth: AuthUser) -> Result<Json<MeResponse>> {
    let user = store
        .find_user_by_id(auth.id)
        .await?
        .ok_or_else(|| AppError::NotFound("User not found".into()))?;

    let views = user.role.views(user.organization_id.is_some());
    Ok(Json(MeResponse {
        user: UserProfile::from(user),
        views,
    }))
}
