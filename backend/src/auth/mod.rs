use argon2::{
    password_hash::SaltString, Argon2, PasswordHash, PasswordHasher, PasswordVerifier,
};
use async_trait::async_trait;
use axum::{
    extract::{FromRef, FromRequestParts},
    http::request::Parts,
};
use axum_extra::{
    headers::{authorization::Bearer, Authorization},
    TypedHeader,
};
use jsonwebtoken::{decode, Algorithm, DecodingKey, Validation};
use rand_core::OsRng;
use serde::{Deserialize, Serialize};
use time::OffsetDateTime;
use uuid::Uuid;

use crate::error::{AppError, Result};
use crate::AppState;

/// Role model: `Superadmin` is global and never belongs to an organization,
/// `Admin` always belongs to exactly one, `Student` to at most one.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, sqlx::Type)]
#[sqlx(type_name = "app_role", rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum Role {
    Superadmin,
    Admin,
    Student,
}

impl Role {
    pub fn is_superadmin(&self) -> bool {
        matches!(self, Role::Superadmin)
    }

    /// Create/delete content and manage members, scoped by the org guard.
    pub fn can_manage_org(&self) -> bool {
        matches!(self, Role::Superadmin | Role::Admin)
    }

    /// Screens the client may render for this role.
    pub fn views(&self, has_org: bool) -> Vec<View> {
        match self {
            Role::Superadmin => vec![View::Organizations, View::Resources, View::Gallery],
            Role::Admin | Role::Student if has_org => vec![
                View::Announcements,
                View::Members,
                View::Events,
                View::Projects,
                View::Resources,
                View::Gallery,
            ],
            Role::Admin | Role::Student => vec![View::Resources, View::Gallery],
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum View {
    Announcements,
    Members,
    Events,
    Projects,
    Resources,
    Gallery,
    Organizations,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    pub sub: Uuid, // user id
    pub email: String,
    pub org_id: Option<Uuid>,
    pub role: Role,
    pub exp: i64,
    pub iat: i64,
}

/// The caller, as currently stored. Role and organization come from the
/// store rather than the token so demotions apply immediately.
#[derive(Debug, Clone)]
pub struct AuthUser {
    pub id: Uuid,
    pub email: String,
    pub name: Option<String>,
    pub org_id: Option<Uuid>,
    pub role: Role,
}

impl AuthUser {
    /// Name shown as the author of content this user creates.
    pub fn display_name(&self) -> &str {
        self.name.as_deref().unwrap_or(&self.email)
    }
}

#[async_trait]
impl<S> FromRequestParts<S> for AuthUser
where
    AppState: FromRef<S>,
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self> {
        let app_state = AppState::from_ref(state);
        let TypedHeader(Authorization(bearer)) =
            TypedHeader::<Authorization<Bearer>>::from_request_parts(parts, state)
                .await
                .map_err(|_| AppError::Unauthorized)?;

        let claims = decode_token(bearer.token(), &app_state.jwt_secret)?;

        // The user may have been removed or re-scoped since the token was issued
        let user = app_state
            .store
            .find_user_by_id(claims.sub)
            .await?
            .ok_or(AppError::Unauthorized)?;

        Ok(AuthUser {
            id: user.id,
            email: user.email,
            name: user.name,
            org_id: user.organization_id,
            role: user.role,
        })
    }
}

pub fn decode_token(token: &str, secret: &str) -> Result<Claims> {
    let key = DecodingKey::from_secret(secret.as_bytes());
    decode::<Claims>(token, &key, &Validation::new(Algorithm::HS256))
        .map(|data| data.claims)
        .map_err(|e| {
            tracing::warn!("JWT decode failed: {}", e);
            AppError::Unauthorized
        })
}

/// Signs a session token and returns it with its expiry instant.
pub fn create_token(
    user_id: Uuid,
    email: &str,
    org_id: Option<Uuid>,
    role: Role,
    secret: &str,
    expiry_hours: u64,
) -> anyhow::Result<(String, OffsetDateTime)> {
    use jsonwebtoken::{encode, EncodingKey, Header};

    let now = OffsetDateTime::now_utc();
    let exp = i64::try_from(expiry_hours)
        .ok()
        .and_then(|h| h.checked_mul(3600))
        .and_then(|secs| now.checked_add(time::Duration::seconds(secs)))
        .ok_or_else(|| anyhow::anyhow!("Token lifetime of {} hours is out of range", expiry_hours))?;

    let claims = Claims {
        sub: user_id,
        email: email.to_string(),
        org_id,
        role,
        exp: exp.unix_timestamp(),
        iat: now.unix_timestamp(),
    };

    let token = encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(secret.as_bytes()),
    )?;

    Ok((token, exp))
}

pub fn hash_password(password: &str) -> Result<String> {
    let salt = SaltString::generate(&mut OsRng);
    Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map(|hash| hash.to_string())
        .map_err(|e| AppError::Internal(anyhow::anyhow!("Password hashing failed: {}", e)))
}

pub fn verify_password(password: &str, stored_hash: &str) -> Result<bool> {
    let parsed = PasswordHash::new(stored_hash)
        .map_err(|_| AppError::Internal(anyhow::anyhow!("Invalid stored hash")))?;

    Ok(Argon2::default()
        .verify_password(password.as_bytes(), &parsed)
        .is_ok())
}
