use serde::{Deserialize, Serialize};
use time::OffsetDateTime;
use uuid::Uuid;
use validator::Validate;

use crate::auth::{Role, View};

/// Full user record as persisted by the store.
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct User {
    pub id: Uuid,
    pub email: String,
    pub name: Option<String>,
    pub password_hash: String,
    pub role: Role,
    pub organization_id: Option<Uuid>,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
}

/// Subset returned to the client (no password hash).
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct UserProfile {
    pub id: Uuid,
    pub email: String,
    pub name: Option<String>,
    pub role: Role,
    pub organization_id: Option<Uuid>,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
}

impl From<&User> for UserProfile {
    fn from(user: &User) -> Self {
        Self {
            id: user.id,
            email: user.email.clone(),
            name: user.name.clone(),
            role: user.role,
            organization_id: user.organization_id,
            created_at: user.created_at,
        }
    }
}

impl From<User> for UserProfile {
    fn from(user: User) -> Self {
        Self::from(&user)
    }
}

/// Emails are the natural key; compare them trimmed and lower-cased.
pub fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}

/// Strips surrounding whitespace while deserializing, so field validators
/// see the value the handler will use.
pub(crate) fn trimmed<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: serde::Deserializer<'de>,
{
    String::deserialize(deserializer).map(|s| s.trim().to_string())
}

#[derive(Debug, Deserialize, Validate)]
pub struct SignUpRequest {
    #[serde(deserialize_with = "trimmed")]
    #[validate(email(message = "Must be a valid email address"))]
    pub email: String,
    #[validate(length(min = 6, message = "Password must be at least 6 characters"))]
    pub password: String,
    #[validate(length(max = 100, message = "Name must be at most 100 characters"))]
    pub name: Option<String>,
}

#[derive(Debug, Deserialize, Validate)]
pub struct SignInRequest {
    #[serde(deserialize_with = "trimmed")]
    #[validate(email(message = "Must be a valid email address"))]
    pub email: String,
    #[validate(length(min = 1, message = "Password is required"))]
    pub password: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct AuthResponse {
    pub token: String,
    #[serde(with = "time::serde::rfc3339")]
    pub expires_at: OffsetDateTime,
    pub user: UserProfile,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct MeResponse {
    #[serde(flatten)]
    pub user: UserProfile,
    pub views: Vec<View>,
}

/// Body for membership changes addressed by email.
#[derive(Debug, Deserialize, Validate)]
pub struct MemberRequest {
    #[serde(deserialize_with = "trimmed")]
    #[validate(email(message = "Must be a valid email address"))]
    pub email: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn padded_email_is_trimmed_before_validation() {
        let req: SignUpRequest = serde_json::from_value(serde_json::json!({
            "email": "  Ada@Example.EDU ",
            "password": "secret1",
        }))
        .unwrap();
        assert_eq!(req.email, "Ada@Example.EDU");
        assert!(req.validate().is_ok());
        assert_eq!(normalize_email(&req.email), "ada@example.edu");

        let req: MemberRequest =
            serde_json::from_value(serde_json::json!({ "email": "\tbob@x.edu\n" })).unwrap();
        assert!(req.validate().is_ok());

        let req: SignInRequest = serde_json::from_value(serde_json::json!({
            "email": "   ",
            "password": "x",
        }))
        .unwrap();
        assert!(req.validate().is_err());
    }
}
