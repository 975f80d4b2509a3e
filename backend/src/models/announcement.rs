use serde::{Deserialize, Serialize};
use time::OffsetDateTime;
use uuid::Uuid;
use validator::Validate;

use crate::error::{AppError, Result};

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Announcement {
    pub id: Uuid,
    pub organization_id: Uuid,
    pub title: String,
    pub content: String,
    pub author: String,
    pub author_email: String,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
    #[serde(flatten)]
    pub state: AnnouncementState,
}

/// Soft-delete lifecycle. A deleted announcement stays in the store and can
/// be restored until it is purged.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum AnnouncementState {
    Active,
    Deleted {
        #[serde(with = "time::serde::rfc3339")]
        deleted_at: OffsetDateTime,
        deleted_by: String,
    },
}

impl Announcement {
    pub fn is_deleted(&self) -> bool {
        matches!(self.state, AnnouncementState::Deleted { .. })
    }

    pub fn deleted_at(&self) -> Option<OffsetDateTime> {
        match self.state {
            AnnouncementState::Deleted { deleted_at, .. } => Some(deleted_at),
            AnnouncementState::Active => None,
        }
    }

    /// State after a soft delete by `by`.
    pub fn soft_deleted(&self, by: &str, at: OffsetDateTime) -> Result<AnnouncementState> {
        if self.is_deleted() {
            return Err(AppError::BadRequest("Announcement is already deleted".into()));
        }
        Ok(AnnouncementState::Deleted {
            deleted_at: at,
            deleted_by: by.to_string(),
        })
    }

    /// State after a restore.
    pub fn restored(&self) -> Result<AnnouncementState> {
        if !self.is_deleted() {
            return Err(AppError::BadRequest("Announcement is not deleted".into()));
        }
        Ok(AnnouncementState::Active)
    }
}

#[derive(Debug, Deserialize, Validate)]
pub struct CreateAnnouncementRequest {
    #[validate(length(min = 1, max = 255, message = "Title must be 1-255 characters"))]
    pub title: String,
    #[validate(length(min = 1, message = "Content is required"))]
    pub content: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> Announcement {
        Announcement {
            id: Uuid::new_v4(),
            organization_id: Uuid::new_v4(),
            title: "Kickoff".into(),
            content: "First meeting on Friday".into(),
            author: "Ada".into(),
            author_email: "ada@x.edu".into(),
            created_at: OffsetDateTime::now_utc(),
            state: AnnouncementState::Active,
        }
    }

    #[test]
    fn soft_delete_then_restore() {
        let mut ann = sample();
        let now = OffsetDateTime::now_utc();
        ann.state = ann.soft_deleted("ada@x.edu", now).unwrap();
        assert!(ann.is_deleted());
        assert_eq!(ann.deleted_at(), Some(now));
        assert!(ann.soft_deleted("ada@x.edu", now).is_err());

        ann.state = ann.restored().unwrap();
        assert!(!ann.is_deleted());
        assert!(ann.restored().is_err());
    }

    #[test]
    fn state_is_serialized_as_a_tag() {
        let mut ann = sample();
        let json = serde_json::to_value(&ann).unwrap();
        assert_eq!(json["state"], "active");
        assert!(json.get("deleted_by").is_none());

        ann.state = ann.soft_deleted("bob@x.edu", OffsetDateTime::now_utc()).unwrap();
        let json = serde_json::to_value(&ann).unwrap();
        assert_eq!(json["state"], "deleted");
        assert_eq!(json["deleted_by"], "bob@x.edu");

        let back: Announcement = serde_json::from_value(json).unwrap();
        assert!(back.is_deleted());
    }
}
