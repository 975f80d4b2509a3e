use std::time::Duration;

use async_trait::async_trait;
use sqlx::{postgres::PgPoolOptions, PgPool};
use time::OffsetDateTime;
use uuid::Uuid;

use super::{Store, DUPLICATE_EMAIL, DUPLICATE_ORG_NAME};
use crate::{
    auth::Role,
    error::{AppError, Result},
    models::{
        announcement::{Announcement, AnnouncementState},
        event::ClubEvent,
        gallery::GalleryItem,
        organization::Organization,
        resource::Resource,
        task::{ProjectTask, TaskStatus},
        user::User,
    },
};

const USER_COLUMNS: &str = "id, email, name, password_hash, role, organization_id, created_at";
const ANNOUNCEMENT_COLUMNS: &str = "id, organization_id, title, content, author, author_email, \
                                    created_at, is_deleted, deleted_at, deleted_by";

#[derive(Clone)]
pub struct PgStore {
    pool: PgPool,
}

impl PgStore {
    pub async fn connect(database_url: &str) -> anyhow::Result<Self> {
        let pool = PgPoolOptions::new()
            .max_connections(20)
            .acquire_timeout(Duration::from_secs(5))
            .connect(database_url)
            .await?;

        sqlx::migrate!("./migrations").run(&pool).await?;

        Ok(Self { pool })
    }
}

/// Flat row form of `Announcement`; the tagged state is rebuilt from the
/// three soft-delete columns.
#[derive(sqlx::FromRow)]
struct AnnouncementRow {
    id: Uuid,
    organization_id: Uuid,
    title: String,
    content: String,
    author: String,
    author_email: String,
    created_at: OffsetDateTime,
    is_deleted: bool,
    deleted_at: Option<OffsetDateTime>,
    deleted_by: Option<String>,
}

impl From<AnnouncementRow> for Announcement {
    fn from(row: AnnouncementRow) -> Self {
        let state = match (row.is_deleted, row.deleted_at) {
            (true, Some(deleted_at)) => AnnouncementState::Deleted {
                deleted_at,
                deleted_by: row.deleted_by.unwrap_or_default(),
            },
            _ => AnnouncementState::Active,
        };
        Announcement {
            id: row.id,
            organization_id: row.organization_id,
            title: row.title,
            content: row.content,
            author: row.author,
            author_email: row.author_email,
            created_at: row.created_at,
            state,
        }
    }
}

fn state_columns(state: &AnnouncementState) -> (bool, Option<OffsetDateTime>, Option<String>) {
    match state {
        AnnouncementState::Active => (false, None, None),
        AnnouncementState::Deleted { deleted_at, deleted_by } => {
            (true, Some(*deleted_at), Some(deleted_by.clone()))
        }
    }
}

#[async_trait]
impl Store for PgStore {
    async fn count_users(&self) -> Result<i64> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM users")
            .fetch_one(&self.pool)
            .await?;
        Ok(count)
    }

    async fn insert_user(&self, user: User) -> Result<User> {
        sqlx::query_as::<_, User>(&format!(
            "INSERT INTO users (id, email, name, password_hash, role, organization_id, created_at)
             VALUES ($1, $2, $3, $4, $5, $6, $7)
             RETURNING {USER_COLUMNS}"
        ))
        .bind(user.id)
        .bind(&user.email)
        .bind(&user.name)
        .bind(&user.password_hash)
        .bind(user.role)
        .bind(user.organization_id)
        .bind(user.created_at)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| AppError::unique_violation(e, DUPLICATE_EMAIL))
    }

    async fn find_user_by_id(&self, id: Uuid) -> Result<Option<User>> {
        let user = sqlx::query_as::<_, User>(&format!("SELECT {USER_COLUMNS} FROM users WHERE id = $1"))
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(user)
    }

    async fn find_user_by_email(&self, email: &str) -> Result<Option<User>> {
        let user = sqlx::query_as::<_, User>(&format!(
            "SELECT {USER_COLUMNS} FROM users WHERE lower(email) = lower($1)"
        ))
        .bind(email)
        .fetch_optional(&self.pool)
        .await?;
        Ok(user)
    }

    async fn list_users(&self) -> Result<Vec<User>> {
        let users = sqlx::query_as::<_, User>(&format!(
            "SELECT {USER_COLUMNS} FROM users ORDER BY created_at DESC"
        ))
        .fetch_all(&self.pool)
        .await?;
        Ok(users)
    }

    async fn list_members(&self, org_id: Uuid) -> Result<Vec<User>> {
        let users = sqlx::query_as::<_, User>(&format!(
            "SELECT {USER_COLUMNS} FROM users WHERE organization_id = $1 ORDER BY email"
        ))
        .bind(org_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(users)
    }

    async fn update_membership(&self, user_id: Uuid, org_id: Option<Uuid>, role: Role) -> Result<User> {
        sqlx::query_as::<_, User>(&format!(
            "UPDATE users SET organization_id = $2, role = $3, updated_at = NOW()
             WHERE id = $1
             RETURNING {USER_COLUMNS}"
        ))
        .bind(user_id)
        .bind(org_id)
        .bind(role)
        .fetch_optional(&self.pool)
        .await?
        .ok_or_else(|| AppError::NotFound("User not found".into()))
    }

    async fn insert_organization(&self, org: Organization) -> Result<Organization> {
        sqlx::query_as::<_, Organization>(
            "INSERT INTO organizations (id, name, admin_email, created_at)
             VALUES ($1, $2, $3, $4)
             RETURNING id, name, admin_email, created_at",
        )
        .bind(org.id)
        .bind(&org.name)
        .bind(&org.admin_email)
        .bind(org.created_at)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| AppError::unique_violation(e, DUPLICATE_ORG_NAME))
    }

    async fn list_organizations(&self) -> Result<Vec<Organization>> {
        let orgs = sqlx::query_as::<_, Organization>(
            "SELECT id, name, admin_email, created_at FROM organizations ORDER BY created_at DESC",
        )
        .fetch_all(&self.pool)
        .await?;
        Ok(orgs)
    }

    async fn find_organization(&self, id: Uuid) -> Result<Option<Organization>> {
        let org = sqlx::query_as::<_, Organization>(
            "SELECT id, name, admin_email, created_at FROM organizations WHERE id = $1",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(org)
    }

    async fn delete_organization(&self, id: Uuid) -> Result<bool> {
        let mut tx = self.pool.begin().await?;

        sqlx::query(
            "UPDATE users
             SET organization_id = NULL,
                 role = CASE WHEN role = 'admin' THEN 'student'::app_role ELSE role END,
                 updated_at = NOW()
             WHERE organization_id = $1",
        )
        .bind(id)
        .execute(&mut *tx)
        .await?;

        // Content rows go with the organization via ON DELETE CASCADE
        let rows = sqlx::query("DELETE FROM organizations WHERE id = $1")
            .bind(id)
            .execute(&mut *tx)
            .await?
            .rows_affected();

        tx.commit().await?;
        Ok(rows > 0)
    }

    async fn insert_announcement(&self, announcement: Announcement) -> Result<Announcement> {
        let (is_deleted, deleted_at, deleted_by) = state_columns(&announcement.state);
        let row = sqlx::query_as::<_, AnnouncementRow>(&format!(
            "INSERT INTO announcements (id, organization_id, title, content, author, author_email,
                                        created_at, is_deleted, deleted_at, deleted_by)
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10)
             RETURNING {ANNOUNCEMENT_COLUMNS}"
        ))
        .bind(announcement.id)
        .bind(announcement.organization_id)
        .bind(&announcement.title)
        .bind(&announcement.content)
        .bind(&announcement.author)
        .bind(&announcement.author_email)
        .bind(announcement.created_at)
        .bind(is_deleted)
        .bind(deleted_at)
        .bind(deleted_by)
        .fetch_one(&self.pool)
        .await?;
        Ok(row.into())
    }

    async fn find_announcement(&self, id: Uuid) -> Result<Option<Announcement>> {
        let row = sqlx::query_as::<_, AnnouncementRow>(&format!(
            "SELECT {ANNOUNCEMENT_COLUMNS} FROM announcements WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(row.map(Into::into))
    }

    async fn list_announcements(&self, org_id: Uuid, deleted: bool) -> Result<Vec<Announcement>> {
        let order = if deleted { "deleted_at DESC" } else { "created_at DESC" };
        let rows = sqlx::query_as::<_, AnnouncementRow>(&format!(
            "SELECT {ANNOUNCEMENT_COLUMNS} FROM announcements
             WHERE organization_id = $1 AND is_deleted = $2
             ORDER BY {order}"
        ))
        .bind(org_id)
        .bind(deleted)
        .fetch_all(&self.pool)
        .await?;
        Ok(rows.into_iter().map(Into::into).collect())
    }

    async fn list_all_announcements(&self) -> Result<Vec<Announcement>> {
        let rows = sqlx::query_as::<_, AnnouncementRow>(&format!(
            "SELECT {ANNOUNCEMENT_COLUMNS} FROM announcements ORDER BY created_at DESC"
        ))
        .fetch_all(&self.pool)
        .await?;
        Ok(rows.into_iter().map(Into::into).collect())
    }

    async fn set_announcement_state(&self, id: Uuid, state: AnnouncementState) -> Result<Announcement> {
        let (is_deleted, deleted_at, deleted_by) = state_columns(&state);
        let row = sqlx::query_as::<_, AnnouncementRow>(&format!(
            "UPDATE announcements
             SET is_deleted = $2, deleted_at = $3, deleted_by = $4, updated_at = NOW()
             WHERE id = $1
             RETURNING {ANNOUNCEMENT_COLUMNS}"
        ))
        .bind(id)
        .bind(is_deleted)
        .bind(deleted_at)
        .bind(deleted_by)
        .fetch_optional(&self.pool)
        .await?
        .ok_or_else(|| AppError::NotFound("Announcement not found".into()))?;
        Ok(row.into())
    }

    async fn delete_announcement(&self, id: Uuid) -> Result<bool> {
        let rows = sqlx::query("DELETE FROM announcements WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?
            .rows_affected();
        Ok(rows > 0)
    }

    async fn insert_event(&self, event: ClubEvent) -> Result<ClubEvent> {
        let event = sqlx::query_as::<_, ClubEvent>(
            "INSERT INTO events (id, organization_id, title, date, time, description)
             VALUES ($1, $2, $3, $4, $5, $6)
             RETURNING id, organization_id, title, date, time, description",
        )
        .bind(event.id)
        .bind(event.organization_id)
        .bind(&event.title)
        .bind(event.date)
        .bind(event.time)
        .bind(&event.description)
        .fetch_one(&self.pool)
        .await?;
        Ok(event)
    }

    async fn find_event(&self, id: Uuid) -> Result<Option<ClubEvent>> {
        let event = sqlx::query_as::<_, ClubEvent>(
            "SELECT id, organization_id, title, date, time, description FROM events WHERE id = $1",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(event)
    }

    async fn list_events(&self, org_id: Uuid) -> Result<Vec<ClubEvent>> {
        let events = sqlx::query_as::<_, ClubEvent>(
            "SELECT id, organization_id, title, date, time, description
             FROM events WHERE organization_id = $1
             ORDER BY date ASC, time ASC",
        )
        .bind(org_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(events)
    }

    async fn list_all_events(&self) -> Result<Vec<ClubEvent>> {
        let events = sqlx::query_as::<_, ClubEvent>(
            "SELECT id, organization_id, title, date, time, description
             FROM events ORDER BY date ASC, time ASC",
        )
        .fetch_all(&self.pool)
        .await?;
        Ok(events)
    }

    async fn delete_event(&self, id: Uuid) -> Result<bool> {
        let rows = sqlx::query("DELETE FROM events WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?
            .rows_affected();
        Ok(rows > 0)
    }

    async fn insert_task(&self, task: ProjectTask) -> Result<ProjectTask> {
        let task = sqlx::query_as::<_, ProjectTask>(
            "INSERT INTO tasks (id, organization_id, title, description, status, created_at)
             VALUES ($1, $2, $3, $4, $5, $6)
             RETURNING id, organization_id, title, description, status, created_at",
        )
        .bind(task.id)
        .bind(task.organization_id)
        .bind(&task.title)
        .bind(&task.description)
        .bind(task.status)
        .bind(task.created_at)
        .fetch_one(&self.pool)
        .await?;
        Ok(task)
    }

    async fn find_task(&self, id: Uuid) -> Result<Option<ProjectTask>> {
        let task = sqlx::query_as::<_, ProjectTask>(
            "SELECT id, organization_id, title, description, status, created_at
             FROM tasks WHERE id = $1",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(task)
    }

    async fn list_tasks(&self, org_id: Uuid) -> Result<Vec<ProjectTask>> {
        let tasks = sqlx::query_as::<_, ProjectTask>(
            "SELECT id, organization_id, title, description, status, created_at
             FROM tasks WHERE organization_id = $1
             ORDER BY created_at DESC",
        )
        .bind(org_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(tasks)
    }

    async fn update_task_status(&self, id: Uuid, status: TaskStatus) -> Result<ProjectTask> {
        sqlx::query_as::<_, ProjectTask>(
            "UPDATE tasks SET status = $2, updated_at = NOW()
             WHERE id = $1
             RETURNING id, organization_id, title, description, status, created_at",
        )
        .bind(id)
        .bind(status)
        .fetch_optional(&self.pool)
        .await?
        .ok_or_else(|| AppError::NotFound("Task not found".into()))
    }

    async fn delete_task(&self, id: Uuid) -> Result<bool> {
        let rows = sqlx::query("DELETE FROM tasks WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?
            .rows_affected();
        Ok(rows > 0)
    }

    async fn insert_resource(&self, resource: Resource) -> Result<Resource> {
        let resource = sqlx::query_as::<_, Resource>(
            "INSERT INTO resources (id, title, description, url, category, created_at)
             VALUES ($1, $2, $3, $4, $5, $6)
             RETURNING id, title, description, url, category, created_at",
        )
        .bind(resource.id)
        .bind(&resource.title)
        .bind(&resource.description)
        .bind(&resource.url)
        .bind(&resource.category)
        .bind(resource.created_at)
        .fetch_one(&self.pool)
        .await?;
        Ok(resource)
    }

    async fn list_resources(&self, category: Option<&str>) -> Result<Vec<Resource>> {
        let resources = sqlx::query_as::<_, Resource>(
            "SELECT id, title, description, url, category, created_at
             FROM resources
             WHERE ($1::TEXT IS NULL OR category = $1)
             ORDER BY category, title",
        )
        .bind(category)
        .fetch_all(&self.pool)
        .await?;
        Ok(resources)
    }

    async fn delete_resource(&self, id: Uuid) -> Result<bool> {
        let rows = sqlx::query("DELETE FROM resources WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?
            .rows_affected();
        Ok(rows > 0)
    }

    async fn insert_gallery_item(&self, item: GalleryItem) -> Result<GalleryItem> {
        let item = sqlx::query_as::<_, GalleryItem>(
            "INSERT INTO gallery_items (id, title, image_url, created_at)
             VALUES ($1, $2, $3, $4)
             RETURNING id, title, image_url, created_at",
        )
        .bind(item.id)
        .bind(&item.title)
        .bind(&item.image_url)
        .bind(item.created_at)
        .fetch_one(&self.pool)
        .await?;
        Ok(item)
    }

    async fn list_gallery(&self) -> Result<Vec<GalleryItem>> {
        let items = sqlx::query_as::<_, GalleryItem>(
            "SELECT id, title, image_url, created_at FROM gallery_items ORDER BY created_at",
        )
        .fetch_all(&self.pool)
        .await?;
        Ok(items)
    }

    async fn delete_gallery_item(&self, id: Uuid) -> Result<bool> {
        let rows = sqlx::query("DELETE FROM gallery_items WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?
            .rows_affected();
        Ok(rows > 0)
    }

    async fn stats(&self) -> Result<super::StoreStats> {
        let (users, organizations, announcements, events): (i64, i64, i64, i64) = sqlx::query_as(
            "SELECT (SELECT COUNT(*) FROM users),
                    (SELECT COUNT(*) FROM organizations),
                    (SELECT COUNT(*) FROM announcements),
                    (SELECT COUNT(*) FROM events)",
        )
        .fetch_one(&self.pool)
        .await?;

        Ok(super::StoreStats {
            users: users as usize,
            organizations: organizations as usize,
            announcements: announcements as usize,
            events: events as usize,
        })
    }
}
