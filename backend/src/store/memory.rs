use std::path::{Path, PathBuf};

use anyhow::Context;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tokio::{fs, sync::RwLock};
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

#[derive(Debug, Default, Clone, Serialize, Deserialize)]
struct Tables {
    users: Vec<User>,
    organizations: Vec<Organization>,
    announcements: Vec<Announcement>,
    events: Vec<ClubEvent>,
    tasks: Vec<ProjectTask>,
    resources: Vec<Resource>,
    #[serde(default)]
    gallery: Vec<GalleryItem>,
}

/// Store kept in process memory, optionally mirrored to a JSON snapshot.
///
/// With a file path every successful write rewrites the snapshot while the
/// write lock is still held, so the file never lags behind a reader.
pub struct MemoryStore {
    tables: RwLock<Tables>,
    file_path: Option<PathBuf>,
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

impl MemoryStore {
    pub fn new() -> Self {
        Self {
            tables: RwLock::new(Tables::default()),
            file_path: None,
        }
    }

    /// Loads the snapshot at `path`, creating an empty one if missing.
    pub async fn open<P: AsRef<Path>>(path: P) -> anyhow::Result<Self> {
        let file_path = path.as_ref().to_path_buf();
        if let Some(parent) = file_path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)
                    .await
                    .with_context(|| format!("creating {}", parent.display()))?;
            }
        }

        let tables = match fs::read(&file_path).await {
            Ok(bytes) => serde_json::from_slice(&bytes)
                .with_context(|| format!("parsing snapshot {}", file_path.display()))?,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                let empty = Tables::default();
                fs::write(&file_path, serde_json::to_vec(&empty)?)
                    .await
                    .with_context(|| format!("creating snapshot {}", file_path.display()))?;
                empty
            }
            Err(e) => {
                return Err(e).with_context(|| format!("reading snapshot {}", file_path.display()))
            }
        };

        Ok(Self {
            tables: RwLock::new(tables),
            file_path: Some(file_path),
        })
    }

    async fn persist(&self, tables: &Tables) -> Result<()> {
        let Some(path) = &self.file_path else {
            return Ok(());
        };
        let data = serde_json::to_vec_pretty(tables).map_err(anyhow::Error::from)?;
        fs::write(path, data)
            .await
            .with_context(|| format!("writing snapshot {}", path.display()))?;
        Ok(())
    }

    /// Applies `f` to a copy of the tables under the write lock. The copy
    /// replaces the live tables only once the snapshot write succeeded.
    async fn mutate<T, F>(&self, f: F) -> Result<T>
    where
        F: FnOnce(&mut Tables) -> Result<T>,
    {
        let mut tables = self.tables.write().await;
        let mut next = tables.clone();
        let out = f(&mut next)?;
        self.persist(&next).await?;
        *tables = next;
        Ok(out)
    }
}

fn remove_where<T>(items: &mut Vec<T>, pred: impl Fn(&T) -> bool) -> bool {
    let before = items.len();
    items.retain(|item| !pred(item));
    items.len() != before
}

#[async_trait]
impl Store for MemoryStore {
    async fn count_users(&self) -> Result<i64> {
        Ok(self.tables.read().await.users.len() as i64)
    }

    async fn insert_user(&self, user: User) -> Result<User> {
        self.mutate(|t| {
            if t.users.iter().any(|u| u.email.eq_ignore_ascii_case(&user.email)) {
                return Err(AppError::Conflict(DUPLICATE_EMAIL.into()));
            }
            t.users.push(user.clone());
            Ok(user)
        })
        .await
    }

    async fn find_user_by_id(&self, id: Uuid) -> Result<Option<User>> {
        Ok(self.tables.read().await.users.iter().find(|u| u.id == id).cloned())
    }

    async fn find_user_by_email(&self, email: &str) -> Result<Option<User>> {
        let tables = self.tables.read().await;
        Ok(tables
            .users
            .iter()
            .find(|u| u.email.eq_ignore_ascii_case(email))
            .cloned())
    }

    async fn list_users(&self) -> Result<Vec<User>> {
        let mut users = self.tables.read().await.users.clone();
        users.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(users)
    }

    async fn list_members(&self, org_id: Uuid) -> Result<Vec<User>> {
        let tables = self.tables.read().await;
        let mut members: Vec<User> = tables
            .users
            .iter()
            .filter(|u| u.organization_id == Some(org_id))
            .cloned()
            .collect();
        members.sort_by(|a, b| a.email.cmp(&b.email));
        Ok(members)
    }

    async fn update_membership(&self, user_id: Uuid, org_id: Option<Uuid>, role: Role) -> Result<User> {
        self.mutate(|t| {
            let user = t
                .users
                .iter_mut()
                .find(|u| u.id == user_id)
                .ok_or_else(|| AppError::NotFound("User not found".into()))?;
            user.organization_id = org_id;
            user.role = role;
            Ok(user.clone())
        })
        .await
    }

    async fn insert_organization(&self, org: Organization) -> Result<Organization> {
        self.mutate(|t| {
            if t.organizations
                .iter()
                .any(|o| o.name.to_lowercase() == org.name.to_lowercase())
            {
                return Err(AppError::Conflict(DUPLICATE_ORG_NAME.into()));
            }
            t.organizations.push(org.clone());
            Ok(org)
        })
        .await
    }

    async fn list_organizations(&self) -> Result<Vec<Organization>> {
        let mut orgs = self.tables.read().await.organizations.clone();
        orgs.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(orgs)
    }

    async fn find_organization(&self, id: Uuid) -> Result<Option<Organization>> {
        let tables = self.tables.read().await;
        Ok(tables.organizations.iter().find(|o| o.id == id).cloned())
    }

    async fn delete_organization(&self, id: Uuid) -> Result<bool> {
        self.mutate(|t| {
            if !remove_where(&mut t.organizations, |o| o.id == id) {
                return Ok(false);
            }
            t.announcements.retain(|a| a.organization_id != id);
            t.events.retain(|e| e.organization_id != id);
            t.tasks.retain(|task| task.organization_id != id);
            for user in t.users.iter_mut().filter(|u| u.organization_id == Some(id)) {
                user.organization_id = None;
                if user.role == Role::Admin {
                    user.role = Role::Student;
                }
            }
            Ok(true)
        })
        .await
    }

    async fn insert_announcement(&self, announcement: Announcement) -> Result<Announcement> {
        self.mutate(|t| {
            t.announcements.push(announcement.clone());
            Ok(announcement)
        })
        .await
    }

    async fn find_announcement(&self, id: Uuid) -> Result<Option<Announcement>> {
        let tables = self.tables.read().await;
        Ok(tables.announcements.iter().find(|a| a.id == id).cloned())
    }

    async fn list_announcements(&self, org_id: Uuid, deleted: bool) -> Result<Vec<Announcement>> {
        let tables = self.tables.read().await;
        let mut items: Vec<Announcement> = tables
            .announcements
            .iter()
            .filter(|a| a.organization_id == org_id && a.is_deleted() == deleted)
            .cloned()
            .collect();
        if deleted {
            items.sort_by(|a, b| b.deleted_at().cmp(&a.deleted_at()));
        } else {
            items.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        }
        Ok(items)
    }

    async fn list_all_announcements(&self) -> Result<Vec<Announcement>> {
        let mut items = self.tables.read().await.announcements.clone();
        items.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(items)
    }

    async fn set_announcement_state(&self, id: Uuid, state: AnnouncementState) -> Result<Announcement> {
        self.mutate(|t| {
            let item = t
                .announcements
                .iter_mut()
                .find(|a| a.id == id)
                .ok_or_else(|| AppError::NotFound("Announcement not found".into()))?;
            item.state = state;
            Ok(item.clone())
        })
        .await
    }

    async fn delete_announcement(&self, id: Uuid) -> Result<bool> {
        self.mutate(|t| Ok(remove_where(&mut t.announcements, |a| a.id == id)))
            .await
    }

    async fn insert_event(&self, event: ClubEvent) -> Result<ClubEvent> {
        self.mutate(|t| {
            t.events.push(event.clone());
            Ok(event)
        })
        .await
    }

    async fn find_event(&self, id: Uuid) -> Result<Option<ClubEvent>> {
        Ok(self.tables.read().await.events.iter().find(|e| e.id == id).cloned())
    }

    async fn list_events(&self, org_id: Uuid) -> Result<Vec<ClubEvent>> {
        let tables = self.tables.read().await;
        let mut events: Vec<ClubEvent> = tables
            .events
            .iter()
            .filter(|e| e.organization_id == org_id)
            .cloned()
            .collect();
        events.sort_by(|a, b| (a.date, a.time).cmp(&(b.date, b.time)));
        Ok(events)
    }

    async fn list_all_events(&self) -> Result<Vec<ClubEvent>> {
        let mut events = self.tables.read().await.events.clone();
        events.sort_by(|a, b| (a.date, a.time).cmp(&(b.date, b.time)));
        Ok(events)
    }

    async fn delete_event(&self, id: Uuid) -> Result<bool> {
        self.mutate(|t| Ok(remove_where(&mut t.events, |e| e.id == id)))
            .await
    }

    async fn insert_task(&self, task: ProjectTask) -> Result<ProjectTask> {
        self.mutate(|t| {
            t.tasks.push(task.clone());
            Ok(task)
        })
        .await
    }

    async fn find_task(&self, id: Uuid) -> Result<Option<ProjectTask>> {
        Ok(self.tables.read().await.tasks.iter().find(|t| t.id == id).cloned())
    }

    async fn list_tasks(&self, org_id: Uuid) -> Result<Vec<ProjectTask>> {
        let tables = self.tables.read().await;
        let mut tasks: Vec<ProjectTask> = tables
            .tasks
            .iter()
            .filter(|t| t.organization_id == org_id)
            .cloned()
            .collect();
        tasks.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(tasks)
    }

    async fn update_task_status(&self, id: Uuid, status: TaskStatus) -> Result<ProjectTask> {
        self.mutate(|t| {
            let task = t
                .tasks
                .iter_mut()
                .find(|task| task.id == id)
                .ok_or_else(|| AppError::NotFound("Task not found".into()))?;
            task.status = status;
            Ok(task.clone())
        })
        .await
    }

    async fn delete_task(&self, id: Uuid) -> Result<bool> {
        self.mutate(|t| Ok(remove_where(&mut t.tasks, |task| task.id == id)))
            .await
    }

    async fn insert_resource(&self, resource: Resource) -> Result<Resource> {
        self.mutate(|t| {
            t.resources.push(resource.clone());
            Ok(resource)
        })
        .await
    }

    async fn list_resources(&self, category: Option<&str>) -> Result<Vec<Resource>> {
        let tables = self.tables.read().await;
        let mut resources: Vec<Resource> = tables
            .resources
            .iter()
            .filter(|r| category.map_or(true, |c| r.category == c))
            .cloned()
            .collect();
        resources.sort_by(|a, b| (&a.category, &a.title).cmp(&(&b.category, &b.title)));
        Ok(resources)
    }

    async fn delete_resource(&self, id: Uuid) -> Result<bool> {
        self.mutate(|t| Ok(remove_where(&mut t.resources, |r| r.id == id)))
            .await
    }

    async fn insert_gallery_item(&self, item: GalleryItem) -> Result<GalleryItem> {
        self.mutate(|t| {
            t.gallery.push(item.clone());
            Ok(item)
        })
        .await
    }

    async fn list_gallery(&self) -> Result<Vec<GalleryItem>> {
        let mut items = self.tables.read().await.gallery.clone();
        items.sort_by_key(|g| g.created_at);
        Ok(items)
    }

    async fn delete_gallery_item(&self, id: Uuid) -> Result<bool> {
        self.mutate(|t| Ok(remove_where(&mut t.gallery, |g| g.id == id)))
            .await
    }
}
