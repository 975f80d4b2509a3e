//! Persistence boundary.
//!
//! Handlers only see `Arc<dyn Store>`; the adapter behind it is picked from
//! configuration at startup. Business rules (who may do what, membership
//! invariants) live in the handlers, adapters only enforce uniqueness and
//! report missing rows.

pub mod memory;
pub mod postgres;

use std::sync::Arc;

use async_trait::async_trait;
use serde::Serialize;
use time::OffsetDateTime;
use uuid::Uuid;

use crate::{
    auth::Role,
    config::StorageBackend,
    error::Result,
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

pub use memory::MemoryStore;
pub use postgres::PgStore;

pub type DynStore = Arc<dyn Store>;

pub const DUPLICATE_EMAIL: &str = "An account with this email already exists";
pub const DUPLICATE_ORG_NAME: &str = "An organization with this name already exists";

/// Row counts for the debug dashboard.
#[derive(Debug, Clone, Default, Serialize, PartialEq, Eq)]
pub struct StoreStats {
    pub users: usize,
    pub organizations: usize,
    pub announcements: usize,
    pub events: usize,
}

#[async_trait]
pub trait Store: Send + Sync {
    // Users
    async fn count_users(&self) -> Result<i64>;
    /// Fails with a conflict when the email is taken.
    async fn insert_user(&self, user: User) -> Result<User>;
    async fn find_user_by_id(&self, id: Uuid) -> Result<Option<User>>;
    async fn find_user_by_email(&self, email: &str) -> Result<Option<User>>;
    /// Newest first.
    async fn list_users(&self) -> Result<Vec<User>>;
    /// Members of one organization ordered by email.
    async fn list_members(&self, org_id: Uuid) -> Result<Vec<User>>;
    /// Overwrites organization and role in one write; `NotFound` if the user is gone.
    async fn update_membership(&self, user_id: Uuid, org_id: Option<Uuid>, role: Role) -> Result<User>;

    // Organizations
    /// Fails with a conflict when the name is taken (case-insensitive).
    async fn insert_organization(&self, org: Organization) -> Result<Organization>;
    /// Newest first.
    async fn list_organizations(&self) -> Result<Vec<Organization>>;
    async fn find_organization(&self, id: Uuid) -> Result<Option<Organization>>;
    /// Removes the organization and its content, detaches its members and
    /// demotes its admins. Returns false when it did not exist.
    async fn delete_organization(&self, id: Uuid) -> Result<bool>;

    // Announcements
    async fn insert_announcement(&self, announcement: Announcement) -> Result<Announcement>;
    async fn find_announcement(&self, id: Uuid) -> Result<Option<Announcement>>;
    /// Active ones newest first, or (with `deleted`) the history, most
    /// recently deleted first.
    async fn list_announcements(&self, org_id: Uuid, deleted: bool) -> Result<Vec<Announcement>>;
    /// Every announcement in every state, newest first.
    async fn list_all_announcements(&self) -> Result<Vec<Announcement>>;
    async fn set_announcement_state(&self, id: Uuid, state: AnnouncementState) -> Result<Announcement>;
    async fn delete_announcement(&self, id: Uuid) -> Result<bool>;

    // Events
    async fn insert_event(&self, event: ClubEvent) -> Result<ClubEvent>;
    async fn find_event(&self, id: Uuid) -> Result<Option<ClubEvent>>;
    /// Ordered by date then time, ascending.
    async fn list_events(&self, org_id: Uuid) -> Result<Vec<ClubEvent>>;
    async fn list_all_events(&self) -> Result<Vec<ClubEvent>>;
    async fn delete_event(&self, id: Uuid) -> Result<bool>;

    // Tasks
    async fn insert_task(&self, task: ProjectTask) -> Result<ProjectTask>;
    async fn find_task(&self, id: Uuid) -> Result<Option<ProjectTask>>;
    /// Newest first.
    async fn list_tasks(&self, org_id: Uuid) -> Result<Vec<ProjectTask>>;
    async fn update_task_status(&self, id: Uuid, status: TaskStatus) -> Result<ProjectTask>;
    async fn delete_task(&self, id: Uuid) -> Result<bool>;

    // Resources
    async fn insert_resource(&self, resource: Resource) -> Result<Resource>;
    /// Ordered by category then title, optionally filtered to one category.
    async fn list_resources(&self, category: Option<&str>) -> Result<Vec<Resource>>;
    async fn delete_resource(&self, id: Uuid) -> Result<bool>;

    // Gallery
    async fn insert_gallery_item(&self, item: GalleryItem) -> Result<GalleryItem>;
    /// Oldest first, the order the items were added in.
    async fn list_gallery(&self) -> Result<Vec<GalleryItem>>;
    async fn delete_gallery_item(&self, id: Uuid) -> Result<bool>;

    async fn stats(&self) -> Result<StoreStats> {
        let (users, organizations, announcements, events) = futures::try_join!(
            self.list_users(),
            self.list_organizations(),
            self.list_all_announcements(),
            self.list_all_events(),
        )?;

        Ok(StoreStats {
            users: users.len(),
            organizations: organizations.len(),
            announcements: announcements.len(),
            events: events.len(),
        })
    }
}

/// Builds the adapter selected by configuration.
pub async fn connect(backend: &StorageBackend) -> anyhow::Result<DynStore> {
    let store: DynStore = match backend {
        StorageBackend::Memory => {
            tracing::warn!("Using in-memory storage; data is lost on restart");
            Arc::new(MemoryStore::new())
        }
        StorageBackend::File(path) => {
            tracing::info!("Using file storage at {}", path.display());
            Arc::new(MemoryStore::open(path).await?)
        }
        StorageBackend::Postgres { database_url } => {
            let store = PgStore::connect(database_url).await?;
            tracing::info!("Database connected and migrations applied");
            Arc::new(store)
        }
    };
    seed_defaults(store.as_ref()).await?;
    Ok(store)
}

const STARTER_RESOURCES: &[(&str, &str, &str, &str)] = &[
    ("Burp Suite", "Web vulnerability scanner", "https://portswigger.net/burp", "Security Tools"),
    ("Hashcat", "Advanced password recovery", "https://hashcat.net/hashcat/", "Security Tools"),
    ("React Docs", "Official React documentation", "https://react.dev", "Development"),
    ("Tailwind CSS", "Utility-first CSS framework", "https://tailwindcss.com", "Development"),
    ("Behance", "Design inspiration", "https://www.behance.net", "Inspiration"),
    ("OWASP Top 10", "Top 10 web application security risks", "https://owasp.org/www-project-top-ten/", "Guides"),
];

const STARTER_GALLERY: &[&str] = &[
    "Project Showcase 2023",
    "Workshop Session",
    "Team Building Event",
    "Hackathon Winners",
    "Club Fair Booth",
    "Code Night",
];

/// Fills the resource library and gallery with starter entries when they are
/// empty. Each table is checked separately, so clearing one reseeds only it.
pub async fn seed_defaults(store: &dyn Store) -> Result<()> {
    let now = OffsetDateTime::now_utc();

    if store.list_resources(None).await?.is_empty() {
        for (title, description, url, category) in STARTER_RESOURCES {
            store
                .insert_resource(Resource {
                    id: Uuid::new_v4(),
                    title: title.to_string(),
                    description: description.to_string(),
                    url: url.to_string(),
                    category: category.to_string(),
                    created_at: now,
                })
                .await?;
        }
        tracing::info!(count = STARTER_RESOURCES.len(), "Seeded starter resources");
    }

    if store.list_gallery().await?.is_empty() {
        for (i, title) in STARTER_GALLERY.iter().enumerate() {
            // Distinct timestamps keep the listed order stable
            store
                .insert_gallery_item(GalleryItem {
                    id: Uuid::new_v4(),
                    title: title.to_string(),
                    image_url: format!("https://picsum.photos/seed/gallery{}/500/300", i + 1),
                    created_at: now + time::Duration::milliseconds(i as i64),
                })
                .await?;
        }
        tracing::info!(count = STARTER_GALLERY.len(), "Seeded starter gallery");
    }

    Ok(())
}
