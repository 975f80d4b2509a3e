//! Role gating and org-boundary checks.
//!
//! Three tiers: students read inside their own organization, admins also
//! write there, superadmins do both everywhere. Anything outside the
//! caller's organization is reported as `AppError::NotFound` (we don't
//! reveal that it exists); insufficient role inside it is `Forbidden`.

use uuid::Uuid;

use crate::{
    auth::AuthUser,
    error::{AppError, Result},
    models::{
        announcement::Announcement, event::ClubEvent, organization::Organization,
        task::ProjectTask,
    },
    store::Store,
};

pub fn require_superadmin(auth: &AuthUser) -> Result<()> {
    if !auth.role.is_superadmin() {
        return Err(AppError::Forbidden);
    }
    Ok(())
}

/// Read access to an organization.
pub fn require_member(auth: &AuthUser, org_id: Uuid) -> Result<()> {
    if auth.role.is_superadmin() || auth.org_id == Some(org_id) {
        return Ok(());
    }
    Err(AppError::NotFound("Organization not found".into()))
}

/// Write access to an organization.
pub fn require_org_admin(auth: &AuthUser, org_id: Uuid) -> Result<()> {
    require_member(auth, org_id)?;
    if !auth.role.can_manage_org() {
        return Err(AppError::Forbidden);
    }
    Ok(())
}

pub async fn verify_organization(store: &dyn Store, org_id: Uuid) -> Result<Organization> {
    store
        .find_organization(org_id)
        .await?
        .ok_or_else(|| AppError::NotFound("Organization not found".into()))
}

pub async fn verify_announcement(store: &dyn Store, id: Uuid, org_id: Uuid) -> Result<Announcement> {
    store
        .find_announcement(id)
        .await?
        .filter(|a| a.organization_id == org_id)
        .ok_or_else(|| AppError::NotFound("Announcement not found".into()))
}

pub async fn verify_event(store: &dyn Store, id: Uuid, org_id: Uuid) -> Result<ClubEvent> {
    store
        .find_event(id)
        .await?
        .filter(|e| e.organization_id == org_id)
        .ok_or_else(|| AppError::NotFound("Event not found".into()))
}

pub async fn verify_task(store: &dyn Store, id: Uuid, org_id: Uuid) -> Result<ProjectTask> {
    store
        .find_task(id)
        .await?
        .filter(|t| t.organization_id == org_id)
        .ok_or_else(|| AppError::NotFound("Task not found".into()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::Role;

    fn caller(role: Role, org_id: Option<Uuid>) -> AuthUser {
        AuthUser {
            id: Uuid::new_v4(),
            email: "caller@x.edu".into(),
            name: None,
            org_id,
            role,
        }
    }

    #[test]
    fn superadmin_passes_every_org_check() {
        let auth = caller(Role::Superadmin, None);
        let org = Uuid::new_v4();
        assert!(require_member(&auth, org).is_ok());
        assert!(require_org_admin(&auth, org).is_ok());
        assert!(require_superadmin(&auth).is_ok());
    }

    #[test]
    fn admin_is_limited_to_own_org() {
        let own = Uuid::new_v4();
        let auth = caller(Role::Admin, Some(own));
        assert!(require_org_admin(&auth, own).is_ok());
        assert!(matches!(
            require_org_admin(&auth, Uuid::new_v4()),
            Err(AppError::NotFound(_))
        ));
        assert!(matches!(require_superadmin(&auth), Err(AppError::Forbidden)));
    }

    #[test]
    fn student_reads_but_cannot_write() {
        let own = Uuid::new_v4();
        let auth = caller(Role::Student, Some(own));
        assert!(require_member(&auth, own).is_ok());
        assert!(matches!(require_org_admin(&auth, own), Err(AppError::Forbidden)));

        let unassigned = caller(Role::Student, None);
        assert!(matches!(
            require_member(&unassigned, own),
            Err(AppError::NotFound(_))
        ));
    }
}
