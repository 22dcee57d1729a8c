//! Member listing, role changes, and removal.

use std::sync::Arc;

use serde::Serialize;
use tracing::info;

use codehub_auth::{OverrideStore, ProjectCapability, RbacEnforcer, RoleStore};
use codehub_core::error::AppError;
use codehub_core::types::{ProjectId, UserId};
use codehub_database::repositories::MembershipRepository;
use codehub_entity::membership::{MemberRole, Membership, ProjectRole};

use crate::context::RequestContext;
use crate::deps::ServiceDeps;

/// Manages existing memberships.
#[derive(Clone)]
pub struct MembershipService {
    memberships: Arc<dyn MembershipRepository>,
    overrides: OverrideStore,
    roles: RoleStore,
    rbac: RbacEnforcer,
}

/// The owner plus every member row of a project.
#[derive(Debug, Clone, Serialize)]
pub struct MemberList {
    /// The project owner (never a membership row).
    pub owner_id: UserId,
    /// Members ordered as stored.
    pub members: Vec<Membership>,
}

impl std::fmt::Debug for MembershipService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MembershipService").finish_non_exhaustive()
    }
}

impl MembershipService {
    /// Creates a new membership service.
    pub fn new(deps: &ServiceDeps) -> Self {
        Self {
            memberships: deps.repos.memberships.clone(),
            overrides: deps.overrides.clone(),
            roles: deps.roles.clone(),
            rbac: deps.rbac,
        }
    }

    /// Lists the owner and members. Anyone who can see the project may
    /// list them.
    pub async fn list_members(
        &self,
        ctx: &RequestContext,
        project_id: ProjectId,
    ) -> Result<MemberList, AppError> {
        let project = self.roles.project(project_id).await?;
        let role = self.roles.role_in(&project, ctx.user_id).await?;
        self.rbac.require(role, ProjectCapability::ViewProject)?;

        Ok(MemberList {
            owner_id: project.owner_id,
            members: self.memberships.list_for_project(project_id).await?,
        })
    }

    /// Changes a member's role.
    ///
    /// Managers may move members between editor and viewer; only the
    /// owner may promote to or demote from admin.
    pub async fn change_role(
        &self,
        ctx: &RequestContext,
        project_id: ProjectId,
        user_id: UserId,
        new_role: MemberRole,
    ) -> Result<Membership, AppError> {
        let caller = self.roles.role_of(project_id, ctx.user_id).await?;
        self.rbac.require(caller, ProjectCapability::ManageMembers)?;

        let current = self
            .memberships
            .find(project_id, user_id)
            .await?
            .ok_or_else(|| AppError::not_found(format!("User {user_id} is not a member")))?;

        let touches_admin = current.role == MemberRole::Admin || new_role == MemberRole::Admin;
        if touches_admin && caller != ProjectRole::Owner {
            return Err(AppError::authorization(
                "Only the project owner can grant or remove the admin role",
            ));
        }

        let membership = self
            .memberships
            .upsert(project_id, user_id, new_role)
            .await?;

        info!(
            user_id = %ctx.user_id,
            project_id = %project_id,
            member_id = %user_id,
            from = %current.role,
            to = %new_role,
            "Member role changed"
        );

        Ok(membership)
    }

    /// Removes a member and every override they hold in the project.
    ///
    /// Members may always remove themselves. Removing someone else needs
    /// the manage-members capability, and removing an admin needs the
    /// owner.
    pub async fn remove_member(
        &self,
        ctx: &RequestContext,
        project_id: ProjectId,
        user_id: UserId,
    ) -> Result<(), AppError> {
        let caller = self.roles.role_of(project_id, ctx.user_id).await?;
        let leaving = ctx.user_id == user_id;

        if !leaving {
            self.rbac.require(caller, ProjectCapability::ManageMembers)?;
        }

        let current = self
            .memberships
            .find(project_id, user_id)
            .await?
            .ok_or_else(|| AppError::not_found(format!("User {user_id} is not a member")))?;

        if !leaving && current.role == MemberRole::Admin && caller != ProjectRole::Owner {
            return Err(AppError::authorization(
                "Only the project owner can remove an admin",
            ));
        }

        // Purge before removal: a user without membership must hold no
        // override rows.
        let purged = self.overrides.purge_member(project_id, user_id).await?;
        self.memberships.remove(project_id, user_id).await?;

        info!(
            user_id = %ctx.user_id,
            project_id = %project_id,
            member_id = %user_id,
            overrides_removed = purged,
            "Member removed"
        );

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use async_trait::async_trait;

    use codehub_core::error::ErrorKind;
    use codehub_core::result::AppResult;
    use codehub_database::repositories::{FolderRepository, OverrideRepository};
    use codehub_database::{MemoryDatabase, Repositories};
    use codehub_entity::folder::CreateFolder;
    use codehub_entity::permission::{
        OverrideFlags, ResourceOverride, ResourceRef, UpsertOverride,
    };

    use super::*;
    use crate::project::{CreateProjectRequest, ProjectService};

    /// Override store whose member purge always fails.
    struct StuckPurge {
        inner: MemoryDatabase,
    }

    #[async_trait]
    impl OverrideRepository for StuckPurge {
        async fn find(
            &self,
            user_id: UserId,
            resource: ResourceRef,
        ) -> AppResult<Option<ResourceOverride>> {
            OverrideRepository::find(&self.inner, user_id, resource).await
        }

        async fn upsert(&self, data: &UpsertOverride) -> AppResult<ResourceOverride> {
            OverrideRepository::upsert(&self.inner, data).await
        }

        async fn delete(&self, user_id: UserId, resource: ResourceRef) -> AppResult<bool> {
            OverrideRepository::delete(&self.inner, user_id, resource).await
        }

        async fn delete_for_resource(&self, resource: ResourceRef) -> AppResult<u64> {
            self.inner.delete_for_resource(resource).await
        }

        async fn delete_for_member(
            &self,
            _project_id: ProjectId,
            _user_id: UserId,
        ) -> AppResult<u64> {
            Err(AppError::service_unavailable("override store offline"))
        }

        async fn list_for_resource(
            &self,
            resource: ResourceRef,
        ) -> AppResult<Vec<ResourceOverride>> {
            self.inner.list_for_resource(resource).await
        }
    }

    struct Setup {
        db: MemoryDatabase,
        service: MembershipService,
        owner: RequestContext,
        project_id: ProjectId,
        bob: UserId,
        grant: ResourceRef,
    }

    /// A project with one editor holding an override on a root folder.
    async fn setup(repos: Repositories, db: MemoryDatabase) -> Setup {
        let deps = ServiceDeps::new(repos);
        let owner = RequestContext::system(UserId::new());
        let project = ProjectService::new(&deps)
            .create_project(
                &owner,
                CreateProjectRequest {
                    name: "team".into(),
                    is_public: true,
                },
            )
            .await
            .unwrap();

        let bob = UserId::new();
        MembershipRepository::upsert(&db, project.id, bob, MemberRole::Editor)
            .await
            .unwrap();
        let folder = FolderRepository::create(
            &db,
            &CreateFolder {
                project_id: project.id,
                parent_id: None,
                name: "src".into(),
                owner_id: owner.user_id,
            },
        )
        .await
        .unwrap();
        let grant = ResourceRef::Folder(folder.id);
        OverrideRepository::upsert(
            &db,
            &UpsertOverride {
                project_id: project.id,
                user_id: bob,
                resource: grant,
                flags: OverrideFlags::new(true, true),
                granted_by: owner.user_id,
            },
        )
        .await
        .unwrap();

        Setup {
            db,
            service: MembershipService::new(&deps),
            owner,
            project_id: project.id,
            bob,
            grant,
        }
    }

    #[tokio::test]
    async fn test_remove_member_purges_overrides() {
        let db = MemoryDatabase::new();
        let s = setup(Repositories::from_memory(&db), db).await;

        s.service
            .remove_member(&s.owner, s.project_id, s.bob)
            .await
            .unwrap();

        assert!(
            MembershipRepository::find(&s.db, s.project_id, s.bob)
                .await
                .unwrap()
                .is_none()
        );
        assert!(
            OverrideRepository::find(&s.db, s.bob, s.grant)
                .await
                .unwrap()
                .is_none()
        );
    }

    #[tokio::test]
    async fn test_failed_purge_keeps_membership() {
        let db = MemoryDatabase::new();
        let mut repos = Repositories::from_memory(&db);
        repos.overrides = Arc::new(StuckPurge { inner: db.clone() });
        let s = setup(repos, db).await;

        let err = s
            .service
            .remove_member(&s.owner, s.project_id, s.bob)
            .await
            .unwrap_err();
        assert!(err.is(ErrorKind::ServiceUnavailable));

        let membership = MembershipRepository::find(&s.db, s.project_id, s.bob)
            .await
            .unwrap();
        assert_eq!(membership.map(|m| m.role), Some(MemberRole::Editor));
    }
}
