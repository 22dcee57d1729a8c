//! Override management: grant, revoke, subtree cascades, introspection.

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tracing::info;

use codehub_auth::{
    CascadeEngine, CascadeReport, DecisionSource, EditCapability, OverrideStore,
    PermissionResolver, ProjectCapability, RbacEnforcer, Resolution, ResourceTree, RoleStore,
    TreeResource,
};
use codehub_core::error::{AppError, ErrorKind};
use codehub_core::types::{FolderId, ProjectId, UserId};
use codehub_database::repositories::MembershipRepository;
use codehub_entity::membership::ProjectRole;
use codehub_entity::permission::{
    Action, OverrideFlags, ResourceOverride, ResourceRef, UpsertOverride,
};

use crate::context::RequestContext;
use crate::deps::ServiceDeps;

/// Manages per-resource overrides.
#[derive(Clone)]
pub struct PermissionService {
    memberships: Arc<dyn MembershipRepository>,
    overrides: OverrideStore,
    tree: ResourceTree,
    resolver: Arc<PermissionResolver>,
    cascade: Arc<CascadeEngine>,
    roles: RoleStore,
    rbac: RbacEnforcer,
}

/// Request to grant an override.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GrantOverrideRequest {
    /// The member receiving the override.
    pub user_id: UserId,
    /// Allow write.
    #[serde(default)]
    pub can_edit: bool,
    /// Allow delete.
    #[serde(default)]
    pub can_delete: bool,
}

impl GrantOverrideRequest {
    fn flags(&self) -> OverrideFlags {
        OverrideFlags::new(self.can_edit, self.can_delete)
    }
}

/// Which cascade a retry continues.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CascadeOperation {
    /// Continue a grant.
    Grant,
    /// Continue a revoke.
    Revoke,
}

/// Request to apply the pending part of an interrupted cascade.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RetryCascadeRequest {
    /// Project the resources belong to.
    pub project_id: ProjectId,
    /// The interrupted operation.
    pub operation: CascadeOperation,
    /// The member the cascade targets.
    pub user_id: UserId,
    /// Allow write (grants only).
    #[serde(default)]
    pub can_edit: bool,
    /// Allow delete (grants only).
    #[serde(default)]
    pub can_delete: bool,
    /// The `pending` list of the earlier report.
    pub resources: Vec<ResourceRef>,
}

impl std::fmt::Debug for PermissionService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PermissionService").finish_non_exhaustive()
    }
}

impl PermissionService {
    /// Creates a new permission service.
    pub fn new(deps: &ServiceDeps) -> Self {
        Self {
            memberships: deps.repos.memberships.clone(),
            overrides: deps.overrides.clone(),
            tree: deps.tree.clone(),
            resolver: deps.resolver.clone(),
            cascade: deps.cascade.clone(),
            roles: deps.roles.clone(),
            rbac: deps.rbac,
        }
    }

    /// Grants (or overwrites) an override on a single resource.
    pub async fn grant(
        &self,
        ctx: &RequestContext,
        resource: ResourceRef,
        req: GrantOverrideRequest,
    ) -> Result<ResourceOverride, AppError> {
        let target = self.authorize_manager(ctx, resource).await?;
        self.require_member(target.project_id(), req.user_id).await?;

        let entry = self
            .overrides
            .set(&UpsertOverride {
                project_id: target.project_id(),
                user_id: req.user_id,
                resource,
                flags: req.flags(),
                granted_by: ctx.user_id,
            })
            .await?;

        info!(
            user_id = %ctx.user_id,
            resource = %resource,
            member_id = %req.user_id,
            can_edit = entry.flags.can_edit,
            can_delete = entry.flags.can_delete,
            "Override granted"
        );

        Ok(entry)
    }

    /// Removes an override. Returns whether one existed.
    pub async fn revoke(
        &self,
        ctx: &RequestContext,
        resource: ResourceRef,
        user_id: UserId,
    ) -> Result<bool, AppError> {
        self.authorize_manager(ctx, resource).await?;
        let removed = self.overrides.remove(user_id, resource).await?;

        info!(
            user_id = %ctx.user_id,
            resource = %resource,
            member_id = %user_id,
            removed = removed,
            "Override revoked"
        );

        Ok(removed)
    }

    /// Grants an override on a folder and everything below it.
    pub async fn grant_subtree(
        &self,
        ctx: &RequestContext,
        folder_id: FolderId,
        req: GrantOverrideRequest,
    ) -> Result<CascadeReport, AppError> {
        let target = self
            .authorize_manager(ctx, ResourceRef::Folder(folder_id))
            .await?;
        self.require_member(target.project_id(), req.user_id).await?;

        self.cascade
            .grant_subtree(folder_id, req.user_id, req.flags(), ctx.user_id)
            .await?
            .into_result()
    }

    /// Revokes a member's overrides on a folder and everything below it.
    pub async fn revoke_subtree(
        &self,
        ctx: &RequestContext,
        folder_id: FolderId,
        user_id: UserId,
    ) -> Result<CascadeReport, AppError> {
        self.authorize_manager(ctx, ResourceRef::Folder(folder_id))
            .await?;
        self.cascade
            .revoke_subtree(folder_id, user_id)
            .await?
            .into_result()
    }

    /// Applies the pending part of an interrupted grant or revoke.
    ///
    /// Every listed resource must belong to the named project. Resources
    /// deleted since the first attempt are skipped.
    pub async fn retry_cascade(
        &self,
        ctx: &RequestContext,
        req: RetryCascadeRequest,
    ) -> Result<CascadeReport, AppError> {
        let role = self.roles.role_of(req.project_id, ctx.user_id).await?;
        self.rbac.require(role, ProjectCapability::ManageOverrides)?;

        let mut targets = Vec::with_capacity(req.resources.len());
        for resource in &req.resources {
            match self.tree.resolve(*resource).await {
                Ok(found) if found.project_id() == req.project_id => targets.push(*resource),
                Ok(_) => {
                    return Err(AppError::validation(format!(
                        "{resource} does not belong to project {}",
                        req.project_id
                    )));
                }
                Err(e) if e.is(ErrorKind::NotFound) => {}
                Err(e) => return Err(e),
            }
        }

        let report = match req.operation {
            CascadeOperation::Grant => {
                self.require_member(req.project_id, req.user_id).await?;
                let flags = OverrideFlags::new(req.can_edit, req.can_delete);
                self.cascade
                    .grant_resources(req.project_id, targets, req.user_id, flags, ctx.user_id)
                    .await?
            }
            CascadeOperation::Revoke => {
                self.cascade
                    .revoke_resources(targets, req.user_id)
                    .await?
            }
        };
        report.into_result()
    }

    /// Every override on a resource.
    pub async fn list_overrides(
        &self,
        ctx: &RequestContext,
        resource: ResourceRef,
    ) -> Result<Vec<ResourceOverride>, AppError> {
        self.authorize_manager(ctx, resource).await?;
        self.overrides.list(resource).await
    }

    /// How the caller's request for `action` would be decided.
    pub async fn check(
        &self,
        ctx: &RequestContext,
        resource: ResourceRef,
        action: Action,
    ) -> Result<Resolution, AppError> {
        let resolution = self.resolver.evaluate(ctx.user_id, resource, action).await?;
        if resolution.source == DecisionSource::NoAccess {
            return Err(AppError::not_found(format!(
                "{} {} not found",
                resource.resource_type(),
                resource.id()
            )));
        }
        Ok(resolution)
    }

    /// Whether the caller can edit a resource, with ownership and role.
    pub async fn can_edit(
        &self,
        ctx: &RequestContext,
        resource: ResourceRef,
    ) -> Result<EditCapability, AppError> {
        let capability = self.resolver.edit_capability(ctx.user_id, resource).await?;
        if capability.role == ProjectRole::None {
            return Err(AppError::not_found(format!(
                "{} {} not found",
                resource.resource_type(),
                resource.id()
            )));
        }
        Ok(capability)
    }

    /// Resolve the resource and require the caller to manage overrides in
    /// its project.
    async fn authorize_manager(
        &self,
        ctx: &RequestContext,
        resource: ResourceRef,
    ) -> Result<TreeResource, AppError> {
        let target = self.tree.resolve(resource).await?;
        let role = self.roles.role_of(target.project_id(), ctx.user_id).await?;
        self.rbac.require(role, ProjectCapability::ManageOverrides)?;
        Ok(target)
    }

    /// Overrides only ever name members. The owner holds no membership
    /// row and is rejected here too.
    async fn require_member(&self, project_id: ProjectId, user_id: UserId) -> Result<(), AppError> {
        if self.memberships.find(project_id, user_id).await?.is_none() {
            return Err(AppError::validation(format!(
                "User {user_id} is not a member of project {project_id}"
            )));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use codehub_database::{MemoryDatabase, Repositories};
    use codehub_entity::membership::MemberRole;

    use super::*;
    use crate::document::{CreateDocumentRequest, DocumentService};
    use crate::folder::{CreateFolderRequest, FolderService};
    use crate::membership::MembershipService;
    use crate::project::{CreateProjectRequest, ProjectService};

    struct Workspace {
        db: MemoryDatabase,
        deps: ServiceDeps,
        alice: RequestContext,
        bob: RequestContext,
        project_id: ProjectId,
    }

    async fn workspace(bob_role: MemberRole) -> Workspace {
        let db = MemoryDatabase::new();
        let deps = ServiceDeps::new(Repositories::from_memory(&db));
        let alice = RequestContext::system(UserId::new());
        let bob = RequestContext::system(UserId::new());

        let project = ProjectService::new(&deps)
            .create_project(
                &alice,
                CreateProjectRequest {
                    name: "webapp".into(),
                    is_public: false,
                },
            )
            .await
            .unwrap();
        deps.repos
            .memberships
            .upsert(project.id, bob.user_id, bob_role)
            .await
            .unwrap();

        Workspace {
            db,
            deps,
            alice,
            bob,
            project_id: project.id,
        }
    }

    async fn folder(ws: &Workspace, name: &str, parent: Option<FolderId>) -> FolderId {
        FolderService::new(&ws.deps)
            .create_folder(
                &ws.alice,
                CreateFolderRequest {
                    project_id: ws.project_id,
                    parent_id: parent,
                    name: name.into(),
                },
            )
            .await
            .unwrap()
            .id
    }

    async fn document(
        ws: &Workspace,
        name: &str,
        folder_id: Option<FolderId>,
    ) -> codehub_core::types::DocumentId {
        DocumentService::new(&ws.deps)
            .create_document(
                &ws.alice,
                CreateDocumentRequest {
                    project_id: ws.project_id,
                    folder_id,
                    name: name.into(),
                    content: String::new(),
                },
            )
            .await
            .unwrap()
            .id
    }

    fn edit_only(user_id: UserId) -> GrantOverrideRequest {
        GrantOverrideRequest {
            user_id,
            can_edit: true,
            can_delete: false,
        }
    }

    #[tokio::test]
    async fn test_editor_gains_write_inside_granted_folder_only() {
        let ws = workspace(MemberRole::Editor).await;
        let src = folder(&ws, "src", None).await;
        let app = document(&ws, "app.js", Some(src)).await;
        let readme = document(&ws, "readme.md", None).await;
        let permissions = PermissionService::new(&ws.deps);
        let documents = DocumentService::new(&ws.deps);

        permissions
            .grant(&ws.alice, ResourceRef::Folder(src), edit_only(ws.bob.user_id))
            .await
            .unwrap();

        documents
            .update_content(&ws.bob, app, "console.log(1)")
            .await
            .unwrap();
        let err = documents
            .update_content(&ws.bob, readme, "# hi")
            .await
            .unwrap_err();
        assert!(err.is(ErrorKind::Authorization));
        assert_eq!(
            err.details,
            Some(serde_json::json!({ "canView": true, "canEdit": false }))
        );
    }

    #[tokio::test]
    async fn test_non_manager_cannot_grant() {
        let ws = workspace(MemberRole::Editor).await;
        let src = folder(&ws, "src", None).await;

        let err = PermissionService::new(&ws.deps)
            .grant(&ws.bob, ResourceRef::Folder(src), edit_only(ws.bob.user_id))
            .await
            .unwrap_err();
        assert!(err.is(ErrorKind::Authorization));
    }

    #[tokio::test]
    async fn test_grant_target_must_be_member() {
        let ws = workspace(MemberRole::Viewer).await;
        let src = folder(&ws, "src", None).await;
        let permissions = PermissionService::new(&ws.deps);

        for target in [UserId::new(), ws.alice.user_id] {
            let err = permissions
                .grant(&ws.alice, ResourceRef::Folder(src), edit_only(target))
                .await
                .unwrap_err();
            assert!(err.is(ErrorKind::Validation));
        }
    }

    #[tokio::test]
    async fn test_subtree_grant_then_revoke_restores_defaults() {
        let ws = workspace(MemberRole::Viewer).await;
        let src = folder(&ws, "src", None).await;
        let lib = folder(&ws, "lib", Some(src)).await;
        let util = document(&ws, "util.js", Some(lib)).await;
        let permissions = PermissionService::new(&ws.deps);

        let report = permissions
            .grant_subtree(&ws.alice, src, edit_only(ws.bob.user_id))
            .await
            .unwrap();
        assert_eq!(report.applied.len(), 3);

        let allowed = permissions
            .check(&ws.bob, ResourceRef::Document(util), Action::Write)
            .await
            .unwrap();
        assert!(allowed.is_allowed());

        let report = permissions
            .revoke_subtree(&ws.alice, src, ws.bob.user_id)
            .await
            .unwrap();
        assert_eq!(report.applied.len(), 3);

        let denied = permissions
            .check(&ws.bob, ResourceRef::Document(util), Action::Write)
            .await
            .unwrap();
        assert!(!denied.is_allowed());
        assert_eq!(denied.source, DecisionSource::RoleDefault);
    }

    #[tokio::test]
    async fn test_member_removal_purges_overrides() {
        let ws = workspace(MemberRole::Editor).await;
        let src = folder(&ws, "src", None).await;
        PermissionService::new(&ws.deps)
            .grant(&ws.alice, ResourceRef::Folder(src), edit_only(ws.bob.user_id))
            .await
            .unwrap();

        MembershipService::new(&ws.deps)
            .remove_member(&ws.alice, ws.project_id, ws.bob.user_id)
            .await
            .unwrap();

        let remaining = ws
            .deps
            .overrides
            .get(ws.bob.user_id, ResourceRef::Folder(src))
            .await
            .unwrap();
        assert!(remaining.is_none());
    }

    #[tokio::test]
    async fn test_move_into_descendant_is_rejected() {
        let ws = workspace(MemberRole::Admin).await;
        let a = folder(&ws, "a", None).await;
        let b = folder(&ws, "b", Some(a)).await;
        let folders = FolderService::new(&ws.deps);

        let err = folders.move_folder(&ws.bob, a, Some(b)).await.unwrap_err();
        assert!(err.is(ErrorKind::StructuralViolation));

        let unchanged = folders.get_folder(&ws.alice, a).await.unwrap();
        assert_eq!(unchanged.parent_id, None);
    }

    #[tokio::test]
    async fn test_folder_delete_removes_subtree_and_overrides() {
        let ws = workspace(MemberRole::Editor).await;
        let src = folder(&ws, "src", None).await;
        let app = document(&ws, "app.js", Some(src)).await;
        PermissionService::new(&ws.deps)
            .grant(&ws.alice, ResourceRef::Document(app), edit_only(ws.bob.user_id))
            .await
            .unwrap();

        let report = FolderService::new(&ws.deps)
            .delete_folder(&ws.alice, src)
            .await
            .unwrap();
        assert_eq!(report.applied.len(), 2);

        let overrides = codehub_database::repositories::OverrideRepository::list_for_resource(
            &ws.db,
            ResourceRef::Document(app),
        )
        .await
        .unwrap();
        assert!(overrides.is_empty());
    }

    #[tokio::test]
    async fn test_can_edit_hides_project_from_outsiders() {
        let ws = workspace(MemberRole::Viewer).await;
        let src = folder(&ws, "src", None).await;
        let stranger = RequestContext::system(UserId::new());

        let err = PermissionService::new(&ws.deps)
            .can_edit(&stranger, ResourceRef::Folder(src))
            .await
            .unwrap_err();
        assert!(err.is(ErrorKind::NotFound));
    }
}
