//! Permission resolver: gathers facts from the stores and applies the
//! decision policy.
//!
//! Every call re-reads the role, the overrides, and the resource's
//! placement. Nothing is cached, so a revoked override or a moved folder
//! takes effect on the very next decision.

use serde::{Deserialize, Serialize};
use tracing::debug;

use codehub_core::error::AppError;
use codehub_core::result::AppResult;
use codehub_core::types::UserId;
use codehub_entity::membership::ProjectRole;
use codehub_entity::permission::{Action, Decision, ResourceRef};

use super::overrides::OverrideStore;
use super::policy::{self, Placement, PolicyInput, Resolution};
use crate::role::RoleStore;
use crate::tree::{ResourceTree, TreeResource};

/// What the caller could do instead, attached to a denial.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AccessHints {
    /// Read would be allowed.
    pub can_view: bool,
    /// Write would be allowed.
    pub can_edit: bool,
}

/// Introspection answer for "can this user edit this resource".
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EditCapability {
    /// Write would be allowed.
    pub can_edit: bool,
    /// The user owns the project.
    pub is_owner: bool,
    /// The user's effective project role.
    pub role: ProjectRole,
}

/// Decides `(user, resource, action)` triples.
#[derive(Clone)]
pub struct PermissionResolver {
    roles: RoleStore,
    tree: ResourceTree,
    overrides: OverrideStore,
}

impl std::fmt::Debug for PermissionResolver {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PermissionResolver").finish()
    }
}

impl PermissionResolver {
    /// Creates a resolver over the three stores.
    pub fn new(roles: RoleStore, tree: ResourceTree, overrides: OverrideStore) -> Self {
        Self {
            roles,
            tree,
            overrides,
        }
    }

    /// Allow or deny `action` on `resource` for `user_id`.
    pub async fn decide(
        &self,
        user_id: UserId,
        resource: ResourceRef,
        action: Action,
    ) -> AppResult<Decision> {
        Ok(self.evaluate(user_id, resource, action).await?.decision)
    }

    /// Like [`decide`](Self::decide), also reporting the deciding rule.
    pub async fn evaluate(
        &self,
        user_id: UserId,
        resource: ResourceRef,
        action: Action,
    ) -> AppResult<Resolution> {
        let target = self.tree.resolve(resource).await?;
        let facts = self.gather(user_id, &target).await?;
        Ok(self.apply(user_id, &target, &facts, action))
    }

    /// Resolve the resource and fail unless `action` is allowed.
    ///
    /// The denial carries `{canView, canEdit}` hints computed from the same
    /// facts as the decision. Returns the loaded resource on success.
    pub async fn require(
        &self,
        user_id: UserId,
        resource: ResourceRef,
        action: Action,
    ) -> AppResult<TreeResource> {
        let target = self.tree.resolve(resource).await?;
        let facts = self.gather(user_id, &target).await?;

        if self.apply(user_id, &target, &facts, action).is_allowed() {
            return Ok(target);
        }

        if !facts.role.has_access() {
            return Err(AppError::not_found(format!(
                "{} {} not found",
                resource.resource_type(),
                resource.id()
            )));
        }

        let hints = hints_from(&facts);
        Err(
            AppError::authorization(format!("Not allowed to {action} {resource}"))
                .with_details(serde_json::to_value(hints)?),
        )
    }

    /// Read/write hints for `user_id` on `resource`.
    pub async fn hints(&self, user_id: UserId, resource: ResourceRef) -> AppResult<AccessHints> {
        let target = self.tree.resolve(resource).await?;
        let facts = self.gather(user_id, &target).await?;
        Ok(hints_from(&facts))
    }

    /// Whether `user_id` can edit `resource`, plus ownership and role.
    pub async fn edit_capability(
        &self,
        user_id: UserId,
        resource: ResourceRef,
    ) -> AppResult<EditCapability> {
        let target = self.tree.resolve(resource).await?;
        let facts = self.gather(user_id, &target).await?;
        Ok(EditCapability {
            can_edit: policy::evaluate(&facts, Action::Write).is_allowed(),
            is_owner: facts.role == ProjectRole::Owner,
            role: facts.role,
        })
    }

    /// Read the role and the relevant overrides. Override lookups are
    /// skipped when the role alone settles every action.
    async fn gather(&self, user_id: UserId, target: &TreeResource) -> AppResult<PolicyInput> {
        let access = self.roles.access_of(target.project_id(), user_id).await?;
        let role = access.role;
        let placement = placement_of(target);

        let mut facts = PolicyInput {
            role,
            participant: access.participant,
            resource_override: None,
            folder_override: None,
            placement,
        };

        match role {
            ProjectRole::Owner | ProjectRole::Admin | ProjectRole::None => return Ok(facts),
            ProjectRole::Editor | ProjectRole::Viewer => {}
        }
        if !access.participant {
            return Ok(facts);
        }

        facts.resource_override = self.overrides.get(user_id, target.reference()).await?;
        if facts.resource_override.is_none() {
            if let TreeResource::Document(document) = target {
                if let Some(folder_id) = document.folder_id {
                    facts.folder_override = self
                        .overrides
                        .get(user_id, ResourceRef::Folder(folder_id))
                        .await?;
                }
            }
        }

        Ok(facts)
    }

    fn apply(
        &self,
        user_id: UserId,
        target: &TreeResource,
        facts: &PolicyInput,
        action: Action,
    ) -> Resolution {
        let resolution = policy::evaluate(facts, action);
        debug!(
            user_id = %user_id,
            resource = %target.reference(),
            action = %action,
            role = %facts.role,
            decision = ?resolution.decision,
            source = ?resolution.source,
            "Permission decided"
        );
        resolution
    }
}

fn placement_of(target: &TreeResource) -> Placement {
    match target {
        TreeResource::Folder(folder) if folder.parent_id.is_none() => Placement::RootFolder,
        TreeResource::Folder(_) => Placement::NestedFolder,
        TreeResource::Document(document) if document.folder_id.is_none() => {
            Placement::RootDocument
        }
        TreeResource::Document(_) => Placement::FolderDocument,
    }
}

fn hints_from(facts: &PolicyInput) -> AccessHints {
    AccessHints {
        can_view: policy::evaluate(facts, Action::Read).is_allowed(),
        can_edit: policy::evaluate(facts, Action::Write).is_allowed(),
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use codehub_core::error::ErrorKind;
    use codehub_core::types::{FolderId, ProjectId};
    use codehub_database::MemoryDatabase;
    use codehub_database::repositories::{
        DocumentRepository, FolderRepository, MembershipRepository, OverrideRepository,
        ProjectRepository,
    };
    use codehub_entity::document::{CreateDocument, Document};
    use codehub_entity::folder::{CreateFolder, Folder};
    use codehub_entity::membership::MemberRole;
    use codehub_entity::permission::{OverrideFlags, UpsertOverride};
    use codehub_entity::project::CreateProject;

    use super::*;

    struct World {
        db: MemoryDatabase,
        resolver: PermissionResolver,
        project_id: ProjectId,
        alice: UserId,
    }

    impl World {
        async fn new(is_public: bool) -> Self {
            let db = MemoryDatabase::new();
            let alice = UserId::new();
            let project = ProjectRepository::create(
                &db,
                &CreateProject {
                    name: "webapp".into(),
                    owner_id: alice,
                    is_public,
                },
            )
            .await
            .unwrap();
            let resolver = PermissionResolver::new(
                RoleStore::new(Arc::new(db.clone()), Arc::new(db.clone())),
                ResourceTree::new(Arc::new(db.clone()), Arc::new(db.clone())),
                OverrideStore::new(Arc::new(db.clone())),
            );
            Self {
                db,
                resolver,
                project_id: project.id,
                alice,
            }
        }

        async fn member(&self, role: MemberRole) -> UserId {
            let user = UserId::new();
            MembershipRepository::upsert(&self.db, self.project_id, user, role)
                .await
                .unwrap();
            user
        }

        async fn folder(&self, name: &str, parent: Option<FolderId>) -> Folder {
            FolderRepository::create(
                &self.db,
                &CreateFolder {
                    project_id: self.project_id,
                    parent_id: parent,
                    name: name.into(),
                    owner_id: self.alice,
                },
            )
            .await
            .unwrap()
        }

        async fn document(&self, name: &str, folder: Option<FolderId>) -> Document {
            DocumentRepository::create(
                &self.db,
                &CreateDocument {
                    project_id: self.project_id,
                    folder_id: folder,
                    name: name.into(),
                    content: String::new(),
                    owner_id: self.alice,
                },
            )
            .await
            .unwrap()
        }

        async fn grant(&self, user: UserId, resource: ResourceRef, flags: OverrideFlags) {
            OverrideRepository::upsert(
                &self.db,
                &UpsertOverride {
                    project_id: self.project_id,
                    user_id: user,
                    resource,
                    flags,
                    granted_by: self.alice,
                },
            )
            .await
            .unwrap();
        }

        async fn allowed(&self, user: UserId, resource: ResourceRef, action: Action) -> bool {
            self.resolver
                .decide(user, resource, action)
                .await
                .unwrap()
                .is_allowed()
        }
    }

    #[tokio::test]
    async fn test_editor_with_folder_override_edits_inside_but_not_root_document() {
        let world = World::new(false).await;
        let bob = world.member(MemberRole::Editor).await;
        let src = world.folder("src", None).await;
        let app = world.document("app.js", Some(src.id)).await;
        let readme = world.document("readme.md", None).await;
        world
            .grant(bob, ResourceRef::Folder(src.id), OverrideFlags::new(true, false))
            .await;

        assert!(world.allowed(bob, ResourceRef::Document(app.id), Action::Write).await);
        assert!(!world.allowed(bob, ResourceRef::Document(app.id), Action::Delete).await);
        assert!(!world.allowed(bob, ResourceRef::Document(readme.id), Action::Write).await);
        assert!(world.allowed(bob, ResourceRef::Document(readme.id), Action::Read).await);
    }

    #[tokio::test]
    async fn test_document_override_wins_over_folder_override() {
        let world = World::new(false).await;
        let bob = world.member(MemberRole::Viewer).await;
        let src = world.folder("src", None).await;
        let app = world.document("app.js", Some(src.id)).await;
        world
            .grant(bob, ResourceRef::Folder(src.id), OverrideFlags::new(true, true))
            .await;
        world
            .grant(bob, ResourceRef::Document(app.id), OverrideFlags::new(false, false))
            .await;

        let resolution = world
            .resolver
            .evaluate(bob, ResourceRef::Document(app.id), Action::Write)
            .await
            .unwrap();
        assert!(!resolution.is_allowed());
        assert_eq!(resolution.source, policy::DecisionSource::ResourceOverride);
    }

    #[tokio::test]
    async fn test_only_immediate_folder_is_inherited() {
        let world = World::new(false).await;
        let bob = world.member(MemberRole::Editor).await;
        let src = world.folder("src", None).await;
        let lib = world.folder("lib", Some(src.id)).await;
        let util = world.document("util.js", Some(lib.id)).await;
        world
            .grant(bob, ResourceRef::Folder(src.id), OverrideFlags::new(true, true))
            .await;

        assert!(!world.allowed(bob, ResourceRef::Document(util.id), Action::Write).await);
    }

    #[tokio::test]
    async fn test_owner_and_admin_bypass() {
        let world = World::new(false).await;
        let admin = world.member(MemberRole::Admin).await;
        let src = world.folder("src", Some(world.folder("root", None).await.id)).await;
        world
            .grant(admin, ResourceRef::Folder(src.id), OverrideFlags::new(false, false))
            .await;

        for action in [Action::Read, Action::Write, Action::Delete] {
            assert!(world.allowed(world.alice, ResourceRef::Folder(src.id), action).await);
            assert!(world.allowed(admin, ResourceRef::Folder(src.id), action).await);
        }
    }

    #[tokio::test]
    async fn test_public_visitor_reads_only() {
        let world = World::new(true).await;
        let visitor = UserId::new();
        let readme = world.document("readme.md", None).await;

        assert!(world.allowed(visitor, ResourceRef::Document(readme.id), Action::Read).await);
        assert!(!world.allowed(visitor, ResourceRef::Document(readme.id), Action::Write).await);
    }

    #[tokio::test]
    async fn test_public_visitor_leftover_override_does_not_grant_write() {
        let world = World::new(true).await;
        let visitor = UserId::new();
        let src = world.folder("src", None).await;
        let app = world.document("app.js", Some(src.id)).await;
        let readme = world.document("readme.md", None).await;
        world
            .grant(visitor, ResourceRef::Document(readme.id), OverrideFlags::new(true, true))
            .await;
        world
            .grant(visitor, ResourceRef::Folder(src.id), OverrideFlags::new(true, true))
            .await;

        for resource in [
            ResourceRef::Document(readme.id),
            ResourceRef::Document(app.id),
            ResourceRef::Folder(src.id),
        ] {
            assert!(world.allowed(visitor, resource, Action::Read).await);
            assert!(!world.allowed(visitor, resource, Action::Write).await);
            assert!(!world.allowed(visitor, resource, Action::Delete).await);
        }

        let capability = world
            .resolver
            .edit_capability(visitor, ResourceRef::Document(readme.id))
            .await
            .unwrap();
        assert!(!capability.can_edit);
        assert_eq!(capability.role, ProjectRole::Viewer);
    }

    #[tokio::test]
    async fn test_require_denial_carries_hints() {
        let world = World::new(false).await;
        let bob = world.member(MemberRole::Viewer).await;
        let readme = world.document("readme.md", None).await;

        let err = world
            .resolver
            .require(bob, ResourceRef::Document(readme.id), Action::Write)
            .await
            .unwrap_err();
        assert!(err.is(ErrorKind::Authorization));
        assert_eq!(
            err.details,
            Some(serde_json::json!({ "canView": true, "canEdit": false }))
        );
    }

    #[tokio::test]
    async fn test_require_hides_resource_from_outsiders() {
        let world = World::new(false).await;
        let readme = world.document("readme.md", None).await;

        let err = world
            .resolver
            .require(UserId::new(), ResourceRef::Document(readme.id), Action::Read)
            .await
            .unwrap_err();
        assert!(err.is(ErrorKind::NotFound));
    }

    #[tokio::test]
    async fn test_edit_capability_introspection() {
        let world = World::new(false).await;
        let bob = world.member(MemberRole::Editor).await;
        let src = world.folder("src", None).await;

        let owner = world
            .resolver
            .edit_capability(world.alice, ResourceRef::Folder(src.id))
            .await
            .unwrap();
        assert!(owner.can_edit && owner.is_owner);
        assert_eq!(owner.role, ProjectRole::Owner);

        let editor = world
            .resolver
            .edit_capability(bob, ResourceRef::Folder(src.id))
            .await
            .unwrap();
        assert!(editor.can_edit);
        assert!(!editor.is_owner);
        assert_eq!(editor.role, ProjectRole::Editor);
    }

    #[tokio::test]
    async fn test_move_changes_inherited_decision_immediately() {
        let world = World::new(false).await;
        let bob = world.member(MemberRole::Editor).await;
        let src = world.folder("src", None).await;
        let docs = world.folder("docs", None).await;
        let app = world.document("app.js", Some(src.id)).await;
        world
            .grant(bob, ResourceRef::Folder(src.id), OverrideFlags::new(true, false))
            .await;
        assert!(world.allowed(bob, ResourceRef::Document(app.id), Action::Write).await);

        DocumentRepository::move_to(&world.db, app.id, Some(docs.id))
            .await
            .unwrap();
        assert!(!world.allowed(bob, ResourceRef::Document(app.id), Action::Write).await);
    }

    #[tokio::test]
    async fn test_unknown_resource_is_not_found() {
        let world = World::new(false).await;
        let err = world
            .resolver
            .decide(world.alice, ResourceRef::Folder(FolderId::new()), Action::Read)
            .await
            .unwrap_err();
        assert!(err.is(ErrorKind::NotFound));
    }
}
