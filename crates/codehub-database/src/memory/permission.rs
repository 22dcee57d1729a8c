use async_trait::async_trait;
use chrono::Utc;

use codehub_core::error::AppError;
use codehub_core::result::AppResult;
use codehub_core::types::{ProjectId, UserId};
use codehub_entity::permission::{ResourceOverride, ResourceRef, UpsertOverride};

use super::MemoryDatabase;
use crate::repositories::OverrideRepository;

#[async_trait]
impl OverrideRepository for MemoryDatabase {
    async fn find(
        &self,
        user_id: UserId,
        resource: ResourceRef,
    ) -> AppResult<Option<ResourceOverride>> {
        Ok(self
            .tables
            .read()
            .await
            .overrides
            .get(&(resource, user_id))
            .cloned())
    }

    async fn upsert(&self, data: &UpsertOverride) -> AppResult<ResourceOverride> {
        let mut tables = self.tables.write().await;
        let exists = match data.resource {
            ResourceRef::Folder(id) => tables.folders.contains_key(&id),
            ResourceRef::Document(id) => tables.documents.contains_key(&id),
        };
        if !exists {
            return Err(AppError::not_found(format!(
                "Resource {} not found",
                data.resource
            )));
        }

        let entry = ResourceOverride {
            project_id: data.project_id,
            user_id: data.user_id,
            resource: data.resource,
            flags: data.flags,
            granted_by: data.granted_by,
            updated_at: Utc::now(),
        };
        tables
            .overrides
            .insert((data.resource, data.user_id), entry.clone());
        Ok(entry)
    }

    async fn delete(&self, user_id: UserId, resource: ResourceRef) -> AppResult<bool> {
        Ok(self
            .tables
            .write()
            .await
            .overrides
            .remove(&(resource, user_id))
            .is_some())
    }

    async fn delete_for_resource(&self, resource: ResourceRef) -> AppResult<u64> {
        let mut tables = self.tables.write().await;
        let before = tables.overrides.len();
        tables.overrides.retain(|(r, _), _| *r != resource);
        Ok((before - tables.overrides.len()) as u64)
    }

    async fn delete_for_member(&self, project_id: ProjectId, user_id: UserId) -> AppResult<u64> {
        let mut tables = self.tables.write().await;
        let before = tables.overrides.len();
        tables
            .overrides
            .retain(|(_, u), o| !(*u == user_id && o.project_id == project_id));
        Ok((before - tables.overrides.len()) as u64)
    }

    async fn list_for_resource(&self, resource: ResourceRef) -> AppResult<Vec<ResourceOverride>> {
        let tables = self.tables.read().await;
        let mut entries: Vec<ResourceOverride> = tables
            .overrides
            .iter()
            .filter(|((r, _), _)| *r == resource)
            .map(|(_, o)| o.clone())
            .collect();
        entries.sort_by_key(|o| o.updated_at);
        Ok(entries)
    }
}

#[cfg(test)]
mod tests {
    use codehub_core::types::UserId;
    use codehub_entity::folder::CreateFolder;
    use codehub_entity::permission::OverrideFlags;
    use codehub_entity::project::CreateProject;

    use super::*;
    use crate::repositories::{FolderRepository, ProjectRepository};

    async fn seed() -> (MemoryDatabase, ProjectId, UserId, ResourceRef, ResourceRef) {
        let db = MemoryDatabase::new();
        let owner = UserId::new();
        let project = ProjectRepository::create(
            &db,
            &CreateProject {
                name: "demo".into(),
                owner_id: owner,
                is_public: false,
            },
        )
        .await
        .unwrap();
        let parent = FolderRepository::create(
            &db,
            &CreateFolder {
                project_id: project.id,
                parent_id: None,
                name: "src".into(),
                owner_id: owner,
            },
        )
        .await
        .unwrap();
        let child = FolderRepository::create(
            &db,
            &CreateFolder {
                project_id: project.id,
                parent_id: Some(parent.id),
                name: "lib".into(),
                owner_id: owner,
            },
        )
        .await
        .unwrap();
        (
            db,
            project.id,
            owner,
            ResourceRef::Folder(parent.id),
            ResourceRef::Folder(child.id),
        )
    }

    fn grant(project_id: ProjectId, user_id: UserId, resource: ResourceRef) -> UpsertOverride {
        UpsertOverride {
            project_id,
            user_id,
            resource,
            flags: OverrideFlags::new(true, false),
            granted_by: UserId::new(),
        }
    }

    #[tokio::test]
    async fn test_upsert_overwrites_single_row() {
        let (db, project_id, _, parent, _) = seed().await;
        let bob = UserId::new();

        db.upsert(&grant(project_id, bob, parent)).await.unwrap();
        let mut second = grant(project_id, bob, parent);
        second.flags = OverrideFlags::new(false, true);
        db.upsert(&second).await.unwrap();

        let entries = db.list_for_resource(parent).await.unwrap();
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].flags, OverrideFlags::new(false, true));
    }

    #[tokio::test]
    async fn test_deleting_folder_drops_descendant_overrides() {
        let (db, project_id, _, parent, child) = seed().await;
        let bob = UserId::new();
        db.upsert(&grant(project_id, bob, child)).await.unwrap();

        let ResourceRef::Folder(parent_id) = parent else {
            unreachable!()
        };
        assert!(FolderRepository::delete(&db, parent_id).await.unwrap());
        assert!(db.find(bob, child).await.unwrap().is_none());
        assert!(FolderRepository::find_by_id(&db, parent_id)
            .await
            .unwrap()
            .is_none());
    }

    #[tokio::test]
    async fn test_delete_for_member_is_scoped_to_project() {
        let (db, project_id, _, parent, child) = seed().await;
        let bob = UserId::new();
        let carol = UserId::new();
        db.upsert(&grant(project_id, bob, parent)).await.unwrap();
        db.upsert(&grant(project_id, bob, child)).await.unwrap();
        db.upsert(&grant(project_id, carol, child)).await.unwrap();

        assert_eq!(db.delete_for_member(project_id, bob).await.unwrap(), 2);
        assert!(db.find(carol, child).await.unwrap().is_some());
    }

    #[tokio::test]
    async fn test_upsert_on_missing_resource_is_not_found() {
        let (db, project_id, _, _, _) = seed().await;
        let missing = ResourceRef::Folder(codehub_core::types::FolderId::new());
        let err = db
            .upsert(&grant(project_id, UserId::new(), missing))
            .await
            .unwrap_err();
        assert!(err.is(codehub_core::error::ErrorKind::NotFound));
    }
}
