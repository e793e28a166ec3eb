//! Project lifecycle

use crate::core::{CallerIdentity, LedgerResult, ScopedRepository, Store};
use crate::entities::{NewProject, Project, ProjectPatch};
use chrono::Utc;
use std::sync::Arc;
use uuid::Uuid;
use validator::Validate;

#[derive(Clone)]
pub struct ProjectService {
    store: Arc<dyn Store<Project>>,
}

impl ProjectService {
    pub fn new(store: Arc<dyn Store<Project>>) -> Self {
        Self { store }
    }

    /// Project access bound to the caller
    pub fn repository(&self, caller: &CallerIdentity) -> ScopedRepository<Project> {
        ScopedRepository::new(self.store.clone(), caller)
    }

    pub async fn create(&self, caller: &CallerIdentity, new: NewProject) -> LedgerResult<Project> {
        new.validate()?;
        let project = new.into_project(caller.id(), Utc::now());
        let project = self.repository(caller).create(project).await?;

        tracing::info!(caller = %caller.id(), project = %project.id, "project created");
        Ok(project)
    }

    pub async fn list(&self, caller: &CallerIdentity) -> LedgerResult<Vec<Project>> {
        self.repository(caller).list().await
    }

    pub async fn get(&self, caller: &CallerIdentity, id: Uuid) -> LedgerResult<Project> {
        self.repository(caller).get(id).await
    }

    /// Fetch, apply the patch, save. Last writer wins.
    pub async fn update(
        &self,
        caller: &CallerIdentity,
        id: Uuid,
        patch: ProjectPatch,
    ) -> LedgerResult<Project> {
        let repo = self.repository(caller);
        let mut project = repo.get(id).await?;
        patch.apply(&mut project)?;
        repo.save(project).await
    }

    /// Payments referencing the project are left in place
    pub async fn delete(&self, caller: &CallerIdentity, id: Uuid) -> LedgerResult<Project> {
        let removed = self.repository(caller).delete(id).await?;
        tracing::info!(caller = %caller.id(), project = %id, "project removed");
        Ok(removed)
    }
}
