//! Write-invalidate mutation coordinator

use crate::api::{ApiError, PmoApi};
use crate::events::{CrudAction, CrudEvent, EntityType, EventEmitter};
use crate::models::*;
use crate::snapshot::SnapshotCache;
use std::sync::Arc;
use tracing::{info, warn};

/// Forwards writes to the backend and keeps the snapshot honest.
///
/// On success the snapshot is invalidated before the call returns, then a
/// [`CrudEvent`] is emitted, so any read issued after a completed write sees
/// a fetch that happened after that write. On failure nothing is
/// invalidated and no event is emitted.
#[derive(Clone)]
pub struct MutationCoordinator {
    api: Arc<dyn PmoApi>,
    cache: SnapshotCache,
    event_emitter: Option<Arc<dyn EventEmitter>>,
}

impl MutationCoordinator {
    pub fn new(api: Arc<dyn PmoApi>, cache: SnapshotCache) -> Self {
        Self {
            api,
            cache,
            event_emitter: None,
        }
    }

    /// Set the emitter notified after each successful write
    pub fn with_event_emitter(mut self, emitter: Arc<dyn EventEmitter>) -> Self {
        self.event_emitter = Some(emitter);
        self
    }

    pub fn cache(&self) -> &SnapshotCache {
        &self.cache
    }

    /// Invalidate on success, log on failure
    async fn settle<T>(
        &self,
        operation: &'static str,
        result: Result<T, ApiError>,
    ) -> Result<T, ApiError> {
        match result {
            Ok(value) => {
                self.cache.invalidate().await;
                Ok(value)
            }
            Err(e) => {
                warn!(operation, status = ?e.status(), error = %e, "Mutation failed");
                Err(e)
            }
        }
    }

    // ========================================================================
    // Business units
    // ========================================================================

    pub async fn create_business_unit(
        &self,
        req: &CreateBusinessUnitRequest,
    ) -> Result<BusinessUnit, ApiError> {
        let result = self.api.create_business_unit(req).await;
        let unit = self.settle("create_business_unit", result).await?;
        if let Some(ref emitter) = self.event_emitter {
            emitter.emit_created(EntityType::BusinessUnit, unit.id, None);
        }
        Ok(unit)
    }

    pub async fn update_business_unit(
        &self,
        id: BusinessUnitId,
        req: &UpdateBusinessUnitRequest,
    ) -> Result<BusinessUnit, ApiError> {
        let result = self.api.update_business_unit(id, req).await;
        let unit = self.settle("update_business_unit", result).await?;
        if let Some(ref emitter) = self.event_emitter {
            emitter.emit_updated(EntityType::BusinessUnit, unit.id, None);
        }
        Ok(unit)
    }

    /// Delete a unit and, on the backend, all of its projects
    pub async fn delete_business_unit(&self, id: BusinessUnitId) -> Result<(), ApiError> {
        let result = self.api.delete_business_unit(id).await;
        self.settle("delete_business_unit", result).await?;
        if let Some(ref emitter) = self.event_emitter {
            emitter.emit_deleted(EntityType::BusinessUnit, id, None);
        }
        Ok(())
    }

    // ========================================================================
    // Projects
    // ========================================================================

    pub async fn create_project(&self, req: &CreateProjectRequest) -> Result<Project, ApiError> {
        let result = self.api.create_project(req).await;
        let project = self.settle("create_project", result).await?;
        if let Some(ref emitter) = self.event_emitter {
            emitter.emit_created(EntityType::Project, project.id, None);
        }
        Ok(project)
    }

    pub async fn update_project(
        &self,
        id: ProjectId,
        req: &UpdateProjectRequest,
    ) -> Result<Project, ApiError> {
        let result = self.api.update_project(id, req).await;
        let project = self.settle("update_project", result).await?;
        if let Some(ref emitter) = self.event_emitter {
            emitter.emit_updated(EntityType::Project, project.id, None);
        }
        Ok(project)
    }

    pub async fn delete_project(&self, id: ProjectId) -> Result<(), ApiError> {
        let result = self.api.delete_project(id).await;
        self.settle("delete_project", result).await?;
        if let Some(ref emitter) = self.event_emitter {
            emitter.emit_deleted(EntityType::Project, id, None);
        }
        Ok(())
    }

    // ========================================================================
    // Issues
    // ========================================================================

    pub async fn create_issue(
        &self,
        project_id: ProjectId,
        req: &CreateIssueRequest,
    ) -> Result<Issue, ApiError> {
        let result = self.api.create_issue(project_id, req).await;
        let issue = self.settle("create_issue", result).await?;
        if let Some(ref emitter) = self.event_emitter {
            emitter.emit_created(EntityType::Issue, issue.id, Some(issue.project_id));
        }
        Ok(issue)
    }

    pub async fn update_issue(
        &self,
        id: IssueId,
        req: &UpdateIssueRequest,
    ) -> Result<Issue, ApiError> {
        let result = self.api.update_issue(id, req).await;
        let issue = self.settle("update_issue", result).await?;
        if let Some(ref emitter) = self.event_emitter {
            emitter.emit_updated(EntityType::Issue, issue.id, Some(issue.project_id));
        }
        Ok(issue)
    }

    pub async fn delete_issue(&self, id: IssueId) -> Result<(), ApiError> {
        let result = self.api.delete_issue(id).await;
        self.settle("delete_issue", result).await?;
        if let Some(ref emitter) = self.event_emitter {
            emitter.emit_deleted(EntityType::Issue, id, None);
        }
        Ok(())
    }

    // ========================================================================
    // Change requests
    // ========================================================================

    pub async fn create_change_request(
        &self,
        project_id: ProjectId,
        req: &CreateChangeRequestRequest,
    ) -> Result<ChangeRequest, ApiError> {
        let result = self.api.create_change_request(project_id, req).await;
        let cr = self.settle("create_change_request", result).await?;
        if let Some(ref emitter) = self.event_emitter {
            emitter.emit_created(EntityType::ChangeRequest, cr.id, Some(cr.project_id));
        }
        Ok(cr)
    }

    pub async fn update_change_request(
        &self,
        id: ChangeRequestId,
        req: &UpdateChangeRequestRequest,
    ) -> Result<ChangeRequest, ApiError> {
        let result = self.api.update_change_request(id, req).await;
        let cr = self.settle("update_change_request", result).await?;
        if let Some(ref emitter) = self.event_emitter {
            emitter.emit_updated(EntityType::ChangeRequest, cr.id, Some(cr.project_id));
        }
        Ok(cr)
    }

    pub async fn delete_change_request(&self, id: ChangeRequestId) -> Result<(), ApiError> {
        let result = self.api.delete_change_request(id).await;
        self.settle("delete_change_request", result).await?;
        if let Some(ref emitter) = self.event_emitter {
            emitter.emit_deleted(EntityType::ChangeRequest, id, None);
        }
        Ok(())
    }

    // ========================================================================
    // Seeding
    // ========================================================================

    pub async fn seed_sample_data(&self) -> Result<SampleDataSummary, ApiError> {
        let result = self.api.seed_sample_data().await;
        let summary = self.settle("seed_sample_data", result).await?;
        info!(
            business_unit_id = summary.business_unit_id,
            project_id = summary.project_id,
            "Sample data seeded"
        );
        if let Some(ref emitter) = self.event_emitter {
            emitter.emit(CrudEvent::new(EntityType::Portfolio, CrudAction::Created, None));
        }
        Ok(summary)
    }
}
