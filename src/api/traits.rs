//! Trait abstraction for the PMO resource operations

use super::error::ApiError;
use crate::models::*;
use async_trait::async_trait;

/// Typed read/write operations against the PMO backend.
///
/// One method per entity per verb. Implementations must be thread-safe
/// (`Send + Sync`) so they can be shared as `Arc<dyn PmoApi>` between the
/// snapshot cache and the mutation coordinator.
///
/// # Implementations
///
/// - [`ApiClient`](super::ApiClient): the real HTTP transport
/// - `MockPmoApi` (tests only): in-memory tree with fetch counting and
///   failure injection
#[async_trait]
pub trait PmoApi: Send + Sync {
    // ========================================================================
    // Business units
    // ========================================================================

    /// Fetch the whole business-unit tree (the snapshot)
    async fn list_business_units(&self) -> Result<Vec<BusinessUnit>, ApiError>;

    async fn create_business_unit(
        &self,
        req: &CreateBusinessUnitRequest,
    ) -> Result<BusinessUnit, ApiError>;

    async fn update_business_unit(
        &self,
        id: BusinessUnitId,
        req: &UpdateBusinessUnitRequest,
    ) -> Result<BusinessUnit, ApiError>;

    /// Delete a unit; the backend cascades to its projects
    async fn delete_business_unit(&self, id: BusinessUnitId) -> Result<(), ApiError>;

    // ========================================================================
    // Projects
    // ========================================================================

    async fn get_project(&self, id: ProjectId) -> Result<Project, ApiError>;

    async fn create_project(&self, req: &CreateProjectRequest) -> Result<Project, ApiError>;

    async fn update_project(
        &self,
        id: ProjectId,
        req: &UpdateProjectRequest,
    ) -> Result<Project, ApiError>;

    async fn delete_project(&self, id: ProjectId) -> Result<(), ApiError>;

    // ========================================================================
    // Issues
    // ========================================================================

    async fn create_issue(
        &self,
        project_id: ProjectId,
        req: &CreateIssueRequest,
    ) -> Result<Issue, ApiError>;

    async fn update_issue(&self, id: IssueId, req: &UpdateIssueRequest)
        -> Result<Issue, ApiError>;

    async fn delete_issue(&self, id: IssueId) -> Result<(), ApiError>;

    // ========================================================================
    // Change requests
    // ========================================================================

    async fn create_change_request(
        &self,
        project_id: ProjectId,
        req: &CreateChangeRequestRequest,
    ) -> Result<ChangeRequest, ApiError>;

    async fn update_change_request(
        &self,
        id: ChangeRequestId,
        req: &UpdateChangeRequestRequest,
    ) -> Result<ChangeRequest, ApiError>;

    async fn delete_change_request(&self, id: ChangeRequestId) -> Result<(), ApiError>;

    // ========================================================================
    // Seeding
    // ========================================================================

    /// Ask the backend to insert its demo dataset
    async fn seed_sample_data(&self) -> Result<SampleDataSummary, ApiError>;
}
