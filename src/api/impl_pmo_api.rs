//! PmoApi implementation for ApiClient
//!
//! Fixed path template and method per operation. Issue and change-request
//! creation is scoped under the owning project; everything else addresses
//! the entity directly.

use super::client::{ApiClient, RequestOptions};
use super::error::ApiError;
use super::traits::PmoApi;
use crate::models::*;
use async_trait::async_trait;
use reqwest::Method;
use serde::Serialize;

fn json_body<B: Serialize>(
    method: Method,
    path: &str,
    body: &B,
) -> Result<RequestOptions, ApiError> {
    let value = serde_json::to_value(body).map_err(|source| ApiError::Encode {
        path: path.to_string(),
        source,
    })?;
    Ok(RequestOptions::new(method).with_body(value))
}

#[async_trait]
impl PmoApi for ApiClient {
    async fn list_business_units(&self) -> Result<Vec<BusinessUnit>, ApiError> {
        self.fetch("/api/business-units", RequestOptions::get()).await
    }

    async fn create_business_unit(
        &self,
        req: &CreateBusinessUnitRequest,
    ) -> Result<BusinessUnit, ApiError> {
        let path = "/api/business-units";
        self.fetch(path, json_body(Method::POST, path, req)?).await
    }

    async fn update_business_unit(
        &self,
        id: BusinessUnitId,
        req: &UpdateBusinessUnitRequest,
    ) -> Result<BusinessUnit, ApiError> {
        let path = format!("/api/business-units/{}", id);
        self.fetch(&path, json_body(Method::PUT, &path, req)?).await
    }

    async fn delete_business_unit(&self, id: BusinessUnitId) -> Result<(), ApiError> {
        self.execute(&format!("/api/business-units/{}", id), RequestOptions::delete())
            .await
    }

    async fn get_project(&self, id: ProjectId) -> Result<Project, ApiError> {
        self.fetch(&format!("/api/projects/{}", id), RequestOptions::get())
            .await
    }

    async fn create_project(&self, req: &CreateProjectRequest) -> Result<Project, ApiError> {
        let path = "/api/projects";
        self.fetch(path, json_body(Method::POST, path, req)?).await
    }

    async fn update_project(
        &self,
        id: ProjectId,
        req: &UpdateProjectRequest,
    ) -> Result<Project, ApiError> {
        let path = format!("/api/projects/{}", id);
        self.fetch(&path, json_body(Method::PUT, &path, req)?).await
    }

    async fn delete_project(&self, id: ProjectId) -> Result<(), ApiError> {
        self.execute(&format!("/api/projects/{}", id), RequestOptions::delete())
            .await
    }

    async fn create_issue(
        &self,
        project_id: ProjectId,
        req: &CreateIssueRequest,
    ) -> Result<Issue, ApiError> {
        let path = format!("/api/projects/{}/issues", project_id);
        self.fetch(&path, json_body(Method::POST, &path, req)?).await
    }

    async fn update_issue(
        &self,
        id: IssueId,
        req: &UpdateIssueRequest,
    ) -> Result<Issue, ApiError> {
        let path = format!("/api/issues/{}", id);
        self.fetch(&path, json_body(Method::PUT, &path, req)?).await
    }

    async fn delete_issue(&self, id: IssueId) -> Result<(), ApiError> {
        self.execute(&format!("/api/issues/{}", id), RequestOptions::delete())
            .await
    }

    async fn create_change_request(
        &self,
        project_id: ProjectId,
        req: &CreateChangeRequestRequest,
    ) -> Result<ChangeRequest, ApiError> {
        let path = format!("/api/projects/{}/change-requests", project_id);
        self.fetch(&path, json_body(Method::POST, &path, req)?).await
    }

    async fn update_change_request(
        &self,
        id: ChangeRequestId,
        req: &UpdateChangeRequestRequest,
    ) -> Result<ChangeRequest, ApiError> {
        let path = format!("/api/change-requests/{}", id);
        self.fetch(&path, json_body(Method::PUT, &path, req)?).await
    }

    async fn delete_change_request(&self, id: ChangeRequestId) -> Result<(), ApiError> {
        self.execute(
            &format!("/api/change-requests/{}", id),
            RequestOptions::delete(),
        )
        .await
    }

    async fn seed_sample_data(&self) -> Result<SampleDataSummary, ApiError> {
        self.fetch("/api/sample-data", RequestOptions::new(Method::POST))
            .await
    }
}
