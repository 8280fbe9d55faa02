//! Create and partial-update request bodies
//!
//! Update requests only serialize the fields that were set, so the backend
//! leaves everything else untouched.

use super::entities::*;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Request to create a business unit
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CreateBusinessUnitRequest {
    pub name: String,
    #[serde(rename = "type")]
    pub unit_type: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub parent_id: Option<BusinessUnitId>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub manager_id: Option<i64>,
}

/// Request to update a business unit
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct UpdateBusinessUnitRequest {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub unit_type: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parent_id: Option<BusinessUnitId>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub manager_id: Option<i64>,
}

impl From<CreateBusinessUnitRequest> for UpdateBusinessUnitRequest {
    fn from(req: CreateBusinessUnitRequest) -> Self {
        Self {
            name: Some(req.name),
            unit_type: Some(req.unit_type),
            parent_id: req.parent_id,
            manager_id: req.manager_id,
        }
    }
}

/// Request to create a project
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CreateProjectRequest {
    pub name: String,
    pub businessunit_id: BusinessUnitId,
    pub description: String,
    pub tender_no: String,
    pub scope_of_work: String,
    pub category: ProjectCategory,
    pub funding_currency: String,
    pub bid_issue_date: NaiveDate,
    pub tender_purchase_date: NaiveDate,
    pub tender_purchase_fee: f64,
    pub bid_due_date: NaiveDate,
    pub completion_period_m: i32,
    pub bid_validity_d: i32,
    pub include_vat: bool,
    pub budget: f64,
    pub bid_value: f64,
    pub perf_bond_p: f64,
    pub advance_pmt_p: f64,
}

/// Request to update a project
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct UpdateProjectRequest {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub businessunit_id: Option<BusinessUnitId>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tender_no: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub scope_of_work: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category: Option<ProjectCategory>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub funding_currency: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bid_issue_date: Option<NaiveDate>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tender_purchase_date: Option<NaiveDate>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tender_purchase_fee: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bid_due_date: Option<NaiveDate>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub completion_period_m: Option<i32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bid_validity_d: Option<i32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub include_vat: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub budget: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bid_value: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub perf_bond_p: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub advance_pmt_p: Option<f64>,
}

impl From<CreateProjectRequest> for UpdateProjectRequest {
    /// An edit form resubmits every field it shows
    fn from(req: CreateProjectRequest) -> Self {
        Self {
            name: Some(req.name),
            businessunit_id: Some(req.businessunit_id),
            description: Some(req.description),
            tender_no: Some(req.tender_no),
            scope_of_work: Some(req.scope_of_work),
            category: Some(req.category),
            funding_currency: Some(req.funding_currency),
            bid_issue_date: Some(req.bid_issue_date),
            tender_purchase_date: Some(req.tender_purchase_date),
            tender_purchase_fee: Some(req.tender_purchase_fee),
            bid_due_date: Some(req.bid_due_date),
            completion_period_m: Some(req.completion_period_m),
            bid_validity_d: Some(req.bid_validity_d),
            include_vat: Some(req.include_vat),
            budget: Some(req.budget),
            bid_value: Some(req.bid_value),
            perf_bond_p: Some(req.perf_bond_p),
            advance_pmt_p: Some(req.advance_pmt_p),
        }
    }
}

/// Request to raise an issue (the project comes from the URL)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CreateIssueRequest {
    pub name: String,
    pub severity: IssueSeverity,
    pub status: IssueStatus,
    pub opened_on: NaiveDate,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub closed_on: Option<NaiveDate>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub owner_id: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub workpackage_id: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub task_id: Option<i64>,
}

/// Request to update an issue
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct UpdateIssueRequest {
    /// Moves the issue to another project when set
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub project_id: Option<ProjectId>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub severity: Option<IssueSeverity>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<IssueStatus>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub opened_on: Option<NaiveDate>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub closed_on: Option<NaiveDate>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub owner_id: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub workpackage_id: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub task_id: Option<i64>,
}

impl From<CreateIssueRequest> for UpdateIssueRequest {
    fn from(req: CreateIssueRequest) -> Self {
        Self {
            project_id: None,
            name: Some(req.name),
            severity: Some(req.severity),
            status: Some(req.status),
            opened_on: Some(req.opened_on),
            closed_on: req.closed_on,
            description: req.description,
            owner_id: req.owner_id,
            workpackage_id: req.workpackage_id,
            task_id: req.task_id,
        }
    }
}

/// Request to raise a change request (the project comes from the URL)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CreateChangeRequestRequest {
    pub name: String,
    pub status: ChangeRequestStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub submitted_on: Option<NaiveDate>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub approved_on: Option<NaiveDate>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub impact_summary: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub requested_by_id: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub workpackage_id: Option<i64>,
}

/// Request to update a change request
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct UpdateChangeRequestRequest {
    /// Moves the change request to another project when set
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub project_id: Option<ProjectId>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<ChangeRequestStatus>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub submitted_on: Option<NaiveDate>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub approved_on: Option<NaiveDate>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub impact_summary: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub requested_by_id: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub workpackage_id: Option<i64>,
}

impl From<CreateChangeRequestRequest> for UpdateChangeRequestRequest {
    fn from(req: CreateChangeRequestRequest) -> Self {
        Self {
            project_id: None,
            name: Some(req.name),
            status: Some(req.status),
            submitted_on: req.submitted_on,
            approved_on: req.approved_on,
            description: req.description,
            impact_summary: req.impact_summary,
            requested_by_id: req.requested_by_id,
            workpackage_id: req.workpackage_id,
        }
    }
}
