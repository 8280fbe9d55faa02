//! Form state, client-side validation and the per-form submit guard
//!
//! A form turns free-text input into a typed create request. Validation runs
//! before any network call; a form that fails validation never reaches the
//! coordinator.

use crate::api::ApiError;
use crate::models::*;
use crate::snapshot::SnapshotError;
use chrono::NaiveDate;
use std::collections::{HashMap, HashSet};
use std::future::Future;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use thiserror::Error;

pub const DEFAULT_UNIT_TYPE: &str = "businessunit";
pub const DEFAULT_CURRENCY: &str = "SAR";
pub const DEFAULT_COMPLETION_PERIOD_M: i32 = 12;
pub const DEFAULT_BID_VALIDITY_D: i32 = 30;

/// Input rejected before any request was made
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("{0} is required.")]
    Required(&'static str),

    #[error("Select a {0}.")]
    SelectionRequired(&'static str),

    #[error("{field} must be a number, got '{value}'.")]
    NotNumeric { field: &'static str, value: String },

    #[error("A business unit cannot be placed under itself or one of its sub-units.")]
    ParentCycle,
}

/// Outcome of a failed form submission
#[derive(Debug, Error)]
pub enum FormError {
    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error(transparent)]
    Api(#[from] ApiError),

    /// The snapshot needed to check the input could not be loaded
    #[error(transparent)]
    Snapshot(#[from] SnapshotError),

    #[error("A submission for this form is already in progress.")]
    Busy,
}

fn trimmed(value: &str) -> String {
    value.trim().to_string()
}

fn optional_text(value: &str) -> Option<String> {
    let value = value.trim();
    (!value.is_empty()).then(|| value.to_string())
}

fn require(value: &str, field: &'static str) -> Result<String, ValidationError> {
    optional_text(value).ok_or(ValidationError::Required(field))
}

/// Blank means zero; anything else must parse to a finite number.
fn parse_amount(value: &str, field: &'static str) -> Result<f64, ValidationError> {
    let value = value.trim();
    if value.is_empty() {
        return Ok(0.0);
    }
    value
        .parse::<f64>()
        .ok()
        .filter(|n| n.is_finite())
        .ok_or_else(|| ValidationError::NotNumeric {
            field,
            value: value.to_string(),
        })
}

fn amount_text(value: f64) -> String {
    value.to_string()
}

// ============================================================================
// Business unit
// ============================================================================

#[derive(Debug, Clone, PartialEq)]
pub struct BusinessUnitForm {
    pub name: String,
    pub unit_type: String,
    pub parent_id: Option<BusinessUnitId>,
    pub manager_id: Option<i64>,
}

impl Default for BusinessUnitForm {
    fn default() -> Self {
        Self {
            name: String::new(),
            unit_type: DEFAULT_UNIT_TYPE.to_string(),
            parent_id: None,
            manager_id: None,
        }
    }
}

impl BusinessUnitForm {
    pub fn from_unit(unit: &BusinessUnit) -> Self {
        Self {
            name: unit.name.clone(),
            unit_type: unit.unit_type.clone(),
            parent_id: unit.parent_id,
            manager_id: unit.manager_id,
        }
    }

    pub fn validate(&self) -> Result<CreateBusinessUnitRequest, ValidationError> {
        Ok(CreateBusinessUnitRequest {
            name: require(&self.name, "Business unit name")?,
            unit_type: optional_text(&self.unit_type)
                .unwrap_or_else(|| DEFAULT_UNIT_TYPE.to_string()),
            parent_id: self.parent_id,
            manager_id: self.manager_id,
        })
    }

    /// Validate an edit of unit `id` against the current tree.
    ///
    /// The new parent must not be `id` itself or any unit below it.
    pub fn validate_edit(
        &self,
        id: BusinessUnitId,
        units: &[BusinessUnit],
    ) -> Result<CreateBusinessUnitRequest, ValidationError> {
        let req = self.validate()?;
        if let Some(parent) = req.parent_id {
            if is_ancestor_or_self(id, parent, units) {
                return Err(ValidationError::ParentCycle);
            }
        }
        Ok(req)
    }
}

/// Whether `id` appears on the parent chain starting at `start`
fn is_ancestor_or_self(
    id: BusinessUnitId,
    start: BusinessUnitId,
    units: &[BusinessUnit],
) -> bool {
    let parents: HashMap<BusinessUnitId, Option<BusinessUnitId>> =
        units.iter().map(|u| (u.id, u.parent_id)).collect();
    let mut seen = HashSet::new();
    let mut cursor = Some(start);
    while let Some(current) = cursor {
        if current == id {
            return true;
        }
        // A cycle already in the data that does not pass through `id`
        if !seen.insert(current) {
            return false;
        }
        cursor = parents.get(&current).copied().flatten();
    }
    false
}

// ============================================================================
// Project
// ============================================================================

/// Project editor state. Budget and bid value stay as typed text until
/// validation so a non-numeric entry can be reported.
#[derive(Debug, Clone, PartialEq)]
pub struct ProjectForm {
    pub name: String,
    pub businessunit_id: Option<BusinessUnitId>,
    pub description: String,
    pub tender_no: String,
    pub scope_of_work: String,
    pub category: ProjectCategory,
    pub budget: String,
    pub bid_value: String,
    pub bid_issue_date: NaiveDate,
    pub bid_due_date: NaiveDate,
    pub funding_currency: String,
    pub include_vat: bool,
}

impl ProjectForm {
    /// Empty form preselecting `businessunit_id`, both bid dates on `today`
    pub fn new(businessunit_id: Option<BusinessUnitId>, today: NaiveDate) -> Self {
        Self {
            name: String::new(),
            businessunit_id,
            description: String::new(),
            tender_no: String::new(),
            scope_of_work: String::new(),
            category: ProjectCategory::default(),
            budget: String::new(),
            bid_value: String::new(),
            bid_issue_date: today,
            bid_due_date: today,
            funding_currency: DEFAULT_CURRENCY.to_string(),
            include_vat: false,
        }
    }

    pub fn from_project(project: &Project, today: NaiveDate) -> Self {
        Self {
            name: project.name.clone(),
            businessunit_id: Some(project.businessunit_id),
            description: project.description.clone(),
            tender_no: project.tender_no.clone(),
            scope_of_work: project.scope_of_work.clone(),
            category: project.category,
            budget: amount_text(project.budget),
            bid_value: amount_text(project.bid_value),
            bid_issue_date: project.bid_issue_date.unwrap_or(today),
            bid_due_date: project.bid_due_date.unwrap_or(today),
            funding_currency: project.funding_currency.clone(),
            include_vat: project.include_vat,
        }
    }

    pub fn validate(&self) -> Result<CreateProjectRequest, ValidationError> {
        let name = require(&self.name, "Project name")?;
        let tender_no = require(&self.tender_no, "Tender number")?;
        let businessunit_id = self
            .businessunit_id
            .ok_or(ValidationError::SelectionRequired("business unit"))?;
        let budget = parse_amount(&self.budget, "Budget")?;
        let bid_value = parse_amount(&self.bid_value, "Bid value")?;

        Ok(CreateProjectRequest {
            name,
            businessunit_id,
            description: trimmed(&self.description),
            tender_no,
            scope_of_work: trimmed(&self.scope_of_work),
            category: self.category,
            funding_currency: optional_text(&self.funding_currency)
                .unwrap_or_else(|| DEFAULT_CURRENCY.to_string()),
            bid_issue_date: self.bid_issue_date,
            tender_purchase_date: self.bid_issue_date,
            tender_purchase_fee: 0.0,
            bid_due_date: self.bid_due_date,
            completion_period_m: DEFAULT_COMPLETION_PERIOD_M,
            bid_validity_d: DEFAULT_BID_VALIDITY_D,
            include_vat: self.include_vat,
            budget,
            bid_value,
            perf_bond_p: 0.0,
            advance_pmt_p: 0.0,
        })
    }
}

// ============================================================================
// Issue
// ============================================================================

#[derive(Debug, Clone, PartialEq)]
pub struct IssueForm {
    /// The project the issue is raised against
    pub project_id: Option<ProjectId>,
    pub name: String,
    pub severity: IssueSeverity,
    pub status: IssueStatus,
    pub opened_on: NaiveDate,
    pub closed_on: Option<NaiveDate>,
    pub description: String,
}

impl IssueForm {
    pub fn new(project_id: Option<ProjectId>, today: NaiveDate) -> Self {
        Self {
            project_id,
            name: String::new(),
            severity: IssueSeverity::default(),
            status: IssueStatus::default(),
            opened_on: today,
            closed_on: None,
            description: String::new(),
        }
    }

    pub fn from_issue(issue: &Issue, today: NaiveDate) -> Self {
        Self {
            project_id: Some(issue.project_id),
            name: issue.name.clone(),
            severity: issue.severity,
            status: issue.status,
            opened_on: issue.opened_on.unwrap_or(today),
            closed_on: issue.closed_on,
            description: issue.description.clone().unwrap_or_default(),
        }
    }

    /// Returns the target project together with the request body
    pub fn validate(&self) -> Result<(ProjectId, CreateIssueRequest), ValidationError> {
        let project_id = self
            .project_id
            .ok_or(ValidationError::SelectionRequired("project"))?;
        let name = require(&self.name, "Issue name")?;

        Ok((
            project_id,
            CreateIssueRequest {
                name,
                severity: self.severity,
                status: self.status,
                opened_on: self.opened_on,
                closed_on: self.closed_on,
                description: optional_text(&self.description),
                owner_id: None,
                workpackage_id: None,
                task_id: None,
            },
        ))
    }
}

// ============================================================================
// Change request
// ============================================================================

#[derive(Debug, Clone, PartialEq)]
pub struct ChangeRequestForm {
    pub project_id: Option<ProjectId>,
    pub name: String,
    pub status: ChangeRequestStatus,
    pub submitted_on: Option<NaiveDate>,
    pub approved_on: Option<NaiveDate>,
    pub description: String,
    pub impact_summary: String,
}

impl ChangeRequestForm {
    pub fn new(project_id: Option<ProjectId>, today: NaiveDate) -> Self {
        Self {
            project_id,
            name: String::new(),
            status: ChangeRequestStatus::default(),
            submitted_on: Some(today),
            approved_on: None,
            description: String::new(),
            impact_summary: String::new(),
        }
    }

    pub fn from_change_request(cr: &ChangeRequest) -> Self {
        Self {
            project_id: Some(cr.project_id),
            name: cr.name.clone(),
            status: cr.status,
            submitted_on: cr.submitted_on,
            approved_on: cr.approved_on,
            description: cr.description.clone().unwrap_or_default(),
            impact_summary: cr.impact_summary.clone().unwrap_or_default(),
        }
    }

    pub fn validate(&self) -> Result<(ProjectId, CreateChangeRequestRequest), ValidationError> {
        let name = require(&self.name, "Change request name")?;
        let project_id = self
            .project_id
            .ok_or(ValidationError::SelectionRequired("project"))?;

        Ok((
            project_id,
            CreateChangeRequestRequest {
                name,
                status: self.status,
                submitted_on: self.submitted_on,
                approved_on: self.approved_on,
                description: optional_text(&self.description),
                impact_summary: optional_text(&self.impact_summary),
                requested_by_id: None,
                workpackage_id: None,
            },
        ))
    }
}

// ============================================================================
// Submit guard
// ============================================================================

/// At most one submission in flight per form.
///
/// Cloning shares the flag, so clones guard the same form.
#[derive(Debug, Clone, Default)]
pub struct SubmitGuard {
    in_flight: Arc<AtomicBool>,
}

/// Releases the guard when dropped
#[derive(Debug)]
pub struct SubmitTicket {
    in_flight: Arc<AtomicBool>,
}

impl Drop for SubmitTicket {
    fn drop(&mut self) {
        self.in_flight.store(false, Ordering::SeqCst);
    }
}

impl SubmitGuard {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_pending(&self) -> bool {
        self.in_flight.load(Ordering::SeqCst)
    }

    pub fn try_begin(&self) -> Result<SubmitTicket, FormError> {
        self.in_flight
            .compare_exchange(false, true, Ordering::SeqCst, Ordering::SeqCst)
            .map_err(|_| FormError::Busy)?;
        Ok(SubmitTicket {
            in_flight: Arc::clone(&self.in_flight),
        })
    }

    /// Drive `submission` while holding the guard. When another submission
    /// holds it, `submission` is dropped unpolled and `Busy` is returned.
    pub async fn run<T, F>(&self, submission: F) -> Result<T, FormError>
    where
        F: Future<Output = Result<T, ApiError>>,
    {
        let _ticket = self.try_begin()?;
        Ok(submission.await?)
    }
}
