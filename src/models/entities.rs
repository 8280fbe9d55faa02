//! Business-unit tree records as served by `GET /api/business-units`

use chrono::NaiveDate;
use serde::de::Error as _;
use serde::{Deserialize, Deserializer, Serialize};
use std::fmt;
use std::str::FromStr;

pub type BusinessUnitId = i64;
pub type ProjectId = i64;
pub type IssueId = i64;
pub type ChangeRequestId = i64;

/// Error returned when a status/category string is not one of the known values
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("invalid {kind} '{value}' (expected one of: {expected})")]
pub struct ParseEnumError {
    pub kind: &'static str,
    pub value: String,
    pub expected: &'static str,
}

// ============================================================================
// Enums
// ============================================================================

/// Project category
///
/// The backend stores this as an integer code (0, 1, 2) and the dashboard
/// speaks names; both forms decode, the name is always what gets encoded.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ProjectCategory {
    #[default]
    Substation,
    Ohtl,
    UgCable,
}

impl ProjectCategory {
    pub const ALL: [ProjectCategory; 3] = [
        ProjectCategory::Substation,
        ProjectCategory::Ohtl,
        ProjectCategory::UgCable,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            ProjectCategory::Substation => "substation",
            ProjectCategory::Ohtl => "ohtl",
            ProjectCategory::UgCable => "ug_cable",
        }
    }

    /// Map the backend's integer code to a category
    pub fn from_code(code: u8) -> Option<Self> {
        match code {
            0 => Some(ProjectCategory::Substation),
            1 => Some(ProjectCategory::Ohtl),
            2 => Some(ProjectCategory::UgCable),
            _ => None,
        }
    }
}

impl fmt::Display for ProjectCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ProjectCategory {
    type Err = ParseEnumError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "substation" => Ok(ProjectCategory::Substation),
            "ohtl" => Ok(ProjectCategory::Ohtl),
            "ug_cable" => Ok(ProjectCategory::UgCable),
            other => Err(ParseEnumError {
                kind: "project category",
                value: other.to_string(),
                expected: "substation, ohtl, ug_cable",
            }),
        }
    }
}

impl<'de> Deserialize<'de> for ProjectCategory {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum Raw {
            Name(String),
            Code(u8),
        }

        match Raw::deserialize(deserializer)? {
            Raw::Name(name) => name.parse().map_err(D::Error::custom),
            Raw::Code(code) => Self::from_code(code)
                .ok_or_else(|| D::Error::custom(format!("unknown project category code {}", code))),
        }
    }
}

/// Issue severity
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum IssueSeverity {
    #[default]
    Low,
    Medium,
    High,
}

impl IssueSeverity {
    pub fn as_str(&self) -> &'static str {
        match self {
            IssueSeverity::Low => "low",
            IssueSeverity::Medium => "medium",
            IssueSeverity::High => "high",
        }
    }
}

impl fmt::Display for IssueSeverity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for IssueSeverity {
    type Err = ParseEnumError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "low" => Ok(IssueSeverity::Low),
            "medium" => Ok(IssueSeverity::Medium),
            "high" => Ok(IssueSeverity::High),
            other => Err(ParseEnumError {
                kind: "issue severity",
                value: other.to_string(),
                expected: "low, medium, high",
            }),
        }
    }
}

/// Status of an issue
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum IssueStatus {
    #[default]
    Open,
    InProgress,
    Resolved,
    Closed,
}

impl IssueStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            IssueStatus::Open => "open",
            IssueStatus::InProgress => "in_progress",
            IssueStatus::Resolved => "resolved",
            IssueStatus::Closed => "closed",
        }
    }
}

impl fmt::Display for IssueStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for IssueStatus {
    type Err = ParseEnumError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "open" => Ok(IssueStatus::Open),
            "in_progress" => Ok(IssueStatus::InProgress),
            "resolved" => Ok(IssueStatus::Resolved),
            "closed" => Ok(IssueStatus::Closed),
            other => Err(ParseEnumError {
                kind: "issue status",
                value: other.to_string(),
                expected: "open, in_progress, resolved, closed",
            }),
        }
    }
}

/// Status of a change request
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ChangeRequestStatus {
    #[default]
    Draft,
    Submitted,
    Approved,
    Rejected,
}

impl ChangeRequestStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            ChangeRequestStatus::Draft => "draft",
            ChangeRequestStatus::Submitted => "submitted",
            ChangeRequestStatus::Approved => "approved",
            ChangeRequestStatus::Rejected => "rejected",
        }
    }
}

impl fmt::Display for ChangeRequestStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ChangeRequestStatus {
    type Err = ParseEnumError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "draft" => Ok(ChangeRequestStatus::Draft),
            "submitted" => Ok(ChangeRequestStatus::Submitted),
            "approved" => Ok(ChangeRequestStatus::Approved),
            "rejected" => Ok(ChangeRequestStatus::Rejected),
            other => Err(ParseEnumError {
                kind: "change request status",
                value: other.to_string(),
                expected: "draft, submitted, approved, rejected",
            }),
        }
    }
}

// ============================================================================
// Records
// ============================================================================

/// A business unit with its embedded projects
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BusinessUnit {
    pub id: BusinessUnitId,
    pub name: String,
    /// Unit kind ("businessunit", "division", ...)
    #[serde(rename = "type", default)]
    pub unit_type: String,
    #[serde(default)]
    pub parent_id: Option<BusinessUnitId>,
    #[serde(default)]
    pub manager_id: Option<i64>,
    #[serde(default)]
    pub projects: Vec<Project>,
}

/// A project with its embedded issues and change requests
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Project {
    pub id: ProjectId,
    pub name: String,
    pub businessunit_id: BusinessUnitId,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub tender_no: String,
    #[serde(default)]
    pub scope_of_work: String,
    #[serde(default)]
    pub category: ProjectCategory,
    #[serde(default)]
    pub funding_currency: String,
    #[serde(default)]
    pub bid_issue_date: Option<NaiveDate>,
    #[serde(default)]
    pub tender_purchase_date: Option<NaiveDate>,
    #[serde(default)]
    pub tender_purchase_fee: f64,
    #[serde(default)]
    pub bid_due_date: Option<NaiveDate>,
    /// Completion period in months
    #[serde(default)]
    pub completion_period_m: i32,
    /// Bid validity in days
    #[serde(default)]
    pub bid_validity_d: i32,
    #[serde(default)]
    pub include_vat: bool,
    #[serde(default)]
    pub budget: f64,
    #[serde(default)]
    pub bid_value: f64,
    /// Performance bond, percent
    #[serde(default)]
    pub perf_bond_p: f64,
    /// Advance payment, percent
    #[serde(default)]
    pub advance_pmt_p: f64,
    #[serde(default)]
    pub issues: Vec<Issue>,
    #[serde(default)]
    pub change_requests: Vec<ChangeRequest>,
}

impl Project {
    /// True when an unresolved high-severity issue is attached.
    ///
    /// Only `resolved` clears the flag; a `closed` high issue still counts.
    pub fn is_at_risk(&self) -> bool {
        self.issues.iter().any(Issue::is_blocking)
    }
}

/// An issue raised against a project
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Issue {
    pub id: IssueId,
    pub name: String,
    pub project_id: ProjectId,
    #[serde(default)]
    pub workpackage_id: Option<i64>,
    #[serde(default)]
    pub task_id: Option<i64>,
    #[serde(default)]
    pub owner_id: Option<i64>,
    pub status: IssueStatus,
    pub severity: IssueSeverity,
    #[serde(default)]
    pub opened_on: Option<NaiveDate>,
    #[serde(default)]
    pub closed_on: Option<NaiveDate>,
    #[serde(default)]
    pub description: Option<String>,
}

impl Issue {
    pub fn is_blocking(&self) -> bool {
        self.severity == IssueSeverity::High && self.status != IssueStatus::Resolved
    }
}

/// A change request raised against a project
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChangeRequest {
    pub id: ChangeRequestId,
    pub name: String,
    pub project_id: ProjectId,
    #[serde(default)]
    pub workpackage_id: Option<i64>,
    #[serde(default)]
    pub requested_by_id: Option<i64>,
    pub status: ChangeRequestStatus,
    #[serde(default)]
    pub submitted_on: Option<NaiveDate>,
    #[serde(default)]
    pub approved_on: Option<NaiveDate>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub impact_summary: Option<String>,
}

/// Response of `POST /api/sample-data`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SampleDataSummary {
    pub business_unit_id: BusinessUnitId,
    pub project_id: ProjectId,
}
