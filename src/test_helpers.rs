//! Test helper factories
//!
//! Provides convenience functions for creating PMO records with sensible
//! defaults, plus builders for a coordinator wired to the in-memory mock.
#![allow(dead_code)]

use crate::api::mock::MockPmoApi;
use crate::api::PmoApi;
use crate::events::EventBus;
use crate::models::*;
use crate::mutations::MutationCoordinator;
use crate::snapshot::SnapshotCache;
use chrono::NaiveDate;
use std::sync::Arc;
use std::time::Duration;

// ============================================================================
// Record factories
// ============================================================================

pub fn test_date() -> NaiveDate {
    NaiveDate::from_ymd_opt(2025, 3, 1).unwrap()
}

/// A business unit with no projects
pub fn test_unit(id: BusinessUnitId, name: &str) -> BusinessUnit {
    BusinessUnit {
        id,
        name: name.to_string(),
        unit_type: "businessunit".to_string(),
        parent_id: None,
        manager_id: None,
        projects: Vec::new(),
    }
}

/// A substation project with zero budget, no issues and no change requests
pub fn test_project(id: ProjectId, unit_id: BusinessUnitId, name: &str) -> Project {
    Project {
        id,
        name: name.to_string(),
        businessunit_id: unit_id,
        description: String::new(),
        tender_no: format!("TND-{}", id),
        scope_of_work: String::new(),
        category: ProjectCategory::Substation,
        funding_currency: "SAR".to_string(),
        bid_issue_date: Some(test_date()),
        tender_purchase_date: Some(test_date()),
        tender_purchase_fee: 0.0,
        bid_due_date: Some(test_date()),
        completion_period_m: 12,
        bid_validity_d: 30,
        include_vat: false,
        budget: 0.0,
        bid_value: 0.0,
        perf_bond_p: 0.0,
        advance_pmt_p: 0.0,
        issues: Vec::new(),
        change_requests: Vec::new(),
    }
}

pub fn test_issue(
    id: IssueId,
    project_id: ProjectId,
    severity: IssueSeverity,
    status: IssueStatus,
) -> Issue {
    Issue {
        id,
        name: format!("Issue {}", id),
        project_id,
        workpackage_id: None,
        task_id: None,
        owner_id: None,
        status,
        severity,
        opened_on: Some(test_date()),
        closed_on: None,
        description: None,
    }
}

pub fn test_change_request(
    id: ChangeRequestId,
    project_id: ProjectId,
    name: &str,
) -> ChangeRequest {
    ChangeRequest {
        id,
        name: name.to_string(),
        project_id,
        workpackage_id: None,
        requested_by_id: None,
        status: ChangeRequestStatus::Draft,
        submitted_on: Some(test_date()),
        approved_on: None,
        description: None,
        impact_summary: None,
    }
}

pub fn test_issue_request(name: &str) -> CreateIssueRequest {
    CreateIssueRequest {
        name: name.to_string(),
        severity: IssueSeverity::Low,
        status: IssueStatus::Open,
        opened_on: test_date(),
        closed_on: None,
        description: None,
        owner_id: None,
        workpackage_id: None,
        task_id: None,
    }
}

pub fn test_change_request_request(name: &str) -> CreateChangeRequestRequest {
    CreateChangeRequestRequest {
        name: name.to_string(),
        status: ChangeRequestStatus::Draft,
        submitted_on: Some(test_date()),
        approved_on: None,
        description: None,
        impact_summary: None,
        requested_by_id: None,
        workpackage_id: None,
    }
}

pub fn test_project_request(unit_id: BusinessUnitId, name: &str) -> CreateProjectRequest {
    CreateProjectRequest {
        name: name.to_string(),
        businessunit_id: unit_id,
        description: String::new(),
        tender_no: "TND-NEW".to_string(),
        scope_of_work: String::new(),
        category: ProjectCategory::Ohtl,
        funding_currency: "SAR".to_string(),
        bid_issue_date: test_date(),
        tender_purchase_date: test_date(),
        tender_purchase_fee: 0.0,
        bid_due_date: test_date(),
        completion_period_m: 12,
        bid_validity_d: 30,
        include_vat: false,
        budget: 500.0,
        bid_value: 650.0,
        perf_bond_p: 0.0,
        advance_pmt_p: 0.0,
    }
}

/// "Grid East" with one substation project (budget 100, bid 120) carrying
/// one open high-severity issue.
pub fn grid_east() -> BusinessUnit {
    let mut project = test_project(7, 1, "East Substation");
    project.budget = 100.0;
    project.bid_value = 120.0;
    project
        .issues
        .push(test_issue(70, 7, IssueSeverity::High, IssueStatus::Open));
    let mut unit = test_unit(1, "Grid East");
    unit.projects.push(project);
    unit
}

// ============================================================================
// Wiring
// ============================================================================

/// Mock backend, cache and coordinator sharing one event bus
pub struct TestHarness {
    pub api: Arc<MockPmoApi>,
    pub cache: SnapshotCache,
    pub coordinator: MutationCoordinator,
    pub events: EventBus,
}

pub fn harness(units: Vec<BusinessUnit>) -> TestHarness {
    harness_with_window(units, Duration::from_secs(120))
}

pub fn harness_with_window(units: Vec<BusinessUnit>, stale_after: Duration) -> TestHarness {
    let api = Arc::new(MockPmoApi::with_units(units));
    let dyn_api: Arc<dyn PmoApi> = api.clone();
    let cache = SnapshotCache::new(dyn_api.clone(), stale_after);
    let events = EventBus::default();
    let coordinator = MutationCoordinator::new(dyn_api, cache.clone())
        .with_event_emitter(Arc::new(events.clone()));
    TestHarness {
        api,
        cache,
        coordinator,
        events,
    }
}
