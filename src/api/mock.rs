//! In-memory mock implementation of PmoApi for testing without a backend.

use super::error::ApiError;
use super::traits::PmoApi;
use crate::models::*;
use async_trait::async_trait;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;
use std::time::Duration;
use tokio::sync::RwLock;

/// In-memory business-unit tree behaving like the backend.
///
/// Counts list fetches and write calls, can delay list responses (to exercise
/// request coalescing) and can fail reads or writes with a given HTTP status.
/// Deleting a unit or project cascades like the server does.
pub struct MockPmoApi {
    units: RwLock<Vec<BusinessUnit>>,
    next_id: AtomicUsize,
    list_calls: AtomicUsize,
    write_calls: AtomicUsize,
    list_delay: Mutex<Option<Duration>>,
    list_failure: Mutex<Option<u16>>,
    write_failure: Mutex<Option<u16>>,
}

impl MockPmoApi {
    /// Create a new empty mock backend.
    pub fn new() -> Self {
        Self::with_units(Vec::new())
    }

    /// Create a mock backend pre-seeded with `units`.
    pub fn with_units(units: Vec<BusinessUnit>) -> Self {
        let max_id = units
            .iter()
            .flat_map(|u| {
                std::iter::once(u.id).chain(u.projects.iter().flat_map(|p| {
                    std::iter::once(p.id)
                        .chain(p.issues.iter().map(|i| i.id))
                        .chain(p.change_requests.iter().map(|c| c.id))
                }))
            })
            .max()
            .unwrap_or(0);

        Self {
            units: RwLock::new(units),
            next_id: AtomicUsize::new(max_id as usize + 1),
            list_calls: AtomicUsize::new(0),
            write_calls: AtomicUsize::new(0),
            list_delay: Mutex::new(None),
            list_failure: Mutex::new(None),
            write_failure: Mutex::new(None),
        }
    }

    /// Number of `list_business_units` calls served so far
    pub fn list_calls(&self) -> usize {
        self.list_calls.load(Ordering::SeqCst)
    }

    /// Number of write calls attempted so far (failed ones included)
    pub fn write_calls(&self) -> usize {
        self.write_calls.load(Ordering::SeqCst)
    }

    pub fn set_list_delay(&self, delay: Option<Duration>) {
        *self.list_delay.lock().unwrap() = delay;
    }

    /// Make every list call fail with `status` (None restores success)
    pub fn fail_lists_with(&self, status: Option<u16>) {
        *self.list_failure.lock().unwrap() = status;
    }

    /// Make every write call fail with `status` (None restores success)
    pub fn fail_writes_with(&self, status: Option<u16>) {
        *self.write_failure.lock().unwrap() = status;
    }

    /// Copy of the current server-side tree
    pub async fn units(&self) -> Vec<BusinessUnit> {
        self.units.read().await.clone()
    }

    fn alloc_id(&self) -> i64 {
        self.next_id.fetch_add(1, Ordering::SeqCst) as i64
    }

    fn failure(status: u16) -> ApiError {
        ApiError::RequestFailed {
            status,
            status_text: "Mock Failure".to_string(),
            body: format!("{{\"detail\":\"mock failure {}\"}}", status),
        }
    }

    fn not_found(what: &str, id: i64) -> ApiError {
        ApiError::RequestFailed {
            status: 404,
            status_text: "Not Found".to_string(),
            body: format!("{{\"detail\":\"{} {} not found\"}}", what, id),
        }
    }

    fn check_write(&self) -> Result<(), ApiError> {
        self.write_calls.fetch_add(1, Ordering::SeqCst);
        match *self.write_failure.lock().unwrap() {
            Some(status) => Err(Self::failure(status)),
            None => Ok(()),
        }
    }

    fn find_project(units: &mut [BusinessUnit], id: ProjectId) -> Option<&mut Project> {
        units
            .iter_mut()
            .flat_map(|u| u.projects.iter_mut())
            .find(|p| p.id == id)
    }

    fn take_project(units: &mut [BusinessUnit], id: ProjectId) -> Option<Project> {
        for unit in units.iter_mut() {
            if let Some(pos) = unit.projects.iter().position(|p| p.id == id) {
                return Some(unit.projects.remove(pos));
            }
        }
        None
    }

    fn take_issue(units: &mut [BusinessUnit], id: IssueId) -> Option<Issue> {
        for project in units.iter_mut().flat_map(|u| u.projects.iter_mut()) {
            if let Some(pos) = project.issues.iter().position(|i| i.id == id) {
                return Some(project.issues.remove(pos));
            }
        }
        None
    }

    fn take_change_request(
        units: &mut [BusinessUnit],
        id: ChangeRequestId,
    ) -> Option<ChangeRequest> {
        for project in units.iter_mut().flat_map(|u| u.projects.iter_mut()) {
            if let Some(pos) = project.change_requests.iter().position(|c| c.id == id) {
                return Some(project.change_requests.remove(pos));
            }
        }
        None
    }
}

impl Default for MockPmoApi {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl PmoApi for MockPmoApi {
    async fn list_business_units(&self) -> Result<Vec<BusinessUnit>, ApiError> {
        self.list_calls.fetch_add(1, Ordering::SeqCst);
        let delay = *self.list_delay.lock().unwrap();
        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }
        let failure = *self.list_failure.lock().unwrap();
        if let Some(status) = failure {
            return Err(Self::failure(status));
        }
        Ok(self.units.read().await.clone())
    }

    async fn create_business_unit(
        &self,
        req: &CreateBusinessUnitRequest,
    ) -> Result<BusinessUnit, ApiError> {
        self.check_write()?;
        let unit = BusinessUnit {
            id: self.alloc_id(),
            name: req.name.clone(),
            unit_type: req.unit_type.clone(),
            parent_id: req.parent_id,
            manager_id: req.manager_id,
            projects: Vec::new(),
        };
        self.units.write().await.push(unit.clone());
        Ok(unit)
    }

    async fn update_business_unit(
        &self,
        id: BusinessUnitId,
        req: &UpdateBusinessUnitRequest,
    ) -> Result<BusinessUnit, ApiError> {
        self.check_write()?;
        let mut units = self.units.write().await;
        let unit = units
            .iter_mut()
            .find(|u| u.id == id)
            .ok_or_else(|| Self::not_found("Business unit", id))?;
        if let Some(ref name) = req.name {
            unit.name = name.clone();
        }
        if let Some(ref unit_type) = req.unit_type {
            unit.unit_type = unit_type.clone();
        }
        if req.parent_id.is_some() {
            unit.parent_id = req.parent_id;
        }
        if req.manager_id.is_some() {
            unit.manager_id = req.manager_id;
        }
        Ok(unit.clone())
    }

    async fn delete_business_unit(&self, id: BusinessUnitId) -> Result<(), ApiError> {
        self.check_write()?;
        let mut units = self.units.write().await;
        let before = units.len();
        units.retain(|u| u.id != id);
        if units.len() == before {
            return Err(Self::not_found("Business unit", id));
        }
        Ok(())
    }

    async fn get_project(&self, id: ProjectId) -> Result<Project, ApiError> {
        let mut units = self.units.write().await;
        Self::find_project(&mut units, id)
            .map(|p| p.clone())
            .ok_or_else(|| Self::not_found("Project", id))
    }

    async fn create_project(&self, req: &CreateProjectRequest) -> Result<Project, ApiError> {
        self.check_write()?;
        let mut units = self.units.write().await;
        let unit = units
            .iter_mut()
            .find(|u| u.id == req.businessunit_id)
            .ok_or_else(|| Self::not_found("Business unit", req.businessunit_id))?;
        let project = Project {
            id: self.alloc_id(),
            name: req.name.clone(),
            businessunit_id: req.businessunit_id,
            description: req.description.clone(),
            tender_no: req.tender_no.clone(),
            scope_of_work: req.scope_of_work.clone(),
            category: req.category,
            funding_currency: req.funding_currency.clone(),
            bid_issue_date: Some(req.bid_issue_date),
            tender_purchase_date: Some(req.tender_purchase_date),
            tender_purchase_fee: req.tender_purchase_fee,
            bid_due_date: Some(req.bid_due_date),
            completion_period_m: req.completion_period_m,
            bid_validity_d: req.bid_validity_d,
            include_vat: req.include_vat,
            budget: req.budget,
            bid_value: req.bid_value,
            perf_bond_p: req.perf_bond_p,
            advance_pmt_p: req.advance_pmt_p,
            issues: Vec::new(),
            change_requests: Vec::new(),
        };
        unit.projects.push(project.clone());
        Ok(project)
    }

    async fn update_project(
        &self,
        id: ProjectId,
        req: &UpdateProjectRequest,
    ) -> Result<Project, ApiError> {
        self.check_write()?;
        let mut units = self.units.write().await;
        if let Some(target) = req.businessunit_id {
            if !units.iter().any(|u| u.id == target) {
                return Err(Self::not_found("Business unit", target));
            }
        }
        let mut project =
            Self::take_project(&mut units, id).ok_or_else(|| Self::not_found("Project", id))?;

        if let Some(ref v) = req.name {
            project.name = v.clone();
        }
        if let Some(v) = req.businessunit_id {
            project.businessunit_id = v;
        }
        if let Some(ref v) = req.description {
            project.description = v.clone();
        }
        if let Some(ref v) = req.tender_no {
            project.tender_no = v.clone();
        }
        if let Some(ref v) = req.scope_of_work {
            project.scope_of_work = v.clone();
        }
        if let Some(v) = req.category {
            project.category = v;
        }
        if let Some(ref v) = req.funding_currency {
            project.funding_currency = v.clone();
        }
        if req.bid_issue_date.is_some() {
            project.bid_issue_date = req.bid_issue_date;
        }
        if req.tender_purchase_date.is_some() {
            project.tender_purchase_date = req.tender_purchase_date;
        }
        if let Some(v) = req.tender_purchase_fee {
            project.tender_purchase_fee = v;
        }
        if req.bid_due_date.is_some() {
            project.bid_due_date = req.bid_due_date;
        }
        if let Some(v) = req.completion_period_m {
            project.completion_period_m = v;
        }
        if let Some(v) = req.bid_validity_d {
            project.bid_validity_d = v;
        }
        if let Some(v) = req.include_vat {
            project.include_vat = v;
        }
        if let Some(v) = req.budget {
            project.budget = v;
        }
        if let Some(v) = req.bid_value {
            project.bid_value = v;
        }
        if let Some(v) = req.perf_bond_p {
            project.perf_bond_p = v;
        }
        if let Some(v) = req.advance_pmt_p {
            project.advance_pmt_p = v;
        }

        let result = project.clone();
        if let Some(unit) = units.iter_mut().find(|u| u.id == project.businessunit_id) {
            unit.projects.push(project);
        }
        Ok(result)
    }

    async fn delete_project(&self, id: ProjectId) -> Result<(), ApiError> {
        self.check_write()?;
        let mut units = self.units.write().await;
        Self::take_project(&mut units, id)
            .map(|_| ())
            .ok_or_else(|| Self::not_found("Project", id))
    }

    async fn create_issue(
        &self,
        project_id: ProjectId,
        req: &CreateIssueRequest,
    ) -> Result<Issue, ApiError> {
        self.check_write()?;
        let mut units = self.units.write().await;
        let project = Self::find_project(&mut units, project_id)
            .ok_or_else(|| Self::not_found("Project", project_id))?;
        let issue = Issue {
            id: self.alloc_id(),
            name: req.name.clone(),
            project_id,
            workpackage_id: req.workpackage_id,
            task_id: req.task_id,
            owner_id: req.owner_id,
            status: req.status,
            severity: req.severity,
            opened_on: Some(req.opened_on),
            closed_on: req.closed_on,
            description: req.description.clone(),
        };
        project.issues.push(issue.clone());
        Ok(issue)
    }

    async fn update_issue(
        &self,
        id: IssueId,
        req: &UpdateIssueRequest,
    ) -> Result<Issue, ApiError> {
        self.check_write()?;
        let mut units = self.units.write().await;
        if let Some(target) = req.project_id {
            if Self::find_project(&mut units, target).is_none() {
                return Err(Self::not_found("Project", target));
            }
        }
        let mut issue =
            Self::take_issue(&mut units, id).ok_or_else(|| Self::not_found("Issue", id))?;

        if let Some(v) = req.project_id {
            issue.project_id = v;
        }
        if let Some(ref v) = req.name {
            issue.name = v.clone();
        }
        if let Some(v) = req.severity {
            issue.severity = v;
        }
        if let Some(v) = req.status {
            issue.status = v;
        }
        if req.opened_on.is_some() {
            issue.opened_on = req.opened_on;
        }
        if req.closed_on.is_some() {
            issue.closed_on = req.closed_on;
        }
        if req.description.is_some() {
            issue.description = req.description.clone();
        }
        if req.owner_id.is_some() {
            issue.owner_id = req.owner_id;
        }

        let result = issue.clone();
        if let Some(project) = Self::find_project(&mut units, issue.project_id) {
            project.issues.push(issue);
        }
        Ok(result)
    }

    async fn delete_issue(&self, id: IssueId) -> Result<(), ApiError> {
        self.check_write()?;
        let mut units = self.units.write().await;
        Self::take_issue(&mut units, id)
            .map(|_| ())
            .ok_or_else(|| Self::not_found("Issue", id))
    }

    async fn create_change_request(
        &self,
        project_id: ProjectId,
        req: &CreateChangeRequestRequest,
    ) -> Result<ChangeRequest, ApiError> {
        self.check_write()?;
        let mut units = self.units.write().await;
        let project = Self::find_project(&mut units, project_id)
            .ok_or_else(|| Self::not_found("Project", project_id))?;
        let change_request = ChangeRequest {
            id: self.alloc_id(),
            name: req.name.clone(),
            project_id,
            workpackage_id: req.workpackage_id,
            requested_by_id: req.requested_by_id,
            status: req.status,
            submitted_on: req.submitted_on,
            approved_on: req.approved_on,
            description: req.description.clone(),
            impact_summary: req.impact_summary.clone(),
        };
        project.change_requests.push(change_request.clone());
        Ok(change_request)
    }

    async fn update_change_request(
        &self,
        id: ChangeRequestId,
        req: &UpdateChangeRequestRequest,
    ) -> Result<ChangeRequest, ApiError> {
        self.check_write()?;
        let mut units = self.units.write().await;
        if let Some(target) = req.project_id {
            if Self::find_project(&mut units, target).is_none() {
                return Err(Self::not_found("Project", target));
            }
        }
        let mut change_request = Self::take_change_request(&mut units, id)
            .ok_or_else(|| Self::not_found("Change request", id))?;

        if let Some(v) = req.project_id {
            change_request.project_id = v;
        }
        if let Some(ref v) = req.name {
            change_request.name = v.clone();
        }
        if let Some(v) = req.status {
            change_request.status = v;
        }
        if req.submitted_on.is_some() {
            change_request.submitted_on = req.submitted_on;
        }
        if req.approved_on.is_some() {
            change_request.approved_on = req.approved_on;
        }
        if req.description.is_some() {
            change_request.description = req.description.clone();
        }
        if req.impact_summary.is_some() {
            change_request.impact_summary = req.impact_summary.clone();
        }

        let result = change_request.clone();
        if let Some(project) = Self::find_project(&mut units, change_request.project_id) {
            project.change_requests.push(change_request);
        }
        Ok(result)
    }

    async fn delete_change_request(&self, id: ChangeRequestId) -> Result<(), ApiError> {
        self.check_write()?;
        let mut units = self.units.write().await;
        Self::take_change_request(&mut units, id)
            .map(|_| ())
            .ok_or_else(|| Self::not_found("Change request", id))
    }

    async fn seed_sample_data(&self) -> Result<SampleDataSummary, ApiError> {
        self.check_write()?;
        let unit_id = self.alloc_id();
        let project_id = self.alloc_id();
        let mut project =
            crate::test_helpers::test_project(project_id, unit_id, "Riyadh Substation Upgrade");
        project.tender_no = "ACME-RYD-001".to_string();
        let mut unit = crate::test_helpers::test_unit(unit_id, "Acme Power");
        unit.projects.push(project);
        self.units.write().await.push(unit);
        Ok(SampleDataSummary {
            business_unit_id: unit_id,
            project_id,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_helpers::*;

    #[tokio::test]
    async fn test_delete_unit_cascades_projects() {
        let mut unit = test_unit(3, "Grid West");
        unit.projects.push(test_project(30, 3, "Line A"));
        unit.projects.push(test_project(31, 3, "Line B"));
        let mock = MockPmoApi::with_units(vec![unit, test_unit(4, "Grid North")]);

        mock.delete_business_unit(3).await.unwrap();

        let units = mock.units().await;
        assert_eq!(units.len(), 1);
        assert!(mock.get_project(30).await.is_err());
    }

    #[tokio::test]
    async fn test_ids_continue_after_seeded_max() {
        let mut unit = test_unit(1, "Grid East");
        unit.projects.push(test_project(7, 1, "Substation 7"));
        let mock = MockPmoApi::with_units(vec![unit]);

        let issue = mock
            .create_issue(7, &test_issue_request("Relay fault"))
            .await
            .unwrap();
        assert_eq!(issue.id, 8);
        assert_eq!(issue.project_id, 7);
    }

    #[tokio::test]
    async fn test_write_failure_leaves_tree_untouched() {
        let mock = MockPmoApi::with_units(vec![test_unit(1, "Grid East")]);
        mock.fail_writes_with(Some(500));

        let err = mock.delete_business_unit(1).await.unwrap_err();
        assert_eq!(err.status(), Some(500));
        assert_eq!(mock.units().await.len(), 1);
        assert_eq!(mock.write_calls(), 1);
    }

    #[tokio::test]
    async fn test_update_project_moves_between_units() {
        let mut east = test_unit(1, "Grid East");
        east.projects.push(test_project(10, 1, "Moving"));
        let mock = MockPmoApi::with_units(vec![east, test_unit(2, "Grid West")]);

        let req = UpdateProjectRequest {
            businessunit_id: Some(2),
            ..Default::default()
        };
        let moved = mock.update_project(10, &req).await.unwrap();
        assert_eq!(moved.businessunit_id, 2);

        let units = mock.units().await;
        assert!(units[0].projects.is_empty());
        assert_eq!(units[1].projects[0].id, 10);
    }
}
