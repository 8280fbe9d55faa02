//! Project manager screen: risk, portfolio table, per-project issues

use super::forms::{FormError, IssueForm, ProjectForm, SubmitGuard};
use super::{heading, money, render_load_error, today, Role, ScreenContext};
use crate::models::*;
use crate::snapshot::{PortfolioViews, ProjectRow, SnapshotError};

pub struct ProjectManagerScreen {
    ctx: ScreenContext,
    selected_project: Option<ProjectId>,
    project_guard: SubmitGuard,
    issue_guard: SubmitGuard,
}

impl ProjectManagerScreen {
    pub fn new(ctx: ScreenContext) -> Self {
        Self {
            ctx,
            selected_project: None,
            project_guard: SubmitGuard::new(),
            issue_guard: SubmitGuard::new(),
        }
    }

    pub fn select_project(&mut self, id: Option<ProjectId>) {
        self.selected_project = id;
    }

    /// The selected project if it is still in the snapshot, otherwise the
    /// first project
    pub fn selected<'a>(&self, views: &'a PortfolioViews) -> Option<&'a ProjectRow> {
        self.selected_project
            .and_then(|id| views.project(id))
            .or_else(|| views.projects.first())
    }

    /// Blank project form preselecting the first business unit
    pub async fn new_project_form(&self) -> Result<ProjectForm, SnapshotError> {
        let snapshot = self.ctx.snapshot().await?;
        Ok(ProjectForm::new(snapshot.first().map(|u| u.id), today()))
    }

    /// Blank issue form bound to the selected project
    pub async fn new_issue_form(&self) -> Result<IssueForm, SnapshotError> {
        let views = self.ctx.load().await?;
        let project_id = self.selected(&views).map(|row| row.project.id);
        Ok(IssueForm::new(project_id, today()))
    }

    pub async fn render(&self) -> String {
        match self.ctx.load().await {
            Ok(views) => self.render_views(&views),
            Err(e) => render_load_error(Role::ProjectManager, &e),
        }
    }

    pub fn render_views(&self, views: &PortfolioViews) -> String {
        let mut out = heading(Role::ProjectManager);

        out.push_str(&format!("\nAt-risk projects ({})\n", views.at_risk.len()));
        if views.at_risk.is_empty() {
            out.push_str("  No high-severity issues reported.\n");
        }
        for row in &views.at_risk {
            let detail = row
                .project
                .issues
                .iter()
                .find(|issue| issue.severity == IssueSeverity::High)
                .map(|issue| issue.name.as_str())
                .unwrap_or("No detail");
            out.push_str(&format!(
                "  {} [{}]: {}\n",
                row.project.name, row.business_unit_name, detail
            ));
        }

        out.push_str(&format!("\nProjects ({})\n", views.projects.len()));
        if views.projects.is_empty() {
            out.push_str("  No projects yet.\n");
        }
        for row in &views.projects {
            let p = &row.project;
            out.push_str(&format!(
                "  #{} {} | {} | {} | {} | budget {} {} | bid {}\n",
                p.id,
                p.name,
                row.business_unit_name,
                p.category,
                p.tender_no,
                money(p.budget),
                p.funding_currency,
                money(p.bid_value),
            ));
        }

        if let Some(row) = self.selected(views) {
            let issues = &row.project.issues;
            out.push_str(&format!(
                "\nIssues for {} ({})\n",
                row.project.name,
                issues.len()
            ));
            if issues.is_empty() {
                out.push_str("  No issues logged.\n");
            }
            for issue in issues {
                let opened = issue
                    .opened_on
                    .map(|d| d.to_string())
                    .unwrap_or_else(|| "-".to_string());
                out.push_str(&format!(
                    "  #{} {} | {} | {} | opened {}\n",
                    issue.id, issue.name, issue.severity, issue.status, opened
                ));
            }
        }

        out
    }

    /// Create, or update `editing`, from the project form
    pub async fn submit_project(
        &self,
        form: &ProjectForm,
        editing: Option<ProjectId>,
    ) -> Result<Project, FormError> {
        let req = form.validate()?;
        let coordinator = self.ctx.coordinator();
        match editing {
            Some(id) => {
                let update = UpdateProjectRequest::from(req);
                self.project_guard
                    .run(coordinator.update_project(id, &update))
                    .await
            }
            None => self.project_guard.run(coordinator.create_project(&req)).await,
        }
    }

    pub async fn delete_project(&mut self, id: ProjectId) -> Result<(), FormError> {
        self.ctx.coordinator().delete_project(id).await?;
        if self.selected_project == Some(id) {
            self.selected_project = None;
        }
        Ok(())
    }

    /// Create against the form's project, or update `editing` (moving it to
    /// the form's project if that changed)
    pub async fn submit_issue(
        &self,
        form: &IssueForm,
        editing: Option<IssueId>,
    ) -> Result<Issue, FormError> {
        let (project_id, req) = form.validate()?;
        let coordinator = self.ctx.coordinator();
        match editing {
            Some(id) => {
                let update = UpdateIssueRequest {
                    project_id: Some(project_id),
                    ..UpdateIssueRequest::from(req)
                };
                self.issue_guard.run(coordinator.update_issue(id, &update)).await
            }
            None => {
                self.issue_guard
                    .run(coordinator.create_issue(project_id, &req))
                    .await
            }
        }
    }

    pub async fn delete_issue(&self, id: IssueId) -> Result<(), FormError> {
        self.ctx.coordinator().delete_issue(id).await?;
        Ok(())
    }
}
