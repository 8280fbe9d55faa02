//! Finance manager screen: portfolio totals and change requests

use super::forms::{ChangeRequestForm, FormError, SubmitGuard};
use super::{heading, money, render_load_error, today, Role, ScreenContext};
use crate::models::*;
use crate::snapshot::{PortfolioViews, SnapshotError};

pub struct FinanceManagerScreen {
    ctx: ScreenContext,
    change_request_guard: SubmitGuard,
}

impl FinanceManagerScreen {
    pub fn new(ctx: ScreenContext) -> Self {
        Self {
            ctx,
            change_request_guard: SubmitGuard::new(),
        }
    }

    /// Blank change-request form preselecting the first project
    pub async fn new_change_request_form(&self) -> Result<ChangeRequestForm, SnapshotError> {
        let views = self.ctx.load().await?;
        let project_id = views.projects.first().map(|row| row.project.id);
        Ok(ChangeRequestForm::new(project_id, today()))
    }

    pub async fn render(&self) -> String {
        match self.ctx.load().await {
            Ok(views) => self.render_views(&views),
            Err(e) => render_load_error(Role::FinanceManager, &e),
        }
    }

    pub fn render_views(&self, views: &PortfolioViews) -> String {
        let mut out = heading(Role::FinanceManager);
        let agg = &views.aggregate;

        out.push_str(&format!("\nPortfolio Budget:    {:>16}\n", money(agg.budget)));
        out.push_str(&format!("Committed Bid Value: {:>16}\n", money(agg.bid_value)));
        out.push_str(&format!("Variance:            {:>16}\n", money(agg.variance)));

        out.push_str(&format!(
            "\nChange requests ({})\n",
            views.change_requests.len()
        ));
        if views.change_requests.is_empty() {
            out.push_str("  No change requests yet.\n");
        }
        for row in &views.change_requests {
            let cr = &row.change_request;
            let submitted = cr
                .submitted_on
                .map(|d| d.to_string())
                .unwrap_or_else(|| "-".to_string());
            out.push_str(&format!(
                "  #{} {} | {} | {} | {} | submitted {}\n",
                cr.id, cr.name, row.project_name, row.business_unit_name, cr.status, submitted
            ));
        }

        out
    }

    /// Create against the form's project, or update `editing` (which may
    /// move it to the form's project)
    pub async fn submit_change_request(
        &self,
        form: &ChangeRequestForm,
        editing: Option<ChangeRequestId>,
    ) -> Result<ChangeRequest, FormError> {
        let (project_id, req) = form.validate()?;
        let coordinator = self.ctx.coordinator();
        match editing {
            Some(id) => {
                let update = UpdateChangeRequestRequest {
                    project_id: Some(project_id),
                    ..UpdateChangeRequestRequest::from(req)
                };
                self.change_request_guard
                    .run(coordinator.update_change_request(id, &update))
                    .await
            }
            None => {
                self.change_request_guard
                    .run(coordinator.create_change_request(project_id, &req))
                    .await
            }
        }
    }

    pub async fn delete_change_request(&self, id: ChangeRequestId) -> Result<(), FormError> {
        self.ctx.coordinator().delete_change_request(id).await?;
        Ok(())
    }
}
