//! General manager screen: category mix and organisation tree

use super::forms::{BusinessUnitForm, FormError, SubmitGuard};
use super::{heading, render_load_error, Role, ScreenContext};
use crate::models::*;
use crate::snapshot::{PortfolioViews, UnitNode};

pub struct GeneralManagerScreen {
    ctx: ScreenContext,
    unit_guard: SubmitGuard,
}

impl GeneralManagerScreen {
    pub fn new(ctx: ScreenContext) -> Self {
        Self {
            ctx,
            unit_guard: SubmitGuard::new(),
        }
    }

    pub async fn render(&self) -> String {
        match self.ctx.load().await {
            Ok(views) => self.render_views(&views),
            Err(e) => render_load_error(Role::GeneralManager, &e),
        }
    }

    pub fn render_views(&self, views: &PortfolioViews) -> String {
        let mut out = heading(Role::GeneralManager);

        out.push_str(&format!(
            "\nProjects by category ({} total)\n",
            views.categories.total()
        ));
        if views.categories.is_empty() {
            out.push_str("  No projects loaded yet.\n");
        }
        for (category, count) in views.categories.iter() {
            out.push_str(&format!("  {:<12} {}\n", category.as_str(), count));
        }

        out.push_str("\nBusiness units\n");
        if views.hierarchy.roots.is_empty() && views.hierarchy.cyclic.is_empty() {
            out.push_str("  No business units yet.\n");
        }
        for root in &views.hierarchy.roots {
            write_unit(&mut out, root, 1);
        }
        if !views.hierarchy.cyclic.is_empty() {
            let ids: Vec<String> = views.hierarchy.cyclic.iter().map(|id| id.to_string()).collect();
            out.push_str(&format!("  Units in a parent cycle: {}\n", ids.join(", ")));
        }

        out
    }

    /// Create a unit, or update `editing`.
    ///
    /// An edit is checked against the current tree so a unit never ends up
    /// below itself.
    pub async fn submit_unit(
        &self,
        form: &BusinessUnitForm,
        editing: Option<BusinessUnitId>,
    ) -> Result<BusinessUnit, FormError> {
        let coordinator = self.ctx.coordinator();
        match editing {
            Some(id) => {
                let req = match form.parent_id {
                    Some(_) => form.validate_edit(id, &self.ctx.snapshot().await?)?,
                    None => form.validate()?,
                };
                let update = UpdateBusinessUnitRequest::from(req);
                self.unit_guard
                    .run(coordinator.update_business_unit(id, &update))
                    .await
            }
            None => {
                let req = form.validate()?;
                self.unit_guard.run(coordinator.create_business_unit(&req)).await
            }
        }
    }

    /// Deletes the unit; the backend removes its projects with it
    pub async fn delete_unit(&self, id: BusinessUnitId) -> Result<(), FormError> {
        self.ctx.coordinator().delete_business_unit(id).await?;
        Ok(())
    }
}

fn write_unit(out: &mut String, node: &UnitNode, depth: usize) {
    out.push_str(&format!(
        "{}{} (#{}, {}) - {} project(s)\n",
        "  ".repeat(depth),
        node.name,
        node.id,
        node.unit_type,
        node.project_count
    ));
    for child in &node.children {
        write_unit(out, child, depth + 1);
    }
}
