//! PMO Dashboard - CLI
//!
//! Renders role dashboards and edits the portfolio through the PMO backend.

use anyhow::{anyhow, Result};
use chrono::NaiveDate;
use clap::{Args, Parser, Subcommand};
use pmo_dashboard::models::*;
use pmo_dashboard::screens::{
    today, BusinessUnitForm, ChangeRequestForm, FinanceManagerScreen, GeneralManagerScreen,
    IssueForm, ProjectForm, ProjectManagerScreen, Role, Screen,
};
use pmo_dashboard::{AppState, Config};
use serde::Serialize;
use std::path::PathBuf;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser)]
#[command(name = "pmo")]
#[command(about = "Role-aware PMO portfolio dashboard")]
struct Cli {
    /// PMO backend base URL (overrides pmo.yaml)
    #[arg(long, env = "PMO_API_BASE")]
    api_base: Option<String>,

    /// Path to the YAML config file
    #[arg(long)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Render the dashboard for a role
    Dashboard {
        /// Role to render (defaults to dashboard.default_role)
        #[arg(short, long, value_enum)]
        role: Option<Role>,

        /// Project whose issues the project manager screen lists
        #[arg(long)]
        project: Option<ProjectId>,
    },

    /// Business unit operations
    Unit {
        #[command(subcommand)]
        action: UnitAction,
    },

    /// Project operations
    Project {
        #[command(subcommand)]
        action: ProjectAction,
    },

    /// Issue operations
    Issue {
        #[command(subcommand)]
        action: IssueAction,
    },

    /// Change request operations
    ChangeRequest {
        #[command(subcommand)]
        action: ChangeRequestAction,
    },

    /// Load the backend's sample dataset
    Seed,
}

#[derive(Subcommand)]
enum UnitAction {
    /// List business units
    List,
    /// Create a business unit
    Create(UnitFields),
    /// Update a business unit
    Update {
        id: BusinessUnitId,
        #[command(flatten)]
        fields: UnitFields,
    },
    /// Delete a business unit and its projects
    Delete { id: BusinessUnitId },
}

#[derive(Subcommand)]
enum ProjectAction {
    /// Show one project as JSON
    Show { id: ProjectId },
    /// Create a project
    Create(ProjectFields),
    /// Update a project
    Update {
        id: ProjectId,
        #[command(flatten)]
        fields: ProjectFields,
    },
    /// Delete a project
    Delete { id: ProjectId },
}

#[derive(Subcommand)]
enum IssueAction {
    /// Raise an issue against a project
    Create(IssueFields),
    /// Update an issue
    Update {
        id: IssueId,
        #[command(flatten)]
        fields: IssueFields,
    },
    /// Delete an issue
    Delete { id: IssueId },
}

#[derive(Subcommand)]
enum ChangeRequestAction {
    /// Raise a change request against a project
    Create(ChangeRequestFields),
    /// Update a change request
    Update {
        id: ChangeRequestId,
        #[command(flatten)]
        fields: ChangeRequestFields,
    },
    /// Delete a change request
    Delete { id: ChangeRequestId },
}

#[derive(Args)]
struct UnitFields {
    #[arg(short, long)]
    name: Option<String>,
    #[arg(long = "type")]
    unit_type: Option<String>,
    #[arg(long)]
    parent: Option<BusinessUnitId>,
    #[arg(long)]
    manager: Option<i64>,
}

impl UnitFields {
    fn apply(self, form: &mut BusinessUnitForm) {
        if let Some(v) = self.name {
            form.name = v;
        }
        if let Some(v) = self.unit_type {
            form.unit_type = v;
        }
        if self.parent.is_some() {
            form.parent_id = self.parent;
        }
        if self.manager.is_some() {
            form.manager_id = self.manager;
        }
    }
}

#[derive(Args)]
struct ProjectFields {
    #[arg(short, long)]
    name: Option<String>,
    /// Owning business unit (defaults to the first unit)
    #[arg(long)]
    unit: Option<BusinessUnitId>,
    #[arg(long)]
    tender_no: Option<String>,
    #[arg(long)]
    description: Option<String>,
    #[arg(long)]
    scope: Option<String>,
    /// substation, ohtl or ug_cable
    #[arg(long)]
    category: Option<ProjectCategory>,
    #[arg(long)]
    budget: Option<String>,
    #[arg(long)]
    bid_value: Option<String>,
    #[arg(long)]
    bid_issue_date: Option<NaiveDate>,
    #[arg(long)]
    bid_due_date: Option<NaiveDate>,
    #[arg(long)]
    currency: Option<String>,
    #[arg(long)]
    include_vat: Option<bool>,
}

impl ProjectFields {
    fn apply(self, form: &mut ProjectForm) {
        if let Some(v) = self.name {
            form.name = v;
        }
        if self.unit.is_some() {
            form.businessunit_id = self.unit;
        }
        if let Some(v) = self.tender_no {
            form.tender_no = v;
        }
        if let Some(v) = self.description {
            form.description = v;
        }
        if let Some(v) = self.scope {
            form.scope_of_work = v;
        }
        if let Some(v) = self.category {
            form.category = v;
        }
        if let Some(v) = self.budget {
            form.budget = v;
        }
        if let Some(v) = self.bid_value {
            form.bid_value = v;
        }
        if let Some(v) = self.bid_issue_date {
            form.bid_issue_date = v;
        }
        if let Some(v) = self.bid_due_date {
            form.bid_due_date = v;
        }
        if let Some(v) = self.currency {
            form.funding_currency = v;
        }
        if let Some(v) = self.include_vat {
            form.include_vat = v;
        }
    }
}

#[derive(Args)]
struct IssueFields {
    #[arg(long)]
    project: Option<ProjectId>,
    #[arg(short, long)]
    name: Option<String>,
    /// low, medium or high
    #[arg(long)]
    severity: Option<IssueSeverity>,
    /// open, in_progress, resolved or closed
    #[arg(long)]
    status: Option<IssueStatus>,
    #[arg(long)]
    opened_on: Option<NaiveDate>,
    #[arg(long)]
    closed_on: Option<NaiveDate>,
    #[arg(long)]
    description: Option<String>,
}

impl IssueFields {
    fn apply(self, form: &mut IssueForm) {
        if self.project.is_some() {
            form.project_id = self.project;
        }
        if let Some(v) = self.name {
            form.name = v;
        }
        if let Some(v) = self.severity {
            form.severity = v;
        }
        if let Some(v) = self.status {
            form.status = v;
        }
        if let Some(v) = self.opened_on {
            form.opened_on = v;
        }
        if self.closed_on.is_some() {
            form.closed_on = self.closed_on;
        }
        if let Some(v) = self.description {
            form.description = v;
        }
    }
}

#[derive(Args)]
struct ChangeRequestFields {
    #[arg(long)]
    project: Option<ProjectId>,
    #[arg(short, long)]
    name: Option<String>,
    /// draft, submitted, approved or rejected
    #[arg(long)]
    status: Option<ChangeRequestStatus>,
    #[arg(long)]
    submitted_on: Option<NaiveDate>,
    #[arg(long)]
    approved_on: Option<NaiveDate>,
    #[arg(long)]
    description: Option<String>,
    #[arg(long)]
    impact_summary: Option<String>,
}

impl ChangeRequestFields {
    fn apply(self, form: &mut ChangeRequestForm) {
        if self.project.is_some() {
            form.project_id = self.project;
        }
        if let Some(v) = self.name {
            form.name = v;
        }
        if let Some(v) = self.status {
            form.status = v;
        }
        if self.submitted_on.is_some() {
            form.submitted_on = self.submitted_on;
        }
        if self.approved_on.is_some() {
            form.approved_on = self.approved_on;
        }
        if let Some(v) = self.description {
            form.description = v;
        }
        if let Some(v) = self.impact_summary {
            form.impact_summary = v;
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env file
    dotenvy::dotenv().ok();

    // Logs go to stderr so rendered output stays clean
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info,pmo_dashboard=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let cli = Cli::parse();

    let mut config = Config::from_yaml_and_env(cli.config.as_deref())?;
    if let Some(base) = cli.api_base {
        config.api_base = base;
    }

    let state = AppState::new(config)?;
    let mut changes = state.events.subscribe();
    let result = run(&state, cli.command).await;

    // Every write the backend acknowledged during this command
    while let Ok(event) = changes.try_recv() {
        info!(
            entity_type = ?event.entity_type,
            action = ?event.action,
            entity_id = ?event.entity_id,
            project_id = ?event.project_id,
            "Portfolio changed"
        );
    }

    state.shutdown().await;
    result
}

async fn run(state: &AppState, command: Commands) -> Result<()> {
    match command {
        Commands::Dashboard { role, project } => {
            let role = role.unwrap_or(state.config.default_role);
            let mut screen = state.screen(role);
            if let Screen::ProjectManager(ref mut pm) = screen {
                pm.select_project(project);
            }
            print!("{}", screen.render().await);
            Ok(())
        }
        Commands::Unit { action } => handle_unit(state, action).await,
        Commands::Project { action } => handle_project(state, action).await,
        Commands::Issue { action } => handle_issue(state, action).await,
        Commands::ChangeRequest { action } => handle_change_request(state, action).await,
        Commands::Seed => {
            let summary = state.coordinator.seed_sample_data().await?;
            print_json(&summary)
        }
    }
}

async fn handle_unit(state: &AppState, action: UnitAction) -> Result<()> {
    let screen = GeneralManagerScreen::new(state.screen_context());
    match action {
        UnitAction::List => {
            let snapshot = state.cache.get().await?;
            if snapshot.is_empty() {
                println!("No business units found.");
            }
            for unit in snapshot.iter() {
                let parent = unit
                    .parent_id
                    .map(|id| id.to_string())
                    .unwrap_or_else(|| "-".to_string());
                println!(
                    "#{} {} | {} | parent {} | {} project(s)",
                    unit.id,
                    unit.name,
                    unit.unit_type,
                    parent,
                    unit.projects.len()
                );
            }
            Ok(())
        }
        UnitAction::Create(fields) => {
            let mut form = BusinessUnitForm::default();
            fields.apply(&mut form);
            let unit = screen.submit_unit(&form, None).await?;
            print_json(&unit)
        }
        UnitAction::Update { id, fields } => {
            let snapshot = state.cache.get().await?;
            let current = snapshot
                .iter()
                .find(|u| u.id == id)
                .ok_or_else(|| anyhow!("Business unit {} not found", id))?;
            let mut form = BusinessUnitForm::from_unit(current);
            fields.apply(&mut form);
            let unit = screen.submit_unit(&form, Some(id)).await?;
            print_json(&unit)
        }
        UnitAction::Delete { id } => {
            screen.delete_unit(id).await?;
            println!("Deleted business unit {}", id);
            Ok(())
        }
    }
}

async fn handle_project(state: &AppState, action: ProjectAction) -> Result<()> {
    let mut screen = ProjectManagerScreen::new(state.screen_context());
    match action {
        ProjectAction::Show { id } => {
            let project = state.api.get_project(id).await?;
            print_json(&project)
        }
        ProjectAction::Create(fields) => {
            let mut form = screen.new_project_form().await?;
            fields.apply(&mut form);
            let project = screen.submit_project(&form, None).await?;
            print_json(&project)
        }
        ProjectAction::Update { id, fields } => {
            let current = state.api.get_project(id).await?;
            let mut form = ProjectForm::from_project(&current, today());
            fields.apply(&mut form);
            let project = screen.submit_project(&form, Some(id)).await?;
            print_json(&project)
        }
        ProjectAction::Delete { id } => {
            screen.delete_project(id).await?;
            println!("Deleted project {}", id);
            Ok(())
        }
    }
}

async fn handle_issue(state: &AppState, action: IssueAction) -> Result<()> {
    let screen = ProjectManagerScreen::new(state.screen_context());
    match action {
        IssueAction::Create(fields) => {
            let mut form = IssueForm::new(None, today());
            fields.apply(&mut form);
            let issue = screen.submit_issue(&form, None).await?;
            print_json(&issue)
        }
        IssueAction::Update { id, fields } => {
            let snapshot = state.cache.get().await?;
            let current = snapshot
                .iter()
                .flat_map(|u| u.projects.iter())
                .flat_map(|p| p.issues.iter())
                .find(|i| i.id == id)
                .ok_or_else(|| anyhow!("Issue {} not found", id))?;
            let mut form = IssueForm::from_issue(current, today());
            fields.apply(&mut form);
            let issue = screen.submit_issue(&form, Some(id)).await?;
            print_json(&issue)
        }
        IssueAction::Delete { id } => {
            screen.delete_issue(id).await?;
            println!("Deleted issue {}", id);
            Ok(())
        }
    }
}

async fn handle_change_request(state: &AppState, action: ChangeRequestAction) -> Result<()> {
    let screen = FinanceManagerScreen::new(state.screen_context());
    match action {
        ChangeRequestAction::Create(fields) => {
            let mut form = ChangeRequestForm::new(None, today());
            fields.apply(&mut form);
            let cr = screen.submit_change_request(&form, None).await?;
            print_json(&cr)
        }
        ChangeRequestAction::Update { id, fields } => {
            let snapshot = state.cache.get().await?;
            let current = snapshot
                .iter()
                .flat_map(|u| u.projects.iter())
                .flat_map(|p| p.change_requests.iter())
                .find(|c| c.id == id)
                .ok_or_else(|| anyhow!("Change request {} not found", id))?;
            let mut form = ChangeRequestForm::from_change_request(current);
            fields.apply(&mut form);
            let cr = screen.submit_change_request(&form, Some(id)).await?;
            print_json(&cr)
        }
        ChangeRequestAction::Delete { id } => {
            screen.delete_change_request(id).await?;
            println!("Deleted change request {}", id);
            Ok(())
        }
    }
}

fn print_json<T: Serialize>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}
