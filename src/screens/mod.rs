//! Role-scoped dashboard screens
//!
//! Each role gets one screen. [`Screen::for_role`] is the single dispatch
//! point; it matches exhaustively, so a new role fails to compile until it
//! has a screen.

pub mod finance_manager;
pub mod forms;
pub mod general_manager;
pub mod project_manager;

pub use finance_manager::FinanceManagerScreen;
pub use forms::{
    BusinessUnitForm, ChangeRequestForm, FormError, IssueForm, ProjectForm, SubmitGuard,
    ValidationError,
};
pub use general_manager::GeneralManagerScreen;
pub use project_manager::ProjectManagerScreen;

use crate::models::ParseEnumError;
use crate::mutations::MutationCoordinator;
use crate::snapshot::{PortfolioViews, Snapshot, SnapshotCache, SnapshotError, ViewCache};
use chrono::{NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

/// Who is looking at the dashboard
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize, clap::ValueEnum,
)]
#[serde(rename_all = "kebab-case")]
pub enum Role {
    #[default]
    ProjectManager,
    FinanceManager,
    GeneralManager,
}

impl Role {
    pub const ALL: [Role; 3] = [
        Role::ProjectManager,
        Role::FinanceManager,
        Role::GeneralManager,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Role::ProjectManager => "project-manager",
            Role::FinanceManager => "finance-manager",
            Role::GeneralManager => "general-manager",
        }
    }

    pub fn title(&self) -> &'static str {
        match self {
            Role::ProjectManager => "Project Manager",
            Role::FinanceManager => "Finance Manager",
            Role::GeneralManager => "General Manager",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Role {
    type Err = ParseEnumError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Role::ALL
            .into_iter()
            .find(|role| role.as_str() == s)
            .ok_or_else(|| ParseEnumError {
                kind: "role",
                value: s.to_string(),
                expected: "project-manager, finance-manager, general-manager",
            })
    }
}

/// What every screen needs: the snapshot, the write path and the memoized
/// views. Cheap to clone; clones share all three.
#[derive(Clone)]
pub struct ScreenContext {
    cache: SnapshotCache,
    coordinator: MutationCoordinator,
    views: Arc<ViewCache>,
}

impl ScreenContext {
    pub fn new(coordinator: MutationCoordinator) -> Self {
        Self {
            cache: coordinator.cache().clone(),
            coordinator,
            views: Arc::new(ViewCache::new()),
        }
    }

    pub fn coordinator(&self) -> &MutationCoordinator {
        &self.coordinator
    }

    pub fn view_cache(&self) -> &ViewCache {
        &self.views
    }

    pub async fn snapshot(&self) -> Result<Snapshot, SnapshotError> {
        self.cache.get().await
    }

    /// Current snapshot projected into views, recomputed only when the
    /// snapshot was replaced
    pub async fn load(&self) -> Result<Arc<PortfolioViews>, SnapshotError> {
        let snapshot = self.cache.get().await?;
        Ok(self.views.views(&snapshot))
    }
}

/// One screen per role
pub enum Screen {
    ProjectManager(ProjectManagerScreen),
    FinanceManager(FinanceManagerScreen),
    GeneralManager(GeneralManagerScreen),
}

impl Screen {
    pub fn for_role(role: Role, ctx: ScreenContext) -> Self {
        match role {
            Role::ProjectManager => Screen::ProjectManager(ProjectManagerScreen::new(ctx)),
            Role::FinanceManager => Screen::FinanceManager(FinanceManagerScreen::new(ctx)),
            Role::GeneralManager => Screen::GeneralManager(GeneralManagerScreen::new(ctx)),
        }
    }

    pub fn role(&self) -> Role {
        match self {
            Screen::ProjectManager(_) => Role::ProjectManager,
            Screen::FinanceManager(_) => Role::FinanceManager,
            Screen::GeneralManager(_) => Role::GeneralManager,
        }
    }

    /// Plain-text rendering; a failed load renders the error message
    pub async fn render(&self) -> String {
        match self {
            Screen::ProjectManager(screen) => screen.render().await,
            Screen::FinanceManager(screen) => screen.render().await,
            Screen::GeneralManager(screen) => screen.render().await,
        }
    }
}

/// Today's date in UTC, the default for new form dates
pub fn today() -> NaiveDate {
    Utc::now().date_naive()
}

pub(crate) fn money(value: f64) -> String {
    format!("{:.2}", value)
}

pub(crate) fn heading(role: Role) -> String {
    let title = format!("{} Dashboard", role.title());
    format!("{}\n{}\n", title, "=".repeat(title.len()))
}

pub(crate) fn render_load_error(role: Role, err: &SnapshotError) -> String {
    format!("{}\nError: {}\n", heading(role), err)
}
