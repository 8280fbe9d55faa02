//! Derived views over the snapshot
//!
//! Every projection is a pure function of the business-unit tree.
//! [`ViewCache`] memoizes them by snapshot identity: as long as the cache
//! hands out the same `Arc`, the views are not recomputed.

use super::cache::Snapshot;
use crate::models::*;
use serde::Serialize;
use std::collections::{BTreeMap, HashMap, HashSet};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use tracing::{debug, warn};

/// A project annotated with its owning unit
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ProjectRow {
    pub business_unit_id: BusinessUnitId,
    pub business_unit_name: String,
    pub project: Project,
}

/// A change request annotated with its project and unit
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChangeRequestRow {
    pub project_id: ProjectId,
    pub project_name: String,
    pub business_unit_name: String,
    pub change_request: ChangeRequest,
}

/// Portfolio totals; `variance = bid_value - budget`
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct PortfolioAggregate {
    pub budget: f64,
    pub bid_value: f64,
    pub variance: f64,
}

/// Project count per category
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct CategoryHistogram {
    counts: BTreeMap<ProjectCategory, usize>,
}

impl CategoryHistogram {
    pub fn count(&self, category: ProjectCategory) -> usize {
        self.counts.get(&category).copied().unwrap_or(0)
    }

    pub fn total(&self) -> usize {
        self.counts.values().sum()
    }

    pub fn is_empty(&self) -> bool {
        self.counts.is_empty()
    }

    /// Categories that have at least one project, in declaration order
    pub fn iter(&self) -> impl Iterator<Item = (ProjectCategory, usize)> + '_ {
        self.counts.iter().map(|(c, n)| (*c, *n))
    }
}

/// One node of the business-unit hierarchy
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct UnitNode {
    pub id: BusinessUnitId,
    pub name: String,
    pub unit_type: String,
    pub project_count: usize,
    pub children: Vec<UnitNode>,
}

/// Business units arranged by `parent_id`
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct UnitHierarchy {
    pub roots: Vec<UnitNode>,
    /// Units unreachable from any root, which means their parent chain loops
    pub cyclic: Vec<BusinessUnitId>,
}

// ============================================================================
// Projections
// ============================================================================

pub fn project_rows(units: &[BusinessUnit]) -> Vec<ProjectRow> {
    units
        .iter()
        .flat_map(|unit| {
            unit.projects.iter().map(move |project| ProjectRow {
                business_unit_id: unit.id,
                business_unit_name: unit.name.clone(),
                project: project.clone(),
            })
        })
        .collect()
}

pub fn change_request_rows(projects: &[ProjectRow]) -> Vec<ChangeRequestRow> {
    projects
        .iter()
        .flat_map(|row| {
            row.project
                .change_requests
                .iter()
                .map(move |change_request| ChangeRequestRow {
                    project_id: row.project.id,
                    project_name: row.project.name.clone(),
                    business_unit_name: row.business_unit_name.clone(),
                    change_request: change_request.clone(),
                })
        })
        .collect()
}

pub fn portfolio_aggregate(projects: &[ProjectRow]) -> PortfolioAggregate {
    let budget: f64 = projects.iter().map(|row| row.project.budget).sum();
    let bid_value: f64 = projects.iter().map(|row| row.project.bid_value).sum();
    PortfolioAggregate {
        budget,
        bid_value,
        variance: bid_value - budget,
    }
}

pub fn category_histogram(projects: &[ProjectRow]) -> CategoryHistogram {
    let mut counts = BTreeMap::new();
    for row in projects {
        *counts.entry(row.project.category).or_insert(0) += 1;
    }
    CategoryHistogram { counts }
}

/// Projects with at least one high-severity issue that is not resolved
pub fn at_risk_projects(projects: &[ProjectRow]) -> Vec<ProjectRow> {
    projects
        .iter()
        .filter(|row| row.project.is_at_risk())
        .cloned()
        .collect()
}

pub fn unit_hierarchy(units: &[BusinessUnit]) -> UnitHierarchy {
    let known: HashSet<BusinessUnitId> = units.iter().map(|u| u.id).collect();
    let mut children: HashMap<BusinessUnitId, Vec<&BusinessUnit>> = HashMap::new();
    let mut roots = Vec::new();

    for unit in units {
        match unit.parent_id {
            Some(parent) if known.contains(&parent) => {
                children.entry(parent).or_default().push(unit)
            }
            _ => roots.push(unit),
        }
    }

    fn build(
        unit: &BusinessUnit,
        children: &HashMap<BusinessUnitId, Vec<&BusinessUnit>>,
        visited: &mut HashSet<BusinessUnitId>,
    ) -> UnitNode {
        visited.insert(unit.id);
        let mut kids = Vec::new();
        for kid in children.get(&unit.id).into_iter().flatten() {
            if !visited.contains(&kid.id) {
                kids.push(build(kid, children, visited));
            }
        }
        UnitNode {
            id: unit.id,
            name: unit.name.clone(),
            unit_type: unit.unit_type.clone(),
            project_count: unit.projects.len(),
            children: kids,
        }
    }

    let mut visited = HashSet::new();
    let roots: Vec<UnitNode> = roots
        .into_iter()
        .map(|root| build(root, &children, &mut visited))
        .collect();

    let cyclic: Vec<BusinessUnitId> = units
        .iter()
        .map(|u| u.id)
        .filter(|id| !visited.contains(id))
        .collect();
    if !cyclic.is_empty() {
        warn!(units = ?cyclic, "Business-unit parent chain contains a cycle");
    }

    UnitHierarchy { roots, cyclic }
}

// ============================================================================
// Memoized bundle
// ============================================================================

/// Every derived view of one snapshot
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct PortfolioViews {
    pub projects: Vec<ProjectRow>,
    pub change_requests: Vec<ChangeRequestRow>,
    pub aggregate: PortfolioAggregate,
    pub categories: CategoryHistogram,
    pub at_risk: Vec<ProjectRow>,
    pub hierarchy: UnitHierarchy,
}

impl PortfolioViews {
    pub fn compute(units: &[BusinessUnit]) -> Self {
        let projects = project_rows(units);
        Self {
            change_requests: change_request_rows(&projects),
            aggregate: portfolio_aggregate(&projects),
            categories: category_histogram(&projects),
            at_risk: at_risk_projects(&projects),
            hierarchy: unit_hierarchy(units),
            projects,
        }
    }

    pub fn project(&self, id: ProjectId) -> Option<&ProjectRow> {
        self.projects.iter().find(|row| row.project.id == id)
    }
}

/// Recomputes [`PortfolioViews`] only when the snapshot reference changes.
///
/// Holds on to the last snapshot so pointer identity cannot be reused by a
/// different allocation.
#[derive(Default)]
pub struct ViewCache {
    last: Mutex<Option<(Snapshot, Arc<PortfolioViews>)>>,
    computations: AtomicUsize,
}

impl ViewCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn views(&self, snapshot: &Snapshot) -> Arc<PortfolioViews> {
        let mut last = self.last.lock().unwrap_or_else(|poisoned| poisoned.into_inner());
        if let Some((seen, views)) = last.as_ref() {
            if Arc::ptr_eq(seen, snapshot) {
                return Arc::clone(views);
            }
        }

        let views = Arc::new(PortfolioViews::compute(snapshot));
        let n = self.computations.fetch_add(1, Ordering::SeqCst) + 1;
        debug!(
            computations = n,
            projects = views.projects.len(),
            "Derived views recomputed"
        );
        *last = Some((Arc::clone(snapshot), Arc::clone(&views)));
        views
    }

    /// How many times views were actually computed
    pub fn computations(&self) -> usize {
        self.computations.load(Ordering::SeqCst)
    }
}
