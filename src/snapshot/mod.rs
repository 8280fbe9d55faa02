//! Cached business-unit snapshot and the views derived from it

pub mod cache;
pub mod views;

pub use cache::{Snapshot, SnapshotCache, SnapshotError, SnapshotPhase, DEFAULT_STALE_AFTER};
pub use views::{
    CategoryHistogram, ChangeRequestRow, PortfolioAggregate, PortfolioViews, ProjectRow,
    UnitHierarchy, UnitNode, ViewCache,
};
