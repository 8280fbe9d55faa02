//! CRUD event types

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// The kind of PMO record that was written
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EntityType {
    BusinessUnit,
    Project,
    Issue,
    ChangeRequest,
    /// The whole portfolio, e.g. after seeding sample data
    Portfolio,
}

/// The CRUD action performed
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CrudAction {
    Created,
    Updated,
    Deleted,
}

/// A write that the backend acknowledged
///
/// Must be Clone for `tokio::sync::broadcast`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CrudEvent {
    pub entity_type: EntityType,
    pub action: CrudAction,
    /// Id of the written record; `None` for portfolio-wide writes
    #[serde(skip_serializing_if = "Option::is_none")]
    pub entity_id: Option<i64>,
    /// Owning project, for issues and change requests
    #[serde(skip_serializing_if = "Option::is_none")]
    pub project_id: Option<i64>,
    pub timestamp: DateTime<Utc>,
}

impl CrudEvent {
    pub fn new(entity_type: EntityType, action: CrudAction, entity_id: Option<i64>) -> Self {
        Self {
            entity_type,
            action,
            entity_id,
            project_id: None,
            timestamp: Utc::now(),
        }
    }

    pub fn with_project_id(mut self, project_id: i64) -> Self {
        self.project_id = Some(project_id);
        self
    }
}

/// Sink for [`CrudEvent`]s. Emitting must never block or fail the write.
pub trait EventEmitter: Send + Sync {
    fn emit(&self, event: CrudEvent);

    fn emit_created(&self, entity_type: EntityType, entity_id: i64, project_id: Option<i64>) {
        self.emit(with_project(
            CrudEvent::new(entity_type, CrudAction::Created, Some(entity_id)),
            project_id,
        ));
    }

    fn emit_updated(&self, entity_type: EntityType, entity_id: i64, project_id: Option<i64>) {
        self.emit(with_project(
            CrudEvent::new(entity_type, CrudAction::Updated, Some(entity_id)),
            project_id,
        ));
    }

    fn emit_deleted(&self, entity_type: EntityType, entity_id: i64, project_id: Option<i64>) {
        self.emit(with_project(
            CrudEvent::new(entity_type, CrudAction::Deleted, Some(entity_id)),
            project_id,
        ));
    }
}

fn with_project(event: CrudEvent, project_id: Option<i64>) -> CrudEvent {
    match project_id {
        Some(id) => event.with_project_id(id),
        None => event,
    }
}
