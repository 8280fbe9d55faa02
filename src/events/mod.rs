//! Mutation notifications
//!
//! - `CrudEvent`: emitted after a successful write has invalidated the snapshot
//! - `EventEmitter`: sink trait the mutation coordinator publishes to
//! - `EventBus`: in-process broadcast implementation

mod bus;
mod types;

pub use bus::EventBus;
pub use types::{CrudAction, CrudEvent, EntityType, EventEmitter};
