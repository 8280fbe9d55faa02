//! Write path: every mutation goes through the coordinator so the snapshot
//! is invalidated exactly when the backend acknowledged a write.

mod coordinator;

pub use coordinator::MutationCoordinator;
