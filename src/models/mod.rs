//! PMO domain records and request DTOs
//!
//! Records mirror the backend's JSON exactly; they only ever live inside the
//! cached snapshot and are replaced wholesale on every refetch.

pub mod entities;
pub mod requests;

pub use entities::*;
pub use requests::*;
