//! PMO backend access: HTTP transport and typed resource operations

pub mod client;
pub mod error;
mod impl_pmo_api;
pub mod traits;

pub use client::{ApiClient, RequestOptions, DEFAULT_API_BASE};
pub use error::ApiError;
pub use traits::PmoApi;

#[cfg(test)]
pub(crate) mod mock;
