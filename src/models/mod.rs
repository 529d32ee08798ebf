//! Response and view models
//!
//! JSON DTOs for the operational endpoints and the data objects handed to the
//! view renderer.

pub mod responses;
pub mod views;

// Re-export commonly used types
pub use responses::{HealthResponse, StatsResponse};
pub use views::{ErrorView, MetadataView};
