//! Filtering, classification and summaries behind the academic dashboard screens.

pub mod aggregate;
pub mod classify;
pub mod error;
pub mod export;
pub mod filter;
pub mod loader;
pub mod models;
pub mod overview;
pub mod report;
pub mod sample;
pub mod snapshot;
pub mod view;

pub use error::{DashboardError, Result};
pub use snapshot::Snapshot;
pub use view::{compute_view, Domain, DomainView, Query, View};
