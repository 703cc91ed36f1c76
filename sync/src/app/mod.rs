//! Application layer
//!
//! The two jobs, written against the domain ports.

pub mod backfill_service;
pub mod contributor_sync_service;
pub mod retry;

pub use backfill_service::{
    AuthorBackfillService, BackfillReport, BackfillSettings, BackfillStats,
    ContributorResolution, PaginationMode,
};
pub use contributor_sync_service::{ContributorSyncReport, ContributorSyncService};
pub use retry::RetryPolicy;
