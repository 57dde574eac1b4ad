//! Service layer
//!
//! Services hold the runner's business logic: the sync pass that reconciles
//! every source, and the reaper that sweeps records nobody refreshed. They
//! talk to the marketplace only through [`crate::repository::GigRepository`].

mod attempt;
mod reaper;
mod report;
mod sync;

pub use attempt::RetryPolicy;
pub use reaper::ReaperService;
pub use report::RunReport;
pub use sync::SyncService;
