//! Core domain types
//!
//! These types are shared between the HTTP client (which moves them over the
//! wire) and the runner (which produces and reconciles them).

pub mod listing;
pub mod record;
pub mod stats;

pub use listing::Listing;
pub use record::{GigKey, TrackedRecord};
pub use stats::GigStats;
