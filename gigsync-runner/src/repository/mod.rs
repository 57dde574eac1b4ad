//! Repository layer
//!
//! Repositories wrap the marketplace client with the failure semantics the
//! sync engine relies on: single-item mutations never raise, reads used for
//! diffing fall back to "nothing tracked", and deletes treat "already gone"
//! as done.
//!
//! All repositories are trait-based to enable testing and mocking.

mod gigs;
#[cfg(test)]
pub mod memory;

pub use gigs::{GigRepository, HttpGigRepository};
