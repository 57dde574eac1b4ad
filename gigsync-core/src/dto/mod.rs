//! Data Transfer Objects for the marketplace API
//!
//! Request and response shapes exchanged with the `/external-gigs` endpoints.

pub mod gig;

pub use gig::{ApiResponse, UpsertGigRequest};
