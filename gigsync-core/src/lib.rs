//! Gigsync Core
//!
//! Core types and pure logic for the gigsync listing synchronizer.
//!
//! This crate contains:
//! - Domain types: listings, tracked records, statistics
//! - DTOs: request/response shapes for the marketplace API
//! - Reconciliation: diffing a fresh snapshot against tracked records
//! - Staleness: TTL window math used by the reaper
//! - Normalization and validation helpers shared by source adapters
//!
//! Nothing in here performs I/O.

pub mod domain;
pub mod dto;
pub mod normalize;
pub mod reconcile;
pub mod staleness;
pub mod validate;
