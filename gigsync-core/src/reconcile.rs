//! Reconciliation engine
//!
//! Computes the actions that bring the marketplace in line with a fresh
//! snapshot of one source. Every current listing is upserted (the store's
//! upsert is idempotent, so there is no field-level change detection) and
//! every previously tracked record missing from the snapshot is deleted.
//!
//! Callers must not feed an empty snapshot through here: against a non-empty
//! `previous` that plan deletes everything.

use std::collections::HashSet;

use crate::domain::{GigKey, Listing, TrackedRecord};

/// Actions for one source in one run
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ReconciliationPlan {
    pub to_upsert: Vec<Listing>,
    pub to_delete: Vec<GigKey>,
}

/// Diffs `current` against `previous`
///
/// `to_upsert` is `current` in its original order. `to_delete` holds each
/// external id from `previous` that does not occur in `current`, once, in
/// the order first seen.
pub fn compare(current: Vec<Listing>, previous: &[TrackedRecord]) -> ReconciliationPlan {
    let to_delete = {
        let live: HashSet<&str> = current.iter().map(|l| l.external_id.as_str()).collect();
        let mut queued = HashSet::new();
        previous
            .iter()
            .filter(|record| !live.contains(record.external_id.as_str()))
            .filter(|record| queued.insert(record.external_id.as_str()))
            .map(TrackedRecord::key)
            .collect()
    };

    ReconciliationPlan {
        to_upsert: current,
        to_delete,
    }
}
