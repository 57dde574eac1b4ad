//! Diagnostic counts over tracked records

use serde::{Deserialize, Serialize};

/// Snapshot of how fresh the tracked external gigs are
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct GigStats {
    /// Every tracked record
    pub total: usize,

    /// Seen within the "recently active" window
    pub recently_active: usize,

    /// Past the staleness cutoff but not yet reaped
    pub stale: usize,
}

impl std::fmt::Display for GigStats {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "total={}, recently_active={}, stale={}",
            self.total, self.recently_active, self.stale
        )
    }
}
