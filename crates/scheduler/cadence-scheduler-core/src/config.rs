//! Scheduler configuration.

use serde::{Deserialize, Serialize};

/// Sizing hints and housekeeping switches for [`crate::UpdateScheduler`].
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SchedulerConfig {
    /// Initial capacity of each domain's active set.
    pub initial_capacity: usize,
    /// Drop entries whose entity was freed without unregistering.
    ///
    /// When disabled they are skipped during updates but stay in the active
    /// set for good: a freed entity can no longer be unregistered, so each
    /// one leaks a slot until [`clear`](crate::UpdateScheduler::clear) is
    /// called. Long-running schedulers should leave this on.
    pub prune_dropped: bool,
}

impl Default for SchedulerConfig {
    fn default() -> Self {
        Self {
            initial_capacity: 64,
            prune_dropped: true,
        }
    }
}
