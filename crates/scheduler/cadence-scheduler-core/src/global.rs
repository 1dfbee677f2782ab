//! Optional process-wide scheduler slot.
//!
//! Nothing is created implicitly. The host installs one scheduler at startup
//! and tears it down at shutdown; code that wants process-wide access asks
//! for it with [`installed`] or [`require`].

use std::sync::Arc;

use parking_lot::{const_rwlock, RwLock};

use crate::error::{Result, SchedulerError};
use crate::scheduler::UpdateScheduler;

static GLOBAL: RwLock<Option<Arc<UpdateScheduler>>> = const_rwlock(None);

/// Install `scheduler` as the process-wide instance.
pub fn install(scheduler: Arc<UpdateScheduler>) -> Result<()> {
    let mut slot = GLOBAL.write();
    if slot.is_some() {
        log::warn!("[global::install] a scheduler is already installed; keeping the existing one");
        return Err(SchedulerError::AlreadyInstalled);
    }
    *slot = Some(scheduler);
    log::debug!("[global::install] process-wide scheduler installed");
    Ok(())
}

pub fn installed() -> Option<Arc<UpdateScheduler>> {
    GLOBAL.read().clone()
}

pub fn require() -> Result<Arc<UpdateScheduler>> {
    installed().ok_or(SchedulerError::NotInstalled)
}

/// Remove the process-wide instance and hand it back to the caller.
///
/// Entities registered with it keep working against any other `Arc` to the
/// same scheduler; handles holding only a weak reference see it disappear
/// once the last `Arc` is dropped.
pub fn teardown() -> Option<Arc<UpdateScheduler>> {
    let previous = GLOBAL.write().take();
    if previous.is_some() {
        log::debug!("[global::teardown] process-wide scheduler removed");
    }
    previous
}
