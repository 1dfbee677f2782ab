use std::sync::Arc;

use cadence_index_animation_core::{IndexAnimationCfg, IndexAnimationHandle};
use cadence_scheduler_core::{global, SchedulerError, TimeDomain, UpdateScheduler};

#[test]
fn spawn_global_requires_installed_scheduler() {
    let err = IndexAnimationHandle::spawn_global(IndexAnimationCfg::uniform(2, 1.0)).unwrap_err();
    assert_eq!(err, SchedulerError::NotInstalled);

    let sched = Arc::new(UpdateScheduler::default());
    global::install(Arc::clone(&sched)).unwrap();

    let handle = IndexAnimationHandle::spawn_global(IndexAnimationCfg::uniform(2, 1.0)).unwrap();
    handle.play();
    sched.tick(1.0, 1.0);
    assert_eq!(handle.index(), 1);
    assert_eq!(sched.active_len(TimeDomain::Scaled), 1);

    drop(handle);
    sched.tick(1.0, 1.0);
    assert_eq!(sched.active_len(TimeDomain::Scaled), 0);
    global::teardown();
}
