use bevy::prelude::*;

use crate::components::{AnimatedIndex, IndexAnimator};
use crate::resources::{CadenceScheduler, LastTickStats};

/// Advances the scheduler by this frame's virtual (scaled) and real
/// (unscaled) deltas.
pub fn tick_scheduler_system(
    scheduler: Res<CadenceScheduler>,
    virtual_time: Res<Time<Virtual>>,
    real_time: Res<Time<Real>>,
    mut last: ResMut<LastTickStats>,
) {
    last.0 = scheduler
        .0
        .tick(virtual_time.delta_seconds(), real_time.delta_seconds());
}

/// Copies each animator's index into its [`AnimatedIndex`].
pub fn sync_animated_index_system(mut q: Query<(&IndexAnimator, &mut AnimatedIndex)>) {
    for (animator, mut shown) in q.iter_mut() {
        let index = animator.0.index();
        if shown.0 != index {
            shown.0 = index;
        }
    }
}
