use std::sync::Arc;

use bevy::prelude::*;
use cadence_index_animation_core::{IndexAnimationCfg, IndexAnimationHandle};
use cadence_scheduler_core::{TickStats, UpdateScheduler};

use crate::components::IndexAnimator;

/// The scheduler ticked by [`crate::CadencePlugin`].
#[derive(Resource, Clone)]
pub struct CadenceScheduler(pub Arc<UpdateScheduler>);

impl CadenceScheduler {
    /// Build an animation registered with this scheduler, ready to attach
    /// to an entity.
    pub fn animator(&self, cfg: IndexAnimationCfg) -> IndexAnimator {
        IndexAnimator(IndexAnimationHandle::spawn(cfg, &self.0))
    }
}

/// Stats from the most recent frame's tick.
#[derive(Resource, Default, Debug, Clone, Copy)]
pub struct LastTickStats(pub TickStats);
