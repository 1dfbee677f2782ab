use std::sync::Arc;

use bevy::prelude::*;
use bevy::time::TimeSystem;
use cadence_scheduler_core::{global, SchedulerConfig, UpdateScheduler};

pub mod components;
pub mod resources;
pub mod systems;

pub use components::{AnimatedIndex, IndexAnimator};
pub use resources::{CadenceScheduler, LastTickStats};
pub use systems::{sync_animated_index_system, tick_scheduler_system};

/// Inserts a [`CadenceScheduler`] (unless one is already present) and ticks
/// it once per frame in `First`, with virtual time as the scaled delta and
/// real time as the unscaled delta.
#[derive(Default)]
pub struct CadencePlugin {
    pub config: SchedulerConfig,
    /// Also install the scheduler as the process-wide instance.
    pub install_global: bool,
}

impl Plugin for CadencePlugin {
    fn build(&self, app: &mut App) {
        if !app.world().contains_resource::<CadenceScheduler>() {
            let scheduler = Arc::new(UpdateScheduler::new(self.config.clone()));
            app.insert_resource(CadenceScheduler(scheduler));
        }
        if self.install_global {
            let scheduler = Arc::clone(&app.world().resource::<CadenceScheduler>().0);
            if let Err(err) = global::install(scheduler) {
                log::warn!("[CadencePlugin::build] {err}");
            }
        }
        app.init_resource::<LastTickStats>()
            .add_systems(First, tick_scheduler_system.after(TimeSystem))
            .add_systems(Update, sync_animated_index_system);
    }
}
