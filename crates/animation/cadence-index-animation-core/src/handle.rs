//! Scheduler-driven ownership of an [`IndexAnimation`].
//!
//! [`SharedIndexAnimation`] is the thread-safe cell the scheduler holds a
//! weak reference to. [`IndexAnimationHandle`] is the owner: it registers the
//! cell on creation and unregisters it exactly once, on [`dispose`] or drop.
//!
//! Listeners run while the animation's lock is held. They receive the
//! animation by reference and must not call back into the handle.
//!
//! [`dispose`]: IndexAnimationHandle::dispose

use std::fmt;
use std::sync::{Arc, Weak};

use cadence_scheduler_core::{global, SchedulerError, Updatable, UpdateScheduler};
use parking_lot::{Mutex, MutexGuard};

use crate::animation::{IndexAnimation, PlaybackState};
use crate::config::{IndexAnimationCfg, PlayMode};
use crate::ids::ListenerId;
use crate::listeners::{IndexListener, Subscription};

/// Lock-protected animation that the scheduler can drive.
pub struct SharedIndexAnimation {
    uses_scaled_time: bool,
    inner: Mutex<IndexAnimation>,
}

impl SharedIndexAnimation {
    pub fn new(animation: IndexAnimation) -> Arc<Self> {
        Arc::new(Self {
            uses_scaled_time: animation.uses_scaled_time(),
            inner: Mutex::new(animation),
        })
    }

    pub fn lock(&self) -> MutexGuard<'_, IndexAnimation> {
        self.inner.lock()
    }
}

impl Updatable for SharedIndexAnimation {
    fn update(&self, delta_time: f32) {
        self.inner.lock().update(delta_time);
    }

    fn uses_scaled_time(&self) -> bool {
        self.uses_scaled_time
    }
}

impl fmt::Debug for SharedIndexAnimation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SharedIndexAnimation")
            .field("uses_scaled_time", &self.uses_scaled_time)
            .finish_non_exhaustive()
    }
}

/// Owning handle. Dropping it unregisters the animation.
#[derive(Debug)]
pub struct IndexAnimationHandle {
    shared: Arc<SharedIndexAnimation>,
    scheduler: Weak<UpdateScheduler>,
    disposed: bool,
}

impl IndexAnimationHandle {
    /// Build an animation and register it with `scheduler`. Static
    /// animations are not registered.
    pub fn spawn(cfg: IndexAnimationCfg, scheduler: &Arc<UpdateScheduler>) -> Self {
        Self::attach(IndexAnimation::new(cfg), scheduler)
    }

    /// Like [`spawn`](Self::spawn) against the installed global scheduler.
    pub fn spawn_global(cfg: IndexAnimationCfg) -> Result<Self, SchedulerError> {
        let scheduler = global::require()?;
        Ok(Self::spawn(cfg, &scheduler))
    }

    /// Take ownership of an existing animation.
    pub fn attach(animation: IndexAnimation, scheduler: &Arc<UpdateScheduler>) -> Self {
        let is_static = animation.is_static();
        let shared = SharedIndexAnimation::new(animation);
        if is_static {
            log::debug!("[IndexAnimationHandle::attach] static animation; not scheduled");
        } else {
            scheduler.register(&shared);
        }
        Self {
            shared,
            scheduler: Arc::downgrade(scheduler),
            disposed: false,
        }
    }

    /// Unregister from the scheduler. Returns `false` if already disposed.
    /// The animation stays readable afterwards but no longer advances.
    pub fn dispose(&mut self) -> bool {
        if self.disposed {
            return false;
        }
        self.disposed = true;
        match self.scheduler.upgrade() {
            Some(scheduler) => {
                scheduler.unregister(&self.shared);
            }
            None => {
                log::debug!("[IndexAnimationHandle::dispose] scheduler already gone");
            }
        }
        true
    }

    #[inline]
    pub fn is_disposed(&self) -> bool {
        self.disposed
    }

    pub fn shared(&self) -> &Arc<SharedIndexAnimation> {
        &self.shared
    }

    /// Run `f` with exclusive access to the animation.
    pub fn with<R>(&self, f: impl FnOnce(&mut IndexAnimation) -> R) -> R {
        f(&mut self.shared.lock())
    }

    pub fn play(&self) {
        self.shared.lock().play();
    }

    pub fn stop(&self) {
        self.shared.lock().stop();
    }

    pub fn rewind(&self) {
        self.shared.lock().rewind();
    }

    pub fn set_speed(&self, speed: f32) -> bool {
        self.shared.lock().set_speed(speed)
    }

    pub fn set_play_mode(&self, play_mode: PlayMode) {
        self.shared.lock().set_play_mode(play_mode);
    }

    pub fn index(&self) -> usize {
        self.shared.lock().index()
    }

    pub fn is_playing(&self) -> bool {
        self.shared.lock().is_playing()
    }

    pub fn state(&self) -> PlaybackState {
        self.shared.lock().state()
    }

    pub fn subscribe(&self, callback: Arc<IndexListener>) -> Subscription {
        self.shared.lock().subscribe(callback)
    }

    pub fn subscribe_weak(&self, callback: &Arc<IndexListener>) -> Subscription {
        self.shared.lock().subscribe_weak(callback)
    }

    pub fn on_index_changed<F>(&self, f: F) -> ListenerId
    where
        F: Fn(&IndexAnimation, usize) + Send + Sync + 'static,
    {
        self.shared.lock().on_index_changed(f)
    }

    pub fn unsubscribe(&self, id: ListenerId) -> bool {
        self.shared.lock().unsubscribe(id)
    }
}

impl Drop for IndexAnimationHandle {
    fn drop(&mut self) {
        self.dispose();
    }
}
