//! UpdateScheduler: deferred registration and the per-tick update pass.
//!
//! Each time domain owns three collections:
//! - `active`: entities updated every tick, in registration order
//! - `pending_add`: registrations waiting for the next resolution
//! - `pending_remove`: unregistrations waiting for the next resolution
//!
//! All six collections sit behind one lock. `tick` resolves pending
//! mutations under that lock, snapshots the active sets, then releases it
//! before calling into entities, so an entity may register or unregister
//! anything (itself included) from inside its own `update`. Such requests
//! are picked up by the next tick.

use std::cell::Cell;
use std::fmt;
use std::sync::{Arc, Weak};

use hashbrown::HashMap;
use indexmap::IndexMap;
use parking_lot::{Mutex, ReentrantMutex};
use serde::{Deserialize, Serialize};

use crate::config::SchedulerConfig;
use crate::updatable::{EntityKey, TimeDomain, Updatable};

type Slot = Weak<dyn Updatable>;

/// Keeps an allocation's address reserved until its queued removal resolves,
/// so a freed entity's key cannot be claimed by a newcomer in the meantime.
trait AddressGuard: Send {}

impl<T: ?Sized + Send + Sync> AddressGuard for Weak<T> {}

/// Outcome of [`UpdateScheduler::register`].
#[derive(Copy, Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
pub enum Registration {
    /// Queued for insertion at the next tick.
    Queued,
    /// Already waiting in the domain's pending-add set; nothing changed.
    AlreadyQueued,
}

/// Outcome of [`UpdateScheduler::unregister`].
#[derive(Copy, Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
pub enum Unregistration {
    Queued,
    AlreadyQueued,
}

/// What one call to [`UpdateScheduler::tick`] did.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TickStats {
    /// 1-based tick number; 0 when the call was rejected as re-entrant.
    pub tick: u64,
    pub scaled_updated: usize,
    pub unscaled_updated: usize,
    /// Entities moved from pending-add into an active set.
    pub added: usize,
    /// Entities removed from an active set by a pending removal.
    pub removed: usize,
    /// Entries dropped because their entity was freed without unregistering.
    pub pruned: usize,
}

impl TickStats {
    #[inline]
    pub fn updated(&self) -> usize {
        self.scaled_updated + self.unscaled_updated
    }
}

#[derive(Default)]
struct DomainSets {
    active: IndexMap<EntityKey, Slot>,
    pending_add: IndexMap<EntityKey, Slot>,
    pending_remove: HashMap<EntityKey, Box<dyn AddressGuard>>,
}

impl DomainSets {
    fn with_capacity(capacity: usize) -> Self {
        Self {
            active: IndexMap::with_capacity(capacity),
            pending_add: IndexMap::new(),
            pending_remove: HashMap::new(),
        }
    }

    /// Fold pending adds, then pending removes, into the active set.
    fn resolve(&mut self, domain: TimeDomain, prune: bool, stats: &mut TickStats) {
        if !self.pending_add.is_empty() {
            for (key, slot) in self.pending_add.drain(..) {
                if !self.active.contains_key(&key) {
                    self.active.insert(key, slot);
                    stats.added += 1;
                }
            }
        }

        for (key, _guard) in self.pending_remove.drain() {
            if self.active.shift_remove(&key).is_some() {
                stats.removed += 1;
            }
        }

        if prune {
            let before = self.active.len();
            self.active.retain(|_, slot| slot.strong_count() > 0);
            let pruned = before - self.active.len();
            if pruned > 0 {
                log::warn!(
                    "[UpdateScheduler::tick] pruned {pruned} {} entities that were dropped without unregistering",
                    domain.name()
                );
                stats.pruned += pruned;
            }
        }
    }

    fn snapshot(&self, out: &mut Vec<Arc<dyn Updatable>>) {
        out.extend(self.active.values().filter_map(Weak::upgrade));
    }

    fn clear(&mut self) {
        self.active.clear();
        self.pending_add.clear();
        self.pending_remove.clear();
    }
}

struct State {
    scaled: DomainSets,
    unscaled: DomainSets,
    ticks: u64,
}

impl State {
    fn domain(&self, domain: TimeDomain) -> &DomainSets {
        match domain {
            TimeDomain::Scaled => &self.scaled,
            TimeDomain::Unscaled => &self.unscaled,
        }
    }

    fn domain_mut(&mut self, domain: TimeDomain) -> &mut DomainSets {
        match domain {
            TimeDomain::Scaled => &mut self.scaled,
            TimeDomain::Unscaled => &mut self.unscaled,
        }
    }
}

/// Clears the in-tick flag even when an entity's update panics.
struct TickGuard<'a>(&'a Cell<bool>);

impl Drop for TickGuard<'_> {
    fn drop(&mut self) {
        self.0.set(false);
    }
}

/// Per-frame scheduler over two time domains.
///
/// The scheduler never owns its entities: it keeps `Weak` references and
/// matches them by allocation identity ([`EntityKey`]). Share it as
/// `Arc<UpdateScheduler>`; every method takes `&self` and is thread-safe.
pub struct UpdateScheduler {
    cfg: SchedulerConfig,
    state: Mutex<State>,
    /// Serialises ticks across threads. The flag marks a tick in progress
    /// on the owning thread.
    tick_gate: ReentrantMutex<Cell<bool>>,
}

impl Default for UpdateScheduler {
    fn default() -> Self {
        Self::new(SchedulerConfig::default())
    }
}

impl fmt::Debug for UpdateScheduler {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let state = self.state.lock();
        f.debug_struct("UpdateScheduler")
            .field("cfg", &self.cfg)
            .field("ticks", &state.ticks)
            .field("scaled_active", &state.scaled.active.len())
            .field("unscaled_active", &state.unscaled.active.len())
            .finish()
    }
}

impl UpdateScheduler {
    pub fn new(cfg: SchedulerConfig) -> Self {
        let state = State {
            scaled: DomainSets::with_capacity(cfg.initial_capacity),
            unscaled: DomainSets::with_capacity(cfg.initial_capacity),
            ticks: 0,
        };
        Self {
            cfg,
            state: Mutex::new(state),
            tick_gate: ReentrantMutex::new(Cell::new(false)),
        }
    }

    #[inline]
    pub fn config(&self) -> &SchedulerConfig {
        &self.cfg
    }

    /// Queue `entity` for insertion into its domain's active set at the next tick.
    ///
    /// Queuing an entity that is already active is allowed: resolution is a
    /// set union, so it collapses into the existing entry.
    pub fn register<U: Updatable + 'static>(&self, entity: &Arc<U>) -> Registration {
        let key = EntityKey::of(entity);
        let domain = entity.time_domain();
        let slot: Slot = Arc::downgrade(entity) as Slot;

        let mut state = self.state.lock();
        let sets = state.domain_mut(domain);
        if sets.pending_add.contains_key(&key) {
            log::warn!(
                "[UpdateScheduler::register] {key:?} is already queued for the {} domain",
                domain.name()
            );
            return Registration::AlreadyQueued;
        }
        sets.pending_add.insert(key, slot);
        log::trace!("[UpdateScheduler::register] queued {key:?} ({})", domain.name());
        Registration::Queued
    }

    /// Queue `entity` for removal from its domain's active set at the next tick.
    ///
    /// Unregistering something that was never registered is harmless: the
    /// request resolves to nothing.
    pub fn unregister<U: Updatable + ?Sized + 'static>(&self, entity: &Arc<U>) -> Unregistration {
        let key = EntityKey::of(entity);
        let domain = entity.time_domain();

        let mut state = self.state.lock();
        let sets = state.domain_mut(domain);
        if sets.pending_remove.contains_key(&key) {
            return Unregistration::AlreadyQueued;
        }
        sets.pending_remove
            .insert(key, Box::new(Arc::downgrade(entity)));
        log::trace!("[UpdateScheduler::unregister] queued {key:?} ({})", domain.name());
        Unregistration::Queued
    }

    /// Resolve pending mutations, then update every active entity once.
    ///
    /// Scaled entities receive `scaled_delta` and run before unscaled
    /// entities, which receive `unscaled_delta`. A panic inside an entity's
    /// update propagates to the caller; the scheduler stays usable.
    ///
    /// Ticks from different threads run one after another. Calling `tick`
    /// from inside an entity's update is rejected with a diagnostic and
    /// returns default stats.
    pub fn tick(&self, scaled_delta: f32, unscaled_delta: f32) -> TickStats {
        let gate = self.tick_gate.lock();
        if gate.replace(true) {
            log::warn!("[UpdateScheduler::tick] re-entrant tick ignored");
            return TickStats::default();
        }
        let _guard = TickGuard(&gate);

        let mut stats = TickStats::default();
        let mut scaled = Vec::new();
        let mut unscaled = Vec::new();
        {
            let mut state = self.state.lock();
            state.ticks += 1;
            stats.tick = state.ticks;
            for domain in TimeDomain::ORDER {
                state
                    .domain_mut(domain)
                    .resolve(domain, self.cfg.prune_dropped, &mut stats);
            }
            scaled.reserve(state.scaled.active.len());
            unscaled.reserve(state.unscaled.active.len());
            state.scaled.snapshot(&mut scaled);
            state.unscaled.snapshot(&mut unscaled);
        }

        for entity in &scaled {
            entity.update(scaled_delta);
        }
        stats.scaled_updated = scaled.len();

        for entity in &unscaled {
            entity.update(unscaled_delta);
        }
        stats.unscaled_updated = unscaled.len();

        stats
    }

    pub fn is_active<U: ?Sized>(&self, entity: &Arc<U>) -> bool {
        let key = EntityKey::of(entity);
        let state = self.state.lock();
        TimeDomain::ORDER
            .iter()
            .any(|d| state.domain(*d).active.contains_key(&key))
    }

    pub fn is_pending_add<U: ?Sized>(&self, entity: &Arc<U>) -> bool {
        let key = EntityKey::of(entity);
        let state = self.state.lock();
        TimeDomain::ORDER
            .iter()
            .any(|d| state.domain(*d).pending_add.contains_key(&key))
    }

    pub fn is_pending_remove<U: ?Sized>(&self, entity: &Arc<U>) -> bool {
        let key = EntityKey::of(entity);
        let state = self.state.lock();
        TimeDomain::ORDER
            .iter()
            .any(|d| state.domain(*d).pending_remove.contains_key(&key))
    }

    pub fn active_len(&self, domain: TimeDomain) -> usize {
        self.state.lock().domain(domain).active.len()
    }

    /// Pending adds plus pending removes for `domain`.
    pub fn pending_len(&self, domain: TimeDomain) -> usize {
        let state = self.state.lock();
        let sets = state.domain(domain);
        sets.pending_add.len() + sets.pending_remove.len()
    }

    pub fn tick_count(&self) -> u64 {
        self.state.lock().ticks
    }

    /// Forget every entity, active or pending, in both domains.
    pub fn clear(&self) {
        let mut state = self.state.lock();
        for domain in TimeDomain::ORDER {
            state.domain_mut(domain).clear();
        }
        log::debug!("[UpdateScheduler::clear] all domains cleared");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    struct Counter {
        scaled: bool,
        hits: AtomicUsize,
    }

    impl Counter {
        fn new(scaled: bool) -> Arc<Self> {
            Arc::new(Self {
                scaled,
                hits: AtomicUsize::new(0),
            })
        }
    }

    impl Updatable for Counter {
        fn update(&self, _delta_time: f32) {
            self.hits.fetch_add(1, Ordering::SeqCst);
        }
        fn uses_scaled_time(&self) -> bool {
            self.scaled
        }
    }

    #[test]
    fn pending_entities_are_not_ticked_until_resolved() {
        let sched = UpdateScheduler::default();
        let c = Counter::new(true);
        assert_eq!(sched.register(&c), Registration::Queued);
        assert!(sched.is_pending_add(&c));
        assert!(!sched.is_active(&c));
        assert_eq!(c.hits.load(Ordering::SeqCst), 0);

        let stats = sched.tick(0.1, 0.1);
        assert_eq!(stats.added, 1);
        assert_eq!(stats.scaled_updated, 1);
        assert!(sched.is_active(&c));
        assert!(!sched.is_pending_add(&c));
    }

    #[test]
    fn duplicate_pending_registration_is_reported() {
        let sched = UpdateScheduler::default();
        let c = Counter::new(false);
        assert_eq!(sched.register(&c), Registration::Queued);
        assert_eq!(sched.register(&c), Registration::AlreadyQueued);
        assert_eq!(sched.pending_len(TimeDomain::Unscaled), 1);
    }

    #[test]
    fn removal_queue_keeps_freed_address_reserved() {
        let sched = UpdateScheduler::default();
        let c = Counter::new(true);
        sched.unregister(&c);
        let key = EntityKey::of(&c);
        drop(c);
        // The guard in pending_remove holds a weak count, so the allocation
        // (and therefore the key) cannot be handed to a new entity yet.
        let state = sched.state.lock();
        let guard_alive = state.scaled.pending_remove.contains_key(&key);
        assert!(guard_alive);
    }
}
