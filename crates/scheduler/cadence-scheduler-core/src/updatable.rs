//! The contract every scheduled entity implements, plus identity helpers.

use std::sync::{Arc, Weak};

use serde::{Deserialize, Serialize};

/// An entity advanced once per scheduler tick by an elapsed-time delta.
///
/// `update` takes `&self`: the scheduler shares entities across threads and
/// never hands out exclusive access. Implementors that mutate state keep it
/// behind their own lock.
pub trait Updatable: Send + Sync {
    fn update(&self, delta_time: f32);

    /// Whether this entity receives the time-scaled delta (`true`) or the
    /// real elapsed delta (`false`). Must not change while registered.
    fn uses_scaled_time(&self) -> bool;

    #[inline]
    fn time_domain(&self) -> TimeDomain {
        TimeDomain::from_scaled(self.uses_scaled_time())
    }
}

/// Which delta an entity is driven with.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash, Serialize, Deserialize)]
pub enum TimeDomain {
    Scaled,
    Unscaled,
}

impl TimeDomain {
    /// Resolution and update order within a tick.
    pub const ORDER: [TimeDomain; 2] = [TimeDomain::Scaled, TimeDomain::Unscaled];

    #[inline]
    pub fn from_scaled(uses_scaled_time: bool) -> Self {
        if uses_scaled_time {
            Self::Scaled
        } else {
            Self::Unscaled
        }
    }

    #[inline]
    pub fn name(self) -> &'static str {
        match self {
            Self::Scaled => "scaled",
            Self::Unscaled => "unscaled",
        }
    }
}

/// Identity of a shared entity: the address of its `Arc` allocation.
///
/// Two keys are equal only when they name the same allocation. The address
/// cannot be reused while any `Weak` to it is alive, and the scheduler keeps
/// one for every key it tracks.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash, PartialOrd, Ord)]
pub struct EntityKey(usize);

impl EntityKey {
    #[inline]
    pub fn of<U: ?Sized>(entity: &Arc<U>) -> Self {
        Self(Arc::as_ptr(entity) as *const () as usize)
    }

    #[inline]
    pub fn of_weak<U: ?Sized>(entity: &Weak<U>) -> Self {
        Self(Weak::as_ptr(entity) as *const () as usize)
    }
}
