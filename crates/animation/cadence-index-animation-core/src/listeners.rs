//! Index-changed listener registry.
//!
//! Callbacks are held either strongly or weakly. A weak entry lapses once
//! its owner drops the last `Arc`; lapsed entries are purged lazily during
//! dispatch and unsubscribe. Identity is the callback allocation, so the
//! same `Arc` can only be subscribed once.

use std::fmt;
use std::sync::{Arc, Weak};

use crate::animation::IndexAnimation;
use crate::ids::{IdAllocator, ListenerId};

/// Callback invoked with the animation and its new index.
pub type IndexListener = dyn Fn(&IndexAnimation, usize) + Send + Sync;

/// Outcome of a subscribe call.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Subscription {
    Added(ListenerId),
    /// The callback was already subscribed; carries the existing token.
    Duplicate(ListenerId),
}

impl Subscription {
    #[inline]
    pub fn id(&self) -> ListenerId {
        match *self {
            Self::Added(id) | Self::Duplicate(id) => id,
        }
    }

    #[inline]
    pub fn is_added(&self) -> bool {
        matches!(self, Self::Added(_))
    }
}

enum Callback {
    Strong(Arc<IndexListener>),
    Weak(Weak<IndexListener>),
}

impl Callback {
    fn address(&self) -> usize {
        match self {
            Self::Strong(cb) => Arc::as_ptr(cb) as *const () as usize,
            Self::Weak(cb) => Weak::as_ptr(cb) as *const () as usize,
        }
    }

    fn upgrade(&self) -> Option<Arc<IndexListener>> {
        match self {
            Self::Strong(cb) => Some(Arc::clone(cb)),
            Self::Weak(cb) => cb.upgrade(),
        }
    }

    fn is_live(&self) -> bool {
        match self {
            Self::Strong(_) => true,
            Self::Weak(cb) => cb.strong_count() > 0,
        }
    }
}

struct Entry {
    id: ListenerId,
    callback: Callback,
}

#[inline]
fn address_of(cb: &Arc<IndexListener>) -> usize {
    Arc::as_ptr(cb) as *const () as usize
}

/// Ordered set of listeners; dispatch follows subscription order.
#[derive(Default)]
pub struct ListenerRegistry {
    ids: IdAllocator,
    entries: Vec<Entry>,
}

impl fmt::Debug for ListenerRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ListenerRegistry")
            .field("entries", &self.entries.len())
            .finish()
    }
}

impl ListenerRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Subscribe and keep the callback alive.
    pub fn subscribe(&mut self, callback: Arc<IndexListener>) -> Subscription {
        self.insert(address_of(&callback), Callback::Strong(callback))
    }

    /// Subscribe without extending the callback's lifetime.
    pub fn subscribe_weak(&mut self, callback: &Arc<IndexListener>) -> Subscription {
        self.insert(address_of(callback), Callback::Weak(Arc::downgrade(callback)))
    }

    fn insert(&mut self, address: usize, callback: Callback) -> Subscription {
        if let Some(existing) = self.entries.iter().find(|e| e.callback.address() == address) {
            log::warn!(
                "[ListenerRegistry::subscribe] duplicate subscription ignored (id={})",
                existing.id.0
            );
            return Subscription::Duplicate(existing.id);
        }
        let id = self.ids.alloc_listener();
        self.entries.push(Entry { id, callback });
        Subscription::Added(id)
    }

    /// Remove by token. Returns `false` for unknown tokens.
    pub fn unsubscribe(&mut self, id: ListenerId) -> bool {
        let removed = self.remove_where(|e| e.id == id);
        if !removed {
            log::warn!(
                "[ListenerRegistry::unsubscribe] no listener with id={}",
                id.0
            );
        }
        removed
    }

    /// Remove by callback identity. Returns `false` if it was not subscribed.
    pub fn unsubscribe_callback(&mut self, callback: &Arc<IndexListener>) -> bool {
        let address = address_of(callback);
        let removed = self.remove_where(|e| e.callback.address() == address);
        if !removed {
            log::warn!("[ListenerRegistry::unsubscribe_callback] callback was not subscribed");
        }
        removed
    }

    fn remove_where(&mut self, pred: impl Fn(&Entry) -> bool) -> bool {
        let before = self.entries.len();
        self.entries.retain(|e| !pred(e));
        let removed = self.entries.len() != before;
        self.purge();
        removed
    }

    /// Drop weak entries whose owners are gone. Returns how many were dropped.
    pub fn purge(&mut self) -> usize {
        let before = self.entries.len();
        self.entries.retain(|e| e.callback.is_live());
        let purged = before - self.entries.len();
        if purged > 0 {
            log::debug!("[ListenerRegistry::purge] dropped {purged} lapsed listener(s)");
        }
        purged
    }

    pub fn contains(&self, id: ListenerId) -> bool {
        self.entries.iter().any(|e| e.id == id)
    }

    /// Number of entries, including weak entries that have lapsed but not yet
    /// been purged.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }

    /// Invoke every live listener once, in subscription order.
    pub(crate) fn dispatch(&mut self, animation: &IndexAnimation, index: usize) {
        self.purge();
        let live: Vec<Arc<IndexListener>> =
            self.entries.iter().filter_map(|e| e.callback.upgrade()).collect();
        for callback in live {
            callback(animation, index);
        }
    }
}
