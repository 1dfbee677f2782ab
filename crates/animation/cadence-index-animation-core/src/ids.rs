//! Identifiers and a simple allocator for listener tokens.

use serde::{Deserialize, Serialize};

/// Token returned by a subscription; used to unsubscribe.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash, Serialize, Deserialize)]
pub struct ListenerId(pub u64);

/// Monotonic allocator for [`ListenerId`].
#[derive(Default, Debug)]
pub struct IdAllocator {
    next_listener: u64,
}

impl IdAllocator {
    pub fn new() -> Self {
        Self::default()
    }

    #[inline]
    pub fn alloc_listener(&mut self) -> ListenerId {
        let id = ListenerId(self.next_listener);
        self.next_listener = self.next_listener.wrapping_add(1);
        id
    }
}
