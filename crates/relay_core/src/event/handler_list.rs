// handler_list.rs - Ordered, token-addressed handler storage
//
// Insertion order is invocation order. Invocation works on a snapshot, so a
// handler may connect or disconnect while the list is being walked; those
// changes take effect on the next invocation.
//
// Tokens are unique across every list in the process, so a token from one
// event never matches a handler on another.

use crate::event::Subscription;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

static NEXT_TOKEN: AtomicU64 = AtomicU64::new(0);

pub(crate) struct HandlerList<H: ?Sized> {
    entries: Mutex<Vec<(Subscription, Arc<H>)>>,
}

impl<H: ?Sized> HandlerList<H> {
    pub(crate) const fn new() -> Self {
        Self {
            entries: Mutex::new(Vec::new()),
        }
    }

    fn lock(&self) -> MutexGuard<'_, Vec<(Subscription, Arc<H>)>> {
        self.entries.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub(crate) fn push(&self, handler: Arc<H>) -> Subscription {
        let token = Subscription::new(NEXT_TOKEN.fetch_add(1, Ordering::Relaxed));
        self.lock().push((token, handler));
        token
    }

    pub(crate) fn remove(&self, token: Subscription) -> Option<Arc<H>> {
        let mut entries = self.lock();
        let position = entries.iter().position(|(t, _)| *t == token)?;
        Some(entries.remove(position).1)
    }

    pub(crate) fn snapshot(&self) -> Vec<Arc<H>> {
        self.lock()
            .iter()
            .map(|(_, handler)| Arc::clone(handler))
            .collect()
    }

    pub(crate) fn len(&self) -> usize {
        self.lock().len()
    }

    pub(crate) fn clear(&self) {
        self.lock().clear();
    }
}
