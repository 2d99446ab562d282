// multicast.rs - Ordered multicast event
//
// No uniqueness: connecting the same closure twice runs it twice.

use crate::event::handler_list::HandlerList;
use crate::event::Subscription;
use std::fmt;
use std::sync::Arc;

type Handler<A> = dyn Fn(&mut A) + Send + Sync;

/// An ordered list of handlers fired synchronously by the event's owner.
///
/// Owners typically embed an `Event` and hand out a [`Subscriber`] so that
/// outside code can connect but not fire.
///
/// # Example
/// ```ignore
/// let on_load: Event<Vec<u8>> = Event::new();
/// on_load.connect(|buffer| buffer.extend_from_slice(b"\n-- patched"));
///
/// let mut buffer = b"print('hi')".to_vec();
/// on_load.invoke(&mut buffer);
/// ```
pub struct Event<A> {
    handlers: HandlerList<Handler<A>>,
}

impl<A> Event<A> {
    pub const fn new() -> Self {
        Self {
            handlers: HandlerList::new(),
        }
    }

    /// Append `handler`. It runs after every handler connected before it.
    pub fn connect<F>(&self, handler: F) -> Subscription
    where
        F: Fn(&mut A) + Send + Sync + 'static,
    {
        let token = self.handlers.push(Arc::new(handler));
        tracing::trace!(subscription = %token, "event handler connected");
        token
    }

    /// Remove the handler behind `subscription`. Returns false if it was
    /// already gone.
    pub fn disconnect(&self, subscription: Subscription) -> bool {
        let removed = self.handlers.remove(subscription).is_some();
        tracing::trace!(%subscription, removed, "event handler disconnected");
        removed
    }

    /// Call every connected handler in connection order with the same
    /// arguments. Returns the number of handlers run.
    pub fn invoke(&self, args: &mut A) -> usize {
        let handlers = self.handlers.snapshot();
        for handler in &handlers {
            (**handler)(args);
        }
        handlers.len()
    }

    pub fn subscriber_count(&self) -> usize {
        self.handlers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.subscriber_count() == 0
    }

    pub fn clear(&self) {
        self.handlers.clear();
    }

    /// Connect-only view for code that must not fire the event.
    pub fn subscriber(&self) -> Subscriber<'_, A> {
        Subscriber { event: self }
    }
}

impl<A> Default for Event<A> {
    fn default() -> Self {
        Self::new()
    }
}

impl<A> fmt::Debug for Event<A> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Event")
            .field("subscribers", &self.subscriber_count())
            .finish()
    }
}

/// Borrowed handle that can connect to and disconnect from an [`Event`].
pub struct Subscriber<'a, A> {
    event: &'a Event<A>,
}

impl<A> Subscriber<'_, A> {
    pub fn connect<F>(&self, handler: F) -> Subscription
    where
        F: Fn(&mut A) + Send + Sync + 'static,
    {
        self.event.connect(handler)
    }

    pub fn disconnect(&self, subscription: Subscription) -> bool {
        self.event.disconnect(subscription)
    }
}
