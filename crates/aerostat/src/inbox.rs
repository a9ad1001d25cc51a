//! Hand-off point between async loads and the frame loop.
//!
//! Loader tasks push results from any thread; the frame loop drains them
//! once per frame. Closing the inbox (on stop) makes every later push a
//! logged no-op.

use std::sync::Arc;

use parking_lot::Mutex;

#[derive(Debug)]
struct InboxState<T> {
    items: Vec<T>,
    closed: bool,
    discarded: u64,
}

/// Shared, closable queue. Clones share the same storage.
#[derive(Debug)]
pub struct Inbox<T> {
    inner: Arc<Mutex<InboxState<T>>>,
}

impl<T> Clone for Inbox<T> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<T> Default for Inbox<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> Inbox<T> {
    /// Creates an open, empty inbox.
    #[must_use]
    pub fn new() -> Self {
        Self {
            inner: Arc::new(Mutex::new(InboxState {
                items: Vec::new(),
                closed: false,
                discarded: 0,
            })),
        }
    }

    /// Queues an item. Returns `false` and drops it if the inbox is closed.
    pub fn push(&self, item: T) -> bool {
        let mut state = self.inner.lock();
        if state.closed {
            state.discarded += 1;
            tracing::debug!(discarded = state.discarded, "Late delivery discarded");
            return false;
        }
        state.items.push(item);
        true
    }

    /// Takes everything queued so far.
    pub fn drain(&self) -> Vec<T> {
        std::mem::take(&mut self.inner.lock().items)
    }

    /// Rejects future pushes and drops anything still queued.
    pub fn close(&self) {
        let mut state = self.inner.lock();
        if !state.closed {
            state.closed = true;
            state.discarded += state.items.len() as u64;
            state.items.clear();
        }
    }

    /// True once closed.
    #[must_use]
    pub fn is_closed(&self) -> bool {
        self.inner.lock().closed
    }

    /// Items dropped because they arrived after close.
    #[must_use]
    pub fn discarded(&self) -> u64 {
        self.inner.lock().discarded
    }

    /// Items waiting to be drained.
    #[must_use]
    pub fn pending(&self) -> usize {
        self.inner.lock().items.len()
    }
}
