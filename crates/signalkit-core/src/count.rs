#![forbid(unsafe_code)]

//! Read-only view of an emitter's subscriber count.
//!
//! The emitter owns the cached count signal and is its only writer. Callers
//! get a [`CountSignal`], which can be subscribed to and read but never
//! emitted on or cleared, so the published count always matches the
//! emitter's subscriber list.

use std::fmt;

use crate::cached::CachedEmitter;
use crate::signal::Signal;
use crate::subscriber::{Subscriber, Unsubscribe};

/// Subscriber count of an emitter, republished after every change.
///
/// New subscribers receive the current count immediately.
#[derive(Clone)]
pub struct CountSignal {
    inner: CachedEmitter<usize>,
}

impl fmt::Debug for CountSignal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CountSignal")
            .field("count", &self.inner.last_emitted())
            .field("watchers", &self.inner.n_of_subscriptions())
            .finish()
    }
}

impl CountSignal {
    pub(crate) fn new(inner: CachedEmitter<usize>) -> Self {
        Self { inner }
    }

    /// Subscribe, then deliver the current count to `subscriber` once.
    pub fn subscribe(&self, subscriber: &Subscriber<usize>) -> Unsubscribe {
        self.inner.subscribe(subscriber)
    }

    /// Remove `subscriber` if present.
    pub fn unsubscribe(&self, subscriber: &Subscriber<usize>) {
        self.inner.unsubscribe(subscriber);
    }

    /// The most recently published count.
    #[must_use]
    pub fn last_emitted(&self) -> usize {
        self.inner.last_emitted()
    }
}

impl Signal<usize> for CountSignal {
    fn subscribe(&self, subscriber: &Subscriber<usize>) -> Unsubscribe {
        CountSignal::subscribe(self, subscriber)
    }

    fn detach_handle(&self, subscriber: &Subscriber<usize>) -> Unsubscribe {
        self.inner.detach_handle(subscriber)
    }

    fn n_of_subscriptions(&self) -> usize {
        self.inner.n_of_subscriptions()
    }

    fn n_of_subscriptions_signal(&self) -> CountSignal {
        self.inner.n_of_subscriptions_signal()
    }
}
