#![forbid(unsafe_code)]

//! Signals that remember their last value.
//!
//! A [`CachedEmitter<T>`] behaves like an [`Emitter<T>`] except that every new
//! subscriber is immediately handed the most recent value (or the seed given
//! at construction). The cache is written *before* delivery starts, so a
//! subscriber that re-subscribes during a notification sees the new value.

use std::cell::RefCell;
use std::fmt;
use std::rc::Rc;

use crate::count::CountSignal;
use crate::emitter::{Emitter, WeakEmitter};
use crate::signal::Signal;
use crate::subscriber::{Subscriber, Unsubscribe};

/// An [`Emitter`] that replays its last emitted value to new subscribers.
///
/// Cloning creates a new handle to the same emitter and cache.
///
/// ```
/// use signalkit_core::{CachedEmitter, Signal};
/// use std::cell::Cell;
/// use std::rc::Rc;
///
/// let counter = CachedEmitter::new(0);
/// let shown = Rc::new(Cell::new(-1));
/// let probe = Rc::clone(&shown);
/// counter.subscribe_fn(move |n| probe.set(*n));
/// assert_eq!(shown.get(), 0);
///
/// counter.update(|n| n + 1);
/// assert_eq!(shown.get(), 1);
/// assert_eq!(counter.last_emitted(), 1);
/// ```
pub struct CachedEmitter<T> {
    emitter: Emitter<T>,
    last: Rc<RefCell<T>>,
}

impl<T> Clone for CachedEmitter<T> {
    fn clone(&self) -> Self {
        Self {
            emitter: self.emitter.clone(),
            last: Rc::clone(&self.last),
        }
    }
}

impl<T: fmt::Debug> fmt::Debug for CachedEmitter<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CachedEmitter")
            .field("last", &*self.last.borrow())
            .field("emitter", &self.emitter)
            .finish()
    }
}

impl<T: Clone + 'static> CachedEmitter<T> {
    /// Create a cached emitter seeded with `initial`.
    #[must_use]
    pub fn new(initial: T) -> Self {
        Self::from_emitter(Emitter::new(), initial)
    }

    /// Create a cached emitter with a trace label.
    #[must_use]
    pub fn labeled(label: impl Into<std::borrow::Cow<'static, str>>, initial: T) -> Self {
        Self::from_emitter(Emitter::labeled(label), initial)
    }

    fn from_emitter(emitter: Emitter<T>, initial: T) -> Self {
        Self {
            emitter,
            last: Rc::new(RefCell::new(initial)),
        }
    }

    /// Subscribe, then deliver the cached value to `subscriber` once.
    pub fn subscribe(&self, subscriber: &Subscriber<T>) -> Unsubscribe {
        let detach = self.emitter.subscribe(subscriber);
        let last = self.last_emitted();
        subscriber.call(&last);
        detach
    }

    /// Cache `value`, then deliver it to every current subscriber.
    pub fn emit(&self, value: T) {
        *self.last.borrow_mut() = value.clone();
        self.emitter.emit(value);
    }

    /// Emit the value computed from the cached one.
    ///
    /// `next` runs on a copy of the cached value, so it may itself emit on
    /// this signal.
    pub fn update(&self, next: impl FnOnce(&T) -> T) {
        let current = self.last_emitted();
        self.emit(next(&current));
    }

    /// Deliver `value` to `subscriber` only. The cache is left untouched.
    pub fn emit_for(&self, subscriber: &Subscriber<T>, value: T) {
        self.emitter.emit_for(subscriber, value);
    }

    /// A clone of the cached value.
    #[must_use]
    pub fn last_emitted(&self) -> T {
        self.last.borrow().clone()
    }

    /// Borrow the cached value.
    ///
    /// # Panics
    ///
    /// Panics if `f` emits on this same signal (re-entrant borrow).
    pub fn with_last<R>(&self, f: impl FnOnce(&T) -> R) -> R {
        f(&self.last.borrow())
    }

    /// Remove `subscriber` if present.
    pub fn unsubscribe(&self, subscriber: &Subscriber<T>) {
        self.emitter.unsubscribe(subscriber);
    }

    /// See [`Emitter::detach_handle`].
    pub fn detach_handle(&self, subscriber: &Subscriber<T>) -> Unsubscribe {
        self.emitter.detach_handle(subscriber)
    }

    /// Remove every subscriber as a single count transition.
    pub fn clear_subscriptions(&self) {
        self.emitter.clear_subscriptions();
    }

    /// Number of active subscriptions, read now.
    #[must_use]
    pub fn n_of_subscriptions(&self) -> usize {
        self.emitter.n_of_subscriptions()
    }

    /// See [`Emitter::n_of_subscriptions_signal`].
    #[must_use]
    pub fn n_of_subscriptions_signal(&self) -> CountSignal {
        self.emitter.n_of_subscriptions_signal()
    }

    /// The uncached emitter underneath.
    ///
    /// Emitting through it bypasses the cache.
    #[must_use]
    pub fn as_emitter(&self) -> &Emitter<T> {
        &self.emitter
    }

    /// A non-owning handle to the underlying emitter.
    #[must_use]
    pub fn downgrade(&self) -> WeakEmitter<T> {
        self.emitter.downgrade()
    }
}

impl<T: Clone + 'static> Signal<T> for CachedEmitter<T> {
    fn subscribe(&self, subscriber: &Subscriber<T>) -> Unsubscribe {
        CachedEmitter::subscribe(self, subscriber)
    }

    fn detach_handle(&self, subscriber: &Subscriber<T>) -> Unsubscribe {
        CachedEmitter::detach_handle(self, subscriber)
    }

    fn n_of_subscriptions(&self) -> usize {
        CachedEmitter::n_of_subscriptions(self)
    }

    fn n_of_subscriptions_signal(&self) -> CountSignal {
        CachedEmitter::n_of_subscriptions_signal(self)
    }
}
