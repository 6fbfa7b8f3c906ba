#![forbid(unsafe_code)]

//! The base subscribe/emit primitive.
//!
//! # Design
//!
//! [`Emitter<T>`] is a cheap handle (`Rc` inside) to a private subscriber
//! list. Emission copies the list before iterating, so callbacks may
//! subscribe, unsubscribe (themselves or others) or emit again without
//! affecting the delivery set of the emission already in flight.
//!
//! # Invariants
//!
//! 1. A subscriber identity appears at most once in the list.
//! 2. Subscribers are notified in insertion order, as snapshotted when the
//!    emission started.
//! 3. The count signal (if anyone asked for it) emits the new count after
//!    every mutation that changes the count, and only then.
//! 4. No `RefCell` borrow is held while a subscriber runs.

use std::borrow::Cow;
use std::cell::{OnceCell, RefCell};
use std::fmt;
use std::rc::{Rc, Weak};

use tracing::trace;

use crate::cached::CachedEmitter;
use crate::count::CountSignal;
use crate::signal::Signal;
use crate::subscriber::{Subscriber, Unsubscribe};

struct EmitterInner<T> {
    subscribers: RefCell<Vec<Subscriber<T>>>,
    /// Created on first request; see [`Emitter::n_of_subscriptions_signal`].
    count: OnceCell<CachedEmitter<usize>>,
    label: Option<Cow<'static, str>>,
}

/// A synchronous signal that delivers emitted values to its subscribers.
///
/// Cloning an `Emitter` creates a new handle to the **same** subscriber
/// list.
///
/// ```
/// use signalkit_core::{Emitter, Subscriber};
/// use std::cell::Cell;
/// use std::rc::Rc;
///
/// let signal = Emitter::new();
/// let seen = Rc::new(Cell::new(0));
/// let probe = Rc::clone(&seen);
/// let subscriber = Subscriber::new(move |v: &i32| probe.set(*v));
///
/// let detach = signal.subscribe(&subscriber);
/// signal.emit(3);
/// assert_eq!(seen.get(), 3);
///
/// detach.unsubscribe();
/// signal.emit(42);
/// assert_eq!(seen.get(), 3);
/// ```
pub struct Emitter<T> {
    inner: Rc<EmitterInner<T>>,
}

impl<T> Clone for Emitter<T> {
    fn clone(&self) -> Self {
        Self {
            inner: Rc::clone(&self.inner),
        }
    }
}

impl<T> fmt::Debug for Emitter<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Emitter")
            .field("label", &self.inner.label)
            .field("subscribers", &self.inner.subscribers.borrow().len())
            .finish()
    }
}

impl<T: 'static> Default for Emitter<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: 'static> Emitter<T> {
    /// Create an emitter with no subscribers.
    #[must_use]
    pub fn new() -> Self {
        Self::with_label(None)
    }

    /// Create an emitter whose trace events carry `label`.
    #[must_use]
    pub fn labeled(label: impl Into<Cow<'static, str>>) -> Self {
        Self::with_label(Some(label.into()))
    }

    fn with_label(label: Option<Cow<'static, str>>) -> Self {
        Self {
            inner: Rc::new(EmitterInner {
                subscribers: RefCell::new(Vec::new()),
                count: OnceCell::new(),
                label,
            }),
        }
    }

    /// The label given at construction, if any.
    #[must_use]
    pub fn label(&self) -> Option<&str> {
        self.inner.label.as_deref()
    }

    /// Add `subscriber` unless it is already subscribed.
    ///
    /// Returns a detach handle for that subscriber. Subscribing the same
    /// identity twice is a no-op that still returns a working handle.
    pub fn subscribe(&self, subscriber: &Subscriber<T>) -> Unsubscribe {
        let inserted = {
            let mut subscribers = self.inner.subscribers.borrow_mut();
            if subscribers.iter().any(|s| s.same_as(subscriber)) {
                false
            } else {
                subscribers.push(subscriber.clone());
                true
            }
        };
        if inserted {
            self.count_changed("subscribe");
        }
        self.detach_handle(subscriber)
    }

    /// Remove `subscriber` if present.
    pub fn unsubscribe(&self, subscriber: &Subscriber<T>) {
        self.remove_where(|s| s.same_as(subscriber));
    }

    /// Build a detach handle for `subscriber` without subscribing it.
    ///
    /// The handle holds only weak references to the emitter and the
    /// subscriber; it becomes inert once either is gone.
    pub fn detach_handle(&self, subscriber: &Subscriber<T>) -> Unsubscribe {
        let emitter = Rc::downgrade(&self.inner);
        let target = subscriber.downgrade();
        Unsubscribe::new(move || {
            if let Some(inner) = emitter.upgrade() {
                Emitter { inner }.remove_where(|s| target.matches(s));
            }
        })
    }

    /// Deliver `value` to every current subscriber, in insertion order.
    pub fn emit(&self, value: T) {
        let snapshot: Vec<Subscriber<T>> = self.inner.subscribers.borrow().clone();
        for subscriber in &snapshot {
            subscriber.call(&value);
        }
    }

    /// Deliver `value` to `subscriber` only, if it is currently subscribed.
    pub fn emit_for(&self, subscriber: &Subscriber<T>, value: T) {
        let target = self
            .inner
            .subscribers
            .borrow()
            .iter()
            .find(|s| s.same_as(subscriber))
            .cloned();
        if let Some(target) = target {
            target.call(&value);
        }
    }

    /// Remove every subscriber as a single count transition.
    pub fn clear_subscriptions(&self) {
        let removed = std::mem::take(&mut *self.inner.subscribers.borrow_mut());
        if !removed.is_empty() {
            self.count_changed("clear");
        }
        drop(removed);
    }

    /// Number of active subscriptions, read now.
    #[must_use]
    pub fn n_of_subscriptions(&self) -> usize {
        self.inner.subscribers.borrow().len()
    }

    /// A read-only signal publishing the subscriber count after every change.
    ///
    /// New subscribers to it receive the current count immediately. Only
    /// this emitter writes to it.
    #[must_use]
    pub fn n_of_subscriptions_signal(&self) -> CountSignal {
        let count = self
            .inner
            .count
            .get_or_init(|| CachedEmitter::new(self.n_of_subscriptions()));
        CountSignal::new(count.clone())
    }

    /// A non-owning handle to this emitter.
    #[must_use]
    pub fn downgrade(&self) -> WeakEmitter<T> {
        WeakEmitter {
            inner: Rc::downgrade(&self.inner),
        }
    }

    /// Whether two handles refer to the same emitter.
    #[must_use]
    pub fn ptr_eq(&self, other: &Self) -> bool {
        Rc::ptr_eq(&self.inner, &other.inner)
    }

    fn remove_where(&self, matches: impl Fn(&Subscriber<T>) -> bool) {
        let removed = {
            let mut subscribers = self.inner.subscribers.borrow_mut();
            subscribers
                .iter()
                .position(|s| matches(s))
                .map(|index| subscribers.remove(index))
        };
        if removed.is_some() {
            self.count_changed("unsubscribe");
        }
    }

    fn count_changed(&self, cause: &'static str) {
        let count = self.n_of_subscriptions();
        trace!(
            label = self.label().unwrap_or("-"),
            cause,
            count,
            "subscriber count changed"
        );
        if let Some(signal) = self.inner.count.get() {
            signal.emit(count);
        }
    }
}

impl<T: 'static> Signal<T> for Emitter<T> {
    fn subscribe(&self, subscriber: &Subscriber<T>) -> Unsubscribe {
        Emitter::subscribe(self, subscriber)
    }

    fn detach_handle(&self, subscriber: &Subscriber<T>) -> Unsubscribe {
        Emitter::detach_handle(self, subscriber)
    }

    fn n_of_subscriptions(&self) -> usize {
        Emitter::n_of_subscriptions(self)
    }

    fn n_of_subscriptions_signal(&self) -> CountSignal {
        Emitter::n_of_subscriptions_signal(self)
    }
}

/// Non-owning handle to an [`Emitter`].
pub struct WeakEmitter<T> {
    inner: Weak<EmitterInner<T>>,
}

impl<T> Clone for WeakEmitter<T> {
    fn clone(&self) -> Self {
        Self {
            inner: Weak::clone(&self.inner),
        }
    }
}

impl<T> fmt::Debug for WeakEmitter<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("WeakEmitter")
            .field("alive", &(self.inner.strong_count() > 0))
            .finish()
    }
}

impl<T: 'static> WeakEmitter<T> {
    /// Recover a strong handle if the emitter still exists.
    #[must_use]
    pub fn upgrade(&self) -> Option<Emitter<T>> {
        self.inner.upgrade().map(|inner| Emitter { inner })
    }

    /// Emit through the emitter if it still exists.
    pub fn emit(&self, value: T) {
        if let Some(emitter) = self.upgrade() {
            emitter.emit(value);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::Cell;

    fn recorder<T: Clone + 'static>() -> (Subscriber<T>, Rc<RefCell<Vec<T>>>) {
        let seen = Rc::new(RefCell::new(Vec::new()));
        let probe = Rc::clone(&seen);
        let subscriber = Subscriber::new(move |v: &T| probe.borrow_mut().push(v.clone()));
        (subscriber, seen)
    }

    #[test]
    fn emit_reaches_subscriber() {
        let signal = Emitter::new();
        let (sub, seen) = recorder::<i32>();
        signal.subscribe(&sub);
        signal.emit(10);
        assert_eq!(*seen.borrow(), vec![10]);
    }

    #[test]
    fn unit_signal() {
        let signal = Emitter::<()>::new();
        let called = Rc::new(Cell::new(false));
        let probe = Rc::clone(&called);
        signal.subscribe(&Subscriber::new(move |_: &()| probe.set(true)));
        signal.emit(());
        assert!(called.get());
    }

    #[test]
    fn same_subscriber_twice_is_deduplicated() {
        let signal = Emitter::new();
        let (sub, seen) = recorder::<i32>();
        assert_eq!(signal.n_of_subscriptions(), 0);
        signal.subscribe(&sub);
        assert_eq!(signal.n_of_subscriptions(), 1);
        signal.subscribe(&sub);
        assert_eq!(signal.n_of_subscriptions(), 1);
        signal.emit(10);
        assert_eq!(seen.borrow().len(), 1);
    }

    #[test]
    fn every_handle_of_a_deduplicated_subscriber_is_idempotent() {
        let signal = Emitter::<i32>::new();
        let (sub, _) = recorder::<i32>();
        let first = signal.subscribe(&sub);
        let second = signal.subscribe(&sub);
        let third = signal.subscribe(&sub);
        assert_eq!(signal.n_of_subscriptions(), 1);
        third.unsubscribe();
        second.unsubscribe();
        first.unsubscribe();
        assert_eq!(signal.n_of_subscriptions(), 0);
    }

    #[test]
    fn wrapped_subscriber_is_distinct() {
        let signal = Emitter::<i32>::new();
        let (sub, _) = recorder::<i32>();
        let first = signal.subscribe(&sub);
        let inner = sub.clone();
        let second = signal.subscribe(&Subscriber::new(move |v: &i32| inner.call(v)));
        assert_eq!(signal.n_of_subscriptions(), 2);
        second.unsubscribe();
        assert_eq!(signal.n_of_subscriptions(), 1);
        first.unsubscribe();
        assert_eq!(signal.n_of_subscriptions(), 0);
    }

    #[test]
    fn unsubscribed_subscriber_stops_receiving() {
        let signal = Emitter::new();
        let (sub1, seen1) = recorder::<i32>();
        let (sub2, seen2) = recorder::<i32>();
        signal.subscribe(&sub1);
        let detach2 = signal.subscribe(&sub2);
        signal.emit(10);
        detach2.unsubscribe();
        signal.emit(20);
        assert_eq!(*seen1.borrow(), vec![10, 20]);
        assert_eq!(*seen2.borrow(), vec![10]);
    }

    #[test]
    fn unsubscribe_unknown_is_noop() {
        let signal = Emitter::<i32>::new();
        let (sub, _) = recorder::<i32>();
        let (stranger, _) = recorder::<i32>();
        signal.subscribe(&sub);
        signal.unsubscribe(&stranger);
        assert_eq!(signal.n_of_subscriptions(), 1);
    }

    #[test]
    fn emit_for_targets_one_subscriber() {
        let signal = Emitter::new();
        let (sub1, seen1) = recorder::<i32>();
        let (sub2, seen2) = recorder::<i32>();
        signal.subscribe(&sub1);
        signal.subscribe(&sub2);
        signal.emit_for(&sub2, 10);
        assert!(seen1.borrow().is_empty());
        assert_eq!(*seen2.borrow(), vec![10]);
    }

    #[test]
    fn emit_for_after_unsubscribe_is_noop() {
        let signal = Emitter::new();
        let (sub1, seen1) = recorder::<i32>();
        let (sub2, seen2) = recorder::<i32>();
        signal.subscribe(&sub1);
        signal.subscribe(&sub2).unsubscribe();
        signal.emit_for(&sub2, 10);
        assert!(seen1.borrow().is_empty());
        assert!(seen2.borrow().is_empty());
    }

    #[test]
    fn removal_during_emit_applies_to_next_emit() {
        let signal = Emitter::<i32>::new();
        let (victim, seen) = recorder::<i32>();
        let victim_detach = Rc::new(RefCell::new(None::<Unsubscribe>));
        let slot = Rc::clone(&victim_detach);
        let killer = Subscriber::new(move |_: &i32| {
            if let Some(detach) = slot.borrow().as_ref() {
                detach.unsubscribe();
            }
        });
        signal.subscribe(&killer);
        *victim_detach.borrow_mut() = Some(signal.subscribe(&victim));

        signal.emit(1);
        assert_eq!(*seen.borrow(), vec![1]);
        assert_eq!(signal.n_of_subscriptions(), 1);

        signal.emit(2);
        assert_eq!(*seen.borrow(), vec![1]);
    }

    #[test]
    fn addition_during_emit_applies_to_next_emit() {
        let signal = Emitter::<i32>::new();
        let (late, seen) = recorder::<i32>();
        let target = signal.clone();
        let adder = Subscriber::new(move |_: &i32| {
            target.subscribe(&late);
        });
        signal.subscribe(&adder);

        signal.emit(1);
        assert!(seen.borrow().is_empty());
        assert_eq!(signal.n_of_subscriptions(), 2);

        signal.emit(2);
        assert_eq!(*seen.borrow(), vec![2]);
    }

    #[test]
    fn self_unsubscribe_during_emit() {
        let signal = Emitter::<i32>::new();
        let calls = Rc::new(Cell::new(0u32));
        let handle = Rc::new(RefCell::new(None::<Unsubscribe>));
        let (probe, slot) = (Rc::clone(&calls), Rc::clone(&handle));
        let sub = Subscriber::new(move |_: &i32| {
            probe.set(probe.get() + 1);
            if let Some(detach) = slot.borrow().as_ref() {
                detach.unsubscribe();
            }
        });
        *handle.borrow_mut() = Some(signal.subscribe(&sub));
        signal.emit(1);
        signal.emit(2);
        assert_eq!(calls.get(), 1);
        assert_eq!(signal.n_of_subscriptions(), 0);
    }

    #[test]
    fn nested_emit_runs_inside_outer_emit() {
        let signal = Emitter::<i32>::new();
        let (sub, seen) = recorder::<i32>();
        let target = signal.clone();
        let reemitter = Subscriber::new(move |v: &i32| {
            if *v == 1 {
                target.emit(2);
            }
        });
        signal.subscribe(&reemitter);
        signal.subscribe(&sub);
        signal.emit(1);
        assert_eq!(*seen.borrow(), vec![2, 1]);
    }

    #[test]
    fn clear_removes_all() {
        let signal = Emitter::new();
        let (sub1, seen) = recorder::<i32>();
        let (sub2, _) = recorder::<i32>();
        signal.subscribe(&sub1);
        signal.subscribe(&sub2);
        assert_eq!(signal.n_of_subscriptions(), 2);
        signal.clear_subscriptions();
        assert_eq!(signal.n_of_subscriptions(), 0);
        signal.emit(10);
        assert!(seen.borrow().is_empty());
    }

    #[test]
    fn count_signal_reports_after_mutation() {
        let signal = Emitter::<i32>::new();
        let counts = signal.n_of_subscriptions_signal();
        let (count_sub, seen) = recorder::<usize>();
        counts.subscribe(&count_sub);
        assert_eq!(*seen.borrow(), vec![0]);

        let (a, _) = recorder::<i32>();
        let (b, _) = recorder::<i32>();
        signal.subscribe(&a);
        signal.subscribe(&a);
        signal.subscribe(&b);
        signal.unsubscribe(&a);
        signal.unsubscribe(&a);
        signal.subscribe(&a);
        signal.clear_subscriptions();
        signal.clear_subscriptions();
        assert_eq!(*seen.borrow(), vec![0, 1, 2, 1, 2, 0]);
    }

    #[test]
    fn count_signal_observes_applied_mutation() {
        let signal = Emitter::<i32>::new();
        let observed = Rc::new(RefCell::new(Vec::new()));
        let (probe, source) = (Rc::clone(&observed), signal.clone());
        signal
            .n_of_subscriptions_signal()
            .subscribe(&Subscriber::new(move |count: &usize| {
                probe.borrow_mut().push((*count, source.n_of_subscriptions()));
            }));
        let (a, _) = recorder::<i32>();
        signal.subscribe(&a).unsubscribe();
        assert_eq!(*observed.borrow(), vec![(0, 0), (1, 1), (0, 0)]);
    }

    #[test]
    fn count_signal_is_seeded_with_current_count() {
        let signal = Emitter::<i32>::new();
        let (a, _) = recorder::<i32>();
        signal.subscribe(&a);
        assert_eq!(signal.n_of_subscriptions_signal().last_emitted(), 1);
    }

    #[test]
    fn detach_handle_outliving_emitter_is_inert() {
        let signal = Emitter::<i32>::new();
        let (a, _) = recorder::<i32>();
        let detach = signal.subscribe(&a);
        drop(signal);
        detach.unsubscribe();
    }

    #[test]
    fn weak_emitter_emits_while_alive() {
        let signal = Emitter::new();
        let (sub, seen) = recorder::<i32>();
        signal.subscribe(&sub);
        let weak = signal.downgrade();
        weak.emit(5);
        assert_eq!(*seen.borrow(), vec![5]);
        drop(signal);
        assert!(weak.upgrade().is_none());
        weak.emit(6);
        assert_eq!(*seen.borrow(), vec![5]);
    }

    #[test]
    fn clone_shares_subscribers() {
        let a = Emitter::<i32>::labeled("shared");
        let b = a.clone();
        let (sub, _) = recorder::<i32>();
        a.subscribe(&sub);
        assert_eq!(b.n_of_subscriptions(), 1);
        assert!(a.ptr_eq(&b));
        assert_eq!(b.label(), Some("shared"));
    }

    #[test]
    fn debug_format() {
        let signal = Emitter::<i32>::labeled("year");
        let dbg = format!("{signal:?}");
        assert!(dbg.contains("Emitter"));
        assert!(dbg.contains("year"));
    }
}
