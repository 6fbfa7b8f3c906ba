#![forbid(unsafe_code)]

//! The read-only signal interface shared by emitters and composites.

use std::cell::{Cell, OnceCell};
use std::rc::Rc;

use crate::count::CountSignal;
use crate::subscriber::{Subscriber, Unsubscribe};

/// Anything that can be subscribed to.
///
/// Implemented by [`Emitter`](crate::Emitter),
/// [`CachedEmitter`](crate::CachedEmitter), [`CountSignal`] and the
/// composites built by `signalkit-compose`. Only the owner of a signal can
/// emit on it; consumers see this trait.
pub trait Signal<T: 'static> {
    /// Subscribe `subscriber`; duplicates are ignored.
    fn subscribe(&self, subscriber: &Subscriber<T>) -> Unsubscribe;

    /// A detach handle for `subscriber` that does not subscribe it.
    fn detach_handle(&self, subscriber: &Subscriber<T>) -> Unsubscribe;

    /// Number of active subscriptions, read now.
    fn n_of_subscriptions(&self) -> usize;

    /// Read-only signal republishing the subscription count on every change.
    fn n_of_subscriptions_signal(&self) -> CountSignal;

    /// Subscribe a closure under a fresh identity.
    fn subscribe_fn(&self, callback: impl Fn(&T) + 'static) -> Unsubscribe
    where
        Self: Sized,
    {
        self.subscribe(&Subscriber::new(callback))
    }

    /// Receive exactly one value, then detach.
    ///
    /// The subscription is removed *before* `callback` runs, so code inside
    /// the callback already observes the reduced count. Calling the returned
    /// handle before the first delivery cancels the callback.
    fn subscribe_once(&self, callback: impl FnOnce(&T) + 'static) -> Unsubscribe
    where
        Self: Sized,
    {
        let pending = Cell::new(Some(callback));
        let own_handle: Rc<OnceCell<Unsubscribe>> = Rc::new(OnceCell::new());
        let slot = Rc::clone(&own_handle);
        let wrapper = Subscriber::new(move |value: &T| {
            if let Some(callback) = pending.take() {
                if let Some(detach) = slot.get() {
                    detach.unsubscribe();
                }
                callback(value);
            }
        });
        // The handle must exist before subscribing: a cached signal delivers
        // during `subscribe`.
        let detach = self.detach_handle(&wrapper);
        let _ = own_handle.set(detach.clone());
        self.subscribe(&wrapper);
        detach
    }
}

impl<T: 'static, S: Signal<T> + ?Sized> Signal<T> for Rc<S> {
    fn subscribe(&self, subscriber: &Subscriber<T>) -> Unsubscribe {
        (**self).subscribe(subscriber)
    }

    fn detach_handle(&self, subscriber: &Subscriber<T>) -> Unsubscribe {
        (**self).detach_handle(subscriber)
    }

    fn n_of_subscriptions(&self) -> usize {
        (**self).n_of_subscriptions()
    }

    fn n_of_subscriptions_signal(&self) -> CountSignal {
        (**self).n_of_subscriptions_signal()
    }
}
