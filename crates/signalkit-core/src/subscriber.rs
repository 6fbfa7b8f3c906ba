#![forbid(unsafe_code)]

//! Subscriber identity and detach handles.
//!
//! A [`Subscriber<T>`] is a reference-counted callback. Its identity is the
//! allocation it points to, so clones of one `Subscriber` are the *same*
//! subscriber as far as an emitter is concerned, while two subscribers built
//! from identical closures are distinct.
//!
//! An [`Unsubscribe`] is the handle returned by every `subscribe` call. It is
//! cheap to clone, idempotent, and safe to call from inside a callback,
//! including the callback it detaches.

use std::fmt;
use std::rc::{Rc, Weak};

/// A callback registered on a signal.
///
/// Cloning yields another handle to the same callback (same identity).
pub struct Subscriber<T> {
    callback: Rc<dyn Fn(&T)>,
}

impl<T> Subscriber<T> {
    /// Wrap a closure in a new subscriber with a fresh identity.
    pub fn new(callback: impl Fn(&T) + 'static) -> Self {
        Self {
            callback: Rc::new(callback),
        }
    }

    /// Invoke the callback with `value`.
    #[inline]
    pub fn call(&self, value: &T) {
        (self.callback)(value)
    }

    /// Whether `self` and `other` are the same subscriber.
    #[must_use]
    pub fn same_as(&self, other: &Self) -> bool {
        Rc::ptr_eq(&self.callback, &other.callback)
    }

    /// A non-owning reference used by detach handles.
    ///
    /// Holding the weak reference keeps the allocation address reserved, so
    /// identity comparisons through it never alias a newer subscriber.
    pub(crate) fn downgrade(&self) -> WeakSubscriber<T> {
        WeakSubscriber {
            callback: Rc::downgrade(&self.callback),
        }
    }
}

impl<T> Clone for Subscriber<T> {
    fn clone(&self) -> Self {
        Self {
            callback: Rc::clone(&self.callback),
        }
    }
}

impl<T> fmt::Debug for Subscriber<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("Subscriber")
            .field(&Rc::as_ptr(&self.callback).cast::<()>())
            .finish()
    }
}

/// Weak identity of a [`Subscriber`].
pub(crate) struct WeakSubscriber<T> {
    callback: Weak<dyn Fn(&T)>,
}

impl<T> WeakSubscriber<T> {
    pub(crate) fn matches(&self, subscriber: &Subscriber<T>) -> bool {
        std::ptr::addr_eq(self.callback.as_ptr(), Rc::as_ptr(&subscriber.callback))
    }
}

/// Idempotent detach handle returned by `subscribe`.
///
/// Dropping the handle does **not** unsubscribe; call [`unsubscribe`]
/// explicitly. Calling it more than once, or after the subscriber was
/// removed by other means, does nothing.
///
/// [`unsubscribe`]: Unsubscribe::unsubscribe
#[derive(Clone)]
pub struct Unsubscribe {
    detach: Rc<dyn Fn()>,
}

impl Unsubscribe {
    /// Build a handle from a detach closure.
    ///
    /// The closure must itself be idempotent.
    pub fn new(detach: impl Fn() + 'static) -> Self {
        Self {
            detach: Rc::new(detach),
        }
    }

    /// A handle that detaches nothing.
    pub fn noop() -> Self {
        Self::new(|| {})
    }

    /// Detach the subscription this handle was created for.
    pub fn unsubscribe(&self) {
        (self.detach)()
    }
}

impl fmt::Debug for Unsubscribe {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Unsubscribe").finish_non_exhaustive()
    }
}
