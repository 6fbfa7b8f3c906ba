#![forbid(unsafe_code)]

//! Signals whose upstream attachment follows their own subscriber count.
//!
//! # Design
//!
//! A [`Composite<T>`] owns a private base [`Emitter<T>`]. Downstream code
//! subscribes to the base; the composite watches the base's count signal and
//! runs a two-state machine:
//!
//! ```text
//!             count > 0
//!   Detached ───────────► Attached(handles)
//!      ▲                        │
//!      └────────────────────────┘
//!             count == 0
//! ```
//!
//! Entering `Attached` calls the attach function, which subscribes fan-in
//! callbacks to every upstream signal and returns their detach handles.
//! Entering `Detached` calls every handle. Count changes that do not cross
//! zero (1 → 2 → 1) are ignored.
//!
//! # Invariants
//!
//! 1. Upstream attachment exists iff the base has at least one subscriber.
//! 2. Fan-in callbacks hold only a [`WeakEmitter`] to the base. While
//!    attached, the attachment keeps its own `Link` (and through it the
//!    base) alive, so downstream subscriptions keep receiving values after
//!    every `Composite` handle is dropped. The cycle is broken on the
//!    1 → 0 transition; a detached composite is freed with its last handle.
//! 3. Each transition bumps an epoch. An attach that was overtaken by a
//!    re-entrant transition (for example a cached upstream replaying on
//!    attach and the only downstream subscriber leaving in response)
//!    releases the handles it just created instead of storing them.
//! 4. Only the base emitter publishes on the count signal driving the
//!    state machine; callers get a read-only view.

use std::cell::{Cell, RefCell};
use std::fmt;
use std::rc::Rc;

use signalkit_core::{CountSignal, Emitter, Signal, Subscriber, Unsubscribe, WeakEmitter};
use tracing::{debug, trace};

type AttachFn<T> = dyn Fn(&WeakEmitter<T>) -> Vec<Unsubscribe>;

enum Attachment<T> {
    Detached,
    Attached {
        handles: Vec<Unsubscribe>,
        owner: Rc<Link<T>>,
    },
}

struct Link<T> {
    kind: &'static str,
    base: Emitter<T>,
    attach: Box<AttachFn<T>>,
    state: RefCell<Attachment<T>>,
    epoch: Cell<u64>,
}

impl<T: 'static> Link<T> {
    fn on_count(self: &Rc<Self>, count: usize) {
        if count > 0 {
            self.attach_upstream();
        } else {
            self.detach_upstream();
        }
    }

    fn attach_upstream(self: &Rc<Self>) {
        if self.is_attached() {
            return;
        }
        let epoch = self.bump_epoch();
        *self.state.borrow_mut() = Attachment::Attached {
            handles: Vec::new(),
            owner: Rc::clone(self),
        };

        let handles = (self.attach)(&self.base.downgrade());
        debug!(
            combinator = self.kind,
            sources = handles.len(),
            "attached upstream"
        );

        if self.epoch.get() == epoch {
            if let Attachment::Attached { handles: slot, .. } = &mut *self.state.borrow_mut() {
                *slot = handles;
                return;
            }
        }
        trace!(
            combinator = self.kind,
            "attachment overtaken by re-entrant transition; releasing"
        );
        release(&handles);
    }

    fn detach_upstream(&self) {
        let previous = std::mem::replace(&mut *self.state.borrow_mut(), Attachment::Detached);
        if let Attachment::Attached { handles, owner } = previous {
            self.bump_epoch();
            debug!(
                combinator = self.kind,
                sources = handles.len(),
                "detached upstream"
            );
            release(&handles);
            drop(owner);
        }
    }

    fn bump_epoch(&self) -> u64 {
        let next = self.epoch.get().wrapping_add(1);
        self.epoch.set(next);
        next
    }

    fn is_attached(&self) -> bool {
        matches!(*self.state.borrow(), Attachment::Attached { .. })
    }
}

fn release(handles: &[Unsubscribe]) {
    for handle in handles {
        handle.unsubscribe();
    }
}

/// A read-only signal produced by a combinator.
///
/// Cloning creates a new handle to the same composite. The composite stays
/// detached from its sources until something subscribes to it, and stays
/// attached until its last subscription is cancelled, whether or not any
/// handle to it is still held.
pub struct Composite<T> {
    base: Emitter<T>,
    link: Rc<Link<T>>,
}

impl<T> Clone for Composite<T> {
    fn clone(&self) -> Self {
        Self {
            base: self.base.clone(),
            link: Rc::clone(&self.link),
        }
    }
}

impl<T: 'static> fmt::Debug for Composite<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Composite")
            .field("kind", &self.link.kind)
            .field("attached", &self.link.is_attached())
            .field("base", &self.base)
            .finish()
    }
}

impl<T: 'static> Composite<T> {
    /// Build a composite from an attach function.
    ///
    /// `attach` is called on every 0 → 1 transition of the subscriber count.
    /// It must subscribe to the upstream signals, forward into the given
    /// sink, and return one detach handle per upstream subscription. This is
    /// the low-level constructor behind every combinator in this crate.
    pub fn from_attach(
        kind: &'static str,
        attach: impl Fn(&WeakEmitter<T>) -> Vec<Unsubscribe> + 'static,
    ) -> Self {
        let base = Emitter::labeled(kind);
        let link = Rc::new(Link {
            kind,
            base: base.clone(),
            attach: Box::new(attach),
            state: RefCell::new(Attachment::Detached),
            epoch: Cell::new(0),
        });

        let driver = Rc::downgrade(&link);
        base.n_of_subscriptions_signal()
            .subscribe(&Subscriber::new(move |count: &usize| {
                if let Some(link) = driver.upgrade() {
                    link.on_count(*count);
                }
            }));

        Self { base, link }
    }

    /// The combinator that produced this composite.
    #[must_use]
    pub fn kind(&self) -> &'static str {
        self.link.kind
    }

    /// Whether the composite is currently subscribed upstream.
    #[must_use]
    pub fn is_attached(&self) -> bool {
        self.link.is_attached()
    }

    /// Remove `subscriber` if present.
    pub fn unsubscribe(&self, subscriber: &Subscriber<T>) {
        self.base.unsubscribe(subscriber);
    }

    /// Remove every downstream subscriber, detaching upstream.
    pub fn clear_subscriptions(&self) {
        self.base.clear_subscriptions();
    }
}

impl<T: 'static> Signal<T> for Composite<T> {
    fn subscribe(&self, subscriber: &Subscriber<T>) -> Unsubscribe {
        self.base.subscribe(subscriber)
    }

    fn detach_handle(&self, subscriber: &Subscriber<T>) -> Unsubscribe {
        self.base.detach_handle(subscriber)
    }

    fn n_of_subscriptions(&self) -> usize {
        self.base.n_of_subscriptions()
    }

    fn n_of_subscriptions_signal(&self) -> CountSignal {
        self.base.n_of_subscriptions_signal()
    }
}
