#![forbid(unsafe_code)]

//! Core signal primitives for signalkit.
//!
//! - [`Emitter`]: synchronous subscribe/emit with identity-deduplicated
//!   subscribers and snapshot-on-emit delivery.
//! - [`CachedEmitter`]: an emitter that replays its last value to every new
//!   subscriber.
//! - [`Signal`]: the read-only interface, including one-shot subscriptions
//!   via [`Signal::subscribe_once`].
//! - [`Subscriber`] / [`Unsubscribe`]: callback identity and idempotent
//!   detach handles.
//!
//! # Architecture
//!
//! Everything is single-threaded: handles share state through
//! `Rc<RefCell<..>>` and are neither `Send` nor `Sync`. Delivery is
//! immediate and in-order; there is no queue and no scheduler.
//!
//! Every emitter can expose its subscriber count as a read-only
//! [`CountSignal`] ([`Emitter::n_of_subscriptions_signal`]). The
//! composition layer uses it to attach upstream only while someone is
//! listening.
//!
//! # Invariants
//!
//! 1. A subscriber identity is registered at most once per emitter.
//! 2. `emit` delivers to the subscribers present when it started, in
//!    insertion order; mutations during delivery apply to later emits.
//! 3. Detach handles are idempotent and may be called from any callback.
//! 4. A cached emitter stores a value before delivering it.

pub mod cached;
pub mod count;
pub mod emitter;
pub mod signal;
pub mod subscriber;

pub use cached::CachedEmitter;
pub use count::CountSignal;
pub use emitter::{Emitter, WeakEmitter};
pub use signal::Signal;
pub use subscriber::{Subscriber, Unsubscribe};
