#![forbid(unsafe_code)]

//! signalkit public facade crate.
//!
//! Re-exports the emitter primitives from `signalkit-core` and, with the
//! default `compose` feature, the combinators from `signalkit-compose`.
//!
//! ```
//! use signalkit::prelude::*;
//! use std::cell::Cell;
//! use std::rc::Rc;
//!
//! let clicks = Emitter::<u32>::new();
//! let doubled = derive(&clicks, |n: &u32| n * 2);
//!
//! let shown = Rc::new(Cell::new(0));
//! let probe = Rc::clone(&shown);
//! doubled.subscribe_once(move |v| probe.set(*v));
//!
//! clicks.emit(21);
//! assert_eq!(shown.get(), 42);
//! assert_eq!(clicks.n_of_subscriptions(), 0);
//! ```

pub use signalkit_core::{
    CachedEmitter, CountSignal, Emitter, Signal, Subscriber, Unsubscribe, WeakEmitter,
};

#[cfg(feature = "compose")]
pub use signalkit_compose::{
    ChangeVector, Composite, CompositionError, coalesce, derive, derive_multi, merge, merge2,
    merge3,
};

pub mod prelude {
    pub use signalkit_core::{CachedEmitter, Emitter, Signal, Subscriber, Unsubscribe};

    #[cfg(feature = "compose")]
    pub use signalkit_compose::{
        ChangeVector, Composite, coalesce, derive, derive_multi, merge, merge2, merge3,
    };
}
