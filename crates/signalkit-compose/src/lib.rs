#![forbid(unsafe_code)]

//! Composition of signals for signalkit.
//!
//! Every combinator returns a [`Composite`]: a read-only signal that
//! subscribes to its sources when its own subscriber count leaves zero and
//! unsubscribes from all of them when the count returns to zero. An
//! unobserved composite costs nothing upstream.
//!
//! | Combinator | Sources | Emits |
//! |---|---|---|
//! | [`merge`] | `&[S]`, same type | [`ChangeVector<T>`] with the firing slot populated |
//! | [`merge2`], [`merge3`] | heterogeneous | tuple of `Option`s |
//! | [`derive`] | one | `transform(v)` |
//! | [`derive_multi`] | `&[S]` | `transform(&ChangeVector<T>)` |
//! | [`coalesce`] | `&[S]`, same type | each value unchanged |
//!
//! # Example
//!
//! ```
//! use signalkit_compose::{derive_multi, ChangeVector};
//! use signalkit_core::{CachedEmitter, Signal};
//! use std::cell::Cell;
//! use std::rc::Rc;
//!
//! let year = CachedEmitter::new(2020);
//! let bumps = CachedEmitter::new(0);
//! let total = derive_multi(&[year.clone(), bumps.clone()], |changes: &ChangeVector<i32>| {
//!     changes.changed().map_or(0, |(_, v)| *v)
//! })
//! .unwrap();
//!
//! let shown = Rc::new(Cell::new(0));
//! let probe = Rc::clone(&shown);
//! total.subscribe_fn(move |v| probe.set(*v));
//! assert_eq!(year.n_of_subscriptions(), 1);
//!
//! year.emit(2021);
//! assert_eq!(shown.get(), 2021);
//! ```
//!
//! # Failure Modes
//!
//! - Building `merge`, `derive_multi` or `coalesce` from an empty slice
//!   returns [`CompositionError::NoSources`].
//! - A transform that panics unwinds through the emitting call; the
//!   composite stays attached.

pub mod change;
pub mod coalesce;
pub mod composite;
pub mod derive;
pub mod error;
pub mod merge;

pub use change::ChangeVector;
pub use coalesce::coalesce;
pub use composite::Composite;
pub use derive::{derive, derive_multi};
pub use error::{CompositionError, Result};
pub use merge::{merge, merge2, merge3};
