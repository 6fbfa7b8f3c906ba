#![forbid(unsafe_code)]

//! Signals computed from other signals.

use std::rc::Rc;

use signalkit_core::{Signal, WeakEmitter};

use crate::change::ChangeVector;
use crate::composite::Composite;
use crate::error::{CompositionError, Result};
use crate::merge::merge;

/// A signal emitting `transform(v)` whenever `source` emits `v`.
///
/// `transform` runs once per upstream emission and only while the derived
/// signal has subscribers. Its results are neither cached nor deduplicated.
///
/// ```
/// use signalkit_compose::derive;
/// use signalkit_core::{Emitter, Signal};
/// use std::cell::Cell;
/// use std::rc::Rc;
///
/// let source = Emitter::<i32>::new();
/// let derived = derive(&source, |n: &i32| n + 100);
/// let shown = Rc::new(Cell::new(0));
/// let probe = Rc::clone(&shown);
/// derived.subscribe_fn(move |v| probe.set(*v));
/// source.emit(3);
/// assert_eq!(shown.get(), 103);
/// ```
pub fn derive<T, U, S>(source: &S, transform: impl Fn(&T) -> U + 'static) -> Composite<U>
where
    T: 'static,
    U: 'static,
    S: Signal<T> + Clone + 'static,
{
    let source = source.clone();
    let transform = Rc::new(transform);
    Composite::from_attach("derive", move |sink: &WeakEmitter<U>| {
        let sink = sink.clone();
        let transform = Rc::clone(&transform);
        vec![source.subscribe_fn(move |value: &T| sink.emit(transform(value)))]
    })
}

/// `derive(merge(sources), transform)`.
///
/// # Errors
///
/// Returns [`CompositionError::NoSources`](crate::CompositionError::NoSources)
/// when `sources` is empty.
pub fn derive_multi<T, U, S>(
    sources: &[S],
    transform: impl Fn(&ChangeVector<T>) -> U + 'static,
) -> Result<Composite<U>>
where
    T: Clone + 'static,
    U: 'static,
    S: Signal<T> + Clone + 'static,
{
    if sources.is_empty() {
        return Err(CompositionError::no_sources("derive_multi"));
    }
    let merged = merge(sources)?;
    Ok(derive(&merged, transform))
}
