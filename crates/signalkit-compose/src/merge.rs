#![forbid(unsafe_code)]

//! Fan-in of several signals into positional change vectors.

use signalkit_core::{Signal, Unsubscribe, WeakEmitter};

use crate::change::ChangeVector;
use crate::composite::Composite;
use crate::error::{CompositionError, Result};

/// Merge same-typed signals into one emitting a [`ChangeVector`].
///
/// Every time source `i` emits `v`, the merged signal emits a fresh vector
/// with `Some(v)` in slot `i` and `None` everywhere else. Sources are
/// attached in input order, and only while the merged signal has
/// subscribers.
///
/// ```
/// use signalkit_compose::merge;
/// use signalkit_core::{Emitter, Signal};
/// use std::cell::RefCell;
/// use std::rc::Rc;
///
/// let first = Emitter::<u32>::new();
/// let second = Emitter::<u32>::new();
/// let merged = merge(&[first.clone(), second.clone()]).unwrap();
///
/// let last = Rc::new(RefCell::new(Vec::new()));
/// let probe = Rc::clone(&last);
/// merged.subscribe_fn(move |changes| *probe.borrow_mut() = changes.as_slice().to_vec());
///
/// second.emit(7);
/// assert_eq!(*last.borrow(), vec![None, Some(7)]);
/// ```
///
/// # Errors
///
/// Returns [`CompositionError::NoSources`] when `sources` is empty.
pub fn merge<T, S>(sources: &[S]) -> Result<Composite<ChangeVector<T>>>
where
    T: Clone + 'static,
    S: Signal<T> + Clone + 'static,
{
    if sources.is_empty() {
        return Err(CompositionError::no_sources("merge"));
    }
    let sources = sources.to_vec();
    let width = sources.len();
    Ok(Composite::from_attach(
        "merge",
        move |sink: &WeakEmitter<ChangeVector<T>>| {
            sources
                .iter()
                .enumerate()
                .map(|(slot, source)| {
                    let sink = sink.clone();
                    source.subscribe_fn(move |value: &T| {
                        sink.emit(ChangeVector::single(width, slot, value.clone()));
                    })
                })
                .collect()
        },
    ))
}

/// Merge two signals of different types.
///
/// Emits `(Some(a), None)` or `(None, Some(b))` depending on which source
/// fired.
pub fn merge2<A, B, SA, SB>(a: &SA, b: &SB) -> Composite<(Option<A>, Option<B>)>
where
    A: Clone + 'static,
    B: Clone + 'static,
    SA: Signal<A> + Clone + 'static,
    SB: Signal<B> + Clone + 'static,
{
    let (a, b) = (a.clone(), b.clone());
    Composite::from_attach("merge2", move |sink: &WeakEmitter<(Option<A>, Option<B>)>| {
        vec![
            forward(&a, sink, |v: &A| (Some(v.clone()), None)),
            forward(&b, sink, |v: &B| (None, Some(v.clone()))),
        ]
    })
}

/// Merge three signals of different types.
pub fn merge3<A, B, C, SA, SB, SC>(
    a: &SA,
    b: &SB,
    c: &SC,
) -> Composite<(Option<A>, Option<B>, Option<C>)>
where
    A: Clone + 'static,
    B: Clone + 'static,
    C: Clone + 'static,
    SA: Signal<A> + Clone + 'static,
    SB: Signal<B> + Clone + 'static,
    SC: Signal<C> + Clone + 'static,
{
    let (a, b, c) = (a.clone(), b.clone(), c.clone());
    Composite::from_attach(
        "merge3",
        move |sink: &WeakEmitter<(Option<A>, Option<B>, Option<C>)>| {
            vec![
                forward(&a, sink, |v: &A| (Some(v.clone()), None, None)),
                forward(&b, sink, |v: &B| (None, Some(v.clone()), None)),
                forward(&c, sink, |v: &C| (None, None, Some(v.clone()))),
            ]
        },
    )
}

fn forward<T, U, S>(
    source: &S,
    sink: &WeakEmitter<U>,
    wrap: impl Fn(&T) -> U + 'static,
) -> Unsubscribe
where
    T: 'static,
    U: 'static,
    S: Signal<T>,
{
    let sink = sink.clone();
    source.subscribe_fn(move |value: &T| sink.emit(wrap(value)))
}
