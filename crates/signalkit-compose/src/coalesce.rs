#![forbid(unsafe_code)]

//! Funnel several same-typed signals into one.

use signalkit_core::{Signal, WeakEmitter};

use crate::composite::Composite;
use crate::error::{CompositionError, Result};

/// A signal re-emitting every value emitted by any of `sources`.
///
/// Values pass through unchanged; the origin is not reported. Use
/// [`merge`](crate::merge) when it matters which source fired.
///
/// # Errors
///
/// Returns [`CompositionError::NoSources`] when `sources` is empty.
pub fn coalesce<T, S>(sources: &[S]) -> Result<Composite<T>>
where
    T: Clone + 'static,
    S: Signal<T> + Clone + 'static,
{
    if sources.is_empty() {
        return Err(CompositionError::no_sources("coalesce"));
    }
    let sources = sources.to_vec();
    Ok(Composite::from_attach(
        "coalesce",
        move |sink: &WeakEmitter<T>| {
            sources
                .iter()
                .map(|source| {
                    let sink = sink.clone();
                    source.subscribe_fn(move |value: &T| sink.emit(value.clone()))
                })
                .collect()
        },
    ))
}
