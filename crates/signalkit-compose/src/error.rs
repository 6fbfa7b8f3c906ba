#![forbid(unsafe_code)]

//! Errors raised while building composite signals.

use thiserror::Error;

/// Result of building a composite signal.
pub type Result<T> = std::result::Result<T, CompositionError>;

/// Why a combinator refused to build a composite.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CompositionError {
    /// The combinator was given an empty source list.
    #[error("{combinator} needs at least one source signal")]
    NoSources { combinator: &'static str },
}

impl CompositionError {
    /// A [`CompositionError::NoSources`] naming `combinator`.
    #[must_use]
    pub fn no_sources(combinator: &'static str) -> Self {
        Self::NoSources { combinator }
    }
}
