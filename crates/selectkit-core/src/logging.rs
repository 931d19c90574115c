#![forbid(unsafe_code)]

//! Logging facade for SelectKit crates.
//!
//! With the `tracing` feature the usual `tracing` macros are re-exported from
//! the crate root, so engine code writes `selectkit_core::debug!(..)` and
//! gets real events. Without the feature every macro expands to nothing and
//! span macros yield a [`NoopSpan`], so call sites compile unchanged and
//! cost nothing.
//!
//! Arguments to the no-op macros are discarded without evaluation. Do not
//! put side effects inside a log call.

#[cfg(feature = "tracing")]
pub use tracing::{
    debug, debug_span, error, error_span, info, info_span, trace, trace_span, warn, warn_span,
};

#[cfg(not(feature = "tracing"))]
mod noop_macros {
    /// Discards a debug event (tracing disabled).
    #[macro_export]
    macro_rules! debug {
        ($($arg:tt)*) => {};
    }

    /// Discards an error event (tracing disabled).
    #[macro_export]
    macro_rules! error {
        ($($arg:tt)*) => {};
    }

    /// Discards an info event (tracing disabled).
    #[macro_export]
    macro_rules! info {
        ($($arg:tt)*) => {};
    }

    /// Discards a trace event (tracing disabled).
    #[macro_export]
    macro_rules! trace {
        ($($arg:tt)*) => {};
    }

    /// Discards a warn event (tracing disabled).
    #[macro_export]
    macro_rules! warn {
        ($($arg:tt)*) => {};
    }

    /// Yields a [`NoopSpan`](crate::logging::NoopSpan) (tracing disabled).
    #[macro_export]
    macro_rules! debug_span {
        ($($arg:tt)*) => {
            $crate::logging::NoopSpan
        };
    }

    /// Yields a [`NoopSpan`](crate::logging::NoopSpan) (tracing disabled).
    #[macro_export]
    macro_rules! error_span {
        ($($arg:tt)*) => {
            $crate::logging::NoopSpan
        };
    }

    /// Yields a [`NoopSpan`](crate::logging::NoopSpan) (tracing disabled).
    #[macro_export]
    macro_rules! info_span {
        ($($arg:tt)*) => {
            $crate::logging::NoopSpan
        };
    }

    /// Yields a [`NoopSpan`](crate::logging::NoopSpan) (tracing disabled).
    #[macro_export]
    macro_rules! trace_span {
        ($($arg:tt)*) => {
            $crate::logging::NoopSpan
        };
    }

    /// Yields a [`NoopSpan`](crate::logging::NoopSpan) (tracing disabled).
    #[macro_export]
    macro_rules! warn_span {
        ($($arg:tt)*) => {
            $crate::logging::NoopSpan
        };
    }
}

/// Stand-in span returned by the span macros when tracing is disabled.
///
/// Mirrors the two entry points engine code uses on real spans:
/// [`enter`](NoopSpan::enter) and [`entered`](NoopSpan::entered).
#[cfg(not(feature = "tracing"))]
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopSpan;

#[cfg(not(feature = "tracing"))]
impl NoopSpan {
    /// Enter the span by reference.
    #[must_use]
    pub fn enter(&self) -> NoopGuard {
        NoopGuard
    }

    /// Enter the span by value, keeping it alive in the guard.
    #[must_use]
    pub fn entered(self) -> NoopGuard {
        NoopGuard
    }
}

/// Guard returned when entering a [`NoopSpan`].
#[cfg(not(feature = "tracing"))]
#[derive(Debug)]
pub struct NoopGuard;
