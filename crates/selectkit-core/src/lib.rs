#![forbid(unsafe_code)]

//! Core: canonical input events, the host environment contract, and
//! deterministic timers for SelectKit.

pub mod environment;
pub mod event;
pub mod logging;
pub mod timer;

// Re-export tracing macros at crate root for ergonomic use.
#[cfg(feature = "tracing")]
pub use logging::{
    debug, debug_span, error, error_span, info, info_span, trace, trace_span, warn, warn_span,
};
