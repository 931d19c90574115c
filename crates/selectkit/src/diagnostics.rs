#![forbid(unsafe_code)]

//! Configuration errors and usage diagnostics.
//!
//! Neither kind is ever raised through a panic in release builds.
//! [`ConfigError`] is returned by [`SessionConfig::validate`] and
//! [`Session::try_new`]. [`Diagnostic`]s are collected by
//! [`Session::verify_associations`] and logged.
//!
//! [`SessionConfig::validate`]: crate::config::SessionConfig::validate
//! [`Session::try_new`]: crate::session::Session::try_new
//! [`Session::verify_associations`]: crate::session::Session::verify_associations

use std::fmt;

/// A session was configured with values it cannot honor.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    /// A navigation step of zero would never move the highlight.
    ZeroStep {
        /// Which step setting was zero.
        name: &'static str,
    },
    /// A configured highlight does not fit the initial item list.
    HighlightOutOfRange {
        /// Which highlight setting was out of range.
        name: &'static str,
        index: usize,
        count: usize,
    },
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::ZeroStep { name } => write!(f, "{name} must be at least 1"),
            Self::HighlightOutOfRange { name, index, count } => {
                write!(f, "{name} {index} is out of range for {count} items")
            }
        }
    }
}

impl std::error::Error for ConfigError {}

/// A rendering-side contract the host did not keep.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Diagnostic {
    /// An element the engine relies on was never attached under its id.
    MissingElement {
        /// What the element is for (`"root"`, `"menu"`, ...).
        role: &'static str,
        id: String,
    },
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::MissingElement { role, id } => write!(
                f,
                "no element with id {id:?} is attached; the {role} association is missing"
            ),
        }
    }
}
