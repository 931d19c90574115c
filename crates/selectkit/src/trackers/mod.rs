#![forbid(unsafe_code)]

//! Environment-driven side channels.
//!
//! - [`outside`]: closes the menu on pointer-up or tap outside the widget.
//! - [`blur`]: resets after focus leaves, once focus has settled.
//! - [`status`]: debounced screen-reader announcements.
//!
//! All timers share the session's [`TimerQueue`](selectkit_core::timer::TimerQueue)
//! and carry a [`TimerPurpose`] so the session can route them when they fire.

pub mod blur;
pub mod outside;
pub mod status;

use selectkit_core::environment::{Environment, NodeId};

use crate::keymap::Surface;

/// What a scheduled timer is for.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TimerPurpose {
    /// Re-check focus after `surface` blurred.
    BlurSettle(Surface),
    /// Publish a status message to the live region.
    StatusPublish(String),
    /// Empty the live region again.
    StatusClear,
    /// Drop the typeahead buffer.
    TypeaheadClear,
}

/// Whether `node` lies inside any of the widget's `surfaces`.
#[must_use]
pub fn is_within(env: &dyn Environment, surfaces: &[NodeId], node: Option<NodeId>) -> bool {
    node.is_some_and(|node| surfaces.iter().any(|surface| env.contains(*surface, node)))
}
