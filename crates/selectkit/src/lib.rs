#![forbid(unsafe_code)]

//! SelectKit
//!
//! A headless interaction engine for selection widgets: combobox, select and
//! multi-select. It owns the state machine and the timing; the host owns
//! rendering and feeds in key presses, environment events and time.
//!
//! # Key Components
//!
//! - [`Session`] - One widget instance: dispatch, notifications, lifecycle
//! - [`SessionConfig`] - Builder-style configuration and listeners
//! - [`reducer::reduce`] - Pure `(state, action) -> state` transitions
//! - [`Action`] - Every event the reducer understands
//! - [`InteractionState`] - The four observable fields
//! - [`Controlled`] - Caller-owned overrides for any subset of the fields
//! - [`navigator`] - Wrapping and clamped index movement over disabled items
//! - [`trackers`] - Outside clicks, blur settling, status announcements
//! - [`registry`] - Items, counts and element ids
//!
//! # How it fits together
//! `selectkit-core` supplies events, the [`Environment`] contract and
//! deterministic timers. This crate turns those inputs into state
//! transitions and side effects against the environment.
//!
//! [`Environment`]: selectkit_core::environment::Environment

pub mod action;
pub mod config;
pub mod controlled;
pub mod diagnostics;
pub mod keymap;
pub mod navigator;
pub mod reducer;
pub mod registry;
pub mod session;
pub mod state;
pub mod trackers;

pub use action::{Action, ActionKind, WidgetKind};
pub use config::{InputCapabilities, SessionConfig, Timing};
pub use controlled::Controlled;
pub use diagnostics::{ConfigError, Diagnostic};
pub use keymap::Surface;
pub use reducer::Proposal;
pub use registry::{IdConfig, Ids, ItemRegistry};
pub use session::{Session, StateChange};
pub use state::{Fields, InteractionState, Selection};
