#![forbid(unsafe_code)]

//! Outside-interaction detection.
//!
//! Input kinds are handled by capability objects chosen once when the
//! session is built, one per enabled [`InputCapabilities`] flag. Each
//! capability names the environment events it needs; the tracker
//! subscribes to exactly those on mount and drops every subscription
//! exactly once on teardown.
//!
//! # Pointer
//!
//! `mousedown` raises a pointer-down flag (the blur tracker reads it).
//! `mouseup` clears it and reports an outside release when the menu is open
//! and neither the release target nor the focused element lies inside the
//! widget.
//!
//! # Touch
//!
//! `touchmove` between `touchstart` and `touchend` marks the gesture as a
//! scroll, which never counts as an outside tap. Focus is not consulted.
//!
//! [`InputCapabilities`]: crate::config::InputCapabilities

use std::fmt;

use selectkit_core::environment::{Environment, ListenerId, NodeId};
use selectkit_core::event::{EnvEvent, EnvEventKind, PointerEventKind, TouchEventKind};

use crate::config::InputCapabilities;
use crate::trackers::is_within;

/// A completed interaction outside the widget.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutsideInteraction {
    MouseUp,
    TouchEnd,
}

/// What a capability may look at while handling an event.
pub struct OutsideProbe<'a> {
    pub env: &'a dyn Environment,
    pub surfaces: &'a [NodeId],
    pub is_open: bool,
}

impl OutsideProbe<'_> {
    fn is_inside(&self, node: Option<NodeId>) -> bool {
        is_within(self.env, self.surfaces, node)
    }
}

/// One kind of input device.
pub trait InteractionCapability: fmt::Debug {
    /// Environment events this capability listens to.
    fn event_kinds(&self) -> &'static [EnvEventKind];

    /// Update internal flags for `event` and report a completed outside
    /// interaction, if any.
    fn handle(&mut self, event: &EnvEvent, probe: &OutsideProbe<'_>) -> Option<OutsideInteraction>;

    /// Whether a button is currently held.
    fn is_pointer_down(&self) -> bool {
        false
    }
}

/// Mouse and pen input.
#[derive(Debug, Default)]
pub struct PointerCapability {
    pointer_down: bool,
}

impl InteractionCapability for PointerCapability {
    fn event_kinds(&self) -> &'static [EnvEventKind] {
        &[EnvEventKind::PointerDown, EnvEventKind::PointerUp]
    }

    fn handle(&mut self, event: &EnvEvent, probe: &OutsideProbe<'_>) -> Option<OutsideInteraction> {
        let EnvEvent::Pointer(pointer) = event else {
            return None;
        };
        match pointer.kind {
            PointerEventKind::Down => {
                self.pointer_down = true;
                None
            }
            PointerEventKind::Up => {
                self.pointer_down = false;
                let outside = probe.is_open
                    && !probe.is_inside(pointer.target)
                    && !probe.is_inside(probe.env.active_element());
                outside.then_some(OutsideInteraction::MouseUp)
            }
        }
    }

    fn is_pointer_down(&self) -> bool {
        self.pointer_down
    }
}

/// Touch input.
#[derive(Debug, Default)]
pub struct TouchCapability {
    moved: bool,
}

impl InteractionCapability for TouchCapability {
    fn event_kinds(&self) -> &'static [EnvEventKind] {
        &[
            EnvEventKind::TouchStart,
            EnvEventKind::TouchMove,
            EnvEventKind::TouchEnd,
        ]
    }

    fn handle(&mut self, event: &EnvEvent, probe: &OutsideProbe<'_>) -> Option<OutsideInteraction> {
        let EnvEvent::Touch(touch) = event else {
            return None;
        };
        match touch.kind {
            TouchEventKind::Start => {
                self.moved = false;
                None
            }
            TouchEventKind::Move => {
                self.moved = true;
                None
            }
            TouchEventKind::End => {
                let outside = probe.is_open && !self.moved && !probe.is_inside(touch.target);
                outside.then_some(OutsideInteraction::TouchEnd)
            }
        }
    }
}

/// Owns the capabilities and their environment subscriptions.
#[derive(Debug)]
pub struct OutsideTracker {
    capabilities: Vec<Box<dyn InteractionCapability>>,
    listeners: Vec<ListenerId>,
}

impl OutsideTracker {
    /// Pick capabilities for the enabled input kinds.
    #[must_use]
    pub fn new(inputs: InputCapabilities) -> Self {
        let mut capabilities: Vec<Box<dyn InteractionCapability>> = Vec::new();
        if inputs.pointer {
            capabilities.push(Box::new(PointerCapability::default()));
        }
        if inputs.touch {
            capabilities.push(Box::new(TouchCapability::default()));
        }
        Self {
            capabilities,
            listeners: Vec::new(),
        }
    }

    /// Subscribe to every event the capabilities need. Calling it again
    /// while subscribed does nothing.
    pub fn mount(&mut self, env: &mut dyn Environment) {
        if !self.listeners.is_empty() {
            return;
        }
        for capability in &self.capabilities {
            for kind in capability.event_kinds() {
                self.listeners.push(env.add_event_listener(*kind));
            }
        }
    }

    /// Drop every subscription. Returns how many were removed.
    pub fn teardown(&mut self, env: &mut dyn Environment) -> usize {
        let removed = self.listeners.len();
        for id in self.listeners.drain(..) {
            env.remove_event_listener(id);
        }
        removed
    }

    #[must_use]
    pub fn is_mounted(&self) -> bool {
        !self.listeners.is_empty()
    }

    /// Route `event` to the capability that listens for it.
    pub fn handle(
        &mut self,
        event: &EnvEvent,
        probe: &OutsideProbe<'_>,
    ) -> Option<OutsideInteraction> {
        let kind = event.kind();
        self.capabilities
            .iter_mut()
            .filter(|capability| capability.event_kinds().contains(&kind))
            .find_map(|capability| capability.handle(event, probe))
    }

    /// Whether any pointer button is held.
    #[must_use]
    pub fn is_pointer_down(&self) -> bool {
        self.capabilities.iter().any(|c| c.is_pointer_down())
    }
}
