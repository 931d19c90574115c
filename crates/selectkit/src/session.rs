#![forbid(unsafe_code)]

//! The stateful session.
//!
//! A [`Session`] owns everything one widget instance needs between renders:
//! internal state, controlled props, the item registry, ids, the clock and
//! timer queue, the trackers and the host environment.
//!
//! # Dispatch
//!
//! Every transition goes through [`Session::dispatch`]:
//!
//! 1. merge the effective state (props over internal)
//! 2. reduce, then run the override hook on the proposal
//! 3. diff against the effective state
//! 4. write the changed fields into internal state (controlled ones park)
//! 5. notify: per-field listener, aggregate listener, selection listener,
//!    action listener, in that order
//! 6. run side effects: scroll, status announcement, typeahead timer
//!
//! # Lifecycle
//!
//! `Created -> Mounted -> TornDown`. Dispatch works before mount; outside
//! interactions are only tracked while mounted. After teardown every entry
//! point is a logged no-op.
//!
//! # Time
//!
//! Nothing fires on its own. The host moves the clock with
//! [`advance`](Session::advance) or [`set_now`](Session::set_now), and due
//! timers run in deadline order during that call.

use std::fmt;
use std::time::Duration;

use selectkit_core::environment::{Environment, NodeId};
use selectkit_core::event::{EnvEvent, KeyEvent};
use selectkit_core::timer::{Debouncer, DeterministicClock, TimerQueue};

use crate::action::{Action, ActionKind, WidgetKind};
use crate::config::SessionConfig;
use crate::controlled::Controlled;
use crate::diagnostics::{ConfigError, Diagnostic};
use crate::keymap::{KeyAction, KeyContext, Surface, action_for};
use crate::reducer::{Proposal, ReduceContext, reduce};
use crate::registry::{Ids, ItemRegistry};
use crate::state::{Fields, InteractionState, Selection};
use crate::trackers::TimerPurpose;
use crate::trackers::blur::{BlurTracker, should_reset};
use crate::trackers::outside::{OutsideInteraction, OutsideProbe, OutsideTracker};
use crate::trackers::status::{StatusAnnouncer, StatusContext};

/// What listeners receive after a dispatch.
#[derive(Debug)]
pub struct StateChange<'a, S: Selection> {
    pub kind: ActionKind,
    pub action: &'a Action<S>,
    /// Fields that differ between `previous` and `state`.
    pub changes: Fields,
    /// The state the override hook returned.
    pub state: &'a InteractionState<S>,
    /// Effective state before the dispatch.
    pub previous: &'a InteractionState<S>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Lifecycle {
    Created,
    Mounted,
    TornDown,
}

/// One live widget instance.
pub struct Session<S: Selection, E: Environment> {
    config: SessionConfig<S>,
    env: E,
    internal: InteractionState<S>,
    props: Controlled<S>,
    items: ItemRegistry<S::Item>,
    ids: Ids,
    clock: DeterministicClock,
    timers: TimerQueue<TimerPurpose>,
    outside: OutsideTracker,
    blur: BlurTracker,
    status: StatusAnnouncer,
    typeahead: Debouncer,
    has_opened: bool,
    lifecycle: Lifecycle,
}

impl<S: Selection, E: Environment> fmt::Debug for Session<S, E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Session")
            .field("lifecycle", &self.lifecycle)
            .field("state", &self.state())
            .field("ids", &self.ids)
            .field("now", &self.clock.now())
            .field("pending_timers", &self.timers.len())
            .finish_non_exhaustive()
    }
}

impl<S: Selection, E: Environment> Session<S, E> {
    /// Build a session, rejecting an invalid configuration.
    pub fn try_new(
        config: SessionConfig<S>,
        items: Vec<S::Item>,
        env: E,
    ) -> Result<Self, ConfigError> {
        config.validate(items.len())?;
        Ok(Self::build(config, items, env))
    }

    /// Build a session.
    ///
    /// # Panics
    ///
    /// In debug builds, if the configuration is invalid. Release builds log
    /// a warning and carry on; navigation treats the bad values as no-ops.
    pub fn new(config: SessionConfig<S>, items: Vec<S::Item>, env: E) -> Self {
        if let Err(error) = config.validate(items.len()) {
            selectkit_core::warn!(%error, "invalid session config");
            if cfg!(debug_assertions) {
                panic!("invalid session config: {error}");
            }
        }
        Self::build(config, items, env)
    }

    fn build(config: SessionConfig<S>, items: Vec<S::Item>, env: E) -> Self {
        let selection = config
            .initial_selection
            .clone()
            .unwrap_or_else(|| config.default_selection.clone());
        let input_value = config
            .initial_input_value
            .clone()
            .or_else(|| config.default_input_value.clone())
            .unwrap_or_else(|| config.derive_input(&selection));
        let is_open = config.initial_is_open.unwrap_or(config.default_is_open);
        let highlighted_index = config
            .initial_highlighted_index
            .or(config.default_highlighted_index);
        let ids = Ids::generate(&config.ids);
        let status = StatusAnnouncer::new(
            ids.status(),
            config.timing.status_debounce,
            config.timing.status_clear,
        );

        Self {
            internal: InteractionState {
                is_open,
                highlighted_index,
                input_value,
                selection,
            },
            props: Controlled::none(),
            items: ItemRegistry::new(items),
            clock: DeterministicClock::new(),
            timers: TimerQueue::new(),
            outside: OutsideTracker::new(config.capabilities),
            blur: BlurTracker::new(config.timing.blur_settle),
            typeahead: Debouncer::new(config.timing.typeahead_reset),
            has_opened: is_open,
            lifecycle: Lifecycle::Created,
            status,
            ids,
            env,
            config,
        }
    }

    // ---------------------------------------------------------------
    // Accessors
    // ---------------------------------------------------------------

    /// The effective state: controlled props over internal values.
    #[must_use]
    pub fn state(&self) -> InteractionState<S> {
        self.props.merge(&self.internal)
    }

    #[must_use]
    pub fn config(&self) -> &SessionConfig<S> {
        &self.config
    }

    #[must_use]
    pub fn props(&self) -> &Controlled<S> {
        &self.props
    }

    #[must_use]
    pub fn ids(&self) -> &Ids {
        &self.ids
    }

    #[must_use]
    pub fn items(&self) -> &ItemRegistry<S::Item> {
        &self.items
    }

    #[must_use]
    pub fn environment(&self) -> &E {
        &self.env
    }

    pub fn environment_mut(&mut self) -> &mut E {
        &mut self.env
    }

    #[must_use]
    pub fn now(&self) -> Duration {
        self.clock.now()
    }

    /// Number of scheduled timers.
    #[must_use]
    pub fn pending_timers(&self) -> usize {
        self.timers.len()
    }

    /// When the next timer is due, if any.
    #[must_use]
    pub fn next_deadline(&self) -> Option<Duration> {
        self.timers.next_deadline()
    }

    #[must_use]
    pub fn is_mounted(&self) -> bool {
        self.lifecycle == Lifecycle::Mounted
    }

    #[must_use]
    pub fn is_torn_down(&self) -> bool {
        self.lifecycle == Lifecycle::TornDown
    }

    // ---------------------------------------------------------------
    // Lifecycle
    // ---------------------------------------------------------------

    /// Subscribe to environment events. Repeated calls are harmless.
    pub fn mount(&mut self) {
        match self.lifecycle {
            Lifecycle::TornDown => {
                selectkit_core::debug!("mount after teardown ignored");
            }
            Lifecycle::Mounted => {}
            Lifecycle::Created => {
                let _span = selectkit_core::debug_span!("mount").entered();
                self.outside.mount(&mut self.env);
                self.lifecycle = Lifecycle::Mounted;
                let _ = self.verify_associations();
            }
        }
    }

    /// Drop listeners, timers and the live region. Idempotent.
    #[cfg_attr(not(feature = "tracing"), allow(unused_variables))]
    pub fn teardown(&mut self) {
        if self.lifecycle == Lifecycle::TornDown {
            return;
        }
        let removed = self.outside.teardown(&mut self.env);
        self.blur.cancel(&mut self.timers);
        self.typeahead.cancel(&mut self.timers);
        self.status.teardown(&mut self.env, &mut self.timers);
        self.timers.cancel_all();
        self.lifecycle = Lifecycle::TornDown;
        selectkit_core::debug!(listeners = removed, "session torn down");
    }

    // ---------------------------------------------------------------
    // Dispatch
    // ---------------------------------------------------------------

    /// Run `action` through the reducer and the override hook.
    ///
    /// Returns the fields that changed.
    pub fn dispatch(&mut self, action: Action<S>) -> Fields {
        self.dispatch_with(action, |_| {})
    }

    /// Like [`dispatch`](Self::dispatch), calling `on_complete` with the
    /// effective state once every listener has run.
    pub fn dispatch_with(
        &mut self,
        action: Action<S>,
        on_complete: impl FnOnce(&InteractionState<S>),
    ) -> Fields {
        let kind = action.kind();
        if self.lifecycle == Lifecycle::TornDown {
            selectkit_core::debug!(kind = kind.as_str(), "dispatch after teardown ignored");
            return Fields::empty();
        }
        let _span = selectkit_core::debug_span!("dispatch", kind = kind.as_str()).entered();

        if let Action::FunctionSetItemCount { count } = &action {
            self.items.set_count_override(*count);
        }

        let previous = self.state();
        let proposed = {
            let ctx = ReduceContext {
                config: &self.config,
                items: &self.items,
                has_opened: self.has_opened,
            };
            reduce(&previous, &action, &ctx)
        };
        let next = (self.config.state_reducer)(
            &previous,
            Proposal {
                action: &action,
                changes: proposed,
            },
        );
        let changes = previous.diff(&next);
        self.internal.apply(&next, changes);
        self.has_opened |= next.is_open;
        selectkit_core::trace!(kind = kind.as_str(), changes = ?changes, "transition");

        let selection_changed = changes.contains(Fields::SELECTION)
            && (self.config.selection_changed)(&previous.selection, &next.selection);
        let change = StateChange {
            kind,
            action: &action,
            changes,
            state: &next,
            previous: &previous,
        };
        self.notify(&change, selection_changed);

        let effective = self.state();
        on_complete(&effective);

        if kind.scrolls_highlight()
            && effective.is_open
            && changes.intersects(Fields::IS_OPEN | Fields::HIGHLIGHTED_INDEX)
            && let Some(index) = effective.highlighted_index
        {
            self.scroll_to(index);
        }
        let count_changed =
            effective.is_open && self.items.count() != self.status.previous_result_count();
        if !changes.is_empty() || count_changed {
            self.announce(&effective, selection_changed);
        }
        if kind == ActionKind::ToggleButtonKeyDownCharacter {
            let now = self.clock.now();
            self.typeahead
                .trigger(&mut self.timers, now, TimerPurpose::TypeaheadClear);
        }
        changes
    }

    fn notify(&self, change: &StateChange<'_, S>, selection_changed: bool) {
        if let Some(listener) = &self.config.on_field_change {
            for field in change.changes.iter() {
                listener(field, change);
            }
        }
        if !change.changes.is_empty()
            && let Some(listener) = &self.config.on_state_change
        {
            listener(change);
        }
        if selection_changed && let Some(listener) = &self.config.on_selection_change {
            listener(change);
        }
        if let Some(listener) = &self.config.on_action {
            listener(change);
        }
    }

    fn scroll_to(&mut self, index: usize) {
        let item = self.env.element_by_id(&self.ids.item(index));
        let menu = self.env.element_by_id(&self.ids.menu);
        if let (Some(item), Some(menu)) = (item, menu) {
            self.env.scroll_into_view(item, menu);
        }
    }

    fn announce(&mut self, effective: &InteractionState<S>, selection_changed: bool) {
        let result_count = self.items.count();
        let message = (self.config.status_message)(&StatusContext {
            state: effective,
            previous_result_count: self.status.previous_result_count(),
            result_count,
            highlighted_item: effective
                .highlighted_index
                .and_then(|index| self.items.item(index)),
            selected_item: effective.selection.latest(),
            selection_changed,
            item_to_string: &*self.config.item_to_string,
        });
        // A closed menu forgets the count so reopening announces it again.
        self.status
            .record_result_count(if effective.is_open { result_count } else { 0 });
        if !message.is_empty() {
            let now = self.clock.now();
            self.status.request(&mut self.timers, now, message);
        }
    }

    // ---------------------------------------------------------------
    // Host input
    // ---------------------------------------------------------------

    /// Route a key press on `surface`. `None` when the key means nothing
    /// here and should reach the host's default handling.
    pub fn handle_key(&mut self, surface: Surface, event: &KeyEvent) -> Option<Fields> {
        let key = KeyAction::from_event(event)?;
        let state = self.state();
        let ctx = KeyContext {
            widget: self.config.widget,
            surface,
            is_open: state.is_open,
            input_value: &state.input_value,
        };
        let action = action_for::<S>(&ctx, key, event.modifiers)?;
        Some(self.dispatch(action))
    }

    /// Feed a document-level pointer or touch event. Only mounted sessions
    /// react.
    pub fn handle_environment_event(&mut self, event: &EnvEvent) -> Option<Fields> {
        if self.lifecycle != Lifecycle::Mounted {
            selectkit_core::debug!(event = ?event.kind(), "environment event while not mounted");
            return None;
        }
        let surfaces = self.surfaces();
        let probe = OutsideProbe {
            env: &self.env,
            surfaces: &surfaces,
            is_open: self.state().is_open,
        };
        let action = match self.outside.handle(event, &probe)? {
            OutsideInteraction::MouseUp => Action::OutsideMouseUp,
            OutsideInteraction::TouchEnd => Action::OutsideTouchEnd,
        };
        Some(self.dispatch(action))
    }

    /// Focus left `surface`. The reset decision waits for the settle timer.
    pub fn handle_blur(&mut self, surface: Surface) {
        if self.lifecycle == Lifecycle::TornDown {
            selectkit_core::debug!("blur after teardown ignored");
            return;
        }
        let now = self.clock.now();
        self.blur.schedule(&mut self.timers, now, surface);
    }

    /// Replace the controlled props.
    ///
    /// A new controlled selection re-derives the input through
    /// `ControlledPropUpdatedSelectedItem`.
    pub fn set_props(&mut self, props: Controlled<S>) {
        let previous = self.state().selection;
        self.props = props;
        let changed = self
            .props
            .selection
            .as_ref()
            .is_some_and(|selection| (self.config.selection_changed)(&previous, selection));
        if changed {
            self.dispatch(Action::ControlledPropUpdatedSelectedItem);
        }
    }

    /// Replace the materialized items after a render.
    pub fn set_items(&mut self, items: Vec<S::Item>) {
        self.items.rebuild(items);
        if self.lifecycle == Lifecycle::TornDown {
            return;
        }
        let effective = self.state();
        if effective.is_open && self.items.count() != self.status.previous_result_count() {
            self.announce(&effective, false);
        }
    }

    // ---------------------------------------------------------------
    // Time
    // ---------------------------------------------------------------

    /// Move the clock forward by `dt` and run every timer that came due.
    pub fn advance(&mut self, dt: Duration) {
        if self.lifecycle == Lifecycle::TornDown {
            selectkit_core::debug!("advance after teardown ignored");
            return;
        }
        self.clock.advance(dt);
        self.fire_due();
    }

    /// Set the clock to `now` and run every timer that came due.
    pub fn set_now(&mut self, now: Duration) {
        if self.lifecycle == Lifecycle::TornDown {
            selectkit_core::debug!("set_now after teardown ignored");
            return;
        }
        self.clock.set(now);
        self.fire_due();
    }

    fn fire_due(&mut self) {
        let now = self.clock.now();
        while let Some((handle, purpose)) = self.timers.pop_due(now) {
            match purpose {
                TimerPurpose::BlurSettle(surface) => {
                    if self.blur.acknowledge(handle) {
                        self.settle_blur(surface);
                    }
                }
                TimerPurpose::StatusPublish(message) => {
                    self.status
                        .publish(&mut self.env, &mut self.timers, now, handle, &message);
                }
                TimerPurpose::StatusClear => {
                    self.status.clear(&mut self.env, handle);
                }
                TimerPurpose::TypeaheadClear => {
                    if self.typeahead.acknowledge(handle) {
                        self.dispatch(Action::FunctionSetInputValue {
                            value: String::new(),
                        });
                    }
                }
            }
        }
    }

    #[cfg_attr(not(feature = "tracing"), allow(unused_variables))]
    fn settle_blur(&mut self, surface: Surface) {
        let surfaces = self.surfaces();
        let reset = should_reset(
            &self.env,
            &surfaces,
            self.outside.is_pointer_down(),
            self.state().is_open,
        );
        if !reset {
            selectkit_core::trace!(?surface, "blur settled inside the widget");
            return;
        }
        let action = match self.config.widget {
            WidgetKind::Combobox => Action::InputBlur {
                select_highlighted: self.config.select_on_blur,
            },
            WidgetKind::Select => Action::ToggleButtonBlur,
        };
        self.dispatch(action);
    }

    /// Nodes that count as inside the widget.
    fn surfaces(&self) -> Vec<NodeId> {
        [
            &self.ids.root,
            &self.ids.menu,
            &self.ids.input,
            &self.ids.toggle_button,
        ]
        .into_iter()
        .filter_map(|id| self.env.element_by_id(id))
        .collect()
    }

    // ---------------------------------------------------------------
    // Diagnostics
    // ---------------------------------------------------------------

    /// Check that the elements the engine relies on are attached.
    ///
    /// Runs in debug builds only; release builds always return an empty
    /// list. Every miss is logged at `warn`.
    pub fn verify_associations(&self) -> Vec<Diagnostic> {
        if !cfg!(debug_assertions) {
            return Vec::new();
        }
        let focusable = match self.config.widget {
            WidgetKind::Combobox => ("input", &self.ids.input),
            WidgetKind::Select => ("toggle button", &self.ids.toggle_button),
        };
        [("root", &self.ids.root), ("menu", &self.ids.menu), focusable]
            .into_iter()
            .filter(|(_, id)| self.env.element_by_id(id).is_none())
            .map(|(role, id)| {
                let diagnostic = Diagnostic::MissingElement {
                    role,
                    id: id.clone(),
                };
                selectkit_core::warn!(%diagnostic, "association check failed");
                diagnostic
            })
            .collect()
    }
}
