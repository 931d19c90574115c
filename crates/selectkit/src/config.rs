#![forbid(unsafe_code)]

//! Session configuration.
//!
//! [`SessionConfig`] gathers everything a caller can tune: the widget shape,
//! item projection and disabled predicate, initial and default values, the
//! override hook, listeners, ids, timing windows and the status composer.
//! Every setting has a default; callers chain `with_*` methods for the rest.

use std::fmt;
use std::rc::Rc;
use std::time::Duration;

use crate::action::WidgetKind;
use crate::diagnostics::ConfigError;
use crate::reducer::Proposal;
use crate::registry::IdConfig;
use crate::session::StateChange;
use crate::state::{Fields, InteractionState, Selection};
use crate::trackers::status::{StatusContext, default_status_message};

/// Item to display string.
pub type ItemToString<T> = Rc<dyn Fn(&T) -> String>;
/// `(item, index) -> disabled`.
pub type IsItemDisabled<T> = Rc<dyn Fn(&T, usize) -> bool>;
/// `(previous, next) -> changed`. Gates selection-change notifications.
pub type SelectionChanged<S> = Rc<dyn Fn(&S, &S) -> bool>;
/// Override hook. Returns the state that is actually applied.
pub type StateReducer<S> = Rc<dyn Fn(&InteractionState<S>, Proposal<'_, S>) -> InteractionState<S>>;
/// Builds the accessibility status text. An empty string announces nothing.
pub type StatusComposer<S> = Rc<dyn Fn(&StatusContext<'_, S>) -> String>;
/// Listener for aggregate, selection and action notifications.
pub type Listener<S> = Rc<dyn Fn(&StateChange<'_, S>)>;
/// Listener called once per changed field.
pub type FieldListener<S> = Rc<dyn Fn(Fields, &StateChange<'_, S>)>;

/// Which environment events drive outside-interaction detection.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct InputCapabilities {
    /// Mouse/pen: `mousedown` + `mouseup`.
    /// Default: true
    pub pointer: bool,
    /// Touch: `touchstart` + `touchmove` + `touchend`.
    /// Default: true
    pub touch: bool,
}

impl Default for InputCapabilities {
    fn default() -> Self {
        Self {
            pointer: true,
            touch: true,
        }
    }
}

/// Timer windows used by the trackers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Timing {
    /// Delay before a blur is checked, letting focus land on its new target.
    /// Default: 0ms
    pub blur_settle: Duration,
    /// Quiet window for status announcements. Last message wins.
    /// Default: 200ms
    pub status_debounce: Duration,
    /// How long a published status stays in the live region.
    /// Default: 500ms
    pub status_clear: Duration,
    /// Idle time after which the typeahead buffer is dropped.
    /// Default: 500ms
    pub typeahead_reset: Duration,
}

impl Default for Timing {
    fn default() -> Self {
        Self {
            blur_settle: Duration::ZERO,
            status_debounce: Duration::from_millis(200),
            status_clear: Duration::from_millis(500),
            typeahead_reset: Duration::from_millis(500),
        }
    }
}

/// Everything a [`Session`](crate::session::Session) is built from.
pub struct SessionConfig<S: Selection> {
    pub widget: WidgetKind,
    pub item_to_string: ItemToString<S::Item>,
    pub is_item_disabled: IsItemDisabled<S::Item>,
    pub selection_changed: SelectionChanged<S>,
    pub state_reducer: StateReducer<S>,

    /// Values used when the session is created. Unset ones fall back to
    /// the defaults below.
    pub initial_is_open: Option<bool>,
    pub initial_highlighted_index: Option<usize>,
    pub initial_input_value: Option<String>,
    pub initial_selection: Option<S>,

    /// Values restored by resets.
    pub default_is_open: bool,
    pub default_highlighted_index: Option<usize>,
    pub default_input_value: Option<String>,
    pub default_selection: S,

    pub ids: IdConfig,
    pub capabilities: InputCapabilities,
    pub timing: Timing,

    /// Arrow-key step with Shift held.
    /// Default: 5
    pub accelerated_step: usize,
    /// PageUp/PageDown step.
    /// Default: 10
    pub page_step: usize,
    /// Commit the highlighted item when focus leaves the widget.
    /// Default: true
    pub select_on_blur: bool,
    /// Escape on a closed combobox clears the selection and input.
    /// Default: true for single-select combobox, false otherwise
    pub clear_on_escape_when_closed: bool,
    /// Highlight the first enabled item on a plain open with no selection.
    /// Default: false
    pub highlight_first_on_open: bool,
    pub status_message: StatusComposer<S>,

    pub on_field_change: Option<FieldListener<S>>,
    pub on_state_change: Option<Listener<S>>,
    pub on_selection_change: Option<Listener<S>>,
    pub on_action: Option<Listener<S>>,
}

impl<S: Selection> Clone for SessionConfig<S> {
    fn clone(&self) -> Self {
        Self {
            widget: self.widget,
            item_to_string: Rc::clone(&self.item_to_string),
            is_item_disabled: Rc::clone(&self.is_item_disabled),
            selection_changed: Rc::clone(&self.selection_changed),
            state_reducer: Rc::clone(&self.state_reducer),
            initial_is_open: self.initial_is_open,
            initial_highlighted_index: self.initial_highlighted_index,
            initial_input_value: self.initial_input_value.clone(),
            initial_selection: self.initial_selection.clone(),
            default_is_open: self.default_is_open,
            default_highlighted_index: self.default_highlighted_index,
            default_input_value: self.default_input_value.clone(),
            default_selection: self.default_selection.clone(),
            ids: self.ids.clone(),
            capabilities: self.capabilities,
            timing: self.timing,
            accelerated_step: self.accelerated_step,
            page_step: self.page_step,
            select_on_blur: self.select_on_blur,
            clear_on_escape_when_closed: self.clear_on_escape_when_closed,
            highlight_first_on_open: self.highlight_first_on_open,
            status_message: Rc::clone(&self.status_message),
            on_field_change: self.on_field_change.clone(),
            on_state_change: self.on_state_change.clone(),
            on_selection_change: self.on_selection_change.clone(),
            on_action: self.on_action.clone(),
        }
    }
}

impl<S: Selection> fmt::Debug for SessionConfig<S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SessionConfig")
            .field("widget", &self.widget)
            .field("initial_is_open", &self.initial_is_open)
            .field("initial_highlighted_index", &self.initial_highlighted_index)
            .field("initial_input_value", &self.initial_input_value)
            .field("initial_selection", &self.initial_selection)
            .field("default_is_open", &self.default_is_open)
            .field("default_highlighted_index", &self.default_highlighted_index)
            .field("default_input_value", &self.default_input_value)
            .field("default_selection", &self.default_selection)
            .field("ids", &self.ids)
            .field("capabilities", &self.capabilities)
            .field("timing", &self.timing)
            .field("accelerated_step", &self.accelerated_step)
            .field("page_step", &self.page_step)
            .field("select_on_blur", &self.select_on_blur)
            .field("clear_on_escape_when_closed", &self.clear_on_escape_when_closed)
            .field("highlight_first_on_open", &self.highlight_first_on_open)
            .finish_non_exhaustive()
    }
}

impl<S: Selection> SessionConfig<S> {
    /// A configuration for `widget` with an explicit item projection.
    pub fn new(widget: WidgetKind, item_to_string: impl Fn(&S::Item) -> String + 'static) -> Self {
        Self {
            widget,
            item_to_string: Rc::new(item_to_string),
            is_item_disabled: Rc::new(|_, _| false),
            selection_changed: Rc::new(|previous: &S, next: &S| previous != next),
            state_reducer: Rc::new(|_, proposal| proposal.changes),
            initial_is_open: None,
            initial_highlighted_index: None,
            initial_input_value: None,
            initial_selection: None,
            default_is_open: false,
            default_highlighted_index: None,
            default_input_value: None,
            default_selection: S::default(),
            ids: IdConfig::default(),
            capabilities: InputCapabilities::default(),
            timing: Timing::default(),
            accelerated_step: 5,
            page_step: 10,
            select_on_blur: true,
            clear_on_escape_when_closed: widget == WidgetKind::Combobox && !S::MULTIPLE,
            highlight_first_on_open: false,
            status_message: Rc::new(default_status_message::<S>),
            on_field_change: None,
            on_state_change: None,
            on_selection_change: None,
            on_action: None,
        }
    }

    #[must_use]
    pub fn with_item_to_string(mut self, f: impl Fn(&S::Item) -> String + 'static) -> Self {
        self.item_to_string = Rc::new(f);
        self
    }

    #[must_use]
    pub fn with_is_item_disabled(mut self, f: impl Fn(&S::Item, usize) -> bool + 'static) -> Self {
        self.is_item_disabled = Rc::new(f);
        self
    }

    #[must_use]
    pub fn with_selection_changed(mut self, f: impl Fn(&S, &S) -> bool + 'static) -> Self {
        self.selection_changed = Rc::new(f);
        self
    }

    /// Install the override hook.
    #[must_use]
    pub fn with_state_reducer(
        mut self,
        f: impl Fn(&InteractionState<S>, Proposal<'_, S>) -> InteractionState<S> + 'static,
    ) -> Self {
        self.state_reducer = Rc::new(f);
        self
    }

    #[must_use]
    pub fn with_initial_is_open(mut self, is_open: bool) -> Self {
        self.initial_is_open = Some(is_open);
        self
    }

    #[must_use]
    pub fn with_initial_highlighted_index(mut self, index: usize) -> Self {
        self.initial_highlighted_index = Some(index);
        self
    }

    #[must_use]
    pub fn with_initial_input_value(mut self, value: impl Into<String>) -> Self {
        self.initial_input_value = Some(value.into());
        self
    }

    #[must_use]
    pub fn with_initial_selection(mut self, selection: S) -> Self {
        self.initial_selection = Some(selection);
        self
    }

    #[must_use]
    pub fn with_default_is_open(mut self, is_open: bool) -> Self {
        self.default_is_open = is_open;
        self
    }

    #[must_use]
    pub fn with_default_highlighted_index(mut self, index: Option<usize>) -> Self {
        self.default_highlighted_index = index;
        self
    }

    #[must_use]
    pub fn with_default_input_value(mut self, value: impl Into<String>) -> Self {
        self.default_input_value = Some(value.into());
        self
    }

    #[must_use]
    pub fn with_default_selection(mut self, selection: S) -> Self {
        self.default_selection = selection;
        self
    }

    #[must_use]
    pub fn with_ids(mut self, ids: IdConfig) -> Self {
        self.ids = ids;
        self
    }

    #[must_use]
    pub fn with_capabilities(mut self, capabilities: InputCapabilities) -> Self {
        self.capabilities = capabilities;
        self
    }

    #[must_use]
    pub fn with_timing(mut self, timing: Timing) -> Self {
        self.timing = timing;
        self
    }

    #[must_use]
    pub fn with_steps(mut self, accelerated: usize, page: usize) -> Self {
        self.accelerated_step = accelerated;
        self.page_step = page;
        self
    }

    #[must_use]
    pub fn with_select_on_blur(mut self, enabled: bool) -> Self {
        self.select_on_blur = enabled;
        self
    }

    #[must_use]
    pub fn with_clear_on_escape_when_closed(mut self, enabled: bool) -> Self {
        self.clear_on_escape_when_closed = enabled;
        self
    }

    #[must_use]
    pub fn with_highlight_first_on_open(mut self, enabled: bool) -> Self {
        self.highlight_first_on_open = enabled;
        self
    }

    #[must_use]
    pub fn with_status_message(
        mut self,
        f: impl Fn(&StatusContext<'_, S>) -> String + 'static,
    ) -> Self {
        self.status_message = Rc::new(f);
        self
    }

    #[must_use]
    pub fn on_field_change(mut self, f: impl Fn(Fields, &StateChange<'_, S>) + 'static) -> Self {
        self.on_field_change = Some(Rc::new(f));
        self
    }

    #[must_use]
    pub fn on_state_change(mut self, f: impl Fn(&StateChange<'_, S>) + 'static) -> Self {
        self.on_state_change = Some(Rc::new(f));
        self
    }

    #[must_use]
    pub fn on_selection_change(mut self, f: impl Fn(&StateChange<'_, S>) + 'static) -> Self {
        self.on_selection_change = Some(Rc::new(f));
        self
    }

    #[must_use]
    pub fn on_action(mut self, f: impl Fn(&StateChange<'_, S>) + 'static) -> Self {
        self.on_action = Some(Rc::new(f));
        self
    }

    /// Check the configuration against the initial item count.
    ///
    /// Highlight settings are only range-checked when `item_count` is
    /// non-zero, since lists are often populated after construction.
    pub fn validate(&self, item_count: usize) -> Result<(), ConfigError> {
        if self.accelerated_step == 0 {
            return Err(ConfigError::ZeroStep {
                name: "accelerated_step",
            });
        }
        if self.page_step == 0 {
            return Err(ConfigError::ZeroStep { name: "page_step" });
        }
        if item_count > 0 {
            let highlights = [
                ("initial_highlighted_index", self.initial_highlighted_index),
                ("default_highlighted_index", self.default_highlighted_index),
            ];
            for (name, index) in highlights {
                if let Some(index) = index
                    && index >= item_count
                {
                    return Err(ConfigError::HighlightOutOfRange {
                        name,
                        index,
                        count: item_count,
                    });
                }
            }
        }
        Ok(())
    }

    /// Input text the widget starts from or resets to for `selection`.
    pub(crate) fn derive_input(&self, selection: &S) -> String {
        match self.widget {
            // A select's input is only the typeahead buffer.
            WidgetKind::Select => String::new(),
            WidgetKind::Combobox => selection.derived_input(&*self.item_to_string),
        }
    }

    /// Input text restored by a full reset.
    pub(crate) fn default_input(&self) -> String {
        self.default_input_value
            .clone()
            .unwrap_or_else(|| self.derive_input(&self.default_selection))
    }
}

impl<S: Selection> SessionConfig<S>
where
    S::Item: fmt::Display,
{
    /// Single- or multi-select combobox projecting items with `Display`.
    #[must_use]
    pub fn combobox() -> Self {
        Self::new(WidgetKind::Combobox, ToString::to_string)
    }

    /// Dropdown select projecting items with `Display`.
    #[must_use]
    pub fn select() -> Self {
        Self::new(WidgetKind::Select, ToString::to_string)
    }
}

impl<T> SessionConfig<Vec<T>>
where
    T: Clone + fmt::Debug + PartialEq + fmt::Display + 'static,
{
    /// Multi-select combobox with removable tags.
    #[must_use]
    pub fn multiple() -> Self {
        Self::combobox()
    }
}
