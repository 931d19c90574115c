#![forbid(unsafe_code)]

//! The transition function.
//!
//! [`reduce`] maps `(state, action)` to the proposed next state. It is pure:
//! no timers, no environment, no notifications. The session runs the
//! caller's override hook on its output and applies whatever the hook
//! returns.
//!
//! # Transitions
//!
//! | Group | Effect |
//! |-------|--------|
//! | open | `is_open = true`, highlight from [`highlight_on_open`] |
//! | navigate | highlight moves, nothing else changes |
//! | commit | selection folds in the highlighted item, input follows, menu closes |
//! | reset while open | menu and highlight to defaults, input re-derived |
//! | clear while closed | selection and input emptied (combobox Escape) |
//! | text input | input replaced, menu opens, highlight to default |
//!
//! Actions that do not apply to the widget shape, or to a single-select
//! selection, return the state unchanged.

use crate::action::Action;
use crate::config::SessionConfig;
use crate::navigator::{move_index, move_index_clamped, nearest_enabled, normalize};
use crate::registry::ItemRegistry;
use crate::state::{InteractionState, Selection};

/// A proposed transition handed to the override hook.
#[derive(Debug)]
pub struct Proposal<'a, S: Selection> {
    pub action: &'a Action<S>,
    /// The full state the reducer would apply.
    pub changes: InteractionState<S>,
}

/// Everything the reducer reads besides state and action.
pub struct ReduceContext<'a, S: Selection> {
    pub config: &'a SessionConfig<S>,
    pub items: &'a ItemRegistry<S::Item>,
    /// Whether the menu has been open at least once in this session.
    pub has_opened: bool,
}

impl<S: Selection> ReduceContext<'_, S> {
    fn count(&self) -> usize {
        self.items.count()
    }

    fn is_disabled(&self, index: usize) -> bool {
        self.items.is_disabled(index, &*self.config.is_item_disabled)
    }

    fn is_usable(&self, index: usize) -> bool {
        index < self.count() && !self.is_disabled(index)
    }

    fn step(&self, accelerated: bool) -> isize {
        let step = if accelerated {
            self.config.accelerated_step
        } else {
            1
        };
        isize::try_from(step).unwrap_or(isize::MAX)
    }

    fn page_step(&self) -> isize {
        isize::try_from(self.config.page_step).unwrap_or(isize::MAX)
    }
}

/// How the menu is being opened.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OpenIntent {
    /// Click or programmatic open.
    Plain,
    /// Arrow down.
    Forward,
    /// Arrow up.
    Backward,
}

/// Highlight to show when the menu opens.
///
/// Priority: the initial highlight (first open only), the default
/// highlight, the selected item, then nothing for a plain open or the
/// first/last enabled item for a directional one.
#[must_use]
pub fn highlight_on_open<S: Selection>(
    state: &InteractionState<S>,
    ctx: &ReduceContext<'_, S>,
    intent: OpenIntent,
) -> Option<usize> {
    let count = ctx.count();
    if count == 0 {
        return None;
    }
    if !ctx.has_opened
        && let Some(index) = ctx.config.initial_highlighted_index
        && ctx.is_usable(index)
    {
        return Some(index);
    }
    if let Some(index) = ctx.config.default_highlighted_index
        && ctx.is_usable(index)
    {
        return Some(index);
    }
    if let Some(anchor) = state.selection.anchor()
        && let Some(index) = ctx.items.index_of(anchor)
        && ctx.is_usable(index)
    {
        return Some(index);
    }
    let is_disabled = |i| ctx.is_disabled(i);
    match intent {
        OpenIntent::Plain if ctx.config.highlight_first_on_open => {
            nearest_enabled(0, true, count, is_disabled)
        }
        OpenIntent::Plain => None,
        OpenIntent::Forward => nearest_enabled(0, true, count, is_disabled),
        OpenIntent::Backward => nearest_enabled(count - 1, false, count, is_disabled),
    }
}

fn open<S: Selection>(
    state: &InteractionState<S>,
    ctx: &ReduceContext<'_, S>,
    intent: OpenIntent,
) -> InteractionState<S> {
    InteractionState {
        is_open: true,
        highlighted_index: highlight_on_open(state, ctx, intent),
        ..state.clone()
    }
}

fn toggle<S: Selection>(
    state: &InteractionState<S>,
    ctx: &ReduceContext<'_, S>,
) -> InteractionState<S> {
    if state.is_open {
        InteractionState {
            is_open: false,
            highlighted_index: ctx.config.default_highlighted_index,
            ..state.clone()
        }
    } else {
        open(state, ctx, OpenIntent::Plain)
    }
}

/// Fold the item at `index` into the selection if it exists and is enabled.
fn commit_at<S: Selection>(
    state: &InteractionState<S>,
    ctx: &ReduceContext<'_, S>,
    index: Option<usize>,
    fold: fn(&S, &S::Item) -> S,
) -> InteractionState<S> {
    let Some(index) = normalize(index, ctx.count()) else {
        return state.clone();
    };
    let Some(item) = ctx.items.item(index) else {
        return state.clone();
    };
    if ctx.is_disabled(index) {
        return state.clone();
    }
    let selection = fold(&state.selection, item);
    InteractionState {
        is_open: ctx.config.default_is_open,
        highlighted_index: ctx.config.default_highlighted_index,
        input_value: ctx.config.derive_input(&selection),
        selection,
    }
}

fn commit_highlighted<S: Selection>(
    state: &InteractionState<S>,
    ctx: &ReduceContext<'_, S>,
) -> InteractionState<S> {
    commit_at(state, ctx, state.highlighted_index, S::commit)
}

/// Reset while open: menu and highlight back to defaults, input re-derived
/// from the unchanged selection.
fn reset_open<S: Selection>(
    state: &InteractionState<S>,
    ctx: &ReduceContext<'_, S>,
) -> InteractionState<S> {
    InteractionState {
        is_open: ctx.config.default_is_open,
        highlighted_index: ctx.config.default_highlighted_index,
        input_value: ctx.config.derive_input(&state.selection),
        selection: state.selection.clone(),
    }
}

/// Clear while closed: selection and input emptied. Kept separate from
/// [`reset_open`]; the two fire on different states and touch different
/// fields.
fn clear_closed<S: Selection>(state: &InteractionState<S>) -> InteractionState<S> {
    InteractionState {
        input_value: String::new(),
        selection: S::default(),
        ..state.clone()
    }
}

fn blur<S: Selection>(
    state: &InteractionState<S>,
    ctx: &ReduceContext<'_, S>,
    select_highlighted: bool,
) -> InteractionState<S> {
    let mut next = reset_open(state, ctx);
    // Blur only ever adds: a highlighted item that is already selected stays.
    if select_highlighted && state.is_open {
        let committed = commit_at(state, ctx, state.highlighted_index, S::insert);
        if committed.selection != state.selection {
            next.input_value = committed.input_value;
            next.selection = committed.selection;
        }
    }
    next
}

fn typeahead<S: Selection>(
    state: &InteractionState<S>,
    ctx: &ReduceContext<'_, S>,
    key: char,
) -> InteractionState<S> {
    let mut buffer = state.input_value.clone();
    buffer.push(key);
    let found = ctx.items.find_by_prefix(
        &buffer,
        state.highlighted_index,
        &*ctx.config.item_to_string,
        &*ctx.config.is_item_disabled,
    );
    let highlighted_index = match found {
        Some(index) => Some(index),
        None if state.is_open => state.highlighted_index,
        None => highlight_on_open(state, ctx, OpenIntent::Plain),
    };
    InteractionState {
        is_open: true,
        highlighted_index,
        input_value: buffer,
        selection: state.selection.clone(),
    }
}

/// Next state for `action`, before the override hook.
#[must_use]
pub fn reduce<S: Selection>(
    state: &InteractionState<S>,
    action: &Action<S>,
    ctx: &ReduceContext<'_, S>,
) -> InteractionState<S> {
    if !action.kind().applies_to(ctx.config.widget) {
        return state.clone();
    }
    let count = ctx.count();
    let is_disabled = |i| ctx.is_disabled(i);
    let with_highlight = |highlighted_index| InteractionState {
        highlighted_index,
        ..state.clone()
    };

    match action {
        Action::InputKeyDownArrowDown { shift, alt }
        | Action::ToggleButtonKeyDownArrowDown { shift, alt } => {
            if state.is_open {
                with_highlight(move_index(
                    state.highlighted_index,
                    ctx.step(*shift),
                    count,
                    is_disabled,
                ))
            } else if *alt {
                open(state, ctx, OpenIntent::Plain)
            } else {
                open(state, ctx, OpenIntent::Forward)
            }
        }
        Action::InputKeyDownArrowUp { shift, alt }
        | Action::ToggleButtonKeyDownArrowUp { shift, alt } => {
            if !state.is_open {
                open(state, ctx, OpenIntent::Backward)
            } else if *alt {
                commit_highlighted(state, ctx)
            } else {
                with_highlight(move_index(
                    state.highlighted_index,
                    -ctx.step(*shift),
                    count,
                    is_disabled,
                ))
            }
        }
        Action::InputKeyDownHome | Action::ToggleButtonKeyDownHome => {
            let mut next = state.clone();
            next.is_open = true;
            if let Some(index) = nearest_enabled(0, true, count, is_disabled) {
                next.highlighted_index = Some(index);
            }
            next
        }
        Action::InputKeyDownEnd | Action::ToggleButtonKeyDownEnd => {
            let mut next = state.clone();
            next.is_open = true;
            if let Some(index) =
                nearest_enabled(count.saturating_sub(1), false, count, is_disabled)
            {
                next.highlighted_index = Some(index);
            }
            next
        }
        Action::InputKeyDownPageUp | Action::ToggleButtonKeyDownPageUp if state.is_open => {
            with_highlight(move_index_clamped(
                state.highlighted_index,
                -ctx.page_step(),
                count,
                is_disabled,
            ))
        }
        Action::InputKeyDownPageDown | Action::ToggleButtonKeyDownPageDown if state.is_open => {
            with_highlight(move_index_clamped(
                state.highlighted_index,
                ctx.page_step(),
                count,
                is_disabled,
            ))
        }
        Action::InputKeyDownEnter if state.is_open => commit_highlighted(state, ctx),
        Action::ToggleButtonKeyDownEnter | Action::ToggleButtonKeyDownSpaceButton => {
            if state.is_open {
                commit_highlighted(state, ctx)
            } else {
                open(state, ctx, OpenIntent::Plain)
            }
        }
        Action::InputKeyDownEscape => {
            if state.is_open {
                reset_open(state, ctx)
            } else if ctx.config.clear_on_escape_when_closed {
                clear_closed(state)
            } else {
                state.clone()
            }
        }
        Action::ToggleButtonKeyDownEscape
        | Action::OutsideMouseUp
        | Action::OutsideTouchEnd
            if state.is_open =>
        {
            reset_open(state, ctx)
        }
        Action::InputKeyDownBackspace if S::MULTIPLE && state.input_value.is_empty() => {
            InteractionState {
                selection: state.selection.pop_last(),
                ..state.clone()
            }
        }
        Action::InputChange { value } => InteractionState {
            is_open: true,
            highlighted_index: ctx.config.default_highlighted_index,
            input_value: value.clone(),
            selection: state.selection.clone(),
        },
        Action::InputBlur { select_highlighted } => blur(state, ctx, *select_highlighted),
        Action::ToggleButtonBlur => blur(state, ctx, ctx.config.select_on_blur),
        Action::InputClick | Action::ToggleButtonClick | Action::FunctionToggleMenu => {
            toggle(state, ctx)
        }
        Action::ToggleButtonKeyDownCharacter { key } => typeahead(state, ctx, *key),
        Action::ItemClick { index } => commit_at(state, ctx, Some(*index), S::commit),
        Action::ItemMouseMove { index } if ctx.is_usable(*index) => with_highlight(Some(*index)),
        Action::MenuMouseLeave => with_highlight(None),
        Action::ControlledPropUpdatedSelectedItem if !S::MULTIPLE => InteractionState {
            input_value: ctx.config.derive_input(&state.selection),
            ..state.clone()
        },
        Action::FunctionOpenMenu if !state.is_open => open(state, ctx, OpenIntent::Plain),
        Action::FunctionCloseMenu => InteractionState {
            is_open: false,
            ..reset_open(state, ctx)
        },
        Action::FunctionSetHighlightedIndex { index } => with_highlight(*index),
        Action::FunctionSelectItem { item } => {
            let selection = state.selection.insert(item);
            InteractionState {
                input_value: ctx.config.derive_input(&selection),
                selection,
                ..state.clone()
            }
        }
        Action::FunctionSelectHighlighted => commit_highlighted(state, ctx),
        Action::FunctionSetInputValue { value } => InteractionState {
            input_value: value.clone(),
            ..state.clone()
        },
        Action::FunctionSetSelection { selection } => InteractionState {
            input_value: ctx.config.derive_input(selection),
            selection: selection.clone(),
            ..state.clone()
        },
        Action::FunctionClearSelection => InteractionState {
            is_open: ctx.config.default_is_open,
            highlighted_index: ctx.config.default_highlighted_index,
            input_value: String::new(),
            selection: S::default(),
        },
        Action::FunctionReset => InteractionState {
            is_open: ctx.config.default_is_open,
            highlighted_index: ctx.config.default_highlighted_index,
            input_value: ctx.config.default_input(),
            selection: ctx.config.default_selection.clone(),
        },
        Action::RemoveSelectedItem { index } if S::MULTIPLE => InteractionState {
            selection: state.selection.remove_at(*index),
            ..state.clone()
        },
        Action::FunctionAddSelectedItem { item } if S::MULTIPLE => InteractionState {
            selection: state.selection.insert(item),
            ..state.clone()
        },
        Action::FunctionRemoveSelectedItem { item } if S::MULTIPLE => InteractionState {
            selection: state.selection.remove(item),
            ..state.clone()
        },
        // FunctionSetItemCount lands here: the session applies the count and
        // the stored highlight is tolerated until navigation reads it.
        _ => state.clone(),
    }
}
