#![forbid(unsafe_code)]

//! Keyboard routing.
//!
//! Two table lookups, resolved once per key press:
//!
//! 1. [`KeyAction::from_event`] folds a canonical [`KeyEvent`] into a closed
//!    set of keys the widgets care about.
//! 2. [`action_for`] maps that key, the focused [`Surface`] and the widget
//!    state onto an [`Action`].
//!
//! Keys that mean nothing in the current context map to `None`, and the
//! host should let them through (tab order, text cursor movement, shortcuts).

use selectkit_core::event::{KeyCode, KeyEvent, Modifiers};
use unicode_segmentation::UnicodeSegmentation;

use crate::action::{Action, WidgetKind};
use crate::state::Selection;

/// Keys a selection widget reacts to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum KeyAction {
    ArrowDown,
    ArrowUp,
    Home,
    End,
    PageUp,
    PageDown,
    Enter,
    Escape,
    Backspace,
    Space,
    /// A printable character other than space.
    Character(char),
}

impl KeyAction {
    /// Classify a key event. Releases and unrelated keys yield `None`.
    #[must_use]
    pub fn from_event(event: &KeyEvent) -> Option<Self> {
        if !event.is_actionable() {
            return None;
        }
        let key = match event.code {
            KeyCode::Down => Self::ArrowDown,
            KeyCode::Up => Self::ArrowUp,
            KeyCode::Home => Self::Home,
            KeyCode::End => Self::End,
            KeyCode::PageUp => Self::PageUp,
            KeyCode::PageDown => Self::PageDown,
            KeyCode::Enter => Self::Enter,
            KeyCode::Escape => Self::Escape,
            KeyCode::Backspace => Self::Backspace,
            KeyCode::Char(' ') => Self::Space,
            KeyCode::Char(c) if !c.is_control() => Self::Character(c),
            _ => return None,
        };
        Some(key)
    }
}

/// The element that had focus when the key was pressed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Surface {
    /// The combobox text input.
    Input,
    /// The select trigger (or the combobox's toggle button).
    ToggleButton,
}

/// What the key map needs to know about the widget.
#[derive(Debug, Clone, Copy)]
pub struct KeyContext<'a> {
    pub widget: WidgetKind,
    pub surface: Surface,
    pub is_open: bool,
    pub input_value: &'a str,
}

/// Map a key press onto an action.
#[must_use]
pub fn action_for<S: Selection>(
    ctx: &KeyContext<'_>,
    key: KeyAction,
    modifiers: Modifiers,
) -> Option<Action<S>> {
    match (ctx.widget, ctx.surface) {
        (WidgetKind::Combobox, Surface::Input) => input_action(ctx, key, modifiers),
        (WidgetKind::Select, Surface::ToggleButton) => toggle_button_action(ctx, key, modifiers),
        // A combobox toggle button only takes clicks; a select has no input.
        _ => None,
    }
}

fn is_command(modifiers: Modifiers) -> bool {
    modifiers.intersects(Modifiers::CTRL | Modifiers::ALT | Modifiers::SUPER)
}

fn input_action<S: Selection>(
    ctx: &KeyContext<'_>,
    key: KeyAction,
    modifiers: Modifiers,
) -> Option<Action<S>> {
    let shift = modifiers.contains(Modifiers::SHIFT);
    let alt = modifiers.contains(Modifiers::ALT);
    let action = match key {
        KeyAction::ArrowDown => Action::InputKeyDownArrowDown { shift, alt },
        KeyAction::ArrowUp => Action::InputKeyDownArrowUp { shift, alt },
        // Closed, these keys belong to the text cursor.
        KeyAction::Home if ctx.is_open => Action::InputKeyDownHome,
        KeyAction::End if ctx.is_open => Action::InputKeyDownEnd,
        KeyAction::PageUp if ctx.is_open => Action::InputKeyDownPageUp,
        KeyAction::PageDown if ctx.is_open => Action::InputKeyDownPageDown,
        KeyAction::Enter => Action::InputKeyDownEnter,
        KeyAction::Escape => Action::InputKeyDownEscape,
        KeyAction::Backspace if ctx.input_value.is_empty() => Action::InputKeyDownBackspace,
        KeyAction::Backspace => Action::InputChange {
            value: without_last_grapheme(ctx.input_value).to_owned(),
        },
        KeyAction::Space if !is_command(modifiers) => Action::InputChange {
            value: format!("{} ", ctx.input_value),
        },
        KeyAction::Character(c) if !is_command(modifiers) => Action::InputChange {
            value: format!("{}{c}", ctx.input_value),
        },
        _ => return None,
    };
    Some(action)
}

/// `value` minus its final grapheme cluster.
fn without_last_grapheme(value: &str) -> &str {
    value
        .grapheme_indices(true)
        .next_back()
        .map_or(value, |(start, _)| &value[..start])
}

fn toggle_button_action<S: Selection>(
    ctx: &KeyContext<'_>,
    key: KeyAction,
    modifiers: Modifiers,
) -> Option<Action<S>> {
    let shift = modifiers.contains(Modifiers::SHIFT);
    let alt = modifiers.contains(Modifiers::ALT);
    let action = match key {
        KeyAction::ArrowDown => Action::ToggleButtonKeyDownArrowDown { shift, alt },
        KeyAction::ArrowUp => Action::ToggleButtonKeyDownArrowUp { shift, alt },
        KeyAction::Home => Action::ToggleButtonKeyDownHome,
        KeyAction::End => Action::ToggleButtonKeyDownEnd,
        KeyAction::PageUp if ctx.is_open => Action::ToggleButtonKeyDownPageUp,
        KeyAction::PageDown if ctx.is_open => Action::ToggleButtonKeyDownPageDown,
        KeyAction::Enter => Action::ToggleButtonKeyDownEnter,
        KeyAction::Escape => Action::ToggleButtonKeyDownEscape,
        // Mid-typeahead, space is part of the search text.
        KeyAction::Space if !ctx.input_value.is_empty() => {
            Action::ToggleButtonKeyDownCharacter { key: ' ' }
        }
        KeyAction::Space => Action::ToggleButtonKeyDownSpaceButton,
        KeyAction::Character(c) if !is_command(modifiers) => {
            Action::ToggleButtonKeyDownCharacter { key: c }
        }
        _ => return None,
    };
    Some(action)
}
