#![forbid(unsafe_code)]

//! The closed vocabulary of interactions.
//!
//! An [`Action`] lives for exactly one dispatch. Listeners see its
//! payload-free [`ActionKind`] alongside the changeset, which tells them why
//! the state moved.

use std::fmt;

use crate::state::Selection;

/// Which widget shape the engine is driving.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum WidgetKind {
    /// Text input with a popup list. Typing filters; the selection is
    /// mirrored into the input.
    Combobox,
    /// Button that opens a list. Printable keys drive typeahead.
    Select,
}

/// One interaction fed to the reducer.
#[derive(Debug, Clone, PartialEq)]
pub enum Action<S: Selection> {
    // ── Combobox input ──────────────────────────────────────────────────
    InputKeyDownArrowDown { shift: bool, alt: bool },
    InputKeyDownArrowUp { shift: bool, alt: bool },
    InputKeyDownEscape,
    InputKeyDownHome,
    InputKeyDownEnd,
    InputKeyDownPageUp,
    InputKeyDownPageDown,
    InputKeyDownEnter,
    /// Backspace with an empty input. Removes the last tag in multi-select.
    InputKeyDownBackspace,
    InputChange { value: String },
    /// Focus left the input. `select_highlighted` commits the highlight
    /// first.
    InputBlur { select_highlighted: bool },
    InputClick,

    // ── Toggle button ───────────────────────────────────────────────────
    ToggleButtonClick,
    ToggleButtonKeyDownArrowDown { shift: bool, alt: bool },
    ToggleButtonKeyDownArrowUp { shift: bool, alt: bool },
    ToggleButtonKeyDownEscape,
    ToggleButtonKeyDownHome,
    ToggleButtonKeyDownEnd,
    ToggleButtonKeyDownPageUp,
    ToggleButtonKeyDownPageDown,
    ToggleButtonKeyDownEnter,
    ToggleButtonKeyDownSpaceButton,
    /// A printable key on a select. Feeds typeahead.
    ToggleButtonKeyDownCharacter { key: char },
    ToggleButtonBlur,

    // ── Menu and items ──────────────────────────────────────────────────
    ItemClick { index: usize },
    /// Pointer hover. Highlights without scrolling.
    ItemMouseMove { index: usize },
    MenuMouseLeave,

    // ── Outside interaction ─────────────────────────────────────────────
    OutsideMouseUp,
    OutsideTouchEnd,

    // ── Props ───────────────────────────────────────────────────────────
    /// The caller replaced a controlled selection.
    ControlledPropUpdatedSelectedItem,

    // ── Programmatic ────────────────────────────────────────────────────
    FunctionToggleMenu,
    FunctionOpenMenu,
    FunctionCloseMenu,
    FunctionSetHighlightedIndex { index: Option<usize> },
    FunctionSelectItem { item: S::Item },
    FunctionSelectHighlighted,
    FunctionSetInputValue { value: String },
    FunctionSetSelection { selection: S },
    FunctionClearSelection,
    FunctionReset,
    FunctionSetItemCount { count: Option<usize> },

    // ── Multi-select tags ───────────────────────────────────────────────
    RemoveSelectedItem { index: usize },
    FunctionAddSelectedItem { item: S::Item },
    FunctionRemoveSelectedItem { item: S::Item },
}

macro_rules! action_kinds {
    ($($name:ident),* $(,)?) => {
        /// Payload-free discriminant of an [`Action`].
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
        pub enum ActionKind {
            $($name,)*
        }

        impl ActionKind {
            /// Every kind, in declaration order.
            pub const ALL: &'static [ActionKind] = &[$(ActionKind::$name,)*];

            /// Stable name, identical to the variant name.
            #[must_use]
            pub const fn as_str(self) -> &'static str {
                match self {
                    $(ActionKind::$name => stringify!($name),)*
                }
            }
        }

        impl<S: Selection> Action<S> {
            /// The payload-free discriminant.
            #[must_use]
            pub fn kind(&self) -> ActionKind {
                match self {
                    $(Action::$name { .. } => ActionKind::$name,)*
                }
            }
        }
    };
}

action_kinds! {
    InputKeyDownArrowDown,
    InputKeyDownArrowUp,
    InputKeyDownEscape,
    InputKeyDownHome,
    InputKeyDownEnd,
    InputKeyDownPageUp,
    InputKeyDownPageDown,
    InputKeyDownEnter,
    InputKeyDownBackspace,
    InputChange,
    InputBlur,
    InputClick,
    ToggleButtonClick,
    ToggleButtonKeyDownArrowDown,
    ToggleButtonKeyDownArrowUp,
    ToggleButtonKeyDownEscape,
    ToggleButtonKeyDownHome,
    ToggleButtonKeyDownEnd,
    ToggleButtonKeyDownPageUp,
    ToggleButtonKeyDownPageDown,
    ToggleButtonKeyDownEnter,
    ToggleButtonKeyDownSpaceButton,
    ToggleButtonKeyDownCharacter,
    ToggleButtonBlur,
    ItemClick,
    ItemMouseMove,
    MenuMouseLeave,
    OutsideMouseUp,
    OutsideTouchEnd,
    ControlledPropUpdatedSelectedItem,
    FunctionToggleMenu,
    FunctionOpenMenu,
    FunctionCloseMenu,
    FunctionSetHighlightedIndex,
    FunctionSelectItem,
    FunctionSelectHighlighted,
    FunctionSetInputValue,
    FunctionSetSelection,
    FunctionClearSelection,
    FunctionReset,
    FunctionSetItemCount,
    RemoveSelectedItem,
    FunctionAddSelectedItem,
    FunctionRemoveSelectedItem,
}

impl ActionKind {
    /// Whether this kind applies to `widget`. Input keys belong to the
    /// combobox and toggle-button keys to the select.
    #[must_use]
    pub const fn applies_to(self, widget: WidgetKind) -> bool {
        use ActionKind::*;
        match self {
            InputKeyDownArrowDown | InputKeyDownArrowUp | InputKeyDownEscape
            | InputKeyDownHome | InputKeyDownEnd | InputKeyDownPageUp | InputKeyDownPageDown
            | InputKeyDownEnter | InputKeyDownBackspace | InputChange | InputBlur | InputClick => {
                matches!(widget, WidgetKind::Combobox)
            }
            ToggleButtonKeyDownArrowDown
            | ToggleButtonKeyDownArrowUp
            | ToggleButtonKeyDownEscape
            | ToggleButtonKeyDownHome
            | ToggleButtonKeyDownEnd
            | ToggleButtonKeyDownPageUp
            | ToggleButtonKeyDownPageDown
            | ToggleButtonKeyDownEnter
            | ToggleButtonKeyDownSpaceButton
            | ToggleButtonKeyDownCharacter
            | ToggleButtonBlur => matches!(widget, WidgetKind::Select),
            _ => true,
        }
    }

    /// Whether the highlighted item should be scrolled into view after this
    /// action. Hover already has the item under the pointer.
    #[must_use]
    pub const fn scrolls_highlight(self) -> bool {
        !matches!(self, ActionKind::ItemMouseMove | ActionKind::MenuMouseLeave)
    }
}

impl fmt::Display for ActionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
