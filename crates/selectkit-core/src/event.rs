#![forbid(unsafe_code)]

//! Canonical input/event types.
//!
//! Two families of events reach a selection widget:
//!
//! - **Key events** are delivered by the host to whichever widget part has
//!   focus (the text input of a combobox, the toggle button of a select).
//! - **Environment events** ([`EnvEvent`]) are document-level pointer and
//!   touch notifications the widget subscribed to through
//!   [`Environment::add_event_listener`](crate::environment::Environment::add_event_listener).
//!   They carry the target node so the engine can tell inside from outside.
//!
//! # Design Notes
//!
//! - `KeyEventKind` defaults to `Press`; the engine ignores releases
//! - `Modifiers` use bitflags for easy combination
//! - Native hosts can convert crossterm key events with [`KeyEvent::from_crossterm`]

use bitflags::bitflags;
#[cfg(not(target_arch = "wasm32"))]
use crossterm::event as cte;

use crate::environment::NodeId;

/// A keyboard event.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct KeyEvent {
    /// The key code that was pressed.
    pub code: KeyCode,

    /// Modifier keys held during the event.
    pub modifiers: Modifiers,

    /// The type of key event (press, repeat, or release).
    pub kind: KeyEventKind,
}

impl KeyEvent {
    /// Create a new key event with default modifiers and Press kind.
    #[must_use]
    pub const fn new(code: KeyCode) -> Self {
        Self {
            code,
            modifiers: Modifiers::NONE,
            kind: KeyEventKind::Press,
        }
    }

    /// Create a key event with modifiers.
    #[must_use]
    pub const fn with_modifiers(mut self, modifiers: Modifiers) -> Self {
        self.modifiers = modifiers;
        self
    }

    /// Create a key event with a specific kind.
    #[must_use]
    pub const fn with_kind(mut self, kind: KeyEventKind) -> Self {
        self.kind = kind;
        self
    }

    /// Whether this event should drive the widget (press or auto-repeat).
    #[must_use]
    pub const fn is_actionable(&self) -> bool {
        !matches!(self.kind, KeyEventKind::Release)
    }

    /// Check if Ctrl modifier is held.
    #[must_use]
    pub const fn ctrl(&self) -> bool {
        self.modifiers.contains(Modifiers::CTRL)
    }

    /// Check if Alt modifier is held.
    #[must_use]
    pub const fn alt(&self) -> bool {
        self.modifiers.contains(Modifiers::ALT)
    }

    /// Check if Shift modifier is held.
    #[must_use]
    pub const fn shift(&self) -> bool {
        self.modifiers.contains(Modifiers::SHIFT)
    }

    /// Check if Super/Meta/Cmd modifier is held.
    #[must_use]
    pub const fn super_key(&self) -> bool {
        self.modifiers.contains(Modifiers::SUPER)
    }

    /// Convert a crossterm key event.
    ///
    /// Returns `None` for keys a selection widget has no use for
    /// (media keys, lock keys, bare modifiers).
    #[must_use]
    #[cfg(not(target_arch = "wasm32"))]
    pub fn from_crossterm(event: cte::KeyEvent) -> Option<Self> {
        map_key_event(event)
    }
}

/// Key codes a selection widget reacts to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum KeyCode {
    /// A printable character.
    Char(char),

    /// Enter/Return key.
    Enter,

    /// Escape key.
    Escape,

    /// Backspace key.
    Backspace,

    /// Delete key.
    Delete,

    /// Tab key.
    Tab,

    /// Shift+Tab (back-tab).
    BackTab,

    /// Home key.
    Home,

    /// End key.
    End,

    /// Page Up key.
    PageUp,

    /// Page Down key.
    PageDown,

    /// Up arrow key.
    Up,

    /// Down arrow key.
    Down,

    /// Left arrow key.
    Left,

    /// Right arrow key.
    Right,
}

/// The type of key event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum KeyEventKind {
    /// Key was pressed (default when not distinguishable).
    #[default]
    Press,

    /// Key is being held (repeat event).
    Repeat,

    /// Key was released.
    Release,
}

bitflags! {
    /// Modifier keys that can be held during a key event.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct Modifiers: u8 {
        /// No modifiers.
        const NONE  = 0b0000;
        /// Shift key.
        const SHIFT = 0b0001;
        /// Alt/Option key.
        const ALT   = 0b0010;
        /// Control key.
        const CTRL  = 0b0100;
        /// Super/Meta/Command key.
        const SUPER = 0b1000;
    }
}

impl Default for Modifiers {
    fn default() -> Self {
        Self::NONE
    }
}

/// Document-level event delivered to subscribed listeners.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EnvEvent {
    /// A pointer (mouse/pen) button event.
    Pointer(PointerEvent),
    /// A touch lifecycle event.
    Touch(TouchEvent),
}

impl EnvEvent {
    /// The listener kind this event is delivered to.
    #[must_use]
    pub const fn kind(&self) -> EnvEventKind {
        match self {
            Self::Pointer(p) => match p.kind {
                PointerEventKind::Down => EnvEventKind::PointerDown,
                PointerEventKind::Up => EnvEventKind::PointerUp,
            },
            Self::Touch(t) => match t.kind {
                TouchEventKind::Start => EnvEventKind::TouchStart,
                TouchEventKind::Move => EnvEventKind::TouchMove,
                TouchEventKind::End => EnvEventKind::TouchEnd,
            },
        }
    }

    /// The node the event was dispatched to, if the host resolved one.
    #[must_use]
    pub const fn target(&self) -> Option<NodeId> {
        match self {
            Self::Pointer(p) => p.target,
            Self::Touch(t) => t.target,
        }
    }
}

/// Listener registration kinds, one per document event name.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum EnvEventKind {
    /// `mousedown`
    PointerDown,
    /// `mouseup`
    PointerUp,
    /// `touchstart`
    TouchStart,
    /// `touchmove`
    TouchMove,
    /// `touchend`
    TouchEnd,
}

impl EnvEventKind {
    /// The DOM event name hosts subscribe to.
    #[must_use]
    pub const fn dom_name(self) -> &'static str {
        match self {
            Self::PointerDown => "mousedown",
            Self::PointerUp => "mouseup",
            Self::TouchStart => "touchstart",
            Self::TouchMove => "touchmove",
            Self::TouchEnd => "touchend",
        }
    }
}

/// A pointer button event.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PointerEvent {
    /// Press or release.
    pub kind: PointerEventKind,
    /// Node under the pointer.
    pub target: Option<NodeId>,
    /// Modifier keys held during the event.
    pub modifiers: Modifiers,
}

impl PointerEvent {
    /// Pointer pressed on `target`.
    #[must_use]
    pub const fn down(target: Option<NodeId>) -> Self {
        Self {
            kind: PointerEventKind::Down,
            target,
            modifiers: Modifiers::NONE,
        }
    }

    /// Pointer released on `target`.
    #[must_use]
    pub const fn up(target: Option<NodeId>) -> Self {
        Self {
            kind: PointerEventKind::Up,
            target,
            modifiers: Modifiers::NONE,
        }
    }

    /// Attach modifiers.
    #[must_use]
    pub const fn with_modifiers(mut self, modifiers: Modifiers) -> Self {
        self.modifiers = modifiers;
        self
    }
}

/// Pointer event type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PointerEventKind {
    /// Button pressed.
    Down,
    /// Button released.
    Up,
}

/// A touch event.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TouchEvent {
    /// Lifecycle phase.
    pub kind: TouchEventKind,
    /// Node under the touch point.
    pub target: Option<NodeId>,
}

impl TouchEvent {
    /// Touch started on `target`.
    #[must_use]
    pub const fn start(target: Option<NodeId>) -> Self {
        Self {
            kind: TouchEventKind::Start,
            target,
        }
    }

    /// Touch point moved.
    #[must_use]
    pub const fn moved(target: Option<NodeId>) -> Self {
        Self {
            kind: TouchEventKind::Move,
            target,
        }
    }

    /// Touch ended on `target`.
    #[must_use]
    pub const fn end(target: Option<NodeId>) -> Self {
        Self {
            kind: TouchEventKind::End,
            target,
        }
    }
}

/// Touch lifecycle phase.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TouchEventKind {
    /// Finger down.
    Start,
    /// Finger moved (scroll or swipe).
    Move,
    /// Finger lifted.
    End,
}

#[cfg(not(target_arch = "wasm32"))]
fn map_key_event(event: cte::KeyEvent) -> Option<KeyEvent> {
    let code = map_key_code(event.code)?;
    let modifiers = map_modifiers(event.modifiers);
    let kind = map_key_kind(event.kind);
    Some(KeyEvent {
        code,
        modifiers,
        kind,
    })
}

#[cfg(not(target_arch = "wasm32"))]
fn map_key_kind(kind: cte::KeyEventKind) -> KeyEventKind {
    match kind {
        cte::KeyEventKind::Press => KeyEventKind::Press,
        cte::KeyEventKind::Repeat => KeyEventKind::Repeat,
        cte::KeyEventKind::Release => KeyEventKind::Release,
    }
}

#[cfg(not(target_arch = "wasm32"))]
fn map_key_code(code: cte::KeyCode) -> Option<KeyCode> {
    match code {
        cte::KeyCode::Backspace => Some(KeyCode::Backspace),
        cte::KeyCode::Enter => Some(KeyCode::Enter),
        cte::KeyCode::Left => Some(KeyCode::Left),
        cte::KeyCode::Right => Some(KeyCode::Right),
        cte::KeyCode::Up => Some(KeyCode::Up),
        cte::KeyCode::Down => Some(KeyCode::Down),
        cte::KeyCode::Home => Some(KeyCode::Home),
        cte::KeyCode::End => Some(KeyCode::End),
        cte::KeyCode::PageUp => Some(KeyCode::PageUp),
        cte::KeyCode::PageDown => Some(KeyCode::PageDown),
        cte::KeyCode::Tab => Some(KeyCode::Tab),
        cte::KeyCode::BackTab => Some(KeyCode::BackTab),
        cte::KeyCode::Delete => Some(KeyCode::Delete),
        cte::KeyCode::Char(c) => Some(KeyCode::Char(c)),
        cte::KeyCode::Esc => Some(KeyCode::Escape),
        _ => None,
    }
}

#[cfg(not(target_arch = "wasm32"))]
fn map_modifiers(modifiers: cte::KeyModifiers) -> Modifiers {
    let mut mapped = Modifiers::NONE;
    if modifiers.contains(cte::KeyModifiers::SHIFT) {
        mapped |= Modifiers::SHIFT;
    }
    if modifiers.contains(cte::KeyModifiers::ALT) {
        mapped |= Modifiers::ALT;
    }
    if modifiers.contains(cte::KeyModifiers::CONTROL) {
        mapped |= Modifiers::CTRL;
    }
    if modifiers.contains(cte::KeyModifiers::SUPER)
        || modifiers.contains(cte::KeyModifiers::HYPER)
        || modifiers.contains(cte::KeyModifiers::META)
    {
        mapped |= Modifiers::SUPER;
    }
    mapped
}
