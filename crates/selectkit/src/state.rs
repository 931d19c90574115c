#![forbid(unsafe_code)]

//! The four-field interaction state and the selection shapes it supports.
//!
//! [`InteractionState`] is generic over its selection so one engine serves
//! single-select (`Option<T>`) and multi-select (`Vec<T>`) widgets. The
//! [`Selection`] trait captures every place the two shapes diverge: how a
//! commit folds an item in, what the input shows afterwards, and which item
//! (if any) anchors the highlight when the menu opens.

use std::fmt;

use bitflags::bitflags;

bitflags! {
    /// A changeset: the fields whose effective value differs between two
    /// states. Iteration order is declaration order, which is also the order
    /// per-field notifications fire in.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    pub struct Fields: u8 {
        const IS_OPEN           = 0b0001;
        const HIGHLIGHTED_INDEX = 0b0010;
        const INPUT_VALUE       = 0b0100;
        const SELECTION         = 0b1000;
    }
}

impl Fields {
    /// Human-readable field name for a single flag.
    #[must_use]
    pub fn name(self) -> &'static str {
        if self == Self::IS_OPEN {
            "is_open"
        } else if self == Self::HIGHLIGHTED_INDEX {
            "highlighted_index"
        } else if self == Self::INPUT_VALUE {
            "input_value"
        } else if self == Self::SELECTION {
            "selection"
        } else {
            "fields"
        }
    }
}

/// The selected value(s) of a widget.
///
/// Equality is `PartialEq` on the item type. Wrap items in a newtype whose
/// `PartialEq` compares pointers when identity semantics are wanted.
pub trait Selection: Clone + fmt::Debug + Default + PartialEq + 'static {
    /// The item type held in the collection.
    type Item: Clone + fmt::Debug + PartialEq + 'static;

    /// Whether this shape holds more than one item.
    const MULTIPLE: bool;

    /// Selection after the user commits `item` from the menu.
    ///
    /// Single-select replaces; multi-select toggles membership.
    #[must_use]
    fn commit(&self, item: &Self::Item) -> Self;

    /// Selection with `item` present. Never removes anything.
    #[must_use]
    fn insert(&self, item: &Self::Item) -> Self;

    /// Selection with `item` absent.
    #[must_use]
    fn remove(&self, item: &Self::Item) -> Self;

    /// Selection without the entry at `index`. Out of range is a no-op.
    #[must_use]
    fn remove_at(&self, index: usize) -> Self;

    /// Selection without its most recent entry.
    #[must_use]
    fn pop_last(&self) -> Self;

    /// Whether nothing is selected.
    fn is_empty(&self) -> bool;

    /// Number of selected items.
    fn len(&self) -> usize;

    /// Whether `item` is currently selected.
    fn contains(&self, item: &Self::Item) -> bool;

    /// The most recently selected item, used for status messages.
    fn latest(&self) -> Option<&Self::Item>;

    /// The item whose position seeds the highlight when the menu opens.
    fn anchor(&self) -> Option<&Self::Item>;

    /// Input text derived from this selection.
    fn derived_input(&self, item_to_string: &dyn Fn(&Self::Item) -> String) -> String;
}

impl<T: Clone + fmt::Debug + PartialEq + 'static> Selection for Option<T> {
    type Item = T;
    const MULTIPLE: bool = false;

    fn commit(&self, item: &T) -> Self {
        Some(item.clone())
    }

    fn insert(&self, item: &T) -> Self {
        Some(item.clone())
    }

    fn remove(&self, item: &T) -> Self {
        match self {
            Some(current) if current == item => None,
            other => other.clone(),
        }
    }

    fn remove_at(&self, index: usize) -> Self {
        if index == 0 { None } else { self.clone() }
    }

    fn pop_last(&self) -> Self {
        None
    }

    fn is_empty(&self) -> bool {
        self.is_none()
    }

    fn len(&self) -> usize {
        usize::from(self.is_some())
    }

    fn contains(&self, item: &T) -> bool {
        self.as_ref() == Some(item)
    }

    fn latest(&self) -> Option<&T> {
        self.as_ref()
    }

    fn anchor(&self) -> Option<&T> {
        self.as_ref()
    }

    fn derived_input(&self, item_to_string: &dyn Fn(&T) -> String) -> String {
        self.as_ref().map(item_to_string).unwrap_or_default()
    }
}

impl<T: Clone + fmt::Debug + PartialEq + 'static> Selection for Vec<T> {
    type Item = T;
    const MULTIPLE: bool = true;

    fn commit(&self, item: &T) -> Self {
        if self.contains(item) {
            Selection::remove(self, item)
        } else {
            Selection::insert(self, item)
        }
    }

    fn insert(&self, item: &T) -> Self {
        let mut next = self.clone();
        if !next.contains(item) {
            next.push(item.clone());
        }
        next
    }

    fn remove(&self, item: &T) -> Self {
        self.iter().filter(|it| *it != item).cloned().collect()
    }

    fn remove_at(&self, index: usize) -> Self {
        let mut next = self.clone();
        if index < next.len() {
            Vec::remove(&mut next, index);
        }
        next
    }

    fn pop_last(&self) -> Self {
        let mut next = self.clone();
        next.pop();
        next
    }

    fn is_empty(&self) -> bool {
        <[T]>::is_empty(self)
    }

    fn len(&self) -> usize {
        <[T]>::len(self)
    }

    fn contains(&self, item: &T) -> bool {
        <[T]>::contains(self, item)
    }

    fn latest(&self) -> Option<&T> {
        self.last()
    }

    fn anchor(&self) -> Option<&T> {
        None
    }

    // Tags render the selection; the input stays free for filtering.
    fn derived_input(&self, _item_to_string: &dyn Fn(&T) -> String) -> String {
        String::new()
    }
}

/// The canonical widget state.
///
/// `highlighted_index` may briefly point past a freshly shrunk collection;
/// navigation normalizes it to `None` the next time it reads it.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct InteractionState<S> {
    pub is_open: bool,
    pub highlighted_index: Option<usize>,
    pub input_value: String,
    pub selection: S,
}

impl<S: Selection> InteractionState<S> {
    /// The fields whose value differs between `self` and `next`.
    #[must_use]
    pub fn diff(&self, next: &Self) -> Fields {
        let mut changed = Fields::empty();
        changed.set(Fields::IS_OPEN, self.is_open != next.is_open);
        changed.set(
            Fields::HIGHLIGHTED_INDEX,
            self.highlighted_index != next.highlighted_index,
        );
        changed.set(Fields::INPUT_VALUE, self.input_value != next.input_value);
        changed.set(Fields::SELECTION, self.selection != next.selection);
        changed
    }

    /// Copy the fields named in `fields` from `other` into `self`.
    pub fn apply(&mut self, other: &Self, fields: Fields) {
        if fields.contains(Fields::IS_OPEN) {
            self.is_open = other.is_open;
        }
        if fields.contains(Fields::HIGHLIGHTED_INDEX) {
            self.highlighted_index = other.highlighted_index;
        }
        if fields.contains(Fields::INPUT_VALUE) {
            self.input_value.clone_from(&other.input_value);
        }
        if fields.contains(Fields::SELECTION) {
            self.selection = other.selection.clone();
        }
    }
}
