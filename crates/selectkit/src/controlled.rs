#![forbid(unsafe_code)]

//! Per-field controlled/uncontrolled resolution.
//!
//! Each of the four state fields is decided on its own: if the caller
//! passed a value for it, that value wins; otherwise the session's internal
//! copy does. The merge runs on every read, so the effective state is never a
//! stale snapshot.
//!
//! The session keeps writing proposed values for controlled fields into its
//! internal copy. Those writes are *parked*: invisible while the prop is
//! present, and they never block writes to the other fields.

use crate::state::{Fields, InteractionState, Selection};

/// The authoritative value for one field.
#[inline]
#[must_use]
pub fn resolve<T: Clone>(internal: &T, external: Option<&T>) -> T {
    external.unwrap_or(internal).clone()
}

/// Caller-supplied values for the fields it controls.
///
/// `None` on a field means "uncontrolled". For `highlighted_index` the outer
/// `Option` is the control flag and the inner one the highlight itself.
#[derive(Clone, Debug, PartialEq)]
pub struct Controlled<S> {
    pub is_open: Option<bool>,
    pub highlighted_index: Option<Option<usize>>,
    pub input_value: Option<String>,
    pub selection: Option<S>,
}

impl<S> Default for Controlled<S> {
    fn default() -> Self {
        Self {
            is_open: None,
            highlighted_index: None,
            input_value: None,
            selection: None,
        }
    }
}

impl<S: Selection> Controlled<S> {
    /// Nothing controlled.
    #[must_use]
    pub fn none() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with_is_open(mut self, is_open: bool) -> Self {
        self.is_open = Some(is_open);
        self
    }

    #[must_use]
    pub fn with_highlighted_index(mut self, index: Option<usize>) -> Self {
        self.highlighted_index = Some(index);
        self
    }

    #[must_use]
    pub fn with_input_value(mut self, value: impl Into<String>) -> Self {
        self.input_value = Some(value.into());
        self
    }

    #[must_use]
    pub fn with_selection(mut self, selection: S) -> Self {
        self.selection = Some(selection);
        self
    }

    /// Field-wise merge over the session's internal copy.
    #[must_use]
    pub fn merge(&self, internal: &InteractionState<S>) -> InteractionState<S> {
        InteractionState {
            is_open: resolve(&internal.is_open, self.is_open.as_ref()),
            highlighted_index: resolve(
                &internal.highlighted_index,
                self.highlighted_index.as_ref(),
            ),
            input_value: resolve(&internal.input_value, self.input_value.as_ref()),
            selection: resolve(&internal.selection, self.selection.as_ref()),
        }
    }

    /// The set of controlled fields.
    #[must_use]
    pub fn fields(&self) -> Fields {
        let mut fields = Fields::empty();
        fields.set(Fields::IS_OPEN, self.is_open.is_some());
        fields.set(Fields::HIGHLIGHTED_INDEX, self.highlighted_index.is_some());
        fields.set(Fields::INPUT_VALUE, self.input_value.is_some());
        fields.set(Fields::SELECTION, self.selection.is_some());
        fields
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn internal() -> InteractionState<Option<&'static str>> {
        InteractionState {
            is_open: true,
            highlighted_index: Some(3),
            input_value: "typed".into(),
            selection: Some("b"),
        }
    }

    #[test]
    fn resolve_prefers_external() {
        assert_eq!(resolve(&1, Some(&2)), 2);
        assert_eq!(resolve(&1, None), 1);
    }

    #[test]
    fn uncontrolled_merge_is_internal() {
        let state = internal();
        assert_eq!(Controlled::<Option<&str>>::none().merge(&state), state);
        assert!(Controlled::<Option<&str>>::none().fields().is_empty());
    }

    #[test]
    fn merge_is_per_field() {
        let props = Controlled::<Option<&str>>::none()
            .with_is_open(false)
            .with_selection(None);
        let merged = props.merge(&internal());
        assert!(!merged.is_open);
        assert_eq!(merged.selection, None);
        // Uncontrolled fields still come from internal tracking.
        assert_eq!(merged.highlighted_index, Some(3));
        assert_eq!(merged.input_value, "typed");
        assert_eq!(props.fields(), Fields::IS_OPEN | Fields::SELECTION);
    }

    #[test]
    fn controlled_sentinel_highlight_is_distinct_from_uncontrolled() {
        let props = Controlled::<Option<&str>>::none().with_highlighted_index(None);
        assert_eq!(props.merge(&internal()).highlighted_index, None);
        assert!(props.fields().contains(Fields::HIGHLIGHTED_INDEX));
    }
}
