#![forbid(unsafe_code)]

//! Items and identifiers.
//!
//! [`ItemRegistry`] is the per-render view of the collection. The renderer
//! replaces its items every cycle; only the caller's count override
//! survives, which lets windowed or async lists report a total larger than
//! what is materialized.
//!
//! [`Ids`] are the element ids tying root, label, input, toggle button,
//! menu and items together. They are generated once per session.

use std::fmt;
use std::rc::Rc;
use std::sync::atomic::{AtomicU64, Ordering};

use crate::navigator::normalize;

/// The current collection plus an optional authoritative count.
#[derive(Debug, Clone)]
pub struct ItemRegistry<T> {
    items: Vec<T>,
    count_override: Option<usize>,
}

impl<T> Default for ItemRegistry<T> {
    fn default() -> Self {
        Self::new(Vec::new())
    }
}

impl<T> ItemRegistry<T> {
    #[must_use]
    pub fn new(items: Vec<T>) -> Self {
        Self {
            items,
            count_override: None,
        }
    }

    /// Replace the materialized items, keeping the count override.
    pub fn rebuild(&mut self, items: Vec<T>) {
        self.items = items;
    }

    /// Set or clear the externally supplied item count.
    pub fn set_count_override(&mut self, count: Option<usize>) {
        self.count_override = count;
    }

    #[must_use]
    pub fn count_override(&self) -> Option<usize> {
        self.count_override
    }

    /// Number of navigable positions.
    #[must_use]
    pub fn count(&self) -> usize {
        self.count_override.unwrap_or(self.items.len())
    }

    #[must_use]
    pub fn items(&self) -> &[T] {
        &self.items
    }

    /// The item at `index`, if it is materialized.
    #[must_use]
    pub fn item(&self, index: usize) -> Option<&T> {
        self.items.get(index)
    }

    /// Whether `index` is disabled. Positions past the materialized items
    /// count as enabled; committing them is still a no-op.
    #[must_use]
    pub fn is_disabled(&self, index: usize, is_item_disabled: &dyn Fn(&T, usize) -> bool) -> bool {
        self.item(index).is_some_and(|item| is_item_disabled(item, index))
    }
}

impl<T: PartialEq> ItemRegistry<T> {
    /// Position of `item` in the collection.
    #[must_use]
    pub fn index_of(&self, item: &T) -> Option<usize> {
        self.items.iter().position(|candidate| candidate == item)
    }

    /// Typeahead lookup: the next enabled item whose label starts with
    /// `prefix`, ignoring case.
    ///
    /// A one-character prefix starts searching after `highlighted` so that
    /// repeating a letter cycles through matches. Longer prefixes start at
    /// `highlighted` so the current match sticks while it still matches.
    #[must_use]
    pub fn find_by_prefix(
        &self,
        prefix: &str,
        highlighted: Option<usize>,
        item_to_string: &dyn Fn(&T) -> String,
        is_item_disabled: &dyn Fn(&T, usize) -> bool,
    ) -> Option<usize> {
        let len = self.items.len().min(self.count());
        if len == 0 || prefix.is_empty() {
            return None;
        }
        let needle = prefix.to_lowercase();
        let skip_current = usize::from(prefix.chars().count() < 2);
        let start = normalize(highlighted, len).map_or(0, |i| i + skip_current);
        (0..len)
            .map(|offset| (start + offset) % len)
            .find(|&index| {
                let item = &self.items[index];
                !is_item_disabled(item, index)
                    && item_to_string(item).to_lowercase().starts_with(&needle)
            })
    }
}

/// Caller-supplied item id function.
pub type ItemIdFn = Rc<dyn Fn(usize) -> String>;

/// Overrides for generated ids. Unset entries are derived from `prefix` or
/// from a fresh process-wide counter.
#[derive(Clone, Default)]
pub struct IdConfig {
    pub prefix: Option<String>,
    pub root: Option<String>,
    pub label: Option<String>,
    pub input: Option<String>,
    pub toggle_button: Option<String>,
    pub menu: Option<String>,
    pub item: Option<ItemIdFn>,
}

impl fmt::Debug for IdConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("IdConfig")
            .field("prefix", &self.prefix)
            .field("root", &self.root)
            .field("label", &self.label)
            .field("input", &self.input)
            .field("toggle_button", &self.toggle_button)
            .field("menu", &self.menu)
            .field("item", &self.item.as_ref().map(|_| ".."))
            .finish()
    }
}

impl IdConfig {
    #[must_use]
    pub fn with_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.prefix = Some(prefix.into());
        self
    }

    #[must_use]
    pub fn with_menu(mut self, id: impl Into<String>) -> Self {
        self.menu = Some(id.into());
        self
    }

    #[must_use]
    pub fn with_input(mut self, id: impl Into<String>) -> Self {
        self.input = Some(id.into());
        self
    }

    #[must_use]
    pub fn with_item(mut self, item: impl Fn(usize) -> String + 'static) -> Self {
        self.item = Some(Rc::new(item));
        self
    }
}

static NEXT_ID: AtomicU64 = AtomicU64::new(0);

fn next_prefix() -> String {
    format!("selectkit-{}", NEXT_ID.fetch_add(1, Ordering::Relaxed))
}

/// Element ids for one widget instance.
#[derive(Clone)]
pub struct Ids {
    pub root: String,
    pub label: String,
    pub input: String,
    pub toggle_button: String,
    pub menu: String,
    prefix: String,
    item: Option<ItemIdFn>,
}

impl fmt::Debug for Ids {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Ids")
            .field("root", &self.root)
            .field("label", &self.label)
            .field("input", &self.input)
            .field("toggle_button", &self.toggle_button)
            .field("menu", &self.menu)
            .finish_non_exhaustive()
    }
}

impl Ids {
    /// Build ids, drawing a fresh counter value only when no prefix is given.
    #[must_use]
    pub fn generate(config: &IdConfig) -> Self {
        let prefix = config.prefix.clone().unwrap_or_else(next_prefix);
        let pick = |explicit: &Option<String>, suffix: &str| {
            explicit.clone().unwrap_or_else(|| format!("{prefix}-{suffix}"))
        };
        Self {
            root: pick(&config.root, "root"),
            label: pick(&config.label, "label"),
            input: pick(&config.input, "input"),
            toggle_button: pick(&config.toggle_button, "toggle-button"),
            menu: pick(&config.menu, "menu"),
            item: config.item.clone(),
            prefix,
        }
    }

    /// Id of the item element at `index`.
    #[must_use]
    pub fn item(&self, index: usize) -> String {
        match &self.item {
            Some(item_id) => item_id(index),
            None => format!("{}-item-{index}", self.prefix),
        }
    }

    /// Id of the live region the status announcer writes to.
    #[must_use]
    pub fn status(&self) -> String {
        format!("{}-a11y-status", self.prefix)
    }
}
