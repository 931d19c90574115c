#![forbid(unsafe_code)]

//! The host environment contract.
//!
//! A selection widget needs a small slice of a document: look up elements by
//! id, ask which element has focus, test containment, subscribe to
//! document-level pointer/touch events, and create one live region for
//! screen-reader announcements. [`Environment`] is that slice.
//!
//! Browser hosts implement it over the real DOM. Terminal and headless hosts
//! use [`MemoryEnvironment`], a plain node tree.
//!
//! # Subscription model
//!
//! `add_event_listener` only records interest; the host is still the one
//! that forwards matching [`EnvEvent`](crate::event::EnvEvent)s to the
//! widget. A host must stop forwarding kinds whose listeners were removed.

use std::collections::HashMap;
use std::fmt;

use crate::event::EnvEventKind;

/// Opaque handle to an element in the host's tree.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(u64);

impl NodeId {
    /// Wrap a raw host handle.
    #[must_use]
    pub const fn new(raw: u64) -> Self {
        Self(raw)
    }

    /// The raw host handle.
    #[must_use]
    pub const fn get(self) -> u64 {
        self.0
    }
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Handle for one registered listener.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ListenerId(u64);

impl ListenerId {
    /// Wrap a raw listener handle.
    #[must_use]
    pub const fn new(raw: u64) -> Self {
        Self(raw)
    }
}

/// DOM-like services a selection widget consumes.
pub trait Environment {
    /// Register interest in a document-level event kind.
    fn add_event_listener(&mut self, kind: EnvEventKind) -> ListenerId;

    /// Remove a listener. Unknown ids are ignored.
    fn remove_event_listener(&mut self, id: ListenerId);

    /// Resolve an element by its id attribute.
    fn element_by_id(&self, id: &str) -> Option<NodeId>;

    /// The element that currently has focus, if any.
    fn active_element(&self) -> Option<NodeId>;

    /// The document body.
    fn body(&self) -> NodeId;

    /// Whether `node` is `ancestor` or one of its descendants.
    fn contains(&self, ancestor: NodeId, node: NodeId) -> bool;

    /// Create a visually hidden `aria-live` status element under the body.
    ///
    /// Returns the existing node when an element with `id` already exists.
    fn create_live_region(&mut self, id: &str) -> NodeId;

    /// Replace an element's text content.
    fn set_text_content(&mut self, node: NodeId, text: &str);

    /// Detach an element from the tree.
    fn remove_element(&mut self, node: NodeId);

    /// Scroll `container` so that `node` is visible. Hosts without layout
    /// may leave this as a no-op.
    fn scroll_into_view(&mut self, node: NodeId, container: NodeId) {
        let _ = (node, container);
    }
}

#[derive(Debug, Clone)]
struct MemoryNode {
    parent: Option<NodeId>,
    dom_id: Option<String>,
    text: String,
    live_region: bool,
}

/// In-memory node tree implementing [`Environment`].
///
/// Used by terminal/headless hosts and throughout the test suites. Every
/// `scroll_into_view` request is recorded so callers can assert on it.
#[derive(Debug, Clone)]
pub struct MemoryEnvironment {
    nodes: HashMap<NodeId, MemoryNode>,
    by_dom_id: HashMap<String, NodeId>,
    body: NodeId,
    active: Option<NodeId>,
    listeners: HashMap<ListenerId, EnvEventKind>,
    next_node: u64,
    next_listener: u64,
    scroll_requests: Vec<(NodeId, NodeId)>,
}

impl Default for MemoryEnvironment {
    fn default() -> Self {
        Self::new()
    }
}

impl MemoryEnvironment {
    /// Create a document holding only a body element.
    #[must_use]
    pub fn new() -> Self {
        let body = NodeId::new(0);
        let mut nodes = HashMap::new();
        nodes.insert(
            body,
            MemoryNode {
                parent: None,
                dom_id: None,
                text: String::new(),
                live_region: false,
            },
        );
        Self {
            nodes,
            by_dom_id: HashMap::new(),
            body,
            active: None,
            listeners: HashMap::new(),
            next_node: 1,
            next_listener: 1,
            scroll_requests: Vec::new(),
        }
    }

    /// Append a child element, optionally with an id attribute.
    ///
    /// A detached or unknown `parent` falls back to the body.
    pub fn append(&mut self, parent: NodeId, dom_id: Option<&str>) -> NodeId {
        let parent = if self.nodes.contains_key(&parent) {
            parent
        } else {
            self.body
        };
        let node = NodeId::new(self.next_node);
        self.next_node += 1;
        if let Some(id) = dom_id {
            self.by_dom_id.insert(id.to_owned(), node);
        }
        self.nodes.insert(
            node,
            MemoryNode {
                parent: Some(parent),
                dom_id: dom_id.map(str::to_owned),
                text: String::new(),
                live_region: false,
            },
        );
        node
    }

    /// Move focus to `node` (or blur everything with `None`).
    pub fn focus(&mut self, node: Option<NodeId>) {
        self.active = node.filter(|n| self.nodes.contains_key(n));
    }

    /// Text content of an element.
    #[must_use]
    pub fn text_of(&self, node: NodeId) -> Option<&str> {
        self.nodes.get(&node).map(|n| n.text.as_str())
    }

    /// Number of currently registered listeners.
    #[must_use]
    pub fn listener_count(&self) -> usize {
        self.listeners.len()
    }

    /// Whether any listener for `kind` is registered.
    #[must_use]
    pub fn is_listening(&self, kind: EnvEventKind) -> bool {
        self.listeners.values().any(|k| *k == kind)
    }

    /// Every `(node, container)` pair passed to `scroll_into_view`.
    #[must_use]
    pub fn scroll_requests(&self) -> &[(NodeId, NodeId)] {
        &self.scroll_requests
    }

    /// Number of live-region elements currently attached.
    #[must_use]
    pub fn live_region_count(&self) -> usize {
        self.nodes.values().filter(|n| n.live_region).count()
    }

    fn parent_of(&self, node: NodeId) -> Option<NodeId> {
        self.nodes.get(&node).and_then(|n| n.parent)
    }
}

impl Environment for MemoryEnvironment {
    fn add_event_listener(&mut self, kind: EnvEventKind) -> ListenerId {
        let id = ListenerId::new(self.next_listener);
        self.next_listener += 1;
        self.listeners.insert(id, kind);
        id
    }

    fn remove_event_listener(&mut self, id: ListenerId) {
        self.listeners.remove(&id);
    }

    fn element_by_id(&self, id: &str) -> Option<NodeId> {
        self.by_dom_id.get(id).copied()
    }

    fn active_element(&self) -> Option<NodeId> {
        self.active
    }

    fn body(&self) -> NodeId {
        self.body
    }

    fn contains(&self, ancestor: NodeId, node: NodeId) -> bool {
        let mut cursor = Some(node);
        while let Some(current) = cursor {
            if current == ancestor {
                return true;
            }
            cursor = self.parent_of(current);
        }
        false
    }

    fn create_live_region(&mut self, id: &str) -> NodeId {
        if let Some(existing) = self.element_by_id(id) {
            return existing;
        }
        let body = self.body;
        let node = self.append(body, Some(id));
        if let Some(entry) = self.nodes.get_mut(&node) {
            entry.live_region = true;
        }
        node
    }

    fn set_text_content(&mut self, node: NodeId, text: &str) {
        if let Some(entry) = self.nodes.get_mut(&node) {
            entry.text.clear();
            entry.text.push_str(text);
        }
    }

    fn remove_element(&mut self, node: NodeId) {
        if node == self.body {
            return;
        }
        // Detach the whole subtree so stale ids stop resolving.
        let doomed: Vec<NodeId> = self
            .nodes
            .keys()
            .copied()
            .filter(|candidate| self.contains(node, *candidate))
            .collect();
        for id in doomed {
            if let Some(removed) = self.nodes.remove(&id)
                && let Some(dom_id) = removed.dom_id
            {
                self.by_dom_id.remove(&dom_id);
            }
            if self.active == Some(id) {
                self.active = None;
            }
        }
    }

    fn scroll_into_view(&mut self, node: NodeId, container: NodeId) {
        self.scroll_requests.push((node, container));
    }
}
