//! End-to-end session behavior against an in-memory environment.
//!
//! Each test builds a small document (root, input, toggle button, menu,
//! items, plus one unrelated node), wires listeners that record what they
//! see, and drives the session the way a host would.

use std::cell::RefCell;
use std::rc::Rc;
use std::time::Duration;

use pretty_assertions::assert_eq;
use selectkit::{
    Action, ActionKind, Controlled, Fields, IdConfig, InteractionState, Session, SessionConfig,
    Surface,
};
use selectkit_core::environment::{Environment, MemoryEnvironment, NodeId};
use selectkit_core::event::{EnvEvent, KeyCode, KeyEvent, Modifiers, PointerEvent, TouchEvent};

type Single = Option<&'static str>;
type Multi = Vec<&'static str>;

// ── Fixture ─────────────────────────────────────────────────────────────

struct Document {
    env: MemoryEnvironment,
    input: NodeId,
    menu: NodeId,
    items: Vec<NodeId>,
    outside: NodeId,
}

fn document(item_count: usize) -> Document {
    let mut env = MemoryEnvironment::new();
    let body = env.body();
    let root = env.append(body, Some("w-root"));
    let input = env.append(root, Some("w-input"));
    env.append(root, Some("w-toggle-button"));
    let menu = env.append(body, Some("w-menu"));
    let items = (0..item_count)
        .map(|i| env.append(menu, Some(format!("w-item-{i}").as_str())))
        .collect();
    let outside = env.append(body, None);
    Document {
        env,
        input,
        menu,
        items,
        outside,
    }
}

fn ms(n: u64) -> Duration {
    Duration::from_millis(n)
}

/// Records `(kind, changes)` for every notification of one listener.
#[derive(Clone, Default)]
struct Recorder(Rc<RefCell<Vec<(ActionKind, Fields)>>>);

impl Recorder {
    fn push(&self, kind: ActionKind, changes: Fields) {
        self.0.borrow_mut().push((kind, changes));
    }

    fn len(&self) -> usize {
        self.0.borrow().len()
    }

    fn take(&self) -> Vec<(ActionKind, Fields)> {
        std::mem::take(&mut *self.0.borrow_mut())
    }
}

struct Listeners {
    /// Which listener ran, in call order, across all four.
    order: Rc<RefCell<Vec<&'static str>>>,
    fields: Rc<RefCell<Vec<Fields>>>,
    state: Recorder,
    selection: Recorder,
    action: Recorder,
}

fn listen<S: selectkit::Selection>(config: SessionConfig<S>) -> (SessionConfig<S>, Listeners) {
    let listeners = Listeners {
        order: Rc::default(),
        fields: Rc::default(),
        state: Recorder::default(),
        selection: Recorder::default(),
        action: Recorder::default(),
    };
    let fields = Rc::clone(&listeners.fields);
    let state = listeners.state.clone();
    let selection = listeners.selection.clone();
    let action = listeners.action.clone();
    let [field_order, state_order, selection_order, action_order] =
        [(); 4].map(|()| Rc::clone(&listeners.order));
    let config = config
        .on_field_change(move |field, _| {
            field_order.borrow_mut().push("field");
            fields.borrow_mut().push(field);
        })
        .on_state_change(move |change| {
            state_order.borrow_mut().push("state");
            state.push(change.kind, change.changes);
        })
        .on_selection_change(move |change| {
            selection_order.borrow_mut().push("selection");
            selection.push(change.kind, change.changes);
        })
        .on_action(move |change| {
            action_order.borrow_mut().push("action");
            action.push(change.kind, change.changes);
        });
    (config, listeners)
}

fn combobox() -> SessionConfig<Single> {
    SessionConfig::combobox().with_ids(IdConfig::default().with_prefix("w"))
}

fn abc(config: SessionConfig<Single>, doc: Document) -> Session<Single, MemoryEnvironment> {
    let mut session = Session::new(config, vec!["a", "b", "c"], doc.env);
    session.mount();
    session
}

fn key(code: KeyCode) -> KeyEvent {
    KeyEvent::new(code)
}

// ═════════════════════════════════════════════════════════════════════════
// Scenario A: arrow down opens on the first item
// ═════════════════════════════════════════════════════════════════════════

#[test]
fn scenario_a_arrow_down_opens_on_first_item() {
    let mut session = abc(combobox(), document(3));
    let changes = session.handle_key(Surface::Input, &key(KeyCode::Down));
    assert_eq!(
        changes,
        Some(Fields::IS_OPEN | Fields::HIGHLIGHTED_INDEX)
    );
    let state = session.state();
    assert!(state.is_open);
    assert_eq!(state.highlighted_index, Some(0));
}

// ═════════════════════════════════════════════════════════════════════════
// Scenario B: navigation wraps past the end
// ═════════════════════════════════════════════════════════════════════════

#[test]
fn scenario_b_arrow_down_wraps_to_first() {
    let config = combobox()
        .with_initial_is_open(true)
        .with_initial_highlighted_index(2);
    let mut session = abc(config, document(3));
    session.handle_key(Surface::Input, &key(KeyCode::Down));
    assert_eq!(session.state().highlighted_index, Some(0));
    assert!(session.state().is_open);

    session.handle_key(Surface::Input, &key(KeyCode::Up));
    assert_eq!(session.state().highlighted_index, Some(2));
}

// ═════════════════════════════════════════════════════════════════════════
// Scenario C: commit fires exactly one selection notification
// ═════════════════════════════════════════════════════════════════════════

#[test]
fn scenario_c_commit_selects_and_notifies_once() {
    let config = combobox()
        .with_initial_is_open(true)
        .with_initial_highlighted_index(1);
    let (config, listeners) = listen(config);
    let mut session = abc(config, document(3));

    session.handle_key(Surface::Input, &key(KeyCode::Enter));

    assert_eq!(
        session.state(),
        InteractionState {
            is_open: false,
            highlighted_index: None,
            input_value: "b".into(),
            selection: Some("b"),
        }
    );
    assert_eq!(
        listeners.selection.take(),
        vec![(ActionKind::InputKeyDownEnter, Fields::all())]
    );
    assert_eq!(
        *listeners.fields.borrow(),
        vec![
            Fields::IS_OPEN,
            Fields::HIGHLIGHTED_INDEX,
            Fields::INPUT_VALUE,
            Fields::SELECTION,
        ]
    );
    assert_eq!(
        *listeners.order.borrow(),
        vec!["field", "field", "field", "field", "state", "selection", "action"]
    );
}

// ═════════════════════════════════════════════════════════════════════════
// Scenario D: the override hook's output is what gets applied
// ═════════════════════════════════════════════════════════════════════════

#[test]
fn scenario_d_override_clamps_navigation() {
    let config = combobox()
        .with_initial_is_open(true)
        .with_initial_highlighted_index(6)
        .with_state_reducer(|_, proposal| {
            let mut changes = proposal.changes;
            if matches!(
                proposal.action.kind(),
                ActionKind::InputKeyDownArrowDown | ActionKind::InputKeyDownArrowUp
            ) {
                changes.is_open = true;
                if changes.highlighted_index.is_some_and(|i| i > 4) {
                    changes.highlighted_index = Some(4);
                }
            }
            changes
        });
    let seen = Rc::new(RefCell::new(Vec::new()));
    let sink = Rc::clone(&seen);
    let config = config.on_state_change(move |change| {
        sink.borrow_mut().push(change.state.highlighted_index);
    });
    let items: Vec<&'static str> = vec!["0", "1", "2", "3", "4", "5", "6", "7", "8", "9"];
    let mut session = Session::new(config, items, document(10).env);

    session.dispatch(Action::InputKeyDownArrowDown {
        shift: false,
        alt: false,
    });

    assert_eq!(session.state().highlighted_index, Some(4));
    assert!(session.state().is_open);
    assert_eq!(*seen.borrow(), vec![Some(4)]);
}

// ═════════════════════════════════════════════════════════════════════════
// Scenario E: outside press-and-release resets an open widget once
// ═════════════════════════════════════════════════════════════════════════

#[test]
fn scenario_e_outside_click_resets_only_when_open() {
    let doc = document(3);
    let outside = doc.outside;
    let (config, listeners) = listen(combobox().with_initial_is_open(true));
    let mut session = abc(config, doc);

    let down = EnvEvent::Pointer(PointerEvent::down(Some(outside)));
    let up = EnvEvent::Pointer(PointerEvent::up(Some(outside)));
    assert_eq!(session.handle_environment_event(&down), None);
    assert_eq!(
        session.handle_environment_event(&up),
        Some(Fields::IS_OPEN)
    );
    assert!(!session.state().is_open);
    assert_eq!(
        listeners.state.take(),
        vec![(ActionKind::OutsideMouseUp, Fields::IS_OPEN)]
    );

    // Closed: the same gesture produces nothing.
    assert_eq!(session.handle_environment_event(&down), None);
    assert_eq!(session.handle_environment_event(&up), None);
    assert_eq!(listeners.state.len(), 0);
    assert_eq!(listeners.action.len(), 1);
}

#[test]
fn click_inside_menu_is_not_outside() {
    let doc = document(3);
    let item = doc.items[1];
    let mut session = abc(combobox().with_initial_is_open(true), doc);
    let up = EnvEvent::Pointer(PointerEvent::up(Some(item)));
    assert_eq!(session.handle_environment_event(&up), None);
    assert!(session.state().is_open);
}

#[test]
fn touch_swipe_outside_does_not_close() {
    let doc = document(3);
    let outside = doc.outside;
    let mut session = abc(combobox().with_initial_is_open(true), doc);
    session.handle_environment_event(&EnvEvent::Touch(TouchEvent::start(Some(outside))));
    session.handle_environment_event(&EnvEvent::Touch(TouchEvent::moved(Some(outside))));
    session.handle_environment_event(&EnvEvent::Touch(TouchEvent::end(Some(outside))));
    assert!(session.state().is_open);

    session.handle_environment_event(&EnvEvent::Touch(TouchEvent::start(Some(outside))));
    let changes =
        session.handle_environment_event(&EnvEvent::Touch(TouchEvent::end(Some(outside))));
    assert_eq!(changes, Some(Fields::IS_OPEN));
}

// ═════════════════════════════════════════════════════════════════════════
// Idempotence and no-op commits
// ═════════════════════════════════════════════════════════════════════════

#[test]
fn repeated_close_only_notifies_the_action() {
    let (config, listeners) = listen(combobox().with_initial_is_open(true));
    let mut session = abc(config, document(3));

    assert_eq!(session.dispatch(Action::FunctionCloseMenu), Fields::IS_OPEN);
    assert_eq!(session.dispatch(Action::FunctionCloseMenu), Fields::empty());

    assert_eq!(listeners.state.len(), 1);
    assert_eq!(listeners.action.len(), 2);
}

#[test]
fn commit_without_highlight_is_a_noop() {
    let (config, listeners) = listen(combobox().with_initial_is_open(true));
    let mut session = abc(config, document(3));

    let changes = session.dispatch(Action::FunctionSelectHighlighted);

    assert_eq!(changes, Fields::empty());
    assert_eq!(session.state().selection, None);
    assert_eq!(listeners.fields.borrow().len(), 0);
    assert_eq!(listeners.state.len(), 0);
    assert_eq!(listeners.selection.len(), 0);
    assert_eq!(
        listeners.action.take(),
        vec![(ActionKind::FunctionSelectHighlighted, Fields::empty())]
    );
}

#[test]
fn selection_predicate_gates_notification() {
    let config = combobox()
        .with_initial_is_open(true)
        .with_initial_highlighted_index(0)
        .with_selection_changed(|_, _| false);
    let (config, listeners) = listen(config);
    let mut session = abc(config, document(3));
    let changes = session.dispatch(Action::FunctionSelectHighlighted);
    assert!(changes.contains(Fields::SELECTION));
    assert_eq!(listeners.selection.len(), 0);
    assert_eq!(listeners.state.len(), 1);
}

// ═════════════════════════════════════════════════════════════════════════
// Controlled props
// ═════════════════════════════════════════════════════════════════════════

#[test]
fn controlled_field_shows_prop_and_parks_proposals() {
    let (config, listeners) = listen(combobox());
    let mut session = abc(config, document(3));
    session.set_props(Controlled::none().with_is_open(true));
    assert!(session.state().is_open);

    // The reducer proposes a close; the prop still wins, but the other
    // fields move and listeners hear about the proposal.
    let changes = session.dispatch(Action::InputChange { value: "b".into() });
    assert_eq!(changes, Fields::INPUT_VALUE);
    let changes = session.dispatch(Action::InputKeyDownEscape);
    assert!(changes.contains(Fields::IS_OPEN));
    assert!(session.state().is_open);
    assert_eq!(session.state().input_value, "");
    assert_eq!(listeners.state.len(), 2);

    // Releasing control reveals the parked value.
    session.set_props(Controlled::none());
    assert!(!session.state().is_open);
}

#[test]
fn controlled_selection_change_rederives_input() {
    let mut session = abc(combobox(), document(3));
    session.set_props(Controlled::none().with_selection(Some("c")));
    let state = session.state();
    assert_eq!(state.selection, Some("c"));
    assert_eq!(state.input_value, "c");

    // Same prop again: nothing to re-derive.
    session.dispatch(Action::FunctionSetInputValue {
        value: "typed".into(),
    });
    session.set_props(Controlled::none().with_selection(Some("c")));
    assert_eq!(session.state().input_value, "typed");
}

#[test]
fn controlled_highlight_ignores_internal_moves() {
    let mut session = abc(combobox().with_initial_is_open(true), document(3));
    session.set_props(Controlled::none().with_highlighted_index(Some(1)));
    session.handle_key(Surface::Input, &key(KeyCode::Down));
    assert_eq!(session.state().highlighted_index, Some(1));
}

// ═════════════════════════════════════════════════════════════════════════
// Blur
// ═════════════════════════════════════════════════════════════════════════

#[test]
fn blur_to_outside_commits_highlight_after_settle() {
    let doc = document(3);
    let outside = doc.outside;
    let config = combobox()
        .with_initial_is_open(true)
        .with_initial_highlighted_index(1);
    let mut session = abc(config, doc);

    session.environment_mut().focus(Some(outside));
    session.handle_blur(Surface::Input);
    assert!(session.state().is_open, "blur waits for the settle timer");

    session.advance(Duration::ZERO);
    let state = session.state();
    assert!(!state.is_open);
    assert_eq!(state.selection, Some("b"));
    assert_eq!(state.input_value, "b");
}

#[test]
fn blur_without_select_on_blur_keeps_selection() {
    let doc = document(3);
    let outside = doc.outside;
    let config = combobox()
        .with_initial_is_open(true)
        .with_initial_highlighted_index(1)
        .with_select_on_blur(false);
    let mut session = abc(config, doc);
    session.environment_mut().focus(Some(outside));
    session.handle_blur(Surface::Input);
    session.advance(Duration::ZERO);
    assert!(!session.state().is_open);
    assert_eq!(session.state().selection, None);
}

#[test]
fn blur_into_widget_or_during_press_is_ignored() {
    let doc = document(3);
    let (input, outside, item) = (doc.input, doc.outside, doc.items[0]);
    let mut session = abc(combobox().with_initial_is_open(true), doc);

    session.environment_mut().focus(Some(input));
    session.handle_blur(Surface::ToggleButton);
    session.advance(Duration::ZERO);
    assert!(session.state().is_open);

    // A press on an item blurs the input before the click lands.
    session.handle_environment_event(&EnvEvent::Pointer(PointerEvent::down(Some(item))));
    session.environment_mut().focus(Some(outside));
    session.handle_blur(Surface::Input);
    session.advance(Duration::ZERO);
    assert!(session.state().is_open);
}

// ═════════════════════════════════════════════════════════════════════════
// Status announcements
// ═════════════════════════════════════════════════════════════════════════

const THREE_RESULTS: &str =
    "3 results are available, use up and down arrow keys to navigate. Press Enter key to select.";

#[test]
fn status_is_debounced_then_cleared() {
    let mut session = abc(combobox(), document(3));
    session.handle_key(Surface::Input, &key(KeyCode::Down));
    assert_eq!(session.environment().element_by_id("w-a11y-status"), None);

    session.advance(ms(199));
    assert_eq!(session.environment().element_by_id("w-a11y-status"), None);

    session.advance(ms(1));
    let region = session
        .environment()
        .element_by_id("w-a11y-status")
        .expect("live region after publish");
    assert_eq!(session.environment().text_of(region), Some(THREE_RESULTS));

    session.advance(ms(500));
    assert_eq!(session.environment().text_of(region), Some(""));
}

#[test]
fn last_status_message_wins() {
    let config = combobox()
        .with_initial_is_open(true)
        .with_initial_highlighted_index(2);
    let mut session = abc(config, document(3));
    session.dispatch(Action::FunctionSetItemCount { count: Some(3) });
    session.advance(ms(50));
    session.handle_key(Surface::Input, &key(KeyCode::Enter));
    session.advance(ms(200));
    let region = session
        .environment()
        .element_by_id("w-a11y-status")
        .expect("live region");
    assert_eq!(
        session.environment().text_of(region),
        Some("c has been selected.")
    );
}

#[test]
fn custom_status_composer_is_used() {
    let config = combobox().with_status_message(|ctx| {
        if ctx.state.is_open {
            format!("{} options", ctx.result_count)
        } else {
            String::new()
        }
    });
    let mut session = abc(config, document(3));
    session.dispatch(Action::FunctionOpenMenu);
    session.advance(ms(200));
    let region = session
        .environment()
        .element_by_id("w-a11y-status")
        .expect("live region");
    assert_eq!(session.environment().text_of(region), Some("3 options"));
}

// ═════════════════════════════════════════════════════════════════════════
// Scrolling
// ═════════════════════════════════════════════════════════════════════════

#[test]
fn keyboard_highlight_scrolls_but_hover_does_not() {
    let doc = document(3);
    let (menu, first, second) = (doc.menu, doc.items[0], doc.items[1]);
    let mut session = abc(combobox(), doc);

    session.handle_key(Surface::Input, &key(KeyCode::Down));
    assert_eq!(session.environment().scroll_requests(), &[(first, menu)]);

    session.dispatch(Action::ItemMouseMove { index: 1 });
    assert_eq!(session.state().highlighted_index, Some(1));
    assert_eq!(session.environment().scroll_requests().len(), 1);

    session.handle_key(Surface::Input, &key(KeyCode::Up));
    session.handle_key(Surface::Input, &key(KeyCode::Down));
    assert_eq!(session.environment().scroll_requests().last(), Some(&(second, menu)));
}

// ═════════════════════════════════════════════════════════════════════════
// Select typeahead
// ═════════════════════════════════════════════════════════════════════════

#[test]
fn typeahead_highlights_and_buffer_expires() {
    let config = SessionConfig::<Single>::select().with_ids(IdConfig::default().with_prefix("w"));
    let mut session = Session::new(
        config,
        vec!["apple", "banana", "blueberry", "cherry"],
        document(4).env,
    );
    session.mount();

    session.handle_key(Surface::ToggleButton, &key(KeyCode::Char('b')));
    assert_eq!(session.state().highlighted_index, Some(1));
    session.advance(ms(300));
    session.handle_key(Surface::ToggleButton, &key(KeyCode::Char('l')));
    assert_eq!(session.state().highlighted_index, Some(2));
    assert_eq!(session.state().input_value, "bl");

    // The buffer lives for 500ms after the last key.
    session.advance(ms(300));
    assert_eq!(session.state().input_value, "bl");
    session.advance(ms(200));
    assert_eq!(session.state().input_value, "");
    assert_eq!(session.state().highlighted_index, Some(2));

    session.handle_key(Surface::ToggleButton, &key(KeyCode::Char(' ')));
    let state = session.state();
    assert_eq!(state.selection, Some("blueberry"));
    assert!(!state.is_open);
}

#[test]
fn keys_outside_the_map_pass_through() {
    let mut session = abc(combobox(), document(3));
    assert_eq!(session.handle_key(Surface::Input, &key(KeyCode::Tab)), None);
    assert_eq!(
        session.handle_key(Surface::ToggleButton, &key(KeyCode::Down)),
        None
    );
    let shortcut = key(KeyCode::Char('a')).with_modifiers(Modifiers::CTRL);
    assert_eq!(session.handle_key(Surface::Input, &shortcut), None);
}

// ═════════════════════════════════════════════════════════════════════════
// Multi-select
// ═════════════════════════════════════════════════════════════════════════

#[test]
fn multi_blur_keeps_highlighted_selected_item() {
    let doc = document(3);
    let outside = doc.outside;
    let config = SessionConfig::<Multi>::multiple()
        .with_ids(IdConfig::default().with_prefix("w"))
        .with_initial_selection(vec!["b"])
        .with_initial_is_open(true)
        .with_initial_highlighted_index(1);
    let mut session = Session::new(config, vec!["a", "b", "c"], doc.env);
    session.mount();

    session.environment_mut().focus(Some(outside));
    session.handle_blur(Surface::Input);
    session.advance(Duration::ZERO);

    assert!(!session.state().is_open);
    assert_eq!(session.state().selection, vec!["b"]);
}

#[test]
fn multi_select_toggles_and_removes_tags() {
    let config = SessionConfig::<Multi>::multiple()
        .with_ids(IdConfig::default().with_prefix("w"))
        .with_initial_selection(vec!["a"]);
    let (config, listeners) = listen(config);
    let mut session = Session::new(config, vec!["a", "b", "c"], document(3).env);
    session.mount();

    session.dispatch(Action::ItemClick { index: 2 });
    assert_eq!(session.state().selection, vec!["a", "c"]);
    assert_eq!(session.state().input_value, "");

    session.handle_key(Surface::Input, &key(KeyCode::Backspace));
    assert_eq!(session.state().selection, vec!["a"]);

    session.dispatch(Action::RemoveSelectedItem { index: 0 });
    assert!(session.state().selection.is_empty());
    assert_eq!(listeners.selection.len(), 3);
}

// ═════════════════════════════════════════════════════════════════════════
// Lifecycle
// ═════════════════════════════════════════════════════════════════════════

#[test]
fn teardown_releases_everything() {
    let mut session = abc(combobox(), document(3));
    assert_eq!(session.environment().listener_count(), 5);

    session.handle_key(Surface::Input, &key(KeyCode::Down));
    session.advance(ms(200));
    session.handle_blur(Surface::Input);
    assert_eq!(session.environment().live_region_count(), 1);
    assert!(session.pending_timers() > 0);

    session.teardown();
    assert_eq!(session.environment().listener_count(), 0);
    assert_eq!(session.environment().live_region_count(), 0);
    assert_eq!(session.pending_timers(), 0);

    let before = session.state();
    session.advance(ms(10_000));
    session.handle_blur(Surface::Input);
    assert_eq!(session.dispatch(Action::FunctionToggleMenu), Fields::empty());
    assert_eq!(session.state(), before);
    assert_eq!(session.pending_timers(), 0);
}

#[test]
fn set_item_count_drives_navigation() {
    let mut session = abc(combobox().with_initial_is_open(true), document(3));
    session.dispatch(Action::FunctionSetItemCount { count: Some(50) });
    session.dispatch(Action::FunctionSetHighlightedIndex { index: Some(45) });
    session.handle_key(Surface::Input, &key(KeyCode::PageDown));
    assert_eq!(session.state().highlighted_index, Some(49));
    session.handle_key(Surface::Input, &key(KeyCode::Down));
    assert_eq!(session.state().highlighted_index, Some(0));
}
