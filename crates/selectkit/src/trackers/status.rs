#![forbid(unsafe_code)]

//! Debounced accessibility status.
//!
//! After each transition the session composes a status string and hands it
//! to the [`StatusAnnouncer`]. Messages arriving within the quiet window
//! replace each other; only the last is written to the live region, which
//! is emptied again shortly after so repeated messages are re-announced.
//!
//! The live region is created lazily on first publish and removed on
//! teardown together with every pending timer.

use std::time::Duration;

use selectkit_core::environment::{Environment, NodeId};
use selectkit_core::timer::{Debouncer, TimerHandle, TimerQueue};

use crate::state::{InteractionState, Selection};
use crate::trackers::TimerPurpose;

/// Inputs to a status composer.
pub struct StatusContext<'a, S: Selection> {
    /// Effective state after the transition.
    pub state: &'a InteractionState<S>,
    /// Result count at the previous announcement.
    pub previous_result_count: usize,
    pub result_count: usize,
    pub highlighted_item: Option<&'a S::Item>,
    /// Most recently selected item.
    pub selected_item: Option<&'a S::Item>,
    /// Whether this transition changed the selection.
    pub selection_changed: bool,
    pub item_to_string: &'a dyn Fn(&S::Item) -> String,
}

/// Default composer.
///
/// Announces a new selection, an empty result list, or a changed result
/// count while the menu is open. Everything else stays silent.
#[must_use]
pub fn default_status_message<S: Selection>(ctx: &StatusContext<'_, S>) -> String {
    if ctx.selection_changed
        && let Some(item) = ctx.selected_item
    {
        return format!("{} has been selected.", (ctx.item_to_string)(item));
    }
    if !ctx.state.is_open {
        return String::new();
    }
    if ctx.result_count == 0 {
        return "No results are available.".to_owned();
    }
    if ctx.result_count != ctx.previous_result_count {
        let (noun, verb) = if ctx.result_count == 1 {
            ("result", "is")
        } else {
            ("results", "are")
        };
        return format!(
            "{} {noun} {verb} available, use up and down arrow keys to navigate. \
             Press Enter key to select.",
            ctx.result_count
        );
    }
    String::new()
}

/// Owns the live region and the publish/clear timers.
#[derive(Debug, Clone)]
pub struct StatusAnnouncer {
    region_id: String,
    region: Option<NodeId>,
    publish: Debouncer,
    clear_after: Duration,
    clear_timer: Option<TimerHandle>,
    previous_result_count: usize,
}

impl StatusAnnouncer {
    #[must_use]
    pub fn new(region_id: String, debounce: Duration, clear_after: Duration) -> Self {
        Self {
            region_id,
            region: None,
            publish: Debouncer::new(debounce),
            clear_after,
            clear_timer: None,
            previous_result_count: 0,
        }
    }

    #[must_use]
    pub fn previous_result_count(&self) -> usize {
        self.previous_result_count
    }

    /// Remember the count the latest message was composed against.
    pub fn record_result_count(&mut self, count: usize) {
        self.previous_result_count = count;
    }

    /// Queue `message`, replacing any message still inside its window.
    pub fn request(
        &mut self,
        timers: &mut TimerQueue<TimerPurpose>,
        now: Duration,
        message: String,
    ) {
        self.publish
            .trigger(timers, now, TimerPurpose::StatusPublish(message));
    }

    #[must_use]
    pub const fn is_pending(&self) -> bool {
        self.publish.is_pending()
    }

    /// Handle a fired publish timer. Stale handles are ignored.
    pub fn publish(
        &mut self,
        env: &mut dyn Environment,
        timers: &mut TimerQueue<TimerPurpose>,
        now: Duration,
        handle: TimerHandle,
        message: &str,
    ) -> bool {
        if !self.publish.acknowledge(handle) {
            return false;
        }
        let region = match self.region {
            Some(region) => region,
            None => {
                let region = env.create_live_region(&self.region_id);
                self.region = Some(region);
                region
            }
        };
        env.set_text_content(region, message);
        if let Some(previous) = self.clear_timer.take() {
            timers.cancel(previous);
        }
        self.clear_timer = Some(timers.schedule(now, self.clear_after, TimerPurpose::StatusClear));
        true
    }

    /// Handle a fired clear timer. Stale handles are ignored.
    pub fn clear(&mut self, env: &mut dyn Environment, handle: TimerHandle) -> bool {
        if self.clear_timer != Some(handle) {
            return false;
        }
        self.clear_timer = None;
        if let Some(region) = self.region {
            env.set_text_content(region, "");
        }
        true
    }

    /// Cancel both timers and remove the live region.
    pub fn teardown(&mut self, env: &mut dyn Environment, timers: &mut TimerQueue<TimerPurpose>) {
        self.publish.cancel(timers);
        if let Some(handle) = self.clear_timer.take() {
            timers.cancel(handle);
        }
        if let Some(region) = self.region.take() {
            env.remove_element(region);
        }
    }
}
