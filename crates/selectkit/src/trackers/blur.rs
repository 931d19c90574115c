#![forbid(unsafe_code)]

//! Blur-driven reset.
//!
//! A blur is not acted on immediately: focus may be moving to another part
//! of the same widget (input to menu, button to item). The tracker schedules
//! a settle timer, and when it fires the session asks
//! [`should_reset`] whether the widget really lost focus.

use std::time::Duration;

use selectkit_core::environment::{Environment, NodeId};
use selectkit_core::timer::{Debouncer, TimerHandle, TimerQueue};

use crate::keymap::Surface;
use crate::trackers::{TimerPurpose, is_within};

/// Pending blur check. A newer blur replaces an older one.
#[derive(Debug, Clone, Copy)]
pub struct BlurTracker {
    settle: Debouncer,
}

impl BlurTracker {
    #[must_use]
    pub const fn new(settle: Duration) -> Self {
        Self {
            settle: Debouncer::new(settle),
        }
    }

    /// Schedule the settle check for a blur of `surface`.
    pub fn schedule(
        &mut self,
        timers: &mut TimerQueue<TimerPurpose>,
        now: Duration,
        surface: Surface,
    ) {
        self.settle
            .trigger(timers, now, TimerPurpose::BlurSettle(surface));
    }

    /// Claim a fired settle timer. `false` for stale handles.
    pub fn acknowledge(&mut self, handle: TimerHandle) -> bool {
        self.settle.acknowledge(handle)
    }

    #[must_use]
    pub const fn is_pending(&self) -> bool {
        self.settle.is_pending()
    }

    pub fn cancel(&mut self, timers: &mut TimerQueue<TimerPurpose>) {
        self.settle.cancel(timers);
    }
}

/// Whether a settled blur should reset the widget.
///
/// No reset while a pointer button is held (a click on the menu is in
/// progress), while the menu is closed, or when focus landed inside one of
/// the widget's surfaces.
#[must_use]
pub fn should_reset(
    env: &dyn Environment,
    surfaces: &[NodeId],
    pointer_down: bool,
    is_open: bool,
) -> bool {
    is_open && !pointer_down && !is_within(env, surfaces, env.active_element())
}

#[cfg(test)]
mod tests {
    use super::*;
    use selectkit_core::environment::MemoryEnvironment;

    #[test]
    fn newer_blur_replaces_pending_check() {
        let mut timers = TimerQueue::new();
        let mut blur = BlurTracker::new(Duration::ZERO);
        blur.schedule(&mut timers, Duration::ZERO, Surface::Input);
        blur.schedule(&mut timers, Duration::ZERO, Surface::ToggleButton);
        assert_eq!(timers.len(), 1);

        let (handle, purpose) = timers.pop_due(Duration::ZERO).expect("zero delay is due");
        assert_eq!(purpose, TimerPurpose::BlurSettle(Surface::ToggleButton));
        assert!(blur.acknowledge(handle));
        assert!(!blur.is_pending());
    }

    #[test]
    fn reset_only_when_focus_left_for_good() {
        let mut env = MemoryEnvironment::new();
        let body = env.body();
        let root = env.append(body, Some("root"));
        let input = env.append(root, Some("input"));
        let elsewhere = env.append(body, None);
        let surfaces = [root];

        env.focus(Some(elsewhere));
        assert!(should_reset(&env, &surfaces, false, true));
        assert!(!should_reset(&env, &surfaces, true, true));
        assert!(!should_reset(&env, &surfaces, false, false));

        env.focus(Some(input));
        assert!(!should_reset(&env, &surfaces, false, true));

        env.focus(None);
        assert!(should_reset(&env, &surfaces, false, true));
    }
}
