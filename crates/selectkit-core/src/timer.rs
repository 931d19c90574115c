#![forbid(unsafe_code)]

//! Deterministic, host-driven timers.
//!
//! Nothing here reads the wall clock. The host owns time: it advances a
//! [`DeterministicClock`] and asks the [`TimerQueue`] for whatever became
//! due. That keeps every behaviour reproducible in tests and lets the same
//! code run under `wasm32-unknown-unknown` where there are no threads.
//!
//! # Invariants
//!
//! 1. Timers fire in deadline order; equal deadlines fire in schedule order.
//! 2. A cancelled handle never fires, and cancelling twice is harmless.
//! 3. A [`Debouncer`] has at most one pending timer: triggering it again
//!    cancels the previous one (last trigger wins).

use core::time::Duration;

/// Monotonic clock controlled by the host.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct DeterministicClock {
    now: Duration,
}

impl DeterministicClock {
    /// Create a clock starting at `0`.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            now: Duration::ZERO,
        }
    }

    /// Current monotonic time.
    #[must_use]
    pub const fn now(&self) -> Duration {
        self.now
    }

    /// Set current monotonic time. Moving backwards is ignored.
    pub fn set(&mut self, now: Duration) {
        if now > self.now {
            self.now = now;
        }
    }

    /// Advance monotonic time by `dt`.
    pub fn advance(&mut self, dt: Duration) {
        self.now = self.now.saturating_add(dt);
    }
}

/// Handle to one scheduled timer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TimerHandle(u64);

#[derive(Debug, Clone)]
struct Entry<P> {
    handle: TimerHandle,
    deadline: Duration,
    payload: P,
}

/// Cancellable one-shot timers carrying a payload `P`.
#[derive(Debug, Clone)]
pub struct TimerQueue<P> {
    entries: Vec<Entry<P>>,
    next_handle: u64,
}

impl<P> Default for TimerQueue<P> {
    fn default() -> Self {
        Self::new()
    }
}

impl<P> TimerQueue<P> {
    /// Create an empty queue.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            entries: Vec::new(),
            next_handle: 0,
        }
    }

    /// Schedule `payload` to fire `delay` after `now`.
    pub fn schedule(&mut self, now: Duration, delay: Duration, payload: P) -> TimerHandle {
        let handle = TimerHandle(self.next_handle);
        self.next_handle = self.next_handle.wrapping_add(1);
        self.entries.push(Entry {
            handle,
            deadline: now.saturating_add(delay),
            payload,
        });
        handle
    }

    /// Cancel a pending timer. Returns `true` if it was still pending.
    pub fn cancel(&mut self, handle: TimerHandle) -> bool {
        let before = self.entries.len();
        self.entries.retain(|e| e.handle != handle);
        self.entries.len() != before
    }

    /// Cancel every pending timer. Returns how many were dropped.
    pub fn cancel_all(&mut self) -> usize {
        let dropped = self.entries.len();
        self.entries.clear();
        dropped
    }

    /// Whether `handle` is still pending.
    #[must_use]
    pub fn is_pending(&self, handle: TimerHandle) -> bool {
        self.entries.iter().any(|e| e.handle == handle)
    }

    /// Number of pending timers.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether no timer is pending.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Earliest pending deadline.
    #[must_use]
    pub fn next_deadline(&self) -> Option<Duration> {
        self.entries.iter().map(|e| e.deadline).min()
    }

    /// Remove and return the earliest timer whose deadline is `<= now`.
    ///
    /// Call in a loop: handling one timer may schedule or cancel others.
    pub fn pop_due(&mut self, now: Duration) -> Option<(TimerHandle, P)> {
        let position = self
            .entries
            .iter()
            .enumerate()
            .filter(|(_, e)| e.deadline <= now)
            .min_by_key(|(_, e)| (e.deadline, e.handle))
            .map(|(i, _)| i)?;
        let entry = self.entries.remove(position);
        Some((entry.handle, entry.payload))
    }
}

/// Trailing-edge debounce over a [`TimerQueue`].
///
/// The debouncer only remembers its pending handle; the payload lives in
/// the queue. When the queue hands back a due timer, pass the handle to
/// [`acknowledge`](Debouncer::acknowledge) to learn whether it is this
/// debouncer's current timer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Debouncer {
    window: Duration,
    pending: Option<TimerHandle>,
}

impl Debouncer {
    /// Create a debouncer with a quiet window.
    #[must_use]
    pub const fn new(window: Duration) -> Self {
        Self {
            window,
            pending: None,
        }
    }

    /// The quiet window.
    #[must_use]
    pub const fn window(&self) -> Duration {
        self.window
    }

    /// Whether a trigger is waiting for its window to elapse.
    #[must_use]
    pub const fn is_pending(&self) -> bool {
        self.pending.is_some()
    }

    /// (Re)start the window, replacing any pending trigger.
    pub fn trigger<P>(
        &mut self,
        queue: &mut TimerQueue<P>,
        now: Duration,
        payload: P,
    ) -> TimerHandle {
        if let Some(previous) = self.pending.take() {
            queue.cancel(previous);
        }
        let handle = queue.schedule(now, self.window, payload);
        self.pending = Some(handle);
        handle
    }

    /// Drop the pending trigger, if any.
    pub fn cancel<P>(&mut self, queue: &mut TimerQueue<P>) -> bool {
        match self.pending.take() {
            Some(handle) => queue.cancel(handle),
            None => false,
        }
    }

    /// Claim a fired handle. Returns `true` when it was this debouncer's
    /// pending timer, which is then cleared.
    pub fn acknowledge(&mut self, handle: TimerHandle) -> bool {
        if self.pending == Some(handle) {
            self.pending = None;
            true
        } else {
            false
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ms(v: u64) -> Duration {
        Duration::from_millis(v)
    }

    #[test]
    fn clock_is_monotonic() {
        let mut clock = DeterministicClock::new();
        clock.advance(ms(30));
        clock.set(ms(10));
        assert_eq!(clock.now(), ms(30));
        clock.set(ms(50));
        assert_eq!(clock.now(), ms(50));
    }

    #[test]
    fn timers_fire_in_deadline_then_schedule_order() {
        let mut queue = TimerQueue::new();
        queue.schedule(ms(0), ms(20), "late");
        queue.schedule(ms(0), ms(10), "first");
        queue.schedule(ms(0), ms(10), "second");

        assert!(queue.pop_due(ms(5)).is_none());
        assert_eq!(queue.pop_due(ms(25)).map(|(_, p)| p), Some("first"));
        assert_eq!(queue.pop_due(ms(25)).map(|(_, p)| p), Some("second"));
        assert_eq!(queue.pop_due(ms(25)).map(|(_, p)| p), Some("late"));
        assert!(queue.is_empty());
    }

    #[test]
    fn cancelled_timer_never_fires() {
        let mut queue = TimerQueue::new();
        let handle = queue.schedule(ms(0), ms(0), 1);
        assert!(queue.is_pending(handle));
        assert!(queue.cancel(handle));
        assert!(!queue.cancel(handle));
        assert!(queue.pop_due(ms(100)).is_none());
    }

    #[test]
    fn zero_delay_is_due_immediately() {
        let mut queue = TimerQueue::new();
        queue.schedule(ms(40), Duration::ZERO, ());
        assert_eq!(queue.next_deadline(), Some(ms(40)));
        assert!(queue.pop_due(ms(40)).is_some());
    }

    #[test]
    fn cancel_all_reports_count() {
        let mut queue = TimerQueue::new();
        queue.schedule(ms(0), ms(1), 'a');
        queue.schedule(ms(0), ms(2), 'b');
        assert_eq!(queue.cancel_all(), 2);
        assert_eq!(queue.len(), 0);
        assert_eq!(queue.next_deadline(), None);
    }

    #[test]
    fn debouncer_keeps_only_last_trigger() {
        let mut queue = TimerQueue::new();
        let mut debounce = Debouncer::new(ms(200));

        let first = debounce.trigger(&mut queue, ms(0), "one");
        let second = debounce.trigger(&mut queue, ms(150), "two");
        assert!(!queue.is_pending(first));
        assert_eq!(queue.len(), 1);

        // Window restarts at the second trigger.
        assert!(queue.pop_due(ms(200)).is_none());
        let (handle, payload) = queue.pop_due(ms(350)).expect("due after window");
        assert_eq!(handle, second);
        assert_eq!(payload, "two");
        assert!(debounce.acknowledge(handle));
        assert!(!debounce.is_pending());
    }

    #[test]
    fn debouncer_ignores_foreign_handles() {
        let mut queue = TimerQueue::new();
        let mut debounce = Debouncer::new(ms(10));
        let foreign = queue.schedule(ms(0), ms(1), ());
        debounce.trigger(&mut queue, ms(0), ());
        assert!(!debounce.acknowledge(foreign));
        assert!(debounce.is_pending());
        assert!(debounce.cancel(&mut queue));
        assert!(!debounce.cancel(&mut queue));
        assert_eq!(queue.len(), 1);
    }
}
