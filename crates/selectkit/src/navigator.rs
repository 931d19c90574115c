#![forbid(unsafe_code)]

//! Highlight arithmetic.
//!
//! Pure functions over `(current, step, count, is_disabled)`. None of them
//! panic or return an index outside `0..count`; an empty collection always
//! yields `None`.
//!
//! A `current` index that no longer fits the collection (the list shrank
//! since it was stored) is treated as "nothing highlighted".

/// Drop a stale highlight.
#[inline]
#[must_use]
pub fn normalize(current: Option<usize>, count: usize) -> Option<usize> {
    current.filter(|&index| index < count)
}

/// Signed start position for a step from `current`.
///
/// With nothing highlighted, positive steps start "before the first" and
/// negative steps "after the last", so a step of `+1` lands on `0` and a step
/// of `-1` lands on `count - 1`.
fn origin(current: Option<usize>, step: isize, count: usize) -> i128 {
    match current {
        Some(index) => index as i128,
        None if step > 0 => -1,
        None => count as i128,
    }
}

/// Move the highlight by `step`, wrapping at both ends and skipping
/// disabled indices in the direction of travel.
///
/// Returns `None` when `count` is zero or every index is disabled. A zero
/// `step` is a caller bug: debug builds assert, release builds return the
/// normalized `current`.
#[must_use]
pub fn move_index(
    current: Option<usize>,
    step: isize,
    count: usize,
    is_disabled: impl Fn(usize) -> bool,
) -> Option<usize> {
    if count == 0 {
        return None;
    }
    let current = normalize(current, count);
    debug_assert!(step != 0, "move_index called with a zero step");
    if step == 0 {
        return current;
    }

    let n = count as i128;
    let direction = step.signum() as i128;
    let mut index = (origin(current, step, count) + step as i128).rem_euclid(n);
    for _ in 0..count {
        let candidate = index as usize;
        if !is_disabled(candidate) {
            return Some(candidate);
        }
        index = (index + direction).rem_euclid(n);
    }
    None
}

/// Move the highlight by `step` without wrapping.
///
/// The target is clamped to the first or last index, then the scan
/// continues in the direction of travel. When nothing enabled lies that
/// way the normalized `current` is kept. Used for page jumps.
#[must_use]
pub fn move_index_clamped(
    current: Option<usize>,
    step: isize,
    count: usize,
    is_disabled: impl Fn(usize) -> bool,
) -> Option<usize> {
    if count == 0 {
        return None;
    }
    let current = normalize(current, count);
    debug_assert!(step != 0, "move_index_clamped called with a zero step");
    if step == 0 {
        return current;
    }

    let last = count as i128 - 1;
    let target = (origin(current, step, count) + step as i128).clamp(0, last) as usize;
    scan(target, step > 0, count, &is_disabled).or(current)
}

/// First enabled index at or after `start` (or at or before it when
/// searching backwards), without wrapping.
///
/// `None` means "leave the highlight alone", never "clear it".
#[must_use]
pub fn nearest_enabled(
    start: usize,
    forward: bool,
    count: usize,
    is_disabled: impl Fn(usize) -> bool,
) -> Option<usize> {
    if count == 0 {
        return None;
    }
    scan(start.min(count - 1), forward, count, &is_disabled)
}

fn scan(
    start: usize,
    forward: bool,
    count: usize,
    is_disabled: &impl Fn(usize) -> bool,
) -> Option<usize> {
    if forward {
        (start..count).find(|&i| !is_disabled(i))
    } else {
        (0..=start).rev().find(|&i| !is_disabled(i))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn enabled(_: usize) -> bool {
        false
    }

    #[test]
    fn empty_collection_is_sentinel() {
        assert_eq!(move_index(Some(0), 1, 0, enabled), None);
        assert_eq!(move_index_clamped(None, -10, 0, enabled), None);
        assert_eq!(nearest_enabled(0, true, 0, enabled), None);
    }

    #[test]
    fn wraps_at_both_ends() {
        assert_eq!(move_index(Some(2), 1, 3, enabled), Some(0));
        assert_eq!(move_index(Some(0), -1, 3, enabled), Some(2));
    }

    #[test]
    fn no_highlight_enters_from_the_edge() {
        assert_eq!(move_index(None, 1, 4, enabled), Some(0));
        assert_eq!(move_index(None, -1, 4, enabled), Some(3));
    }

    #[test]
    fn stale_index_is_normalized_before_moving() {
        // List shrank from 10 to 3 while index 8 was highlighted.
        assert_eq!(move_index(Some(8), 1, 3, enabled), Some(0));
        assert_eq!(move_index(Some(8), -1, 3, enabled), Some(2));
    }

    #[test]
    fn skips_disabled_in_direction_of_travel() {
        let disabled = |i: usize| i == 1 || i == 2;
        assert_eq!(move_index(Some(0), 1, 5, disabled), Some(3));
        assert_eq!(move_index(Some(3), -1, 5, disabled), Some(0));
    }

    #[test]
    fn accelerated_step_wraps_modulo_count() {
        assert_eq!(move_index(Some(3), 5, 6, enabled), Some(2));
        assert_eq!(move_index(Some(1), -5, 6, enabled), Some(2));
        assert_eq!(move_index(Some(0), 13, 4, enabled), Some(1));
    }

    #[test]
    fn all_disabled_is_sentinel() {
        let all = |_: usize| true;
        assert_eq!(move_index(Some(1), 1, 4, all), None);
        assert_eq!(move_index(None, -5, 4, all), None);
    }

    #[test]
    fn clamped_stops_at_edges() {
        assert_eq!(move_index_clamped(Some(3), 10, 6, enabled), Some(5));
        assert_eq!(move_index_clamped(Some(3), -10, 6, enabled), Some(0));
        assert_eq!(move_index_clamped(None, 10, 6, enabled), Some(5));
    }

    #[test]
    fn clamped_keeps_current_when_edge_is_disabled() {
        let tail_disabled = |i: usize| i >= 4;
        assert_eq!(move_index_clamped(Some(2), 10, 6, tail_disabled), Some(2));
        let head_disabled = |i: usize| i == 0;
        assert_eq!(move_index_clamped(Some(3), -10, 6, head_disabled), Some(3));
    }

    #[test]
    fn nearest_enabled_scans_from_edge() {
        let disabled = |i: usize| i == 0 || i == 4;
        assert_eq!(nearest_enabled(0, true, 5, disabled), Some(1));
        assert_eq!(nearest_enabled(4, false, 5, disabled), Some(3));
        assert_eq!(nearest_enabled(0, true, 3, |_| true), None);
    }

    #[test]
    #[cfg(not(debug_assertions))]
    fn zero_step_keeps_current_in_release() {
        assert_eq!(move_index(Some(1), 0, 3, enabled), Some(1));
    }

    #[test]
    #[cfg(debug_assertions)]
    #[should_panic(expected = "zero step")]
    fn zero_step_asserts_in_debug() {
        let _ = move_index(Some(1), 0, 3, enabled);
    }
}
