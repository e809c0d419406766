//! Pointer motion events and time-based debouncing.
//!
//! Mouse-moved events arrive far faster than window hit-testing can be done
//! usefully. The [`MotionFilter`] drops every event that arrives less than the
//! configured interval after the last event it let through.

use std::time::Duration;

use super::modifiers::Modifiers;

/// A point in global screen coordinates (origin at the top-left of the main display).
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct ScreenPoint {
    pub x: f64,
    pub y: f64,
}

impl ScreenPoint {
    #[must_use]
    pub const fn new(x: f64, y: f64) -> Self { Self { x, y } }
}

/// A single pointer-motion sample delivered by the event tap.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MotionEvent {
    /// Monotonic timestamp in nanoseconds.
    pub timestamp: u64,
    /// Pointer position.
    pub position: ScreenPoint,
    /// Modifier keys held while the pointer moved.
    pub modifiers: Modifiers,
}

impl MotionEvent {
    #[must_use]
    pub const fn new(timestamp: u64, position: ScreenPoint, modifiers: Modifiers) -> Self {
        Self { timestamp, position, modifiers }
    }
}

/// Debounces the motion stream by a minimum interval between processed events.
#[derive(Debug, Clone)]
pub struct MotionFilter {
    /// Minimum distance between two processed events, in nanoseconds.
    min_interval_ns: u64,
    /// Timestamp of the last event that passed. `None` until the first event.
    last_processed: Option<u64>,
}

impl MotionFilter {
    /// Creates a filter with the given minimum interval.
    #[must_use]
    pub fn new(min_interval: Duration) -> Self {
        Self {
            min_interval_ns: u64::try_from(min_interval.as_nanos()).unwrap_or(u64::MAX),
            last_processed: None,
        }
    }

    /// Returns whether the event at `timestamp` should be processed.
    ///
    /// Events that pass update the last processed timestamp. Rejected events
    /// leave the filter untouched, so a burst of events is measured from the
    /// last one that went through, not from the previous sample.
    pub fn should_process(&mut self, timestamp: u64) -> bool {
        if let Some(last) = self.last_processed
            && timestamp.saturating_sub(last) < self.min_interval_ns
        {
            return false;
        }

        self.last_processed = Some(timestamp);
        true
    }

    /// Timestamp of the last processed event, if any.
    #[must_use]
    pub const fn last_processed(&self) -> Option<u64> { self.last_processed }

    /// The configured minimum interval.
    #[must_use]
    pub const fn min_interval(&self) -> Duration { Duration::from_nanos(self.min_interval_ns) }
}
