//! The lifecycle of one timed speaking interval.

use std::fmt;

use chrono::NaiveTime;

use crate::TimerError;

/// Derived lifecycle state of a [`Segment`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SegmentState {
    /// Created but never started.
    Unset,
    /// Started, not yet ended.
    Running,
    /// Started and ended; immutable from here on.
    Ended,
}

impl SegmentState {
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Unset => "unset",
            Self::Running => "running",
            Self::Ended => "ended",
        }
    }
}

impl fmt::Display for SegmentState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One contiguous timed interval within a record's history.
///
/// Only the two timestamps are stored; the state is derived from which of
/// them are present, so an end time without a start time cannot be
/// represented. A rejected transition leaves the segment untouched.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Segment {
    start: Option<NaiveTime>,
    end: Option<NaiveTime>,
}

impl Segment {
    /// Creates an unset segment.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            start: None,
            end: None,
        }
    }

    /// Returns the derived lifecycle state.
    #[must_use]
    pub const fn state(&self) -> SegmentState {
        match (self.start, self.end) {
            (None, _) => SegmentState::Unset,
            (Some(_), None) => SegmentState::Running,
            (Some(_), Some(_)) => SegmentState::Ended,
        }
    }

    /// The time the segment was started, if it has been.
    #[must_use]
    pub const fn started_at(&self) -> Option<NaiveTime> {
        self.start
    }

    /// The time the segment was ended, if it has been.
    #[must_use]
    pub const fn ended_at(&self) -> Option<NaiveTime> {
        self.end
    }

    /// Starts the segment at `now`. Valid only while unset.
    pub fn start(&mut self, now: NaiveTime) -> Result<(), TimerError> {
        match self.state() {
            SegmentState::Unset => {
                self.start = Some(now);
                Ok(())
            }
            state => Err(TimerError::InvalidTransition {
                action: "start",
                state,
            }),
        }
    }

    /// Ends the segment at `now`. Valid only while running.
    pub fn end(&mut self, now: NaiveTime) -> Result<(), TimerError> {
        match self.state() {
            SegmentState::Running => {
                self.end = Some(now);
                Ok(())
            }
            state => Err(TimerError::InvalidTransition {
                action: "end",
                state,
            }),
        }
    }

    /// Elapsed whole seconds as of `now`.
    ///
    /// Unset segments report zero. Running segments measure against `now`,
    /// ended ones against their end time. A clock that moved backwards
    /// clamps to zero rather than reporting a negative duration.
    #[must_use]
    pub fn elapsed_secs(&self, now: NaiveTime) -> i64 {
        match (self.start, self.end) {
            (None, _) => 0,
            (Some(start), None) => (now - start).num_seconds().max(0),
            (Some(start), Some(end)) => (end - start).num_seconds().max(0),
        }
    }
}
