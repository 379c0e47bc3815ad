//! Participant records: a role, a display name, and an ordered segment
//! history with a live recomputed total.

use chrono::NaiveTime;

use crate::segment::{Segment, SegmentState};
use crate::{OpenSlot, TimerError};

/// Which minimum-time threshold applies to a record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Role {
    Speaker,
    #[default]
    Discussant,
}

impl Role {
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Speaker => "speaker",
            Self::Discussant => "discussant",
        }
    }
}

impl std::fmt::Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for Role {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "speaker" => Ok(Self::Speaker),
            "discussant" => Ok(Self::Discussant),
            _ => Err(format!("invalid role: {s}")),
        }
    }
}

/// One participant's timing history.
///
/// The segment collection is owned exclusively by the record and only
/// reachable through methods, which is what upholds the open-slot rule: at
/// most one segment is unset or running at any time, enforced when segments
/// are created. The total is never stored; it is recomputed from the
/// segments on every call so deletes and ticks can never leave it stale.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Record {
    name: String,
    role: Role,
    segments: Vec<Segment>,
}

impl Record {
    /// Creates a record with one initial unset segment ready to start.
    pub fn new(role: Role, name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            role,
            segments: vec![Segment::new()],
        }
    }

    /// The caller-supplied display name; may be empty.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn set_name(&mut self, name: impl Into<String>) {
        self.name = name.into();
    }

    #[must_use]
    pub const fn role(&self) -> Role {
        self.role
    }

    pub const fn set_role(&mut self, role: Role) {
        self.role = role;
    }

    /// The segments in insertion order, which is also display and export
    /// order.
    #[must_use]
    pub fn segments(&self) -> &[Segment] {
        &self.segments
    }

    /// Returns the open segment blocking a new one, if any.
    #[must_use]
    pub fn open_slot(&self) -> Option<OpenSlot> {
        self.segments.iter().find_map(|s| match s.state() {
            SegmentState::Unset => Some(OpenSlot::Unused),
            SegmentState::Running => Some(OpenSlot::Running),
            SegmentState::Ended => None,
        })
    }

    /// Index of the first segment in the given state, if any.
    #[must_use]
    pub fn find_segment(&self, state: SegmentState) -> Option<usize> {
        self.segments.iter().position(|s| s.state() == state)
    }

    /// True while any segment is running.
    #[must_use]
    pub fn is_running(&self) -> bool {
        self.find_segment(SegmentState::Running).is_some()
    }

    /// Appends a new unset segment and returns its index.
    ///
    /// Rejected with [`TimerError::SlotOccupied`] while the record still has
    /// an unset or running segment; resolving that one first keeps the total
    /// unambiguous.
    pub fn add_segment(&mut self) -> Result<usize, TimerError> {
        if let Some(slot) = self.open_slot() {
            return Err(TimerError::SlotOccupied(slot));
        }
        self.segments.push(Segment::new());
        Ok(self.segments.len() - 1)
    }

    /// Removes the segment at `index`; out-of-range is a no-op.
    ///
    /// No total bookkeeping happens here. Totals are recomputed from the
    /// remaining segments on the next query.
    pub fn delete_segment(&mut self, index: usize) {
        if index < self.segments.len() {
            self.segments.remove(index);
        } else {
            tracing::debug!(index, "ignoring delete of unknown segment");
        }
    }

    /// Starts the segment at `index`; out-of-range is a no-op.
    pub fn start_segment(&mut self, index: usize, now: NaiveTime) -> Result<(), TimerError> {
        match self.segments.get_mut(index) {
            Some(segment) => segment.start(now),
            None => {
                tracing::debug!(index, "ignoring start of unknown segment");
                Ok(())
            }
        }
    }

    /// Ends the segment at `index`; out-of-range is a no-op.
    pub fn end_segment(&mut self, index: usize, now: NaiveTime) -> Result<(), TimerError> {
        match self.segments.get_mut(index) {
            Some(segment) => segment.end(now),
            None => {
                tracing::debug!(index, "ignoring end of unknown segment");
                Ok(())
            }
        }
    }

    /// Total elapsed whole seconds across all segments as of `now`.
    ///
    /// Recomputed on every call; a running segment contributes its live
    /// elapsed time.
    #[must_use]
    pub fn total_secs(&self, now: NaiveTime) -> i64 {
        self.segments.iter().map(|s| s.elapsed_secs(now)).sum()
    }
}
