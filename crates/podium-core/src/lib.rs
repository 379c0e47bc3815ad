//! Core domain logic for the speaking-time tracker.
//!
//! This crate contains the fundamental types and logic for:
//! - Segments: the lifecycle of one timed speaking interval
//! - Records: a participant's ordered segment history and live total
//! - Thresholds: per-role minimum-time evaluation
//! - Export: deterministic row generation in CSV and aligned-text form
//!
//! The crate performs no I/O. Wall-clock access goes through the [`Clock`]
//! trait so every time-dependent computation is testable, and all structural
//! mutation goes through [`RecordStore`], the single owner of the record
//! collection.

use std::fmt;

use thiserror::Error;

pub mod clock;
pub mod export;
mod record;
mod segment;
mod store;
mod threshold;

pub use clock::{Clock, ManualClock, SystemClock, TICK_INTERVAL};
pub use export::{
    ExportRow, export_rows, format_clock, format_duration, render_csv, render_table,
};
pub use record::{Record, Role};
pub use segment::{Segment, SegmentState};
pub use store::RecordStore;
pub use threshold::{DISCUSSANT_PRESETS, SPEAKER_PRESETS, Thresholds};

/// Domain errors for timer operations.
///
/// Every variant is a rejected operation, never a fatal condition: the
/// operation that produced it left all state unchanged.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TimerError {
    /// A start/end action was requested on a segment not in the required
    /// prior state.
    #[error("cannot {action} a segment that is {state}")]
    InvalidTransition {
        /// The rejected action, `"start"` or `"end"`.
        action: &'static str,
        /// The segment's actual state at the time of the request.
        state: SegmentState,
    },
    /// A new segment was requested while the record still has an open one.
    #[error("record already has an open segment ({0})")]
    SlotOccupied(OpenSlot),
}

/// The kind of open segment blocking [`Record::add_segment`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OpenSlot {
    /// A segment exists that has never been started.
    Unused,
    /// A segment is currently running.
    Running,
}

impl OpenSlot {
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Unused => "unused",
            Self::Running => "running",
        }
    }
}

impl fmt::Display for OpenSlot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
