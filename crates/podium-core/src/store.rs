//! The record store: single owner of the record collection and the one
//! entry point callers use for structural mutation.

use chrono::NaiveTime;

use crate::TimerError;
use crate::record::{Record, Role};

/// Ordered collection of participant records.
///
/// Records are addressed by their position in display order; deleting one
/// shifts later indices down by one. Out-of-range indices are tolerated as
/// logged no-ops rather than errors, so a stale index held by a display
/// layer mid-refresh can never fault the engine.
#[derive(Debug, Clone, Default)]
pub struct RecordStore {
    records: Vec<Record>,
}

impl RecordStore {
    /// Creates an empty store.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            records: Vec::new(),
        }
    }

    /// Appends a new record (with its initial unset segment) and returns
    /// its index.
    pub fn add_record(&mut self, role: Role, name: impl Into<String>) -> usize {
        self.records.push(Record::new(role, name));
        self.records.len() - 1
    }

    /// Removes the record at `index` and every segment it owns.
    ///
    /// Out-of-range is a no-op. Deleting the last record leaves the store
    /// empty; no replacement is created.
    pub fn delete_record(&mut self, index: usize) {
        if index < self.records.len() {
            self.records.remove(index);
        } else {
            tracing::debug!(index, "ignoring delete of unknown record");
        }
    }

    /// Read-only view of the records in display order.
    #[must_use]
    pub fn records(&self) -> &[Record] {
        &self.records
    }

    /// The record at `index`, if it exists.
    #[must_use]
    pub fn get(&self, index: usize) -> Option<&Record> {
        self.records.get(index)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.records.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Appends an unused segment to the record at `index`, subject to the
    /// record's open-slot rule.
    pub fn add_segment(&mut self, index: usize) -> Result<(), TimerError> {
        self.record_mut(index)
            .map_or(Ok(()), |record| record.add_segment().map(|_| ()))
    }

    /// Removes one segment of the record at `index`.
    pub fn delete_segment(&mut self, index: usize, segment: usize) {
        if let Some(record) = self.record_mut(index) {
            record.delete_segment(segment);
        }
    }

    /// Starts a segment of the record at `index`.
    pub fn start_segment(
        &mut self,
        index: usize,
        segment: usize,
        now: NaiveTime,
    ) -> Result<(), TimerError> {
        self.record_mut(index)
            .map_or(Ok(()), |record| record.start_segment(segment, now))
    }

    /// Ends a segment of the record at `index`.
    pub fn end_segment(
        &mut self,
        index: usize,
        segment: usize,
        now: NaiveTime,
    ) -> Result<(), TimerError> {
        self.record_mut(index)
            .map_or(Ok(()), |record| record.end_segment(segment, now))
    }

    /// Renames the record at `index`.
    pub fn set_name(&mut self, index: usize, name: impl Into<String>) {
        if let Some(record) = self.record_mut(index) {
            record.set_name(name);
        }
    }

    /// Changes the role of the record at `index`.
    pub fn set_role(&mut self, index: usize, role: Role) {
        if let Some(record) = self.record_mut(index) {
            record.set_role(role);
        }
    }

    fn record_mut(&mut self, index: usize) -> Option<&mut Record> {
        let record = self.records.get_mut(index);
        if record.is_none() {
            tracing::debug!(index, "ignoring operation on unknown record");
        }
        record
    }
}
