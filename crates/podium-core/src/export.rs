//! Deterministic export of the record collection as rows.
//!
//! One row per non-unset segment, in record order then segment order within
//! each record. Rows are fully rendered up front so the CSV and the aligned
//! table always agree field for field, and repeated exports of the same
//! state at the same instant are byte-identical.

use chrono::NaiveTime;

use crate::record::{Record, Role};
use crate::threshold::Thresholds;

/// Column headers shared by both renderings.
const HEADER: [&str; 6] = ["role", "name", "start", "end", "duration", "thresholdReached"];

/// Placeholder shown when a record has no name.
pub const UNNAMED: &str = "(unnamed)";

/// End marker for a segment still running at export time.
pub const RUNNING_MARKER: &str = "running";

/// Minimum width of the name column in the aligned table.
const NAME_MIN_WIDTH: usize = 8;

/// One export row, fully rendered.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExportRow {
    pub role: &'static str,
    pub name: String,
    pub start: String,
    pub end: String,
    pub duration: String,
    pub reached: &'static str,
}

impl ExportRow {
    /// The six fields in column order.
    #[must_use]
    pub fn fields(&self) -> [&str; 6] {
        [
            self.role,
            &self.name,
            &self.start,
            &self.end,
            &self.duration,
            self.reached,
        ]
    }
}

/// Formats a clock-face timestamp as `HH:mm:ss`.
#[must_use]
pub fn format_clock(time: NaiveTime) -> String {
    time.format("%H:%M:%S").to_string()
}

/// Formats whole seconds as `mm:ss`.
///
/// Minutes are not wrapped at the hour, so 3700 seconds renders as
/// `61:40`. Negative input clamps to zero.
#[must_use]
pub fn format_duration(secs: i64) -> String {
    let secs = secs.max(0);
    format!("{:02}:{:02}", secs / 60, secs % 60)
}

/// Builds the export rows for `records` as of `now`.
///
/// Unset segments are skipped; a record whose segments were all deleted or
/// never started contributes no rows. The threshold flag is evaluated once
/// per record and repeated on each of its rows, so the rows of one record
/// always agree. Running segments measure their duration against `now`.
#[must_use]
pub fn export_rows(records: &[Record], thresholds: &Thresholds, now: NaiveTime) -> Vec<ExportRow> {
    let mut rows = Vec::new();
    for record in records {
        let reached = if thresholds.reached(record, now) {
            "yes"
        } else {
            "no"
        };
        let name = if record.name().is_empty() {
            UNNAMED
        } else {
            record.name()
        };

        for segment in record.segments() {
            let Some(start) = segment.started_at() else {
                continue;
            };
            rows.push(ExportRow {
                role: record.role().as_str(),
                name: name.to_string(),
                start: format_clock(start),
                end: segment
                    .ended_at()
                    .map_or_else(|| RUNNING_MARKER.to_string(), format_clock),
                duration: format_duration(segment.elapsed_secs(now)),
                reached,
            });
        }
    }
    rows
}

/// Renders rows as CSV with the fixed header line.
///
/// Fields containing a comma, a double quote, or a newline are wrapped in
/// double quotes with embedded quotes doubled. Lines end with `\n`. No
/// byte-order mark is included; that is the writer's concern.
#[must_use]
pub fn render_csv(rows: &[ExportRow]) -> String {
    let mut out = String::new();
    out.push_str(&HEADER.join(","));
    out.push('\n');
    for row in rows {
        let escaped = row.fields().map(csv_escape);
        out.push_str(&escaped.join(","));
        out.push('\n');
    }
    out
}

fn csv_escape(field: &str) -> String {
    if field.contains(',') || field.contains('"') || field.contains('\n') {
        format!("\"{}\"", field.replace('"', "\"\""))
    } else {
        field.to_string()
    }
}

/// Renders rows as a left-justified aligned text table.
///
/// Each column is as wide as its longest value, floored at the header width
/// and at the column minimums (the widest role label for `role`, eight for
/// `name`). Columns are separated by two spaces; the final column carries
/// no padding. Widths count characters, not bytes.
#[must_use]
pub fn render_table(rows: &[ExportRow]) -> String {
    let widths = column_widths(rows);
    let mut out = String::new();
    push_line(&mut out, HEADER, widths);
    for row in rows {
        push_line(&mut out, row.fields(), widths);
    }
    out
}

fn column_widths(rows: &[ExportRow]) -> [usize; 6] {
    let role_min = Role::Speaker
        .as_str()
        .len()
        .max(Role::Discussant.as_str().len());
    let minimums = [role_min, NAME_MIN_WIDTH, 0, 0, 0, 0];

    let mut widths = [0; 6];
    for ((width, header), min) in widths.iter_mut().zip(HEADER).zip(minimums) {
        *width = header.len().max(min);
    }
    for row in rows {
        for (width, field) in widths.iter_mut().zip(row.fields()) {
            *width = (*width).max(field.chars().count());
        }
    }
    widths
}

fn push_line(out: &mut String, fields: [&str; 6], widths: [usize; 6]) {
    let last = fields.len() - 1;
    for (i, (field, width)) in fields.into_iter().zip(widths).enumerate() {
        out.push_str(field);
        if i < last {
            let pad = width.saturating_sub(field.chars().count());
            out.push_str(&" ".repeat(pad));
            out.push_str("  ");
        }
    }
    out.push('\n');
}

#[cfg(test)]
mod tests {
    use super::*;
    use insta::assert_snapshot;

    fn t(h: u32, m: u32, s: u32) -> NaiveTime {
        NaiveTime::from_hms_opt(h, m, s).unwrap()
    }

    fn ended_record(role: Role, name: &str, spans: &[(NaiveTime, NaiveTime)]) -> Record {
        let mut record = Record::new(role, name);
        for (i, (start, end)) in spans.iter().enumerate() {
            record.start_segment(i, *start).unwrap();
            record.end_segment(i, *end).unwrap();
            if i + 1 < spans.len() {
                record.add_segment().unwrap();
            }
        }
        record
    }

    // ========== Row Generation ==========

    #[test]
    fn row_count_equals_non_unset_segments() {
        // Two ended segments plus a fresh unset one
        let mut first = ended_record(
            Role::Speaker,
            "Alice",
            &[(t(10, 0, 0), t(10, 1, 0)), (t(10, 2, 0), t(10, 3, 0))],
        );
        first.add_segment().unwrap();
        // Never started at all
        let second = Record::new(Role::Discussant, "Bob");

        let rows = export_rows(
            &[first, second],
            &Thresholds::default(),
            t(10, 5, 0),
        );
        assert_eq!(rows.len(), 2);
    }

    #[test]
    fn emptied_record_yields_no_rows() {
        let mut record = ended_record(Role::Speaker, "Alice", &[(t(10, 0, 0), t(10, 1, 0))]);
        record.delete_segment(0);

        let rows = export_rows(&[record], &Thresholds::default(), t(10, 5, 0));
        assert!(rows.is_empty());
    }

    #[test]
    fn rows_follow_record_order_then_segment_order() {
        let first = ended_record(
            Role::Speaker,
            "Alice",
            &[(t(10, 0, 0), t(10, 1, 0)), (t(10, 2, 0), t(10, 3, 0))],
        );
        let second = ended_record(Role::Discussant, "Bob", &[(t(9, 0, 0), t(9, 1, 0))]);

        let rows = export_rows(&[first, second], &Thresholds::default(), t(10, 5, 0));
        let order: Vec<_> = rows
            .iter()
            .map(|r| (r.name.as_str(), r.start.as_str()))
            .collect();

        // Bob's earlier clock time does not reorder anything
        assert_eq!(
            order,
            vec![
                ("Alice", "10:00:00"),
                ("Alice", "10:02:00"),
                ("Bob", "09:00:00"),
            ]
        );
    }

    #[test]
    fn single_short_segment_renders_not_reached() {
        let record = ended_record(Role::Speaker, "Alice", &[(t(10, 0, 0), t(10, 1, 5))]);

        let rows = export_rows(&[record], &Thresholds::default(), t(10, 1, 5));
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].role, "speaker");
        assert_eq!(rows[0].start, "10:00:00");
        assert_eq!(rows[0].end, "10:01:05");
        assert_eq!(rows[0].duration, "01:05");
        assert_eq!(rows[0].reached, "no");
    }

    #[test]
    fn running_segment_renders_marker_and_live_duration() {
        // Ended 0 s..120 s, then running from 200 s, queried at 260 s
        let mut record = ended_record(Role::Speaker, "Alice", &[(t(10, 0, 0), t(10, 2, 0))]);
        record.add_segment().unwrap();
        record.start_segment(1, t(10, 3, 20)).unwrap();

        let rows = export_rows(&[record], &Thresholds::default(), t(10, 4, 20));
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[1].end, RUNNING_MARKER);
        assert_eq!(rows[1].duration, "01:00");
    }

    #[test]
    fn threshold_flag_agrees_across_a_records_rows() {
        // 30 s then 600 s: the first segment alone is far short, but the
        // record's total is reached and every row must say so
        let record = ended_record(
            Role::Speaker,
            "Alice",
            &[(t(10, 0, 0), t(10, 0, 30)), (t(10, 1, 0), t(10, 11, 0))],
        );

        let rows = export_rows(&[record], &Thresholds::default(), t(10, 11, 0));
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].reached, "yes");
        assert_eq!(rows[1].reached, "yes");
    }

    #[test]
    fn empty_name_gets_the_placeholder() {
        let record = ended_record(Role::Discussant, "", &[(t(10, 0, 0), t(10, 1, 0))]);

        let rows = export_rows(&[record], &Thresholds::default(), t(10, 1, 0));
        assert_eq!(rows[0].name, UNNAMED);
    }

    // ========== CSV Rendering ==========

    #[test]
    fn csv_matches_the_contract() {
        let record = ended_record(Role::Speaker, "Alice", &[(t(10, 0, 0), t(10, 1, 5))]);
        let rows = export_rows(&[record], &Thresholds::default(), t(10, 1, 5));

        assert_eq!(
            render_csv(&rows),
            "role,name,start,end,duration,thresholdReached\n\
             speaker,Alice,10:00:00,10:01:05,01:05,no\n"
        );
    }

    #[test]
    fn csv_with_no_rows_is_just_the_header() {
        assert_eq!(
            render_csv(&[]),
            "role,name,start,end,duration,thresholdReached\n"
        );
    }

    #[test]
    fn csv_quotes_fields_containing_commas() {
        let record = ended_record(Role::Speaker, "Doe, Jane", &[(t(10, 0, 0), t(10, 1, 0))]);
        let rows = export_rows(&[record], &Thresholds::default(), t(10, 1, 0));

        let csv = render_csv(&rows);
        assert!(csv.contains("\"Doe, Jane\""));
        assert_eq!(csv.lines().count(), 2);
    }

    #[test]
    fn csv_doubles_embedded_quotes() {
        assert_eq!(csv_escape("plain"), "plain");
        assert_eq!(csv_escape("a,b"), "\"a,b\"");
        assert_eq!(csv_escape("say \"hi\""), "\"say \"\"hi\"\"\"");
    }

    // ========== Table Rendering ==========

    #[test]
    fn table_aligns_columns_left_justified() {
        let alice = ended_record(Role::Speaker, "Alice", &[(t(10, 0, 0), t(10, 1, 5))]);
        let mut kuma = Record::new(Role::Discussant, "Bartholomew Kuma");
        kuma.start_segment(0, t(10, 5, 0)).unwrap();

        let rows = export_rows(&[alice, kuma], &Thresholds::default(), t(10, 6, 0));
        assert_snapshot!(render_table(&rows), @r"
        role        name              start     end       duration  thresholdReached
        speaker     Alice             10:00:00  10:01:05  01:05     no
        discussant  Bartholomew Kuma  10:05:00  running   01:00     no
        ");
    }

    #[test]
    fn table_with_no_rows_is_just_the_header() {
        assert_eq!(
            render_table(&[]),
            "role        name      start  end  duration  thresholdReached\n"
        );
    }

    #[test]
    fn table_name_column_never_shrinks_below_its_minimum() {
        let record = ended_record(Role::Speaker, "Jo", &[(t(10, 0, 0), t(10, 1, 0))]);
        let rows = export_rows(&[record], &Thresholds::default(), t(10, 1, 0));

        let table = render_table(&rows);
        // "Jo" is padded to the 8 character minimum plus the separator
        assert!(table.contains("Jo        10:00:00"));
    }

    // ========== Field Formatting ==========

    #[test]
    fn duration_is_minutes_and_seconds() {
        assert_eq!(format_duration(0), "00:00");
        assert_eq!(format_duration(65), "01:05");
        assert_eq!(format_duration(599), "09:59");
        assert_eq!(format_duration(600), "10:00");
    }

    #[test]
    fn duration_minutes_exceed_the_hour_without_wrapping() {
        assert_eq!(format_duration(3700), "61:40");
        assert_eq!(format_duration(7200), "120:00");
    }

    #[test]
    fn duration_clamps_negative_to_zero() {
        assert_eq!(format_duration(-5), "00:00");
    }

    #[test]
    fn clock_is_zero_padded() {
        assert_eq!(format_clock(t(9, 5, 7)), "09:05:07");
        assert_eq!(format_clock(t(23, 59, 59)), "23:59:59");
    }
}
