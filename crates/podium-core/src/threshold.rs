//! Per-role minimum-time configuration and the reached check.

use chrono::NaiveTime;
use serde::{Deserialize, Serialize};

use crate::record::{Record, Role};

/// Preset minute choices offered for the speaker threshold.
pub const SPEAKER_PRESETS: [u32; 6] = [10, 15, 20, 30, 40, 60];

/// Preset minute choices offered for the discussant threshold.
pub const DISCUSSANT_PRESETS: [u32; 5] = [5, 10, 15, 20, 30];

/// Minimum speaking minutes required per role.
///
/// One shared value per role, read by every record's evaluation and written
/// only by explicit configuration actions. The presets are suggestions for
/// interactive use; any value is accepted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Thresholds {
    /// Minimum total minutes for a speaker.
    pub speaker_minutes: u32,
    /// Minimum total minutes for a discussant.
    pub discussant_minutes: u32,
}

impl Default for Thresholds {
    fn default() -> Self {
        Self {
            speaker_minutes: 10,
            discussant_minutes: 5,
        }
    }
}

impl Thresholds {
    /// The configured minimum minutes for `role`.
    #[must_use]
    pub const fn minutes_for(&self, role: Role) -> u32 {
        match role {
            Role::Speaker => self.speaker_minutes,
            Role::Discussant => self.discussant_minutes,
        }
    }

    /// Sets the minimum minutes for `role`.
    pub const fn set_minutes(&mut self, role: Role, minutes: u32) {
        match role {
            Role::Speaker => self.speaker_minutes = minutes,
            Role::Discussant => self.discussant_minutes = minutes,
        }
    }

    /// Whether `record`'s total as of `now` meets its role's minimum.
    ///
    /// Whole minutes are the total seconds divided by 60: a 599 second
    /// total is 9 minutes and falls short of a 10 minute threshold, 600
    /// seconds meets it exactly, and an hour-plus total keeps counting
    /// (61 minutes stays 61, it never wraps back to 1). Pure query, safe
    /// to call on every tick.
    #[must_use]
    pub fn reached(&self, record: &Record, now: NaiveTime) -> bool {
        record.total_secs(now) / 60 >= i64::from(self.minutes_for(record.role()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn t(h: u32, m: u32, s: u32) -> NaiveTime {
        NaiveTime::from_hms_opt(h, m, s).unwrap()
    }

    /// Record of `role` with a single ended segment lasting `secs`.
    fn record_with_total(role: Role, secs: i64) -> Record {
        let start = t(10, 0, 0);
        let mut record = Record::new(role, "");
        record.start_segment(0, start).unwrap();
        record
            .end_segment(0, start + chrono::Duration::seconds(secs))
            .unwrap();
        record
    }

    #[test]
    fn defaults_are_ten_and_five() {
        let thresholds = Thresholds::default();
        assert_eq!(thresholds.speaker_minutes, 10);
        assert_eq!(thresholds.discussant_minutes, 5);
    }

    #[test]
    fn minutes_for_selects_by_role() {
        let thresholds = Thresholds {
            speaker_minutes: 30,
            discussant_minutes: 15,
        };
        assert_eq!(thresholds.minutes_for(Role::Speaker), 30);
        assert_eq!(thresholds.minutes_for(Role::Discussant), 15);
    }

    #[test]
    fn set_minutes_accepts_values_outside_the_presets() {
        let mut thresholds = Thresholds::default();
        thresholds.set_minutes(Role::Speaker, 7);
        thresholds.set_minutes(Role::Discussant, 0);

        assert_eq!(thresholds.minutes_for(Role::Speaker), 7);
        assert_eq!(thresholds.minutes_for(Role::Discussant), 0);
    }

    #[test]
    fn presets_match_the_offered_choices() {
        assert_eq!(SPEAKER_PRESETS, [10, 15, 20, 30, 40, 60]);
        assert_eq!(DISCUSSANT_PRESETS, [5, 10, 15, 20, 30]);
    }

    #[test]
    fn boundary_at_exactly_the_threshold() {
        let thresholds = Thresholds::default();
        let now = t(12, 0, 0);

        // 599 s is 9 whole minutes, short of 10
        let short = record_with_total(Role::Speaker, 599);
        assert!(!thresholds.reached(&short, now));

        // 600 s is exactly 10 minutes
        let exact = record_with_total(Role::Speaker, 600);
        assert!(thresholds.reached(&exact, now));
    }

    #[test]
    fn combined_segments_cross_the_threshold() {
        // 65 s + 600 s = 665 s, 11 whole minutes
        let mut record = record_with_total(Role::Speaker, 65);
        record.add_segment().unwrap();
        record.start_segment(1, t(10, 5, 0)).unwrap();
        record.end_segment(1, t(10, 15, 0)).unwrap();

        assert!(Thresholds::default().reached(&record, t(12, 0, 0)));
    }

    #[test]
    fn hour_plus_totals_do_not_wrap() {
        // 3700 s is 61 whole minutes. A clock-face reading would wrap to
        // one minute and report a 10 minute threshold as missed.
        let record = record_with_total(Role::Speaker, 3700);
        assert!(Thresholds::default().reached(&record, t(12, 0, 0)));

        let sixty = Thresholds {
            speaker_minutes: 60,
            discussant_minutes: 5,
        };
        assert!(sixty.reached(&record, t(12, 0, 0)));
        assert!(!sixty.reached(&record_with_total(Role::Speaker, 3599), t(12, 0, 0)));
    }

    #[test]
    fn discussant_uses_its_own_minimum() {
        let thresholds = Thresholds::default();
        let now = t(12, 0, 0);

        // 300 s is 5 minutes: reached for a discussant, not for a speaker
        assert!(thresholds.reached(&record_with_total(Role::Discussant, 300), now));
        assert!(!thresholds.reached(&record_with_total(Role::Speaker, 300), now));
    }

    #[test]
    fn running_segments_count_toward_reached() {
        let mut record = Record::new(Role::Discussant, "");
        record.start_segment(0, t(10, 0, 0)).unwrap();

        assert!(!Thresholds::default().reached(&record, t(10, 4, 59)));
        assert!(Thresholds::default().reached(&record, t(10, 5, 0)));
    }

    #[test]
    fn zero_threshold_is_always_reached() {
        let mut thresholds = Thresholds::default();
        thresholds.set_minutes(Role::Discussant, 0);

        let record = Record::new(Role::Discussant, "");
        assert!(thresholds.reached(&record, t(10, 0, 0)));
    }
}
