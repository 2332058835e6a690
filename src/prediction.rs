use std::collections::BTreeMap;

use chrono::{NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};

use crate::models::CycleConfig;

/// Marker kind for one calendar day, as consumed by the display surface.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum MarkerKind {
    /// Observed bleeding window anchored at the recorded start date.
    Bleeding,
    /// Estimated next bleeding window, one configured cycle later.
    Predicted,
}

impl MarkerKind {
    /// Higher wins when two windows claim the same day.
    pub fn priority(self) -> u8 {
        match self {
            MarkerKind::Bleeding => 2,
            MarkerKind::Predicted => 1,
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct DayMarker {
    pub kind: MarkerKind,
    pub priority: u8,
}

impl DayMarker {
    fn of(kind: MarkerKind) -> Self {
        Self {
            kind,
            priority: kind.priority(),
        }
    }
}

/// Date the next period is expected to start: `last_start + cycle_length`.
pub fn next_period_date(last_start: NaiveDate, config: &CycleConfig) -> NaiveDate {
    last_start + chrono::Duration::days(config.cycle_length)
}

/// Whole days from `today` until the next predicted start, or `None` once
/// that date has passed. Never negative; the day itself reports zero.
///
/// `today` is an explicit argument so the prediction stays deterministic.
pub fn days_until_next_period(
    last_start: NaiveDate,
    config: &CycleConfig,
    today: NaiveDate,
) -> Option<i64> {
    let remaining = (next_period_date(last_start, config) - today).num_days();
    (remaining >= 0).then_some(remaining)
}

/// Calendar markers for the current bleeding window and the predicted next
/// one.
///
/// Bleeding marks are authoritative: a predicted mark never overwrites one.
/// The rule holds even for out-of-range configs where the two windows
/// overlap (`cycle_length < bleeding_days`); the overlapping days stay
/// `Bleeding`.
pub fn marked_dates(last_start: NaiveDate, config: &CycleConfig) -> BTreeMap<NaiveDate, DayMarker> {
    let mut marks = BTreeMap::new();
    let next_start = next_period_date(last_start, config);

    for offset in 0..config.bleeding_days.max(0) {
        let day = chrono::Duration::days(offset);
        marks.insert(last_start + day, DayMarker::of(MarkerKind::Bleeding));
        marks
            .entry(next_start + day)
            .or_insert_with(|| DayMarker::of(MarkerKind::Predicted));
    }
    marks
}

/// Caller-owned reminder offset: notify `days_before` the predicted start,
/// at `hour` o'clock local time.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct ReminderPolicy {
    pub days_before: i64,
    pub hour: u32,
}

impl Default for ReminderPolicy {
    fn default() -> Self {
        Self {
            days_before: 2,
            hour: 9,
        }
    }
}

/// Local timestamp at which a reminder for the next predicted period should
/// fire, or `None` for an hour outside 0-23.
pub fn reminder_trigger(
    last_start: NaiveDate,
    config: &CycleConfig,
    policy: &ReminderPolicy,
) -> Option<NaiveDateTime> {
    let day = next_period_date(last_start, config) - chrono::Duration::days(policy.days_before);
    day.and_hms_opt(policy.hour, 0, 0)
}
