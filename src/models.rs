use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Allowed range for the configured cycle length, in days.
pub const CYCLE_LENGTH_RANGE: std::ops::RangeInclusive<i64> = 21..=45;
/// Allowed range for the configured bleeding duration, in days.
pub const BLEEDING_DAYS_RANGE: std::ops::RangeInclusive<i64> = 1..=10;

pub const DEFAULT_CYCLE_LENGTH: i64 = 28;
pub const DEFAULT_BLEEDING_DAYS: i64 = 5;

const DATE_FORMAT: &str = "%Y-%m-%d";

#[derive(Debug, thiserror::Error, PartialEq)]
pub enum ModelError {
    #[error("cycle length {0} is outside the allowed 21-45 day range")]
    InvalidCycleLength(i64),
    #[error("bleeding days {0} is outside the allowed 1-10 day range")]
    InvalidBleedingDays(i64),
    #[error("'{0}' is not a valid YYYY-MM-DD date")]
    InvalidDateFormat(String),
}

/// First day of one observed period. The date is the identity: history
/// never holds two records for the same day.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, PartialOrd, Ord)]
pub struct PeriodRecord {
    pub start: NaiveDate,
}

impl PeriodRecord {
    pub fn new(start: NaiveDate) -> Self {
        Self { start }
    }

    /// Parse a persisted `YYYY-MM-DD` string.
    pub fn parse(raw: &str) -> Result<Self, ModelError> {
        NaiveDate::parse_from_str(raw, DATE_FORMAT)
            .map(Self::new)
            .map_err(|_| ModelError::InvalidDateFormat(raw.to_string()))
    }

    /// Render as the persisted `YYYY-MM-DD` form.
    pub fn to_date_string(&self) -> String {
        self.start.format(DATE_FORMAT).to_string()
    }
}

/// User-configured cycle parameters, persisted under the `settings` key.
///
/// Deserialization cannot enforce the ranges, so anything loaded from the
/// store goes through [`CycleConfig::validate`] before use.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct CycleConfig {
    #[serde(rename = "cycleLength")]
    pub cycle_length: i64,
    #[serde(rename = "bleedingDays")]
    pub bleeding_days: i64,
}

impl Default for CycleConfig {
    fn default() -> Self {
        Self {
            cycle_length: DEFAULT_CYCLE_LENGTH,
            bleeding_days: DEFAULT_BLEEDING_DAYS,
        }
    }
}

impl CycleConfig {
    /// Build a config, rejecting out-of-range values.
    pub fn new(cycle_length: i64, bleeding_days: i64) -> Result<Self, ModelError> {
        let config = Self {
            cycle_length,
            bleeding_days,
        };
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ModelError> {
        if !CYCLE_LENGTH_RANGE.contains(&self.cycle_length) {
            return Err(ModelError::InvalidCycleLength(self.cycle_length));
        }
        if !BLEEDING_DAYS_RANGE.contains(&self.bleeding_days) {
            return Err(ModelError::InvalidBleedingDays(self.bleeding_days));
        }
        Ok(())
    }
}

/// The two date ranges derived from one period start: the observed bleeding
/// window and the predicted next one. Derived on demand, never persisted.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct PredictionWindow {
    pub bleeding_start: NaiveDate,
    pub bleeding_end: NaiveDate,
    pub predicted_start: NaiveDate,
    pub predicted_end: NaiveDate,
}

impl PredictionWindow {
    /// Expects a validated config; a zero-day bleeding window yields an end
    /// date before its start.
    pub fn for_cycle(last_start: NaiveDate, config: &CycleConfig) -> Self {
        let span = chrono::Duration::days(config.bleeding_days - 1);
        let predicted_start = last_start + chrono::Duration::days(config.cycle_length);
        Self {
            bleeding_start: last_start,
            bleeding_end: last_start + span,
            predicted_start,
            predicted_end: predicted_start + span,
        }
    }
}

/// Parse persisted date strings into records sorted most-recent-first.
///
/// Any unparsable entry fails the whole call; tolerating partial history is
/// the caller's decision, not this layer's. Duplicate dates collapse to one
/// record.
pub fn normalize_history(dates: &[String]) -> Result<Vec<PeriodRecord>, ModelError> {
    let mut records = dates
        .iter()
        .map(|raw| PeriodRecord::parse(raw))
        .collect::<Result<Vec<_>, _>>()?;
    records.sort_by(|a, b| b.start.cmp(&a.start));
    records.dedup();
    Ok(records)
}
