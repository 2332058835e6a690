use std::collections::BTreeMap;

use chrono::{NaiveDate, NaiveDateTime};

use crate::models::{normalize_history, CycleConfig, ModelError, PeriodRecord};
use crate::prediction::{self, DayMarker, ReminderPolicy};
use crate::stats::{self, CycleStats};
use crate::storage::{
    KeyValueStore, StorageError, LAST_PERIOD_START_KEY, NOTIFICATION_ID_KEY, PERIODS_HISTORY_KEY,
    SETTINGS_KEY,
};

#[derive(Debug, thiserror::Error)]
pub enum TrackerError {
    #[error(transparent)]
    Model(#[from] ModelError),
    #[error(transparent)]
    Storage(#[from] StorageError),
    #[error("malformed value under store key '{key}': {source}")]
    MalformedValue {
        key: &'static str,
        source: serde_json::Error,
    },
    #[error("scheduler error: {0}")]
    Scheduler(String),
}

/// Local notification scheduler seam. Implementations wrap whatever the
/// platform offers; the engine only holds the opaque handle.
pub trait ReminderScheduler {
    fn schedule(&mut self, at: NaiveDateTime, message: &str) -> Result<String, String>;
    fn cancel(&mut self, handle: &str) -> Result<(), String>;
}

/// Glue between the durable store and the pure engine. All reads re-derive
/// ordering and predictions from what is persisted; nothing is cached.
pub struct Tracker<S: KeyValueStore> {
    store: S,
}

impl<S: KeyValueStore> Tracker<S> {
    pub fn new(store: S) -> Self {
        Self { store }
    }

    /// Persisted settings, or the 28/5 default when none were saved yet.
    /// A malformed or out-of-range persisted value is an error; whether to
    /// fall back to defaults is the caller's call, not a silent substitution
    /// here.
    pub fn settings(&self) -> Result<CycleConfig, TrackerError> {
        let Some(raw) = self.store.get(SETTINGS_KEY)? else {
            return Ok(CycleConfig::default());
        };
        let config: CycleConfig =
            serde_json::from_str(&raw).map_err(|source| TrackerError::MalformedValue {
                key: SETTINGS_KEY,
                source,
            })?;
        config.validate()?;
        Ok(config)
    }

    /// Validate and persist new settings.
    pub fn save_settings(&mut self, config: CycleConfig) -> Result<(), TrackerError> {
        config.validate()?;
        let json = serde_json::to_string(&config).map_err(StorageError::from)?;
        self.store.set(SETTINGS_KEY, &json)?;
        Ok(())
    }

    /// Record a period start: append to history (duplicates suppressed) and
    /// replace the last-start key, keeping history a superset of it.
    pub fn record_period(&mut self, start: NaiveDate) -> Result<(), TrackerError> {
        let record = PeriodRecord::new(start);
        let mut raw = self.raw_history()?;
        let date_string = record.to_date_string();
        if !raw.contains(&date_string) {
            raw.push(date_string);
            let json = serde_json::to_string(&raw).map_err(StorageError::from)?;
            self.store.set(PERIODS_HISTORY_KEY, &json)?;
        }
        self.store
            .set(LAST_PERIOD_START_KEY, &record.to_date_string())?;
        Ok(())
    }

    /// Full history, most recent first.
    pub fn history(&self) -> Result<Vec<PeriodRecord>, TrackerError> {
        Ok(normalize_history(&self.raw_history()?)?)
    }

    pub fn last_period_start(&self) -> Result<Option<NaiveDate>, TrackerError> {
        match self.store.get(LAST_PERIOD_START_KEY)? {
            Some(raw) => Ok(Some(PeriodRecord::parse(&raw)?.start)),
            None => Ok(None),
        }
    }

    /// Markers for the calendar surface; empty before the first record.
    pub fn calendar_markers(&self) -> Result<BTreeMap<NaiveDate, DayMarker>, TrackerError> {
        match self.last_period_start()? {
            Some(last) => Ok(prediction::marked_dates(last, &self.settings()?)),
            None => Ok(BTreeMap::new()),
        }
    }

    /// Next predicted start, or `None` before the first record.
    pub fn next_period(&self) -> Result<Option<NaiveDate>, TrackerError> {
        match self.last_period_start()? {
            Some(last) => Ok(Some(prediction::next_period_date(last, &self.settings()?))),
            None => Ok(None),
        }
    }

    /// Days until the next predicted start; `None` before the first record
    /// or once the predicted date has passed.
    pub fn days_until_next(&self, today: NaiveDate) -> Result<Option<i64>, TrackerError> {
        match self.last_period_start()? {
            Some(last) => Ok(prediction::days_until_next_period(
                last,
                &self.settings()?,
                today,
            )),
            None => Ok(None),
        }
    }

    pub fn stats(&self) -> Result<CycleStats, TrackerError> {
        Ok(stats::cycle_stats(&self.history()?))
    }

    /// Cancel any pending reminder and schedule a fresh one for the next
    /// predicted period. Triggers already in the past (or with no recorded
    /// period) leave no reminder pending.
    pub fn reschedule_reminder(
        &mut self,
        scheduler: &mut impl ReminderScheduler,
        policy: &ReminderPolicy,
        now: NaiveDateTime,
        message: &str,
    ) -> Result<Option<String>, TrackerError> {
        if let Some(handle) = self.store.get(NOTIFICATION_ID_KEY)? {
            scheduler.cancel(&handle).map_err(TrackerError::Scheduler)?;
            self.store.remove(NOTIFICATION_ID_KEY)?;
        }

        let Some(last) = self.last_period_start()? else {
            return Ok(None);
        };
        let config = self.settings()?;
        let trigger = prediction::reminder_trigger(last, &config, policy)
            .ok_or_else(|| TrackerError::Scheduler(format!("invalid hour {}", policy.hour)))?;
        if trigger <= now {
            return Ok(None);
        }

        let handle = scheduler
            .schedule(trigger, message)
            .map_err(TrackerError::Scheduler)?;
        self.store.set(NOTIFICATION_ID_KEY, &handle)?;
        Ok(Some(handle))
    }

    fn raw_history(&self) -> Result<Vec<String>, TrackerError> {
        match self.store.get(PERIODS_HISTORY_KEY)? {
            Some(raw) => {
                serde_json::from_str(&raw).map_err(|source| TrackerError::MalformedValue {
                    key: PERIODS_HISTORY_KEY,
                    source,
                })
            }
            None => Ok(Vec::new()),
        }
    }
}
