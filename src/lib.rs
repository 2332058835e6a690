//! On-device menstrual cycle prediction and statistics engine.
//!
//! The engine itself is pure: [`prediction`] and [`stats`] are functions of
//! the recorded history and [`models::CycleConfig`] passed in, with `today`
//! an explicit argument. [`storage`] and [`tracker`] supply the thin durable
//! layer an application shell composes around it.

pub mod models;
pub mod prediction;
pub mod stats;
pub mod storage;
pub mod tracker;

pub use models::{normalize_history, CycleConfig, ModelError, PeriodRecord, PredictionWindow};
pub use prediction::{
    days_until_next_period, marked_dates, next_period_date, reminder_trigger, DayMarker,
    MarkerKind, ReminderPolicy,
};
pub use stats::{
    average_cycle_length, cycle_lengths, cycle_stats, longest_cycle_length, record_count,
    shortest_cycle_length, CycleStats,
};
pub use storage::{FileStore, KeyValueStore, MemoryStore, StorageError};
pub use tracker::{ReminderScheduler, Tracker, TrackerError};
