use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::models::PeriodRecord;

/// Summary for the statistics view. `None` fields mean "not enough data
/// yet", which is an expected state rather than an error.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct CycleStats {
    pub record_count: usize,
    pub average_cycle_length: Option<i64>,
    pub shortest_cycle_length: Option<i64>,
    pub longest_cycle_length: Option<i64>,
    pub last_period_start: Option<NaiveDate>,
}

/// Day gaps between adjacent records, most-recent gap first.
///
/// `history` is expected in recency order (see
/// [`crate::models::normalize_history`]); fewer than two records produce no
/// gaps.
pub fn cycle_lengths(history: &[PeriodRecord]) -> Vec<i64> {
    history
        .windows(2)
        .map(|pair| (pair[0].start - pair[1].start).num_days().abs())
        .collect()
}

/// Mean gap rounded half-up, or `None` with fewer than two records.
pub fn average_cycle_length(history: &[PeriodRecord]) -> Option<i64> {
    let gaps = cycle_lengths(history);
    if gaps.is_empty() {
        return None;
    }
    let mean = gaps.iter().sum::<i64>() as f64 / gaps.len() as f64;
    Some(mean.round() as i64)
}

pub fn shortest_cycle_length(history: &[PeriodRecord]) -> Option<i64> {
    cycle_lengths(history).into_iter().min()
}

pub fn longest_cycle_length(history: &[PeriodRecord]) -> Option<i64> {
    cycle_lengths(history).into_iter().max()
}

/// Every recorded start counts, whether or not it contributes to a gap.
pub fn record_count(history: &[PeriodRecord]) -> usize {
    history.len()
}

/// Compute the full summary in one pass over the history.
pub fn cycle_stats(history: &[PeriodRecord]) -> CycleStats {
    let gaps = cycle_lengths(history);
    let average = if gaps.is_empty() {
        None
    } else {
        Some((gaps.iter().sum::<i64>() as f64 / gaps.len() as f64).round() as i64)
    };

    CycleStats {
        record_count: history.len(),
        average_cycle_length: average,
        shortest_cycle_length: gaps.iter().copied().min(),
        longest_cycle_length: gaps.iter().copied().max(),
        last_period_start: history.first().map(|r| r.start),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::normalize_history;

    fn history(dates: &[&str]) -> Vec<PeriodRecord> {
        let raw: Vec<String> = dates.iter().map(|d| d.to_string()).collect();
        normalize_history(&raw).unwrap()
    }

    #[test]
    fn gap_across_leap_february() {
        let h = history(&["2024-03-01", "2024-02-01"]);
        assert_eq!(cycle_lengths(&h), vec![29]);
    }

    #[test]
    fn single_record_has_no_gaps() {
        let h = history(&["2024-01-10"]);
        assert_eq!(cycle_lengths(&h), Vec::<i64>::new());
        assert_eq!(average_cycle_length(&h), None);
        assert_eq!(shortest_cycle_length(&h), None);
        assert_eq!(longest_cycle_length(&h), None);
        assert_eq!(record_count(&h), 1);
    }

    #[test]
    fn gaps_come_most_recent_first() {
        let h = history(&["2024-01-01", "2024-01-31", "2024-02-28"]);
        // Feb 28 - Jan 31 = 28 days, Jan 31 - Jan 1 = 30 days
        assert_eq!(cycle_lengths(&h), vec![28, 30]);
    }

    #[test]
    fn average_is_exact_when_it_divides() {
        // gaps 30, 28, 26
        let h = history(&["2024-01-01", "2024-01-27", "2024-02-24", "2024-03-25"]);
        assert_eq!(cycle_lengths(&h), vec![30, 28, 26]);
        assert_eq!(average_cycle_length(&h), Some(28));
    }

    #[test]
    fn average_rounds_half_up() {
        // gaps 29, 28
        let h = history(&["2024-01-01", "2024-01-29", "2024-02-27"]);
        assert_eq!(cycle_lengths(&h), vec![29, 28]);
        assert_eq!(average_cycle_length(&h), Some(29));
    }

    #[test]
    fn two_record_history_summary() {
        let h = history(&["2024-01-01", "2024-01-29"]);
        assert_eq!(shortest_cycle_length(&h), Some(28));
        assert_eq!(longest_cycle_length(&h), Some(28));
        assert_eq!(record_count(&h), 2);
    }

    #[test]
    fn summary_matches_individual_functions() {
        let h = history(&["2023-11-20", "2023-12-18", "2024-01-16", "2024-02-12"]);
        let stats = cycle_stats(&h);
        assert_eq!(stats.record_count, record_count(&h));
        assert_eq!(stats.average_cycle_length, average_cycle_length(&h));
        assert_eq!(stats.shortest_cycle_length, shortest_cycle_length(&h));
        assert_eq!(stats.longest_cycle_length, longest_cycle_length(&h));
        assert_eq!(
            stats.last_period_start,
            Some(NaiveDate::from_ymd_opt(2024, 2, 12).unwrap())
        );
    }

    #[test]
    fn empty_history_summary_is_all_none() {
        let stats = cycle_stats(&[]);
        assert_eq!(stats.record_count, 0);
        assert_eq!(stats.average_cycle_length, None);
        assert_eq!(stats.last_period_start, None);
    }
}
