//! Start-date scheduler
//!
//! A start date is feasible when it and the following `ceil(days)` - 1
//! calendar days are all weekdays with no existing booking. Jobs never
//! span a weekend, so anything longer than five days has no start.

use std::collections::BTreeSet;

use chrono::{Datelike, Days, Local, NaiveDate, Weekday};
use dirtco_types::QuoteError;

use crate::model::rates::check_positive;
use crate::model::AvailableStart;

const DEFAULT_LIMIT: usize = 3;
const DEFAULT_HORIZON_DAYS: u32 = 90;

/// Parse booked dates given as `YYYY-MM-DD`, or ISO timestamps whose date
/// part is taken as-is
pub fn parse_booked_dates<S: AsRef<str>>(dates: &[S]) -> Result<BTreeSet<NaiveDate>, QuoteError> {
    dates
        .iter()
        .map(|raw| {
            let raw = raw.as_ref().trim();
            let day = raw.split('T').next().unwrap_or(raw);
            NaiveDate::parse_from_str(day, "%Y-%m-%d").map_err(|e| {
                QuoteError::invalid("booked_dates", format!("malformed date '{}': {}", raw, e))
            })
        })
        .collect()
}

fn is_weekend(date: NaiveDate) -> bool {
    matches!(date.weekday(), Weekday::Sat | Weekday::Sun)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AvailabilityScheduler {
    /// Maximum number of starts returned
    pub limit: usize,
    /// Number of calendar days scanned, today included
    pub horizon_days: u32,
}

impl Default for AvailabilityScheduler {
    fn default() -> Self {
        Self {
            limit: DEFAULT_LIMIT,
            horizon_days: DEFAULT_HORIZON_DAYS,
        }
    }
}

impl AvailabilityScheduler {
    pub fn new(limit: usize, horizon_days: u32) -> Self {
        Self { limit, horizon_days }
    }

    /// True when `ceil(days_required)` consecutive days from `start` are
    /// all weekdays and none is booked
    pub fn is_date_range_available(
        &self,
        start: NaiveDate,
        days_required: f64,
        booked: &BTreeSet<NaiveDate>,
    ) -> bool {
        let span = days_required.ceil().max(1.0) as u64;
        (0..span).all(|offset| match start.checked_add_days(Days::new(offset)) {
            Some(day) => !is_weekend(day) && !booked.contains(&day),
            None => false,
        })
    }

    /// Earliest feasible starts, scanning forward from `today` inclusive
    pub fn next_available_starts(
        &self,
        booked: &BTreeSet<NaiveDate>,
        days_required: f64,
        today: NaiveDate,
    ) -> Result<Vec<AvailableStart>, QuoteError> {
        check_positive("days_required", days_required)?;

        let mut starts = Vec::with_capacity(self.limit);
        for offset in 0..self.horizon_days {
            if starts.len() >= self.limit {
                break;
            }
            let Some(date) = today.checked_add_days(Days::new(u64::from(offset))) else {
                break;
            };
            if is_weekend(date) || !self.is_date_range_available(date, days_required, booked) {
                continue;
            }
            starts.push(AvailableStart {
                date,
                formatted: date.format("%b %-d, %Y").to_string(),
                days_from_today: i64::from(offset),
            });
        }

        tracing::debug!(
            days_required,
            booked = booked.len(),
            found = starts.len(),
            "scanned for available start dates"
        );
        Ok(starts)
    }

    /// Rentals go out any calendar day with no crew booking, so the next
    /// `limit` days from `today` are all offered
    pub fn next_rental_starts(&self, today: NaiveDate) -> Vec<AvailableStart> {
        (0..self.horizon_days)
            .take(self.limit)
            .filter_map(|offset| {
                let date = today.checked_add_days(Days::new(u64::from(offset)))?;
                Some(AvailableStart {
                    date,
                    formatted: date.format("%b %-d, %Y").to_string(),
                    days_from_today: i64::from(offset),
                })
            })
            .collect()
    }

    /// Top three starts from the local current date, booked dates given
    /// as strings
    pub fn get_top3_available_dates<S: AsRef<str>>(
        booked: &[S],
        days_required: f64,
    ) -> Result<Vec<AvailableStart>, QuoteError> {
        let booked = parse_booked_dates(booked)?;
        Self::default().next_available_starts(&booked, days_required, Local::now().date_naive())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_booked_monday_is_skipped() {
        // 2026-10-19 is a Monday
        let booked = parse_booked_dates(&["2026-10-19"]).unwrap();
        let starts = AvailabilityScheduler::default()
            .next_available_starts(&booked, 1.0, date(2026, 10, 19))
            .unwrap();
        let dates: Vec<NaiveDate> = starts.iter().map(|s| s.date).collect();
        assert_eq!(dates, vec![date(2026, 10, 20), date(2026, 10, 21), date(2026, 10, 22)]);
        assert_eq!(starts[0].formatted, "Oct 20, 2026");
        assert_eq!(starts[0].days_from_today, 1);
    }

    #[test]
    fn test_weekend_skipped_from_friday() {
        let starts = AvailabilityScheduler::default()
            .next_available_starts(&BTreeSet::new(), 1.0, date(2026, 10, 23))
            .unwrap();
        let dates: Vec<NaiveDate> = starts.iter().map(|s| s.date).collect();
        assert_eq!(dates, vec![date(2026, 10, 23), date(2026, 10, 26), date(2026, 10, 27)]);
        assert_eq!(starts[0].days_from_today, 0);
        assert_eq!(starts[1].days_from_today, 3);
    }

    #[test]
    fn test_multi_day_job_cannot_run_into_weekend() {
        // 1.5 days needs two consecutive weekdays, so Friday is out
        let starts = AvailabilityScheduler::default()
            .next_available_starts(&BTreeSet::new(), 1.5, date(2026, 10, 23))
            .unwrap();
        assert_eq!(starts[0].date, date(2026, 10, 26));
    }

    #[test]
    fn test_booking_inside_range_blocks_start() {
        let booked = parse_booked_dates(&["2026-10-21"]).unwrap();
        let scheduler = AvailabilityScheduler::default();
        assert!(!scheduler.is_date_range_available(date(2026, 10, 19), 3.0, &booked));
        assert!(scheduler.is_date_range_available(date(2026, 10, 19), 2.0, &booked));
    }

    #[test]
    fn test_results_strictly_increasing_weekdays() {
        let booked = parse_booked_dates(&["2026-10-20", "2026-10-22T09:00:00Z"]).unwrap();
        let starts = AvailabilityScheduler::new(10, 90)
            .next_available_starts(&booked, 1.0, date(2026, 10, 19))
            .unwrap();
        assert_eq!(starts.len(), 10);
        for pair in starts.windows(2) {
            assert!(pair[0].date < pair[1].date);
        }
        for start in &starts {
            assert!(!is_weekend(start.date));
            assert!(!booked.contains(&start.date));
        }
    }

    #[test]
    fn test_longer_than_work_week_has_no_start() {
        let starts = AvailabilityScheduler::default()
            .next_available_starts(&BTreeSet::new(), 6.0, date(2026, 10, 19))
            .unwrap();
        assert!(starts.is_empty());
    }

    #[test]
    fn test_fully_booked_horizon_returns_empty() {
        let start = date(2026, 10, 19);
        let booked: BTreeSet<NaiveDate> = (0..90)
            .filter_map(|d| start.checked_add_days(Days::new(d)))
            .collect();
        let starts = AvailabilityScheduler::default()
            .next_available_starts(&booked, 1.0, start)
            .unwrap();
        assert!(starts.is_empty());
    }

    #[test]
    fn test_malformed_booking_rejected() {
        let err = parse_booked_dates(&["10/19/2026"]).unwrap_err();
        match err {
            QuoteError::InvalidParameter { name, .. } => assert_eq!(name, "booked_dates"),
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn test_top3_from_local_today() {
        let today = Local::now().date_naive();
        let starts = AvailabilityScheduler::get_top3_available_dates::<&str>(&[], 1.0).unwrap();
        assert_eq!(starts.len(), 3);
        assert!(starts[0].date >= today);
        for pair in starts.windows(2) {
            assert!(pair[0].date < pair[1].date);
        }
        for start in &starts {
            assert!(!is_weekend(start.date));
            assert_eq!(start.formatted, start.date.format("%b %-d, %Y").to_string());
        }

        let err =
            AvailabilityScheduler::get_top3_available_dates(&["10/20/2026"], 1.0).unwrap_err();
        match err {
            QuoteError::InvalidParameter { name, .. } => assert_eq!(name, "booked_dates"),
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn test_rental_starts_include_weekend() {
        // Friday, then Saturday and Sunday
        let starts = AvailabilityScheduler::default().next_rental_starts(date(2026, 10, 23));
        let dates: Vec<NaiveDate> = starts.iter().map(|s| s.date).collect();
        assert_eq!(dates, vec![date(2026, 10, 23), date(2026, 10, 24), date(2026, 10, 25)]);
        assert_eq!(starts[2].days_from_today, 2);
    }

    #[test]
    fn test_non_positive_days_rejected() {
        let scheduler = AvailabilityScheduler::default();
        assert!(scheduler
            .next_available_starts(&BTreeSet::new(), 0.0, date(2026, 10, 19))
            .is_err());
    }
}
