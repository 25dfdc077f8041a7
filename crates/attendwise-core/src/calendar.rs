//! Monday–Friday working-day arithmetic.
//!
//! Declared holidays are not modelled; a day is working iff it falls on a
//! weekday.

use chrono::{Datelike, NaiveDate, Weekday};

/// Whether `date` falls Monday through Friday.
pub fn is_working_day(date: NaiveDate) -> bool {
    !matches!(date.weekday(), Weekday::Sat | Weekday::Sun)
}

/// Iterator over the working days in `(from, to]`.
///
/// Cloning restarts the walk from the current position, so a freshly
/// created value can be iterated any number of times.
#[derive(Debug, Clone)]
pub struct WorkingDays {
    next: Option<NaiveDate>,
    end: NaiveDate,
}

impl Iterator for WorkingDays {
    type Item = NaiveDate;

    fn next(&mut self) -> Option<NaiveDate> {
        while let Some(current) = self.next {
            if current > self.end {
                self.next = None;
                break;
            }
            self.next = current.succ_opt();
            if is_working_day(current) {
                return Some(current);
            }
        }
        None
    }
}

/// Working days strictly after `from_exclusive` up to and including
/// `to_inclusive`. Empty when `to_inclusive <= from_exclusive`.
pub fn iter_working_days(from_exclusive: NaiveDate, to_inclusive: NaiveDate) -> WorkingDays {
    let next = if to_inclusive > from_exclusive {
        from_exclusive.succ_opt()
    } else {
        None
    };
    WorkingDays {
        next,
        end: to_inclusive,
    }
}

/// Count working days in `(from_exclusive, to_inclusive]`.
pub fn count_working_days(from_exclusive: NaiveDate, to_inclusive: NaiveDate) -> u32 {
    iter_working_days(from_exclusive, to_inclusive).count() as u32
}

/// Monday of the week containing `date`.
pub fn week_start(date: NaiveDate) -> NaiveDate {
    date.week(Weekday::Mon).first_day()
}

/// Sunday of the week containing `date`.
pub fn week_end(date: NaiveDate) -> NaiveDate {
    date.week(Weekday::Mon).last_day()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn d(y: i32, m: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, day).unwrap()
    }

    #[test]
    fn sunday_to_friday_is_five() {
        // 2026-10-18 is a Sunday, 2026-10-23 a Friday.
        assert_eq!(count_working_days(d(2026, 10, 18), d(2026, 10, 23)), 5);
    }

    #[test]
    fn friday_to_friday_is_five() {
        assert_eq!(count_working_days(d(2026, 10, 16), d(2026, 10, 23)), 5);
    }

    #[test]
    fn zero_length_range_is_empty() {
        assert_eq!(count_working_days(d(2026, 10, 20), d(2026, 10, 20)), 0);
        assert_eq!(count_working_days(d(2026, 10, 21), d(2026, 10, 20)), 0);
    }

    #[test]
    fn weekend_only_range_is_empty() {
        assert_eq!(count_working_days(d(2026, 10, 23), d(2026, 10, 25)), 0);
    }

    #[test]
    fn start_day_is_excluded_and_end_day_included() {
        let days: Vec<_> = iter_working_days(d(2026, 10, 19), d(2026, 10, 21)).collect();
        assert_eq!(days, vec![d(2026, 10, 20), d(2026, 10, 21)]);
    }

    #[test]
    fn iteration_is_restartable() {
        let walk = iter_working_days(d(2026, 10, 18), d(2026, 11, 1));
        let first: Vec<_> = walk.clone().collect();
        let second: Vec<_> = walk.collect();
        assert_eq!(first, second);
        assert_eq!(first.len(), 10);
        assert!(first.iter().all(|day| is_working_day(*day)));
    }

    #[test]
    fn spans_month_and_year_boundaries() {
        // Wed 2026-12-30 through Tue 2027-01-05: Thu, Fri, Mon, Tue.
        assert_eq!(count_working_days(d(2026, 12, 30), d(2027, 1, 5)), 4);
    }

    #[test]
    fn week_bounds() {
        assert_eq!(week_start(d(2026, 10, 21)), d(2026, 10, 19));
        assert_eq!(week_end(d(2026, 10, 21)), d(2026, 10, 25));
        assert_eq!(week_start(d(2026, 10, 19)), d(2026, 10, 19));
    }
}
