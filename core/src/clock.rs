//! Simulation clock — owns the monthly tick counter and the calendar.
//!
//! `total_months_elapsed` is the monotonic tick. `age_years` and
//! `month_of_year` are derived calendar fields advanced in lockstep,
//! twelve months per age increment.

use crate::types::{Tick, MONTHS_PER_YEAR};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct SimClock {
    pub total_months_elapsed: Tick,
    pub age_years:            u32,
    pub month_of_year:        u32,
    start_age:                u32,
}

impl SimClock {
    pub fn new(start_age: u32) -> Self {
        Self {
            total_months_elapsed: 0,
            age_years: start_age,
            month_of_year: 1,
            start_age,
        }
    }

    /// Start of a tick: bump the counter. Returns the new tick number.
    /// The calendar fields still describe the month being simulated.
    pub fn begin_month(&mut self) -> Tick {
        self.total_months_elapsed += 1;
        self.total_months_elapsed
    }

    /// End of a tick: roll the calendar forward one month.
    pub fn end_month(&mut self) {
        if self.month_of_year == MONTHS_PER_YEAR as u32 {
            self.age_years += 1;
            self.month_of_year = 1;
        } else {
            self.month_of_year += 1;
        }
    }

    /// True on the first month of every age-year except the first one.
    pub fn is_new_age_year(&self) -> bool {
        self.month_of_year == 1 && self.age_years > self.start_age
    }

    pub fn is_year_end(&self) -> bool {
        self.month_of_year == MONTHS_PER_YEAR as u32
    }

    /// True right after a 12-month block has been completed.
    pub fn completed_year(&self) -> bool {
        self.month_of_year == 1
            && self.total_months_elapsed > 0
            && self.total_months_elapsed % MONTHS_PER_YEAR == 0
    }

    pub fn start_age(&self) -> u32 {
        self.start_age
    }

    /// Label of the latest tick, e.g. `25y3m`, or `start` before the first.
    pub fn label(&self) -> String {
        label_for_tick(self.start_age, self.total_months_elapsed)
    }
}

/// Calendar label for a recorded tick, counted from `start_age` month 1.
pub fn label_for_tick(start_age: u32, tick: Tick) -> String {
    if tick == 0 {
        return "start".to_string();
    }
    let age = start_age as Tick + (tick - 1) / MONTHS_PER_YEAR;
    let month = (tick - 1) % MONTHS_PER_YEAR + 1;
    format!("{age}y{month}m")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn calendar_rolls_over_after_twelve_months() {
        let mut clock = SimClock::new(25);
        for _ in 0..12 {
            clock.begin_month();
            clock.end_month();
        }
        assert_eq!(clock.total_months_elapsed, 12);
        assert_eq!(clock.age_years, 26);
        assert_eq!(clock.month_of_year, 1);
        assert!(clock.completed_year());
    }

    #[test]
    fn first_january_is_not_a_new_age_year() {
        let mut clock = SimClock::new(25);
        clock.begin_month();
        assert!(!clock.is_new_age_year());
        for _ in 0..12 {
            clock.end_month();
            clock.begin_month();
        }
        assert!(clock.is_new_age_year());
    }

    #[test]
    fn tick_labels_match_live_calendar() {
        let mut clock = SimClock::new(30);
        assert_eq!(clock.label(), "start");
        for tick in 1..=30 {
            clock.begin_month();
            let live = format!("{}y{}m", clock.age_years, clock.month_of_year);
            assert_eq!(label_for_tick(30, tick), live);
            clock.end_month();
            assert_eq!(clock.label(), live);
        }
    }
}
